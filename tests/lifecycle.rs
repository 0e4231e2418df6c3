//! Query, verify and download against a scripted transport

mod common;

use chrono::{Duration, Utc};
use common::{FakeSigner, FakeTransport, Fiel, PASSPHRASE, SERIAL, SUBJECT_RFC};
use sat_descarga_masiva::collector::merge;
use sat_descarga_masiva::transport::RawResponse;
use sat_descarga_masiva::{
    Credential, DateTimePeriod, DownloadResponse, DownloadType, Error, FieldMap, PackageCollector,
    QueryParameters, QueryResponse, RequestState, Service, ServiceCategory, ServiceEndpoints,
    StatusRequest, Token, VerifyResponse,
};
use std::sync::Arc;

const REQUEST_ID: &str = "4e80345d-917f-40bb-a98f-4a73939343c5";

struct Setup {
    service: Service,
    signer: Arc<FakeSigner>,
    transport: Arc<FakeTransport>,
    credential: Credential,
    token: Token,
}

fn setup() -> Setup {
    let signer = Arc::new(FakeSigner::default());
    let transport = Arc::new(FakeTransport::default());
    let service = Service::for_category(signer.clone(), transport.clone(), ServiceCategory::Cfdi);
    let now = Utc::now();
    Setup {
        service,
        signer,
        transport,
        credential: Fiel::generate().credential(),
        token: Token::new("eyJhbGciOi", now - Duration::seconds(5), now + Duration::minutes(5)),
    }
}

fn received_january() -> QueryParameters {
    QueryParameters::create()
        .with_period(
            DateTimePeriod::from_values("2024-01-01 00:00:00", "2024-01-05 00:00:00").unwrap(),
        )
        .with_download_type(DownloadType::Received)
}

fn verify_response(state: &str, packages: &[&str]) -> RawResponse {
    let fields: FieldMap = [
        ("CodEstatus", "5000"),
        ("Mensaje", "Solicitud Aceptada"),
        ("EstadoSolicitud", state),
        ("CodigoEstadoSolicitud", "5000"),
        ("NumeroCFDIs", "12"),
    ]
    .into_iter()
    .collect();
    RawResponse::from_fields(fields).with_package_ids(packages.iter().copied())
}

#[tokio::test]
async fn accepted_query_returns_request_id() {
    let s = setup();
    s.transport.respond_fields(&[
        ("CodEstatus", "5000"),
        ("Mensaje", "Solicitud Aceptada"),
        ("IdSolicitud", REQUEST_ID),
    ]);

    let result = s
        .service
        .query(&s.credential, &s.token, &received_january())
        .await;
    let response = QueryResponse::from_result(&result);

    assert!(response.accepted);
    assert_eq!(response.request_id.as_deref(), Some(REQUEST_ID));
    assert_eq!(s.transport.calls(), 1);

    let sent = s.transport.sent.lock().unwrap();
    let (url, request) = &sent[0];
    assert_eq!(url, &ServiceEndpoints::cfdi().query);
    assert!(request.soap_action.ends_with("SolicitaDescargaRecibidos"));
    assert_eq!(request.authorization.as_deref(), Some("WRAP access_token=\"eyJhbGciOi\""));
    assert!(request.body.contains("RfcReceptor=\"EKU9003173C9\""));
    assert!(request.body.contains("FechaInicial=\"2024-01-01T00:00:00\""));
    assert!(request.body.contains("FechaFinal=\"2024-01-05T00:00:00\""));
}

#[tokio::test]
async fn in_progress_verify_has_no_packages() {
    let s = setup();
    s.transport.respond(verify_response("2", &[]));

    let request_id = sat_descarga_masiva::RequestId::new(REQUEST_ID).unwrap();
    let result = s.service.verify(&s.credential, &s.token, &request_id).await;
    let json = serde_json::to_value(VerifyResponse::from_result(&result)).unwrap();

    assert_eq!(json["accepted"], true);
    assert_eq!(json["statusRequest"], "InProgress");
    assert_eq!(json["packageIds"], serde_json::json!([]));
}

#[tokio::test]
async fn finished_request_downloads_its_packages() {
    let s = setup();
    s.transport.respond_fields(&[
        ("CodEstatus", "5000"),
        ("Mensaje", "Solicitud Aceptada"),
        ("IdSolicitud", REQUEST_ID),
    ]);
    s.transport.respond(verify_response("2", &[]));
    s.transport.respond(verify_response("3", &["pkg-1", "pkg-2"]));
    let fields: FieldMap = [("CodEstatus", "5000"), ("Mensaje", "Solicitud Aceptada")]
        .into_iter()
        .collect();
    s.transport
        .respond(RawResponse::from_fields(fields).with_content(b"PK\x03\x04zip".to_vec()));

    let query = s
        .service
        .query(&s.credential, &s.token, &received_january())
        .await
        .unwrap();
    let mut collector = PackageCollector::new();
    let request_id = collector.track_query(&query).unwrap().request_id().clone();

    let first = s.service.verify(&s.credential, &s.token, &request_id).await.unwrap();
    assert_eq!(collector.observe(&first), Some(RequestState::Polling));

    let second = s.service.verify(&s.credential, &s.token, &request_id).await.unwrap();
    assert_eq!(collector.observe(&second), Some(RequestState::Done));
    assert_eq!(second.status_request, Some(StatusRequest::Finished));

    let packages = collector.get(&request_id).unwrap().package_ids().to_vec();
    assert_eq!(packages, vec!["pkg-1".to_string(), "pkg-2".to_string()]);

    let result = s
        .service
        .download(&s.credential, &s.token, &packages[0])
        .await;
    let response = DownloadResponse::from_result(&packages[0], &result);
    assert!(response.accepted);
    assert_eq!(response.package_id, "pkg-1");
    assert!(!response.bytes.unwrap_or_default().is_empty());
    assert_eq!(s.transport.calls(), 4);
}

#[tokio::test]
async fn category_mismatch_is_rejected_locally() {
    let s = setup();
    let parameters = received_january().with_service_category(ServiceCategory::Retenciones);

    let result = s.service.query(&s.credential, &s.token, &parameters).await;
    let response = QueryResponse::from_result(&result);

    assert!(!response.accepted);
    assert_eq!(response.request_id, None);
    assert_eq!(response.error_code.as_deref(), Some("service_type_mismatch"));
    assert_eq!(s.transport.calls(), 0);
    assert_eq!(s.signer.signed.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn repeated_finished_verify_is_stable() {
    let s = setup();
    s.transport.respond(verify_response("3", &["pkg-1", "pkg-2"]));
    s.transport.respond(verify_response("3", &["pkg-1", "pkg-2"]));
    s.transport.respond(verify_response("3", &["pkg-1", "pkg-2", "pkg-3"]));

    let request_id = sat_descarga_masiva::RequestId::new(REQUEST_ID).unwrap();
    let mut collector = PackageCollector::new();
    collector.track(request_id.clone());

    let first = s.service.verify(&s.credential, &s.token, &request_id).await.unwrap();
    let second = s.service.verify(&s.credential, &s.token, &request_id).await.unwrap();
    assert_eq!(first.status_request, second.status_request);
    assert_eq!(first.package_ids, second.package_ids);

    collector.observe(&first);
    collector.observe(&second);
    let late = s.service.verify(&s.credential, &s.token, &request_id).await.unwrap();
    assert_eq!(collector.observe(&late), Some(RequestState::Done));

    // packages are frozen once the request is done
    assert_eq!(
        collector.get(&request_id).unwrap().package_ids(),
        &["pkg-1".to_string(), "pkg-2".to_string()]
    );
}

#[tokio::test]
async fn unknown_request_state_is_an_error() {
    let s = setup();
    s.transport.respond(verify_response("9", &[]));

    let request_id = sat_descarga_masiva::RequestId::new(REQUEST_ID).unwrap();
    let result = s.service.verify(&s.credential, &s.token, &request_id).await;

    assert!(matches!(result, Err(Error::UnknownStatusCode(9))));
    let response = VerifyResponse::from_result(&result);
    assert!(!response.accepted);
    assert_eq!(response.error_code.as_deref(), Some("unknown_status_code"));
}

#[tokio::test]
async fn expired_token_is_rejected_before_sending() {
    let s = setup();
    let now = Utc::now();
    let stale = Token::new("eyJhbGciOi", now - Duration::minutes(10), now - Duration::minutes(5));

    let result = s.service.query(&s.credential, &stale, &received_january()).await;

    assert!(matches!(result, Err(Error::TokenExpired { .. })));
    assert_eq!(s.transport.calls(), 0);
}

#[test]
fn credential_exposes_subject_and_serial() {
    let fiel = Fiel::generate();
    let credential = fiel.credential();
    assert_eq!(credential.subject_id(), SUBJECT_RFC);
    assert_eq!(credential.serial_number(), SERIAL);
    assert!(credential.is_valid_now());

    let from_pem =
        Credential::create(&fiel.certificate_pem, &fiel.key_pem_encrypted, PASSPHRASE).unwrap();
    assert_eq!(from_pem.subject_id(), SUBJECT_RFC);
}

#[test]
fn credential_with_wrong_passphrase_is_malformed() {
    let fiel = Fiel::generate();
    let err = Credential::create(&fiel.certificate_der, &fiel.key_der_encrypted, "wrong").unwrap_err();
    assert!(matches!(err, Error::MalformedCredential(_)));
}

#[tokio::test]
async fn expired_credential_never_authenticates() {
    let s = setup();
    let now = Utc::now();
    let expired = Fiel::generate_valid(now - Duration::days(400), now - Duration::days(30)).credential();
    assert!(!expired.is_valid_now());

    let err = s.service.authenticate(&expired).await.unwrap_err();
    assert!(matches!(err, Error::CredentialExpired { .. }));
    assert_eq!(s.transport.calls(), 0);
}

#[test]
fn merge_keeps_first_occurrence_order() {
    let existing = vec!["a".to_string(), "b".to_string()];
    let new = vec!["b".to_string(), "c".to_string(), "a".to_string()];
    assert_eq!(merge(&existing, &new), vec!["a", "b", "c"]);
}
