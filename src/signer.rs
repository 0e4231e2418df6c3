//! Request signing boundary
//!
//! The library builds a canonical [`RequestPayload`] for each operation. A
//! [`RequestSigner`] turns it into the signed envelope sent on the wire. XML
//! serialization and XMLDSig live in the signer implementation, which reaches
//! the private key through [`Credential::sign`].

use crate::credential::Credential;
use crate::error::Result;
use crate::query::{QueryAction, QueryPayload};
use crate::types::{Operation, RequestId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// `SOAPAction` of the authentication call
pub const AUTHENTICATE_ACTION: &str = "http://DescargaMasivaTerceros.gob.mx/IAutenticacion/Autentica";
/// `SOAPAction` of the verify call
pub const VERIFY_ACTION: &str =
    "http://DescargaMasivaTerceros.sat.gob.mx/IVerificaSolicitudDescargaService/VerificaSolicitudDescarga";
/// `SOAPAction` of the download call
pub const DOWNLOAD_ACTION: &str =
    "http://DescargaMasivaTerceros.sat.gob.mx/IDescargaMasivaTercerosService/Descargar";

const QUERY_ACTION_PREFIX: &str = "http://DescargaMasivaTerceros.sat.gob.mx/ISolicitaDescargaService/";

/// Timestamp block of the authentication request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatePayload {
    /// Start of the requested token lifetime
    pub created: DateTime<Utc>,
    /// End of the requested token lifetime
    pub expires: DateTime<Utc>,
    /// Security token reference id (`uuid-<v4>-1`)
    pub token_id: String,
}

/// Canonical, unsigned content of one remote call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequestPayload {
    /// Obtain a token
    Authenticate(AuthenticatePayload),
    /// Submit criteria
    Query(QueryPayload),
    /// Poll a request
    Verify {
        /// Request to poll
        request_id: RequestId,
        /// RFC of the credential holder
        requester_rfc: String,
    },
    /// Fetch a package
    Download {
        /// Package to fetch
        package_id: String,
        /// RFC of the credential holder
        requester_rfc: String,
    },
}

impl RequestPayload {
    /// Operation this payload belongs to
    pub fn operation(&self) -> Operation {
        match self {
            RequestPayload::Authenticate(_) => Operation::Authenticate,
            RequestPayload::Query(_) => Operation::Query,
            RequestPayload::Verify { .. } => Operation::Verify,
            RequestPayload::Download { .. } => Operation::Download,
        }
    }

    /// `SOAPAction` header value
    pub fn soap_action(&self) -> String {
        match self {
            RequestPayload::Authenticate(_) => AUTHENTICATE_ACTION.to_string(),
            RequestPayload::Query(query) => query_action(query.action),
            RequestPayload::Verify { .. } => VERIFY_ACTION.to_string(),
            RequestPayload::Download { .. } => DOWNLOAD_ACTION.to_string(),
        }
    }

    /// Attributes of the signed element, keyed by remote attribute name
    pub fn attributes(&self) -> BTreeMap<&'static str, String> {
        match self {
            RequestPayload::Authenticate(_) => BTreeMap::new(),
            RequestPayload::Query(query) => query.attributes.clone(),
            RequestPayload::Verify {
                request_id,
                requester_rfc,
            } => BTreeMap::from([
                ("IdSolicitud", request_id.to_string()),
                ("RfcSolicitante", requester_rfc.clone()),
            ]),
            RequestPayload::Download {
                package_id,
                requester_rfc,
            } => BTreeMap::from([
                ("IdPaquete", package_id.clone()),
                ("RfcSolicitante", requester_rfc.clone()),
            ]),
        }
    }
}

fn query_action(action: QueryAction) -> String {
    format!("{QUERY_ACTION_PREFIX}{}", action.name())
}

/// Produces signed request envelopes
#[async_trait]
pub trait RequestSigner: Send + Sync {
    /// Sign `payload` on behalf of `credential`, returning the envelope body
    async fn sign(&self, payload: &RequestPayload, credential: &Credential) -> Result<String>;
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryParameters;
    use crate::types::{DocumentId, DownloadType};

    #[test]
    fn query_actions_follow_the_filter() {
        let folio = QueryParameters::create()
            .with_document_id(DocumentId::parse("96623061-61fe-49de-b298-c7156476aa8b").unwrap());
        let payload = RequestPayload::Query(folio.to_payload("EKU9003173C9"));
        assert_eq!(
            payload.soap_action(),
            "http://DescargaMasivaTerceros.sat.gob.mx/ISolicitaDescargaService/SolicitaDescargaFolio"
        );

        let received = QueryParameters::create()
            .with_period(
                crate::types::DateTimePeriod::from_values("2024-01-01 00:00:00", "2024-01-05 00:00:00")
                    .unwrap(),
            )
            .with_download_type(DownloadType::Received);
        let payload = RequestPayload::Query(received.to_payload("EKU9003173C9"));
        assert!(payload.soap_action().ends_with("/SolicitaDescargaRecibidos"));
        assert_eq!(payload.operation(), Operation::Query);
    }

    #[test]
    fn verify_and_download_attributes() {
        let verify = RequestPayload::Verify {
            request_id: RequestId::new("3edbd462-9fa0-4363-b60f-bac332338028").unwrap(),
            requester_rfc: "EKU9003173C9".into(),
        };
        let attributes = verify.attributes();
        assert_eq!(attributes["IdSolicitud"], "3edbd462-9fa0-4363-b60f-bac332338028");
        assert_eq!(attributes["RfcSolicitante"], "EKU9003173C9");
        assert_eq!(verify.soap_action(), VERIFY_ACTION);

        let download = RequestPayload::Download {
            package_id: "4e80345d-917f-40bb-a98f-4a73939343c5_01".into(),
            requester_rfc: "EKU9003173C9".into(),
        };
        assert_eq!(download.attributes()["IdPaquete"], "4e80345d-917f-40bb-a98f-4a73939343c5_01");
        assert_eq!(download.operation(), Operation::Download);
    }
}
