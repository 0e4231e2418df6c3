//! Fake signer, scripted transport and a plain-text response decoder

use async_trait::async_trait;
use base64::Engine;
use sat_descarga_masiva::signer::{
    AUTHENTICATE_ACTION, DOWNLOAD_ACTION, RequestPayload, RequestSigner, VERIFY_ACTION,
};
use sat_descarga_masiva::transport::{RawResponse, ResponseDecoder, SignedRequest, Transport};
use sat_descarga_masiva::{Credential, Error, FieldMap, Operation, Result, TransportError};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Signer producing a marker envelope that names the operation
#[derive(Default)]
pub struct FakeSigner {
    pub signed: AtomicUsize,
}

#[async_trait]
impl RequestSigner for FakeSigner {
    async fn sign(&self, payload: &RequestPayload, credential: &Credential) -> Result<String> {
        self.signed.fetch_add(1, Ordering::SeqCst);
        let attributes: Vec<String> = payload
            .attributes()
            .iter()
            .map(|(name, value)| format!("{name}=\"{value}\""))
            .collect();
        Ok(format!(
            "<fake operation=\"{}\" rfc=\"{}\" {}/>",
            payload.operation(),
            credential.subject_id(),
            attributes.join(" ")
        ))
    }
}

/// Transport answering from a queue and counting every call
#[derive(Default)]
pub struct FakeTransport {
    responses: Mutex<VecDeque<RawResponse>>,
    pub sent: Mutex<Vec<(String, SignedRequest)>>,
    pub calls: AtomicUsize,
}

impl FakeTransport {
    pub fn respond(&self, response: RawResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn respond_fields(&self, pairs: &[(&str, &str)]) {
        let fields: FieldMap = pairs.iter().copied().collect();
        self.respond(RawResponse::from_fields(fields));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn submit(
        &self,
        url: &str,
        request: SignedRequest,
    ) -> std::result::Result<RawResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().unwrap().push((url.to_string(), request));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| TransportError::Other {
                url: url.to_string(),
                message: "no canned response".into(),
            })
    }
}

/// Decodes `key=value` lines
///
/// `IdPaquete` lines become package ids and `Paquete` is base64 content.
pub struct LineDecoder;

impl ResponseDecoder for LineDecoder {
    fn decode(&self, soap_action: &str, body: &[u8]) -> Result<RawResponse> {
        let operation = match soap_action {
            AUTHENTICATE_ACTION => Operation::Authenticate,
            VERIFY_ACTION => Operation::Verify,
            DOWNLOAD_ACTION => Operation::Download,
            _ => Operation::Query,
        };
        let malformed = |message: String| Error::MalformedResponse { operation, message };

        let text = std::str::from_utf8(body).map_err(|e| malformed(e.to_string()))?;
        let mut fields = FieldMap::new();
        let mut package_ids = Vec::new();
        let mut content = None;
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| malformed(format!("not a key=value line: {line}")))?;
            match key {
                "IdPaquete" => package_ids.push(value.to_string()),
                "Paquete" => {
                    content = Some(
                        base64::engine::general_purpose::STANDARD
                            .decode(value)
                            .map_err(|e| malformed(e.to_string()))?,
                    )
                }
                _ => fields.insert(key, value),
            }
        }
        let mut response = RawResponse::from_fields(fields).with_package_ids(package_ids);
        if let Some(content) = content {
            response = response.with_content(content);
        }
        Ok(response)
    }
}
