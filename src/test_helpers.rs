//! Shared test helpers: generated FIEL material and scripted boundaries.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::credential::Credential;
use crate::error::{Result, TransportError};
use crate::fields::FieldMap;
use crate::signer::{RequestPayload, RequestSigner};
use crate::token::Token;
use crate::transport::{RawResponse, SignedRequest, Transport};

#[allow(dead_code)]
#[path = "../tests/common/fixtures.rs"]
mod fixtures;

pub(crate) use fixtures::{Fiel as FielFixture, FixtureOptions};

/// Signer that records payloads and returns a placeholder envelope
#[derive(Default)]
pub(crate) struct RecordingSigner {
    pub(crate) payloads: Mutex<Vec<RequestPayload>>,
}

#[async_trait]
impl RequestSigner for RecordingSigner {
    async fn sign(
        &self,
        payload: &RequestPayload,
        credential: &Credential,
    ) -> Result<String> {
        self.payloads.lock().unwrap().push(payload.clone());
        Ok(format!(
            "<signed operation=\"{}\" rfc=\"{}\"/>",
            payload.operation(),
            credential.subject_id()
        ))
    }
}

type CannedResponse = std::result::Result<RawResponse, TransportError>;

/// Transport answering from a queue of canned responses
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    responses: Mutex<VecDeque<CannedResponse>>,
    pub(crate) requests: Mutex<Vec<(String, SignedRequest)>>,
    pub(crate) calls: AtomicUsize,
}

impl ScriptedTransport {
    pub(crate) fn push(&self, response: CannedResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub(crate) fn push_fields(&self, pairs: &[(&str, &str)]) {
        let fields: FieldMap = pairs.iter().copied().collect();
        self.push(Ok(RawResponse::from_fields(fields)));
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn submit(
        &self,
        url: &str,
        request: SignedRequest,
    ) -> CannedResponse {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), request));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(TransportError::Other {
                    url: url.to_string(),
                    message: "no scripted response left".into(),
                })
            })
    }
}

/// Token valid for the next five minutes
pub(crate) fn fresh_token() -> Token {
    let now = Utc::now();
    Token::new("eyJhbGciOi", now - Duration::seconds(5), now + Duration::minutes(5))
}
