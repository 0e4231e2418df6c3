//! Transport boundary
//!
//! A [`Transport`] moves one signed request to an endpoint and hands back the
//! decoded response fields. It reports network failures as [`TransportError`]
//! and never retries on its own. Remote business status travels inside
//! [`RawResponse::fields`] and is interpreted by [`crate::Service`].

mod http;

pub use http::{HttpTransport, ResponseDecoder};

use crate::error::TransportError;
use crate::fields::ResponseFields;
use async_trait::async_trait;

/// Request ready to be put on the wire
#[derive(Clone, PartialEq, Eq)]
pub struct SignedRequest {
    /// `SOAPAction` header value
    pub soap_action: String,
    /// Signed envelope produced by the [`crate::signer::RequestSigner`]
    pub body: String,
    /// `Authorization` header value, absent for authentication
    pub authorization: Option<String>,
}

impl std::fmt::Debug for SignedRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedRequest")
            .field("soap_action", &self.soap_action)
            .field("body_len", &self.body.len())
            .field("authorized", &self.authorization.is_some())
            .finish()
    }
}

/// Decoded remote response
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawResponse {
    /// Flat response fields (`CodEstatus`, `Mensaje`, `IdSolicitud`, ...)
    pub fields: ResponseFields,
    /// Package identifiers listed by a verify response, in remote order
    pub package_ids: Vec<String>,
    /// Decoded package bytes of a download response
    pub content: Option<Vec<u8>>,
}

impl RawResponse {
    /// Response carrying only fields
    pub fn from_fields(fields: impl Into<ResponseFields>) -> Self {
        Self {
            fields: fields.into(),
            ..Self::default()
        }
    }

    /// Attach package identifiers
    pub fn with_package_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.package_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Attach package content
    pub fn with_content(mut self, content: Vec<u8>) -> Self {
        self.content = Some(content);
        self
    }
}

/// Physical exchange with the remote service
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `request` to `url` and decode the answer
    async fn submit(
        &self,
        url: &str,
        request: SignedRequest,
    ) -> std::result::Result<RawResponse, TransportError>;
}
