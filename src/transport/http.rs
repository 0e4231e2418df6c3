//! reqwest-backed transport

use super::{RawResponse, SignedRequest, Transport};
use crate::config::HttpConfig;
use crate::error::{Error, Result, TransportError};
use async_trait::async_trait;
use std::sync::Arc;

/// Turns a response body into [`RawResponse`]
///
/// SOAP envelope parsing lives behind this trait, next to the signer that
/// produces the envelopes.
pub trait ResponseDecoder: Send + Sync {
    /// Decode the body answered to a request sent with `soap_action`
    fn decode(&self, soap_action: &str, body: &[u8]) -> Result<RawResponse>;
}

/// HTTP transport
///
/// POSTs the signed envelope with the `SOAPAction` and `Authorization` headers
/// and delegates body decoding to a [`ResponseDecoder`].
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    decoder: Arc<dyn ResponseDecoder>,
}

impl HttpTransport {
    /// Build the HTTP client from configuration
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the client cannot be created
    pub fn new(config: &HttpConfig, decoder: Arc<dyn ResponseDecoder>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Config {
                message: format!("failed to create HTTP client: {e}"),
                key: Some("http".into()),
            })?;
        Ok(Self { client, decoder })
    }

    /// Use an existing client (shared connection pool, proxies, custom TLS)
    pub fn with_client(client: reqwest::Client, decoder: Arc<dyn ResponseDecoder>) -> Self {
        Self { client, decoder }
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport").finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn submit(
        &self,
        url: &str,
        request: SignedRequest,
    ) -> std::result::Result<RawResponse, TransportError> {
        tracing::debug!(url, soap_action = %request.soap_action, "sending request");

        let mut builder = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", request.soap_action.as_str());
        if let Some(authorization) = &request.authorization {
            builder = builder.header(reqwest::header::AUTHORIZATION, authorization.as_str());
        }

        let response = builder
            .body(request.body)
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url, status = status.as_u16(), "remote answered non-success status");
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::from_reqwest(url, &e))?;

        self.decoder
            .decode(&request.soap_action, &body)
            .map_err(|e| TransportError::Decode {
                url: url.to_string(),
                message: e.to_string(),
            })
    }
}
