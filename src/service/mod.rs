//! Download lifecycle orchestrator
//!
//! [`Service`] exposes the four remote operations. It is bound to one
//! [`ServiceEndpoints`] table at construction and holds no per-request state:
//! credentials and tokens are passed to each call, and request progress is
//! tracked by the caller (see [`crate::collector::PackageCollector`]).
//!
//! Every operation validates its arguments locally before anything is signed,
//! so a rejected call never reaches the [`Transport`].

mod authenticate;
mod download;
mod query;
mod verify;

pub use download::DownloadResult;
pub use query::QueryResult;
pub use verify::VerifyResult;

use crate::config::ServiceConfig;
use crate::credential::Credential;
use crate::endpoints::{ServiceCategory, ServiceEndpoints};
use crate::error::{Error, Result};
use crate::fields::ResponseFields;
use crate::signer::{RequestPayload, RequestSigner};
use crate::status::ServiceStatus;
use crate::transport::{RawResponse, SignedRequest, Transport};
use crate::types::Operation;
use std::sync::Arc;
use std::time::Instant;

/// Client for one service category
#[derive(Clone)]
pub struct Service {
    signer: Arc<dyn RequestSigner>,
    transport: Arc<dyn Transport>,
    endpoints: Arc<ServiceEndpoints>,
    token_lifetime: chrono::Duration,
}

impl Service {
    /// Service bound to `endpoints`
    pub fn new(
        signer: Arc<dyn RequestSigner>,
        transport: Arc<dyn Transport>,
        endpoints: ServiceEndpoints,
    ) -> Self {
        Self::with_config_parts(signer, transport, endpoints, &ServiceConfig::default())
    }

    /// Service bound to the production endpoints of `category`
    pub fn for_category(
        signer: Arc<dyn RequestSigner>,
        transport: Arc<dyn Transport>,
        category: ServiceCategory,
    ) -> Self {
        Self::new(
            signer,
            transport,
            ServiceEndpoints::for_category(category).clone(),
        )
    }

    /// Service from configuration (category, endpoint overrides, token lifetime)
    pub fn from_config(
        signer: Arc<dyn RequestSigner>,
        transport: Arc<dyn Transport>,
        config: &ServiceConfig,
    ) -> Result<Self> {
        let endpoints = config.endpoints()?;
        Ok(Self::with_config_parts(signer, transport, endpoints, config))
    }

    fn with_config_parts(
        signer: Arc<dyn RequestSigner>,
        transport: Arc<dyn Transport>,
        endpoints: ServiceEndpoints,
        config: &ServiceConfig,
    ) -> Self {
        let token_lifetime =
            chrono::Duration::from_std(config.token_lifetime).unwrap_or(chrono::Duration::minutes(5));
        tracing::debug!(
            category = %endpoints.category,
            lifetime_secs = token_lifetime.num_seconds(),
            "service created"
        );
        Self {
            signer,
            transport,
            endpoints: Arc::new(endpoints),
            token_lifetime,
        }
    }

    /// Endpoints this service submits to
    pub fn endpoints(&self) -> &ServiceEndpoints {
        &self.endpoints
    }

    /// Category this service is bound to
    pub fn category(&self) -> ServiceCategory {
        self.endpoints.category
    }

    /// Sign `payload` and send it to `url`
    async fn submit(
        &self,
        credential: &Credential,
        payload: RequestPayload,
        url: &str,
        authorization: Option<String>,
    ) -> Result<RawResponse> {
        let operation = payload.operation();
        let soap_action = payload.soap_action();
        let body = self.signer.sign(&payload, credential).await?;

        let request = SignedRequest {
            soap_action,
            body,
            authorization,
        };

        let started = Instant::now();
        match self.transport.submit(url, request).await {
            Ok(response) => {
                tracing::debug!(
                    %operation,
                    category = %self.endpoints.category,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    code = ?response.fields.status_code(),
                    "remote call completed"
                );
                Ok(response)
            }
            Err(source) => {
                tracing::warn!(
                    %operation,
                    category = %self.endpoints.category,
                    error = %source,
                    "remote call failed"
                );
                Err(Error::Transport { operation, source })
            }
        }
    }
}

impl std::fmt::Debug for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Service")
            .field("endpoints", &self.endpoints)
            .field("token_lifetime", &self.token_lifetime)
            .finish_non_exhaustive()
    }
}

/// Envelope status of a response, which every operation must carry
fn service_status(operation: Operation, fields: &ResponseFields) -> Result<ServiceStatus> {
    let code = fields
        .status_code()
        .ok_or_else(|| Error::MalformedResponse {
            operation,
            message: "missing or non-numeric CodEstatus".into(),
        })?;
    Ok(ServiceStatus::new(code, fields.message().unwrap_or_default()))
}
