//! # sat-descarga-masiva
//!
//! Client library for the SAT bulk download web service ("Descarga Masiva"):
//! request a batch of CFDI documents matching filter criteria, poll until the
//! batch is prepared, then download the resulting packages.
//!
//! ## Design
//!
//! - **Explicit state** - credentials and tokens are arguments, the [`Service`]
//!   holds no session; [`TokenCache`] is available for sharing a token
//! - **Validate first** - parameters, credential and token are checked before
//!   anything is signed or sent
//! - **Boundaries as traits** - XML signing ([`signer::RequestSigner`]) and the
//!   wire exchange ([`transport::Transport`]) are pluggable; an HTTP transport
//!   is included
//! - **No hidden retries** - the caller drives polling cadence, and
//!   [`retry::RetryRisk`] says which failures are safe to retry
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use sat_descarga_masiva::signer::RequestSigner;
//! use sat_descarga_masiva::transport::{HttpTransport, ResponseDecoder};
//! use sat_descarga_masiva::{
//!     Config, Credential, DateTimePeriod, DownloadType, PackageCollector, QueryParameters,
//!     RequestState, Service,
//! };
//!
//! async fn run(
//!     signer: Arc<dyn RequestSigner>,
//!     decoder: Arc<dyn ResponseDecoder>,
//!     certificate: &[u8],
//!     private_key: &[u8],
//! ) -> sat_descarga_masiva::Result<()> {
//!     let config = Config::default();
//!     let transport = Arc::new(HttpTransport::new(&config.http, decoder)?);
//!     let service = Service::from_config(signer, transport, &config.service)?;
//!
//!     let credential = Credential::create(certificate, private_key, "passphrase")?;
//!     let token = service.authenticate(&credential).await?;
//!
//!     let parameters = QueryParameters::create()
//!         .with_period(DateTimePeriod::from_values("2024-01-01 00:00:00", "2024-01-05 00:00:00")?)
//!         .with_download_type(DownloadType::Received);
//!     let query = service.query(&credential, &token, &parameters).await?;
//!
//!     let mut collector = PackageCollector::new();
//!     let Some(request) = collector.track_query(&query) else {
//!         println!("not accepted: {}", query.status.message);
//!         return Ok(());
//!     };
//!     let request_id = request.request_id().clone();
//!
//!     loop {
//!         let result = service.verify(&credential, &token, &request_id).await?;
//!         match collector.observe(&result) {
//!             Some(RequestState::Done) => break,
//!             Some(RequestState::Dead(status)) => {
//!                 println!("request ended as {status}");
//!                 return Ok(());
//!             }
//!             _ => tokio::time::sleep(std::time::Duration::from_secs(60)).await,
//!         }
//!     }
//!
//!     if let Some(request) = collector.get(&request_id) {
//!         for package_id in request.package_ids() {
//!             let package = service.download(&credential, &token, package_id).await?;
//!             println!("{package_id}: {} bytes", package.content.len());
//!         }
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Per-request state machine and package accumulation
pub mod collector;
/// Configuration types
pub mod config;
/// FIEL credential decoding and validation
pub mod credential;
/// Service categories and endpoints
pub mod endpoints;
/// Error types
pub mod error;
/// Key/value response records
pub mod fields;
/// Query parameters and payloads
pub mod query;
/// Caller-facing result shapes
pub mod response;
/// Retry classification
pub mod retry;
/// Lifecycle operations
pub mod service;
/// Request signing boundary
pub mod signer;
/// Remote status codes
pub mod status;
/// Tokens and the token cache
pub mod token;
/// Transport boundary and HTTP transport
pub mod transport;
/// Core value types
pub mod types;

// Lets the shared fixture files under tests/ name the crate from unit tests
#[cfg(test)]
extern crate self as sat_descarga_masiva;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use collector::{DownloadRequest, PackageCollector, RequestState};
pub use config::Config;
pub use credential::Credential;
pub use endpoints::{ServiceCategory, ServiceEndpoints};
pub use error::{Error, Result, ToHttpStatus, TransportError};
pub use fields::{FieldMap, MetadataItem, ResponseFields};
pub use query::QueryParameters;
pub use response::{DownloadResponse, QueryResponse, VerifyResponse};
pub use service::{DownloadResult, QueryResult, Service, VerifyResult};
pub use status::{CodeRequest, ServiceStatus, StatusCode, StatusRequest};
pub use token::{Token, TokenCache};
pub use transport::HttpTransport;
pub use types::{
    DateTimePeriod, DocumentId, DocumentStatus, DocumentType, DownloadType, Operation,
    RequestId, RequestType, Rfc,
};
