//! Retry classification
//!
//! The library never retries on its own: polling cadence and retry policy
//! belong to the caller. This module tells the caller which failures are worth
//! retrying and what a retry risks.
//!
//! # Example
//!
//! ```no_run
//! use sat_descarga_masiva::retry::RetryRisk;
//! use sat_descarga_masiva::{Credential, QueryParameters, Result, Service, Token};
//!
//! # async fn example(service: Service, credential: Credential, token: Token, params: QueryParameters) -> Result<()> {
//! match service.query(&credential, &token, &params).await {
//!     Ok(result) => println!("accepted: {}", result.is_accepted()),
//!     Err(e) => match e.retry_risk() {
//!         RetryRisk::Safe => println!("retry when convenient: {e}"),
//!         RetryRisk::DuplicateSubmission => println!("verify before resubmitting: {e}"),
//!         RetryRisk::DoNotRetry => return Err(e),
//!     },
//! }
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, TransportError};
use crate::types::Operation;

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (timeouts, refused connections, overloaded gateways) return `true`.
/// Everything decided by local validation or by the remote business rules returns `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation may be retried
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for TransportError {
    fn is_retryable(&self) -> bool {
        match self {
            TransportError::Timeout { .. } | TransportError::Connect { .. } => true,
            // Request timeout, rate limiting and gateway errors
            TransportError::Status { status, .. } => {
                matches!(status, 408 | 429 | 502 | 503 | 504)
            }
            // A body that cannot be decoded will not decode on the next attempt either
            TransportError::Decode { .. } => false,
            TransportError::Other { .. } => false,
        }
    }
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            Error::Transport { source, .. } => source.is_retryable(),
            // Local validation is deterministic
            Error::MalformedCredential(_)
            | Error::KeyMismatch { .. }
            | Error::CredentialExpired { .. }
            | Error::UnknownServiceCategory(_)
            | Error::ServiceTypeMismatch { .. }
            | Error::InvalidPeriod(_)
            | Error::MissingFilter
            | Error::InvalidQuery(_)
            | Error::InvalidRfc(_)
            | Error::InvalidDocumentId(_)
            | Error::MissingIdentifier { .. }
            | Error::Config { .. } => false,
            // Needs a fresh token, not a retry
            Error::TokenExpired { .. } => false,
            // Remote business errors are never retried
            Error::RemoteRejected { .. }
            | Error::DownloadRejected { .. }
            | Error::UnknownStatusCode(_)
            | Error::MalformedResponse { .. } => false,
            Error::Signing(_) | Error::Serialization(_) => false,
        }
    }
}

/// What retrying a failed call may cause
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryRisk {
    /// Retrying has no remote side effects (authenticate, verify, download)
    Safe,
    /// The failed query may have been registered remotely; a retry can create
    /// a second request that counts against the request limits
    DuplicateSubmission,
    /// The failure is not transient
    DoNotRetry,
}

impl Error {
    /// Classify the risk of retrying the call that produced this error
    pub fn retry_risk(&self) -> RetryRisk {
        if !self.is_retryable() {
            return RetryRisk::DoNotRetry;
        }
        match self {
            Error::Transport {
                operation: Operation::Query,
                ..
            } => RetryRisk::DuplicateSubmission,
            _ => RetryRisk::Safe,
        }
    }
}
