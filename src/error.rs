//! Error types for sat-descarga-masiva
//!
//! This module provides the error taxonomy for the library:
//! - Local validation errors (credential, parameters, category mismatch) that are
//!   raised before any request is signed or sent
//! - Transport errors (network, timeouts) that the caller may retry
//! - Remote business errors that carry the original code and message intact
//! - HTTP status code mapping for front-ends that expose the lifecycle over HTTP

use crate::endpoints::ServiceCategory;
use crate::types::Operation;
use thiserror::Error;

/// Result type alias for sat-descarga-masiva operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for sat-descarga-masiva
#[derive(Debug, Error)]
pub enum Error {
    /// Certificate or private key could not be parsed or decrypted
    #[error("malformed credential: {0}")]
    MalformedCredential(String),

    /// The private key does not correspond to the certificate
    #[error("private key does not match certificate {serial}")]
    KeyMismatch {
        /// Serial number of the certificate the key was paired with
        serial: String,
    },

    /// The certificate is outside its validity window
    #[error("credential for {subject} is not valid at {at}")]
    CredentialExpired {
        /// Taxpayer identifier of the certificate subject
        subject: String,
        /// Instant at which validity was checked (RFC 3339)
        at: String,
    },

    /// A service category name that is not part of the known set
    #[error("unknown service category: {0}")]
    UnknownServiceCategory(String),

    /// Query parameters target a different category than the service endpoints
    #[error("service type mismatch: service is configured for {expected}, parameters target {actual}")]
    ServiceTypeMismatch {
        /// Category of the endpoints the service was constructed with
        expected: ServiceCategory,
        /// Category carried by the query parameters
        actual: ServiceCategory,
    },

    /// Period bounds are missing, unparsable or not ordered
    #[error("invalid period: {0}")]
    InvalidPeriod(String),

    /// Neither a period nor a document identifier was given
    #[error("query requires either a period or a document identifier")]
    MissingFilter,

    /// Parameter combination rejected by the remote service rules
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Taxpayer identifier with invalid format
    #[error("invalid RFC: {0}")]
    InvalidRfc(String),

    /// Document identifier (folio fiscal) that is not a UUID
    #[error("invalid document identifier: {0}")]
    InvalidDocumentId(String),

    /// An identifier argument was empty
    #[error("{what} must not be empty")]
    MissingIdentifier {
        /// Name of the missing identifier (e.g. "request id")
        what: &'static str,
    },

    /// The authentication token is expired or empty
    #[error("authentication token expired at {expires}")]
    TokenExpired {
        /// Expiry instant of the rejected token (RFC 3339)
        expires: String,
    },

    /// Network-level failure; safe for the caller to retry (see [`crate::retry`])
    #[error("{operation} transport error: {source}")]
    Transport {
        /// Operation that was in flight
        operation: Operation,
        /// Underlying transport failure
        #[source]
        source: TransportError,
    },

    /// The remote service answered with a non-accepted status
    #[error("{operation} rejected by remote service ({code}): {message}")]
    RemoteRejected {
        /// Operation that was rejected
        operation: Operation,
        /// Remote status code
        code: i32,
        /// Remote status message
        message: String,
    },

    /// The remote service refused to hand out a package
    #[error("download of package {package_id} rejected ({code}): {message}")]
    DownloadRejected {
        /// Package that was requested
        package_id: String,
        /// Remote status code
        code: i32,
        /// Remote status message
        message: String,
    },

    /// A request status code outside the known set
    #[error("unknown request status code: {0}")]
    UnknownStatusCode(i32),

    /// The remote response is missing required fields
    #[error("malformed {operation} response: {message}")]
    MalformedResponse {
        /// Operation whose response could not be interpreted
        operation: Operation,
        /// What was wrong with the response
        message: String,
    },

    /// The request signer failed to produce a signed payload
    #[error("signing error: {0}")]
    Signing(String),

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "http.timeout")
        key: Option<String>,
    },

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Network-level failures reported by a [`crate::transport::Transport`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request did not complete within the configured timeout
    #[error("request to {url} timed out")]
    Timeout {
        /// Endpoint URL
        url: String,
    },

    /// TCP/TLS connection could not be established
    #[error("could not connect to {url}: {message}")]
    Connect {
        /// Endpoint URL
        url: String,
        /// Connection failure description
        message: String,
    },

    /// The endpoint answered with a non-success HTTP status
    #[error("{url} answered HTTP {status}")]
    Status {
        /// Endpoint URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// The response body could not be decoded
    #[error("could not decode response from {url}: {message}")]
    Decode {
        /// Endpoint URL
        url: String,
        /// Decoder failure description
        message: String,
    },

    /// Any other transport failure
    #[error("transport failure for {url}: {message}")]
    Other {
        /// Endpoint URL
        url: String,
        /// Failure description
        message: String,
    },
}

impl TransportError {
    /// Classify a reqwest error for the given endpoint
    pub fn from_reqwest(url: &str, error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            TransportError::Timeout {
                url: url.to_string(),
            }
        } else if error.is_connect() {
            TransportError::Connect {
                url: url.to_string(),
                message: error.to_string(),
            }
        } else if let Some(status) = error.status() {
            TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
        } else {
            TransportError::Other {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }
}

/// Convert errors to HTTP status codes for front-ends
///
/// This trait maps domain errors to appropriate HTTP status codes.
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - invalid input, rejected locally
            Error::UnknownServiceCategory(_)
            | Error::ServiceTypeMismatch { .. }
            | Error::InvalidPeriod(_)
            | Error::MissingFilter
            | Error::InvalidQuery(_)
            | Error::InvalidRfc(_)
            | Error::InvalidDocumentId(_)
            | Error::MissingIdentifier { .. }
            | Error::Config { .. } => 400,

            // 401 Unauthorized - token must be refreshed
            Error::TokenExpired { .. } => 401,

            // 422 Unprocessable Entity - credential material is unusable
            Error::MalformedCredential(_)
            | Error::KeyMismatch { .. }
            | Error::CredentialExpired { .. } => 422,

            // 502 Bad Gateway - remote service errors
            Error::RemoteRejected { .. }
            | Error::DownloadRejected { .. }
            | Error::UnknownStatusCode(_)
            | Error::MalformedResponse { .. } => 502,

            // 504 Gateway Timeout vs 502 for other network failures
            Error::Transport {
                source: TransportError::Timeout { .. },
                ..
            } => 504,
            Error::Transport { .. } => 502,

            // 500 Internal Server Error
            Error::Signing(_) | Error::Serialization(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::MalformedCredential(_) => "malformed_credential",
            Error::KeyMismatch { .. } => "key_mismatch",
            Error::CredentialExpired { .. } => "credential_expired",
            Error::UnknownServiceCategory(_) => "unknown_service_category",
            Error::ServiceTypeMismatch { .. } => "service_type_mismatch",
            Error::InvalidPeriod(_) => "invalid_period",
            Error::MissingFilter => "missing_filter",
            Error::InvalidQuery(_) => "invalid_query",
            Error::InvalidRfc(_) => "invalid_rfc",
            Error::InvalidDocumentId(_) => "invalid_document_id",
            Error::MissingIdentifier { .. } => "missing_identifier",
            Error::TokenExpired { .. } => "token_expired",
            Error::Transport { .. } => "transport_error",
            Error::RemoteRejected { .. } => "remote_rejected",
            Error::DownloadRejected { .. } => "download_rejected",
            Error::UnknownStatusCode(_) => "unknown_status_code",
            Error::MalformedResponse { .. } => "malformed_response",
            Error::Signing(_) => "signing_error",
            Error::Config { .. } => "config_error",
            Error::Serialization(_) => "serialization_error",
        }
    }
}
