//! Interpretation of remote status codes
//!
//! The remote service reports three independent codes:
//! - `CodEstatus`: the generic envelope status of every operation ([`StatusCode`], [`ServiceStatus`])
//! - `EstadoSolicitud`: lifecycle state of a download request ([`StatusRequest`])
//! - `CodigoEstadoSolicitud`: request-level outcome detail ([`CodeRequest`])
//!
//! Each has a single conversion function. Unknown envelope and detail codes are
//! kept as `Unknown(n)` and never treated as accepted; unknown lifecycle states
//! are an error.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Envelope status code (`CodEstatus`)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// 300: user is not valid
    InvalidUser,
    /// 301: malformed XML
    MalformedXml,
    /// 302: malformed seal
    MalformedSeal,
    /// 303: seal does not belong to the requester
    SealMismatch,
    /// 304: certificate revoked or expired
    RevokedCertificate,
    /// 305: invalid certificate
    InvalidCertificate,
    /// 404: uncontrolled error
    Uncontrolled,
    /// 5000: request received successfully
    Accepted,
    /// 5002: lifetime request limit exhausted for these criteria
    Exhausted,
    /// 5003: result exceeds the maximum allowed
    MaximumLimitReached,
    /// 5004: no information matched the request
    EmptyResult,
    /// 5005: an identical request is already in progress
    Duplicated,
    /// 5006: internal error processing the request
    InternalError,
    /// 5007: requested package does not exist
    PackageNotFound,
    /// 5008: package download limit reached
    DownloadLimitReached,
    /// 5011: daily folio request limit reached
    DailyFolioLimit,
    /// Code outside the known set
    Unknown(i32),
}

impl StatusCode {
    /// Interpret a raw `CodEstatus`
    pub fn from_code(code: i32) -> Self {
        match code {
            300 => StatusCode::InvalidUser,
            301 => StatusCode::MalformedXml,
            302 => StatusCode::MalformedSeal,
            303 => StatusCode::SealMismatch,
            304 => StatusCode::RevokedCertificate,
            305 => StatusCode::InvalidCertificate,
            404 => StatusCode::Uncontrolled,
            5000 => StatusCode::Accepted,
            5002 => StatusCode::Exhausted,
            5003 => StatusCode::MaximumLimitReached,
            5004 => StatusCode::EmptyResult,
            5005 => StatusCode::Duplicated,
            5006 => StatusCode::InternalError,
            5007 => StatusCode::PackageNotFound,
            5008 => StatusCode::DownloadLimitReached,
            5011 => StatusCode::DailyFolioLimit,
            other => StatusCode::Unknown(other),
        }
    }

    /// Raw numeric code
    pub fn code(&self) -> i32 {
        match self {
            StatusCode::InvalidUser => 300,
            StatusCode::MalformedXml => 301,
            StatusCode::MalformedSeal => 302,
            StatusCode::SealMismatch => 303,
            StatusCode::RevokedCertificate => 304,
            StatusCode::InvalidCertificate => 305,
            StatusCode::Uncontrolled => 404,
            StatusCode::Accepted => 5000,
            StatusCode::Exhausted => 5002,
            StatusCode::MaximumLimitReached => 5003,
            StatusCode::EmptyResult => 5004,
            StatusCode::Duplicated => 5005,
            StatusCode::InternalError => 5006,
            StatusCode::PackageNotFound => 5007,
            StatusCode::DownloadLimitReached => 5008,
            StatusCode::DailyFolioLimit => 5011,
            StatusCode::Unknown(code) => *code,
        }
    }

    /// Only 5000 is an accepted envelope
    pub fn is_accepted(&self) -> bool {
        matches!(self, StatusCode::Accepted)
    }

    /// Short English description, used when the remote message is empty
    pub fn description(&self) -> &'static str {
        match self {
            StatusCode::InvalidUser => "invalid user",
            StatusCode::MalformedXml => "malformed XML",
            StatusCode::MalformedSeal => "malformed seal",
            StatusCode::SealMismatch => "seal does not correspond to the requester RFC",
            StatusCode::RevokedCertificate => "certificate revoked or expired",
            StatusCode::InvalidCertificate => "invalid certificate",
            StatusCode::Uncontrolled => "uncontrolled error",
            StatusCode::Accepted => "request received successfully",
            StatusCode::Exhausted => "request limit exhausted",
            StatusCode::MaximumLimitReached => "maximum result size reached",
            StatusCode::EmptyResult => "no information found",
            StatusCode::Duplicated => "duplicate request",
            StatusCode::InternalError => "internal error processing the request",
            StatusCode::PackageNotFound => "package does not exist",
            StatusCode::DownloadLimitReached => "package download limit reached",
            StatusCode::DailyFolioLimit => "daily folio request limit reached",
            StatusCode::Unknown(_) => "unknown status code",
        }
    }
}

/// Generic result envelope returned by every operation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    /// Raw `CodEstatus`
    pub code: i32,
    /// Remote message (or a description of the code when the remote sent none)
    pub message: String,
    /// Whether the remote accepted the call
    pub accepted: bool,
}

impl ServiceStatus {
    /// Build the envelope from a raw code and message
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        let kind = StatusCode::from_code(code);
        let message = message.into();
        let message = if message.trim().is_empty() {
            kind.description().to_string()
        } else {
            message
        };
        Self {
            code,
            message,
            accepted: kind.is_accepted(),
        }
    }

    /// Interpreted code
    pub fn kind(&self) -> StatusCode {
        StatusCode::from_code(self.code)
    }
}

/// Lifecycle state of a download request (`EstadoSolicitud`)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusRequest {
    /// 1: accepted, not started
    Accepted,
    /// 2: being prepared
    InProgress,
    /// 3: packages ready
    Finished,
    /// 4: failed while preparing
    Failure,
    /// 5: rejected
    Rejected,
    /// 6: expired, packages no longer available
    Expired,
}

impl StatusRequest {
    /// Interpret a raw `EstadoSolicitud`
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownStatusCode`] for any value outside 1..=6.
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            1 => Ok(StatusRequest::Accepted),
            2 => Ok(StatusRequest::InProgress),
            3 => Ok(StatusRequest::Finished),
            4 => Ok(StatusRequest::Failure),
            5 => Ok(StatusRequest::Rejected),
            6 => Ok(StatusRequest::Expired),
            other => Err(Error::UnknownStatusCode(other)),
        }
    }

    /// Raw numeric code
    pub fn code(&self) -> i32 {
        match self {
            StatusRequest::Accepted => 1,
            StatusRequest::InProgress => 2,
            StatusRequest::Finished => 3,
            StatusRequest::Failure => 4,
            StatusRequest::Rejected => 5,
            StatusRequest::Expired => 6,
        }
    }

    /// Accepted and InProgress
    pub fn is_pending(&self) -> bool {
        matches!(self, StatusRequest::Accepted | StatusRequest::InProgress)
    }

    /// Finished
    pub fn is_finished(&self) -> bool {
        matches!(self, StatusRequest::Finished)
    }

    /// Failure, Rejected and Expired
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            StatusRequest::Failure | StatusRequest::Rejected | StatusRequest::Expired
        )
    }

    /// Name as exposed to callers
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusRequest::Accepted => "Accepted",
            StatusRequest::InProgress => "InProgress",
            StatusRequest::Finished => "Finished",
            StatusRequest::Failure => "Failure",
            StatusRequest::Rejected => "Rejected",
            StatusRequest::Expired => "Expired",
        }
    }
}

impl std::fmt::Display for StatusRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request-level outcome detail (`CodigoEstadoSolicitud`)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodeRequest {
    /// 5000
    Accepted,
    /// 5002
    Exhausted,
    /// 5003
    MaximumLimitReached,
    /// 5004
    EmptyResult,
    /// 5005
    Duplicated,
    /// Code outside the known set
    Unknown(i32),
}

impl CodeRequest {
    /// Interpret a raw `CodigoEstadoSolicitud`
    pub fn from_code(code: i32) -> Self {
        match code {
            5000 => CodeRequest::Accepted,
            5002 => CodeRequest::Exhausted,
            5003 => CodeRequest::MaximumLimitReached,
            5004 => CodeRequest::EmptyResult,
            5005 => CodeRequest::Duplicated,
            other => CodeRequest::Unknown(other),
        }
    }

    /// Raw numeric code
    pub fn code(&self) -> i32 {
        match self {
            CodeRequest::Accepted => 5000,
            CodeRequest::Exhausted => 5002,
            CodeRequest::MaximumLimitReached => 5003,
            CodeRequest::EmptyResult => 5004,
            CodeRequest::Duplicated => 5005,
            CodeRequest::Unknown(code) => *code,
        }
    }
}
