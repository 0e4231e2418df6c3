//! Caller-facing result shapes
//!
//! Flat, camelCase JSON renderings of operation outcomes for front-ends that
//! expose the lifecycle over HTTP. Each shape is built from the operation's
//! `Result`, so local failures (validation, expired credential) render as
//! `accepted: false` with an `errorCode` instead of escaping as errors.

use crate::error::{Error, Result, ToHttpStatus};
use crate::service::{DownloadResult, QueryResult, VerifyResult};
use crate::status::StatusRequest;
use serde::{Deserialize, Serialize};

/// Rendering of [`crate::Service::query`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    /// Whether the remote accepted the request
    pub accepted: bool,
    /// Request identifier to poll
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Remote status code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,
    /// Remote message or error description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Machine-readable error code for local and transport failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl QueryResponse {
    /// Render a query outcome
    pub fn from_result(result: &Result<QueryResult>) -> Self {
        match result {
            Ok(query) => Self {
                accepted: query.is_accepted(),
                request_id: query.request_id.as_ref().map(ToString::to_string),
                code: Some(query.status.code),
                message: Some(query.status.message.clone()),
                error_code: None,
            },
            Err(error) => Self {
                accepted: false,
                request_id: None,
                code: remote_code(error),
                message: Some(error.to_string()),
                error_code: Some(error.error_code().to_string()),
            },
        }
    }
}

/// Rendering of [`crate::Service::verify`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    /// Whether the remote accepted the verify call
    pub accepted: bool,
    /// Lifecycle state of the request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_request: Option<StatusRequest>,
    /// Packages listed for the request
    #[serde(default)]
    pub package_ids: Vec<String>,
    /// Remote status code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,
    /// Remote message or error description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Machine-readable error code for local and transport failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl VerifyResponse {
    /// Render a verify outcome
    pub fn from_result(result: &Result<VerifyResult>) -> Self {
        match result {
            Ok(verify) => Self {
                accepted: verify.is_accepted(),
                status_request: verify.status_request,
                package_ids: verify.package_ids.clone(),
                code: Some(verify.status.code),
                message: Some(verify.status.message.clone()),
                error_code: None,
            },
            Err(error) => Self {
                accepted: false,
                status_request: None,
                package_ids: Vec::new(),
                code: remote_code(error),
                message: Some(error.to_string()),
                error_code: Some(error.error_code().to_string()),
            },
        }
    }
}

/// Rendering of [`crate::Service::download`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResponse {
    /// Whether the package was delivered
    pub accepted: bool,
    /// Requested package
    pub package_id: String,
    /// Package bytes, base64
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes: Option<String>,
    /// Remote status code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,
    /// Remote message or error description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Machine-readable error code for local, transport and remote failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl DownloadResponse {
    /// Render a download outcome for `package_id`
    pub fn from_result(package_id: &str, result: &Result<DownloadResult>) -> Self {
        match result {
            Ok(download) => Self {
                accepted: true,
                package_id: download.package_id.clone(),
                bytes: Some(download.content_base64()),
                code: Some(download.status.code),
                message: Some(download.status.message.clone()),
                error_code: None,
            },
            Err(error) => Self {
                accepted: false,
                package_id: package_id.to_string(),
                bytes: None,
                code: remote_code(error),
                message: Some(error.to_string()),
                error_code: Some(error.error_code().to_string()),
            },
        }
    }
}

fn remote_code(error: &Error) -> Option<i32> {
    match error {
        Error::RemoteRejected { code, .. } | Error::DownloadRejected { code, .. } => Some(*code),
        _ => None,
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints::ServiceCategory;
    use crate::status::ServiceStatus;
    use crate::types::RequestId;

    #[test]
    fn accepted_query_renders_camel_case() {
        let result = Ok(QueryResult {
            status: ServiceStatus::new(5000, "Solicitud Aceptada"),
            request_id: Some(RequestId::new("abc-123").unwrap()),
        });
        let json = serde_json::to_value(QueryResponse::from_result(&result)).unwrap();
        assert_eq!(json["accepted"], true);
        assert_eq!(json["requestId"], "abc-123");
        assert!(json.get("errorCode").is_none());
    }

    #[test]
    fn local_failure_renders_as_not_accepted() {
        let result: Result<QueryResult> = Err(Error::ServiceTypeMismatch {
            expected: ServiceCategory::Cfdi,
            actual: ServiceCategory::Retenciones,
        });
        let response = QueryResponse::from_result(&result);
        assert!(!response.accepted);
        assert_eq!(response.request_id, None);
        assert_eq!(response.error_code.as_deref(), Some("service_type_mismatch"));
    }

    #[test]
    fn verify_renders_status_name_and_packages() {
        let result = Ok(VerifyResult {
            request_id: RequestId::new("abc-123").unwrap(),
            status: ServiceStatus::new(5000, "Solicitud Aceptada"),
            status_request: Some(StatusRequest::Finished),
            code_request: None,
            number_cfdis: 2,
            package_ids: vec!["pkg-1".into(), "pkg-2".into()],
        });
        let json = serde_json::to_value(VerifyResponse::from_result(&result)).unwrap();
        assert_eq!(json["statusRequest"], "Finished");
        assert_eq!(json["packageIds"], serde_json::json!(["pkg-1", "pkg-2"]));
    }

    #[test]
    fn download_bytes_are_base64() {
        let result = Ok(DownloadResult {
            package_id: "pkg-1".into(),
            status: ServiceStatus::new(5000, "Solicitud Aceptada"),
            content: b"PK\x03\x04".to_vec(),
        });
        let response = DownloadResponse::from_result("pkg-1", &result);
        assert_eq!(response.bytes.as_deref(), Some("UEsDBA=="));

        let rejected: Result<DownloadResult> = Err(Error::DownloadRejected {
            package_id: "pkg-9".into(),
            code: 5007,
            message: "No existe el paquete solicitado".into(),
        });
        let response = DownloadResponse::from_result("pkg-9", &rejected);
        assert!(!response.accepted);
        assert_eq!(response.code, Some(5007));
        assert_eq!(response.error_code.as_deref(), Some("download_rejected"));
    }
}
