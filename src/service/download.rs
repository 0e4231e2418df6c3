//! Package retrieval

use super::{Service, service_status};
use crate::credential::Credential;
use crate::error::{Error, Result};
use crate::signer::RequestPayload;
use crate::status::ServiceStatus;
use crate::token::Token;
use crate::types::Operation;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;

/// A downloaded package
#[derive(Clone, PartialEq, Eq)]
pub struct DownloadResult {
    /// Package identifier
    pub package_id: String,
    /// Envelope status (always accepted)
    pub status: ServiceStatus,
    /// Compressed package bytes, as delivered
    pub content: Vec<u8>,
}

impl DownloadResult {
    /// Package bytes as base64
    pub fn content_base64(&self) -> String {
        STANDARD.encode(&self.content)
    }
}

impl std::fmt::Debug for DownloadResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadResult")
            .field("package_id", &self.package_id)
            .field("status", &self.status)
            .field("content_len", &self.content.len())
            .finish()
    }
}

impl Service {
    /// Fetch one package of a finished request
    ///
    /// Whether the owning request finished is not checked here; the remote
    /// service refuses packages that are not ready.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingIdentifier`] for a blank package id
    /// - [`Error::CredentialExpired`], [`Error::TokenExpired`]
    /// - [`Error::Transport`], [`Error::MalformedResponse`]
    /// - [`Error::DownloadRejected`] when the remote status is not accepted
    pub async fn download(
        &self,
        credential: &Credential,
        token: &Token,
        package_id: &str,
    ) -> Result<DownloadResult> {
        let package_id = package_id.trim();
        if package_id.is_empty() {
            return Err(Error::MissingIdentifier { what: "package id" });
        }

        let now = Utc::now();
        credential.ensure_valid(now)?;
        token.ensure_valid(now)?;

        let response = self
            .submit(
                credential,
                RequestPayload::Download {
                    package_id: package_id.to_string(),
                    requester_rfc: credential.subject_id().to_string(),
                },
                &self.endpoints.download,
                Some(token.authorization_header()),
            )
            .await?;

        let status = service_status(Operation::Download, &response.fields)?;
        if !status.accepted {
            tracing::warn!(package_id, code = status.code, message = %status.message, "download rejected");
            return Err(Error::DownloadRejected {
                package_id: package_id.to_string(),
                code: status.code,
                message: status.message,
            });
        }

        let content = response
            .content
            .filter(|bytes| !bytes.is_empty())
            .ok_or_else(|| Error::MalformedResponse {
                operation: Operation::Download,
                message: format!("accepted download of {package_id} without content"),
            })?;

        tracing::info!(package_id, bytes = content.len(), "package downloaded");
        Ok(DownloadResult {
            package_id: package_id.to_string(),
            status,
            content,
        })
    }
}
