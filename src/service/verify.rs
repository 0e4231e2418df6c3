//! Request status polling

use super::{Service, service_status};
use crate::collector::merge;
use crate::credential::Credential;
use crate::error::{Error, Result};
use crate::signer::RequestPayload;
use crate::status::{CodeRequest, ServiceStatus, StatusRequest};
use crate::token::Token;
use crate::types::{Operation, RequestId};
use chrono::Utc;

/// Current remote state of a download request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifyResult {
    /// Request that was polled
    pub request_id: RequestId,
    /// Envelope status
    pub status: ServiceStatus,
    /// Lifecycle state; always present when the status is accepted
    pub status_request: Option<StatusRequest>,
    /// Request-level outcome detail
    pub code_request: Option<CodeRequest>,
    /// Number of documents in the request
    pub number_cfdis: u64,
    /// Packages listed by the remote, de-duplicated in first-seen order
    pub package_ids: Vec<String>,
}

impl VerifyResult {
    /// Whether the remote accepted the verify call
    pub fn is_accepted(&self) -> bool {
        self.status.accepted
    }

    /// Whether the request finished and its packages can be downloaded
    pub fn is_finished(&self) -> bool {
        self.status_request.is_some_and(|s| s.is_finished())
    }
}

impl Service {
    /// Poll the state of a download request
    ///
    /// Calling this any number of times has no effect on the request itself;
    /// the remote service owns state progression.
    ///
    /// # Errors
    ///
    /// - [`Error::CredentialExpired`], [`Error::TokenExpired`]
    /// - [`Error::Transport`], [`Error::MalformedResponse`]
    /// - [`Error::UnknownStatusCode`] when the response reports an
    ///   `EstadoSolicitud` outside the known set, accepted or not
    pub async fn verify(
        &self,
        credential: &Credential,
        token: &Token,
        request_id: &RequestId,
    ) -> Result<VerifyResult> {
        let now = Utc::now();
        credential.ensure_valid(now)?;
        token.ensure_valid(now)?;

        let response = self
            .submit(
                credential,
                RequestPayload::Verify {
                    request_id: request_id.clone(),
                    requester_rfc: credential.subject_id().to_string(),
                },
                &self.endpoints.verify,
                Some(token.authorization_header()),
            )
            .await?;

        let fields = &response.fields;
        let status = service_status(Operation::Verify, fields)?;
        let code_request = fields.code_request().map(CodeRequest::from_code);
        let number_cfdis = fields.number_cfdis().unwrap_or_default();

        if !status.accepted {
            tracing::info!(
                request_id = %request_id,
                code = status.code,
                message = %status.message,
                "verify not accepted"
            );
            let status_request = fields
                .status_request()
                .map(StatusRequest::from_code)
                .transpose()?;
            return Ok(VerifyResult {
                request_id: request_id.clone(),
                status,
                status_request,
                code_request,
                number_cfdis,
                package_ids: Vec::new(),
            });
        }

        let raw_state = fields.status_request().ok_or_else(|| Error::MalformedResponse {
            operation: Operation::Verify,
            message: "accepted verify without EstadoSolicitud".into(),
        })?;
        let status_request = StatusRequest::from_code(raw_state)?;
        let package_ids = merge(&[], &response.package_ids);

        tracing::debug!(
            request_id = %request_id,
            state = %status_request,
            packages = package_ids.len(),
            number_cfdis,
            "verify completed"
        );

        Ok(VerifyResult {
            request_id: request_id.clone(),
            status,
            status_request: Some(status_request),
            code_request,
            number_cfdis,
            package_ids,
        })
    }
}
