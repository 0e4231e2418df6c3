//! Download request submission

use super::{Service, service_status};
use crate::credential::Credential;
use crate::error::{Error, Result};
use crate::query::QueryParameters;
use crate::signer::RequestPayload;
use crate::status::ServiceStatus;
use crate::token::Token;
use crate::types::{Operation, RequestId};
use chrono::Utc;

/// Outcome of a query submission
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryResult {
    /// Envelope status
    pub status: ServiceStatus,
    /// Request identifier, always present when the status is accepted
    pub request_id: Option<RequestId>,
}

impl QueryResult {
    /// Whether the remote accepted the request
    pub fn is_accepted(&self) -> bool {
        self.status.accepted
    }
}

impl Service {
    /// Submit a download request
    ///
    /// Parameters are validated against this service's category before the
    /// credential, the token or the network are touched. A remote refusal is
    /// returned as a non-accepted [`QueryResult`], not as an error.
    ///
    /// Retrying after an [`Error::Transport`] may create a duplicate request on
    /// the remote side (see [`crate::retry::RetryRisk::DuplicateSubmission`]).
    ///
    /// # Errors
    ///
    /// - [`QueryParameters::validate`] errors, [`Error::ServiceTypeMismatch`] first
    /// - [`Error::CredentialExpired`], [`Error::TokenExpired`]
    /// - [`Error::Transport`], [`Error::MalformedResponse`]
    pub async fn query(
        &self,
        credential: &Credential,
        token: &Token,
        parameters: &QueryParameters,
    ) -> Result<QueryResult> {
        if let Err(error) = parameters.validate(self.category()) {
            tracing::debug!(category = %self.category(), %error, "query rejected locally");
            return Err(error);
        }

        let now = Utc::now();
        credential.ensure_valid(now)?;
        token.ensure_valid(now)?;

        let payload = parameters.to_payload(credential.subject_id());
        let action = payload.action;
        let response = self
            .submit(
                credential,
                RequestPayload::Query(payload),
                &self.endpoints.query,
                Some(token.authorization_header()),
            )
            .await?;

        let status = service_status(Operation::Query, &response.fields)?;
        let request_id = response.fields.request_id().map(RequestId::new).transpose()?;

        if status.accepted && request_id.is_none() {
            return Err(Error::MalformedResponse {
                operation: Operation::Query,
                message: "accepted query without IdSolicitud".into(),
            });
        }

        match &request_id {
            Some(id) if status.accepted => {
                tracing::info!(request_id = %id, action = action.name(), "query accepted");
            }
            _ => {
                tracing::info!(code = status.code, message = %status.message, "query not accepted");
            }
        }

        Ok(QueryResult { status, request_id })
    }
}
