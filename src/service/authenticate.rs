//! Token acquisition

use super::Service;
use crate::credential::Credential;
use crate::error::{Error, Result};
use crate::signer::{AuthenticatePayload, RequestPayload};
use crate::token::Token;
use crate::types::Operation;
use chrono::Utc;

impl Service {
    /// Obtain a bearer token for `credential`
    ///
    /// The token is not stored anywhere; pass it to [`Service::query`],
    /// [`Service::verify`] and [`Service::download`], or share it through a
    /// [`crate::token::TokenCache`].
    ///
    /// # Errors
    ///
    /// - [`Error::CredentialExpired`] before anything is sent
    /// - [`Error::Transport`] on network failure
    /// - [`Error::RemoteRejected`] when the response carries no token
    pub async fn authenticate(&self, credential: &Credential) -> Result<Token> {
        let now = Utc::now();
        credential.ensure_valid(now)?;

        let payload = AuthenticatePayload {
            created: now,
            expires: now + self.token_lifetime,
            token_id: format!("uuid-{}-1", uuid::Uuid::new_v4()),
        };
        let (created, expires) = (payload.created, payload.expires);

        let response = self
            .submit(
                credential,
                RequestPayload::Authenticate(payload),
                &self.endpoints.authenticate,
                None,
            )
            .await?;

        let Some(value) = response.fields.token() else {
            let code = response.fields.status_code().unwrap_or_default();
            let message = response
                .fields
                .message()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or("authentication response carried no token")
                .to_string();
            tracing::warn!(subject = %credential.subject_id(), code, %message, "authentication rejected");
            return Err(Error::RemoteRejected {
                operation: Operation::Authenticate,
                code,
                message,
            });
        };

        // Remote instants win when present
        let token = Token::new(
            value,
            response.fields.created().unwrap_or(created),
            response.fields.expires().unwrap_or(expires),
        );
        tracing::info!(
            subject = %credential.subject_id(),
            expires = %token.expires(),
            "authenticated"
        );
        Ok(token)
    }
}
