//! FIEL credential: certificate, private key and passphrase
//!
//! A [`Credential`] is created from the raw bytes a taxpayer uploads. Creation
//! fails unless the certificate parses, the key decrypts with the passphrase and
//! the key pairs with the certificate. Validity in time is checked separately
//! with [`Credential::is_valid`], so an expired FIEL can still be inspected.

mod decode;

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Private};

/// Digest used by [`Credential::sign`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignatureDigest {
    /// RSA-SHA1, as required by the SAT XML signatures
    Sha1,
    /// SHA-256
    Sha256,
}

impl SignatureDigest {
    fn message_digest(self) -> MessageDigest {
        match self {
            SignatureDigest::Sha1 => MessageDigest::sha1(),
            SignatureDigest::Sha256 => MessageDigest::sha256(),
        }
    }
}

/// Certificate + private key pair used to sign requests on behalf of a taxpayer
#[derive(Clone)]
pub struct Credential {
    certificate_der: Vec<u8>,
    private_key: PKey<Private>,
    passphrase: String,
    subject_id: String,
    serial_number: String,
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
}

impl Credential {
    /// Decode and pair a certificate and private key
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedCredential`] if the certificate or key cannot be parsed,
    ///   or the passphrase does not decrypt the key
    /// - [`Error::KeyMismatch`] if the key does not belong to the certificate
    pub fn create(certificate: &[u8], private_key: &[u8], passphrase: &str) -> Result<Self> {
        let info = decode::decode_certificate(certificate)?;
        let key = decode::decode_private_key(private_key, passphrase)?;

        if !decode::key_matches(&info.der, &key)? {
            tracing::debug!(serial = %info.serial_number, "private key does not match certificate");
            return Err(Error::KeyMismatch {
                serial: info.serial_number,
            });
        }

        tracing::debug!(
            subject = %info.subject_id,
            serial = %info.serial_number,
            not_after = %info.not_after,
            "credential loaded"
        );

        Ok(Self {
            certificate_der: info.der,
            private_key: key,
            passphrase: passphrase.to_string(),
            subject_id: info.subject_id,
            serial_number: info.serial_number,
            not_before: info.not_before,
            not_after: info.not_after,
        })
    }

    /// Whether `now` lies within `[not_before, not_after]`
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.not_before <= now && now <= self.not_after
    }

    /// [`Credential::is_valid`] at the current time
    pub fn is_valid_now(&self) -> bool {
        self.is_valid(Utc::now())
    }

    /// Error unless valid at `now`
    pub fn ensure_valid(&self, now: DateTime<Utc>) -> Result<()> {
        if self.is_valid(now) {
            Ok(())
        } else {
            Err(Error::CredentialExpired {
                subject: self.subject_id.clone(),
                at: now.to_rfc3339(),
            })
        }
    }

    /// Taxpayer RFC of the certificate holder
    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    /// Certificate serial number
    pub fn serial_number(&self) -> &str {
        &self.serial_number
    }

    /// Start of the validity window
    pub fn not_before(&self) -> DateTime<Utc> {
        self.not_before
    }

    /// End of the validity window
    pub fn not_after(&self) -> DateTime<Utc> {
        self.not_after
    }

    /// DER-encoded certificate
    pub fn certificate_der(&self) -> &[u8] {
        &self.certificate_der
    }

    /// Base64 certificate, as embedded in signed requests
    pub fn certificate_base64(&self) -> String {
        STANDARD.encode(&self.certificate_der)
    }

    /// Passphrase the key was decrypted with
    pub fn passphrase(&self) -> &str {
        &self.passphrase
    }

    /// Sign `data` with the private key, for [`crate::signer::RequestSigner`] implementations
    pub fn sign(&self, data: &[u8], digest: SignatureDigest) -> Result<Vec<u8>> {
        decode::sign(&self.private_key, digest.message_digest(), data)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("subject_id", &self.subject_id)
            .field("serial_number", &self.serial_number)
            .field("not_before", &self.not_before)
            .field("not_after", &self.not_after)
            .field("passphrase", &"<redacted>")
            .finish_non_exhaustive()
    }
}
