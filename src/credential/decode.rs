//! Certificate and private key decoding.

use crate::error::{Error, Result};
use chrono::{DateTime, TimeZone, Utc};
use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Private, Public};
use openssl::sign::{Signer, Verifier};
use openssl::x509::X509;
use x509_parser::pem::parse_x509_pem;

/// x500UniqueIdentifier, where the SAT stores the holder RFC
const OID_UNIQUE_IDENTIFIER: &str = "2.5.4.45";
const OID_COMMON_NAME: &str = "2.5.4.3";

const PROBE: &[u8] = b"sat-descarga-masiva key pairing probe";

pub(super) struct CertificateInfo {
    pub(super) der: Vec<u8>,
    pub(super) subject_id: String,
    pub(super) serial_number: String,
    pub(super) not_before: DateTime<Utc>,
    pub(super) not_after: DateTime<Utc>,
}

/// Accepts DER or PEM certificate bytes
pub(super) fn decode_certificate(bytes: &[u8]) -> Result<CertificateInfo> {
    let der = if looks_like_pem(bytes) {
        let (_, pem) = parse_x509_pem(bytes)
            .map_err(|e| Error::MalformedCredential(format!("certificate PEM: {e}")))?;
        pem.contents
    } else {
        bytes.to_vec()
    };

    let (_, cert) = x509_parser::parse_x509_certificate(&der)
        .map_err(|e| Error::MalformedCredential(format!("certificate: {e}")))?;

    let not_before = utc_from_timestamp(cert.validity().not_before.timestamp())?;
    let not_after = utc_from_timestamp(cert.validity().not_after.timestamp())?;

    let mut unique_identifier = None;
    let mut common_name = None;
    for attr in cert.subject().iter_attributes() {
        let oid = attr.attr_type().to_id_string();
        let Ok(value) = attr.as_str() else { continue };
        if oid == OID_UNIQUE_IDENTIFIER && unique_identifier.is_none() {
            unique_identifier = Some(value.to_string());
        } else if oid == OID_COMMON_NAME && common_name.is_none() {
            common_name = Some(value.to_string());
        }
    }
    // "RFC / RFC-REPRESENTANTE" on company certificates: the holder comes first
    let subject_id = unique_identifier
        .as_deref()
        .and_then(|v| v.split('/').next())
        .map(|v| v.trim().to_uppercase())
        .filter(|v| !v.is_empty())
        .or(common_name)
        .ok_or_else(|| {
            Error::MalformedCredential("certificate subject has no identifier".into())
        })?;

    let serial_number = serial_from_raw(cert.raw_serial());

    Ok(CertificateInfo {
        der,
        subject_id,
        serial_number,
        not_before,
        not_after,
    })
}

/// Accepts encrypted PKCS#8 DER (the `.key` format), PEM, or plain PKCS#8 DER
pub(super) fn decode_private_key(bytes: &[u8], passphrase: &str) -> Result<PKey<Private>> {
    if looks_like_pem(bytes) {
        return PKey::private_key_from_pem_passphrase(bytes, passphrase.as_bytes())
            .map_err(|e| Error::MalformedCredential(format!("private key PEM: {e}")));
    }
    PKey::private_key_from_pkcs8_passphrase(bytes, passphrase.as_bytes())
        .or_else(|_| PKey::private_key_from_der(bytes))
        .map_err(|e| {
            Error::MalformedCredential(format!(
                "private key could not be decoded with the given passphrase: {e}"
            ))
        })
}

/// The key pairs with the certificate when a probe signature verifies
pub(super) fn key_matches(certificate_der: &[u8], key: &PKey<Private>) -> Result<bool> {
    let public = certificate_public_key(certificate_der)?;
    if !key.public_eq(&public) {
        return Ok(false);
    }
    let signature = sign(key, MessageDigest::sha256(), PROBE)?;
    let mut verifier = Verifier::new(MessageDigest::sha256(), &public)
        .map_err(|e| Error::Signing(e.to_string()))?;
    verifier
        .verify_oneshot(&signature, PROBE)
        .map_err(|e| Error::Signing(e.to_string()))
}

pub(super) fn sign(key: &PKey<Private>, digest: MessageDigest, data: &[u8]) -> Result<Vec<u8>> {
    let mut signer = Signer::new(digest, key).map_err(|e| Error::Signing(e.to_string()))?;
    signer
        .sign_oneshot_to_vec(data)
        .map_err(|e| Error::Signing(e.to_string()))
}

fn certificate_public_key(certificate_der: &[u8]) -> Result<PKey<Public>> {
    X509::from_der(certificate_der)
        .and_then(|x509| x509.public_key())
        .map_err(|e| Error::MalformedCredential(format!("certificate public key: {e}")))
}

fn looks_like_pem(bytes: &[u8]) -> bool {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    bytes[start..].starts_with(b"-----BEGIN")
}

fn utc_from_timestamp(seconds: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_opt(seconds, 0)
        .single()
        .ok_or_else(|| Error::MalformedCredential(format!("validity timestamp {seconds}")))
}

/// SAT serials are ASCII digits encoded as the serial bytes; anything else is shown as hex
fn serial_from_raw(raw: &[u8]) -> String {
    if !raw.is_empty() && raw.iter().all(u8::is_ascii_digit) {
        return raw.iter().map(|b| char::from(*b)).collect();
    }
    raw.iter().map(|b| format!("{b:02x}")).collect()
}
