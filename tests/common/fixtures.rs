//! Generated FIEL material
//!
//! A self-signed certificate shaped like a SAT-issued one: the RFC pair in
//! x500UniqueIdentifier and a serial made of ASCII digits. The library's unit
//! tests include this file as well.

use chrono::{DateTime, Duration, Utc};
use openssl::asn1::{Asn1Time, Asn1Type};
use openssl::bn::BigNum;
use openssl::hash::MessageDigest;
use openssl::pkey::PKey;
use openssl::rsa::Rsa;
use openssl::symm::Cipher;
use openssl::x509::{X509, X509NameBuilder};
use sat_descarga_masiva::Credential;

pub const PASSPHRASE: &str = "12345678a";
pub const SUBJECT_RFC: &str = "EKU9003173C9";
pub const SERIAL: &str = "30001000000500003416";

pub struct FixtureOptions {
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    pub unique_identifier: Option<String>,
    pub common_name: String,
    pub serial: String,
}

impl Default for FixtureOptions {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            not_before: now - Duration::days(1),
            not_after: now + Duration::days(365),
            unique_identifier: Some(format!("{SUBJECT_RFC} / VADA800927DJ3")),
            common_name: "ESCUELA KEMPER URGATE SA DE CV".to_string(),
            serial: SERIAL.to_string(),
        }
    }
}

/// Certificate and key pair in every encoding the credential accepts
pub struct Fiel {
    pub certificate_der: Vec<u8>,
    pub certificate_pem: Vec<u8>,
    pub key_der_encrypted: Vec<u8>,
    pub key_pem_encrypted: Vec<u8>,
    pub key_der_plain: Vec<u8>,
}

impl Fiel {
    /// FIEL valid from yesterday for a year
    pub fn generate() -> Self {
        Self::generate_with(FixtureOptions::default())
    }

    /// FIEL valid between `not_before` and `not_after`
    pub fn generate_valid(not_before: DateTime<Utc>, not_after: DateTime<Utc>) -> Self {
        Self::generate_with(FixtureOptions {
            not_before,
            not_after,
            ..FixtureOptions::default()
        })
    }

    pub fn generate_with(options: FixtureOptions) -> Self {
        let key = PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap();

        let mut name = X509NameBuilder::new().unwrap();
        name.append_entry_by_text("CN", &options.common_name).unwrap();
        if let Some(uid) = &options.unique_identifier {
            // x500UniqueIdentifier, as a PrintableString like SAT-issued certificates
            name.append_entry_by_text_with_type("2.5.4.45", uid, Asn1Type::PRINTABLESTRING)
                .unwrap();
        }
        let name = name.build();

        // SAT serials are the ASCII digits themselves
        let serial_hex: String = options
            .serial
            .bytes()
            .map(|b| format!("{b:02x}"))
            .collect();
        let serial = BigNum::from_hex_str(&serial_hex)
            .unwrap()
            .to_asn1_integer()
            .unwrap();

        let mut builder = X509::builder().unwrap();
        builder.set_version(2).unwrap();
        builder.set_serial_number(&serial).unwrap();
        builder.set_subject_name(&name).unwrap();
        builder.set_issuer_name(&name).unwrap();
        builder
            .set_not_before(&Asn1Time::from_unix(options.not_before.timestamp()).unwrap())
            .unwrap();
        builder
            .set_not_after(&Asn1Time::from_unix(options.not_after.timestamp()).unwrap())
            .unwrap();
        builder.set_pubkey(&key).unwrap();
        builder.sign(&key, MessageDigest::sha256()).unwrap();
        let certificate = builder.build();

        Self {
            certificate_der: certificate.to_der().unwrap(),
            certificate_pem: certificate.to_pem().unwrap(),
            key_der_encrypted: key
                .private_key_to_pkcs8_passphrase(Cipher::aes_256_cbc(), PASSPHRASE.as_bytes())
                .unwrap(),
            key_pem_encrypted: key
                .private_key_to_pem_pkcs8_passphrase(Cipher::aes_256_cbc(), PASSPHRASE.as_bytes())
                .unwrap(),
            key_der_plain: key.private_key_to_pkcs8().unwrap(),
        }
    }

    /// Credential built from the encrypted DER pair
    pub fn credential(&self) -> Credential {
        Credential::create(&self.certificate_der, &self.key_der_encrypted, PASSPHRASE).unwrap()
    }
}
