//! Key/value records with typed accessors
//!
//! Remote responses and metadata rows are flat sets of named values whose key
//! set grows over time. [`FieldMap`] keeps every pair in arrival order; the
//! wrappers add typed accessors for the keys that are stable today while
//! [`FieldMap::get`] stays available for anything newer.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Ordered key/value pairs, last write wins per key
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldMap {
    entries: Vec<(String, String)>,
}

impl FieldMap {
    /// Empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value, keeping the original position of the key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Value for a key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Non-blank value for a key
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    /// All pairs keyed by name
    pub fn all(&self) -> BTreeMap<&str, &str> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    /// Iterate pairs in arrival order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no keys
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = FieldMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Keys of the response fields the library interprets
pub mod keys {
    /// Envelope status code
    pub const STATUS_CODE: &str = "CodEstatus";
    /// Envelope message
    pub const MESSAGE: &str = "Mensaje";
    /// Request identifier issued by a query
    pub const REQUEST_ID: &str = "IdSolicitud";
    /// Lifecycle state of the request
    pub const STATUS_REQUEST: &str = "EstadoSolicitud";
    /// Request-level outcome detail
    pub const CODE_REQUEST: &str = "CodigoEstadoSolicitud";
    /// Number of documents in the request
    pub const NUMBER_CFDIS: &str = "NumeroCFDIs";
    /// Authentication token value
    pub const TOKEN: &str = "AutenticaResult";
    /// Token creation instant
    pub const CREATED: &str = "Created";
    /// Token expiry instant
    pub const EXPIRES: &str = "Expires";
}

/// Decoded fields of a remote response
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseFields(FieldMap);

impl ResponseFields {
    /// Wrap a field map
    pub fn new(fields: FieldMap) -> Self {
        Self(fields)
    }

    /// Underlying map, for keys without a typed accessor
    pub fn map(&self) -> &FieldMap {
        &self.0
    }

    /// Generic lookup
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key)
    }

    /// `CodEstatus`, if present and numeric
    pub fn status_code(&self) -> Option<i32> {
        self.parse_int(keys::STATUS_CODE)
    }

    /// `Mensaje`
    pub fn message(&self) -> Option<&str> {
        self.0.get(keys::MESSAGE)
    }

    /// `IdSolicitud`, if non-blank
    pub fn request_id(&self) -> Option<&str> {
        self.0.get_non_empty(keys::REQUEST_ID)
    }

    /// `EstadoSolicitud`, raw
    pub fn status_request(&self) -> Option<i32> {
        self.parse_int(keys::STATUS_REQUEST)
    }

    /// `CodigoEstadoSolicitud`, raw
    pub fn code_request(&self) -> Option<i32> {
        self.parse_int(keys::CODE_REQUEST)
    }

    /// `NumeroCFDIs`
    pub fn number_cfdis(&self) -> Option<u64> {
        self.0.get_non_empty(keys::NUMBER_CFDIS)?.parse().ok()
    }

    /// Authentication token value, if non-blank
    pub fn token(&self) -> Option<&str> {
        self.0.get_non_empty(keys::TOKEN)
    }

    /// Token creation instant
    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.parse_instant(keys::CREATED)
    }

    /// Token expiry instant
    pub fn expires(&self) -> Option<DateTime<Utc>> {
        self.parse_instant(keys::EXPIRES)
    }

    fn parse_int(&self, key: &str) -> Option<i32> {
        self.0.get_non_empty(key)?.parse().ok()
    }

    fn parse_instant(&self, key: &str) -> Option<DateTime<Utc>> {
        let raw = self.0.get_non_empty(key)?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

impl From<FieldMap> for ResponseFields {
    fn from(fields: FieldMap) -> Self {
        Self(fields)
    }
}

/// One row of a metadata package listing
///
/// Typed accessors cover the columns published as of 2019-08-01; use
/// [`MetadataItem::get`] or [`MetadataItem::all`] for columns added later.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetadataItem(FieldMap);

macro_rules! metadata_accessors {
    ($($(#[$doc:meta])* $name:ident => $key:literal),* $(,)?) => {
        impl MetadataItem {
            $(
                $(#[$doc])*
                pub fn $name(&self) -> Option<&str> {
                    self.0.get($key)
                }
            )*
        }
    };
}

metadata_accessors! {
    /// Folio fiscal
    uuid => "uuid",
    /// Issuer RFC
    rfc_emisor => "rfcEmisor",
    /// Issuer name
    nombre_emisor => "nombreEmisor",
    /// Receiver RFC
    rfc_receptor => "rfcReceptor",
    /// Receiver name
    nombre_receptor => "nombreReceptor",
    /// Certifying provider RFC
    rfc_pac => "rfcPac",
    /// Issue date
    fecha_emision => "fechaEmision",
    /// Certification date
    fecha_certificacion_sat => "fechaCertificacionSat",
    /// Total amount
    monto => "monto",
    /// Voucher effect (I, E, T, N, P)
    efecto_comprobante => "efectoComprobante",
    /// Status ("1" active, "0" cancelled)
    estatus => "estatus",
    /// Cancellation date
    fecha_cancelacion => "fechaCancelacion",
    /// Third party RFC
    rfc_a_cuenta_terceros => "rfcACuentaTerceros",
    /// Third party name
    nombre_a_cuenta_terceros => "nombreACuentaTerceros",
}

impl MetadataItem {
    /// Wrap a row
    pub fn new(fields: FieldMap) -> Self {
        Self(fields)
    }

    /// Generic lookup
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key)
    }

    /// All columns
    pub fn all(&self) -> BTreeMap<&str, &str> {
        self.0.all()
    }

    /// Iterate columns in source order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter()
    }

    /// Whether the document is reported as active
    pub fn is_active(&self) -> bool {
        self.estatus().map(str::trim) == Some("1")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MetadataItem {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
