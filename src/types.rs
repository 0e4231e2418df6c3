//! Core value types for sat-descarga-masiva

use crate::error::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// The four remote operations of the download lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Obtain a bearer token
    Authenticate,
    /// Submit download criteria
    Query,
    /// Poll a submitted request
    Verify,
    /// Retrieve a package
    Download,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Operation::Authenticate => "authenticate",
            Operation::Query => "query",
            Operation::Verify => "verify",
            Operation::Download => "download",
        };
        f.write_str(name)
    }
}

/// Opaque request identifier issued by the remote service on a successful query
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Wrap a remote request identifier, rejecting empty values
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(Error::MissingIdentifier { what: "request id" });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Borrow the identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for RequestId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

static RFC_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-ZÑ&]{3,4}[0-9]{6}[A-Z0-9]{3}$").ok());

/// Taxpayer identifier (RFC), 12 characters for companies, 13 for persons
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rfc(String);

impl Rfc {
    /// Parse and uppercase an RFC
    pub fn parse(value: &str) -> Result<Self> {
        let normalized = value.trim().to_uppercase();
        let valid = RFC_PATTERN
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(&normalized));
        if !valid {
            return Err(Error::InvalidRfc(value.to_string()));
        }
        Ok(Self(normalized))
    }

    /// Borrow the RFC
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Rfc {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Rfc> for String {
    fn from(rfc: Rfc) -> Self {
        rfc.0
    }
}

impl std::fmt::Display for Rfc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Folio fiscal of a single document (a UUID), normalized to lowercase
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(uuid::Uuid);

impl DocumentId {
    /// Parse a folio fiscal
    pub fn parse(value: &str) -> Result<Self> {
        uuid::Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|_| Error::InvalidDocumentId(value.to_string()))
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Format accepted by [`DateTimePeriod::from_values`]
pub const PERIOD_INPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Inclusive date-time range with minute granularity
///
/// Seconds are truncated on construction, so `start < end` is checked on the
/// truncated values. Deserialization goes through the same checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPeriod")]
pub struct DateTimePeriod {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

#[derive(Deserialize)]
struct RawPeriod {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TryFrom<RawPeriod> for DateTimePeriod {
    type Error = Error;

    fn try_from(raw: RawPeriod) -> Result<Self> {
        Self::new(raw.start, raw.end)
    }
}

impl DateTimePeriod {
    /// Build a period from two date-times
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        let start = truncate_to_minute(start);
        let end = truncate_to_minute(end);
        if start >= end {
            return Err(Error::InvalidPeriod(format!(
                "start {start} must be before end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Build a period from `"YYYY-MM-DD HH:MM:SS"` strings
    pub fn from_values(start: &str, end: &str) -> Result<Self> {
        let parse = |value: &str| {
            NaiveDateTime::parse_from_str(value.trim(), PERIOD_INPUT_FORMAT)
                .map_err(|e| Error::InvalidPeriod(format!("cannot parse '{value}': {e}")))
        };
        Self::new(parse(start)?, parse(end)?)
    }

    /// Build a period from calendar dates, each normalized to the start of the day
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        Self::new(start_of_day(start), start_of_day(end))
    }

    /// Period start
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Period end
    pub fn end(&self) -> NaiveDateTime {
        self.end
    }
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(chrono::NaiveTime::MIN)
}

fn truncate_to_minute(value: NaiveDateTime) -> NaiveDateTime {
    value
        .with_second(0)
        .and_then(|v| v.with_nanosecond(0))
        .unwrap_or(value)
}

/// Whether the requester is the issuer or the receiver of the documents
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadType {
    /// Documents issued by the requester
    #[default]
    Issued,
    /// Documents received by the requester
    Received,
}

impl std::str::FromStr for DownloadType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "issued" | "emitidos" => Ok(DownloadType::Issued),
            "received" | "recibidos" => Ok(DownloadType::Received),
            other => Err(Error::InvalidQuery(format!("unknown download type '{other}'"))),
        }
    }
}

/// Package content: metadata listings or full XML documents
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    /// Metadata listing
    #[default]
    Metadata,
    /// Full CFDI XML documents
    Xml,
}

impl RequestType {
    /// Wire value of `TipoSolicitud`
    pub fn code(&self) -> &'static str {
        match self {
            RequestType::Metadata => "Metadata",
            RequestType::Xml => "CFDI",
        }
    }
}

impl std::str::FromStr for RequestType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "metadata" => Ok(RequestType::Metadata),
            "xml" | "cfdi" => Ok(RequestType::Xml),
            other => Err(Error::InvalidQuery(format!("unknown request type '{other}'"))),
        }
    }
}

/// Voucher type filter (`TipoComprobante`)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    /// No filter
    #[default]
    Undefined,
    /// Ingreso (I)
    Ingreso,
    /// Egreso (E)
    Egreso,
    /// Traslado (T)
    Traslado,
    /// Nómina (N)
    Nomina,
    /// Pago (P)
    Pago,
}

impl DocumentType {
    /// Wire value, `None` when no filter applies
    pub fn code(&self) -> Option<&'static str> {
        match self {
            DocumentType::Undefined => None,
            DocumentType::Ingreso => Some("I"),
            DocumentType::Egreso => Some("E"),
            DocumentType::Traslado => Some("T"),
            DocumentType::Nomina => Some("N"),
            DocumentType::Pago => Some("P"),
        }
    }
}

impl std::str::FromStr for DocumentType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "undefined" => Ok(DocumentType::Undefined),
            "i" | "ingreso" => Ok(DocumentType::Ingreso),
            "e" | "egreso" => Ok(DocumentType::Egreso),
            "t" | "traslado" => Ok(DocumentType::Traslado),
            "n" | "nomina" => Ok(DocumentType::Nomina),
            "p" | "pago" => Ok(DocumentType::Pago),
            other => Err(Error::InvalidQuery(format!("unknown document type '{other}'"))),
        }
    }
}

/// Document status filter (`EstadoComprobante`)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// No filter
    #[default]
    Undefined,
    /// Vigente
    Active,
    /// Cancelado
    Cancelled,
}

impl DocumentStatus {
    /// Wire value, `None` when no filter applies
    pub fn code(&self) -> Option<&'static str> {
        match self {
            DocumentStatus::Undefined => None,
            DocumentStatus::Active => Some("Vigente"),
            DocumentStatus::Cancelled => Some("Cancelado"),
        }
    }
}

impl std::str::FromStr for DocumentStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "undefined" => Ok(DocumentStatus::Undefined),
            "active" | "vigente" => Ok(DocumentStatus::Active),
            "cancelled" | "canceled" | "cancelado" => Ok(DocumentStatus::Cancelled),
            other => Err(Error::InvalidQuery(format!(
                "unknown document status '{other}'"
            ))),
        }
    }
}
