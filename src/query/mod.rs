//! Filter criteria for a download request
//!
//! [`QueryParameters`] is an immutable value: every `with_*` setter consumes
//! the parameters and returns a new set. A query filters either by period or by
//! a single document identifier, never both. Setting one filter replaces the
//! other.

mod payload;

pub use payload::{QueryAction, QueryPayload};

use crate::endpoints::ServiceCategory;
use crate::error::{Error, Result};
use crate::types::{
    DateTimePeriod, DocumentId, DocumentStatus, DocumentType, DownloadType, RequestType, Rfc,
};
use serde::{Deserialize, Serialize};

/// Which documents a query selects
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QueryFilter {
    /// Documents issued or received within a period
    Period(DateTimePeriod),
    /// One document by folio fiscal
    Document(DocumentId),
}

/// Validated set of query criteria
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParameters {
    filter: Option<QueryFilter>,
    download_type: DownloadType,
    request_type: RequestType,
    document_type: DocumentType,
    complement: Option<String>,
    document_status: DocumentStatus,
    rfc_on_behalf: Option<Rfc>,
    rfc_match: Option<Rfc>,
    service_category: ServiceCategory,
}

impl QueryParameters {
    /// Defaults: no filter, issued, metadata, any type and status, CFDI category
    pub fn create() -> Self {
        Self::default()
    }

    /// Filter by period, replacing any document filter
    pub fn with_period(mut self, period: DateTimePeriod) -> Self {
        self.filter = Some(QueryFilter::Period(period));
        self
    }

    /// Filter by one document, replacing any period filter
    pub fn with_document_id(mut self, document_id: DocumentId) -> Self {
        self.filter = Some(QueryFilter::Document(document_id));
        self
    }

    /// Issued or received documents
    pub fn with_download_type(mut self, download_type: DownloadType) -> Self {
        self.download_type = download_type;
        self
    }

    /// Metadata listing or full XML
    pub fn with_request_type(mut self, request_type: RequestType) -> Self {
        self.request_type = request_type;
        self
    }

    /// Voucher type filter
    pub fn with_document_type(mut self, document_type: DocumentType) -> Self {
        self.document_type = document_type;
        self
    }

    /// Complement code filter (e.g. `nomina12`); blank clears it
    pub fn with_complement(mut self, complement: impl Into<String>) -> Self {
        let complement = complement.into().trim().to_string();
        self.complement = (!complement.is_empty()).then_some(complement);
        self
    }

    /// Document status filter
    pub fn with_document_status(mut self, document_status: DocumentStatus) -> Self {
        self.document_status = document_status;
        self
    }

    /// Third-party RFC the documents were issued on behalf of
    pub fn with_rfc_on_behalf(mut self, rfc: Rfc) -> Self {
        self.rfc_on_behalf = Some(rfc);
        self
    }

    /// Counterpart RFC: the receiver for issued documents, the issuer for received ones
    pub fn with_rfc_match(mut self, rfc: Rfc) -> Self {
        self.rfc_match = Some(rfc);
        self
    }

    /// Category the parameters are meant for
    pub fn with_service_category(mut self, category: ServiceCategory) -> Self {
        self.service_category = category;
        self
    }

    /// Active filter
    pub fn filter(&self) -> Option<&QueryFilter> {
        self.filter.as_ref()
    }

    /// Period filter, if that is the active filter
    pub fn period(&self) -> Option<&DateTimePeriod> {
        match &self.filter {
            Some(QueryFilter::Period(period)) => Some(period),
            _ => None,
        }
    }

    /// Document filter, if that is the active filter
    pub fn document_id(&self) -> Option<&DocumentId> {
        match &self.filter {
            Some(QueryFilter::Document(id)) => Some(id),
            _ => None,
        }
    }

    /// Issued or received
    pub fn download_type(&self) -> DownloadType {
        self.download_type
    }

    /// Metadata or XML
    pub fn request_type(&self) -> RequestType {
        self.request_type
    }

    /// Voucher type filter
    pub fn document_type(&self) -> DocumentType {
        self.document_type
    }

    /// Complement code filter
    pub fn complement(&self) -> Option<&str> {
        self.complement.as_deref()
    }

    /// Document status filter
    pub fn document_status(&self) -> DocumentStatus {
        self.document_status
    }

    /// Third-party RFC filter
    pub fn rfc_on_behalf(&self) -> Option<&Rfc> {
        self.rfc_on_behalf.as_ref()
    }

    /// Counterpart RFC filter
    pub fn rfc_match(&self) -> Option<&Rfc> {
        self.rfc_match.as_ref()
    }

    /// Target category
    pub fn service_category(&self) -> ServiceCategory {
        self.service_category
    }

    /// Check the parameters before anything is signed
    ///
    /// # Errors
    ///
    /// In order of precedence:
    /// - [`Error::ServiceTypeMismatch`] when the category differs from `expected`
    /// - [`Error::MissingFilter`] when neither a period nor a document is set
    /// - [`Error::InvalidPeriod`] when the period does not start before it ends
    /// - [`Error::InvalidQuery`] for received XML requests of cancelled documents,
    ///   which the remote service never fulfils
    pub fn validate(&self, expected: ServiceCategory) -> Result<()> {
        if self.service_category != expected {
            return Err(Error::ServiceTypeMismatch {
                expected,
                actual: self.service_category,
            });
        }

        match &self.filter {
            None => return Err(Error::MissingFilter),
            Some(QueryFilter::Period(period)) if period.start() >= period.end() => {
                return Err(Error::InvalidPeriod(format!(
                    "start {} must be before end {}",
                    period.start(),
                    period.end()
                )));
            }
            Some(_) => {}
        }

        if self.download_type == DownloadType::Received
            && self.request_type == RequestType::Xml
            && self.document_status == DocumentStatus::Cancelled
        {
            return Err(Error::InvalidQuery(
                "cancelled documents cannot be downloaded as XML when received".into(),
            ));
        }

        Ok(())
    }

    /// Canonical attribute set for the request signer
    pub fn to_payload(&self, requester_rfc: &str) -> QueryPayload {
        QueryPayload::from_parameters(self, requester_rfc)
    }
}
