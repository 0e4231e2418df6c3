//! Canonical query attributes handed to the request signer

use super::{QueryFilter, QueryParameters};
use crate::types::DownloadType;
use std::collections::BTreeMap;

const WIRE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Remote action a query is submitted as
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryAction {
    /// Period query for issued documents
    Issued,
    /// Period query for received documents
    Received,
    /// Single document by folio fiscal
    Folio,
}

impl QueryAction {
    /// Name of the remote operation
    pub fn name(&self) -> &'static str {
        match self {
            QueryAction::Issued => "SolicitaDescargaEmitidos",
            QueryAction::Received => "SolicitaDescargaRecibidos",
            QueryAction::Folio => "SolicitaDescargaFolio",
        }
    }
}

/// Flat attribute set of a query, keyed by remote attribute name
///
/// Only attributes with a value are present, so signers can emit them verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryPayload {
    /// Remote action
    pub action: QueryAction,
    /// `Attribute name -> value`
    pub attributes: BTreeMap<&'static str, String>,
}

impl QueryPayload {
    pub(super) fn from_parameters(params: &QueryParameters, requester_rfc: &str) -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert("RfcSolicitante", requester_rfc.to_string());

        let action = match params.filter() {
            Some(QueryFilter::Document(id)) => {
                attributes.insert("Folio", id.to_string());
                QueryAction::Folio
            }
            Some(QueryFilter::Period(period)) => {
                attributes.insert(
                    "FechaInicial",
                    period.start().format(WIRE_DATE_FORMAT).to_string(),
                );
                attributes.insert(
                    "FechaFinal",
                    period.end().format(WIRE_DATE_FORMAT).to_string(),
                );
                period_action(params, requester_rfc, &mut attributes)
            }
            // validate() rejects this before a payload is built
            None => period_action(params, requester_rfc, &mut attributes),
        };

        if action != QueryAction::Folio {
            attributes.insert("TipoSolicitud", params.request_type().code().to_string());
            if let Some(code) = params.document_type().code() {
                attributes.insert("TipoComprobante", code.to_string());
            }
            if let Some(code) = params.document_status().code() {
                attributes.insert("EstadoComprobante", code.to_string());
            }
            if let Some(rfc) = params.rfc_on_behalf() {
                attributes.insert("RfcACuentaTerceros", rfc.to_string());
            }
            if let Some(complement) = params.complement() {
                attributes.insert("Complemento", complement.to_string());
            }
        }

        Self { action, attributes }
    }

    /// Attribute value by remote name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

fn period_action(
    params: &QueryParameters,
    requester_rfc: &str,
    attributes: &mut BTreeMap<&'static str, String>,
) -> QueryAction {
    let counterpart = params.rfc_match().map(ToString::to_string);
    match params.download_type() {
        DownloadType::Issued => {
            attributes.insert("RfcEmisor", requester_rfc.to_string());
            if let Some(rfc) = counterpart {
                attributes.insert("RfcReceptor", rfc);
            }
            QueryAction::Issued
        }
        DownloadType::Received => {
            attributes.insert("RfcReceptor", requester_rfc.to_string());
            if let Some(rfc) = counterpart {
                attributes.insert("RfcEmisor", rfc);
            }
            QueryAction::Received
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DateTimePeriod, DocumentId, DocumentStatus, DocumentType, RequestType, Rfc};

    #[test]
    fn received_period_with_every_filter() {
        let params = QueryParameters::create()
            .with_period(
                DateTimePeriod::from_values("2019-01-01 00:00:00", "2019-01-01 00:04:00").unwrap(),
            )
            .with_download_type(DownloadType::Received)
            .with_request_type(RequestType::Xml)
            .with_document_type(DocumentType::Nomina)
            .with_complement("nomina12")
            .with_document_status(DocumentStatus::Active)
            .with_rfc_on_behalf(Rfc::parse("XXX01010199A").unwrap())
            .with_rfc_match(Rfc::parse("AAA010101AAA").unwrap());

        let payload = params.to_payload("EKU9003173C9");
        assert_eq!(payload.action, QueryAction::Received);
        assert_eq!(payload.action.name(), "SolicitaDescargaRecibidos");
        assert_eq!(payload.get("FechaInicial"), Some("2019-01-01T00:00:00"));
        assert_eq!(payload.get("FechaFinal"), Some("2019-01-01T00:04:00"));
        assert_eq!(payload.get("RfcSolicitante"), Some("EKU9003173C9"));
        assert_eq!(payload.get("RfcReceptor"), Some("EKU9003173C9"));
        assert_eq!(payload.get("RfcEmisor"), Some("AAA010101AAA"));
        assert_eq!(payload.get("TipoSolicitud"), Some("CFDI"));
        assert_eq!(payload.get("TipoComprobante"), Some("N"));
        assert_eq!(payload.get("EstadoComprobante"), Some("Vigente"));
        assert_eq!(payload.get("RfcACuentaTerceros"), Some("XXX01010199A"));
        assert_eq!(payload.get("Complemento"), Some("nomina12"));
        assert_eq!(payload.get("Folio"), None);
    }

    #[test]
    fn issued_period_omits_unset_filters() {
        let params = QueryParameters::create().with_period(
            DateTimePeriod::from_values("2024-01-01 00:00:00", "2024-01-05 00:00:00").unwrap(),
        );
        let payload = params.to_payload("EKU9003173C9");
        assert_eq!(payload.action, QueryAction::Issued);
        assert_eq!(payload.get("RfcEmisor"), Some("EKU9003173C9"));
        assert_eq!(payload.get("TipoSolicitud"), Some("Metadata"));
        for absent in ["RfcReceptor", "TipoComprobante", "EstadoComprobante", "Complemento"] {
            assert_eq!(payload.get(absent), None, "{absent}");
        }
    }

    #[test]
    fn folio_query_carries_only_the_document() {
        let params = QueryParameters::create()
            .with_document_id(DocumentId::parse("96623061-61FE-49DE-B298-C7156476AA8B").unwrap())
            .with_document_type(DocumentType::Ingreso);
        let payload = params.to_payload("EKU9003173C9");
        assert_eq!(payload.action.name(), "SolicitaDescargaFolio");
        assert_eq!(payload.get("Folio"), Some("96623061-61fe-49de-b298-c7156476aa8b"));
        assert_eq!(payload.attributes.len(), 2);
    }
}
