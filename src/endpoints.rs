//! Service categories and their operation endpoints

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Document domain a [`crate::Service`] is bound to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceCategory {
    /// Electronic invoices (CFDI)
    #[default]
    Cfdi,
    /// Withholding certificates (CFDI de retenciones)
    Retenciones,
}

impl ServiceCategory {
    /// Stable category code
    pub fn code(&self) -> &'static str {
        match self {
            ServiceCategory::Cfdi => "cfdi",
            ServiceCategory::Retenciones => "retenciones",
        }
    }
}

impl std::fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for ServiceCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "cfdi" | "invoices" => Ok(ServiceCategory::Cfdi),
            "retenciones" | "retentions" => Ok(ServiceCategory::Retenciones),
            other => Err(Error::UnknownServiceCategory(other.to_string())),
        }
    }
}

/// The four operation URLs of one service category
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEndpoints {
    /// Category these endpoints serve
    pub category: ServiceCategory,
    /// Authentication endpoint
    pub authenticate: String,
    /// Query (download request) endpoint
    pub query: String,
    /// Verify endpoint
    pub verify: String,
    /// Package download endpoint
    pub download: String,
}

static CFDI_ENDPOINTS: LazyLock<ServiceEndpoints> = LazyLock::new(|| ServiceEndpoints {
    category: ServiceCategory::Cfdi,
    authenticate: "https://cfdidescargamasivasolicitud.clouda.sat.gob.mx/Autenticacion/Autenticacion.svc".into(),
    query: "https://cfdidescargamasivasolicitud.clouda.sat.gob.mx/SolicitaDescargaService.svc".into(),
    verify: "https://cfdidescargamasivasolicitud.clouda.sat.gob.mx/VerificaSolicitudDescargaService.svc".into(),
    download: "https://cfdidescargamasiva.clouda.sat.gob.mx/DescargaMasivaService.svc".into(),
});

static RETENCIONES_ENDPOINTS: LazyLock<ServiceEndpoints> = LazyLock::new(|| ServiceEndpoints {
    category: ServiceCategory::Retenciones,
    authenticate: "https://retendescargamasivasolicitud.clouda.sat.gob.mx/Autenticacion/Autenticacion.svc".into(),
    query: "https://retendescargamasivasolicitud.clouda.sat.gob.mx/SolicitaDescargaService.svc".into(),
    verify: "https://retendescargamasivasolicitud.clouda.sat.gob.mx/VerificaSolicitudDescargaService.svc".into(),
    download: "https://retencionesdescargamasiva.clouda.sat.gob.mx/DescargaMasivaService.svc".into(),
});

impl ServiceEndpoints {
    /// Production endpoints for a category
    pub fn for_category(category: ServiceCategory) -> &'static ServiceEndpoints {
        match category {
            ServiceCategory::Cfdi => &CFDI_ENDPOINTS,
            ServiceCategory::Retenciones => &RETENCIONES_ENDPOINTS,
        }
    }

    /// Production CFDI endpoints
    pub fn cfdi() -> &'static ServiceEndpoints {
        Self::for_category(ServiceCategory::Cfdi)
    }

    /// Production retenciones endpoints
    pub fn retenciones() -> &'static ServiceEndpoints {
        Self::for_category(ServiceCategory::Retenciones)
    }

    /// Endpoints pointing somewhere else (staging, mock servers)
    ///
    /// Every URL must be absolute http(s).
    pub fn custom(
        category: ServiceCategory,
        authenticate: &str,
        query: &str,
        verify: &str,
        download: &str,
    ) -> Result<Self> {
        Ok(Self {
            category,
            authenticate: checked_url("authenticate", authenticate)?,
            query: checked_url("query", query)?,
            verify: checked_url("verify", verify)?,
            download: checked_url("download", download)?,
        })
    }
}

fn checked_url(key: &str, value: &str) -> Result<String> {
    let parsed = url::Url::parse(value).map_err(|e| Error::Config {
        message: format!("invalid {key} endpoint '{value}': {e}"),
        key: Some(format!("endpoints.{key}")),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::Config {
            message: format!("{key} endpoint must use http or https, got '{value}'"),
            key: Some(format!("endpoints.{key}")),
        });
    }
    Ok(parsed.to_string())
}
