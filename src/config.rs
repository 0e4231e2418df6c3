//! Configuration types for sat-descarga-masiva

use crate::endpoints::{ServiceCategory, ServiceEndpoints};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level configuration
///
/// Every section has defaults, so `{}` is a valid configuration targeting the
/// production CFDI endpoints.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Service category, endpoints and token lifetime
    #[serde(default)]
    pub service: ServiceConfig,

    /// HTTP client settings for [`crate::transport::HttpTransport`]
    #[serde(default)]
    pub http: HttpConfig,

    /// Settings for [`crate::token::TokenCache`]
    #[serde(default)]
    pub token_cache: TokenCacheConfig,
}

impl Config {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges and endpoint URLs
    pub fn validate(&self) -> Result<()> {
        if self.service.token_lifetime.is_zero() {
            return Err(Error::Config {
                message: "token lifetime must be greater than zero".into(),
                key: Some("service.token_lifetime".into()),
            });
        }
        if self.http.timeout.is_zero() {
            return Err(Error::Config {
                message: "HTTP timeout must be greater than zero".into(),
                key: Some("http.timeout".into()),
            });
        }
        if self.http.connect_timeout > self.http.timeout {
            return Err(Error::Config {
                message: format!(
                    "connect timeout ({}s) exceeds request timeout ({}s)",
                    self.http.connect_timeout.as_secs(),
                    self.http.timeout.as_secs()
                ),
                key: Some("http.connect_timeout".into()),
            });
        }
        if self.token_cache.refresh_margin >= self.service.token_lifetime {
            return Err(Error::Config {
                message: "token refresh margin must be shorter than the token lifetime".into(),
                key: Some("token_cache.refresh_margin".into()),
            });
        }
        self.service.endpoints()?;
        Ok(())
    }
}

/// Service binding
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Category the service is bound to (default: cfdi)
    #[serde(default)]
    pub category: ServiceCategory,

    /// Lifetime requested when authenticating (default: 5 minutes)
    #[serde(default = "default_token_lifetime", with = "duration_serde")]
    pub token_lifetime: Duration,

    /// Replacement URLs, e.g. for a staging environment (default: production)
    #[serde(default)]
    pub endpoints: Option<EndpointOverrides>,
}

impl ServiceConfig {
    /// Endpoints the service should use
    pub fn endpoints(&self) -> Result<ServiceEndpoints> {
        match &self.endpoints {
            Some(urls) => ServiceEndpoints::custom(
                self.category,
                &urls.authenticate,
                &urls.query,
                &urls.verify,
                &urls.download,
            ),
            None => Ok(ServiceEndpoints::for_category(self.category).clone()),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            category: ServiceCategory::default(),
            token_lifetime: default_token_lifetime(),
            endpoints: None,
        }
    }
}

/// Custom operation URLs
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointOverrides {
    /// Authentication URL
    pub authenticate: String,
    /// Query URL
    pub query: String,
    /// Verify URL
    pub verify: String,
    /// Download URL
    pub download: String,
}

/// HTTP client settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Whole-request timeout (default: 60 seconds)
    #[serde(default = "default_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// TCP/TLS connect timeout (default: 10 seconds)
    #[serde(default = "default_connect_timeout", with = "duration_serde")]
    pub connect_timeout: Duration,

    /// `User-Agent` header
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Token cache settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenCacheConfig {
    /// Tokens expiring within this margin are refreshed (default: 30 seconds)
    #[serde(default = "default_refresh_margin", with = "duration_serde")]
    pub refresh_margin: Duration,
}

impl Default for TokenCacheConfig {
    fn default() -> Self {
        Self {
            refresh_margin: default_refresh_margin(),
        }
    }
}

fn default_token_lifetime() -> Duration {
    Duration::from_secs(5 * 60)
}

fn default_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_user_agent() -> String {
    format!("sat-descarga-masiva/{}", env!("CARGO_PKG_VERSION"))
}

fn default_refresh_margin() -> Duration {
    Duration::from_secs(30)
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
