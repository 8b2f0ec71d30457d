use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use url::Url;
use vnpay_types::{HashAlgorithm, Locale, constants};

use crate::error::ConfigError;

/// Gateway endpoint paths, relative to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    /// Payment page the customer is redirected to
    pub payment: String,

    /// JSON API shared by querydr and refund
    pub query_dr_refund: String,

    /// Bank list API
    pub bank_list: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            payment: constants::PAYMENT_ENDPOINT.to_string(),
            query_dr_refund: constants::QUERY_DR_REFUND_ENDPOINT.to_string(),
            bank_list: constants::BANK_LIST_ENDPOINT.to_string(),
        }
    }
}

/// Merchant configuration for the gateway client
///
/// Algorithm and locale are kept as supplied (e.g. from a config file) and are
/// checked by [`GatewayConfig::validate`] when the client is built.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Merchant terminal code (`vnp_TmnCode`)
    pub tmn_code: String,

    /// Shared secret used as the HMAC key
    #[serde(skip_serializing)]
    pub secure_secret: String,

    /// Gateway base URL
    pub host: String,

    /// Force the sandbox host regardless of `host`
    pub test_mode: bool,

    /// SHA256, SHA512 or MD5
    pub hash_algorithm: String,

    /// Default locale, vn or en
    pub locale: String,

    /// Currency code (`vnp_CurrCode`)
    pub curr_code: String,

    /// Endpoint paths
    pub endpoints: Endpoints,

    /// Timeout applied to each outbound request, in milliseconds (none by default)
    pub timeout_ms: Option<u64>,

    /// Emit a log record for every operation
    pub enable_log: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            tmn_code: String::new(),
            secure_secret: String::new(),
            host: constants::SANDBOX_HOST.to_string(),
            test_mode: false,
            hash_algorithm: HashAlgorithm::default().to_string(),
            locale: Locale::default().to_string(),
            curr_code: "VND".to_string(),
            endpoints: Endpoints::default(),
            timeout_ms: None,
            enable_log: false,
        }
    }
}

// The secret never reaches logs, even through `{:?}`
impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("tmn_code", &self.tmn_code)
            .field("secure_secret", &"[REDACTED]")
            .field("host", &self.host)
            .field("test_mode", &self.test_mode)
            .field("hash_algorithm", &self.hash_algorithm)
            .field("locale", &self.locale)
            .field("curr_code", &self.curr_code)
            .field("endpoints", &self.endpoints)
            .field("timeout_ms", &self.timeout_ms)
            .field("enable_log", &self.enable_log)
            .finish()
    }
}

impl GatewayConfig {
    /// Create a new configuration with the given merchant credentials
    pub fn new(tmn_code: impl Into<String>, secure_secret: impl Into<String>) -> Self {
        Self {
            tmn_code: tmn_code.into(),
            secure_secret: secure_secret.into(),
            ..Default::default()
        }
    }

    /// Set the gateway host
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Use the sandbox host
    pub fn with_test_mode(mut self) -> Self {
        self.test_mode = true;
        self
    }

    /// Set the hash algorithm
    pub fn with_hash_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.hash_algorithm = algorithm.into();
        self
    }

    /// Set the default locale
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Set the currency code
    pub fn with_curr_code(mut self, curr_code: impl Into<String>) -> Self {
        self.curr_code = curr_code.into();
        self
    }

    /// Override endpoint paths
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Bound every outbound request by `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Enable operation logging
    pub fn with_logging(mut self) -> Self {
        self.enable_log = true;
        self
    }

    /// Check credentials, algorithm, locale and host. Pure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut missing = Vec::new();
        if self.tmn_code.trim().is_empty() {
            missing.push("tmn_code");
        }
        if self.secure_secret.is_empty() {
            missing.push("secure_secret");
        }
        if !missing.is_empty() {
            return Err(ConfigError::MissingField(missing));
        }

        self.hash_algorithm
            .parse::<HashAlgorithm>()
            .map_err(|_| ConfigError::UnsupportedAlgorithm(self.hash_algorithm.clone()))?;
        self.locale
            .parse::<Locale>()
            .map_err(|_| ConfigError::UnsupportedLocale(self.locale.clone()))?;
        parse_host(self.effective_host())?;

        Ok(())
    }

    /// Host actually used for requests
    pub fn effective_host(&self) -> &str {
        if self.test_mode {
            constants::SANDBOX_HOST
        } else {
            &self.host
        }
    }

    /// Validate and freeze into the typed settings the client runs on
    pub(crate) fn resolve(self) -> Result<Settings, ConfigError> {
        self.validate()?;
        let hash_algorithm = self
            .hash_algorithm
            .parse()
            .map_err(|_| ConfigError::UnsupportedAlgorithm(self.hash_algorithm.clone()))?;
        let locale = self
            .locale
            .parse()
            .map_err(|_| ConfigError::UnsupportedLocale(self.locale.clone()))?;
        let host = parse_host(self.effective_host())?;

        Ok(Settings {
            tmn_code: self.tmn_code,
            secure_secret: self.secure_secret,
            host,
            hash_algorithm,
            locale,
            curr_code: self.curr_code,
            endpoints: self.endpoints,
            timeout: self.timeout_ms.map(Duration::from_millis),
            enable_log: self.enable_log,
        })
    }
}

fn parse_host(host: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(host).map_err(|_| ConfigError::InvalidHost(host.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(ConfigError::InvalidHost(host.to_string()));
    }
    Ok(url)
}

/// Validated configuration owned by the client
pub(crate) struct Settings {
    pub tmn_code: String,
    pub secure_secret: String,
    pub host: Url,
    pub hash_algorithm: HashAlgorithm,
    pub locale: Locale,
    pub curr_code: String,
    pub endpoints: Endpoints,
    pub timeout: Option<Duration>,
    pub enable_log: bool,
}

impl Settings {
    /// Join an endpoint path onto the host
    pub fn endpoint_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.host.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = GatewayConfig::new("TMN01", "secret").with_hash_algorithm("sha256");
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_timeout_saturates() {
        let config = GatewayConfig::new("TMN01", "secret").with_timeout(Duration::from_secs(5));
        assert_eq!(config.timeout_ms, Some(5_000));
        let config = GatewayConfig::new("TMN01", "secret").with_timeout(Duration::MAX);
        assert_eq!(config.timeout_ms, Some(u64::MAX));
    }

    #[test]
    fn test_missing_fields_reported_together() {
        let config = GatewayConfig::default();
        assert_eq!(
            config.validate(),
            Err(ConfigError::MissingField(vec!["tmn_code", "secure_secret"]))
        );

        let config = GatewayConfig::new("TMN01", "");
        assert_eq!(
            config.validate(),
            Err(ConfigError::MissingField(vec!["secure_secret"]))
        );
    }

    #[test]
    fn test_unsupported_algorithm() {
        let config = GatewayConfig::new("TMN01", "secret").with_hash_algorithm("SHA1");
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnsupportedAlgorithm("SHA1".to_string()))
        );
    }

    #[test]
    fn test_unsupported_locale() {
        let config = GatewayConfig::new("TMN01", "secret").with_locale("fr");
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnsupportedLocale("fr".to_string()))
        );
    }

    #[test]
    fn test_invalid_host() {
        let config = GatewayConfig::new("TMN01", "secret").with_host("not a url");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidHost(_))
        ));

        let config = GatewayConfig::new("TMN01", "secret").with_host("ftp://example.com");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidHost(_))
        ));
    }

    #[test]
    fn test_test_mode_forces_sandbox() {
        let config = GatewayConfig::new("TMN01", "secret")
            .with_host(constants::PRODUCTION_HOST)
            .with_test_mode();
        assert_eq!(config.effective_host(), constants::SANDBOX_HOST);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = GatewayConfig::new("TMN01", "super-secret-value");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret-value"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: GatewayConfig =
            serde_json::from_str(r#"{"tmn_code":"TMN01","secure_secret":"s"}"#).unwrap();
        assert_eq!(config.hash_algorithm, "SHA512");
        assert_eq!(config.locale, "vn");
        assert_eq!(config.endpoints, Endpoints::default());
        assert_eq!(config.timeout_ms, None);
    }

    #[test]
    fn test_endpoint_url_joins_cleanly() {
        let settings = GatewayConfig::new("TMN01", "secret")
            .with_host("https://sandbox.vnpayment.vn/")
            .resolve()
            .unwrap();
        assert_eq!(
            settings.endpoint_url("/paymentv2/vpcpay.html"),
            "https://sandbox.vnpayment.vn/paymentv2/vpcpay.html"
        );
    }
}
