use std::{fmt, future::Future, sync::Arc};

use url::Url;
use vnpay_types::{HashAlgorithm, Locale};

use crate::{
    config::{GatewayConfig, Settings},
    error::{ConfigError, GatewayError, Result, TransportError},
    hash::SecureHasher,
    logger::GatewayLogger,
};

/// VNPay gateway client
///
/// Construction validates the configuration and fails fast. Signing and
/// verification are synchronous and pure; `query_dr`, `refund` and
/// `get_bank_list` each issue exactly one HTTP request, without retries.
///
/// The client is cheap to clone and can be shared across tasks.
///
/// # Example
///
/// ```ignore
/// use vnpay_sdk::{GatewayConfig, PaymentRequest, VnpayClient};
///
/// let client = VnpayClient::new(
///     GatewayConfig::new("TMNCODE", "secret").with_test_mode(),
/// )?;
///
/// let url = client.build_payment_url(
///     &PaymentRequest::new(100_000, "ORDER1", "127.0.0.1", "https://shop.example/return"),
/// )?;
/// ```
#[derive(Clone)]
pub struct VnpayClient {
    pub(crate) settings: Arc<Settings>,

    /// Payment page URL, without query
    pub(crate) payment_url: Url,

    pub(crate) hasher: SecureHasher,

    /// HTTP client for querydr / refund / bank list
    pub(crate) http_client: reqwest::Client,

    pub(crate) logger: GatewayLogger,
}

impl fmt::Debug for VnpayClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VnpayClient")
            .field("tmn_code", &self.settings.tmn_code)
            .field("host", &self.settings.host.as_str())
            .field("hash_algorithm", &self.settings.hash_algorithm)
            .field("locale", &self.settings.locale)
            .finish_non_exhaustive()
    }
}

impl VnpayClient {
    /// Validate `config` and build a client
    pub fn new(config: GatewayConfig) -> std::result::Result<Self, ConfigError> {
        let settings = config.resolve()?;

        let payment_url = Url::parse(&settings.endpoint_url(&settings.endpoints.payment))
            .map_err(|_| ConfigError::InvalidHost(settings.endpoint_url(&settings.endpoints.payment)))?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        let hasher = SecureHasher::new(settings.secure_secret.clone(), settings.hash_algorithm);
        let logger = if settings.enable_log {
            GatewayLogger::tracing()
        } else {
            GatewayLogger::disabled()
        };

        Ok(Self {
            settings: Arc::new(settings),
            payment_url,
            hasher,
            http_client,
            logger,
        })
    }

    /// Replace the operation logger
    pub fn with_logger(mut self, logger: GatewayLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Use a caller-managed HTTP client (pooling, proxies, timeouts)
    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = http_client;
        self
    }

    pub fn tmn_code(&self) -> &str {
        &self.settings.tmn_code
    }

    pub fn host(&self) -> &Url {
        &self.settings.host
    }

    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.settings.hash_algorithm
    }

    pub fn locale(&self) -> Locale {
        self.settings.locale
    }

    pub fn curr_code(&self) -> &str {
        &self.settings.curr_code
    }

    /// Full URL of a configured endpoint path
    pub(crate) fn endpoint(&self, path: &str) -> String {
        self.settings.endpoint_url(path)
    }
}

/// Turn a non-2xx response into [`TransportError::Status`]
pub(crate) async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(TransportError::Status {
            status: status.as_u16(),
            body,
        }
        .into());
    }
    Ok(response)
}

/// Run `request` unless `cancel` resolves first
pub(crate) async fn cancellable<T>(
    request: impl Future<Output = Result<T>>,
    cancel: impl Future<Output = ()>,
) -> Result<T> {
    tokio::select! {
        result = request => result,
        _ = cancel => Err(GatewayError::Transport(TransportError::Cancelled)),
    }
}
