use thiserror::Error;

/// Invalid client configuration, raised by [`crate::VnpayClient::new`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Required fields are empty or absent
    #[error("Missing required config fields: {}", .0.join(", "))]
    MissingField(Vec<&'static str>),

    /// Hash algorithm is not SHA256, SHA512 or MD5
    #[error("Unsupported hash algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Locale is not vn or en
    #[error("Unsupported locale: {0}")]
    UnsupportedLocale(String),

    /// Gateway host is not an absolute http(s) URL
    #[error("Invalid gateway host: {0}")]
    InvalidHost(String),

    /// HTTP client could not be built (e.g. TLS backend unavailable)
    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

/// Caller-supplied data rejected before any signing or network work
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Amount is zero, negative, non-numeric, fractional or overflows once scaled
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Date is not a `yyyyMMddHHmmss` string
    #[error("Invalid date format for {field}: {value:?} (expected yyyyMMddHHmmss)")]
    BadDateFormat { field: &'static str, value: String },

    /// A required field is empty or absent
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Refund transaction type is not 02 (full) or 03 (partial)
    #[error("Invalid refund transaction type: {0}")]
    InvalidTransactionType(String),
}

/// Network or HTTP-level failure. Usually safe to retry.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Gateway answered with a non-2xx status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Request timed out
    #[error("Timeout")]
    Timeout,

    /// Connection could not be established or was interrupted
    #[error("Connection error: {0}")]
    Connection(#[source] reqwest::Error),

    /// Caller cancelled the request
    #[error("Cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Connection(err)
        }
    }
}

/// Errors that can occur in gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Validation error (bad input, nothing was sent)
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Transport error (request did not complete with a 2xx status)
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Protocol error (gateway response could not be understood)
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Protocol(err.to_string())
    }
}

impl GatewayError {
    /// Transport failures may be retried by the caller; nothing else should be
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayError::Transport(_))
    }
}

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_lists_all() {
        let err = ConfigError::MissingField(vec!["tmn_code", "secure_secret"]);
        assert_eq!(
            err.to_string(),
            "Missing required config fields: tmn_code, secure_secret"
        );
    }

    #[test]
    fn test_only_transport_is_retryable() {
        assert!(GatewayError::Transport(TransportError::Timeout).is_retryable());
        assert!(!GatewayError::Protocol("bad json".to_string()).is_retryable());
        assert!(
            !GatewayError::Validation(ValidationError::MissingField("vnp_TxnRef")).is_retryable()
        );
    }
}
