//! Operation log records and the sinks they are written to.
//!
//! Logging observes operations and never influences them: a disabled logger is
//! a no-op and sink failures are reported through `tracing` and dropped. The
//! shared secret is never put into a [`LogRecord`]; `vnp_SecureHash` is only
//! kept when the policy explicitly asks for it.

use std::{fmt, sync::Arc};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{info, warn};
use vnpay_types::constants::fields;

/// Fields carrying the secure hash; dropped unless picked or `All` is used
const HASH_BEARING_FIELDS: [&str; 2] = [fields::SECURE_HASH, "paymentUrl"];

/// Flat snapshot of one completed operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    pub method: String,

    #[serde(flatten)]
    pub fields: IndexMap<String, JsonValue>,
}

impl LogRecord {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            created_at: Utc::now(),
            method: method.into(),
            fields: IndexMap::new(),
        }
    }

    /// Add a field; values that fail to serialize are recorded as null
    pub fn with_field(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(JsonValue::Null);
        self.fields.insert(key.into(), value);
        self
    }

    pub fn with_fields<I, K>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, JsonValue)>,
        K: Into<String>,
    {
        self.fields
            .extend(fields.into_iter().map(|(k, v)| (k.into(), v)));
        self
    }
}

/// Which record fields reach the sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldPolicy {
    /// Every field, including the secure hash
    All,
    /// Every field except these. Hash-bearing fields are always dropped.
    Omit(Vec<String>),
    /// Only these fields
    Pick(Vec<String>),
}

impl Default for FieldPolicy {
    fn default() -> Self {
        FieldPolicy::Omit(Vec::new())
    }
}

impl FieldPolicy {
    pub fn omit<I: IntoIterator<Item = S>, S: Into<String>>(keys: I) -> Self {
        FieldPolicy::Omit(keys.into_iter().map(Into::into).collect())
    }

    pub fn pick<I: IntoIterator<Item = S>, S: Into<String>>(keys: I) -> Self {
        FieldPolicy::Pick(keys.into_iter().map(Into::into).collect())
    }

    pub fn apply(&self, mut record: LogRecord) -> LogRecord {
        match self {
            FieldPolicy::All => {}
            FieldPolicy::Omit(keys) => record
                .fields
                .retain(|k, _| !HASH_BEARING_FIELDS.contains(&k.as_str()) && !keys.contains(k)),
            FieldPolicy::Pick(keys) => record.fields.retain(|k, _| keys.contains(k)),
        }
        record
    }
}

#[derive(Error, Debug)]
#[error("log sink error: {0}")]
pub struct LogError(pub String);

/// Destination of log records
pub trait LogSink: Send + Sync {
    fn emit(&self, record: &LogRecord) -> Result<(), LogError>;
}

/// Writes records as structured `tracing` events under the `vnpay` target
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&self, record: &LogRecord) -> Result<(), LogError> {
        let fields = serde_json::to_string(&record.fields).map_err(|e| LogError(e.to_string()))?;
        info!(
            target: "vnpay",
            method = %record.method,
            created_at = %record.created_at.to_rfc3339(),
            fields = %fields,
            "Gateway operation"
        );
        Ok(())
    }
}

/// Adapts a closure into a sink
pub struct FnSink<F>(pub F);

impl<F> LogSink for FnSink<F>
where
    F: Fn(&LogRecord) -> Result<(), LogError> + Send + Sync,
{
    fn emit(&self, record: &LogRecord) -> Result<(), LogError> {
        (self.0)(record)
    }
}

/// Filters records through a [`FieldPolicy`] and forwards them to a sink
#[derive(Clone)]
pub struct GatewayLogger {
    enabled: bool,
    policy: FieldPolicy,
    sink: Arc<dyn LogSink>,
}

impl fmt::Debug for GatewayLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayLogger")
            .field("enabled", &self.enabled)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl Default for GatewayLogger {
    fn default() -> Self {
        Self::disabled()
    }
}

impl GatewayLogger {
    /// Enabled logger writing to `sink`
    pub fn new(sink: impl LogSink + 'static) -> Self {
        Self {
            enabled: true,
            policy: FieldPolicy::default(),
            sink: Arc::new(sink),
        }
    }

    /// Enabled logger writing to `tracing`
    pub fn tracing() -> Self {
        Self::new(TracingSink)
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            policy: FieldPolicy::default(),
            sink: Arc::new(TracingSink),
        }
    }

    pub fn with_policy(mut self, policy: FieldPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Emit `record`. Never fails.
    pub fn log(&self, record: LogRecord) {
        if !self.enabled {
            return;
        }
        let record = self.policy.apply(record);
        if let Err(e) = self.sink.emit(&record) {
            warn!(method = %record.method, error = %e, "Failed to write gateway log record");
        }
    }
}
