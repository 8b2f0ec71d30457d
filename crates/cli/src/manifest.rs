use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use vnpay_sdk::GatewayConfig;

pub const MANIFEST_FILE_NAME: &str = "vnpay.yaml";

pub const TMN_CODE_ENV: &str = "VNPAY_TMN_CODE";
pub const SECURE_SECRET_ENV: &str = "VNPAY_SECURE_SECRET";
pub const HOST_ENV: &str = "VNPAY_HOST";

/// vnpay.yaml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// Merchant credentials and gateway settings
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Values used when a command does not supply them
    #[serde(default)]
    pub defaults: RequestDefaults,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestDefaults {
    pub ip_addr: String,

    pub return_url: Option<String>,

    /// Operator recorded as `vnp_CreateBy` on refunds
    pub create_by: Option<String>,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            ip_addr: "127.0.0.1".to_string(),
            return_url: None,
            create_by: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoadManifestError {
    #[error("{} not found at {}", MANIFEST_FILE_NAME, .0.display())]
    FileNotFound(PathBuf),
    #[error("Failed to read {}: {}", .0.display(), .1)]
    ReadError(PathBuf, std::io::Error),
    #[error("Failed to parse {}: {}", .0.display(), .1)]
    ParseError(PathBuf, serde_yml::Error),
}

impl Manifest {
    /// Load manifest from the specified file path
    pub fn load(manifest_file_path: &Path) -> Result<Self, LoadManifestError> {
        if !manifest_file_path.exists() {
            return Err(LoadManifestError::FileNotFound(
                manifest_file_path.to_path_buf(),
            ));
        }

        let content = fs::read_to_string(manifest_file_path)
            .map_err(|e| LoadManifestError::ReadError(manifest_file_path.to_path_buf(), e))?;

        let manifest: Manifest = serde_yml::from_str(&content)
            .map_err(|e| LoadManifestError::ParseError(manifest_file_path.to_path_buf(), e))?;

        Ok(manifest)
    }
}

/// Credentials given on the command line (or through the process environment)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub tmn_code: Option<String>,
    pub secure_secret: Option<String>,
    pub host: Option<String>,
    pub sandbox: bool,
    pub log: bool,
}

/// Effective gateway config: flags, then `lookup_env`, then the manifest
pub fn resolve_gateway_config(
    manifest: &Manifest,
    overrides: &Overrides,
    lookup_env: impl Fn(&str) -> Option<String>,
) -> GatewayConfig {
    let mut config = manifest.gateway.clone();

    let pick = |flag: &Option<String>, env: &str| {
        flag.clone()
            .or_else(|| lookup_env(env))
            .filter(|v| !v.trim().is_empty())
    };
    if let Some(tmn_code) = pick(&overrides.tmn_code, TMN_CODE_ENV) {
        config.tmn_code = tmn_code;
    }
    if let Some(secure_secret) = pick(&overrides.secure_secret, SECURE_SECRET_ENV) {
        config.secure_secret = secure_secret;
    }
    if let Some(host) = pick(&overrides.host, HOST_ENV) {
        config.host = host;
    }
    if overrides.sandbox {
        config.test_mode = true;
    }
    if overrides.log {
        config.enable_log = true;
    }
    config
}
