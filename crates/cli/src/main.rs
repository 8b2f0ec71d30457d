use std::{
    path::{Path, PathBuf},
    process,
};

use clap::{Parser, Subcommand};
use vnpay_sdk::VnpayClient;

mod banks;
mod manifest;
mod payment;
mod transaction;

use manifest::{Manifest, Overrides};

#[derive(Clone, Debug)]
pub struct Context {
    pub manifest: Manifest,
    pub overrides: Overrides,
}

impl Context {
    pub fn new(manifest: Manifest, overrides: Overrides) -> Self {
        Context {
            manifest,
            overrides,
        }
    }

    /// Build a client from the manifest, the environment and the flags
    pub fn client(&self) -> anyhow::Result<VnpayClient> {
        let config = manifest::resolve_gateway_config(&self.manifest, &self.overrides, |key| {
            std::env::var(key).ok()
        });
        Ok(VnpayClient::new(config)?)
    }
}

#[derive(Parser, Debug)]
#[clap(author, version, about = "VNPay - payment gateway operator CLI", long_about = None)]
struct Opts {
    /// Path to the vnpay.yaml manifest file
    #[arg(
        long = "manifest-path",
        short = 'm',
        global = true,
        default_value = "./vnpay.yaml"
    )]
    manifest_path: PathBuf,

    /// Merchant terminal code
    #[arg(long = "tmn-code", global = true, env = "VNPAY_TMN_CODE")]
    tmn_code: Option<String>,

    /// Shared secret used to sign and verify
    #[arg(
        long = "secure-secret",
        global = true,
        env = "VNPAY_SECURE_SECRET",
        hide_env_values = true
    )]
    secure_secret: Option<String>,

    /// Gateway host, e.g. https://pay.vnpay.vn
    #[arg(long = "host", global = true, env = "VNPAY_HOST")]
    host: Option<String>,

    /// Use the sandbox gateway
    #[arg(long = "sandbox", short = 's', global = true, default_value = "false")]
    sandbox: bool,

    /// Emit an operation log record for every gateway call
    #[arg(long = "log", global = true, default_value = "false")]
    log: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, PartialEq, Clone, Debug)]
enum Command {
    /// Build a signed payment URL
    BuildUrl(payment::BuildUrlCommand),
    /// Verify a return URL or IPN query string
    Verify(payment::VerifyCommand),
    /// Print the IPN acknowledgement vocabulary
    IpnCodes(payment::IpnCodesCommand),
    /// Query the state of a transaction (querydr)
    Query(transaction::QueryCommand),
    /// Refund a transaction
    Refund(transaction::RefundCommand),
    /// List banks enabled for the merchant
    Banks(banks::BanksCommand),
}

#[tokio::main]
async fn main() {
    let opts: Opts = match Opts::try_parse() {
        Ok(opts) => opts,
        Err(e) => {
            let _ = e.print();
            process::exit(e.exit_code());
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn,vnpay=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let manifest_dir = opts
        .manifest_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();

    // Load environment variables from .env file in manifest directory
    load_env_file(&manifest_dir);

    let manifest = match Manifest::load(&opts.manifest_path) {
        Ok(manifest) => {
            eprintln!("✓ Loaded manifest from {}", opts.manifest_path.display());
            manifest
        }
        Err(manifest::LoadManifestError::FileNotFound(_)) => Manifest::default(),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let overrides = Overrides {
        tmn_code: opts.tmn_code.clone(),
        secure_secret: opts.secure_secret.clone(),
        host: opts.host.clone(),
        sandbox: opts.sandbox,
        log: opts.log,
    };
    let ctx = Context::new(manifest, overrides);

    if let Err(e) = handle_command(opts.command, &ctx).await {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Load environment variables from .env file in the manifest directory
fn load_env_file(manifest_dir: &Path) {
    let env_file_path = manifest_dir.join(".env");

    match dotenvy::from_path(&env_file_path) {
        Ok(_) => {
            eprintln!("✓ Loaded environment from {}", env_file_path.display());
        }
        Err(e) if e.not_found() => {}
        Err(e) => {
            eprintln!(
                "Warning: Failed to load .env file at {}: {}",
                env_file_path.display(),
                e
            );
        }
    }
}

async fn handle_command(command: Command, ctx: &Context) -> anyhow::Result<()> {
    match command {
        Command::BuildUrl(cmd) => cmd.execute(ctx),
        Command::Verify(cmd) => cmd.execute(ctx),
        Command::IpnCodes(cmd) => cmd.execute(),
        Command::Query(cmd) => cmd.execute(ctx).await,
        Command::Refund(cmd) => cmd.execute(ctx).await,
        Command::Banks(cmd) => cmd.execute(ctx).await,
    }
}
