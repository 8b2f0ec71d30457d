use anyhow::{Context as _, anyhow};
use chrono::Duration;
use console::style;
use vnpay_sdk::{
    BankCode, FieldMap, IpnResponse, Locale, OrderLookup, PaymentRequest, ProductCode,
    ValidationError, VerificationResult, date, field_map_from_pairs,
};

use crate::Context;

#[derive(Debug, Clone, PartialEq, clap::Args)]
pub struct BuildUrlCommand {
    /// Amount in major units (VND), scaled by 100 on the wire
    #[arg(long)]
    pub amount: u64,

    /// Merchant order reference
    #[arg(long = "txn-ref")]
    pub txn_ref: String,

    /// Order description
    #[arg(long = "order-info")]
    pub order_info: Option<String>,

    /// Customer IP address (defaults to the manifest value)
    #[arg(long = "ip-addr")]
    pub ip_addr: Option<String>,

    /// Where the customer is sent back to (defaults to the manifest value)
    #[arg(long = "return-url")]
    pub return_url: Option<String>,

    /// Preselect a bank or method, e.g. VNPAYQR, VNBANK, INTCARD, NCB
    #[arg(long = "bank-code")]
    pub bank_code: Option<String>,

    /// Payment page language, vn or en
    #[arg(long)]
    pub locale: Option<Locale>,

    /// Product category, e.g. other, billpayment, topup, fashion
    #[arg(long = "order-type")]
    pub order_type: Option<String>,

    /// Creation time, yyyyMMddHHmmss (UTC+7); defaults to now
    #[arg(long = "create-date")]
    pub create_date: Option<String>,

    /// Expire the payment this many minutes after now
    #[arg(long = "expire-in")]
    pub expire_in_minutes: Option<i64>,
}

impl BuildUrlCommand {
    pub fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        let client = ctx.client()?;
        let request = self.payment_request(ctx)?;
        let url = client.build_payment_url(&request)?;
        println!("{}", url);
        Ok(())
    }

    fn payment_request(&self, ctx: &Context) -> anyhow::Result<PaymentRequest> {
        let defaults = &ctx.manifest.defaults;
        let return_url = self
            .return_url
            .clone()
            .or_else(|| defaults.return_url.clone())
            .ok_or_else(|| anyhow!("--return-url is required (or set defaults.return_url)"))?;
        let ip_addr = self
            .ip_addr
            .clone()
            .unwrap_or_else(|| defaults.ip_addr.clone());

        let mut request = PaymentRequest::new(self.amount, &self.txn_ref, ip_addr, return_url);
        if let Some(order_info) = &self.order_info {
            request = request.with_order_info(order_info);
        }
        if let Some(bank_code) = &self.bank_code {
            request = request.with_bank_code(BankCode::from(bank_code.as_str()));
        }
        if let Some(locale) = self.locale {
            request = request.with_locale(locale);
        }
        if let Some(order_type) = &self.order_type {
            request = request.with_order_type(ProductCode::from(order_type.as_str()));
        }
        if let Some(create_date) = &self.create_date {
            request = request.with_create_date(create_date);
        }
        if let Some(minutes) = self.expire_in_minutes {
            let expire_at = date::now_in_gateway_tz() + Duration::minutes(minutes);
            request = request.with_expire_date(date::format_gateway_date(&expire_at));
        }
        Ok(request)
    }
}

#[derive(Debug, Clone, PartialEq, clap::Args)]
pub struct VerifyCommand {
    /// Full return URL, or just its query string
    pub input: String,

    /// Treat the input as an IPN call and print the acknowledgement to send back
    #[arg(long)]
    pub ipn: bool,

    /// Amount the order expects, in major units; checked against the IPN amount
    #[arg(long = "expected-amount")]
    pub expected_amount: Option<u64>,
}

impl VerifyCommand {
    pub fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        let client = ctx.client()?;
        let fields = parse_callback_fields(&self.input);

        if !self.ipn {
            let result = client
                .verify_return_url(&fields)
                .context("Callback is malformed")?;
            print_verification(&result);
            return Ok(());
        }

        let verified = client.verify_ipn_call(&fields);
        if let Ok(result) = &verified {
            print_verification(result);
        }
        let ack = ipn_outcome(&verified, self.expected_amount);
        println!("{}", serde_json::to_string(&ack)?);
        verified.map(|_| ()).context("Callback is malformed")
    }
}

/// Acknowledgement for an IPN call, including one that could not be read
fn ipn_outcome(
    verified: &Result<VerificationResult, ValidationError>,
    expected_amount: Option<u64>,
) -> IpnResponse {
    match verified {
        Ok(result) => ipn_acknowledgement(result, expected_amount),
        Err(_) => IpnResponse::unknown_error(),
    }
}

/// Fields of a return URL, or of a bare query string
pub fn parse_callback_fields(input: &str) -> FieldMap {
    let input = input.trim();
    let query = match input.split_once('?') {
        Some((_, query)) => query,
        None => input,
    };
    field_map_from_pairs(url::form_urlencoded::parse(query.as_bytes()).into_owned())
}

/// Without an order store the only lookup available is the expected amount
fn ipn_acknowledgement(result: &VerificationResult, expected_amount: Option<u64>) -> IpnResponse {
    result.ipn_response(OrderLookup::Pending {
        amount: expected_amount.unwrap_or(result.amount),
    })
}

fn print_verification(result: &VerificationResult) {
    let signature = if result.signature_verified {
        style("✓ signature verified").green()
    } else {
        style("✗ signature invalid").red()
    };
    println!("{}", signature);
    println!(
        "  txn_ref:       {}",
        result.txn_ref.as_deref().unwrap_or("-")
    );
    println!("  amount:        {}", result.amount);
    println!(
        "  response_code: {}",
        result.response_code.as_deref().unwrap_or("-")
    );
    println!("  message:       {}", result.message);
    println!("  success:       {}", result.is_success());
}

#[derive(Debug, Clone, PartialEq, clap::Args)]
pub struct IpnCodesCommand {}

impl IpnCodesCommand {
    pub fn execute(&self) -> anyhow::Result<()> {
        for ack in IpnResponse::all() {
            println!("{}", serde_json::to_string(&ack)?);
        }
        Ok(())
    }
}
