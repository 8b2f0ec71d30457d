use anyhow::anyhow;
use console::style;
use tracing::debug;
use vnpay_sdk::{
    QueryDrRequest, RefundRequest, RefundTransactionType, TransactionResult, parse_transaction_type,
};

use crate::Context;

#[derive(Debug, Clone, PartialEq, clap::Args)]
pub struct QueryCommand {
    /// Merchant order reference
    #[arg(long = "txn-ref")]
    pub txn_ref: String,

    /// Creation time of the original payment, yyyyMMddHHmmss
    #[arg(long = "transaction-date")]
    pub transaction_date: String,

    /// Gateway transaction number, if known
    #[arg(long = "transaction-no")]
    pub transaction_no: Option<String>,

    #[arg(long = "order-info")]
    pub order_info: Option<String>,

    /// Caller IP address (defaults to the manifest value)
    #[arg(long = "ip-addr")]
    pub ip_addr: Option<String>,

    /// Request id; generated when absent
    #[arg(long = "request-id")]
    pub request_id: Option<String>,

    /// Print the full response as JSON
    #[arg(long)]
    pub json: bool,
}

impl QueryCommand {
    pub async fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        let client = ctx.client()?;
        let request = self.query_request(ctx);
        debug!(txn_ref = %request.txn_ref, "querydr");
        let result = client.query_dr(&request).await?;
        print_result(&result, self.json)
    }

    fn query_request(&self, ctx: &Context) -> QueryDrRequest {
        let order_info = self
            .order_info
            .clone()
            .unwrap_or_else(|| format!("Truy van giao dich {}", self.txn_ref));
        let ip_addr = self
            .ip_addr
            .clone()
            .unwrap_or_else(|| ctx.manifest.defaults.ip_addr.clone());

        let mut request =
            QueryDrRequest::new(&self.txn_ref, &self.transaction_date, order_info, ip_addr);
        if let Some(transaction_no) = &self.transaction_no {
            request = request.with_transaction_no(transaction_no);
        }
        if let Some(request_id) = &self.request_id {
            request = request.with_request_id(request_id);
        }
        request
    }
}

#[derive(Debug, Clone, PartialEq, clap::Args)]
pub struct RefundCommand {
    /// Merchant order reference
    #[arg(long = "txn-ref")]
    pub txn_ref: String,

    /// Amount to refund, in major units
    #[arg(long)]
    pub amount: u64,

    /// 02 for a full refund, 03 for a partial one
    #[arg(long = "type", default_value = "02", value_parser = parse_transaction_type)]
    pub transaction_type: RefundTransactionType,

    /// Creation time of the original payment, yyyyMMddHHmmss
    #[arg(long = "transaction-date")]
    pub transaction_date: String,

    /// Gateway transaction number, if known
    #[arg(long = "transaction-no")]
    pub transaction_no: Option<String>,

    /// Operator requesting the refund (defaults to the manifest value)
    #[arg(long = "create-by")]
    pub create_by: Option<String>,

    #[arg(long = "order-info")]
    pub order_info: Option<String>,

    /// Caller IP address (defaults to the manifest value)
    #[arg(long = "ip-addr")]
    pub ip_addr: Option<String>,

    /// Request id; generated when absent
    #[arg(long = "request-id")]
    pub request_id: Option<String>,

    /// Print the full response as JSON
    #[arg(long)]
    pub json: bool,
}

impl RefundCommand {
    pub async fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        let client = ctx.client()?;
        let request = self.refund_request(ctx)?;
        debug!(txn_ref = %request.txn_ref, amount = request.amount, "refund");
        let result = client.refund(&request).await?;
        print_result(&result, self.json)
    }

    fn refund_request(&self, ctx: &Context) -> anyhow::Result<RefundRequest> {
        let defaults = &ctx.manifest.defaults;
        let create_by = self
            .create_by
            .clone()
            .or_else(|| defaults.create_by.clone())
            .ok_or_else(|| anyhow!("--create-by is required (or set defaults.create_by)"))?;
        let order_info = self
            .order_info
            .clone()
            .unwrap_or_else(|| format!("Hoan tien giao dich {}", self.txn_ref));
        let ip_addr = self
            .ip_addr
            .clone()
            .unwrap_or_else(|| defaults.ip_addr.clone());

        let mut request = RefundRequest::new(
            &self.txn_ref,
            self.amount,
            self.transaction_type,
            &self.transaction_date,
            create_by,
            order_info,
            ip_addr,
        );
        if let Some(transaction_no) = &self.transaction_no {
            request = request.with_transaction_no(transaction_no);
        }
        if let Some(request_id) = &self.request_id {
            request = request.with_request_id(request_id);
        }
        Ok(request)
    }
}

fn print_result(result: &TransactionResult, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    let signature = match (result.signature_present, result.signature_verified) {
        (true, true) => style("✓ response signature verified").green(),
        (true, false) => style("✗ response signature invalid").red(),
        (false, _) => style("? response is not signed").yellow(),
    };
    println!("{}", signature);
    println!(
        "  response_code: {}",
        result.response_code.as_deref().unwrap_or("-")
    );
    println!("  message:       {}", result.message);
    if let Some(status) = &result.transaction_status {
        println!(
            "  status:        {} ({})",
            status,
            result.transaction_status_message.as_deref().unwrap_or("-")
        );
    }
    if let Some(transaction_no) = &result.transaction_no {
        println!("  transaction:   {}", transaction_no);
    }
    if let Some(amount) = result.amount {
        println!("  amount:        {}", amount);
    }
    println!("  success:       {}", result.is_success());
    Ok(())
}
