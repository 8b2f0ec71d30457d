//! `querydr` and `refund`: signed JSON commands sent server to server.
//!
//! Both commands share one endpoint and one response shape. Requests are
//! signed over a pipe-delimited string in a fixed per-command order; responses
//! are verified the same way with their own order.

use std::future::Future;

use rand::{Rng, distr::Alphanumeric};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, warn};
use vnpay_types::{
    Locale, MessageTable, RefundTransactionType,
    constants::{SUCCESS_CODE, VNP_VERSION, commands, fields},
    response_message, wrong_checksum_message,
};

use crate::{
    amount, canonical,
    client::{VnpayClient, cancellable, ensure_success},
    date,
    error::{GatewayError, Result, TransportError, ValidationError},
    logger::LogRecord,
    payment_url::required,
    pipe,
};

/// Look up the gateway-side state of a transaction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryDrRequest {
    /// Generated when absent
    pub request_id: Option<String>,
    pub txn_ref: String,
    /// Gateway transaction number, if known
    pub transaction_no: Option<String>,
    pub order_info: String,
    /// `vnp_CreateDate` of the original payment, `yyyyMMddHHmmss`
    pub transaction_date: String,
    /// Defaults to now (UTC+7)
    pub create_date: Option<String>,
    pub ip_addr: String,
}

impl QueryDrRequest {
    pub fn new(
        txn_ref: impl Into<String>,
        transaction_date: impl Into<String>,
        order_info: impl Into<String>,
        ip_addr: impl Into<String>,
    ) -> Self {
        Self {
            request_id: None,
            txn_ref: txn_ref.into(),
            transaction_no: None,
            order_info: order_info.into(),
            transaction_date: transaction_date.into(),
            create_date: None,
            ip_addr: ip_addr.into(),
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_transaction_no(mut self, transaction_no: impl Into<String>) -> Self {
        self.transaction_no = Some(transaction_no.into());
        self
    }

    pub fn with_create_date(mut self, create_date: impl Into<String>) -> Self {
        self.create_date = Some(create_date.into());
        self
    }
}

/// Refund all or part of a settled transaction
///
/// Only positivity of `amount` is checked here; not exceeding the original
/// payment is up to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefundRequest {
    /// Generated when absent
    pub request_id: Option<String>,
    pub txn_ref: String,
    /// Major units
    pub amount: u64,
    pub transaction_type: RefundTransactionType,
    pub transaction_no: Option<String>,
    /// `vnp_CreateDate` of the original payment, `yyyyMMddHHmmss`
    pub transaction_date: String,
    /// Operator who requested the refund
    pub create_by: String,
    /// Defaults to now (UTC+7)
    pub create_date: Option<String>,
    pub ip_addr: String,
    pub order_info: String,
    /// Message language for this result, defaults to the client locale
    pub locale: Option<Locale>,
}

impl RefundRequest {
    pub fn new(
        txn_ref: impl Into<String>,
        amount: u64,
        transaction_type: RefundTransactionType,
        transaction_date: impl Into<String>,
        create_by: impl Into<String>,
        order_info: impl Into<String>,
        ip_addr: impl Into<String>,
    ) -> Self {
        Self {
            request_id: None,
            txn_ref: txn_ref.into(),
            amount,
            transaction_type,
            transaction_no: None,
            transaction_date: transaction_date.into(),
            create_by: create_by.into(),
            create_date: None,
            ip_addr: ip_addr.into(),
            order_info: order_info.into(),
            locale: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_transaction_no(mut self, transaction_no: impl Into<String>) -> Self {
        self.transaction_no = Some(transaction_no.into());
        self
    }

    pub fn with_create_date(mut self, create_date: impl Into<String>) -> Self {
        self.create_date = Some(create_date.into());
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = Some(locale);
        self
    }
}

/// Parse a refund type as typed by a user (`"02"` or `"03"`)
pub fn parse_transaction_type(value: &str) -> std::result::Result<RefundTransactionType, ValidationError> {
    value
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidTransactionType(value.to_string()))
}

/// Signed `querydr` body as sent on the wire
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryDrBody {
    #[serde(rename = "vnp_RequestId")]
    pub request_id: String,
    #[serde(rename = "vnp_Version")]
    pub version: String,
    #[serde(rename = "vnp_Command")]
    pub command: String,
    #[serde(rename = "vnp_TmnCode")]
    pub tmn_code: String,
    #[serde(rename = "vnp_TxnRef")]
    pub txn_ref: String,
    #[serde(rename = "vnp_OrderInfo")]
    pub order_info: String,
    #[serde(rename = "vnp_TransactionNo", skip_serializing_if = "Option::is_none")]
    pub transaction_no: Option<String>,
    #[serde(rename = "vnp_TransactionDate")]
    pub transaction_date: String,
    #[serde(rename = "vnp_CreateDate")]
    pub create_date: String,
    #[serde(rename = "vnp_IpAddr")]
    pub ip_addr: String,
    #[serde(rename = "vnp_SecureHash")]
    pub secure_hash: String,
}

impl QueryDrBody {
    /// RequestId|Version|Command|TmnCode|TxnRef|TransactionDate|CreateDate|IpAddr|OrderInfo
    pub fn signing_data(&self) -> String {
        pipe::join(&[
            Some(self.request_id.as_str()),
            Some(self.version.as_str()),
            Some(self.command.as_str()),
            Some(self.tmn_code.as_str()),
            Some(self.txn_ref.as_str()),
            Some(self.transaction_date.as_str()),
            Some(self.create_date.as_str()),
            Some(self.ip_addr.as_str()),
            Some(self.order_info.as_str()),
        ])
    }
}

/// Signed `refund` body as sent on the wire
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefundBody {
    #[serde(rename = "vnp_RequestId")]
    pub request_id: String,
    #[serde(rename = "vnp_Version")]
    pub version: String,
    #[serde(rename = "vnp_Command")]
    pub command: String,
    #[serde(rename = "vnp_TmnCode")]
    pub tmn_code: String,
    #[serde(rename = "vnp_TransactionType")]
    pub transaction_type: RefundTransactionType,
    #[serde(rename = "vnp_TxnRef")]
    pub txn_ref: String,
    /// Minor units
    #[serde(rename = "vnp_Amount")]
    pub amount: u64,
    #[serde(rename = "vnp_OrderInfo")]
    pub order_info: String,
    #[serde(rename = "vnp_TransactionNo", skip_serializing_if = "Option::is_none")]
    pub transaction_no: Option<String>,
    #[serde(rename = "vnp_TransactionDate")]
    pub transaction_date: String,
    #[serde(rename = "vnp_CreateBy")]
    pub create_by: String,
    #[serde(rename = "vnp_CreateDate")]
    pub create_date: String,
    #[serde(rename = "vnp_IpAddr")]
    pub ip_addr: String,
    #[serde(rename = "vnp_SecureHash")]
    pub secure_hash: String,
}

impl RefundBody {
    /// RequestId|Version|Command|TmnCode|TransactionType|TxnRef|Amount|TransactionNo|TransactionDate|CreateBy|CreateDate|IpAddr|OrderInfo
    pub fn signing_data(&self) -> String {
        let amount = self.amount.to_string();
        pipe::join(&[
            Some(self.request_id.as_str()),
            Some(self.version.as_str()),
            Some(self.command.as_str()),
            Some(self.tmn_code.as_str()),
            Some(self.transaction_type.as_str()),
            Some(self.txn_ref.as_str()),
            Some(amount.as_str()),
            self.transaction_no.as_deref(),
            Some(self.transaction_date.as_str()),
            Some(self.create_by.as_str()),
            Some(self.create_date.as_str()),
            Some(self.ip_addr.as_str()),
            Some(self.order_info.as_str()),
        ])
    }
}

/// Response body shared by `querydr` and `refund`
///
/// The gateway sends some fields as numbers and others as strings; every
/// field is read back as the string it would be signed as.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionResponse {
    #[serde(rename = "vnp_ResponseId", default, deserialize_with = "lenient_string")]
    pub response_id: Option<String>,
    #[serde(rename = "vnp_Command", default, deserialize_with = "lenient_string")]
    pub command: Option<String>,
    #[serde(rename = "vnp_ResponseCode", default, deserialize_with = "lenient_string")]
    pub response_code: Option<String>,
    #[serde(rename = "vnp_Message", default, deserialize_with = "lenient_string")]
    pub message: Option<String>,
    #[serde(rename = "vnp_TmnCode", default, deserialize_with = "lenient_string")]
    pub tmn_code: Option<String>,
    #[serde(rename = "vnp_TxnRef", default, deserialize_with = "lenient_string")]
    pub txn_ref: Option<String>,
    #[serde(rename = "vnp_Amount", default, deserialize_with = "lenient_string")]
    pub amount: Option<String>,
    #[serde(rename = "vnp_BankCode", default, deserialize_with = "lenient_string")]
    pub bank_code: Option<String>,
    #[serde(rename = "vnp_PayDate", default, deserialize_with = "lenient_string")]
    pub pay_date: Option<String>,
    #[serde(rename = "vnp_TransactionNo", default, deserialize_with = "lenient_string")]
    pub transaction_no: Option<String>,
    #[serde(rename = "vnp_TransactionType", default, deserialize_with = "lenient_string")]
    pub transaction_type: Option<String>,
    #[serde(rename = "vnp_TransactionStatus", default, deserialize_with = "lenient_string")]
    pub transaction_status: Option<String>,
    #[serde(rename = "vnp_OrderInfo", default, deserialize_with = "lenient_string")]
    pub order_info: Option<String>,
    #[serde(rename = "vnp_PromotionCode", default, deserialize_with = "lenient_string")]
    pub promotion_code: Option<String>,
    #[serde(rename = "vnp_PromotionAmount", default, deserialize_with = "lenient_string")]
    pub promotion_amount: Option<String>,
    #[serde(rename = "vnp_SecureHash", default, deserialize_with = "lenient_string")]
    pub secure_hash: Option<String>,
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(canonical::stringify))
}

/// Which command a response answers; decides the signing order and messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TransactionKind {
    QueryDr,
    Refund,
}

impl TransactionKind {
    fn method(&self) -> &'static str {
        match self {
            TransactionKind::QueryDr => "queryDr",
            TransactionKind::Refund => "refund",
        }
    }

    fn message_table(&self) -> MessageTable {
        match self {
            TransactionKind::QueryDr => MessageTable::QueryDr,
            TransactionKind::Refund => MessageTable::Refund,
        }
    }

    fn response_signing_data(&self, response: &TransactionResponse) -> String {
        let mut values = vec![
            response.response_id.as_deref(),
            response.command.as_deref(),
            response.response_code.as_deref(),
            response.message.as_deref(),
            response.tmn_code.as_deref(),
            response.txn_ref.as_deref(),
            response.amount.as_deref(),
            response.bank_code.as_deref(),
            response.pay_date.as_deref(),
            response.transaction_no.as_deref(),
            response.transaction_type.as_deref(),
            response.transaction_status.as_deref(),
            response.order_info.as_deref(),
        ];
        if *self == TransactionKind::QueryDr {
            values.push(response.promotion_code.as_deref());
            values.push(response.promotion_amount.as_deref());
        }
        pipe::join(&values)
    }
}

/// Outcome of a `querydr` or `refund` call that completed over HTTP
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionResult {
    /// Always true: transport failures are returned as errors instead
    pub transport_ok: bool,

    /// The response carried a `vnp_SecureHash`
    pub signature_present: bool,

    /// The response hash was present and matched
    pub signature_verified: bool,

    /// `vnp_ResponseCode == "00"`. Not trustworthy unless `signature_verified`.
    pub business_success: bool,

    /// Localized message; the wrong-checksum message when a present hash mismatched
    pub message: String,

    pub response_code: Option<String>,
    pub transaction_status: Option<String>,
    pub transaction_status_message: Option<String>,
    pub transaction_no: Option<String>,
    pub txn_ref: Option<String>,

    /// Major units, when the gateway returned a readable amount
    pub amount: Option<u64>,

    pub pay_date: Option<String>,
    pub bank_code: Option<String>,
    pub transaction_type: Option<String>,

    /// Typed view of the response body
    pub response: TransactionResponse,

    /// Response body as received
    pub raw: JsonValue,
}

impl TransactionResult {
    /// Request accepted, provably so
    pub fn is_success(&self) -> bool {
        self.signature_verified && self.business_success
    }

    /// Request accepted and the transaction itself reported as settled
    pub fn transaction_succeeded(&self) -> bool {
        self.is_success() && self.transaction_status.as_deref() == Some(SUCCESS_CODE)
    }
}

pub type QueryResult = TransactionResult;
pub type RefundResult = TransactionResult;

fn generate_request_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect()
}

fn transaction_date(value: &str) -> std::result::Result<(), ValidationError> {
    required("vnp_TransactionDate", value)?;
    date::ensure_gateway_date("vnp_TransactionDate", value)
}

fn create_date_or_now(value: Option<&str>) -> std::result::Result<String, ValidationError> {
    match value {
        Some(create_date) => {
            date::ensure_gateway_date(fields::CREATE_DATE, create_date)?;
            Ok(create_date.to_string())
        }
        None => Ok(date::format_gateway_date(&date::now_in_gateway_tz())),
    }
}

fn request_id_or_generate(value: Option<&str>) -> String {
    match value {
        Some(id) if !id.trim().is_empty() => id.to_string(),
        _ => generate_request_id(),
    }
}

fn body_fields(body: &impl Serialize) -> serde_json::Map<String, JsonValue> {
    match serde_json::to_value(body) {
        Ok(JsonValue::Object(map)) => map,
        _ => serde_json::Map::new(),
    }
}

impl VnpayClient {
    /// Validate and sign a `querydr` request without sending it
    pub fn query_dr_body(
        &self,
        request: &QueryDrRequest,
    ) -> std::result::Result<QueryDrBody, ValidationError> {
        required(fields::TXN_REF, &request.txn_ref)?;
        required(fields::ORDER_INFO, &request.order_info)?;
        required(fields::IP_ADDR, &request.ip_addr)?;
        transaction_date(&request.transaction_date)?;
        let create_date = create_date_or_now(request.create_date.as_deref())?;

        let mut body = QueryDrBody {
            request_id: request_id_or_generate(request.request_id.as_deref()),
            version: VNP_VERSION.to_string(),
            command: commands::QUERY_DR.to_string(),
            tmn_code: self.settings.tmn_code.clone(),
            txn_ref: request.txn_ref.clone(),
            order_info: request.order_info.clone(),
            transaction_no: request.transaction_no.clone(),
            transaction_date: request.transaction_date.clone(),
            create_date,
            ip_addr: request.ip_addr.clone(),
            secure_hash: String::new(),
        };
        body.secure_hash = self.hasher.sign(&body.signing_data());
        Ok(body)
    }

    /// Validate and sign a `refund` request without sending it
    pub fn refund_body(
        &self,
        request: &RefundRequest,
    ) -> std::result::Result<RefundBody, ValidationError> {
        let amount = amount::scale_for_transmission(request.amount)?;
        required(fields::TXN_REF, &request.txn_ref)?;
        required(fields::ORDER_INFO, &request.order_info)?;
        required(fields::IP_ADDR, &request.ip_addr)?;
        required("vnp_CreateBy", &request.create_by)?;
        transaction_date(&request.transaction_date)?;
        let create_date = create_date_or_now(request.create_date.as_deref())?;

        let mut body = RefundBody {
            request_id: request_id_or_generate(request.request_id.as_deref()),
            version: VNP_VERSION.to_string(),
            command: commands::REFUND.to_string(),
            tmn_code: self.settings.tmn_code.clone(),
            transaction_type: request.transaction_type,
            txn_ref: request.txn_ref.clone(),
            amount,
            order_info: request.order_info.clone(),
            transaction_no: request.transaction_no.clone(),
            transaction_date: request.transaction_date.clone(),
            create_by: request.create_by.clone(),
            create_date,
            ip_addr: request.ip_addr.clone(),
            secure_hash: String::new(),
        };
        body.secure_hash = self.hasher.sign(&body.signing_data());
        Ok(body)
    }

    /// Ask the gateway for the current state of a transaction
    pub async fn query_dr(&self, request: &QueryDrRequest) -> Result<QueryResult> {
        let body = self.query_dr_body(request)?;
        debug!(txn_ref = %body.txn_ref, request_id = %body.request_id, "Sending querydr");
        let raw = self.post_json(&body).await?;
        let result = self.transaction_result(TransactionKind::QueryDr, raw, self.settings.locale)?;
        self.log_transaction(TransactionKind::QueryDr, body_fields(&body), &result);
        Ok(result)
    }

    /// [`Self::query_dr`], abandoned with `TransportError::Cancelled` once `cancel` resolves
    pub async fn query_dr_with_cancel(
        &self,
        request: &QueryDrRequest,
        cancel: impl Future<Output = ()>,
    ) -> Result<QueryResult> {
        cancellable(self.query_dr(request), cancel).await
    }

    /// Refund a settled transaction
    pub async fn refund(&self, request: &RefundRequest) -> Result<RefundResult> {
        let body = self.refund_body(request)?;
        debug!(
            txn_ref = %body.txn_ref,
            request_id = %body.request_id,
            amount = body.amount,
            "Sending refund"
        );
        let raw = self.post_json(&body).await?;
        let locale = request.locale.unwrap_or(self.settings.locale);
        let result = self.transaction_result(TransactionKind::Refund, raw, locale)?;
        self.log_transaction(TransactionKind::Refund, body_fields(&body), &result);
        Ok(result)
    }

    /// [`Self::refund`], abandoned with `TransportError::Cancelled` once `cancel` resolves
    pub async fn refund_with_cancel(
        &self,
        request: &RefundRequest,
        cancel: impl Future<Output = ()>,
    ) -> Result<RefundResult> {
        cancellable(self.refund(request), cancel).await
    }

    async fn post_json(&self, body: &impl Serialize) -> Result<JsonValue> {
        let url = self.endpoint(&self.settings.endpoints.query_dr_refund);
        let response = self
            .http_client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(TransportError::from)?;

        let text = ensure_success(response)
            .await?
            .text()
            .await
            .map_err(TransportError::from)?;
        serde_json::from_str(&text)
            .map_err(|e| GatewayError::Protocol(format!("Response is not JSON: {}", e)))
    }

    pub(crate) fn transaction_result(
        &self,
        kind: TransactionKind,
        raw: JsonValue,
        locale: Locale,
    ) -> Result<TransactionResult> {
        if !raw.is_object() {
            return Err(GatewayError::Protocol(format!(
                "Expected a JSON object, got {}",
                raw
            )));
        }
        let response: TransactionResponse = serde_json::from_value(raw.clone())?;

        let signature_present = response
            .secure_hash
            .as_deref()
            .is_some_and(|h| !h.is_empty());
        let signature_verified = match response.secure_hash.as_deref() {
            Some(hash) if signature_present => self
                .hasher
                .verify(&kind.response_signing_data(&response), hash),
            _ => false,
        };
        if signature_present && !signature_verified {
            warn!(
                method = kind.method(),
                txn_ref = ?response.txn_ref,
                "Response signature verification failed"
            );
        }

        let response_code = response.response_code.clone();
        let business_success = response_code.as_deref() == Some(SUCCESS_CODE);
        let message = if signature_present && !signature_verified {
            wrong_checksum_message(locale)
        } else {
            response_message(
                kind.message_table(),
                response_code.as_deref().unwrap_or_default(),
                locale,
            )
        };
        let transaction_status_message = response
            .transaction_status
            .as_deref()
            .map(|s| response_message(MessageTable::TransactionStatus, s, locale).to_string());
        let amount = response
            .amount
            .as_ref()
            .and_then(|a| amount::parse_amount(&JsonValue::String(a.clone())).ok())
            .and_then(|minor| amount::decode_amount(minor).ok());

        Ok(TransactionResult {
            transport_ok: true,
            signature_present,
            signature_verified,
            business_success,
            message: message.to_string(),
            response_code,
            transaction_status: response.transaction_status.clone(),
            transaction_status_message,
            transaction_no: response.transaction_no.clone(),
            txn_ref: response.txn_ref.clone(),
            amount,
            pay_date: response.pay_date.clone(),
            bank_code: response.bank_code.clone(),
            transaction_type: response.transaction_type.clone(),
            response,
            raw,
        })
    }

    fn log_transaction(
        &self,
        kind: TransactionKind,
        request_fields: serde_json::Map<String, JsonValue>,
        result: &TransactionResult,
    ) {
        let mut record = LogRecord::new(kind.method()).with_fields(request_fields);
        if let JsonValue::Object(response_fields) = &result.raw {
            record = record.with_fields(
                response_fields
                    .iter()
                    .filter(|(k, _)| k.as_str() != fields::SECURE_HASH)
                    .map(|(k, v)| (format!("response.{}", k), v.clone())),
            );
        }
        self.logger.log(
            record
                .with_field("isVerified", result.signature_verified)
                .with_field("isSuccess", result.business_success)
                .with_field("message", &result.message),
        );
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        client::tests::{SECRET, test_client},
        hash,
    };
    use vnpay_types::HashAlgorithm;

    fn query_request() -> QueryDrRequest {
        QueryDrRequest::new("ORDER1", "20250101120000", "Query ORDER1", "127.0.0.1")
            .with_request_id("REQ1")
            .with_create_date("20250101130000")
    }

    fn refund_request() -> RefundRequest {
        RefundRequest::new(
            "ORDER1",
            50_000,
            RefundTransactionType::PartialRefund,
            "20250101120000",
            "admin",
            "Refund ORDER1",
            "127.0.0.1",
        )
        .with_request_id("REQ2")
        .with_create_date("20250102090000")
    }

    #[test]
    fn test_query_dr_signing_order() {
        let body = test_client().query_dr_body(&query_request()).unwrap();
        assert_eq!(
            body.signing_data(),
            "REQ1|2.1.0|querydr|TESTTMN1|ORDER1|20250101120000|20250101130000|127.0.0.1|Query ORDER1"
        );
        assert_eq!(
            body.secure_hash,
            hash::sign(SECRET, &body.signing_data(), HashAlgorithm::Sha512)
        );
    }

    #[test]
    fn test_query_dr_wire_names() {
        let body = test_client()
            .query_dr_body(&query_request().with_transaction_no("14123456"))
            .unwrap();
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["vnp_RequestId"], "REQ1");
        assert_eq!(value["vnp_Command"], "querydr");
        assert_eq!(value["vnp_TransactionNo"], "14123456");
        assert_eq!(value["vnp_TransactionDate"], "20250101120000");
        assert!(value["vnp_SecureHash"].is_string());
    }

    #[test]
    fn test_refund_signing_order_and_scaling() {
        let body = test_client().refund_body(&refund_request()).unwrap();
        assert_eq!(body.amount, 5_000_000);
        assert_eq!(
            body.signing_data(),
            "REQ2|2.1.0|refund|TESTTMN1|03|ORDER1|5000000||20250101120000|admin|20250102090000|127.0.0.1|Refund ORDER1"
        );
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["vnp_TransactionType"], "03");
        assert_eq!(value["vnp_Amount"], 5_000_000);
        assert!(value.get("vnp_TransactionNo").is_none());
    }

    #[test]
    fn test_refund_validation() {
        let client = test_client();
        let mut request = refund_request();
        request.amount = 0;
        assert!(matches!(
            client.refund_body(&request),
            Err(ValidationError::InvalidAmount(_))
        ));

        let mut request = refund_request();
        request.create_by = String::new();
        assert_eq!(
            client.refund_body(&request),
            Err(ValidationError::MissingField("vnp_CreateBy"))
        );

        let mut request = refund_request();
        request.transaction_date = "2025-01-01".to_string();
        assert!(matches!(
            client.refund_body(&request),
            Err(ValidationError::BadDateFormat { field: "vnp_TransactionDate", .. })
        ));
    }

    #[test]
    fn test_refund_amount_has_no_upper_bound_check() {
        let mut request = refund_request();
        request.amount = 999_999_999;
        assert!(test_client().refund_body(&request).is_ok());
    }

    #[test]
    fn test_query_dr_validation() {
        let client = test_client();
        let mut request = query_request();
        request.txn_ref = " ".to_string();
        assert_eq!(
            client.query_dr_body(&request),
            Err(ValidationError::MissingField("vnp_TxnRef"))
        );

        let mut request = query_request();
        request.transaction_date = String::new();
        assert_eq!(
            client.query_dr_body(&request),
            Err(ValidationError::MissingField("vnp_TransactionDate"))
        );

        let request = query_request().with_create_date("2025131120000");
        assert!(matches!(
            client.query_dr_body(&request),
            Err(ValidationError::BadDateFormat { field: "vnp_CreateDate", .. })
        ));
    }

    #[test]
    fn test_generated_request_ids_differ() {
        let client = test_client();
        let mut request = query_request();
        request.request_id = None;
        let a = client.query_dr_body(&request).unwrap();
        let b = client.query_dr_body(&request).unwrap();
        assert_eq!(a.request_id.len(), 16);
        assert_ne!(a.request_id, b.request_id);
    }

    #[test]
    fn test_parse_transaction_type() {
        assert_eq!(
            parse_transaction_type("02"),
            Ok(RefundTransactionType::FullRefund)
        );
        assert_eq!(
            parse_transaction_type("03"),
            Ok(RefundTransactionType::PartialRefund)
        );
        assert_eq!(
            parse_transaction_type("04"),
            Err(ValidationError::InvalidTransactionType("04".to_string()))
        );
    }

    fn signed_query_response(code: &str) -> JsonValue {
        let mut response = json!({
            "vnp_ResponseId": "RESP1",
            "vnp_Command": "querydr",
            "vnp_ResponseCode": code,
            "vnp_Message": "QueryDR Success",
            "vnp_TmnCode": "TESTTMN1",
            "vnp_TxnRef": "ORDER1",
            "vnp_Amount": 10000000,
            "vnp_BankCode": "NCB",
            "vnp_PayDate": "20250101120500",
            "vnp_TransactionNo": "14123456",
            "vnp_TransactionType": "01",
            "vnp_TransactionStatus": "00",
            "vnp_OrderInfo": "Query ORDER1",
            "vnp_PromotionCode": "",
            "vnp_PromotionAmount": "",
        });
        let data = format!(
            "RESP1|querydr|{}|QueryDR Success|TESTTMN1|ORDER1|10000000|NCB|20250101120500|14123456|01|00|Query ORDER1||",
            code
        );
        response["vnp_SecureHash"] = json!(hash::sign(SECRET, &data, HashAlgorithm::Sha512));
        response
    }

    #[test]
    fn test_query_response_verified() {
        let result = test_client()
            .transaction_result(TransactionKind::QueryDr, signed_query_response("00"), Locale::En)
            .unwrap();
        assert!(result.signature_present);
        assert!(result.signature_verified);
        assert!(result.is_success());
        assert!(result.transaction_succeeded());
        assert_eq!(result.amount, Some(100_000));
        assert_eq!(result.message, "Request successful");
        assert_eq!(result.transaction_no.as_deref(), Some("14123456"));
    }

    #[test]
    fn test_mismatched_hash_overrides_message() {
        let mut raw = signed_query_response("00");
        raw["vnp_TransactionStatus"] = json!("01");
        let result = test_client()
            .transaction_result(TransactionKind::QueryDr, raw, Locale::Vn)
            .unwrap();
        assert!(result.signature_present);
        assert!(!result.signature_verified);
        assert!(result.business_success);
        assert!(!result.is_success());
        assert_eq!(result.message, "Sai checksum");
    }

    #[test]
    fn test_missing_hash_is_unverifiable_not_failed() {
        let mut raw = signed_query_response("91");
        raw.as_object_mut().unwrap().remove("vnp_SecureHash");
        let result = test_client()
            .transaction_result(TransactionKind::QueryDr, raw, Locale::En)
            .unwrap();
        assert!(!result.signature_present);
        assert!(!result.signature_verified);
        assert_eq!(result.message, "Transaction not found");
    }

    #[test]
    fn test_non_object_response_is_protocol_error() {
        let err = test_client()
            .transaction_result(TransactionKind::Refund, json!([1, 2]), Locale::En)
            .unwrap_err();
        assert!(matches!(err, GatewayError::Protocol(_)));
    }
}
