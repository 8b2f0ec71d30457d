use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue, json};
use tracing::debug;
use url::Url;
use vnpay_types::{
    BankCode, FieldMap, Locale, ProductCode,
    constants::{VNP_VERSION, commands, fields},
};

use crate::{
    amount, canonical,
    client::VnpayClient,
    date,
    error::ValidationError,
    logger::LogRecord,
};

/// One checkout attempt
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Amount in major currency units (e.g. 100000 VND)
    pub amount: u64,

    /// Merchant order reference, unique per attempt
    pub txn_ref: String,

    /// Order description shown to the customer. Defaults to one derived from `txn_ref`.
    #[serde(default)]
    pub order_info: String,

    /// Customer IP address
    pub ip_addr: String,

    /// Where the gateway sends the customer back
    pub return_url: String,

    /// `yyyyMMddHHmmss` in UTC+7; now when absent
    #[serde(default)]
    pub create_date: Option<String>,

    /// `yyyyMMddHHmmss` in UTC+7
    #[serde(default)]
    pub expire_date: Option<String>,

    #[serde(default)]
    pub locale: Option<Locale>,

    #[serde(default)]
    pub curr_code: Option<String>,

    #[serde(default)]
    pub bank_code: Option<BankCode>,

    #[serde(default)]
    pub order_type: Option<ProductCode>,
}

impl PaymentRequest {
    pub fn new(
        amount: u64,
        txn_ref: impl Into<String>,
        ip_addr: impl Into<String>,
        return_url: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            txn_ref: txn_ref.into(),
            ip_addr: ip_addr.into(),
            return_url: return_url.into(),
            ..Default::default()
        }
    }

    pub fn with_order_info(mut self, order_info: impl Into<String>) -> Self {
        self.order_info = order_info.into();
        self
    }

    pub fn with_create_date(mut self, create_date: impl Into<String>) -> Self {
        self.create_date = Some(create_date.into());
        self
    }

    pub fn with_expire_date(mut self, expire_date: impl Into<String>) -> Self {
        self.expire_date = Some(expire_date.into());
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = Some(locale);
        self
    }

    pub fn with_curr_code(mut self, curr_code: impl Into<String>) -> Self {
        self.curr_code = Some(curr_code.into());
        self
    }

    pub fn with_bank_code(mut self, bank_code: BankCode) -> Self {
        self.bank_code = Some(bank_code);
        self
    }

    pub fn with_order_type(mut self, order_type: ProductCode) -> Self {
        self.order_type = Some(order_type);
        self
    }
}

/// The closed set of fields carried by a payment URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentUrlParams {
    pub version: String,
    pub command: String,
    pub tmn_code: String,
    /// Minor units
    pub amount: u64,
    pub curr_code: String,
    pub locale: Locale,
    pub txn_ref: String,
    pub order_info: String,
    pub order_type: ProductCode,
    pub ip_addr: String,
    pub return_url: String,
    pub create_date: String,
    pub expire_date: Option<String>,
    pub bank_code: Option<BankCode>,
}

impl PaymentUrlParams {
    pub fn to_fields(&self) -> FieldMap {
        let mut map = FieldMap::new();
        map.insert(fields::VERSION.into(), json!(self.version));
        map.insert(fields::COMMAND.into(), json!(self.command));
        map.insert(fields::TMN_CODE.into(), json!(self.tmn_code));
        map.insert(fields::AMOUNT.into(), json!(self.amount));
        map.insert(fields::CURR_CODE.into(), json!(self.curr_code));
        map.insert(fields::LOCALE.into(), json!(self.locale.as_str()));
        map.insert(fields::TXN_REF.into(), json!(self.txn_ref));
        map.insert(fields::ORDER_INFO.into(), json!(self.order_info));
        map.insert(fields::ORDER_TYPE.into(), json!(self.order_type.as_str()));
        map.insert(fields::IP_ADDR.into(), json!(self.ip_addr));
        map.insert(fields::RETURN_URL.into(), json!(self.return_url));
        map.insert(fields::CREATE_DATE.into(), json!(self.create_date));
        map.insert(
            fields::EXPIRE_DATE.into(),
            self.expire_date.as_ref().map_or(JsonValue::Null, |d| json!(d)),
        );
        map.insert(
            fields::BANK_CODE.into(),
            self.bank_code
                .as_ref()
                .map_or(JsonValue::Null, |b| json!(b.as_str())),
        );
        map
    }
}

pub(crate) fn required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}

impl VnpayClient {
    /// Validate a request and merge it with the merchant defaults
    pub fn payment_url_params(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentUrlParams, ValidationError> {
        let amount = amount::scale_for_transmission(request.amount)?;
        required(fields::TXN_REF, &request.txn_ref)?;
        required(fields::IP_ADDR, &request.ip_addr)?;
        required(fields::RETURN_URL, &request.return_url)?;

        let create_date = match &request.create_date {
            Some(create_date) => {
                date::ensure_gateway_date(fields::CREATE_DATE, create_date)?;
                create_date.clone()
            }
            None => date::format_gateway_date(&date::now_in_gateway_tz()),
        };
        if let Some(expire_date) = &request.expire_date {
            date::ensure_gateway_date(fields::EXPIRE_DATE, expire_date)?;
        }

        let order_info = if request.order_info.trim().is_empty() {
            format!("Thanh toan don hang {}", request.txn_ref)
        } else {
            request.order_info.clone()
        };

        Ok(PaymentUrlParams {
            version: VNP_VERSION.to_string(),
            command: commands::PAY.to_string(),
            tmn_code: self.settings.tmn_code.clone(),
            amount,
            curr_code: request
                .curr_code
                .clone()
                .unwrap_or_else(|| self.settings.curr_code.clone()),
            locale: request.locale.unwrap_or(self.settings.locale),
            txn_ref: request.txn_ref.clone(),
            order_info,
            order_type: request.order_type.clone().unwrap_or_default(),
            ip_addr: request.ip_addr.clone(),
            return_url: request.return_url.clone(),
            create_date,
            expire_date: request.expire_date.clone(),
            bank_code: request.bank_code.clone(),
        })
    }

    /// Build the signed redirect URL for a checkout attempt.
    ///
    /// `vnp_SecureHash` is the last query parameter; everything before it is
    /// exactly the string that was signed.
    pub fn build_payment_url(&self, request: &PaymentRequest) -> Result<Url, ValidationError> {
        let params = self.payment_url_params(request)?;
        let parameter_set = canonical::to_parameter_set(&params.to_fields());
        let signed_data = canonical::encode_parameter_set(&parameter_set);
        let secure_hash = self.hasher.sign(&signed_data);

        let mut url = self.payment_url.clone();
        url.set_query(Some(&format!(
            "{}&{}={}",
            signed_data,
            fields::SECURE_HASH,
            secure_hash
        )));

        debug!(txn_ref = %params.txn_ref, amount = params.amount, "Built payment URL");
        self.logger.log(
            LogRecord::new("buildPaymentUrl")
                .with_fields(
                    parameter_set
                        .into_iter()
                        .map(|(k, v)| (k, JsonValue::String(v))),
                )
                .with_field(fields::SECURE_HASH, &secure_hash)
                .with_field("paymentUrl", url.as_str()),
        );

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use vnpay_types::HashAlgorithm;

    use super::*;
    use crate::{
        client::tests::{SECRET, test_client},
        hash,
    };

    fn scenario_request() -> PaymentRequest {
        PaymentRequest::new(100_000, "ORDER1", "127.0.0.1", "https://x/y")
            .with_create_date("20250101120000")
    }

    fn query_pairs(url: &Url) -> HashMap<String, String> {
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn test_amount_is_scaled_once() {
        let url = test_client().build_payment_url(&scenario_request()).unwrap();
        let pairs = query_pairs(&url);
        assert_eq!(pairs["vnp_Amount"], "10000000");
    }

    #[test]
    fn test_secure_hash_is_recomputable() {
        let url = test_client().build_payment_url(&scenario_request()).unwrap();
        let query = url.query().unwrap();
        let (signed_data, hash_param) = query.rsplit_once('&').unwrap();
        let received = hash_param.strip_prefix("vnp_SecureHash=").unwrap();

        assert_eq!(received.len(), 128);
        assert!(hash::verify(SECRET, signed_data, HashAlgorithm::Sha512, received));

        // Independently re-encode the remaining parameters
        let mut pairs: Vec<_> = url
            .query_pairs()
            .filter(|(k, _)| k != "vnp_SecureHash")
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let sorted = pairs.windows(2).all(|w| w[0].0 < w[1].0);
        assert!(sorted, "parameters are not sorted");
        pairs.sort();
        let fields: FieldMap = pairs
            .into_iter()
            .map(|(k, v)| (k, JsonValue::String(v)))
            .collect();
        assert_eq!(canonical::encode(&fields), signed_data);
    }

    #[test]
    fn test_defaults_are_merged() {
        let url = test_client().build_payment_url(&scenario_request()).unwrap();
        let pairs = query_pairs(&url);
        assert_eq!(pairs["vnp_Version"], "2.1.0");
        assert_eq!(pairs["vnp_Command"], "pay");
        assert_eq!(pairs["vnp_TmnCode"], "TESTTMN1");
        assert_eq!(pairs["vnp_CurrCode"], "VND");
        assert_eq!(pairs["vnp_Locale"], "en");
        assert_eq!(pairs["vnp_OrderType"], "other");
        assert_eq!(pairs["vnp_OrderInfo"], "Thanh toan don hang ORDER1");
        assert_eq!(pairs["vnp_ReturnUrl"], "https://x/y");
        assert!(!pairs.contains_key("vnp_ExpireDate"));
        assert!(!pairs.contains_key("vnp_BankCode"));
        assert_eq!(
            url.as_str().split('?').next().unwrap(),
            "https://sandbox.vnpayment.vn/paymentv2/vpcpay.html"
        );
    }

    #[test]
    fn test_request_overrides_win() {
        let request = scenario_request()
            .with_locale(Locale::Vn)
            .with_bank_code(BankCode::VnpayQr)
            .with_order_type(ProductCode::BillPayment)
            .with_expire_date("20250101123000");
        let pairs = query_pairs(&test_client().build_payment_url(&request).unwrap());
        assert_eq!(pairs["vnp_Locale"], "vn");
        assert_eq!(pairs["vnp_BankCode"], "VNPAYQR");
        assert_eq!(pairs["vnp_OrderType"], "billpayment");
        assert_eq!(pairs["vnp_ExpireDate"], "20250101123000");
    }

    #[test]
    fn test_same_request_same_url() {
        let client = test_client();
        assert_eq!(
            client.build_payment_url(&scenario_request()).unwrap(),
            client.build_payment_url(&scenario_request()).unwrap()
        );
    }

    #[test]
    fn test_default_create_date_is_gateway_format() {
        let request = PaymentRequest::new(100_000, "ORDER1", "127.0.0.1", "https://x/y");
        let pairs = query_pairs(&test_client().build_payment_url(&request).unwrap());
        assert!(date::is_valid_gateway_date_format(&pairs["vnp_CreateDate"]));
    }

    #[test]
    fn test_validation_errors() {
        let client = test_client();

        let zero = PaymentRequest {
            amount: 0,
            ..scenario_request()
        };
        assert!(matches!(
            client.build_payment_url(&zero),
            Err(ValidationError::InvalidAmount(_))
        ));

        let no_ref = PaymentRequest {
            txn_ref: String::new(),
            ..scenario_request()
        };
        assert_eq!(
            client.build_payment_url(&no_ref),
            Err(ValidationError::MissingField("vnp_TxnRef"))
        );

        let bad_expire = scenario_request().with_expire_date("2025131120000");
        assert_eq!(
            client.build_payment_url(&bad_expire),
            Err(ValidationError::BadDateFormat {
                field: "vnp_ExpireDate",
                value: "2025131120000".to_string()
            })
        );

        let bad_create = PaymentRequest {
            create_date: Some("2025-01-01".to_string()),
            ..scenario_request()
        };
        assert!(matches!(
            client.build_payment_url(&bad_create),
            Err(ValidationError::BadDateFormat { field: "vnp_CreateDate", .. })
        ));
    }

    #[test]
    fn test_algorithm_follows_config() {
        let client = VnpayClient::new(
            crate::GatewayConfig::new("TESTTMN1", SECRET).with_hash_algorithm("MD5"),
        )
        .unwrap();
        let url = client.build_payment_url(&scenario_request()).unwrap();
        let hash = query_pairs(&url)["vnp_SecureHash"].clone();
        assert_eq!(hash.len(), 32);
    }
}
