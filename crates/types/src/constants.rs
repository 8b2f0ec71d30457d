//! Protocol constants shared by every gateway operation.

/// Protocol version sent as `vnp_Version`
pub const VNP_VERSION: &str = "2.1.0";

/// Sandbox gateway host
pub const SANDBOX_HOST: &str = "https://sandbox.vnpayment.vn";

/// Production gateway host
pub const PRODUCTION_HOST: &str = "https://pay.vnpay.vn";

/// Default payment page path
pub const PAYMENT_ENDPOINT: &str = "paymentv2/vpcpay.html";

/// Default path shared by the querydr and refund commands
pub const QUERY_DR_REFUND_ENDPOINT: &str = "merchant_webapi/api/transaction";

/// Default bank list path
pub const BANK_LIST_ENDPOINT: &str = "qrpayauth/api/merchant/get_bank_list";

/// Response code meaning success, for every command
pub const SUCCESS_CODE: &str = "00";

/// Number of minor units per major unit on the wire
pub const AMOUNT_SCALE: u64 = 100;

/// Offset of the gateway's fixed timezone (UTC+7), in seconds
pub const GATEWAY_UTC_OFFSET_SECS: i32 = 7 * 3600;

/// `yyyyMMddHHmmss` as a chrono format string
pub const GATEWAY_DATE_FORMAT: &str = "%Y%m%d%H%M%S";

pub mod commands {
    pub const PAY: &str = "pay";
    pub const QUERY_DR: &str = "querydr";
    pub const REFUND: &str = "refund";
}

/// Field names used on the wire
pub mod fields {
    pub const VERSION: &str = "vnp_Version";
    pub const COMMAND: &str = "vnp_Command";
    pub const TMN_CODE: &str = "vnp_TmnCode";
    pub const AMOUNT: &str = "vnp_Amount";
    pub const CURR_CODE: &str = "vnp_CurrCode";
    pub const LOCALE: &str = "vnp_Locale";
    pub const TXN_REF: &str = "vnp_TxnRef";
    pub const ORDER_INFO: &str = "vnp_OrderInfo";
    pub const ORDER_TYPE: &str = "vnp_OrderType";
    pub const IP_ADDR: &str = "vnp_IpAddr";
    pub const RETURN_URL: &str = "vnp_ReturnUrl";
    pub const CREATE_DATE: &str = "vnp_CreateDate";
    pub const EXPIRE_DATE: &str = "vnp_ExpireDate";
    pub const BANK_CODE: &str = "vnp_BankCode";
    pub const RESPONSE_CODE: &str = "vnp_ResponseCode";
    pub const TRANSACTION_NO: &str = "vnp_TransactionNo";
    pub const TRANSACTION_STATUS: &str = "vnp_TransactionStatus";
    pub const PAY_DATE: &str = "vnp_PayDate";
    pub const SECURE_HASH: &str = "vnp_SecureHash";
    pub const SECURE_HASH_TYPE: &str = "vnp_SecureHashType";
}
