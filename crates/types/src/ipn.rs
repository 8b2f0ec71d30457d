//! Acknowledgement body returned to the gateway after an IPN call.
//!
//! The gateway only understands this fixed vocabulary; do not localize it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpnResponse {
    #[serde(rename = "RspCode")]
    pub rsp_code: String,
    #[serde(rename = "Message")]
    pub message: String,
}

impl IpnResponse {
    fn new(rsp_code: &str, message: &str) -> Self {
        Self {
            rsp_code: rsp_code.to_string(),
            message: message.to_string(),
        }
    }

    pub fn success() -> Self {
        Self::new("00", "Confirm Success")
    }

    pub fn order_not_found() -> Self {
        Self::new("01", "Order not found")
    }

    pub fn order_already_confirmed() -> Self {
        Self::new("02", "Order already confirmed")
    }

    pub fn invalid_amount() -> Self {
        Self::new("04", "Invalid amount")
    }

    pub fn fail_checksum() -> Self {
        Self::new("97", "Fail checksum")
    }

    pub fn unknown_error() -> Self {
        Self::new("99", "Unknown error")
    }

    /// `RspCode == "00"`: the merchant accepted the payment
    pub fn is_success(&self) -> bool {
        self.rsp_code == "00"
    }

    /// Every acknowledgement the gateway accepts
    pub fn all() -> [Self; 6] {
        [
            Self::success(),
            Self::order_not_found(),
            Self::order_already_confirmed(),
            Self::invalid_amount(),
            Self::fail_checksum(),
            Self::unknown_error(),
        ]
    }
}
