//! VNPay SDK
//!
//! This crate is a client for the VNPay payment gateway protocol. It signs
//! outbound requests, verifies inbound callbacks and talks to the merchant
//! API for transaction queries and refunds.
//!
//! # Overview
//!
//! Everything hangs off [`VnpayClient`]:
//!
//! - [`VnpayClient::build_payment_url`] - Signed redirect URL for a checkout attempt
//! - [`VnpayClient::verify_return_url`] / [`VnpayClient::verify_ipn_call`] - Authenticate gateway callbacks
//! - [`VnpayClient::query_dr`] - Query the state of a transaction
//! - [`VnpayClient::refund`] - Full or partial refund
//! - [`VnpayClient::get_bank_list`] - Banks enabled for the merchant
//!
//! # Quick Start
//!
//! ## Redirecting to the payment page
//!
//! ```ignore
//! use vnpay_sdk::{GatewayConfig, PaymentRequest, VnpayClient};
//!
//! let client = VnpayClient::new(
//!     GatewayConfig::new("YOURTMNCODE", "your-secure-secret").with_test_mode(),
//! )?;
//!
//! // Amount is in major units; the wire format is scaled by 100
//! let url = client.build_payment_url(
//!     &PaymentRequest::new(100_000, "ORDER1", "203.0.113.7", "https://shop.example/return"),
//! )?;
//! ```
//!
//! ## Handling the IPN call
//!
//! ```ignore
//! use vnpay_sdk::{OrderLookup, field_map_from_pairs};
//!
//! let result = client.verify_ipn_call(&field_map_from_pairs(query_pairs))?;
//! let order = match orders.find(result.txn_ref.as_deref()) {
//!     None => OrderLookup::NotFound,
//!     Some(o) if o.confirmed => OrderLookup::AlreadyConfirmed,
//!     Some(o) => OrderLookup::Pending { amount: o.amount },
//! };
//! let ack = result.ipn_response(order);
//! if ack.is_success() && result.is_success() {
//!     orders.confirm(...);
//! }
//! // Respond with `ack` as JSON
//! ```
//!
//! # Trust model
//!
//! A response code of `"00"` means nothing on its own. Results carry
//! `signature_verified` and `business_success` separately, and
//! `is_success()` requires both.

pub mod amount;
pub mod banks;
pub mod canonical;
pub mod client;
pub mod config;
pub mod date;
pub mod error;
pub mod hash;
pub mod logger;
pub mod payment_url;
pub mod pipe;
pub mod transaction;
pub mod verify;

#[cfg(test)]
mod test;

// Re-export main types at crate root
pub use client::VnpayClient;
pub use config::{Endpoints, GatewayConfig};
pub use error::{ConfigError, GatewayError, Result, TransportError, ValidationError};
pub use hash::SecureHasher;
pub use logger::{FieldPolicy, FnSink, GatewayLogger, LogError, LogRecord, LogSink, TracingSink};
pub use payment_url::{PaymentRequest, PaymentUrlParams};
pub use transaction::{
    QueryDrBody, QueryDrRequest, QueryResult, RefundBody, RefundRequest, RefundResult,
    TransactionResponse, TransactionResult, parse_transaction_type,
};
pub use verify::{CallbackState, OrderLookup, VerificationResult};
pub use vnpay_types::{
    Bank, BankCode, FieldMap, HashAlgorithm, IpnResponse, Locale, ProductCode,
    RefundTransactionType, field_map_from_pairs,
};
