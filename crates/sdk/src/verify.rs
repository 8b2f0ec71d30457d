//! Return URL and IPN verification.
//!
//! A callback is `Malformed` (returned as [`ValidationError`]), has an invalid
//! signature, or is verified and then either a business success or failure.
//! The response code is carried through in every case, but it carries no
//! meaning unless the signature verified: anyone can forge `"00"`.

use serde::Serialize;
use vnpay_types::{
    FieldMap, IpnResponse, MessageTable,
    constants::{SUCCESS_CODE, fields},
    response_message, wrong_checksum_message,
};

use crate::{amount, canonical, client::VnpayClient, error::ValidationError, logger::LogRecord};

/// Where a well-formed callback ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallbackState {
    /// Reject unconditionally, whatever the response code says
    SignatureInvalid,
    BusinessSuccess,
    BusinessFailure,
}

/// Outcome of verifying a return URL or IPN call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationResult {
    /// Always true for inbound callbacks; kept so every result has the same three axes
    pub transport_ok: bool,

    /// The recomputed secure hash matched the received one
    pub signature_verified: bool,

    /// `vnp_ResponseCode == "00"`. Meaningless when `signature_verified` is false.
    pub business_success: bool,

    /// Localized message; the wrong-checksum message when the signature failed
    pub message: String,

    pub response_code: Option<String>,

    pub txn_ref: Option<String>,

    /// Major units
    pub amount: u64,

    /// Minor units, as received
    pub amount_minor: u64,

    /// The callback fields exactly as received, hash included
    pub fields: FieldMap,
}

impl VerificationResult {
    pub fn state(&self) -> CallbackState {
        match (self.signature_verified, self.business_success) {
            (false, _) => CallbackState::SignatureInvalid,
            (true, true) => CallbackState::BusinessSuccess,
            (true, false) => CallbackState::BusinessFailure,
        }
    }

    /// Paid, and provably so
    pub fn is_success(&self) -> bool {
        self.signature_verified && self.business_success
    }

    /// A string field from the callback
    pub fn field(&self, key: &str) -> Option<String> {
        self.fields.get(key).and_then(canonical::stringify)
    }

    /// Acknowledgement for an IPN call once the order has been looked up.
    ///
    /// Signature is checked before anything the caller found out about the
    /// order, so a forged call always gets `97`.
    pub fn ipn_response(&self, order: OrderLookup) -> IpnResponse {
        if !self.signature_verified {
            return IpnResponse::fail_checksum();
        }
        match order {
            OrderLookup::NotFound => IpnResponse::order_not_found(),
            OrderLookup::AlreadyConfirmed => IpnResponse::order_already_confirmed(),
            OrderLookup::Pending { amount } if amount != self.amount => {
                IpnResponse::invalid_amount()
            }
            OrderLookup::Pending { .. } => IpnResponse::success(),
        }
    }
}

/// What the order store knows about `vnp_TxnRef`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderLookup {
    NotFound,
    AlreadyConfirmed,
    /// Awaiting payment, expected amount in major units
    Pending { amount: u64 },
}

impl VnpayClient {
    /// Verify the query parameters the customer was redirected back with
    pub fn verify_return_url(&self, fields: &FieldMap) -> Result<VerificationResult, ValidationError> {
        self.verify_callback("verifyReturnUrl", fields)
    }

    /// Verify a server-to-server IPN call. Same checks as the return URL.
    pub fn verify_ipn_call(&self, fields: &FieldMap) -> Result<VerificationResult, ValidationError> {
        self.verify_callback("verifyIpnCall", fields)
    }

    fn verify_callback(
        &self,
        method: &str,
        received: &FieldMap,
    ) -> Result<VerificationResult, ValidationError> {
        let mut signed_fields = received.clone();
        let received_hash = signed_fields
            .shift_remove(fields::SECURE_HASH)
            .as_ref()
            .and_then(canonical::stringify)
            .unwrap_or_default();
        signed_fields.shift_remove(fields::SECURE_HASH_TYPE);

        let amount_minor = signed_fields
            .get(fields::AMOUNT)
            .ok_or(ValidationError::MissingField(fields::AMOUNT))
            .and_then(amount::parse_amount)?;
        let amount_major = amount::decode_amount(amount_minor)?;

        let signed_data = canonical::encode(&signed_fields);
        let signature_verified = self.hasher.verify(&signed_data, &received_hash);

        let response_code = signed_fields
            .get(fields::RESPONSE_CODE)
            .and_then(canonical::stringify);
        let business_success = response_code.as_deref() == Some(SUCCESS_CODE);

        let locale = self.settings.locale;
        let message = if signature_verified {
            response_message(
                MessageTable::PaymentReturn,
                response_code.as_deref().unwrap_or_default(),
                locale,
            )
        } else {
            wrong_checksum_message(locale)
        };

        let result = VerificationResult {
            transport_ok: true,
            signature_verified,
            business_success,
            message: message.to_string(),
            response_code,
            txn_ref: signed_fields
                .get(fields::TXN_REF)
                .and_then(canonical::stringify),
            amount: amount_major,
            amount_minor,
            fields: received.clone(),
        };

        if !signature_verified {
            tracing::warn!(
                method = method,
                txn_ref = ?result.txn_ref,
                "Callback signature verification failed"
            );
        }
        self.logger.log(
            LogRecord::new(method)
                .with_fields(received.clone())
                .with_field("isVerified", result.signature_verified)
                .with_field("isSuccess", result.business_success)
                .with_field("message", &result.message)
                .with_field("amount", result.amount),
        );

        Ok(result)
    }
}
