use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

pub mod constants;
pub mod enums;
pub mod ipn;
pub mod messages;

pub use enums::{BankCode, HashAlgorithm, Locale, ProductCode, RefundTransactionType, UnknownVariant};
pub use ipn::IpnResponse;
pub use messages::{MessageTable, response_message, wrong_checksum_message};

/// Loosely typed field bag as received from the gateway (query string, form body or JSON).
///
/// Insertion order is preserved for display; signing never depends on it.
pub type FieldMap = IndexMap<String, JsonValue>;

/// Build a [`FieldMap`] from string pairs, e.g. a parsed return URL query.
pub fn field_map_from_pairs<I, K, V>(pairs: I) -> FieldMap
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), JsonValue::String(v.into())))
        .collect()
}

/// Bank descriptor returned by the bank list endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bank {
    /// Bank code usable as `vnp_BankCode`
    pub bank_code: String,

    /// Display name
    pub bank_name: String,

    /// Logo URL. The gateway returns a host-relative path; clients resolve it.
    pub logo_link: String,

    /// Bank type (card, QR, wallet...)
    #[serde(default)]
    pub bank_type: i64,

    /// Display position in the gateway UI
    #[serde(default)]
    pub display_order: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_map_from_pairs_keeps_order() {
        let map = field_map_from_pairs([("vnp_TxnRef", "ORDER1"), ("vnp_Amount", "100")]);
        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec!["vnp_TxnRef", "vnp_Amount"]);
        assert_eq!(map["vnp_Amount"], JsonValue::String("100".to_string()));
    }

    #[test]
    fn test_bank_deserialize_with_defaults() {
        let bank: Bank = serde_json::from_str(
            r#"{"bank_code":"NCB","bank_name":"Ngan hang NCB","logo_link":"/images/bank/ncb.png"}"#,
        )
        .unwrap();
        assert_eq!(bank.bank_code, "NCB");
        assert_eq!(bank.bank_type, 0);
        assert_eq!(bank.display_order, 0);
    }
}
