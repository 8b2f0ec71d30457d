use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Returned when a string does not name a known protocol value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported {kind}: {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// HMAC digest used for `vnp_SecureHash`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HashAlgorithm {
    #[serde(alias = "sha256")]
    Sha256,
    #[default]
    #[serde(alias = "sha512")]
    Sha512,
    #[serde(alias = "md5")]
    Md5,
}

impl HashAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "SHA256",
            HashAlgorithm::Sha512 => "SHA512",
            HashAlgorithm::Md5 => "MD5",
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SHA256" => Ok(HashAlgorithm::Sha256),
            "SHA512" => Ok(HashAlgorithm::Sha512),
            "MD5" => Ok(HashAlgorithm::Md5),
            _ => Err(UnknownVariant::new("hash algorithm", s)),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Language of the gateway payment page and of response messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Vn,
    En,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Vn => "vn",
            Locale::En => "en",
        }
    }
}

impl FromStr for Locale {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vn" => Ok(Locale::Vn),
            "en" => Ok(Locale::En),
            _ => Err(UnknownVariant::new("locale", s)),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Goods category sent as `vnp_OrderType`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ProductCode {
    #[default]
    Other,
    BillPayment,
    Topup,
    Fashion,
    /// Any category code not listed above
    Custom(String),
}

impl ProductCode {
    pub fn as_str(&self) -> &str {
        match self {
            ProductCode::Other => "other",
            ProductCode::BillPayment => "billpayment",
            ProductCode::Topup => "topup",
            ProductCode::Fashion => "fashion",
            ProductCode::Custom(code) => code,
        }
    }
}

impl From<&str> for ProductCode {
    fn from(value: &str) -> Self {
        match value {
            "other" => ProductCode::Other,
            "billpayment" => ProductCode::BillPayment,
            "topup" => ProductCode::Topup,
            "fashion" => ProductCode::Fashion,
            custom => ProductCode::Custom(custom.to_string()),
        }
    }
}

/// Preselected payment method sent as `vnp_BankCode`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BankCode {
    /// QR code payment through a banking app
    VnpayQr,
    /// Domestic ATM card / bank account
    VnBank,
    /// International card
    IntCard,
    /// A specific bank, as listed by the bank list endpoint
    Bank(String),
}

impl BankCode {
    pub fn as_str(&self) -> &str {
        match self {
            BankCode::VnpayQr => "VNPAYQR",
            BankCode::VnBank => "VNBANK",
            BankCode::IntCard => "INTCARD",
            BankCode::Bank(code) => code,
        }
    }
}

impl From<&str> for BankCode {
    fn from(value: &str) -> Self {
        match value {
            "VNPAYQR" => BankCode::VnpayQr,
            "VNBANK" => BankCode::VnBank,
            "INTCARD" => BankCode::IntCard,
            code => BankCode::Bank(code.to_string()),
        }
    }
}

/// `vnp_TransactionType` of a refund request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RefundTransactionType {
    /// Refund the full transaction amount
    #[serde(rename = "02")]
    FullRefund,
    /// Refund part of the transaction amount
    #[serde(rename = "03")]
    PartialRefund,
}

impl RefundTransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefundTransactionType::FullRefund => "02",
            RefundTransactionType::PartialRefund => "03",
        }
    }
}

impl FromStr for RefundTransactionType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "02" => Ok(RefundTransactionType::FullRefund),
            "03" => Ok(RefundTransactionType::PartialRefund),
            _ => Err(UnknownVariant::new("refund transaction type", s)),
        }
    }
}

impl fmt::Display for RefundTransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Category and bank codes accept any string, so they go through `From<&str>`.

impl Serialize for ProductCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProductCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(ProductCode::from(raw.as_str()))
    }
}

impl Serialize for BankCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BankCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(BankCode::from(raw.as_str()))
    }
}
