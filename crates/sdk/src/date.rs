//! Gateway timestamps: `yyyyMMddHHmmss` in a fixed UTC+7 offset.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use vnpay_types::constants::{GATEWAY_DATE_FORMAT, GATEWAY_UTC_OFFSET_SECS};

use crate::error::ValidationError;

pub fn gateway_offset() -> FixedOffset {
    FixedOffset::east_opt(GATEWAY_UTC_OFFSET_SECS).expect("UTC+7 is a valid offset")
}

pub fn now_in_gateway_tz() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&gateway_offset())
}

/// Format any instant as gateway local time
pub fn format_gateway_date<Tz: TimeZone>(instant: &DateTime<Tz>) -> String {
    instant
        .with_timezone(&gateway_offset())
        .format(GATEWAY_DATE_FORMAT)
        .to_string()
}

/// Exactly 14 ASCII digits with month 01-12, day 01-31, hour 00-23,
/// minute and second 00-59. Calendar validity (e.g. Feb 30) is not checked.
pub fn is_valid_gateway_date_format(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 14 || !bytes.iter().all(u8::is_ascii_digit) {
        return false;
    }
    let part = |start: usize| -> u32 {
        ((bytes[start] - b'0') as u32) * 10 + (bytes[start + 1] - b'0') as u32
    };
    let (month, day, hour, minute, second) = (part(4), part(6), part(8), part(10), part(12));
    (1..=12).contains(&month)
        && (1..=31).contains(&day)
        && hour <= 23
        && minute <= 59
        && second <= 59
}

/// Parse a gateway timestamp; `None` when malformed or not a real calendar date
pub fn parse_gateway_date(value: &str) -> Option<DateTime<FixedOffset>> {
    if !is_valid_gateway_date_format(value) {
        return None;
    }
    let naive = NaiveDateTime::parse_from_str(value, GATEWAY_DATE_FORMAT).ok()?;
    gateway_offset().from_local_datetime(&naive).single()
}

/// Reject `value` unless it is a well-formed gateway timestamp
pub(crate) fn ensure_gateway_date(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if is_valid_gateway_date_format(value) {
        Ok(())
    } else {
        Err(ValidationError::BadDateFormat {
            field,
            value: value.to_string(),
        })
    }
}
