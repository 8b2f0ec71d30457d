//! Pipe-delimited signing strings for the JSON commands (querydr, refund).
//!
//! Field order is fixed per command and per direction; callers pass values in
//! that order. Absent values become empty segments, so the number of
//! separators never changes.

/// Join values with `|`, writing absent values as empty strings
pub fn join(values: &[Option<&str>]) -> String {
    values
        .iter()
        .map(|v| v.unwrap_or(""))
        .collect::<Vec<_>>()
        .join("|")
}
