//! Opaque listing cursors: base64 of an RFC 3339 timestamp with nanoseconds.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, SecondsFormat, Utc};

pub fn encode_cursor(at: DateTime<Utc>) -> String {
    STANDARD.encode(at.to_rfc3339_opts(SecondsFormat::Nanos, true))
}

/// Decodes a cursor. Anything malformed yields `None`, meaning "start from the top".
pub fn decode_cursor(cursor: &str) -> Option<DateTime<Utc>> {
    let cursor = cursor.trim();
    if cursor.is_empty() {
        return None;
    }

    let bytes = STANDARD.decode(cursor).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}
