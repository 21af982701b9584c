//! Message normalization: raw source payload → canonical `EmailRecord`.
//!
//! Pure and total. Missing headers become empty strings, undecodable bodies
//! become empty strings, and truncation happens after decoding so a cut
//! never lands inside a multi-byte sequence.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use chrono::{DateTime, Utc};

use crate::model::EmailRecord;
use crate::source::{MessagePart, RawMessage};

/// URL-safe base64, padding-indifferent: sources emit both padded and
/// unpadded `body.data`.
const BODY_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Build the canonical record for a raw message, truncating the decoded
/// body to `max_body_length` characters.
pub fn normalize(message: &RawMessage, max_body_length: usize) -> EmailRecord {
    let payload = message.payload.as_ref();

    let header = |name: &str| -> String {
        payload
            .map(|p| p.headers.as_slice())
            .unwrap_or(&[])
            .iter()
            .find(|h| h.name == name)
            .map(|h| h.value.clone())
            .unwrap_or_default()
    };

    let body = payload.map(extract_body).unwrap_or_default();

    EmailRecord {
        subject: header("Subject"),
        sender: header("From"),
        date: header("Date"),
        body: truncate_chars(&body, max_body_length),
    }
}

/// Prefer the first `text/plain` part (depth-first), fall back to the
/// top-level body data, fall back to empty.
fn extract_body(payload: &MessagePart) -> String {
    if let Some(text) = find_part(payload, "text/plain") {
        return text;
    }
    payload
        .body
        .as_ref()
        .and_then(|b| b.data.as_deref())
        .map(decode_body)
        .unwrap_or_default()
}

fn find_part(part: &MessagePart, target_mime: &str) -> Option<String> {
    if part.mime_type == target_mime {
        if let Some(data) = part.body.as_ref().and_then(|b| b.data.as_deref()) {
            return Some(decode_body(data));
        }
    }
    for child in &part.parts {
        if let Some(text) = find_part(child, target_mime) {
            return Some(text);
        }
    }
    None
}

/// Decode URL-safe base64, padded or not, with lossy UTF-8. Never errors.
fn decode_body(data: &str) -> String {
    match BODY_ENGINE.decode(data) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => String::new(),
    }
}

/// Truncate to at most `max_chars` characters on a char boundary.
fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((i, _)) => s[..i].to_string(),
        None => s.to_string(),
    }
}

/// Parse a source-native Date header into UTC. Falls back to now when the
/// value is missing or unparseable, so downstream timestamps always exist.
pub fn parse_message_date(date: &str) -> DateTime<Utc> {
    // Strip a trailing "(UTC)"-style comment, common in Date headers.
    let cleaned = match date.find('(') {
        Some(i) => date[..i].trim(),
        None => date.trim(),
    };
    if cleaned.is_empty() {
        return Utc::now();
    }
    DateTime::parse_from_rfc2822(cleaned)
        .or_else(|_| DateTime::parse_from_rfc3339(cleaned))
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
