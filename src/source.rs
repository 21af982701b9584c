//! Message-source seam: the narrow interface the pipeline uses to talk to a
//! mailbox, plus the wire shape of a raw message.
//!
//! The concrete Gmail implementation lives in `gmail.rs`; tests substitute
//! in-memory fakes behind the same traits.

use async_trait::async_trait;
use serde::Deserialize;

// ============================================================================
// Raw message wire types
// ============================================================================

/// Opaque source-assigned message identifier.
pub type MessageId = String;

/// A raw message as returned by the source: header list plus a possibly
/// multipart, transport-encoded body tree.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessage {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub payload: Option<MessagePart>,
}

/// One MIME node. Leaf parts carry body data; multipart nodes carry children.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePart {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default)]
    pub body: Option<PartBody>,
    #[serde(default)]
    pub parts: Vec<MessagePart>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Header {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
}

/// URL-safe base64 body data, as the Gmail API encodes it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartBody {
    #[serde(default)]
    pub data: Option<String>,
}

// ============================================================================
// Errors
// ============================================================================

/// Errors from the message source, classified by recoverability so the
/// retry layer knows what is worth another attempt.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Fetch timed out after {0}s")]
    Timeout(u64),

    #[error("Access token expired or revoked")]
    AuthExpired,

    #[error("Message not found: {0}")]
    NotFound(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Token provider failed: {0}")]
    Token(String),
}

impl SourceError {
    /// True for failures that a retry may cure: transport errors, timeouts,
    /// rate limits, and server-side 5xx-equivalents.
    pub fn is_transient(&self) -> bool {
        match self {
            SourceError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            SourceError::Timeout(_) => true,
            SourceError::Api { status, .. } => {
                *status == 408 || *status == 429 || (500..600).contains(&(*status as u32))
            }
            SourceError::AuthExpired | SourceError::NotFound(_) | SourceError::Token(_) => false,
        }
    }
}

// ============================================================================
// Seams
// ============================================================================

/// Supplies a valid bearer token per call. Acquisition and refresh are the
/// provider's problem; the pipeline just asks.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, SourceError>;
}

/// A fixed token, handed in at startup. Suits short-lived CLI syncs and tests.
pub struct StaticToken(pub String);

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String, SourceError> {
        Ok(self.0.clone())
    }
}

/// The mailbox itself. Both calls are network operations that may fail
/// transiently; retry and parallelism live in the fetch layer, not here.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// List message ids matching `query`, newest first, capped at `limit`.
    async fn list_message_ids(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<MessageId>, SourceError>;

    /// Fetch one full message.
    async fn get_message(&self, id: &MessageId) -> Result<RawMessage, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(SourceError::Timeout(15).is_transient());
        assert!(SourceError::Api {
            status: 503,
            message: String::new()
        }
        .is_transient());
        assert!(SourceError::Api {
            status: 429,
            message: String::new()
        }
        .is_transient());
        assert!(!SourceError::Api {
            status: 403,
            message: String::new()
        }
        .is_transient());
        assert!(!SourceError::NotFound("m1".into()).is_transient());
        assert!(!SourceError::AuthExpired.is_transient());
    }

    #[test]
    fn test_raw_message_deserialization() {
        let json = r#"{
            "id": "msg1",
            "payload": {
                "mimeType": "multipart/alternative",
                "headers": [
                    {"name": "Subject", "value": "Your application"},
                    {"name": "From", "value": "hr@initech.com"}
                ],
                "parts": [
                    {"mimeType": "text/plain", "body": {"data": "aGVsbG8"}},
                    {"mimeType": "text/html", "body": {"data": "PGI-aGk8L2I-"}}
                ]
            }
        }"#;

        let msg: RawMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.id, "msg1");
        let payload = msg.payload.unwrap();
        assert_eq!(payload.headers.len(), 2);
        assert_eq!(payload.parts.len(), 2);
        assert_eq!(payload.parts[0].mime_type, "text/plain");
    }

    #[test]
    fn test_raw_message_no_payload() {
        let msg: RawMessage = serde_json::from_str(r#"{"id": "m2"}"#).unwrap();
        assert!(msg.payload.is_none());
    }
}
