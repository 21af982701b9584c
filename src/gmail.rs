//! Gmail API v1 message source.
//!
//! Lists candidate messages with the configured search query, then fetches
//! each message with `format=full` so the normalizer can walk MIME parts.
//! Retry and parallelism are the fetch layer's job; this module only maps
//! HTTP outcomes onto `SourceError`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::source::{MessageId, MessageSource, RawMessage, SourceError, TokenProvider};

const GMAIL_BASE: &str = "https://gmail.googleapis.com/gmail/v1/users/me";

// ============================================================================
// API response types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageListResponse {
    #[serde(default)]
    messages: Vec<MessageStub>,
}

#[derive(Debug, Deserialize)]
struct MessageStub {
    id: String,
}

// ============================================================================
// Source implementation
// ============================================================================

/// Gmail-backed `MessageSource`. The per-request timeout is baked into the
/// HTTP client so a hung fetch surfaces as a transport timeout.
pub struct GmailSource {
    client: reqwest::Client,
    tokens: std::sync::Arc<dyn TokenProvider>,
}

impl GmailSource {
    pub fn new(
        tokens: std::sync::Arc<dyn TokenProvider>,
        fetch_timeout_secs: u64,
    ) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(fetch_timeout_secs))
            .build()?;
        Ok(Self { client, tokens })
    }

    /// Map a non-success response onto a classified error.
    async fn error_for(resp: reqwest::Response, id: Option<&str>) -> SourceError {
        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return SourceError::AuthExpired;
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return SourceError::NotFound(id.unwrap_or("?").to_string());
        }
        let message = resp.text().await.unwrap_or_default();
        SourceError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl MessageSource for GmailSource {
    async fn list_message_ids(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<MessageId>, SourceError> {
        let token = self.tokens.access_token().await?;
        let resp = self
            .client
            .get(format!("{GMAIL_BASE}/messages"))
            .bearer_auth(&token)
            .query(&[("q", query.to_string()), ("maxResults", limit.to_string())])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Self::error_for(resp, None).await);
        }

        let list: MessageListResponse = resp.json().await?;
        log::debug!("gmail list returned {} candidate messages", list.messages.len());
        Ok(list.messages.into_iter().map(|m| m.id).collect())
    }

    async fn get_message(&self, id: &MessageId) -> Result<RawMessage, SourceError> {
        let token = self.tokens.access_token().await?;
        let resp = self
            .client
            .get(format!("{GMAIL_BASE}/messages/{id}"))
            .bearer_auth(&token)
            .query(&[("format", "full")])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Self::error_for(resp, Some(id)).await);
        }

        Ok(resp.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_list_deserialization() {
        let json = r#"{
            "messages": [{"id": "m1", "threadId": "t1"}, {"id": "m2", "threadId": "t2"}],
            "resultSizeEstimate": 2
        }"#;
        let list: MessageListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(list.messages.len(), 2);
        assert_eq!(list.messages[0].id, "m1");
    }

    #[test]
    fn test_message_list_empty() {
        let list: MessageListResponse =
            serde_json::from_str(r#"{"resultSizeEstimate": 0}"#).unwrap();
        assert!(list.messages.is_empty());
    }
}
