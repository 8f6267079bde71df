use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::session::{ReplyOutcome, ReplyService};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000";

#[derive(Serialize)]
struct ChatRequest {
    user_message: String,
    language: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    reply: Option<String>,
    error: Option<String>,
}

#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
}

impl ChatClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn request(&self, user_message: &str, language: &str) -> Result<ChatResponse> {
        let url = format!("{}/api/chat", self.base_url);

        let request = ChatRequest {
            user_message: user_message.to_string(),
            language: language.to_string(),
        };

        let response = self.client.post(&url).json(&request).send().await?;

        debug!("chat request to {} returned {}", url, response.status());

        // The service reports application errors in-band with the same JSON
        // shape on non-2xx responses, so the body is parsed unconditionally.
        let parsed: ChatResponse = response.json().await?;
        Ok(parsed)
    }
}

fn outcome_from(response: ChatResponse) -> ReplyOutcome {
    match (response.reply, response.error) {
        (Some(reply), _) if !reply.is_empty() => ReplyOutcome::Reply(reply),
        (_, Some(error)) if !error.is_empty() => ReplyOutcome::ServiceError(error),
        _ => ReplyOutcome::Empty,
    }
}

#[async_trait]
impl ReplyService for ChatClient {
    async fn send(&self, user_message: &str, language: &str) -> ReplyOutcome {
        match self.request(user_message, language).await {
            Ok(response) => outcome_from(response),
            Err(err) => {
                warn!("chat request failed: {:#}", err);
                ReplyOutcome::TransportError
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(reply: Option<&str>, error: Option<&str>) -> ChatResponse {
        ChatResponse {
            reply: reply.map(String::from),
            error: error.map(String::from),
        }
    }

    #[test]
    fn reply_takes_precedence_over_error() {
        assert_eq!(
            outcome_from(response(Some("hi there"), Some("ignored"))),
            ReplyOutcome::Reply("hi there".to_string())
        );
    }

    #[test]
    fn error_field_maps_to_service_error() {
        assert_eq!(
            outcome_from(response(None, Some("rate limited"))),
            ReplyOutcome::ServiceError("rate limited".to_string())
        );
    }

    #[test]
    fn empty_reply_falls_through_to_error() {
        assert_eq!(
            outcome_from(response(Some(""), Some("no message provided"))),
            ReplyOutcome::ServiceError("no message provided".to_string())
        );
    }

    #[test]
    fn body_without_either_field_is_empty() {
        assert_eq!(outcome_from(response(None, None)), ReplyOutcome::Empty);
        assert_eq!(outcome_from(response(Some(""), None)), ReplyOutcome::Empty);
        assert_eq!(outcome_from(response(None, Some(""))), ReplyOutcome::Empty);
    }

    #[test]
    fn trailing_slash_is_trimmed_from_base_url() {
        let client = ChatClient::new("http://localhost:5000/");
        assert_eq!(client.base_url, "http://localhost:5000");
    }
}
