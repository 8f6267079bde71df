//! UI-agnostic conversation state for one chat session.
//!
//! The session owns the ordered message list and the pending-request flag.
//! A front-end feeds it submissions and outcomes and renders read-only
//! snapshots; nothing else mutates the conversation.

use async_trait::async_trait;

/// A chat message in the conversation. Messages are immutable once created
/// and kept in append order, which is also display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub origin: Origin,
    pub text: String,
}

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    User,
    Assistant,
}

/// Tagged result of one call to the reply service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// Non-empty reply text.
    Reply(String),
    /// The service reported an application error in-band.
    ServiceError(String),
    /// The response carried neither a reply nor an error.
    Empty,
    /// Network failure, or a body that did not parse as JSON.
    TransportError,
}

/// A single best-effort request to the remote reply service.
#[async_trait]
pub trait ReplyService {
    async fn send(&self, user_message: &str, language: &str) -> ReplyOutcome;
}

/// What to do with a submission that arrives while a request is still
/// outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionPolicy {
    /// Drop the new submission entirely.
    #[default]
    RejectWhilePending,
    /// Accept it; only the newest request's outcome is applied.
    LatestWins,
}

impl SubmissionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionPolicy::RejectWhilePending => "reject",
            SubmissionPolicy::LatestWins => "latest",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "reject" => Some(SubmissionPolicy::RejectWhilePending),
            "latest" => Some(SubmissionPolicy::LatestWins),
            _ => None,
        }
    }
}

/// An accepted submission: the trimmed text to send and the request id its
/// outcome must be resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub id: u64,
    pub text: String,
}

pub struct ChatSession {
    messages: Vec<ChatMessage>,
    outstanding: Option<u64>,
    next_request_id: u64,
    language: String,
    policy: SubmissionPolicy,
}

impl ChatSession {
    pub fn new(language: &str, policy: SubmissionPolicy) -> Self {
        Self {
            messages: Vec::new(),
            outstanding: None,
            next_request_id: 0,
            language: language.to_string(),
            policy,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_pending(&self) -> bool {
        self.outstanding.is_some()
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn set_language(&mut self, language: &str) {
        self.language = language.to_string();
    }

    /// Accept a submission. Whitespace-only input is dropped silently, as is
    /// input arriving while a request is outstanding under
    /// `RejectWhilePending`. On acceptance the user message is appended
    /// before any request is made.
    pub fn begin(&mut self, input: &str) -> Option<Submission> {
        let text = input.trim();
        if text.is_empty() {
            return None;
        }
        if self.outstanding.is_some() && self.policy == SubmissionPolicy::RejectWhilePending {
            return None;
        }

        self.messages.push(ChatMessage {
            origin: Origin::User,
            text: text.to_string(),
        });

        let id = self.next_request_id;
        self.next_request_id += 1;
        // Under LatestWins this orphans any older outstanding request; its
        // outcome no longer matches and is dropped in resolve().
        self.outstanding = Some(id);

        Some(Submission {
            id,
            text: text.to_string(),
        })
    }

    /// Apply the outcome of request `id`. Stale outcomes (anything but the
    /// most recent outstanding id) are ignored entirely.
    pub fn resolve(&mut self, id: u64, outcome: ReplyOutcome) {
        if self.outstanding != Some(id) {
            return;
        }
        self.outstanding = None;

        let text = match outcome {
            ReplyOutcome::Reply(reply) => reply,
            ReplyOutcome::ServiceError(error) => format!("Error: {}", error),
            ReplyOutcome::TransportError => "Network or server error".to_string(),
            ReplyOutcome::Empty => return,
        };
        self.messages.push(ChatMessage {
            origin: Origin::Assistant,
            text,
        });
    }

    /// One full submission cycle: accept the input, issue exactly one
    /// best-effort request, apply the outcome. No retry, no timeout, no
    /// cancellation. Returns false if the input was dropped without a
    /// request.
    pub async fn submit<S: ReplyService + ?Sized>(&mut self, service: &S, input: &str) -> bool {
        let Some(submission) = self.begin(input) else {
            return false;
        };
        let outcome = service.send(&submission.text, &self.language).await;
        self.resolve(submission.id, outcome);
        true
    }
}
