pub mod api;
pub mod config;
pub mod session;

// Re-export main types for convenience
pub use api::{ChatClient, DEFAULT_ENDPOINT};
pub use config::Config;
pub use session::{
    ChatMessage, ChatSession, Origin, ReplyOutcome, ReplyService, Submission, SubmissionPolicy,
};
