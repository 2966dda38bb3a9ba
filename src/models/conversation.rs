use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One follow-up question and the answer it got.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationTurn {
    pub query: String,
    pub response: String,
    pub asked_at: DateTime<Utc>,
}

/// Request body for asking a follow-up question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpQuestion {
    pub query: String,
}
