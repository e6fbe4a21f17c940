//! Core entity structures

use crate::{
    // ID types
    ConversationId, DisputeId, MessageId, NotificationId, ProfileId, QuestionId, RatingId,
    RewardId,
    // Other types
    ConversationStatus, DisputeStatus, JudgeLevel, MessageKind, NotificationKind, QuestionStatus,
    Timestamp, UserRole,
};
use serde::{Deserialize, Serialize};

/// Profile - an authenticated account (user, judge or admin).
/// Identity provisioning is external; profiles only mirror what the core needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub profile_id: ProfileId,
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub role: UserRole,
    pub is_online: bool,
    pub last_seen: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Question - a rules question asked by a user.
///
/// Never deleted, only status-terminated. `assigned_judge_id` is set if and
/// only if the status has left `WaitingForJudge`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub question_id: QuestionId,
    pub author_id: ProfileId,
    pub title: String,
    pub content: String,
    pub category: String,
    pub image_url: Option<String>,
    pub status: QuestionStatus,
    pub assigned_judge_id: Option<ProfileId>,
    pub created_at: Timestamp,
    pub assigned_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    /// Deadline after which the question drops out of the claimable set.
    pub timeout_at: Timestamp,
}

/// Conversation - the private 1:1 channel tied to a claimed question.
///
/// At most one conversation per question, created only once a judge wins
/// the claim; its (user, judge) pair equals the question's author and the
/// claiming judge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub conversation_id: ConversationId,
    pub question_id: QuestionId,
    pub user_id: ProfileId,
    pub judge_id: ProfileId,
    pub status: ConversationStatus,
    pub started_at: Timestamp,
    pub ended_at: Option<Timestamp>,
    pub last_message_at: Timestamp,
}

impl Conversation {
    /// Whether the given profile takes part in this conversation.
    pub fn is_participant(&self, profile_id: ProfileId) -> bool {
        self.user_id == profile_id || self.judge_id == profile_id
    }
}

/// Message - one entry in a conversation, append-only.
/// Ordered by creation time, ties broken by the store-assigned sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: MessageId,
    pub conversation_id: ConversationId,
    pub sender_id: ProfileId,
    /// Nullable for image-only messages.
    pub content: Option<String>,
    pub kind: MessageKind,
    pub image_url: Option<String>,
    pub created_at: Timestamp,
    /// Insertion order assigned by the store, used as creation-time tie-break.
    pub sequence: u64,
    pub read_at: Option<Timestamp>,
}

/// JudgeInfo - per-judge aggregate record.
///
/// Aggregate fields (`total_points`, `total_questions_answered`,
/// `average_rating`, `average_response_time_secs`) are mutated only by the
/// rating engine; availability and profile fields only by the judge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeInfo {
    pub judge_id: ProfileId,
    pub level: JudgeLevel,
    pub is_available: bool,
    pub bio: Option<String>,
    pub specialties: Vec<String>,
    pub languages: Vec<String>,
    pub badges: Vec<String>,
    pub total_points: i64,
    pub total_questions_answered: i64,
    pub average_rating: Option<f64>,
    /// Mean of (rating creation − conversation start), in whole seconds.
    pub average_response_time_secs: Option<i64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Rating - a user's terminal verdict on a conversation. Immutable, 1:1
/// with its conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub rating_id: RatingId,
    pub conversation_id: ConversationId,
    pub user_id: ProfileId,
    pub judge_id: ProfileId,
    /// 1..=5 stars.
    pub score: u8,
    pub is_accepted: bool,
    pub feedback: Option<String>,
    pub created_at: Timestamp,
}

/// Reward - one entry in a judge's append-only points ledger.
/// `JudgeInfo.total_points` is the running sum over this ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reward {
    pub reward_id: RewardId,
    pub judge_id: ProfileId,
    pub points_earned: i64,
    pub reason: String,
    pub conversation_id: Option<ConversationId>,
    pub created_at: Timestamp,
}

/// Dispute - a user's rejection of a judge's ruling, escalated for
/// administrative review. 1:1 with its conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dispute {
    pub dispute_id: DisputeId,
    pub conversation_id: ConversationId,
    pub user_id: ProfileId,
    pub judge_id: ProfileId,
    pub user_justification: String,
    pub judge_justification: Option<String>,
    pub status: DisputeStatus,
    pub resolved_by: Option<ProfileId>,
    pub resolved_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// Notification - advisory fan-out record. Best-effort and side-channel;
/// judges act through the arbiter, never through a notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub notification_id: NotificationId,
    pub recipient_id: ProfileId,
    pub title: String,
    pub content: String,
    pub kind: NotificationKind,
    /// Opaque payload (question id, conversation id, ...).
    pub data: Option<serde_json::Value>,
    pub read: bool,
    pub created_at: Timestamp,
}

// =============================================================================
// TESTS
// =============================================================================
