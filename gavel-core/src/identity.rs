//! Identity types for GAVEL entities

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Entity identifier using UUIDv7 for timestamp-sortable IDs.
/// UUIDv7 embeds a Unix timestamp, making IDs naturally sortable by creation time.
pub type EntityId = Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Profile identifier (users, judges and admins share the profile table).
pub type ProfileId = Uuid;

/// Question identifier.
pub type QuestionId = Uuid;

/// Conversation identifier.
pub type ConversationId = Uuid;

/// Message identifier.
pub type MessageId = Uuid;

/// Rating identifier.
pub type RatingId = Uuid;

/// Reward ledger entry identifier.
pub type RewardId = Uuid;

/// Dispute identifier.
pub type DisputeId = Uuid;

/// Notification identifier.
pub type NotificationId = Uuid;

/// How long a question stays claimable after creation, in minutes.
pub const QUESTION_TIMEOUT_MINUTES: i64 = 8;

/// How long a question stays claimable after creation.
pub fn question_timeout() -> chrono::Duration {
    chrono::Duration::minutes(QUESTION_TIMEOUT_MINUTES)
}

/// Generate a new UUIDv7 EntityId (timestamp-sortable).
pub fn new_entity_id() -> EntityId {
    Uuid::now_v7()
}
