//! GAVEL Core - Entity Types
//!
//! Pure data structures with no behavior. All other crates depend on this.
//! This crate contains ONLY data types - no business logic.

pub mod entities;
pub mod enums;
pub mod error;
pub mod identity;

pub use entities::{
    Conversation, Dispute, JudgeInfo, Message, Notification, Profile, Question, Rating, Reward,
};
pub use enums::{
    ConversationStatus, DisputeStatus, EntityType, JudgeLevel, MessageKind, NotificationKind,
    QuestionStatus, UserRole,
};
pub use error::{AuthError, GavelError, GavelResult, MatchError, StorageError, ValidationError};
pub use identity::{
    new_entity_id, question_timeout, ConversationId, DisputeId, EntityId, MessageId,
    NotificationId, ProfileId, QuestionId, RatingId, RewardId, Timestamp,
    QUESTION_TIMEOUT_MINUTES,
};
