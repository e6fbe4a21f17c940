//! GAVEL Test Utilities
//!
//! Centralized test infrastructure for the GAVEL workspace:
//! - Proptest generators for all entity types
//! - Test fixtures for common scenarios
//! - Custom assertions

// Re-export the in-memory store from its source crate
pub use gavel_storage::MemoryStorage;

// Re-export core types for convenience
pub use gavel_core::{
    new_entity_id, question_timeout, Conversation, ConversationId, ConversationStatus, Dispute,
    DisputeStatus, GavelError, GavelResult, JudgeInfo, JudgeLevel, Message, MessageId,
    MessageKind, Notification, NotificationId, NotificationKind, Profile, ProfileId, Question,
    QuestionId, QuestionStatus, Rating, RatingId, Reward, RewardId, Timestamp, UserRole,
};

use chrono::Utc;
use uuid::Uuid;

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating GAVEL entity types.

    use super::*;
    use proptest::prelude::*;

    /// Generate a random UUID.
    pub fn arb_uuid() -> impl Strategy<Value = Uuid> {
        any::<[u8; 16]>().prop_map(Uuid::from_bytes)
    }

    /// Generate a valid UUIDv7 (timestamp-sortable).
    pub fn arb_uuid_v7() -> impl Strategy<Value = Uuid> {
        Just(()).prop_map(|_| Uuid::now_v7())
    }

    /// Generate a Timestamp within a reasonable range (2020-2030).
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        (1577836800i64..1893456000i64)
            .prop_map(|secs| chrono::DateTime::from_timestamp(secs, 0).unwrap_or_else(Utc::now))
    }

    /// Generate a UserRole variant.
    pub fn arb_user_role() -> impl Strategy<Value = UserRole> {
        prop_oneof![
            Just(UserRole::User),
            Just(UserRole::Judge),
            Just(UserRole::Admin),
        ]
    }

    /// Generate a QuestionStatus variant.
    pub fn arb_question_status() -> impl Strategy<Value = QuestionStatus> {
        prop_oneof![
            Just(QuestionStatus::WaitingForJudge),
            Just(QuestionStatus::Assigned),
            Just(QuestionStatus::InProgress),
            Just(QuestionStatus::Completed),
            Just(QuestionStatus::Disputed),
            Just(QuestionStatus::Resolved),
        ]
    }

    /// Generate a ConversationStatus variant.
    pub fn arb_conversation_status() -> impl Strategy<Value = ConversationStatus> {
        prop_oneof![
            Just(ConversationStatus::Active),
            Just(ConversationStatus::Disputed),
            Just(ConversationStatus::Ended),
        ]
    }

    /// Generate a MessageKind variant.
    pub fn arb_message_kind() -> impl Strategy<Value = MessageKind> {
        prop_oneof![
            Just(MessageKind::Text),
            Just(MessageKind::Image),
            Just(MessageKind::System),
        ]
    }

    /// Generate a JudgeLevel variant.
    pub fn arb_judge_level() -> impl Strategy<Value = JudgeLevel> {
        prop_oneof![
            Just(JudgeLevel::L1),
            Just(JudgeLevel::L2),
            Just(JudgeLevel::L3),
        ]
    }

    /// Generate a NotificationKind variant.
    pub fn arb_notification_kind() -> impl Strategy<Value = NotificationKind> {
        prop_oneof![
            Just(NotificationKind::NewQuestion),
            Just(NotificationKind::Dispute),
            Just(NotificationKind::General),
        ]
    }

    /// Generate a rating score in the valid 1..=5 range.
    pub fn arb_score() -> impl Strategy<Value = u8> {
        1u8..=5
    }

    /// Generate a short non-empty category name.
    pub fn arb_category() -> impl Strategy<Value = String> {
        "[A-Za-z]{3,16}".prop_map(|s| s.to_string())
    }

    /// Generate a waiting question with a live deadline.
    pub fn arb_waiting_question() -> impl Strategy<Value = Question> {
        (arb_category(), "[a-z ]{1,40}").prop_map(|(category, title)| {
            let now = Utc::now();
            Question {
                question_id: Uuid::now_v7(),
                author_id: Uuid::now_v7(),
                title,
                content: "generated question body".to_string(),
                category,
                image_url: None,
                status: QuestionStatus::WaitingForJudge,
                assigned_judge_id: None,
                created_at: now,
                assigned_at: None,
                completed_at: None,
                timeout_at: now + question_timeout(),
            }
        })
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built test fixtures for common testing scenarios.

    use super::*;

    /// Create a profile with the given role, online.
    pub fn make_profile(role: UserRole) -> Profile {
        let id = new_entity_id();
        Profile {
            profile_id: id,
            email: format!("{}@example.com", id.simple()),
            full_name: None,
            avatar_url: None,
            role,
            is_online: true,
            last_seen: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Create a fresh L1 judge record for a profile, available, zeroed
    /// aggregates.
    pub fn make_judge(judge_id: ProfileId) -> JudgeInfo {
        JudgeInfo {
            judge_id,
            level: JudgeLevel::L1,
            is_available: true,
            bio: None,
            specialties: Vec::new(),
            languages: Vec::new(),
            badges: Vec::new(),
            total_points: 0,
            total_questions_answered: 0,
            average_rating: None,
            average_response_time_secs: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Create a waiting question with the standard timeout deadline.
    pub fn make_waiting_question(author_id: ProfileId, title: &str) -> Question {
        let now = Utc::now();
        Question {
            question_id: new_entity_id(),
            author_id,
            title: title.to_string(),
            content: "How does this interaction resolve?".to_string(),
            category: "Rules".to_string(),
            image_url: None,
            status: QuestionStatus::WaitingForJudge,
            assigned_judge_id: None,
            created_at: now,
            assigned_at: None,
            completed_at: None,
            timeout_at: now + question_timeout(),
        }
    }

    /// Create an active conversation between a user and a judge.
    pub fn make_conversation(
        question_id: QuestionId,
        user_id: ProfileId,
        judge_id: ProfileId,
    ) -> Conversation {
        let now = Utc::now();
        Conversation {
            conversation_id: new_entity_id(),
            question_id,
            user_id,
            judge_id,
            status: ConversationStatus::Active,
            started_at: now,
            ended_at: None,
            last_message_at: now,
        }
    }

    /// Create a text message in a conversation.
    pub fn make_text_message(
        conversation_id: ConversationId,
        sender_id: ProfileId,
        content: &str,
    ) -> Message {
        Message {
            message_id: new_entity_id(),
            conversation_id,
            sender_id,
            content: Some(content.to_string()),
            kind: MessageKind::Text,
            image_url: None,
            created_at: Utc::now(),
            sequence: 0,
            read_at: None,
        }
    }

    /// Create an accepted rating for a conversation.
    pub fn make_accepted_rating(conversation: &Conversation, score: u8) -> Rating {
        Rating {
            rating_id: new_entity_id(),
            conversation_id: conversation.conversation_id,
            user_id: conversation.user_id,
            judge_id: conversation.judge_id,
            score,
            is_accepted: true,
            feedback: None,
            created_at: Utc::now(),
        }
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Custom assertion helpers for GAVEL results.

    use super::*;

    /// Assert that a GavelResult is Ok.
    #[track_caller]
    pub fn assert_ok<T: std::fmt::Debug>(result: &GavelResult<T>) {
        assert!(result.is_ok(), "Expected Ok, got Err: {:?}", result);
    }

    /// Assert that an error is the claim-race loser outcome.
    #[track_caller]
    pub fn assert_already_claimed<T: std::fmt::Debug>(result: &GavelResult<T>) {
        match result {
            Err(e) if e.is_already_claimed() => {}
            other => panic!("Expected AlreadyClaimed, got: {:?}", other),
        }
    }
}
