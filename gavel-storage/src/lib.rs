//! GAVEL Storage - Storage Trait and In-Memory Implementation
//!
//! Defines the storage abstraction for GAVEL entities. The trait models a
//! transactional relational store: ordered inserts with generated sequence
//! numbers, filtered listings, and atomic single-statement conditional
//! updates. The conditional updates (`question_claim`,
//! `question_transition`, `conversation_end`) are the serialization points
//! the matching engine relies on; an implementation must never decompose
//! them into a read-then-write pair.

pub mod memory;

pub use memory::MemoryStorage;

use async_trait::async_trait;
use gavel_core::{
    Conversation, ConversationId, ConversationStatus, Dispute, GavelResult, JudgeInfo, JudgeLevel,
    Message, Notification, NotificationId, Profile, ProfileId, Question, QuestionId,
    QuestionStatus, Rating, Reward, Timestamp, UserRole,
};

/// Update payload for profiles.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    /// New role (judge registration promotes user -> judge)
    pub role: Option<UserRole>,
    /// Online presence flag
    pub is_online: Option<bool>,
    /// Last-seen timestamp
    pub last_seen: Option<Timestamp>,
}

/// Update payload for judge-owned profile fields.
#[derive(Debug, Clone, Default)]
pub struct JudgeInfoUpdate {
    /// Availability toggle
    pub is_available: Option<bool>,
    /// Certification level
    pub level: Option<JudgeLevel>,
    /// Free-text bio
    pub bio: Option<String>,
    /// Specialty tags
    pub specialties: Option<Vec<String>>,
    /// Spoken languages
    pub languages: Option<Vec<String>>,
    /// Earned badges
    pub badges: Option<Vec<String>>,
}

/// Filter set for judge search. All present filters must match.
#[derive(Debug, Clone, Default)]
pub struct JudgeSearchFilter {
    /// Certification level
    pub level: Option<JudgeLevel>,
    /// Specialty tag (case-insensitive)
    pub specialty: Option<String>,
    /// Spoken language (case-insensitive)
    pub language: Option<String>,
    /// Restrict to judges whose profile is currently online
    pub online_only: bool,
}

/// Recomputed aggregate statistics for a judge, persisted as a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct JudgeStats {
    pub average_rating: Option<f64>,
    pub average_response_time_secs: Option<i64>,
    pub total_questions_answered: i64,
}

/// Storage trait for GAVEL entities.
///
/// Implementations provide persistence for profiles, questions,
/// conversations, messages, ratings, rewards, disputes and notifications.
#[async_trait]
pub trait Storage: Send + Sync {
    // === Profile Operations ===

    /// Insert a new profile.
    async fn profile_insert(&self, p: &Profile) -> GavelResult<()>;

    /// Get a profile by ID.
    async fn profile_get(&self, id: ProfileId) -> GavelResult<Option<Profile>>;

    /// List profiles by role.
    async fn profile_list_by_role(&self, role: UserRole) -> GavelResult<Vec<Profile>>;

    /// Update a profile.
    async fn profile_update(&self, id: ProfileId, update: ProfileUpdate) -> GavelResult<()>;

    // === Judge Operations ===

    /// Insert a new judge record.
    async fn judge_insert(&self, j: &JudgeInfo) -> GavelResult<()>;

    /// Get a judge record by profile ID.
    async fn judge_get(&self, judge_id: ProfileId) -> GavelResult<Option<JudgeInfo>>;

    /// List judges flagged available, sorted by total points descending.
    async fn judge_list_available(&self) -> GavelResult<Vec<JudgeInfo>>;

    /// Update judge-owned fields.
    async fn judge_update(&self, judge_id: ProfileId, update: JudgeInfoUpdate) -> GavelResult<()>;

    /// Search judges by free text over profile name, bio and specialty
    /// tags (case-insensitive; an empty query matches everyone), further
    /// narrowed by `filter`. Sorted by total points descending.
    async fn judge_search(
        &self,
        query: &str,
        filter: JudgeSearchFilter,
    ) -> GavelResult<Vec<JudgeInfo>>;

    /// Add points to a judge's running total. Atomic increment.
    async fn judge_add_points(&self, judge_id: ProfileId, points: i64) -> GavelResult<()>;

    /// Persist recomputed aggregate statistics.
    async fn judge_set_stats(&self, judge_id: ProfileId, stats: JudgeStats) -> GavelResult<()>;

    // === Question Operations ===

    /// Insert a new question.
    async fn question_insert(&self, q: &Question) -> GavelResult<()>;

    /// Get a question by ID.
    async fn question_get(&self, id: QuestionId) -> GavelResult<Option<Question>>;

    /// List a user's own questions, newest first.
    async fn question_list_by_author(&self, author_id: ProfileId) -> GavelResult<Vec<Question>>;

    /// List questions still open for claiming: status `WaitingForJudge`
    /// and `timeout_at` strictly in the future of `now`. Oldest first.
    async fn question_list_claimable(&self, now: Timestamp) -> GavelResult<Vec<Question>>;

    /// Atomically claim a waiting question for a judge.
    ///
    /// Single conditional statement: sets `assigned_judge_id`,
    /// `assigned_at` and status `Assigned` only if the current status is
    /// still `WaitingForJudge` and the timeout deadline has not passed.
    /// Returns whether a row was affected; `false` means the claim was
    /// lost (already claimed, timed out, or withdrawn).
    async fn question_claim(
        &self,
        id: QuestionId,
        judge_id: ProfileId,
        now: Timestamp,
    ) -> GavelResult<bool>;

    /// Atomically transition a question's status, guarded by the expected
    /// current status. Sets `completed_at` when entering `Completed` or
    /// `Disputed`. Returns whether a row was affected; callers treat
    /// `false` as an idempotent no-op under races.
    async fn question_transition(
        &self,
        id: QuestionId,
        expected: QuestionStatus,
        to: QuestionStatus,
        now: Timestamp,
    ) -> GavelResult<bool>;

    // === Conversation Operations ===

    /// Insert a new conversation. Fails if the question already has one
    /// (the question<->conversation link is 1:1).
    async fn conversation_insert(&self, c: &Conversation) -> GavelResult<()>;

    /// Get a conversation by ID.
    async fn conversation_get(&self, id: ConversationId) -> GavelResult<Option<Conversation>>;

    /// Get the conversation tied to a question, if any.
    async fn conversation_get_by_question(
        &self,
        question_id: QuestionId,
    ) -> GavelResult<Option<Conversation>>;

    /// List conversations where the profile is the user or the judge,
    /// ordered by last message time descending.
    async fn conversation_list_for(&self, profile_id: ProfileId)
        -> GavelResult<Vec<Conversation>>;

    /// Set a conversation's status unconditionally.
    async fn conversation_set_status(
        &self,
        id: ConversationId,
        status: ConversationStatus,
    ) -> GavelResult<()>;

    /// Atomically end a conversation: status -> `Ended`, `ended_at = now`,
    /// only if not already ended. Returns whether a row was affected.
    async fn conversation_end(&self, id: ConversationId, now: Timestamp) -> GavelResult<bool>;

    /// Bump a conversation's `last_message_at`.
    async fn conversation_touch(&self, id: ConversationId, at: Timestamp) -> GavelResult<()>;

    // === Message Operations ===

    /// Insert a message, assigning the store-side insertion sequence.
    /// Returns the stored row.
    async fn message_insert(&self, m: &Message) -> GavelResult<Message>;

    /// List a conversation's messages ascending by creation time,
    /// insertion order breaking ties.
    async fn message_list(&self, conversation_id: ConversationId) -> GavelResult<Vec<Message>>;

    // === Rating Operations ===

    /// Insert a rating. Fails if the conversation already has one
    /// (rating<->conversation is 1:1).
    async fn rating_insert(&self, r: &Rating) -> GavelResult<()>;

    /// Get the rating for a conversation, if any.
    async fn rating_get_by_conversation(
        &self,
        conversation_id: ConversationId,
    ) -> GavelResult<Option<Rating>>;

    /// List a judge's accepted ratings, newest first.
    async fn rating_list_accepted_by_judge(&self, judge_id: ProfileId)
        -> GavelResult<Vec<Rating>>;

    // === Reward Operations ===

    /// Append a reward ledger entry.
    async fn reward_insert(&self, r: &Reward) -> GavelResult<()>;

    /// List a judge's reward ledger, newest first.
    async fn reward_list_by_judge(&self, judge_id: ProfileId) -> GavelResult<Vec<Reward>>;

    // === Dispute Operations ===

    /// Insert a dispute. Fails if the conversation already has one.
    async fn dispute_insert(&self, d: &Dispute) -> GavelResult<()>;

    /// Get the dispute for a conversation, if any.
    async fn dispute_get_by_conversation(
        &self,
        conversation_id: ConversationId,
    ) -> GavelResult<Option<Dispute>>;

    // === Notification Operations ===

    /// Insert a batch of notifications in one operation.
    async fn notification_insert_batch(&self, batch: &[Notification]) -> GavelResult<()>;

    /// List a recipient's notifications, newest first, up to `limit`.
    async fn notification_list_for(
        &self,
        recipient_id: ProfileId,
        limit: usize,
    ) -> GavelResult<Vec<Notification>>;

    /// Mark one notification read.
    async fn notification_mark_read(&self, id: NotificationId) -> GavelResult<()>;

    /// Mark all of a recipient's notifications read.
    async fn notification_mark_all_read(&self, recipient_id: ProfileId) -> GavelResult<()>;

    /// Count a recipient's unread notifications.
    async fn notification_unread_count(&self, recipient_id: ProfileId) -> GavelResult<usize>;
}
