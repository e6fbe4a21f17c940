//! In-memory storage backed by `RwLock`-guarded tables.
//!
//! `MemoryStorage` is the reference implementation of the [`Storage`]
//! trait. The conditional updates take one write guard for the whole
//! check-and-mutate, which is what makes them single indivisible
//! statements: two concurrent claimers serialize on the questions table
//! and exactly one of them observes `WaitingForJudge`.

use crate::{JudgeInfoUpdate, JudgeSearchFilter, JudgeStats, ProfileUpdate, Storage};
use async_trait::async_trait;
use gavel_core::{
    Conversation, ConversationId, ConversationStatus, Dispute, EntityType, GavelError,
    GavelResult, JudgeInfo, Message, Notification, NotificationId, Profile, ProfileId, Question,
    QuestionId, QuestionStatus, Rating, Reward, StorageError, Timestamp, UserRole,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// In-memory storage for tests and development.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    profiles: Arc<RwLock<HashMap<Uuid, Profile>>>,
    judges: Arc<RwLock<HashMap<Uuid, JudgeInfo>>>,
    questions: Arc<RwLock<HashMap<Uuid, Question>>>,
    conversations: Arc<RwLock<HashMap<Uuid, Conversation>>>,
    messages: Arc<RwLock<HashMap<Uuid, Message>>>,
    ratings: Arc<RwLock<HashMap<Uuid, Rating>>>,
    rewards: Arc<RwLock<HashMap<Uuid, Reward>>>,
    disputes: Arc<RwLock<HashMap<Uuid, Dispute>>>,
    notifications: Arc<RwLock<HashMap<Uuid, Notification>>>,
    /// Insertion sequence for messages, the creation-time tie-break.
    message_seq: AtomicU64,
}

fn read<T>(lock: &RwLock<T>) -> GavelResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| GavelError::Storage(StorageError::LockPoisoned))
}

fn write<T>(lock: &RwLock<T>) -> GavelResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| GavelError::Storage(StorageError::LockPoisoned))
}

fn duplicate(entity_type: EntityType) -> GavelError {
    GavelError::Storage(StorageError::InsertFailed {
        entity_type,
        reason: "already exists".to_string(),
    })
}

fn not_found(entity_type: EntityType, id: Uuid) -> GavelError {
    GavelError::Storage(StorageError::NotFound { entity_type, id })
}

impl MemoryStorage {
    /// Create a new empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored data.
    pub fn clear(&self) {
        fn clear_table<T>(table: &RwLock<HashMap<Uuid, T>>) {
            if let Ok(mut guard) = table.write() {
                guard.clear();
            }
        }
        clear_table(&self.profiles);
        clear_table(&self.judges);
        clear_table(&self.questions);
        clear_table(&self.conversations);
        clear_table(&self.messages);
        clear_table(&self.ratings);
        clear_table(&self.rewards);
        clear_table(&self.disputes);
        clear_table(&self.notifications);
    }

    /// Count of stored questions.
    pub fn question_count(&self) -> usize {
        self.questions.read().map(|t| t.len()).unwrap_or(0)
    }

    /// Count of stored conversations.
    pub fn conversation_count(&self) -> usize {
        self.conversations.read().map(|t| t.len()).unwrap_or(0)
    }

    /// Count of stored notifications.
    pub fn notification_count(&self) -> usize {
        self.notifications.read().map(|t| t.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    // === Profile Operations ===

    async fn profile_insert(&self, p: &Profile) -> GavelResult<()> {
        let mut profiles = write(&self.profiles)?;
        if profiles.contains_key(&p.profile_id) {
            return Err(duplicate(EntityType::Profile));
        }
        profiles.insert(p.profile_id, p.clone());
        Ok(())
    }

    async fn profile_get(&self, id: ProfileId) -> GavelResult<Option<Profile>> {
        let profiles = read(&self.profiles)?;
        Ok(profiles.get(&id).cloned())
    }

    async fn profile_list_by_role(&self, role: UserRole) -> GavelResult<Vec<Profile>> {
        let profiles = read(&self.profiles)?;
        Ok(profiles
            .values()
            .filter(|p| p.role == role)
            .cloned()
            .collect())
    }

    async fn profile_update(&self, id: ProfileId, update: ProfileUpdate) -> GavelResult<()> {
        let mut profiles = write(&self.profiles)?;
        let profile = profiles
            .get_mut(&id)
            .ok_or_else(|| not_found(EntityType::Profile, id))?;

        if let Some(role) = update.role {
            profile.role = role;
        }
        if let Some(is_online) = update.is_online {
            profile.is_online = is_online;
        }
        if let Some(last_seen) = update.last_seen {
            profile.last_seen = Some(last_seen);
        }
        profile.updated_at = chrono::Utc::now();

        Ok(())
    }

    // === Judge Operations ===

    async fn judge_insert(&self, j: &JudgeInfo) -> GavelResult<()> {
        let mut judges = write(&self.judges)?;
        if judges.contains_key(&j.judge_id) {
            return Err(duplicate(EntityType::JudgeInfo));
        }
        judges.insert(j.judge_id, j.clone());
        Ok(())
    }

    async fn judge_get(&self, judge_id: ProfileId) -> GavelResult<Option<JudgeInfo>> {
        let judges = read(&self.judges)?;
        Ok(judges.get(&judge_id).cloned())
    }

    async fn judge_list_available(&self) -> GavelResult<Vec<JudgeInfo>> {
        let judges = read(&self.judges)?;
        let mut available: Vec<JudgeInfo> = judges
            .values()
            .filter(|j| j.is_available)
            .cloned()
            .collect();
        available.sort_by(|a, b| b.total_points.cmp(&a.total_points));
        Ok(available)
    }

    async fn judge_update(&self, judge_id: ProfileId, update: JudgeInfoUpdate) -> GavelResult<()> {
        let mut judges = write(&self.judges)?;
        let judge = judges
            .get_mut(&judge_id)
            .ok_or_else(|| not_found(EntityType::JudgeInfo, judge_id))?;

        if let Some(is_available) = update.is_available {
            judge.is_available = is_available;
        }
        if let Some(level) = update.level {
            judge.level = level;
        }
        if let Some(bio) = update.bio {
            judge.bio = Some(bio);
        }
        if let Some(specialties) = update.specialties {
            judge.specialties = specialties;
        }
        if let Some(languages) = update.languages {
            judge.languages = languages;
        }
        if let Some(badges) = update.badges {
            judge.badges = badges;
        }
        judge.updated_at = chrono::Utc::now();

        Ok(())
    }

    async fn judge_search(
        &self,
        query: &str,
        filter: JudgeSearchFilter,
    ) -> GavelResult<Vec<JudgeInfo>> {
        let judges = read(&self.judges)?;
        let profiles = read(&self.profiles)?;
        let needle = query.trim().to_lowercase();

        let mut matches: Vec<JudgeInfo> = judges
            .values()
            .filter(|j| {
                if let Some(level) = filter.level {
                    if j.level != level {
                        return false;
                    }
                }
                if let Some(specialty) = &filter.specialty {
                    if !j
                        .specialties
                        .iter()
                        .any(|s| s.eq_ignore_ascii_case(specialty))
                    {
                        return false;
                    }
                }
                if let Some(language) = &filter.language {
                    if !j.languages.iter().any(|l| l.eq_ignore_ascii_case(language)) {
                        return false;
                    }
                }
                let profile = profiles.get(&j.judge_id);
                if filter.online_only && !profile.map(|p| p.is_online).unwrap_or(false) {
                    return false;
                }
                if needle.is_empty() {
                    return true;
                }
                let name_hit = profile
                    .and_then(|p| p.full_name.as_deref())
                    .map(|n| n.to_lowercase().contains(&needle))
                    .unwrap_or(false);
                let bio_hit = j
                    .bio
                    .as_deref()
                    .map(|b| b.to_lowercase().contains(&needle))
                    .unwrap_or(false);
                let specialty_hit = j
                    .specialties
                    .iter()
                    .any(|s| s.to_lowercase().contains(&needle));
                name_hit || bio_hit || specialty_hit
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.total_points.cmp(&a.total_points));
        Ok(matches)
    }

    async fn judge_add_points(&self, judge_id: ProfileId, points: i64) -> GavelResult<()> {
        let mut judges = write(&self.judges)?;
        let judge = judges
            .get_mut(&judge_id)
            .ok_or_else(|| not_found(EntityType::JudgeInfo, judge_id))?;
        judge.total_points += points;
        judge.updated_at = chrono::Utc::now();
        Ok(())
    }

    async fn judge_set_stats(&self, judge_id: ProfileId, stats: JudgeStats) -> GavelResult<()> {
        let mut judges = write(&self.judges)?;
        let judge = judges
            .get_mut(&judge_id)
            .ok_or_else(|| not_found(EntityType::JudgeInfo, judge_id))?;
        judge.average_rating = stats.average_rating;
        judge.average_response_time_secs = stats.average_response_time_secs;
        judge.total_questions_answered = stats.total_questions_answered;
        judge.updated_at = chrono::Utc::now();
        Ok(())
    }

    // === Question Operations ===

    async fn question_insert(&self, q: &Question) -> GavelResult<()> {
        let mut questions = write(&self.questions)?;
        if questions.contains_key(&q.question_id) {
            return Err(duplicate(EntityType::Question));
        }
        questions.insert(q.question_id, q.clone());
        Ok(())
    }

    async fn question_get(&self, id: QuestionId) -> GavelResult<Option<Question>> {
        let questions = read(&self.questions)?;
        Ok(questions.get(&id).cloned())
    }

    async fn question_list_by_author(&self, author_id: ProfileId) -> GavelResult<Vec<Question>> {
        let questions = read(&self.questions)?;
        let mut own: Vec<Question> = questions
            .values()
            .filter(|q| q.author_id == author_id)
            .cloned()
            .collect();
        own.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(own)
    }

    async fn question_list_claimable(&self, now: Timestamp) -> GavelResult<Vec<Question>> {
        let questions = read(&self.questions)?;
        // Deadline strictly in the future: expired questions drop out here.
        let mut open: Vec<Question> = questions
            .values()
            .filter(|q| q.status == QuestionStatus::WaitingForJudge && q.timeout_at > now)
            .cloned()
            .collect();
        open.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(open)
    }

    async fn question_claim(
        &self,
        id: QuestionId,
        judge_id: ProfileId,
        now: Timestamp,
    ) -> GavelResult<bool> {
        let mut questions = write(&self.questions)?;
        let Some(question) = questions.get_mut(&id) else {
            return Ok(false);
        };
        if question.status != QuestionStatus::WaitingForJudge || question.timeout_at <= now {
            return Ok(false);
        }
        question.status = QuestionStatus::Assigned;
        question.assigned_judge_id = Some(judge_id);
        question.assigned_at = Some(now);
        Ok(true)
    }

    async fn question_transition(
        &self,
        id: QuestionId,
        expected: QuestionStatus,
        to: QuestionStatus,
        now: Timestamp,
    ) -> GavelResult<bool> {
        let mut questions = write(&self.questions)?;
        let Some(question) = questions.get_mut(&id) else {
            return Ok(false);
        };
        if question.status != expected {
            return Ok(false);
        }
        question.status = to;
        if matches!(to, QuestionStatus::Completed | QuestionStatus::Disputed) {
            question.completed_at = Some(now);
        }
        Ok(true)
    }

    // === Conversation Operations ===

    async fn conversation_insert(&self, c: &Conversation) -> GavelResult<()> {
        let mut conversations = write(&self.conversations)?;
        if conversations.contains_key(&c.conversation_id) {
            return Err(duplicate(EntityType::Conversation));
        }
        if conversations
            .values()
            .any(|existing| existing.question_id == c.question_id)
        {
            return Err(GavelError::Storage(StorageError::InsertFailed {
                entity_type: EntityType::Conversation,
                reason: format!("question {} already has a conversation", c.question_id),
            }));
        }
        conversations.insert(c.conversation_id, c.clone());
        Ok(())
    }

    async fn conversation_get(&self, id: ConversationId) -> GavelResult<Option<Conversation>> {
        let conversations = read(&self.conversations)?;
        Ok(conversations.get(&id).cloned())
    }

    async fn conversation_get_by_question(
        &self,
        question_id: QuestionId,
    ) -> GavelResult<Option<Conversation>> {
        let conversations = read(&self.conversations)?;
        Ok(conversations
            .values()
            .find(|c| c.question_id == question_id)
            .cloned())
    }

    async fn conversation_list_for(
        &self,
        profile_id: ProfileId,
    ) -> GavelResult<Vec<Conversation>> {
        let conversations = read(&self.conversations)?;
        let mut own: Vec<Conversation> = conversations
            .values()
            .filter(|c| c.is_participant(profile_id))
            .cloned()
            .collect();
        own.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));
        Ok(own)
    }

    async fn conversation_set_status(
        &self,
        id: ConversationId,
        status: ConversationStatus,
    ) -> GavelResult<()> {
        let mut conversations = write(&self.conversations)?;
        let conversation = conversations
            .get_mut(&id)
            .ok_or_else(|| not_found(EntityType::Conversation, id))?;
        conversation.status = status;
        Ok(())
    }

    async fn conversation_end(&self, id: ConversationId, now: Timestamp) -> GavelResult<bool> {
        let mut conversations = write(&self.conversations)?;
        let Some(conversation) = conversations.get_mut(&id) else {
            return Ok(false);
        };
        if conversation.status == ConversationStatus::Ended {
            return Ok(false);
        }
        conversation.status = ConversationStatus::Ended;
        conversation.ended_at = Some(now);
        Ok(true)
    }

    async fn conversation_touch(&self, id: ConversationId, at: Timestamp) -> GavelResult<()> {
        let mut conversations = write(&self.conversations)?;
        let conversation = conversations
            .get_mut(&id)
            .ok_or_else(|| not_found(EntityType::Conversation, id))?;
        conversation.last_message_at = at;
        Ok(())
    }

    // === Message Operations ===

    async fn message_insert(&self, m: &Message) -> GavelResult<Message> {
        let mut messages = write(&self.messages)?;
        if messages.contains_key(&m.message_id) {
            return Err(duplicate(EntityType::Message));
        }
        let mut stored = m.clone();
        stored.sequence = self.message_seq.fetch_add(1, Ordering::SeqCst);
        messages.insert(stored.message_id, stored.clone());
        Ok(stored)
    }

    async fn message_list(&self, conversation_id: ConversationId) -> GavelResult<Vec<Message>> {
        let messages = read(&self.messages)?;
        let mut thread: Vec<Message> = messages
            .values()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect();
        thread.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then(a.sequence.cmp(&b.sequence))
        });
        Ok(thread)
    }

    // === Rating Operations ===

    async fn rating_insert(&self, r: &Rating) -> GavelResult<()> {
        let mut ratings = write(&self.ratings)?;
        if ratings.contains_key(&r.rating_id) {
            return Err(duplicate(EntityType::Rating));
        }
        if ratings
            .values()
            .any(|existing| existing.conversation_id == r.conversation_id)
        {
            return Err(GavelError::Storage(StorageError::InsertFailed {
                entity_type: EntityType::Rating,
                reason: format!("conversation {} is already rated", r.conversation_id),
            }));
        }
        ratings.insert(r.rating_id, r.clone());
        Ok(())
    }

    async fn rating_get_by_conversation(
        &self,
        conversation_id: ConversationId,
    ) -> GavelResult<Option<Rating>> {
        let ratings = read(&self.ratings)?;
        Ok(ratings
            .values()
            .find(|r| r.conversation_id == conversation_id)
            .cloned())
    }

    async fn rating_list_accepted_by_judge(
        &self,
        judge_id: ProfileId,
    ) -> GavelResult<Vec<Rating>> {
        let ratings = read(&self.ratings)?;
        let mut accepted: Vec<Rating> = ratings
            .values()
            .filter(|r| r.judge_id == judge_id && r.is_accepted)
            .cloned()
            .collect();
        accepted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(accepted)
    }

    // === Reward Operations ===

    async fn reward_insert(&self, r: &Reward) -> GavelResult<()> {
        let mut rewards = write(&self.rewards)?;
        if rewards.contains_key(&r.reward_id) {
            return Err(duplicate(EntityType::Reward));
        }
        rewards.insert(r.reward_id, r.clone());
        Ok(())
    }

    async fn reward_list_by_judge(&self, judge_id: ProfileId) -> GavelResult<Vec<Reward>> {
        let rewards = read(&self.rewards)?;
        let mut ledger: Vec<Reward> = rewards
            .values()
            .filter(|r| r.judge_id == judge_id)
            .cloned()
            .collect();
        ledger.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(ledger)
    }

    // === Dispute Operations ===

    async fn dispute_insert(&self, d: &Dispute) -> GavelResult<()> {
        let mut disputes = write(&self.disputes)?;
        if disputes.contains_key(&d.dispute_id) {
            return Err(duplicate(EntityType::Dispute));
        }
        if disputes
            .values()
            .any(|existing| existing.conversation_id == d.conversation_id)
        {
            return Err(GavelError::Storage(StorageError::InsertFailed {
                entity_type: EntityType::Dispute,
                reason: format!("conversation {} is already disputed", d.conversation_id),
            }));
        }
        disputes.insert(d.dispute_id, d.clone());
        Ok(())
    }

    async fn dispute_get_by_conversation(
        &self,
        conversation_id: ConversationId,
    ) -> GavelResult<Option<Dispute>> {
        let disputes = read(&self.disputes)?;
        Ok(disputes
            .values()
            .find(|d| d.conversation_id == conversation_id)
            .cloned())
    }

    // === Notification Operations ===

    async fn notification_insert_batch(&self, batch: &[Notification]) -> GavelResult<()> {
        let mut notifications = write(&self.notifications)?;
        for n in batch {
            if notifications.contains_key(&n.notification_id) {
                return Err(duplicate(EntityType::Notification));
            }
        }
        for n in batch {
            notifications.insert(n.notification_id, n.clone());
        }
        Ok(())
    }

    async fn notification_list_for(
        &self,
        recipient_id: ProfileId,
        limit: usize,
    ) -> GavelResult<Vec<Notification>> {
        let notifications = read(&self.notifications)?;
        let mut inbox: Vec<Notification> = notifications
            .values()
            .filter(|n| n.recipient_id == recipient_id)
            .cloned()
            .collect();
        inbox.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        inbox.truncate(limit);
        Ok(inbox)
    }

    async fn notification_mark_read(&self, id: NotificationId) -> GavelResult<()> {
        let mut notifications = write(&self.notifications)?;
        let notification = notifications
            .get_mut(&id)
            .ok_or_else(|| not_found(EntityType::Notification, id))?;
        notification.read = true;
        Ok(())
    }

    async fn notification_mark_all_read(&self, recipient_id: ProfileId) -> GavelResult<()> {
        let mut notifications = write(&self.notifications)?;
        for notification in notifications.values_mut() {
            if notification.recipient_id == recipient_id {
                notification.read = true;
            }
        }
        Ok(())
    }

    async fn notification_unread_count(&self, recipient_id: ProfileId) -> GavelResult<usize> {
        let notifications = read(&self.notifications)?;
        Ok(notifications
            .values()
            .filter(|n| n.recipient_id == recipient_id && !n.read)
            .count())
    }
}

// ============================================================================
// TESTS
// ============================================================================


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================
