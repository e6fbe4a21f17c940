//! Notification fan-out.
//!
//! Purely advisory: a batch of notification rows per event, no resource
//! reserved on anyone's behalf, no acknowledgment expected. Fan-out
//! failures are logged and swallowed so they can never fail the
//! triggering operation.

use gavel_core::{
    new_entity_id, ConversationId, GavelResult, Notification, NotificationKind, QuestionId,
    UserRole,
};
use gavel_storage::Storage;
use std::sync::Arc;
use tracing::{debug, warn};

/// Fans out "new question" and "dispute" events to interested parties.
#[derive(Clone)]
pub struct Notifier {
    storage: Arc<dyn Storage>,
}

impl Notifier {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Notify every available, online judge about a fresh question.
    /// Best-effort: errors are logged, never propagated.
    pub async fn notify_available_judges(
        &self,
        question_id: QuestionId,
        title: &str,
        category: &str,
    ) {
        if let Err(error) = self
            .try_notify_available_judges(question_id, title, category)
            .await
        {
            warn!(%question_id, %error, "judge fan-out failed");
        }
    }

    async fn try_notify_available_judges(
        &self,
        question_id: QuestionId,
        title: &str,
        category: &str,
    ) -> GavelResult<()> {
        let judges = self.storage.judge_list_available().await?;

        let mut batch = Vec::with_capacity(judges.len());
        for judge in judges {
            // Availability is the judge's own toggle; presence comes from
            // the profile. Both must hold to be worth interrupting.
            let online = self
                .storage
                .profile_get(judge.judge_id)
                .await?
                .map(|p| p.is_online)
                .unwrap_or(false);
            if !online {
                continue;
            }
            batch.push(Notification {
                notification_id: new_entity_id(),
                recipient_id: judge.judge_id,
                title: "New Question Available".to_string(),
                content: format!("New {} question: \"{}\"", category, title),
                kind: NotificationKind::NewQuestion,
                data: Some(serde_json::json!({
                    "question_id": question_id,
                    "category": category,
                    "title": title,
                })),
                read: false,
                created_at: chrono::Utc::now(),
            });
        }

        if batch.is_empty() {
            debug!(%question_id, "no available judges to notify");
            return Ok(());
        }

        let recipients = batch.len();
        self.storage.notification_insert_batch(&batch).await?;
        debug!(%question_id, recipients, "notified available judges");
        Ok(())
    }

    /// Notify every admin account that a dispute needs review.
    /// Best-effort, same contract as the judge fan-out.
    pub async fn notify_admins_of_dispute(&self, conversation_id: ConversationId) {
        if let Err(error) = self.try_notify_admins_of_dispute(conversation_id).await {
            warn!(%conversation_id, %error, "admin fan-out failed");
        }
    }

    async fn try_notify_admins_of_dispute(
        &self,
        conversation_id: ConversationId,
    ) -> GavelResult<()> {
        let admins = self.storage.profile_list_by_role(UserRole::Admin).await?;
        if admins.is_empty() {
            return Ok(());
        }

        let batch: Vec<Notification> = admins
            .iter()
            .map(|admin| Notification {
                notification_id: new_entity_id(),
                recipient_id: admin.profile_id,
                title: "New Dispute".to_string(),
                content: "A user has disputed a judge's ruling. Review required.".to_string(),
                kind: NotificationKind::Dispute,
                data: Some(serde_json::json!({ "conversation_id": conversation_id })),
                read: false,
                created_at: chrono::Utc::now(),
            })
            .collect();

        let recipients = batch.len();
        self.storage.notification_insert_batch(&batch).await?;
        debug!(%conversation_id, recipients, "notified admins of dispute");
        Ok(())
    }
}

// Only the happy paths live here; the swallow-on-failure contract is
// covered by the engine integration tests with a failing store.
#[cfg(test)]
mod tests {
    use super::*;
    use gavel_core::{JudgeInfo, JudgeLevel, Profile, ProfileId};
    use gavel_storage::MemoryStorage;
    use chrono::Utc;

    fn make_profile(role: UserRole, is_online: bool) -> Profile {
        let id = new_entity_id();
        Profile {
            profile_id: id,
            email: format!("{}@example.com", id.simple()),
            full_name: None,
            avatar_url: None,
            role,
            is_online,
            last_seen: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn make_judge(judge_id: ProfileId, is_available: bool) -> JudgeInfo {
        JudgeInfo {
            judge_id,
            level: JudgeLevel::L1,
            is_available,
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

    #[tokio::test]
    async fn test_fan_out_targets_available_online_judges() {
        let storage = Arc::new(MemoryStorage::new());

        let online = make_profile(UserRole::Judge, true);
        let offline = make_profile(UserRole::Judge, false);
        let away = make_profile(UserRole::Judge, true);
        for p in [&online, &offline, &away] {
            storage.profile_insert(p).await.unwrap();
        }
        storage
            .judge_insert(&make_judge(online.profile_id, true))
            .await
            .unwrap();
        storage
            .judge_insert(&make_judge(offline.profile_id, true))
            .await
            .unwrap();
        storage
            .judge_insert(&make_judge(away.profile_id, false))
            .await
            .unwrap();

        let notifier = Notifier::new(storage.clone());
        notifier
            .notify_available_judges(new_entity_id(), "Priority question", "Combat")
            .await;

        assert_eq!(
            storage
                .notification_unread_count(online.profile_id)
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            storage
                .notification_unread_count(offline.profile_id)
                .await
                .unwrap(),
            0
        );
        assert_eq!(
            storage
                .notification_unread_count(away.profile_id)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_dispute_fan_out_reaches_all_admins() {
        let storage = Arc::new(MemoryStorage::new());
        let admin_a = make_profile(UserRole::Admin, true);
        let admin_b = make_profile(UserRole::Admin, false);
        let user = make_profile(UserRole::User, true);
        for p in [&admin_a, &admin_b, &user] {
            storage.profile_insert(p).await.unwrap();
        }

        let notifier = Notifier::new(storage.clone());
        notifier.notify_admins_of_dispute(new_entity_id()).await;

        // Admins are notified regardless of presence.
        for admin in [&admin_a, &admin_b] {
            assert_eq!(
                storage
                    .notification_unread_count(admin.profile_id)
                    .await
                    .unwrap(),
                1
            );
        }
        assert_eq!(
            storage
                .notification_unread_count(user.profile_id)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_notification_payload_carries_question_id() {
        let storage = Arc::new(MemoryStorage::new());
        let judge = make_profile(UserRole::Judge, true);
        storage.profile_insert(&judge).await.unwrap();
        storage
            .judge_insert(&make_judge(judge.profile_id, true))
            .await
            .unwrap();

        let question_id = new_entity_id();
        let notifier = Notifier::new(storage.clone());
        notifier
            .notify_available_judges(question_id, "Layers again", "Continuous Effects")
            .await;

        let inbox = storage
            .notification_list_for(judge.profile_id, 50)
            .await
            .unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].kind, NotificationKind::NewQuestion);
        let data = inbox[0].data.as_ref().unwrap();
        assert_eq!(
            data["question_id"].as_str().unwrap(),
            question_id.to_string()
        );
        assert!(inbox[0].content.contains("Layers again"));
    }
}
