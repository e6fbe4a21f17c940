//! Judge registration and directory.

use crate::auth::Caller;
use gavel_core::{
    EntityType, GavelResult, JudgeInfo, JudgeLevel, ProfileId, Rating, Reward, StorageError,
    UserRole,
};
use gavel_storage::{JudgeInfoUpdate, JudgeSearchFilter, ProfileUpdate, Storage};
use std::sync::Arc;
use tracing::info;

/// Input payload for registering as a judge.
#[derive(Debug, Clone, Default)]
pub struct JudgeRegistration {
    pub bio: Option<String>,
    pub specialties: Vec<String>,
    pub languages: Vec<String>,
}

/// A judge's aggregate record together with the history behind it:
/// accepted ratings (newest first) and the reward ledger.
#[derive(Debug, Clone)]
pub struct JudgeStatsBundle {
    pub judge: JudgeInfo,
    pub recent_ratings: Vec<Rating>,
    pub rewards: Vec<Reward>,
}

/// Registration, availability and lookups for judges.
#[derive(Clone)]
pub struct JudgeDirectory {
    storage: Arc<dyn Storage>,
}

impl JudgeDirectory {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Register the caller as a judge: creates the judge record at level
    /// L1 with zeroed aggregates and promotes the profile's role.
    pub async fn register_judge(
        &self,
        caller: &Caller,
        registration: JudgeRegistration,
    ) -> GavelResult<JudgeInfo> {
        // The profile must exist before it can carry a judge record.
        self.storage
            .profile_get(caller.profile_id)
            .await?
            .ok_or_else(|| {
                gavel_core::GavelError::from(StorageError::NotFound {
                    entity_type: EntityType::Profile,
                    id: caller.profile_id,
                })
            })?;

        let now = chrono::Utc::now();
        let judge = JudgeInfo {
            judge_id: caller.profile_id,
            level: JudgeLevel::L1,
            is_available: true,
            bio: registration.bio,
            specialties: registration.specialties,
            languages: registration.languages,
            badges: Vec::new(),
            total_points: 0,
            total_questions_answered: 0,
            average_rating: None,
            average_response_time_secs: None,
            created_at: now,
            updated_at: now,
        };
        self.storage.judge_insert(&judge).await?;
        self.storage
            .profile_update(
                caller.profile_id,
                ProfileUpdate {
                    role: Some(UserRole::Judge),
                    ..Default::default()
                },
            )
            .await?;

        info!(judge_id = %caller.profile_id, "judge registered");
        Ok(judge)
    }

    /// Fetch a judge record.
    pub async fn get_judge(&self, judge_id: ProfileId) -> GavelResult<JudgeInfo> {
        self.storage.judge_get(judge_id).await?.ok_or_else(|| {
            StorageError::NotFound {
                entity_type: EntityType::JudgeInfo,
                id: judge_id,
            }
            .into()
        })
    }

    /// Judges currently open for new questions, highest points first.
    pub async fn available_judges(&self) -> GavelResult<Vec<JudgeInfo>> {
        self.storage.judge_list_available().await
    }

    /// Free-text judge search over name, bio and specialties, narrowed
    /// by the given filters, highest points first.
    pub async fn search_judges(
        &self,
        query: &str,
        filter: JudgeSearchFilter,
    ) -> GavelResult<Vec<JudgeInfo>> {
        self.storage.judge_search(query, filter).await
    }

    /// Toggle the caller's own availability.
    pub async fn set_availability(&self, caller: &Caller, available: bool) -> GavelResult<()> {
        caller.require_claim_role("change judge availability")?;
        self.storage
            .judge_update(
                caller.profile_id,
                JudgeInfoUpdate {
                    is_available: Some(available),
                    ..Default::default()
                },
            )
            .await
    }

    /// Update the caller's own judge-owned fields (bio, specialties,
    /// languages). Aggregate fields are not reachable from here.
    pub async fn update_judge(
        &self,
        caller: &Caller,
        update: JudgeInfoUpdate,
    ) -> GavelResult<()> {
        caller.require_claim_role("update judge record")?;
        self.storage.judge_update(caller.profile_id, update).await
    }

    /// A judge's aggregate record plus the accepted-rating history and
    /// the full reward ledger.
    pub async fn judge_stats(&self, judge_id: ProfileId) -> GavelResult<JudgeStatsBundle> {
        let judge = self.get_judge(judge_id).await?;
        let recent_ratings = self.storage.rating_list_accepted_by_judge(judge_id).await?;
        let rewards = self.storage.reward_list_by_judge(judge_id).await?;
        Ok(JudgeStatsBundle {
            judge,
            recent_ratings,
            rewards,
        })
    }
}
