//! Rating, reward and dispute pipeline.
//!
//! A rating is the user's terminal verdict on a conversation: accepted
//! ratings pay the judge and fold into that judge's aggregate record;
//! rejected ratings open a dispute and flip the conversation and
//! question into their disputed states.

use crate::auth::Caller;
use crate::events::{ConversationEvent, EventHub};
use crate::notifier::Notifier;
use gavel_core::{
    new_entity_id, AuthError, Conversation, ConversationId, ConversationStatus, Dispute,
    DisputeStatus, EntityType, GavelResult, ProfileId, QuestionStatus, Rating, Reward,
    StorageError, ValidationError,
};
use gavel_storage::{JudgeStats, Storage};
use std::sync::Arc;
use tracing::{info, warn};

/// Points paid per star on an accepted rating.
const POINTS_PER_STAR: i64 = 10;

/// Input payload for a rating.
#[derive(Debug, Clone)]
pub struct RatingSubmission {
    /// 1..=5 stars.
    pub score: u8,
    /// `true` accepts the ruling; `false` disputes it.
    pub is_accepted: bool,
    pub feedback: Option<String>,
}

/// Applies rating verdicts: reward and statistics on acceptance, dispute
/// escalation on rejection.
#[derive(Clone)]
pub struct RatingEngine {
    storage: Arc<dyn Storage>,
    events: EventHub,
    notifier: Notifier,
}

impl RatingEngine {
    pub fn new(storage: Arc<dyn Storage>, events: EventHub, notifier: Notifier) -> Self {
        Self {
            storage,
            events,
            notifier,
        }
    }

    /// Submit the one rating a conversation will ever have.
    ///
    /// Only the question's author may rate, exactly once, with a score
    /// in 1..=5. The verdict drives the rest of the pipeline.
    pub async fn submit_rating(
        &self,
        caller: &Caller,
        conversation_id: ConversationId,
        submission: RatingSubmission,
    ) -> GavelResult<Rating> {
        if !(1..=5).contains(&submission.score) {
            return Err(ValidationError::InvalidValue {
                field: "score".to_string(),
                reason: format!("must be between 1 and 5, got {}", submission.score),
            }
            .into());
        }

        let conversation = self
            .storage
            .conversation_get(conversation_id)
            .await?
            .ok_or_else(|| {
                gavel_core::GavelError::from(StorageError::NotFound {
                    entity_type: EntityType::Conversation,
                    id: conversation_id,
                })
            })?;
        if conversation.user_id != caller.profile_id {
            return Err(AuthError::Forbidden {
                caller: caller.profile_id,
                action: "rate this conversation".to_string(),
            }
            .into());
        }

        if self
            .storage
            .rating_get_by_conversation(conversation_id)
            .await?
            .is_some()
        {
            return Err(ValidationError::ConstraintViolation {
                constraint: "one rating per conversation".to_string(),
                reason: format!("conversation {conversation_id} is already rated"),
            }
            .into());
        }

        let rating = Rating {
            rating_id: new_entity_id(),
            conversation_id,
            user_id: conversation.user_id,
            judge_id: conversation.judge_id,
            score: submission.score,
            is_accepted: submission.is_accepted,
            feedback: submission.feedback,
            created_at: chrono::Utc::now(),
        };
        self.storage.rating_insert(&rating).await?;
        info!(
            %conversation_id,
            judge_id = %rating.judge_id,
            score = rating.score,
            accepted = rating.is_accepted,
            "rating recorded"
        );

        if rating.is_accepted {
            self.settle_accepted(&conversation, &rating).await?;
        } else {
            self.escalate_dispute(&conversation, &rating).await?;
        }

        Ok(rating)
    }

    /// The rating attached to a conversation, if any.
    pub async fn rating_for_conversation(
        &self,
        conversation_id: ConversationId,
    ) -> GavelResult<Option<Rating>> {
        self.storage.rating_get_by_conversation(conversation_id).await
    }

    /// The dispute attached to a conversation, if any.
    pub async fn dispute_for_conversation(
        &self,
        conversation_id: ConversationId,
    ) -> GavelResult<Option<Dispute>> {
        self.storage.dispute_get_by_conversation(conversation_id).await
    }

    /// Accepted verdict: pay the judge, refresh the aggregates, complete
    /// the question.
    async fn settle_accepted(
        &self,
        conversation: &Conversation,
        rating: &Rating,
    ) -> GavelResult<()> {
        let points = i64::from(rating.score) * POINTS_PER_STAR;
        let reward = Reward {
            reward_id: new_entity_id(),
            judge_id: rating.judge_id,
            points_earned: points,
            reason: format!("Question answered successfully ({}/5 stars)", rating.score),
            conversation_id: Some(conversation.conversation_id),
            created_at: chrono::Utc::now(),
        };
        self.storage.reward_insert(&reward).await?;
        self.storage.judge_add_points(rating.judge_id, points).await?;
        self.refresh_judge_stats(rating.judge_id).await?;

        let completed = self
            .storage
            .question_transition(
                conversation.question_id,
                QuestionStatus::InProgress,
                QuestionStatus::Completed,
                chrono::Utc::now(),
            )
            .await?;
        if !completed {
            warn!(question_id = %conversation.question_id, "question not in progress at completion");
        }

        info!(judge_id = %rating.judge_id, points, "reward settled");
        Ok(())
    }

    /// Rejected verdict: open a dispute, flip conversation and question
    /// to disputed, alert admins.
    async fn escalate_dispute(
        &self,
        conversation: &Conversation,
        rating: &Rating,
    ) -> GavelResult<()> {
        let dispute = Dispute {
            dispute_id: new_entity_id(),
            conversation_id: conversation.conversation_id,
            user_id: rating.user_id,
            judge_id: rating.judge_id,
            user_justification: rating.feedback.clone().unwrap_or_default(),
            judge_justification: None,
            status: DisputeStatus::Pending,
            resolved_by: None,
            resolved_at: None,
            created_at: chrono::Utc::now(),
        };
        self.storage.dispute_insert(&dispute).await?;

        let disputed = self
            .storage
            .question_transition(
                conversation.question_id,
                QuestionStatus::InProgress,
                QuestionStatus::Disputed,
                chrono::Utc::now(),
            )
            .await?;
        if !disputed {
            warn!(question_id = %conversation.question_id, "question not in progress at dispute");
        }

        self.storage
            .conversation_set_status(conversation.conversation_id, ConversationStatus::Disputed)
            .await?;
        self.events.publish(ConversationEvent::StatusChanged {
            conversation_id: conversation.conversation_id,
            status: ConversationStatus::Disputed,
        });

        info!(
            conversation_id = %conversation.conversation_id,
            dispute_id = %dispute.dispute_id,
            "dispute opened"
        );
        self.notifier
            .notify_admins_of_dispute(conversation.conversation_id)
            .await;
        Ok(())
    }

    /// Recompute a judge's aggregates from the full accepted-rating
    /// history. Response time is rating creation minus conversation
    /// start, averaged in whole seconds.
    async fn refresh_judge_stats(&self, judge_id: ProfileId) -> GavelResult<()> {
        let accepted = self.storage.rating_list_accepted_by_judge(judge_id).await?;
        let total = accepted.len() as i64;

        let average_rating = if accepted.is_empty() {
            None
        } else {
            Some(accepted.iter().map(|r| f64::from(r.score)).sum::<f64>() / accepted.len() as f64)
        };

        let mut response_secs = Vec::with_capacity(accepted.len());
        for rating in &accepted {
            if let Some(conversation) =
                self.storage.conversation_get(rating.conversation_id).await?
            {
                response_secs.push((rating.created_at - conversation.started_at).num_seconds());
            }
        }
        let average_response_time_secs = if response_secs.is_empty() {
            None
        } else {
            Some(response_secs.iter().sum::<i64>() / response_secs.len() as i64)
        };

        self.storage
            .judge_set_stats(
                judge_id,
                JudgeStats {
                    average_rating,
                    average_response_time_secs,
                    total_questions_answered: total,
                },
            )
            .await
    }
}
