//! Race-free question assignment.
//!
//! Any number of judges may accept the same question concurrently;
//! exactly one wins. The decision is the store's conditional claim, a
//! single atomic statement, so the arbiter itself holds no lock. Losers
//! get [`MatchError::AlreadyClaimed`] and are expected to re-list the
//! claimable set.

use crate::auth::Caller;
use crate::events::{ConversationEvent, EventHub};
use gavel_core::{
    new_entity_id, AuthError, Conversation, ConversationStatus, EntityType, GavelResult,
    MatchError, Message, MessageKind, Question, QuestionId, QuestionStatus, StorageError,
};
use gavel_storage::Storage;
use std::sync::Arc;
use tracing::{info, warn};

/// System greeting posted on the judge's behalf when the conversation opens.
const JUDGE_JOINED_GREETING: &str = "Judge has joined the conversation. How can I help you?";

/// Decides claim races and sets up the post-claim conversation.
#[derive(Clone)]
pub struct AssignmentArbiter {
    storage: Arc<dyn Storage>,
    events: EventHub,
}

impl AssignmentArbiter {
    pub fn new(storage: Arc<dyn Storage>, events: EventHub) -> Self {
        Self { storage, events }
    }

    /// Accept a waiting question on behalf of a judge.
    ///
    /// On a won claim the question moves `WaitingForJudge -> Assigned ->
    /// InProgress`, a conversation is opened between the author and the
    /// judge, and a system greeting is posted. A lost claim returns
    /// [`MatchError::AlreadyClaimed`]; a claim that won but whose
    /// conversation setup failed returns
    /// [`MatchError::PostAssignmentFailure`] and leaves the question
    /// assigned, so the judge can [`retry_conversation`](Self::retry_conversation).
    pub async fn accept_question(
        &self,
        caller: &Caller,
        question_id: QuestionId,
    ) -> GavelResult<Conversation> {
        caller.require_claim_role("accept question")?;

        let question = self.get_question(question_id).await?;

        let now = chrono::Utc::now();
        let won = self
            .storage
            .question_claim(question_id, caller.profile_id, now)
            .await?;
        if !won {
            return Err(MatchError::AlreadyClaimed { question_id }.into());
        }
        info!(%question_id, judge_id = %caller.profile_id, "claim won");

        self.establish_conversation(&question, caller).await
    }

    /// Re-run the post-claim setup for a question this judge already won.
    ///
    /// The claim itself is never repeated. If the conversation already
    /// exists it is returned as-is, making the retry idempotent.
    pub async fn retry_conversation(
        &self,
        caller: &Caller,
        question_id: QuestionId,
    ) -> GavelResult<Conversation> {
        caller.require_claim_role("retry conversation setup")?;

        let question = self.get_question(question_id).await?;
        if question.assigned_judge_id != Some(caller.profile_id) {
            return Err(AuthError::Forbidden {
                caller: caller.profile_id,
                action: "retry conversation setup for an unassigned question".to_string(),
            }
            .into());
        }

        if let Some(existing) = self
            .storage
            .conversation_get_by_question(question_id)
            .await?
        {
            return Ok(existing);
        }

        self.establish_conversation(&question, caller).await
    }

    async fn get_question(&self, question_id: QuestionId) -> GavelResult<Question> {
        self.storage
            .question_get(question_id)
            .await?
            .ok_or_else(|| {
                StorageError::NotFound {
                    entity_type: EntityType::Question,
                    id: question_id,
                }
                .into()
            })
    }

    /// Post-claim setup: conversation, system greeting, `InProgress`.
    /// Any failure here surfaces as `PostAssignmentFailure` without
    /// disturbing the already-won claim.
    async fn establish_conversation(
        &self,
        question: &Question,
        judge: &Caller,
    ) -> GavelResult<Conversation> {
        let question_id = question.question_id;
        let now = chrono::Utc::now();
        let conversation = Conversation {
            conversation_id: new_entity_id(),
            question_id,
            user_id: question.author_id,
            judge_id: judge.profile_id,
            status: ConversationStatus::Active,
            started_at: now,
            ended_at: None,
            last_message_at: now,
        };
        self.storage
            .conversation_insert(&conversation)
            .await
            .map_err(|error| post_assignment(question_id, &error))?;

        let greeting = Message {
            message_id: new_entity_id(),
            conversation_id: conversation.conversation_id,
            sender_id: judge.profile_id,
            content: Some(JUDGE_JOINED_GREETING.to_string()),
            kind: MessageKind::System,
            image_url: None,
            created_at: chrono::Utc::now(),
            sequence: 0,
            read_at: None,
        };
        let stored = self
            .storage
            .message_insert(&greeting)
            .await
            .map_err(|error| post_assignment(question_id, &error))?;

        // A false here means someone already moved the question past
        // Assigned; the conversation is in place, so carry on.
        let advanced = self
            .storage
            .question_transition(
                question_id,
                QuestionStatus::Assigned,
                QuestionStatus::InProgress,
                chrono::Utc::now(),
            )
            .await
            .map_err(|error| post_assignment(question_id, &error))?;
        if !advanced {
            warn!(%question_id, "question already past Assigned during setup");
        }

        self.events
            .publish(ConversationEvent::MessageSent { message: stored });
        info!(
            %question_id,
            conversation_id = %conversation.conversation_id,
            "conversation established"
        );

        Ok(conversation)
    }
}

fn post_assignment(question_id: QuestionId, error: &gavel_core::GavelError) -> gavel_core::GavelError {
    MatchError::PostAssignmentFailure {
        question_id,
        reason: error.to_string(),
    }
    .into()
}
