//! Question intake and listing.

use crate::auth::Caller;
use crate::notifier::Notifier;
use gavel_core::{
    new_entity_id, question_timeout, EntityType, GavelResult, Question, QuestionId,
    QuestionStatus, StorageError, ValidationError,
};
use gavel_storage::Storage;
use std::sync::Arc;
use tracing::info;

/// Input payload for a new question.
#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub title: String,
    pub content: String,
    pub category: String,
    pub image_url: Option<String>,
}

/// Creates questions and serves the author-side and judge-side listings.
#[derive(Clone)]
pub struct QuestionRegistry {
    storage: Arc<dyn Storage>,
    notifier: Notifier,
}

impl QuestionRegistry {
    pub fn new(storage: Arc<dyn Storage>, notifier: Notifier) -> Self {
        Self { storage, notifier }
    }

    /// Create a question in `WaitingForJudge` with the timeout deadline
    /// stamped at creation, then fan out to available judges.
    ///
    /// The fan-out is advisory: its failure never fails the creation.
    pub async fn create_question(
        &self,
        caller: &Caller,
        input: NewQuestion,
    ) -> GavelResult<Question> {
        let title = required_field("title", &input.title)?;
        let content = required_field("content", &input.content)?;
        let category = required_field("category", &input.category)?;

        let now = chrono::Utc::now();
        let question = Question {
            question_id: new_entity_id(),
            author_id: caller.profile_id,
            title,
            content,
            category,
            image_url: input.image_url,
            status: QuestionStatus::WaitingForJudge,
            assigned_judge_id: None,
            created_at: now,
            assigned_at: None,
            completed_at: None,
            timeout_at: now + question_timeout(),
        };
        self.storage.question_insert(&question).await?;
        info!(question_id = %question.question_id, category = %question.category, "question created");

        self.notifier
            .notify_available_judges(question.question_id, &question.title, &question.category)
            .await;

        Ok(question)
    }

    /// Fetch a single question.
    pub async fn get_question(&self, id: QuestionId) -> GavelResult<Question> {
        self.storage.question_get(id).await?.ok_or_else(|| {
            StorageError::NotFound {
                entity_type: EntityType::Question,
                id,
            }
            .into()
        })
    }

    /// The caller's own questions, newest first.
    pub async fn my_questions(&self, caller: &Caller) -> GavelResult<Vec<Question>> {
        self.storage.question_list_by_author(caller.profile_id).await
    }

    /// Questions currently open for claiming, oldest first. Judge-side
    /// view, so the caller must hold the claim role.
    pub async fn claimable_questions(&self, caller: &Caller) -> GavelResult<Vec<Question>> {
        caller.require_claim_role("list claimable questions")?;
        self.storage
            .question_list_claimable(chrono::Utc::now())
            .await
    }

    /// Move an in-progress question to `Completed`. Idempotent: a
    /// question already past `InProgress` is left untouched.
    pub async fn complete_question(&self, question_id: QuestionId) -> GavelResult<()> {
        let completed = self
            .storage
            .question_transition(
                question_id,
                QuestionStatus::InProgress,
                QuestionStatus::Completed,
                chrono::Utc::now(),
            )
            .await?;
        if completed {
            info!(%question_id, "question completed");
        }
        Ok(())
    }
}

fn required_field(name: &str, value: &str) -> GavelResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::RequiredFieldMissing {
            field: name.to_string(),
        }
        .into())
    } else {
        Ok(trimmed.to_string())
    }
}
