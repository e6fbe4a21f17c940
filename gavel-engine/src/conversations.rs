//! Conversation access and messaging.
//!
//! Every read and write is participant-gated: only the question's author
//! and the claiming judge may see or touch the channel. Messages are
//! append-only and ordered by creation time with the store's insertion
//! sequence as tie-break.

use crate::auth::Caller;
use crate::events::{ConversationEvent, EventHub};
use gavel_core::{
    new_entity_id, AuthError, Conversation, ConversationId, ConversationStatus, EntityType,
    GavelResult, Message, MessageKind, StorageError, ValidationError,
};
use gavel_storage::Storage;
use std::sync::Arc;
use tracing::{debug, info};

/// Input payload for a new message.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub kind: MessageKind,
    pub content: Option<String>,
    pub image_url: Option<String>,
}

impl NewMessage {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Text,
            content: Some(content.into()),
            image_url: None,
        }
    }

    pub fn image(url: impl Into<String>, caption: Option<String>) -> Self {
        Self {
            kind: MessageKind::Image,
            content: caption,
            image_url: Some(url.into()),
        }
    }
}

/// Participant-gated conversation reads and message sends.
#[derive(Clone)]
pub struct ConversationManager {
    storage: Arc<dyn Storage>,
    events: EventHub,
}

impl ConversationManager {
    pub fn new(storage: Arc<dyn Storage>, events: EventHub) -> Self {
        Self { storage, events }
    }

    /// Fetch a conversation the caller takes part in.
    pub async fn get_conversation(
        &self,
        caller: &Caller,
        id: ConversationId,
    ) -> GavelResult<Conversation> {
        self.load_for_participant(caller, id).await
    }

    /// All conversations the caller takes part in, most recently active
    /// first.
    pub async fn my_conversations(&self, caller: &Caller) -> GavelResult<Vec<Conversation>> {
        self.storage.conversation_list_for(caller.profile_id).await
    }

    /// Point-in-time message history, oldest first.
    pub async fn message_history(
        &self,
        caller: &Caller,
        id: ConversationId,
    ) -> GavelResult<Vec<Message>> {
        self.load_for_participant(caller, id).await?;
        self.storage.message_list(id).await
    }

    /// Append a message and broadcast it to live subscribers.
    pub async fn send_message(
        &self,
        caller: &Caller,
        conversation_id: ConversationId,
        input: NewMessage,
    ) -> GavelResult<Message> {
        let conversation = self.load_for_participant(caller, conversation_id).await?;
        validate_message(&input)?;

        let message = Message {
            message_id: new_entity_id(),
            conversation_id,
            sender_id: caller.profile_id,
            content: input.content,
            kind: input.kind,
            image_url: input.image_url,
            created_at: chrono::Utc::now(),
            sequence: 0,
            read_at: None,
        };
        let stored = self.storage.message_insert(&message).await?;
        self.storage
            .conversation_touch(conversation.conversation_id, stored.created_at)
            .await?;

        debug!(
            %conversation_id,
            sender_id = %caller.profile_id,
            kind = %stored.kind,
            "message sent"
        );
        self.events.publish(ConversationEvent::MessageSent {
            message: stored.clone(),
        });
        Ok(stored)
    }

    /// End a conversation. Idempotent: ending an already-ended
    /// conversation is a no-op. The underlying question is left alone;
    /// its terminal state is decided by the rating verdict.
    pub async fn end_conversation(
        &self,
        caller: &Caller,
        id: ConversationId,
    ) -> GavelResult<()> {
        self.load_for_participant(caller, id).await?;

        let ended = self
            .storage
            .conversation_end(id, chrono::Utc::now())
            .await?;
        if !ended {
            debug!(conversation_id = %id, "conversation already ended");
            return Ok(());
        }

        info!(conversation_id = %id, "conversation ended");
        self.events.publish(ConversationEvent::StatusChanged {
            conversation_id: id,
            status: ConversationStatus::Ended,
        });
        Ok(())
    }

    /// Live message stream for a conversation. No history replay; pair
    /// with [`message_history`](Self::message_history) for catch-up.
    pub fn subscribe_messages(
        &self,
        conversation_id: ConversationId,
    ) -> std::pin::Pin<Box<dyn tokio_stream::Stream<Item = Message> + Send>> {
        self.events.subscribe_messages(conversation_id)
    }

    /// Live status-change stream for a conversation.
    pub fn subscribe_status(
        &self,
        conversation_id: ConversationId,
    ) -> std::pin::Pin<Box<dyn tokio_stream::Stream<Item = ConversationStatus> + Send>> {
        self.events.subscribe_status(conversation_id)
    }

    async fn load_for_participant(
        &self,
        caller: &Caller,
        id: ConversationId,
    ) -> GavelResult<Conversation> {
        let conversation =
            self.storage.conversation_get(id).await?.ok_or_else(|| {
                gavel_core::GavelError::from(StorageError::NotFound {
                    entity_type: EntityType::Conversation,
                    id,
                })
            })?;
        if !conversation.is_participant(caller.profile_id) {
            return Err(AuthError::NotParticipant {
                caller: caller.profile_id,
                conversation_id: id,
            }
            .into());
        }
        Ok(conversation)
    }
}

fn validate_message(input: &NewMessage) -> GavelResult<()> {
    match input.kind {
        MessageKind::Text => {
            let has_content = input
                .content
                .as_deref()
                .map(|c| !c.trim().is_empty())
                .unwrap_or(false);
            if !has_content {
                return Err(ValidationError::RequiredFieldMissing {
                    field: "content".to_string(),
                }
                .into());
            }
        }
        MessageKind::Image => {
            if input.image_url.as_deref().map(str::trim).unwrap_or("").is_empty() {
                return Err(ValidationError::RequiredFieldMissing {
                    field: "image_url".to_string(),
                }
                .into());
            }
        }
        // System messages come only from the engine itself.
        MessageKind::System => {
            return Err(ValidationError::InvalidValue {
                field: "kind".to_string(),
                reason: "system messages cannot be sent by participants".to_string(),
            }
            .into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gavel_core::{GavelError, UserRole};
    use gavel_storage::MemoryStorage;
    use chrono::Utc;

    async fn setup() -> (Arc<MemoryStorage>, ConversationManager, Caller, Caller, Conversation)
    {
        let storage = Arc::new(MemoryStorage::new());
        let manager = ConversationManager::new(storage.clone(), EventHub::default());
        let user = Caller::new(new_entity_id(), UserRole::User);
        let judge = Caller::new(new_entity_id(), UserRole::Judge);
        let now = Utc::now();
        let conversation = Conversation {
            conversation_id: new_entity_id(),
            question_id: new_entity_id(),
            user_id: user.profile_id,
            judge_id: judge.profile_id,
            status: ConversationStatus::Active,
            started_at: now,
            ended_at: None,
            last_message_at: now,
        };
        storage.conversation_insert(&conversation).await.unwrap();
        (storage, manager, user, judge, conversation)
    }

    #[tokio::test]
    async fn test_participants_can_message_each_other() {
        let (storage, manager, user, judge, conversation) = setup().await;

        let first = manager
            .send_message(&user, conversation.conversation_id, NewMessage::text("Hello"))
            .await
            .unwrap();
        let second = manager
            .send_message(
                &judge,
                conversation.conversation_id,
                NewMessage::text("Looking into it"),
            )
            .await
            .unwrap();

        let history = manager
            .message_history(&user, conversation.conversation_id)
            .await
            .unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].message_id, first.message_id);
        assert_eq!(history[1].message_id, second.message_id);

        // Sends bump activity ordering.
        let stored = storage
            .conversation_get(conversation.conversation_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.last_message_at, second.created_at);
    }

    #[tokio::test]
    async fn test_outsider_is_rejected() {
        let (_storage, manager, _user, _judge, conversation) = setup().await;
        let outsider = Caller::new(new_entity_id(), UserRole::User);

        let err = manager
            .send_message(
                &outsider,
                conversation.conversation_id,
                NewMessage::text("Let me in"),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GavelError::Auth(AuthError::NotParticipant { .. })
        ));

        let err = manager
            .message_history(&outsider, conversation.conversation_id)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GavelError::Auth(AuthError::NotParticipant { .. })
        ));
    }

    #[tokio::test]
    async fn test_text_requires_content_image_requires_url() {
        let (_storage, manager, user, _judge, conversation) = setup().await;

        let blank = NewMessage {
            kind: MessageKind::Text,
            content: Some("   ".to_string()),
            image_url: None,
        };
        assert!(manager
            .send_message(&user, conversation.conversation_id, blank)
            .await
            .is_err());

        let no_url = NewMessage {
            kind: MessageKind::Image,
            content: Some("caption only".to_string()),
            image_url: None,
        };
        assert!(manager
            .send_message(&user, conversation.conversation_id, no_url)
            .await
            .is_err());

        let ok = NewMessage::image("https://img.example/board.png", None);
        assert!(manager
            .send_message(&user, conversation.conversation_id, ok)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_participants_cannot_forge_system_messages() {
        let (_storage, manager, user, _judge, conversation) = setup().await;
        let forged = NewMessage {
            kind: MessageKind::System,
            content: Some("Judge has joined".to_string()),
            image_url: None,
        };
        let err = manager
            .send_message(&user, conversation.conversation_id, forged)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GavelError::Validation(ValidationError::InvalidValue { .. })
        ));
    }

    #[tokio::test]
    async fn test_end_conversation_is_idempotent() {
        let (storage, manager, user, judge, conversation) = setup().await;

        manager
            .end_conversation(&user, conversation.conversation_id)
            .await
            .unwrap();
        manager
            .end_conversation(&judge, conversation.conversation_id)
            .await
            .unwrap();

        let stored = storage
            .conversation_get(conversation.conversation_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, ConversationStatus::Ended);
        assert!(stored.ended_at.is_some());
    }

    #[tokio::test]
    async fn test_end_conversation_leaves_question_untouched() {
        use gavel_core::{question_timeout, Question, QuestionStatus};

        let (storage, manager, user, judge, conversation) = setup().await;
        let now = Utc::now();
        let question = Question {
            question_id: conversation.question_id,
            author_id: user.profile_id,
            title: "Still mine to rate".to_string(),
            content: "The verdict comes with the rating.".to_string(),
            category: "Combat".to_string(),
            image_url: None,
            status: QuestionStatus::InProgress,
            assigned_judge_id: Some(judge.profile_id),
            created_at: now,
            assigned_at: Some(now),
            completed_at: None,
            timeout_at: now + question_timeout(),
        };
        storage.question_insert(&question).await.unwrap();

        manager
            .end_conversation(&user, conversation.conversation_id)
            .await
            .unwrap();

        // Ending the chat is not a verdict: the question stays in
        // progress until a rating settles or disputes it.
        let stored = storage
            .question_get(question.question_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, QuestionStatus::InProgress);
        assert!(stored.completed_at.is_none());
    }

    #[tokio::test]
    async fn test_my_conversations_ordering() {
        let (storage, manager, user, judge, first) = setup().await;

        let later = Conversation {
            conversation_id: new_entity_id(),
            question_id: new_entity_id(),
            user_id: user.profile_id,
            judge_id: judge.profile_id,
            status: ConversationStatus::Active,
            started_at: Utc::now(),
            ended_at: None,
            last_message_at: Utc::now() + chrono::Duration::seconds(5),
        };
        storage.conversation_insert(&later).await.unwrap();

        let mine = manager.my_conversations(&user).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].conversation_id, later.conversation_id);
        assert_eq!(mine[1].conversation_id, first.conversation_id);
    }

    #[tokio::test]
    async fn test_missing_conversation_is_not_found() {
        let (_storage, manager, user, _judge, _conversation) = setup().await;
        let err = manager
            .get_conversation(&user, new_entity_id())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GavelError::Storage(StorageError::NotFound { .. })
        ));
    }
}
