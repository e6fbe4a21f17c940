//! Error types for GAVEL operations

use crate::EntityType;
use thiserror::Error;
use uuid::Uuid;

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Entity not found: {entity_type:?} with id {id}")]
    NotFound { entity_type: EntityType, id: Uuid },

    #[error("Insert failed for {entity_type:?}: {reason}")]
    InsertFailed {
        entity_type: EntityType,
        reason: String,
    },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Validation errors, rejected before any write.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Constraint violation on {constraint}: {reason}")]
    ConstraintViolation { constraint: String, reason: String },
}

/// Authentication and authorization errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Caller is not authenticated")]
    NotAuthenticated,

    #[error("Caller {caller} is not permitted to {action}")]
    Forbidden { caller: Uuid, action: String },

    #[error("Caller {caller} is not a participant of conversation {conversation_id}")]
    NotParticipant {
        caller: Uuid,
        conversation_id: Uuid,
    },
}

/// Matching and assignment errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MatchError {
    /// Lost the claim race: the question was claimed by another judge,
    /// timed out, or withdrawn. The sub-causes are observably equivalent
    /// to the caller, which should simply re-list claimable questions.
    #[error("Question {question_id} is no longer claimable")]
    AlreadyClaimed { question_id: Uuid },

    /// The claim succeeded but conversation creation failed afterwards.
    /// The question stays assigned to the winning judge; the caller may
    /// retry conversation creation without re-running the claim.
    #[error("Question {question_id} was claimed but conversation setup failed: {reason}")]
    PostAssignmentFailure {
        question_id: Uuid,
        reason: String,
    },
}

/// Master error type for all GAVEL errors.
#[derive(Debug, Clone, Error)]
pub enum GavelError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Match error: {0}")]
    Match(#[from] MatchError),
}

impl GavelError {
    /// Whether this error is the expected loser outcome of a claim race.
    pub fn is_already_claimed(&self) -> bool {
        matches!(self, GavelError::Match(MatchError::AlreadyClaimed { .. }))
    }
}

/// Result type alias for GAVEL operations.
pub type GavelResult<T> = Result<T, GavelError>;

// =============================================================================
// TESTS
// =============================================================================
