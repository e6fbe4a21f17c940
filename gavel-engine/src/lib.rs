//! GAVEL Engine - Question Lifecycle & Matching
//!
//! Brokers rules questions between users and certified judges: question
//! creation and timeout, notification fan-out, the race-free claim, the
//! 1:1 conversation per question, and the rating -> reward -> aggregate
//! statistics -> dispute pipeline.
//!
//! Every service takes the store through the [`gavel_storage::Storage`]
//! trait; the only cross-caller serialization point is the store's
//! conditional claim (see `AssignmentArbiter`), never an engine-side lock.

pub mod arbiter;
pub mod auth;
pub mod conversations;
pub mod events;
pub mod judges;
pub mod notifications;
pub mod notifier;
pub mod questions;
pub mod ratings;

pub use arbiter::AssignmentArbiter;
pub use auth::{require_caller, Caller};
pub use conversations::{ConversationManager, NewMessage};
pub use events::{ConversationEvent, EventHub};
pub use judges::{JudgeDirectory, JudgeRegistration, JudgeStatsBundle};
pub use notifications::NotificationFeed;
pub use notifier::Notifier;
pub use questions::{NewQuestion, QuestionRegistry};
pub use ratings::{RatingEngine, RatingSubmission};
