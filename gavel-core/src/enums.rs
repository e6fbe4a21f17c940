//! Enum types for GAVEL entities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

fn normalize_token(s: &str) -> String {
    s.trim().to_lowercase().replace(['-', ' '], "_")
}

/// Role of an authenticated profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    User,
    Judge,
    Admin,
}

impl UserRole {
    /// Judges and admins may browse and claim waiting questions.
    pub fn can_claim_questions(&self) -> bool {
        matches!(self, UserRole::Judge | UserRole::Admin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            UserRole::User => "user",
            UserRole::Judge => "judge",
            UserRole::Admin => "admin",
        };
        write!(f, "{}", value)
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "user" => Ok(UserRole::User),
            "judge" => Ok(UserRole::Judge),
            "admin" => Ok(UserRole::Admin),
            _ => Err(format!("Invalid UserRole: {}", s)),
        }
    }
}

/// Status of a question through its lifecycle.
///
/// `waiting_for_judge → assigned → in_progress → {completed | disputed}
/// → resolved`, where `resolved` is only reachable from `disputed` via
/// admin action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionStatus {
    WaitingForJudge,
    Assigned,
    InProgress,
    Completed,
    Disputed,
    Resolved,
}

impl QuestionStatus {
    /// Terminal states: no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, QuestionStatus::Completed | QuestionStatus::Resolved)
    }

    /// Whether a question in this status must carry an assigned judge.
    /// `assigned_judge_id` is set if and only if this returns true.
    pub fn requires_judge(&self) -> bool {
        !matches!(self, QuestionStatus::WaitingForJudge)
    }
}

impl fmt::Display for QuestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            QuestionStatus::WaitingForJudge => "waiting_for_judge",
            QuestionStatus::Assigned => "assigned",
            QuestionStatus::InProgress => "in_progress",
            QuestionStatus::Completed => "completed",
            QuestionStatus::Disputed => "disputed",
            QuestionStatus::Resolved => "resolved",
        };
        write!(f, "{}", value)
    }
}

impl FromStr for QuestionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "waiting_for_judge" | "waiting" => Ok(QuestionStatus::WaitingForJudge),
            "assigned" => Ok(QuestionStatus::Assigned),
            "in_progress" => Ok(QuestionStatus::InProgress),
            "completed" | "complete" => Ok(QuestionStatus::Completed),
            "disputed" => Ok(QuestionStatus::Disputed),
            "resolved" => Ok(QuestionStatus::Resolved),
            _ => Err(format!("Invalid QuestionStatus: {}", s)),
        }
    }
}

/// Status of a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStatus {
    Active,
    Disputed,
    Ended,
}

impl fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            ConversationStatus::Active => "active",
            ConversationStatus::Disputed => "disputed",
            ConversationStatus::Ended => "ended",
        };
        write!(f, "{}", value)
    }
}

impl FromStr for ConversationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "active" => Ok(ConversationStatus::Active),
            "disputed" => Ok(ConversationStatus::Disputed),
            "ended" => Ok(ConversationStatus::Ended),
            _ => Err(format!("Invalid ConversationStatus: {}", s)),
        }
    }
}

/// Kind of a message within a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Text,
    Image,
    System,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            MessageKind::Text => "text",
            MessageKind::Image => "image",
            MessageKind::System => "system",
        };
        write!(f, "{}", value)
    }
}

/// Status of a dispute raised against a judge's ruling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeStatus {
    Pending,
    UnderReview,
    Resolved,
}

impl fmt::Display for DisputeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            DisputeStatus::Pending => "pending",
            DisputeStatus::UnderReview => "under_review",
            DisputeStatus::Resolved => "resolved",
        };
        write!(f, "{}", value)
    }
}

/// Certification level of a judge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JudgeLevel {
    L1,
    L2,
    L3,
}

impl fmt::Display for JudgeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            JudgeLevel::L1 => "L1",
            JudgeLevel::L2 => "L2",
            JudgeLevel::L3 => "L3",
        };
        write!(f, "{}", value)
    }
}

impl FromStr for JudgeLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "L1" => Ok(JudgeLevel::L1),
            "L2" => Ok(JudgeLevel::L2),
            "L3" => Ok(JudgeLevel::L3),
            _ => Err(format!("Invalid JudgeLevel: {}", s)),
        }
    }
}

/// Kind tag attached to a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    NewQuestion,
    Dispute,
    General,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            NotificationKind::NewQuestion => "new_question",
            NotificationKind::Dispute => "dispute",
            NotificationKind::General => "general",
        };
        write!(f, "{}", value)
    }
}

/// Entity type discriminator for polymorphic references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Profile,
    JudgeInfo,
    Question,
    Conversation,
    Message,
    Rating,
    Reward,
    Dispute,
    Notification,
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_status_roundtrip() {
        for status in [
            QuestionStatus::WaitingForJudge,
            QuestionStatus::Assigned,
            QuestionStatus::InProgress,
            QuestionStatus::Completed,
            QuestionStatus::Disputed,
            QuestionStatus::Resolved,
        ] {
            let parsed: QuestionStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_question_status_terminal() {
        assert!(QuestionStatus::Completed.is_terminal());
        assert!(QuestionStatus::Resolved.is_terminal());
        assert!(!QuestionStatus::WaitingForJudge.is_terminal());
        assert!(!QuestionStatus::Disputed.is_terminal());
    }

    #[test]
    fn test_question_status_requires_judge() {
        assert!(!QuestionStatus::WaitingForJudge.requires_judge());
        assert!(QuestionStatus::Assigned.requires_judge());
        assert!(QuestionStatus::InProgress.requires_judge());
        assert!(QuestionStatus::Completed.requires_judge());
        assert!(QuestionStatus::Disputed.requires_judge());
        assert!(QuestionStatus::Resolved.requires_judge());
    }

    #[test]
    fn test_user_role_claim_permission() {
        assert!(!UserRole::User.can_claim_questions());
        assert!(UserRole::Judge.can_claim_questions());
        assert!(UserRole::Admin.can_claim_questions());
    }

    #[test]
    fn test_role_parse_accepts_mixed_case() {
        assert_eq!("Judge".parse::<UserRole>().unwrap(), UserRole::Judge);
        assert!("referee".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_judge_level_parse() {
        assert_eq!("l2".parse::<JudgeLevel>().unwrap(), JudgeLevel::L2);
        assert!("L4".parse::<JudgeLevel>().is_err());
    }
}
