use crate::core::summary::ReportSummary;
use crate::models::domain::{
    Category, CompatibilityReport, Conversation, Coupon, Message, ScoredMatch, UserData, UserInfo,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: bool,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionView {
    /// 1-based, as used by the admin filter
    pub number: usize,
    pub category: Category,
    #[serde(rename = "categoryName")]
    pub category_name: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionsResponse {
    pub locale: String,
    pub questions: Vec<QuestionView>,
    pub categories: BTreeMap<Category, String>,
    pub coupons: BTreeMap<Category, Coupon>,
}

/// The caller's own record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: UserData,
    #[serde(rename = "shareToken")]
    pub share_token: String,
    #[serde(rename = "shareMessage")]
    pub share_message: String,
}

/// What anyone holding a code may see
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicProfileResponse {
    pub code: String,
    #[serde(rename = "userInfo")]
    pub user_info: UserInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareResponse {
    pub report: CompatibilityReport,
    pub summary: ReportSummary,
    /// Whether the report went into the caller's history
    pub saved: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub matches: Vec<ScoredMatch>,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
    pub returned: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveResponse {
    pub users: Vec<UserData>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterResponse {
    pub users: Vec<UserData>,
    pub total: usize,
    #[serde(rename = "questionNumbers")]
    pub question_numbers: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationsResponse {
    pub conversations: Vec<Conversation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesResponse {
    #[serde(rename = "conversationId")]
    pub conversation_id: String,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub conversation: Conversation,
    pub message: Message,
}
