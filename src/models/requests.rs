use crate::core::matcher::SearchCriteria;
use crate::models::domain::{Answer, UserInfo};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// `?locale=` on localized endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocaleQuery {
    pub locale: Option<String>,
}

/// Completed questionnaire
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitQuizRequest {
    #[validate(nested)]
    #[serde(alias = "user_info", rename = "userInfo")]
    pub user_info: UserInfo,
    #[validate(length(min = 1))]
    pub answers: Vec<Answer>,
}

/// Direct comparison of two public codes
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CompareRequest {
    #[validate(length(min = 1, max = 32))]
    pub code1: String,
    #[validate(length(min = 1, max = 32))]
    pub code2: String,
}

/// Comparison of two share tokens
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DecodeRequest {
    #[validate(length(min = 1))]
    pub token1: String,
    #[validate(length(min = 1))]
    pub token2: String,
}

/// Partner search for the respondent holding `code`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub code: String,
    #[serde(flatten)]
    pub criteria: SearchCriteria,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[validate(length(min = 1, max = 32))]
    #[serde(alias = "recipient_code", rename = "recipientCode")]
    pub recipient_code: String,
    #[validate(length(min = 1, max = 2000))]
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportsQuery {
    pub limit: Option<i64>,
}
