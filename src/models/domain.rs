use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Stable identifier for a question group
///
/// Display names live in the per-locale string tables; the identifier is
/// what gets stored, compared and used as a configuration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    FoodAndDrink,
    Hobbies,
    MoviesAndTv,
    Music,
    BooksAndReading,
    Travel,
    SocialLife,
    HomeLife,
    HealthAndWellness,
    CareerAndAmbition,
    Finances,
    TechnologyAndSocialMedia,
    Humor,
    AestheticsAndStyle,
    NatureAndOutdoors,
    CommunicationStyle,
    EmotionalApproach,
    ValuesAndBeliefs,
    RelationshipDynamics,
    FutureGoals,
}

impl Category {
    pub const ALL: [Category; 20] = [
        Category::FoodAndDrink,
        Category::Hobbies,
        Category::MoviesAndTv,
        Category::Music,
        Category::BooksAndReading,
        Category::Travel,
        Category::SocialLife,
        Category::HomeLife,
        Category::HealthAndWellness,
        Category::CareerAndAmbition,
        Category::Finances,
        Category::TechnologyAndSocialMedia,
        Category::Humor,
        Category::AestheticsAndStyle,
        Category::NatureAndOutdoors,
        Category::CommunicationStyle,
        Category::EmotionalApproach,
        Category::ValuesAndBeliefs,
        Category::RelationshipDynamics,
        Category::FutureGoals,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Category::FoodAndDrink => "food_and_drink",
            Category::Hobbies => "hobbies",
            Category::MoviesAndTv => "movies_and_tv",
            Category::Music => "music",
            Category::BooksAndReading => "books_and_reading",
            Category::Travel => "travel",
            Category::SocialLife => "social_life",
            Category::HomeLife => "home_life",
            Category::HealthAndWellness => "health_and_wellness",
            Category::CareerAndAmbition => "career_and_ambition",
            Category::Finances => "finances",
            Category::TechnologyAndSocialMedia => "technology_and_social_media",
            Category::Humor => "humor",
            Category::AestheticsAndStyle => "aesthetics_and_style",
            Category::NatureAndOutdoors => "nature_and_outdoors",
            Category::CommunicationStyle => "communication_style",
            Category::EmotionalApproach => "emotional_approach",
            Category::ValuesAndBeliefs => "values_and_beliefs",
            Category::RelationshipDynamics => "relationship_dynamics",
            Category::FutureGoals => "future_goals",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.key() == s)
            .ok_or_else(|| format!("unknown category: {}", s))
    }
}

/// A single yes/no answer, stored on the wire as 0 or 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Answer {
    No = 0,
    Yes = 1,
}

impl TryFrom<u8> for Answer {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Answer::No),
            1 => Ok(Answer::Yes),
            other => Err(format!("answer must be 0 or 1, got {}", other)),
        }
    }
}

impl From<Answer> for u8 {
    fn from(answer: Answer) -> Self {
        answer as u8
    }
}

impl Default for Answer {
    fn default() -> Self {
        Answer::Yes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

/// Question as shown to respondents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub category: Category,
    pub text: String,
}

/// Answers keyed by the public code, as carried in share tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerData {
    pub code: String,
    pub answers: Vec<Answer>,
}

/// Demographic data entered before the quiz
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct UserInfo {
    #[validate(length(min = 1, max = 60))]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_age")]
    #[validate(range(min = 18, max = 99))]
    pub age: Option<u8>,
    pub gender: Gender,
    #[validate(length(min = 2, max = 8))]
    pub country: String,
}

/// Older records store a missing age as an empty string.
fn deserialize_age<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAge {
        Number(u64),
        Text(String),
    }

    match Option::<RawAge>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawAge::Number(n)) => u8::try_from(n)
            .map(Some)
            .map_err(|_| de::Error::custom(format!("age out of range: {}", n))),
        Some(RawAge::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(RawAge::Text(s)) => s.trim().parse::<u8>().map(Some).map_err(de::Error::custom),
    }
}

/// One registered respondent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    pub uid: String,
    #[serde(rename = "userInfo")]
    pub user_info: UserInfo,
    pub code: String,
    pub answers: Vec<Answer>,
}

impl UserData {
    pub fn answer_data(&self) -> AnswerData {
        AnswerData {
            code: self.code.clone(),
            answers: self.answers.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityCategoryScore {
    pub category: Category,
    pub score: u8,
}

/// Outcome of comparing two respondents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityReport {
    #[serde(rename = "overallScore")]
    pub overall_score: u8,
    #[serde(rename = "categoryScores")]
    pub category_scores: Vec<CompatibilityCategoryScore>,
    #[serde(rename = "user1Code")]
    pub user1_code: String,
    #[serde(rename = "user2Code")]
    pub user2_code: String,
    #[serde(rename = "user1Info", default, skip_serializing_if = "Option::is_none")]
    pub user1_info: Option<UserInfo>,
    #[serde(rename = "user2Info", default, skip_serializing_if = "Option::is_none")]
    pub user2_info: Option<UserInfo>,
}

/// Archived user ranked against a reference user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredMatch {
    pub code: String,
    #[serde(rename = "userInfo")]
    pub user_info: UserInfo,
    #[serde(rename = "compatibilityScore")]
    pub compatibility_score: u8,
}

/// Conversation member snapshot taken when the conversation starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    #[serde(flatten)]
    pub info: UserInfo,
    pub code: String,
    pub uid: String,
}

impl Participant {
    pub fn from_user(user: &UserData) -> Self {
        Self {
            info: user.user_info.clone(),
            code: user.code.clone(),
            uid: user.uid.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "senderCode")]
    pub sender_code: String,
    #[serde(rename = "senderUid")]
    pub sender_uid: String,
    pub text: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub participant1: Participant,
    pub participant2: Participant,
    #[serde(rename = "participantUids")]
    pub participant_uids: Vec<String>,
    #[serde(rename = "compatibilityScore")]
    pub compatibility_score: u8,
    #[serde(rename = "lastMessage")]
    pub last_message: Option<Message>,
    #[serde(rename = "lastUpdate")]
    pub last_update: chrono::DateTime<chrono::Utc>,
}

impl Conversation {
    pub fn has_participant(&self, uid: &str) -> bool {
        self.participant_uids.iter().any(|p| p == uid)
    }
}

/// Partially completed questionnaire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizProgress {
    pub answers: Vec<Option<Answer>>,
    #[serde(rename = "currentQuestionIndex")]
    pub current_question_index: usize,
    #[serde(rename = "userInfo")]
    pub user_info: UserInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    pub company: String,
    pub code: String,
    pub url: String,
}
