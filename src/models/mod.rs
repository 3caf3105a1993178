// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Answer, AnswerData, Category, CompatibilityCategoryScore, CompatibilityReport, Conversation,
    Coupon, Gender, Message, Participant, Question, QuizProgress, ScoredMatch, UserData, UserInfo,
};
pub use requests::{
    CompareRequest, DecodeRequest, LocaleQuery, ReportsQuery, SearchRequest, SendMessageRequest,
    SubmitQuizRequest,
};
pub use responses::{
    ArchiveResponse, CompareResponse, ConversationsResponse, ErrorResponse, FilterResponse,
    HealthResponse, MessagesResponse, PublicProfileResponse, QuestionView, QuestionsResponse,
    SearchResponse, SendMessageResponse, UserResponse,
};
