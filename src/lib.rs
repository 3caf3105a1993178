//! Twinber - Compatibility matching service for the Twinber quiz app
//!
//! The `core` module holds the pure matching logic: compatibility scoring,
//! archive filtering, partner search, report summaries, codes and CSV
//! export. The remaining modules wrap it in an HTTP service backed by
//! Firestore, PostgreSQL and Redis.

pub mod config;
pub mod core;
pub mod i18n;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{build_report, calculate_compatibility, filter_archive, Matcher, SearchCriteria};
pub use i18n::{Locale, QuestionBank};
pub use models::{Answer, AnswerData, Category, CompatibilityReport, Question, UserData, UserInfo};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let bank = QuestionBank::load().unwrap();
        let questions = bank.questions(Locale::En);
        let data = AnswerData {
            code: "ABCDEFGH".to_string(),
            answers: vec![Answer::Yes; questions.len()],
        };
        let report = calculate_compatibility(&data, &data, questions).unwrap();
        assert_eq!(report.overall_score, 100);
        assert_eq!(report.category_scores.len(), Category::ALL.len());
    }
}
