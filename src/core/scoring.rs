use crate::models::{AnswerData, Category, CompatibilityCategoryScore, CompatibilityReport, Question, UserData};
use thiserror::Error;

/// Reasons two answer vectors cannot be compared
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    #[error("Question set is empty")]
    EmptyQuestionSet,

    #[error("Answers for {code} have {actual} entries, expected {expected}")]
    AnswerCountMismatch {
        code: String,
        expected: usize,
        actual: usize,
    },
}

/// Calculate the compatibility report (0-100) between two respondents
///
/// Each question where both answers agree counts as a match:
///
/// overall  = round(100 * matches / questions)
/// category = round(100 * category_matches / category_questions)
///
/// Category scores appear in the order the categories first occur in
/// `questions`.
pub fn calculate_compatibility(
    data1: &AnswerData,
    data2: &AnswerData,
    questions: &[Question],
) -> Result<CompatibilityReport, ScoringError> {
    if questions.is_empty() {
        return Err(ScoringError::EmptyQuestionSet);
    }
    check_answer_count(data1, questions.len())?;
    check_answer_count(data2, questions.len())?;

    let mut total_matches = 0usize;
    // (category, matches, count) in first-seen order; at most a couple dozen entries
    let mut category_stats: Vec<(Category, usize, usize)> = Vec::new();

    for (index, question) in questions.iter().enumerate() {
        let is_match = data1.answers[index] == data2.answers[index];
        if is_match {
            total_matches += 1;
        }

        let position = match category_stats
            .iter()
            .position(|(category, _, _)| *category == question.category)
        {
            Some(position) => position,
            None => {
                category_stats.push((question.category, 0, 0));
                category_stats.len() - 1
            }
        };
        let stats = &mut category_stats[position];
        if is_match {
            stats.1 += 1;
        }
        stats.2 += 1;
    }

    let category_scores = category_stats
        .into_iter()
        .map(|(category, matches, count)| CompatibilityCategoryScore {
            category,
            score: percentage(matches, count),
        })
        .collect();

    Ok(CompatibilityReport {
        overall_score: percentage(total_matches, questions.len()),
        category_scores,
        user1_code: data1.code.clone(),
        user2_code: data2.code.clone(),
        user1_info: None,
        user2_info: None,
    })
}

/// Score two registered users and attach their demographic info
pub fn build_report(
    user1: &UserData,
    user2: &UserData,
    questions: &[Question],
) -> Result<CompatibilityReport, ScoringError> {
    let mut report = calculate_compatibility(&user1.answer_data(), &user2.answer_data(), questions)?;
    report.user1_info = Some(user1.user_info.clone());
    report.user2_info = Some(user2.user_info.clone());
    Ok(report)
}

#[inline]
fn check_answer_count(data: &AnswerData, expected: usize) -> Result<(), ScoringError> {
    if data.answers.len() != expected {
        return Err(ScoringError::AnswerCountMismatch {
            code: data.code.clone(),
            expected,
            actual: data.answers.len(),
        });
    }
    Ok(())
}

/// round(100 * part / whole), half rounded up, computed on integers
#[inline]
pub fn percentage(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    ((200 * part + whole) / (2 * whole)) as u8
}
