use crate::core::{
    code::normalize_code,
    filters::{matches_demographics, Demographics, FilterError, GenderFilter},
    scoring::{build_report, calculate_compatibility, ScoringError},
};
use crate::models::{CompatibilityReport, Question, ScoredMatch, UserData};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("Invalid code")]
    InvalidCode,

    #[error("Both codes are the same")]
    SameCode,

    #[error("Code not found: {0}")]
    UnknownCode(String),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Scoring(#[from] ScoringError),
}

/// Partner search criteria
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    #[serde(rename = "minCompatibility", default = "default_min_compatibility")]
    pub min_compatibility: u8,
    #[serde(default)]
    pub gender: GenderFilter,
    #[serde(rename = "minAge", default = "default_min_age")]
    pub min_age: u8,
    #[serde(rename = "maxAge", default = "default_max_age")]
    pub max_age: u8,
    #[serde(default)]
    pub countries: Vec<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

fn default_min_compatibility() -> u8 { 35 }
fn default_min_age() -> u8 { 18 }
fn default_max_age() -> u8 { 99 }

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            min_compatibility: default_min_compatibility(),
            gender: GenderFilter::Any,
            min_age: default_min_age(),
            max_age: default_max_age(),
            countries: Vec::new(),
            limit: None,
        }
    }
}

impl SearchCriteria {
    fn demographics(&self) -> Demographics {
        Demographics {
            gender: self.gender,
            min_age: Some(self.min_age),
            max_age: Some(self.max_age),
            countries: self.countries.clone(),
        }
    }
}

/// Result of a partner search
#[derive(Debug)]
pub struct SearchResult {
    pub matches: Vec<ScoredMatch>,
    pub total_candidates: usize,
}

/// Upper bound on a requested `limit`
#[derive(Debug, Clone, Copy)]
pub struct MatcherLimits {
    pub max_results: usize,
}

impl Default for MatcherLimits {
    fn default() -> Self {
        Self { max_results: 200 }
    }
}

/// Partner search orchestrator
///
/// # Pipeline Stages
/// 1. Exclude the reference user
/// 2. Score every remaining archive entry
/// 3. Drop entries below the compatibility threshold
/// 4. Demographic filtering
/// 5. Stable sort by score, descending
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    limits: MatcherLimits,
}

impl Matcher {
    pub fn new(limits: MatcherLimits) -> Self {
        Self { limits }
    }

    /// Rank the archive against `reference`
    ///
    /// Entries whose answers cannot be scored against `questions` are
    /// skipped, so one malformed record never aborts a search.
    pub fn search(
        &self,
        reference: &UserData,
        archive: &[UserData],
        questions: &[Question],
        criteria: &SearchCriteria,
    ) -> Result<SearchResult, SearchError> {
        if questions.is_empty() {
            return Err(ScoringError::EmptyQuestionSet.into());
        }
        let demographics = criteria.demographics();
        demographics.validate()?;

        // Only archive entries are skipped; the reference itself must be scorable
        if reference.answers.len() != questions.len() {
            return Err(ScoringError::AnswerCountMismatch {
                code: reference.code.clone(),
                expected: questions.len(),
                actual: reference.answers.len(),
            }
            .into());
        }

        let reference_data = reference.answer_data();
        let candidates: Vec<&UserData> = archive
            .iter()
            .filter(|user| user.code != reference.code)
            .collect();
        let total_candidates = candidates.len();

        let mut matches: Vec<ScoredMatch> = candidates
            .into_iter()
            .filter_map(|user| {
                match calculate_compatibility(&reference_data, &user.answer_data(), questions) {
                    Ok(report) => Some((user, report.overall_score)),
                    Err(e) => {
                        tracing::warn!("Skipping {} in partner search: {}", user.code, e);
                        None
                    }
                }
            })
            .filter(|(_, score)| *score >= criteria.min_compatibility)
            .filter(|(user, _)| matches_demographics(user, &demographics))
            .map(|(user, score)| ScoredMatch {
                code: user.code.clone(),
                user_info: user.user_info.clone(),
                compatibility_score: score,
            })
            .collect();

        // sort_by is stable: ties keep archive order
        matches.sort_by(|a, b| b.compatibility_score.cmp(&a.compatibility_score));

        // Without a requested limit every qualifying match is returned
        if let Some(limit) = criteria.limit {
            matches.truncate(limit.min(self.limits.max_results));
        }

        Ok(SearchResult {
            matches,
            total_candidates,
        })
    }

    /// Resolve both codes against the archive and build their report
    pub fn compare_codes(
        &self,
        code1: &str,
        code2: &str,
        archive: &[UserData],
        questions: &[Question],
    ) -> Result<CompatibilityReport, SearchError> {
        let (code1, code2) = validate_code_pair(code1, code2)?;
        let user1 = find_by_code(archive, &code1).ok_or(SearchError::UnknownCode(code1))?;
        let user2 = find_by_code(archive, &code2).ok_or(SearchError::UnknownCode(code2))?;
        Ok(build_report(user1, user2, questions)?)
    }
}

/// Normalize two codes for a direct comparison
pub fn validate_code_pair(code1: &str, code2: &str) -> Result<(String, String), SearchError> {
    let code1 = normalize_code(code1).ok_or(SearchError::InvalidCode)?;
    let code2 = normalize_code(code2).ok_or(SearchError::InvalidCode)?;
    if code1 == code2 {
        return Err(SearchError::SameCode);
    }
    Ok((code1, code2))
}

/// Case-insensitive lookup by public code
pub fn find_by_code<'a>(archive: &'a [UserData], code: &str) -> Option<&'a UserData> {
    let code = normalize_code(code)?;
    archive.iter().find(|user| user.code.to_uppercase() == code)
}
