use crate::models::{Answer, Gender, UserData};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Country selection that imposes no constraint
pub const WORLD: &str = "world";

/// Rejected filter input; nothing is filtered when one of these is returned
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("Invalid question number: {0:?}")]
    InvalidQuestionNumber(String),

    #[error("Question number {number} is out of range (1-{question_count})")]
    QuestionOutOfRange { number: i64, question_count: usize },

    #[error("Minimum age {min} is greater than maximum age {max}")]
    InvalidAgeRange { min: u8, max: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenderFilter {
    #[default]
    #[serde(alias = "Any")]
    Any,
    #[serde(alias = "Male")]
    Male,
    #[serde(alias = "Female")]
    Female,
}

impl GenderFilter {
    #[inline]
    pub fn matches(&self, gender: Gender) -> bool {
        match self {
            GenderFilter::Any => true,
            GenderFilter::Male => gender == Gender::Male,
            GenderFilter::Female => gender == Gender::Female,
        }
    }
}

/// Demographic predicates shared by the admin filter and partner search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demographics {
    #[serde(default)]
    pub gender: GenderFilter,
    #[serde(rename = "minAge", default)]
    pub min_age: Option<u8>,
    #[serde(rename = "maxAge", default)]
    pub max_age: Option<u8>,
    #[serde(default)]
    pub countries: Vec<String>,
}

impl Demographics {
    pub fn validate(&self) -> Result<(), FilterError> {
        if let (Some(min), Some(max)) = (self.min_age, self.max_age) {
            if min > max {
                return Err(FilterError::InvalidAgeRange { min, max });
            }
        }
        Ok(())
    }
}

/// Admin archive search criteria
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveCriteria {
    /// Answer every listed question must carry
    #[serde(default)]
    pub answer: Answer,
    /// Comma-separated, 1-based question numbers, e.g. "3, 7,12"
    #[serde(default)]
    pub questions: String,
    #[serde(flatten)]
    pub demographics: Demographics,
}

/// Check if a user passes the demographic predicates
#[inline]
pub fn matches_demographics(user: &UserData, demographics: &Demographics) -> bool {
    let info = &user.user_info;

    if !demographics.gender.matches(info.gender) {
        return false;
    }

    // A bound that is present requires a recorded age
    if let Some(min_age) = demographics.min_age {
        match info.age {
            Some(age) if age >= min_age => {}
            _ => return false,
        }
    }
    if let Some(max_age) = demographics.max_age {
        match info.age {
            Some(age) if age <= max_age => {}
            _ => return false,
        }
    }

    country_allowed(&demographics.countries, &info.country)
}

/// Empty allow-list or one containing `world` admits every country
#[inline]
pub fn country_allowed(countries: &[String], country: &str) -> bool {
    countries.is_empty()
        || countries.iter().any(|c| c == WORLD)
        || countries.iter().any(|c| c == country)
}

/// Parse a comma-separated list of question numbers, ignoring blank entries
pub fn parse_question_numbers(input: &str) -> Result<Vec<i64>, FilterError> {
    input
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<i64>()
                .map_err(|_| FilterError::InvalidQuestionNumber(token.to_string()))
        })
        .collect()
}

/// Turn 1-based question numbers into 0-based indices
pub fn validate_question_numbers(
    numbers: &[i64],
    question_count: usize,
) -> Result<Vec<usize>, FilterError> {
    numbers
        .iter()
        .map(|&number| {
            if number < 1 || number as u64 > question_count as u64 {
                Err(FilterError::QuestionOutOfRange { number, question_count })
            } else {
                Ok((number - 1) as usize)
            }
        })
        .collect()
}

/// Validated archive filter, ready to be applied
#[derive(Debug, Clone)]
pub struct ArchiveFilter {
    answer: Answer,
    question_numbers: Vec<i64>,
    question_indices: Vec<usize>,
    demographics: Demographics,
}

impl ArchiveFilter {
    pub fn new(criteria: &ArchiveCriteria, question_count: usize) -> Result<Self, FilterError> {
        let question_numbers = parse_question_numbers(&criteria.questions)?;
        let question_indices = validate_question_numbers(&question_numbers, question_count)?;
        criteria.demographics.validate()?;

        Ok(Self {
            answer: criteria.answer,
            question_numbers,
            question_indices,
            demographics: criteria.demographics.clone(),
        })
    }

    /// The 1-based question numbers this filter was built from
    pub fn question_numbers(&self) -> &[i64] {
        &self.question_numbers
    }

    pub fn question_indices(&self) -> &[usize] {
        &self.question_indices
    }

    #[inline]
    pub fn matches(&self, user: &UserData) -> bool {
        if !matches_demographics(user, &self.demographics) {
            return false;
        }

        self.question_indices
            .iter()
            .all(|&index| user.answers.get(index) == Some(&self.answer))
    }

    /// Stable single pass over the archive
    pub fn apply(&self, archive: &[UserData]) -> Vec<UserData> {
        archive.iter().filter(|user| self.matches(user)).cloned().collect()
    }
}

/// Validate `criteria` and filter the archive
///
/// On a validation error nothing is filtered.
pub fn filter_archive(
    archive: &[UserData],
    criteria: &ArchiveCriteria,
    question_count: usize,
) -> Result<Vec<UserData>, FilterError> {
    let filter = ArchiveFilter::new(criteria, question_count)?;
    Ok(filter.apply(archive))
}
