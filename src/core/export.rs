use crate::models::{Answer, Question, UserData};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    #[error("Nothing to export")]
    Empty,

    #[error("Question number {0} is out of range")]
    QuestionOutOfRange(i64),
}

/// Localized strings written into exported sheets
#[derive(Debug, Clone)]
pub struct ExportLabels {
    pub yes: String,
    pub no: String,
    pub question_header: String,
    pub answer_header: String,
}

/// A rendered CSV document and its download name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvFile {
    pub filename: String,
    pub content: String,
}

const LINE_END: &str = "\r\n";

/// Quote a text field, doubling embedded quotes
#[inline]
pub fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn country_name<'a>(countries: &'a BTreeMap<String, String>, code: &'a str) -> &'a str {
    countries.get(code).map(String::as_str).unwrap_or(code)
}

fn answer_label<'a>(answer: Option<&Answer>, labels: &'a ExportLabels) -> &'a str {
    match answer {
        Some(Answer::Yes) => &labels.yes,
        _ => &labels.no,
    }
}

fn profile_columns(user: &UserData, countries: &BTreeMap<String, String>) -> Vec<String> {
    let info = &user.user_info;
    vec![
        quote(&info.name),
        info.age.map(|a| a.to_string()).unwrap_or_default(),
        info.gender.as_str().to_string(),
        quote(country_name(countries, &info.country)),
        user.code.clone(),
    ]
}

fn push_row(content: &mut String, columns: &[String]) {
    content.push_str(&columns.join(","));
    content.push_str(LINE_END);
}

const PROFILE_HEADERS: [&str; 5] = ["Name", "Age", "Gender", "Country", "Code"];

/// Full archive with raw 0/1 answers
pub fn archive_csv(
    archive: &[UserData],
    questions: &[Question],
    countries: &BTreeMap<String, String>,
) -> Result<CsvFile, ExportError> {
    if archive.is_empty() {
        return Err(ExportError::Empty);
    }

    let mut content = String::new();
    let headers: Vec<String> = PROFILE_HEADERS
        .iter()
        .map(|h| h.to_string())
        .chain((1..=questions.len()).map(|i| format!("Answer {}", i)))
        .collect();
    push_row(&mut content, &headers);

    for user in archive {
        if user.answers.len() != questions.len() {
            tracing::warn!(
                "Answers for {} have {} entries, expected {}; row padded to the header",
                user.code,
                user.answers.len(),
                questions.len()
            );
        }

        let mut row = profile_columns(user, countries);
        row.extend((0..questions.len()).map(|i| {
            user.answers
                .get(i)
                .map(|a| u8::from(*a).to_string())
                .unwrap_or_default()
        }));
        push_row(&mut content, &row);
    }

    Ok(CsvFile {
        filename: "twinber_archive.csv".to_string(),
        content,
    })
}

/// One respondent's answers, one question per row
pub fn user_answers_csv(user: &UserData, questions: &[Question], labels: &ExportLabels) -> CsvFile {
    let mut content = String::new();
    push_row(
        &mut content,
        &[labels.question_header.clone(), labels.answer_header.clone()],
    );

    for (index, question) in questions.iter().enumerate() {
        push_row(
            &mut content,
            &[
                quote(&question.text),
                answer_label(user.answers.get(index), labels).to_string(),
            ],
        );
    }

    let name: String = user
        .user_info
        .name
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();

    CsvFile {
        filename: format!("twinber_answers_{}.csv", name),
        content,
    }
}

/// Filtered users with labelled answers for the selected questions only
pub fn filtered_users_csv(
    users: &[UserData],
    question_numbers: &[i64],
    questions: &[Question],
    labels: &ExportLabels,
    countries: &BTreeMap<String, String>,
) -> Result<CsvFile, ExportError> {
    if users.is_empty() {
        return Err(ExportError::Empty);
    }

    let indices = question_numbers
        .iter()
        .map(|&n| {
            if n >= 1 && (n as u64) <= questions.len() as u64 {
                Ok((n - 1) as usize)
            } else {
                Err(ExportError::QuestionOutOfRange(n))
            }
        })
        .collect::<Result<Vec<usize>, _>>()?;

    let mut content = String::new();
    let headers: Vec<String> = PROFILE_HEADERS
        .iter()
        .map(|h| h.to_string())
        .chain(indices.iter().map(|&i| quote(&questions[i].text)))
        .collect();
    push_row(&mut content, &headers);

    for user in users {
        let mut row = profile_columns(user, countries);
        row.extend(
            indices
                .iter()
                .map(|&i| answer_label(user.answers.get(i), labels).to_string()),
        );
        push_row(&mut content, &row);
    }

    let suffix = question_numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join("_");

    Ok(CsvFile {
        filename: format!("twinber_filtered_q{}.csv", suffix),
        content,
    })
}
