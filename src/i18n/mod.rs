// Localized question bank and UI strings
use crate::core::export::ExportLabels;
use crate::models::{Category, Question};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum I18nError {
    #[error("Failed to parse locale {locale}: {source}")]
    Parse {
        locale: Locale,
        #[source]
        source: toml::de::Error,
    },

    #[error("Unknown category '{key}' in locale {locale}")]
    UnknownCategory { locale: Locale, key: String },

    #[error("English locale table is missing")]
    MissingEnglish,

    #[error("English questions are missing")]
    MissingQuestions,

    #[error("Category {0} has no English display name")]
    MissingCategoryName(Category),

    #[error("Questions of locale {locale} do not match English: {reason}")]
    QuestionMismatch { locale: Locale, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    It,
    Fr,
    Es,
    Ru,
    Pt,
}

impl Locale {
    pub const ALL: [Locale; 6] = [Locale::En, Locale::It, Locale::Fr, Locale::Es, Locale::Ru, Locale::Pt];

    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::It => "it",
            Locale::Fr => "fr",
            Locale::Es => "es",
            Locale::Ru => "ru",
            Locale::Pt => "pt",
        }
    }

    /// Resolve a requested locale such as `it`, `pt-BR` or `FR`; unknown values give English
    pub fn resolve(requested: Option<&str>) -> Locale {
        requested
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let language = s
            .trim()
            .split(|c| c == '-' || c == '_')
            .next()
            .unwrap_or_default()
            .to_lowercase();
        Locale::ALL
            .iter()
            .copied()
            .find(|l| l.code() == language)
            .ok_or_else(|| format!("unsupported locale: {}", s))
    }
}

/// Raw shape of a `locales/*.toml` file
#[derive(Debug, Deserialize)]
struct LocaleFile {
    #[serde(default)]
    categories: BTreeMap<String, String>,
    #[serde(default)]
    ui: HashMap<String, String>,
    #[serde(default)]
    questions: Vec<Question>,
}

#[derive(Debug)]
struct LocaleTable {
    categories: HashMap<Category, String>,
    ui: HashMap<String, String>,
    questions: Option<Vec<Question>>,
}

const EMBEDDED: [(Locale, &str); 6] = [
    (Locale::En, include_str!("../../locales/en.toml")),
    (Locale::It, include_str!("../../locales/it.toml")),
    (Locale::Fr, include_str!("../../locales/fr.toml")),
    (Locale::Es, include_str!("../../locales/es.toml")),
    (Locale::Ru, include_str!("../../locales/ru.toml")),
    (Locale::Pt, include_str!("../../locales/pt.toml")),
];

/// Questions, category names and UI strings for every supported locale
///
/// All locales share the English question count and category sequence, so a
/// stored answer vector is valid whatever language it was recorded in.
#[derive(Debug)]
pub struct QuestionBank {
    tables: HashMap<Locale, LocaleTable>,
}

impl QuestionBank {
    /// Load the tables compiled into the binary
    pub fn load() -> Result<Self, I18nError> {
        Self::from_sources(&EMBEDDED)
    }

    pub fn from_sources(sources: &[(Locale, &str)]) -> Result<Self, I18nError> {
        let mut tables = HashMap::with_capacity(sources.len());
        for (locale, source) in sources {
            let file: LocaleFile =
                toml::from_str(source).map_err(|source| I18nError::Parse { locale: *locale, source })?;
            tables.insert(*locale, parse_table(*locale, file)?);
        }

        let bank = Self { tables };
        bank.validate()?;

        tracing::info!(
            "Question bank loaded: {} locales, {} questions",
            bank.tables.len(),
            bank.question_count()
        );
        Ok(bank)
    }

    fn validate(&self) -> Result<(), I18nError> {
        let english = self.tables.get(&Locale::En).ok_or(I18nError::MissingEnglish)?;
        let reference = match &english.questions {
            Some(questions) if !questions.is_empty() => questions,
            _ => return Err(I18nError::MissingQuestions),
        };

        if let Some(category) = Category::ALL
            .iter()
            .find(|c| !english.categories.contains_key(c))
        {
            return Err(I18nError::MissingCategoryName(*category));
        }

        for (locale, table) in &self.tables {
            let Some(questions) = &table.questions else {
                continue;
            };
            if questions.len() != reference.len() {
                return Err(I18nError::QuestionMismatch {
                    locale: *locale,
                    reason: format!("{} questions, expected {}", questions.len(), reference.len()),
                });
            }
            if let Some(index) = questions
                .iter()
                .zip(reference)
                .position(|(q, r)| q.category != r.category)
            {
                return Err(I18nError::QuestionMismatch {
                    locale: *locale,
                    reason: format!("question {} has a different category", index + 1),
                });
            }
        }

        Ok(())
    }

    fn english(&self) -> &LocaleTable {
        // Presence checked in validate()
        &self.tables[&Locale::En]
    }

    pub fn question_count(&self) -> usize {
        self.questions(Locale::En).len()
    }

    /// Questions for `locale`, falling back to English
    pub fn questions(&self, locale: Locale) -> &[Question] {
        self.tables
            .get(&locale)
            .and_then(|t| t.questions.as_deref())
            .or(self.english().questions.as_deref())
            .unwrap_or_default()
    }

    pub fn category_name(&self, locale: Locale, category: Category) -> &str {
        self.tables
            .get(&locale)
            .and_then(|t| t.categories.get(&category))
            .or_else(|| self.english().categories.get(&category))
            .map(String::as_str)
            .unwrap_or(category.key())
    }

    /// Display names for every category, keyed by identifier
    pub fn category_names(&self, locale: Locale) -> BTreeMap<Category, String> {
        Category::ALL
            .iter()
            .map(|c| (*c, self.category_name(locale, *c).to_string()))
            .collect()
    }

    /// Look up a UI string and substitute `{name}` placeholders
    ///
    /// Missing keys fall back to English, then to the key itself.
    pub fn translate(&self, locale: Locale, key: &str, replacements: &[(&str, String)]) -> String {
        let template = self
            .tables
            .get(&locale)
            .and_then(|t| t.ui.get(key))
            .or_else(|| self.english().ui.get(key))
            .map(String::as_str)
            .unwrap_or(key);

        replacements
            .iter()
            .fold(template.to_string(), |text, (name, value)| {
                text.replace(&format!("{{{}}}", name), value)
            })
    }

    pub fn export_labels(&self, locale: Locale) -> ExportLabels {
        ExportLabels {
            yes: self.translate(locale, "questionnaire_option_yes", &[]),
            no: self.translate(locale, "questionnaire_option_no", &[]),
            question_header: self.translate(locale, "export_header_question", &[]),
            answer_header: self.translate(locale, "export_header_answer", &[]),
        }
    }
}

fn parse_table(locale: Locale, file: LocaleFile) -> Result<LocaleTable, I18nError> {
    let categories = file
        .categories
        .into_iter()
        .map(|(key, name)| match key.parse::<Category>() {
            Ok(category) => Ok((category, name)),
            Err(_) => Err(I18nError::UnknownCategory { locale, key }),
        })
        .collect::<Result<HashMap<_, _>, _>>()?;

    Ok(LocaleTable {
        categories,
        ui: file.ui,
        questions: if file.questions.is_empty() {
            None
        } else {
            Some(file.questions)
        },
    })
}
