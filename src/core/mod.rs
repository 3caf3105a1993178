// Core algorithm exports
pub mod code;
pub mod conversation;
pub mod export;
pub mod filters;
pub mod matcher;
pub mod scoring;
pub mod summary;

pub use code::{decode_answers, encode_answers, generate_user_code, normalize_code};
pub use filters::{filter_archive, matches_demographics, ArchiveCriteria, ArchiveFilter, Demographics, FilterError, GenderFilter};
pub use matcher::{find_by_code, Matcher, MatcherLimits, SearchCriteria, SearchError, SearchResult};
pub use scoring::{build_report, calculate_compatibility, ScoringError};
pub use summary::{summarize, ReportSummary, SummaryThresholds};
