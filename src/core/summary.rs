use crate::models::{CompatibilityCategoryScore, CompatibilityReport};
use serde::{Deserialize, Serialize};

/// Thresholds used to read a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryThresholds {
    /// Category scores at or above this are strengths
    pub strength: u8,
    /// Category scores below this are growth areas
    pub growth: u8,
}

impl Default for SummaryThresholds {
    fn default() -> Self {
        Self { strength: 70, growth: 40 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    High,
    Moderate,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryTone {
    Balanced,
    StrengthsOnly,
    GrowthOnly,
    Mixed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub band: ScoreBand,
    pub tone: SummaryTone,
    pub strengths: Vec<CompatibilityCategoryScore>,
    #[serde(rename = "growthAreas")]
    pub growth_areas: Vec<CompatibilityCategoryScore>,
}

pub fn score_band(score: u8, thresholds: &SummaryThresholds) -> ScoreBand {
    if score >= thresholds.strength {
        ScoreBand::High
    } else if score >= thresholds.growth {
        ScoreBand::Moderate
    } else {
        ScoreBand::Low
    }
}

/// Strongest categories first, weakest growth areas first
pub fn summarize(report: &CompatibilityReport, thresholds: &SummaryThresholds) -> ReportSummary {
    let mut strengths: Vec<CompatibilityCategoryScore> = report
        .category_scores
        .iter()
        .filter(|c| c.score >= thresholds.strength)
        .copied()
        .collect();
    strengths.sort_by(|a, b| b.score.cmp(&a.score));

    let mut growth_areas: Vec<CompatibilityCategoryScore> = report
        .category_scores
        .iter()
        .filter(|c| c.score < thresholds.growth)
        .copied()
        .collect();
    growth_areas.sort_by(|a, b| a.score.cmp(&b.score));

    let tone = match (strengths.is_empty(), growth_areas.is_empty()) {
        (true, true) => SummaryTone::Balanced,
        (false, true) => SummaryTone::StrengthsOnly,
        (true, false) => SummaryTone::GrowthOnly,
        (false, false) => SummaryTone::Mixed,
    };

    ReportSummary {
        band: score_band(report.overall_score, thresholds),
        tone,
        strengths,
        growth_areas,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    fn report(overall: u8, scores: &[(Category, u8)]) -> CompatibilityReport {
        CompatibilityReport {
            overall_score: overall,
            category_scores: scores
                .iter()
                .map(|(category, score)| CompatibilityCategoryScore { category: *category, score: *score })
                .collect(),
            user1_code: "A".to_string(),
            user2_code: "B".to_string(),
            user1_info: None,
            user2_info: None,
        }
    }

    #[test]
    fn test_mixed_summary() {
        let report = report(
            55,
            &[
                (Category::Music, 80),
                (Category::Travel, 20),
                (Category::Humor, 100),
                (Category::Finances, 50),
                (Category::Hobbies, 0),
            ],
        );
        let summary = summarize(&report, &SummaryThresholds::default());

        assert_eq!(summary.band, ScoreBand::Moderate);
        assert_eq!(summary.tone, SummaryTone::Mixed);
        let strengths: Vec<Category> = summary.strengths.iter().map(|c| c.category).collect();
        assert_eq!(strengths, vec![Category::Humor, Category::Music]);
        let growth: Vec<Category> = summary.growth_areas.iter().map(|c| c.category).collect();
        assert_eq!(growth, vec![Category::Hobbies, Category::Travel]);
    }

    #[test]
    fn test_balanced_summary() {
        let report = report(50, &[(Category::Music, 40), (Category::Travel, 69)]);
        let summary = summarize(&report, &SummaryThresholds::default());
        assert_eq!(summary.tone, SummaryTone::Balanced);
        assert!(summary.strengths.is_empty() && summary.growth_areas.is_empty());
    }

    #[test]
    fn test_score_bands() {
        let thresholds = SummaryThresholds::default();
        assert_eq!(score_band(70, &thresholds), ScoreBand::High);
        assert_eq!(score_band(40, &thresholds), ScoreBand::Moderate);
        assert_eq!(score_band(39, &thresholds), ScoreBand::Low);
    }
}
