//! Analytic record encoder
//!
//! Packs a [`Synthesis`] and its window into the fields of a new analytic record.

use crate::error::AnalysisError;
use crate::types::{AnalysisWindow, AnalyticType, ChildId, NewAnalyticRecord, Synthesis};

/// Encoder for `SUMMARY` analytic records
pub struct AnalyticRecordEncoder;

impl AnalyticRecordEncoder {
    /// Build the record fields; `content` is the pattern summary as JSON
    pub fn encode(
        child_id: &ChildId,
        window: &AnalysisWindow,
        synthesis: Synthesis,
    ) -> Result<NewAnalyticRecord, AnalysisError> {
        let content = serde_json::to_string(&synthesis.patterns)?;

        Ok(NewAnalyticRecord {
            child_id: child_id.clone(),
            analytic_type: AnalyticType::Summary,
            content,
            summary: synthesis.summary,
            suggestions: synthesis.suggestions,
            period_start: window.start,
            period_end: window.end,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PatternSummary, WINDOW_DAYS};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn test_encode_record_fields() {
        let now = Utc.with_ymd_and_hms(2024, 4, 1, 8, 0, 0).unwrap();
        let window = AnalysisWindow::trailing(now);
        let patterns = PatternSummary {
            recurring_tags: vec!["fatigue".to_string()],
            difficult_hours: vec![],
            high_intensity_count: 0,
            total_observations: 5,
        };
        let synthesis = Synthesis {
            patterns: patterns.clone(),
            summary: "résumé".to_string(),
            suggestions: vec!["suggestion".to_string()],
        };

        let record =
            AnalyticRecordEncoder::encode(&ChildId::from("child-1"), &window, synthesis).unwrap();

        assert_eq!(record.analytic_type, AnalyticType::Summary);
        assert_eq!(record.period_end - record.period_start, Duration::days(WINDOW_DAYS));
        assert_eq!(record.period_end, now);
        assert_eq!(record.summary, "résumé");

        let decoded: PatternSummary = serde_json::from_str(&record.content).unwrap();
        assert_eq!(decoded, patterns);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "SUMMARY");
        assert_eq!(value["childId"], "child-1");
    }
}
