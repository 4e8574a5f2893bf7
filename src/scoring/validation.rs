//! Range validation for incoming readings.
//!
//! Validation never rejects a write: each violation records an issue and
//! derates the reported confidence, and the reading is stored regardless.

use crate::config::{
    FATIGUE_RANGE, HEART_RATE_DERATE, HEART_RATE_RANGE, HRV_RANGE, STRESS_RANGE, VITAL_DERATE,
};
use crate::models::{ReadingInput, ValidationReport};

fn in_range(value: f64, range: (f64, f64)) -> bool {
    value >= range.0 && value <= range.1
}

/// Range-check a reading and derate its confidence per violation.
///
/// The four checks are independent; their derating factors compose
/// multiplicatively. A reading with no supplied timestamp is tagged with
/// unknown freshness.
pub fn validate_reading(input: &ReadingInput) -> ValidationReport {
    let mut issues = Vec::new();
    let mut confidence = input.confidence;

    if !in_range(input.heart_rate, HEART_RATE_RANGE) {
        issues.push("Heart rate out of normal range".to_string());
        confidence *= HEART_RATE_DERATE;
    }

    if !in_range(input.hrv, HRV_RANGE) {
        issues.push("HRV out of expected range".to_string());
        confidence *= VITAL_DERATE;
    }

    if !in_range(input.stress_level, STRESS_RANGE) {
        issues.push("Stress level should be 0-100".to_string());
        confidence *= VITAL_DERATE;
    }

    if !in_range(input.fatigue_level, FATIGUE_RANGE) {
        issues.push("Fatigue level should be 0-100".to_string());
        confidence *= VITAL_DERATE;
    }

    ValidationReport {
        is_valid: issues.is_empty(),
        issues,
        adjusted_confidence: confidence,
        data_freshness: if input.timestamp.is_some() {
            "current".to_string()
        } else {
            "unknown".to_string()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn reading(hr: f64, hrv: f64, stress: f64, fatigue: f64) -> ReadingInput {
        ReadingInput {
            astronaut_id: "AST-TEST".to_string(),
            heart_rate: hr,
            hrv,
            stress_level: stress,
            fatigue_level: fatigue,
            timestamp: Some(Utc::now()),
            confidence: 0.9,
            source: "manual".to_string(),
        }
    }

    #[test]
    fn in_range_reading_passes_untouched() {
        let report = validate_reading(&reading(72.0, 55.0, 30.0, 20.0));
        assert!(report.is_valid);
        assert!(report.issues.is_empty());
        assert_eq!(report.adjusted_confidence, 0.9);
        assert_eq!(report.data_freshness, "current");
    }

    #[test]
    fn boundary_values_are_accepted() {
        let report = validate_reading(&reading(40.0, 200.0, 100.0, 0.0));
        assert!(report.is_valid);
    }

    #[test]
    fn out_of_range_heart_rate_derates_by_exactly_0_7() {
        let report = validate_reading(&reading(210.0, 55.0, 30.0, 20.0));
        assert!(!report.is_valid);
        assert_eq!(report.issues.len(), 1);
        assert!((report.adjusted_confidence - 0.9 * 0.7).abs() < 1e-12);
    }

    #[test]
    fn derating_factors_compose() {
        // Heart rate and stress both out of range: 0.9 * 0.7 * 0.8
        let report = validate_reading(&reading(30.0, 55.0, 120.0, 20.0));
        assert_eq!(report.issues.len(), 2);
        assert!((report.adjusted_confidence - 0.9 * 0.7 * 0.8).abs() < 1e-12);
    }

    #[test]
    fn all_violations_stack() {
        let report = validate_reading(&reading(0.0, -1.0, 150.0, 101.0));
        assert_eq!(report.issues.len(), 4);
        let expected = 0.9 * 0.7 * 0.8 * 0.8 * 0.8;
        assert!((report.adjusted_confidence - expected).abs() < 1e-12);
    }

    #[test]
    fn missing_timestamp_tags_unknown_freshness() {
        let mut input = reading(72.0, 55.0, 30.0, 20.0);
        input.timestamp = None;
        let report = validate_reading(&input);
        assert_eq!(report.data_freshness, "unknown");
    }
}
