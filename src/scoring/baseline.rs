//! Personal baseline computation.
//!
//! A baseline is the sample mean and population standard deviation of each
//! vital over the trailing window. With too few samples the fixed defaults
//! apply, flagged `is_default` so callers can tell recalibration is still
//! pending.

use chrono::Utc;
use uuid::Uuid;

use crate::config::{
    DEFAULT_FATIGUE_BASELINE, DEFAULT_HRV_BASELINE, DEFAULT_HRV_STD, DEFAULT_HR_BASELINE,
    DEFAULT_HR_STD, DEFAULT_STRESS_BASELINE, MIN_BASELINE_SAMPLES,
};
use crate::models::{Baseline, HealthReading};

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divisor n, not n-1).
fn std_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Compute a baseline from the readings in the trailing window.
///
/// Deterministic over its input: recomputing from identical readings
/// reproduces identical statistics (ids and timestamps differ per row).
pub fn compute(astronaut_id: &str, readings: &[HealthReading]) -> Baseline {
    if readings.len() < MIN_BASELINE_SAMPLES {
        return Baseline {
            id: Uuid::new_v4(),
            astronaut_id: astronaut_id.to_string(),
            hr_baseline: DEFAULT_HR_BASELINE,
            hr_std: DEFAULT_HR_STD,
            hrv_baseline: DEFAULT_HRV_BASELINE,
            hrv_std: DEFAULT_HRV_STD,
            stress_baseline: DEFAULT_STRESS_BASELINE,
            fatigue_baseline: DEFAULT_FATIGUE_BASELINE,
            data_points: readings.len() as i64,
            is_default: true,
            updated_at: Utc::now(),
        };
    }

    let hr: Vec<f64> = readings.iter().map(|r| r.heart_rate).collect();
    let hrv: Vec<f64> = readings.iter().map(|r| r.hrv).collect();
    let stress: Vec<f64> = readings.iter().map(|r| r.stress_level).collect();
    let fatigue: Vec<f64> = readings.iter().map(|r| r.fatigue_level).collect();

    Baseline {
        id: Uuid::new_v4(),
        astronaut_id: astronaut_id.to_string(),
        hr_baseline: mean(&hr),
        hr_std: std_dev(&hr),
        hrv_baseline: mean(&hrv),
        hrv_std: std_dev(&hrv),
        stress_baseline: mean(&stress),
        fatigue_baseline: mean(&fatigue),
        data_points: readings.len() as i64,
        is_default: false,
        updated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ValidationReport;

    fn sample(hr: f64, hrv: f64, stress: f64, fatigue: f64) -> HealthReading {
        HealthReading {
            id: Uuid::new_v4(),
            astronaut_id: "AST-TEST".to_string(),
            heart_rate: hr,
            hrv,
            stress_level: stress,
            fatigue_level: fatigue,
            timestamp: Utc::now(),
            confidence: 0.9,
            source: "manual".to_string(),
            validation: ValidationReport {
                is_valid: true,
                issues: vec![],
                adjusted_confidence: 0.9,
                data_freshness: "current".to_string(),
            },
            created_at: Utc::now(),
        }
    }

    #[test]
    fn fewer_than_five_samples_yields_defaults() {
        let readings: Vec<_> = (0..4).map(|_| sample(72.0, 55.0, 30.0, 20.0)).collect();
        let baseline = compute("AST-TEST", &readings);
        assert!(baseline.is_default);
        assert_eq!(baseline.hr_baseline, 70.0);
        assert_eq!(baseline.hr_std, 10.0);
        assert_eq!(baseline.hrv_baseline, 50.0);
        assert_eq!(baseline.hrv_std, 15.0);
        assert_eq!(baseline.stress_baseline, 30.0);
        assert_eq!(baseline.fatigue_baseline, 25.0);
        assert_eq!(baseline.data_points, 4);
    }

    #[test]
    fn empty_window_yields_defaults() {
        let baseline = compute("AST-TEST", &[]);
        assert!(baseline.is_default);
        assert_eq!(baseline.data_points, 0);
    }

    #[test]
    fn five_samples_compute_mean_and_population_std() {
        let readings: Vec<_> = [60.0, 65.0, 70.0, 75.0, 80.0]
            .iter()
            .map(|&hr| sample(hr, 50.0, 30.0, 20.0))
            .collect();
        let baseline = compute("AST-TEST", &readings);
        assert!(!baseline.is_default);
        assert_eq!(baseline.data_points, 5);
        assert!((baseline.hr_baseline - 70.0).abs() < 1e-9);
        // Population std of [60,65,70,75,80]: sqrt(50) ~ 7.0711
        assert!((baseline.hr_std - 50.0_f64.sqrt()).abs() < 1e-9);
        // Constant series collapses to zero spread
        assert!((baseline.hrv_std - 0.0).abs() < 1e-9);
        assert!((baseline.stress_baseline - 30.0).abs() < 1e-9);
    }

    #[test]
    fn recomputation_over_identical_data_is_stable() {
        let readings: Vec<_> = [62.0, 68.0, 71.0, 74.0, 77.0, 81.0]
            .iter()
            .map(|&hr| sample(hr, 48.0, 28.0, 22.0))
            .collect();
        let first = compute("AST-TEST", &readings);
        let second = compute("AST-TEST", &readings);
        assert_eq!(first.hr_baseline, second.hr_baseline);
        assert_eq!(first.hr_std, second.hr_std);
        assert_eq!(first.hrv_baseline, second.hrv_baseline);
        assert_eq!(first.stress_baseline, second.stress_baseline);
        assert_eq!(first.fatigue_baseline, second.fatigue_baseline);
    }
}
