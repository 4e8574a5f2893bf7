//! Synthetic telemetry generation for demos and test data population.
//!
//! Produces Gaussian-perturbed readings across a requested day range.
//! Generation is pure over the supplied RNG; the route handler feeds the
//! results through the normal ingestion path so validation, baselines,
//! and risk analysis all see them.

use chrono::{Duration, Timelike, Utc};
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::models::ReadingInput;

/// Readings generated per simulated day (inclusive bounds)
const READINGS_PER_DAY: (u32, u32) = (8, 12);

/// First reading hour of a simulated day
const DAY_START_HOUR: u32 = 6;

/// Hours between consecutive readings
const READING_INTERVAL_HOURS: u32 = 2;

/// Latest reading hour of a simulated day
const DAY_END_HOUR: u32 = 22;

/// Resting heart rate the simulation perturbs around
const SIM_HR_CENTER: f64 = 68.0;

/// Simulated heart rate clamp range in BPM
const SIM_HR_CLAMP: (f64, f64) = (50.0, 120.0);

/// HRV center and clamp range
const SIM_HRV_CENTER: f64 = 55.0;
const SIM_HRV_CLAMP: (f64, f64) = (20.0, 100.0);

/// Stress center; older days trend higher to exercise the baseline math
const SIM_STRESS_CENTER: f64 = 25.0;
const SIM_STRESS_DAY_TREND: f64 = 1.5;

/// Fatigue center; accumulates over the waking day
const SIM_FATIGUE_CENTER: f64 = 20.0;
const SIM_FATIGUE_HOURLY_RISE: f64 = 2.0;

fn gauss<R: Rng>(rng: &mut R, mean: f64, std: f64) -> f64 {
    Normal::new(mean, std)
        .map(|normal| normal.sample(rng))
        .unwrap_or(mean)
}

/// Generate synthetic readings for the trailing `days` days, oldest day
/// first. Values are clamped to plausible wearable output so the
/// generated data validates cleanly.
pub fn generate_inputs<R: Rng>(rng: &mut R, astronaut_id: &str, days: u32) -> Vec<ReadingInput> {
    let mut inputs = Vec::new();

    for day_offset in (1..=days as i64).rev() {
        let base_date = Utc::now() - Duration::days(day_offset);
        let num_readings = rng.gen_range(READINGS_PER_DAY.0..=READINGS_PER_DAY.1);

        for i in 0..num_readings {
            let hour = (DAY_START_HOUR + i * READING_INTERVAL_HOURS).min(DAY_END_HOUR);
            let timestamp = base_date
                .with_hour(hour)
                .and_then(|t| t.with_minute(rng.gen_range(0..60)))
                .and_then(|t| t.with_second(0))
                .and_then(|t| t.with_nanosecond(0))
                .unwrap_or(base_date);

            let base_hr = gauss(rng, SIM_HR_CENTER, 8.0);
            let base_stress = gauss(rng, SIM_STRESS_CENTER, 12.0)
                + day_offset as f64 * SIM_STRESS_DAY_TREND;
            let fatigue = gauss(rng, SIM_FATIGUE_CENTER, 15.0)
                + (hour - DAY_START_HOUR) as f64 * SIM_FATIGUE_HOURLY_RISE;

            inputs.push(ReadingInput {
                astronaut_id: astronaut_id.to_string(),
                heart_rate: (base_hr + gauss(rng, 0.0, 5.0))
                    .clamp(SIM_HR_CLAMP.0, SIM_HR_CLAMP.1),
                hrv: gauss(rng, SIM_HRV_CENTER, 15.0).clamp(SIM_HRV_CLAMP.0, SIM_HRV_CLAMP.1),
                stress_level: base_stress.clamp(0.0, 100.0),
                fatigue_level: fatigue.clamp(0.0, 100.0),
                timestamp: Some(timestamp),
                confidence: 0.85 + rng.gen::<f64>() * 0.15,
                source: "simulation".to_string(),
            });
        }
    }

    inputs
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn generates_between_8_and_12_readings_per_day() {
        let mut rng = StdRng::seed_from_u64(7);
        let inputs = generate_inputs(&mut rng, "AST-1", 5);
        assert!(inputs.len() >= 5 * 8);
        assert!(inputs.len() <= 5 * 12);
    }

    #[test]
    fn values_stay_inside_clamp_ranges() {
        let mut rng = StdRng::seed_from_u64(42);
        for input in generate_inputs(&mut rng, "AST-1", 7) {
            assert!((50.0..=120.0).contains(&input.heart_rate));
            assert!((20.0..=100.0).contains(&input.hrv));
            assert!((0.0..=100.0).contains(&input.stress_level));
            assert!((0.0..=100.0).contains(&input.fatigue_level));
            assert!((0.85..=1.0).contains(&input.confidence));
            assert_eq!(input.source, "simulation");
        }
    }

    #[test]
    fn timestamps_fall_in_waking_hours() {
        let mut rng = StdRng::seed_from_u64(3);
        for input in generate_inputs(&mut rng, "AST-1", 3) {
            let hour = input.timestamp.unwrap().hour();
            assert!((6..=22).contains(&hour), "hour {hour} outside waking range");
        }
    }

    #[test]
    fn zero_days_generates_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(generate_inputs(&mut rng, "AST-1", 0).is_empty());
    }
}
