//! Deviation scoring against the personal baseline.
//!
//! Each vital contributes a fixed point value when it strays past its
//! trigger; the total maps onto a four-tier escalation ladder that selects
//! the recommendation set. Scores earned during high-exertion mission
//! phases are discounted because elevated vitals are expected there.

use crate::config::{
    DISCOUNTED_PHASES, ESCALATION_THRESHOLDS, FATIGUE_POINTS, FATIGUE_THRESHOLDS, HRV_POINTS,
    HR_POINTS, PHASE_DISCOUNT, RECOMMENDATION_CAP, RISK_SCORE_CEILING, SIGMA_FLOOR, SIGMA_HIGH,
    SIGMA_TRIGGER, STRESS_POINTS, STRESS_THRESHOLDS,
};
use crate::models::{Baseline, HealthReading, MissionContext, RiskAnalysis, RiskFactor, Severity};

fn sigma_deviation(value: f64, baseline: f64, std: f64) -> f64 {
    (value - baseline).abs() / std.max(SIGMA_FLOOR)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Score a reading against the astronaut's baseline and mission context.
///
/// Pure over its inputs; persistence of any resulting alert is the
/// caller's concern.
pub fn analyze(
    reading: &HealthReading,
    baseline: &Baseline,
    context: Option<&MissionContext>,
) -> RiskAnalysis {
    let mut factors = Vec::new();
    let mut score: i64 = 0;

    let hr_sigma = sigma_deviation(reading.heart_rate, baseline.hr_baseline, baseline.hr_std);
    if hr_sigma > SIGMA_TRIGGER {
        let high = hr_sigma >= SIGMA_HIGH;
        factors.push(RiskFactor {
            factor: "heart_rate_deviation".to_string(),
            severity: if high { Severity::High } else { Severity::Moderate },
            message: "Heart rate significantly deviates from personal baseline".to_string(),
            deviation_sigma: Some(round2(hr_sigma)),
            value: None,
        });
        score += if high { HR_POINTS.1 } else { HR_POINTS.0 };
    }

    let hrv_sigma = sigma_deviation(reading.hrv, baseline.hrv_baseline, baseline.hrv_std);
    if hrv_sigma > SIGMA_TRIGGER {
        factors.push(RiskFactor {
            factor: "hrv_deviation".to_string(),
            severity: if hrv_sigma >= SIGMA_HIGH {
                Severity::High
            } else {
                Severity::Moderate
            },
            message: "Heart rate variability deviates from personal baseline".to_string(),
            deviation_sigma: Some(round2(hrv_sigma)),
            value: None,
        });
        score += HRV_POINTS;
    }

    if reading.stress_level > STRESS_THRESHOLDS.0 {
        let high = reading.stress_level >= STRESS_THRESHOLDS.1;
        factors.push(RiskFactor {
            factor: "high_stress".to_string(),
            severity: if high { Severity::High } else { Severity::Moderate },
            message: "Elevated stress levels detected".to_string(),
            deviation_sigma: None,
            value: Some(reading.stress_level),
        });
        score += if high { STRESS_POINTS.1 } else { STRESS_POINTS.0 };
    }

    if reading.fatigue_level > FATIGUE_THRESHOLDS.0 {
        let high = reading.fatigue_level >= FATIGUE_THRESHOLDS.1;
        factors.push(RiskFactor {
            factor: "high_fatigue".to_string(),
            severity: if high { Severity::High } else { Severity::Moderate },
            message: "Significant fatigue indicators present".to_string(),
            deviation_sigma: None,
            value: Some(reading.fatigue_level),
        });
        score += if high { FATIGUE_POINTS.1 } else { FATIGUE_POINTS.0 };
    }

    if let Some(ctx) = context {
        if DISCOUNTED_PHASES.contains(&ctx.mission_phase.as_str()) {
            score = (score as f64 * PHASE_DISCOUNT) as i64;
        }
    }

    let score = score.min(RISK_SCORE_CEILING);
    let escalation_level = escalation_level(score);

    RiskAnalysis {
        risk_level: score,
        risk_factors: factors,
        escalation_level,
        recommendations: recommendations(escalation_level),
    }
}

/// Map a clamped score onto the 0-3 escalation ladder.
fn escalation_level(score: i64) -> u8 {
    ESCALATION_THRESHOLDS
        .iter()
        .filter(|&&threshold| score >= threshold)
        .count() as u8
}

/// Recommendation strings accumulate by tier and are capped to a fixed
/// count. Tier 0 is the single all-clear line.
pub fn recommendations(level: u8) -> Vec<String> {
    if level == 0 {
        return vec!["All indicators within normal range. Continue monitoring.".to_string()];
    }

    let mut recommendations = Vec::new();

    if level >= 1 {
        recommendations.extend([
            "Consider a brief breathing exercise (4-7-8 technique)".to_string(),
            "Take a moment for grounding - notice 5 things you can see".to_string(),
        ]);
    }

    if level >= 2 {
        recommendations.extend([
            "Recommend scheduling a rest period within next 2 hours".to_string(),
            "Consider workload moderation if mission-critical tasks allow".to_string(),
        ]);
    }

    if level >= 3 {
        recommendations.extend([
            "Flag for local medical review consideration".to_string(),
            "Contact mission control at earliest communication window".to_string(),
        ]);
    }

    recommendations.truncate(RECOMMENDATION_CAP);
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    use crate::models::ValidationReport;

    fn baseline() -> Baseline {
        Baseline {
            id: Uuid::new_v4(),
            astronaut_id: "AST-TEST".to_string(),
            hr_baseline: 70.0,
            hr_std: 10.0,
            hrv_baseline: 50.0,
            hrv_std: 15.0,
            stress_baseline: 30.0,
            fatigue_baseline: 25.0,
            data_points: 10,
            is_default: false,
            updated_at: Utc::now(),
        }
    }

    fn reading(hr: f64, hrv: f64, stress: f64, fatigue: f64) -> HealthReading {
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

    fn context(phase: &str) -> MissionContext {
        MissionContext {
            id: Uuid::new_v4(),
            astronaut_id: "AST-TEST".to_string(),
            mission_phase: phase.to_string(),
            time_of_day: "morning".to_string(),
            work_cycle: "active".to_string(),
            days_since_launch: 12,
            current_workload: "moderate".to_string(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn reading_at_baseline_scores_zero() {
        let analysis = analyze(&reading(70.0, 50.0, 30.0, 25.0), &baseline(), None);
        assert_eq!(analysis.risk_level, 0);
        assert!(analysis.risk_factors.is_empty());
        assert_eq!(analysis.escalation_level, 0);
        assert_eq!(
            analysis.recommendations,
            vec!["All indicators within normal range. Continue monitoring.".to_string()]
        );
    }

    #[test]
    fn heart_rate_at_exactly_three_sigma_is_high_severity() {
        // 70 + 3 * 10 = 100 BPM
        let analysis = analyze(&reading(100.0, 50.0, 30.0, 25.0), &baseline(), None);
        assert_eq!(analysis.risk_level, 35);
        let factor = &analysis.risk_factors[0];
        assert_eq!(factor.factor, "heart_rate_deviation");
        assert_eq!(factor.severity, Severity::High);
        assert_eq!(factor.deviation_sigma, Some(3.0));
    }

    #[test]
    fn heart_rate_between_two_and_three_sigma_is_moderate() {
        let analysis = analyze(&reading(95.0, 50.0, 30.0, 25.0), &baseline(), None);
        assert_eq!(analysis.risk_level, 20);
        assert_eq!(analysis.risk_factors[0].severity, Severity::Moderate);
    }

    #[test]
    fn two_sigma_exactly_does_not_trigger() {
        let analysis = analyze(&reading(90.0, 50.0, 30.0, 25.0), &baseline(), None);
        assert!(analysis.risk_factors.is_empty());
    }

    #[test]
    fn zero_spread_baseline_uses_sigma_floor() {
        let mut flat = baseline();
        flat.hr_std = 0.0;
        // Deviation of 3 BPM against floored sigma of 1.0 = 3 sigma
        let analysis = analyze(&reading(73.0, 50.0, 30.0, 25.0), &flat, None);
        assert_eq!(analysis.risk_level, 35);
    }

    #[test]
    fn hrv_deviation_contributes_flat_points() {
        // 50 + 2.5 * 15 = 87.5
        let analysis = analyze(&reading(70.0, 87.5, 30.0, 25.0), &baseline(), None);
        assert_eq!(analysis.risk_level, 15);
        assert_eq!(analysis.risk_factors[0].factor, "hrv_deviation");
        assert_eq!(analysis.risk_factors[0].severity, Severity::Moderate);
    }

    #[test]
    fn stress_tiers_score_20_and_30() {
        let moderate = analyze(&reading(70.0, 50.0, 75.0, 25.0), &baseline(), None);
        assert_eq!(moderate.risk_level, 20);
        assert_eq!(moderate.risk_factors[0].value, Some(75.0));

        let high = analyze(&reading(70.0, 50.0, 90.0, 25.0), &baseline(), None);
        assert_eq!(high.risk_level, 30);
        assert_eq!(high.risk_factors[0].severity, Severity::High);
    }

    #[test]
    fn fatigue_tiers_score_15_and_25() {
        let moderate = analyze(&reading(70.0, 50.0, 30.0, 70.0), &baseline(), None);
        assert_eq!(moderate.risk_level, 15);

        let high = analyze(&reading(70.0, 50.0, 30.0, 85.0), &baseline(), None);
        assert_eq!(high.risk_level, 25);
    }

    #[test]
    fn eva_phase_discounts_score() {
        // HR moderate (20) + stress moderate (20) = 40; EVA discount: 32
        let ctx = context("eva");
        let analysis = analyze(&reading(95.0, 50.0, 75.0, 25.0), &baseline(), Some(&ctx));
        assert_eq!(analysis.risk_level, 32);
        assert_eq!(analysis.escalation_level, 1);
    }

    #[test]
    fn transit_phase_is_not_discounted() {
        let ctx = context("transit");
        let analysis = analyze(&reading(95.0, 50.0, 75.0, 25.0), &baseline(), Some(&ctx));
        assert_eq!(analysis.risk_level, 40);
    }

    #[test]
    fn escalation_ladder_boundaries() {
        assert_eq!(escalation_level(0), 0);
        assert_eq!(escalation_level(29), 0);
        assert_eq!(escalation_level(30), 1);
        assert_eq!(escalation_level(54), 1);
        assert_eq!(escalation_level(55), 2);
        assert_eq!(escalation_level(79), 2);
        assert_eq!(escalation_level(80), 3);
        assert_eq!(escalation_level(100), 3);
    }

    #[test]
    fn worst_case_score_is_clamped() {
        // HR high (35) + HRV (15) + stress high (30) + fatigue high (25) = 105
        let analysis = analyze(&reading(120.0, 120.0, 95.0, 95.0), &baseline(), None);
        assert_eq!(analysis.risk_level, 100);
        assert_eq!(analysis.escalation_level, 3);
        assert_eq!(analysis.recommendations.len(), 4);
    }

    #[test]
    fn recommendations_accumulate_and_cap() {
        assert_eq!(recommendations(0).len(), 1);
        assert_eq!(recommendations(1).len(), 2);
        assert_eq!(recommendations(2).len(), 4);
        // Tier 3 would add two more but hits the cap
        assert_eq!(recommendations(3).len(), 4);
    }
}
