//! Baseline and risk scoring.
//!
//! The pure computations live in [`validation`], [`baseline`], and
//! [`risk`]; this module wires them to the store: fetching the trailing
//! reading window, caching baselines, and writing alerts for high
//! escalations.

pub mod baseline;
pub mod risk;
pub mod validation;

use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::config::{
    ALERT_ESCALATION_LEVEL, BASELINE_WINDOW_DAYS, READING_FETCH_LIMIT,
};
use crate::error::AppError;
use crate::models::{Alert, AlertSeverity, AlertStatus, Baseline, HealthReading, RiskAnalysis};
use crate::store;

/// Compute a fresh baseline from the trailing reading window.
pub async fn compute_baseline(
    db: &SqlitePool,
    astronaut_id: &str,
) -> Result<Baseline, AppError> {
    let since = Utc::now() - Duration::days(BASELINE_WINDOW_DAYS);
    let readings =
        store::readings::since(db, astronaut_id, since, READING_FETCH_LIMIT).await?;
    Ok(baseline::compute(astronaut_id, &readings))
}

/// Fetch the astronaut's stored baseline, computing and caching one on
/// first access.
pub async fn ensure_baseline(
    db: &SqlitePool,
    astronaut_id: &str,
) -> Result<Baseline, AppError> {
    if let Some(existing) = store::baselines::find(db, astronaut_id).await? {
        return Ok(existing);
    }

    let computed = compute_baseline(db, astronaut_id).await?;
    store::baselines::upsert(db, &computed).await?;
    tracing::debug!(
        astronaut_id,
        is_default = computed.is_default,
        data_points = computed.data_points,
        "Cached initial baseline"
    );
    Ok(computed)
}

/// Score a reading against the astronaut's baseline and mission context,
/// raising an alert when the escalation level warrants one.
pub async fn analyze_health_risk(
    db: &SqlitePool,
    astronaut_id: &str,
    reading: &HealthReading,
) -> Result<RiskAnalysis, AppError> {
    let baseline = ensure_baseline(db, astronaut_id).await?;
    let context = store::context::find(db, astronaut_id).await?;

    let analysis = risk::analyze(reading, &baseline, context.as_ref());

    if analysis.escalation_level >= ALERT_ESCALATION_LEVEL {
        let severity = if analysis.escalation_level >= 3 {
            AlertSeverity::Critical
        } else {
            AlertSeverity::Warning
        };
        let triggered: Vec<&str> = analysis
            .risk_factors
            .iter()
            .map(|f| f.factor.as_str())
            .collect();
        let alert = Alert {
            id: Uuid::new_v4(),
            astronaut_id: astronaut_id.to_string(),
            severity,
            message: format!(
                "Wellbeing risk score {} ({})",
                analysis.risk_level,
                triggered.join(", ")
            ),
            status: AlertStatus::Active,
            created_at: Utc::now(),
            acknowledged_at: None,
            acknowledged_by: None,
        };
        store::alerts::insert(db, &alert).await?;
        tracing::warn!(
            astronaut_id,
            risk_level = analysis.risk_level,
            escalation_level = analysis.escalation_level,
            severity = severity.as_str(),
            "Raised wellbeing alert"
        );
    }

    Ok(analysis)
}
