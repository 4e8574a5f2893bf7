//! Domain records shared between the persistence layer, the scoring
//! functions, and the route handlers.
//!
//! Every record carries an application-level UUID so rows stay portable
//! across stores; the database's own rowids are never exposed.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account roles recognized by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Astronaut,
    Supervisor,
    Medical,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Astronaut => "astronaut",
            Role::Supervisor => "supervisor",
            Role::Medical => "medical",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "astronaut" => Ok(Role::Astronaut),
            "supervisor" => Ok(Role::Supervisor),
            "medical" => Ok(Role::Medical),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// A registered account. The credential hash is never serialized.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
    pub astronaut_id: String,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// An incoming biometric reading, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadingInput {
    pub astronaut_id: String,
    pub heart_rate: f64,
    pub hrv: f64,
    pub stress_level: f64,
    pub fatigue_level: f64,
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default = "ReadingInput::default_confidence")]
    pub confidence: f64,
    #[serde(default = "ReadingInput::default_source")]
    pub source: String,
}

impl ReadingInput {
    fn default_confidence() -> f64 {
        0.9
    }

    fn default_source() -> String {
        "manual".to_string()
    }
}

/// Outcome of range-checking a reading. Stored alongside the reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub issues: Vec<String>,
    pub adjusted_confidence: f64,
    pub data_freshness: String,
}

/// A persisted biometric reading. Immutable once inserted.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReading {
    pub id: Uuid,
    pub astronaut_id: String,
    pub heart_rate: f64,
    pub hrv: f64,
    pub stress_level: f64,
    pub fatigue_level: f64,
    pub timestamp: DateTime<Utc>,
    pub confidence: f64,
    pub source: String,
    pub validation: ValidationReport,
    pub created_at: DateTime<Utc>,
}

/// Camera-derived vital estimates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VitalEstimates {
    pub heart_rate: Option<f64>,
    pub respiration_rate: Option<f64>,
    pub hrv_trend: Option<f64>,
    pub oxygen_saturation_trend: Option<f64>,
    pub blood_pressure_trend: Option<String>,
}

/// Camera-derived mental state indicators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentalIndicators {
    pub mood_state: Option<String>,
    pub mental_stress_index: Option<f64>,
    pub fatigue_probability: Option<f64>,
    pub alertness_level: Option<f64>,
    pub facial_tension: Option<f64>,
    pub pain_likelihood: Option<f64>,
}

/// Camera-derived physical indicators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicalIndicators {
    pub blink_rate: Option<f64>,
    pub eye_openness: Option<f64>,
    pub skin_hydration: Option<String>,
    pub dehydration_risk: Option<f64>,
}

/// A persisted facial analysis record. Immutable once inserted.
#[derive(Debug, Clone, Serialize)]
pub struct FacialRecord {
    pub id: Uuid,
    pub astronaut_id: String,
    pub timestamp: DateTime<Utc>,
    pub vital_estimates: VitalEstimates,
    pub mental_indicators: MentalIndicators,
    pub physical_indicators: PhysicalIndicators,
    pub confidence_scores: HashMap<String, f64>,
    pub disclaimer: String,
    pub created_at: DateTime<Utc>,
}

/// Per-astronaut statistical reference for deviation scoring.
/// One live row per astronaut, replaced on recalibration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Baseline {
    pub id: Uuid,
    pub astronaut_id: String,
    pub hr_baseline: f64,
    pub hr_std: f64,
    pub hrv_baseline: f64,
    pub hrv_std: f64,
    pub stress_baseline: f64,
    pub fatigue_baseline: f64,
    pub data_points: i64,
    pub is_default: bool,
    pub updated_at: DateTime<Utc>,
}

/// Mission phase and workload descriptors for an astronaut.
#[derive(Debug, Clone, Serialize)]
pub struct MissionContext {
    pub id: Uuid,
    pub astronaut_id: String,
    pub mission_phase: String,
    pub time_of_day: String,
    pub work_cycle: String,
    pub days_since_launch: i64,
    pub current_workload: String,
    pub updated_at: DateTime<Utc>,
}

/// Severity tier for a single risk factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Moderate,
    High,
}

/// One triggered deviation or threshold crossing.
#[derive(Debug, Clone, Serialize)]
pub struct RiskFactor {
    pub factor: String,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deviation_sigma: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

/// Result of scoring a reading against the astronaut's baseline.
#[derive(Debug, Clone, Serialize)]
pub struct RiskAnalysis {
    pub risk_level: i64,
    pub risk_factors: Vec<RiskFactor>,
    pub escalation_level: u8,
    pub recommendations: Vec<String>,
}

/// Alert severity, derived from the escalation level that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Warning,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Warning => "warning",
            AlertSeverity::Critical => "critical",
        }
    }
}

impl std::str::FromStr for AlertSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "warning" => Ok(AlertSeverity::Warning),
            "critical" => Ok(AlertSeverity::Critical),
            other => Err(format!("unknown alert severity: {other}")),
        }
    }
}

/// Lifecycle state of an alert. Acknowledgment sets the requested state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Active,
    Acknowledged,
    Dismissed,
    Escalated,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Active => "active",
            AlertStatus::Acknowledged => "acknowledged",
            AlertStatus::Dismissed => "dismissed",
            AlertStatus::Escalated => "escalated",
        }
    }
}

impl std::str::FromStr for AlertStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(AlertStatus::Active),
            "acknowledged" => Ok(AlertStatus::Acknowledged),
            "dismissed" => Ok(AlertStatus::Dismissed),
            "escalated" => Ok(AlertStatus::Escalated),
            other => Err(format!("unknown alert status: {other}")),
        }
    }
}

/// A raised wellbeing alert.
#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub id: Uuid,
    pub astronaut_id: String,
    pub severity: AlertSeverity,
    pub message: String,
    pub status: AlertStatus,
    pub created_at: DateTime<Utc>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub acknowledged_by: Option<String>,
}

/// One support-conversation exchange. Append-only, grouped into sessions
/// by a day-stamped key.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRecord {
    pub id: Uuid,
    pub astronaut_id: String,
    pub session_id: String,
    pub user_message: String,
    pub assistant_response: String,
    pub timestamp: DateTime<Utc>,
}
