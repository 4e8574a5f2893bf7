//! Baseline persistence: one live row per astronaut, replaced on
//! recalibration.

use sqlx::{Row, SqlitePool};

use crate::error::AppError;
use crate::models::Baseline;

use super::{fmt_ts, parse_ts, parse_uuid};

fn map_row(row: &sqlx::sqlite::SqliteRow) -> Result<Baseline, AppError> {
    Ok(Baseline {
        id: parse_uuid(row.get("id"))?,
        astronaut_id: row.get("astronaut_id"),
        hr_baseline: row.get("hr_baseline"),
        hr_std: row.get("hr_std"),
        hrv_baseline: row.get("hrv_baseline"),
        hrv_std: row.get("hrv_std"),
        stress_baseline: row.get("stress_baseline"),
        fatigue_baseline: row.get("fatigue_baseline"),
        data_points: row.get("data_points"),
        is_default: row.get("is_default"),
        updated_at: parse_ts(row.get("updated_at"))?,
    })
}

pub async fn find(pool: &SqlitePool, astronaut_id: &str) -> Result<Option<Baseline>, AppError> {
    let row = sqlx::query("SELECT * FROM baselines WHERE astronaut_id = ?")
        .bind(astronaut_id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(map_row).transpose()
}

/// Last-write-wins upsert keyed on the astronaut identifier.
pub async fn upsert(pool: &SqlitePool, baseline: &Baseline) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO baselines (
            id, astronaut_id, hr_baseline, hr_std, hrv_baseline, hrv_std,
            stress_baseline, fatigue_baseline, data_points, is_default, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(astronaut_id) DO UPDATE SET
            id = excluded.id,
            hr_baseline = excluded.hr_baseline,
            hr_std = excluded.hr_std,
            hrv_baseline = excluded.hrv_baseline,
            hrv_std = excluded.hrv_std,
            stress_baseline = excluded.stress_baseline,
            fatigue_baseline = excluded.fatigue_baseline,
            data_points = excluded.data_points,
            is_default = excluded.is_default,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(baseline.id.to_string())
    .bind(&baseline.astronaut_id)
    .bind(baseline.hr_baseline)
    .bind(baseline.hr_std)
    .bind(baseline.hrv_baseline)
    .bind(baseline.hrv_std)
    .bind(baseline.stress_baseline)
    .bind(baseline.fatigue_baseline)
    .bind(baseline.data_points)
    .bind(baseline.is_default)
    .bind(fmt_ts(baseline.updated_at))
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    use crate::store::test_pool;

    fn baseline(astronaut_id: &str, hr: f64) -> Baseline {
        Baseline {
            id: Uuid::new_v4(),
            astronaut_id: astronaut_id.to_string(),
            hr_baseline: hr,
            hr_std: 8.0,
            hrv_baseline: 52.0,
            hrv_std: 12.0,
            stress_baseline: 28.0,
            fatigue_baseline: 22.0,
            data_points: 40,
            is_default: false,
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn upsert_replaces_existing_row() {
        let pool = test_pool().await;
        upsert(&pool, &baseline("AST-1", 68.0)).await.unwrap();
        upsert(&pool, &baseline("AST-1", 72.0)).await.unwrap();

        let stored = find(&pool, "AST-1").await.unwrap().unwrap();
        assert_eq!(stored.hr_baseline, 72.0);

        // Still exactly one row for the astronaut
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM baselines WHERE astronaut_id = ?")
                .bind("AST-1")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn find_missing_returns_none() {
        let pool = test_pool().await;
        assert!(find(&pool, "AST-NONE").await.unwrap().is_none());
    }
}
