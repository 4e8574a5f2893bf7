//! Mission context persistence: one live row per astronaut.

use sqlx::{Row, SqlitePool};

use crate::error::AppError;
use crate::models::MissionContext;

use super::{fmt_ts, parse_ts, parse_uuid};

fn map_row(row: &sqlx::sqlite::SqliteRow) -> Result<MissionContext, AppError> {
    Ok(MissionContext {
        id: parse_uuid(row.get("id"))?,
        astronaut_id: row.get("astronaut_id"),
        mission_phase: row.get("mission_phase"),
        time_of_day: row.get("time_of_day"),
        work_cycle: row.get("work_cycle"),
        days_since_launch: row.get("days_since_launch"),
        current_workload: row.get("current_workload"),
        updated_at: parse_ts(row.get("updated_at"))?,
    })
}

pub async fn find(
    pool: &SqlitePool,
    astronaut_id: &str,
) -> Result<Option<MissionContext>, AppError> {
    let row = sqlx::query("SELECT * FROM mission_contexts WHERE astronaut_id = ?")
        .bind(astronaut_id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(map_row).transpose()
}

/// Last-write-wins upsert keyed on the astronaut identifier.
pub async fn upsert(pool: &SqlitePool, context: &MissionContext) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO mission_contexts (
            id, astronaut_id, mission_phase, time_of_day, work_cycle,
            days_since_launch, current_workload, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(astronaut_id) DO UPDATE SET
            id = excluded.id,
            mission_phase = excluded.mission_phase,
            time_of_day = excluded.time_of_day,
            work_cycle = excluded.work_cycle,
            days_since_launch = excluded.days_since_launch,
            current_workload = excluded.current_workload,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(context.id.to_string())
    .bind(&context.astronaut_id)
    .bind(&context.mission_phase)
    .bind(&context.time_of_day)
    .bind(&context.work_cycle)
    .bind(context.days_since_launch)
    .bind(&context.current_workload)
    .bind(fmt_ts(context.updated_at))
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

    fn context(phase: &str) -> MissionContext {
        MissionContext {
            id: Uuid::new_v4(),
            astronaut_id: "AST-1".to_string(),
            mission_phase: phase.to_string(),
            time_of_day: "morning".to_string(),
            work_cycle: "active".to_string(),
            days_since_launch: 3,
            current_workload: "moderate".to_string(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn upsert_replaces_phase() {
        let pool = test_pool().await;
        upsert(&pool, &context("transit")).await.unwrap();
        upsert(&pool, &context("eva")).await.unwrap();

        let stored = find(&pool, "AST-1").await.unwrap().unwrap();
        assert_eq!(stored.mission_phase, "eva");

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM mission_contexts")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
