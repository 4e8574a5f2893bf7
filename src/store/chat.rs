//! Chat exchange persistence. Append-only; sessions are day-stamped keys.

use sqlx::{Row, SqlitePool};

use crate::error::AppError;
use crate::models::ChatRecord;

use super::{fmt_ts, parse_ts, parse_uuid};

fn map_row(row: &sqlx::sqlite::SqliteRow) -> Result<ChatRecord, AppError> {
    Ok(ChatRecord {
        id: parse_uuid(row.get("id"))?,
        astronaut_id: row.get("astronaut_id"),
        session_id: row.get("session_id"),
        user_message: row.get("user_message"),
        assistant_response: row.get("assistant_response"),
        timestamp: parse_ts(row.get("timestamp"))?,
    })
}

pub async fn insert(pool: &SqlitePool, record: &ChatRecord) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO chat_messages (
            id, astronaut_id, session_id, user_message, assistant_response, timestamp
        ) VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(record.id.to_string())
    .bind(&record.astronaut_id)
    .bind(&record.session_id)
    .bind(&record.user_message)
    .bind(&record.assistant_response)
    .bind(fmt_ts(record.timestamp))
    .execute(pool)
    .await?;

    Ok(())
}

/// The session's exchanges oldest first, for prompt assembly.
pub async fn session_window(
    pool: &SqlitePool,
    session_id: &str,
    limit: i64,
) -> Result<Vec<ChatRecord>, AppError> {
    let rows = sqlx::query(
        r#"
        SELECT * FROM chat_messages
        WHERE session_id = ?
        ORDER BY timestamp ASC
        LIMIT ?
        "#,
    )
    .bind(session_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter().map(map_row).collect()
}

/// An astronaut's exchanges newest first, optionally scoped to a session.
pub async fn history(
    pool: &SqlitePool,
    astronaut_id: &str,
    session_id: Option<&str>,
    limit: i64,
) -> Result<Vec<ChatRecord>, AppError> {
    let rows = match session_id {
        Some(session_id) => {
            sqlx::query(
                r#"
                SELECT * FROM chat_messages
                WHERE astronaut_id = ? AND session_id = ?
                ORDER BY timestamp DESC
                LIMIT ?
                "#,
            )
            .bind(astronaut_id)
            .bind(session_id)
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query(
                r#"
                SELECT * FROM chat_messages
                WHERE astronaut_id = ?
                ORDER BY timestamp DESC
                LIMIT ?
                "#,
            )
            .bind(astronaut_id)
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
    };

    rows.iter().map(map_row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use crate::store::test_pool;

    fn record(session: &str, text: &str, at: chrono::DateTime<Utc>) -> ChatRecord {
        ChatRecord {
            id: Uuid::new_v4(),
            astronaut_id: "AST-1".to_string(),
            session_id: session.to_string(),
            user_message: text.to_string(),
            assistant_response: format!("re: {text}"),
            timestamp: at,
        }
    }

    #[tokio::test]
    async fn session_window_is_oldest_first() {
        let pool = test_pool().await;
        let now = Utc::now();
        insert(&pool, &record("AST-1-20260806", "first", now - Duration::minutes(5)))
            .await
            .unwrap();
        insert(&pool, &record("AST-1-20260806", "second", now)).await.unwrap();
        insert(&pool, &record("AST-1-20260805", "other-day", now)).await.unwrap();

        let window = session_window(&pool, "AST-1-20260806", 20).await.unwrap();
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].user_message, "first");
        assert_eq!(window[1].user_message, "second");
    }

    #[tokio::test]
    async fn history_scopes_to_session_when_given() {
        let pool = test_pool().await;
        let now = Utc::now();
        insert(&pool, &record("AST-1-20260805", "yesterday", now - Duration::days(1)))
            .await
            .unwrap();
        insert(&pool, &record("AST-1-20260806", "today", now)).await.unwrap();

        let all = history(&pool, "AST-1", None, 50).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].user_message, "today");

        let scoped = history(&pool, "AST-1", Some("AST-1-20260805"), 50)
            .await
            .unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].user_message, "yesterday");
    }
}
