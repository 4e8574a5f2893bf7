//! Account persistence.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Role, User};

use super::{fmt_ts, parse_opt_ts, parse_ts, parse_uuid};

fn map_row(row: &sqlx::sqlite::SqliteRow) -> Result<User, AppError> {
    let role_raw: String = row.get("role");
    Ok(User {
        id: parse_uuid(row.get("id"))?,
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        full_name: row.get("full_name"),
        role: Role::from_str(&role_raw).map_err(AppError::Internal)?,
        astronaut_id: row.get("astronaut_id"),
        avatar_url: row.get("avatar_url"),
        created_at: parse_ts(row.get("created_at"))?,
        last_login: parse_opt_ts(row.get("last_login"))?,
    })
}

pub async fn insert(pool: &SqlitePool, user: &User) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO users (
            id, email, password_hash, full_name, role,
            astronaut_id, avatar_url, created_at, last_login
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user.id.to_string())
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.full_name)
    .bind(user.role.as_str())
    .bind(&user.astronaut_id)
    .bind(&user.avatar_url)
    .bind(fmt_ts(user.created_at))
    .bind(user.last_login.map(fmt_ts))
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, AppError> {
    let row = sqlx::query("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(map_row).transpose()
}

pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<User>, AppError> {
    let row = sqlx::query("SELECT * FROM users WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(map_row).transpose()
}

/// Stamp a successful login.
pub async fn touch_last_login(
    pool: &SqlitePool,
    id: Uuid,
    at: DateTime<Utc>,
) -> Result<(), AppError> {
    sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
        .bind(fmt_ts(at))
        .bind(id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

/// Apply a profile update. Only the mutable presentation fields are
/// touched; absent fields keep their stored value.
pub async fn update_profile(
    pool: &SqlitePool,
    id: Uuid,
    full_name: Option<&str>,
    avatar_url: Option<&str>,
) -> Result<(), AppError> {
    if let Some(name) = full_name {
        sqlx::query("UPDATE users SET full_name = ? WHERE id = ?")
            .bind(name)
            .bind(id.to_string())
            .execute(pool)
            .await?;
    }

    if let Some(url) = avatar_url {
        sqlx::query("UPDATE users SET avatar_url = ? WHERE id = ?")
            .bind(url)
            .bind(id.to_string())
            .execute(pool)
            .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_pool;

    fn user(email: &str) -> User {
        User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            full_name: "Ada Vega".to_string(),
            role: Role::Astronaut,
            astronaut_id: "AST-0001".to_string(),
            avatar_url: None,
            created_at: Utc::now(),
            last_login: None,
        }
    }

    #[tokio::test]
    async fn insert_and_find_round_trip() {
        let pool = test_pool().await;
        let u = user("ada@example.com");
        insert(&pool, &u).await.unwrap();

        let by_email = find_by_email(&pool, "ada@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, u.id);
        assert_eq!(by_email.role, Role::Astronaut);
        assert!(by_email.last_login.is_none());

        let by_id = find_by_id(&pool, u.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, u.email);
    }

    #[tokio::test]
    async fn duplicate_email_is_a_constraint_violation() {
        let pool = test_pool().await;
        insert(&pool, &user("dup@example.com")).await.unwrap();
        assert!(insert(&pool, &user("dup@example.com")).await.is_err());
    }

    #[tokio::test]
    async fn profile_update_preserves_absent_fields() {
        let pool = test_pool().await;
        let u = user("ada@example.com");
        insert(&pool, &u).await.unwrap();

        update_profile(&pool, u.id, Some("Ada V. Vega"), None).await.unwrap();
        let updated = find_by_id(&pool, u.id).await.unwrap().unwrap();
        assert_eq!(updated.full_name, "Ada V. Vega");
        assert!(updated.avatar_url.is_none());

        update_profile(&pool, u.id, None, Some("https://crew.example/ada.png"))
            .await
            .unwrap();
        let updated = find_by_id(&pool, u.id).await.unwrap().unwrap();
        assert_eq!(updated.full_name, "Ada V. Vega");
        assert_eq!(
            updated.avatar_url.as_deref(),
            Some("https://crew.example/ada.png")
        );
    }

    #[tokio::test]
    async fn touch_last_login_stamps_time() {
        let pool = test_pool().await;
        let u = user("ada@example.com");
        insert(&pool, &u).await.unwrap();

        let at = Utc::now();
        touch_last_login(&pool, u.id, at).await.unwrap();
        let updated = find_by_id(&pool, u.id).await.unwrap().unwrap();
        let stored = updated.last_login.unwrap();
        assert!((stored - at).num_milliseconds().abs() < 10);
    }
}
