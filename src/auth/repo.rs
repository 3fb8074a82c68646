use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Identity principal. The email doubles as the username.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Rotated to invalidate outstanding credentials when refresh-token
    /// verification fails.
    pub security_stamp: Uuid,
    pub created_at: OffsetDateTime,
}

const USER_COLUMNS: &str =
    "id, email, first_name, last_name, password_hash, security_stamp, created_at";

impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Creates the user and assigns `default_role` in one transaction.
    pub async fn create(
        db: &PgPool,
        email: &str,
        first_name: &str,
        last_name: &str,
        password_hash: &str,
        default_role: &str,
    ) -> anyhow::Result<User> {
        let mut tx = db.begin().await?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, first_name, last_name, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(email)
        .bind(first_name)
        .bind(last_name)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, $2)")
            .bind(user.id)
            .bind(default_role)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(user)
    }

    pub async fn roles(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<String>> {
        let roles = sqlx::query_scalar::<_, String>(
            "SELECT role FROM user_roles WHERE user_id = $1 ORDER BY role",
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(roles)
    }

    pub async fn get_token(
        db: &PgPool,
        user_id: Uuid,
        login_provider: &str,
        name: &str,
    ) -> anyhow::Result<Option<String>> {
        let value = sqlx::query_scalar::<_, String>(
            r#"
            SELECT value FROM user_tokens
            WHERE user_id = $1 AND login_provider = $2 AND name = $3
            "#,
        )
        .bind(user_id)
        .bind(login_provider)
        .bind(name)
        .fetch_optional(db)
        .await?;
        Ok(value)
    }

    /// Removes any stored token for (user, provider, name) and stores the new
    /// value, so at most one is ever active.
    pub async fn replace_token(
        db: &PgPool,
        user_id: Uuid,
        login_provider: &str,
        name: &str,
        value: &str,
    ) -> anyhow::Result<()> {
        let mut tx = db.begin().await?;

        sqlx::query(
            "DELETE FROM user_tokens WHERE user_id = $1 AND login_provider = $2 AND name = $3",
        )
        .bind(user_id)
        .bind(login_provider)
        .bind(name)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO user_tokens (user_id, login_provider, name, value) VALUES ($1, $2, $3, $4)",
        )
        .bind(user_id)
        .bind(login_provider)
        .bind(name)
        .bind(value)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn rotate_security_stamp(db: &PgPool, user_id: Uuid) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET security_stamp = $2 WHERE id = $1")
            .bind(user_id)
            .bind(Uuid::new_v4())
            .execute(db)
            .await?;
        Ok(())
    }
}
