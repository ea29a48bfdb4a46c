use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::extractors::CurrentUser;
use crate::auth::repo_types::{Role, Session, User};

impl User {
    /// Find a user by email, exact match per stored value.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, role, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a new user with hashed password.
    pub async fn create(
        db: &PgPool,
        name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password_hash, role, created_at
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .fetch_one(db)
        .await?;
        Ok(user)
    }
}

impl Session {
    pub async fn create(db: &PgPool, user_id: Uuid) -> anyhow::Result<Session> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (user_id)
            VALUES ($1)
            RETURNING id, user_id, created_at
            "#,
        )
        .bind(user_id)
        .fetch_one(db)
        .await?;
        Ok(session)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query(r#"DELETE FROM sessions WHERE id = $1"#)
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Resolve a session id to its authenticated user. None means the session
/// was revoked (logout) or never existed.
pub async fn find_session_user(db: &PgPool, session_id: Uuid) -> anyhow::Result<Option<CurrentUser>> {
    let user = sqlx::query_as::<_, CurrentUser>(
        r#"
        SELECT s.id AS session_id, u.id, u.name, u.email, u.role
        FROM sessions s
        JOIN users u ON u.id = s.user_id
        WHERE s.id = $1
        "#,
    )
    .bind(session_id)
    .fetch_optional(db)
    .await?;
    Ok(user)
}
