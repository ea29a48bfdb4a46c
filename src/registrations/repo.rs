use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime, Time};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Registration {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub checked_in: bool,
    pub created_at: OffsetDateTime,
}

/// A registration joined with its event, for the dashboard and
/// my-registrations views.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RegisteredEvent {
    pub registration_id: Uuid,
    pub checked_in: bool,
    pub registered_at: OffsetDateTime,
    pub event_id: Uuid,
    pub title: String,
    pub date: Date,
    pub time: Time,
    pub location: String,
    pub image: Option<String>,
}

/// A registration joined with the attending user, for the admin list.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Attendee {
    pub registration_id: Uuid,
    pub checked_in: bool,
    pub registered_at: OffsetDateTime,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
}

/// Result of a check-in, named after the attendee it marked.
#[derive(Debug, Clone, FromRow)]
pub struct CheckedIn {
    pub registration_id: Uuid,
    pub event_id: Uuid,
    pub checked_in: bool,
    pub name: String,
}

impl Registration {
    pub async fn find_for(
        db: &PgPool,
        user_id: Uuid,
        event_id: Uuid,
    ) -> anyhow::Result<Option<Registration>> {
        let registration = sqlx::query_as::<_, Registration>(
            r#"
            SELECT id, user_id, event_id, checked_in, created_at
            FROM registrations
            WHERE user_id = $1 AND event_id = $2
            "#,
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_optional(db)
        .await?;
        Ok(registration)
    }

    pub async fn create(db: &PgPool, user_id: Uuid, event_id: Uuid) -> anyhow::Result<Registration> {
        let registration = sqlx::query_as::<_, Registration>(
            r#"
            INSERT INTO registrations (user_id, event_id)
            VALUES ($1, $2)
            RETURNING id, user_id, event_id, checked_in, created_at
            "#,
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_one(db)
        .await?;
        Ok(registration)
    }

    pub async fn list_for_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<RegisteredEvent>> {
        let rows = sqlx::query_as::<_, RegisteredEvent>(
            r#"
            SELECT r.id AS registration_id, r.checked_in, r.created_at AS registered_at,
                   e.id AS event_id, e.title, e.date, e.time, e.location, e.image
            FROM registrations r
            JOIN events e ON e.id = r.event_id
            WHERE r.user_id = $1
            ORDER BY e.date ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn list_attendees(db: &PgPool, event_id: Uuid) -> anyhow::Result<Vec<Attendee>> {
        let rows = sqlx::query_as::<_, Attendee>(
            r#"
            SELECT r.id AS registration_id, r.checked_in, r.created_at AS registered_at,
                   u.id AS user_id, u.name, u.email
            FROM registrations r
            JOIN users u ON u.id = r.user_id
            WHERE r.event_id = $1
            ORDER BY r.created_at ASC
            "#,
        )
        .bind(event_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Mark a registration attended. Setting the flag again on a row that is
    /// already checked in succeeds and leaves it true; there is no
    /// un-check-in.
    pub async fn check_in(db: &PgPool, id: Uuid) -> anyhow::Result<Option<CheckedIn>> {
        let row = sqlx::query_as::<_, CheckedIn>(
            r#"
            UPDATE registrations r
            SET checked_in = TRUE
            FROM users u
            WHERE r.id = $1 AND u.id = r.user_id
            RETURNING r.id AS registration_id, r.event_id, r.checked_in, u.name
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }
}
