use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime, Time};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: Date,
    pub time: Time,
    pub location: String,
    pub image: Option<String>,
    pub created_at: OffsetDateTime,
}

/// An event as the browsing user sees it, flagged with their own
/// registration state.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BrowseEvent {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: Date,
    pub time: Time,
    pub location: String,
    pub image: Option<String>,
    pub registered: bool,
}

#[derive(Debug)]
pub struct NewEvent<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub date: Date,
    pub time: Time,
    pub location: &'a str,
    pub image: Option<&'a str>,
}

impl Event {
    /// All events, soonest first.
    pub async fn list_ordered(db: &PgPool) -> anyhow::Result<Vec<Event>> {
        let rows = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, title, description, date, time, location, image, created_at
            FROM events
            ORDER BY date ASC
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, title, description, date, time, location, image, created_at
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(event)
    }

    pub async fn create(db: &PgPool, new: NewEvent<'_>) -> anyhow::Result<Event> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (title, description, date, time, location, image)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, title, description, date, time, location, image, created_at
            "#,
        )
        .bind(new.title)
        .bind(new.description)
        .bind(new.date)
        .bind(new.time)
        .bind(new.location)
        .bind(new.image)
        .fetch_one(db)
        .await?;
        Ok(event)
    }

    /// Delete an event, returning the removed row so callers can clean up
    /// its stored image. Registrations cascade at the storage layer.
    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            DELETE FROM events
            WHERE id = $1
            RETURNING id, title, description, date, time, location, image, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(event)
    }

    /// All events, soonest first, each flagged with whether `user_id` holds
    /// a registration.
    pub async fn list_for_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<BrowseEvent>> {
        let rows = sqlx::query_as::<_, BrowseEvent>(
            r#"
            SELECT e.id, e.title, e.description, e.date, e.time, e.location, e.image,
                   r.id IS NOT NULL AS registered
            FROM events e
            LEFT JOIN registrations r ON r.event_id = e.id AND r.user_id = $1
            ORDER BY e.date ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}
