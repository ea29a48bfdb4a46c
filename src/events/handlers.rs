use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{AdminUser, CurrentUser},
    error::ApiError,
    images::sanitize_filename,
    state::AppState,
};

use super::dto::EventForm;
use super::repo::{BrowseEvent, Event, NewEvent};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/events", get(admin_list_events))
        .route("/user/events", get(browse_events))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/events/create", post(create_event))
        .route("/admin/events/:id/delete", post(delete_event))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB
}

#[instrument(skip(state, _admin))]
pub async fn admin_list_events(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<Event>>, ApiError> {
    let events = Event::list_ordered(&state.db).await?;
    Ok(Json(events))
}

#[instrument(skip(state))]
pub async fn browse_events(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<BrowseEvent>>, ApiError> {
    let events = Event::list_for_user(&state.db, user.id).await?;
    Ok(Json(events))
}

/// POST /admin/events/create (multipart)
/// Fields: title, description, date (YYYY-MM-DD), time (HH:MM), location,
/// optional image file.
#[instrument(skip(state, admin, mp))]
pub async fn create_event(
    State(state): State<AppState>,
    admin: AdminUser,
    mp: Multipart,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let form = EventForm::from_multipart(mp).await?;

    let stored_image = match form.image {
        Some(upload) => {
            let filename = sanitize_filename(&upload.filename).ok_or_else(|| {
                ApiError::Validation(format!("Unusable image filename '{}'", upload.filename))
            })?;
            Some(state.images.save(&filename, upload.body).await?)
        }
        None => None,
    };

    let event = Event::create(
        &state.db,
        NewEvent {
            title: &form.title,
            description: &form.description,
            date: form.date,
            time: form.time,
            location: &form.location,
            image: stored_image.as_deref(),
        },
    )
    .await?;

    info!(event_id = %event.id, admin = %admin.0.id, title = %event.title, "event created");
    Ok((StatusCode::CREATED, Json(event)))
}

#[instrument(skip(state, admin))]
pub async fn delete_event(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(event_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let event = Event::delete(&state.db, event_id)
        .await?
        .ok_or(ApiError::NotFound("Event"))?;

    // best effort: a leftover file is harmless
    if let Some(image) = &event.image {
        if let Err(e) = state.images.remove(image).await {
            warn!(error = %e, image = %image, "failed to remove event image");
        }
    }

    info!(event_id = %event.id, admin = %admin.0.id, "event deleted");
    Ok(Json(json!({ "message": "Event deleted" })))
}
