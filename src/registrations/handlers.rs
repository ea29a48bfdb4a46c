use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{AdminUser, CurrentUser, Role},
    error::ApiError,
    events::repo::Event,
    state::AppState,
};

use super::dto::{AttendeeList, CheckInResponse, DashboardResponse};
use super::repo::{Registration, RegisteredEvent};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/user/events/:id/register", post(register_for_event))
        .route("/user/my-registrations", get(my_registrations))
        .route("/admin/events/:id/attendees", get(attendees))
        .route("/admin/registration/:id/checkin", post(check_in))
}

#[instrument(skip(state, user))]
pub async fn dashboard(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<DashboardResponse>, ApiError> {
    let response = match user.role {
        Role::Admin => DashboardResponse::Admin { name: user.name },
        Role::User => {
            let registered_events = Registration::list_for_user(&state.db, user.id).await?;
            DashboardResponse::User {
                name: user.name,
                registered_events,
            }
        }
    };
    Ok(Json(response))
}

#[instrument(skip(state, user))]
pub async fn register_for_event(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(event_id): Path<Uuid>,
) -> Result<(StatusCode, Json<Registration>), ApiError> {
    if Event::find(&state.db, event_id).await?.is_none() {
        return Err(ApiError::NotFound("Event"));
    }

    if Registration::find_for(&state.db, user.id, event_id)
        .await?
        .is_some()
    {
        warn!(user_id = %user.id, %event_id, "already registered");
        return Err(ApiError::Conflict(
            "You already registered for this event".into(),
        ));
    }

    let registration = Registration::create(&state.db, user.id, event_id)
        .await
        .map_err(|e| ApiError::conflict_on_unique(e, "You already registered for this event"))?;

    info!(user_id = %user.id, %event_id, "registered for event");
    Ok((StatusCode::CREATED, Json(registration)))
}

#[instrument(skip(state, user))]
pub async fn my_registrations(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<RegisteredEvent>>, ApiError> {
    let rows = Registration::list_for_user(&state.db, user.id).await?;
    Ok(Json(rows))
}

#[instrument(skip(state, _admin))]
pub async fn attendees(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(event_id): Path<Uuid>,
) -> Result<Json<AttendeeList>, ApiError> {
    let event = Event::find(&state.db, event_id)
        .await?
        .ok_or(ApiError::NotFound("Event"))?;
    let attendees = Registration::list_attendees(&state.db, event_id).await?;
    Ok(Json(AttendeeList { event, attendees }))
}

#[instrument(skip(state, admin))]
pub async fn check_in(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(registration_id): Path<Uuid>,
) -> Result<Json<CheckInResponse>, ApiError> {
    let row = Registration::check_in(&state.db, registration_id)
        .await?
        .ok_or(ApiError::NotFound("Registration"))?;

    info!(
        registration_id = %row.registration_id,
        event_id = %row.event_id,
        admin = %admin.0.id,
        "attendee checked in"
    );
    Ok(Json(CheckInResponse {
        message: format!("{} checked in!", row.name),
        registration_id: row.registration_id,
        event_id: row.event_id,
        checked_in: row.checked_in,
    }))
}
