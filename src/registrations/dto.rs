use serde::Serialize;
use uuid::Uuid;

use crate::events::repo::Event;
use crate::registrations::repo::{Attendee, RegisteredEvent};

/// Role-branched dashboard payload.
#[derive(Debug, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum DashboardResponse {
    Admin {
        name: String,
    },
    User {
        name: String,
        registered_events: Vec<RegisteredEvent>,
    },
}

#[derive(Debug, Serialize)]
pub struct AttendeeList {
    pub event: Event,
    pub attendees: Vec<Attendee>,
}

#[derive(Debug, Serialize)]
pub struct CheckInResponse {
    pub message: String,
    pub registration_id: Uuid,
    pub event_id: Uuid,
    pub checked_in: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    #[test]
    fn dashboard_is_tagged_by_role() {
        let admin = DashboardResponse::Admin {
            name: "Root".into(),
        };
        let json = serde_json::to_string(&admin).unwrap();
        assert!(json.contains(r#""role":"admin""#));

        let user = DashboardResponse::User {
            name: "Alice".into(),
            registered_events: vec![],
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains(r#""role":"user""#));
        assert!(json.contains(r#""registered_events":[]"#));
    }

    #[test]
    fn check_in_response_carries_attendee_message() {
        let response = CheckInResponse {
            message: "Alice checked in!".into(),
            registration_id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            checked_in: true,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("Alice checked in!"));
        assert!(json.contains(r#""checked_in":true"#));
    }

    #[test]
    fn registered_event_serializes_event_fields() {
        let row = RegisteredEvent {
            registration_id: Uuid::new_v4(),
            checked_in: false,
            registered_at: OffsetDateTime::UNIX_EPOCH,
            event_id: Uuid::new_v4(),
            title: "RustConf".into(),
            date: time::macros::date!(2026 - 09 - 01),
            time: time::macros::time!(10:00),
            location: "Berlin".into(),
            image: None,
        };
        let json = serde_json::to_string(&row).unwrap();
        assert!(json.contains("RustConf"));
        assert!(json.contains(r#""checked_in":false"#));
    }
}
