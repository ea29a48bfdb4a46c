use axum::extract::multipart::Field;
use axum::extract::Multipart;
use bytes::Bytes;
use time::macros::format_description;
use time::{Date, Time};

use crate::error::ApiError;

#[derive(Debug)]
pub struct UploadedImage {
    pub filename: String,
    pub body: Bytes,
}

/// The create-event form, parsed and validated from a multipart body.
#[derive(Debug)]
pub struct EventForm {
    pub title: String,
    pub description: String,
    pub date: Date,
    pub time: Time,
    pub location: String,
    pub image: Option<UploadedImage>,
}

impl EventForm {
    pub async fn from_multipart(mut mp: Multipart) -> Result<Self, ApiError> {
        let mut title = None;
        let mut description = None;
        let mut date = None;
        let mut time = None;
        let mut location = None;
        let mut image = None;

        while let Some(field) = mp
            .next_field()
            .await
            .map_err(|e| ApiError::Validation(format!("Malformed form: {e}")))?
        {
            let Some(name) = field.name().map(|s| s.to_string()) else {
                continue;
            };
            match name.as_str() {
                "title" => title = Some(text(field, "title").await?),
                "description" => description = Some(text(field, "description").await?),
                "date" => date = Some(text(field, "date").await?),
                "time" => time = Some(text(field, "time").await?),
                "location" => location = Some(text(field, "location").await?),
                "image" => {
                    let filename = field.file_name().map(|s| s.to_string()).unwrap_or_default();
                    let body = field.bytes().await.map_err(|e| {
                        ApiError::Validation(format!("Unreadable image upload: {e}"))
                    })?;
                    // an empty file input arrives with an empty filename and body
                    if !filename.is_empty() && !body.is_empty() {
                        image = Some(UploadedImage { filename, body });
                    }
                }
                _ => {}
            }
        }

        let date = parse_event_date(&required(date, "date")?)?;
        let time = parse_event_time(&required(time, "time")?)?;
        Ok(Self {
            title: required(title, "title")?,
            description: required(description, "description")?,
            date,
            time,
            location: required(location, "location")?,
            image,
        })
    }
}

async fn text(field: Field<'_>, name: &str) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::Validation(format!("Unreadable field '{name}': {e}")))
}

fn required(value: Option<String>, name: &str) -> Result<String, ApiError> {
    value.ok_or_else(|| ApiError::Validation(format!("Missing form field '{name}'")))
}

pub(crate) fn parse_event_date(s: &str) -> Result<Date, ApiError> {
    Date::parse(s.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| ApiError::Validation(format!("Invalid date '{s}', expected YYYY-MM-DD")))
}

pub(crate) fn parse_event_time(s: &str) -> Result<Time, ApiError> {
    let parsed = s.trim().split_once(':').and_then(|(h, m)| {
        let h: u8 = h.parse().ok()?;
        let m: u8 = m.parse().ok()?;
        Time::from_hms(h, m, 0).ok()
    });
    parsed.ok_or_else(|| ApiError::Validation(format!("Invalid time '{s}', expected HH:MM")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, time};

    #[test]
    fn parses_calendar_date() {
        assert_eq!(parse_event_date("2026-05-01").unwrap(), date!(2026 - 05 - 01));
        assert_eq!(parse_event_date(" 2026-12-31 ").unwrap(), date!(2026 - 12 - 31));
    }

    #[test]
    fn rejects_malformed_date() {
        assert!(parse_event_date("01/05/2026").is_err());
        assert!(parse_event_date("2026-13-01").is_err());
        assert!(parse_event_date("tomorrow").is_err());
        assert!(parse_event_date("").is_err());
    }

    #[test]
    fn parses_wall_clock_time() {
        assert_eq!(parse_event_time("09:30").unwrap(), time!(09:30));
        assert_eq!(parse_event_time("23:59").unwrap(), time!(23:59));
        assert_eq!(parse_event_time("9:5").unwrap(), time!(09:05));
    }

    #[test]
    fn rejects_malformed_time() {
        assert!(parse_event_time("24:00").is_err());
        assert!(parse_event_time("12:60").is_err());
        assert!(parse_event_time("12:30:15").is_err());
        assert!(parse_event_time("noon").is_err());
        assert!(parse_event_time("").is_err());
    }

    #[test]
    fn missing_field_names_the_field() {
        let err = required(None, "location").unwrap_err();
        assert!(err.to_string().contains("location"));
    }
}
