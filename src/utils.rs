use chrono::{DateTime, SecondsFormat, Utc};
use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use rocket::serde::json::Json;
use serde::de::{self, Deserialize, Deserializer};
use serde::Serializer;
use serde_json::Value;

pub fn try_respond(req: &Request, json: Value, status: Status) -> response::Result<'static> {
    let response = Json(json).respond_to(req)?;
    Response::build_from(response).status(status).ok()
}

pub fn serialize_date<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let s = date.to_rfc3339_opts(SecondsFormat::Millis, true);
    serializer.serialize_str(&s)
}

/// Aggregate counts go out as strings, the way Postgres hands back `bigint`
/// to most JSON clients.
pub fn serialize_count<S>(count: &i64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&count.to_string())
}

/// Seed files carry timestamps as milliseconds since the epoch.
pub fn deserialize_millis<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let millis = i64::deserialize(deserializer)?;
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| de::Error::custom(format!("timestamp out of range: {}", millis)))
}
