use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::model::{Role, ScheduleDetails, ScheduleStatus, User};
use crate::report::UserStats;

// ============================================================================
// Auth
// ============================================================================

/// Missing fields deserialize as empty and are caught by `validate`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Successful login: the sanitized principal plus a bearer token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// Error body returned by every failing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

// ============================================================================
// Users
// ============================================================================

/// Input of the user creation form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserList {
    pub users: Vec<User>,
    /// Counts over the whole collection, not just the filtered page
    pub stats: UserStats,
}

// ============================================================================
// Schedules
// ============================================================================

/// Input of the schedule creation form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSchedule {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "optional_time", serialize_with = "serialize_optional_time")]
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub customer_id: String,
    #[serde(default)]
    pub technician_id: String,
    #[serde(default)]
    pub equipment_id: String,
    #[serde(default)]
    pub observations: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ScheduleStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleList {
    pub schedules: Vec<ScheduleDetails>,
    pub total: usize,
}

fn optional_time<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveTime>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    value
        .filter(|s| !s.is_empty())
        .map(|s| NaiveTime::parse_from_str(&s, crate::model::time_of_day::FORMAT))
        .transpose()
        .map_err(serde::de::Error::custom)
}

fn serialize_optional_time<S: serde::Serializer>(
    time: &Option<NaiveTime>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match time {
        Some(time) => crate::model::time_of_day::serialize(time, serializer),
        None => serializer.serialize_none(),
    }
}
