//! Participant model

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Deserializer, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use crate::utils::errors::TourDeskError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Participant {
    pub id: i64,
    pub tour_id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub team: Option<String>,
    pub gender: Option<String>,
    pub pickup_location: Option<String>,
    pub participation_count: i32,
    pub group_size: i32,
    pub companions: Vec<String>,
    pub is_paying_for_group: bool,
    pub role: Option<String>,
    pub emergency_contact: Option<String>,
    pub status: String,
    pub note: Option<String>,
    pub tee_time_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Participant {
    pub fn status(&self) -> ParticipantStatus {
        self.status.parse().unwrap_or(ParticipantStatus::Unconfirmed)
    }

    /// Key used for duplicate detection on import
    pub fn identity_key(&self) -> (String, String) {
        identity_key(&self.name, self.phone.as_deref())
    }
}

/// Normalized (name, phone digits) pair
pub fn identity_key(name: &str, phone: Option<&str>) -> (String, String) {
    let digits: String = phone
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    (name.trim().to_string(), digits)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateParticipantRequest {
    /// Taken from the request path
    #[serde(default)]
    pub tour_id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub team: Option<String>,
    pub gender: Option<String>,
    pub pickup_location: Option<String>,
    #[serde(default)]
    pub participation_count: i32,
    #[serde(default = "default_group_size")]
    pub group_size: i32,
    #[serde(default)]
    pub companions: Vec<String>,
    #[serde(default)]
    pub is_paying_for_group: bool,
    pub role: Option<String>,
    pub emergency_contact: Option<String>,
    pub status: Option<ParticipantStatus>,
    pub note: Option<String>,
    pub tee_time_id: Option<i64>,
}

fn default_group_size() -> i32 {
    1
}

impl CreateParticipantRequest {
    /// A new row standing in for `source` on another tour day
    pub fn cloned_from(source: &Participant, note: String, tee_time_id: i64) -> Self {
        Self {
            tour_id: source.tour_id,
            name: source.name.clone(),
            phone: source.phone.clone(),
            email: source.email.clone(),
            team: source.team.clone(),
            gender: source.gender.clone(),
            pickup_location: source.pickup_location.clone(),
            participation_count: source.participation_count,
            group_size: source.group_size,
            companions: source.companions.clone(),
            is_paying_for_group: false,
            role: source.role.clone(),
            emergency_contact: source.emergency_contact.clone(),
            status: Some(source.status()),
            note: Some(note),
            tee_time_id: Some(tee_time_id),
        }
    }
}

/// Partial update
///
/// An absent field leaves the column unchanged. Nullable columns take an
/// explicit `null` to clear them, which deserializes to `Some(None)`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateParticipantRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "patch_field", skip_serializing_if = "Option::is_none")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field", skip_serializing_if = "Option::is_none")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field", skip_serializing_if = "Option::is_none")]
    pub team: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field", skip_serializing_if = "Option::is_none")]
    pub gender: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field", skip_serializing_if = "Option::is_none")]
    pub pickup_location: Option<Option<String>>,
    pub participation_count: Option<i32>,
    pub group_size: Option<i32>,
    pub companions: Option<Vec<String>>,
    pub is_paying_for_group: Option<bool>,
    #[serde(default, deserialize_with = "patch_field", skip_serializing_if = "Option::is_none")]
    pub role: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field", skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<Option<String>>,
    pub status: Option<ParticipantStatus>,
    #[serde(default, deserialize_with = "patch_field", skip_serializing_if = "Option::is_none")]
    pub note: Option<Option<String>>,
}

/// Present fields, `null` included, become `Some`
fn patch_field<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkStatusRequest {
    pub participant_ids: Vec<i64>,
    pub status: ParticipantStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkUpdateRequest {
    pub participant_ids: Vec<i64>,
    pub patch: UpdateParticipantRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantStatus {
    Confirmed,
    Unconfirmed,
    Cancelled,
}

impl ParticipantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantStatus::Confirmed => "confirmed",
            ParticipantStatus::Unconfirmed => "unconfirmed",
            ParticipantStatus::Cancelled => "cancelled",
        }
    }

    /// Label used in the roster spreadsheet
    pub fn label(&self) -> &'static str {
        match self {
            ParticipantStatus::Confirmed => "확정",
            ParticipantStatus::Unconfirmed => "미확정",
            ParticipantStatus::Cancelled => "취소",
        }
    }
}

impl fmt::Display for ParticipantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParticipantStatus {
    type Err = TourDeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "confirmed" | "확정" => Ok(ParticipantStatus::Confirmed),
            "unconfirmed" | "미확정" => Ok(ParticipantStatus::Unconfirmed),
            "cancelled" | "취소" => Ok(ParticipantStatus::Cancelled),
            other => Err(TourDeskError::InvalidInput(format!("Unknown participant status: {}", other))),
        }
    }
}
