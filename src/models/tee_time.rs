//! Tee time model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;
use crate::utils::errors::{TourDeskError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TeeTime {
    pub id: i64,
    pub tour_id: i64,
    pub play_date: NaiveDate,
    pub course_name: String,
    pub tee_time: NaiveTime,
    pub max_players: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTeeTimeRequest {
    /// Taken from the request path
    #[serde(default)]
    pub tour_id: i64,
    pub play_date: NaiveDate,
    pub course_name: String,
    pub tee_time: NaiveTime,
    #[serde(default = "default_max_players")]
    pub max_players: i32,
}

fn default_max_players() -> i32 {
    4
}

impl CreateTeeTimeRequest {
    pub fn validate(&self) -> Result<()> {
        if self.course_name.trim().is_empty() {
            return Err(TourDeskError::InvalidInput("Course name is required".to_string()));
        }
        if self.max_players <= 0 {
            return Err(TourDeskError::InvalidInput("Max players must be positive".to_string()));
        }
        Ok(())
    }
}

/// A tee time together with its current occupancy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeeTimeSlot {
    pub tee_time: TeeTime,
    pub occupancy: i64,
    pub remaining: i64,
    pub participants: Vec<String>,
}

/// Slots of one play date, ordered by time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeeTimeDay {
    pub play_date: NaiveDate,
    pub slots: Vec<TeeTimeSlot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignRequest {
    pub participant_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkAssignRequest {
    pub participant_ids: Vec<i64>,
}

/// One successful placement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub participant_id: i64,
    pub tee_time_id: i64,
    pub play_date: NaiveDate,
    /// true when a cloned participant row was inserted for this day
    pub cloned: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentFailure {
    pub participant_id: Option<i64>,
    pub play_date: Option<NaiveDate>,
    pub reason: String,
}

/// Outcome of a multi-step assignment; partial success is a valid end state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignmentReport {
    pub assigned: Vec<Placement>,
    pub failures: Vec<AssignmentFailure>,
}

impl AssignmentReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Single summary line for the operator
    pub fn summary(&self) -> String {
        if self.is_complete() {
            format!("{}건 배정 완료", self.assigned.len())
        } else {
            let reasons: Vec<&str> = self.failures.iter().map(|f| f.reason.as_str()).collect();
            format!(
                "{}건 배정, {}건 실패: {}",
                self.assigned.len(),
                self.failures.len(),
                reasons.join("; ")
            )
        }
    }
}
