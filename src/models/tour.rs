//! Tour model

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use sqlx::types::Json;
use crate::utils::errors::{TourDeskError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tour {
    pub id: i64,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub price: i64,
    pub max_participants: Option<i32>,
    pub show_staff_info: bool,
    pub document_settings: Json<TourDocumentSettings>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-document-type display flags stored with the tour
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TourDocumentSettings {
    /// document type (snake_case) -> whether staff phone numbers are shown
    #[serde(default)]
    pub phone_visibility: BTreeMap<String, bool>,
}

impl TourDocumentSettings {
    /// Phones are shown unless the document type was explicitly switched off
    pub fn shows_phone(&self, document_type: &str) -> bool {
        self.phone_visibility.get(document_type).copied().unwrap_or(true)
    }
}

impl Tour {
    /// Whether `date` falls on a tour day, both ends inclusive
    pub fn includes(&self, date: NaiveDate) -> bool {
        (self.start_date..=self.end_date).contains(&date)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTourRequest {
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub price: i64,
    pub max_participants: Option<i32>,
    #[serde(default)]
    pub show_staff_info: bool,
    #[serde(default)]
    pub document_settings: TourDocumentSettings,
}

impl CreateTourRequest {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(TourDeskError::InvalidInput("Tour title is required".to_string()));
        }
        validate_dates(self.start_date, self.end_date)?;
        if self.price < 0 {
            return Err(TourDeskError::InvalidInput("Tour price cannot be negative".to_string()));
        }
        if let Some(max) = self.max_participants {
            if max <= 0 {
                return Err(TourDeskError::InvalidInput("Max participants must be positive".to_string()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTourRequest {
    pub title: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub price: Option<i64>,
    pub max_participants: Option<i32>,
    pub show_staff_info: Option<bool>,
    pub document_settings: Option<TourDocumentSettings>,
}

impl UpdateTourRequest {
    /// Validate the patch against the tour it will be applied to
    pub fn validate_against(&self, tour: &Tour) -> Result<()> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(TourDeskError::InvalidInput("Tour title is required".to_string()));
            }
        }
        validate_dates(
            self.start_date.unwrap_or(tour.start_date),
            self.end_date.unwrap_or(tour.end_date),
        )?;
        if matches!(self.price, Some(p) if p < 0) {
            return Err(TourDeskError::InvalidInput("Tour price cannot be negative".to_string()));
        }
        Ok(())
    }
}

fn validate_dates(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if end < start {
        return Err(TourDeskError::InvalidInput(format!(
            "Tour end date {} is before start date {}",
            end, start
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateTourRequest {
        CreateTourRequest {
            title: "제주 골프 3박4일".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 5, 4).unwrap(),
            price: 1_290_000,
            max_participants: Some(24),
            show_staff_info: true,
            document_settings: TourDocumentSettings::default(),
        }
    }

    #[test]
    fn test_create_request_validation() {
        assert!(request().validate().is_ok());

        let mut bad = request();
        bad.end_date = NaiveDate::from_ymd_opt(2024, 4, 30).unwrap();
        assert!(bad.validate().is_err());

        let mut bad = request();
        bad.title = "  ".to_string();
        assert!(bad.validate().is_err());

        let mut bad = request();
        bad.price = -1;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_phone_visibility_defaults_to_shown() {
        let mut settings = TourDocumentSettings::default();
        assert!(settings.shows_phone("boarding_guide"));
        settings.phone_visibility.insert("boarding_guide".to_string(), false);
        assert!(!settings.shows_phone("boarding_guide"));
        assert!(settings.shows_phone("schedule"));
    }

    #[test]
    fn test_tour_includes_both_end_dates() {
        let now = Utc::now();
        let tour = Tour {
            id: 1,
            title: "제주 골프 3박4일".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 5, 4).unwrap(),
            price: 1_290_000,
            max_participants: None,
            show_staff_info: true,
            document_settings: Json(TourDocumentSettings::default()),
            created_at: now,
            updated_at: now,
        };

        assert!(tour.includes(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()));
        assert!(tour.includes(NaiveDate::from_ymd_opt(2024, 5, 4).unwrap()));
        assert!(!tour.includes(NaiveDate::from_ymd_opt(2024, 4, 30).unwrap()));
        assert!(!tour.includes(NaiveDate::from_ymd_opt(2024, 5, 5).unwrap()));
    }
}
