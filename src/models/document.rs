//! Document link / portal model

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use sqlx::types::Json;
use crate::utils::errors::TourDeskError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentLink {
    pub id: i64,
    pub tour_id: i64,
    pub document_type: String,
    pub slug: String,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub view_count: i64,
    pub last_viewed_at: Option<DateTime<Utc>>,
    pub settings: Json<DocumentSettings>,
    pub created_at: DateTime<Utc>,
}

impl DocumentLink {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(expires) if expires <= now)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Portal,
    Survey,
    CustomerSchedule,
    StaffSchedule,
    BoardingGuide,
    RoomAssignment,
    TeeTimeSheet,
    Simplified,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Portal => "portal",
            DocumentType::Survey => "survey",
            DocumentType::CustomerSchedule => "customer_schedule",
            DocumentType::StaffSchedule => "staff_schedule",
            DocumentType::BoardingGuide => "boarding_guide",
            DocumentType::RoomAssignment => "room_assignment",
            DocumentType::TeeTimeSheet => "tee_time_sheet",
            DocumentType::Simplified => "simplified",
        }
    }

    /// Path segment of the public URL
    pub fn url_prefix(&self) -> &'static str {
        match self {
            DocumentType::Portal => "portal",
            DocumentType::Survey => "q",
            _ => "s",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = TourDeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = match s {
            "portal" => DocumentType::Portal,
            "survey" => DocumentType::Survey,
            "customer_schedule" => DocumentType::CustomerSchedule,
            "staff_schedule" => DocumentType::StaffSchedule,
            "boarding_guide" => DocumentType::BoardingGuide,
            "room_assignment" => DocumentType::RoomAssignment,
            "tee_time_sheet" => DocumentType::TeeTimeSheet,
            "simplified" => DocumentType::Simplified,
            other => {
                return Err(TourDeskError::InvalidInput(format!("Unknown document type: {}", other)))
            }
        };
        Ok(parsed)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortalTheme {
    #[default]
    Blue,
    Green,
    Purple,
    Dark,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    #[default]
    Customer,
    Staff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactVisibility {
    pub show_manager_phone: bool,
    pub show_driver_phone: bool,
    pub show_guide_phone: bool,
}

impl ContactVisibility {
    pub fn all(visible: bool) -> Self {
        Self {
            show_manager_phone: visible,
            show_driver_phone: visible,
            show_guide_phone: visible,
        }
    }
}

impl Default for ContactVisibility {
    fn default() -> Self {
        Self::all(true)
    }
}

/// Free-form settings blob stored with each link
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentSettings {
    #[serde(default)]
    pub theme: PortalTheme,
    #[serde(default)]
    pub contact_visibility: ContactVisibility,
    #[serde(default)]
    pub audience: Audience,
    /// Documents listed on a portal page; empty for single documents
    #[serde(default)]
    pub documents: Vec<DocumentType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocumentLinkRequest {
    pub document_type: DocumentType,
    /// Days until expiry; zero or absent means the configured default
    pub expires_in_days: Option<i64>,
    pub settings: Option<DocumentSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

/// A link plus its public URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentLinkView {
    #[serde(flatten)]
    pub link: DocumentLink,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_prefixes() {
        assert_eq!(DocumentType::Portal.url_prefix(), "portal");
        assert_eq!(DocumentType::Survey.url_prefix(), "q");
        assert_eq!(DocumentType::BoardingGuide.url_prefix(), "s");
        assert_eq!(DocumentType::TeeTimeSheet.url_prefix(), "s");
    }

    #[test]
    fn test_settings_blob_tolerates_missing_fields() {
        let settings: DocumentSettings = serde_json::from_str(r#"{"theme":"dark"}"#).unwrap();
        assert_eq!(settings.theme, PortalTheme::Dark);
        assert_eq!(settings.audience, Audience::Customer);
        assert!(settings.contact_visibility.show_guide_phone);
        assert!(settings.documents.is_empty());
    }
}
