//! Document link and portal service

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};
use crate::config::DocumentsConfig;
use crate::database::DatabaseService;
use crate::models::document::{
    DocumentLink, DocumentLinkView, DocumentSettings, DocumentType, ContactVisibility, CreateDocumentLinkRequest,
};
use crate::models::tour::Tour;
use crate::utils::errors::{TourDeskError, Result};
use crate::utils::helpers::generate_random_string;
use crate::utils::logging::log_tour_action;

/// Documents listed on a portal when none were picked
const DEFAULT_PORTAL_DOCUMENTS: [DocumentType; 4] = [
    DocumentType::CustomerSchedule,
    DocumentType::BoardingGuide,
    DocumentType::RoomAssignment,
    DocumentType::TeeTimeSheet,
];

/// Expiry timestamp for a new link
///
/// A positive requested day count wins, then a positive configured default;
/// otherwise the link never expires. A day count past the calendar range
/// is rejected.
pub fn compute_expiry(now: DateTime<Utc>, requested_days: Option<i64>, default_days: Option<i64>) -> Result<Option<DateTime<Utc>>> {
    let Some(days) = requested_days.filter(|d| *d > 0).or(default_days.filter(|d| *d > 0)) else {
        return Ok(None);
    };

    Duration::try_days(days)
        .and_then(|span| now.checked_add_signed(span))
        .map(Some)
        .ok_or_else(|| TourDeskError::InvalidInput(format!("Expiry of {} days is out of range", days)))
}

pub fn public_url(origin: &str, document_type: DocumentType, slug: &str) -> String {
    format!("{}/{}/{}", origin.trim_end_matches('/'), document_type.url_prefix(), slug)
}

/// Settings for a new link, filling gaps from the tour
pub fn effective_settings(tour: &Tour, document_type: DocumentType, requested: Option<DocumentSettings>) -> DocumentSettings {
    let mut settings = requested.unwrap_or_else(|| DocumentSettings {
        contact_visibility: ContactVisibility::all(tour.document_settings.shows_phone(document_type.as_str())),
        ..Default::default()
    });

    if document_type == DocumentType::Portal {
        settings.documents.retain(|d| *d != DocumentType::Portal);
        if settings.documents.is_empty() {
            settings.documents = DEFAULT_PORTAL_DOCUMENTS.to_vec();
        }
    } else {
        settings.documents.clear();
    }
    settings
}

/// Reject links that can't be served
pub fn check_servable(link: &DocumentLink, now: DateTime<Utc>) -> Result<()> {
    if !link.is_active {
        return Err(TourDeskError::DocumentInactive);
    }
    if link.is_expired(now) {
        return Err(TourDeskError::DocumentExpired);
    }
    Ok(())
}

/// Document link service
#[derive(Debug, Clone)]
pub struct DocumentService {
    db: DatabaseService,
    config: DocumentsConfig,
}

impl DocumentService {
    pub fn new(db: DatabaseService, config: DocumentsConfig) -> Self {
        Self { db, config }
    }

    fn view(&self, link: DocumentLink) -> DocumentLinkView {
        let url = match link.document_type.parse::<DocumentType>() {
            Ok(document_type) => public_url(&self.config.public_origin, document_type, &link.slug),
            Err(_) => format!("{}/s/{}", self.config.public_origin.trim_end_matches('/'), link.slug),
        };
        DocumentLinkView { link, url }
    }

    /// Create a shareable link for a tour document
    pub async fn create(&self, tour_id: i64, request: CreateDocumentLinkRequest) -> Result<DocumentLinkView> {
        let tour = self.db.tours.find_by_id(tour_id).await?
            .ok_or(TourDeskError::TourNotFound { tour_id })?;

        let settings = effective_settings(&tour, request.document_type, request.settings);
        let expires_at = compute_expiry(Utc::now(), request.expires_in_days, self.config.default_expiry_days)?;
        let slug = generate_random_string(self.config.slug_length);

        let link = self.db.documents
            .create(tour_id, request.document_type, &slug, expires_at, &settings)
            .await?;

        log_tour_action(tour_id, "document_link_created", Some(request.document_type.as_str()));
        Ok(self.view(link))
    }

    pub async fn list(&self, tour_id: i64) -> Result<Vec<DocumentLinkView>> {
        let links = self.db.documents.list_by_tour(tour_id).await?;
        Ok(links.into_iter().map(|l| self.view(l)).collect())
    }

    pub async fn set_active(&self, link_id: i64, is_active: bool) -> Result<DocumentLinkView> {
        self.db.documents.find_by_id(link_id).await?
            .ok_or_else(|| TourDeskError::DocumentNotFound(link_id.to_string()))?;

        let link = self.db.documents.set_active(link_id, is_active).await?;
        info!(link_id = link_id, is_active = is_active, "Document link toggled");
        Ok(self.view(link))
    }

    pub async fn delete(&self, link_id: i64) -> Result<()> {
        if !self.db.documents.delete(link_id).await? {
            return Err(TourDeskError::DocumentNotFound(link_id.to_string()));
        }
        Ok(())
    }

    /// Look up a public slug and count the view
    pub async fn resolve(&self, slug: &str) -> Result<DocumentLinkView> {
        let link = self.db.documents.find_by_slug(slug).await?
            .ok_or_else(|| TourDeskError::DocumentNotFound(slug.to_string()))?;
        check_servable(&link, Utc::now())?;

        let link = self.db.documents.record_view(link.id).await?;
        debug!(slug = slug, views = link.view_count, "Document link viewed");
        Ok(self.view(link))
    }
}
