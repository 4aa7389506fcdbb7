//! Document link repository implementation

use sqlx::PgPool;
use sqlx::types::Json;
use chrono::{DateTime, Utc};
use crate::models::document::{DocumentLink, DocumentSettings, DocumentType};
use crate::utils::errors::TourDeskError;

const LINK_COLUMNS: &str = "id, tour_id, document_type, slug, is_active, expires_at, view_count, last_viewed_at, settings, created_at";

#[derive(Debug, Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new document link
    pub async fn create(
        &self,
        tour_id: i64,
        document_type: DocumentType,
        slug: &str,
        expires_at: Option<DateTime<Utc>>,
        settings: &DocumentSettings,
    ) -> Result<DocumentLink, TourDeskError> {
        let link = sqlx::query_as::<_, DocumentLink>(&format!(
            r#"
            INSERT INTO document_links (tour_id, document_type, slug, is_active, expires_at, settings, created_at)
            VALUES ($1, $2, $3, TRUE, $4, $5, $6)
            RETURNING {LINK_COLUMNS}
            "#
        ))
        .bind(tour_id)
        .bind(document_type.as_str())
        .bind(slug)
        .bind(expires_at)
        .bind(Json(settings))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(link)
    }

    /// Find link by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<DocumentLink>, TourDeskError> {
        let link = sqlx::query_as::<_, DocumentLink>(&format!(
            "SELECT {LINK_COLUMNS} FROM document_links WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(link)
    }

    /// Find link by public slug
    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<DocumentLink>, TourDeskError> {
        let link = sqlx::query_as::<_, DocumentLink>(&format!(
            "SELECT {LINK_COLUMNS} FROM document_links WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(link)
    }

    /// Links of a tour, newest first
    pub async fn list_by_tour(&self, tour_id: i64) -> Result<Vec<DocumentLink>, TourDeskError> {
        let links = sqlx::query_as::<_, DocumentLink>(&format!(
            "SELECT {LINK_COLUMNS} FROM document_links WHERE tour_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(tour_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(links)
    }

    /// Toggle activation
    pub async fn set_active(&self, id: i64, is_active: bool) -> Result<DocumentLink, TourDeskError> {
        sqlx::query_as::<_, DocumentLink>(&format!(
            "UPDATE document_links SET is_active = $2 WHERE id = $1 RETURNING {LINK_COLUMNS}"
        ))
        .bind(id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| TourDeskError::DocumentNotFound(id.to_string()))
    }

    /// Bump the view counter
    pub async fn record_view(&self, id: i64) -> Result<DocumentLink, TourDeskError> {
        sqlx::query_as::<_, DocumentLink>(&format!(
            "UPDATE document_links SET view_count = view_count + 1, last_viewed_at = $2 WHERE id = $1 RETURNING {LINK_COLUMNS}"
        ))
        .bind(id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| TourDeskError::DocumentNotFound(id.to_string()))
    }

    /// Delete link
    pub async fn delete(&self, id: i64) -> Result<bool, TourDeskError> {
        let result = sqlx::query("DELETE FROM document_links WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
