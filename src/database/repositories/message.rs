//! Message template and log repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::message::{MessageTemplate, CreateTemplateRequest, MessageLog, CreateMessageLogRequest};
use crate::utils::errors::TourDeskError;

const TEMPLATE_COLUMNS: &str = "id, name, kind, title, content, image_url, created_at, updated_at";
const LOG_COLUMNS: &str = "id, tour_id, template_id, recipient_phone, recipient_name, kind, title, body, status, cost, error, sent_at";

#[derive(Debug, Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new template
    pub async fn create_template(&self, request: CreateTemplateRequest) -> Result<MessageTemplate, TourDeskError> {
        let now = Utc::now();
        let template = sqlx::query_as::<_, MessageTemplate>(&format!(
            r#"
            INSERT INTO message_templates (name, kind, title, content, image_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {TEMPLATE_COLUMNS}
            "#
        ))
        .bind(request.name.trim())
        .bind(request.kind.as_str())
        .bind(request.title)
        .bind(request.content)
        .bind(request.image_url)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(template)
    }

    /// Find template by ID
    pub async fn find_template(&self, id: i64) -> Result<Option<MessageTemplate>, TourDeskError> {
        let template = sqlx::query_as::<_, MessageTemplate>(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM message_templates WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(template)
    }

    /// All templates by name
    pub async fn list_templates(&self) -> Result<Vec<MessageTemplate>, TourDeskError> {
        let templates = sqlx::query_as::<_, MessageTemplate>(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM message_templates ORDER BY name ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(templates)
    }

    /// Record one delivery attempt
    pub async fn insert_log(&self, request: CreateMessageLogRequest) -> Result<MessageLog, TourDeskError> {
        let log = sqlx::query_as::<_, MessageLog>(&format!(
            r#"
            INSERT INTO message_logs (tour_id, template_id, recipient_phone, recipient_name, kind, title, body, status, cost, error, sent_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {LOG_COLUMNS}
            "#
        ))
        .bind(request.tour_id)
        .bind(request.template_id)
        .bind(request.recipient_phone)
        .bind(request.recipient_name)
        .bind(request.kind.as_str())
        .bind(request.title)
        .bind(request.body)
        .bind(request.status.as_str())
        .bind(request.cost)
        .bind(request.error)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(log)
    }

    /// Recent delivery logs, optionally for one tour
    pub async fn list_logs(&self, tour_id: Option<i64>, limit: i64) -> Result<Vec<MessageLog>, TourDeskError> {
        let logs = sqlx::query_as::<_, MessageLog>(&format!(
            "SELECT {LOG_COLUMNS} FROM message_logs WHERE ($1::BIGINT IS NULL OR tour_id = $1) ORDER BY sent_at DESC, id DESC LIMIT $2"
        ))
        .bind(tour_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(logs)
    }
}
