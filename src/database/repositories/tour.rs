//! Tour repository implementation

use sqlx::{PgConnection, PgPool};
use sqlx::types::Json;
use chrono::Utc;
use crate::models::tour::{Tour, CreateTourRequest, UpdateTourRequest};
use crate::utils::errors::TourDeskError;

const TOUR_COLUMNS: &str = "id, title, start_date, end_date, price, max_participants, show_staff_info, document_settings, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct TourRepository {
    pool: PgPool,
}

impl TourRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new tour
    pub async fn create(&self, request: CreateTourRequest) -> Result<Tour, TourDeskError> {
        let now = Utc::now();
        let tour = sqlx::query_as::<_, Tour>(&format!(
            r#"
            INSERT INTO tours (title, start_date, end_date, price, max_participants, show_staff_info, document_settings, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {TOUR_COLUMNS}
            "#
        ))
        .bind(request.title.trim())
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.price)
        .bind(request.max_participants)
        .bind(request.show_staff_info)
        .bind(Json(&request.document_settings))
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(tour)
    }

    /// Find tour by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Tour>, TourDeskError> {
        let mut conn = self.pool.acquire().await?;
        Self::find_with(&mut conn, id).await
    }

    /// Find tour by ID on an existing connection or transaction
    pub async fn find_with(conn: &mut PgConnection, id: i64) -> Result<Option<Tour>, TourDeskError> {
        let tour = sqlx::query_as::<_, Tour>(&format!("SELECT {TOUR_COLUMNS} FROM tours WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(tour)
    }

    /// Update tour
    pub async fn update(&self, id: i64, request: UpdateTourRequest) -> Result<Tour, TourDeskError> {
        let tour = sqlx::query_as::<_, Tour>(&format!(
            r#"
            UPDATE tours
            SET title = COALESCE($2, title),
                start_date = COALESCE($3, start_date),
                end_date = COALESCE($4, end_date),
                price = COALESCE($5, price),
                max_participants = COALESCE($6, max_participants),
                show_staff_info = COALESCE($7, show_staff_info),
                document_settings = COALESCE($8, document_settings),
                updated_at = $9
            WHERE id = $1
            RETURNING {TOUR_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(request.title)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.price)
        .bind(request.max_participants)
        .bind(request.show_staff_info)
        .bind(request.document_settings.map(Json))
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(TourDeskError::TourNotFound { tour_id: id })?;

        Ok(tour)
    }

    /// Delete tour
    pub async fn delete(&self, id: i64) -> Result<bool, TourDeskError> {
        let result = sqlx::query("DELETE FROM tours WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List tours, latest start date first
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Tour>, TourDeskError> {
        let tours = sqlx::query_as::<_, Tour>(&format!(
            "SELECT {TOUR_COLUMNS} FROM tours ORDER BY start_date DESC, id DESC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(tours)
    }

    /// Count total tours
    pub async fn count(&self) -> Result<i64, TourDeskError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tours")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
