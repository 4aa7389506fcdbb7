//! Tee time repository implementation

use sqlx::{PgConnection, PgPool};
use chrono::Utc;
use crate::models::tee_time::{TeeTime, CreateTeeTimeRequest};
use crate::utils::errors::TourDeskError;

const TEE_TIME_COLUMNS: &str = "id, tour_id, play_date, course_name, tee_time, max_players, created_at";

#[derive(Debug, Clone)]
pub struct TeeTimeRepository {
    pool: PgPool,
}

impl TeeTimeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new tee time
    pub async fn create(&self, request: CreateTeeTimeRequest) -> Result<TeeTime, TourDeskError> {
        let tee_time = sqlx::query_as::<_, TeeTime>(&format!(
            r#"
            INSERT INTO tee_times (tour_id, play_date, course_name, tee_time, max_players, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {TEE_TIME_COLUMNS}
            "#
        ))
        .bind(request.tour_id)
        .bind(request.play_date)
        .bind(request.course_name.trim())
        .bind(request.tee_time)
        .bind(request.max_players)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(tee_time)
    }

    /// Find tee time by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<TeeTime>, TourDeskError> {
        let tee_time = sqlx::query_as::<_, TeeTime>(&format!(
            "SELECT {TEE_TIME_COLUMNS} FROM tee_times WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tee_time)
    }

    /// Lock a tee time row so occupancy checks and writes are serialized
    pub async fn lock(conn: &mut PgConnection, id: i64) -> Result<TeeTime, TourDeskError> {
        sqlx::query_as::<_, TeeTime>(&format!(
            "SELECT {TEE_TIME_COLUMNS} FROM tee_times WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(TourDeskError::TeeTimeNotFound { tee_time_id: id })
    }

    /// List tee times of a tour ordered by date, then time
    pub async fn list_by_tour(&self, tour_id: i64) -> Result<Vec<TeeTime>, TourDeskError> {
        let tee_times = sqlx::query_as::<_, TeeTime>(&format!(
            "SELECT {TEE_TIME_COLUMNS} FROM tee_times WHERE tour_id = $1 ORDER BY play_date ASC, tee_time ASC, id ASC"
        ))
        .bind(tour_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tee_times)
    }

    /// Occupancy per tee time of a tour
    pub async fn occupancy_by_tour(&self, tour_id: i64) -> Result<Vec<(i64, i64)>, TourDeskError> {
        let rows: Vec<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT t.id, COUNT(p.id)
            FROM tee_times t
            LEFT JOIN participants p ON p.tee_time_id = t.id
            WHERE t.tour_id = $1
            GROUP BY t.id
            "#
        )
        .bind(tour_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Delete tee time; assigned participants are released by the foreign key
    pub async fn delete(&self, id: i64) -> Result<bool, TourDeskError> {
        let result = sqlx::query("DELETE FROM tee_times WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
