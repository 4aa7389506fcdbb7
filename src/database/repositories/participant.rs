//! Participant repository implementation

use sqlx::{PgConnection, PgPool};
use chrono::Utc;
use crate::models::participant::{Participant, ParticipantStatus, CreateParticipantRequest, UpdateParticipantRequest};
use crate::utils::errors::TourDeskError;

const PARTICIPANT_COLUMNS: &str = "id, tour_id, name, phone, email, team, gender, pickup_location, participation_count, group_size, companions, is_paying_for_group, role, emergency_contact, status, note, tee_time_id, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct ParticipantRepository {
    pool: PgPool,
}

impl ParticipantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new participant
    pub async fn create(&self, request: CreateParticipantRequest) -> Result<Participant, TourDeskError> {
        let mut conn = self.pool.acquire().await?;
        Self::insert(&mut conn, request).await
    }

    /// Insert a participant on an existing connection or transaction
    pub async fn insert(conn: &mut PgConnection, request: CreateParticipantRequest) -> Result<Participant, TourDeskError> {
        let now = Utc::now();
        let status = request.status.unwrap_or(ParticipantStatus::Unconfirmed);

        let participant = sqlx::query_as::<_, Participant>(&format!(
            r#"
            INSERT INTO participants (tour_id, name, phone, email, team, gender, pickup_location, participation_count, group_size,
                                      companions, is_paying_for_group, role, emergency_contact, status, note, tee_time_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING {PARTICIPANT_COLUMNS}
            "#
        ))
        .bind(request.tour_id)
        .bind(request.name.trim())
        .bind(request.phone)
        .bind(request.email)
        .bind(request.team)
        .bind(request.gender)
        .bind(request.pickup_location)
        .bind(request.participation_count)
        .bind(request.group_size)
        .bind(request.companions)
        .bind(request.is_paying_for_group)
        .bind(request.role)
        .bind(request.emergency_contact)
        .bind(status.as_str())
        .bind(request.note)
        .bind(request.tee_time_id)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;

        Ok(participant)
    }

    /// Find participant by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Participant>, TourDeskError> {
        let participant = sqlx::query_as::<_, Participant>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(participant)
    }

    /// Lock a participant row for the rest of the transaction
    pub async fn lock(conn: &mut PgConnection, id: i64) -> Result<Participant, TourDeskError> {
        sqlx::query_as::<_, Participant>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(TourDeskError::ParticipantNotFound { participant_id: id })
    }

    /// List participants of a tour in registration order
    pub async fn list_by_tour(&self, tour_id: i64) -> Result<Vec<Participant>, TourDeskError> {
        let participants = sqlx::query_as::<_, Participant>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE tour_id = $1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(tour_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(participants)
    }

    /// Find several participants at once, in id order
    pub async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Participant>, TourDeskError> {
        let participants = sqlx::query_as::<_, Participant>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE id = ANY($1) ORDER BY id ASC"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(participants)
    }

    /// Update participant
    pub async fn update(&self, id: i64, request: UpdateParticipantRequest) -> Result<Participant, TourDeskError> {
        let mut updated = self.update_many(&[id], request).await?;
        updated
            .pop()
            .ok_or(TourDeskError::ParticipantNotFound { participant_id: id })
    }

    /// Apply the same partial update to every listed participant
    ///
    /// Nullable columns bind a "present" flag next to the value so an
    /// explicit null clears the column.
    pub async fn update_many(&self, ids: &[i64], request: UpdateParticipantRequest) -> Result<Vec<Participant>, TourDeskError> {
        let participants = sqlx::query_as::<_, Participant>(&format!(
            r#"
            UPDATE participants
            SET name = COALESCE($2, name),
                phone = CASE WHEN $3 THEN $4 ELSE phone END,
                email = CASE WHEN $5 THEN $6 ELSE email END,
                team = CASE WHEN $7 THEN $8 ELSE team END,
                gender = CASE WHEN $9 THEN $10 ELSE gender END,
                pickup_location = CASE WHEN $11 THEN $12 ELSE pickup_location END,
                participation_count = COALESCE($13, participation_count),
                group_size = COALESCE($14, group_size),
                companions = COALESCE($15, companions),
                is_paying_for_group = COALESCE($16, is_paying_for_group),
                role = CASE WHEN $17 THEN $18 ELSE role END,
                emergency_contact = CASE WHEN $19 THEN $20 ELSE emergency_contact END,
                status = COALESCE($21, status),
                note = CASE WHEN $22 THEN $23 ELSE note END,
                updated_at = $24
            WHERE id = ANY($1)
            RETURNING {PARTICIPANT_COLUMNS}
            "#
        ))
        .bind(ids)
        .bind(request.name)
        .bind(request.phone.is_some())
        .bind(request.phone.flatten())
        .bind(request.email.is_some())
        .bind(request.email.flatten())
        .bind(request.team.is_some())
        .bind(request.team.flatten())
        .bind(request.gender.is_some())
        .bind(request.gender.flatten())
        .bind(request.pickup_location.is_some())
        .bind(request.pickup_location.flatten())
        .bind(request.participation_count)
        .bind(request.group_size)
        .bind(request.companions)
        .bind(request.is_paying_for_group)
        .bind(request.role.is_some())
        .bind(request.role.flatten())
        .bind(request.emergency_contact.is_some())
        .bind(request.emergency_contact.flatten())
        .bind(request.status.map(|s| s.as_str()))
        .bind(request.note.is_some())
        .bind(request.note.flatten())
        .bind(Utc::now())
        .fetch_all(&self.pool)
        .await?;

        Ok(participants)
    }

    /// Set the status of several participants
    pub async fn update_status_many(&self, ids: &[i64], status: ParticipantStatus) -> Result<u64, TourDeskError> {
        let result = sqlx::query("UPDATE participants SET status = $2, updated_at = $3 WHERE id = ANY($1)")
            .bind(ids)
            .bind(status.as_str())
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Point a participant at a tee time (or clear it)
    pub async fn set_tee_time(conn: &mut PgConnection, id: i64, tee_time_id: Option<i64>) -> Result<Participant, TourDeskError> {
        sqlx::query_as::<_, Participant>(&format!(
            "UPDATE participants SET tee_time_id = $2, updated_at = $3 WHERE id = $1 RETURNING {PARTICIPANT_COLUMNS}"
        ))
        .bind(id)
        .bind(tee_time_id)
        .bind(Utc::now())
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(TourDeskError::ParticipantNotFound { participant_id: id })
    }

    /// Count participants assigned to a tee time
    pub async fn count_by_tee_time(conn: &mut PgConnection, tee_time_id: i64) -> Result<i64, TourDeskError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM participants WHERE tee_time_id = $1")
            .bind(tee_time_id)
            .fetch_one(&mut *conn)
            .await?;

        Ok(count.0)
    }

    /// Delete participant
    pub async fn delete(conn: &mut PgConnection, id: i64) -> Result<bool, TourDeskError> {
        let result = sqlx::query("DELETE FROM participants WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Count participants of a tour that are not cancelled
    pub async fn count_active(&self, tour_id: i64) -> Result<i64, TourDeskError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM participants WHERE tour_id = $1 AND status <> 'cancelled'"
        )
        .bind(tour_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }
}
