//! Payment repository implementation

use sqlx::{PgConnection, PgPool};
use chrono::Utc;
use uuid::Uuid;
use crate::models::payment::{Payment, PaymentStatus, NewPayment};
use crate::utils::errors::TourDeskError;

const PAYMENT_COLUMNS: &str = "id, tour_id, participant_id, payer_id, amount, method, payment_type, status, is_group_payment, batch_id, note, paid_at, created_at";

#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a payment on an existing connection or transaction
    pub async fn insert(conn: &mut PgConnection, payment: NewPayment) -> Result<Payment, TourDeskError> {
        let row = sqlx::query_as::<_, Payment>(&format!(
            r#"
            INSERT INTO payments (tour_id, participant_id, payer_id, amount, method, payment_type, status,
                                  is_group_payment, batch_id, note, paid_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(payment.tour_id)
        .bind(payment.participant_id)
        .bind(payment.payer_id)
        .bind(payment.amount)
        .bind(payment.method.as_str())
        .bind(payment.payment_type.as_str())
        .bind(payment.status.as_str())
        .bind(payment.is_group_payment)
        .bind(payment.batch_id)
        .bind(payment.note)
        .bind(payment.paid_at)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;

        Ok(row)
    }

    /// Find payment by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Payment>, TourDeskError> {
        let payment = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payment)
    }

    /// Lock a payment row for a status transition
    pub async fn lock(conn: &mut PgConnection, id: i64) -> Result<Payment, TourDeskError> {
        sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(TourDeskError::PaymentNotFound { payment_id: id })
    }

    /// Payments naming the participant as payee or payer, in any status
    pub async fn count_for_participant(conn: &mut PgConnection, participant_id: i64) -> Result<i64, TourDeskError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM payments WHERE participant_id = $1 OR payer_id = $1"
        )
        .bind(participant_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(count.0)
    }

    /// Payments recorded against a participant
    pub async fn list_by_participant(conn: &mut PgConnection, participant_id: i64) -> Result<Vec<Payment>, TourDeskError> {
        let payments = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE participant_id = $1 ORDER BY paid_at ASC, id ASC"
        ))
        .bind(participant_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(payments)
    }

    /// Payments of a tour, newest first
    pub async fn list_by_tour(&self, tour_id: i64) -> Result<Vec<Payment>, TourDeskError> {
        let payments = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE tour_id = $1 ORDER BY paid_at DESC, id DESC"
        ))
        .bind(tour_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Payments sharing a group batch id
    pub async fn list_by_batch(&self, batch_id: Uuid) -> Result<Vec<Payment>, TourDeskError> {
        let payments = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE batch_id = $1 ORDER BY id ASC"
        ))
        .bind(batch_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Change status and replace the note
    pub async fn update_status(conn: &mut PgConnection, id: i64, status: PaymentStatus, note: Option<String>) -> Result<Payment, TourDeskError> {
        sqlx::query_as::<_, Payment>(&format!(
            "UPDATE payments SET status = $2, note = $3 WHERE id = $1 RETURNING {PAYMENT_COLUMNS}"
        ))
        .bind(id)
        .bind(status.as_str())
        .bind(note)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(TourDeskError::PaymentNotFound { payment_id: id })
    }
}
