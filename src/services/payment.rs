//! Payment service
//!
//! Records payments against the tour price. Every write runs in a
//! transaction that locks the participant rows involved before summing
//! their counted payments, so concurrent inserts can't push a participant
//! past the price.

use std::collections::HashSet;
use chrono::Utc;
use sqlx::PgConnection;
use tracing::{debug, info};
use uuid::Uuid;
use crate::database::{DatabaseService, ParticipantRepository, PaymentRepository, TourRepository};
use crate::models::participant::Participant;
use crate::models::payment::{
    Payment, PaymentStatus, CreatePaymentRequest, NewPayment, GroupPaymentMode, GroupPaymentRequest,
    GroupPaymentReceipt, ParticipantBalance,
};
use crate::models::tour::Tour;
use crate::utils::errors::{TourDeskError, Result};
use crate::utils::helpers::append_note;
use crate::utils::logging::log_payment;

/// Sum of payments that count toward the price
pub fn counted_total(payments: &[Payment]) -> i64 {
    payments.iter()
        .filter(|p| p.status().is_counted())
        .map(|p| p.amount)
        .sum()
}

/// Reject a payment that would push the counted total past the price
pub fn check_payment_cap(price: i64, already_paid: i64, attempted: i64) -> Result<()> {
    if attempted <= 0 {
        return Err(TourDeskError::InvalidInput("Payment amount must be positive".to_string()));
    }
    if already_paid + attempted > price {
        return Err(TourDeskError::PriceExceeded { price, already_paid, attempted });
    }
    Ok(())
}

pub fn balance(participant_id: i64, price: i64, payments: &[Payment]) -> ParticipantBalance {
    let paid = counted_total(payments);
    ParticipantBalance {
        participant_id,
        price,
        paid,
        remaining: (price - paid).max(0),
        fully_paid: paid >= price,
    }
}

/// Per-participant amounts of a group payment
///
/// `Split` divides evenly and hands the remainder out one unit at a time to
/// the first rows, so the parts always sum to `amount`.
pub fn group_amounts(amount: i64, count: usize, mode: GroupPaymentMode) -> Vec<i64> {
    if count == 0 {
        return Vec::new();
    }
    match mode {
        GroupPaymentMode::Each => vec![amount; count],
        GroupPaymentMode::Split => {
            let n = count as i64;
            let base = amount / n;
            let remainder = (amount % n) as usize;
            (0..count)
                .map(|i| if i < remainder { base + 1 } else { base })
                .collect()
        }
    }
}

/// Allowed status moves for refund and cancellation
pub fn check_transition(from: PaymentStatus, to: PaymentStatus) -> Result<()> {
    let allowed = match to {
        PaymentStatus::Refunded => matches!(from, PaymentStatus::Completed | PaymentStatus::Pending),
        PaymentStatus::Cancelled => from == PaymentStatus::Pending,
        PaymentStatus::Completed => from == PaymentStatus::Pending,
        PaymentStatus::Pending => false,
    };

    if !allowed {
        return Err(TourDeskError::InvalidStateTransition {
            from: from.to_string(),
            to: to.to_string(),
        });
    }
    Ok(())
}

/// Payment service
#[derive(Debug, Clone)]
pub struct PaymentService {
    db: DatabaseService,
}

impl PaymentService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    /// Record a single payment
    pub async fn record_payment(&self, tour_id: i64, request: CreatePaymentRequest) -> Result<Payment> {
        let mut tx = self.db.begin().await?;
        let tour = load_tour(&mut tx, tour_id).await?;

        let payer_id = request.payer_id.unwrap_or(request.participant_id);
        let locked = lock_participants(&mut tx, &[request.participant_id, payer_id]).await?;
        ensure_same_tour(&locked, tour_id)?;

        let status = request.status.unwrap_or(PaymentStatus::Completed);
        if status.is_counted() {
            let existing = PaymentRepository::list_by_participant(&mut tx, request.participant_id).await?;
            check_payment_cap(tour.price, counted_total(&existing), request.amount)?;
        } else if request.amount <= 0 {
            return Err(TourDeskError::InvalidInput("Payment amount must be positive".to_string()));
        }

        let payment = PaymentRepository::insert(&mut tx, NewPayment {
            tour_id,
            participant_id: request.participant_id,
            payer_id,
            amount: request.amount,
            method: request.method,
            payment_type: request.payment_type,
            status,
            is_group_payment: false,
            batch_id: None,
            note: request.note,
            paid_at: request.paid_at.unwrap_or_else(Utc::now),
        }).await?;
        tx.commit().await?;

        log_payment(payment.participant_id, "record", payment.amount, Some(payment.payment_type.as_str()));
        Ok(payment)
    }

    /// Record one payer's amount across several participants
    ///
    /// All rows are written in one transaction under a shared batch id;
    /// if any participant would exceed the price nothing is written.
    pub async fn record_group_payment(&self, tour_id: i64, request: GroupPaymentRequest) -> Result<GroupPaymentReceipt> {
        let mut seen = HashSet::new();
        let participant_ids: Vec<i64> = request.participant_ids.iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();
        if participant_ids.is_empty() {
            return Err(TourDeskError::InvalidInput("No participants selected".to_string()));
        }
        if request.amount <= 0 {
            return Err(TourDeskError::InvalidInput("Payment amount must be positive".to_string()));
        }

        let amounts = group_amounts(request.amount, participant_ids.len(), request.mode);
        if amounts.iter().any(|a| *a <= 0) {
            return Err(TourDeskError::InvalidInput(format!(
                "Amount {} cannot be split across {} participants",
                request.amount,
                participant_ids.len()
            )));
        }

        let mut tx = self.db.begin().await?;
        let tour = load_tour(&mut tx, tour_id).await?;

        let mut to_lock = participant_ids.clone();
        to_lock.push(request.payer_id);
        let locked = lock_participants(&mut tx, &to_lock).await?;
        ensure_same_tour(&locked, tour_id)?;

        let batch_id = Uuid::new_v4();
        let paid_at = Utc::now();
        let mut payments = Vec::with_capacity(participant_ids.len());

        for (participant_id, amount) in participant_ids.iter().copied().zip(amounts) {
            let existing = PaymentRepository::list_by_participant(&mut tx, participant_id).await?;
            check_payment_cap(tour.price, counted_total(&existing), amount)?;

            let payment = PaymentRepository::insert(&mut tx, NewPayment {
                tour_id,
                participant_id,
                payer_id: request.payer_id,
                amount,
                method: request.method,
                payment_type: request.payment_type,
                status: PaymentStatus::Completed,
                is_group_payment: true,
                batch_id: Some(batch_id),
                note: request.note.clone(),
                paid_at,
            }).await?;
            payments.push(payment);
        }
        tx.commit().await?;

        let total = payments.iter().map(|p| p.amount).sum();
        info!(
            batch_id = %batch_id,
            payer_id = request.payer_id,
            participants = payments.len(),
            total = total,
            "Group payment recorded"
        );

        Ok(GroupPaymentReceipt { batch_id, payments, total })
    }

    /// Rows of one group payment
    pub async fn group_payments(&self, batch_id: Uuid) -> Result<GroupPaymentReceipt> {
        let payments = self.db.payments.list_by_batch(batch_id).await?;
        if payments.is_empty() {
            return Err(TourDeskError::InvalidInput(format!("Unknown payment batch: {}", batch_id)));
        }
        let total = payments.iter().map(|p| p.amount).sum();
        Ok(GroupPaymentReceipt { batch_id, payments, total })
    }

    /// Mark a payment refunded and note the reason
    pub async fn refund(&self, payment_id: i64, reason: Option<&str>) -> Result<Payment> {
        let mut tx = self.db.begin().await?;
        let payment = PaymentRepository::lock(&mut tx, payment_id).await?;
        check_transition(payment.status(), PaymentStatus::Refunded)?;

        let line = match reason.map(str::trim).filter(|r| !r.is_empty()) {
            Some(reason) => format!("[환불] {}", reason),
            None => "[환불]".to_string(),
        };
        let note = append_note(payment.note.as_deref(), &line);

        let refunded = PaymentRepository::update_status(&mut tx, payment_id, PaymentStatus::Refunded, Some(note)).await?;
        tx.commit().await?;

        log_payment(refunded.participant_id, "refund", refunded.amount, reason);
        Ok(refunded)
    }

    /// Cancel a pending payment
    pub async fn cancel(&self, payment_id: i64) -> Result<Payment> {
        let mut tx = self.db.begin().await?;
        let payment = PaymentRepository::lock(&mut tx, payment_id).await?;
        check_transition(payment.status(), PaymentStatus::Cancelled)?;

        let cancelled = PaymentRepository::update_status(&mut tx, payment_id, PaymentStatus::Cancelled, payment.note).await?;
        tx.commit().await?;

        log_payment(cancelled.participant_id, "cancel", cancelled.amount, None);
        Ok(cancelled)
    }

    /// Price, paid and remaining amount for a participant
    pub async fn balance(&self, participant_id: i64) -> Result<ParticipantBalance> {
        let participant = self.db.participants.find_by_id(participant_id).await?
            .ok_or(TourDeskError::ParticipantNotFound { participant_id })?;
        let tour = self.db.tours.find_by_id(participant.tour_id).await?
            .ok_or(TourDeskError::TourNotFound { tour_id: participant.tour_id })?;

        let mut conn = self.db.pool().acquire().await?;
        let payments = PaymentRepository::list_by_participant(&mut conn, participant_id).await?;

        debug!(participant_id = participant_id, payments = payments.len(), "Balance computed");
        Ok(balance(participant_id, tour.price, &payments))
    }

    pub async fn list(&self, tour_id: i64) -> Result<Vec<Payment>> {
        self.db.payments.list_by_tour(tour_id).await
    }
}

async fn load_tour(conn: &mut PgConnection, tour_id: i64) -> Result<Tour> {
    TourRepository::find_with(conn, tour_id).await?
        .ok_or(TourDeskError::TourNotFound { tour_id })
}

/// Lock participant rows in ascending id order
async fn lock_participants(conn: &mut PgConnection, ids: &[i64]) -> Result<Vec<Participant>> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();

    let mut locked = Vec::with_capacity(ids.len());
    for id in ids {
        locked.push(ParticipantRepository::lock(conn, id).await?);
    }
    Ok(locked)
}

fn ensure_same_tour(participants: &[Participant], tour_id: i64) -> Result<()> {
    match participants.iter().find(|p| p.tour_id != tour_id) {
        Some(p) => Err(TourDeskError::InvalidInput(format!(
            "Participant {} does not belong to tour {}",
            p.id, tour_id
        ))),
        None => Ok(()),
    }
}
