//! Database service layer
//!
//! This module bundles the repositories behind one cloneable handle

use sqlx::{Postgres, Transaction};
use crate::database::{DatabasePool, TourRepository, ParticipantRepository, TeeTimeRepository, PaymentRepository, SettlementRepository, DocumentRepository, MessageRepository};
use crate::utils::errors::TourDeskError;

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pool: DatabasePool,
    pub tours: TourRepository,
    pub participants: ParticipantRepository,
    pub tee_times: TeeTimeRepository,
    pub payments: PaymentRepository,
    pub settlements: SettlementRepository,
    pub documents: DocumentRepository,
    pub messages: MessageRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            tours: TourRepository::new(pool.clone()),
            participants: ParticipantRepository::new(pool.clone()),
            tee_times: TeeTimeRepository::new(pool.clone()),
            payments: PaymentRepository::new(pool.clone()),
            settlements: SettlementRepository::new(pool.clone()),
            documents: DocumentRepository::new(pool.clone()),
            messages: MessageRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    /// Start a transaction for multi-statement invariants
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, TourDeskError> {
        Ok(self.pool.begin().await?)
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<(), TourDeskError> {
        super::connection::health_check(&self.pool).await
    }
}
