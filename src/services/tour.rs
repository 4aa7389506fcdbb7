//! Tour service implementation

use tracing::{debug, info};
use crate::database::DatabaseService;
use crate::models::tour::{Tour, CreateTourRequest, UpdateTourRequest};
use crate::utils::errors::{TourDeskError, Result};
use crate::utils::logging::log_tour_action;

/// Tour service for managing tour records
#[derive(Debug, Clone)]
pub struct TourService {
    db: DatabaseService,
}

impl TourService {
    /// Create a new TourService instance
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    /// Create a tour
    pub async fn create(&self, request: CreateTourRequest) -> Result<Tour> {
        request.validate()?;
        let tour = self.db.tours.create(request).await?;
        log_tour_action(tour.id, "created", Some(&tour.title));
        Ok(tour)
    }

    pub async fn get(&self, tour_id: i64) -> Result<Tour> {
        self.db.tours.find_by_id(tour_id).await?
            .ok_or(TourDeskError::TourNotFound { tour_id })
    }

    /// Tours, newest first
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Tour>> {
        debug!(limit = limit, offset = offset, "Listing tours");
        self.db.tours.list(limit.clamp(1, 200), offset.max(0)).await
    }

    /// Apply a partial update
    pub async fn update(&self, tour_id: i64, request: UpdateTourRequest) -> Result<Tour> {
        let tour = self.get(tour_id).await?;
        request.validate_against(&tour)?;

        let updated = self.db.tours.update(tour_id, request).await?;
        info!(tour_id = tour_id, "Tour updated");
        Ok(updated)
    }

    pub async fn delete(&self, tour_id: i64) -> Result<()> {
        if !self.db.tours.delete(tour_id).await? {
            return Err(TourDeskError::TourNotFound { tour_id });
        }
        log_tour_action(tour_id, "deleted", None);
        Ok(())
    }
}
