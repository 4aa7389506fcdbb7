//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod tour;
pub mod participant;
pub mod tee_time;
pub mod payment;
pub mod settlement;
pub mod document;
pub mod message;

// Re-export repositories
pub use tour::TourRepository;
pub use participant::ParticipantRepository;
pub use tee_time::TeeTimeRepository;
pub use payment::PaymentRepository;
pub use settlement::SettlementRepository;
pub use document::DocumentRepository;
pub use message::MessageRepository;
