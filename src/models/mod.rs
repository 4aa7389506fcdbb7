//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod tour;
pub mod participant;
pub mod tee_time;
pub mod payment;
pub mod settlement;
pub mod document;
pub mod message;
pub mod roster;

// Re-export commonly used models
pub use tour::{Tour, TourDocumentSettings, CreateTourRequest, UpdateTourRequest};
pub use participant::{Participant, ParticipantStatus, CreateParticipantRequest, UpdateParticipantRequest, BulkStatusRequest, BulkUpdateRequest};
pub use tee_time::{TeeTime, TeeTimeSlot, TeeTimeDay, CreateTeeTimeRequest, Placement, AssignmentFailure, AssignmentReport};
pub use payment::{Payment, PaymentStatus, PaymentType, PaymentMethod, CreatePaymentRequest, GroupPaymentMode, GroupPaymentRequest, GroupPaymentReceipt, ParticipantBalance};
pub use settlement::{Expense, ExpenseCategory, CreateExpenseRequest, Settlement, SettlementFigures};
pub use document::{DocumentLink, DocumentType, DocumentSettings, ContactVisibility, PortalTheme, Audience, CreateDocumentLinkRequest, DocumentLinkView};
pub use message::{MessageKind, MessageTemplate, MessageLog, Recipient, SendMessageRequest, MessagePreview, SendReport};
pub use roster::{RosterSheet, ValidRow, InvalidRow, ImportPreview, ImportResult};
