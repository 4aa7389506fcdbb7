//! Roster spreadsheet models

use serde::{Deserialize, Serialize};
use crate::models::participant::{Participant, CreateParticipantRequest};

/// A decoded worksheet: the header row followed by data rows
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterSheet {
    pub rows: Vec<Vec<String>>,
}

/// A row that passed validation, ready for insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidRow {
    /// 1-based sheet row number, the header being row 1
    pub row_number: usize,
    pub participant: CreateParticipantRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidRow {
    pub row_number: usize,
    pub name: Option<String>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportPreview {
    pub valid: Vec<ValidRow>,
    pub invalid: Vec<InvalidRow>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportResult {
    pub inserted: Vec<Participant>,
    pub invalid: Vec<InvalidRow>,
    /// Valid rows whose insert failed
    pub failed: Vec<InvalidRow>,
}
