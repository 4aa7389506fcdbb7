//! Participant roster service
//!
//! Participant CRUD, bulk edits, and the roster spreadsheet contract.
//! Sheets arrive already decoded into rows of cell strings; the first row
//! is the header row.

use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};
use crate::config::RosterConfig;
use crate::database::{DatabaseService, ParticipantRepository, PaymentRepository};
use crate::models::participant::{
    identity_key, Participant, ParticipantStatus, CreateParticipantRequest, UpdateParticipantRequest,
};
use crate::models::roster::{ValidRow, InvalidRow, ImportPreview, ImportResult};
use crate::utils::errors::{TourDeskError, Result};
use crate::utils::helpers::{is_valid_email, non_empty, normalize_phone};
use crate::utils::logging::log_tour_action;

/// Spreadsheet header contract, in export order
pub const ROSTER_HEADERS: [&str; 14] = [
    "이름", "전화번호", "이메일", "팀/동호회", "성별", "탑승지", "참여횟수",
    "그룹인원", "동반자", "일괄결제", "직책", "비상연락처", "상태", "참고사항",
];

const NAME: usize = 0;
const PHONE: usize = 1;
const EMAIL: usize = 2;
const TEAM: usize = 3;
const GENDER: usize = 4;
const PICKUP: usize = 5;
const PARTICIPATION: usize = 6;
const GROUP_SIZE: usize = 7;
const COMPANIONS: usize = 8;
const PAYS_FOR_GROUP: usize = 9;
const ROLE: usize = 10;
const EMERGENCY: usize = 11;
const STATUS: usize = 12;
const NOTE: usize = 13;

/// Column position of every contract header in `header`
pub fn header_positions(header: &[String]) -> Result<[usize; 14]> {
    let index: HashMap<&str, usize> = header.iter()
        .enumerate()
        .map(|(i, h)| (h.trim(), i))
        .collect();

    let missing: Vec<&str> = ROSTER_HEADERS.iter()
        .copied()
        .filter(|h| !index.contains_key(h))
        .collect();
    if !missing.is_empty() {
        return Err(TourDeskError::InvalidInput(format!("Missing roster columns: {}", missing.join(", "))));
    }

    let mut positions = [0usize; 14];
    for (slot, name) in positions.iter_mut().zip(ROSTER_HEADERS) {
        *slot = index[name];
    }
    Ok(positions)
}

/// Split and validate a sheet against the roster contract
///
/// `existing` is the tour's current roster, used for the duplicate check
/// together with rows accepted earlier in the same sheet.
pub fn parse_sheet(
    tour_id: i64,
    rows: &[Vec<String>],
    existing: &[Participant],
    pickup_locations: &[String],
) -> Result<ImportPreview> {
    let (header, data) = rows.split_first()
        .ok_or_else(|| TourDeskError::InvalidInput("Sheet is empty".to_string()))?;
    let positions = header_positions(header)?;

    let mut seen: HashSet<(String, String)> = existing.iter().map(|p| p.identity_key()).collect();
    let mut preview = ImportPreview::default();

    for (offset, row) in data.iter().enumerate() {
        let row_number = offset + 2;
        let cells: Vec<&str> = positions.iter()
            .map(|&i| row.get(i).map(|c| c.trim()).unwrap_or(""))
            .collect();
        if cells.iter().all(|c| c.is_empty()) {
            continue;
        }

        match validate_row(tour_id, &cells, pickup_locations) {
            Ok(participant) => {
                let key = identity_key(&participant.name, participant.phone.as_deref());
                if seen.contains(&key) {
                    preview.invalid.push(InvalidRow {
                        row_number,
                        name: Some(participant.name),
                        errors: vec!["이미 등록된 참가자입니다 (이름+전화번호 중복)".to_string()],
                    });
                } else {
                    seen.insert(key);
                    preview.valid.push(ValidRow { row_number, participant });
                }
            }
            Err(errors) => preview.invalid.push(InvalidRow {
                row_number,
                name: non_empty(cells[NAME]),
                errors,
            }),
        }
    }

    Ok(preview)
}

/// Validate one row, collecting every problem
fn validate_row(tour_id: i64, cells: &[&str], pickup_locations: &[String]) -> std::result::Result<CreateParticipantRequest, Vec<String>> {
    let mut errors = Vec::new();

    let name = non_empty(cells[NAME]);
    if name.is_none() {
        errors.push("이름은 필수입니다".to_string());
    }

    let phone = match non_empty(cells[PHONE]) {
        Some(raw) => match normalize_phone(&raw) {
            Some(phone) => Some(phone),
            None => {
                errors.push(format!("전화번호 형식이 올바르지 않습니다: {}", raw));
                None
            }
        },
        None => None,
    };

    let email = non_empty(cells[EMAIL]);
    let gender = non_empty(cells[GENDER]);
    let pickup_location = non_empty(cells[PICKUP]);

    let participation_count = match non_empty(cells[PARTICIPATION]) {
        None => Some(0),
        Some(raw) => raw.parse::<i32>().ok().filter(|n| *n >= 0).or_else(|| {
            errors.push(format!("참여횟수는 0 이상의 숫자여야 합니다: {}", raw));
            None
        }),
    };

    let group_size = match non_empty(cells[GROUP_SIZE]) {
        None => Some(1),
        Some(raw) => raw.parse::<i32>().ok().filter(|n| *n >= 1).or_else(|| {
            errors.push(format!("그룹인원은 1 이상의 숫자여야 합니다: {}", raw));
            None
        }),
    };

    errors.extend(field_errors(
        &Fields {
            email: email.as_deref(),
            gender: gender.as_deref(),
            pickup_location: pickup_location.as_deref(),
            participation_count: None,
            group_size: None,
        },
        pickup_locations,
    ));

    let is_paying_for_group = match parse_flag(cells[PAYS_FOR_GROUP]) {
        Some(flag) => flag,
        None => {
            errors.push(format!("일괄결제 값이 올바르지 않습니다: {}", cells[PAYS_FOR_GROUP]));
            false
        }
    };

    let status = match non_empty(cells[STATUS]) {
        None => ParticipantStatus::Unconfirmed,
        Some(raw) => raw.parse::<ParticipantStatus>().unwrap_or_else(|_| {
            errors.push(format!("상태는 확정, 미확정, 취소 중 하나여야 합니다: {}", raw));
            ParticipantStatus::Unconfirmed
        }),
    };

    let name = match name {
        Some(name) if errors.is_empty() => name,
        _ => return Err(errors),
    };

    Ok(CreateParticipantRequest {
        tour_id,
        name,
        phone,
        email,
        team: non_empty(cells[TEAM]),
        gender,
        pickup_location,
        participation_count: participation_count.unwrap_or(0),
        group_size: group_size.unwrap_or(1),
        companions: split_companions(cells[COMPANIONS]),
        is_paying_for_group,
        role: non_empty(cells[ROLE]),
        emergency_contact: non_empty(cells[EMERGENCY]),
        status: Some(status),
        note: non_empty(cells[NOTE]),
        tee_time_id: None,
    })
}

/// Field values checked the same way for sheet rows and form input
#[derive(Debug)]
struct Fields<'a> {
    email: Option<&'a str>,
    gender: Option<&'a str>,
    pickup_location: Option<&'a str>,
    participation_count: Option<i32>,
    group_size: Option<i32>,
}

fn field_errors(fields: &Fields<'_>, pickup_locations: &[String]) -> Vec<String> {
    let mut errors = Vec::new();

    if let Some(email) = fields.email {
        if !is_valid_email(email) {
            errors.push(format!("이메일 형식이 올바르지 않습니다: {}", email));
        }
    }
    if let Some(gender) = fields.gender {
        if gender != "남" && gender != "여" {
            errors.push(format!("성별은 남 또는 여 중 하나여야 합니다: {}", gender));
        }
    }
    if let Some(pickup) = fields.pickup_location {
        if !pickup_locations.is_empty() && !pickup_locations.iter().any(|p| p == pickup) {
            errors.push(format!("등록되지 않은 탑승지입니다: {}", pickup));
        }
    }
    if let Some(count) = fields.participation_count.filter(|n| *n < 0) {
        errors.push(format!("참여횟수는 0 이상의 숫자여야 합니다: {}", count));
    }
    if let Some(size) = fields.group_size.filter(|n| *n < 1) {
        errors.push(format!("그룹인원은 1 이상의 숫자여야 합니다: {}", size));
    }

    errors
}

fn reject_errors(errors: Vec<String>) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(TourDeskError::InvalidInput(errors.join("; ")))
    }
}

/// Y/N style cell; blank means no, unknown text is `None`
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim() {
        "" | "N" | "n" | "X" | "x" | "아니오" => Some(false),
        "Y" | "y" | "O" | "o" | "예" => Some(true),
        _ => None,
    }
}

fn split_companions(value: &str) -> Vec<String> {
    value.split(',').filter_map(non_empty).collect()
}

/// Header row plus one row per participant, in the import format
pub fn export_rows(participants: &[Participant]) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(participants.len() + 1);
    rows.push(ROSTER_HEADERS.iter().map(|h| h.to_string()).collect());

    for p in participants {
        rows.push(vec![
            p.name.clone(),
            p.phone.clone().unwrap_or_default(),
            p.email.clone().unwrap_or_default(),
            p.team.clone().unwrap_or_default(),
            p.gender.clone().unwrap_or_default(),
            p.pickup_location.clone().unwrap_or_default(),
            p.participation_count.to_string(),
            p.group_size.to_string(),
            p.companions.join(", "),
            if p.is_paying_for_group { "Y" } else { "N" }.to_string(),
            p.role.clone().unwrap_or_default(),
            p.emergency_contact.clone().unwrap_or_default(),
            p.status().label().to_string(),
            p.note.clone().unwrap_or_default(),
        ]);
    }

    rows
}

/// Roster service
#[derive(Debug, Clone)]
pub struct RosterService {
    db: DatabaseService,
    config: RosterConfig,
}

impl RosterService {
    pub fn new(db: DatabaseService, config: RosterConfig) -> Self {
        Self { db, config }
    }

    pub async fn list(&self, tour_id: i64) -> Result<Vec<Participant>> {
        self.db.participants.list_by_tour(tour_id).await
    }

    /// Add a participant from the form
    pub async fn create(&self, mut request: CreateParticipantRequest) -> Result<Participant> {
        self.db.tours.find_by_id(request.tour_id).await?
            .ok_or(TourDeskError::TourNotFound { tour_id: request.tour_id })?;

        request.name = request.name.trim().to_string();
        if request.name.is_empty() {
            return Err(TourDeskError::InvalidInput("Participant name is required".to_string()));
        }
        if request.tee_time_id.is_some() {
            return Err(TourDeskError::InvalidInput("Use tee time assignment to place participants".to_string()));
        }
        request.phone = normalize_optional_phone(request.phone.as_deref())?;
        for field in [&mut request.email, &mut request.gender, &mut request.pickup_location] {
            *field = field.as_deref().and_then(non_empty);
        }

        reject_errors(field_errors(
            &Fields {
                email: request.email.as_deref(),
                gender: request.gender.as_deref(),
                pickup_location: request.pickup_location.as_deref(),
                participation_count: Some(request.participation_count),
                group_size: Some(request.group_size),
            },
            &self.config.pickup_locations,
        ))?;

        let participant = self.db.participants.create(request).await?;
        log_tour_action(participant.tour_id, "participant_added", Some(&participant.name));
        Ok(participant)
    }

    pub async fn update(&self, participant_id: i64, mut request: UpdateParticipantRequest) -> Result<Participant> {
        if let Some(name) = &request.name {
            if name.trim().is_empty() {
                return Err(TourDeskError::InvalidInput("Participant name is required".to_string()));
            }
        }
        self.check_patch(&mut request)?;

        self.db.participants.update(participant_id, request).await
    }

    /// Remove a participant that no payment refers to
    ///
    /// Payments are the ledger of record, so a participant who paid or was
    /// paid for has to be cancelled instead.
    pub async fn delete(&self, participant_id: i64) -> Result<()> {
        let mut tx = self.db.begin().await?;
        let participant = ParticipantRepository::lock(&mut tx, participant_id).await?;

        let payments = PaymentRepository::count_for_participant(&mut tx, participant_id).await?;
        if payments > 0 {
            return Err(TourDeskError::ParticipantHasPayments { participant_id, payments });
        }

        if !ParticipantRepository::delete(&mut tx, participant_id).await? {
            return Err(TourDeskError::ParticipantNotFound { participant_id });
        }
        tx.commit().await?;

        log_tour_action(participant.tour_id, "participant_removed", Some(&participant.name));
        debug!(participant_id = participant_id, "Participant deleted");
        Ok(())
    }

    /// Set the status of several participants of one tour
    pub async fn bulk_update_status(&self, tour_id: i64, participant_ids: &[i64], status: ParticipantStatus) -> Result<u64> {
        let ids = self.ids_in_tour(tour_id, participant_ids).await?;
        let updated = self.db.participants.update_status_many(&ids, status).await?;
        log_tour_action(tour_id, "bulk_status", Some(&format!("{} -> {}", updated, status)));
        Ok(updated)
    }

    /// Apply the same field patch to several participants of one tour
    pub async fn bulk_update_fields(&self, tour_id: i64, participant_ids: &[i64], mut patch: UpdateParticipantRequest) -> Result<Vec<Participant>> {
        if patch.name.is_some() {
            return Err(TourDeskError::InvalidInput("Names can't be bulk edited".to_string()));
        }
        self.check_patch(&mut patch)?;

        let ids = self.ids_in_tour(tour_id, participant_ids).await?;
        let updated = self.db.participants.update_many(&ids, patch).await?;
        log_tour_action(tour_id, "bulk_update", Some(&updated.len().to_string()));
        Ok(updated)
    }

    /// Validate a sheet without writing anything
    pub async fn preview(&self, tour_id: i64, rows: &[Vec<String>]) -> Result<ImportPreview> {
        self.db.tours.find_by_id(tour_id).await?
            .ok_or(TourDeskError::TourNotFound { tour_id })?;
        let existing = self.db.participants.list_by_tour(tour_id).await?;

        let preview = parse_sheet(tour_id, rows, &existing, &self.config.pickup_locations)?;
        debug!(tour_id = tour_id, valid = preview.valid.len(), invalid = preview.invalid.len(), "Roster sheet parsed");
        Ok(preview)
    }

    /// Insert the valid rows of a sheet, one by one
    pub async fn import(&self, tour_id: i64, rows: &[Vec<String>]) -> Result<ImportResult> {
        let preview = self.preview(tour_id, rows).await?;
        let mut result = ImportResult {
            invalid: preview.invalid,
            ..Default::default()
        };

        for row in preview.valid {
            let name = row.participant.name.clone();
            match self.db.participants.create(row.participant).await {
                Ok(participant) => result.inserted.push(participant),
                Err(e) => {
                    warn!(tour_id = tour_id, row = row.row_number, error = %e, "Roster row insert failed");
                    result.failed.push(InvalidRow {
                        row_number: row.row_number,
                        name: Some(name),
                        errors: vec![e.to_string()],
                    });
                }
            }
        }

        info!(
            tour_id = tour_id,
            inserted = result.inserted.len(),
            invalid = result.invalid.len(),
            failed = result.failed.len(),
            "Roster import finished"
        );
        Ok(result)
    }

    pub async fn export(&self, tour_id: i64) -> Result<Vec<Vec<String>>> {
        let participants = self.db.participants.list_by_tour(tour_id).await?;
        Ok(export_rows(&participants))
    }

    /// Normalize the patched text fields and apply the form rules to them
    ///
    /// A blank string clears the column like an explicit null.
    fn check_patch(&self, patch: &mut UpdateParticipantRequest) -> Result<()> {
        if let Some(phone) = patch.phone.take() {
            patch.phone = Some(normalize_optional_phone(phone.as_deref())?);
        }
        for field in [
            &mut patch.email,
            &mut patch.team,
            &mut patch.gender,
            &mut patch.pickup_location,
            &mut patch.role,
            &mut patch.emergency_contact,
        ] {
            if let Some(value) = field {
                *value = value.as_deref().and_then(non_empty);
            }
        }

        reject_errors(field_errors(
            &Fields {
                email: patched(&patch.email),
                gender: patched(&patch.gender),
                pickup_location: patched(&patch.pickup_location),
                participation_count: patch.participation_count,
                group_size: patch.group_size,
            },
            &self.config.pickup_locations,
        ))
    }

    async fn ids_in_tour(&self, tour_id: i64, participant_ids: &[i64]) -> Result<Vec<i64>> {
        let found = self.db.participants.find_by_ids(participant_ids).await?;
        if let Some(stray) = found.iter().find(|p| p.tour_id != tour_id) {
            return Err(TourDeskError::InvalidInput(format!(
                "Participant {} does not belong to tour {}",
                stray.id, tour_id
            )));
        }
        Ok(found.into_iter().map(|p| p.id).collect())
    }
}

fn patched(field: &Option<Option<String>>) -> Option<&str> {
    field.as_ref().and_then(|value| value.as_deref())
}

fn normalize_optional_phone(phone: Option<&str>) -> Result<Option<String>> {
    match phone.and_then(non_empty) {
        None => Ok(None),
        Some(raw) => normalize_phone(&raw)
            .map(Some)
            .ok_or_else(|| TourDeskError::InvalidInput(format!("Invalid phone number: {}", raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;

    fn header() -> Vec<String> {
        ROSTER_HEADERS.iter().map(|h| h.to_string()).collect()
    }

    fn row(name: &str, phone: &str) -> Vec<String> {
        let mut cells = vec![String::new(); 14];
        cells[NAME] = name.to_string();
        cells[PHONE] = phone.to_string();
        cells
    }

    fn existing(name: &str, phone: &str) -> Participant {
        Participant {
            id: 1,
            tour_id: 1,
            name: name.to_string(),
            phone: Some(phone.to_string()),
            email: None,
            team: None,
            gender: None,
            pickup_location: None,
            participation_count: 0,
            group_size: 1,
            companions: vec![],
            is_paying_for_group: false,
            role: None,
            emergency_contact: None,
            status: "confirmed".to_string(),
            note: None,
            tee_time_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_missing_name_is_rejected() {
        let rows = vec![header(), row("", "010-1111-2222")];
        let preview = parse_sheet(1, &rows, &[], &[]).unwrap();
        assert!(preview.valid.is_empty());
        assert_eq!(preview.invalid[0].row_number, 2);
        assert!(preview.invalid[0].errors[0].contains("이름"));
    }

    #[test]
    fn test_duplicate_of_existing_participant_is_rejected() {
        let rows = vec![header(), row("홍길동", "01012345678")];
        let preview = parse_sheet(1, &rows, &[existing("홍길동", "010-1234-5678")], &[]).unwrap();
        assert!(preview.valid.is_empty());
        assert_eq!(preview.invalid.len(), 1);
    }

    #[test]
    fn test_duplicate_within_sheet_is_rejected() {
        let rows = vec![header(), row("홍길동", "010-1234-5678"), row("홍길동", "010-1234-5678")];
        let preview = parse_sheet(1, &rows, &[], &[]).unwrap();
        assert_eq!(preview.valid.len(), 1);
        assert_eq!(preview.invalid[0].row_number, 3);
    }

    #[test]
    fn test_phone_normalized_and_fields_parsed() {
        let mut r = row("김철수", "01098765432");
        r[GENDER] = "남".to_string();
        r[GROUP_SIZE] = "3".to_string();
        r[COMPANIONS] = "이영희, 박민수".to_string();
        r[PAYS_FOR_GROUP] = "Y".to_string();
        r[STATUS] = "확정".to_string();

        let preview = parse_sheet(9, &[header(), r], &[], &[]).unwrap();
        let p = &preview.valid[0].participant;
        assert_eq!(p.tour_id, 9);
        assert_eq!(p.phone.as_deref(), Some("010-9876-5432"));
        assert_eq!(p.group_size, 3);
        assert_eq!(p.companions, vec!["이영희".to_string(), "박민수".to_string()]);
        assert!(p.is_paying_for_group);
        assert_eq!(p.status, Some(ParticipantStatus::Confirmed));
    }

    #[test]
    fn test_all_errors_of_a_row_are_collected() {
        let mut r = row("김철수", "12345");
        r[GENDER] = "M".to_string();
        r[STATUS] = "maybe".to_string();
        r[GROUP_SIZE] = "0".to_string();

        let preview = parse_sheet(1, &[header(), r], &[], &[]).unwrap();
        assert_eq!(preview.invalid[0].errors.len(), 4);
        assert_eq!(preview.invalid[0].name.as_deref(), Some("김철수"));
    }

    #[test]
    fn test_pickup_location_checked_against_config() {
        let locations = vec!["잠실".to_string(), "양재".to_string()];
        let mut ok = row("가", "");
        ok[PICKUP] = "잠실".to_string();
        let mut bad = row("나", "");
        bad[PICKUP] = "부산".to_string();

        let preview = parse_sheet(1, &[header(), ok, bad], &[], &locations).unwrap();
        assert_eq!(preview.valid.len(), 1);
        assert_eq!(preview.invalid.len(), 1);
    }

    #[test]
    fn test_form_fields_follow_sheet_rules() {
        let locations = vec!["잠실".to_string()];
        let ok = Fields {
            email: Some("kim@example.com"),
            gender: Some("남"),
            pickup_location: Some("잠실"),
            participation_count: Some(3),
            group_size: Some(1),
        };
        assert!(field_errors(&ok, &locations).is_empty());

        let bad = Fields {
            email: Some("kim@"),
            gender: Some("male"),
            pickup_location: Some("부산"),
            participation_count: Some(-1),
            group_size: Some(0),
        };
        assert_eq!(field_errors(&bad, &locations).len(), 5);
        assert_matches!(reject_errors(field_errors(&bad, &[])), Err(TourDeskError::InvalidInput(msg)) if msg.contains("성별"));
    }

    #[test]
    fn test_blank_rows_skipped_and_header_order_free() {
        let mut reordered = header();
        reordered.swap(0, 13);
        let mut r = vec![String::new(); 14];
        r[13] = "최민정".to_string();

        let preview = parse_sheet(1, &[reordered, vec![String::new(); 14], r], &[], &[]).unwrap();
        assert_eq!(preview.valid.len(), 1);
        assert_eq!(preview.valid[0].participant.name, "최민정");
        assert_eq!(preview.valid[0].row_number, 3);
    }

    #[test]
    fn test_missing_header_is_an_error() {
        let mut h = header();
        h.pop();
        assert!(matches!(parse_sheet(1, &[h], &[], &[]), Err(TourDeskError::InvalidInput(_))));
        assert!(parse_sheet(1, &[], &[], &[]).is_err());
    }

    #[test]
    fn test_export_reimports_cleanly() {
        let mut p = existing("홍길동", "010-1234-5678");
        p.companions = vec!["이영희".to_string()];
        p.is_paying_for_group = true;
        p.group_size = 2;

        let rows = export_rows(&[p]);
        assert_eq!(rows[0], header());

        let preview = parse_sheet(1, &rows, &[], &[]).unwrap();
        assert!(preview.invalid.is_empty());
        let back = &preview.valid[0].participant;
        assert_eq!(back.phone.as_deref(), Some("010-1234-5678"));
        assert_eq!(back.companions, vec!["이영희".to_string()]);
        assert!(back.is_paying_for_group);
        assert_eq!(back.status, Some(ParticipantStatus::Confirmed));
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag(""), Some(false));
        assert_eq!(parse_flag("예"), Some(true));
        assert_eq!(parse_flag("O"), Some(true));
        assert_eq!(parse_flag("maybe"), None);
    }
}
