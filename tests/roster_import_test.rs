//! Roster spreadsheet import and document links against a real database

mod helpers;

use assert_matches::assert_matches;
use helpers::*;
use serial_test::serial;
use TourDesk::config::{DocumentsConfig, RosterConfig};
use TourDesk::models::{CreateDocumentLinkRequest, DocumentType, ParticipantStatus, UpdateParticipantRequest};
use TourDesk::services::{DocumentService, RosterService, TourService};
use TourDesk::TourDeskError;

fn roster_service(db: &TestDatabase) -> RosterService {
    RosterService::new(db.service(), RosterConfig { pickup_locations: Vec::new() })
}

#[tokio::test]
#[serial]
async fn test_import_splits_valid_and_invalid_rows() {
    let db = test_db_or_skip!();
    let tours = TourService::new(db.service());
    let roster = roster_service(&db);

    let tour = tours.create(tour_request(600_000)).await.unwrap();
    roster
        .create(participant_named(tour.id, "박지영", Some("010-1111-2222")))
        .await
        .unwrap();

    let sheet = vec![
        roster_header(),
        roster_row("이서준", "01033334444"),
        roster_row("박지영", "010-1111-2222"),
        roster_row("", "010-5555-6666"),
        roster_row("최유나", "12345"),
        vec![String::new(); 14],
        roster_row("이서준", "010-3333-4444"),
    ];

    let preview = roster.preview(tour.id, &sheet).await.unwrap();
    assert_eq!(preview.valid.len(), 1);
    assert_eq!(preview.invalid.len(), 4);
    assert_eq!(preview.valid[0].row_number, 2);
    let invalid_rows: Vec<usize> = preview.invalid.iter().map(|r| r.row_number).collect();
    assert_eq!(invalid_rows, vec![3, 4, 5, 7]);

    // Preview writes nothing
    assert_eq!(roster.list(tour.id).await.unwrap().len(), 1);

    let result = roster.import(tour.id, &sheet).await.unwrap();
    assert_eq!(result.inserted.len(), 1);
    assert_eq!(result.inserted[0].phone.as_deref(), Some("010-3333-4444"));
    assert!(result.failed.is_empty());
    assert_eq!(roster.list(tour.id).await.unwrap().len(), 2);

    let exported = roster.export(tour.id).await.unwrap();
    assert_eq!(exported.len(), 3);
    assert_eq!(exported[0], roster_header());
}

#[tokio::test]
#[serial]
async fn test_import_rejects_sheet_without_contract_headers() {
    let db = test_db_or_skip!();
    let tour = TourService::new(db.service()).create(tour_request(600_000)).await.unwrap();

    let sheet = vec![vec!["이름".to_string(), "전화".to_string()], roster_row("김하늘", "010-1234-5678")];
    assert_matches!(
        roster_service(&db).import(tour.id, &sheet).await,
        Err(TourDeskError::InvalidInput(_))
    );
}

#[tokio::test]
#[serial]
async fn test_bulk_status_stays_within_tour() {
    let db = test_db_or_skip!();
    let tours = TourService::new(db.service());
    let roster = roster_service(&db);

    let tour = tours.create(tour_request(600_000)).await.unwrap();
    let other = tours.create(tour_request(600_000)).await.unwrap();
    let a = roster.create(participant_request(tour.id)).await.unwrap();
    let b = roster.create(participant_request(tour.id)).await.unwrap();
    let stray = roster.create(participant_request(other.id)).await.unwrap();

    let updated = roster
        .bulk_update_status(tour.id, &[a.id, b.id], ParticipantStatus::Confirmed)
        .await
        .unwrap();
    assert_eq!(updated, 2);

    assert_matches!(
        roster.bulk_update_status(tour.id, &[a.id, stray.id], ParticipantStatus::Cancelled).await,
        Err(TourDeskError::InvalidInput(_))
    );
    let rows = roster.list(tour.id).await.unwrap();
    assert!(rows.iter().all(|p| p.status() == ParticipantStatus::Confirmed));
}

#[tokio::test]
#[serial]
async fn test_form_create_applies_sheet_field_rules() {
    let db = test_db_or_skip!();
    let tours = TourService::new(db.service());
    let roster = RosterService::new(db.service(), RosterConfig { pickup_locations: vec!["잠실".to_string()] });

    let tour = tours.create(tour_request(600_000)).await.unwrap();

    let mut bad_email = participant_request(tour.id);
    bad_email.email = Some("not-an-email".to_string());
    let mut bad_gender = participant_request(tour.id);
    bad_gender.gender = Some("M".to_string());
    let mut bad_pickup = participant_request(tour.id);
    bad_pickup.pickup_location = Some("부산".to_string());
    let mut bad_count = participant_request(tour.id);
    bad_count.participation_count = -1;

    for request in [bad_email, bad_gender, bad_pickup, bad_count] {
        assert_matches!(roster.create(request).await, Err(TourDeskError::InvalidInput(_)));
    }
    assert_eq!(db.count_rows("participants").await.unwrap(), 0);

    let mut good = participant_request(tour.id);
    good.gender = Some("여".to_string());
    good.pickup_location = Some(" 잠실 ".to_string());
    let created = roster.create(good).await.unwrap();
    assert_eq!(created.pickup_location.as_deref(), Some("잠실"));

    assert_matches!(
        roster
            .update(created.id, UpdateParticipantRequest {
                gender: Some(Some("X".to_string())),
                ..Default::default()
            })
            .await,
        Err(TourDeskError::InvalidInput(_))
    );
}

#[tokio::test]
#[serial]
async fn test_update_clears_nullable_fields_with_null() {
    let db = test_db_or_skip!();
    let tours = TourService::new(db.service());
    let roster = roster_service(&db);

    let tour = tours.create(tour_request(600_000)).await.unwrap();
    let mut request = participant_named(tour.id, "정하늘", Some("010-4444-5555"));
    request.team = Some("분당클럽".to_string());
    let member = roster.create(request).await.unwrap();
    assert!(member.email.is_some());

    let patch: UpdateParticipantRequest =
        serde_json::from_str(r#"{"email": null, "note": "조식 불포함"}"#).unwrap();
    let updated = roster.update(member.id, patch).await.unwrap();
    assert_eq!(updated.email, None);
    assert_eq!(updated.note.as_deref(), Some("조식 불포함"));
    assert_eq!(updated.team.as_deref(), Some("분당클럽"));
    assert_eq!(updated.phone.as_deref(), Some("010-4444-5555"));

    // Absent fields are left alone, blank text clears like null
    let updated = roster
        .update(member.id, UpdateParticipantRequest {
            team: Some(Some("  ".to_string())),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(updated.team, None);
    assert_eq!(updated.note.as_deref(), Some("조식 불포함"));
}

#[tokio::test]
#[serial]
async fn test_document_link_lifecycle() {
    let db = test_db_or_skip!();
    let tour = TourService::new(db.service()).create(tour_request(600_000)).await.unwrap();
    let documents = DocumentService::new(
        db.service(),
        DocumentsConfig {
            public_origin: "https://tour.example.com".to_string(),
            slug_length: 12,
            default_expiry_days: Some(30),
        },
    );

    let created = documents
        .create(tour.id, CreateDocumentLinkRequest {
            document_type: DocumentType::Portal,
            expires_in_days: None,
            settings: None,
        })
        .await
        .unwrap();
    assert_eq!(created.link.slug.len(), 12);
    assert!(created.url.starts_with("https://tour.example.com/portal/"));
    assert!(created.link.expires_at.is_some());
    assert!(!created.link.settings.documents.is_empty());

    let viewed = documents.resolve(&created.link.slug).await.unwrap();
    assert_eq!(viewed.link.view_count, 1);

    documents.set_active(created.link.id, false).await.unwrap();
    assert_matches!(
        documents.resolve(&created.link.slug).await,
        Err(TourDeskError::DocumentInactive)
    );

    documents.delete(created.link.id).await.unwrap();
    assert_matches!(
        documents.resolve(&created.link.slug).await,
        Err(TourDeskError::DocumentNotFound(_))
    );
}
