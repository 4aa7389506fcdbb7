//! Test data helpers
//!
//! Builders for requests and roster sheets, with `fake` filling the
//! fields a test doesn't care about.

use chrono::{NaiveDate, NaiveTime};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use TourDesk::models::{
    CreateParticipantRequest, CreatePaymentRequest, CreateTeeTimeRequest, CreateTourRequest,
    PaymentMethod, PaymentType, TourDocumentSettings,
};
use TourDesk::services::ROSTER_HEADERS;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).expect("valid test time")
}

/// Three-day tour starting 2024-05-01
pub fn tour_request(price: i64) -> CreateTourRequest {
    CreateTourRequest {
        title: format!("제주 골프 투어 {}", (1000..9999).fake::<u32>()),
        start_date: date(2024, 5, 1),
        end_date: date(2024, 5, 3),
        price,
        max_participants: Some(40),
        show_staff_info: true,
        document_settings: TourDocumentSettings::default(),
    }
}

/// Mobile number unique enough for one test run
pub fn fake_phone() -> String {
    format!("010-{:04}-{:04}", (1000..9999).fake::<u32>(), (1000..9999).fake::<u32>())
}

pub fn participant_request(tour_id: i64) -> CreateParticipantRequest {
    participant_named(tour_id, &Name().fake::<String>(), Some(&fake_phone()))
}

pub fn participant_named(tour_id: i64, name: &str, phone: Option<&str>) -> CreateParticipantRequest {
    CreateParticipantRequest {
        tour_id,
        name: name.to_string(),
        phone: phone.map(str::to_string),
        email: Some(SafeEmail().fake()),
        team: None,
        gender: None,
        pickup_location: None,
        participation_count: 0,
        group_size: 1,
        companions: Vec::new(),
        is_paying_for_group: false,
        role: None,
        emergency_contact: None,
        status: None,
        note: None,
        tee_time_id: None,
    }
}

pub fn tee_time_request(tour_id: i64, play_date: NaiveDate, tee_time: NaiveTime, max_players: i32) -> CreateTeeTimeRequest {
    CreateTeeTimeRequest {
        tour_id,
        play_date,
        course_name: "핀크스 GC".to_string(),
        tee_time,
        max_players,
    }
}

pub fn payment_request(participant_id: i64, amount: i64) -> CreatePaymentRequest {
    CreatePaymentRequest {
        participant_id,
        payer_id: None,
        amount,
        method: PaymentMethod::Transfer,
        payment_type: PaymentType::Deposit,
        status: None,
        note: None,
        paid_at: None,
    }
}

pub fn roster_header() -> Vec<String> {
    ROSTER_HEADERS.iter().map(|h| h.to_string()).collect()
}

/// One roster row with the given name and phone; other columns blank
pub fn roster_row(name: &str, phone: &str) -> Vec<String> {
    let mut row = vec![String::new(); ROSTER_HEADERS.len()];
    row[0] = name.to_string();
    row[1] = phone.to_string();
    row
}
