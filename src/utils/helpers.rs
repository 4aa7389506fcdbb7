//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

/// Alphabet used for public document slugs
pub const SLUG_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ\
                                  abcdefghijklmnopqrstuvwxyz\
                                  0123456789";

fn mobile_phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(01[016789])-?(\d{3,4})-?(\d{4})$").expect("valid phone regex")
    })
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex")
    })
}

/// Format a date the way the back office shows it (2024.05.01)
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y.%m.%d").to_string()
}

/// Format an amount in won with thousands separators
pub fn format_won(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-{}원", grouped)
    } else {
        format!("{}원", grouped)
    }
}

/// Normalize a mobile number to the dashed form, e.g. 010-1234-5678
pub fn normalize_phone(phone: &str) -> Option<String> {
    let caps = mobile_phone_regex().captures(phone.trim())?;
    Some(format!("{}-{}-{}", &caps[1], &caps[2], &caps[3]))
}

/// Validate email format
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email.trim())
}

/// Generate a random alphanumeric string
pub fn generate_random_string(length: usize) -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();

    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..SLUG_CHARSET.len());
            SLUG_CHARSET[idx] as char
        })
        .collect()
}

/// Trim a cell value, mapping blank strings to None
pub fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Append a line to an optional free-text note
pub fn append_note(note: Option<&str>, line: &str) -> String {
    match note.map(str::trim).filter(|n| !n.is_empty()) {
        Some(existing) => format!("{}\n{}", existing, line),
        None => line.to_string(),
    }
}
