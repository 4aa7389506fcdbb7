//! Message template and log models

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use crate::utils::errors::TourDeskError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Sms,
    Lms,
    Mms,
    Kakao,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Sms => "sms",
            MessageKind::Lms => "lms",
            MessageKind::Mms => "mms",
            MessageKind::Kakao => "kakao",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageKind {
    type Err = TourDeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sms" => Ok(MessageKind::Sms),
            "lms" => Ok(MessageKind::Lms),
            "mms" => Ok(MessageKind::Mms),
            "kakao" => Ok(MessageKind::Kakao),
            other => Err(TourDeskError::InvalidInput(format!("Unknown message kind: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MessageTemplate {
    pub id: i64,
    pub name: String,
    pub kind: String,
    pub title: Option<String>,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTemplateRequest {
    pub name: String,
    pub kind: MessageKind,
    pub title: Option<String>,
    pub content: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MessageLog {
    pub id: i64,
    pub tour_id: Option<i64>,
    pub template_id: Option<i64>,
    pub recipient_phone: String,
    pub recipient_name: Option<String>,
    pub kind: String,
    pub title: Option<String>,
    pub body: String,
    pub status: String,
    pub cost: i64,
    pub error: Option<String>,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMessageLogRequest {
    pub tour_id: Option<i64>,
    pub template_id: Option<i64>,
    pub recipient_phone: String,
    pub recipient_name: Option<String>,
    pub kind: MessageKind,
    pub title: Option<String>,
    pub body: String,
    pub status: DeliveryStatus,
    pub cost: i64,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Failed,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Sent => "sent",
            DeliveryStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub phone: String,
    pub name: Option<String>,
    /// Per-recipient template variables, applied after the shared ones
    #[serde(default)]
    pub variables: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    /// Forced kind; derived from length and image when absent
    pub kind: Option<MessageKind>,
    pub tour_id: Option<i64>,
    pub template_id: Option<i64>,
    pub recipients: Vec<Recipient>,
    pub title: Option<String>,
    /// Body with `#{var}` placeholders; falls back to the template content
    pub content: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub variables: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewRequest {
    pub content: String,
    pub kind: Option<MessageKind>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub variables: HashMap<String, String>,
    #[serde(default = "default_recipient_count")]
    pub recipient_count: usize,
}

fn default_recipient_count() -> usize {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePreview {
    pub body: String,
    pub bytes: usize,
    pub kind: MessageKind,
    pub unresolved: Vec<String>,
    pub estimated_cost: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendReport {
    pub sent: u32,
    pub failed: u32,
    pub total_cost: i64,
    pub errors: Vec<String>,
}
