use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::slot::TimeRange;

/// Contact details sent with every reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// A reservation ready to submit. Only built once the slot is known to be free.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationRequest {
    pub location_id: String,
    pub resource_id: String,
    pub resource_name: String,
    pub date: NaiveDate,
    pub range: TimeRange,
    pub contact: Contact,
}

impl ReservationRequest {
    pub fn payload(&self) -> ReservePayload {
        ReservePayload {
            auth_type: None,
            date: self.date.format("%Y-%m-%d").to_string(),
            email: self.contact.email.clone(),
            start_time: self.range.start.format("%H:%M:%S").to_string(),
            end_time: self.range.end.format("%H:%M:%S").to_string(),
            note: None,
            user_firstname: self.contact.first_name.clone(),
            user_lastname: self.contact.last_name.clone(),
            user_phone: self.contact.phone_number.clone(),
            person_count: 1,
        }
    }
}

// Body of `POST /reserve/{resource_id}`
#[derive(Debug, Serialize)]
pub struct ReservePayload {
    pub auth_type: Option<String>,
    pub date: String,
    pub email: String,
    pub start_time: String,
    pub end_time: String,
    pub note: Option<String>,
    pub user_firstname: Option<String>,
    pub user_lastname: Option<String>,
    pub user_phone: Option<String>,
    pub person_count: u32,
}

/// Outcome reported by the booking API for a submitted reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationResult {
    pub success: bool,
    pub resource_id: Option<String>,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl ReservationResult {
    pub fn reserved(resource_id: &str, message: Option<String>) -> Self {
        Self {
            success: true,
            resource_id: Some(resource_id.to_string()),
            message,
            error: None,
        }
    }

    pub fn failed(resource_id: Option<String>, error: String) -> Self {
        Self {
            success: false,
            resource_id,
            message: None,
            error: Some(error),
        }
    }
}
