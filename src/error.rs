use thiserror::Error;

/// Errors raised while talking to the booking API or resolving a reservation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    #[error("authentication rejected by booking API (status {status})")]
    Auth { status: u16 },

    #[error("network error: {0}")]
    Network(String),

    #[error("slot no longer available: {0}")]
    Conflict(String),

    #[error("no preferred resource is free in any candidate slot")]
    NoAvailability,

    #[error("unexpected response status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("could not decode booking API response: {0}")]
    Decode(String),
}

impl BookingError {
    /// Fatal errors abort the whole run instead of failing a single location.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BookingError::Auth { .. })
    }
}

impl From<reqwest::Error> for BookingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BookingError::Decode(err.to_string())
        } else {
            BookingError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BookingError {
    fn from(err: serde_json::Error) -> Self {
        BookingError::Decode(err.to_string())
    }
}

pub type BookingResult<T> = Result<T, BookingError>;
