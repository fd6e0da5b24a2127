use chrono::{Days, Local, NaiveDate};
use dotenv::dotenv;
use serde::Deserialize;
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::auth::ApiKeyAuth;
use crate::models::location::Location;
use crate::models::reservation::Contact;
use crate::models::slot::{DayHours, SlotMode};
use crate::services::resolver::SearchOrder;

pub const DEFAULT_API_ENDPOINT: &str = "https://reservation.affluences.com/api";
pub const DEFAULT_CONFIG_PATH: &str = "booking.json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Reservations open this many days in advance.
pub const BOOKING_HORIZON_DAYS: u64 = 7;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in environment")]
    MissingVar(&'static str),

    #[error("invalid value for {name}: {reason}")]
    InvalidVar { name: &'static str, reason: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse reservation plan: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid reservation plan: {0}")]
    Invalid(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Connection settings for the booking API, taken from the environment.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub endpoint: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl ApiSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("BOOKING_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingVar("BOOKING_API_KEY"))?;
        ApiKeyAuth::new(&api_key).map_err(|e| ConfigError::InvalidVar {
            name: "BOOKING_API_KEY",
            reason: e.to_string(),
        })?;

        let endpoint = lookup("BOOKING_API_ENDPOINT")
            .unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();

        let timeout_secs = match lookup("BOOKING_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| ConfigError::InvalidVar {
                name: "BOOKING_TIMEOUT_SECS",
                reason: e.to_string(),
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            endpoint,
            api_key,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn default_mode() -> SlotMode {
    SlotMode::FullDay
}

fn default_days_ahead() -> u32 {
    BOOKING_HORIZON_DAYS as u32
}

fn default_pause_secs() -> u64 {
    5
}

/// What to book: who, when, where, in which order.
#[derive(Debug, Clone, Deserialize)]
pub struct ReservationPlan {
    pub contact: Contact,
    #[serde(default = "default_mode")]
    pub mode: SlotMode,
    #[serde(default)]
    pub search_order: SearchOrder,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default = "default_days_ahead")]
    pub days_ahead: u32,
    #[serde(default = "default_pause_secs")]
    pub pause_secs: u64,
    #[serde(default)]
    pub hours: DayHours,
    pub locations: Vec<Location>,
}

impl ReservationPlan {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let plan: ReservationPlan = serde_json::from_str(raw)?;
        plan.validate()?;
        Ok(plan)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        debug!("Loading reservation plan from {}", path.display());
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.contact.email.trim().is_empty() {
            return Err(ConfigError::Invalid("contact email is empty".to_string()));
        }

        let blocks = [("morning", self.hours.morning), ("afternoon", self.hours.afternoon)];
        for (label, range) in blocks {
            if range.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "{} hours {} do not form a range",
                    label, range
                )));
            }
        }

        let mut seen = HashSet::new();
        for location in &self.locations {
            if location.id.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "location '{}' has an empty id",
                    location.name
                )));
            }
            if !seen.insert(location.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "location {} is listed more than once",
                    location.id
                )));
            }
        }

        Ok(())
    }

    /// The date to book, checked against the booking horizon.
    pub fn target_date(&self, today: NaiveDate) -> Result<NaiveDate, ConfigError> {
        let date = match self.date {
            Some(date) => date,
            None => today
                .checked_add_days(Days::new(u64::from(self.days_ahead)))
                .ok_or_else(|| {
                    ConfigError::Invalid(format!(
                        "days_ahead {} is past the end of the calendar",
                        self.days_ahead
                    ))
                })?,
        };

        let horizon = today
            .checked_add_days(Days::new(BOOKING_HORIZON_DAYS))
            .ok_or_else(|| ConfigError::Invalid(format!("no booking window after {}", today)))?;
        if date < today || date > horizon {
            return Err(ConfigError::Invalid(format!(
                "date {} is outside the booking window {}..={}",
                date, today, horizon
            )));
        }
        Ok(date)
    }

    pub fn pause(&self) -> Duration {
        Duration::from_secs(self.pause_secs)
    }
}

/// Everything the run needs, loaded once at startup and read-only afterwards.
#[derive(Debug, Clone)]
pub struct BookingConfig {
    pub api: ApiSettings,
    pub plan: ReservationPlan,
    pub date: NaiveDate,
}

impl BookingConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let api = ApiSettings::from_env()?;
        let plan_path =
            env::var("BOOKING_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let plan = ReservationPlan::from_file(Path::new(&plan_path))?;
        let date = plan.target_date(Local::now().date_naive())?;

        info!(
            "Loaded plan from {}: {} location(s), mode {}, date {}",
            plan_path,
            plan.locations.len(),
            plan.mode,
            date
        );

        Ok(Self { api, plan, date })
    }
}
