//! Library Seat Booker
//!
//! Books seats in libraries served by the Affluences reservation API, picking
//! resources from a static, ordered list of preferences.
//!
//! # Modules
//!
//! - `client`: `BookingApi` trait and the `AffluencesClient` HTTP implementation
//! - `auth`: API key and User-Agent headers
//! - `config`: environment and JSON plan loading
//! - `services`: slot generation, availability merging, preference resolution
//!   and the per-location orchestrator
//!
//! # Flow
//!
//! For each location the orchestrator generates candidate slots, asks the
//! resolver for the first free (resource, slot) pair in preference order,
//! then submits a single reservation. A conflict on submit triggers one
//! fresh resolution; any other failure is logged and the run moves on.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;

pub mod models {
    pub mod location;
    pub mod reservation;
    pub mod resource;
    pub mod slot;
}

pub mod services {
    pub mod availability;
    pub mod orchestrator;
    pub mod resolver;
    pub mod time_slots;

    mod orchestrator_test;
    mod resolver_test;
    mod time_slots_test;
}

#[cfg(test)]
mod client_mock;

// Re-export the main API types for ease of use
pub use client::{AffluencesClient, BookingApi};
pub use config::{BookingConfig, ConfigError};
pub use error::{BookingError, BookingResult};
pub use services::orchestrator::{LocationOutcome, LocationState, Orchestrator, RunSummary};
