use chrono::NaiveDate;
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::client::BookingApi;
use crate::config::ReservationPlan;
use crate::error::{BookingError, BookingResult};
use crate::models::location::Location;
use crate::models::reservation::{ReservationRequest, ReservationResult};
use crate::services::resolver::{match_preferences, PreferenceResolver, Selection};
use crate::services::time_slots::generate_candidates;

/// Extra resolve-and-reserve rounds allowed after a conflict.
pub const CONFLICT_RETRIES: u32 = 1;

/// Per-location progress: `Pending -> Resolving -> Reserving -> {Reserved | Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationState {
    Pending,
    Resolving,
    Reserving,
    Reserved,
    Failed,
}

impl LocationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LocationState::Reserved | LocationState::Failed)
    }
}

impl fmt::Display for LocationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LocationState::Pending => "PENDING",
            LocationState::Resolving => "RESOLVING",
            LocationState::Reserving => "RESERVING",
            LocationState::Reserved => "RESERVED",
            LocationState::Failed => "FAILED",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationOutcome {
    pub location_id: String,
    pub location_name: String,
    pub state: LocationState,
    pub request: Option<ReservationRequest>,
    pub result: ReservationResult,
}

impl LocationOutcome {
    pub fn is_reserved(&self) -> bool {
        self.state == LocationState::Reserved
    }
}

impl fmt::Display for LocationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.location_name, self.location_id, self.state)?;
        match (&self.request, &self.result.error) {
            (Some(request), None) => write!(
                f,
                " {} ({}) on {} {}",
                request.resource_name, request.resource_id, request.date, request.range
            ),
            (_, Some(reason)) => write!(f, " - {}", reason),
            (None, None) => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub outcomes: Vec<LocationOutcome>,
}

impl RunSummary {
    pub fn reserved_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_reserved()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.reserved_count()
    }

    pub fn log(&self) {
        info!(
            "Run finished: {} reserved, {} failed",
            self.reserved_count(),
            self.failed_count()
        );
        for outcome in &self.outcomes {
            if outcome.is_reserved() {
                info!("{}", outcome);
            } else {
                warn!("{}", outcome);
            }
        }
    }
}

/// Drives one booking run over every configured location, one at a time.
pub struct Orchestrator<'a, A: BookingApi + ?Sized> {
    api: &'a A,
    plan: &'a ReservationPlan,
    date: NaiveDate,
    pause: Duration,
}

impl<'a, A: BookingApi + ?Sized> Orchestrator<'a, A> {
    pub fn new(api: &'a A, plan: &'a ReservationPlan, date: NaiveDate) -> Self {
        Self {
            api,
            plan,
            date,
            pause: plan.pause(),
        }
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Process every location. Only a fatal error (bad credentials) aborts the run.
    pub async fn run(&self) -> BookingResult<RunSummary> {
        let mut summary = RunSummary::default();

        for location in &self.plan.locations {
            match self.process_location(location).await {
                Ok(outcome) => summary.outcomes.push(outcome),
                Err(err) => {
                    // still report what was settled before the abort
                    summary.log();
                    return Err(err);
                }
            }
        }

        summary.log();
        Ok(summary)
    }

    /// Run one location to a terminal state. Non-fatal errors end in `Failed`.
    pub async fn process_location(&self, location: &Location) -> BookingResult<LocationOutcome> {
        let mut state = LocationState::Pending;
        debug!("{} ({}): {}", location.name, location.id, state);

        let mut last_request = None;
        let result = self
            .resolve_and_reserve(location, &mut state, &mut last_request)
            .await;

        let outcome = match result {
            Ok(result) => {
                state = LocationState::Reserved;
                info!("{} ({}): {}", location.name, location.id, state);
                LocationOutcome {
                    location_id: location.id.clone(),
                    location_name: location.name.clone(),
                    state,
                    request: last_request,
                    result,
                }
            }
            Err(err) if err.is_fatal() => {
                error!("{} ({}): aborting run: {}", location.name, location.id, err);
                return Err(err);
            }
            Err(err) => {
                state = LocationState::Failed;
                warn!("{} ({}): {} - {}", location.name, location.id, state, err);
                let resource_id = last_request.as_ref().map(|r| r.resource_id.clone());
                LocationOutcome {
                    location_id: location.id.clone(),
                    location_name: location.name.clone(),
                    state,
                    request: last_request,
                    result: ReservationResult::failed(resource_id, err.to_string()),
                }
            }
        };

        debug_assert!(outcome.state.is_terminal());
        Ok(outcome)
    }

    async fn resolve_and_reserve(
        &self,
        location: &Location,
        state: &mut LocationState,
        last_request: &mut Option<ReservationRequest>,
    ) -> BookingResult<ReservationResult> {
        let mut conflicts = 0;

        loop {
            *state = LocationState::Resolving;
            debug!("{} ({}): {}", location.name, location.id, state);
            let selection = self.resolve(location).await?;

            *state = LocationState::Reserving;
            debug!("{} ({}): {}", location.name, location.id, state);
            let request = self.build_request(location, &selection);
            *last_request = Some(request.clone());

            let attempt = self.api.create_reservation(&request).await;
            self.pause_between_attempts().await;

            match attempt {
                Err(BookingError::Conflict(reason)) if conflicts < CONFLICT_RETRIES => {
                    conflicts += 1;
                    warn!(
                        "{} ({}): {} was taken before commit ({}), resolving again",
                        location.name, location.id, request.resource_id, reason
                    );
                }
                other => return other,
            }
        }
    }

    async fn resolve(&self, location: &Location) -> BookingResult<Selection> {
        let offered = self.api.list_resources(&location.id).await?;
        let preferred = match_preferences(location, &offered);
        if preferred.is_empty() {
            warn!(
                "{} ({}): none of the preferred resources are offered",
                location.name, location.id
            );
            return Err(BookingError::NoAvailability);
        }

        let candidates = generate_candidates(self.date, self.plan.mode, &self.plan.hours);
        PreferenceResolver::new(self.api, self.plan.search_order)
            .resolve(&location.id, &preferred, &candidates)
            .await
    }

    fn build_request(&self, location: &Location, selection: &Selection) -> ReservationRequest {
        ReservationRequest {
            location_id: location.id.clone(),
            resource_id: selection.resource_id.clone(),
            resource_name: selection.resource_name.clone(),
            date: selection.slot.date,
            range: selection.slot.range,
            contact: self.plan.contact.clone(),
        }
    }

    async fn pause_between_attempts(&self) {
        if !self.pause.is_zero() {
            debug!("Pausing {:?} before the next reservation attempt", self.pause);
            tokio::time::sleep(self.pause).await;
        }
    }
}
