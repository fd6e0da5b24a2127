use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::client::BookingApi;
use crate::error::{BookingError, BookingResult};
use crate::models::reservation::{ReservationRequest, ReservationResult};
use crate::models::resource::{ResourceAvailability, ResourceInfo};
use crate::models::slot::TimeRange;

pub fn range(start_h: u32, start_m: u32, end_h: u32, end_m: u32) -> TimeRange {
    TimeRange::new(
        NaiveTime::from_hms_opt(start_h, start_m, 0).unwrap(),
        NaiveTime::from_hms_opt(end_h, end_m, 0).unwrap(),
    )
}

/// In-memory stand-in for the booking service with scripted answers.
///
/// Availability is the same for every date. A scripted conflict also removes
/// the unit's free ranges, as if someone else had just booked it.
#[derive(Default)]
pub struct FakeBookingApi {
    resources: Mutex<HashMap<String, Vec<ResourceInfo>>>,
    // (location, resource or group) -> units
    availability: Mutex<HashMap<(String, String), Vec<ResourceAvailability>>>,
    listing_errors: Mutex<HashMap<String, BookingError>>,
    availability_errors: Mutex<HashMap<(String, String), BookingError>>,
    reserve_script: Mutex<VecDeque<BookingResult<()>>>,
    resource_queries: Mutex<Vec<String>>,
    availability_queries: Mutex<Vec<(String, String, NaiveDate)>>,
    reservations: Mutex<Vec<ReservationRequest>>,
}

impl FakeBookingApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource as both a listed resource and a bookable unit.
    pub fn with_resource(self, location: &str, resource_id: &str, free: &[TimeRange]) -> Self {
        self.with_group(location, resource_id, resource_id, &[(resource_id, free)])
    }

    /// Register a resource group whose units are returned by availability queries.
    pub fn with_group(
        self,
        location: &str,
        group_id: &str,
        group_name: &str,
        units: &[(&str, &[TimeRange])],
    ) -> Self {
        self.resources
            .lock()
            .unwrap()
            .entry(location.to_string())
            .or_default()
            .push(ResourceInfo {
                resource_id: group_id.to_string(),
                resource_name: group_name.to_string(),
            });

        let units = units
            .iter()
            .map(|(id, free)| ResourceAvailability {
                resource_id: id.to_string(),
                resource_name: format!("Seat {}", id),
                capacity: Some(1),
                free: free.to_vec(),
            })
            .collect();
        self.availability
            .lock()
            .unwrap()
            .insert((location.to_string(), group_id.to_string()), units);
        self
    }

    pub fn with_listing_error(self, location: &str, error: BookingError) -> Self {
        self.listing_errors
            .lock()
            .unwrap()
            .insert(location.to_string(), error);
        self
    }

    pub fn with_availability_error(
        self,
        location: &str,
        resource_id: &str,
        error: BookingError,
    ) -> Self {
        self.availability_errors
            .lock()
            .unwrap()
            .insert((location.to_string(), resource_id.to_string()), error);
        self
    }

    /// Queue the answer for the next reservation; success once the queue is empty.
    pub fn then_reserve(self, result: BookingResult<()>) -> Self {
        self.reserve_script.lock().unwrap().push_back(result);
        self
    }

    pub fn resource_queries(&self) -> Vec<String> {
        self.resource_queries.lock().unwrap().clone()
    }

    pub fn availability_queries(&self) -> Vec<(String, String, NaiveDate)> {
        self.availability_queries.lock().unwrap().clone()
    }

    pub fn reservations(&self) -> Vec<ReservationRequest> {
        self.reservations.lock().unwrap().clone()
    }

    fn take_unit(&self, location: &str, unit_id: &str) {
        let mut availability = self.availability.lock().unwrap();
        for ((loc, _), units) in availability.iter_mut() {
            if loc == location {
                for unit in units.iter_mut().filter(|u| u.resource_id == unit_id) {
                    unit.free.clear();
                }
            }
        }
    }
}

#[async_trait]
impl BookingApi for FakeBookingApi {
    async fn list_resources(&self, location_id: &str) -> BookingResult<Vec<ResourceInfo>> {
        self.resource_queries
            .lock()
            .unwrap()
            .push(location_id.to_string());

        if let Some(err) = self.listing_errors.lock().unwrap().get(location_id) {
            return Err(err.clone());
        }
        Ok(self
            .resources
            .lock()
            .unwrap()
            .get(location_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_availability(
        &self,
        location_id: &str,
        resource_id: &str,
        date: NaiveDate,
    ) -> BookingResult<Vec<ResourceAvailability>> {
        self.availability_queries.lock().unwrap().push((
            location_id.to_string(),
            resource_id.to_string(),
            date,
        ));

        let key = (location_id.to_string(), resource_id.to_string());
        if let Some(err) = self.availability_errors.lock().unwrap().get(&key) {
            return Err(err.clone());
        }
        Ok(self
            .availability
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_reservation(
        &self,
        request: &ReservationRequest,
    ) -> BookingResult<ReservationResult> {
        self.reservations.lock().unwrap().push(request.clone());

        let scripted = self.reserve_script.lock().unwrap().pop_front();
        match scripted {
            Some(Err(err)) => {
                if matches!(err, BookingError::Conflict(_)) {
                    self.take_unit(&request.location_id, &request.resource_id);
                }
                Err(err)
            }
            Some(Ok(())) | None => Ok(ReservationResult::reserved(&request.resource_id, None)),
        }
    }
}
