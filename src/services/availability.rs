use chrono::{Duration, NaiveTime};
use tracing::debug;

use crate::error::{BookingError, BookingResult};
use crate::models::resource::{AvailableResource, HourEntry, ResourceAvailability};
use crate::models::slot::{hhmm, TimeRange};

/// Width of one entry in the API's hourly grid.
pub const SLOT_GRANULARITY_MINUTES: i64 = 30;

/// Merge consecutive available grid entries into free ranges.
///
/// Each available entry covers `[hour, hour + 30min)`. Entries are expected in
/// ascending order; a gap of more than one step starts a new range.
pub fn free_ranges(hours: &[HourEntry]) -> BookingResult<Vec<TimeRange>> {
    let step = Duration::minutes(SLOT_GRANULARITY_MINUTES);
    let mut ranges: Vec<TimeRange> = Vec::new();

    for entry in hours.iter().filter(|entry| entry.is_available()) {
        let start = hhmm::parse(&entry.hour).map_err(|e| {
            BookingError::Decode(format!("invalid hour '{}': {}", entry.hour, e))
        })?;
        let end = step_end(start, step);

        match ranges.last_mut() {
            Some(last) if last.end == start => last.end = end,
            _ => ranges.push(TimeRange::new(start, end)),
        }
    }

    Ok(ranges)
}

// The last grid entry of the day would wrap past midnight
fn step_end(start: NaiveTime, step: Duration) -> NaiveTime {
    let (end, wrapped) = start.overflowing_add_signed(step);
    if wrapped != 0 {
        NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(end)
    } else {
        end
    }
}

pub fn to_availability(resource: AvailableResource) -> BookingResult<ResourceAvailability> {
    let free = free_ranges(&resource.hours)?;
    debug!(
        "Resource {} ({}) has {} free range(s)",
        resource.resource_name,
        resource.resource_id,
        free.len()
    );

    Ok(ResourceAvailability {
        resource_id: resource.resource_id,
        resource_name: resource.resource_name,
        capacity: resource.capacity,
        free,
    })
}
