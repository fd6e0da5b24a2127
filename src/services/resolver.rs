use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::client::BookingApi;
use crate::error::{BookingError, BookingResult};
use crate::models::location::Location;
use crate::models::resource::{ResourceAvailability, ResourceInfo};
use crate::models::slot::CandidateSlot;

/// Which preference dominates when both cannot be satisfied at once.
///
/// `ResourceFirst` walks preferred resources in the outer loop and candidate
/// slots in the inner loop, so a preferred resource in a fallback slot beats a
/// less preferred resource in the ideal slot. `SlotFirst` is the reverse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchOrder {
    #[default]
    ResourceFirst,
    SlotFirst,
}

/// The chosen bookable unit and slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Preferred resource (or group) the unit was found under
    pub preferred_id: String,
    pub resource_id: String,
    pub resource_name: String,
    pub slot: CandidateSlot,
}

/// Resolve a location's preference list against the resources the site offers.
///
/// Entries match on id or, case-insensitively, on display name. Preference
/// order is kept and entries matching nothing are dropped.
pub fn match_preferences(location: &Location, resources: &[ResourceInfo]) -> Vec<ResourceInfo> {
    let mut matched: Vec<ResourceInfo> = Vec::new();

    for preferred in &location.preferred_resources {
        let wanted = preferred.trim();
        let found = resources.iter().find(|r| {
            r.resource_id == wanted || r.resource_name.trim().eq_ignore_ascii_case(wanted)
        });

        match found {
            Some(resource) if matched.iter().any(|m| m.resource_id == resource.resource_id) => {
                debug!("Preference '{}' repeats {}, skipping", wanted, resource.resource_id);
            }
            Some(resource) => matched.push(resource.clone()),
            None => warn!(
                "Preferred resource '{}' not offered by {} ({})",
                wanted, location.name, location.id
            ),
        }
    }

    matched
}

pub struct PreferenceResolver<'a, A: BookingApi + ?Sized> {
    api: &'a A,
    order: SearchOrder,
}

impl<'a, A: BookingApi + ?Sized> PreferenceResolver<'a, A> {
    pub fn new(api: &'a A, order: SearchOrder) -> Self {
        Self { api, order }
    }

    /// First (unit, slot) pair in search order whose slot lies inside a free range.
    pub async fn resolve(
        &self,
        location_id: &str,
        preferred: &[ResourceInfo],
        candidates: &[CandidateSlot],
    ) -> BookingResult<Selection> {
        let pairs: Vec<(&ResourceInfo, &CandidateSlot)> = match self.order {
            SearchOrder::ResourceFirst => preferred
                .iter()
                .flat_map(|r| candidates.iter().map(move |s| (r, s)))
                .collect(),
            SearchOrder::SlotFirst => candidates
                .iter()
                .flat_map(|s| preferred.iter().map(move |r| (r, s)))
                .collect(),
        };

        let mut availability: HashMap<(String, NaiveDate), Vec<ResourceAvailability>> =
            HashMap::new();

        for (resource, slot) in pairs {
            let units = match availability.entry((resource.resource_id.clone(), slot.date)) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    let fetched = self
                        .api
                        .list_availability(location_id, &resource.resource_id, slot.date)
                        .await?;
                    entry.insert(fetched)
                }
            };

            let free_unit = units
                .iter()
                .find(|unit| unit.free.iter().any(|range| range.contains(&slot.range)));

            match free_unit {
                Some(unit) => {
                    info!(
                        "Found {} ({}) under {} free for {}",
                        unit.resource_name, unit.resource_id, resource.resource_name, slot
                    );
                    return Ok(Selection {
                        preferred_id: resource.resource_id.clone(),
                        resource_id: unit.resource_id.clone(),
                        resource_name: unit.resource_name.clone(),
                        slot: *slot,
                    });
                }
                None => debug!("{} has nothing free for {}", resource.resource_name, slot),
            }
        }

        Err(BookingError::NoAvailability)
    }
}
