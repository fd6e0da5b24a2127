use chrono::NaiveDate;
use tracing::debug;

use crate::models::slot::{CandidateSlot, DayHours, SlotMode};

/// Candidate slots for `date` under `mode`, highest priority first.
///
/// A full day is attempted whole before falling back to its two halves.
/// Pure and deterministic: the same inputs always give the same list.
pub fn generate_candidates(
    date: NaiveDate,
    mode: SlotMode,
    hours: &DayHours,
) -> Vec<CandidateSlot> {
    let candidates: Vec<CandidateSlot> = mode
        .ranges(hours)
        .into_iter()
        .filter(|range| !range.is_empty())
        .map(|range| CandidateSlot { date, range })
        .collect();

    debug!(
        "Generated {} candidate slot(s) for {} in mode {}",
        candidates.len(),
        date,
        mode
    );
    candidates
}
