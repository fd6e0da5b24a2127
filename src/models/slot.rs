use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-open range of wall-clock time within a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl TimeRange {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// True when `other` lies entirely inside this range.
    pub fn contains(&self, other: &TimeRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

/// Shape of the reservation the user wants for the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlotMode {
    FullDay,
    HalfDayMorning,
    HalfDayAfternoon,
}

impl SlotMode {
    /// Concrete ranges for this mode, highest priority first.
    pub fn ranges(&self, hours: &DayHours) -> Vec<TimeRange> {
        match self {
            SlotMode::FullDay => vec![hours.full_day(), hours.morning, hours.afternoon],
            SlotMode::HalfDayMorning => vec![hours.morning],
            SlotMode::HalfDayAfternoon => vec![hours.afternoon],
        }
    }
}

impl fmt::Display for SlotMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SlotMode::FullDay => "full-day",
            SlotMode::HalfDayMorning => "half-day-morning",
            SlotMode::HalfDayAfternoon => "half-day-afternoon",
        };
        f.write_str(label)
    }
}

/// Opening hours split into the two half-day blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHours {
    pub morning: TimeRange,
    pub afternoon: TimeRange,
}

impl DayHours {
    pub fn full_day(&self) -> TimeRange {
        TimeRange::new(self.morning.start, self.afternoon.end)
    }
}

impl Default for DayHours {
    fn default() -> Self {
        let at = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap_or(NaiveTime::MIN);
        Self {
            morning: TimeRange::new(at(8), at(12)),
            afternoon: TimeRange::new(at(14), at(18)),
        }
    }
}

/// A concrete time range on a given date that the resolver will try to book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateSlot {
    pub date: NaiveDate,
    pub range: TimeRange,
}

impl fmt::Display for CandidateSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.range)
    }
}

/// Serde helpers for "HH:MM" (seconds optional) wall-clock times.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(value: &str) -> Result<NaiveTime, chrono::ParseError> {
        NaiveTime::parse_from_str(value, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
    }

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_contains_is_inclusive_of_bounds() {
        let free = TimeRange::new(t(8, 0), t(12, 0));
        assert!(free.contains(&TimeRange::new(t(8, 0), t(12, 0))));
        assert!(free.contains(&TimeRange::new(t(9, 0), t(11, 30))));
        assert!(!free.contains(&TimeRange::new(t(7, 30), t(12, 0))));
        assert!(!free.contains(&TimeRange::new(t(8, 0), t(12, 30))));
    }

    #[test]
    fn test_time_range_from_json() {
        let range: TimeRange =
            serde_json::from_str(r#"{"start":"08:00","end":"12:30:00"}"#).unwrap();
        assert_eq!(range, TimeRange::new(t(8, 0), t(12, 30)));
        assert_eq!(range.to_string(), "08:00-12:30");
    }

    #[test]
    fn test_slot_mode_names() {
        let mode: SlotMode = serde_json::from_str(r#""half-day-afternoon""#).unwrap();
        assert_eq!(mode, SlotMode::HalfDayAfternoon);
        assert_eq!(SlotMode::FullDay.to_string(), "full-day");
    }
}
