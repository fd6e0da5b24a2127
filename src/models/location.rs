use serde::{Deserialize, Serialize};

/// A site where seats are booked, with resources in descending preference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub preferred_resources: Vec<String>,
}
