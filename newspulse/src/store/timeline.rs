use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    /// Display label, e.g. "2:00 PM EST" or "Yesterday"
    pub time: String,
    pub description: String,
    pub sources: u32,
}

/// A developing story, newest event first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    pub id: String,
    pub title: String,
    pub events: Vec<TimelineEvent>,
}

impl TimelineEvent {
    pub fn new(time: &str, description: &str, sources: u32) -> Self {
        Self {
            time: time.to_string(),
            description: description.to_string(),
            sources,
        }
    }
}
