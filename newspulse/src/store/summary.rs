use serde::{Deserialize, Serialize};

/// Headline digest shown in the sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsSummary {
    pub items: Vec<String>,
    /// Window the digest covers, e.g. "24 hours"
    pub timeframe: String,
}
