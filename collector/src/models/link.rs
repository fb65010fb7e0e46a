//! Screen to source-file links

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of `POST /v1/link-code`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkCodeIn {
    pub screen: String,
    pub source: String,
}

/// Stored mapping, one per screen
#[derive(Debug, Clone, Serialize)]
pub struct ScreenLink {
    pub screen: String,
    pub source: String,
    pub updated_at: DateTime<Utc>,
}
