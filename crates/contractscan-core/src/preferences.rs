use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_INDUSTRY: &str = "general";
pub const DEFAULT_REGION: &str = "US";

/// Per-user defaults applied when an analysis request omits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    pub user_id: String,
    pub industry: String,
    pub region: String,
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserPreferences {
    pub fn defaults_for(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            industry: DEFAULT_INDUSTRY.to_string(),
            region: DEFAULT_REGION.to_string(),
            updated_at: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePreferences {
    pub industry: Option<String>,
    pub region: Option<String>,
}
