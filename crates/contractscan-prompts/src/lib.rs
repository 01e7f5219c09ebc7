pub mod analyze;
pub mod compare;
pub mod generate;
pub mod industry;
pub mod templates;

use serde::{Deserialize, Serialize};

pub use analyze::AnalysisContext;

/// A system message plus the user message sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// Normalise an industry key: "Web Development" and "web-development" both
/// become "web_development".
pub fn industry_key(industry: &str) -> String {
    industry
        .trim()
        .to_ascii_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// Normalise a region code: trimmed and upper-cased.
pub fn region_key(region: &str) -> String {
    region.trim().to_ascii_uppercase()
}
