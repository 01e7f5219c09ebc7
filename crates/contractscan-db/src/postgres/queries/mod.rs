pub mod api_keys;
pub mod comparisons;
pub mod contracts;
pub mod preferences;
