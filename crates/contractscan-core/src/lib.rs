pub mod analysis;
pub mod api_key;
pub mod comparison;
pub mod contract;
pub mod error;
pub mod generation;
pub mod preferences;
pub mod severity;

pub use analysis::ContractAnalysis;
pub use comparison::{Comparison, ContractComparison};
pub use contract::{Contract, ContractIssue, ContractSource};
pub use error::CoreError;
pub use generation::ContractRequirements;
pub use preferences::UserPreferences;
pub use severity::{ContractType, IssueType, Severity};
