mod http;
mod local;
mod traits;

pub use http::HttpService;
pub use local::{LocalService, DEFAULT_USER};
pub use traits::{ContractService, ServiceError};
