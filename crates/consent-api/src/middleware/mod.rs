pub mod cors;
pub mod error_handler;
pub mod headers;
pub mod logging;
pub mod request_id;

pub use cors::setup_cors;
pub use error_handler::ErrorHandler;
pub use headers::{ClientId, OrgId};
pub use logging::logging_middleware;
pub use request_id::RequestId;