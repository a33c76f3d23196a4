pub mod auth;
pub mod error_handler;
pub mod request_id;

pub use auth::{AdminUser, AuthSettings, AuthenticatedUser, Role};
pub use error_handler::{json_config, query_config};
pub use request_id::{CorrelationId, RequestId};
