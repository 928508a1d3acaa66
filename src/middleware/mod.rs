pub mod auth;
pub mod response;

pub use auth::{require_standard, require_super_admin};
pub use response::{ApiResponse, ApiResult};
