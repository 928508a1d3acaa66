// handlers/protected/mod.rs - Protected handlers (any valid token)
//
// Security Level: standard role or above
// Middleware: middleware::require_standard (inserts the verified Claims)

pub mod tweets; // POST /api/tweets
pub mod whoami; // GET /api/admins/me

pub use tweets::tweet_post;
pub use whoami::whoami_get;
