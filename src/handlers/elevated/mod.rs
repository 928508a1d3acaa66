// handlers/elevated/mod.rs - Elevated handlers (super-admin token required)
//
// Security Level: super-admin
// Middleware: middleware::require_super_admin

pub mod admins; // GET|POST /api/admins
pub mod tweets; // DELETE /api/tweets/:id

pub use admins::{admins_get, admins_post};
pub use tweets::tweet_delete;
