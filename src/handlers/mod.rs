// handlers/mod.rs - 3-tier handler architecture
//
// Public (no token) → Protected (any valid token) → Elevated (super-admin token)
//
// The gate for each tier is applied in app::router with route_layer, so
// handlers below the public tier can rely on `Extension<Claims>` being present.
pub mod public;    // Tier 1: login and every tweet read
pub mod protected; // Tier 2: standard role and above
pub mod elevated;  // Tier 3: super-admin only
