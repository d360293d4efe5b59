// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (bearer token, owner checks for mutations)

pub mod protected;
pub mod public;
