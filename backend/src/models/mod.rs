//! Database models for the EV Dealer Management Platform
//!
//! Re-exports models from the shared crate

pub use shared::models::*;
