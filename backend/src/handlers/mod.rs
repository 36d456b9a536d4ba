//! HTTP handlers for the EV Dealer Management Platform

mod auth;
mod dealer;
mod health;
mod inventory;
mod reporting;
mod request;
mod vehicle;

pub use auth::*;
pub use dealer::*;
pub use health::*;
pub use inventory::*;
pub use reporting::*;
pub use request::*;
pub use vehicle::*;
