//! Business logic services for the EV Dealer Management Platform

pub mod auth;
pub mod dealer;
pub mod inventory;
pub mod reporting;
pub mod request;
pub mod vehicle;

pub use auth::AuthService;
pub use dealer::DealerService;
pub use inventory::InventoryService;
pub use reporting::ReportingService;
pub use request::RequestService;
pub use vehicle::VehicleService;
