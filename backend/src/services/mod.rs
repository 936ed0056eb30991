//! Business logic services for the crab farm management system

pub mod advisor;
pub mod auth;
pub mod cage;
pub mod finance;
pub mod harvest;
pub mod notification;

pub use advisor::AdvisorService;
pub use auth::AuthService;
pub use cage::CageService;
pub use finance::FinanceService;
pub use harvest::HarvestService;
pub use notification::NotificationService;
