//! HTTP handlers for the crab farm management API

pub mod advisor;
pub mod auth;
pub mod cage;
pub mod finance;
pub mod harvest;
pub mod health;
pub mod notification;

pub use advisor::*;
pub use auth::*;
pub use cage::*;
pub use finance::*;
pub use harvest::*;
pub use health::*;
pub use notification::*;
