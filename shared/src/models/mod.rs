//! Domain models for the Crab Farm Management Platform

mod advisor;
mod cage;
mod harvest;
mod log;
mod notification;
mod user;

pub use advisor::*;
pub use cage::*;
pub use harvest::*;
pub use log::*;
pub use notification::*;
pub use user::*;
