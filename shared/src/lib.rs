//! Shared types and models for the Crab Farm Management Platform
//!
//! This crate contains types shared between the backend, frontend (via WASM),
//! and other components of the system.

pub mod finance;
pub mod format;
pub mod lifecycle;
pub mod models;
pub mod types;
pub mod validation;

pub use finance::*;
pub use format::*;
pub use lifecycle::*;
pub use models::*;
pub use types::*;
pub use validation::*;
