//! Backend model re-exports
//!
//! Domain models live in the shared crate so the wasm bindings and the
//! server agree on wire formats.

pub use shared::models::*;
