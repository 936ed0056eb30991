//! External API integrations

pub mod advisor;

pub use advisor::GeminiClient;
