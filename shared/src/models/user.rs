//! User account models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Language;

/// A user account on the platform
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub preferred_language: Language,
    pub created_at: DateTime<Utc>,
}
