//! Notification models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The two notification kinds a cage can raise
///
/// A cage holds at most one live notification per kind, so `(cage_id, kind)`
/// is the deduplication key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// The AI flagged abnormal growth in the cage
    Alert,
    /// The cage has reached harvest-ready progress
    Harvest,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Alert => "alert",
            NotificationKind::Harvest => "harvest",
        }
    }
}

impl std::str::FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "alert" => Ok(NotificationKind::Alert),
            "harvest" => Ok(NotificationKind::Harvest),
            other => Err(format!("unknown notification kind: {}", other)),
        }
    }
}

/// An in-app notification derived from cage state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    pub cage_id: String,
    pub kind: NotificationKind,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in [NotificationKind::Alert, NotificationKind::Harvest] {
            assert_eq!(kind.as_str().parse::<NotificationKind>(), Ok(kind));
        }
        assert!("unknown".parse::<NotificationKind>().is_err());
    }
}
