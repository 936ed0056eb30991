//! Cage history log entries

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Classification of a log entry, used for filtering and icon display
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LogEntryType {
    Creation,
    Update,
    Feeding,
    Medicine,
    Death,
    Note,
    Harvest,
}

impl LogEntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogEntryType::Creation => "creation",
            LogEntryType::Update => "update",
            LogEntryType::Feeding => "feeding",
            LogEntryType::Medicine => "medicine",
            LogEntryType::Death => "death",
            LogEntryType::Note => "note",
            LogEntryType::Harvest => "harvest",
        }
    }
}

/// Structured payload of a log entry
///
/// Each event kind carries exactly the fields that are meaningful for it,
/// so a death entry cannot hold feed data and vice versa.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogMeta {
    Creation {
        initial_weight_g: i32,
    },
    Update {
        old_weight_g: i32,
        new_weight_g: i32,
    },
    Feeding {
        feed_type: String,
        weight_g: i32,
        cost: Decimal,
    },
    Medicine {
        cost: Decimal,
    },
    Death {
        count: i32,
    },
    Note,
    Harvest {
        final_weight_g: i32,
        price_per_kg: Decimal,
    },
}

impl LogMeta {
    pub fn entry_type(&self) -> LogEntryType {
        match self {
            LogMeta::Creation { .. } => LogEntryType::Creation,
            LogMeta::Update { .. } => LogEntryType::Update,
            LogMeta::Feeding { .. } => LogEntryType::Feeding,
            LogMeta::Medicine { .. } => LogEntryType::Medicine,
            LogMeta::Death { .. } => LogEntryType::Death,
            LogMeta::Note => LogEntryType::Note,
            LogMeta::Harvest { .. } => LogEntryType::Harvest,
        }
    }
}

/// One immutable event in a cage's history
///
/// Entries are appended by the lifecycle engine and never mutated afterwards.
/// The `user` attribution is optional because entries recorded before accounts
/// were introduced carry none.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogEntry {
    pub date: DateTime<Utc>,
    pub details: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    pub meta: LogMeta,
}
