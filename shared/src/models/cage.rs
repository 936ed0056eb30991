//! Active cage models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::log::{LogEntry, LogMeta};
use crate::lifecycle::compute_progress;

/// Weight (grams) at which a cage is considered fully grown
pub const TARGET_WEIGHT_GRAMS: i32 = 500;

/// Cost ledger for a cage, in VND
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CageCosts {
    pub seed: Decimal,
    pub feed: Decimal,
    pub medicine: Decimal,
}

impl CageCosts {
    pub fn total(&self) -> Decimal {
        self.seed + self.feed + self.medicine
    }
}

/// One weight measurement in a cage's growth history
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GrowthPoint {
    pub recorded_at: DateTime<Utc>,
    pub weight_g: i32,
}

/// One feeding event recorded against a cage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedRecord {
    pub fed_at: DateTime<Utc>,
    pub feed_type: String,
    pub weight_g: i32,
    pub cost: Decimal,
}

/// An active crab cage
///
/// The histories are append-only: every mutation goes through the lifecycle
/// engine, which records a matching log entry for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cage {
    /// Farmer-assigned identifier, 1-10 uppercase letters or digits
    pub id: String,
    pub start_date: DateTime<Utc>,
    pub initial_weight_g: i32,
    pub current_weight_g: i32,
    /// Percentage toward [`TARGET_WEIGHT_GRAMS`], always within 0-100
    pub progress: i32,
    pub costs: CageCosts,
    pub dead_crab_count: i32,
    pub ai_alert: bool,
    pub growth_history: Vec<GrowthPoint>,
    pub feed_history: Vec<FeedRecord>,
    pub log: Vec<LogEntry>,
}

impl Cage {
    /// Create a cage at stocking time with its initial growth point and
    /// creation log entry.
    pub fn new(
        id: String,
        initial_weight_g: i32,
        seed_cost: Decimal,
        now: DateTime<Utc>,
        user: Option<String>,
    ) -> Self {
        let creation_entry = LogEntry {
            date: now,
            details: format!("Thả giống với trọng lượng {}g.", initial_weight_g),
            user,
            meta: LogMeta::Creation { initial_weight_g },
        };

        Self {
            id,
            start_date: now,
            initial_weight_g,
            current_weight_g: initial_weight_g,
            progress: compute_progress(initial_weight_g, TARGET_WEIGHT_GRAMS),
            costs: CageCosts {
                seed: seed_cost,
                ..CageCosts::default()
            },
            dead_crab_count: 0,
            ai_alert: false,
            growth_history: vec![GrowthPoint {
                recorded_at: now,
                weight_g: initial_weight_g,
            }],
            feed_history: Vec::new(),
            log: vec![creation_entry],
        }
    }

    /// Total money sunk into this cage so far
    pub fn total_cost(&self) -> Decimal {
        self.costs.total()
    }
}
