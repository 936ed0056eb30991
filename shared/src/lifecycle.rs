//! Growth lifecycle engine for crab cages
//!
//! Pure domain logic shared between the backend and the WASM bindings:
//! progress computation, farming-day arithmetic, growth staging, the cage
//! update transaction, harvest settlement and notification derivation.
//! Nothing in this module performs I/O; callers supply the clock.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Cage, FeedRecord, GrowthPoint, HarvestedCage, LogEntry, LogMeta, Notification,
    NotificationKind, TARGET_WEIGHT_GRAMS,
};

/// Feed type recorded when the farmer does not name one
pub const DEFAULT_FEED_TYPE: &str = "Thức ăn chung";

/// Progress at which a cage raises a harvest-ready notification
pub const HARVEST_READY_PROGRESS: i32 = 95;

/// Errors raised by lifecycle operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("new weight is required")]
    MissingWeight,

    #[error("weight cannot be negative")]
    NegativeWeight,

    #[error("{0} cannot be negative")]
    NegativeAmount(&'static str),

    #[error("final weight must be greater than zero")]
    InvalidFinalWeight,

    #[error("price per kg must be greater than zero")]
    InvalidPrice,
}

/// Progress toward the target weight as a whole percentage, clamped to 0-100
pub fn compute_progress(current_weight_g: i32, target_weight_g: i32) -> i32 {
    if target_weight_g <= 0 || current_weight_g <= 0 {
        return 0;
    }
    // Rounded to the nearest percent, halves away from zero
    let pct = (i64::from(current_weight_g) * 100 + i64::from(target_weight_g) / 2)
        / i64::from(target_weight_g);
    pct.min(100) as i32
}

/// Whole days a cage has been farming, never less than one
pub fn farming_days(start: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - start).num_days().max(1)
}

/// Farming stage derived from days in the water
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum GrowthStage {
    New,
    Early,
    Midway,
    Mature,
    Critical,
}

impl GrowthStage {
    /// Stage for a cage that has been farming for `days` days
    pub fn from_days(days: i64) -> Self {
        if days >= 40 {
            GrowthStage::Critical
        } else if days >= 30 {
            GrowthStage::Mature
        } else if days >= 20 {
            GrowthStage::Midway
        } else if days >= 10 {
            GrowthStage::Early
        } else {
            GrowthStage::New
        }
    }

    /// Indicator color used on the cage card
    pub fn color(&self) -> &'static str {
        match self {
            GrowthStage::New => "gray",
            GrowthStage::Early => "purple",
            GrowthStage::Midway => "yellow",
            GrowthStage::Mature => "green",
            GrowthStage::Critical => "red",
        }
    }
}

/// Input for one cage update transaction
///
/// `new_weight_g` is required; everything else defaults to "nothing happened"
/// so that an unchanged form submission is a no-op.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateInput {
    pub new_weight_g: Option<i32>,
    #[serde(default)]
    pub feed_type: Option<String>,
    #[serde(default)]
    pub feed_weight_g: i32,
    #[serde(default)]
    pub feed_cost: Decimal,
    #[serde(default)]
    pub medicine_cost: Decimal,
    #[serde(default)]
    pub dead_count: i32,
    #[serde(default)]
    pub note: Option<String>,
}

/// Everything produced by one update transaction
///
/// The returned cage already contains the new history entries; the separate
/// fields let callers persist exactly what changed.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome {
    pub cage: Cage,
    pub new_entries: Vec<LogEntry>,
    pub new_growth_point: Option<GrowthPoint>,
    pub new_feed_record: Option<FeedRecord>,
}

impl Cage {
    /// Apply one update transaction to this cage.
    ///
    /// All entries produced by a single call share one timestamp, and the log
    /// is re-sorted by date (stable) so backdated entries keep their relative
    /// order. Returns the updated cage without touching `self`.
    pub fn apply_update(
        &self,
        input: &UpdateInput,
        now: DateTime<Utc>,
        user: &str,
    ) -> Result<UpdateOutcome, LifecycleError> {
        let new_weight = input.new_weight_g.ok_or(LifecycleError::MissingWeight)?;
        if new_weight < 0 {
            return Err(LifecycleError::NegativeWeight);
        }
        if input.feed_weight_g < 0 {
            return Err(LifecycleError::NegativeAmount("feed weight"));
        }
        if input.feed_cost < Decimal::ZERO {
            return Err(LifecycleError::NegativeAmount("feed cost"));
        }
        if input.medicine_cost < Decimal::ZERO {
            return Err(LifecycleError::NegativeAmount("medicine cost"));
        }
        if input.dead_count < 0 {
            return Err(LifecycleError::NegativeAmount("dead count"));
        }

        let user = Some(user.trim())
            .filter(|u| !u.is_empty())
            .map(str::to_string);

        let mut cage = self.clone();
        let mut entries = Vec::new();
        let mut new_growth_point = None;
        let mut new_feed_record = None;

        if new_weight != cage.current_weight_g {
            let old_weight = cage.current_weight_g;
            cage.current_weight_g = new_weight;
            cage.progress = compute_progress(new_weight, TARGET_WEIGHT_GRAMS);

            let point = GrowthPoint {
                recorded_at: now,
                weight_g: new_weight,
            };
            cage.growth_history.push(point);
            new_growth_point = Some(point);

            entries.push(LogEntry {
                date: now,
                details: format!(
                    "Trọng lượng mới: {}g. Tăng {}g.",
                    new_weight,
                    new_weight - old_weight
                ),
                user: user.clone(),
                meta: LogMeta::Update {
                    old_weight_g: old_weight,
                    new_weight_g: new_weight,
                },
            });
        }

        let named_feed_type = input
            .feed_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());
        let fed = input.feed_cost > Decimal::ZERO
            || input.feed_weight_g > 0
            || named_feed_type.is_some();
        if fed {
            let feed_type = named_feed_type.unwrap_or(DEFAULT_FEED_TYPE).to_string();
            let record = FeedRecord {
                fed_at: now,
                feed_type: feed_type.clone(),
                weight_g: input.feed_weight_g,
                cost: input.feed_cost,
            };
            cage.feed_history.push(record.clone());
            cage.costs.feed += input.feed_cost;
            new_feed_record = Some(record);

            entries.push(LogEntry {
                date: now,
                details: format!("Cho ăn {}g {}.", input.feed_weight_g, feed_type),
                user: user.clone(),
                meta: LogMeta::Feeding {
                    feed_type,
                    weight_g: input.feed_weight_g,
                    cost: input.feed_cost,
                },
            });
        }

        if input.medicine_cost > Decimal::ZERO {
            cage.costs.medicine += input.medicine_cost;
            entries.push(LogEntry {
                date: now,
                details: "Sử dụng thuốc.".to_string(),
                user: user.clone(),
                meta: LogMeta::Medicine {
                    cost: input.medicine_cost,
                },
            });
        }

        if input.dead_count > 0 {
            cage.dead_crab_count += input.dead_count;
            entries.push(LogEntry {
                date: now,
                details: format!("Ghi nhận {} cua chết.", input.dead_count),
                user: user.clone(),
                meta: LogMeta::Death {
                    count: input.dead_count,
                },
            });
        }

        if let Some(note) = input.note.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            entries.push(LogEntry {
                date: now,
                details: note.to_string(),
                user,
                meta: LogMeta::Note,
            });
        }

        cage.log.extend(entries.iter().cloned());
        cage.log.sort_by_key(|entry| entry.date);

        Ok(UpdateOutcome {
            cage,
            new_entries: entries,
            new_growth_point,
            new_feed_record,
        })
    }
}

impl HarvestedCage {
    /// Settle an active cage into a financial record at harvest time.
    ///
    /// Costs are frozen as they stand; revenue is final weight (kg) times the
    /// sale price, and profit may come out negative.
    pub fn settle(
        cage: &Cage,
        final_weight_g: i32,
        price_per_kg: Decimal,
        now: DateTime<Utc>,
    ) -> Result<Self, LifecycleError> {
        if final_weight_g <= 0 {
            return Err(LifecycleError::InvalidFinalWeight);
        }
        if price_per_kg <= Decimal::ZERO {
            return Err(LifecycleError::InvalidPrice);
        }

        let total_cost = cage.costs.total();
        let revenue = Decimal::from(final_weight_g) * price_per_kg / Decimal::from(1000);
        let profit = revenue - total_cost;

        Ok(HarvestedCage {
            id: cage.id.clone(),
            start_date: cage.start_date,
            harvest_date: now,
            initial_weight_g: cage.initial_weight_g,
            final_weight_g,
            price_per_kg,
            costs: cage.costs.clone(),
            total_cost,
            revenue,
            profit,
            dead_crab_count: cage.dead_crab_count,
        })
    }
}

/// Derive the notifications that should be created for the given active
/// cages, skipping `(cage_id, kind)` pairs that already exist.
///
/// A cage with an AI alert raises an alert notification; a cage at
/// [`HARVEST_READY_PROGRESS`] or above raises a harvest notification.
pub fn derive_notifications(
    cages: &[Cage],
    existing: &HashSet<(String, NotificationKind)>,
    now: DateTime<Utc>,
) -> Vec<Notification> {
    let mut derived = Vec::new();

    for cage in cages {
        if cage.ai_alert && !existing.contains(&(cage.id.clone(), NotificationKind::Alert)) {
            derived.push(Notification {
                id: Uuid::new_v4(),
                cage_id: cage.id.clone(),
                kind: NotificationKind::Alert,
                message: format!(
                    "Cảnh báo AI: Lồng #{} có dấu hiệu tăng trưởng bất thường.",
                    cage.id
                ),
                read: false,
                created_at: now,
            });
        }

        if cage.progress >= HARVEST_READY_PROGRESS
            && !existing.contains(&(cage.id.clone(), NotificationKind::Harvest))
        {
            derived.push(Notification {
                id: Uuid::new_v4(),
                cage_id: cage.id.clone(),
                kind: NotificationKind::Harvest,
                message: format!("Lồng #{} đã sẵn sàng thu hoạch.", cage.id),
                read: false,
                created_at: now,
            });
        }
    }

    derived
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cage() -> Cage {
        Cage::new(
            "A01".to_string(),
            120,
            Decimal::from(150_000),
            Utc::now(),
            Some("farmer@example.com".to_string()),
        )
    }

    #[test]
    fn test_progress_rounds_and_clamps() {
        assert_eq!(compute_progress(250, TARGET_WEIGHT_GRAMS), 50);
        assert_eq!(compute_progress(252, TARGET_WEIGHT_GRAMS), 50);
        assert_eq!(compute_progress(253, TARGET_WEIGHT_GRAMS), 51);
        assert_eq!(compute_progress(2, TARGET_WEIGHT_GRAMS), 0);
        assert_eq!(compute_progress(700, TARGET_WEIGHT_GRAMS), 100);
        assert_eq!(compute_progress(-5, TARGET_WEIGHT_GRAMS), 0);
    }

    #[test]
    fn test_stage_thresholds() {
        assert_eq!(GrowthStage::from_days(1), GrowthStage::New);
        assert_eq!(GrowthStage::from_days(9), GrowthStage::New);
        assert_eq!(GrowthStage::from_days(10), GrowthStage::Early);
        assert_eq!(GrowthStage::from_days(20), GrowthStage::Midway);
        assert_eq!(GrowthStage::from_days(30), GrowthStage::Mature);
        assert_eq!(GrowthStage::from_days(39), GrowthStage::Mature);
        assert_eq!(GrowthStage::from_days(40), GrowthStage::Critical);
    }

    #[test]
    fn test_update_requires_weight() {
        let cage = test_cage();
        let input = UpdateInput::default();
        assert_eq!(
            cage.apply_update(&input, Utc::now(), "farmer@example.com"),
            Err(LifecycleError::MissingWeight)
        );

        let input = UpdateInput {
            new_weight_g: Some(-10),
            ..UpdateInput::default()
        };
        assert_eq!(
            cage.apply_update(&input, Utc::now(), "farmer@example.com"),
            Err(LifecycleError::NegativeWeight)
        );
    }

    #[test]
    fn test_entries_share_one_timestamp() {
        let cage = test_cage();
        let now = Utc::now();
        let input = UpdateInput {
            new_weight_g: Some(200),
            feed_weight_g: 300,
            feed_cost: Decimal::from(40_000),
            medicine_cost: Decimal::from(10_000),
            dead_count: 1,
            note: Some("Nước hơi đục".to_string()),
            ..UpdateInput::default()
        };

        let outcome = cage.apply_update(&input, now, "farmer@example.com").unwrap();
        assert_eq!(outcome.new_entries.len(), 5);
        assert!(outcome.new_entries.iter().all(|e| e.date == now));
    }

    #[test]
    fn test_settle_rejects_non_positive_inputs() {
        let cage = test_cage();
        assert_eq!(
            HarvestedCage::settle(&cage, 0, Decimal::from(300_000), Utc::now()),
            Err(LifecycleError::InvalidFinalWeight)
        );
        assert_eq!(
            HarvestedCage::settle(&cage, 600, Decimal::ZERO, Utc::now()),
            Err(LifecycleError::InvalidPrice)
        );
    }
}
