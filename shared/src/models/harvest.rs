//! Harvested cage models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cage::CageCosts;

/// A cage that has been harvested and settled into a financial record
///
/// All monetary fields are frozen at harvest time; the record never changes
/// once written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HarvestedCage {
    pub id: String,
    pub start_date: DateTime<Utc>,
    pub harvest_date: DateTime<Utc>,
    pub initial_weight_g: i32,
    pub final_weight_g: i32,
    /// Sale price in VND per kilogram
    pub price_per_kg: Decimal,
    pub costs: CageCosts,
    /// seed + feed + medicine at harvest time
    pub total_cost: Decimal,
    /// final weight (kg) * price per kg
    pub revenue: Decimal,
    /// revenue - total cost, may be negative
    pub profit: Decimal,
    pub dead_crab_count: i32,
}

impl HarvestedCage {
    /// Days the cage spent in the water before harvest
    pub fn farming_days(&self) -> i64 {
        crate::lifecycle::farming_days(self.start_date, self.harvest_date)
    }
}
