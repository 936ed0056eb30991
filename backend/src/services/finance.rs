//! Financial aggregation and export service
//!
//! The aggregation itself lives in the shared crate; this service feeds it
//! from the record stores and renders the CSV export.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use super::cage::CageService;
use super::harvest::HarvestService;
use crate::error::AppResult;
use shared::finance::FinancialSummary;
use shared::models::HarvestedCage;

/// Financial reporting service
#[derive(Clone)]
pub struct FinanceService {
    db: PgPool,
}

/// One row of the harvested-records CSV export
#[derive(Debug, Serialize)]
pub struct HarvestedCsvRow {
    pub id: String,
    pub harvest_date: String,
    pub start_date: String,
    pub farming_days: i64,
    pub initial_weight_g: i32,
    pub final_weight_g: i32,
    pub price_per_kg: Decimal,
    pub seed_cost: Decimal,
    pub feed_cost: Decimal,
    pub medicine_cost: Decimal,
    pub total_cost: Decimal,
    pub revenue: Decimal,
    pub profit: Decimal,
    pub dead_crab_count: i32,
}

impl From<&HarvestedCage> for HarvestedCsvRow {
    fn from(record: &HarvestedCage) -> Self {
        Self {
            id: record.id.clone(),
            harvest_date: record.harvest_date.format("%Y-%m-%d").to_string(),
            start_date: record.start_date.format("%Y-%m-%d").to_string(),
            farming_days: record.farming_days(),
            initial_weight_g: record.initial_weight_g,
            final_weight_g: record.final_weight_g,
            price_per_kg: record.price_per_kg,
            seed_cost: record.costs.seed,
            feed_cost: record.costs.feed,
            medicine_cost: record.costs.medicine,
            total_cost: record.total_cost,
            revenue: record.revenue,
            profit: record.profit,
            dead_crab_count: record.dead_crab_count,
        }
    }
}

impl FinanceService {
    /// Create a new FinanceService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Aggregate the financial summary over harvested and active cages
    pub async fn get_summary(&self) -> AppResult<FinancialSummary> {
        let harvested = HarvestService::new(self.db.clone()).get_harvested().await?;
        let active = CageService::new(self.db.clone()).load_cages().await?;

        Ok(FinancialSummary::compute(&harvested, &active))
    }

    /// Render the harvested records as CSV, most recent harvest first
    pub async fn export_harvested_csv(&self) -> AppResult<String> {
        let harvested = HarvestService::new(self.db.clone()).get_harvested().await?;
        let rows: Vec<HarvestedCsvRow> = harvested.iter().map(Into::into).collect();

        Self::export_to_csv(&rows)
    }

    /// Serialize records into a CSV document
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record).map_err(|e| {
                crate::error::AppError::Internal(format!("CSV serialization error: {}", e))
            })?;
        }
        let csv_data = String::from_utf8(wtr.into_inner().map_err(|e| {
            crate::error::AppError::Internal(format!("CSV writer error: {}", e))
        })?)
        .map_err(|e| crate::error::AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}
