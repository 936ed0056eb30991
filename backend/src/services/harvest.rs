//! Harvest settlement service
//!
//! Settles an active cage into a frozen financial record. The cage row goes
//! away with the settlement transaction while its history trail stays behind,
//! keyed by the same id.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;

use super::cage::{insert_log_entries, CageService};
use crate::error::{AppError, AppResult};
use shared::models::{CageCosts, HarvestedCage, LogEntry, LogMeta};

/// Harvest service for settling cages into financial records
#[derive(Clone)]
pub struct HarvestService {
    db: PgPool,
}

/// Input for harvesting a cage
#[derive(Debug, Deserialize)]
pub struct HarvestInput {
    pub final_weight_g: i32,
    pub price_per_kg: Decimal,
}

/// Harvested record with its preserved log for the detail view
#[derive(Debug, Serialize)]
pub struct HarvestedCageDetail {
    #[serde(flatten)]
    pub record: HarvestedCage,
    pub log: Vec<LogEntry>,
}

#[derive(Debug, sqlx::FromRow)]
struct HarvestedCageRow {
    id: String,
    start_date: DateTime<Utc>,
    harvest_date: DateTime<Utc>,
    initial_weight_g: i32,
    final_weight_g: i32,
    price_per_kg: Decimal,
    seed_cost: Decimal,
    feed_cost: Decimal,
    medicine_cost: Decimal,
    total_cost: Decimal,
    revenue: Decimal,
    profit: Decimal,
    dead_crab_count: i32,
}

impl From<HarvestedCageRow> for HarvestedCage {
    fn from(row: HarvestedCageRow) -> Self {
        HarvestedCage {
            id: row.id,
            start_date: row.start_date,
            harvest_date: row.harvest_date,
            initial_weight_g: row.initial_weight_g,
            final_weight_g: row.final_weight_g,
            price_per_kg: row.price_per_kg,
            costs: CageCosts {
                seed: row.seed_cost,
                feed: row.feed_cost,
                medicine: row.medicine_cost,
            },
            total_cost: row.total_cost,
            revenue: row.revenue,
            profit: row.profit,
            dead_crab_count: row.dead_crab_count,
        }
    }
}

const HARVESTED_COLUMNS: &str = "id, start_date, harvest_date, initial_weight_g, final_weight_g, \
     price_per_kg, seed_cost, feed_cost, medicine_cost, total_cost, revenue, profit, \
     dead_crab_count";

impl HarvestService {
    /// Create a new HarvestService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Settle a cage into a harvested record
    ///
    /// One transaction appends the terminal harvest log entry, inserts the
    /// frozen record, and removes the cage row and its notifications.
    pub async fn harvest_cage(
        &self,
        id: &str,
        input: HarvestInput,
        user_email: &str,
    ) -> AppResult<HarvestedCage> {
        let cage = CageService::new(self.db.clone()).get_cage(id).await?;
        let record =
            HarvestedCage::settle(&cage, input.final_weight_g, input.price_per_kg, Utc::now())?;

        let harvest_entry = LogEntry {
            date: record.harvest_date,
            details: format!("Thu hoạch với trọng lượng {}g.", record.final_weight_g),
            user: Some(user_email.to_string()),
            meta: LogMeta::Harvest {
                final_weight_g: record.final_weight_g,
                price_per_kg: record.price_per_kg,
            },
        };

        let mut tx = self.db.begin().await?;

        insert_log_entries(&mut tx, id, std::slice::from_ref(&harvest_entry)).await?;

        sqlx::query(
            r#"
            INSERT INTO harvested_cages (id, start_date, harvest_date, initial_weight_g,
                                         final_weight_g, price_per_kg, seed_cost, feed_cost,
                                         medicine_cost, total_cost, revenue, profit,
                                         dead_crab_count)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(&record.id)
        .bind(record.start_date)
        .bind(record.harvest_date)
        .bind(record.initial_weight_g)
        .bind(record.final_weight_g)
        .bind(record.price_per_kg)
        .bind(record.costs.seed)
        .bind(record.costs.feed)
        .bind(record.costs.medicine)
        .bind(record.total_cost)
        .bind(record.revenue)
        .bind(record.profit)
        .bind(record.dead_crab_count)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM cages WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM notifications WHERE cage_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(record)
    }

    /// List harvested records, most recent harvest first
    pub async fn get_harvested(&self) -> AppResult<Vec<HarvestedCage>> {
        let query = format!(
            "SELECT {} FROM harvested_cages ORDER BY harvest_date DESC",
            HARVESTED_COLUMNS
        );

        let rows = sqlx::query_as::<_, HarvestedCageRow>(&query)
            .fetch_all(&self.db)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Load one harvested record with the log trail it preserved
    pub async fn get_harvested_cage(&self, id: &str) -> AppResult<HarvestedCageDetail> {
        let query = format!("SELECT {} FROM harvested_cages WHERE id = $1", HARVESTED_COLUMNS);

        let row = sqlx::query_as::<_, HarvestedCageRow>(&query)
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Harvested cage {}", id)))?;

        let log = sqlx::query_as::<_, PreservedLogRow>(
            r#"
            SELECT entry_date, details, acting_user, meta
            FROM cage_log_entries
            WHERE cage_id = $1
            ORDER BY entry_date ASC, id ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.db)
        .await?;

        Ok(HarvestedCageDetail {
            record: row.into(),
            log: log.into_iter().map(Into::into).collect(),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PreservedLogRow {
    entry_date: DateTime<Utc>,
    details: String,
    acting_user: Option<String>,
    meta: Json<LogMeta>,
}

impl From<PreservedLogRow> for LogEntry {
    fn from(row: PreservedLogRow) -> Self {
        LogEntry {
            date: row.entry_date,
            details: row.details,
            user: row.acting_user,
            meta: row.meta.0,
        }
    }
}
