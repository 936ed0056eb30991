//! Cage management service
//!
//! Cage CRUD plus the update transaction, the AI alert flag, and bulk feed
//! marking. Every mutation goes through the shared lifecycle engine so the
//! persisted history matches what the engine derived.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use shared::lifecycle::{farming_days, GrowthStage, UpdateInput, DEFAULT_FEED_TYPE};
use shared::models::{Cage, CageCosts, FeedRecord, GrowthPoint, LogEntry, LogMeta};
use shared::types::CageSortKey;
use shared::validation::{validate_cage_id, validate_initial_weight, validate_seed_cost};

/// Cage management service
#[derive(Clone)]
pub struct CageService {
    db: PgPool,
}

/// Input for creating a cage
#[derive(Debug, Deserialize)]
pub struct CreateCageInput {
    pub id: String,
    pub initial_weight_g: i32,
    #[serde(default)]
    pub seed_cost: Decimal,
}

/// Input for toggling the AI alert flag
#[derive(Debug, Deserialize)]
pub struct SetAlertInput {
    pub ai_alert: bool,
}

/// Input for marking several cages fed at once
#[derive(Debug, Deserialize)]
pub struct BulkFeedInput {
    pub cage_ids: Vec<String>,
}

/// Compact cage listing for the dashboard
#[derive(Debug, Serialize)]
pub struct CageSummary {
    pub id: String,
    pub start_date: DateTime<Utc>,
    pub farming_days: i64,
    pub growth_stage: GrowthStage,
    pub stage_color: String,
    pub current_weight_g: i32,
    pub progress: i32,
    pub total_cost: Decimal,
    pub dead_crab_count: i32,
    pub ai_alert: bool,
}

#[derive(Debug, sqlx::FromRow)]
struct CageRow {
    id: String,
    start_date: DateTime<Utc>,
    initial_weight_g: i32,
    current_weight_g: i32,
    progress: i32,
    seed_cost: Decimal,
    feed_cost: Decimal,
    medicine_cost: Decimal,
    dead_crab_count: i32,
    ai_alert: bool,
}

#[derive(Debug, sqlx::FromRow)]
struct LogEntryRow {
    cage_id: String,
    entry_date: DateTime<Utc>,
    details: String,
    acting_user: Option<String>,
    meta: Json<LogMeta>,
}

#[derive(Debug, sqlx::FromRow)]
struct GrowthPointRow {
    cage_id: String,
    recorded_at: DateTime<Utc>,
    weight_g: i32,
}

#[derive(Debug, sqlx::FromRow)]
struct FeedRecordRow {
    cage_id: String,
    fed_at: DateTime<Utc>,
    feed_type: String,
    weight_g: i32,
    cost: Decimal,
}

const CAGE_COLUMNS: &str = "id, start_date, initial_weight_g, current_weight_g, progress, \
     seed_cost, feed_cost, medicine_cost, dead_crab_count, ai_alert";

impl CageRow {
    fn into_cage(
        self,
        log: Vec<LogEntry>,
        growth_history: Vec<GrowthPoint>,
        feed_history: Vec<FeedRecord>,
    ) -> Cage {
        Cage {
            id: self.id,
            start_date: self.start_date,
            initial_weight_g: self.initial_weight_g,
            current_weight_g: self.current_weight_g,
            progress: self.progress,
            costs: CageCosts {
                seed: self.seed_cost,
                feed: self.feed_cost,
                medicine: self.medicine_cost,
            },
            dead_crab_count: self.dead_crab_count,
            ai_alert: self.ai_alert,
            growth_history,
            feed_history,
            log,
        }
    }
}

impl From<LogEntryRow> for LogEntry {
    fn from(row: LogEntryRow) -> Self {
        LogEntry {
            date: row.entry_date,
            details: row.details,
            user: row.acting_user,
            meta: row.meta.0,
        }
    }
}

impl From<GrowthPointRow> for GrowthPoint {
    fn from(row: GrowthPointRow) -> Self {
        GrowthPoint {
            recorded_at: row.recorded_at,
            weight_g: row.weight_g,
        }
    }
}

impl From<FeedRecordRow> for FeedRecord {
    fn from(row: FeedRecordRow) -> Self {
        FeedRecord {
            fed_at: row.fed_at,
            feed_type: row.feed_type,
            weight_g: row.weight_g,
            cost: row.cost,
        }
    }
}

impl CageService {
    /// Create a new CageService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List cage summaries, optionally filtered by an id fragment
    pub async fn get_cages(
        &self,
        search: Option<String>,
        sort: CageSortKey,
    ) -> AppResult<Vec<CageSummary>> {
        // Days sort inverts on start_date: the longest-running cage started first
        let order_by = match sort {
            CageSortKey::Id => "id ASC",
            CageSortKey::ProgressDesc => "progress DESC, id ASC",
            CageSortKey::ProgressAsc => "progress ASC, id ASC",
            CageSortKey::DaysDesc => "start_date ASC, id ASC",
            CageSortKey::DaysAsc => "start_date DESC, id ASC",
        };

        let query = format!(
            "SELECT {} FROM cages WHERE ($1 = '' OR id ILIKE '%' || $1 || '%' ESCAPE '\\') ORDER BY {}",
            CAGE_COLUMNS, order_by
        );

        let search = escape_like_pattern(search.unwrap_or_default().trim());
        let rows = sqlx::query_as::<_, CageRow>(&query)
            .bind(search)
            .fetch_all(&self.db)
            .await?;

        let now = Utc::now();
        let summaries = rows
            .into_iter()
            .map(|row| {
                let days = farming_days(row.start_date, now);
                let stage = GrowthStage::from_days(days);
                CageSummary {
                    id: row.id,
                    start_date: row.start_date,
                    farming_days: days,
                    growth_stage: stage,
                    stage_color: stage.color().to_string(),
                    current_weight_g: row.current_weight_g,
                    progress: row.progress,
                    total_cost: row.seed_cost + row.feed_cost + row.medicine_cost,
                    dead_crab_count: row.dead_crab_count,
                    ai_alert: row.ai_alert,
                }
            })
            .collect();

        Ok(summaries)
    }

    /// Load every active cage with its full history
    pub async fn load_cages(&self) -> AppResult<Vec<Cage>> {
        let query = format!("SELECT {} FROM cages ORDER BY id", CAGE_COLUMNS);
        let rows = sqlx::query_as::<_, CageRow>(&query)
            .fetch_all(&self.db)
            .await?;

        let log_rows = sqlx::query_as::<_, LogEntryRow>(
            r#"
            SELECT cage_id, entry_date, details, acting_user, meta
            FROM cage_log_entries
            WHERE cage_id IN (SELECT id FROM cages)
            ORDER BY entry_date ASC, id ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let growth_rows = sqlx::query_as::<_, GrowthPointRow>(
            r#"
            SELECT cage_id, recorded_at, weight_g
            FROM growth_points
            WHERE cage_id IN (SELECT id FROM cages)
            ORDER BY recorded_at ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let feed_rows = sqlx::query_as::<_, FeedRecordRow>(
            r#"
            SELECT cage_id, fed_at, feed_type, weight_g, cost
            FROM feed_records
            WHERE cage_id IN (SELECT id FROM cages)
            ORDER BY fed_at ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let mut logs: HashMap<String, Vec<LogEntry>> = HashMap::new();
        for row in log_rows {
            logs.entry(row.cage_id.clone()).or_default().push(row.into());
        }
        let mut growth: HashMap<String, Vec<GrowthPoint>> = HashMap::new();
        for row in growth_rows {
            growth.entry(row.cage_id.clone()).or_default().push(row.into());
        }
        let mut feed: HashMap<String, Vec<FeedRecord>> = HashMap::new();
        for row in feed_rows {
            feed.entry(row.cage_id.clone()).or_default().push(row.into());
        }

        let cages = rows
            .into_iter()
            .map(|row| {
                let log = logs.remove(&row.id).unwrap_or_default();
                let growth_history = growth.remove(&row.id).unwrap_or_default();
                let feed_history = feed.remove(&row.id).unwrap_or_default();
                row.into_cage(log, growth_history, feed_history)
            })
            .collect();

        Ok(cages)
    }

    /// Create a cage with its creation log entry and initial growth point
    pub async fn create_cage(&self, input: CreateCageInput, user_email: &str) -> AppResult<Cage> {
        if let Err(msg) = validate_cage_id(&input.id) {
            return Err(AppError::Validation {
                field: "id".to_string(),
                message: msg.to_string(),
                message_vi: "Mã lồng không hợp lệ (1-10 ký tự in hoa hoặc số).".to_string(),
            });
        }
        if let Err(msg) = validate_initial_weight(input.initial_weight_g) {
            return Err(AppError::Validation {
                field: "initial_weight_g".to_string(),
                message: msg.to_string(),
                message_vi: "Trọng lượng ban đầu phải lớn hơn 0.".to_string(),
            });
        }
        if let Err(msg) = validate_seed_cost(input.seed_cost) {
            return Err(AppError::Validation {
                field: "seed_cost".to_string(),
                message: msg.to_string(),
                message_vi: "Chi phí giống không được là số âm.".to_string(),
            });
        }

        // Harvested ids stay reserved so the preserved trail is never ambiguous
        let taken = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT (SELECT COUNT(*) FROM cages WHERE id = $1)
                 + (SELECT COUNT(*) FROM harvested_cages WHERE id = $1)
            "#,
        )
        .bind(&input.id)
        .fetch_one(&self.db)
        .await?;

        if taken > 0 {
            return Err(AppError::Conflict {
                resource: "cage".to_string(),
                message: "Cage ID already exists".to_string(),
                message_vi: "Mã lồng này đã tồn tại.".to_string(),
            });
        }

        let cage = Cage::new(
            input.id,
            input.initial_weight_g,
            input.seed_cost,
            Utc::now(),
            Some(user_email.to_string()),
        );

        let mut tx = self.db.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO cages (id, start_date, initial_weight_g, current_weight_g, progress,
                               seed_cost, feed_cost, medicine_cost, dead_crab_count, ai_alert)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(&cage.id)
        .bind(cage.start_date)
        .bind(cage.initial_weight_g)
        .bind(cage.current_weight_g)
        .bind(cage.progress)
        .bind(cage.costs.seed)
        .bind(cage.costs.feed)
        .bind(cage.costs.medicine)
        .bind(cage.dead_crab_count)
        .bind(cage.ai_alert)
        .execute(&mut *tx)
        .await?;

        insert_log_entries(&mut tx, &cage.id, &cage.log).await?;
        insert_growth_points(&mut tx, &cage.id, &cage.growth_history).await?;

        tx.commit().await?;

        Ok(cage)
    }

    /// Load one cage with its full history
    pub async fn get_cage(&self, id: &str) -> AppResult<Cage> {
        let query = format!("SELECT {} FROM cages WHERE id = $1", CAGE_COLUMNS);
        let row = sqlx::query_as::<_, CageRow>(&query)
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Cage {}", id)))?;

        let log_rows = sqlx::query_as::<_, LogEntryRow>(
            r#"
            SELECT cage_id, entry_date, details, acting_user, meta
            FROM cage_log_entries
            WHERE cage_id = $1
            ORDER BY entry_date ASC, id ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.db)
        .await?;

        let growth_rows = sqlx::query_as::<_, GrowthPointRow>(
            r#"
            SELECT cage_id, recorded_at, weight_g
            FROM growth_points
            WHERE cage_id = $1
            ORDER BY recorded_at ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.db)
        .await?;

        let feed_rows = sqlx::query_as::<_, FeedRecordRow>(
            r#"
            SELECT cage_id, fed_at, feed_type, weight_g, cost
            FROM feed_records
            WHERE cage_id = $1
            ORDER BY fed_at ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.db)
        .await?;

        Ok(row.into_cage(
            log_rows.into_iter().map(Into::into).collect(),
            growth_rows.into_iter().map(Into::into).collect(),
            feed_rows.into_iter().map(Into::into).collect(),
        ))
    }

    /// Apply one update transaction to a cage and persist what it produced
    pub async fn update_cage(
        &self,
        id: &str,
        input: UpdateInput,
        user_email: &str,
    ) -> AppResult<Cage> {
        let cage = self.get_cage(id).await?;
        let outcome = cage.apply_update(&input, Utc::now(), user_email)?;

        let mut tx = self.db.begin().await?;

        sqlx::query(
            r#"
            UPDATE cages
            SET current_weight_g = $2, progress = $3, feed_cost = $4, medicine_cost = $5,
                dead_crab_count = $6, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(outcome.cage.current_weight_g)
        .bind(outcome.cage.progress)
        .bind(outcome.cage.costs.feed)
        .bind(outcome.cage.costs.medicine)
        .bind(outcome.cage.dead_crab_count)
        .execute(&mut *tx)
        .await?;

        insert_log_entries(&mut tx, id, &outcome.new_entries).await?;
        if let Some(point) = outcome.new_growth_point {
            insert_growth_points(&mut tx, id, &[point]).await?;
        }
        if let Some(record) = &outcome.new_feed_record {
            insert_feed_record(&mut tx, id, record).await?;
        }

        tx.commit().await?;

        Ok(outcome.cage)
    }

    /// Delete a cage together with its history and notifications
    pub async fn delete_cage(&self, id: &str) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let result = sqlx::query("DELETE FROM cages WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Cage {}", id)));
        }

        // History tables have no FK, purge them explicitly
        sqlx::query("DELETE FROM cage_log_entries WHERE cage_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM growth_points WHERE cage_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM feed_records WHERE cage_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM notifications WHERE cage_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Set or clear the externally-determined AI alert flag
    pub async fn set_alert(&self, id: &str, ai_alert: bool) -> AppResult<Cage> {
        let result = sqlx::query("UPDATE cages SET ai_alert = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(ai_alert)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Cage {}", id)));
        }

        self.get_cage(id).await
    }

    /// Mark the selected cages fed in one transaction, returning how many
    /// cages were actually marked
    pub async fn bulk_feed(&self, cage_ids: &[String], user_email: &str) -> AppResult<i64> {
        if cage_ids.is_empty() {
            return Err(AppError::ValidationError(
                "cage_ids must not be empty".to_string(),
            ));
        }

        let found = sqlx::query_scalar::<_, String>("SELECT id FROM cages WHERE id = ANY($1)")
            .bind(cage_ids)
            .fetch_all(&self.db)
            .await?;

        let now = Utc::now();
        let mut tx = self.db.begin().await?;

        for cage_id in &found {
            let record = FeedRecord {
                fed_at: now,
                feed_type: DEFAULT_FEED_TYPE.to_string(),
                weight_g: 0,
                cost: Decimal::ZERO,
            };
            let entry = LogEntry {
                date: now,
                details: "Đánh dấu đã cho ăn (hàng loạt).".to_string(),
                user: Some(user_email.to_string()),
                meta: LogMeta::Feeding {
                    feed_type: record.feed_type.clone(),
                    weight_g: record.weight_g,
                    cost: record.cost,
                },
            };

            insert_feed_record(&mut tx, cage_id, &record).await?;
            insert_log_entries(&mut tx, cage_id, std::slice::from_ref(&entry)).await?;
        }

        tx.commit().await?;

        Ok(found.len() as i64)
    }
}

/// Append log entries for a cage inside an open transaction
pub(crate) async fn insert_log_entries(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    cage_id: &str,
    entries: &[LogEntry],
) -> AppResult<()> {
    for entry in entries {
        sqlx::query(
            r#"
            INSERT INTO cage_log_entries (cage_id, entry_date, entry_type, details, acting_user, meta)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(cage_id)
        .bind(entry.date)
        .bind(entry.meta.entry_type().as_str())
        .bind(&entry.details)
        .bind(&entry.user)
        .bind(Json(&entry.meta))
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

async fn insert_growth_points(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    cage_id: &str,
    points: &[GrowthPoint],
) -> AppResult<()> {
    for point in points {
        sqlx::query(
            "INSERT INTO growth_points (cage_id, recorded_at, weight_g) VALUES ($1, $2, $3)",
        )
        .bind(cage_id)
        .bind(point.recorded_at)
        .bind(point.weight_g)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

async fn insert_feed_record(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    cage_id: &str,
    record: &FeedRecord,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO feed_records (cage_id, fed_at, feed_type, weight_g, cost)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(cage_id)
    .bind(record.fed_at)
    .bind(&record.feed_type)
    .bind(record.weight_g)
    .bind(record.cost)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Escape LIKE/ILIKE metacharacters so search input matches literally
fn escape_like_pattern(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_pattern_keeps_plain_ids() {
        assert_eq!(escape_like_pattern("A01"), "A01");
        assert_eq!(escape_like_pattern(""), "");
    }

    #[test]
    fn test_escape_like_pattern_neutralizes_wildcards() {
        assert_eq!(escape_like_pattern("%"), "\\%");
        assert_eq!(escape_like_pattern("A_1"), "A\\_1");
        assert_eq!(escape_like_pattern("%B%"), "\\%B\\%");
        assert_eq!(escape_like_pattern("C\\D"), "C\\\\D");
    }
}
