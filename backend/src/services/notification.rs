//! Notification service
//!
//! Notifications are derived from cage state, never hand-written: the sync
//! pass runs the shared derivation over the active cages and persists what
//! comes out, deduplicated per `(cage_id, kind)`.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::cage::CageService;
use crate::error::{AppError, AppResult};
use shared::lifecycle::derive_notifications;
use shared::models::{Notification, NotificationKind};

/// Notification service
#[derive(Clone)]
pub struct NotificationService {
    db: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    id: Uuid,
    cage_id: String,
    kind: String,
    message: String,
    read: bool,
    created_at: DateTime<Utc>,
}

impl NotificationRow {
    fn into_notification(self) -> AppResult<Notification> {
        let kind = self
            .kind
            .parse::<NotificationKind>()
            .map_err(AppError::Internal)?;

        Ok(Notification {
            id: self.id,
            cage_id: self.cage_id,
            kind,
            message: self.message,
            read: self.read,
            created_at: self.created_at,
        })
    }
}

impl NotificationService {
    /// Create a new NotificationService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List notifications, newest first
    pub async fn get_notifications(&self, limit: Option<i64>) -> AppResult<Vec<Notification>> {
        let limit = limit.unwrap_or(50).clamp(1, 200);

        let rows = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT id, cage_id, kind, message, read, created_at
            FROM notifications
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(|r| r.into_notification()).collect()
    }

    /// Count unread notifications for the badge
    pub async fn get_unread_count(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE read = FALSE",
        )
        .fetch_one(&self.db)
        .await?;

        Ok(count)
    }

    /// Derive notifications from the current cage state and persist the new
    /// ones, returning what was created
    pub async fn sync_notifications(&self) -> AppResult<Vec<Notification>> {
        let cages = CageService::new(self.db.clone()).load_cages().await?;

        let existing_rows =
            sqlx::query_as::<_, (String, String)>("SELECT cage_id, kind FROM notifications")
                .fetch_all(&self.db)
                .await?;

        let mut existing: HashSet<(String, NotificationKind)> = HashSet::new();
        for (cage_id, kind) in existing_rows {
            let kind = kind.parse::<NotificationKind>().map_err(AppError::Internal)?;
            existing.insert((cage_id, kind));
        }

        let derived = derive_notifications(&cages, &existing, Utc::now());

        let mut created = Vec::with_capacity(derived.len());
        for notification in derived {
            // The unique constraint still guards against concurrent syncs
            let result = sqlx::query(
                r#"
                INSERT INTO notifications (id, cage_id, kind, message, read, created_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (cage_id, kind) DO NOTHING
                "#,
            )
            .bind(notification.id)
            .bind(&notification.cage_id)
            .bind(notification.kind.as_str())
            .bind(&notification.message)
            .bind(notification.read)
            .bind(notification.created_at)
            .execute(&self.db)
            .await?;

            if result.rows_affected() > 0 {
                created.push(notification);
            }
        }

        Ok(created)
    }

    /// Mark every notification read, returning how many changed
    pub async fn mark_all_read(&self) -> AppResult<i64> {
        let result = sqlx::query("UPDATE notifications SET read = TRUE WHERE read = FALSE")
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() as i64)
    }
}
