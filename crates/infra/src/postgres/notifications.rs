use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Row};
use tracing::{debug, instrument};

use stockpulse_alerting::{Alert, AlertKind, NewAlert, NotificationStore, NotificationStoreError};
use stockpulse_core::{AlertId, ItemId};

use super::{UNIQUE_VIOLATION, describe, sqlstate};

const ALERT_COLUMNS: &str = "id, item_id, kind, title, body, created_at, read";

/// Alert ledger over the `notifications` table.
///
/// Dedup relies on the partial unique index `notifications_unread_key`
/// (see `schema`): the insert is skipped by `ON CONFLICT DO NOTHING` when an
/// unread alert for the key already exists, so concurrent creators race on
/// the index rather than on a read.
#[derive(Debug, Clone)]
pub struct PostgresNotificationStore {
    pool: PgPool,
}

impl PostgresNotificationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug)]
struct AlertRow {
    id: uuid::Uuid,
    item_id: uuid::Uuid,
    kind: String,
    title: String,
    body: String,
    created_at: DateTime<Utc>,
    read: bool,
}

impl<'r> FromRow<'r, sqlx::postgres::PgRow> for AlertRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(AlertRow {
            id: row.try_get("id")?,
            item_id: row.try_get("item_id")?,
            kind: row.try_get("kind")?,
            title: row.try_get("title")?,
            body: row.try_get("body")?,
            created_at: row.try_get("created_at")?,
            read: row.try_get("read")?,
        })
    }
}

impl TryFrom<AlertRow> for Alert {
    type Error = NotificationStoreError;

    fn try_from(row: AlertRow) -> Result<Self, Self::Error> {
        let kind = row
            .kind
            .parse::<AlertKind>()
            .map_err(|e| NotificationStoreError::Integrity(format!("alert {}: {e}", row.id)))?;
        Ok(Alert {
            id: AlertId::from_uuid(row.id),
            item_id: ItemId::from_uuid(row.item_id),
            kind,
            title: row.title,
            body: row.body,
            created_at: row.created_at,
            read: row.read,
        })
    }
}

fn into_alerts(rows: Vec<AlertRow>) -> Result<Vec<Alert>, NotificationStoreError> {
    rows.into_iter().map(Alert::try_from).collect()
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> NotificationStoreError {
    match sqlstate(&err).as_deref() {
        Some(UNIQUE_VIOLATION) => NotificationStoreError::Integrity(describe(operation, &err)),
        _ => NotificationStoreError::Storage(describe(operation, &err)),
    }
}

#[async_trait::async_trait]
impl NotificationStore for PostgresNotificationStore {
    #[instrument(skip(self, alert), fields(item_id = %alert.item_id, kind = %alert.kind), err)]
    async fn create(&self, alert: NewAlert) -> Result<Option<Alert>, NotificationStoreError> {
        let created = alert.into_alert(AlertId::new(), Utc::now());
        let row = sqlx::query_as::<_, AlertRow>(&format!(
            "INSERT INTO notifications ({ALERT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, FALSE) \
             ON CONFLICT (item_id, kind) WHERE NOT read DO NOTHING \
             RETURNING {ALERT_COLUMNS}"
        ))
        .bind(created.id.as_uuid())
        .bind(created.item_id.as_uuid())
        .bind(created.kind.as_str())
        .bind(&created.title)
        .bind(&created.body)
        .bind(created.created_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create", e))?;

        match row {
            Some(row) => Ok(Some(Alert::try_from(row)?)),
            None => {
                debug!("unread alert already exists; insert skipped");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self), fields(item_id = %item_id, kind = %kind), err)]
    async fn resolve_all_for_item(
        &self,
        item_id: ItemId,
        kind: AlertKind,
    ) -> Result<u64, NotificationStoreError> {
        let result = sqlx::query(
            "UPDATE notifications SET read = TRUE \
             WHERE item_id = $1 AND kind = $2 AND NOT read",
        )
        .bind(item_id.as_uuid())
        .bind(kind.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("resolve_all_for_item", e))?;
        Ok(result.rows_affected())
    }

    #[instrument(skip(self), fields(alert_id = %alert_id), err)]
    async fn acknowledge(&self, alert_id: AlertId) -> Result<Option<Alert>, NotificationStoreError> {
        let row = sqlx::query_as::<_, AlertRow>(&format!(
            "UPDATE notifications SET read = TRUE WHERE id = $1 RETURNING {ALERT_COLUMNS}"
        ))
        .bind(alert_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("acknowledge", e))?;
        row.map(Alert::try_from).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Alert>, NotificationStoreError> {
        let rows = sqlx::query_as::<_, AlertRow>(&format!(
            "SELECT {ALERT_COLUMNS} FROM notifications ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_all", e))?;
        into_alerts(rows)
    }

    async fn list_unread_for_item(
        &self,
        item_id: ItemId,
        kind: AlertKind,
    ) -> Result<Vec<Alert>, NotificationStoreError> {
        let rows = sqlx::query_as::<_, AlertRow>(&format!(
            "SELECT {ALERT_COLUMNS} FROM notifications \
             WHERE item_id = $1 AND kind = $2 AND NOT read \
             ORDER BY created_at DESC"
        ))
        .bind(item_id.as_uuid())
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_unread_for_item", e))?;
        into_alerts(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(kind: &str) -> AlertRow {
        AlertRow {
            id: uuid::Uuid::now_v7(),
            item_id: uuid::Uuid::now_v7(),
            kind: kind.to_string(),
            title: "Low stock for Widget".to_string(),
            body: String::new(),
            created_at: Utc::now(),
            read: false,
        }
    }

    #[test]
    fn stored_kind_names_map_back_to_kinds() {
        let alert = Alert::try_from(row("LOW_STOCK")).unwrap();
        assert_eq!(alert.kind, AlertKind::LowStock);
        assert!(alert.is_unread());
    }

    #[test]
    fn unknown_stored_kind_is_an_integrity_error() {
        let err = Alert::try_from(row("URGENT")).unwrap_err();
        assert!(matches!(err, NotificationStoreError::Integrity(_)));
    }

    #[test]
    fn non_database_errors_map_to_storage() {
        let err = map_sqlx_error("list_all", sqlx::Error::PoolClosed);
        match err {
            NotificationStoreError::Storage(msg) => assert!(msg.contains("list_all")),
            other => panic!("expected Storage, got {other:?}"),
        }
    }
}
