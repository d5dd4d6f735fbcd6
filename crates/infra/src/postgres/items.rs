use sqlx::{FromRow, PgPool, Row};
use tracing::{debug, instrument};

use stockpulse_core::{DomainError, ItemId};
use stockpulse_inventory::{InventoryItem, ItemPatch, ItemRepository, RepositoryError};

use super::{CHECK_VIOLATION, UNIQUE_VIOLATION, describe, sqlstate};

const ITEM_COLUMNS: &str =
    "id, name, description, quantity, reorder_threshold, location, reorder_frequency";

/// Item repository over the `inventory_items` table.
///
/// `update_and_fetch` locks the row (`SELECT … FOR UPDATE`), applies the
/// patch with the same validation as the in-memory store and writes it back
/// inside one transaction.
#[derive(Debug, Clone)]
pub struct PostgresItemRepository {
    pool: PgPool,
}

impl PostgresItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

struct ItemRow(InventoryItem);

impl<'r> FromRow<'r, sqlx::postgres::PgRow> for ItemRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(ItemRow(InventoryItem {
            id: ItemId::from_uuid(row.try_get("id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            quantity: row.try_get("quantity")?,
            reorder_threshold: row.try_get("reorder_threshold")?,
            location: row.try_get("location")?,
            reorder_frequency: row.try_get("reorder_frequency")?,
        }))
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RepositoryError {
    RepositoryError::Storage(describe(operation, &err))
}

#[async_trait::async_trait]
impl ItemRepository for PostgresItemRepository {
    #[instrument(skip(self, item), fields(item_id = %item.id), err)]
    async fn insert(&self, item: InventoryItem) -> Result<InventoryItem, RepositoryError> {
        item.validate()?;
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "INSERT INTO inventory_items ({ITEM_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(item.id.as_uuid())
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.quantity)
        .bind(item.reorder_threshold)
        .bind(&item.location)
        .bind(item.reorder_frequency)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match sqlstate(&e).as_deref() {
            Some(UNIQUE_VIOLATION) => RepositoryError::AlreadyExists(item.id),
            Some(CHECK_VIOLATION) => {
                RepositoryError::Domain(DomainError::validation(describe("insert", &e)))
            }
            _ => map_sqlx_error("insert", e),
        })?;
        Ok(row.0)
    }

    async fn get(&self, id: ItemId) -> Result<Option<InventoryItem>, RepositoryError> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get", e))?;
        Ok(row.map(|r| r.0))
    }

    async fn list(&self) -> Result<Vec<InventoryItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list", e))?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    #[instrument(skip(self, patch), fields(item_id = %id), err)]
    async fn update_and_fetch(
        &self,
        id: ItemId,
        patch: &ItemPatch,
    ) -> Result<Option<InventoryItem>, RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("update_and_fetch.begin", e))?;

        let current = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items WHERE id = $1 FOR UPDATE"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_and_fetch.lock", e))?;

        let Some(ItemRow(current)) = current else {
            debug!("no item to update");
            return Ok(None);
        };
        let next = patch.apply(&current)?;

        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "UPDATE inventory_items \
             SET name = $2, description = $3, quantity = $4, reorder_threshold = $5, \
                 location = $6, reorder_frequency = $7 \
             WHERE id = $1 \
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .bind(&next.name)
        .bind(&next.description)
        .bind(next.quantity)
        .bind(next.reorder_threshold)
        .bind(&next.location)
        .bind(next.reorder_frequency)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_and_fetch.update", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("update_and_fetch.commit", e))?;
        Ok(Some(row.0))
    }

    #[instrument(skip(self), fields(item_id = %id), err)]
    async fn delete(&self, id: ItemId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM inventory_items WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;
        Ok(result.rows_affected() > 0)
    }
}
