//! Postgres schema bootstrap.
//!
//! Every statement is idempotent (`IF NOT EXISTS`) and is applied on each
//! start. The partial unique index `notifications_unread_key` is what keeps
//! at most one unread alert per `(item_id, kind)` under concurrent writers.

use sqlx::PgPool;
use tracing::{info, instrument};

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS inventory_items (
        id                UUID PRIMARY KEY,
        name              TEXT NOT NULL CHECK (btrim(name) <> ''),
        description       TEXT NOT NULL DEFAULT '',
        quantity          BIGINT NOT NULL CHECK (quantity >= 0),
        reorder_threshold BIGINT NOT NULL DEFAULT 5 CHECK (reorder_threshold >= 0),
        location          TEXT NOT NULL DEFAULT 'main-warehouse',
        reorder_frequency BIGINT NOT NULL DEFAULT 1 CHECK (reorder_frequency >= 1),
        created_at        TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    ALTER TABLE inventory_items
        ADD COLUMN IF NOT EXISTS reorder_frequency BIGINT NOT NULL DEFAULT 1
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS notifications (
        id         UUID PRIMARY KEY,
        item_id    UUID NOT NULL,
        kind       TEXT NOT NULL CHECK (kind IN ('LOW_STOCK', 'INFO', 'WARNING')),
        title      TEXT NOT NULL,
        body       TEXT NOT NULL DEFAULT '',
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        read       BOOLEAN NOT NULL DEFAULT FALSE
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS notifications_unread_key
        ON notifications (item_id, kind)
        WHERE NOT read
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS notifications_item_kind_read_idx
        ON notifications (item_id, kind, read)
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS notifications_created_at_idx
        ON notifications (created_at DESC)
    "#,
];

/// Create the item and notification tables and their indexes.
#[instrument(skip(pool), err)]
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    info!(statements = STATEMENTS.len(), "schema ensured");
    Ok(())
}
