use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockpulse_core::{AlertId, DomainError, Entity, ItemId};
use stockpulse_inventory::InventoryItem;

/// Alert category. Together with the item id it forms the dedup key.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    LowStock,
    Info,
    Warning,
}

impl AlertKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertKind::LowStock => "LOW_STOCK",
            AlertKind::Info => "INFO",
            AlertKind::Warning => "WARNING",
        }
    }
}

impl core::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW_STOCK" => Ok(AlertKind::LowStock),
            "INFO" => Ok(AlertKind::Info),
            "WARNING" => Ok(AlertKind::Warning),
            other => Err(DomainError::validation(format!("unknown alert kind: {other}"))),
        }
    }
}

/// A persisted notification about an inventory item.
///
/// Alerts are never deleted; they only move from unread to read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub id: AlertId,
    pub item_id: ItemId,
    pub kind: AlertKind,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

impl Alert {
    pub fn is_unread(&self) -> bool {
        !self.read
    }

    pub fn matches_key(&self, item_id: ItemId, kind: AlertKind) -> bool {
        self.item_id == item_id && self.kind == kind
    }
}

impl Entity for Alert {
    type Id = AlertId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Request to create an alert; the store assigns id, timestamp and read flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAlert {
    pub item_id: ItemId,
    pub kind: AlertKind,
    pub title: String,
    #[serde(default)]
    pub body: String,
}

impl NewAlert {
    pub fn new(
        item_id: ItemId,
        kind: AlertKind,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            item_id,
            kind,
            title: title.into(),
            body: body.into(),
        }
    }

    /// The `LOW_STOCK` alert raised when `item` enters the urgent band.
    pub fn low_stock(item: &InventoryItem) -> Self {
        Self::new(
            item.id,
            AlertKind::LowStock,
            format!("Low stock for {}", item.name),
            format!(
                "{} has fallen below threshold of {}.",
                item.name, item.reorder_threshold
            ),
        )
    }

    /// Materialize as a fresh unread alert.
    pub fn into_alert(self, id: AlertId, created_at: DateTime<Utc>) -> Alert {
        Alert {
            id,
            item_id: self.item_id,
            kind: self.kind,
            title: self.title,
            body: self.body,
            created_at,
            read: false,
        }
    }
}
