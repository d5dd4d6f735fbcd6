use serde::{Deserialize, Serialize};

use stockpulse_core::{DomainError, DomainResult, Entity, ItemId};

/// Reorder threshold applied when a new item does not specify one.
pub const DEFAULT_REORDER_THRESHOLD: i64 = 5;

/// Storage location applied when a new item does not specify one.
pub const DEFAULT_LOCATION: &str = "main-warehouse";

/// Days between reorders when a new item does not specify one.
pub const DEFAULT_REORDER_FREQUENCY: i64 = 1;

/// Snapshot of an inventory item after a committed write.
///
/// The alerting engine only reads these; quantity and threshold are changed by
/// whoever owns the record (see `ItemRepository`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub quantity: i64,
    #[serde(default = "default_reorder_threshold")]
    pub reorder_threshold: i64,
    #[serde(default = "default_location")]
    pub location: String,
    /// Days between reorders. Recorded with the item; nothing schedules on it.
    #[serde(default = "default_reorder_frequency")]
    pub reorder_frequency: i64,
}

fn default_reorder_frequency() -> i64 {
    DEFAULT_REORDER_FREQUENCY
}

fn default_reorder_threshold() -> i64 {
    DEFAULT_REORDER_THRESHOLD
}

fn default_location() -> String {
    DEFAULT_LOCATION.to_string()
}

impl InventoryItem {
    /// Build an item with default description, threshold and location.
    pub fn new(id: ItemId, name: impl Into<String>, quantity: i64) -> DomainResult<Self> {
        let item = Self {
            id,
            name: name.into(),
            description: String::new(),
            quantity,
            reorder_threshold: DEFAULT_REORDER_THRESHOLD,
            location: default_location(),
            reorder_frequency: DEFAULT_REORDER_FREQUENCY,
        };
        item.validate()?;
        Ok(item)
    }

    pub fn with_reorder_threshold(mut self, reorder_threshold: i64) -> DomainResult<Self> {
        self.reorder_threshold = reorder_threshold;
        self.validate()?;
        Ok(self)
    }

    /// Quantity minus reorder threshold. Smaller is more urgent.
    pub fn slack(&self) -> i64 {
        self.quantity.saturating_sub(self.reorder_threshold)
    }

    /// Check the record-level invariants.
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if self.quantity < 0 {
            return Err(DomainError::validation("quantity cannot be negative"));
        }
        if self.reorder_threshold < 0 {
            return Err(DomainError::validation("reorder_threshold cannot be negative"));
        }
        if self.reorder_frequency < 1 {
            return Err(DomainError::validation("reorder_frequency must be at least 1 day"));
        }
        Ok(())
    }
}

impl Entity for InventoryItem {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input for creating an item. Optional fields fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewInventoryItem {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub quantity: i64,
    #[serde(default)]
    pub reorder_threshold: Option<i64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub reorder_frequency: Option<i64>,
}

impl NewInventoryItem {
    pub fn new(name: impl Into<String>, quantity: i64) -> Self {
        Self {
            name: name.into(),
            quantity,
            ..Self::default()
        }
    }

    pub fn with_reorder_threshold(mut self, reorder_threshold: i64) -> Self {
        self.reorder_threshold = Some(reorder_threshold);
        self
    }

    /// Assign an id and validate.
    pub fn into_item(self, id: ItemId) -> DomainResult<InventoryItem> {
        let item = InventoryItem {
            id,
            name: self.name,
            description: self.description.unwrap_or_default(),
            quantity: self.quantity,
            reorder_threshold: self.reorder_threshold.unwrap_or(DEFAULT_REORDER_THRESHOLD),
            location: self.location.unwrap_or_else(default_location),
            reorder_frequency: self.reorder_frequency.unwrap_or(DEFAULT_REORDER_FREQUENCY),
        };
        item.validate()?;
        Ok(item)
    }
}

/// Partial update. `None` leaves the field untouched; an all-`None` patch is
/// a valid no-op write.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub reorder_threshold: Option<i64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub reorder_frequency: Option<i64>,
}

impl ItemPatch {
    pub fn quantity(quantity: i64) -> Self {
        Self {
            quantity: Some(quantity),
            ..Self::default()
        }
    }

    pub fn reorder_threshold(reorder_threshold: i64) -> Self {
        Self {
            reorder_threshold: Some(reorder_threshold),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Produce the patched record, rejecting results that break the item
    /// invariants. `item` itself is left unchanged.
    pub fn apply(&self, item: &InventoryItem) -> DomainResult<InventoryItem> {
        let mut next = item.clone();
        if let Some(name) = &self.name {
            next.name = name.clone();
        }
        if let Some(description) = &self.description {
            next.description = description.clone();
        }
        if let Some(quantity) = self.quantity {
            next.quantity = quantity;
        }
        if let Some(reorder_threshold) = self.reorder_threshold {
            next.reorder_threshold = reorder_threshold;
        }
        if let Some(location) = &self.location {
            next.location = location.clone();
        }
        if let Some(reorder_frequency) = self.reorder_frequency {
            next.reorder_frequency = reorder_frequency;
        }
        next.validate()?;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_item_uses_defaults() {
        let item = NewInventoryItem::new("Widget", 12).into_item(ItemId::new()).unwrap();
        assert_eq!(item.reorder_threshold, DEFAULT_REORDER_THRESHOLD);
        assert_eq!(item.location, DEFAULT_LOCATION);
        assert_eq!(item.description, "");
        assert_eq!(item.reorder_frequency, DEFAULT_REORDER_FREQUENCY);
    }

    #[test]
    fn reorder_frequency_below_one_day_is_rejected() {
        let mut new_item = NewInventoryItem::new("Bolt", 4);
        new_item.reorder_frequency = Some(0);
        assert!(matches!(
            new_item.into_item(ItemId::new()),
            Err(DomainError::Validation(_))
        ));

        let item = InventoryItem::new(ItemId::new(), "Bolt", 4).unwrap();
        let patch = ItemPatch {
            reorder_frequency: Some(-2),
            ..ItemPatch::default()
        };
        assert!(patch.apply(&item).is_err());

        let weekly = ItemPatch {
            reorder_frequency: Some(7),
            ..ItemPatch::default()
        };
        assert_eq!(weekly.apply(&item).unwrap().reorder_frequency, 7);
    }

    #[test]
    fn new_item_rejects_blank_name() {
        let err = NewInventoryItem::new("   ", 1).into_item(ItemId::new()).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for empty name"),
        }
    }

    #[test]
    fn new_item_rejects_negative_quantity_and_threshold() {
        assert!(NewInventoryItem::new("Bolt", -1).into_item(ItemId::new()).is_err());
        assert!(
            NewInventoryItem::new("Bolt", 1)
                .with_reorder_threshold(-3)
                .into_item(ItemId::new())
                .is_err()
        );
    }

    #[test]
    fn slack_is_quantity_minus_threshold() {
        let item = InventoryItem::new(ItemId::new(), "Nut", 2).unwrap();
        assert_eq!(item.slack(), -3);
    }

    #[test]
    fn patch_only_touches_given_fields() {
        let item = InventoryItem::new(ItemId::new(), "Gear", 9).unwrap();
        let patched = ItemPatch::quantity(4).apply(&item).unwrap();
        assert_eq!(patched.quantity, 4);
        assert_eq!(patched.name, "Gear");
        assert_eq!(patched.reorder_threshold, item.reorder_threshold);
        assert_eq!(item.quantity, 9);
    }

    #[test]
    fn empty_patch_is_a_no_op() {
        let item = InventoryItem::new(ItemId::new(), "Gear", 9).unwrap();
        let patch = ItemPatch::default();
        assert!(patch.is_empty());
        assert_eq!(patch.apply(&item).unwrap(), item);
    }

    #[test]
    fn patch_rejects_negative_quantity() {
        let item = InventoryItem::new(ItemId::new(), "Gear", 9).unwrap();
        assert!(ItemPatch::quantity(-1).apply(&item).is_err());
    }

    #[test]
    fn missing_threshold_deserializes_to_default() {
        let id = ItemId::new();
        let json = format!(r#"{{"id":"{id}","name":"Cog","quantity":3}}"#);
        let item: InventoryItem = serde_json::from_str(&json).unwrap();
        assert_eq!(item.reorder_threshold, DEFAULT_REORDER_THRESHOLD);
        assert_eq!(item.location, DEFAULT_LOCATION);
        assert_eq!(item.reorder_frequency, DEFAULT_REORDER_FREQUENCY);
    }
}
