//! Inventory records as observed by the alerting engine.
//!
//! Items are plain records owned by a persistence collaborator
//! (`ItemRepository`). This crate also hosts the threshold classifier, which
//! is a pure function of an item's quantity and reorder threshold.

pub mod item;
pub mod repository;
pub mod threshold;

pub use item::{
    DEFAULT_LOCATION, DEFAULT_REORDER_FREQUENCY, DEFAULT_REORDER_THRESHOLD, InventoryItem, ItemPatch,
    NewInventoryItem,
};
pub use repository::{InMemoryItemRepository, ItemRepository, RepositoryError};
pub use threshold::{SeverityBand, WARNING_MARGIN, classify};
