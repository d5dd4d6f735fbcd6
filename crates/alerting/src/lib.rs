//! Stock-level alerting engine.
//!
//! On every inventory mutation the engine classifies the item, raises or
//! resolves a deduplicated `LOW_STOCK` alert, and on demand ranks the whole
//! collection into urgent/warning restock suggestions.
//!
//! Persistence is injected: `NotificationStore` for alerts and
//! `ItemRepository` (from `stockpulse-inventory`) for items.

pub mod alert;
pub mod engine;
pub mod ranked_queue;
pub mod service;
pub mod store;

pub use alert::{Alert, AlertKind, NewAlert};
pub use engine::{AlertOutcome, RestockSuggestionEngine, RestockSuggestions};
pub use ranked_queue::RankedQueue;
pub use service::{ItemWrite, StockService, StockServiceError};
pub use store::{InMemoryNotificationStore, NotificationStore, NotificationStoreError};
