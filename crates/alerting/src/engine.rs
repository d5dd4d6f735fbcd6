//! Restock suggestion engine.
//!
//! Two entry points:
//! - `on_quantity_changed` runs after every committed item write and keeps the
//!   `LOW_STOCK` alert for that item in step with its severity band.
//! - `compute_suggestions` ranks a whole item collection into urgent and
//!   warning lists, most urgent (smallest slack) first.
//!
//! Per item, alerting moves between two observable states: no unread
//! `LOW_STOCK` alert (healthy or warning band) and one unread alert (urgent
//! band). Re-entering the urgent band while already alerting is a no-op
//! because the store suppresses duplicates.

use core::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use stockpulse_inventory::{InventoryItem, ItemRepository, RepositoryError, SeverityBand, classify};

use crate::alert::{Alert, AlertKind, NewAlert};
use crate::ranked_queue::RankedQueue;
use crate::store::{NotificationStore, NotificationStoreError};

/// What `on_quantity_changed` did to the item's alert state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertOutcome {
    /// Entered the urgent band; a new unread alert was stored.
    Raised(Alert),
    /// Urgent, but an unread alert already existed.
    Suppressed,
    /// Not urgent; this many stale alerts were marked read (may be 0).
    Resolved(u64),
}

/// Ranked restock candidates. Items in the `None` band appear in neither list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestockSuggestions {
    pub urgent: Vec<InventoryItem>,
    pub warning: Vec<InventoryItem>,
}

impl RestockSuggestions {
    pub fn is_empty(&self) -> bool {
        self.urgent.is_empty() && self.warning.is_empty()
    }
}

fn by_slack(a: &InventoryItem, b: &InventoryItem) -> Ordering {
    a.slack().cmp(&b.slack())
}

/// Orchestrates classification, alert dedup and ranking.
#[derive(Debug, Clone)]
pub struct RestockSuggestionEngine<S> {
    notifications: S,
}

impl<S> RestockSuggestionEngine<S>
where
    S: NotificationStore,
{
    pub fn new(notifications: S) -> Self {
        Self { notifications }
    }

    pub fn notifications(&self) -> &S {
        &self.notifications
    }

    /// React to a committed quantity or threshold change.
    ///
    /// Resolution happens as soon as the item is no longer urgent, even if
    /// it only recovered into the warning band.
    #[instrument(
        skip(self, item),
        fields(item_id = %item.id, quantity = item.quantity, threshold = item.reorder_threshold),
        err
    )]
    pub async fn on_quantity_changed(
        &self,
        item: &InventoryItem,
    ) -> Result<AlertOutcome, NotificationStoreError> {
        let band = classify(item.quantity, item.reorder_threshold);

        if band.is_urgent() {
            return match self.notifications.create(NewAlert::low_stock(item)).await? {
                Some(alert) => {
                    info!(alert_id = %alert.id, title = %alert.title, "low stock alert raised");
                    Ok(AlertOutcome::Raised(alert))
                }
                None => {
                    debug!(item = %item.name, "low stock alert already unread; skipped duplicate");
                    Ok(AlertOutcome::Suppressed)
                }
            };
        }

        let resolved = self
            .notifications
            .resolve_all_for_item(item.id, AlertKind::LowStock)
            .await?;
        if resolved > 0 {
            info!(%band, resolved, "stock recovered; low stock alerts resolved");
        }
        Ok(AlertOutcome::Resolved(resolved))
    }

    /// Read the current item collection and rank it.
    pub async fn suggestions_from<R>(&self, items: &R) -> Result<RestockSuggestions, RepositoryError>
    where
        R: ItemRepository + ?Sized,
    {
        let snapshot = items.list().await?;
        Ok(self.compute_suggestions(&snapshot))
    }

    /// Partition `items` into urgent and warning bands, each ordered by
    /// ascending slack. Ties keep no particular order.
    pub fn compute_suggestions(&self, items: &[InventoryItem]) -> RestockSuggestions {
        let mut urgent = RankedQueue::new(by_slack);
        let mut warning = RankedQueue::new(by_slack);

        for item in items {
            match SeverityBand::of(item) {
                SeverityBand::Urgent => urgent.enqueue(item.clone()),
                SeverityBand::Warning => warning.enqueue(item.clone()),
                SeverityBand::None => {}
            }
        }

        let suggestions = RestockSuggestions {
            urgent: urgent.top_k(urgent.size()),
            warning: warning.top_k(warning.size()),
        };
        debug!(
            scanned = items.len(),
            urgent = suggestions.urgent.len(),
            warning = suggestions.warning.len(),
            "computed restock suggestions"
        );
        suggestions
    }
}
