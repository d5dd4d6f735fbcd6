//! Inventory mutations wired to the alerting engine.
//!
//! Every successful create or update is followed by
//! `RestockSuggestionEngine::on_quantity_changed` on the committed record.

use thiserror::Error;
use tracing::{info, instrument};

use stockpulse_core::{AlertId, DomainError, ItemId};
use stockpulse_inventory::{InventoryItem, ItemPatch, ItemRepository, NewInventoryItem, RepositoryError};

use crate::alert::Alert;
use crate::engine::{AlertOutcome, RestockSuggestionEngine, RestockSuggestions};
use crate::store::{NotificationStore, NotificationStoreError};

#[derive(Debug, Error)]
pub enum StockServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("item repository: {0}")]
    Repository(#[from] RepositoryError),

    #[error("notification store: {0}")]
    Notifications(#[from] NotificationStoreError),

    #[error("inventory item not found: {0}")]
    ItemNotFound(ItemId),
}

/// Result of a write: the committed item and what happened to its alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemWrite {
    pub item: InventoryItem,
    pub alert: AlertOutcome,
}

#[derive(Debug, Clone)]
pub struct StockService<R, S> {
    items: R,
    engine: RestockSuggestionEngine<S>,
}

impl<R, S> StockService<R, S>
where
    R: ItemRepository,
    S: NotificationStore,
{
    pub fn new(items: R, notifications: S) -> Self {
        Self {
            items,
            engine: RestockSuggestionEngine::new(notifications),
        }
    }

    pub fn engine(&self) -> &RestockSuggestionEngine<S> {
        &self.engine
    }

    pub async fn list_items(&self) -> Result<Vec<InventoryItem>, StockServiceError> {
        Ok(self.items.list().await?)
    }

    pub async fn get_item(&self, id: ItemId) -> Result<InventoryItem, StockServiceError> {
        self.items
            .get(id)
            .await?
            .ok_or(StockServiceError::ItemNotFound(id))
    }

    #[instrument(skip(self, new_item), fields(name = %new_item.name), err)]
    pub async fn create_item(
        &self,
        new_item: NewInventoryItem,
    ) -> Result<ItemWrite, StockServiceError> {
        let item = new_item.into_item(ItemId::new())?;
        let item = self.items.insert(item).await?;
        info!(item_id = %item.id, "inventory item created");
        let alert = self.engine.on_quantity_changed(&item).await?;
        Ok(ItemWrite { item, alert })
    }

    /// Apply `patch`, then react to the committed record.
    ///
    /// The reaction runs after the commit and outside the repository's
    /// lock, so reactions of concurrent updates to one item are not ordered
    /// relative to their commits: a stale snapshot can be evaluated last and
    /// leave the alert state behind the stored quantity. Any later write,
    /// including an empty patch, re-evaluates the committed record.
    #[instrument(skip(self, patch), fields(item_id = %id), err)]
    pub async fn update_item(
        &self,
        id: ItemId,
        patch: ItemPatch,
    ) -> Result<ItemWrite, StockServiceError> {
        let item = self
            .items
            .update_and_fetch(id, &patch)
            .await?
            .ok_or(StockServiceError::ItemNotFound(id))?;
        let alert = self.engine.on_quantity_changed(&item).await?;
        Ok(ItemWrite { item, alert })
    }

    /// Remove an item. Its alerts stay in the ledger.
    #[instrument(skip(self), fields(item_id = %id), err)]
    pub async fn delete_item(&self, id: ItemId) -> Result<(), StockServiceError> {
        if self.items.delete(id).await? {
            Ok(())
        } else {
            Err(StockServiceError::ItemNotFound(id))
        }
    }

    pub async fn restock_suggestions(&self) -> Result<RestockSuggestions, StockServiceError> {
        Ok(self.engine.suggestions_from(&self.items).await?)
    }

    pub async fn notifications(&self) -> Result<Vec<Alert>, StockServiceError> {
        Ok(self.engine.notifications().list_all().await?)
    }

    /// `Ok(None)` when the alert id is unknown.
    pub async fn acknowledge_alert(&self, id: AlertId) -> Result<Option<Alert>, StockServiceError> {
        Ok(self.engine.notifications().acknowledge(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::AlertKind;
    use crate::store::InMemoryNotificationStore;
    use stockpulse_inventory::InMemoryItemRepository;

    fn service() -> StockService<InMemoryItemRepository, InMemoryNotificationStore> {
        StockService::new(InMemoryItemRepository::new(), InMemoryNotificationStore::new())
    }

    #[tokio::test]
    async fn creating_a_low_item_raises_an_alert() {
        let svc = service();
        let write = svc.create_item(NewInventoryItem::new("Fuse", 1)).await.unwrap();

        assert!(matches!(write.alert, AlertOutcome::Raised(_)));
        assert_eq!(svc.notifications().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn creating_a_healthy_item_raises_nothing() {
        let svc = service();
        let write = svc.create_item(NewInventoryItem::new("Fuse", 40)).await.unwrap();

        assert_eq!(write.alert, AlertOutcome::Resolved(0));
        assert!(svc.notifications().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_item_is_rejected_before_storage() {
        let svc = service();
        let err = svc.create_item(NewInventoryItem::new("", 1)).await.unwrap_err();
        assert!(matches!(err, StockServiceError::Domain(DomainError::Validation(_))));
        assert!(svc.list_items().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_cycle_raises_then_resolves() {
        let svc = service();
        let created = svc.create_item(NewInventoryItem::new("Relay", 20)).await.unwrap();
        let id = created.item.id;

        let low = svc.update_item(id, ItemPatch::quantity(3)).await.unwrap();
        assert!(matches!(low.alert, AlertOutcome::Raised(_)));

        let repeat = svc.update_item(id, ItemPatch::default()).await.unwrap();
        assert_eq!(repeat.alert, AlertOutcome::Suppressed);

        let recovered = svc.update_item(id, ItemPatch::quantity(8)).await.unwrap();
        assert_eq!(recovered.alert, AlertOutcome::Resolved(1));

        let alerts = svc.notifications().await.unwrap();
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].read);
    }

    #[tokio::test]
    async fn raising_the_threshold_can_trigger_an_alert() {
        let svc = service();
        let created = svc.create_item(NewInventoryItem::new("Relay", 9)).await.unwrap();

        let write = svc
            .update_item(created.item.id, ItemPatch::reorder_threshold(10))
            .await
            .unwrap();
        assert!(matches!(write.alert, AlertOutcome::Raised(_)));
    }

    #[tokio::test]
    async fn out_of_order_reaction_is_repaired_by_the_next_write() {
        let svc = service();
        let created = svc.create_item(NewInventoryItem::new("Valve", 20)).await.unwrap();
        let id = created.item.id;

        // Two updates commit q=3 then q=8, but their reactions run reversed.
        let low = ItemPatch::quantity(3).apply(&created.item).unwrap();
        let healthy = svc.update_item(id, ItemPatch::quantity(8)).await.unwrap().item;
        svc.engine().on_quantity_changed(&healthy).await.unwrap();
        svc.engine().on_quantity_changed(&low).await.unwrap();

        let unread = svc
            .engine()
            .notifications()
            .list_unread_for_item(id, AlertKind::LowStock)
            .await
            .unwrap();
        assert_eq!(unread.len(), 1, "stale snapshot evaluated last");

        let resync = svc.update_item(id, ItemPatch::default()).await.unwrap();
        assert_eq!(resync.alert, AlertOutcome::Resolved(1));
        assert!(
            svc.engine()
                .notifications()
                .list_unread_for_item(id, AlertKind::LowStock)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn unknown_items_are_not_found() {
        let svc = service();
        let id = ItemId::new();

        assert!(matches!(
            svc.update_item(id, ItemPatch::quantity(1)).await.unwrap_err(),
            StockServiceError::ItemNotFound(missing) if missing == id
        ));
        assert!(matches!(svc.get_item(id).await.unwrap_err(), StockServiceError::ItemNotFound(_)));
        assert!(matches!(svc.delete_item(id).await.unwrap_err(), StockServiceError::ItemNotFound(_)));
    }

    #[tokio::test]
    async fn delete_keeps_alert_history() {
        let svc = service();
        let created = svc.create_item(NewInventoryItem::new("Cable", 0)).await.unwrap();

        svc.delete_item(created.item.id).await.unwrap();
        assert!(svc.list_items().await.unwrap().is_empty());
        assert_eq!(svc.notifications().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn acknowledge_unknown_alert_is_none() {
        let svc = service();
        assert!(svc.acknowledge_alert(AlertId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn restock_suggestions_cover_stored_items() {
        let svc = service();
        let urgent = svc.create_item(NewInventoryItem::new("A", 2)).await.unwrap().item;
        let warning = svc.create_item(NewInventoryItem::new("B", 6)).await.unwrap().item;
        svc.create_item(NewInventoryItem::new("C", 10)).await.unwrap();

        let suggestions = svc.restock_suggestions().await.unwrap();
        assert_eq!(suggestions.urgent, vec![urgent]);
        assert_eq!(suggestions.warning, vec![warning]);
    }
}
