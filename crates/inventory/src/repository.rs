//! Item persistence boundary.

use std::sync::{Arc, RwLock};

use thiserror::Error;

use stockpulse_core::{DomainError, Entity, ItemId};

use crate::item::{InventoryItem, ItemPatch};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("item already exists: {0}")]
    AlreadyExists(ItemId),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Record store for inventory items.
///
/// Every method is a potential suspension point (network, disk). Failures are
/// surfaced as-is; implementations do not retry.
#[async_trait::async_trait]
pub trait ItemRepository: Send + Sync {
    async fn insert(&self, item: InventoryItem) -> Result<InventoryItem, RepositoryError>;

    async fn get(&self, id: ItemId) -> Result<Option<InventoryItem>, RepositoryError>;

    /// All items, in creation order.
    async fn list(&self) -> Result<Vec<InventoryItem>, RepositoryError>;

    /// Apply `patch` and return the record as committed, atomically.
    ///
    /// `Ok(None)` when no item has this id.
    async fn update_and_fetch(
        &self,
        id: ItemId,
        patch: &ItemPatch,
    ) -> Result<Option<InventoryItem>, RepositoryError>;

    /// Returns `false` when no item had this id.
    async fn delete(&self, id: ItemId) -> Result<bool, RepositoryError>;
}

#[async_trait::async_trait]
impl<R> ItemRepository for Arc<R>
where
    R: ItemRepository + ?Sized,
{
    async fn insert(&self, item: InventoryItem) -> Result<InventoryItem, RepositoryError> {
        (**self).insert(item).await
    }

    async fn get(&self, id: ItemId) -> Result<Option<InventoryItem>, RepositoryError> {
        (**self).get(id).await
    }

    async fn list(&self) -> Result<Vec<InventoryItem>, RepositoryError> {
        (**self).list().await
    }

    async fn update_and_fetch(
        &self,
        id: ItemId,
        patch: &ItemPatch,
    ) -> Result<Option<InventoryItem>, RepositoryError> {
        (**self).update_and_fetch(id, patch).await
    }

    async fn delete(&self, id: ItemId) -> Result<bool, RepositoryError> {
        (**self).delete(id).await
    }
}

/// In-memory item store for tests/dev.
///
/// Items are kept in insertion order. Not optimized for large collections.
#[derive(Debug, Default)]
pub struct InMemoryItemRepository {
    items: RwLock<Vec<InventoryItem>>,
}

impl InMemoryItemRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

fn poisoned() -> RepositoryError {
    RepositoryError::Storage("lock poisoned".to_string())
}

#[async_trait::async_trait]
impl ItemRepository for InMemoryItemRepository {
    async fn insert(&self, item: InventoryItem) -> Result<InventoryItem, RepositoryError> {
        item.validate()?;
        let mut items = self.items.write().map_err(|_| poisoned())?;
        if items.iter().any(|i| i.is(&item.id)) {
            return Err(RepositoryError::AlreadyExists(item.id));
        }
        items.push(item.clone());
        Ok(item)
    }

    async fn get(&self, id: ItemId) -> Result<Option<InventoryItem>, RepositoryError> {
        let items = self.items.read().map_err(|_| poisoned())?;
        Ok(items.iter().find(|i| i.is(&id)).cloned())
    }

    async fn list(&self) -> Result<Vec<InventoryItem>, RepositoryError> {
        let items = self.items.read().map_err(|_| poisoned())?;
        Ok(items.clone())
    }

    async fn update_and_fetch(
        &self,
        id: ItemId,
        patch: &ItemPatch,
    ) -> Result<Option<InventoryItem>, RepositoryError> {
        let mut items = self.items.write().map_err(|_| poisoned())?;
        let Some(current) = items.iter_mut().find(|i| i.is(&id)) else {
            return Ok(None);
        };
        let next = patch.apply(current)?;
        *current = next.clone();
        Ok(Some(next))
    }

    async fn delete(&self, id: ItemId) -> Result<bool, RepositoryError> {
        let mut items = self.items.write().map_err(|_| poisoned())?;
        let before = items.len();
        items.retain(|i| !i.is(&id));
        Ok(items.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::NewInventoryItem;

    fn widget(quantity: i64) -> InventoryItem {
        NewInventoryItem::new("Widget", quantity)
            .into_item(ItemId::new())
            .unwrap()
    }

    #[tokio::test]
    async fn insert_then_get_returns_item() {
        let repo = InMemoryItemRepository::new();
        let item = repo.insert(widget(4)).await.unwrap();
        assert_eq!(repo.get(item.id).await.unwrap(), Some(item));
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected() {
        let repo = InMemoryItemRepository::new();
        let item = repo.insert(widget(4)).await.unwrap();
        let err = repo.insert(item.clone()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::AlreadyExists(id) if id == item.id));
    }

    #[tokio::test]
    async fn update_and_fetch_returns_committed_state() {
        let repo = InMemoryItemRepository::new();
        let item = repo.insert(widget(10)).await.unwrap();

        let updated = repo
            .update_and_fetch(item.id, &ItemPatch::quantity(2))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.quantity, 2);
        assert_eq!(repo.get(item.id).await.unwrap().unwrap().quantity, 2);
    }

    #[tokio::test]
    async fn invalid_patch_leaves_record_untouched() {
        let repo = InMemoryItemRepository::new();
        let item = repo.insert(widget(10)).await.unwrap();

        let err = repo
            .update_and_fetch(item.id, &ItemPatch::quantity(-5))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Domain(DomainError::Validation(_))));
        assert_eq!(repo.get(item.id).await.unwrap().unwrap().quantity, 10);
    }

    #[tokio::test]
    async fn update_of_unknown_item_is_none() {
        let repo = InMemoryItemRepository::new();
        let res = repo
            .update_and_fetch(ItemId::new(), &ItemPatch::quantity(1))
            .await
            .unwrap();
        assert!(res.is_none());
    }

    #[tokio::test]
    async fn list_is_in_creation_order_and_delete_removes() {
        let repo = InMemoryItemRepository::new();
        let a = repo.insert(widget(1)).await.unwrap();
        let b = repo.insert(widget(2)).await.unwrap();

        let ids: Vec<_> = repo.list().await.unwrap().into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);

        assert!(repo.delete(a.id).await.unwrap());
        assert!(!repo.delete(a.id).await.unwrap());
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }
}
