//! Idempotent alert ledger.

use std::sync::{Arc, RwLock};

use chrono::Utc;
use thiserror::Error;

use stockpulse_core::{AlertId, Entity, ItemId};

use crate::alert::{Alert, AlertKind, NewAlert};

/// Notification store error.
///
/// Duplicate suppression and unknown ids are not errors; they come back as
/// `Ok(None)`.
#[derive(Debug, Error)]
pub enum NotificationStoreError {
    /// More than one unread alert exists for a dedup key.
    #[error("data integrity violation: {0}")]
    Integrity(String),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Keyed alert ledger.
///
/// Invariant: for any `(item_id, kind)` at most one alert with `read == false`
/// exists. Implementations must make the check-then-insert in `create`
/// atomic per dedup key, either with a uniqueness constraint in the backend
/// or by serializing writers.
#[async_trait::async_trait]
pub trait NotificationStore: Send + Sync {
    /// Persist a new unread alert unless one is already unread for the key.
    ///
    /// Returns `Ok(None)` when suppressed as a duplicate; nothing is written.
    async fn create(&self, alert: NewAlert) -> Result<Option<Alert>, NotificationStoreError>;

    /// Mark every unread alert for the key as read. Returns how many changed.
    async fn resolve_all_for_item(
        &self,
        item_id: ItemId,
        kind: AlertKind,
    ) -> Result<u64, NotificationStoreError>;

    /// Mark a single alert read. `Ok(None)` when the id is unknown.
    async fn acknowledge(&self, alert_id: AlertId) -> Result<Option<Alert>, NotificationStoreError>;

    /// All alerts, newest first.
    async fn list_all(&self) -> Result<Vec<Alert>, NotificationStoreError>;

    /// Unread alerts for one dedup key (zero or one when the invariant holds).
    async fn list_unread_for_item(
        &self,
        item_id: ItemId,
        kind: AlertKind,
    ) -> Result<Vec<Alert>, NotificationStoreError>;
}

#[async_trait::async_trait]
impl<S> NotificationStore for Arc<S>
where
    S: NotificationStore + ?Sized,
{
    async fn create(&self, alert: NewAlert) -> Result<Option<Alert>, NotificationStoreError> {
        (**self).create(alert).await
    }

    async fn resolve_all_for_item(
        &self,
        item_id: ItemId,
        kind: AlertKind,
    ) -> Result<u64, NotificationStoreError> {
        (**self).resolve_all_for_item(item_id, kind).await
    }

    async fn acknowledge(&self, alert_id: AlertId) -> Result<Option<Alert>, NotificationStoreError> {
        (**self).acknowledge(alert_id).await
    }

    async fn list_all(&self) -> Result<Vec<Alert>, NotificationStoreError> {
        (**self).list_all().await
    }

    async fn list_unread_for_item(
        &self,
        item_id: ItemId,
        kind: AlertKind,
    ) -> Result<Vec<Alert>, NotificationStoreError> {
        (**self).list_unread_for_item(item_id, kind).await
    }
}

/// In-memory alert store for tests/dev.
///
/// Every write runs under a single write guard, which serializes `create`
/// calls and makes the dedup check atomic for all keys at once.
#[derive(Debug, Default)]
pub struct InMemoryNotificationStore {
    alerts: RwLock<Vec<Alert>>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

fn poisoned() -> NotificationStoreError {
    NotificationStoreError::Storage("lock poisoned".to_string())
}

#[async_trait::async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn create(&self, alert: NewAlert) -> Result<Option<Alert>, NotificationStoreError> {
        let mut alerts = self.alerts.write().map_err(|_| poisoned())?;

        let unread = alerts
            .iter()
            .filter(|a| a.is_unread() && a.matches_key(alert.item_id, alert.kind))
            .count();

        match unread {
            0 => {
                let created = alert.into_alert(AlertId::new(), Utc::now());
                alerts.push(created.clone());
                Ok(Some(created))
            }
            1 => Ok(None),
            n => Err(NotificationStoreError::Integrity(format!(
                "{n} unread {} alerts for item {}",
                alert.kind, alert.item_id
            ))),
        }
    }

    async fn resolve_all_for_item(
        &self,
        item_id: ItemId,
        kind: AlertKind,
    ) -> Result<u64, NotificationStoreError> {
        let mut alerts = self.alerts.write().map_err(|_| poisoned())?;
        let mut resolved = 0u64;
        for alert in alerts
            .iter_mut()
            .filter(|a| a.is_unread() && a.matches_key(item_id, kind))
        {
            alert.read = true;
            resolved += 1;
        }
        Ok(resolved)
    }

    async fn acknowledge(&self, alert_id: AlertId) -> Result<Option<Alert>, NotificationStoreError> {
        let mut alerts = self.alerts.write().map_err(|_| poisoned())?;
        Ok(alerts.iter_mut().find(|a| a.is(&alert_id)).map(|a| {
            a.read = true;
            a.clone()
        }))
    }

    async fn list_all(&self) -> Result<Vec<Alert>, NotificationStoreError> {
        let alerts = self.alerts.read().map_err(|_| poisoned())?;
        // Reverse insertion order first so equal timestamps stay newest-first
        // through the stable sort.
        let mut all: Vec<Alert> = alerts.iter().rev().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn list_unread_for_item(
        &self,
        item_id: ItemId,
        kind: AlertKind,
    ) -> Result<Vec<Alert>, NotificationStoreError> {
        let alerts = self.alerts.read().map_err(|_| poisoned())?;
        Ok(alerts
            .iter()
            .filter(|a| a.is_unread() && a.matches_key(item_id, kind))
            .cloned()
            .collect())
    }
}
