/// Subscription registry
///
/// Tracks which users are enrolled in which classifications. Subscribing twice
/// is not an error: the second call reports [`SubscribeOutcome::AlreadySubscribed`]
/// and leaves exactly one row. Uniqueness is enforced by the store's primary
/// key, so concurrent duplicate requests cannot both insert.

use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::models::classification::Classification;
use crate::store::Store;

/// Result of a subscribe request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscribeOutcome {
    Subscribed,
    AlreadySubscribed,
}

/// Manages user-classification enrollment
#[derive(Clone)]
pub struct SubscriptionRegistry {
    store: Arc<dyn Store>,
}

impl SubscriptionRegistry {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Enrolls a user in a classification
    ///
    /// # Errors
    ///
    /// `NotFound` if the user or the classification doesn't exist
    pub async fn subscribe(&self, user_id: Uuid, classification_id: Uuid) -> CoreResult<SubscribeOutcome> {
        if self.store.find_user(user_id).await?.is_none() {
            return Err(CoreError::NotFound(format!("User {}", user_id)));
        }
        if self.store.find_classification(classification_id).await?.is_none() {
            return Err(CoreError::NotFound(format!("Classification {}", classification_id)));
        }

        let inserted = self.store.insert_subscription(user_id, classification_id).await?;

        if inserted {
            tracing::info!(user_id = %user_id, classification_id = %classification_id, "Subscribed");
            Ok(SubscribeOutcome::Subscribed)
        } else {
            tracing::debug!(user_id = %user_id, classification_id = %classification_id, "Already subscribed");
            Ok(SubscribeOutcome::AlreadySubscribed)
        }
    }

    /// Classifications the user is subscribed to
    pub async fn subscriptions_for(&self, user_id: Uuid) -> CoreResult<Vec<Classification>> {
        Ok(self.store.subscribed_classifications(user_id).await?)
    }
}
