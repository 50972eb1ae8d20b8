//! PostgreSQL implementation of the SubscriptionStore port.

use std::sync::Arc;

use async_trait::async_trait;
use push_contract::{PushSubscription, SubscriptionKeys};

use crate::domain::{ports::outbound::SubscriptionStore, StoreError};
use crate::repositories::{
    DatabasePushSubscription, NewPushSubscription, PushSubscriptionRepository,
    PushSubscriptionRepositoryImpl, RepositoryError,
};

/// Adapter that keeps one subscription row per owner (user or device identity).
pub struct PostgresSubscriptionStore<R = PushSubscriptionRepositoryImpl> {
    repo: Arc<R>,
    owner: String,
}

impl<R> PostgresSubscriptionStore<R> {
    pub fn new(repo: Arc<R>, owner: impl Into<String>) -> Self {
        Self {
            repo,
            owner: owner.into(),
        }
    }
}

#[async_trait]
impl<R: PushSubscriptionRepository + Send + Sync + 'static> SubscriptionStore
    for PostgresSubscriptionStore<R>
{
    async fn get(&self) -> Result<Option<PushSubscription>, StoreError> {
        let row = self.repo.get_push_subscription(&self.owner).await?;

        row.map(db_row_to_subscription).transpose()
    }

    async fn set(&self, subscription: &PushSubscription) -> Result<(), StoreError> {
        let new_subscription = NewPushSubscription {
            owner: self.owner.clone(),
            endpoint: subscription.endpoint.clone(),
            expiration_time: subscription.expiration_time,
            auth: subscription.keys.auth.clone(),
            p256dh: subscription.keys.p256dh.clone(),
        };

        self.repo.upsert_push_subscription(&new_subscription).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.repo.delete_push_subscription(&self.owner).await?;
        Ok(())
    }
}

impl From<RepositoryError> for StoreError {
    fn from(err: RepositoryError) -> Self {
        tracing::error!("Subscription repository failed: {}", err);
        StoreError::Unavailable(err.to_string())
    }
}

fn db_row_to_subscription(row: DatabasePushSubscription) -> Result<PushSubscription, StoreError> {
    let subscription = PushSubscription {
        endpoint: row.endpoint,
        expiration_time: row.expiration_time,
        keys: SubscriptionKeys {
            p256dh: row.p256dh,
            auth: row.auth,
        },
    };
    subscription
        .validate()
        .map_err(|e| StoreError::Corrupt(e.to_string()))?;
    Ok(subscription)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{collections::HashMap, sync::Mutex};

    use crate::adapters::outbound::mock::subscription;

    #[derive(Default)]
    struct MockRepo {
        rows: Mutex<HashMap<String, DatabasePushSubscription>>,
    }

    #[async_trait]
    impl PushSubscriptionRepository for MockRepo {
        async fn get_push_subscription(
            &self,
            owner: &str,
        ) -> Result<Option<DatabasePushSubscription>, RepositoryError> {
            Ok(self.rows.lock().unwrap().get(owner).cloned())
        }

        async fn upsert_push_subscription(
            &self,
            new: &NewPushSubscription,
        ) -> Result<(), RepositoryError> {
            self.rows.lock().unwrap().insert(
                new.owner.clone(),
                DatabasePushSubscription {
                    endpoint: new.endpoint.clone(),
                    expiration_time: new.expiration_time,
                    auth: new.auth.clone(),
                    p256dh: new.p256dh.clone(),
                },
            );
            Ok(())
        }

        async fn delete_push_subscription(&self, owner: &str) -> Result<(), RepositoryError> {
            self.rows.lock().unwrap().remove(owner);
            Ok(())
        }
    }

    #[tokio::test]
    async fn stores_one_row_per_owner() {
        let repo = Arc::new(MockRepo::default());
        let alice = PostgresSubscriptionStore::new(repo.clone(), "alice");
        let bob = PostgresSubscriptionStore::new(repo.clone(), "bob");

        alice.set(&subscription("a")).await.unwrap();
        alice.set(&subscription("b")).await.unwrap();

        assert_eq!(repo.rows.lock().unwrap().len(), 1);
        assert_eq!(alice.get().await.unwrap(), Some(subscription("b")));
        assert!(bob.get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clear_removes_the_row() {
        let repo = Arc::new(MockRepo::default());
        let store = PostgresSubscriptionStore::new(repo, "alice");

        store.set(&subscription("a")).await.unwrap();
        store.clear().await.unwrap();

        assert!(store.get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_row_is_reported() {
        let repo = Arc::new(MockRepo::default());
        let store = PostgresSubscriptionStore::new(repo.clone(), "alice");
        let mut broken = subscription("a");
        broken.keys.p256dh = "???".to_string();
        store.set(&broken).await.unwrap();

        assert!(matches!(store.get().await, Err(StoreError::Corrupt(_))));
    }

    struct UnreachableRepo;

    #[async_trait]
    impl PushSubscriptionRepository for UnreachableRepo {
        async fn get_push_subscription(
            &self,
            _owner: &str,
        ) -> Result<Option<DatabasePushSubscription>, RepositoryError> {
            Err(sqlx::Error::PoolTimedOut.into())
        }

        async fn upsert_push_subscription(
            &self,
            _new: &NewPushSubscription,
        ) -> Result<(), RepositoryError> {
            Err(sqlx::Error::PoolTimedOut.into())
        }

        async fn delete_push_subscription(&self, _owner: &str) -> Result<(), RepositoryError> {
            Err(sqlx::Error::PoolClosed.into())
        }
    }

    #[tokio::test]
    async fn database_failure_is_unavailable() {
        let store = PostgresSubscriptionStore::new(Arc::new(UnreachableRepo), "alice");

        assert!(matches!(store.get().await, Err(StoreError::Unavailable(_))));
        assert!(matches!(
            store.set(&subscription("a")).await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(store.clear().await, Err(StoreError::Unavailable(_))));
    }
}
