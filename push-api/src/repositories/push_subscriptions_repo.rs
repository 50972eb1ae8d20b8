use async_trait::async_trait;
use sqlx::PgPool;

use super::repo_error::RepositoryError;

#[async_trait]
pub trait PushSubscriptionRepository {
    async fn get_push_subscription(
        &self,
        owner: &str,
    ) -> Result<Option<DatabasePushSubscription>, RepositoryError>;
    async fn upsert_push_subscription(
        &self,
        push_subscription: &NewPushSubscription,
    ) -> Result<(), RepositoryError>;
    async fn delete_push_subscription(&self, owner: &str) -> Result<(), RepositoryError>;
}

pub struct PushSubscriptionRepositoryImpl {
    pool: PgPool,
}

impl PushSubscriptionRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PushSubscriptionRepository for PushSubscriptionRepositoryImpl {
    async fn get_push_subscription(
        &self,
        owner: &str,
    ) -> Result<Option<DatabasePushSubscription>, RepositoryError> {
        let push_subscription = sqlx::query_as::<_, DatabasePushSubscription>(
            r#"
            SELECT endpoint, expiration_time, auth, p256dh
            FROM push_subscriptions
            WHERE owner = $1
            "#,
        )
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        Ok(push_subscription)
    }

    async fn upsert_push_subscription(
        &self,
        push_subscription: &NewPushSubscription,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO push_subscriptions (owner, endpoint, expiration_time, auth, p256dh)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (owner) DO UPDATE
            SET endpoint = EXCLUDED.endpoint,
                expiration_time = EXCLUDED.expiration_time,
                auth = EXCLUDED.auth,
                p256dh = EXCLUDED.p256dh,
                created_at = NOW()
            "#,
        )
        .bind(&push_subscription.owner)
        .bind(&push_subscription.endpoint)
        .bind(push_subscription.expiration_time)
        .bind(&push_subscription.auth)
        .bind(&push_subscription.p256dh)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_push_subscription(&self, owner: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM push_subscriptions WHERE owner = $1")
            .bind(owner)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DatabasePushSubscription {
    pub endpoint: String,
    pub expiration_time: Option<i64>,
    pub auth: String,
    pub p256dh: String,
}

pub struct NewPushSubscription {
    pub owner: String,
    pub endpoint: String,
    pub expiration_time: Option<i64>,
    pub auth: String,
    pub p256dh: String,
}
