use async_trait::async_trait;
use bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, IndexModel};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::db::models::User;
use crate::db::store::UserStore;
use crate::error::DatabaseError;

const USERS_COLLECTION: &str = "users";

/// MongoDB-backed store. One client per process, shared by all requests.
#[derive(Clone)]
pub struct MongoUserStore {
    client: Client,
    users: Collection<User>,
}

impl MongoUserStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let client = Client::with_uri_str(&config.url)
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

        let database = client
            .default_database()
            .unwrap_or_else(|| client.database(&config.name));
        info!("Using database '{}'", database.name());

        let store = Self {
            users: database.collection::<User>(USERS_COLLECTION),
            client,
        };

        if config.create_email_index {
            store.ensure_email_index().await?;
        }

        Ok(store)
    }

    /// Unique index on `email`, closing the check-then-insert window at the
    /// store level.
    pub async fn ensure_email_index(&self) -> Result<(), DatabaseError> {
        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.users.create_index(index).await?;
        info!("Unique email index ensured on '{}'", USERS_COLLECTION);
        Ok(())
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self.users.find_one(doc! { "email": email }).await?)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self.users.find_one(doc! { "id": id }).await?)
    }

    async fn insert(&self, user: &User) -> Result<(), DatabaseError> {
        self.users.insert_one(user).await?;
        Ok(())
    }

    async fn shutdown(&self) {
        self.client.clone().shutdown().await;
        info!("MongoDB client shut down");
    }
}
