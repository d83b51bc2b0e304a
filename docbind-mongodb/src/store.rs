//! MongoDB-backed storage implementation.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use bson::{Document, doc, oid::ObjectId};
use futures::TryStreamExt;
use mongodb::{
    Client, Collection as MongoCollection, IndexModel,
    options::{ClientOptions, IndexOptions},
};

use docbind_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    error::{DocBindError, DocBindResult},
};

/// Environment variable holding the MongoDB connection string.
pub const CONNECTION_STRING_VAR: &str = "MONGO_DB_CONNECTION_STRING";
/// Environment variable holding the database name.
pub const DATABASE_NAME_VAR: &str = "MONGO_DB_NAME";

/// MongoDB implementation of the storage backend.
///
/// Wraps the official async driver. Filters and updates produced by the
/// binding layer are already in the driver's native document form, so they
/// pass straight through.
#[derive(Debug, Clone)]
pub struct MongoStore {
    client: Client,
    database: String,
}

impl MongoStore {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    /// Creates a builder from an explicit connection string and database name.
    pub fn builder(dsn: &str, database: &str) -> MongoStoreBuilder {
        MongoStoreBuilder::new(dsn, database)
    }

    /// Creates a builder from the `MONGO_DB_CONNECTION_STRING` and
    /// `MONGO_DB_NAME` environment variables.
    pub fn builder_from_env() -> DocBindResult<MongoStoreBuilder> {
        let dsn = env::var(CONNECTION_STRING_VAR).map_err(|_| {
            DocBindError::Connection(format!("{CONNECTION_STRING_VAR} is not set"))
        })?;
        let database = env::var(DATABASE_NAME_VAR)
            .map_err(|_| DocBindError::Connection(format!("{DATABASE_NAME_VAR} is not set")))?;

        Ok(MongoStoreBuilder::new(&dsn, &database))
    }

    fn get_collection(&self, collection_name: &str) -> MongoCollection<Document> {
        self.client
            .database(&self.database)
            .collection(collection_name)
    }
}

#[async_trait]
impl StoreBackend for MongoStore {
    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
        projection: Option<Document>,
    ) -> DocBindResult<Option<Document>> {
        let coll = self.get_collection(collection);
        let mut action = coll.find_one(filter);
        if let Some(projection) = projection {
            action = action.projection(projection);
        }

        action
            .await
            .map_err(|e| DocBindError::Backend(e.to_string()))
    }

    async fn find(&self, collection: &str, filter: Document) -> DocBindResult<Vec<Document>> {
        self.get_collection(collection)
            .find(filter)
            .await
            .map_err(|e| DocBindError::Backend(e.to_string()))?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(|e| DocBindError::Backend(e.to_string()))
    }

    async fn insert_one(&self, collection: &str, record: Document) -> DocBindResult<ObjectId> {
        let result = self
            .get_collection(collection)
            .insert_one(record)
            .await
            .map_err(|e| DocBindError::Backend(e.to_string()))?;

        result.inserted_id.as_object_id().ok_or_else(|| {
            DocBindError::Backend("server returned a non-ObjectId identity".to_string())
        })
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> DocBindResult<u64> {
        let result = self
            .get_collection(collection)
            .update_one(filter, update)
            .await
            .map_err(|e| DocBindError::Backend(e.to_string()))?;

        Ok(result.matched_count)
    }

    async fn delete_one(&self, collection: &str, filter: Document) -> DocBindResult<()> {
        self.get_collection(collection)
            .delete_one(filter)
            .await
            .map_err(|e| DocBindError::Backend(e.to_string()))?;

        Ok(())
    }

    async fn delete_many(&self, collection: &str, filter: Document) -> DocBindResult<()> {
        self.get_collection(collection)
            .delete_many(filter)
            .await
            .map_err(|e| DocBindError::Backend(e.to_string()))?;

        Ok(())
    }

    async fn count_documents(&self, collection: &str, filter: Document) -> DocBindResult<u64> {
        self.get_collection(collection)
            .count_documents(filter)
            .await
            .map_err(|e| DocBindError::Backend(e.to_string()))
    }

    async fn create_index(
        &self,
        collection: &str,
        keys: Document,
        name: &str,
        unique: bool,
    ) -> DocBindResult<()> {
        self.get_collection(collection)
            .create_index(
                IndexModel::builder()
                    .keys(keys)
                    .options(
                        IndexOptions::builder()
                            .name(name.to_string())
                            .unique(unique)
                            .build(),
                    )
                    .build(),
            )
            .await
            .map_err(|e| DocBindError::Backend(e.to_string()))?;

        Ok(())
    }
}

/// Builder that connects to MongoDB with retries and exponential backoff.
///
/// A connection attempt parses the connection string, builds a client, and
/// verifies it with a `ping` command. On failure the builder sleeps
/// `delay_secs ^ attempt` seconds and tries again, up to `retries` attempts.
pub struct MongoStoreBuilder {
    dsn: String,
    database: String,
    retries: u32,
    delay_secs: u64,
}

impl MongoStoreBuilder {
    pub fn new(dsn: &str, database: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: database.to_string(),
            retries: 3,
            delay_secs: 2,
        }
    }

    /// Sets the number of connection attempts. Zero is treated as one.
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries.max(1);
        self
    }

    /// Sets the backoff base in seconds.
    pub fn delay_secs(mut self, delay_secs: u64) -> Self {
        self.delay_secs = delay_secs;
        self
    }

    async fn try_connect(&self) -> DocBindResult<Client> {
        let options = ClientOptions::parse(&self.dsn)
            .await
            .map_err(|e| DocBindError::Connection(e.to_string()))?;
        let client =
            Client::with_options(options).map_err(|e| DocBindError::Connection(e.to_string()))?;

        client
            .database(&self.database)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| DocBindError::Connection(e.to_string()))?;

        Ok(client)
    }
}

#[async_trait]
impl StoreBackendBuilder for MongoStoreBuilder {
    type Backend = MongoStore;

    async fn build(self) -> DocBindResult<Self::Backend> {
        let mut last_error = None;

        for attempt in 0..self.retries {
            match self.try_connect().await {
                Ok(client) => return Ok(MongoStore::new(client, self.database)),
                Err(error) => {
                    log::warn!(
                        "connection attempt {} of {} failed: {error}",
                        attempt + 1,
                        self.retries
                    );
                    last_error = Some(error);

                    if attempt + 1 < self.retries {
                        let backoff = self.delay_secs.saturating_pow(attempt);
                        tokio::time::sleep(Duration::from_secs(backoff)).await;
                    }
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| DocBindError::Connection("no connection attempts made".to_string())))
    }
}
