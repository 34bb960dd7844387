//! MongoDB-backed [`DocumentStore`]

use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::Document;
use mongodb::{Client, Database};

use super::{DocumentStore, StoreError, StoreResult};

/// Document store backed by a live MongoDB database.
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    /// Connect to MongoDB and select a database.
    ///
    /// The driver connects lazily, so an unreachable server may only
    /// surface on the first query.
    pub async fn connect(uri: &str, db_name: &str) -> StoreResult<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| StoreError::Connect(e.to_string()))?;
        Ok(Self {
            db: client.database(db_name),
        })
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn find(
        &self,
        collection: &str,
        filter: Document,
        projection: Document,
    ) -> StoreResult<Vec<Document>> {
        let cursor = self
            .db
            .collection::<Document>(collection)
            .find(filter)
            .projection(projection)
            .await
            .map_err(|e| StoreError::Query {
                collection: collection.to_string(),
                message: e.to_string(),
            })?;

        cursor.try_collect().await.map_err(|e| StoreError::Query {
            collection: collection.to_string(),
            message: e.to_string(),
        })
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
        projection: Document,
    ) -> StoreResult<Option<Document>> {
        self.db
            .collection::<Document>(collection)
            .find_one(filter)
            .projection(projection)
            .await
            .map_err(|e| StoreError::Query {
                collection: collection.to_string(),
                message: e.to_string(),
            })
    }
}
