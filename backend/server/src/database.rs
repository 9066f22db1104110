//! # MongoDB
//!
//! Document database.
//!
//! Core purpose is to store candidate documents per branch and apply vote increments atomically.
//!
//! ## Layout
//!
//! - One database (`voting` unless configured otherwise)
//! - One collection per branch: `senate`, `treasury`
//! - Documents: `_id` (**ObjectId**), `name` (**string**), `votes` (**int32**), `answers` (**array of string**)
//!
//! ## Implementation
//!
//! - A single [`mongodb::Client`] is created at startup and shared by every request, the driver pools connections
//! - Votes use `$inc`, so concurrent votes never lose updates and no read-modify-write happens here
//! - The leaderboard sort is pushed down to the server with `sort({ votes: -1 })`
//! - An update matching zero documents is not an error
//! - Documents are handed back raw, decoding into models happens at the handler boundary
use std::error::Error as StdError;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    Client, Collection, Database,
    bson::{Document, doc, oid::ObjectId},
};
use thiserror::Error;
use tracing::info;

use crate::branch::Branch;

pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Display strings are what clients see in the error envelope.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Could not get cursor from db")]
    Find(#[source] BoxError),

    #[error("Could not decode into {0}")]
    Decode(&'static str, #[source] mongodb::bson::de::Error),

    #[error("There was an error adding the candidate to the database.")]
    Insert(#[source] BoxError),

    #[error("Could not increment votes")]
    Update(#[source] BoxError),
}

#[async_trait]
pub trait CandidateStore: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    /// Every document in the branch, in store order.
    async fn find_all(&self, branch: Branch) -> Result<Vec<Document>, StoreError>;

    /// Every document in the branch, most votes first.
    async fn find_by_votes_desc(&self, branch: Branch) -> Result<Vec<Document>, StoreError>;

    async fn insert(&self, branch: Branch, document: Document) -> Result<(), StoreError>;

    /// Adds one vote and returns how many documents matched `id` (0 or 1).
    async fn increment_votes(&self, branch: Branch, id: ObjectId) -> Result<u64, StoreError>;

    async fn shutdown(&self) {}
}

pub struct MongoStore {
    client: Client,
    database: Database,
}

impl MongoStore {
    fn collection(&self, branch: Branch) -> Collection<Document> {
        self.database.collection(branch.as_str())
    }
}

pub async fn init_mongo(uri: &str, database: &str) -> Result<MongoStore, mongodb::error::Error> {
    let client = Client::with_uri_str(uri).await?;

    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await?;
    info!("Connected to MongoDB, using database {database}");

    Ok(MongoStore {
        database: client.database(database),
        client,
    })
}

#[async_trait]
impl CandidateStore for MongoStore {
    fn backend_tag(&self) -> &'static str {
        "mongodb"
    }

    async fn find_all(&self, branch: Branch) -> Result<Vec<Document>, StoreError> {
        let cursor = self
            .collection(branch)
            .find(doc! {})
            .await
            .map_err(|e| StoreError::Find(e.into()))?;

        cursor
            .try_collect::<Vec<Document>>()
            .await
            .map_err(|e| StoreError::Find(e.into()))
    }

    async fn find_by_votes_desc(&self, branch: Branch) -> Result<Vec<Document>, StoreError> {
        let cursor = self
            .collection(branch)
            .find(doc! {})
            .sort(doc! { "votes": -1 })
            .await
            .map_err(|e| StoreError::Find(e.into()))?;

        cursor
            .try_collect::<Vec<Document>>()
            .await
            .map_err(|e| StoreError::Find(e.into()))
    }

    async fn insert(&self, branch: Branch, document: Document) -> Result<(), StoreError> {
        self.collection(branch)
            .insert_one(document)
            .await
            .map_err(|e| StoreError::Insert(e.into()))?;

        Ok(())
    }

    async fn increment_votes(&self, branch: Branch, id: ObjectId) -> Result<u64, StoreError> {
        let result = self
            .collection(branch)
            .update_one(doc! { "_id": id }, doc! { "$inc": { "votes": 1 } })
            .await
            .map_err(|e| StoreError::Update(e.into()))?;

        Ok(result.matched_count)
    }

    async fn shutdown(&self) {
        info!("Disconnecting from MongoDB...");

        self.client.clone().shutdown().await;
    }
}

/// Logs store failures with their driver-level cause.
pub fn log_store_error(error: &StoreError) {
    match error.source() {
        Some(source) => tracing::error!("{error}: {source}"),
        None => tracing::error!("{error}"),
    }
}
