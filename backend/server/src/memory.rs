//! In-process [`CandidateStore`] holding raw documents per branch.
//!
//! Mirrors the MongoDB semantics the handlers rely on: `$inc` on a missing
//! field starts from zero, an int32 count widens to int64 instead of
//! overflowing, an update matching nothing is not an error, and the votes sort
//! is stable with respect to insertion order. Only used by tests.
use std::{
    cmp::Reverse,
    collections::HashMap,
    sync::atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use mongodb::bson::{Bson, Document, oid::ObjectId};
use tokio::sync::Mutex;

use crate::{
    branch::Branch,
    database::{BoxError, CandidateStore, StoreError},
};

#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<Branch, Vec<Document>>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a document as-is, skipping any validation.
    pub async fn seed(&self, branch: Branch, document: Document) {
        self.collections
            .lock()
            .await
            .entry(branch)
            .or_default()
            .push(document);
    }

    pub async fn documents(&self, branch: Branch) -> Vec<Document> {
        self.collections
            .lock()
            .await
            .get(&branch)
            .cloned()
            .unwrap_or_default()
    }

    /// Makes every following operation fail as if the server were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self, fail: fn(BoxError) -> StoreError) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(fail("memory store unavailable".into()));
        }

        Ok(())
    }
}

fn votes_of(document: &Document) -> i64 {
    match document.get("votes") {
        Some(Bson::Int32(votes)) => i64::from(*votes),
        Some(Bson::Int64(votes)) => *votes,
        _ => i64::MIN,
    }
}

#[async_trait]
impl CandidateStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn find_all(&self, branch: Branch) -> Result<Vec<Document>, StoreError> {
        self.check(StoreError::Find)?;

        Ok(self.documents(branch).await)
    }

    async fn find_by_votes_desc(&self, branch: Branch) -> Result<Vec<Document>, StoreError> {
        self.check(StoreError::Find)?;

        let mut documents = self.documents(branch).await;
        documents.sort_by_key(|document| Reverse(votes_of(document)));

        Ok(documents)
    }

    async fn insert(&self, branch: Branch, document: Document) -> Result<(), StoreError> {
        self.check(StoreError::Insert)?;

        self.seed(branch, document).await;

        Ok(())
    }

    async fn increment_votes(&self, branch: Branch, id: ObjectId) -> Result<u64, StoreError> {
        self.check(StoreError::Update)?;

        let mut collections = self.collections.lock().await;
        let Some(document) = collections
            .get_mut(&branch)
            .and_then(|documents| {
                documents
                    .iter_mut()
                    .find(|d| d.get_object_id("_id").ok() == Some(id))
            })
        else {
            return Ok(0);
        };

        // int32 widens to int64 on overflow, int64 overflow is refused
        let votes = match document.get("votes") {
            Some(Bson::Int32(votes)) => votes
                .checked_add(1)
                .map_or_else(|| Bson::Int64(i64::from(*votes) + 1), Bson::Int32),
            Some(Bson::Int64(votes)) => match votes.checked_add(1) {
                Some(votes) => Bson::Int64(votes),
                None => return Err(StoreError::Update("votes overflow int64".into())),
            },
            None => Bson::Int32(1),
            Some(other) => {
                return Err(StoreError::Update(
                    format!("cannot increment non-numeric votes {other}").into(),
                ));
            }
        };
        document.insert("votes", votes);

        Ok(1)
    }
}
