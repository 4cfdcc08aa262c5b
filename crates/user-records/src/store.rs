//! Document persistence.
//!
//! Documents are JSON objects grouped by collection. The store owns the
//! `id`, `createdAt` and `updatedAt` fields.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use parking_lot::Mutex;
use serde_json::{Map, Value};

use crate::error::UserError;

// ============================================================================
// DocumentStore
// ============================================================================

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find_all(&self, collection: &str) -> Result<Vec<Value>, UserError>;

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>, UserError>;

    /// First document whose `field` equals `value`.
    async fn find_one(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Option<Value>, UserError>;

    /// Stores a new document, assigning `id` (when missing or empty) and both
    /// timestamps. Returns the stored document.
    async fn insert(&self, collection: &str, document: Value) -> Result<Value, UserError>;

    /// Like [`DocumentStore::insert`], but fails with `Conflict` when another
    /// document already holds the same value in `field`. The check and the
    /// write are one atomic step.
    async fn insert_unique(
        &self,
        collection: &str,
        field: &str,
        document: Value,
    ) -> Result<Value, UserError>;

    /// Shallow-merges `patch` into the document and bumps `updatedAt`.
    /// `None` when no document has that id.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Value,
    ) -> Result<Option<Value>, UserError>;

    /// Like [`DocumentStore::update`], but fails with `Conflict` when a
    /// different document already holds the patched value of `field`. The
    /// check and the write are one atomic step.
    async fn update_unique(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        patch: Value,
    ) -> Result<Option<Value>, UserError>;

    /// Removes and returns the document, `None` when absent.
    async fn delete(&self, collection: &str, id: &str) -> Result<Option<Value>, UserError>;
}

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory `DocumentStore`. Insertion order is preserved per collection.
#[derive(Default)]
pub struct MemoryStore {
    /// collection name → documents
    collections: Mutex<HashMap<String, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .get(collection)
            .map_or(0, Vec::len)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }
}

fn now() -> Value {
    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn id_of(document: &Value) -> Option<&str> {
    document.get("id").and_then(Value::as_str)
}

fn conflict(collection: &str, field: &str) -> UserError {
    tracing::debug!(collection, field, "unique field already taken");
    UserError::Conflict("User already exists".into())
}

/// Fills in `id` (when missing or empty) and both timestamps.
fn stamp_new(mut document: Value) -> Result<Value, UserError> {
    let fields = document
        .as_object_mut()
        .ok_or_else(|| UserError::Store("document must be a JSON object".into()))?;

    let needs_id = match fields.get("id") {
        None => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => true,
    };
    if needs_id {
        fields.insert("id".into(), Value::String(uuid::Uuid::new_v4().to_string()));
    }
    let timestamp = now();
    fields.insert("createdAt".into(), timestamp.clone());
    fields.insert("updatedAt".into(), timestamp);
    Ok(document)
}

fn push_new(docs: &mut Vec<Value>, collection: &str, document: Value) -> Result<Value, UserError> {
    if let Some(id) = id_of(&document) {
        if docs.iter().any(|doc| id_of(doc) == Some(id)) {
            return Err(UserError::Store(format!("duplicate id {id} in {collection}")));
        }
    }
    docs.push(document.clone());
    Ok(document)
}

fn merge_patch(docs: &mut [Value], id: &str, patch: Map<String, Value>) -> Option<Value> {
    let document = docs.iter_mut().find(|doc| id_of(doc) == Some(id))?;
    if let Some(fields) = document.as_object_mut() {
        for (key, value) in patch {
            if key == "id" || key == "createdAt" {
                continue;
            }
            fields.insert(key, value);
        }
        fields.insert("updatedAt".into(), now());
    }
    Some(document.clone())
}

fn into_patch(patch: Value) -> Result<Map<String, Value>, UserError> {
    match patch {
        Value::Object(patch) => Ok(patch),
        _ => Err(UserError::Store("patch must be a JSON object".into())),
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_all(&self, collection: &str) -> Result<Vec<Value>, UserError> {
        Ok(self
            .collections
            .lock()
            .get(collection)
            .cloned()
            .unwrap_or_default())
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>, UserError> {
        Ok(self
            .collections
            .lock()
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| id_of(doc) == Some(id)))
            .cloned())
    }

    async fn find_one(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Option<Value>, UserError> {
        Ok(self
            .collections
            .lock()
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| doc.get(field) == Some(value)))
            .cloned())
    }

    async fn insert(&self, collection: &str, document: Value) -> Result<Value, UserError> {
        let document = stamp_new(document)?;
        let mut collections = self.collections.lock();
        let docs = collections.entry(collection.to_string()).or_default();
        push_new(docs, collection, document)
    }

    async fn insert_unique(
        &self,
        collection: &str,
        field: &str,
        document: Value,
    ) -> Result<Value, UserError> {
        let document = stamp_new(document)?;
        let mut collections = self.collections.lock();
        let docs = collections.entry(collection.to_string()).or_default();
        if let Some(value) = document.get(field) {
            if docs.iter().any(|doc| doc.get(field) == Some(value)) {
                return Err(conflict(collection, field));
            }
        }
        push_new(docs, collection, document)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Value,
    ) -> Result<Option<Value>, UserError> {
        let patch = into_patch(patch)?;
        let mut collections = self.collections.lock();
        Ok(collections
            .get_mut(collection)
            .and_then(|docs| merge_patch(docs, id, patch)))
    }

    async fn update_unique(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        patch: Value,
    ) -> Result<Option<Value>, UserError> {
        let patch = into_patch(patch)?;
        let mut collections = self.collections.lock();
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(None);
        };
        if let Some(value) = patch.get(field) {
            let taken = docs
                .iter()
                .any(|doc| id_of(doc) != Some(id) && doc.get(field) == Some(value));
            if taken && docs.iter().any(|doc| id_of(doc) == Some(id)) {
                return Err(conflict(collection, field));
            }
        }
        Ok(merge_patch(docs, id, patch))
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<Option<Value>, UserError> {
        let mut collections = self.collections.lock();
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(None);
        };
        Ok(docs
            .iter()
            .position(|doc| id_of(doc) == Some(id))
            .map(|index| docs.remove(index)))
    }
}
