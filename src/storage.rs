//! Storage index: maps buckets and data items to the storage nodes that
//! host them. A dummy in-memory implementation, as in the source design —
//! production deployments back this with real object-store metadata.

use std::collections::{HashMap, HashSet};

use crate::error::SchedulerError;
use crate::model::DataItem;

#[derive(Debug, Default)]
pub struct StorageIndex {
    buckets: HashMap<String, HashSet<String>>,
    items: HashMap<(String, String), DataItem>,
    tree: HashMap<(String, String), HashSet<String>>,
}

impl StorageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `node` as a replica host for `bucket`.
    pub fn make_bucket(&mut self, bucket: impl Into<String>, node: impl Into<String>) {
        self.buckets
            .entry(bucket.into())
            .or_default()
            .insert(node.into());
    }

    /// Records `item` and makes every node currently hosting its bucket a
    /// data node for it too. Fails if the bucket has no hosting node.
    pub fn put(&mut self, item: DataItem) -> Result<(), SchedulerError> {
        let nodes = self
            .buckets
            .get(&item.bucket)
            .filter(|nodes| !nodes.is_empty())
            .ok_or_else(|| SchedulerError::MissingBucket(item.bucket.clone()))?
            .clone();

        let key = (item.bucket.clone(), item.name.clone());
        self.tree.entry(key.clone()).or_default().extend(nodes);
        self.items.insert(key, item);
        Ok(())
    }

    pub fn stat(&self, bucket: &str, name: &str) -> Option<&DataItem> {
        self.items.get(&(bucket.to_string(), name.to_string()))
    }

    pub fn bucket_nodes(&self, bucket: &str) -> HashSet<String> {
        self.buckets.get(bucket).cloned().unwrap_or_default()
    }

    pub fn data_nodes(&self, bucket: &str, name: &str) -> HashSet<String> {
        self.tree
            .get(&(bucket.to_string(), name.to_string()))
            .cloned()
            .unwrap_or_default()
    }
}
