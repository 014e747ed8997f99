use std::collections::HashMap;

use dagv_types::{BlockStore, Codec, ContentId, StoreError};
use parking_lot::RwLock;

/// In-memory block store backed by a `HashMap`.
///
/// Suitable for tests and for validating DAGs assembled in process. Not
/// persisted across runs. Uses a [`RwLock`] so the `&self` trait methods
/// can mutate the map: lookups share a read lock, inserts take the write
/// lock.
///
/// # Example
///
/// ```rust
/// use dagv_store::MemoryBlockStore;
/// use dagv_types::Codec;
///
/// let store = MemoryBlockStore::new();
/// let cid = store.insert(Codec::Raw, b"fn main() {}");
/// assert!(store.contains(&cid));
/// assert_eq!(store.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryBlockStore {
    blocks: RwLock<HashMap<ContentId, Vec<u8>>>,
}

impl MemoryBlockStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Synchronous insert. Returns the identifier of `bytes` under `codec`.
    pub fn insert(&self, codec: Codec, bytes: &[u8]) -> ContentId {
        let cid = ContentId::for_block(codec, bytes);
        self.blocks
            .write()
            .entry(cid)
            .or_insert_with(|| bytes.to_vec());
        cid
    }

    /// Drop a block, simulating data loss. Returns whether it was present.
    pub fn remove(&self, cid: &ContentId) -> bool {
        self.blocks.write().remove(cid).is_some()
    }

    #[must_use]
    pub fn contains(&self, cid: &ContentId) -> bool {
        self.blocks.read().contains_key(cid)
    }

    /// Number of distinct blocks held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total block bytes held, excluding keys and map overhead.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.blocks
            .read()
            .values()
            .map(|bytes| bytes.len() as u64)
            .sum()
    }
}

impl BlockStore for MemoryBlockStore {
    async fn has(&self, cid: &ContentId) -> Result<bool, StoreError> {
        Ok(self.contains(cid))
    }

    async fn get(&self, cid: &ContentId) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.blocks.read().get(cid).cloned())
    }

    async fn put(&self, codec: Codec, bytes: &[u8]) -> Result<ContentId, StoreError> {
        Ok(self.insert(codec, bytes))
    }

    async fn get_size(&self, cid: &ContentId) -> Result<Option<u64>, StoreError> {
        Ok(self.blocks.read().get(cid).map(|bytes| bytes.len() as u64))
    }
}
