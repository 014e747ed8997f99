//! Shared fixtures for the dagv integration tests and benches.
//!
//! - DAG shapes: [`diamond`], [`chain`], [`wide`]
//! - Store wrappers: [`FaultyStore`] (per-block backend errors),
//!   [`SlowStore`] (fixed latency per lookup), [`CountingStore`] (lookup
//!   counts per block)
//! - [`collect_dag`]: every identifier reachable from a root

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use dagv_store::{BuilderConfig, DagBuilder, MemoryBlockStore};
use dagv_types::{BlockStore, Codec, ContentId, DagNode, StoreError};
use parking_lot::Mutex;

// ── DAG shapes ────────────────────────────────────────────────────────────────

/// ```text
///        root
///       /    \
///    left    right
///       \    /
///       shared
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Diamond {
    pub root: ContentId,
    pub left: ContentId,
    pub right: ContentId,
    pub shared: ContentId,
}

impl Diamond {
    #[must_use]
    pub fn all(&self) -> [ContentId; 4] {
        [self.root, self.left, self.right, self.shared]
    }
}

pub async fn diamond(store: &MemoryBlockStore) -> Diamond {
    let builder = DagBuilder::new(store, BuilderConfig::default());
    let shared = store.insert(Codec::Raw, b"shared leaf bytes");
    let left = node(&builder, vec![shared], b"left").await;
    let right = node(&builder, vec![shared], b"right").await;
    let root = node(&builder, vec![left, right], b"").await;
    Diamond {
        root,
        left,
        right,
        shared,
    }
}

/// A linked list of `len` dag-node blocks ending in one raw leaf. Returns
/// the identifiers head first.
pub async fn chain(store: &MemoryBlockStore, len: usize) -> Vec<ContentId> {
    let builder = DagBuilder::new(store, BuilderConfig::default());
    let mut ids = vec![store.insert(Codec::Raw, b"tail")];
    for i in 0..len {
        let next = ids[ids.len() - 1];
        ids.push(node(&builder, vec![next], i.to_string().as_bytes()).await);
    }
    ids.reverse();
    ids
}

/// A balanced tree over `leaves` distinct one-chunk leaves with the given
/// fan-out. Returns the root.
pub async fn wide(store: &MemoryBlockStore, leaves: usize, fanout: usize) -> ContentId {
    let data: Vec<u8> = (0..leaves)
        .flat_map(|i| (i as u64).to_le_bytes())
        .collect();
    let config = BuilderConfig::default()
        .with_chunk_size(8)
        .with_max_links(fanout);
    DagBuilder::new(store, config)
        .import(&data)
        .await
        .expect("memory store import cannot fail")
        .root
}

async fn node(
    builder: &DagBuilder<'_, MemoryBlockStore>,
    links: Vec<ContentId>,
    data: &[u8],
) -> ContentId {
    builder
        .add_node(links, data.to_vec())
        .await
        .expect("memory store put cannot fail")
}

/// Every identifier reachable from `root` that is present in `store`.
pub async fn collect_dag<S: BlockStore>(store: &S, root: ContentId) -> HashSet<ContentId> {
    let mut seen = HashSet::new();
    let mut stack = vec![root];
    while let Some(cid) = stack.pop() {
        if !seen.insert(cid) || cid.codec() != Codec::DagNode {
            continue;
        }
        if let Ok(Some(bytes)) = store.get(&cid).await {
            if let Ok(node) = DagNode::decode(&bytes) {
                stack.extend(node.links);
            }
        }
    }
    seen
}

// ── Store wrappers ────────────────────────────────────────────────────────────

/// Fails every lookup of the chosen blocks with a backend error.
pub struct FaultyStore<S> {
    pub inner: S,
    broken: HashSet<ContentId>,
}

impl<S> FaultyStore<S> {
    pub fn new(inner: S, broken: impl IntoIterator<Item = ContentId>) -> Self {
        Self {
            inner,
            broken: broken.into_iter().collect(),
        }
    }

    fn check(&self, cid: &ContentId) -> Result<(), StoreError> {
        if self.broken.contains(cid) {
            return Err(StoreError::Backend(format!("injected fault for {cid}")));
        }
        Ok(())
    }
}

impl<S: BlockStore> BlockStore for FaultyStore<S> {
    async fn has(&self, cid: &ContentId) -> Result<bool, StoreError> {
        self.check(cid)?;
        self.inner.has(cid).await
    }

    async fn get(&self, cid: &ContentId) -> Result<Option<Vec<u8>>, StoreError> {
        self.check(cid)?;
        self.inner.get(cid).await
    }

    async fn put(&self, codec: Codec, bytes: &[u8]) -> Result<ContentId, StoreError> {
        self.inner.put(codec, bytes).await
    }

    async fn get_size(&self, cid: &ContentId) -> Result<Option<u64>, StoreError> {
        self.check(cid)?;
        self.inner.get_size(cid).await
    }
}

/// Adds a fixed latency before every lookup.
pub struct SlowStore<S> {
    pub inner: S,
    delay: Duration,
}

impl<S> SlowStore<S> {
    pub fn new(inner: S, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

impl<S: BlockStore> BlockStore for SlowStore<S> {
    async fn has(&self, cid: &ContentId) -> Result<bool, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.has(cid).await
    }

    async fn get(&self, cid: &ContentId) -> Result<Option<Vec<u8>>, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.get(cid).await
    }

    async fn put(&self, codec: Codec, bytes: &[u8]) -> Result<ContentId, StoreError> {
        self.inner.put(codec, bytes).await
    }

    async fn get_size(&self, cid: &ContentId) -> Result<Option<u64>, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.get_size(cid).await
    }
}

/// Counts `get` and `get_size` calls per block.
pub struct CountingStore<S> {
    pub inner: S,
    reads: Mutex<HashMap<ContentId, usize>>,
}

impl<S> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            reads: Mutex::new(HashMap::new()),
        }
    }

    /// Highest read count seen for any single block.
    pub fn max_reads(&self) -> usize {
        self.reads.lock().values().copied().max().unwrap_or(0)
    }

    pub fn reads_of(&self, cid: &ContentId) -> usize {
        self.reads.lock().get(cid).copied().unwrap_or(0)
    }

    fn record(&self, cid: &ContentId) {
        *self.reads.lock().entry(*cid).or_default() += 1;
    }
}

impl<S: BlockStore> BlockStore for CountingStore<S> {
    async fn has(&self, cid: &ContentId) -> Result<bool, StoreError> {
        self.inner.has(cid).await
    }

    async fn get(&self, cid: &ContentId) -> Result<Option<Vec<u8>>, StoreError> {
        self.record(cid);
        self.inner.get(cid).await
    }

    async fn put(&self, codec: Codec, bytes: &[u8]) -> Result<ContentId, StoreError> {
        self.inner.put(codec, bytes).await
    }

    async fn get_size(&self, cid: &ContentId) -> Result<Option<u64>, StoreError> {
        self.record(cid);
        self.inner.get_size(cid).await
    }
}
