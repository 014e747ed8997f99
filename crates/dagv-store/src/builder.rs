use dagv_types::{BlockStore, Codec, ContentId, DagNode};
use tracing::debug;

use crate::error::BuildError;

/// Default raw chunk size (256 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 256 * 1024;

/// Default fan-out of interior nodes.
pub const DEFAULT_MAX_LINKS: usize = 174;

/// Shape of the DAG produced by [`DagBuilder`].
///
/// ```text
/// ┌────────────┬──────────────────────────────────────────────┐
/// │ Field      │ Purpose                                      │
/// ├────────────┼──────────────────────────────────────────────┤
/// │ chunk_size │ Maximum bytes per raw leaf block             │
/// │ max_links  │ Maximum children per dag-node block (≥ 2)    │
/// └────────────┴──────────────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuilderConfig {
    pub chunk_size: usize,
    pub max_links: usize,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_links: DEFAULT_MAX_LINKS,
        }
    }
}

impl BuilderConfig {
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    #[must_use]
    pub fn with_max_links(mut self, max_links: usize) -> Self {
        self.max_links = max_links;
        self
    }

    fn check(&self) -> Result<(), BuildError> {
        if self.chunk_size == 0 {
            return Err(BuildError::InvalidConfig("chunk_size must be positive"));
        }
        if self.max_links < 2 {
            return Err(BuildError::InvalidConfig("max_links must be at least 2"));
        }
        Ok(())
    }
}

/// What an import wrote.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImportSummary {
    pub root: ContentId,
    /// Raw leaf blocks written (including duplicates folded by the store).
    pub chunks: usize,
    /// Interior dag-node blocks written.
    pub nodes: usize,
    pub bytes: u64,
}

/// Imports byte streams into a store as a balanced DAG.
///
/// Data is split into raw chunks, then grouped bottom-up into dag-node
/// blocks of at most `max_links` children until one root remains:
///
/// ```text
///                  root (dag-node)
///                 /               \
///        node (dag-node)     node (dag-node)
///        /    |     \            |      \
///     raw    raw    raw         raw     raw
/// ```
///
/// A single-chunk input is returned as its raw leaf with no wrapper node.
/// Identical chunks share one block, so imported DAGs routinely contain
/// diamonds.
///
/// # Example
///
/// ```rust
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// use dagv_store::{BuilderConfig, DagBuilder, MemoryBlockStore};
///
/// let store = MemoryBlockStore::new();
/// let config = BuilderConfig::default().with_chunk_size(4);
/// let summary = DagBuilder::new(&store, config).import(b"0123456789").await.unwrap();
/// assert_eq!(summary.chunks, 3);
/// assert_eq!(summary.nodes, 1);
/// # });
/// ```
pub struct DagBuilder<'a, S> {
    store: &'a S,
    config: BuilderConfig,
}

impl<'a, S: BlockStore> DagBuilder<'a, S> {
    #[must_use]
    pub fn new(store: &'a S, config: BuilderConfig) -> Self {
        Self { store, config }
    }

    /// Import `data` and return the root identifier plus write counts.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidConfig`] for a degenerate config and
    /// [`BuildError::Store`] if any put fails.
    pub async fn import(&self, data: &[u8]) -> Result<ImportSummary, BuildError> {
        self.config.check()?;

        let mut level = Vec::with_capacity(data.len() / self.config.chunk_size + 1);
        if data.is_empty() {
            level.push(self.store.put(Codec::Raw, &[]).await?);
        } else {
            for chunk in data.chunks(self.config.chunk_size) {
                level.push(self.store.put(Codec::Raw, chunk).await?);
            }
        }
        let chunks = level.len();

        let mut nodes = 0;
        while level.len() > 1 {
            let mut parents = Vec::with_capacity(level.len().div_ceil(self.config.max_links));
            for group in level.chunks(self.config.max_links) {
                parents.push(self.add_node(group.to_vec(), Vec::new()).await?);
                nodes += 1;
            }
            level = parents;
        }

        let root = level[0];
        debug!(%root, chunks, nodes, "imported data");
        Ok(ImportSummary {
            root,
            chunks,
            nodes,
            bytes: data.len() as u64,
        })
    }

    /// Write one dag-node block with the given links and inline data.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Store`] if the put fails.
    pub async fn add_node(
        &self,
        links: Vec<ContentId>,
        data: Vec<u8>,
    ) -> Result<ContentId, BuildError> {
        let body = DagNode::new(links, data).encode();
        Ok(self.store.put(Codec::DagNode, &body).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBlockStore;

    #[tokio::test]
    async fn single_chunk_returns_raw_leaf() {
        let store = MemoryBlockStore::new();
        let summary = DagBuilder::new(&store, BuilderConfig::default())
            .import(b"small")
            .await
            .unwrap();
        assert_eq!(summary.root, ContentId::for_block(Codec::Raw, b"small"));
        assert_eq!((summary.chunks, summary.nodes), (1, 0));
    }

    #[tokio::test]
    async fn empty_input_is_one_empty_leaf() {
        let store = MemoryBlockStore::new();
        let summary = DagBuilder::new(&store, BuilderConfig::default())
            .import(b"")
            .await
            .unwrap();
        assert_eq!(summary.root, ContentId::for_block(Codec::Raw, b""));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn builds_two_levels_when_fanout_exceeded() {
        let store = MemoryBlockStore::new();
        let config = BuilderConfig::default().with_chunk_size(1).with_max_links(2);
        let summary = DagBuilder::new(&store, config).import(b"abcd").await.unwrap();

        // 4 leaves -> 2 nodes -> 1 root
        assert_eq!(summary.chunks, 4);
        assert_eq!(summary.nodes, 3);
        assert_eq!(summary.root.codec(), Codec::DagNode);
        assert_eq!(store.len(), 7);
    }

    #[tokio::test]
    async fn repeated_chunks_are_shared() {
        let store = MemoryBlockStore::new();
        let config = BuilderConfig::default().with_chunk_size(2);
        let summary = DagBuilder::new(&store, config).import(b"xxxxxx").await.unwrap();
        assert_eq!(summary.chunks, 3);
        // one shared leaf + one root
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn degenerate_config_rejected() {
        let store = MemoryBlockStore::new();
        let zero_chunk = BuilderConfig::default().with_chunk_size(0);
        assert!(matches!(
            DagBuilder::new(&store, zero_chunk).import(b"x").await,
            Err(BuildError::InvalidConfig(_))
        ));
        let one_link = BuilderConfig::default().with_max_links(1);
        assert!(matches!(
            DagBuilder::new(&store, one_link).import(b"x").await,
            Err(BuildError::InvalidConfig(_))
        ));
    }
}
