use dagv_types::{BlockStore, Codec, ContentId, DagNode};

use crate::error::ReadError;

/// Reassembles the bytes behind a DAG produced by
/// [`DagBuilder`](crate::DagBuilder).
///
/// Traversal is depth-first in link order. For each dag-node block its
/// inline `data` is emitted before its children; raw blocks emit their
/// whole body.
pub struct DagReader<'a, S> {
    store: &'a S,
}

impl<'a, S: BlockStore> DagReader<'a, S> {
    #[must_use]
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Read every byte reachable from `root`.
    ///
    /// # Errors
    ///
    /// Any absent block, undecodable node, or store failure aborts the read.
    pub async fn read_all(&self, root: &ContentId) -> Result<Vec<u8>, ReadError> {
        let mut out = Vec::new();
        let mut stack = vec![*root];

        while let Some(cid) = stack.pop() {
            let bytes = self
                .store
                .get(&cid)
                .await?
                .ok_or_else(|| ReadError::Missing {
                    cid: cid.to_string(),
                })?;

            match cid.codec() {
                Codec::Raw => out.extend_from_slice(&bytes),
                Codec::DagNode => {
                    let node = DagNode::decode(&bytes).map_err(|source| ReadError::Node {
                        cid: cid.to_string(),
                        source,
                    })?;
                    out.extend_from_slice(&node.data);
                    stack.extend(node.links.iter().rev());
                }
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{BuilderConfig, DagBuilder};
    use crate::memory::MemoryBlockStore;

    #[tokio::test]
    async fn reads_back_imported_data() {
        let store = MemoryBlockStore::new();
        let data: Vec<u8> = (0..=255u8).cycle().take(5000).collect();
        let config = BuilderConfig::default().with_chunk_size(64).with_max_links(3);
        let summary = DagBuilder::new(&store, config).import(&data).await.unwrap();

        let back = DagReader::new(&store).read_all(&summary.root).await.unwrap();
        assert_eq!(back, data);
    }

    #[tokio::test]
    async fn node_data_precedes_children() {
        let store = MemoryBlockStore::new();
        let builder = DagBuilder::new(&store, BuilderConfig::default());
        let child = store.insert(Codec::Raw, b"-child");
        let root = builder.add_node(vec![child], b"parent".to_vec()).await.unwrap();

        let back = DagReader::new(&store).read_all(&root).await.unwrap();
        assert_eq!(back, b"parent-child");
    }

    #[tokio::test]
    async fn missing_leaf_is_fatal() {
        let store = MemoryBlockStore::new();
        let config = BuilderConfig::default().with_chunk_size(2);
        let summary = DagBuilder::new(&store, config).import(b"aabb").await.unwrap();
        store.remove(&ContentId::for_block(Codec::Raw, b"bb"));

        assert!(matches!(
            DagReader::new(&store).read_all(&summary.root).await,
            Err(ReadError::Missing { .. })
        ));
    }

    #[tokio::test]
    async fn garbage_node_is_fatal() {
        let store = MemoryBlockStore::new();
        let root = store.insert(Codec::DagNode, b"not a node");
        assert!(matches!(
            DagReader::new(&store).read_all(&root).await,
            Err(ReadError::Node { .. })
        ));
    }
}
