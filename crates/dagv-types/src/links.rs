use crate::cid::ContentId;
use crate::codec::Codec;
use crate::error::NodeError;
use crate::node::DagNode;

/// Resolves the child links declared inside a fetched block.
///
/// An `Ok(vec![])` means the block is a leaf. An `Err` means the block
/// claimed to be link-structured but did not decode; the walker treats
/// that as a leaf too, never as a missing block.
pub trait LinkResolver: Send + Sync {
    /// Whether blocks named by `cid` can carry links at all. Blocks that
    /// cannot are sized without being fetched.
    fn may_have_links(&self, cid: &ContentId) -> bool;

    /// # Errors
    ///
    /// Returns [`NodeError`] when the block body does not decode.
    fn links(&self, cid: &ContentId, block: &[u8]) -> Result<Vec<ContentId>, NodeError>;
}

/// Default resolver: raw blocks have no links, dag-node blocks are
/// decoded with [`DagNode::decode`].
#[derive(Clone, Copy, Debug, Default)]
pub struct DagLinkResolver;

impl LinkResolver for DagLinkResolver {
    fn may_have_links(&self, cid: &ContentId) -> bool {
        cid.codec() == Codec::DagNode
    }

    fn links(&self, cid: &ContentId, block: &[u8]) -> Result<Vec<ContentId>, NodeError> {
        match cid.codec() {
            Codec::Raw => Ok(Vec::new()),
            Codec::DagNode => DagNode::decode(block).map(|node| node.links),
        }
    }
}
