use std::future::Future;

use crate::cid::ContentId;
use crate::codec::Codec;
use crate::error::StoreError;

/// Content-addressed block store.
///
/// Maps [`ContentId`]s to block bytes. Implementations can be in-memory,
/// file-backed, or networked. Every lookup may suspend and every lookup
/// may fail; callers decide whether a failure is fatal.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` and every returned future must
/// be `Send`, so one store can be shared by many concurrent validation
/// runs and by the walker's worker tasks.
///
/// # Lookup cost
///
/// ```text
/// has(cid)       ── presence only, cheapest
/// get_size(cid)  ── presence + length; defaults to get() when the
///                   backend has no cheaper way to learn the length
/// get(cid)       ── full bytes
/// put(codec, b)  ── importers only, the validator never writes
/// ```
pub trait BlockStore: Send + Sync {
    /// Whether a block is stored under `cid`.
    fn has(&self, cid: &ContentId) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Fetch the block bytes, or `None` if absent.
    fn get(
        &self,
        cid: &ContentId,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, StoreError>> + Send;

    /// Store `bytes` under the identifier derived from `codec` and their
    /// digest. Storing the same bytes twice is a no-op.
    fn put(
        &self,
        codec: Codec,
        bytes: &[u8],
    ) -> impl Future<Output = Result<ContentId, StoreError>> + Send;

    /// Size in bytes of the block, or `None` if absent.
    fn get_size(
        &self,
        cid: &ContentId,
    ) -> impl Future<Output = Result<Option<u64>, StoreError>> + Send {
        async move { Ok(self.get(cid).await?.map(|bytes| bytes.len() as u64)) }
    }
}
