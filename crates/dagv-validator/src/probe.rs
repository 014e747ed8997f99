use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dagv_types::{BlockStore, ContentId, StoreError};

use crate::cancel::CancelToken;
use crate::error::ProbeError;

/// Block Existence Probe: cancellable, optionally time-limited
/// pass-through queries against a [`BlockStore`].
///
/// Every query checks the token before touching the store and races the
/// lookup against cancellation, so an in-flight lookup is abandoned as
/// soon as the token fires.
///
/// ```text
///   cancelled? ──yes──▶ ProbeError::Cancelled
///       │no
///       ▼
///   select! { token fires ──▶ Cancelled
///             deadline    ──▶ Timeout
///             store reply ──▶ Ok(_) | Store(StoreError) }
/// ```
pub struct BlockProbe<S> {
    store: Arc<S>,
    timeout: Option<Duration>,
}

impl<S> Clone for BlockProbe<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            timeout: self.timeout,
        }
    }
}

impl<S: BlockStore> BlockProbe<S> {
    #[must_use]
    pub fn new(store: Arc<S>, timeout: Option<Duration>) -> Self {
        Self { store, timeout }
    }

    /// # Errors
    ///
    /// See [`ProbeError`].
    pub async fn has(&self, cid: &ContentId, cancel: &CancelToken) -> Result<bool, ProbeError> {
        self.round_trip("has", cid, cancel, self.store.has(cid)).await
    }

    /// Block size in bytes, `None` when absent.
    ///
    /// # Errors
    ///
    /// See [`ProbeError`].
    pub async fn size(
        &self,
        cid: &ContentId,
        cancel: &CancelToken,
    ) -> Result<Option<u64>, ProbeError> {
        self.round_trip("get_size", cid, cancel, self.store.get_size(cid))
            .await
    }

    /// Block bytes, `None` when absent.
    ///
    /// # Errors
    ///
    /// See [`ProbeError`].
    pub async fn fetch(
        &self,
        cid: &ContentId,
        cancel: &CancelToken,
    ) -> Result<Option<Vec<u8>>, ProbeError> {
        self.round_trip("get", cid, cancel, self.store.get(cid)).await
    }

    async fn round_trip<T>(
        &self,
        op: &'static str,
        cid: &ContentId,
        cancel: &CancelToken,
        lookup: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, ProbeError> {
        if cancel.is_cancelled() {
            return Err(ProbeError::Cancelled);
        }

        let bounded = with_deadline(self.timeout, op, cid, lookup);

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(ProbeError::Cancelled),
            reply = bounded => reply,
        }
    }
}

async fn with_deadline<T>(
    timeout: Option<Duration>,
    op: &'static str,
    cid: &ContentId,
    lookup: impl Future<Output = Result<T, StoreError>>,
) -> Result<T, ProbeError> {
    let reply = match timeout {
        Some(after) => match tokio::time::timeout(after, lookup).await {
            Ok(reply) => reply,
            Err(_) => {
                return Err(ProbeError::Timeout {
                    op,
                    cid: cid.to_string(),
                    after,
                });
            }
        },
        None => lookup.await,
    };
    reply.map_err(|source| ProbeError::Store {
        op,
        cid: cid.to_string(),
        source,
    })
}
