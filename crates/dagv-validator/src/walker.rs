use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dagv_types::{BlockStore, ContentId, LinkResolver};
use parking_lot::Mutex;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, warn};

use crate::cancel::CancelToken;
use crate::error::{ProbeError, WalkError, WalkFailure};
use crate::probe::BlockProbe;
use crate::result::ResultAggregator;

/// Identifiers discovered by a walk. Grows only.
///
/// [`claim`](Self::claim) is the single check-and-insert step: exactly one
/// caller wins for each identifier, however many workers race on it.
#[derive(Debug, Default)]
pub struct RequiredSet {
    inner: Mutex<HashSet<ContentId>>,
}

impl RequiredSet {
    /// Insert `cid`; `true` only for the first caller.
    pub fn claim(&self, cid: ContentId) -> bool {
        self.inner.lock().insert(cid)
    }

    #[must_use]
    pub fn contains(&self, cid: &ContentId) -> bool {
        self.inner.lock().contains(cid)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn snapshot(&self) -> HashSet<ContentId> {
        self.inner.lock().clone()
    }
}

/// What a walk found: the required set and the bytes it accounts for.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WalkReport {
    pub required: HashSet<ContentId>,
    pub reachable_size: u64,
}

/// State shared between the coordinator and its visit tasks.
struct WalkShared<S, L> {
    probe: BlockProbe<S>,
    resolver: Arc<L>,
    required: RequiredSet,
    reachable_size: AtomicU64,
    diagnostics: Arc<ResultAggregator>,
}

impl<S, L> WalkShared<S, L> {
    fn report(&self) -> WalkReport {
        WalkReport {
            required: self.required.snapshot(),
            reachable_size: self.reachable_size.load(Ordering::Acquire),
        }
    }
}

/// DAG Walker: discovers every block reachable from a root and sums
/// their sizes, visiting each block at most once.
///
/// # Scheduling
///
/// A coordinator owns a FIFO work queue and a [`JoinSet`] of visit tasks,
/// keeping at most `max_concurrency` of them in flight:
///
/// ```text
///              ┌──────────── queue ◀───────────────┐
///              ▼                                   │ children
///   coordinator ──spawn (≤ max_concurrency)──▶ visit(cid)
///       ▲                                          │
///       └──────────── join_next ◀──────────────────┘
/// ```
///
/// # One visit
///
/// ```text
///   cancelled?            ──▶ WalkError::Cancelled
///   required.claim(cid)?  ──no──▶ no children (already visited)
///   may_have_links?
///     no  ──▶ probe.size   ──▶ add size, leaf
///     yes ──▶ probe.fetch  ──▶ add len, resolver.links (decode failure = leaf)
/// ```
///
/// An absent or unreadable root fails the walk. An absent child stays in
/// the required set with no size, so the caller can report it missing; a
/// store error on a child is written to the diagnostics, lowers
/// `can_restore`, and the walk goes on. Cancellation aborts outstanding
/// tasks and returns the partial report inside [`WalkFailure`].
pub struct DagWalker<S, L> {
    probe: BlockProbe<S>,
    resolver: Arc<L>,
    max_concurrency: usize,
}

impl<S, L> Clone for DagWalker<S, L> {
    fn clone(&self) -> Self {
        Self {
            probe: self.probe.clone(),
            resolver: Arc::clone(&self.resolver),
            max_concurrency: self.max_concurrency,
        }
    }
}

enum Step<T> {
    Cancelled,
    Joined(Option<Result<T, JoinError>>),
}

impl<S, L> DagWalker<S, L>
where
    S: BlockStore + 'static,
    L: LinkResolver + 'static,
{
    #[must_use]
    pub fn new(probe: BlockProbe<S>, resolver: Arc<L>, max_concurrency: usize) -> Self {
        Self {
            probe,
            resolver,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Walk the DAG under `root`.
    ///
    /// Store errors on non-root blocks are appended to `diagnostics` and
    /// lower its `can_restore` flag; the walk itself continues.
    ///
    /// # Errors
    ///
    /// Returns [`WalkFailure`] when the root cannot be read, a task dies, or
    /// `cancel` fires; the failure carries the partial report.
    pub async fn walk(
        &self,
        root: ContentId,
        cancel: &CancelToken,
        diagnostics: Arc<ResultAggregator>,
    ) -> Result<WalkReport, WalkFailure> {
        let shared = Arc::new(WalkShared {
            probe: self.probe.clone(),
            resolver: Arc::clone(&self.resolver),
            required: RequiredSet::default(),
            reachable_size: AtomicU64::new(0),
            diagnostics,
        });

        let mut queue = VecDeque::from([(root, true)]);
        let mut tasks = JoinSet::new();

        let failure = loop {
            while tasks.len() < self.max_concurrency {
                let Some((cid, is_root)) = queue.pop_front() else {
                    break;
                };
                let shared = Arc::clone(&shared);
                let cancel = cancel.clone();
                tasks.spawn(async move { visit(&shared, cid, is_root, &cancel).await });
            }

            let step = tokio::select! {
                biased;
                () = cancel.cancelled() => Step::Cancelled,
                joined = tasks.join_next() => Step::Joined(joined),
            };

            match step {
                Step::Cancelled => break Some(WalkError::Cancelled),
                Step::Joined(None) => break None,
                Step::Joined(Some(Ok(Ok(children)))) => {
                    queue.extend(children.into_iter().map(|child| (child, false)));
                }
                Step::Joined(Some(Ok(Err(error)))) => break Some(error),
                Step::Joined(Some(Err(joined))) => {
                    break Some(WalkError::Worker(joined.to_string()));
                }
            }
        };

        tasks.abort_all();
        let report = shared.report();
        debug!(
            %root,
            required = report.required.len(),
            reachable_size = report.reachable_size,
            "walk finished"
        );

        match failure {
            None => Ok(report),
            Some(error) => Err(WalkFailure {
                error,
                partial: report,
            }),
        }
    }
}

async fn visit<S, L>(
    shared: &WalkShared<S, L>,
    cid: ContentId,
    is_root: bool,
    cancel: &CancelToken,
) -> Result<Vec<ContentId>, WalkError>
where
    S: BlockStore,
    L: LinkResolver,
{
    if cancel.is_cancelled() {
        return Err(WalkError::Cancelled);
    }
    if !shared.required.claim(cid) {
        return Ok(Vec::new());
    }

    if !shared.resolver.may_have_links(&cid) {
        return match shared.probe.size(&cid, cancel).await {
            Ok(Some(size)) => {
                shared.reachable_size.fetch_add(size, Ordering::AcqRel);
                Ok(Vec::new())
            }
            Ok(None) => absent(cid, is_root),
            Err(error) => unreadable(shared, cid, is_root, error),
        };
    }

    match shared.probe.fetch(&cid, cancel).await {
        Ok(Some(bytes)) => {
            shared
                .reachable_size
                .fetch_add(bytes.len() as u64, Ordering::AcqRel);
            match shared.resolver.links(&cid, &bytes) {
                Ok(links) => Ok(links),
                Err(error) => {
                    debug!(%cid, %error, "block does not decode as a node, treating as leaf");
                    Ok(Vec::new())
                }
            }
        }
        Ok(None) => absent(cid, is_root),
        Err(error) => unreadable(shared, cid, is_root, error),
    }
}

fn absent(cid: ContentId, is_root: bool) -> Result<Vec<ContentId>, WalkError> {
    if is_root {
        return Err(WalkError::RootUnavailable {
            root: cid.to_string(),
        });
    }
    debug!(%cid, "required block absent from store");
    Ok(Vec::new())
}

fn unreadable<S, L>(
    shared: &WalkShared<S, L>,
    cid: ContentId,
    is_root: bool,
    error: ProbeError,
) -> Result<Vec<ContentId>, WalkError> {
    match error {
        ProbeError::Cancelled => Err(WalkError::Cancelled),
        error if is_root => Err(WalkError::Root(error)),
        error => {
            // The block and everything below it are unverified.
            warn!(%cid, %error, "store error during walk");
            shared.diagnostics.add_error(error.to_string());
            shared.diagnostics.set_can_restore(false);
            Ok(Vec::new())
        }
    }
}
