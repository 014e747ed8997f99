use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use dagv_types::{BlockStore, ContentId, DagLinkResolver, LinkResolver};
use tracing::{debug, info, warn};

use crate::cancel::CancelToken;
use crate::config::ValidatorConfig;
use crate::error::{ProbeError, ValidateError};
use crate::probe::BlockProbe;
use crate::result::{ResultAggregator, ValidationResult};
use crate::walker::DagWalker;

/// Progress of one `validate` call, logged at debug level.
///
/// ```text
/// Init ─▶ InputChecked ─▶ BlocksChecked ─▶ DagWalked ─▶ Reconciled ─▶ Finalized
///   └──────────┴──────────────┴─▶ Rejected (error returned, no result)
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ValidationStage {
    Init,
    InputChecked,
    BlocksChecked,
    DagWalked,
    Reconciled,
    Finalized,
    Rejected,
}

impl fmt::Display for ValidationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::InputChecked => "input-checked",
            Self::BlocksChecked => "blocks-checked",
            Self::DagWalked => "dag-walked",
            Self::Reconciled => "reconciled",
            Self::Finalized => "finalized",
            Self::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

/// Decides whether a DAG rooted at a given identifier is fully present in
/// a [`BlockStore`], and accounts for what is missing or malformed.
///
/// A `Validator` is cheap to clone and carries no per-call state, so one
/// instance can serve any number of concurrent
/// [`validate`](Self::validate) calls.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use dagv_store::MemoryBlockStore;
/// use dagv_types::Codec;
/// use dagv_validator::{CancelToken, Validator, ValidatorConfig};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let store = Arc::new(MemoryBlockStore::new());
/// let leaf = store.insert(Codec::Raw, b"hello");
///
/// let validator = Validator::new(store, ValidatorConfig::default());
/// let root = leaf.to_string();
/// let result = validator
///     .validate(&CancelToken::new(), &root, Some(&[root.as_str()][..]))
///     .await
///     .unwrap();
///
/// assert!(result.is_complete && result.can_restore);
/// assert_eq!(result.reachable_size, 5);
/// # });
/// ```
pub struct Validator<S, L = DagLinkResolver> {
    store: Arc<S>,
    resolver: Arc<L>,
    config: ValidatorConfig,
}

impl<S, L> Clone for Validator<S, L> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            resolver: Arc::clone(&self.resolver),
            config: self.config,
        }
    }
}

impl<S: BlockStore + 'static> Validator<S> {
    /// Validator that follows links of the built-in dag-node format.
    #[must_use]
    pub fn new(store: Arc<S>, config: ValidatorConfig) -> Self {
        Self::with_resolver(store, Arc::new(DagLinkResolver), config)
    }
}

impl<S, L> Validator<S, L>
where
    S: BlockStore + 'static,
    L: LinkResolver + 'static,
{
    #[must_use]
    pub fn with_resolver(store: Arc<S>, resolver: Arc<L>, config: ValidatorConfig) -> Self {
        Self {
            store,
            resolver,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate the DAG under `root` against the supplied candidates.
    ///
    /// Each candidate is decoded and probed for presence; undecodable
    /// strings land in `invalid_blocks`, absent ones in `missing_blocks`.
    /// The DAG is then walked from `root` and any required block that is
    /// neither present among the candidates nor already reported is added
    /// to `missing_blocks`. A failed walk is recorded in `error_details`
    /// and forces `can_restore = false`.
    ///
    /// # Errors
    ///
    /// - [`ValidateError::EmptyRoot`] for `root == ""`
    /// - [`ValidateError::MissingCandidates`] for `candidates == None`
    /// - [`ValidateError::InvalidRoot`] when `root` does not decode
    /// - [`ValidateError::Cancelled`] when `cancel` fires before every
    ///   candidate has been checked
    pub async fn validate<C: AsRef<str>>(
        &self,
        cancel: &CancelToken,
        root: &str,
        candidates: Option<&[C]>,
    ) -> Result<ValidationResult, ValidateError> {
        let mut stage = ValidationStage::Init;
        match self.run(cancel, root, candidates, &mut stage).await {
            Ok(result) => Ok(result),
            Err(error) => {
                debug!(%root, from = %stage, to = %ValidationStage::Rejected, "stage");
                warn!(%root, %error, "validation rejected");
                Err(error)
            }
        }
    }

    async fn run<C: AsRef<str>>(
        &self,
        cancel: &CancelToken,
        root: &str,
        candidates: Option<&[C]>,
        stage: &mut ValidationStage,
    ) -> Result<ValidationResult, ValidateError> {
        if root.is_empty() {
            return Err(ValidateError::EmptyRoot);
        }
        let candidates = candidates.ok_or(ValidateError::MissingCandidates)?;
        let root_cid = ContentId::decode(root)?;
        if cancel.is_cancelled() {
            return Err(ValidateError::Cancelled);
        }
        advance(root, stage, ValidationStage::InputChecked);

        let probe = BlockProbe::new(Arc::clone(&self.store), self.config.store_timeout);
        let agg = Arc::new(ResultAggregator::with_capacity(candidates.len()));

        let mut present = HashSet::with_capacity(candidates.len());
        let mut reported_missing = HashSet::new();
        for candidate in candidates {
            let candidate = candidate.as_ref();
            let cid = match ContentId::decode(candidate) {
                Ok(cid) => cid,
                Err(defect) => {
                    agg.add_invalid(candidate);
                    agg.add_error(defect.to_string());
                    continue;
                }
            };
            match probe.has(&cid, cancel).await {
                Ok(true) => {
                    present.insert(cid);
                }
                Ok(false) => {
                    agg.add_missing(cid.to_string());
                    reported_missing.insert(cid);
                }
                Err(ProbeError::Cancelled) => return Err(ValidateError::Cancelled),
                Err(error) => agg.add_error(error.to_string()),
            }
        }
        advance(root, stage, ValidationStage::BlocksChecked);

        let walker = DagWalker::new(
            probe,
            Arc::clone(&self.resolver),
            self.config.effective_concurrency(),
        );
        let required = match walker.walk(root_cid, cancel, Arc::clone(&agg)).await {
            Ok(report) => {
                agg.set_reachable_size(report.reachable_size);
                Some(report.required)
            }
            Err(failure) => {
                warn!(%root, error = %failure, "dag walk failed");
                agg.add_error(format!("traversal failed: {failure}"));
                agg.set_can_restore(false);
                agg.set_reachable_size(failure.partial.reachable_size);
                None
            }
        };
        advance(root, stage, ValidationStage::DagWalked);

        if let Some(required) = required {
            let mut unreported: Vec<ContentId> = required
                .into_iter()
                .filter(|cid| !present.contains(cid) && !reported_missing.contains(cid))
                .collect();
            unreported.sort_unstable();
            for cid in unreported {
                agg.add_missing(cid.to_string());
            }
        }
        advance(root, stage, ValidationStage::Reconciled);

        agg.finalize();
        advance(root, stage, ValidationStage::Finalized);

        let result = match Arc::try_unwrap(agg) {
            Ok(agg) => agg.into_result(),
            Err(shared) => shared.snapshot(),
        };
        info!(
            %root,
            complete = result.is_complete,
            can_restore = result.can_restore,
            missing = result.missing_blocks.len(),
            invalid = result.invalid_blocks.len(),
            errors = result.error_details.len(),
            reachable_size = result.reachable_size,
            "validation finished"
        );
        Ok(result)
    }
}

fn advance(root: &str, stage: &mut ValidationStage, next: ValidationStage) {
    debug!(%root, from = %*stage, to = %next, "stage");
    *stage = next;
}
