use std::time::Duration;

/// Default number of concurrent walk tasks.
pub const DEFAULT_MAX_CONCURRENCY: usize = 16;

/// Tuning knobs for [`Validator`](crate::Validator).
///
/// ```text
/// ┌─────────────────┬───────────────────────────────────────────────────┐
/// │ Field           │ Purpose                                           │
/// ├─────────────────┼───────────────────────────────────────────────────┤
/// │ max_concurrency │ Upper bound on in-flight walk tasks (min 1)       │
/// │ store_timeout   │ Per-lookup deadline; a stalled lookup becomes a   │
/// │                 │ store defect instead of hanging the run           │
/// └─────────────────┴───────────────────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValidatorConfig {
    pub max_concurrency: usize,
    pub store_timeout: Option<Duration>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            store_timeout: None,
        }
    }
}

impl ValidatorConfig {
    #[must_use]
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    #[must_use]
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = Some(timeout);
        self
    }

    /// Worker bound actually used; zero is treated as one.
    #[must_use]
    pub fn effective_concurrency(&self) -> usize {
        self.max_concurrency.max(1)
    }
}
