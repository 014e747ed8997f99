#![warn(clippy::pedantic)]

pub mod cancel;
pub mod config;
pub mod error;
pub mod probe;
pub mod result;
pub mod validator;
pub mod walker;

pub use cancel::CancelToken;
pub use config::ValidatorConfig;
pub use error::{ProbeError, ValidateError, WalkError, WalkFailure};
pub use probe::BlockProbe;
pub use result::{ResultAggregator, ValidationResult};
pub use validator::Validator;
pub use walker::{DagWalker, RequiredSet, WalkReport};
