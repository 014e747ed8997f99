#![warn(clippy::pedantic)]

pub mod builder;
pub mod error;
pub mod fs;
pub mod memory;
pub mod reader;

pub use builder::{BuilderConfig, DagBuilder, ImportSummary};
pub use error::{BuildError, ReadError};
pub use fs::FsBlockStore;
pub use memory::MemoryBlockStore;
pub use reader::DagReader;
