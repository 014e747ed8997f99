/// Implementation of `dagv put`.
///
/// Imports one file into the store as a balanced DAG and prints the root
/// identifier on stdout. A short summary goes to stderr.
use anyhow::{Context, Result};
use dagv_store::{BuilderConfig, DagBuilder, FsBlockStore};

use crate::PutArgs;
use crate::fsutil::ensure_writable;

/// Run the `dagv put` command.
///
/// # Errors
///
/// Returns an error if the store is not writable, the input cannot be
/// read, the chunking flags are degenerate, or a block write fails.
pub async fn run(args: &PutArgs) -> Result<()> {
    ensure_writable(&args.store)?;
    let store = FsBlockStore::open(&args.store)
        .await
        .with_context(|| format!("cannot open store {}", args.store.display()))?;

    let data = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("cannot read {}", args.file.display()))?;

    let mut config = BuilderConfig::default();
    if let Some(n) = args.chunk_size {
        config = config.with_chunk_size(n);
    }
    if let Some(n) = args.max_links {
        config = config.with_max_links(n);
    }

    let summary = DagBuilder::new(&store, config)
        .import(&data)
        .await
        .with_context(|| format!("cannot import {}", args.file.display()))?;

    println!("{}", summary.root);
    eprintln!(
        "{} bytes in {} chunk{} and {} node{}",
        summary.bytes,
        summary.chunks,
        if summary.chunks == 1 { "" } else { "s" },
        summary.nodes,
        if summary.nodes == 1 { "" } else { "s" },
    );
    Ok(())
}
