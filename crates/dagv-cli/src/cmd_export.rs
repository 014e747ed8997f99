/// Implementation of `dagv export`.
///
/// Reassembles the data under a root and writes it to
/// `<out-dir>/<clean name>`. The DAG is read in full before the output
/// file is created, so an incomplete DAG leaves nothing behind.
use anyhow::{Context, Result};
use dagv_store::{DagReader, FsBlockStore};
use dagv_types::ContentId;

use crate::ExportArgs;
use crate::fsutil::{clean_filename, ensure_writable};

/// Run the `dagv export` command.
///
/// # Errors
///
/// Returns an error if the root does not decode, the output directory is
/// not writable, any block is missing or unreadable, or the write fails.
pub async fn run(args: &ExportArgs) -> Result<()> {
    let root = ContentId::decode(&args.root)?;
    ensure_writable(&args.out_dir)?;
    let store = FsBlockStore::open(&args.store)
        .await
        .with_context(|| format!("cannot open store {}", args.store.display()))?;

    let data = DagReader::new(&store)
        .read_all(&root)
        .await
        .with_context(|| format!("cannot reassemble {root}"))?;

    let target = args.out_dir.join(clean_filename(&args.name));
    tokio::fs::write(&target, &data)
        .await
        .with_context(|| format!("cannot write {}", target.display()))?;

    println!("{}", target.display());
    Ok(())
}
