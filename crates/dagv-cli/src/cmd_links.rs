/// Implementation of `dagv links`.
///
/// Prints the child identifiers declared by one block, one per line, or
/// `leaf` when it has none. A dag-node block that does not decode is
/// reported as a leaf with a note on stderr, matching how the validator
/// treats it.
use anyhow::{Context, Result, anyhow};
use dagv_store::FsBlockStore;
use dagv_types::{BlockStore, ContentId, DagLinkResolver, LinkResolver};

use crate::LinksArgs;

/// Run the `dagv links` command.
///
/// # Errors
///
/// Returns an error if the identifier does not decode, the store cannot
/// be opened, or the block is absent or unreadable.
pub async fn run(args: &LinksArgs) -> Result<()> {
    let cid = ContentId::decode(&args.cid)?;
    let store = FsBlockStore::open(&args.store)
        .await
        .with_context(|| format!("cannot open store {}", args.store.display()))?;

    let bytes = store
        .get(&cid)
        .await
        .with_context(|| format!("cannot read block {cid}"))?
        .ok_or_else(|| anyhow!("block {cid} is not in the store"))?;

    match DagLinkResolver.links(&cid, &bytes) {
        Ok(links) if links.is_empty() => println!("leaf"),
        Ok(links) => {
            for link in links {
                println!("{link}");
            }
        }
        Err(e) => {
            eprintln!("note: {cid} does not decode as a node ({e})");
            println!("leaf");
        }
    }
    Ok(())
}
