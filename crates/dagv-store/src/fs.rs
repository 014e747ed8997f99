use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use dagv_types::{BlockStore, Codec, ContentId, StoreError};
use tokio::fs;
use tracing::{debug, warn};

const BLOCKS_DIR: &str = "blocks";

/// File-backed block store: one file per block.
///
/// ```text
/// <root>/
/// └── blocks/
///     ├── f01551e20<digest hex>     ← raw block
///     ├── f01711e20<digest hex>     ← dag-node block
///     └── .tmp-<pid>-<n>            ← in-flight put, renamed on completion
/// ```
///
/// Reads re-hash the file contents and report [`StoreError::Corrupt`] when
/// the digest no longer matches the file name, so on-disk bit rot shows up
/// as a store defect rather than as silently wrong data. `get_size` keeps
/// the trait default and goes through the same check; file metadata alone
/// would report a rotten block as present.
#[derive(Debug)]
pub struct FsBlockStore {
    blocks: PathBuf,
    tmp_counter: AtomicU64,
}

impl FsBlockStore {
    /// Open a store rooted at `root`, creating `root/blocks` if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub async fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let blocks = root.as_ref().join(BLOCKS_DIR);
        fs::create_dir_all(&blocks).await?;
        Ok(Self {
            blocks,
            tmp_counter: AtomicU64::new(0),
        })
    }

    /// Directory holding the block files.
    #[must_use]
    pub fn blocks_dir(&self) -> &Path {
        &self.blocks
    }

    fn path_for(&self, cid: &ContentId) -> PathBuf {
        self.blocks.join(cid.to_string())
    }

    fn tmp_path(&self) -> PathBuf {
        let n = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        self.blocks.join(format!(".tmp-{}-{n}", std::process::id()))
    }
}

impl BlockStore for FsBlockStore {
    async fn has(&self, cid: &ContentId) -> Result<bool, StoreError> {
        Ok(fs::try_exists(self.path_for(cid)).await?)
    }

    async fn get(&self, cid: &ContentId) -> Result<Option<Vec<u8>>, StoreError> {
        let bytes = match fs::read(self.path_for(cid)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if !cid.matches(&bytes) {
            warn!(%cid, "stored block failed digest check");
            return Err(StoreError::Corrupt {
                cid: cid.to_string(),
            });
        }
        Ok(Some(bytes))
    }

    async fn put(&self, codec: Codec, bytes: &[u8]) -> Result<ContentId, StoreError> {
        let cid = ContentId::for_block(codec, bytes);
        let path = self.path_for(&cid);
        if fs::try_exists(&path).await? {
            return Ok(cid);
        }

        let tmp = self.tmp_path();
        fs::write(&tmp, bytes).await?;
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        debug!(%cid, len = bytes.len(), "stored block");
        Ok(cid)
    }
}
