//! Temporary output file handling.
//!
//! All segment writes go to `<final path>.tmp`. The file is pre-sized to the
//! content length before any worker starts, and becomes visible at the final
//! path only through a single rename. A [`TempFile`] that is dropped without
//! being committed removes the file, so every failure path cleans up.

use crate::error::{Error, Result};

use std::ffi::OsString;
use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tracing::warn;

/// Suffix appended to the final path to form the temporary path.
pub const TEMP_SUFFIX: &str = ".tmp";

/// The temporary path used while downloading to `final_path`.
///
/// ```rust
/// use parafetch::download::temp_path_for;
/// use std::path::Path;
///
/// assert_eq!(temp_path_for(Path::new("out/blend.gz")), Path::new("out/blend.gz.tmp"));
/// ```
pub fn temp_path_for(final_path: &Path) -> PathBuf {
    let mut path = OsString::from(final_path.as_os_str());
    path.push(TEMP_SUFFIX);
    PathBuf::from(path)
}

/// Seek `file` to `offset`, failing unless it lands exactly there.
pub(crate) async fn seek_exact(file: &mut File, path: &Path, offset: u64) -> Result<()> {
    let pos = file
        .seek(SeekFrom::Start(offset))
        .await
        .map_err(|source| Error::Seek {
            path: path.to_path_buf(),
            offset,
            source,
        })?;
    if pos != offset {
        return Err(Error::Seek {
            path: path.to_path_buf(),
            offset,
            source: io::Error::other(format!("seek landed at offset {}", pos)),
        });
    }
    Ok(())
}

/// Flush and sync `file`, then release it.
pub(crate) async fn close_file(mut file: File, path: &Path) -> Result<()> {
    let close_error = |source| Error::Close {
        path: path.to_path_buf(),
        source,
    };
    file.flush().await.map_err(close_error)?;
    file.sync_data().await.map_err(close_error)?;
    Ok(())
}

/// A pre-sized temporary file, removed on drop unless committed.
#[derive(Debug)]
pub struct TempFile {
    path: PathBuf,
    committed: bool,
}

impl TempFile {
    /// Create (or truncate) the temporary file for `final_path` and size it to
    /// `content_length` bytes.
    pub async fn prepare(final_path: &Path, content_length: u64) -> Result<TempFile> {
        let temp = TempFile {
            path: temp_path_for(final_path),
            committed: false,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&temp.path)
            .await
            .map_err(|source| Error::Open {
                path: temp.path.clone(),
                source,
            })?;

        seek_exact(&mut file, &temp.path, content_length).await?;
        file.set_len(content_length)
            .await
            .map_err(|source| Error::Seek {
                path: temp.path.clone(),
                offset: content_length,
                source,
            })?;
        close_file(file, &temp.path).await?;

        Ok(temp)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Atomically move the file to `final_path`.
    pub async fn commit(mut self, final_path: &Path) -> Result<()> {
        fs::rename(&self.path, final_path)
            .await
            .map_err(|source| Error::Rename {
                from: self.path.clone(),
                to: final_path.to_path_buf(),
                source,
            })?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        // Blocking unlink; drop cannot await.
        match std::fs::remove_file(&self.path) {
            Ok(()) => (),
            Err(e) if e.kind() == io::ErrorKind::NotFound => (),
            Err(e) => warn!("Failed to remove temporary file {:?}: {}", self.path, e),
        }
    }
}
