//! Structure-preserving staging of qualifying files
//!
//! Each file is copied under the staging root at the same path it has
//! relative to the source root. The source tree is never written to.

use crate::{Result, SyncError};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Copy one file into the staging tree, mirroring its relative path
///
/// Parent directories are created as needed (idempotent), and an existing
/// staged copy is overwritten, so re-staging after a partial failure is
/// safe.
///
/// # Returns
///
/// The path of the staged copy.
pub fn stage_file(source_root: &Path, staging_root: &Path, file: &Path) -> Result<PathBuf> {
    let relative = file.strip_prefix(source_root).map_err(|_| {
        SyncError::Staging(format!(
            "{} is outside the source root {}",
            file.display(),
            source_root.display()
        ))
    })?;

    let dest = staging_root.join(relative);

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::copy(file, &dest)?;

    Ok(dest)
}

/// Whether an IO error means the whole run must stop
///
/// Running out of space (or hitting a quota, or a read-only staging
/// filesystem) will fail every remaining copy too, so there is no point
/// continuing; anything else is a per-file problem.
pub fn is_fatal_copy_error(error: &std::io::Error) -> bool {
    matches!(
        error.kind(),
        ErrorKind::StorageFull | ErrorKind::QuotaExceeded | ErrorKind::ReadOnlyFilesystem
    )
}
