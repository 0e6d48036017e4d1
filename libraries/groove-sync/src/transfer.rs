//! Handoff of the staged tree to the external transfer tool
//!
//! The transfer tool is a trusted collaborator: it owns directory
//! recursion, skip-if-identical semantics and progress reporting. Its
//! output goes straight to the operator's terminal, unparsed.

use crate::{Result, SyncError};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Narrow seam for the transfer step, so tests can substitute a fake
/// without spawning a real process
#[async_trait]
pub trait TransferMechanism: Send + Sync {
    /// Transfer the entire staging tree to the destination in one invocation
    async fn transfer(
        &self,
        staging_root: &Path,
        destination: &str,
        extra_args: &[String],
    ) -> Result<()>;
}

/// Production transfer via the system rsync binary
#[derive(Debug, Clone)]
pub struct RsyncTransfer {
    rsync_path: PathBuf,
}

impl RsyncTransfer {
    pub fn new(rsync_path: PathBuf) -> Self {
        Self { rsync_path }
    }
}

impl Default for RsyncTransfer {
    fn default() -> Self {
        Self::new(PathBuf::from("rsync"))
    }
}

#[async_trait]
impl TransferMechanism for RsyncTransfer {
    async fn transfer(
        &self,
        staging_root: &Path,
        destination: &str,
        extra_args: &[String],
    ) -> Result<()> {
        // Trailing slash so rsync mirrors the staging tree's contents into
        // the destination rather than nesting the staging directory itself
        let mut source = staging_root.as_os_str().to_os_string();
        source.push("/");

        // Core flags first; caller-supplied flags after them. Conflicts are
        // left to rsync's own last-flag-wins handling.
        let mut cmd = Command::new(&self.rsync_path);
        cmd.arg("--recursive")
            .arg("--progress")
            .args(extra_args)
            .arg(source)
            .arg(destination)
            .stdin(Stdio::null());

        tracing::info!(
            "Invoking {} for {} -> {}",
            self.rsync_path.display(),
            staging_root.display(),
            destination
        );

        // stdout/stderr are inherited: rsync's own progress and
        // diagnostics reach the operator verbatim
        let status = cmd.status().await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                SyncError::Transfer(format!(
                    "{} not found; please install rsync",
                    self.rsync_path.display()
                ))
            } else {
                SyncError::Transfer(format!("failed to launch rsync: {e}"))
            }
        })?;

        if !status.success() {
            return Err(match status.code() {
                Some(code) => SyncError::Transfer(format!("rsync exited with code {code}")),
                None => SyncError::Transfer("rsync terminated by signal".to_string()),
            });
        }

        Ok(())
    }
}
