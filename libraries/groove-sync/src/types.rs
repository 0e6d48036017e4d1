//! Common types for the sync pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for one sync run
///
/// Built once from parsed arguments and environment lookups, then passed
/// into the pipeline. Nothing in here changes after validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Root of the music library to scan
    pub source_root: PathBuf,

    /// Directory the qualifying files are mirrored into before transfer
    pub staging_root: PathBuf,

    /// rsync destination (local path or host:path), passed uninterpreted
    pub destination: String,

    /// Files modified strictly after this instant qualify
    pub cutoff: DateTime<Utc>,

    /// Extra flags appended to the transfer invocation, unvalidated
    pub extra_transfer_args: Vec<String>,

    /// Restrict discovery to known audio extensions
    pub audio_only: bool,

    /// Follow symbolic links while scanning
    pub follow_links: bool,

    /// Discover and report only; no staging, no transfer
    pub dry_run: bool,
}

/// Phase of the sync pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    Discovery,
    Staging,
    Transfer,
    Cleanup,
}

/// Progress information for an ongoing sync run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncProgress {
    pub phase: SyncPhase,
    pub total_files: usize,
    pub processed_files: usize,
    pub staged_files: usize,
    pub failed_files: usize,
    pub current_file: Option<PathBuf>,
}

impl SyncProgress {
    pub fn new(phase: SyncPhase, total_files: usize) -> Self {
        Self {
            phase,
            total_files,
            processed_files: 0,
            staged_files: 0,
            failed_files: 0,
            current_file: None,
        }
    }

    pub fn percentage(&self) -> f32 {
        if self.total_files == 0 {
            return 100.0;
        }
        (self.processed_files as f32 / self.total_files as f32) * 100.0
    }
}

/// Summary of a completed sync run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSummary {
    pub session_id: String,
    pub started_at: String,
    pub completed_at: String,
    pub duration_seconds: u64,
    pub files_discovered: usize,
    pub files_staged: usize,
    pub files_failed: usize,
    pub transfer_skipped: bool,
    pub dry_run: bool,

    /// Per-file failures that were absorbed during staging
    pub errors: Vec<(PathBuf, String)>,
}

impl SyncSummary {
    pub fn summary_text(&self) -> String {
        if self.dry_run {
            return format!(
                "Dry run: {} file(s) would be transferred",
                self.files_discovered
            );
        }
        if self.transfer_skipped {
            return "Nothing to transfer".to_string();
        }
        format!(
            "Sync complete: {} staged, {} failed, transferred in {}s",
            self.files_staged, self.files_failed, self.duration_seconds
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_empty_is_complete() {
        let progress = SyncProgress::new(SyncPhase::Staging, 0);
        assert_eq!(progress.percentage(), 100.0);
    }

    #[test]
    fn test_percentage_partial() {
        let mut progress = SyncProgress::new(SyncPhase::Staging, 4);
        progress.processed_files = 1;
        assert_eq!(progress.percentage(), 25.0);
    }

    #[test]
    fn test_summary_text_nothing_to_do() {
        let summary = SyncSummary {
            session_id: "s".to_string(),
            started_at: String::new(),
            completed_at: String::new(),
            duration_seconds: 0,
            files_discovered: 0,
            files_staged: 0,
            files_failed: 0,
            transfer_skipped: true,
            dry_run: false,
            errors: Vec::new(),
        };
        assert_eq!(summary.summary_text(), "Nothing to transfer");
    }
}
