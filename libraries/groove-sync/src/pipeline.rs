//! Sync pipeline orchestration: discover, stage, transfer, clean up
//!
//! One run walks the phases strictly in order. The staging tree is
//! deleted only after the transfer tool reports success; on any failure
//! past discovery it is left in place so the operator can inspect it and
//! retry.

use crate::{
    scanner::FileScanner, staging, transfer::TransferMechanism, Result, SyncConfig, SyncError,
    SyncPhase, SyncProgress, SyncSummary,
};
use chrono::Utc;
use std::fs;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Orchestrates one selective sync run
pub struct SyncPipeline<T: TransferMechanism + 'static> {
    config: SyncConfig,
    transfer: T,
}

impl<T: TransferMechanism + 'static> SyncPipeline<T> {
    /// Create a new pipeline over a transfer mechanism
    pub fn new(config: SyncConfig, transfer: T) -> Self {
        Self { config, transfer }
    }

    /// Validate configuration and start the run
    ///
    /// Returns a channel for receiving progress updates and a handle to
    /// the running pipeline task. Validation happens before any side
    /// effect; an invalid configuration never touches the filesystem.
    pub fn run(
        self,
    ) -> Result<(
        mpsc::Receiver<SyncProgress>,
        JoinHandle<Result<SyncSummary>>,
    )> {
        Self::validate(&self.config)?;

        let (tx, rx) = mpsc::channel(100);
        let config = self.config;
        let transfer = self.transfer;

        let handle = tokio::spawn(async move { Self::run_impl(config, transfer, tx).await });

        Ok((rx, handle))
    }

    fn validate(config: &SyncConfig) -> Result<()> {
        if !config.source_root.exists() {
            return Err(SyncError::Config(format!(
                "source root {} does not exist",
                config.source_root.display()
            )));
        }

        if !config.source_root.is_dir() {
            return Err(SyncError::Config(format!(
                "source root {} is not a directory",
                config.source_root.display()
            )));
        }

        if config.destination.trim().is_empty() {
            return Err(SyncError::Config("destination must not be empty".to_string()));
        }

        // A staging tree inside the source root would qualify for the next
        // run's discovery pass
        if config.staging_root.starts_with(&config.source_root) {
            return Err(SyncError::Config(format!(
                "staging root {} must not live inside the source root",
                config.staging_root.display()
            )));
        }

        Ok(())
    }

    /// Internal pipeline implementation
    async fn run_impl(
        config: SyncConfig,
        transfer: T,
        progress_tx: mpsc::Sender<SyncProgress>,
    ) -> Result<SyncSummary> {
        let start_time = Instant::now();
        let session_id = Uuid::new_v4().to_string();
        let started_at = Utc::now().to_rfc3339();

        info!(
            "Starting sync {} (source: {}, cutoff: {})",
            session_id,
            config.source_root.display(),
            config.cutoff
        );

        // Phase 1: Discovery
        debug!("Phase 1: Discovering files newer than cutoff");
        let scanner = FileScanner::new()
            .follow_links(config.follow_links)
            .audio_only(config.audio_only);
        let files = scanner.scan_modified_since(&config.source_root, config.cutoff)?;

        let mut progress = SyncProgress::new(SyncPhase::Discovery, files.len());
        let _ = progress_tx.send(progress.clone()).await;

        info!("Discovered {} file(s) newer than cutoff", files.len());

        let summary_base = |transfer_skipped: bool,
                            files_staged: usize,
                            files_failed: usize,
                            errors: Vec<(std::path::PathBuf, String)>| {
            SyncSummary {
                session_id: session_id.clone(),
                started_at: started_at.clone(),
                completed_at: Utc::now().to_rfc3339(),
                duration_seconds: start_time.elapsed().as_secs(),
                files_discovered: files.len(),
                files_staged,
                files_failed,
                transfer_skipped,
                dry_run: config.dry_run,
                errors,
            }
        };

        if files.is_empty() {
            info!("Nothing to transfer");
            return Ok(summary_base(true, 0, 0, Vec::new()));
        }

        if config.dry_run {
            for file in &files {
                info!("Would stage {}", file.display());
            }
            return Ok(summary_base(true, 0, 0, Vec::new()));
        }

        // Phase 2: Staging
        debug!("Phase 2: Staging into {}", config.staging_root.display());
        fs::create_dir_all(&config.staging_root)?;

        progress.phase = SyncPhase::Staging;
        let mut errors = Vec::new();

        for file in &files {
            progress.current_file = Some(file.clone());
            let _ = progress_tx.send(progress.clone()).await;

            match staging::stage_file(&config.source_root, &config.staging_root, file) {
                Ok(_) => progress.staged_files += 1,
                Err(SyncError::Io(e)) if staging::is_fatal_copy_error(&e) => {
                    error!("Staging aborted at {}: {}", file.display(), e);
                    warn!(
                        "Staging tree preserved at {} for inspection",
                        config.staging_root.display()
                    );
                    return Err(SyncError::Staging(format!("{}: {}", file.display(), e)));
                }
                Err(e) => {
                    warn!("Failed to stage {}: {}", file.display(), e);
                    errors.push((file.clone(), e.to_string()));
                    progress.failed_files += 1;
                }
            }

            progress.processed_files += 1;
            let _ = progress_tx.send(progress.clone()).await;
        }

        info!(
            "Staged {} file(s), {} failed",
            progress.staged_files, progress.failed_files
        );

        // Phase 3: Transfer
        debug!("Phase 3: Handing staged tree to the transfer tool");
        progress.phase = SyncPhase::Transfer;
        progress.current_file = None;
        let _ = progress_tx.send(progress.clone()).await;

        if let Err(e) = transfer
            .transfer(
                &config.staging_root,
                &config.destination,
                &config.extra_transfer_args,
            )
            .await
        {
            error!("Transfer failed: {}", e);
            warn!(
                "Staging tree preserved at {} for retry",
                config.staging_root.display()
            );
            return Err(e);
        }

        // Phase 4: Cleanup
        debug!("Phase 4: Removing staging tree");
        progress.phase = SyncPhase::Cleanup;
        let _ = progress_tx.send(progress.clone()).await;

        if let Err(e) = fs::remove_dir_all(&config.staging_root) {
            // The transfer itself succeeded; a lingering staging tree is
            // only untidy
            warn!(
                "Could not remove staging tree {}: {}",
                config.staging_root.display(),
                e
            );
        }

        let staged = progress.staged_files;
        let failed = progress.failed_files;
        let summary = summary_base(false, staged, failed, errors);
        info!("{}", summary.summary_text());

        Ok(summary)
    }
}
