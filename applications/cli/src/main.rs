//! groove - selective sync of recently-modified music to a media server

mod settings;

use anyhow::Context;
use clap::Parser;
use groove_sync::{cutoff, RsyncTransfer, SyncConfig, SyncPhase, SyncPipeline};
use indicatif::{ProgressBar, ProgressStyle};
use settings::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "groove")]
#[command(about = "Sync recently-modified music to a media server", version)]
struct Cli {
    /// Cutoff date/time; files modified after this instant are synced
    #[arg(short = 't', long = "dl-time", value_name = "WHEN")]
    dl_time: String,

    /// rsync destination (local path or host:path)
    #[arg(short = 'd', long = "dest", value_name = "DEST")]
    dest: String,

    /// Extra options passed through to rsync (whitespace-separated)
    #[arg(
        short = 'r',
        long = "rsync-opts",
        value_name = "OPTS",
        allow_hyphen_values = true
    )]
    rsync_opts: Option<String>,

    /// Only sync files with known audio extensions
    #[arg(long)]
    audio_only: bool,

    /// Follow symbolic links while scanning
    #[arg(long)]
    follow_links: bool,

    /// Report what would be synced without staging or transferring
    #[arg(long)]
    dry_run: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "groove=info,groove_sync=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version print to stdout and exit 0; actual
            // argument errors exit 1
            let code = i32::from(e.use_stderr());
            let _ = e.print();
            std::process::exit(code);
        }
    };

    let settings = Settings::load()?;
    settings.validate()?;

    tracing::info!("Music directory: {}", settings.music_dir.display());
    tracing::info!("Staging directory: {}", settings.staging_dir.display());

    let cutoff = cutoff::parse_cutoff(&cli.dl_time)?;

    let extra_transfer_args = cli
        .rsync_opts
        .map(|opts| opts.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default();

    let config = SyncConfig {
        source_root: settings.music_dir.clone(),
        staging_root: settings.staging_dir.clone(),
        destination: cli.dest,
        cutoff,
        extra_transfer_args,
        audio_only: cli.audio_only,
        follow_links: cli.follow_links,
        dry_run: cli.dry_run,
    };

    let transfer = RsyncTransfer::new(settings.rsync_path.clone());
    let (mut rx, handle) = SyncPipeline::new(config, transfer).run()?;

    // Progress bar for the staging phase, cleared before rsync takes over
    // the terminal with its own progress output
    let mut bar: Option<ProgressBar> = None;
    while let Some(progress) = rx.recv().await {
        match progress.phase {
            SyncPhase::Staging => {
                let bar = bar.get_or_insert_with(|| {
                    let bar = ProgressBar::new(progress.total_files as u64);
                    bar.set_style(
                        ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len}")
                            .unwrap_or_else(|_| ProgressStyle::default_bar()),
                    );
                    bar.set_message("Staging");
                    bar
                });
                bar.set_position(progress.processed_files as u64);
            }
            SyncPhase::Transfer | SyncPhase::Cleanup => {
                if let Some(bar) = bar.take() {
                    bar.finish_and_clear();
                }
            }
            SyncPhase::Discovery => {}
        }
    }

    let summary = handle.await.context("sync task panicked")??;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", summary.summary_text());
    }

    Ok(())
}
