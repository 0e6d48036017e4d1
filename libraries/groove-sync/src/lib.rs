//! Groove selective library sync
//!
//! This crate syncs recently-modified music files to a remote library.
//! Files under the source root whose modification time is strictly newer
//! than a cutoff instant are mirrored, structure intact, into a staging
//! tree, which is then handed to rsync in a single invocation. The
//! staging tree is removed only when the transfer succeeds.
//!
//! # Architecture
//!
//! - `cutoff`: permissive parsing of user-supplied cutoff times
//! - `scanner`: modification-time based file discovery
//! - `staging`: structure-preserving copies into the staging tree
//! - `transfer`: the rsync seam (`TransferMechanism`)
//! - `pipeline`: orchestration of the discover/stage/transfer/cleanup run

mod error;
mod types;

// Core modules
pub mod cutoff;
pub mod pipeline;
pub mod scanner;
pub mod staging;
pub mod transfer;

pub use error::{Result, SyncError};
pub use pipeline::SyncPipeline;
pub use transfer::{RsyncTransfer, TransferMechanism};
pub use types::{SyncConfig, SyncPhase, SyncProgress, SyncSummary};
