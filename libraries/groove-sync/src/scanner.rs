//! Modification-time based discovery of files to sync

use crate::{Result, SyncError};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Supported audio file extensions
const SUPPORTED_EXTENSIONS: &[&str] = &["mp3", "flac", "ogg", "wav", "aac", "m4a", "opus"];

/// Scanner that selects regular files modified after a cutoff instant
///
/// Symbolic links are not followed by default and link entries are never
/// selected themselves; enabling `follow_links` makes the traversal
/// resolve links, so a link to a regular file counts as that file.
pub struct FileScanner {
    /// Whether to follow symbolic links
    follow_links: bool,

    /// Whether to restrict selection to known audio extensions
    audio_only: bool,
}

impl Default for FileScanner {
    fn default() -> Self {
        Self {
            follow_links: false,
            audio_only: false,
        }
    }
}

impl FileScanner {
    /// Create a new file scanner
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to follow symbolic links
    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Set whether to select only known audio extensions
    pub fn audio_only(mut self, audio_only: bool) -> Self {
        self.audio_only = audio_only;
        self
    }

    /// Scan a directory tree for regular files modified strictly after `cutoff`
    ///
    /// Entries that become unreadable mid-traversal are logged and skipped;
    /// the scan continues. The result is sorted lexicographically so runs
    /// over the same tree are deterministic.
    pub fn scan_modified_since(&self, root: &Path, cutoff: DateTime<Utc>) -> Result<Vec<PathBuf>> {
        if !root.exists() {
            return Err(SyncError::Config(format!(
                "source root {} does not exist",
                root.display()
            )));
        }

        if !root.is_dir() {
            return Err(SyncError::Config(format!(
                "source root {} is not a directory",
                root.display()
            )));
        }

        let mut selected = Vec::new();

        for entry in WalkDir::new(root).follow_links(self.follow_links) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            // Regular files only; directories, symlinks and special files
            // are excluded
            if !entry.file_type().is_file() {
                continue;
            }

            if self.audio_only && !is_audio_file(entry.path()) {
                continue;
            }

            let meta = match entry.metadata() {
                Ok(meta) => meta,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", entry.path().display(), e);
                    continue;
                }
            };

            let modified = match meta.modified() {
                Ok(modified) => modified,
                Err(e) => {
                    tracing::warn!(
                        "Skipping {}: no modification time ({})",
                        entry.path().display(),
                        e
                    );
                    continue;
                }
            };

            // Strictly newer than the cutoff; files touched exactly at the
            // cutoff instant stay out
            if DateTime::<Utc>::from(modified) > cutoff {
                selected.push(entry.path().to_path_buf());
            }
        }

        selected.sort();
        Ok(selected)
    }
}

/// Check if a file is a supported audio file
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use filetime::FileTime;
    use std::fs;
    use tempfile::TempDir;

    fn set_mtime(path: &Path, instant: DateTime<Utc>) {
        let ft = FileTime::from_unix_time(instant.timestamp(), 0);
        filetime::set_file_mtime(path, ft).unwrap();
    }

    #[test]
    fn test_is_audio_file() {
        assert!(is_audio_file(Path::new("test.mp3")));
        assert!(is_audio_file(Path::new("test.MP3")));
        assert!(is_audio_file(Path::new("test.flac")));
        assert!(!is_audio_file(Path::new("test.txt")));
        assert!(!is_audio_file(Path::new("test")));
    }

    #[test]
    fn test_scan_selects_only_newer_files() {
        let temp = TempDir::new().unwrap();
        let base = temp.path();
        let cutoff = Utc::now() - Duration::hours(1);

        fs::write(base.join("new.mp3"), b"fake mp3").unwrap();

        fs::write(base.join("old.mp3"), b"fake mp3").unwrap();
        set_mtime(&base.join("old.mp3"), cutoff - Duration::days(1));

        let files = FileScanner::new()
            .scan_modified_since(base, cutoff)
            .unwrap();

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("new.mp3"));
    }

    #[test]
    fn test_scan_excludes_exact_cutoff_mtime() {
        let temp = TempDir::new().unwrap();
        let base = temp.path();
        // Whole-second cutoff so the pinned mtime compares equal
        let cutoff = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();

        fs::write(base.join("boundary.mp3"), b"fake mp3").unwrap();
        set_mtime(&base.join("boundary.mp3"), cutoff);

        fs::write(base.join("after.mp3"), b"fake mp3").unwrap();
        set_mtime(&base.join("after.mp3"), cutoff + Duration::seconds(1));

        let files = FileScanner::new()
            .scan_modified_since(base, cutoff)
            .unwrap();

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("after.mp3"));
    }

    #[test]
    fn test_scan_recurses_and_sorts() {
        let temp = TempDir::new().unwrap();
        let base = temp.path();
        let cutoff = Utc::now() - Duration::hours(1);

        let album = base.join("Artist").join("Album");
        fs::create_dir_all(&album).unwrap();
        fs::write(album.join("02.mp3"), b"b").unwrap();
        fs::write(album.join("01.mp3"), b"a").unwrap();

        let files = FileScanner::new()
            .scan_modified_since(base, cutoff)
            .unwrap();

        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("01.mp3"));
        assert!(files[1].ends_with("02.mp3"));
    }

    #[test]
    fn test_scan_audio_only_filter() {
        let temp = TempDir::new().unwrap();
        let base = temp.path();
        let cutoff = Utc::now() - Duration::hours(1);

        fs::write(base.join("song.flac"), b"fake flac").unwrap();
        fs::write(base.join("cover.jpg"), b"not audio").unwrap();

        let all = FileScanner::new()
            .scan_modified_since(base, cutoff)
            .unwrap();
        assert_eq!(all.len(), 2);

        let audio = FileScanner::new()
            .audio_only(true)
            .scan_modified_since(base, cutoff)
            .unwrap();
        assert_eq!(audio.len(), 1);
        assert!(audio[0].ends_with("song.flac"));
    }

    #[test]
    fn test_scan_missing_root_is_config_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");

        let result = FileScanner::new().scan_modified_since(&missing, Utc::now());
        assert!(matches!(result, Err(SyncError::Config(_))));
    }

    #[test]
    fn test_scan_file_root_is_config_error() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file.mp3");
        fs::write(&file, b"x").unwrap();

        let result = FileScanner::new().scan_modified_since(&file, Utc::now());
        assert!(matches!(result, Err(SyncError::Config(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_skips_symlinks_by_default() {
        let temp = TempDir::new().unwrap();
        let base = temp.path();
        let cutoff = Utc::now() - Duration::hours(1);

        fs::write(base.join("real.mp3"), b"fake mp3").unwrap();
        std::os::unix::fs::symlink(base.join("real.mp3"), base.join("link.mp3")).unwrap();

        let files = FileScanner::new()
            .scan_modified_since(base, cutoff)
            .unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("real.mp3"));

        let followed = FileScanner::new()
            .follow_links(true)
            .scan_modified_since(base, cutoff)
            .unwrap();
        assert_eq!(followed.len(), 2);
    }
}
