//! Best-effort feed archival.
//!
//! # Data Flow
//! ```text
//! caller (after a feed is sent)
//!     → FeedArchiver::save_feed / save_failed_feed   (blocking, inline)
//!     or
//!     → ArchiveQueue::submit → worker → FeedArchiver  (bounded, off-thread)
//!     → <directory>/<prefix>-<uuid>.xml
//! ```
//!
//! # Design Decisions
//! - No directory configured means archival is off, not an error
//! - Failures are logged at warn and swallowed; never retried
//! - Files are created with `create_new`, so an existing file is never overwritten
//! - A feed name that is not a plain file name (separators, `..`, absolute
//!   paths) is refused, so nothing lands outside the directory

pub mod queue;

use std::ffi::OsStr;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::config::ArchiveConfig;
use crate::observability::metrics;

pub use queue::ArchiveQueue;

/// Marker prefixed to feeds that failed to send.
pub const FAILED_PREFIX: &str = "FAILED-";
/// Extension of archived files.
pub const ARCHIVE_SUFFIX: &str = ".xml";

/// One payload submitted for archival.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRecord {
    pub feed_name: String,
    pub payload: String,
    pub failed: bool,
}

impl ArchiveRecord {
    pub fn saved(feed_name: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            feed_name: feed_name.into(),
            payload: payload.into(),
            failed: false,
        }
    }

    pub fn failed(feed_name: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            failed: true,
            ..Self::saved(feed_name, payload)
        }
    }
}

/// Writes feed copies into a directory.
#[derive(Debug, Clone, Default)]
pub struct FeedArchiver {
    directory: Option<PathBuf>,
}

impl FeedArchiver {
    pub fn new(directory: Option<PathBuf>) -> Self {
        Self { directory }
    }

    /// Archiver that never writes.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ArchiveConfig) -> Self {
        Self::new(config.directory.clone())
    }

    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    /// Archive a feed that was sent successfully.
    pub fn save_feed(&self, feed_name: &str, payload: &str) {
        self.save(feed_name, payload);
    }

    /// Archive a feed that failed to send, under a `FAILED-` name.
    pub fn save_failed_feed(&self, feed_name: &str, payload: &str) {
        self.save(&format!("{FAILED_PREFIX}{feed_name}"), payload);
    }

    pub fn save_record(&self, record: &ArchiveRecord) {
        if record.failed {
            self.save_failed_feed(&record.feed_name, &record.payload);
        } else {
            self.save_feed(&record.feed_name, &record.payload);
        }
    }

    fn save(&self, prefix: &str, payload: &str) {
        let Some(directory) = self.directory.as_deref() else {
            return;
        };
        match write_unique(directory, prefix, payload) {
            Ok(path) => {
                tracing::debug!(path = %path.display(), bytes = payload.len(), "Feed archived");
                metrics::record_archive_write("saved");
            }
            Err(e) => {
                tracing::warn!(
                    directory = %directory.display(),
                    feed = %prefix,
                    error = %e,
                    "Unable to archive feed"
                );
                metrics::record_archive_write("failed");
            }
        }
    }
}

fn write_unique(directory: &Path, prefix: &str, payload: &str) -> io::Result<PathBuf> {
    let name = format!("{prefix}-{}{ARCHIVE_SUFFIX}", Uuid::new_v4().simple());
    if name.chars().any(std::path::is_separator)
        || Path::new(&name).file_name() != Some(OsStr::new(&name))
    {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("feed name {prefix:?} does not form a plain file name"),
        ));
    }
    let path = directory.join(name);
    let mut file = OpenOptions::new().write(true).create_new(true).open(&path)?;
    file.write_all(payload.as_bytes())?;
    file.flush()?;
    Ok(path)
}
