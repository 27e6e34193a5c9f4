//! Destination paths for captured photos.
//!
//! One flat directory of timestamped JPEG files. Nothing is indexed or
//! cleaned up.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// File name prefix of every capture.
const FILE_PREFIX: &str = "BESAFE_";

/// File extension of every capture.
const FILE_EXTENSION: &str = "jpg";

/// Timestamp layout embedded in file names.
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Hands out one unique destination path per capture.
///
/// Names have second resolution. A second request within the same second, or
/// a name whose file already exists, gets a `_1`, `_2`, ... suffix.
#[derive(Debug)]
pub struct MediaStore {
    base_dir: PathBuf,
    last_issued: Option<(String, u32)>,
}

impl MediaStore {
    /// Create a store rooted at `base_dir`. Does not touch the filesystem.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            last_issued: None,
        }
    }

    /// The directory captures are written to.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Create the base directory if it does not exist.
    ///
    /// A failure here is not fatal: later capture writes fail and the
    /// notification falls back to an unavailable photo reference.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DirectoryCreate`] if the directory cannot be created.
    pub fn ensure_dir(&self) -> Result<()> {
        if self.base_dir.is_dir() {
            return Ok(());
        }
        std::fs::create_dir_all(&self.base_dir).map_err(|source| Error::DirectoryCreate {
            path: self.base_dir.clone(),
            source,
        })?;
        info!("Created media directory {}", self.base_dir.display());
        Ok(())
    }

    /// Path for a capture taken now, in local time.
    pub fn new_capture_path(&mut self) -> PathBuf {
        self.capture_path_at(Local::now().naive_local())
    }

    /// Path for a capture taken at `timestamp`.
    pub fn capture_path_at(&mut self, timestamp: NaiveDateTime) -> PathBuf {
        let stem = format!("{FILE_PREFIX}{}", timestamp.format(TIMESTAMP_FORMAT));

        let mut counter = match &self.last_issued {
            Some((last, n)) if *last == stem => n + 1,
            _ => 0,
        };
        let mut path = self.path_for(&stem, counter);
        while path.exists() {
            counter += 1;
            path = self.path_for(&stem, counter);
        }

        debug!(path = %path.display(), "Allocated capture path");
        self.last_issued = Some((stem, counter));
        path
    }

    fn path_for(&self, stem: &str, counter: u32) -> PathBuf {
        if counter == 0 {
            self.base_dir.join(format!("{stem}.{FILE_EXTENSION}"))
        } else {
            self.base_dir
                .join(format!("{stem}_{counter}.{FILE_EXTENSION}"))
        }
    }
}
