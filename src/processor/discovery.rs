//! File discovery for SUNA log directories
//!
//! Lists the regular files directly inside a source directory whose names
//! match a glob, in alphabetical order.

use crate::error::{Result, SunaError};
use glob::Pattern;
use std::path::{MAIN_SEPARATOR, PathBuf};
use tokio::fs;
use tracing::debug;

/// File discovery component for a single log directory
#[derive(Debug)]
pub struct FileDiscovery {
    directory: PathBuf,
    pattern: String,
}

impl FileDiscovery {
    pub fn new(directory: PathBuf, pattern: impl Into<String>) -> Self {
        Self {
            directory,
            pattern: pattern.into(),
        }
    }

    pub fn directory(&self) -> &PathBuf {
        &self.directory
    }

    /// Matching files, sorted by name. Subdirectories are never entered.
    pub async fn discover(&self) -> Result<Vec<PathBuf>> {
        if self.pattern.contains('/') || self.pattern.contains(MAIN_SEPARATOR) {
            return Err(SunaError::configuration(format!(
                "File pattern '{}' must not contain a path separator",
                self.pattern
            )));
        }
        let matcher = Pattern::new(&self.pattern)?;

        if !fs::metadata(&self.directory)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
        {
            return Err(SunaError::DirectoryNotFound {
                path: self.directory.clone(),
            });
        }

        debug!(
            "Searching for '{}' in: {}",
            self.pattern,
            self.directory.display()
        );

        let mut files = Vec::new();
        let mut dir = fs::read_dir(&self.directory).await?;

        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if !matcher.matches(name) {
                continue;
            }
            // Follows symlinks; a dangling link is not a regular file
            match fs::metadata(entry.path()).await {
                Ok(meta) if meta.is_file() => files.push(entry.path()),
                Ok(_) => {}
                Err(e) => debug!("Skipping {}: {}", entry.path().display(), e),
            }
        }

        if files.is_empty() {
            return Err(SunaError::NoFilesFound {
                directory: self.directory.clone(),
                pattern: self.pattern.clone(),
            });
        }

        files.sort();
        debug!("Found {} matching files", files.len());
        Ok(files)
    }
}
