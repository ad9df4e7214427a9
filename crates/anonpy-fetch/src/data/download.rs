use std::path::PathBuf;

use crate::error::{Error, Result};

/// How a download reports its progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadMode {
    /// Name and size are taken from the response headers, no progress output.
    Simple,

    /// Size and name are known up front (usually from a preview), which is
    /// what a progress bar needs.
    WithProgress { size: u64, name: String },
}

/// A single download job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub resource:  String,
    pub directory: PathBuf,
    pub mode:      DownloadMode,
}

impl DownloadRequest {
    pub fn simple(resource: impl Into<String>, directory: impl Into<PathBuf>) -> Self {
        Self {
            resource:  resource.into(),
            directory: directory.into(),
            mode:      DownloadMode::Simple,
        }
    }

    pub fn with_progress(
        resource: impl Into<String>,
        directory: impl Into<PathBuf>,
        size: u64,
        name: impl Into<String>,
    ) -> Self {
        Self {
            resource:  resource.into(),
            directory: directory.into(),
            mode:      DownloadMode::WithProgress {
                size,
                name: name.into(),
            },
        }
    }

    /// Build a request from loosely typed inputs.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] if `enable_progress` is set without both
    /// `size` and `name`; progress is never silently disabled.
    pub fn from_parts(
        resource: impl Into<String>,
        directory: impl Into<PathBuf>,
        enable_progress: bool,
        size: Option<u64>,
        name: Option<String>,
    ) -> Result<Self> {
        if !enable_progress {
            return Ok(Self::simple(resource, directory));
        }

        match (size, name) {
            (Some(size), Some(name)) => Ok(Self::with_progress(resource, directory, size, name)),
            (size, name) => Err(Error::Configuration(format!(
                "progress reporting requires the expected size and name (size: {}, name: {})",
                if size.is_some() { "given" } else { "missing" },
                if name.is_some() { "given" } else { "missing" },
            ))),
        }
    }

    pub fn progress_enabled(&self) -> bool {
        matches!(self.mode, DownloadMode::WithProgress { .. })
    }
}
