pub mod line_patch;

pub use line_patch::{ApplyMiss, ApplyReport, FileOutcome, LinePatcher, MissReason};

use std::path::PathBuf;

/// Errors from reaper operations.
#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("{} is not valid UTF-8", .0.display())]
    NotUtf8(PathBuf),
}
