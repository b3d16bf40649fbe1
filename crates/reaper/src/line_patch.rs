//! In-place, line-granular patch application.
//!
//! ## Workflow
//! 1. Patches are grouped by target file (ordered by path).
//! 2. Each file is read once; every patch replaces the **first** occurrence of
//!    its original line, scanning left to right.
//! 3. A patch whose original line is gone is skipped with an [`ApplyMiss`];
//!    the rest of the file and the rest of the batch still apply.
//! 4. The file is written back to the same path (unless dry-run).
//!
//! There is no backup and no rollback: files written before a later failure
//! stay modified.

use crate::ApplyError;
use common::Patch;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Why a patch was skipped at apply time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MissReason {
    /// The original line is no longer in the file verbatim.
    LineNotFound,
    /// The file could not be read or written.
    Io(String),
}

/// A single skipped patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyMiss {
    pub name: String,
    pub file_path: PathBuf,
    pub reason: MissReason,
}

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOutcome {
    pub file_path: PathBuf,
    pub patched: usize,
    pub missed: usize,
    /// `false` in dry-run mode or when the file could not be processed.
    pub written: bool,
}

/// Totals for a whole batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub patched: usize,
    /// Number of distinct files that had at least one patch.
    pub files_touched: usize,
    pub missed: Vec<ApplyMiss>,
    pub files: Vec<FileOutcome>,
}

/// Applies [`Patch`]es to implementation files.
#[derive(Debug, Clone, Default)]
pub struct LinePatcher {
    dry_run: bool,
}

impl LinePatcher {
    /// Creates a patcher that writes files back.
    pub fn new() -> Self {
        Self { dry_run: false }
    }

    /// Creates a patcher that computes everything but writes nothing.
    pub fn dry_run() -> Self {
        Self { dry_run: true }
    }

    /// Applies every patch, file by file.
    ///
    /// Never fails as a whole: per-file I/O errors become [`MissReason::Io`]
    /// entries for each patch of that file.
    pub fn apply(&self, patches: &[Patch]) -> ApplyReport {
        let mut by_file: BTreeMap<&Path, Vec<&Patch>> = BTreeMap::new();
        for patch in patches {
            by_file
                .entry(patch.file_path.as_path())
                .or_default()
                .push(patch);
        }

        let mut report = ApplyReport {
            files_touched: by_file.len(),
            ..Default::default()
        };

        for (file_path, group) in by_file {
            match self.patch_file(file_path, &group) {
                Ok((outcome, misses)) => {
                    debug!(
                        "{}: {} patched, {} missed",
                        file_path.display(),
                        outcome.patched,
                        outcome.missed
                    );
                    report.patched += outcome.patched;
                    report.missed.extend(misses);
                    report.files.push(outcome);
                }
                Err(e) => {
                    warn!("could not patch {}: {}", file_path.display(), e);
                    let message = e.to_string();
                    report.missed.extend(group.iter().map(|p| ApplyMiss {
                        name: p.name.clone(),
                        file_path: file_path.to_path_buf(),
                        reason: MissReason::Io(message.clone()),
                    }));
                    report.files.push(FileOutcome {
                        file_path: file_path.to_path_buf(),
                        patched: 0,
                        missed: group.len(),
                        written: false,
                    });
                }
            }
        }

        report
    }

    /// Reads `file_path` once, applies `patches` in order, and writes it back.
    ///
    /// Returns the file outcome plus a miss for every patch whose original
    /// line was not found.
    pub fn patch_file(
        &self,
        file_path: &Path,
        patches: &[&Patch],
    ) -> Result<(FileOutcome, Vec<ApplyMiss>), ApplyError> {
        let bytes = std::fs::read(file_path)?;
        let mut content =
            String::from_utf8(bytes).map_err(|_| ApplyError::NotUtf8(file_path.to_path_buf()))?;

        let mut patched = 0usize;
        let mut misses = Vec::new();
        for patch in patches {
            match content.find(&patch.original_line) {
                Some(start) => {
                    let end = start + patch.original_line.len();
                    content.replace_range(start..end, &patch.new_line);
                    patched += 1;
                }
                None => misses.push(ApplyMiss {
                    name: patch.name.clone(),
                    file_path: file_path.to_path_buf(),
                    reason: MissReason::LineNotFound,
                }),
            }
        }

        if !self.dry_run {
            std::fs::write(file_path, &content)?;
        }

        Ok((
            FileOutcome {
                file_path: file_path.to_path_buf(),
                patched,
                missed: misses.len(),
                written: !self.dry_run,
            },
            misses,
        ))
    }
}
