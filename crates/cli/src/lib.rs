//! # sigmend: the reconciliation pipeline end to end
//!
//! Scan → Detect → Generate → Apply, strictly in that order, each stage
//! consuming the previous stage's value. The resulting [`RunSummary`] is all
//! the reporter needs.

pub mod args;
pub mod report;

use anatomist::{ScanError, SignatureExtractor};
use common::{Mismatch, Redeclaration, ScanConfig};
use forge::{Forged, PatchForge, UnresolvedReason};
use oracle::ArityOracle;
use reaper::{ApplyReport, LinePatcher};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Inputs to one reconciliation run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub config: ScanConfig,
    pub decl_dirs: Vec<PathBuf>,
    pub impl_dirs: Vec<PathBuf>,
    pub dry_run: bool,
}

/// How a mismatch ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    Fixed { new_line: String },
    Unresolved { reason: UnresolvedReason },
    /// The corrected line came out identical to the observed one.
    NoChange,
}

/// One detected mismatch with before/after text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MismatchEntry {
    pub name: String,
    pub canonical_arity: usize,
    pub observed_arity: usize,
    pub file_path: PathBuf,
    pub line_number: usize,
    pub canonical: String,
    pub observed_line: String,
    pub resolution: Resolution,
}

impl MismatchEntry {
    fn new(mismatch: &Mismatch, resolution: Resolution) -> Self {
        Self {
            name: mismatch.name.clone(),
            canonical_arity: mismatch.canonical.param_count,
            observed_arity: mismatch.observed.param_count,
            file_path: mismatch.observed.file_path.clone(),
            line_number: mismatch.observed.line_number,
            canonical: mismatch.canonical.to_string(),
            observed_line: mismatch.observed.raw_line.clone(),
            resolution,
        }
    }
}

/// A file or directory entry an extractor could not read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Everything a run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub declarations: usize,
    pub definitions: usize,
    pub scan_failures: Vec<ScanFailure>,
    pub redeclarations: Vec<Redeclaration>,
    pub mismatches: Vec<MismatchEntry>,
    pub apply: ApplyReport,
    pub dry_run: bool,
}

impl RunSummary {
    /// Mismatches that did not yield a patch.
    pub fn unresolved(&self) -> impl Iterator<Item = &MismatchEntry> {
        self.mismatches
            .iter()
            .filter(|m| !matches!(m.resolution, Resolution::Fixed { .. }))
    }
}

/// Runs the whole pipeline once.
///
/// # Errors
/// Only classifier construction can fail. Per-file problems are recorded in
/// the summary and never abort the run.
pub fn reconcile(options: &RunOptions) -> Result<RunSummary, ScanError> {
    // 1. Scan
    let extractor = SignatureExtractor::new(&options.config)?;
    let declarations = extractor.declarations(&options.decl_dirs);
    let definitions = extractor.definitions(&options.impl_dirs);
    info!(
        "{} declarations, {} definitions",
        declarations.registry.len(),
        definitions.registry.len()
    );

    // 2. Detect
    let mismatches = ArityOracle::find_mismatches(&declarations.registry, &definitions.registry);

    // 3. Generate
    let forge = PatchForge::new(options.config.fallback_param_type.clone());
    let mut patches = Vec::new();
    let mut entries = Vec::with_capacity(mismatches.len());
    for mismatch in &mismatches {
        let resolution = match forge.forge(mismatch) {
            Forged::Patch(patch) => {
                let resolution = Resolution::Fixed {
                    new_line: patch.new_line.clone(),
                };
                patches.push(patch);
                resolution
            }
            Forged::Unresolved(u) => Resolution::Unresolved { reason: u.reason },
            Forged::Unchanged => Resolution::NoChange,
        };
        entries.push(MismatchEntry::new(mismatch, resolution));
    }

    // 4. Apply
    let patcher = if options.dry_run {
        LinePatcher::dry_run()
    } else {
        LinePatcher::new()
    };
    let apply = patcher.apply(&patches);

    let scan_failures = declarations
        .files
        .iter()
        .chain(definitions.files.iter())
        .filter_map(|f| {
            f.error().map(|e| ScanFailure {
                path: f.path().to_path_buf(),
                error: e.to_string(),
            })
        })
        .collect();

    let mut redeclarations = declarations.redeclarations;
    redeclarations.extend(definitions.redeclarations);

    Ok(RunSummary {
        declarations: declarations.registry.len(),
        definitions: definitions.registry.len(),
        scan_failures,
        redeclarations,
        mismatches: entries,
        apply,
        dry_run: options.dry_run,
    })
}
