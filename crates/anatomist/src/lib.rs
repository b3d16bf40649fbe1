//! # The Anatomist: signature extraction from both source trees
//!
//! **Role**: turns two directory sets into two name-keyed registries.
//!
//! **Core Types**:
//! - [`LineClassifier`]: compiles the declaration/definition shapes once and
//!   maps each line to a [`LineClass`].
//! - [`SignatureExtractor`]: walks roots, feeds lines to the classifier, and
//!   fills a [`common::Registry`] with first-seen-wins semantics.
//! - [`FileScan`]: explicit per-file outcome; unreadable files are reported,
//!   never silently dropped along with the rest of their directory.
//!
//! **Design**:
//! - Only arity matters downstream; parameter text is kept verbatim so the
//!   forge can splice it back.
//! - Traversal is sorted by file name, so "first occurrence" is the same on
//!   every platform.

pub mod classify;
pub mod extract;
pub mod params;

pub use classify::{LineClass, LineClassifier, SignatureParts, TreeKind};
pub use extract::{FileScan, ScanReport, SignatureExtractor};

use std::path::PathBuf;

/// Errors from anatomist operations.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("I/O error reading {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Pattern error: {0}")]
    Pattern(String),
}
