//! # Common: shared data model for signature reconciliation
//!
//! Every stage of the pipeline speaks in these types:
//! - [`CanonicalSignature`]: a forward declaration from the generated C tree.
//! - [`ObservedSignature`]: an `extern "C"` definition from the hand-written tree,
//!   with the location it was found at.
//! - [`Mismatch`]: a same-named pair whose arities disagree.
//! - [`Patch`]: a single line-granular textual edit.
//!
//! Registries ([`Registry`]) are plain values passed from stage to stage.
//! Nothing here is global and nothing is persisted between runs.

pub mod config;
pub mod registry;
pub mod signature;

pub use config::ScanConfig;
pub use registry::{Insertion, Registry};
pub use signature::{
    CanonicalSignature, Mismatch, ObservedSignature, Patch, Redeclaration, Signature,
};
