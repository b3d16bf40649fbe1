//! Command-line surface: `sigmend [OPTIONS] <DECL_DIR>... -- <IMPL_DIR>...`
//!
//! The raw argument list is split at the first literal `--` before clap sees
//! it. Clap parses the left side (options and declaration roots); the right
//! side is taken verbatim as implementation roots.

use clap::{CommandFactory, Parser};
use common::config::DEFAULT_FALLBACK_PARAM;
use common::ScanConfig;
use std::ffi::OsString;
use std::path::PathBuf;

/// Literal token separating the two directory groups.
pub const SEPARATOR: &str = "--";

#[derive(Parser, Debug)]
#[command(name = "sigmend")]
#[command(
    about = "Reconcile extern \"C\" definitions with the arity of their generated declarations",
    long_about = None
)]
#[command(override_usage = "sigmend [OPTIONS] <DECL_DIR>... -- <IMPL_DIR>...")]
pub struct Cli {
    /// Roots of the generated declaration tree.
    #[arg(value_name = "DECL_DIR")]
    pub decl_dirs: Vec<PathBuf>,

    /// Extensions of declaration-tree files.
    #[arg(long = "decl-ext", env = "SIGMEND_DECL_EXT", value_delimiter = ',', default_value = "c")]
    pub decl_ext: Vec<String>,

    /// Extensions of implementation-tree files.
    #[arg(long = "impl-ext", env = "SIGMEND_IMPL_EXT", value_delimiter = ',', default_value = "cpp")]
    pub impl_ext: Vec<String>,

    /// Declarations carrying this marker are implemented by the generator and skipped.
    #[arg(
        long = "internal-marker",
        env = "SIGMEND_INTERNAL_MARKER",
        value_delimiter = ',',
        default_value = "LEAN_EXPORT"
    )]
    pub internal_markers: Vec<String>,

    /// Marker allowed between `extern "C"` and the return type of a definition.
    #[arg(
        long = "export-marker",
        env = "SIGMEND_EXPORT_MARKER",
        value_delimiter = ',',
        default_value = "LEAN_EXPORT"
    )]
    pub export_markers: Vec<String>,

    /// Parameter type used when a missing slot has no canonical text.
    #[arg(long, env = "SIGMEND_FALLBACK_PARAM", default_value = DEFAULT_FALLBACK_PARAM)]
    pub fallback_param: String,

    /// Leave such slots unresolved instead of using the fallback type.
    #[arg(long)]
    pub no_fallback: bool,

    /// Run every stage but do not write any file.
    #[arg(long)]
    pub dry_run: bool,

    /// Also print the run summary as JSON on stdout.
    #[arg(long)]
    pub json: bool,

    /// Debug-level logging.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Malformed invocation; reported before any tree is touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UsageError {
    #[error("missing `--` between declaration and implementation directories")]
    MissingSeparator,
    #[error("need at least one declaration directory before `--`")]
    NoDeclarationDirs,
    #[error("need at least one implementation directory after `--`")]
    NoImplementationDirs,
}

/// A validated invocation.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub config: ScanConfig,
    pub decl_dirs: Vec<PathBuf>,
    pub impl_dirs: Vec<PathBuf>,
    pub dry_run: bool,
    pub json: bool,
    pub verbose: bool,
}

/// Splits raw arguments at the first `--`.
///
/// Returns everything before it (program name included) and, if the
/// separator was present, everything after it.
pub fn split_at_separator(args: Vec<OsString>) -> (Vec<OsString>, Option<Vec<OsString>>) {
    match args.iter().position(|a| a == SEPARATOR) {
        Some(idx) => {
            let mut head = args;
            let tail = head.split_off(idx + 1);
            head.pop();
            (head, Some(tail))
        }
        None => (args, None),
    }
}

impl Cli {
    /// Checks both directory groups and folds the options into a [`ScanConfig`].
    pub fn into_invocation(self, tail: Option<Vec<OsString>>) -> Result<Invocation, UsageError> {
        let tail = tail.ok_or(UsageError::MissingSeparator)?;
        if self.decl_dirs.is_empty() {
            return Err(UsageError::NoDeclarationDirs);
        }
        if tail.is_empty() {
            return Err(UsageError::NoImplementationDirs);
        }

        let config = ScanConfig {
            declaration_extensions: self.decl_ext,
            implementation_extensions: self.impl_ext,
            internal_markers: self.internal_markers,
            export_markers: self.export_markers,
            fallback_param_type: (!self.no_fallback).then_some(self.fallback_param),
        };

        Ok(Invocation {
            config,
            decl_dirs: self.decl_dirs,
            impl_dirs: tail.into_iter().map(PathBuf::from).collect(),
            dry_run: self.dry_run,
            json: self.json,
            verbose: self.verbose,
        })
    }
}

/// Usage line for error output.
pub fn usage() -> String {
    Cli::command().render_usage().to_string()
}
