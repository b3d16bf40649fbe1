use serde::Serialize;
use std::path::Path;

/// Default opaque-reference type used when a parameter slot has no source text.
pub const DEFAULT_FALLBACK_PARAM: &str = "lean_object *";

/// What to scan and which markers decide inclusion.
///
/// `Default` matches a Lean-generated C tree (`.c`, `LEAN_EXPORT`) reconciled
/// against a C++ runtime tree (`.cpp`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanConfig {
    /// Extensions (without the dot) of declaration-tree files.
    pub declaration_extensions: Vec<String>,
    /// Extensions (without the dot) of implementation-tree files.
    pub implementation_extensions: Vec<String>,
    /// A declaration line carrying any of these is implemented by the generator itself.
    pub internal_markers: Vec<String>,
    /// Markers allowed between `extern "C"` and the return type of a definition.
    pub export_markers: Vec<String>,
    /// Synthetic parameter type for slots the canonical list cannot fill.
    /// `None` turns such slots into an unresolved patch.
    pub fallback_param_type: Option<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            declaration_extensions: vec!["c".into()],
            implementation_extensions: vec!["cpp".into()],
            internal_markers: vec!["LEAN_EXPORT".into()],
            export_markers: vec!["LEAN_EXPORT".into()],
            fallback_param_type: Some(DEFAULT_FALLBACK_PARAM.into()),
        }
    }
}

/// Returns `true` if `path` has one of `extensions` (exact, case-sensitive).
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| extensions.iter().any(|want| want == ext))
        .unwrap_or(false)
}
