use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Behaviour shared by both registry entry kinds.
pub trait Signature {
    /// Function name; the registry key.
    fn name(&self) -> &str;
    /// Number of parameters (arity).
    fn param_count(&self) -> usize;
}

/// Authoritative forward declaration from the declaration tree.
///
/// Immutable once registered: the first declaration seen for a name wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalSignature {
    pub name: String,
    /// Return type text as written, trimmed (e.g. `lean_object *`).
    pub return_type: String,
    pub param_count: usize,
    /// Parameter list text between the parentheses, trimmed.
    pub param_list: String,
}

impl Signature for CanonicalSignature {
    fn name(&self) -> &str {
        &self.name
    }

    fn param_count(&self) -> usize {
        self.param_count
    }
}

impl fmt::Display for CanonicalSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}({});", self.return_type, self.name, self.param_list)
    }
}

/// Hand-written definition from the implementation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObservedSignature {
    pub name: String,
    pub return_type: String,
    pub param_count: usize,
    pub param_list: String,
    pub file_path: PathBuf,
    /// 1-based line number of the definition.
    pub line_number: usize,
    /// The line as read, without its newline and trailing whitespace.
    pub raw_line: String,
}

impl Signature for ObservedSignature {
    fn name(&self) -> &str {
        &self.name
    }

    fn param_count(&self) -> usize {
        self.param_count
    }
}

/// A same-named canonical/observed pair whose `param_count`s differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    pub name: String,
    pub canonical: CanonicalSignature,
    pub observed: ObservedSignature,
}

impl Mismatch {
    /// Builds a mismatch, or `None` when the arities agree.
    pub fn between(canonical: &CanonicalSignature, observed: &ObservedSignature) -> Option<Self> {
        if canonical.param_count == observed.param_count {
            return None;
        }
        Some(Self {
            name: observed.name.clone(),
            canonical: canonical.clone(),
            observed: observed.clone(),
        })
    }
}

/// Line-granular textual edit against one implementation file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Patch {
    pub file_path: PathBuf,
    pub original_line: String,
    pub new_line: String,
    /// Function the edit corrects (for reporting only).
    pub name: String,
}

/// A later same-name entry whose arity differs from the one already registered.
///
/// The registered entry is kept; this only records that the trees disagree
/// with themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redeclaration {
    pub name: String,
    pub kept_arity: usize,
    pub ignored_arity: usize,
    pub file_path: PathBuf,
    pub line_number: usize,
}
