//! Line classification: the single place where source text is pattern-matched.
//!
//! Every scanned line maps to exactly one [`LineClass`]. The extractors never
//! look at raw text themselves; they only consume classifier output.

use crate::params::{count_params, find_closing_paren};
use crate::ScanError;
use aho_corasick::AhoCorasick;
use common::ScanConfig;
use regex::{Captures, Regex};

/// `<return-type> <identifier> (`; the return type must end in whitespace or `*`
/// so that `lean_object *lean_foo(` and `lean_object * lean_foo(` both split cleanly.
const RETURN_AND_NAME: &str =
    r"(?P<ret>[A-Za-z_][A-Za-z_0-9*\s]*?[\s*])\s*(?P<name>[A-Za-z_][A-Za-z_0-9]*)\s*\(";

/// Language-interop linkage marker every observed definition must carry.
const LINKAGE_MARKER: &str = r#"extern\s+"C"\s+"#;

/// Words that can open a call statement and must never be read as a return type.
const STATEMENT_KEYWORDS: &[&str] = &[
    "return", "else", "goto", "case", "sizeof", "typedef", "if", "while", "do", "throw", "delete",
    "new",
];

/// Which tree a line came from; decides which shape is looked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeKind {
    /// Generated declaration tree: `ret name(params);`
    Declaration,
    /// Hand-written implementation tree: `extern "C" [EXPORT] ret name(params) {`
    Implementation,
}

/// The pieces of a signature recovered from one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureParts {
    pub return_type: String,
    pub name: String,
    /// Text between the parentheses, trimmed.
    pub param_list: String,
    pub param_count: usize,
}

/// Result of classifying one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass {
    /// Matches no recognized shape, or is excluded. Not an error.
    Ignored,
    CanonicalDeclaration(SignatureParts),
    ObservedDefinition(SignatureParts),
}

/// Compiled patterns for both trees, built once per run from a [`ScanConfig`].
pub struct LineClassifier {
    /// `None` when no internal markers are configured.
    internal_markers: Option<AhoCorasick>,
    declaration_head: Regex,
    definition_head: Regex,
}

impl LineClassifier {
    /// Compiles the declaration and definition patterns.
    ///
    /// # Errors
    /// Returns [`ScanError::Pattern`] if the marker automaton or a regex fails to build.
    pub fn new(config: &ScanConfig) -> Result<Self, ScanError> {
        let internal_markers = if config.internal_markers.is_empty() {
            None
        } else {
            Some(
                AhoCorasick::new(&config.internal_markers)
                    .map_err(|e| ScanError::Pattern(format!("internal markers: {}", e)))?,
            )
        };

        let declaration_head = Regex::new(&format!("^{}", RETURN_AND_NAME))
            .map_err(|e| ScanError::Pattern(e.to_string()))?;

        let export = if config.export_markers.is_empty() {
            String::new()
        } else {
            let alternatives: Vec<String> = config
                .export_markers
                .iter()
                .map(|m| regex::escape(m))
                .collect();
            format!(r"(?:(?:{})\s+)?", alternatives.join("|"))
        };
        let definition_head = Regex::new(&format!("{}{}{}", LINKAGE_MARKER, export, RETURN_AND_NAME))
            .map_err(|e| ScanError::Pattern(e.to_string()))?;

        Ok(Self {
            internal_markers,
            declaration_head,
            definition_head,
        })
    }

    /// Classifies one line read from a tree of the given kind.
    pub fn classify(&self, kind: TreeKind, line: &str) -> LineClass {
        match kind {
            TreeKind::Declaration => self.classify_declaration(line),
            TreeKind::Implementation => self.classify_definition(line),
        }
    }

    fn classify_declaration(&self, line: &str) -> LineClass {
        let line = line.trim();
        if is_comment_or_directive(line) || self.is_internal(line) || has_internal_linkage(line) {
            return LineClass::Ignored;
        }

        let Some(caps) = self.declaration_head.captures(line) else {
            return LineClass::Ignored;
        };
        match signature_after_head(line, &caps) {
            Some((parts, rest)) if rest.trim_start().starts_with(';') => {
                LineClass::CanonicalDeclaration(parts)
            }
            _ => LineClass::Ignored,
        }
    }

    /// Takes the first head on the line that opens a body; earlier fragments
    /// such as a same-line prototype are skipped.
    fn classify_definition(&self, line: &str) -> LineClass {
        self.definition_head
            .captures_iter(line)
            .find_map(|caps| match signature_after_head(line, &caps) {
                Some((parts, rest)) if rest.trim_start().starts_with('{') => Some(parts),
                _ => None,
            })
            .map_or(LineClass::Ignored, LineClass::ObservedDefinition)
    }

    fn is_internal(&self, line: &str) -> bool {
        self.internal_markers
            .as_ref()
            .map(|ac| ac.is_match(line))
            .unwrap_or(false)
    }
}

/// Reads the parameter list that follows a matched head and returns the
/// signature plus whatever text trails the closing parenthesis.
fn signature_after_head<'l>(line: &'l str, caps: &Captures<'_>) -> Option<(SignatureParts, &'l str)> {
    let open = caps.get(0)?.end() - 1;
    let close = find_closing_paren(line, open)?;

    let return_type = caps.name("ret")?.as_str().trim();
    if is_statement_keyword(return_type) {
        return None;
    }

    let param_list = line[open + 1..close].trim();
    Some((
        SignatureParts {
            return_type: return_type.to_string(),
            name: caps.name("name")?.as_str().to_string(),
            param_list: param_list.to_string(),
            param_count: count_params(param_list),
        },
        &line[close + 1..],
    ))
}

fn is_comment_or_directive(line: &str) -> bool {
    line.starts_with("//") || line.starts_with("/*") || line.starts_with('*') || line.starts_with('#')
}

fn has_internal_linkage(line: &str) -> bool {
    line.split_whitespace().next() == Some("static")
}

fn is_statement_keyword(return_type: &str) -> bool {
    return_type
        .split(|c: char| c.is_whitespace() || c == '*')
        .next()
        .map(|first| STATEMENT_KEYWORDS.contains(&first))
        .unwrap_or(false)
}
