//! # The Forge: corrected signatures for arity mismatches
//!
//! For a mismatch with canonical arity `C` and observed arity `O`, works on the
//! observed parameter tokens:
//! - `C < O`: keep the first `C` tokens (trailing world tokens are dropped).
//! - `C > O`: keep all `O` tokens, then append canonical token `i` for each
//!   missing slot `i`. A slot with no canonical text gets the fallback type.
//! - `C == O`: nothing to do.
//!
//! The new line is the observed line with only the text between the
//! signature's parentheses replaced. Attributes, braces and whitespace style
//! are left exactly as they were.
//!
//! ## Example
//! ```ignore
//! // decl: void lean_foo(lean_object * a, lean_object * b);
//! // def:  extern "C" void lean_foo(lean_object * a, lean_object * b, lean_object * w) {
//! // →     extern "C" void lean_foo(lean_object * a, lean_object * b) {
//! ```

use anatomist::params::{find_closing_paren, split_params};
use common::{Mismatch, Patch};
use serde::Serialize;
use std::cmp::Ordering;
use std::ops::Range;
use std::path::PathBuf;

/// Why a mismatch could not be turned into a patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum UnresolvedReason {
    #[error("could not locate the signature in the observed line")]
    SignatureNotFound,
    #[error("no canonical parameter text for slot {slot} and no fallback type")]
    NoFallbackType { slot: usize },
}

/// A mismatch left without a patch; surfaced as a warning, never dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unresolved {
    pub name: String,
    pub file_path: PathBuf,
    pub reason: UnresolvedReason,
}

/// Result of forging one mismatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Forged {
    Patch(Patch),
    /// Arities already agree; no edit needed.
    Unchanged,
    Unresolved(Unresolved),
}

/// Patch generator. Holds the fallback parameter type, if any.
#[derive(Debug, Clone)]
pub struct PatchForge {
    fallback_param: Option<String>,
}

impl PatchForge {
    pub fn new(fallback_param: Option<String>) -> Self {
        Self { fallback_param }
    }

    /// Produces the line-level patch for `mismatch`.
    pub fn forge(&self, mismatch: &Mismatch) -> Forged {
        let observed = &mismatch.observed;
        let unresolved = |reason| {
            Forged::Unresolved(Unresolved {
                name: mismatch.name.clone(),
                file_path: observed.file_path.clone(),
                reason,
            })
        };

        let params = match self.corrected_params(mismatch) {
            Ok(Some(params)) => params,
            Ok(None) => return Forged::Unchanged,
            Err(reason) => return unresolved(reason),
        };

        let Some(span) = locate_param_span(&observed.raw_line, &mismatch.name, &observed.param_list)
        else {
            return unresolved(UnresolvedReason::SignatureNotFound);
        };

        let new_line = splice_params(&observed.raw_line, span, &params.join(", "));
        if new_line == observed.raw_line {
            return Forged::Unchanged;
        }
        Forged::Patch(Patch {
            file_path: observed.file_path.clone(),
            original_line: observed.raw_line.clone(),
            new_line,
            name: mismatch.name.clone(),
        })
    }

    /// Computes the corrected parameter tokens, or `None` when the arities agree.
    pub fn corrected_params(
        &self,
        mismatch: &Mismatch,
    ) -> Result<Option<Vec<String>>, UnresolvedReason> {
        let canonical_count = mismatch.canonical.param_count;
        let observed_count = mismatch.observed.param_count;
        let mut params = split_params(&mismatch.observed.param_list);

        match canonical_count.cmp(&observed_count) {
            Ordering::Equal => Ok(None),
            Ordering::Less => {
                params.truncate(canonical_count);
                Ok(Some(params))
            }
            Ordering::Greater => {
                let canonical = split_params(&mismatch.canonical.param_list);
                for slot in observed_count..canonical_count {
                    match (canonical.get(slot), &self.fallback_param) {
                        (Some(param), _) => params.push(param.clone()),
                        // Unreachable for a well-formed canonical list: its count is its own length.
                        (None, Some(fallback)) => params.push(fallback.clone()),
                        (None, None) => return Err(UnresolvedReason::NoFallbackType { slot }),
                    }
                }
                Ok(Some(params))
            }
        }
    }
}

/// Finds the byte range between the parentheses of `name(<param_list>)` in `line`.
///
/// Tolerates whitespace between the name and `(` and around the parameter
/// text; the name must start on an identifier boundary.
fn locate_param_span(line: &str, name: &str, param_list: &str) -> Option<Range<usize>> {
    for (start, _) in line.match_indices(name) {
        let on_boundary = line[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !(c.is_ascii_alphanumeric() || c == '_'));
        if !on_boundary {
            continue;
        }

        let after = start + name.len();
        let rest = &line[after..];
        let open = after + (rest.len() - rest.trim_start().len());
        if line.as_bytes().get(open) != Some(&b'(') {
            continue;
        }
        let Some(close) = find_closing_paren(line, open) else {
            continue;
        };
        if line[open + 1..close].trim() == param_list {
            return Some(open + 1..close);
        }
    }
    None
}

/// Replaces the parameter text in `span`, keeping any padding inside the parentheses.
fn splice_params(line: &str, span: Range<usize>, new_params: &str) -> String {
    let inner = &line[span.clone()];
    let (lead, trail) = if inner.trim().is_empty() || new_params.is_empty() {
        ("", "")
    } else {
        (
            &inner[..inner.len() - inner.trim_start().len()],
            &inner[inner.trim_end().len()..],
        )
    };
    format!(
        "{}{}{}{}{}",
        &line[..span.start],
        lead,
        new_params,
        trail,
        &line[span.end..]
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use anatomist::{LineClass, LineClassifier, TreeKind};
    use common::{CanonicalSignature, ObservedSignature, ScanConfig};

    fn classifier() -> LineClassifier {
        LineClassifier::new(&ScanConfig::default()).unwrap()
    }

    /// Builds a mismatch by running both lines through the real classifier.
    fn mismatch(decl_line: &str, def_line: &str) -> Mismatch {
        let c = classifier();
        let LineClass::CanonicalDeclaration(d) = c.classify(TreeKind::Declaration, decl_line) else {
            panic!("not a declaration: {decl_line}");
        };
        let LineClass::ObservedDefinition(o) = c.classify(TreeKind::Implementation, def_line) else {
            panic!("not a definition: {def_line}");
        };
        Mismatch {
            name: o.name.clone(),
            canonical: CanonicalSignature {
                name: d.name,
                return_type: d.return_type,
                param_count: d.param_count,
                param_list: d.param_list,
            },
            observed: ObservedSignature {
                name: o.name,
                return_type: o.return_type,
                param_count: o.param_count,
                param_list: o.param_list,
                file_path: PathBuf::from("src/io.cpp"),
                line_number: 7,
                raw_line: def_line.to_string(),
            },
        }
    }

    fn forge() -> PatchForge {
        PatchForge::new(Some("lean_object *".into()))
    }

    fn patched_line(forged: Forged) -> String {
        match forged {
            Forged::Patch(p) => p.new_line,
            other => panic!("expected a patch, got {other:?}"),
        }
    }

    #[test]
    fn test_truncation_drops_world_token() {
        let m = mismatch(
            "void lean_foo(lean_object * a, lean_object * b);",
            "extern \"C\" void lean_foo(lean_object * a, lean_object * b, lean_object * w) {",
        );
        assert_eq!(
            patched_line(forge().forge(&m)),
            "extern \"C\" void lean_foo(lean_object * a, lean_object * b) {"
        );
    }

    #[test]
    fn test_extension_appends_canonical_params() {
        let m = mismatch(
            "lean_object * lean_bar(lean_object * a, lean_object * b, lean_object * c);",
            "extern \"C\" lean_object * lean_bar(lean_object * a) {",
        );
        assert_eq!(
            patched_line(forge().forge(&m)),
            "extern \"C\" lean_object * lean_bar(lean_object * a, lean_object * b, lean_object * c) {"
        );
    }

    #[test]
    fn test_truncation_to_zero_params() {
        let m = mismatch(
            "lean_object* lean_io_get_time(void);",
            "extern \"C\" LEAN_EXPORT lean_object * lean_io_get_time(lean_object * /* w */) {",
        );
        assert_eq!(
            patched_line(forge().forge(&m)),
            "extern \"C\" LEAN_EXPORT lean_object * lean_io_get_time() {"
        );
    }

    #[test]
    fn test_extension_from_void() {
        let m = mismatch(
            "uint8_t lean_flag(lean_object* x_1);",
            "extern \"C\" uint8_t lean_flag(void) { return 0; }",
        );
        assert_eq!(
            patched_line(forge().forge(&m)),
            "extern \"C\" uint8_t lean_flag(lean_object* x_1) { return 0; }"
        );
    }

    #[test]
    fn test_whitespace_style_preserved() {
        let m = mismatch(
            "void lean_foo(lean_object * a);",
            "extern \"C\"  void   lean_foo ( lean_object * a, lean_object * w )   {  // io",
        );
        assert_eq!(
            patched_line(forge().forge(&m)),
            "extern \"C\"  void   lean_foo ( lean_object * a )   {  // io"
        );
    }

    #[test]
    fn test_function_pointer_param_kept_whole() {
        let m = mismatch(
            "int lean_apply(void (*f)(int, int));",
            "extern \"C\" int lean_apply(void (*f)(int, int), lean_object * w) {",
        );
        assert_eq!(
            patched_line(forge().forge(&m)),
            "extern \"C\" int lean_apply(void (*f)(int, int)) {"
        );
    }

    #[test]
    fn test_name_must_be_on_identifier_boundary() {
        let mut m = mismatch(
            "void lean_foo(lean_object * a);",
            "extern \"C\" void lean_foo(lean_object * a, lean_object * w) {",
        );
        m.observed.raw_line =
            "extern \"C\" void my_lean_foo(lean_object * a, lean_object * w) { lean_foo(lean_object * a, lean_object * w) {"
                .into();
        let line = patched_line(forge().forge(&m));
        assert!(line.contains("my_lean_foo(lean_object * a, lean_object * w)"));
        assert!(line.contains(" lean_foo(lean_object * a) {"));
    }

    #[test]
    fn test_equal_arity_is_unchanged() {
        let m = mismatch(
            "void lean_foo(lean_object * a, lean_object * b);",
            "extern \"C\" void lean_foo(lean_object * a, lean_object * b) {",
        );
        assert_eq!(forge().forge(&m), Forged::Unchanged);
    }

    #[test]
    fn test_fallback_fills_missing_canonical_text() {
        let mut m = mismatch(
            "lean_object * lean_bar(lean_object * a, lean_object * b);",
            "extern \"C\" lean_object * lean_bar(lean_object * a) {",
        );
        m.canonical.param_count = 3;
        assert_eq!(
            patched_line(forge().forge(&m)),
            "extern \"C\" lean_object * lean_bar(lean_object * a, lean_object * b, lean_object *) {"
        );
    }

    #[test]
    fn test_fallback_unused_for_well_formed_canonical() {
        let m = mismatch(
            "lean_object * lean_bar(lean_object * a, lean_object * b, lean_object * c);",
            "extern \"C\" lean_object * lean_bar(lean_object * a) {",
        );
        let with = PatchForge::new(Some("SENTINEL".into())).forge(&m);
        assert!(!patched_line(with).contains("SENTINEL"));
    }

    #[test]
    fn test_no_fallback_is_unresolved() {
        let mut m = mismatch(
            "lean_object * lean_bar(lean_object * a);",
            "extern \"C\" lean_object * lean_bar() {",
        );
        m.canonical.param_count = 2;
        match PatchForge::new(None).forge(&m) {
            Forged::Unresolved(u) => {
                assert_eq!(u.name, "lean_bar");
                assert_eq!(u.reason, UnresolvedReason::NoFallbackType { slot: 1 });
            }
            other => panic!("expected unresolved, got {other:?}"),
        }
    }

    #[test]
    fn test_signature_not_found_is_unresolved() {
        let mut m = mismatch(
            "void lean_foo(lean_object * a);",
            "extern \"C\" void lean_foo(lean_object * a, lean_object * w) {",
        );
        m.observed.raw_line = "extern \"C\" void lean_foo(lean_object * x, lean_object * w) {".into();
        match forge().forge(&m) {
            Forged::Unresolved(u) => assert_eq!(u.reason, UnresolvedReason::SignatureNotFound),
            other => panic!("expected unresolved, got {other:?}"),
        }
    }

    #[test]
    fn test_patched_line_reclassifies_to_canonical_arity() {
        let cases = [
            (
                "void lean_foo(lean_object * a, lean_object * b);",
                "extern \"C\" void lean_foo(lean_object * a, lean_object * b, lean_object * w) {",
            ),
            (
                "lean_object * lean_bar(lean_object * a, lean_object * b, lean_object * c);",
                "extern \"C\" lean_object * lean_bar(lean_object * a) {",
            ),
        ];
        for (decl_line, def_line) in cases {
            let m = mismatch(decl_line, def_line);
            let line = patched_line(forge().forge(&m));
            let LineClass::ObservedDefinition(p) =
                classifier().classify(TreeKind::Implementation, &line)
            else {
                panic!("patched line no longer a definition: {line}");
            };
            assert_eq!(p.param_count, m.canonical.param_count);

            // Forging again against the corrected line produces nothing.
            let again = mismatch(decl_line, &line);
            assert_eq!(forge().forge(&again), Forged::Unchanged);
        }
    }
}
