//! Declaration and definition extractors.
//!
//! Both walk their roots in command-line order, visit files sorted by name,
//! and insert every classified signature into a first-seen-wins registry.
//! A later entry whose arity disagrees with the registered one is recorded as
//! a [`Redeclaration`]; the registered entry is never replaced.
//!
//! Symbolic links are followed, to files and directories alike; a link cycle
//! surfaces as a failed walk entry.

use crate::classify::{LineClass, LineClassifier, SignatureParts, TreeKind};
use crate::ScanError;
use common::config::has_extension;
use common::{
    CanonicalSignature, Insertion, ObservedSignature, Redeclaration, Registry, ScanConfig,
    Signature,
};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Per-file result of a scan.
#[derive(Debug)]
pub enum FileScan {
    /// File was read; `matches` lines classified as signatures.
    Scanned { path: PathBuf, matches: usize },
    /// File (or directory entry) could not be read and was skipped.
    Failed { path: PathBuf, error: ScanError },
}

impl FileScan {
    pub fn path(&self) -> &Path {
        match self {
            FileScan::Scanned { path, .. } | FileScan::Failed { path, .. } => path,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FileScan::Failed { .. })
    }

    pub fn error(&self) -> Option<&ScanError> {
        match self {
            FileScan::Failed { error, .. } => Some(error),
            FileScan::Scanned { .. } => None,
        }
    }
}

/// Everything one extractor produced.
#[derive(Debug)]
pub struct ScanReport<T> {
    pub registry: Registry<T>,
    pub redeclarations: Vec<Redeclaration>,
    pub files: Vec<FileScan>,
}

impl<T: Signature> ScanReport<T> {
    fn new() -> Self {
        Self {
            registry: Registry::new(),
            redeclarations: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Files that could not be scanned.
    pub fn failures(&self) -> impl Iterator<Item = &FileScan> {
        self.files.iter().filter(|f| f.is_failed())
    }

    fn register(&mut self, entry: T, path: &Path, line_number: usize) {
        let name = entry.name().to_string();
        let arity = entry.param_count();
        match self.registry.insert(entry) {
            Insertion::Inserted => {
                debug!("registered {} ({} params) at {}:{}", name, arity, path.display(), line_number);
            }
            Insertion::Duplicate { existing } if existing.param_count() != arity => {
                self.redeclarations.push(Redeclaration {
                    kept_arity: existing.param_count(),
                    ignored_arity: arity,
                    name,
                    file_path: path.to_path_buf(),
                    line_number,
                });
            }
            Insertion::Duplicate { .. } => {}
        }
    }
}

/// Runs the declaration and definition extractors with one compiled classifier.
pub struct SignatureExtractor {
    classifier: LineClassifier,
    config: ScanConfig,
}

impl SignatureExtractor {
    /// # Errors
    /// Propagates [`ScanError::Pattern`] from classifier construction.
    pub fn new(config: &ScanConfig) -> Result<Self, ScanError> {
        Ok(Self {
            classifier: LineClassifier::new(config)?,
            config: config.clone(),
        })
    }

    /// Builds the canonical registry from the declaration tree roots.
    pub fn declarations(&self, roots: &[PathBuf]) -> ScanReport<CanonicalSignature> {
        self.scan_tree(roots, TreeKind::Declaration, |parts, _, _, _| {
            CanonicalSignature {
                name: parts.name,
                return_type: parts.return_type,
                param_count: parts.param_count,
                param_list: parts.param_list,
            }
        })
    }

    /// Builds the observed registry from the implementation tree roots.
    pub fn definitions(&self, roots: &[PathBuf]) -> ScanReport<ObservedSignature> {
        self.scan_tree(
            roots,
            TreeKind::Implementation,
            |parts, path, line_number, line| ObservedSignature {
                name: parts.name,
                return_type: parts.return_type,
                param_count: parts.param_count,
                param_list: parts.param_list,
                file_path: path.to_path_buf(),
                line_number,
                raw_line: line.trim_end().to_string(),
            },
        )
    }

    fn scan_tree<T, F>(&self, roots: &[PathBuf], kind: TreeKind, build: F) -> ScanReport<T>
    where
        T: Signature,
        F: Fn(SignatureParts, &Path, usize, &str) -> T,
    {
        let extensions = match kind {
            TreeKind::Declaration => &self.config.declaration_extensions,
            TreeKind::Implementation => &self.config.implementation_extensions,
        };

        let mut report = ScanReport::new();
        for root in roots {
            for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
                let entry = match entry {
                    Ok(e) => e,
                    Err(e) => {
                        let path = e.path().unwrap_or(root.as_path()).to_path_buf();
                        warn!("skipping {}: {}", path.display(), e);
                        report.files.push(FileScan::Failed {
                            path,
                            error: ScanError::Walk(e),
                        });
                        continue;
                    }
                };
                let path = entry.path();
                if !entry.file_type().is_file() || !has_extension(path, extensions) {
                    continue;
                }

                let source = match std::fs::read(path) {
                    Ok(bytes) => bytes,
                    Err(source) => {
                        warn!("skipping {}: {}", path.display(), source);
                        report.files.push(FileScan::Failed {
                            path: path.to_path_buf(),
                            error: ScanError::Read {
                                path: path.to_path_buf(),
                                source,
                            },
                        });
                        continue;
                    }
                };
                let text = String::from_utf8_lossy(&source);

                let mut matches = 0usize;
                for (idx, line) in text.lines().enumerate() {
                    let parts = match self.classifier.classify(kind, line) {
                        LineClass::CanonicalDeclaration(p) | LineClass::ObservedDefinition(p) => p,
                        LineClass::Ignored => continue,
                    };
                    matches += 1;
                    let line_number = idx + 1;
                    let entry = build(parts, path, line_number, line);
                    report.register(entry, path, line_number);
                }

                report.files.push(FileScan::Scanned {
                    path: path.to_path_buf(),
                    matches,
                });
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn extractor() -> SignatureExtractor {
        SignatureExtractor::new(&ScanConfig::default()).unwrap()
    }

    #[test]
    fn test_empty_tree() {
        let tmp = tempfile::tempdir().unwrap();
        let report = extractor().declarations(&[tmp.path().to_path_buf()]);
        assert!(report.registry.is_empty());
        assert!(report.files.is_empty());
    }

    #[test]
    fn test_declarations_skip_other_extensions() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("a.c"), "void lean_foo(lean_object * a);\n").unwrap();
        fs::write(tmp.path().join("a.h"), "void lean_bar(lean_object * a);\n").unwrap();

        let report = extractor().declarations(&[tmp.path().to_path_buf()]);
        assert!(report.registry.contains("lean_foo"));
        assert!(!report.registry.contains("lean_bar"));
        assert_eq!(report.files.len(), 1);
    }

    #[test]
    fn test_declarations_recurse_and_exclude_internal() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("Init/Data")).unwrap();
        fs::write(
            tmp.path().join("Init/Data/String.c"),
            "// Lean compiler output\n\
             #include <lean/lean.h>\n\
             LEAN_EXPORT lean_object* l_String_append(lean_object*, lean_object*);\n\
             static lean_object* l_helper(lean_object*);\n\
             lean_object* lean_string_push(lean_object*, uint32_t);\n",
        )
        .unwrap();

        let report = extractor().declarations(&[tmp.path().to_path_buf()]);
        assert_eq!(report.registry.len(), 1);
        let sig = report.registry.get("lean_string_push").unwrap();
        assert_eq!(sig.param_count, 2);
        assert_eq!(sig.return_type, "lean_object*");
    }

    #[test]
    fn test_definitions_record_location() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("io.cpp");
        fs::write(
            &file,
            "#include <lean/lean.h>\n\
             \n\
             extern \"C\" LEAN_EXPORT lean_object * lean_io_foo(lean_object * a, lean_object * w) {   \n\
             \x20   return a;\n\
             }\n\
             void not_extern(int a) {\n\
             }\n",
        )
        .unwrap();

        let report = extractor().definitions(&[tmp.path().to_path_buf()]);
        assert_eq!(report.registry.len(), 1);
        let sig = report.registry.get("lean_io_foo").unwrap();
        assert_eq!(sig.param_count, 2);
        assert_eq!(sig.line_number, 3);
        assert_eq!(sig.file_path, file);
        assert_eq!(
            sig.raw_line,
            "extern \"C\" LEAN_EXPORT lean_object * lean_io_foo(lean_object * a, lean_object * w) {"
        );
    }

    #[test]
    fn test_first_seen_wins_across_files_in_name_order() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("b.c"), "void lean_foo(int a, int b, int c);\n").unwrap();
        fs::write(tmp.path().join("a.c"), "void lean_foo(int a);\n").unwrap();

        let report = extractor().declarations(&[tmp.path().to_path_buf()]);
        assert_eq!(report.registry.get("lean_foo").unwrap().param_count, 1);
        assert_eq!(report.redeclarations.len(), 1);
        let r = &report.redeclarations[0];
        assert_eq!((r.kept_arity, r.ignored_arity), (1, 3));
        assert_eq!(r.file_path, tmp.path().join("b.c"));
    }

    #[test]
    fn test_consistent_duplicates_are_not_redeclarations() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("a.c"), "void lean_foo(int a);\n").unwrap();
        fs::write(tmp.path().join("b.c"), "void lean_foo(int x);\n").unwrap();

        let report = extractor().declarations(&[tmp.path().to_path_buf()]);
        assert_eq!(report.registry.len(), 1);
        assert!(report.redeclarations.is_empty());
    }

    #[test]
    fn test_roots_scanned_in_given_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fs::write(first.path().join("z.c"), "void lean_foo(int a, int b);\n").unwrap();
        fs::write(second.path().join("a.c"), "void lean_foo(int a);\n").unwrap();

        let roots = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        let report = extractor().declarations(&roots);
        assert_eq!(report.registry.get("lean_foo").unwrap().param_count, 2);
    }

    #[test]
    fn test_missing_root_is_reported_not_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("a.cpp"), "extern \"C\" void lean_foo(int a) {\n").unwrap();

        let roots = vec![tmp.path().join("does-not-exist"), tmp.path().to_path_buf()];
        let report = extractor().definitions(&roots);
        assert_eq!(report.failures().count(), 1);
        assert!(report.registry.contains("lean_foo"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_files_are_scanned() {
        let tmp = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        let target = outside.path().join("real.cpp");
        fs::write(&target, "extern \"C\" void lean_foo(lean_object * a, lean_object * w) {\n").unwrap();
        std::os::unix::fs::symlink(&target, tmp.path().join("foo.cpp")).unwrap();

        let report = extractor().definitions(&[tmp.path().to_path_buf()]);
        let sig = report.registry.get("lean_foo").unwrap();
        assert_eq!(sig.param_count, 2);
        assert_eq!(sig.file_path, tmp.path().join("foo.cpp"));
        assert_eq!(report.files.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directories_are_descended() {
        let tmp = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        fs::write(outside.path().join("a.c"), "void lean_foo(lean_object* a);\n").unwrap();
        std::os::unix::fs::symlink(outside.path(), tmp.path().join("linked")).unwrap();

        let report = extractor().declarations(&[tmp.path().to_path_buf()]);
        assert!(report.registry.contains("lean_foo"));
    }

    #[test]
    fn test_rescan_is_identical() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("a.cpp"), "extern \"C\" void lean_a(int a) {\n").unwrap();
        fs::write(tmp.path().join("b.cpp"), "extern \"C\" void lean_b(int a, int b) {\n").unwrap();

        let roots = vec![tmp.path().to_path_buf()];
        let first = extractor().definitions(&roots);
        let second = extractor().definitions(&roots);
        assert_eq!(first.registry, second.registry);
    }
}
