pub mod file_resolver;

pub use file_resolver::{CODE_EXTENSIONS, Resolution, candidate_base, resolve_import_path};

use std::collections::HashSet;

use serde::Serialize;

use crate::tree::FileEntry;

/// One specifier that matched no project file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedImport {
    /// Canonical path of the importing file.
    pub origin: String,
    /// The specifier exactly as written in source.
    pub specifier: String,
    pub reason: String,
}

/// Outcome of a whole-project resolution pass.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ResolveReport {
    /// Number of specifiers rewritten to a canonical path.
    pub resolved: usize,
    /// Specifiers dropped from `imports`, in file order.
    pub unresolved: Vec<UnresolvedImport>,
}

/// Rewrite every file's `imports` from raw specifiers to canonical project paths.
///
/// Run once per snapshot, after the tree is complete. Unresolved specifiers are removed
/// from `imports` (they usually name packages outside the project) and listed in the
/// returned report instead; this pass never fails.
pub fn resolve_all(root: &mut FileEntry) -> ResolveReport {
    let all_paths: Vec<String> = root.files().iter().map(|f| f.path.clone()).collect();
    let known: HashSet<&str> = all_paths.iter().map(String::as_str).collect();

    let mut report = ResolveReport::default();

    for file in root.files_mut() {
        if file.imports.is_empty() {
            continue;
        }
        let raw = std::mem::take(&mut file.imports);
        for specifier in raw {
            match resolve_import_path(&file.path, &specifier, &known) {
                Resolution::Resolved { path } => {
                    tracing::trace!(origin = %file.path, %specifier, target = %path, "resolved import");
                    report.resolved += 1;
                    file.imports.push(path);
                }
                Resolution::Unresolved { specifier, reason } => {
                    tracing::debug!(origin = %file.path, %specifier, "unresolved import");
                    report.unresolved.push(UnresolvedImport {
                        origin: file.path.clone(),
                        specifier,
                        reason,
                    });
                }
            }
        }
    }

    tracing::debug!(
        resolved = report.resolved,
        unresolved = report.unresolved.len(),
        "import resolution finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{SourceFile, build_tree, flatten_files, imported_by};

    fn src(rel_path: &str, content: &str) -> SourceFile {
        SourceFile::new(rel_path, content)
    }

    fn sample_project() -> FileEntry {
        build_tree(
            "",
            &[
                src("a.ts", "export const foo = 1;"),
                src("b.ts", "import { foo } from './a';\nexport const bar = foo;"),
            ],
        )
    }

    #[test]
    fn test_resolves_sibling_import() {
        let mut tree = sample_project();
        let report = resolve_all(&mut tree);
        assert_eq!(tree.find("b.ts").unwrap().imports, vec!["a.ts"]);
        assert!(tree.find("a.ts").unwrap().imports.is_empty());
        assert_eq!(report.resolved, 1);
        assert!(report.unresolved.is_empty());
    }

    #[test]
    fn test_unresolved_dropped_but_reported() {
        let mut tree = build_tree(
            "app",
            &[
                src("main.ts", "import './missing';\nimport { x } from './util';"),
                src("util.ts", "export const x = 1;"),
            ],
        );
        let report = resolve_all(&mut tree);
        assert_eq!(tree.find("app/main.ts").unwrap().imports, vec!["app/util.ts"]);
        assert_eq!(report.unresolved.len(), 1);
        assert_eq!(report.unresolved[0].origin, "app/main.ts");
        assert_eq!(report.unresolved[0].specifier, "./missing");
    }

    #[test]
    fn test_second_pass_is_noop() {
        let mut tree = sample_project();
        resolve_all(&mut tree);
        let once = tree.clone();
        let report = resolve_all(&mut tree);
        assert_eq!(tree, once);
        assert!(report.unresolved.is_empty());
    }

    #[test]
    fn test_imported_by_is_inverse_of_imports() {
        let mut tree = build_tree(
            "p",
            &[
                src("a.ts", "export const a = 1;"),
                src("b.ts", "import { a } from './a';"),
                src("c.ts", "import { a } from './a';\nimport './b';"),
                src("lib/d.ts", "import '../c';\nimport '../b';"),
            ],
        );
        resolve_all(&mut tree);
        let files = flatten_files(&tree);

        let mut forward = 0;
        let mut backward = 0;
        for x in &files {
            let by = imported_by(&x.path, &files);
            backward += by.len();
            for y in &by {
                assert!(y.imports.contains(&x.path));
            }
            for target in &x.imports {
                forward += 1;
                let target_by = imported_by(target, &files);
                assert!(target_by.iter().any(|f| f.path == x.path));
            }
        }
        assert_eq!(forward, 5);
        assert_eq!(forward, backward);
    }
}
