use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::config::GraphConfig;
use crate::error::GraphError;
use crate::resolver::{self, ResolveReport};
use crate::tree::{self, FileEntry, SourceFile};

/// Directory names that are never descended into, regardless of .gitignore.
pub(crate) const HARD_EXCLUDED_DIRS: &[&str] = &["node_modules", "dist", "build"];

/// A fully built snapshot: the resolved tree plus the resolver's report.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub root: FileEntry,
    pub report: ResolveReport,
    /// Files that were discovered but could not be read; they stay in the tree with no
    /// imports or exports.
    pub unreadable: usize,
}

/// Walk a project directory and collect source file paths.
///
/// Respects `.gitignore` rules and skips hidden entries, always excludes `node_modules`,
/// `dist` and `build`, and applies any additional exclusions from `config.exclude`.
/// Only files with one of the resolver's code extensions are returned.
pub fn walk_project(root: &Path, config: &GraphConfig) -> Result<Vec<PathBuf>, GraphError> {
    if !root.is_dir() {
        return Err(GraphError::NotADirectory(root.to_path_buf()));
    }
    let patterns = config.exclude_patterns()?;

    let walker = ignore::WalkBuilder::new(root)
        .standard_filters(true)
        // Read .gitignore files even when the directory is not inside a git repository.
        .require_git(false)
        .filter_entry(|entry| {
            let is_dir = entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false);
            !(is_dir
                && entry.depth() > 0
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|n| HARD_EXCLUDED_DIRS.contains(&n)))
        })
        .build();

    let mut files = Vec::new();
    for result in walker {
        let entry = match result {
            Ok(e) => e,
            Err(err) => {
                tracing::warn!("{err}");
                continue;
            }
        };

        if entry.file_type().map(|ft| ft.is_dir()).unwrap_or(true) {
            continue;
        }

        let path = entry.path();
        if !has_code_extension(path) {
            continue;
        }

        let rel = path.strip_prefix(root).unwrap_or(path);
        if is_excluded(rel, &patterns) {
            tracing::trace!(path = %rel.display(), "excluded by config");
            continue;
        }

        tracing::trace!(path = %rel.display(), "discovered");
        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

pub(crate) fn has_code_extension(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    match name.rfind('.') {
        Some(i) => resolver::CODE_EXTENSIONS.contains(&&name[i..]),
        None => false,
    }
}

/// True if the relative path, or any single component of it, matches a pattern.
fn is_excluded(rel: &Path, patterns: &[glob::Pattern]) -> bool {
    let rel_str = to_forward_slashes(rel);
    patterns.iter().any(|p| {
        p.matches(&rel_str)
            || rel
                .components()
                .filter_map(|c| c.as_os_str().to_str())
                .any(|s| p.matches(s))
    })
}

fn to_forward_slashes(path: &Path) -> String {
    path.components()
        .filter_map(|c| c.as_os_str().to_str())
        .collect::<Vec<_>>()
        .join("/")
}

/// Scan, extract and resolve a project directory into a [`Snapshot`].
///
/// Canonical paths are relative to `root` (no root prefix); the root entry's name is
/// the directory name. Files are read and scanned in parallel; the resolver pass runs
/// once the tree is complete.
pub fn scan_project(root: &Path, config: &GraphConfig) -> Result<Snapshot, GraphError> {
    let paths = walk_project(root, config)?;

    let sources: Vec<SourceFile> = paths
        .par_iter()
        .map(|path| {
            let rel_path = to_forward_slashes(path.strip_prefix(root).unwrap_or(path));
            // Invalid UTF-8 is decoded lossily so the file still parses.
            match std::fs::read(path) {
                Ok(bytes) => SourceFile::new(rel_path, String::from_utf8_lossy(&bytes)),
                Err(source) => {
                    let err = GraphError::Read {
                        path: path.clone(),
                        source,
                    };
                    tracing::warn!("{err}");
                    SourceFile::unreadable(rel_path)
                }
            }
        })
        .collect();

    let unreadable = sources.iter().filter(|s| s.content.is_none()).count();

    let mut tree_root = tree::build_tree("", &sources);
    tree_root.name = root
        .canonicalize()
        .ok()
        .as_deref()
        .and_then(Path::file_name)
        .and_then(|n| n.to_str())
        .unwrap_or("project")
        .to_owned();

    let report = resolver::resolve_all(&mut tree_root);
    tracing::info!(
        files = sources.len(),
        resolved = report.resolved,
        unresolved = report.unresolved.len(),
        "scanned {}",
        root.display()
    );

    Ok(Snapshot {
        root: tree_root,
        report,
        unreadable,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("tempdir")
    }

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn rel_names(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| to_forward_slashes(f.strip_prefix(root).unwrap()))
            .collect()
    }

    #[test]
    fn test_walk_filters_extensions() {
        let dir = tmp();
        write(dir.path(), "app.ts", "");
        write(dir.path(), "view.vue", "");
        write(dir.path(), "README.md", "");
        write(dir.path(), "style.css", "");

        let files = walk_project(dir.path(), &GraphConfig::default()).unwrap();
        assert_eq!(rel_names(dir.path(), &files), vec!["app.ts", "view.vue"]);
    }

    #[test]
    fn test_walk_skips_hard_excluded_and_hidden_dirs() {
        let dir = tmp();
        write(dir.path(), "src/main.ts", "");
        write(dir.path(), "node_modules/pkg/index.js", "");
        write(dir.path(), "dist/bundle.js", "");
        write(dir.path(), "build/out.js", "");
        write(dir.path(), ".cache/x.ts", "");

        let files = walk_project(dir.path(), &GraphConfig::default()).unwrap();
        assert_eq!(rel_names(dir.path(), &files), vec!["src/main.ts"]);
    }

    #[test]
    fn test_walk_respects_exclude_patterns() {
        let dir = tmp();
        write(dir.path(), "a.ts", "");
        write(dir.path(), "a.test.ts", "");
        let config = GraphConfig {
            exclude: Some(vec!["*.test.ts".to_string()]),
            ..GraphConfig::default()
        };
        let files = walk_project(dir.path(), &config).unwrap();
        assert_eq!(rel_names(dir.path(), &files), vec!["a.ts"]);
    }

    #[test]
    fn test_walk_rejects_non_directory() {
        let dir = tmp();
        write(dir.path(), "file.ts", "");
        let err = walk_project(&dir.path().join("file.ts"), &GraphConfig::default()).unwrap_err();
        assert!(matches!(err, GraphError::NotADirectory(_)));
    }

    #[test]
    fn test_scan_builds_resolved_snapshot() {
        let dir = tmp();
        write(dir.path(), "a.ts", "export const foo = 1;\n");
        write(dir.path(), "b.ts", "import { foo } from './a';\nexport const bar = foo;\n");
        write(dir.path(), "lib/c.tsx", "import { bar } from '../b';\nimport x from 'react';\n");

        let snap = scan_project(dir.path(), &GraphConfig::default()).unwrap();
        assert_eq!(snap.root.find("b.ts").unwrap().imports, vec!["a.ts"]);
        assert_eq!(snap.root.find("lib/c.tsx").unwrap().imports, vec!["b.ts"]);
        assert_eq!(snap.root.find("a.ts").unwrap().line_count, Some(2));
        assert_eq!(snap.report.resolved, 2);
        assert!(snap.report.unresolved.is_empty(), "bare packages never reach the resolver");
        assert_eq!(snap.unreadable, 0);
        assert!(!snap.root.name.is_empty());
    }

    #[test]
    fn test_scan_decodes_invalid_utf8_lossily() {
        let dir = tmp();
        write(dir.path(), "a.ts", "export const foo = 1;\n");
        fs::write(
            dir.path().join("b.ts"),
            b"// caf\xe9\nimport { foo } from './a';\nexport const bar = foo;\n",
        )
        .unwrap();

        let snap = scan_project(dir.path(), &GraphConfig::default()).unwrap();
        let b = snap.root.find("b.ts").unwrap();
        assert_eq!(b.imports, vec!["a.ts"]);
        assert_eq!(b.exports, vec!["bar"]);
        assert_eq!(b.line_count, Some(4));
        assert_eq!(snap.unreadable, 0);
    }
}
