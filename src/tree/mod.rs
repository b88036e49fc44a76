pub mod demo;

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::parser;

/// Whether a tree entry is a source file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Folder,
}

/// One node of a project snapshot tree.
///
/// `path` is the identity key: forward-slash separated and unique within one snapshot.
/// Files carry `line_count`, `exports` and `imports`; folders carry `children` only.
/// The constructors below are the only way to build an entry, which keeps the two
/// shapes from mixing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    pub path: String,
    pub kind: EntryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exports: Vec<String>,
    /// Raw specifiers right after a scan; canonical project paths after
    /// [`crate::resolver::resolve_all`] has run.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FileEntry>,
}

impl FileEntry {
    /// Build a file entry. `name` is derived from the last path segment.
    pub fn file(
        path: impl Into<String>,
        line_count: usize,
        exports: Vec<String>,
        imports: Vec<String>,
    ) -> Self {
        let path = path.into();
        Self {
            name: last_segment(&path).to_owned(),
            path,
            kind: EntryKind::File,
            line_count: Some(line_count),
            exports,
            imports,
            children: Vec::new(),
        }
    }

    /// Build a folder entry. Children are sorted folders-first, then by name.
    pub fn folder(path: impl Into<String>, mut children: Vec<FileEntry>) -> Self {
        let path = path.into();
        children.sort_by(display_order);
        Self {
            name: last_segment(&path).to_owned(),
            path,
            kind: EntryKind::Folder,
            line_count: None,
            exports: Vec::new(),
            imports: Vec::new(),
            children,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_folder(&self) -> bool {
        self.kind == EntryKind::Folder
    }

    /// Directory part of the path, or `""` for an entry at the project root.
    pub fn dir(&self) -> &str {
        parent_dir(&self.path)
    }

    /// Look up an entry anywhere below (and including) `self` by canonical path.
    pub fn find(&self, path: &str) -> Option<&FileEntry> {
        if self.path == path {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(path))
    }

    /// Mutable counterpart of [`FileEntry::files`], used by the resolver pass.
    pub(crate) fn files_mut(&mut self) -> Vec<&mut FileEntry> {
        let mut out = Vec::new();
        collect_files_mut(self, &mut out);
        out
    }

    /// All file entries in the tree, depth first.
    pub fn files(&self) -> Vec<&FileEntry> {
        flatten_files(self)
    }
}

fn collect_files_mut<'a>(node: &'a mut FileEntry, out: &mut Vec<&'a mut FileEntry>) {
    if node.is_file() {
        out.push(node);
        return;
    }
    for child in node.children.iter_mut() {
        collect_files_mut(child, out);
    }
}

/// Tree display order: folders before files, then by name ignoring case, with a byte
/// comparison breaking ties between names that differ only in case.
fn display_order(a: &FileEntry, b: &FileEntry) -> Ordering {
    match (a.kind, b.kind) {
        (EntryKind::Folder, EntryKind::File) => Ordering::Less,
        (EntryKind::File, EntryKind::Folder) => Ordering::Greater,
        _ => a
            .name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name)),
    }
}

fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Everything before the last `/`, or `""` when there is none.
pub fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(i) => &path[..i],
        None => "",
    }
}

/// All file entries below `node`, depth first. A file passed directly yields itself.
pub fn flatten_files(node: &FileEntry) -> Vec<&FileEntry> {
    if node.is_file() {
        return vec![node];
    }
    node.children.iter().flat_map(flatten_files).collect()
}

/// Files whose resolved `imports` contain `path`.
pub fn imported_by<'a>(path: &str, files: &[&'a FileEntry]) -> Vec<&'a FileEntry> {
    files
        .iter()
        .filter(|f| f.imports.iter().any(|i| i == path))
        .copied()
        .collect()
}

/// Number of folders in the tree, counting `node` itself when it is a folder.
pub fn count_folders(node: &FileEntry) -> usize {
    if node.is_file() {
        return 0;
    }
    1 + node.children.iter().map(count_folders).sum::<usize>()
}

/// Number of `\n`-separated segments, so empty content still counts as one line.
pub fn line_count(content: &str) -> usize {
    content.split('\n').count()
}

/// A source file handed to [`build_tree`]: path relative to the project root and its
/// text. `content` is `None` when the file could not be read.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub rel_path: String,
    pub content: Option<String>,
}

impl SourceFile {
    pub fn new(rel_path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            rel_path: rel_path.into(),
            content: Some(content.into()),
        }
    }

    /// A file that exists but could not be read: no imports, no exports, zero lines.
    pub fn unreadable(rel_path: impl Into<String>) -> Self {
        Self {
            rel_path: rel_path.into(),
            content: None,
        }
    }
}

/// Build a snapshot tree from a flat list of sources.
///
/// Every entry path is prefixed with `root_name`, intermediate folders are created on
/// demand and each folder's children end up in display order. Imports are left raw;
/// run the resolver afterwards.
pub fn build_tree(root_name: &str, sources: &[SourceFile]) -> FileEntry {
    let mut root = Builder::new(root_name.to_owned());
    for source in sources {
        let content = source.content.as_deref().unwrap_or_default();
        let extracted = parser::extract(content);
        let rel = source.rel_path.trim_start_matches("./").replace('\\', "/");
        let segments: Vec<&str> = rel.split('/').filter(|s| !s.is_empty()).collect();
        let Some((file_name, dirs)) = segments.split_last() else {
            continue;
        };

        let mut current = &mut root;
        for dir in dirs {
            current = current.folder(dir);
        }
        let path = join_path(&current.path, file_name);
        current.files.push(FileEntry::file(
            path,
            source.content.as_deref().map_or(0, line_count),
            extracted.exports,
            extracted.imports,
        ));
    }
    root.finish()
}

fn join_path(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_owned()
    } else {
        format!("{dir}/{name}")
    }
}

/// Mutable folder under construction; turned into a sorted [`FileEntry`] at the end.
struct Builder {
    path: String,
    folders: Vec<Builder>,
    files: Vec<FileEntry>,
}

impl Builder {
    fn new(path: String) -> Self {
        Self {
            path,
            folders: Vec::new(),
            files: Vec::new(),
        }
    }

    fn folder(&mut self, name: &str) -> &mut Builder {
        let path = join_path(&self.path, name);
        let pos = match self.folders.iter().position(|f| f.path == path) {
            Some(pos) => pos,
            None => {
                self.folders.push(Builder::new(path));
                self.folders.len() - 1
            }
        };
        &mut self.folders[pos]
    }

    fn finish(self) -> FileEntry {
        let mut children: Vec<FileEntry> = self.folders.into_iter().map(Builder::finish).collect();
        children.extend(self.files);
        FileEntry::folder(self.path, children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn src(rel_path: &str, content: &str) -> SourceFile {
        SourceFile::new(rel_path, content)
    }

    #[test]
    fn test_build_tree_orders_folders_before_files() {
        let tree = build_tree(
            "app",
            &[
                src("zeta.ts", ""),
                src("lib/util.ts", ""),
                src("alpha.ts", ""),
                src("components/Button.tsx", ""),
            ],
        );
        let names: Vec<&str> = tree.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["components", "lib", "alpha.ts", "zeta.ts"]);
        assert_eq!(tree.children[0].path, "app/components");
        assert_eq!(tree.children[0].children[0].path, "app/components/Button.tsx");
    }

    #[test]
    fn test_build_tree_extracts_and_counts_lines() {
        let tree = build_tree(
            "app",
            &[src(
                "main.ts",
                "import { run } from './run';\nimport React from 'react';\nexport const main = 1;",
            )],
        );
        let main = tree.find("app/main.ts").expect("main.ts in tree");
        assert_eq!(main.line_count, Some(3));
        assert_eq!(main.imports, vec!["./run"]);
        assert_eq!(main.exports, vec!["main"]);
    }

    #[test]
    fn test_names_sort_ignoring_case() {
        let tree = build_tree(
            "",
            &[
                src("App.tsx", ""),
                src("api.ts", ""),
                src("Zed.ts", ""),
                src("b.ts", ""),
                src("app.tsx", ""),
            ],
        );
        let names: Vec<&str> = tree.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["api.ts", "App.tsx", "app.tsx", "b.ts", "Zed.ts"]);
    }

    #[test]
    fn test_folder_never_carries_file_fields() {
        let tree = build_tree("app", &[src("a/b.ts", "export const b = 1;")]);
        let folder = tree.find("app/a").unwrap();
        assert!(folder.is_folder());
        assert!(folder.line_count.is_none());
        assert!(folder.exports.is_empty() && folder.imports.is_empty());
    }

    #[test]
    fn test_flatten_and_count_folders() {
        let tree = build_tree(
            "app",
            &[src("a/x.ts", ""), src("a/b/y.ts", ""), src("z.ts", "")],
        );
        assert_eq!(flatten_files(&tree).len(), 3);
        assert_eq!(count_folders(&tree), 3);
    }

    #[test]
    fn test_imported_by_matches_resolved_imports() {
        let a = FileEntry::file("a.ts", 1, vec![], vec![]);
        let b = FileEntry::file("b.ts", 1, vec![], vec!["a.ts".into()]);
        let c = FileEntry::file("c.ts", 1, vec![], vec!["b.ts".into()]);
        let files = vec![&a, &b, &c];
        let by: Vec<&str> = imported_by("a.ts", &files).iter().map(|f| f.path.as_str()).collect();
        assert_eq!(by, vec!["b.ts"]);
        assert!(imported_by("c.ts", &files).is_empty());
    }

    #[test]
    fn test_line_count_of_empty_content_is_one() {
        assert_eq!(line_count(""), 1);
        assert_eq!(line_count("a\nb\n"), 3);
    }

    #[test]
    fn test_unreadable_file_has_zero_lines() {
        let tree = build_tree("", &[SourceFile::unreadable("locked.ts"), src("empty.ts", "")]);
        let locked = tree.find("locked.ts").unwrap();
        assert_eq!(locked.line_count, Some(0));
        assert!(locked.imports.is_empty() && locked.exports.is_empty());
        assert_eq!(tree.find("empty.ts").unwrap().line_count, Some(1));
    }

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir("src/a/b.ts"), "src/a");
        assert_eq!(parent_dir("b.ts"), "");
    }
}
