//! Built-in demo snapshot, used when no project directory is given.
//!
//! Imports are already canonical paths, so running the resolver over this tree
//! leaves it unchanged.

use super::FileEntry;

fn file(path: &str, lines: usize, exports: &[&str], imports: &[&str]) -> FileEntry {
    FileEntry::file(
        path,
        lines,
        exports.iter().map(|s| (*s).to_owned()).collect(),
        imports.iter().map(|s| (*s).to_owned()).collect(),
    )
}

/// A small single-page-app layout: components, pages, a store and shared types.
pub fn demo_project() -> FileEntry {
    FileEntry::folder(
        "src",
        vec![
            FileEntry::folder(
                "src/components",
                vec![
                    file(
                        "src/components/ChatInterface.tsx",
                        92,
                        &["ChatInterface"],
                        &["src/store/chatStore.ts"],
                    ),
                    file("src/components/Footer.tsx", 27, &["Footer"], &[]),
                    file("src/components/Header.tsx", 33, &["Header"], &[]),
                    file(
                        "src/components/Sidebar.tsx",
                        145,
                        &["Sidebar"],
                        &["src/store/chatStore.ts"],
                    ),
                    file("src/components/Visualizer.tsx", 111, &["Visualizer"], &[]),
                ],
            ),
            FileEntry::folder(
                "src/pages",
                vec![
                    file(
                        "src/pages/Dashboard.tsx",
                        39,
                        &["Dashboard"],
                        &[
                            "src/components/Sidebar.tsx",
                            "src/components/Header.tsx",
                            "src/components/Visualizer.tsx",
                            "src/components/ChatInterface.tsx",
                            "src/components/Footer.tsx",
                        ],
                    ),
                    file("src/pages/LoginPage.tsx", 180, &["LoginPage"], &[]),
                    file("src/pages/ProjectExplorer.tsx", 330, &["ProjectExplorer"], &[]),
                ],
            ),
            FileEntry::folder(
                "src/store",
                vec![file(
                    "src/store/chatStore.ts",
                    58,
                    &["useChatStore"],
                    &["src/types/index.ts"],
                )],
            ),
            FileEntry::folder(
                "src/types",
                vec![file(
                    "src/types/index.ts",
                    22,
                    &["Message", "Chat", "ChatStore"],
                    &[],
                )],
            ),
            file(
                "src/App.tsx",
                18,
                &["App"],
                &[
                    "src/pages/LoginPage.tsx",
                    "src/pages/Dashboard.tsx",
                    "src/pages/ProjectExplorer.tsx",
                ],
            ),
            file("src/main.tsx", 10, &[], &["src/App.tsx"]),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::resolve_all;
    use crate::tree::{count_folders, flatten_files};

    #[test]
    fn test_demo_shape() {
        let demo = demo_project();
        assert_eq!(flatten_files(&demo).len(), 12);
        assert_eq!(count_folders(&demo), 5);
    }

    #[test]
    fn test_demo_is_already_resolved() {
        let mut demo = demo_project();
        let before = demo.clone();
        let report = resolve_all(&mut demo);
        assert_eq!(demo, before, "canonical imports must survive resolution unchanged");
        assert!(report.unresolved.is_empty());
        assert_eq!(report.resolved, 12);
    }
}
