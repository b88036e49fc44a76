pub mod event;

use std::path::Path;
use std::time::Duration;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use notify::RecursiveMode;
use notify_debouncer_mini::{DebounceEventResult, new_debouncer};
use tokio::sync::mpsc as tokio_mpsc;
use tokio::task::JoinHandle;

use crate::config::GraphConfig;
use crate::walker::{HARD_EXCLUDED_DIRS, has_code_extension};

use event::WatchEvent;

const DEBOUNCE: Duration = Duration::from_millis(75);

/// Handle to a running watcher. Dropping it stops watching.
pub struct WatcherHandle {
    _debouncer: notify_debouncer_mini::Debouncer<notify::RecommendedWatcher>,
    _bridge_task: JoinHandle<()>,
}

/// Matcher for the root `.gitignore`, the same rules the scan walker applies. Empty
/// when there is no `.gitignore`.
fn build_gitignore_matcher(project_root: &Path) -> Gitignore {
    let mut builder = GitignoreBuilder::new(project_root);
    let gitignore_path = project_root.join(".gitignore");
    if gitignore_path.exists() {
        if let Some(err) = builder.add(&gitignore_path) {
            tracing::warn!("ignoring unreadable .gitignore: {err}");
        }
    }
    builder.build().unwrap_or_else(|_| Gitignore::empty())
}

/// Start a debounced watcher on `watch_root`.
///
/// Returns the handle (keep it alive) and a receiver of classified events. Raw notify
/// events arrive on a std channel and are classified on a blocking task.
pub fn start_watcher(
    watch_root: &Path,
) -> anyhow::Result<(WatcherHandle, tokio_mpsc::Receiver<WatchEvent>)> {
    let (std_tx, std_rx) = std::sync::mpsc::channel::<DebounceEventResult>();

    let mut debouncer = new_debouncer(DEBOUNCE, move |res| {
        let _ = std_tx.send(res);
    })?;
    debouncer.watcher().watch(watch_root, RecursiveMode::Recursive)?;

    let gitignore = build_gitignore_matcher(watch_root);
    let (tokio_tx, tokio_rx) = tokio_mpsc::channel::<WatchEvent>(256);

    let root = watch_root.to_path_buf();
    let bridge_task = tokio::task::spawn_blocking(move || {
        while let Ok(result) = std_rx.recv() {
            match result {
                Ok(events) => {
                    for debounced in events {
                        let Some(event) = classify_event(&debounced.path, &root, &gitignore) else {
                            continue;
                        };
                        tracing::trace!(?event, "watch event");
                        if tokio_tx.blocking_send(event).is_err() {
                            return; // receiver dropped
                        }
                    }
                }
                Err(err) => tracing::warn!("watcher error: {err:?}"),
            }
        }
    });

    tracing::debug!(root = %watch_root.display(), "watching");
    Ok((
        WatcherHandle {
            _debouncer: debouncer,
            _bridge_task: bridge_task,
        },
        tokio_rx,
    ))
}

/// Classify a changed path, or `None` if it cannot affect the graph.
///
/// Hard-excluded and hidden directories go first, then config files, then
/// `.gitignore` rules, then the source extension filter.
fn classify_event(path: &Path, project_root: &Path, gitignore: &Gitignore) -> Option<WatchEvent> {
    let rel = path.strip_prefix(project_root).unwrap_or(path);
    let mut dirs = rel.parent().into_iter().flat_map(|p| p.components());
    if dirs.any(|c| {
        c.as_os_str()
            .to_str()
            .is_some_and(|s| HARD_EXCLUDED_DIRS.contains(&s) || s.starts_with('.'))
    }) {
        return None;
    }

    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    if file_name == GraphConfig::FILE_NAME || file_name == ".gitignore" {
        return Some(WatchEvent::ConfigChanged);
    }

    if gitignore.matched(path, path.is_dir()).is_ignore() {
        return None;
    }

    if !has_code_extension(path) {
        return None;
    }

    // The debouncer does not tell creation from modification.
    if path.exists() {
        Some(WatchEvent::Modified(path.to_path_buf()))
    } else {
        Some(WatchEvent::Deleted(path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_classify_source_and_config() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("a.ts"), "").unwrap();
        let gi = build_gitignore_matcher(root);

        assert_eq!(
            classify_event(&root.join("a.ts"), root, &gi),
            Some(WatchEvent::Modified(root.join("a.ts")))
        );
        assert_eq!(
            classify_event(&root.join("gone.tsx"), root, &gi),
            Some(WatchEvent::Deleted(root.join("gone.tsx")))
        );
        assert_eq!(
            classify_event(&root.join(GraphConfig::FILE_NAME), root, &gi),
            Some(WatchEvent::ConfigChanged)
        );
        assert_eq!(classify_event(&root.join("notes.md"), root, &gi), None);
    }

    #[test]
    fn test_classify_skips_excluded_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let gi = build_gitignore_matcher(root);
        assert_eq!(classify_event(&root.join("node_modules/x/index.js"), root, &gi), None);
        assert_eq!(classify_event(&root.join("dist/app.js"), root, &gi), None);
        assert_eq!(classify_event(&root.join(".git/HEAD.ts"), root, &gi), None);
    }

    #[test]
    fn test_classify_respects_gitignore() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join(".gitignore"), "*.generated.ts\n").unwrap();
        let gi = build_gitignore_matcher(root);
        assert_eq!(classify_event(&root.join("api.generated.ts"), root, &gi), None);
        assert!(classify_event(&root.join("api.ts"), root, &gi).is_some());
    }
}
