use std::path::PathBuf;

/// A filesystem change after filtering and classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// A source file was created or its content changed.
    Modified(PathBuf),
    /// A source file was deleted.
    Deleted(PathBuf),
    /// `import-graph.toml` or a `.gitignore` changed; exclusions may differ.
    ConfigChanged,
}

impl WatchEvent {
    /// Whether the next rescan has to reload configuration first.
    pub fn needs_config_reload(&self) -> bool {
        matches!(self, Self::ConfigChanged)
    }
}
