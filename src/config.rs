use std::path::Path;

use serde::Deserialize;

use crate::error::GraphError;

/// Configuration loaded from `import-graph.toml` at the project root.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct GraphConfig {
    /// Additional path patterns to exclude from scanning (beyond hidden files,
    /// .gitignore, node_modules, dist and build).
    pub exclude: Option<Vec<String>>,
    #[serde(default)]
    pub render: RenderConfig,
}

/// Surface and frame-rate defaults for the renderer.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    pub width: f64,
    pub height: f64,
    pub fps: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            fps: 60,
        }
    }
}

impl RenderConfig {
    /// Replace sizes that cannot be drawn with the defaults.
    fn sanitized(self) -> Self {
        let defaults = Self::default();
        let usable = |v: f64| v.is_finite() && v > 0.0;
        if !usable(self.width) || !usable(self.height) {
            tracing::warn!(
                width = self.width,
                height = self.height,
                "ignoring non-positive render size in {}",
                GraphConfig::FILE_NAME
            );
        }
        Self {
            width: if usable(self.width) { self.width } else { defaults.width },
            height: if usable(self.height) { self.height } else { defaults.height },
            fps: self.fps,
        }
    }
}

impl GraphConfig {
    pub const FILE_NAME: &'static str = "import-graph.toml";

    /// Load configuration from `import-graph.toml` in the given root directory.
    ///
    /// Returns a default configuration if the file does not exist or cannot be parsed.
    pub fn load(root: &Path) -> Self {
        let config_path = root.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str::<Self>(&contents) {
                Ok(config) => Self {
                    render: config.render.sanitized(),
                    ..config
                },
                Err(err) => {
                    tracing::warn!("failed to parse {}: {err}. Using defaults.", Self::FILE_NAME);
                    Self::default()
                }
            },
            Err(err) => {
                tracing::warn!("failed to read {}: {err}. Using defaults.", Self::FILE_NAME);
                Self::default()
            }
        }
    }

    /// Compile the `exclude` globs. An invalid pattern is a hard error so a typo does not
    /// silently widen the scan.
    pub fn exclude_patterns(&self) -> Result<Vec<glob::Pattern>, GraphError> {
        self.exclude
            .iter()
            .flatten()
            .map(|p| {
                glob::Pattern::new(p).map_err(|source| GraphError::InvalidPattern {
                    pattern: p.clone(),
                    source,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = GraphConfig::load(dir.path());
        assert!(config.exclude.is_none());
        assert_eq!(config.render, RenderConfig::default());
    }

    #[test]
    fn test_parses_exclude_and_render() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(GraphConfig::FILE_NAME),
            "exclude = [\"*.test.ts\"]\n[render]\nwidth = 640.0\nfps = 30\n",
        )
        .unwrap();
        let config = GraphConfig::load(dir.path());
        assert_eq!(config.exclude.as_deref(), Some(&["*.test.ts".to_string()][..]));
        assert_eq!(config.render.width, 640.0);
        assert_eq!(config.render.height, 800.0);
        assert_eq!(config.render.fps, 30);
        assert_eq!(config.exclude_patterns().unwrap().len(), 1);
    }

    #[test]
    fn test_non_positive_render_size_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(GraphConfig::FILE_NAME),
            "[render]\nwidth = 0.0\nheight = -5.0\nfps = 24\n",
        )
        .unwrap();
        let config = GraphConfig::load(dir.path());
        assert_eq!(config.render.width, 1200.0);
        assert_eq!(config.render.height, 800.0);
        assert_eq!(config.render.fps, 24);
    }

    #[test]
    fn test_broken_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(GraphConfig::FILE_NAME), "exclude = [").unwrap();
        let config = GraphConfig::load(dir.path());
        assert!(config.exclude.is_none());
    }

    #[test]
    fn test_invalid_glob_is_error() {
        let config = GraphConfig {
            exclude: Some(vec!["[".into()]),
            ..GraphConfig::default()
        };
        assert!(matches!(
            config.exclude_patterns(),
            Err(GraphError::InvalidPattern { .. })
        ));
    }
}
