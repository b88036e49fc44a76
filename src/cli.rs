use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::export::model::ExportFormat;

/// Import-dependency graph explorer for TypeScript/JavaScript projects.
///
/// import-graph scans a project for ES module imports and exports, resolves relative
/// specifiers to project files, and lays the result out as a per-file or
/// whole-project graph that can be printed, exported or rendered.
#[derive(Parser, Debug)]
#[command(
    name = "import-graph",
    version,
    about,
    long_about = None,
    propagate_version = true,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Debug-level logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored log output.
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Where a command gets its snapshot from: a directory, or the built-in demo project.
#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    /// Path to the project root.
    #[arg(required_unless_present = "demo", conflicts_with = "demo")]
    pub path: Option<PathBuf>,

    /// Use the built-in demo project instead of scanning a directory.
    #[arg(long)]
    pub demo: bool,
}

/// Output format for per-file results.
#[derive(Clone, Copy, Debug, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One item per line.
    #[default]
    Compact,
    /// Structured JSON.
    Json,
}

/// A surface dimension must be a finite number of pixels above zero.
fn parse_dimension(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("expected a positive number of pixels, got {s}"))
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan and resolve a project directory, then print a summary.
    Scan {
        /// Path to the project root.
        path: PathBuf,

        /// Output the summary as JSON.
        #[arg(long)]
        json: bool,

        /// Also list every import specifier that matched no project file.
        #[arg(long)]
        show_unresolved: bool,
    },

    /// Print the folder tree with per-file line counts.
    Tree {
        #[command(flatten)]
        project: ProjectArgs,
    },

    /// Show one file's imports, importers and exports.
    Deps {
        /// Canonical path of the file, relative to the project root (e.g. "src/App.tsx").
        file: String,

        #[command(flatten)]
        project: ProjectArgs,

        #[arg(long, value_enum, default_value_t = OutputFormat::Compact)]
        format: OutputFormat,
    },

    /// Run the renderer headlessly and write the last frame as SVG.
    ///
    /// Without --focus or --global the local view has nothing selected and renders the
    /// empty state.
    Render {
        #[command(flatten)]
        project: ProjectArgs,

        /// File to center the local view on.
        #[arg(long, conflicts_with = "global")]
        focus: Option<String>,

        /// Render the whole-project view.
        #[arg(long)]
        global: bool,

        /// Write the SVG here instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Surface width in pixels (default from import-graph.toml, else 1200).
        #[arg(long, value_parser = parse_dimension)]
        width: Option<f64>,

        /// Surface height in pixels (default from import-graph.toml, else 800).
        #[arg(long, value_parser = parse_dimension)]
        height: Option<f64>,

        /// Number of animation frames to run before capturing.
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        frames: u32,
    },

    /// Print the file graph as Graphviz DOT or a Mermaid flowchart.
    Export {
        #[command(flatten)]
        project: ProjectArgs,

        #[arg(long, value_enum, default_value_t = ExportFormat::Dot)]
        format: ExportFormat,

        /// Only export files under this path prefix.
        #[arg(long)]
        root: Option<String>,

        /// Exclude files matching these globs (comma-separated).
        #[arg(long, value_delimiter = ',')]
        exclude: Vec<String>,

        /// Do not group files into per-directory clusters.
        #[arg(long)]
        flat: bool,
    },

    /// Watch a project and print a fresh summary after every change.
    Watch {
        /// Path to the project root.
        path: PathBuf,

        /// Emit one JSON summary per line.
        #[arg(long)]
        json: bool,
    },

    /// Serve the explorer over HTTP and WebSocket.
    #[cfg(feature = "web")]
    Serve {
        #[command(flatten)]
        project: ProjectArgs,

        #[arg(long, default_value_t = 4173)]
        port: u16,
    },
}
