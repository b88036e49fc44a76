mod cli;
mod config;
mod error;
mod export;
mod graph;
mod logger;
mod output;
mod parser;
mod resolver;
mod session;
mod tree;
mod view;
mod walker;
mod watcher;
#[cfg(feature = "web")]
mod web;

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, Commands, ProjectArgs};
use config::GraphConfig;
use export::model::ExportParams;
use graph::ProjectGraph;
use session::{DEMO_PROJECT_NAME, ExplorerSession};
use view::renderer::ChannelSurface;
use view::{RenderLoop, ViewMode};
use walker::{Snapshot, scan_project};

/// A loaded project: its display name, snapshot and configuration.
struct Project {
    name: String,
    snapshot: Snapshot,
    config: GraphConfig,
}

fn project_name(path: &Path) -> String {
    path.canonicalize()
        .ok()
        .as_deref()
        .and_then(Path::file_name)
        .and_then(|n| n.to_str())
        .map(str::to_owned)
        .unwrap_or_else(|| path.display().to_string())
}

fn load_project(args: &ProjectArgs) -> Result<Project> {
    match &args.path {
        Some(path) if !args.demo => {
            let config = GraphConfig::load(path);
            let snapshot = scan_project(path, &config)
                .with_context(|| format!("failed to scan {}", path.display()))?;
            Ok(Project {
                name: project_name(path),
                snapshot,
                config,
            })
        }
        _ => {
            let mut root = tree::demo::demo_project();
            let report = resolver::resolve_all(&mut root);
            Ok(Project {
                name: DEMO_PROJECT_NAME.to_owned(),
                snapshot: Snapshot {
                    root,
                    report,
                    unreadable: 0,
                },
                config: GraphConfig::default(),
            })
        }
    }
}

fn session_for(project: Project) -> ExplorerSession {
    let mut session = ExplorerSession::demo();
    session.init(project.name, project.snapshot);
    session
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init_logger(cli.verbose, cli.quiet, cli.no_color);

    match cli.command {
        Commands::Scan {
            path,
            json,
            show_unresolved,
        } => {
            let start = Instant::now();
            let config = GraphConfig::load(&path);
            let snapshot = scan_project(&path, &config)
                .with_context(|| format!("failed to scan {}", path.display()))?;
            let summary = output::ScanSummary::new(
                &project_name(&path),
                &snapshot,
                start.elapsed().as_secs_f64(),
                show_unresolved,
            );
            output::print_summary(&summary, json);
        }

        Commands::Tree { project } => {
            let project = load_project(&project)?;
            print!("{}", output::format_tree(&project.snapshot.root));
            let session = session_for(project);
            println!("{}", session.stats_line());
        }

        Commands::Deps {
            file,
            project,
            format,
        } => {
            let project = load_project(&project)?;
            let graph = ProjectGraph::from_tree(&project.snapshot.root);
            let deps = output::DepsReport::build(&graph, &project.snapshot.report, &file)?;
            print!("{}", output::format_deps(&deps, format));
        }

        Commands::Render {
            project,
            focus,
            global,
            out,
            width,
            height,
            frames,
        } => {
            let project = load_project(&project)?;
            let render = project.config.render.clone();
            let mut session = session_for(project);
            if let Some(path) = &focus {
                session.select_file(path)?;
            }
            if global {
                session.set_mode(ViewMode::Global);
            }

            let width = width.unwrap_or(render.width);
            let height = height.unwrap_or(render.height);
            let (surface, mut rx) = ChannelSurface::new(width, height, frames as usize);
            let handle = RenderLoop::start(
                surface,
                session.view_model(),
                render.fps,
                Box::new(|_| {}),
            );

            let mut last = None;
            for _ in 0..frames {
                match rx.recv().await {
                    Some(frame) => last = Some(frame),
                    None => break,
                }
            }
            handle.stop().await?;
            let frame = last.context("renderer produced no frames")?;
            tracing::debug!(index = frame.index, commands = frame.commands.len(), "captured frame");

            let svg = export::svg::render_svg(&frame);
            match out {
                Some(path) => std::fs::write(&path, svg)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => print!("{svg}"),
            }
        }

        Commands::Export {
            project,
            format,
            root,
            exclude,
            flat,
        } => {
            let project = load_project(&project)?;
            let graph = ProjectGraph::from_tree(&project.snapshot.root);
            let params = ExportParams {
                format,
                root_filter: root,
                exclude_patterns: exclude,
                clusters: !flat,
            };
            let result = export::export_graph(&graph, &params)?;
            print!("{}", result.content);
            tracing::info!(
                nodes = result.node_count,
                edges = result.edge_count,
                "exported graph"
            );
        }

        Commands::Watch { path, json } => {
            let name = project_name(&path);
            let mut config = GraphConfig::load(&path);
            let rescan = |config: &GraphConfig| -> Result<()> {
                let start = Instant::now();
                let snapshot = scan_project(&path, config)
                    .with_context(|| format!("failed to scan {}", path.display()))?;
                let summary =
                    output::ScanSummary::new(&name, &snapshot, start.elapsed().as_secs_f64(), false);
                if json {
                    output::print_summary_line(&summary);
                } else {
                    output::print_summary(&summary, false);
                }
                Ok(())
            };
            rescan(&config)?;

            let (_watcher, mut events) = watcher::start_watcher(&path)?;
            tracing::info!("watching {} (ctrl-c to stop)", path.display());
            loop {
                tokio::select! {
                    event = events.recv() => {
                        let Some(event) = event else { break };
                        let mut reload_config = event.needs_config_reload();
                        while let Ok(more) = events.try_recv() {
                            reload_config |= more.needs_config_reload();
                        }
                        if reload_config {
                            config = GraphConfig::load(&path);
                        }
                        if let Err(err) = rescan(&config) {
                            tracing::warn!("{err:#}");
                        }
                    }
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
        }

        #[cfg(feature = "web")]
        Commands::Serve { project, port } => {
            let watch_root = project.path.clone().filter(|_| !project.demo);
            let project = load_project(&project)?;
            let render = project.config.render.clone();
            let state = web::AppState::new(session_for(project), render);
            web::serve(state, port, watch_root).await?;
        }
    }

    Ok(())
}
