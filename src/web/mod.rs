//! HTTP + WebSocket host for the explorer.
//!
//! `GET /api/tree` and `GET /api/view` expose the current snapshot and view model as
//! JSON. `GET /ws` attaches a live renderer: the server streams frames, the client
//! sends pointer input and commands, and node clicks re-focus the shared session.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, broadcast, mpsc};
use tower_http::cors::{Any, CorsLayer};

use crate::config::{GraphConfig, RenderConfig};
use crate::graph::{GraphStats, ProjectGraph};
use crate::session::ExplorerSession;
use crate::tree::FileEntry;
use crate::view::renderer::ChannelSurface;
use crate::view::{Frame, InputEvent, Renderer, ViewMode, ViewModel, ViewRequest, build_view};
use crate::walker;
use crate::watcher;

/// Frames buffered per connection before new ones are dropped.
const FRAME_BUFFER: usize = 4;

#[derive(Clone)]
pub struct AppState {
    session: Arc<RwLock<ExplorerSession>>,
    render: RenderConfig,
    /// Fires after every reload so live renderers can pick up the new snapshot.
    reloads: broadcast::Sender<()>,
}

impl AppState {
    pub fn new(session: ExplorerSession, render: RenderConfig) -> Self {
        let (reloads, _) = broadcast::channel(16);
        Self {
            session: Arc::new(RwLock::new(session)),
            render,
            reloads,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/tree", get(handle_tree))
        .route("/api/view", get(handle_view))
        .route("/api/select", post(handle_select))
        .route("/api/mode", post(handle_mode))
        .route("/ws", get(handle_ws))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Serve until the process is interrupted. With `watch_root`, rescans on change and
/// pushes the new snapshot to every connected renderer.
pub async fn serve(state: AppState, port: u16, watch_root: Option<PathBuf>) -> anyhow::Result<()> {
    let _watcher = match watch_root {
        Some(root) => Some(spawn_reloader(state.clone(), root)?),
        None => None,
    };

    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;
    tracing::info!("explorer listening on http://{addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("server error")?;
    Ok(())
}

fn spawn_reloader(state: AppState, root: PathBuf) -> anyhow::Result<watcher::WatcherHandle> {
    let (handle, mut events) = watcher::start_watcher(&root)?;
    tokio::spawn(async move {
        let mut config = GraphConfig::load(&root);
        while let Some(event) = events.recv().await {
            let mut reload_config = event.needs_config_reload();
            // Coalesce whatever else arrived in the same burst.
            while let Ok(more) = events.try_recv() {
                reload_config |= more.needs_config_reload();
            }
            if reload_config {
                config = GraphConfig::load(&root);
            }
            match walker::scan_project(&root, &config) {
                Ok(snapshot) => {
                    state.session.write().await.reload(snapshot);
                    let _ = state.reloads.send(());
                }
                Err(err) => tracing::warn!("rescan failed: {err}"),
            }
        }
    });
    Ok(handle)
}

#[derive(Serialize)]
struct TreeResponse<'a> {
    project: &'a str,
    stats: GraphStats,
    summary: String,
    root: &'a FileEntry,
}

async fn handle_tree(State(state): State<AppState>) -> Response {
    let session = state.session.read().await;
    let stats = ProjectGraph::from_tree(session.root()).stats(session.root());
    Json(TreeResponse {
        project: session.project_name(),
        stats,
        summary: session.stats_line(),
        root: session.root(),
    })
    .into_response()
}

#[derive(Debug, Deserialize)]
struct ViewQuery {
    mode: Option<ViewMode>,
    focus: Option<String>,
}

/// Without a `mode`, returns the session's current view.
async fn handle_view(State(state): State<AppState>, Query(q): Query<ViewQuery>) -> Json<ViewModel> {
    let session = state.session.read().await;
    let view = match q.mode {
        None => session.view_model(),
        Some(ViewMode::Global) => build_view(&ViewRequest::Global, session.root()),
        Some(ViewMode::Local) => build_view(
            &ViewRequest::Local {
                focus: q.focus.or_else(|| session.focus().map(str::to_owned)),
            },
            session.root(),
        ),
    };
    Json(view)
}

#[derive(Debug, Deserialize)]
struct SelectBody {
    path: String,
}

async fn handle_select(State(state): State<AppState>, Json(body): Json<SelectBody>) -> Response {
    let mut session = state.session.write().await;
    match session.select_file(&body.path) {
        Ok(()) => {
            let _ = state.reloads.send(());
            Json(session.view_model()).into_response()
        }
        Err(err) => (StatusCode::NOT_FOUND, err.to_string()).into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct ModeBody {
    mode: ViewMode,
}

async fn handle_mode(State(state): State<AppState>, Json(body): Json<ModeBody>) -> Json<ViewModel> {
    let mut session = state.session.write().await;
    session.set_mode(body.mode);
    let _ = state.reloads.send(());
    Json(session.view_model())
}

/// Messages pushed to a WebSocket client.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ServerMessage<'a> {
    Frame(&'a Frame),
    Selected { path: &'a str, breadcrumb: Vec<&'a str> },
}

/// Non-pointer commands a client may send.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Command {
    SetMode { mode: ViewMode },
    Select { path: String },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClientMessage {
    Input(InputEvent),
    Command(Command),
}

async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| async move {
        if let Err(err) = run_socket(socket, state).await {
            tracing::debug!("websocket closed: {err:#}");
        }
    })
}

async fn run_socket(mut socket: WebSocket, state: AppState) -> anyhow::Result<()> {
    let (surface, mut frames) =
        ChannelSurface::new(state.render.width, state.render.height, FRAME_BUFFER);
    let (select_tx, mut selections) = mpsc::unbounded_channel::<String>();
    let view = state.session.read().await.view_model();
    let mut renderer = Renderer::start(
        surface,
        view,
        state.render.fps,
        Box::new(move |path| {
            let _ = select_tx.send(path.to_owned());
        }),
    );
    let mut reloads = state.reloads.subscribe();
    tracing::debug!("renderer attached");

    loop {
        tokio::select! {
            Some(frame) = frames.recv() => {
                let text = serde_json::to_string(&ServerMessage::Frame(&frame))?;
                socket.send(Message::Text(text.into())).await?;
            }
            // The renderer restarts from the reload this click broadcasts.
            Some(path) = selections.recv() => {
                if let Some(text) = select_clicked(&state, &path).await? {
                    socket.send(Message::Text(text.into())).await?;
                }
            }
            Ok(()) = reloads.recv() => {
                let view = state.session.read().await.view_model();
                renderer.restart(view).await?;
            }
            msg = socket.recv() => {
                let Some(msg) = msg else { break };
                match msg? {
                    Message::Text(text) => match serde_json::from_str::<ClientMessage>(text.as_str()) {
                        Ok(ClientMessage::Input(event)) => {
                            if let Some(events) = renderer.events() {
                                let _ = events.send(event).await;
                            }
                        }
                        Ok(ClientMessage::Command(cmd)) => {
                            apply_command(&state, cmd).await;
                        }
                        Err(err) => tracing::debug!("ignoring client message: {err}"),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    }

    renderer.shutdown().await?;
    Ok(())
}

/// Focus a node clicked in a renderer and notify every renderer, the clicking one
/// included. Returns the `selected` message, or `None` if the path no longer exists.
async fn select_clicked(state: &AppState, path: &str) -> anyhow::Result<Option<String>> {
    let mut session = state.session.write().await;
    if let Err(err) = session.select_file(path) {
        // The snapshot changed under the click.
        tracing::debug!("{err}");
        return Ok(None);
    }
    let msg = ServerMessage::Selected {
        path,
        breadcrumb: session.breadcrumb(),
    };
    let text = serde_json::to_string(&msg)?;
    let _ = state.reloads.send(());
    Ok(Some(text))
}

async fn apply_command(state: &AppState, cmd: Command) {
    let mut session = state.session.write().await;
    match cmd {
        Command::SetMode { mode } => session.set_mode(mode),
        Command::Select { path } => {
            if let Err(err) = session.select_file(&path) {
                tracing::debug!("{err}");
                return;
            }
        }
    }
    let _ = state.reloads.send(());
}
