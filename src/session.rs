use crate::error::GraphError;
use crate::tree::{self, FileEntry, demo::demo_project};
use crate::view::{ViewMode, ViewModel, ViewRequest, build_view};
use crate::walker::Snapshot;

pub const DEMO_PROJECT_NAME: &str = "Demo Project";

/// Explorer state shared by every front end: the current snapshot, the selected file
/// and the active view mode. Owned by whoever drives the explorer and passed around
/// explicitly.
#[derive(Debug, Clone)]
pub struct ExplorerSession {
    project_name: String,
    root: FileEntry,
    focus: Option<String>,
    mode: ViewMode,
}

impl Default for ExplorerSession {
    fn default() -> Self {
        Self::demo()
    }
}

impl ExplorerSession {
    /// A session over the built-in demo project.
    pub fn demo() -> Self {
        Self {
            project_name: DEMO_PROJECT_NAME.to_owned(),
            root: demo_project(),
            focus: None,
            mode: ViewMode::Local,
        }
    }

    /// Load a freshly scanned project. Clears the selection.
    pub fn init(&mut self, project_name: impl Into<String>, snapshot: Snapshot) {
        self.project_name = project_name.into();
        self.root = snapshot.root;
        self.focus = None;
        tracing::debug!(project = %self.project_name, "session initialised");
    }

    /// Go back to the demo project with nothing selected.
    pub fn reset(&mut self) {
        *self = Self::demo();
    }

    /// Focus a file and switch to the local view.
    pub fn select_file(&mut self, path: &str) -> Result<(), GraphError> {
        match self.root.find(path) {
            Some(entry) if entry.is_file() => {
                self.focus = Some(path.to_owned());
                self.mode = ViewMode::Local;
                Ok(())
            }
            _ => Err(GraphError::UnknownFile(path.to_owned())),
        }
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
    }

    /// Swap in a rescan of the same project. The selection survives if its path is
    /// still a file of the new snapshot.
    pub fn reload(&mut self, snapshot: Snapshot) {
        self.root = snapshot.root;
        let Some(path) = &self.focus else {
            return;
        };
        if !self.root.find(path).is_some_and(FileEntry::is_file) {
            tracing::info!(%path, "selected file no longer exists");
            self.focus = None;
        }
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn root(&self) -> &FileEntry {
        &self.root
    }

    pub fn focus(&self) -> Option<&str> {
        self.focus.as_deref()
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn selected(&self) -> Option<&FileEntry> {
        self.focus.as_deref().and_then(|p| self.root.find(p))
    }

    pub fn view_request(&self) -> ViewRequest {
        match self.mode {
            ViewMode::Global => ViewRequest::Global,
            ViewMode::Local => ViewRequest::Local {
                focus: self.focus.clone(),
            },
        }
    }

    pub fn view_model(&self) -> ViewModel {
        build_view(&self.view_request(), &self.root)
    }

    /// Path segments of the selection, or just the project name.
    pub fn breadcrumb(&self) -> Vec<&str> {
        match &self.focus {
            Some(path) => path.split('/').collect(),
            None => vec![self.project_name.as_str()],
        }
    }

    /// Imports whose target is a file of this snapshot.
    pub fn import_edge_count(&self) -> usize {
        let files = self.root.files();
        files
            .iter()
            .flat_map(|f| f.imports.iter())
            .filter(|imp| files.iter().any(|f| &f.path == *imp))
            .count()
    }

    /// `"12 files · 5 folders · 12 imports"`.
    pub fn stats_line(&self) -> String {
        format!(
            "{} files · {} folders · {} imports",
            self.root.files().len(),
            tree::count_folders(&self.root),
            self.import_edge_count()
        )
    }

    /// One-line summary of what the active view shows.
    pub fn status_line(&self) -> String {
        match self.mode {
            ViewMode::Global => format!(
                "{} files · {} dependency edges",
                self.root.files().len(),
                self.import_edge_count()
            ),
            ViewMode::Local => match self.selected() {
                None => "No file selected".to_owned(),
                Some(file) => {
                    let files = self.root.files();
                    let imports = file
                        .imports
                        .iter()
                        .filter(|p| files.iter().any(|f| &f.path == *p))
                        .count();
                    let dependents = tree::imported_by(&file.path, &files).len();
                    format!("{imports} imports · {dependents} dependents")
                }
            },
        }
    }
}
