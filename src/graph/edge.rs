/// The kind of directed edge between two file nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeKind {
    /// File -> File: the source file's resolved `imports` contain the target path.
    /// `position` is the index of the target within the importer's `imports`.
    Imports { position: usize },
}
