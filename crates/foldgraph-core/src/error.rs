use thiserror::Error;

/// Errors raised on the dispatch and history surfaces.
///
/// Invalid selections (collapsing a leaf, expanding an expanded node, missing nodes) are
/// never errors; they simply report nothing affected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FoldError {
    #[error("No such operation `{0}`")]
    UnknownOperation(String),
    #[error("No such option `{0}`")]
    UnknownOption(String),
    #[error("Invalid value for option `{key}`: {reason}")]
    InvalidOptionValue { key: String, reason: String },
    #[error("Invalid color `{0}`")]
    InvalidColor(String),
    #[error("Nothing to undo")]
    NothingToUndo,
    #[error("Nothing to redo")]
    NothingToRedo,
}
