use std::path::PathBuf;

/// Setup failures while establishing or extending watch coverage.
///
/// Fatal at startup: partial coverage would silently drop observability.
/// When raised while adding a new subtree mid-run the error is logged and
/// that subtree is left unwatched instead of crashing the watcher.
#[derive(thiserror::Error, Debug)]
pub enum WatchError {
    #[error("watch root does not exist: {0}")]
    RootMissing(PathBuf),

    #[error("watch root is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("failed to register watch: {0}")]
    Notify(#[from] notify::Error),

    #[error("failed to scan directory tree: {0}")]
    Scan(#[from] walkdir::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
