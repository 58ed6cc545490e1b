use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub(crate) enum ListError {
    #[error("host unreachable: {0}")]
    Unreachable(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("not a directory: {0}")]
    NotADirectory(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("I/O error: {0}")]
    Io(String),
}

impl ListError {
    pub(crate) fn from_io(err: &std::io::Error, path: &str) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_string()),
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_string()),
            std::io::ErrorKind::NotADirectory => Self::NotADirectory(path.to_string()),
            _ => Self::Io(format!("{path}: {err}")),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub(crate) enum TransferError {
    #[error("a transfer is already in progress")]
    AlreadyActive,
    #[error("unable to start transfer: {0}")]
    LaunchFailed(String),
}
