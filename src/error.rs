use std::path::PathBuf;

/// Custom error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Xdg(#[from] xdg::BaseDirectoriesError),
    #[error(transparent)]
    Config(#[from] confy::ConfyError),
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error("no entry matches '{0}'")]
    NotFound(String),
    #[error("'{0}' matches {1} entries, use the entry id instead")]
    Ambiguous(String, usize),
    #[error("executable not found at '{0}'")]
    MissingExecutable(PathBuf),
    #[error("title cannot be empty")]
    EmptyTitle,
    #[error("no image could be read from '{0}'")]
    NoCover(PathBuf),
    #[error("refusing to clear the library without --yes")]
    Unconfirmed,
    #[error("Could not split command '{0}' into shell words")]
    BadCmd(String),
    #[error(transparent)]
    Launch(#[from] LaunchError),
    #[cfg(test)]
    #[error(transparent)]
    FromUtf8(#[from] std::string::FromUtf8Error),
}

/// Why an entry could not be started
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LaunchError {
    #[error("Executable file not found.")]
    ExecutableNotFound,
    #[error("Failed to launch Steam game: {0}")]
    Protocol(String),
    #[error("Failed to launch game executable: {0}")]
    Executable(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
