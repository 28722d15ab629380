//! Error types for `drivesh-core`.
//!
//! All fallible operations in the core library return [`CoreResult<T>`],
//! which is an alias for `Result<T, CoreError>`. Every variant except
//! [`CoreError::Remote`] and [`CoreError::Io`] is an expected, user-facing
//! outcome that the shell prints as a single line before returning to the
//! prompt.

use std::path::PathBuf;

use crate::remote::RemoteError;

/// Unified error type for all core operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An intermediate path segment did not name a folder.
    #[error("folder {0} does not exist")]
    MissingFolder(String),

    /// The final path segment did not name any item.
    #[error("file \"{0}\" does not exist")]
    MissingItem(String),

    /// A folder operation was attempted without the recursive flag.
    #[error("use recursive mode to {0}")]
    RecursiveRequired(&'static str),

    /// A download would overwrite an existing local file.
    #[error("destination already exists: {0}")]
    DestinationExists(PathBuf),

    /// A local upload source (or glob pattern) matched nothing.
    #[error("\"{0}\" does not exist")]
    LocalNotFound(String),

    /// A local glob pattern could not be compiled.
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),

    /// The first word of a command line is not a known verb.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Malformed command arguments.
    #[error("{usage}\n{message}")]
    InvalidArguments { usage: &'static str, message: String },

    /// A recursive walk went deeper than the configured limit.
    #[error("maximum recursion depth ({0}) exceeded at {1}")]
    DepthExceeded(usize, String),

    /// The drive root cannot be trashed.
    #[error("refusing to remove the root folder")]
    RootRemoval,

    /// Credentials are missing, unreadable, or unusable.
    #[error("authentication error: {0}")]
    Auth(String),

    /// The target path does not exist.
    #[error("path not found: {0}")]
    NotFound(PathBuf),

    /// The process lacks permission to access the path.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Failed to parse a TOML configuration file.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// The remote storage service failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// An I/O error that doesn't fit a more specific variant.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout `drivesh-core`.
pub type CoreResult<T> = Result<T, CoreError>;
