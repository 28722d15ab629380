//! Commands and events exchanged between a frontend and the core.
//!
//! The frontend turns a typed line into a [`Command`]; while a command runs
//! the core reports progress as [`Event`]s. This keeps the transfer engine
//! free of any output formatting.

use std::path::PathBuf;

use crate::remote::RemoteItem;

/// A request from the user, already tokenized and flag-parsed.
///
/// Commands flow **UI → Core**. The core never creates commands itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the current display path.
    Pwd,
    /// List a folder (or show a single file).
    Ls { path: String, recursive: bool },
    /// Change folder; `None` returns to the root.
    Cd { path: Option<String> },
    /// Download a remote file or tree.
    Get {
        source: String,
        dest: Option<String>,
        recursive: bool,
    },
    /// Upload local paths matching a glob pattern.
    Put {
        source: String,
        dest: Option<String>,
        recursive: bool,
    },
    /// Move a remote item to the trash.
    Rm { source: String, recursive: bool },
    /// Run a local command through the system shell.
    Shell(String),
    /// Print a verb's usage line.
    Usage(&'static str),
    /// Print the command list.
    Help,
    /// Forget stored credentials and end the session.
    Logout,
    /// End the session.
    Exit,
}

/// Progress notifications emitted while a command runs.
///
/// Events flow **Core → UI**.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A local directory was created (or already existed) during download.
    DirectoryCreated(PathBuf),
    /// A remote file was written to a local path.
    FileDownloaded { path: PathBuf, bytes: u64 },
    /// A local path is about to be uploaded.
    Uploading(PathBuf),
    /// A remote folder was looked up or created during upload.
    FolderEnsured { item: RemoteItem, created: bool },
    /// A local file was uploaded as a new remote object.
    FileUploaded(RemoteItem),
    /// A remote item was moved to the trash.
    Trashed(RemoteItem),
}
