//! drivesh core library: an interactive shell over a remote cloud drive.
//!
//! `drivesh-core` holds everything except the terminal loop itself, so the
//! command semantics can be exercised against the in-memory drive in tests
//! and against Google Drive in the `drivesh` binary alike.
//!
//! # Modules
//!
//! - [`remote`]: The remote storage boundary ([`DriveApi`]), the lazily
//!   paginated [`DirectoryIndex`], and the Google Drive and in-memory backends.
//! - [`nav`]: Path parsing, the [`WorkingDirectoryStack`], anchored path
//!   resolution, and tab completion.
//! - [`transfer`]: Recursive download, glob-expanded upload, and trash.
//! - [`shell`]: Command parsing and the [`Shell`] session that dispatches commands.
//! - [`auth`]: Persisted OAuth credentials.
//! - [`config`]: User-facing configuration (TOML-based settings).
//! - [`event`]: Command and event types for UI ↔ Core communication.
//! - [`error`]: Unified error type ([`CoreError`]) and result alias ([`CoreResult`]).

pub mod auth;
pub mod config;
pub mod error;
pub mod event;
pub mod nav;
pub mod remote;
pub mod shell;
pub mod transfer;

pub use auth::{StoredToken, TokenStore};
pub use config::settings::Config;
pub use error::{CoreError, CoreResult};
pub use event::{Command, Event};
pub use nav::{Lookup, PathResolver, StackEntry, Target, WorkingDirectoryStack};
pub use remote::gdrive::GoogleDrive;
pub use remote::memory::MemoryDrive;
pub use remote::{DirectoryIndex, DriveApi, RemoteError, RemoteItem, RemoteResult};
pub use shell::{Flow, Shell};
pub use transfer::TransferEngine;

/// Normalises a string to NFC (composed) form.
///
/// macOS stores filenames in NFD (decomposed), so a name typed on one
/// machine may not compare equal to the same name uploaded from another.
pub fn nfc_string(s: &str) -> String {
    use unicode_normalization::UnicodeNormalization;
    s.nfc().collect()
}
