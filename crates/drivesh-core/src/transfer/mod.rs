//! Moving data between the local filesystem and the remote drive.
//!
//! [`TransferEngine`] covers the three mutating operations: downloading a
//! file or folder tree, uploading glob-matched local paths, and moving
//! remote items to the trash. Progress is reported through
//! [`Event`](crate::event::Event) callbacks so the engine never writes
//! output itself.

mod download;
mod glob;
mod trash;
mod upload;

pub use glob::expand;

use crate::config::settings::TransferConfig;
use crate::remote::{DirectoryIndex, DriveApi};

/// Runs transfers against one drive.
pub struct TransferEngine<'a, D: DriveApi + ?Sized> {
    index: DirectoryIndex<'a, D>,
    chunk_size: usize,
    max_depth: usize,
}

impl<'a, D: DriveApi + ?Sized> TransferEngine<'a, D> {
    pub fn new(index: DirectoryIndex<'a, D>, config: &TransferConfig) -> Self {
        Self {
            index,
            chunk_size: config.chunk_size.max(1),
            max_depth: config.max_depth,
        }
    }

    fn drive(&self) -> &'a D {
        self.index.drive()
    }
}

/// Turns a remote name into a single safe local path component.
///
/// Remote names may contain `/` or be `.`/`..`; neither may escape the
/// download directory.
pub fn local_name(remote: &str) -> String {
    match remote {
        "" | "." | ".." => "_".repeat(remote.len().max(1)),
        _ => remote
            .chars()
            .map(|c| if c == '/' || c == '\0' { '_' } else { c })
            .collect(),
    }
}
