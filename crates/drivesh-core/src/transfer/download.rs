use std::fs::OpenOptions;
use std::io::{Read, Write};
use std::path::Path;

use crate::error::{CoreError, CoreResult};
use crate::event::Event;
use crate::nav::Target;
use crate::remote::{ChildQuery, DriveApi};
use crate::transfer::{local_name, TransferEngine};

impl<'a, D: DriveApi + ?Sized> TransferEngine<'a, D> {
    /// Downloads `target` to `dest`.
    ///
    /// Folders require `recursive`; the check happens before anything is
    /// written locally.
    pub fn download(
        &self,
        target: &Target,
        dest: &Path,
        recursive: bool,
        on_event: &mut dyn FnMut(Event),
    ) -> CoreResult<()> {
        match target {
            Target::File(item) => self.download_file(&item.id, dest, on_event),
            Target::Folder(_) if !recursive => {
                Err(CoreError::RecursiveRequired("download folders"))
            }
            Target::Folder(entry) => self.download_tree(&entry.id, dest, 0, on_event),
        }
    }

    /// Streams one remote file into a newly created local file.
    ///
    /// An existing `dest` is never overwritten. If the transfer fails
    /// midway the partial file is left in place.
    pub fn download_file(
        &self,
        file_id: &str,
        dest: &Path,
        on_event: &mut dyn FnMut(Event),
    ) -> CoreResult<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(dest)
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => {
                    CoreError::DestinationExists(dest.to_path_buf())
                }
                std::io::ErrorKind::PermissionDenied => {
                    CoreError::PermissionDenied(dest.to_path_buf())
                }
                _ => CoreError::Io(e),
            })?;

        let mut reader = self.drive().open_file(file_id)?;
        let mut buf = vec![0u8; self.chunk_size];
        let mut bytes = 0u64;
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            file.write_all(&buf[..n])?;
            bytes += n as u64;
        }
        file.flush()?;

        tracing::debug!(file_id, path = %dest.display(), bytes, "downloaded file");
        on_event(Event::FileDownloaded {
            path: dest.to_path_buf(),
            bytes,
        });
        Ok(())
    }

    /// Mirrors a remote folder into `dest`, which may already exist.
    fn download_tree(
        &self,
        folder_id: &str,
        dest: &Path,
        depth: usize,
        on_event: &mut dyn FnMut(Event),
    ) -> CoreResult<()> {
        if depth > self.max_depth {
            return Err(CoreError::DepthExceeded(
                self.max_depth,
                dest.display().to_string(),
            ));
        }

        match std::fs::create_dir(dest) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && dest.is_dir() => {}
            Err(e) => return Err(CoreError::Io(e)),
        }
        on_event(Event::DirectoryCreated(dest.to_path_buf()));

        for child in self.index.children(folder_id, ChildQuery::all()) {
            let child = child?;
            let path = dest.join(local_name(&child.name));
            if child.is_folder() {
                self.download_tree(&child.id, &path, depth + 1, on_event)?;
            } else {
                self.download_file(&child.id, &path, on_event)?;
            }
        }
        Ok(())
    }
}
