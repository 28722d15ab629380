use std::fs::File;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, CoreResult};
use crate::event::Event;
use crate::nfc_string;
use crate::remote::{DriveApi, RemoteItem};
use crate::transfer::{expand, TransferEngine};

impl<'a, D: DriveApi + ?Sized> TransferEngine<'a, D> {
    /// Uploads every local path matching `pattern` into the folder
    /// `parent_id` and returns the top-level remote items.
    ///
    /// Directories require `recursive`; that is checked for all matches
    /// before anything is sent. Folders that already exist remotely are
    /// reused. Files are always created anew, so uploading the same file
    /// twice leaves two remote objects.
    pub fn upload(
        &self,
        pattern: &str,
        parent_id: &str,
        recursive: bool,
        on_event: &mut dyn FnMut(Event),
    ) -> CoreResult<Vec<RemoteItem>> {
        let paths = expand(pattern)?;
        if paths.is_empty() {
            return Err(CoreError::LocalNotFound(pattern.to_string()));
        }
        if !recursive && paths.iter().any(|p| p.is_dir()) {
            return Err(CoreError::RecursiveRequired("upload directories"));
        }

        let mut uploaded = Vec::with_capacity(paths.len());
        for path in &paths {
            uploaded.push(self.upload_path(path, parent_id, 0, on_event)?);
        }
        Ok(uploaded)
    }

    fn upload_path(
        &self,
        path: &Path,
        parent_id: &str,
        depth: usize,
        on_event: &mut dyn FnMut(Event),
    ) -> CoreResult<RemoteItem> {
        if depth > self.max_depth {
            return Err(CoreError::DepthExceeded(
                self.max_depth,
                path.display().to_string(),
            ));
        }
        on_event(Event::Uploading(path.to_path_buf()));

        let name = upload_name(path)?;
        let meta = std::fs::metadata(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CoreError::LocalNotFound(path.display().to_string()),
            std::io::ErrorKind::PermissionDenied => CoreError::PermissionDenied(path.to_path_buf()),
            _ => CoreError::Io(e),
        })?;

        if meta.is_dir() {
            let (folder, created) = self.ensure_folder(&name, parent_id)?;
            on_event(Event::FolderEnsured {
                item: folder.clone(),
                created,
            });

            let mut children = std::fs::read_dir(path)?
                .map(|entry| entry.map(|e| e.path()))
                .collect::<std::io::Result<Vec<PathBuf>>>()?;
            children.sort();
            for child in &children {
                self.upload_path(child, &folder.id, depth + 1, on_event)?;
            }
            return Ok(folder);
        }

        let file = File::open(path)?;
        let item = self
            .drive()
            .create_file(&name, Some(parent_id), Box::new(file), meta.len())?;
        tracing::debug!(path = %path.display(), id = %item.id, bytes = meta.len(), "uploaded file");
        on_event(Event::FileUploaded(item.clone()));
        Ok(item)
    }

    /// Returns the folder `name` under `parent_id`, creating it if absent.
    /// The flag is `true` when the folder was created.
    fn ensure_folder(&self, name: &str, parent_id: &str) -> CoreResult<(RemoteItem, bool)> {
        if let Some(existing) = self.index.find(parent_id, name, true)? {
            return Ok((existing, false));
        }
        let created = self.drive().create_folder(name, Some(parent_id))?;
        tracing::info!(name, id = %created.id, "created remote folder");
        Ok((created, true))
    }
}

/// Remote name for a local path: the final component of its canonical
/// form, NFC-normalized.
fn upload_name(path: &Path) -> CoreResult<String> {
    let resolved = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    let name = resolved.file_name().ok_or_else(|| {
        CoreError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{} has no file name to upload", path.display()),
        ))
    })?;
    Ok(nfc_string(&name.to_string_lossy()))
}
