use crate::error::{CoreError, CoreResult};
use crate::event::Event;
use crate::remote::{DriveApi, RemoteItem, ROOT_ID};
use crate::transfer::TransferEngine;

impl<'a, D: DriveApi + ?Sized> TransferEngine<'a, D> {
    /// Moves `item_id` to the trash and returns its updated metadata.
    ///
    /// Nothing is deleted permanently. Folders require `recursive`, and the
    /// drive root is always refused.
    pub fn trash(
        &self,
        item_id: &str,
        recursive: bool,
        on_event: &mut dyn FnMut(Event),
    ) -> CoreResult<RemoteItem> {
        if item_id == ROOT_ID {
            return Err(CoreError::RootRemoval);
        }
        let item = self.drive().metadata(item_id)?;
        if item.is_folder() && !recursive {
            return Err(CoreError::RecursiveRequired("delete folders"));
        }

        let trashed = self.drive().trash(item_id)?;
        tracing::info!(id = item_id, name = %trashed.name, "moved to trash");
        on_event(Event::Trashed(trashed.clone()));
        Ok(trashed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::TransferConfig;
    use crate::remote::memory::MemoryDrive;
    use crate::remote::DirectoryIndex;

    fn engine(drive: &MemoryDrive) -> TransferEngine<'_, MemoryDrive> {
        TransferEngine::new(DirectoryIndex::new(drive, 100), &TransferConfig::default())
    }

    #[test]
    fn file_is_trashed() {
        let drive = MemoryDrive::new();
        let file = drive.add_file(ROOT_ID, "old.txt", b"x");

        let mut events = Vec::new();
        let item = engine(&drive)
            .trash(&file.id, false, &mut |e| events.push(e))
            .unwrap();
        assert!(item.trashed);
        assert!(drive.children_of(ROOT_ID).is_empty());
        assert_eq!(events, vec![Event::Trashed(item)]);
    }

    #[test]
    fn folder_requires_recursive() {
        let drive = MemoryDrive::new();
        let folder = drive.add_folder(ROOT_ID, "keep");

        let err = engine(&drive).trash(&folder.id, false, &mut |_| {}).unwrap_err();
        assert!(matches!(err, CoreError::RecursiveRequired("delete folders")));
        assert_eq!(drive.children_of(ROOT_ID).len(), 1);
    }

    #[test]
    fn recursive_trashes_folder() {
        let drive = MemoryDrive::new();
        let folder = drive.add_folder(ROOT_ID, "old");
        drive.add_file(&folder.id, "inner", b"x");

        let item = engine(&drive).trash(&folder.id, true, &mut |_| {}).unwrap();
        assert!(item.trashed);
        assert!(item.is_folder());
    }

    #[test]
    fn root_is_refused() {
        let drive = MemoryDrive::new();
        let err = engine(&drive).trash(ROOT_ID, true, &mut |_| {}).unwrap_err();
        assert!(matches!(err, CoreError::RootRemoval));
    }
}
