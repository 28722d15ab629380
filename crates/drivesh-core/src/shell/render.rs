//! Line formatting for shell output.

use crossterm::style::Stylize;

use crate::event::Event;
use crate::remote::RemoteItem;

/// An item's name, in blue when it is a folder and `color` is on.
pub fn item_name(item: &RemoteItem, color: bool) -> String {
    if item.is_folder() && color {
        item.name.as_str().blue().to_string()
    } else {
        item.name.clone()
    }
}

/// The line printed for a progress event, if any.
pub fn event_line(event: &Event) -> Option<String> {
    match event {
        Event::DirectoryCreated(path) | Event::Uploading(path) => Some(path.display().to_string()),
        Event::FileDownloaded { path, .. } => Some(path.display().to_string()),
        Event::Trashed(item) => Some(item.name.clone()),
        Event::FolderEnsured { .. } | Event::FileUploaded(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::ItemKind;
    use std::path::PathBuf;

    fn item(name: &str, kind: ItemKind) -> RemoteItem {
        RemoteItem {
            id: "x".to_string(),
            name: name.to_string(),
            kind,
            parents: Vec::new(),
            trashed: false,
        }
    }

    #[test]
    fn files_are_never_colored() {
        assert_eq!(item_name(&item("a.txt", ItemKind::File), true), "a.txt");
    }

    #[test]
    fn folders_are_blue_when_enabled() {
        let folder = item("docs", ItemKind::Folder);
        let painted = item_name(&folder, true);
        assert!(painted.contains("docs"));
        assert_eq!(item_name(&folder, false), "docs");
    }

    #[test]
    fn transfer_events_print_paths() {
        let path = PathBuf::from("out/a.txt");
        assert_eq!(
            event_line(&Event::FileDownloaded {
                path: path.clone(),
                bytes: 3
            }),
            Some("out/a.txt".to_string())
        );
        assert_eq!(event_line(&Event::Uploading(path)), Some("out/a.txt".to_string()));
        assert_eq!(event_line(&Event::FileUploaded(item("a", ItemKind::File))), None);
    }
}
