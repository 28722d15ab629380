//! Translates shell paths into remote items.
//!
//! Resolution starts from the deepest entry of the current
//! [`WorkingDirectoryStack`] whose names match the target path (the
//! *anchor*), so moving around near the current folder costs one lookup per
//! new segment rather than a walk from the root.

use crate::error::{CoreError, CoreResult};
use crate::nav::path::ParsedPath;
use crate::nav::stack::{StackEntry, WorkingDirectoryStack};
use crate::remote::{DirectoryIndex, DriveApi, RemoteItem, RemoteResult};

/// What the final path segment may resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// Every segment must be a folder (`cd`, upload destinations).
    Folder,
    /// The final segment may be a file (`ls`, `get`, `rm`).
    Any,
}

/// A successfully resolved path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A folder, now the top of [`Resolution::stack`].
    Folder(StackEntry),
    /// A file directly inside the top of [`Resolution::stack`].
    File(RemoteItem),
}

impl Target {
    pub fn id(&self) -> &str {
        match self {
            Self::Folder(entry) => &entry.id,
            Self::File(item) => &item.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Folder(entry) => &entry.name,
            Self::File(item) => &item.name,
        }
    }
}

/// Whether resolution reached the end of the path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Found(Target),
    /// `segment` was not found; `final_any` is set when it was the last
    /// segment looked up without the folder restriction.
    Missing { segment: String, final_any: bool },
}

/// Result of [`PathResolver::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Index of the stack entry resolution continued from.
    pub anchor: usize,
    /// Folders resolved so far: the full folder chain on success, or the
    /// chain up to (not including) the missing segment.
    pub stack: WorkingDirectoryStack,
    pub outcome: Outcome,
}

impl Resolution {
    pub fn is_found(&self) -> bool {
        matches!(self.outcome, Outcome::Found(_))
    }

    /// Converts a missing segment into the matching [`CoreError`].
    pub fn into_target(self) -> CoreResult<Target> {
        match self.outcome {
            Outcome::Found(target) => Ok(target),
            Outcome::Missing {
                segment,
                final_any: true,
            } => Err(CoreError::MissingItem(segment)),
            Outcome::Missing { segment, .. } => Err(CoreError::MissingFolder(segment)),
        }
    }
}

/// Walks parsed paths against the remote directory index.
pub struct PathResolver<'a, D: DriveApi + ?Sized> {
    index: DirectoryIndex<'a, D>,
}

impl<'a, D: DriveApi + ?Sized> PathResolver<'a, D> {
    pub fn new(index: DirectoryIndex<'a, D>) -> Self {
        Self { index }
    }

    /// Resolves `raw` relative to `stack`.
    ///
    /// Only transport failures are errors; a missing segment is reported
    /// through [`Outcome::Missing`].
    pub fn resolve(
        &self,
        stack: &WorkingDirectoryStack,
        raw: &str,
        lookup: Lookup,
    ) -> RemoteResult<Resolution> {
        let parsed = ParsedPath::parse(&stack.display_path(), raw);
        self.resolve_parsed(stack, &parsed, lookup)
    }

    /// Resolves an already parsed path.
    pub fn resolve_parsed(
        &self,
        stack: &WorkingDirectoryStack,
        parsed: &ParsedPath,
        lookup: Lookup,
    ) -> RemoteResult<Resolution> {
        let anchor = stack.common_prefix_len(&parsed.segments);
        let mut current = stack.clone().truncated(anchor + 1);
        let remaining = &parsed.segments[anchor..];
        tracing::debug!(
            anchor,
            lookups = remaining.len(),
            path = %current.display_path(),
            "resolving path"
        );

        for (i, segment) in remaining.iter().enumerate() {
            let is_last = i + 1 == remaining.len();
            let final_any = is_last && lookup == Lookup::Any && !parsed.folder_hint;
            let parent_id = current.current().id.clone();

            match self.index.find(&parent_id, segment, !final_any)? {
                Some(item) if item.is_folder() => {
                    current = current.pushed(StackEntry::new(item.id, item.name));
                }
                Some(item) => {
                    return Ok(Resolution {
                        anchor,
                        stack: current,
                        outcome: Outcome::Found(Target::File(item)),
                    });
                }
                None => {
                    return Ok(Resolution {
                        anchor,
                        stack: current,
                        outcome: Outcome::Missing {
                            segment: segment.clone(),
                            final_any,
                        },
                    });
                }
            }
        }

        let target = Target::Folder(current.current().clone());
        Ok(Resolution {
            anchor,
            stack: current,
            outcome: Outcome::Found(target),
        })
    }
}
