//! The shell's current location as a chain of remote folders.

use crate::nav::path::{escape_segment, SEPARATOR};
use crate::remote::ROOT_ID;

/// One resolved folder on the working-directory stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackEntry {
    pub id: String,
    pub name: String,
}

impl StackEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Path from the drive root to the current folder.
///
/// Entry 0 is always the root sentinel `(root, "")`; entry `i` is a child
/// folder of entry `i - 1`. Like the rest of the navigation types, every
/// mutation consumes `self` and returns the new stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingDirectoryStack {
    entries: Vec<StackEntry>,
}

impl Default for WorkingDirectoryStack {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkingDirectoryStack {
    /// A stack holding only the root sentinel.
    pub fn new() -> Self {
        Self {
            entries: vec![StackEntry::new(ROOT_ID, "")],
        }
    }

    pub fn entries(&self) -> &[StackEntry] {
        &self.entries
    }

    /// Number of entries, including the root sentinel.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`: the root sentinel cannot be removed.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns `true` if only the root sentinel is present.
    pub fn is_root(&self) -> bool {
        self.entries.len() == 1
    }

    /// The folder the shell is currently in.
    pub fn current(&self) -> &StackEntry {
        // Invariant: entries is never empty.
        &self.entries[self.entries.len() - 1]
    }

    /// Escaped names joined with `/`, always ending in exactly one `/`.
    ///
    /// The root alone renders as `/`. A `/` or `\` inside a name is
    /// preceded by `\`, so every unescaped `/` is a separator and the
    /// result can be fed back to the path parser unchanged.
    pub fn display_path(&self) -> String {
        let mut path = String::from(SEPARATOR);
        for entry in &self.entries[1..] {
            path.push_str(&escape_segment(&entry.name));
            path.push(SEPARATOR);
        }
        path
    }

    /// Keeps the first `len` entries. The root sentinel always survives.
    pub fn truncated(mut self, len: usize) -> Self {
        self.entries.truncate(len.max(1));
        self
    }

    /// Appends a child folder of the current entry.
    pub fn pushed(mut self, entry: StackEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Number of leading `segments` that match the stack's folder names,
    /// compared position by position up to the shorter length.
    ///
    /// The result is also the index of the deepest matching stack entry,
    /// so `0` means only the root matches.
    pub fn common_prefix_len(&self, segments: &[String]) -> usize {
        self.entries[1..]
            .iter()
            .zip(segments)
            .take_while(|(entry, segment)| entry.name == **segment)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack(names: &[&str]) -> WorkingDirectoryStack {
        names.iter().enumerate().fold(
            WorkingDirectoryStack::new(),
            |stack, (i, name)| stack.pushed(StackEntry::new(format!("id{i}"), *name)),
        )
    }

    fn segs(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn new_stack_is_root() {
        let s = WorkingDirectoryStack::new();
        assert!(s.is_root());
        assert!(!s.is_empty());
        assert_eq!(s.len(), 1);
        assert_eq!(s.current().id, ROOT_ID);
        assert_eq!(s.display_path(), "/");
    }

    #[test]
    fn display_path_has_single_trailing_separator() {
        assert_eq!(stack(&["a", "b"]).display_path(), "/a/b/");
        assert_eq!(stack(&["a"]).display_path(), "/a/");
    }

    #[test]
    fn display_path_escapes_separators_in_names() {
        let s = stack(&["a/b", r"c\d"]);
        assert_eq!(s.display_path(), r"/a\/b/c\\d/");
    }

    #[test]
    fn name_ending_in_separator_is_not_a_doubled_separator() {
        let path = stack(&["x/"]).display_path();
        assert_eq!(path, r"/x\//");
        let parsed = crate::nav::path::ParsedPath::parse("/", &path);
        assert_eq!(parsed.segments, vec!["x/"]);
        assert!(parsed.folder_hint);
    }

    #[test]
    fn truncate_never_drops_root() {
        let s = stack(&["a", "b"]).truncated(0);
        assert!(s.is_root());
        assert_eq!(s.display_path(), "/");
    }

    #[test]
    fn truncate_keeps_prefix() {
        let s = stack(&["a", "b", "c"]).truncated(2);
        assert_eq!(s.display_path(), "/a/");
        assert_eq!(s.current().name, "a");
    }

    #[test]
    fn pushed_does_not_touch_original() {
        let base = stack(&["a"]);
        let extended = base.clone().pushed(StackEntry::new("x", "b"));
        assert_eq!(base.len(), 2);
        assert_eq!(extended.len(), 3);
    }

    #[test]
    fn common_prefix_of_deeper_target() {
        let s = stack(&["a", "b"]);
        assert_eq!(s.common_prefix_len(&segs(&["a", "b", "c"])), 2);
    }

    #[test]
    fn common_prefix_stops_at_first_difference() {
        let s = stack(&["a", "b", "c"]);
        assert_eq!(s.common_prefix_len(&segs(&["a", "x", "c"])), 1);
        assert_eq!(s.common_prefix_len(&segs(&["x"])), 0);
    }

    #[test]
    fn common_prefix_bounded_by_shorter_side() {
        let s = stack(&["a", "b", "c"]);
        assert_eq!(s.common_prefix_len(&segs(&["a"])), 1);
        assert_eq!(s.common_prefix_len(&[]), 0);
    }

    #[test]
    fn common_prefix_compares_names_not_ids() {
        let s = WorkingDirectoryStack::new().pushed(StackEntry::new("zzz", "a"));
        assert_eq!(s.common_prefix_len(&segs(&["a"])), 1);
    }
}
