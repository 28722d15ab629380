//! Lexical handling of shell-style remote paths.
//!
//! Paths use `/` as separator. A backslash escapes the next character, so a
//! folder literally named `a/b` is written `a\/b` and survives
//! normalization as one segment. No remote calls happen here.

/// Remote path separator.
pub const SEPARATOR: char = '/';

const ESCAPE: char = '\\';

/// A path after normalization against the working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPath {
    /// Unescaped names from the root downwards; empty for the root itself.
    pub segments: Vec<String>,
    /// The path denotes a folder itself rather than a named child: it was
    /// empty, ended with a separator, or ended with `.` or `..`.
    pub folder_hint: bool,
}

impl ParsedPath {
    /// Normalizes `raw` relative to `base`, the escaped absolute path of the
    /// current folder (as produced by
    /// [`WorkingDirectoryStack::display_path`](crate::nav::WorkingDirectoryStack::display_path)).
    ///
    /// `.` and empty components are dropped, `..` removes the previous
    /// segment (and is a no-op at the root), and an absolute `raw` ignores
    /// `base` entirely.
    pub fn parse(base: &str, raw: &str) -> Self {
        let combined = if raw.starts_with(SEPARATOR) {
            raw.to_string()
        } else {
            let mut joined = base.to_string();
            if !joined.ends_with(SEPARATOR) {
                joined.push(SEPARATOR);
            }
            joined.push_str(raw);
            joined
        };

        let components = split_escaped(&combined);
        let folder_hint = components
            .last()
            .map_or(true, |last| last.is_empty() || last == "." || last == "..");

        let mut segments: Vec<String> = Vec::new();
        for component in &components {
            match component.as_str() {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                literal => segments.push(unescape(literal)),
            }
        }

        Self {
            segments,
            folder_hint,
        }
    }

    /// Returns `true` if the path is the drive root.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The final segment, if any.
    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }
}

/// Splits on separators that are not escaped. Escapes are kept verbatim.
pub fn split_escaped(path: &str) -> Vec<String> {
    let mut components = Vec::new();
    let mut current = String::new();
    let mut chars = path.chars();
    while let Some(c) = chars.next() {
        match c {
            ESCAPE => {
                current.push(c);
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            SEPARATOR => components.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    components.push(current);
    components
}

/// Removes one level of backslash escaping. A trailing lone backslash is
/// kept as a literal.
pub fn unescape(component: &str) -> String {
    let mut out = String::with_capacity(component.len());
    let mut chars = component.chars();
    while let Some(c) = chars.next() {
        if c == ESCAPE {
            out.push(chars.next().unwrap_or(ESCAPE));
        } else {
            out.push(c);
        }
    }
    out
}

/// Escapes a literal name so [`ParsedPath::parse`] reads it back as one
/// segment.
pub fn escape_segment(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c == ESCAPE || c == SEPARATOR {
            out.push(ESCAPE);
        }
        out.push(c);
    }
    out
}

/// Escapes a name for insertion into an interactive command line, where
/// whitespace also separates words.
pub fn escape_for_line(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c == ESCAPE || c == SEPARATOR || c.is_whitespace() || c == '\'' || c == '"' {
            out.push(ESCAPE);
        }
        out.push(c);
    }
    out
}

/// Backslash-escapes an already escaped path so that one round of shell-style
/// word splitting (as done for `get`, `put` and `rm`) hands it back intact.
pub fn escape_for_shell_word(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        if c == ESCAPE || c.is_whitespace() || matches!(c, '\'' | '"' | '#') {
            out.push(ESCAPE);
        }
        out.push(c);
    }
    out
}
