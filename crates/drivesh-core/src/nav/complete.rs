//! Tab completion for remote paths and shell verbs.

use crate::nav::path::{escape_for_line, escape_for_shell_word, escape_segment, unescape, SEPARATOR};
use crate::nav::resolver::{Lookup, Outcome, PathResolver};
use crate::nav::stack::WorkingDirectoryStack;
use crate::remote::{ChildQuery, DirectoryIndex, DriveApi, RemoteResult};

/// Verbs offered when completing the first word of a line.
pub const VERBS: &[&str] = &[
    "cd", "exit", "get", "help", "logout", "ls", "put", "pwd", "quit", "rm", "shell",
];

/// How the command parser tokenizes a verb's arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgSyntax {
    /// The rest of the line is one path (`cd`, `ls`).
    Raw,
    /// Arguments are split shell-style, removing one level of escapes
    /// (`get`, `put`, `rm`).
    ShellWords,
}

/// What kind of word sits under the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionKind {
    Verb,
    RemoteFolder(ArgSyntax),
    RemoteAny(ArgSyntax),
    Local,
    Nothing,
}

/// Classifies the word ending at the end of `line` (the text left of the
/// cursor) and returns it with its byte offset.
pub fn classify(line: &str) -> (CompletionKind, usize, &str) {
    let start = word_start(line);
    let word = &line[start..];
    let words = split_words(&line[..start]);

    let Some(verb) = words.first() else {
        return (CompletionKind::Verb, start, word);
    };
    if word.starts_with('-') {
        return (CompletionKind::Nothing, start, word);
    }
    let positionals = words[1..].iter().filter(|w| !w.starts_with('-')).count();

    let kind = match (verb.as_str(), positionals) {
        ("cd", _) => CompletionKind::RemoteFolder(ArgSyntax::Raw),
        ("ls", _) => CompletionKind::RemoteAny(ArgSyntax::Raw),
        ("rm", 0) | ("get", 0) => CompletionKind::RemoteAny(ArgSyntax::ShellWords),
        ("get", _) | ("put", 0) | ("shell", _) => CompletionKind::Local,
        ("put", _) => CompletionKind::RemoteFolder(ArgSyntax::ShellWords),
        (v, _) if v.starts_with('!') => CompletionKind::Local,
        _ => CompletionKind::Nothing,
    };
    (kind, start, word)
}

/// Verbs starting with `prefix`.
pub fn complete_verb(prefix: &str) -> Vec<String> {
    VERBS
        .iter()
        .filter(|v| v.starts_with(prefix))
        .map(|v| v.to_string())
        .collect()
}

/// Candidates for the partial path `word`.
///
/// Returns the byte offset within `word` where the replaced text starts
/// together with replacement strings for it. Folders carry a trailing `/`.
/// With [`ArgSyntax::Raw`] only the last segment is replaced and names are
/// escaped for the line. With [`ArgSyntax::ShellWords`] the whole word is
/// replaced by a path escaped twice, so shell-style splitting leaves the
/// path escapes in place. A missing parent folder yields no candidates.
pub fn complete_remote<D: DriveApi + ?Sized>(
    index: DirectoryIndex<'_, D>,
    stack: &WorkingDirectoryStack,
    word: &str,
    folders_only: bool,
    syntax: ArgSyntax,
) -> RemoteResult<(usize, Vec<String>)> {
    match syntax {
        ArgSyntax::Raw => {
            let offset = last_segment_start(word);
            let (dir_part, partial) = word.split_at(offset);
            let candidates = matching(index, stack, dir_part, partial, folders_only)?
                .into_iter()
                .map(|(name, folder)| with_slash(escape_for_line(&name), folder))
                .collect();
            Ok((offset, candidates))
        }
        ArgSyntax::ShellWords => {
            let Some(path) = shell_word(word) else {
                return Ok((0, Vec::new()));
            };
            let (dir_part, partial) = path.split_at(last_segment_start(&path));
            let candidates = matching(index, stack, dir_part, partial, folders_only)?
                .into_iter()
                .map(|(name, folder)| {
                    let full = with_slash(format!("{dir_part}{}", escape_segment(&name)), folder);
                    escape_for_shell_word(&full)
                })
                .collect();
            Ok((0, candidates))
        }
    }
}

/// Names (with a folder flag) under the folder `dir_part` that start with
/// the still escaped `partial`.
fn matching<D: DriveApi + ?Sized>(
    index: DirectoryIndex<'_, D>,
    stack: &WorkingDirectoryStack,
    dir_part: &str,
    partial: &str,
    folders_only: bool,
) -> RemoteResult<Vec<(String, bool)>> {
    let partial = unescape(partial);
    let resolution = PathResolver::new(index).resolve(stack, dir_part, Lookup::Folder)?;
    let Outcome::Found(folder) = resolution.outcome else {
        return Ok(Vec::new());
    };

    let query = if folders_only {
        ChildQuery::folders()
    } else {
        ChildQuery::all()
    };
    let mut names = Vec::new();
    for item in index.children(folder.id(), query) {
        let item = item?;
        if item.name.starts_with(&partial) {
            let folder = item.is_folder();
            names.push((item.name, folder));
        }
    }
    Ok(names)
}

fn with_slash(mut candidate: String, folder: bool) -> String {
    if folder {
        candidate.push(SEPARATOR);
    }
    candidate
}

/// The path a partially typed shell-style word stands for. An unterminated
/// quote is closed before splitting.
fn shell_word(word: &str) -> Option<String> {
    let words = shlex::split(word)
        .or_else(|| shlex::split(&format!("{word}'")))
        .or_else(|| shlex::split(&format!("{word}\"")))?;
    match words.as_slice() {
        [] => Some(String::new()),
        [path] => Some(path.clone()),
        _ => None,
    }
}

/// Byte offset just past the last unescaped separator in `word`.
fn last_segment_start(word: &str) -> usize {
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in word.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == SEPARATOR {
            start = i + c.len_utf8();
        }
    }
    start
}

/// Byte offset where the word ending at the end of `line` starts.
fn word_start(line: &str) -> usize {
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c.is_whitespace() {
            start = i + c.len_utf8();
        }
    }
    start
}

fn split_words(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut escaped = false;
    for c in text.chars() {
        if escaped {
            current.push(c);
            escaped = false;
        } else if c == '\\' {
            current.push(c);
            escaped = true;
        } else if c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}
