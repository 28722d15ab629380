//! Local glob expansion for uploads.

use std::path::{Path, PathBuf};

use globset::GlobBuilder;
use walkdir::WalkDir;

use crate::error::{CoreError, CoreResult};

const META: &[char] = &['*', '?', '['];

fn has_meta(text: &str) -> bool {
    text.contains(META)
}

/// Expands `pattern` into the existing local paths it names, sorted.
///
/// A pattern without wildcards yields itself if it exists. `*` and `?`
/// never cross a `/`; `**` matches any number of directories. Braces are
/// plain characters. Hidden entries only match when the pattern itself
/// names a dot component.
pub fn expand(pattern: &str) -> CoreResult<Vec<PathBuf>> {
    if !has_meta(pattern) {
        let path = PathBuf::from(pattern);
        return Ok(if std::fs::symlink_metadata(&path).is_ok() {
            vec![path]
        } else {
            Vec::new()
        });
    }

    let components: Vec<&str> = pattern.split('/').collect();
    let literal = components.iter().take_while(|c| !has_meta(c)).count();
    let base = match components[..literal].join("/") {
        b if b.is_empty() && pattern.starts_with('/') => "/".to_string(),
        b if b.is_empty() => ".".to_string(),
        b => b,
    };
    let recursive = components[literal..].iter().any(|c| c.contains("**"));
    let max_depth = if recursive {
        usize::MAX
    } else {
        components.len() - literal
    };
    let include_hidden = components[literal..]
        .iter()
        .any(|c| c.starts_with('.'));

    let matcher = GlobBuilder::new(&literal_braces(pattern.trim_start_matches("./")))
        .literal_separator(true)
        .build()
        .map_err(|e| CoreError::InvalidPattern(e.to_string()))?
        .compile_matcher();

    let strip_dot = base == "." && !pattern.starts_with("./");
    let mut matches: Vec<PathBuf> = WalkDir::new(&base)
        .min_depth(1)
        .max_depth(max_depth)
        .into_iter()
        .filter_entry(|e| include_hidden || !is_hidden(e.file_name()))
        .filter_map(Result::ok)
        .map(|e| relative_to_pattern(e.path(), strip_dot))
        .filter(|p| matcher.is_match(p.as_path().to_string_lossy().trim_start_matches("./")))
        .collect();
    matches.sort();
    tracing::debug!(pattern, base = %base, count = matches.len(), "expanded glob");
    Ok(matches)
}

/// Wraps `{` and `}` outside character classes in a class of their own so
/// they never start an alternation.
fn literal_braces(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut class: Option<usize> = None;
    for c in pattern.chars() {
        match (class, c) {
            (None, '{' | '}') => {
                out.push('[');
                out.push(c);
                out.push(']');
            }
            (None, '[') => {
                class = Some(0);
                out.push(c);
            }
            (Some(n), ']') if n > 0 => {
                class = None;
                out.push(c);
            }
            (Some(0), '!' | '^') => out.push(c),
            (Some(n), _) => {
                class = Some(n + 1);
                out.push(c);
            }
            (None, _) => out.push(c),
        }
    }
    out
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

fn relative_to_pattern(path: &Path, strip_dot: bool) -> PathBuf {
    if strip_dot {
        path.strip_prefix(".").unwrap_or(path).to_path_buf()
    } else {
        path.to_path_buf()
    }
}
