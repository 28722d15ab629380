//! Drive query-language rendering.

use crate::remote::ChildQuery;

/// Mime type Google Drive uses for folders.
pub const FOLDER_MIME: &str = "application/vnd.google-apps.folder";

/// Escapes a string for use inside a single-quoted query literal.
///
/// Backslashes and single quotes are prefixed with a backslash.
pub fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '\\' || c == '\'' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Renders the `q` parameter selecting non-trashed children of `parent_id`.
pub fn children_query(parent_id: &str, query: &ChildQuery) -> String {
    let mut q = format!(
        "'{}' in parents and trashed = false",
        escape_literal(parent_id)
    );
    if query.folders_only {
        q.push_str(&format!(" and mimeType = '{FOLDER_MIME}'"));
    }
    if let Some(name) = &query.name_equals {
        q.push_str(&format!(" and name = '{}'", escape_literal(name)));
    }
    q
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_name_is_unchanged() {
        assert_eq!(escape_literal("Documents"), "Documents");
    }

    #[test]
    fn quote_is_escaped() {
        assert_eq!(escape_literal("O'Brien"), r"O\'Brien");
    }

    #[test]
    fn backslash_is_escaped_before_quote() {
        assert_eq!(escape_literal(r"a\'b"), r"a\\\'b");
    }

    #[test]
    fn unfiltered_query() {
        assert_eq!(
            children_query("root", &ChildQuery::all()),
            "'root' in parents and trashed = false"
        );
    }

    #[test]
    fn folder_name_query() {
        let q = children_query("abc", &ChildQuery::named("O'Brien", true));
        assert_eq!(
            q,
            "'abc' in parents and trashed = false \
             and mimeType = 'application/vnd.google-apps.folder' \
             and name = 'O\\'Brien'"
        );
    }

    #[test]
    fn name_filter_without_folder_restriction() {
        let q = children_query("abc", &ChildQuery::named("a b.txt", false));
        assert!(!q.contains("mimeType"));
        assert!(q.ends_with("and name = 'a b.txt'"));
    }
}
