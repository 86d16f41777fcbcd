use std::path::Path;
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

use crate::model::note::Note;

/// `YYYYMMDDTHHMMSS`, one or two hyphens, slug, optional `__tag_tag`, `.md`
static FILENAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{8}T\d{6})--?([^_\-][^_]*?)(?:__([^.]*))?\.md$").expect("filename pattern")
});

/// Format of a Denote identifier
pub const IDENTIFIER_FORMAT: &str = "%Y%m%dT%H%M%S";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilenameError {
    #[error("not a denote filename: {0}")]
    NotMatched(String),
}

/// Decompose a Denote filename into identifier, slug, title and tags.
pub fn parse_filename(name: &str) -> Result<Note, FilenameError> {
    let caps = FILENAME_RE
        .captures(name)
        .ok_or_else(|| FilenameError::NotMatched(name.to_string()))?;

    let id = caps[1].to_string();
    let slug = caps[2].to_string();
    let tags = caps
        .get(3)
        .map(|m| {
            m.as_str()
                .split('_')
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(Note {
        title: slug.replace('-', " "),
        id,
        slug,
        tags,
    })
}

/// Parse the final component of `path`.
pub fn parse_path(path: &Path) -> Result<Note, FilenameError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| FilenameError::NotMatched(path.display().to_string()))?;
    parse_filename(name)
}

/// Build a filename from its parts. Inverse of [`parse_filename`].
pub fn to_filename(id: &str, slug: &str, tags: &[String]) -> String {
    let mut name = format!("{}--{}", id, slug);
    if !tags.is_empty() {
        name.push_str("__");
        name.push_str(&tags.join("_"));
    }
    name.push_str(".md");
    name
}

/// Lowercase a title and join its alphanumeric runs with single hyphens.
pub fn slugify(title: &str) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;
    for c in title.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Reduce a tag to lowercase alphanumerics so it can't break the `_` list.
pub fn sanitize_tag(tag: &str) -> String {
    tag.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Denote identifier for a point in time
pub fn denote_identifier(at: NaiveDateTime) -> String {
    at.format(IDENTIFIER_FORMAT).to_string()
}
