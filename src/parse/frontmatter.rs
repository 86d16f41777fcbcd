//! Locating the frontmatter block.
//!
//! A block opens with a bare `---` on the very first line and closes with
//! the next bare `---`, but only when every line in between looks like the
//! plain key/value subset we write ourselves. A markdown horizontal rule in
//! the body therefore never ends a block early: the body text above it
//! fails the line test and the file is treated as having no frontmatter.

use std::sync::LazyLock;

use regex::Regex;

pub const DELIMITER: &str = "---";

static KEY_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+:(\s|$)").expect("key line pattern"));

/// Where the frontmatter block sits in a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockScan {
    /// First line is not a delimiter
    Absent,
    /// Opening delimiter found but no acceptable closing delimiter
    Unclosed,
    /// Block spans lines `1..close`; `close` is the closing delimiter's index
    Closed { close: usize },
}

/// Split text into lines, each keeping its own line terminator.
pub fn split_lines(content: &str) -> Vec<&str> {
    content.split_inclusive('\n').collect()
}

/// Strip a trailing `\n` or `\r\n`.
pub fn strip_eol(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

pub fn is_delimiter(line: &str) -> bool {
    strip_eol(line) == DELIMITER
}

/// Whether a line belongs to the key/value subset: blank, `key: value`,
/// `- item`, an indented continuation, or a `#` comment.
pub fn looks_like_yaml(line: &str) -> bool {
    let line = strip_eol(line);
    if line.trim().is_empty() {
        return true;
    }
    if line.starts_with(' ') || line.starts_with('\t') {
        return true;
    }
    if line == "-" || line.starts_with("- ") || line.starts_with('#') {
        return true;
    }
    KEY_LINE_RE.is_match(line)
}

/// Find the frontmatter block in a list of lines.
pub fn find_block(lines: &[&str]) -> BlockScan {
    match lines.first() {
        Some(first) if is_delimiter(first) => {}
        _ => return BlockScan::Absent,
    }
    for (idx, line) in lines.iter().enumerate().skip(1) {
        if is_delimiter(line) {
            return BlockScan::Closed { close: idx };
        }
        if !looks_like_yaml(line) {
            return BlockScan::Unclosed;
        }
    }
    BlockScan::Unclosed
}

/// Scan a whole document.
pub fn scan(content: &str) -> BlockScan {
    find_block(&split_lines(content))
}

/// Split a document into its frontmatter text (without delimiters) and body.
/// Returns `None` unless the block is present and properly closed.
pub fn split_frontmatter(content: &str) -> Option<(&str, &str)> {
    let lines = split_lines(content);
    let BlockScan::Closed { close } = find_block(&lines) else {
        return None;
    };
    let block_start = lines[0].len();
    let block_end = block_start + lines[1..close].iter().map(|l| l.len()).sum::<usize>();
    let body_start = block_end + lines[close].len();
    Some((&content[block_start..block_end], &content[body_start..]))
}

/// Line terminator used by a document, judged by its first line
pub fn line_ending(content: &str) -> &'static str {
    match content.find('\n') {
        Some(i) if i > 0 && content.as_bytes()[i - 1] == b'\r' => "\r\n",
        _ => "\n",
    }
}
