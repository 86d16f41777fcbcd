//! Targeted edits of a frontmatter block.
//!
//! Edits are textual patches over the document's lines: the target field's
//! line is replaced or appended, and every other byte of the file is
//! carried through untouched. Nothing is re-serialized, so comments, key
//! order, indentation and unrelated list fields survive.

use crate::parse::frontmatter::{self, BlockScan, DELIMITER, strip_eol};
use crate::parse::metadata_parser::MetadataError;

/// Fields whose values are always written double-quoted
const ALWAYS_QUOTED: [&str; 3] = ["title", "project", "area"];
/// Fields whose values are written bare
const NEVER_QUOTED: [&str; 4] = ["due_date", "start_date", "estimate", "priority"];
/// Characters that start a YAML indicator when they lead a plain scalar
const INDICATOR_CHARS: &[char] = &[
    '-', '?', ':', ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%', '@', '`',
];
/// Characters that force quoting of any other value
const SPECIAL_CHARS: &[char] = &[':', '{', '}', '[', ']', '|', '>', '"', '\'', '#', '\n', '\r', '\t'];

/// Result of a scalar field edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The new document text
    Edited(String),
    /// The block is not properly closed; the document was left alone
    Unchanged,
}

/// Replace or insert `field: value` in the document's frontmatter.
///
/// A document without frontmatter gets a new block holding just this field.
/// A document whose block never closes is returned unchanged.
pub fn set_field(content: &str, field: &str, value: &str) -> EditOutcome {
    let eol = frontmatter::line_ending(content);
    let new_line = field_line(field, value);
    let replacement: String;
    let mut lines = frontmatter::split_lines(content);

    let close = match frontmatter::find_block(&lines) {
        BlockScan::Absent => {
            return EditOutcome::Edited(format!(
                "{d}{eol}{new_line}{eol}{d}{eol}{content}",
                d = DELIMITER
            ));
        }
        BlockScan::Unclosed => return EditOutcome::Unchanged,
        BlockScan::Closed { close } => close,
    };

    match (1..close).find(|&i| is_field_line(lines[i], field)) {
        Some(idx) => {
            let old = lines[idx];
            let terminator = &old[strip_eol(old).len()..];
            replacement = format!("{}{}", new_line, terminator);
            lines[idx] = replacement.as_str();
        }
        None => {
            replacement = format!("{}{}", new_line, eol);
            lines.insert(close, replacement.as_str());
        }
    }
    EditOutcome::Edited(lines.concat())
}

/// Replace the `tags:` list in the document's frontmatter.
///
/// The old `tags:` line and its two-space `  - item` children are removed;
/// a non-empty `tags` is appended as a fresh list at the end of the block.
/// Unlike [`set_field`], an unclosed block is an error.
pub fn set_tags(content: &str, tags: &[String]) -> Result<String, MetadataError> {
    let eol = frontmatter::line_ending(content);
    let block = tags_block(tags, eol);
    let mut lines = frontmatter::split_lines(content);

    let mut close = match frontmatter::find_block(&lines) {
        BlockScan::Absent if tags.is_empty() => return Ok(content.to_string()),
        BlockScan::Absent => {
            return Ok(format!(
                "{d}{eol}{block}{d}{eol}{content}",
                d = DELIMITER
            ));
        }
        BlockScan::Unclosed => return Err(MetadataError::Unclosed),
        BlockScan::Closed { close } => close,
    };

    if let Some(start) = (1..close).find(|&i| is_field_line(lines[i], "tags")) {
        let mut end = start + 1;
        while end < close && lines[end].starts_with("  - ") {
            end += 1;
        }
        lines.drain(start..end);
        close -= end - start;
    }

    if !block.is_empty() {
        lines.insert(close, block.as_str());
    }
    Ok(lines.concat())
}

/// Render `field: value` using the quoting policy. Empty values keep the key.
pub fn field_line(field: &str, value: &str) -> String {
    if value.is_empty() {
        format!("{}:", field)
    } else {
        format!("{}: {}", field, format_value(field, value))
    }
}

/// Quote a value when its field or contents call for it.
pub fn format_value(field: &str, value: &str) -> String {
    if ALWAYS_QUOTED.contains(&field) {
        return quote(value);
    }
    if NEVER_QUOTED.contains(&field) {
        return value.to_string();
    }
    if needs_quotes(value) {
        quote(value)
    } else {
        value.to_string()
    }
}

fn needs_quotes(value: &str) -> bool {
    value.contains(SPECIAL_CHARS)
        || value.starts_with(INDICATOR_CHARS)
        || value.trim() != value
}

fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// `tags:` followed by one `  - tag` line per tag; empty for no tags.
pub fn tags_block(tags: &[String], eol: &str) -> String {
    if tags.is_empty() {
        return String::new();
    }
    let mut out = format!("tags:{}", eol);
    for tag in tags {
        let tag = if needs_quotes(tag) { quote(tag) } else { tag.clone() };
        out.push_str(&format!("  - {}{}", tag, eol));
    }
    out
}

/// `field:` at column zero, i.e. `^field:\s*.*$`
fn is_field_line(line: &str, field: &str) -> bool {
    line.strip_prefix(field)
        .is_some_and(|rest| rest.starts_with(':'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DOC: &str = "\
---
title: \"Write report\"
# owner notes stay put
tags:
  - task
  - work
task_id: 4
status: open
aliases:
  - report
due_date: 2025-02-01
---

Body line

---

Footer
";

    fn edited(outcome: EditOutcome) -> String {
        match outcome {
            EditOutcome::Edited(s) => s,
            EditOutcome::Unchanged => panic!("expected an edit"),
        }
    }

    #[test]
    fn replaces_only_the_target_line() {
        let out = edited(set_field(DOC, "status", "done"));
        assert_eq!(out, DOC.replace("status: open", "status: done"));
    }

    #[test]
    fn replace_does_not_touch_prefix_fields() {
        let doc = "---\ndue_date: 2025-01-01\ndue: x\n---\n";
        let out = edited(set_field(doc, "due", "y"));
        assert_eq!(out, "---\ndue_date: 2025-01-01\ndue: y\n---\n");
    }

    #[test]
    fn appends_missing_field_at_end_of_block() {
        let out = edited(set_field(DOC, "priority", "p1"));
        assert_eq!(
            out,
            DOC.replace("due_date: 2025-02-01\n---", "due_date: 2025-02-01\npriority: p1\n---")
        );
    }

    #[test]
    fn synthesizes_block_when_absent() {
        let out = edited(set_field("Just text\n", "status", "open"));
        assert_eq!(out, "---\nstatus: open\n---\nJust text\n");
    }

    #[test]
    fn unclosed_block_is_left_alone() {
        let doc = "---\nstatus: open\nProse, not yaml.\n---\n";
        assert_eq!(set_field(doc, "status", "done"), EditOutcome::Unchanged);
    }

    #[test]
    fn empty_value_keeps_key() {
        let out = edited(set_field(DOC, "due_date", ""));
        assert!(out.contains("\ndue_date:\n"));
    }

    #[test]
    fn quoting_policy() {
        assert_eq!(format_value("project", "garden"), "\"garden\"");
        assert_eq!(format_value("area", "home"), "\"home\"");
        assert_eq!(format_value("title", "Say \"hi\""), "\"Say \\\"hi\\\"\"");
        assert_eq!(format_value("due_date", "2025-01-01"), "2025-01-01");
        assert_eq!(format_value("estimate", "8"), "8");
        assert_eq!(format_value("priority", "p2"), "p2");
        assert_eq!(format_value("status", "open"), "open");
        assert_eq!(format_value("assignee", "Ana Lima"), "Ana Lima");
        assert_eq!(format_value("assignee", "team: ops"), "\"team: ops\"");
        assert_eq!(format_value("assignee", "[x]"), "\"[x]\"");
    }

    #[test]
    fn crlf_line_endings_preserved() {
        let doc = "---\r\nstatus: open\r\n---\r\nbody\r\n";
        assert_eq!(
            edited(set_field(doc, "status", "done")),
            "---\r\nstatus: done\r\n---\r\nbody\r\n"
        );
        assert_eq!(
            edited(set_field(doc, "area", "home")),
            "---\r\nstatus: open\r\narea: \"home\"\r\n---\r\nbody\r\n"
        );
    }

    #[test]
    fn set_tags_rewrites_list_and_keeps_other_lists() {
        let tags = vec!["task".to_string(), "urgent".to_string(), "task".to_string()];
        let out = set_tags(DOC, &tags).unwrap();
        let expected = DOC
            .replace("tags:\n  - task\n  - work\n", "")
            .replace(
                "due_date: 2025-02-01\n---",
                "due_date: 2025-02-01\ntags:\n  - task\n  - urgent\n  - task\n---",
            );
        assert_eq!(out, expected);
        assert!(out.contains("aliases:\n  - report\n"));
    }

    #[test]
    fn set_tags_empty_removes_field() {
        let out = set_tags(DOC, &[]).unwrap();
        assert!(!out.contains("tags:"));
        assert!(!out.contains("  - work"));
        assert!(out.contains("  - report"));
    }

    #[test]
    fn set_tags_flow_style_line_is_replaced() {
        let doc = "---\ntags: [a, b]\ntask_id: 1\n---\n";
        let out = set_tags(doc, &["c".to_string()]).unwrap();
        assert_eq!(out, "---\ntask_id: 1\ntags:\n  - c\n---\n");
    }

    #[test]
    fn set_tags_unclosed_is_an_error() {
        let doc = "---\ntags:\n  - a\nnot yaml at all\n";
        assert!(matches!(
            set_tags(doc, &["b".to_string()]),
            Err(MetadataError::Unclosed)
        ));
    }

    #[test]
    fn set_tags_without_block() {
        assert_eq!(set_tags("body\n", &[]).unwrap(), "body\n");
        assert_eq!(
            set_tags("body\n", &["x".to_string()]).unwrap(),
            "---\ntags:\n  - x\n---\nbody\n"
        );
    }

    #[test]
    fn leading_indicators_are_quoted() {
        for value in ["@bob", "*ops", "- x", "? x", "%x", "`x`", "&a", "!x", ",x"] {
            assert_eq!(
                field_line("assignee", value),
                format!("assignee: \"{}\"", value)
            );
        }
        assert_eq!(field_line("assignee", "bob@home"), "assignee: bob@home");
        assert_eq!(
            tags_block(&["@home".to_string(), "work".to_string()], "\n"),
            "tags:\n  - \"@home\"\n  - work\n"
        );
    }
}
