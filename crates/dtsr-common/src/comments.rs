//! Comment collection and JSDoc utilities.
//!
//! Comments are not declarations, so the scanner collects them separately
//! while skipping trivia and attaches them to the declaration that
//! follows. A blank line between a comment run and the next code detaches
//! the run. Triple-slash lines are never attached; the directive extractor
//! owns those.

use crate::cursor::Cursor;

/// Check if a comment block is a JSDoc comment.
pub fn is_jsdoc(comment: &str) -> bool {
    comment.starts_with("/**") && !comment.starts_with("/***")
}

/// Check if any collected comment block already carries a `@defaultValue`
/// tag. Generated tags are suppressed in that case.
pub fn has_default_value_tag(comments: &[String]) -> bool {
    comments.iter().any(|c| c.contains("@defaultValue"))
}

/// Skip whitespace and comments at the cursor, collecting the comment
/// blocks that should attach to the next declaration. A blank line (two
/// or more newlines) between a collected run and what follows drops the
/// run. When `keep` is false the trivia is skipped and nothing is
/// collected.
pub fn collect_leading_comments(cur: &mut Cursor<'_>, keep: bool) -> Vec<String> {
    if !keep {
        cur.skip_whitespace_and_comments();
        return Vec::new();
    }

    let mut out: Vec<String> = Vec::new();
    let mut newlines = 0usize;
    loop {
        match cur.peek() {
            Some(b'\n') => {
                newlines += 1;
                cur.pos += 1;
            }
            Some(b' ' | b'\t' | b'\r') => {
                cur.pos += 1;
            }
            Some(b'/') if cur.peek_at(1) == Some(b'/') => {
                if newlines >= 2 {
                    out.clear();
                }
                newlines = 0;
                let start = cur.pos;
                cur.skip_line_comment();
                let text = cur.slice(start, cur.pos);
                // Triple-slash lines belong to the directive extractor.
                if !text.starts_with("///") {
                    out.push(text.to_string());
                }
            }
            Some(b'/') if cur.peek_at(1) == Some(b'*') => {
                if newlines >= 2 {
                    out.clear();
                }
                newlines = 0;
                let start = cur.pos;
                cur.skip_block_comment();
                out.push(cur.slice(start, cur.pos).to_string());
            }
            _ => break,
        }
    }
    if newlines >= 2 {
        out.clear();
    }
    out
}

/// Render a generated `@defaultValue` payload as a JSDoc block, merging it
/// into the trailing JSDoc comment of `comments` when one exists.
/// Multi-line payloads are emitted inside a fenced code block.
pub fn attach_default_value(comments: &mut Vec<String>, payload: &str) {
    let tag_lines: Vec<String> = if payload.contains('\n') {
        let mut lines = vec![" * @defaultValue".to_string(), " * ```ts".to_string()];
        for line in payload.lines() {
            lines.push(format!(" * {line}"));
        }
        lines.push(" * ```".to_string());
        lines
    } else {
        vec![format!(" * @defaultValue {payload}")]
    };

    if let Some(last) = comments.last_mut() {
        if is_jsdoc(last) && last.ends_with("*/") {
            // Insert before the closing delimiter of the existing block.
            let body = last[..last.len() - 2].trim_end();
            let mut merged = if body.contains('\n') {
                body.to_string()
            } else {
                // Single-line JSDoc: re-open it as a block.
                let inner = body.trim_start_matches("/**").trim();
                if inner.is_empty() {
                    "/**".to_string()
                } else {
                    format!("/**\n * {inner}")
                }
            };
            for line in &tag_lines {
                merged.push('\n');
                merged.push_str(line);
            }
            merged.push_str("\n */");
            *last = merged;
            return;
        }
    }

    let mut block = String::from("/**");
    for line in &tag_lines {
        block.push('\n');
        block.push_str(line);
    }
    block.push_str("\n */");
    comments.push(block);
}
