//! Interface body cleaning.
//!
//! The scanner captures interface bodies verbatim; this pass strips
//! inline comments, normalizes member terminators to `;`, rewrites
//! parameter defaults in method signatures to optional markers, and
//! re-indents the block to a two-space base. Structural `{` / `}` lines
//! pass through untouched.

use crate::params;
use dtsr_common::Cursor;

/// Clean a braced block (outer braces included) into normalized form.
pub(crate) fn clean_block(braced: &str) -> String {
    let inner = braced
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .unwrap_or(braced);
    if inner.trim().is_empty() {
        return "{}".to_string();
    }

    let mut cleaned: Vec<(usize, String)> = Vec::new();
    for line in inner.lines() {
        let line = strip_inline_comments(line);
        let body = line.trim();
        if body.is_empty() {
            continue;
        }
        let indent = line.len() - line.trim_start().len();
        cleaned.push((indent, body.to_string()));
    }
    if cleaned.is_empty() {
        return "{}".to_string();
    }

    let min_indent = cleaned.iter().map(|(i, _)| *i).min().unwrap_or(0);
    let mut out = String::from("{\n");
    for (indent, body) in &cleaned {
        let body = convert_param_defaults(body);
        let body = normalize_terminator(&body);
        let extra = indent.saturating_sub(min_indent);
        for _ in 0..(2 + extra) {
            out.push(' ');
        }
        out.push_str(&body);
        out.push('\n');
    }
    out.push('}');
    out
}

/// Remove `// ...` and single-line `/* ... */` comments from a line,
/// leaving string contents alone.
fn strip_inline_comments(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut cur = Cursor::new(line);
    while let Some(b) = cur.peek() {
        match b {
            b'\'' | b'"' | b'`' => {
                let start = cur.pos;
                if b == b'`' {
                    cur.skip_template_literal();
                } else {
                    cur.skip_string(b);
                }
                out.push_str(cur.slice(start, cur.pos));
            }
            b'/' if cur.peek_at(1) == Some(b'/') => break,
            b'/' if cur.peek_at(1) == Some(b'*') => {
                cur.skip_block_comment();
            }
            _ => {
                let start = cur.pos;
                cur.pos += 1;
                out.push_str(cur.slice(start, cur.pos));
            }
        }
    }
    out
}

/// Rewrite parameter defaults inside the first parenthesized group of a
/// member line to optional markers.
fn convert_param_defaults(line: &str) -> String {
    if !line.contains('=') {
        return line.to_string();
    }
    let Some(open) = line.find('(') else {
        return line.to_string();
    };
    let mut cur = Cursor::new(&line[open..]);
    let close = cur.find_matching_close(b'(', b')');
    if close < 2 {
        return line.to_string();
    }
    let inner = &line[open + 1..open + close - 1];
    if !inner.contains('=') {
        return line.to_string();
    }
    format!(
        "{}({}){}",
        &line[..open],
        params::rebuild_params(inner),
        &line[open + close..]
    )
}

/// Normalize a member line's terminator to `;`. Structural brace lines
/// and continuation lines are preserved verbatim.
fn normalize_terminator(body: &str) -> String {
    let t = body.trim_end();
    if t == "{" || t == "}" || t == "};" {
        return t.to_string();
    }
    if let Some(stripped) = t.strip_suffix(',') {
        return format!("{};", stripped.trim_end());
    }
    if t.ends_with([';', '{', '(', '<', '|', '&', '=', ':', '>']) {
        return t.to_string();
    }
    if t.starts_with('}') {
        return t.to_string();
    }
    format!("{t};")
}
