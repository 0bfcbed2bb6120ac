//! DTS-safe parameter list rebuilding.
//!
//! A declaration file permits no default values, no decorators, no
//! constructor modifiers, and no destructuring defaults in parameter
//! positions. This module reshapes a raw source parameter list into that
//! form: `name[?]: type` or `...name: type` per parameter, with defaults
//! rewritten to optional markers and types inferred from default literals
//! when the source omits an annotation.

use dtsr_common::Cursor;
use dtsr_common::cursor::is_ident_char;

const PARAM_MODIFIERS: &[&str] = &["public", "private", "protected", "readonly", "override"];

/// Split `s` at top-level occurrences of `sep`, ignoring separators inside
/// strings, `()`, `[]`, `{}`, and `<>` pairs. `=>` is not a close angle.
pub fn split_top_level(s: &str, sep: u8) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut cur = Cursor::new(s);
    let mut depth_paren = 0i32;
    let mut depth_square = 0i32;
    let mut depth_brace = 0i32;
    let mut depth_angle = 0i32;
    let mut start = 0usize;

    while let Some(b) = cur.peek() {
        match b {
            b'\'' | b'"' => {
                cur.skip_string(b);
                continue;
            }
            b'`' => {
                cur.skip_template_literal();
                continue;
            }
            b'/' if cur.peek_at(1) == Some(b'/') => {
                cur.skip_line_comment();
                continue;
            }
            b'/' if cur.peek_at(1) == Some(b'*') => {
                cur.skip_block_comment();
                continue;
            }
            b'(' => depth_paren += 1,
            b')' => depth_paren -= 1,
            b'[' => depth_square += 1,
            b']' => depth_square -= 1,
            b'{' => depth_brace += 1,
            b'}' => depth_brace -= 1,
            b'<' => depth_angle += 1,
            b'>' => {
                // `=>` does not close an angle pair.
                if cur.pos == 0 || s.as_bytes()[cur.pos - 1] != b'=' {
                    depth_angle = (depth_angle - 1).max(0);
                }
            }
            _ => {}
        }
        if b == sep
            && depth_paren == 0
            && depth_square == 0
            && depth_brace == 0
            && depth_angle == 0
        {
            parts.push(&s[start..cur.pos]);
            start = cur.pos + 1;
        }
        cur.pos += 1;
    }
    parts.push(&s[start..]);
    parts
}

/// Find the first top-level `:` in a parameter (not inside brackets or
/// strings). Returns the byte offset.
fn find_top_level_colon(s: &str) -> Option<usize> {
    find_top_level(s, |bytes, i| {
        bytes[i] == b':' && bytes.get(i + 1) != Some(&b':')
    })
}

/// Find the first top-level `=` that is not part of `==`, `=>`, `<=`,
/// `>=`, or `!=`.
fn find_top_level_eq(s: &str) -> Option<usize> {
    find_top_level(s, |bytes, i| {
        bytes[i] == b'='
            && bytes.get(i + 1) != Some(&b'=')
            && bytes.get(i + 1) != Some(&b'>')
            && (i == 0 || !matches!(bytes[i - 1], b'=' | b'<' | b'>' | b'!'))
    })
}

fn find_top_level(s: &str, pred: impl Fn(&[u8], usize) -> bool) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut cur = Cursor::new(s);
    let mut depth = 0i32;
    while let Some(b) = cur.peek() {
        match b {
            b'\'' | b'"' => {
                cur.skip_string(b);
                continue;
            }
            b'`' => {
                cur.skip_template_literal();
                continue;
            }
            b'(' | b'[' | b'{' | b'<' => depth += 1,
            b')' | b']' | b'}' => depth = (depth - 1).max(0),
            b'>' => {
                if cur.pos == 0 || bytes[cur.pos - 1] != b'=' {
                    depth = (depth - 1).max(0);
                }
            }
            _ => {
                if depth == 0 && pred(bytes, cur.pos) {
                    return Some(cur.pos);
                }
            }
        }
        cur.pos += 1;
    }
    None
}

/// Infer a parameter type from its default-value literal.
pub fn type_from_default(default: &str) -> &'static str {
    let d = default.trim();
    if d == "true" || d == "false" {
        return "boolean";
    }
    if d.starts_with('\'') || d.starts_with('"') || d.starts_with('`') {
        return "string";
    }
    if d.starts_with('[') {
        return "unknown[]";
    }
    if d.starts_with('{') {
        return "Record<string, unknown>";
    }
    if is_numeric_literal(d) {
        return "number";
    }
    "unknown"
}

pub fn is_numeric_literal(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);
    if s.is_empty() {
        return false;
    }
    let bytes = s.as_bytes();
    if !bytes[0].is_ascii_digit() && bytes[0] != b'.' {
        return false;
    }
    s.bytes().all(|b| {
        b.is_ascii_hexdigit()
            || matches!(b, b'.' | b'_' | b'x' | b'o' | b'b' | b'e' | b'E' | b'+' | b'-')
    })
}

/// Fast path: a parameter list with no newlines, at least one `:` per
/// comma-delimited slot, and none of `{`, `[`, `=`, `@`, `...`, or a
/// modifier keyword needs no rebuilding.
fn fast_path_ok(raw: &str) -> bool {
    if raw.contains('\n')
        || raw.contains('{')
        || raw.contains('[')
        || raw.contains('=')
        || raw.contains('@')
        || raw.contains("...")
    {
        return false;
    }
    if PARAM_MODIFIERS.iter().any(|m| contains_keyword(raw, m)) {
        return false;
    }
    split_top_level(raw, b',')
        .iter()
        .all(|slot| slot.contains(':'))
}

fn contains_keyword(s: &str, word: &str) -> bool {
    let bytes = s.as_bytes();
    let mut from = 0;
    while let Some(idx) = s[from..].find(word) {
        let at = from + idx;
        let left_ok = at == 0 || !is_ident_char(bytes[at - 1]);
        let end = at + word.len();
        let right_ok = end == bytes.len() || !is_ident_char(bytes[end]);
        if left_ok && right_ok {
            return true;
        }
        from = at + word.len();
    }
    false
}

/// Rebuild a raw parameter list into DTS-safe form.
pub fn rebuild_params(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if fast_path_ok(trimmed) {
        return trimmed.to_string();
    }
    split_top_level(trimmed, b',')
        .iter()
        .filter_map(|p| rebuild_param(p))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Strip leading decorators (`@dec` or `@dec(...)`) from a parameter.
fn strip_decorators(p: &str) -> &str {
    let mut s = p.trim_start();
    while s.starts_with('@') {
        let mut cur = Cursor::new(s);
        cur.pos += 1;
        cur.read_ident();
        // Dotted decorator paths and call arguments.
        while cur.peek() == Some(b'.') {
            cur.pos += 1;
            cur.read_ident();
        }
        if cur.peek() == Some(b'(') {
            cur.find_matching_close(b'(', b')');
        }
        s = s[cur.pos..].trim_start();
    }
    s
}

/// Strip leading TypeScript parameter modifiers. Returns the stripped
/// text and the list of modifiers found.
fn strip_modifiers(p: &str) -> (&str, Vec<&'static str>) {
    let mut s = p.trim_start();
    let mut found = Vec::new();
    'outer: loop {
        for m in PARAM_MODIFIERS {
            if let Some(rest) = s.strip_prefix(m) {
                if rest.starts_with([' ', '\t', '\n', '\r']) {
                    found.push(*m);
                    s = rest.trim_start();
                    continue 'outer;
                }
            }
        }
        break;
    }
    (s, found)
}

/// Rebuild a single parameter. Returns `None` for empty slots.
pub fn rebuild_param(p: &str) -> Option<String> {
    let s = strip_decorators(p.trim());
    let (s, _mods) = strip_modifiers(s);
    if s.is_empty() {
        return None;
    }

    let (is_rest, s) = match s.strip_prefix("...") {
        Some(rest) => (true, rest.trim_start()),
        None => (false, s),
    };

    if s.starts_with('{') || s.starts_with('[') {
        return Some(rebuild_destructured(s, is_rest));
    }

    let colon = find_top_level_colon(s);
    let eq = find_top_level_eq(s);

    let name_end = colon.or(eq).unwrap_or(s.len());
    let mut name = s[..name_end].trim().to_string();
    let had_question = name.ends_with('?');
    if had_question {
        name.pop();
        name = name.trim_end().to_string();
    }

    let ty: String = match (colon, eq) {
        (Some(c), Some(e)) if e > c => s[c + 1..e].trim().to_string(),
        (Some(c), _) => s[c + 1..].trim().to_string(),
        (None, Some(e)) => type_from_default(&s[e + 1..]).to_string(),
        (None, None) => String::new(),
    };

    let optional = !is_rest && (had_question || eq.is_some());
    let marker = if optional { "?" } else { "" };
    let rest = if is_rest { "..." } else { "" };

    if ty.is_empty() {
        return Some(format!("{rest}{name}{marker}"));
    }
    Some(format!("{rest}{name}{marker}: {ty}"))
}

/// Lift a constructor parameter property into an explicit member
/// declaration. Returns `None` for plain parameters and for `private`
/// parameter properties (those are dropped from the member list).
pub fn param_property(p: &str) -> Option<String> {
    let s = strip_decorators(p.trim());
    let (rest, mods) = strip_modifiers(s);
    let lifts = mods
        .iter()
        .any(|m| matches!(*m, "public" | "protected" | "readonly"));
    if !lifts || mods.contains(&"private") {
        return None;
    }
    let rebuilt = rebuild_param(rest)?;
    let mut prefix = String::new();
    if mods.contains(&"protected") {
        prefix.push_str("protected ");
    }
    if mods.contains(&"readonly") {
        prefix.push_str("readonly ");
    }
    Some(format!("{prefix}{rebuilt};"))
}

/// Destructured parameter names are preserved as text, but internal
/// defaults and rest operators are stripped, and multi-line patterns are
/// re-indented to a two-space base.
fn rebuild_destructured(s: &str, is_rest: bool) -> String {
    let (open, close) = if s.starts_with('{') {
        (b'{', b'}')
    } else {
        (b'[', b']')
    };
    let mut cur = Cursor::new(s);
    let pattern_end = cur.find_matching_close(open, close);
    let pattern = clean_destructure_pattern(&s[..pattern_end]);

    let after = s[pattern_end..].trim();
    let colon = after.strip_prefix(':');
    let (ty, has_default) = match colon {
        Some(rest) => {
            let rest = rest.trim();
            match find_top_level_eq(rest) {
                Some(e) => (rest[..e].trim().to_string(), true),
                None => (rest.to_string(), false),
            }
        }
        None => {
            let has_default = after.starts_with('=');
            let ty = if has_default {
                type_from_default(after[1..].trim()).to_string()
            } else {
                String::new()
            };
            (ty, has_default)
        }
    };

    let marker = if has_default && !is_rest { "?" } else { "" };
    let rest_prefix = if is_rest { "..." } else { "" };
    if ty.is_empty() {
        format!("{rest_prefix}{pattern}{marker}")
    } else {
        format!("{rest_prefix}{pattern}{marker}: {ty}")
    }
}

/// Remove `= default` segments and `...` rest markers inside a
/// destructuring pattern, preserving the binding names.
fn clean_destructure_pattern(pattern: &str) -> String {
    let mut out: Vec<u8> = Vec::with_capacity(pattern.len());
    let mut cur = Cursor::new(pattern);
    while let Some(b) = cur.peek() {
        match b {
            b'\'' | b'"' => {
                let start = cur.pos;
                cur.skip_string(b);
                out.extend_from_slice(cur.slice(start, cur.pos).as_bytes());
            }
            b'.' if cur.starts_with("...") => {
                cur.pos += 3;
            }
            b'=' if cur.peek_at(1) != Some(b'>') && cur.peek_at(1) != Some(b'=') => {
                // Skip the default expression up to the next `,` or close
                // bracket at this level.
                cur.pos += 1;
                let mut depth = 0i32;
                while let Some(d) = cur.peek() {
                    match d {
                        b'\'' | b'"' => {
                            cur.skip_string(d);
                            continue;
                        }
                        b'`' => {
                            cur.skip_template_literal();
                            continue;
                        }
                        b'(' | b'[' | b'{' => depth += 1,
                        b')' | b']' | b'}' => {
                            if depth == 0 {
                                break;
                            }
                            depth -= 1;
                        }
                        b',' if depth == 0 => break,
                        _ => {}
                    }
                    cur.pos += 1;
                }
                // Drop trailing whitespace left before the default.
                while out.last() == Some(&b' ') || out.last() == Some(&b'\t') {
                    out.pop();
                }
            }
            _ => {
                out.push(b);
                cur.pos += 1;
            }
        }
    }
    // Only ASCII-delimited spans were removed, so the bytes are still
    // valid UTF-8.
    let out = String::from_utf8(out).unwrap_or_else(|e| {
        String::from_utf8_lossy(e.as_bytes()).into_owned()
    });
    if out.contains('\n') {
        reindent_two_space(&out)
    } else {
        out
    }
}

/// Re-indent a multi-line pattern to a two-space base.
fn reindent_two_space(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push('\n');
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                if trimmed.starts_with('}') || trimmed.starts_with(']') {
                    out.push_str(trimmed);
                } else {
                    out.push_str("  ");
                    out.push_str(trimmed);
                }
                continue;
            }
        }
        if i == 0 {
            out.push_str(line.trim_end());
        }
    }
    out
}

#[cfg(test)]
#[path = "tests/params.rs"]
mod tests;
