//! Function-expression shaping for the inference engine.
//!
//! Arrow functions and `function` expressions render as function-type
//! signatures. Block bodies infer an `unknown` return; expression bodies
//! recurse; `async` wraps the inferred return in `Promise<...>`. Very
//! long or deeply arrowed expressions collapse to `(...args: any[]) => any`
//! (the thresholds are part of the emission contract).

use super::{Container, Ctx, Inferred, contains_word_naive, infer, strip_leading_word};
use crate::params;
use dtsr_common::Cursor;
use dtsr_common::limits::{
    FN_COLLAPSE_ANGLES, FN_COLLAPSE_ARROWS, FN_COLLAPSE_LEN, FN_COLLAPSE_LEN_WITH_ARROWS,
};

struct FnShape<'s> {
    generics: &'s str,
    params_raw: &'s str,
    explicit_ret: Option<&'s str>,
    body: &'s str,
}

pub(super) fn infer_function(
    expr: &str,
    _is_const: bool,
    in_union: bool,
    depth: usize,
) -> Option<Inferred> {
    let s = expr.trim();
    let (rest, is_async) = strip_leading_word(s, "async");

    let shape = parse_function_keyword(rest).or_else(|| parse_arrow(rest))?;

    let arrows = s.matches("=>").count();
    let angles = s.bytes().filter(|b| *b == b'<').count();
    if s.len() > FN_COLLAPSE_LEN
        || (s.len() > FN_COLLAPSE_LEN_WITH_ARROWS && arrows > FN_COLLAPSE_ARROWS)
        || angles > FN_COLLAPSE_ANGLES
    {
        return Some(Inferred::new("(...args: any[]) => any", None));
    }

    let ret = match shape.explicit_ret {
        Some(r) if !r.trim().is_empty() => r.trim().to_string(),
        _ => {
            let body = shape.body.trim();
            let inferred = if body.is_empty() || body.starts_with('{') || in_union {
                "unknown".to_string()
            } else if let Some(inner) = infer_function(body, false, false, depth + 1) {
                // Higher-order body: reconstruct the outer shape, preferring
                // `T` when the generics list declares one.
                let mut t = inner.ty;
                if t.ends_with("=> unknown") && contains_word_naive(shape.generics, "T") {
                    t.truncate(t.len() - "unknown".len());
                    t.push('T');
                }
                t
            } else {
                infer(
                    body,
                    Ctx {
                        is_const: false,
                        in_union: false,
                        depth: depth + 1,
                        container: Container::None,
                    },
                )
                .ty
            };
            if is_async {
                format!("Promise<{inferred}>")
            } else {
                inferred
            }
        }
    };

    let cleaned = params::rebuild_params(shape.params_raw);
    Some(Inferred::new(
        format!("{}({cleaned}) => {ret}", shape.generics),
        None,
    ))
}

/// `function [*] [name] [<G>] (params) [: ret] { body }`
fn parse_function_keyword(rest: &str) -> Option<FnShape<'_>> {
    let after = rest.strip_prefix("function")?;
    if !after.starts_with([' ', '\t', '\n', '(', '*']) {
        return None;
    }
    let mut cur = Cursor::new(after);
    cur.skip_whitespace_and_comments();
    if cur.peek() == Some(b'*') {
        cur.pos += 1;
        cur.skip_whitespace_and_comments();
    }
    cur.read_ident();
    cur.skip_whitespace_and_comments();
    let generics = read_generics_slice(after, &mut cur);
    cur.skip_whitespace_and_comments();
    if cur.peek() != Some(b'(') {
        return None;
    }
    let ps = cur.pos;
    cur.find_matching_close(b'(', b')');
    let params_raw = &after[ps + 1..cur.pos - 1];
    cur.skip_whitespace_and_comments();
    let mut explicit_ret = None;
    if cur.peek() == Some(b':') {
        cur.pos += 1;
        let (stop, ty) = read_type_until_brace(after, cur.pos);
        explicit_ret = Some(ty);
        cur.pos = stop;
    }
    Some(FnShape {
        generics,
        params_raw,
        explicit_ret,
        body: "{",
    })
}

/// `[<G>] (params) [: ret] => body` or `ident => body`
fn parse_arrow(rest: &str) -> Option<FnShape<'_>> {
    let mut cur = Cursor::new(rest);
    let generics = read_generics_slice(rest, &mut cur);
    cur.skip_whitespace_and_comments();

    let params_raw: &str;
    if cur.peek() == Some(b'(') {
        let ps = cur.pos;
        cur.find_matching_close(b'(', b')');
        params_raw = &rest[ps + 1..cur.pos - 1];
    } else {
        let start = cur.pos;
        let id = cur.read_ident();
        if id.is_empty() {
            return None;
        }
        params_raw = &rest[start..cur.pos];
    }
    cur.skip_whitespace_and_comments();

    let mut explicit_ret = None;
    if cur.peek() == Some(b':') {
        cur.pos += 1;
        let tstart = cur.pos;
        let arrow = find_top_level_arrow(rest, tstart)?;
        explicit_ret = Some(&rest[tstart..arrow]);
        cur.pos = arrow;
    }
    if !(cur.peek() == Some(b'=') && cur.peek_at(1) == Some(b'>')) {
        return None;
    }
    cur.pos += 2;
    let body = &rest[cur.pos.min(rest.len())..];
    Some(FnShape {
        generics,
        params_raw,
        explicit_ret,
        body,
    })
}

/// Object-literal method head: `[<G>] (params) [: ret] { body }` rendered
/// as a function-type signature with an `unknown` (or `Promise<unknown>`)
/// return when the source omits one.
pub(super) fn method_signature(rest: &str, is_async: bool) -> Option<String> {
    let mut cur = Cursor::new(rest);
    let generics = read_generics_slice(rest, &mut cur);
    cur.skip_whitespace_and_comments();
    if cur.peek() != Some(b'(') {
        return None;
    }
    let ps = cur.pos;
    cur.find_matching_close(b'(', b')');
    let cleaned = params::rebuild_params(&rest[ps + 1..cur.pos - 1]);
    cur.skip_whitespace_and_comments();

    let mut ret = if is_async {
        "Promise<unknown>".to_string()
    } else {
        "unknown".to_string()
    };
    if cur.peek() == Some(b':') {
        cur.pos += 1;
        let (_, ty) = read_type_until_brace(rest, cur.pos);
        let ty = ty.trim();
        if !ty.is_empty() {
            ret = ty.to_string();
        }
    }
    Some(format!("{generics}({cleaned}) => {ret}"))
}

fn read_generics_slice<'s>(src: &'s str, cur: &mut Cursor<'_>) -> &'s str {
    if cur.peek() == Some(b'<') {
        let start = cur.pos;
        cur.find_matching_close(b'<', b'>');
        &src[start..cur.pos]
    } else {
        ""
    }
}

/// Read a type from `from` up to the first `{` at depth zero (or end of
/// input). Returns the stop offset and the trimmed type text.
fn read_type_until_brace(src: &str, from: usize) -> (usize, &str) {
    let mut cur = Cursor::new(src);
    cur.pos = from;
    while let Some(b) = cur.peek() {
        match b {
            b'\'' | b'"' => cur.skip_string(b),
            b'`' => cur.skip_template_literal(),
            b'(' => {
                cur.find_matching_close(b'(', b')');
            }
            b'[' => {
                cur.find_matching_close(b'[', b']');
            }
            b'<' => {
                cur.find_matching_close(b'<', b'>');
            }
            b'{' => break,
            _ => cur.pos += 1,
        }
    }
    (cur.pos, src[from..cur.pos].trim())
}

/// Find a top-level `=>` starting at `from`, skipping balanced groups.
fn find_top_level_arrow(src: &str, from: usize) -> Option<usize> {
    let mut cur = Cursor::new(src);
    cur.pos = from;
    while let Some(b) = cur.peek() {
        match b {
            b'\'' | b'"' => cur.skip_string(b),
            b'`' => cur.skip_template_literal(),
            b'(' => {
                cur.find_matching_close(b'(', b')');
            }
            b'[' => {
                cur.find_matching_close(b'[', b']');
            }
            b'{' => {
                cur.find_matching_close(b'{', b'}');
            }
            b'=' if cur.peek_at(1) == Some(b'>') => return Some(cur.pos),
            _ => cur.pos += 1,
        }
    }
    None
}
