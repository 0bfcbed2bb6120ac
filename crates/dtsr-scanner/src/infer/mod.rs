//! Initializer type inference.
//!
//! Given the trimmed initializer expression of a `const`/`let`/`var` or
//! class property, produce a declaration-file type string and, for
//! widened containers, a clean `@defaultValue` payload. Inference is
//! best-effort and bottoms out at `unknown`; no expression is ever
//! evaluated and no runtime construct leaks into the emitted type.
//!
//! Collection literals are parsed once and each shape renders in its own
//! branch; anything unrecognized is carried as an opaque fallback that
//! infers to `unknown`.

mod functions;

use dtsr_common::Cursor;
use dtsr_common::cursor::is_ident_char;
use dtsr_common::limits::{MAX_INFER_DEPTH, TUPLE_LITERAL_MAX};

use crate::params::{is_numeric_literal, split_top_level};

/// An inference result: the type text plus the clean default payload
/// (when the expression is representable without runtime constructs).
pub struct Inferred {
    pub ty: String,
    pub clean: Option<String>,
}

impl Inferred {
    fn new(ty: impl Into<String>, clean: Option<String>) -> Self {
        Inferred {
            ty: ty.into(),
            clean,
        }
    }

    fn opaque() -> Self {
        Inferred::new("unknown", None)
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Container {
    None,
    Object,
    Array,
}

#[derive(Clone, Copy)]
struct Ctx {
    is_const: bool,
    in_union: bool,
    depth: usize,
    container: Container,
}

impl Ctx {
    fn child(self, container: Container, is_const: bool, in_union: bool) -> Ctx {
        Ctx {
            is_const,
            in_union,
            depth: self.depth + 1,
            container,
        }
    }
}

/// Infer the declaration-file type of a variable or property initializer.
pub fn infer_value(expr: &str, is_const: bool) -> Inferred {
    infer(
        expr,
        Ctx {
            is_const,
            in_union: false,
            depth: 0,
            container: Container::None,
        },
    )
}

/// A "generic" explicit annotation is broad enough that inference may
/// replace it with a narrower type: `any`, `object`, `unknown`,
/// `Record<...>`, `Array<...>`, or an object type led by an index
/// signature.
pub fn is_generic_annotation(ann: &str) -> bool {
    let a = ann.trim();
    if a == "any" || a == "object" || a == "unknown" {
        return true;
    }
    if a.starts_with("Record<") || a.starts_with("Array<") {
        return true;
    }
    if let Some(rest) = a.strip_prefix('{') {
        return rest.trim_start().starts_with('[');
    }
    false
}

/// Whether an inferred type is actually narrower than a generic
/// annotation (the inference bottoms are not).
pub fn is_narrower(ty: &str) -> bool {
    !matches!(ty, "unknown" | "Record<string, unknown>" | "unknown[]" | "{}")
}

/// Strip `as const` and `satisfies T` wrappers from an initializer.
/// Returns the stripped expression and whether an `as const` was present.
pub fn strip_wrappers(expr: &str) -> (String, bool) {
    let mut v = expr.trim().to_string();
    let mut asserted = false;
    loop {
        if let Some(stripped) = strip_trailing_as_const(&v) {
            v = stripped.trim().to_string();
            asserted = true;
            continue;
        }
        if let Some(idx) = find_top_level_satisfies(&v) {
            v = v[..idx].trim().to_string();
            continue;
        }
        break;
    }
    (v, asserted)
}

/// Strip a trailing `as const` (word-boundary checked). Returns the
/// remaining prefix.
pub fn strip_trailing_as_const(s: &str) -> Option<&str> {
    let t = s.trim_end();
    let without_const = t.strip_suffix("const")?;
    if !without_const.ends_with(char::is_whitespace) {
        return None;
    }
    let without_ws = without_const.trim_end();
    let without_as = without_ws.strip_suffix("as")?;
    if !without_as.is_empty()
        && !without_as.ends_with(char::is_whitespace)
        && !without_as.ends_with([')', ']', '}', '\'', '"', '`'])
    {
        return None;
    }
    Some(without_as)
}

/// Find the last top-level ` satisfies ` keyword in an expression.
pub fn find_top_level_satisfies(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut cur = Cursor::new(s);
    let mut depth = 0i32;
    let mut found = None;
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
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = (depth - 1).max(0),
            _ => {
                if depth == 0
                    && cur.peek_word("satisfies")
                    && cur.pos > 0
                    && !is_ident_char(bytes[cur.pos - 1])
                {
                    found = Some(cur.pos);
                }
            }
        }
        cur.pos += 1;
    }
    found
}

fn depth_fallback(container: Container) -> &'static str {
    match container {
        Container::Object => "Record<string, unknown>",
        Container::Array => "unknown[]",
        Container::None => "unknown",
    }
}

fn infer(expr: &str, ctx: Ctx) -> Inferred {
    let s = expr.trim();
    if s.is_empty() {
        return Inferred::opaque();
    }
    if ctx.depth > MAX_INFER_DEPTH {
        return Inferred::new(depth_fallback(ctx.container), None);
    }

    // Guard words that defeat literal inference outright.
    if s.starts_with("BigInt(") {
        return Inferred::new("bigint", None);
    }
    if s.starts_with("Symbol.for(") {
        return Inferred::new("symbol", None);
    }
    if is_tagged_template(s) {
        return Inferred::new("string", None);
    }

    if let Some(lit) = string_literal(s) {
        let ty = if ctx.is_const { lit } else { "string" };
        return Inferred::new(ty, Some(lit.to_string()));
    }
    if let Some(template) = template_literal(s) {
        if template.interpolated {
            return Inferred::new("string", None);
        }
        let ty = if ctx.is_const { s } else { "string" };
        return Inferred::new(ty, Some(s.to_string()));
    }

    if s == "true" || s == "false" {
        let ty = if ctx.is_const { s } else { "boolean" };
        return Inferred::new(ty, Some(s.to_string()));
    }
    if s == "null" || s == "undefined" {
        return Inferred::new(s, Some(s.to_string()));
    }
    if let Some(digits) = s.strip_suffix('n') {
        if is_numeric_literal(digits) {
            let ty = if ctx.is_const { s } else { "bigint" };
            return Inferred::new(ty, Some(s.to_string()));
        }
    }
    if is_numeric_literal(s) {
        let ty = if ctx.is_const { s } else { "number" };
        return Inferred::new(ty, Some(s.to_string()));
    }

    if let Some(inner) = balanced_inner(s, b'[', b']') {
        return infer_array(inner, s, ctx);
    }
    if let Some(inner) = balanced_inner(s, b'{', b'}') {
        return infer_object(inner, ctx);
    }

    if starts_with_word(s, "new") {
        return infer_new(s);
    }

    if let Some(func) = functions::infer_function(s, ctx.is_const, ctx.in_union, ctx.depth) {
        return func;
    }

    if let Some(stripped) = strip_trailing_as_const(s) {
        let mut inner = infer(
            stripped,
            Ctx {
                is_const: true,
                ..ctx
            },
        );
        // `as const` subtrees never contribute a clean default.
        inner.clean = None;
        return inner;
    }

    if let Some(arg) = call_argument(s, "Promise.resolve") {
        if arg.trim().is_empty() {
            return Inferred::new("Promise<void>", None);
        }
        let inner = infer(arg, ctx.child(Container::None, false, false));
        return Inferred::new(format!("Promise<{}>", inner.ty), None);
    }
    if call_argument(s, "Promise.reject").is_some() {
        return Inferred::new("Promise<never>", None);
    }
    if let Some(arg) = call_argument(s, "Promise.all") {
        let arg = arg.trim();
        if let Some(inner) = balanced_inner(arg, b'[', b']') {
            let tys: Vec<String> = split_top_level(inner, b',')
                .iter()
                .filter(|e| !e.trim().is_empty())
                .map(|e| infer(e, ctx.child(Container::Array, false, false)).ty)
                .collect();
            return Inferred::new(format!("Promise<[{}]>", tys.join(", ")), None);
        }
        return Inferred::new("Promise<unknown>", None);
    }

    if starts_with_word(s, "await") {
        return Inferred::opaque();
    }

    Inferred::opaque()
}

// ----------------------------------------------------------------------
// Arrays
// ----------------------------------------------------------------------

fn infer_array(inner: &str, raw: &str, ctx: Ctx) -> Inferred {
    let elems: Vec<&str> = split_top_level(inner, b',')
        .into_iter()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .collect();

    if elems.is_empty() {
        let ty = if ctx.is_const { "readonly []" } else { "unknown[]" };
        return Inferred::new(ty, Some("[]".to_string()));
    }

    let mut any_as_const = false;
    let mut types: Vec<String> = Vec::with_capacity(elems.len());
    let mut cleans: Vec<Option<String>> = Vec::with_capacity(elems.len());
    for elem in &elems {
        let (stripped, elem_const) = match strip_trailing_as_const(elem) {
            Some(st) => {
                any_as_const = true;
                (st.trim(), true)
            }
            None => (*elem, false),
        };
        let is_const = ctx.is_const || elem_const;
        let child = infer(
            stripped,
            ctx.child(Container::Array, is_const, !is_const),
        );
        cleans.push(if elem_const { None } else { child.clean });
        types.push(child.ty);
    }

    let clean = array_clean_default(raw, &cleans);

    if any_as_const || ctx.is_const {
        return Inferred::new(format!("readonly [{}]", types.join(", ")), clean);
    }
    if types.len() <= TUPLE_LITERAL_MAX && types.iter().all(|t| is_primitive_literal_type(t)) {
        return Inferred::new(format!("readonly [{}]", types.join(", ")), clean);
    }

    let mut uniq: Vec<&str> = Vec::new();
    for t in &types {
        if !uniq.contains(&t.as_str()) {
            uniq.push(t);
        }
    }
    let ty = if uniq.len() == 1 {
        let t = uniq[0];
        if t.contains("=>") || t.contains('|') || t.contains('&') {
            format!("({t})[]")
        } else {
            format!("{t}[]")
        }
    } else {
        format!("({})[]", uniq.join(" | "))
    };
    Inferred::new(ty, clean)
}

/// An array contributes a clean default only when it parses as a simple
/// literal: no calls, `new`, `async`, `await`, or arrows anywhere in it.
fn array_clean_default(raw: &str, cleans: &[Option<String>]) -> Option<String> {
    if raw.contains('(')
        || raw.contains("=>")
        || contains_word_naive(raw, "new")
        || contains_word_naive(raw, "await")
        || contains_word_naive(raw, "async")
    {
        return None;
    }
    let mut parts = Vec::with_capacity(cleans.len());
    for c in cleans {
        parts.push(c.as_deref()?);
    }
    Some(format!("[{}]", parts.join(", ")))
}

// ----------------------------------------------------------------------
// Objects
// ----------------------------------------------------------------------

fn infer_object(inner: &str, ctx: Ctx) -> Inferred {
    let props = split_top_level(inner, b',');
    let mut lines: Vec<String> = Vec::new();
    let mut clean_parts: Vec<String> = Vec::new();

    for prop in props {
        let p = prop.trim();
        if p.is_empty() || p.starts_with("...") || p.starts_with('[') {
            // Spreads and computed keys are runtime constructs.
            continue;
        }
        let (p, is_async) = strip_leading_word(p, "async");

        // Object-literal accessors surface as plain properties.
        let (p, accessor) = match strip_leading_word(p, "get") {
            (rest, true) => (rest, true),
            _ => strip_leading_word(p, "set"),
        };

        let mut cur = Cursor::new(p);
        let key = match cur.peek() {
            Some(q @ (b'\'' | b'"')) => {
                let start = cur.pos;
                cur.skip_string(q);
                p[start..cur.pos].to_string()
            }
            Some(b) if b.is_ascii_digit() => {
                let start = cur.pos;
                while cur.peek().is_some_and(|d| d.is_ascii_digit() || d == b'.') {
                    cur.pos += 1;
                }
                p[start..cur.pos].to_string()
            }
            _ => {
                let id = cur.read_ident();
                if id.is_empty() {
                    continue;
                }
                id.to_string()
            }
        };
        cur.skip_whitespace_and_comments();

        if accessor {
            lines.push(format!("{key}: unknown;"));
            continue;
        }

        match cur.peek() {
            Some(b'(' | b'<') => {
                // Method definition; convert to a function-type signature.
                let rest = &p[cur.pos..];
                let ty = functions::method_signature(rest, is_async)
                    .unwrap_or_else(|| "unknown".to_string());
                lines.push(format!("{key}: {ty};"));
            }
            Some(b':') => {
                let value = p[cur.pos + 1..].trim();
                let child = infer(value, ctx.child(Container::Object, ctx.is_const, false));
                lines.push(format!("{key}: {};", indent_nested(&child.ty)));
                if let Some(c) = child.clean {
                    clean_parts.push(format!("{key}: {c}"));
                }
            }
            _ => {
                // Shorthand property: the value is a runtime binding.
                lines.push(format!("{key}: unknown;"));
            }
        }
    }

    if lines.is_empty() {
        return Inferred::new("{}", Some("{}".to_string()));
    }

    let mut ty = String::from("{\n");
    for line in &lines {
        ty.push_str("  ");
        ty.push_str(line);
        ty.push('\n');
    }
    ty.push('}');

    Inferred::new(ty, Some(render_object_default(&clean_parts)))
}

fn render_object_default(parts: &[String]) -> String {
    if parts.is_empty() {
        return "{}".to_string();
    }
    let single_line = format!("{{ {} }}", parts.join(", "));
    if single_line.len() <= 60 && !single_line.contains('\n') {
        return single_line;
    }
    let mut out = String::from("{\n");
    for (i, part) in parts.iter().enumerate() {
        out.push_str("  ");
        out.push_str(&indent_nested(part));
        if i + 1 < parts.len() {
            out.push(',');
        }
        out.push('\n');
    }
    out.push('}');
    out
}

fn indent_nested(text: &str) -> String {
    if text.contains('\n') {
        text.replace('\n', "\n  ")
    } else {
        text.to_string()
    }
}

// ----------------------------------------------------------------------
// `new` expressions
// ----------------------------------------------------------------------

fn infer_new(s: &str) -> Inferred {
    let rest = s["new".len()..].trim_start();
    let mut cur = Cursor::new(rest);
    let mut name = cur.read_ident().to_string();
    while cur.peek() == Some(b'.') {
        cur.pos += 1;
        name = cur.read_ident().to_string();
    }
    if name.is_empty() {
        return Inferred::opaque();
    }
    if cur.peek() == Some(b'<') {
        let start = cur.pos;
        cur.find_matching_close(b'<', b'>');
        let generics = &rest[start..cur.pos];
        return Inferred::new(format!("{name}{generics}"), None);
    }
    let ty = match name.as_str() {
        "Date" => "Date".to_string(),
        "Map" => "Map<any, any>".to_string(),
        "Set" => "Set<any>".to_string(),
        "WeakMap" => "WeakMap<any, any>".to_string(),
        "WeakSet" => "WeakSet<any>".to_string(),
        "RegExp" => "RegExp".to_string(),
        "Error" => "Error".to_string(),
        "Array" => "any[]".to_string(),
        "Object" => "object".to_string(),
        "Function" => "Function".to_string(),
        "Promise" => "Promise<any>".to_string(),
        _ => name,
    };
    Inferred::new(ty, None)
}

// ----------------------------------------------------------------------
// Small classifiers
// ----------------------------------------------------------------------

fn string_literal(s: &str) -> Option<&str> {
    let b = *s.as_bytes().first()?;
    if b != b'\'' && b != b'"' {
        return None;
    }
    let mut cur = Cursor::new(s);
    cur.skip_string(b);
    (cur.pos == s.len()).then_some(s)
}

struct Template {
    interpolated: bool,
}

fn template_literal(s: &str) -> Option<Template> {
    if !s.starts_with('`') {
        return None;
    }
    let mut cur = Cursor::new(s);
    cur.skip_template_literal();
    if cur.pos != s.len() {
        return None;
    }
    Some(Template {
        interpolated: s.contains("${"),
    })
}

fn is_tagged_template(s: &str) -> bool {
    if !s.ends_with('`') {
        return false;
    }
    match s.find('`') {
        Some(idx) if idx > 0 => is_ident_char(s.as_bytes()[idx - 1]),
        _ => false,
    }
}

/// The whole string is one balanced bracket group.
fn balanced_inner(s: &str, open: u8, close: u8) -> Option<&str> {
    if !s.starts_with(open as char) {
        return None;
    }
    let mut cur = Cursor::new(s);
    let end = cur.find_matching_close(open, close);
    (end == s.len()).then(|| &s[1..s.len() - 1])
}

fn starts_with_word(s: &str, word: &str) -> bool {
    s.strip_prefix(word)
        .is_some_and(|rest| rest.starts_with(|c: char| c.is_whitespace()))
}

fn strip_leading_word<'s>(s: &'s str, word: &str) -> (&'s str, bool) {
    match s.strip_prefix(word) {
        Some(rest) if rest.starts_with(|c: char| c.is_whitespace()) => (rest.trim_start(), true),
        _ => (s, false),
    }
}

/// `call_argument("Promise.resolve(x)", "Promise.resolve")` → `Some("x")`
/// when the call spans the whole expression.
fn call_argument<'s>(s: &'s str, callee: &str) -> Option<&'s str> {
    let rest = s.strip_prefix(callee)?;
    if !rest.starts_with('(') {
        return None;
    }
    let mut cur = Cursor::new(rest);
    let end = cur.find_matching_close(b'(', b')');
    (end == rest.len()).then(|| &rest[1..rest.len() - 1])
}

fn is_primitive_literal_type(t: &str) -> bool {
    t == "true"
        || t == "false"
        || t.starts_with('\'')
        || t.starts_with('"')
        || is_numeric_literal(t)
        || t.strip_suffix('n').is_some_and(is_numeric_literal)
}

/// Word search without the shared finder cache; inference queries are
/// small one-off strings.
fn contains_word_naive(s: &str, word: &str) -> bool {
    let bytes = s.as_bytes();
    let mut from = 0;
    while let Some(idx) = s[from..].find(word) {
        let at = from + idx;
        let end = at + word.len();
        let left_ok = at == 0 || !is_ident_char(bytes[at - 1]);
        let right_ok = end == bytes.len() || !is_ident_char(bytes[end]);
        if left_ok && right_ok {
            return true;
        }
        from = end;
    }
    false
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
