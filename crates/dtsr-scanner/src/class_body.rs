//! Class body reshaping.
//!
//! Members are scanned with the same cursor primitives as top-level
//! statements. Private members (both the `private` modifier and `#name`
//! fields) and static initialization blocks vanish; constructor parameter
//! properties are lifted to explicit member declarations; accessors,
//! methods, and properties are rendered with DTS-safe parameter lists and
//! inferred property types where the source omits annotations.

use crate::infer;
use crate::params;
use crate::scanner::Scanner;
use dtsr_common::comments::{attach_default_value, collect_leading_comments, has_default_value_tag};
use dtsr_common::cursor::is_ident_start;
use smallvec::SmallVec;

const MEMBER_MODIFIERS: &[&str] = &[
    "private",
    "protected",
    "public",
    "static",
    "abstract",
    "readonly",
    "override",
    "accessor",
    "async",
    "declare",
];

type Mods = SmallVec<[&'static str; 4]>;

fn modifier_prefix(mods: &Mods, keep: &[&str]) -> String {
    let mut out = String::new();
    for k in keep {
        if mods.contains(k) {
            out.push_str(k);
            out.push(' ');
        }
    }
    out
}

fn push_member(members: &mut Vec<String>, comments: &[String], line: String) {
    if comments.is_empty() {
        members.push(line);
        return;
    }
    let mut s = String::new();
    for c in comments {
        s.push_str(c);
        s.push('\n');
    }
    s.push_str(&line);
    members.push(s);
}

impl<'a> Scanner<'a> {
    /// Scan a class body. The cursor must be on the opening `{`; on return
    /// it sits past the matching `}`. Returns the reshaped braced body.
    pub(crate) fn scan_class_body(&mut self) -> String {
        self.cur.pos += 1;
        let mut members: Vec<String> = Vec::new();
        loop {
            let comments = collect_leading_comments(&mut self.cur, self.keep_comments);
            match self.cur.peek() {
                None => break,
                Some(b'}') => {
                    self.cur.pos += 1;
                    break;
                }
                Some(b';') => {
                    self.cur.pos += 1;
                    continue;
                }
                _ => {}
            }
            let before = self.cur.pos;
            self.scan_class_member(&mut members, comments);
            if self.cur.pos == before {
                self.cur.pos += 1;
            }
        }
        if members.is_empty() {
            return "{}".to_string();
        }
        let mut out = String::from("{\n");
        for member in &members {
            for line in member.lines() {
                out.push_str("  ");
                out.push_str(line);
                out.push('\n');
            }
        }
        out.push('}');
        out
    }

    fn scan_class_member(&mut self, members: &mut Vec<String>, mut comments: Vec<String>) {
        let mut mods: Mods = SmallVec::new();
        loop {
            let word = self.cur.peek_ident();
            if word.is_empty() {
                break;
            }
            let Some(&m) = MEMBER_MODIFIERS.iter().find(|mm| **mm == word) else {
                break;
            };
            let mut probe = self.cur.clone();
            probe.match_word(m);
            probe.skip_whitespace_and_comments();
            match probe.peek() {
                // A modifier word immediately followed by member syntax is
                // actually a member *named* like a modifier.
                Some(b'(' | b'<' | b':' | b'=' | b'?' | b'!' | b';' | b'}') | None => break,
                _ => {
                    mods.push(m);
                    self.cur = probe;
                }
            }
        }
        let is_private = mods.contains(&"private");
        let is_static = mods.contains(&"static");
        let is_async = mods.contains(&"async");

        // Static initialization blocks are skipped.
        if self.cur.peek() == Some(b'{') {
            self.cur.find_matching_close(b'{', b'}');
            return;
        }

        let mut is_generator = false;
        if self.cur.peek() == Some(b'*') {
            self.cur.pos += 1;
            self.cur.skip_whitespace_and_comments();
            is_generator = true;
        }

        // `#name` members are invisible to the declaration file.
        if self.cur.peek() == Some(b'#') {
            self.skip_member();
            return;
        }

        let mut accessor_kind: Option<&str> = None;
        for kw in ["get", "set"] {
            if self.cur.peek_word(kw) {
                let mut probe = self.cur.clone();
                probe.match_word(kw);
                probe.skip_whitespace_and_comments();
                match probe.peek() {
                    Some(b'#') => {
                        self.cur = probe;
                        self.skip_member();
                        return;
                    }
                    Some(b) if is_ident_start(b) || matches!(b, b'[' | b'\'' | b'"') => {
                        self.cur = probe;
                        accessor_kind = Some(kw);
                    }
                    _ => {}
                }
                break;
            }
        }

        let Some(name) = self.read_member_name() else {
            self.skip_member();
            return;
        };
        self.cur.skip_whitespace_and_comments();

        let mut optional = false;
        match self.cur.peek() {
            Some(b'?') => {
                optional = true;
                self.cur.pos += 1;
                self.cur.skip_whitespace_and_comments();
            }
            Some(b'!') => {
                self.cur.pos += 1;
                self.cur.skip_whitespace_and_comments();
            }
            _ => {}
        }

        match accessor_kind {
            Some("get") => {
                if self.cur.peek() == Some(b'(') {
                    self.cur.find_matching_close(b'(', b')');
                }
                let ret = self.read_optional_return_type().unwrap_or_else(|| "unknown".into());
                self.try_consume_body_or_semi();
                if is_private {
                    return;
                }
                let prefix = modifier_prefix(&mods, &["protected", "static"]);
                push_member(members, &comments, format!("{prefix}get {name}(): {ret};"));
                return;
            }
            Some("set") => {
                let mut param = String::new();
                if self.cur.peek() == Some(b'(') {
                    let ps = self.cur.pos;
                    self.cur.find_matching_close(b'(', b')');
                    param = params::rebuild_params(self.cur.slice(ps + 1, self.cur.pos - 1));
                }
                // Source setters cannot carry a return annotation, but be
                // tolerant of one during recovery.
                let _ = self.read_optional_return_type();
                self.try_consume_body_or_semi();
                if is_private {
                    return;
                }
                let prefix = modifier_prefix(&mods, &["protected", "static"]);
                push_member(members, &comments, format!("{prefix}set {name}({param}): void;"));
                return;
            }
            _ => {}
        }

        // Constructor: lift parameter properties, then emit the signature.
        if name == "constructor" && self.cur.peek() == Some(b'(') {
            let ps = self.cur.pos;
            self.cur.find_matching_close(b'(', b')');
            let raw = self.cur.slice(ps + 1, self.cur.pos - 1).to_string();
            self.try_consume_body_or_semi();
            if !is_private {
                for part in params::split_top_level(&raw, b',') {
                    if let Some(lifted) = params::param_property(part) {
                        push_member(members, &[], lifted);
                    }
                }
                let cleaned = params::rebuild_params(&raw);
                push_member(members, &comments, format!("constructor({cleaned});"));
            }
            return;
        }

        // Method.
        if matches!(self.cur.peek(), Some(b'(' | b'<')) {
            let generics = self.read_generics().unwrap_or_default();
            self.cur.skip_whitespace_and_comments();
            if self.cur.peek() != Some(b'(') {
                self.skip_member();
                return;
            }
            let ps = self.cur.pos;
            self.cur.find_matching_close(b'(', b')');
            let cleaned = params::rebuild_params(self.cur.slice(ps + 1, self.cur.pos - 1));
            let ret = self.read_optional_return_type().unwrap_or_else(|| {
                crate::scanner::default_return_type(is_async, is_generator).to_string()
            });
            self.try_consume_body_or_semi();
            if is_private {
                return;
            }
            let prefix = modifier_prefix(&mods, &["protected", "static", "abstract"]);
            let opt = if optional { "?" } else { "" };
            push_member(
                members,
                &comments,
                format!("{prefix}{name}{opt}{generics}({cleaned}): {ret};"),
            );
            return;
        }

        // Property.
        let mut annotation = None;
        if self.cur.peek() == Some(b':') {
            self.cur.pos += 1;
            let ty = self.read_until(&[b'=', b';', b'}'], true, true);
            if !ty.is_empty() {
                annotation = Some(ty);
            }
        }
        let mut init = None;
        if self.cur.peek() == Some(b'=') {
            self.cur.pos += 1;
            let skip_only = self.isolated_declarations
                && annotation
                    .as_deref()
                    .is_some_and(|a| !infer::is_generic_annotation(a));
            let v = self.read_until(&[b';', b'}'], false, true);
            if !skip_only && !v.is_empty() {
                init = Some(v);
            }
        }
        self.consume_optional_semi();
        if is_private {
            return;
        }

        let mut is_const_assert = false;
        if let Some(v) = init.take() {
            let (stripped, asserted) = infer::strip_wrappers(&v);
            is_const_assert = asserted;
            init = Some(stripped);
        }
        // Literal types only survive on immutable statics.
        let literal_ok = (is_static && mods.contains(&"readonly")) || is_const_assert;

        let (ty, clean_default) = match (&annotation, &init) {
            (Some(ann), Some(v)) if infer::is_generic_annotation(ann) => {
                let inferred = infer::infer_value(v, literal_ok);
                if infer::is_narrower(&inferred.ty) {
                    (inferred.ty, inferred.clean)
                } else {
                    (ann.clone(), None)
                }
            }
            (Some(ann), _) => (ann.clone(), None),
            (None, Some(v)) => {
                let inferred = infer::infer_value(v, literal_ok);
                (inferred.ty, inferred.clean)
            }
            (None, None) => ("unknown".to_string(), None),
        };

        let wants_default = self.keep_comments
            && !literal_ok
            && init
                .as_deref()
                .is_some_and(|v| v.trim_start().starts_with(['{', '[']));
        if wants_default {
            if let Some(payload) = &clean_default {
                if !has_default_value_tag(&comments) {
                    attach_default_value(&mut comments, payload);
                }
            }
        }

        let prefix = modifier_prefix(
            &mods,
            &["protected", "static", "abstract", "readonly", "accessor"],
        );
        let opt = if optional { "?" } else { "" };
        push_member(members, &comments, format!("{prefix}{name}{opt}: {ty};"));
    }

    fn read_optional_return_type(&mut self) -> Option<String> {
        let mut probe = self.cur.clone();
        probe.skip_whitespace_and_comments();
        if probe.peek() == Some(b':') {
            probe.pos += 1;
            self.cur = probe;
            let ret = self.read_return_type();
            (!ret.is_empty()).then_some(ret)
        } else {
            None
        }
    }

    /// Member names: identifiers, numeric keys, quoted keys, and computed
    /// `[expr]` names.
    fn read_member_name(&mut self) -> Option<String> {
        match self.cur.peek()? {
            b'[' => {
                let start = self.cur.pos;
                self.cur.find_matching_close(b'[', b']');
                Some(self.cur.slice(start, self.cur.pos).to_string())
            }
            q @ (b'\'' | b'"') => {
                let start = self.cur.pos;
                self.cur.skip_string(q);
                Some(self.cur.slice(start, self.cur.pos).to_string())
            }
            b if b.is_ascii_digit() => {
                let start = self.cur.pos;
                while self
                    .cur
                    .peek()
                    .is_some_and(|d| d.is_ascii_digit() || d == b'.')
                {
                    self.cur.pos += 1;
                }
                Some(self.cur.slice(start, self.cur.pos).to_string())
            }
            b if is_ident_start(b) => {
                let id = self.cur.read_ident();
                (!id.is_empty()).then(|| id.to_string())
            }
            _ => None,
        }
    }

    /// Consume a member that will not be emitted, through its body or
    /// initializer, stopping before the class's closing `}`.
    fn skip_member(&mut self) {
        loop {
            let Some(b) = self.cur.peek() else { return };
            match b {
                b';' => {
                    self.cur.pos += 1;
                    return;
                }
                b'}' => return,
                b'\'' | b'"' => self.cur.skip_string(b),
                b'`' => self.cur.skip_template_literal(),
                b'/' => match self.cur.peek_at(1) {
                    Some(b'/') => self.cur.skip_line_comment(),
                    Some(b'*') => self.cur.skip_block_comment(),
                    _ => {
                        if self.cur.is_regex_start() {
                            self.cur.skip_regex();
                        } else {
                            self.cur.pos += 1;
                        }
                    }
                },
                b'(' => {
                    self.cur.find_matching_close(b'(', b')');
                }
                b'[' => {
                    self.cur.find_matching_close(b'[', b']');
                }
                b'{' => {
                    // A brace group at member level is a body or an object
                    // initializer; either way the member ends with it.
                    self.cur.find_matching_close(b'{', b'}');
                    return;
                }
                b'\n' => {
                    self.cur.pos += 1;
                    if self.cur.check_asi_member() {
                        return;
                    }
                }
                _ => self.cur.pos += 1,
            }
        }
    }
}
