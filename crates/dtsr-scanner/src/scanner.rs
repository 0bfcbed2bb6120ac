//! Top-level scanner: a driver loop over a mutable cursor.
//!
//! At each position the scanner skips trivia, snapshots the statement
//! start, and dispatches on the leading keyword. Statements it cannot
//! project into a declaration file (destructuring declarations,
//! decorators, expression statements) are skipped to the next statement
//! boundary. No AST is built; every recognized construct is rendered to
//! declaration text on the spot.

use crate::declaration::{DeclFlags, Declaration, DeclarationKind};
use crate::infer;
use crate::params;
use dtsr_common::comments::{attach_default_value, collect_leading_comments, has_default_value_tag};
use dtsr_common::cursor::is_ident_start;
use dtsr_common::{Cursor, Span};
use rustc_hash::FxHashSet;

/// Result of scanning one source file.
pub struct ScanOutput {
    /// Scan-ordered declarations (imports, exports, and emittable
    /// declarations, with overload implementation signatures removed).
    pub declarations: Vec<Declaration>,
    /// Non-exported interfaces, held back from the main vector. The
    /// processor pulls one in only when a retained declaration references
    /// its name.
    pub hoisted_interfaces: Vec<Declaration>,
}

#[derive(Clone, Copy, Default)]
pub(crate) struct ExportCtx {
    pub exported: bool,
    pub default: bool,
}

fn export_prefix(export: ExportCtx) -> &'static str {
    if export.exported { "export " } else { "" }
}

/// Default return type for an unannotated function, keyed by
/// `(async, generator)`.
pub(crate) fn default_return_type(is_async: bool, is_generator: bool) -> &'static str {
    match (is_async, is_generator) {
        (false, false) => "void",
        (true, false) => "Promise<void>",
        (false, true) => "Generator<unknown, void, unknown>",
        (true, true) => "AsyncGenerator<unknown, void, unknown>",
    }
}

pub struct Scanner<'a> {
    pub(crate) cur: Cursor<'a>,
    pub(crate) keep_comments: bool,
    pub(crate) isolated_declarations: bool,
    /// Inside a namespace or ambient-module body. Interfaces are emitted
    /// in place rather than held back.
    module_scope: bool,
    pub(crate) decls: Vec<Declaration>,
    hoisted: Vec<Declaration>,
    body_bearing: FxHashSet<usize>,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str, keep_comments: bool, isolated_declarations: bool) -> Self {
        Scanner {
            cur: Cursor::new(source),
            keep_comments,
            isolated_declarations,
            module_scope: false,
            decls: Vec::new(),
            hoisted: Vec::new(),
            body_bearing: FxHashSet::default(),
        }
    }

    fn with_module_scope(source: &'a str, keep_comments: bool, isolated: bool) -> Self {
        let mut scanner = Scanner::new(source, keep_comments, isolated);
        scanner.module_scope = true;
        scanner
    }

    /// Run the dispatch loop to EOF and return the ordered declarations.
    pub fn scan(mut self) -> ScanOutput {
        loop {
            let comments = collect_leading_comments(&mut self.cur, self.keep_comments);
            if self.cur.eof() {
                break;
            }
            let start = self.cur.pos;
            self.scan_statement(start, comments, ExportCtx::default());
            if self.cur.pos == start {
                // A statement that consumed nothing would loop forever.
                self.cur.pos += 1;
            }
        }
        self.remove_overload_implementations();
        tracing::debug!(
            declarations = self.decls.len(),
            hoisted = self.hoisted.len(),
            "scan complete"
        );
        ScanOutput {
            declarations: self.decls,
            hoisted_interfaces: self.hoisted,
        }
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    fn scan_statement(&mut self, start: usize, comments: Vec<String>, export: ExportCtx) {
        match self.cur.peek_ident() {
            "import" => {
                let mut probe = self.cur.clone();
                probe.match_word("import");
                probe.skip_whitespace_and_comments();
                // `import(...)` and `import.meta` are expressions.
                match probe.peek() {
                    Some(b'(') | Some(b'.') => self.skip_statement(),
                    _ => self.scan_import(start, comments),
                }
            }
            "export" => {
                self.cur.match_word("export");
                self.cur.skip_whitespace_and_comments();
                self.scan_export(start, comments);
            }
            "declare" => {
                self.cur.match_word("declare");
                self.cur.skip_whitespace_and_comments();
                if self.cur.peek_word("global") {
                    self.scan_global(start, comments);
                } else {
                    // `declare` is transparent; re-dispatch on what follows.
                    self.scan_statement(start, comments, export);
                }
            }
            "interface" => self.scan_interface(start, comments, export),
            "type" => {
                let mut probe = self.cur.clone();
                probe.match_word("type");
                probe.skip_whitespace_and_comments();
                if probe.peek().is_some_and(is_ident_start) {
                    self.scan_type_alias(start, comments, export);
                } else {
                    self.skip_statement();
                }
            }
            "function" => self.scan_function(start, comments, export, false),
            "async" => {
                let mut probe = self.cur.clone();
                probe.match_word("async");
                probe.skip_whitespace_and_comments();
                if probe.peek_word("function") {
                    self.cur = probe;
                    self.scan_function(start, comments, export, true);
                } else {
                    self.skip_statement();
                }
            }
            "abstract" => {
                let mut probe = self.cur.clone();
                probe.match_word("abstract");
                probe.skip_whitespace_and_comments();
                if probe.peek_word("class") {
                    self.cur = probe;
                    self.scan_class(start, comments, export, true);
                } else {
                    self.skip_statement();
                }
            }
            "class" => self.scan_class(start, comments, export, false),
            "const" => {
                let mut probe = self.cur.clone();
                probe.match_word("const");
                probe.skip_whitespace_and_comments();
                if probe.peek_word("enum") {
                    self.cur = probe;
                    self.scan_enum(start, comments, export, true);
                } else {
                    self.scan_variable(start, comments, export, "const");
                }
            }
            "let" => self.scan_variable(start, comments, export, "let"),
            "var" => self.scan_variable(start, comments, export, "var"),
            "enum" => self.scan_enum(start, comments, export, false),
            "module" | "namespace" => {
                let mut probe = self.cur.clone();
                probe.read_ident();
                probe.skip_whitespace_and_comments();
                match probe.peek() {
                    Some(b'\'' | b'"') => self.scan_module(start, comments, export),
                    Some(b) if is_ident_start(b) => self.scan_module(start, comments, export),
                    _ => self.skip_statement(),
                }
            }
            _ => self.skip_statement(),
        }
    }

    // ------------------------------------------------------------------
    // Imports
    // ------------------------------------------------------------------

    fn scan_import(&mut self, start: usize, comments: Vec<String>) {
        self.cur.match_word("import");
        self.cur.skip_whitespace_and_comments();

        let mut flags = DeclFlags::empty();
        if self.cur.peek_word("type") {
            // `import type X`, `import type { ... }`, `import type * as N`.
            let mut probe = self.cur.clone();
            probe.match_word("type");
            probe.skip_whitespace_and_comments();
            let type_clause = match probe.peek() {
                Some(b'{') | Some(b'*') => true,
                Some(b) if is_ident_start(b) => !probe.peek_word("from"),
                _ => false,
            };
            if type_clause {
                flags |= DeclFlags::TYPE_ONLY;
                self.cur.match_word("type");
                self.cur.skip_whitespace_and_comments();
            }
        }

        let mut source = None;
        match self.cur.peek() {
            Some(q @ (b'\'' | b'"')) => {
                // Side-effect import.
                flags |= DeclFlags::SIDE_EFFECT;
                let qstart = self.cur.pos;
                self.cur.skip_string(q);
                source = Some(self.cur.slice(qstart + 1, self.cur.pos - 1).to_string());
            }
            _ => {
                // Clause: default, namespace, named, or a mix.
                loop {
                    self.cur.skip_whitespace_and_comments();
                    match self.cur.peek() {
                        Some(b'{') => {
                            self.cur.find_matching_close(b'{', b'}');
                        }
                        Some(b'*') => {
                            self.cur.pos += 1;
                        }
                        Some(b',') => {
                            self.cur.pos += 1;
                        }
                        Some(b) if is_ident_start(b) => {
                            if self.cur.peek_word("from") {
                                self.cur.match_word("from");
                                break;
                            }
                            self.cur.read_ident();
                        }
                        _ => break,
                    }
                }
                self.cur.skip_whitespace_and_comments();
                if let Some(q @ (b'\'' | b'"')) = self.cur.peek() {
                    let qstart = self.cur.pos;
                    self.cur.skip_string(q);
                    source = Some(self.cur.slice(qstart + 1, self.cur.pos - 1).to_string());
                }
            }
        }
        self.consume_optional_semi();

        let mut text = self.cur.slice(start, self.cur.pos).trim().to_string();
        if !text.ends_with(';') {
            text.push(';');
        }
        let mut decl = Declaration::new(DeclarationKind::Import, "", text, self.span_from(start));
        decl.flags = flags;
        decl.source = source;
        decl.leading_comments = comments;
        self.decls.push(decl);
    }

    // ------------------------------------------------------------------
    // Exports
    // ------------------------------------------------------------------

    fn scan_export(&mut self, start: usize, comments: Vec<String>) {
        let exported = ExportCtx {
            exported: true,
            default: false,
        };
        match self.cur.peek() {
            Some(b'{') => {
                self.scan_export_clause(start, comments, false);
                return;
            }
            Some(b'*') => {
                self.scan_export_star(start, comments);
                return;
            }
            Some(b'=') => {
                // `export = X` has no projection here.
                self.skip_statement();
                return;
            }
            _ => {}
        }
        if self.cur.peek_word("default") {
            self.cur.match_word("default");
            self.cur.skip_whitespace_and_comments();
            self.scan_export_default(start, comments);
            return;
        }
        if self.cur.peek_word("type") {
            let mut probe = self.cur.clone();
            probe.match_word("type");
            probe.skip_whitespace_and_comments();
            if probe.peek() == Some(b'{') {
                self.cur = probe;
                self.scan_export_clause(start, comments, true);
                return;
            }
            // `export type X = ...` falls through to the alias scanner.
        }
        if self.cur.peek_word("declare") {
            self.cur.match_word("declare");
            self.cur.skip_whitespace_and_comments();
        }
        self.scan_statement(start, comments, exported);
    }

    /// `export { ... } [from '...']` and `export type { ... } [from '...']`.
    fn scan_export_clause(&mut self, start: usize, comments: Vec<String>, type_only: bool) {
        self.cur.find_matching_close(b'{', b'}');
        self.cur.skip_whitespace_and_comments();
        let mut source = None;
        if self.cur.match_word("from") {
            self.cur.skip_whitespace_and_comments();
            if let Some(q @ (b'\'' | b'"')) = self.cur.peek() {
                let qstart = self.cur.pos;
                self.cur.skip_string(q);
                source = Some(self.cur.slice(qstart + 1, self.cur.pos - 1).to_string());
            }
        }
        self.consume_optional_semi();

        let mut text = self.cur.slice(start, self.cur.pos).trim().to_string();
        if !text.ends_with(';') {
            text.push(';');
        }
        let mut decl = Declaration::new(DeclarationKind::Export, "", text, self.span_from(start));
        decl.flags = DeclFlags::EXPORTED;
        if type_only {
            decl.flags |= DeclFlags::TYPE_ONLY;
        }
        decl.source = source;
        decl.leading_comments = comments;
        self.decls.push(decl);
    }

    /// `export * [as N] from '...'`.
    fn scan_export_star(&mut self, start: usize, comments: Vec<String>) {
        self.cur.pos += 1;
        self.cur.skip_whitespace_and_comments();
        if self.cur.match_word("as") {
            self.cur.skip_whitespace_and_comments();
            self.cur.read_ident();
            self.cur.skip_whitespace_and_comments();
        }
        let mut source = None;
        if self.cur.match_word("from") {
            self.cur.skip_whitespace_and_comments();
            if let Some(q @ (b'\'' | b'"')) = self.cur.peek() {
                let qstart = self.cur.pos;
                self.cur.skip_string(q);
                source = Some(self.cur.slice(qstart + 1, self.cur.pos - 1).to_string());
            }
        }
        self.consume_optional_semi();

        let mut text = self.cur.slice(start, self.cur.pos).trim().to_string();
        if !text.ends_with(';') {
            text.push(';');
        }
        let mut decl = Declaration::new(DeclarationKind::Export, "", text, self.span_from(start));
        decl.flags = DeclFlags::EXPORTED;
        decl.source = source;
        decl.leading_comments = comments;
        self.decls.push(decl);
    }

    fn scan_export_default(&mut self, start: usize, comments: Vec<String>) {
        let ctx = ExportCtx {
            exported: true,
            default: true,
        };
        match self.cur.peek_ident() {
            "function" => {
                self.scan_function(start, comments, ctx, false);
                return;
            }
            "async" => {
                let mut probe = self.cur.clone();
                probe.match_word("async");
                probe.skip_whitespace_and_comments();
                if probe.peek_word("function") {
                    self.cur = probe;
                    self.scan_function(start, comments, ctx, true);
                    return;
                }
            }
            "class" => {
                self.scan_class(start, comments, ctx, false);
                return;
            }
            "abstract" => {
                let mut probe = self.cur.clone();
                probe.match_word("abstract");
                probe.skip_whitespace_and_comments();
                if probe.peek_word("class") {
                    self.cur = probe;
                    self.scan_class(start, comments, ctx, true);
                    return;
                }
            }
            _ => {}
        }

        // `export default <expression>;`
        let expr = self.read_until(&[b';', b'}'], false, false);
        self.consume_optional_semi();
        let text = format!("export default {expr};");
        let mut decl =
            Declaration::new(DeclarationKind::Export, "default", text, self.span_from(start));
        decl.flags = DeclFlags::EXPORTED | DeclFlags::DEFAULT;
        decl.value = Some(expr);
        decl.leading_comments = comments;
        self.decls.push(decl);
    }

    // ------------------------------------------------------------------
    // Functions
    // ------------------------------------------------------------------

    fn scan_function(
        &mut self,
        start: usize,
        comments: Vec<String>,
        export: ExportCtx,
        is_async: bool,
    ) {
        self.cur.match_word("function");
        self.cur.skip_whitespace_and_comments();
        let is_generator = if self.cur.peek() == Some(b'*') {
            self.cur.pos += 1;
            self.cur.skip_whitespace_and_comments();
            true
        } else {
            false
        };
        let raw_name = self.cur.read_ident().to_string();
        self.cur.skip_whitespace_and_comments();
        let generics = self.read_generics();
        self.cur.skip_whitespace_and_comments();
        if self.cur.peek() != Some(b'(') {
            self.skip_statement();
            return;
        }
        let pstart = self.cur.pos;
        self.cur.find_matching_close(b'(', b')');
        let params_raw = self.cur.slice(pstart + 1, self.cur.pos - 1).to_string();

        let explicit_ret = {
            let mut probe = self.cur.clone();
            probe.skip_whitespace_and_comments();
            if probe.peek() == Some(b':') {
                probe.pos += 1;
                self.cur = probe;
                Some(self.read_return_type())
            } else {
                None
            }
        };
        let has_body = self.try_consume_body_or_semi();

        if raw_name.is_empty() && !export.default {
            return;
        }

        let ret = explicit_ret
            .clone()
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| default_return_type(is_async, is_generator).to_string());
        let cleaned = params::rebuild_params(&params_raw);
        let g = generics.clone().unwrap_or_default();

        let (name, text) = if export.default {
            let spacer = if raw_name.is_empty() {
                String::new()
            } else {
                format!(" {raw_name}")
            };
            (
                "default".to_string(),
                format!("export default function{spacer}{g}({cleaned}): {ret};"),
            )
        } else {
            (
                raw_name.clone(),
                format!(
                    "{}declare function {raw_name}{g}({cleaned}): {ret};",
                    export_prefix(export)
                ),
            )
        };

        let mut decl = Declaration::new(DeclarationKind::Function, name, text, self.span_from(start));
        if export.exported {
            decl.flags |= DeclFlags::EXPORTED;
        }
        if export.default {
            decl.flags |= DeclFlags::DEFAULT;
        }
        if is_async {
            decl.flags |= DeclFlags::ASYNC;
        }
        if is_generator {
            decl.flags |= DeclFlags::GENERATOR;
        }
        decl.return_type = Some(ret);
        decl.generics = generics;
        decl.leading_comments = comments;
        self.decls.push(decl);
        if has_body {
            self.body_bearing.insert(self.decls.len() - 1);
        }
    }

    // ------------------------------------------------------------------
    // Variables
    // ------------------------------------------------------------------

    fn scan_variable(
        &mut self,
        start: usize,
        mut comments: Vec<String>,
        export: ExportCtx,
        kw: &str,
    ) {
        self.cur.match_word(kw);
        self.cur.skip_whitespace_and_comments();
        if matches!(self.cur.peek(), Some(b'{') | Some(b'[')) {
            // Destructuring declarations have no DTS projection.
            self.skip_statement();
            return;
        }
        let name = self.cur.read_ident().to_string();
        if name.is_empty() {
            self.skip_statement();
            return;
        }
        self.cur.skip_whitespace_and_comments();
        if self.cur.peek() == Some(b'!') {
            self.cur.pos += 1;
            self.cur.skip_whitespace_and_comments();
        }

        let mut annotation = None;
        if self.cur.peek() == Some(b':') {
            self.cur.pos += 1;
            let ty = self.read_until(&[b'=', b',', b';', b'}'], true, false);
            if !ty.is_empty() {
                annotation = Some(ty);
            }
        }

        let mut value = None;
        if self.cur.peek() == Some(b'=') {
            self.cur.pos += 1;
            let skip_only = self.isolated_declarations
                && annotation
                    .as_deref()
                    .is_some_and(|a| !infer::is_generic_annotation(a));
            let init = self.read_until(&[b',', b';', b'}'], false, false);
            if !skip_only && !init.is_empty() {
                value = Some(init);
            }
        }

        if self.cur.peek() == Some(b',') {
            // Multi-declarator statements emit only the first binding.
            self.skip_statement();
        } else {
            self.consume_optional_semi();
        }

        // `as const` and `satisfies T` wrappers around the initializer.
        let mut is_const_assert = false;
        if let Some(v) = value.take() {
            let (stripped, asserted) = infer::strip_wrappers(&v);
            is_const_assert = asserted;
            value = Some(stripped);
        }

        let is_const = kw == "const" || is_const_assert;
        let (ty, clean_default) = match (&annotation, &value) {
            (Some(ann), Some(v)) if infer::is_generic_annotation(ann) => {
                let inferred = infer::infer_value(v, is_const);
                if infer::is_narrower(&inferred.ty) {
                    (inferred.ty, inferred.clean)
                } else {
                    (ann.clone(), None)
                }
            }
            (Some(ann), _) => (ann.clone(), None),
            (None, Some(v)) => {
                let inferred = infer::infer_value(v, is_const);
                (inferred.ty, inferred.clean)
            }
            (None, None) => ("unknown".to_string(), None),
        };

        let wants_default = self.keep_comments
            && !is_const
            && value
                .as_deref()
                .is_some_and(|v| v.trim_start().starts_with(['{', '[']));
        if wants_default {
            if let Some(payload) = &clean_default {
                if !has_default_value_tag(&comments) {
                    attach_default_value(&mut comments, payload);
                }
            }
        }

        let text = format!("{}declare {kw} {name}: {ty};", export_prefix(export));
        let mut decl =
            Declaration::new(DeclarationKind::Variable, name, text, self.span_from(start));
        if export.exported {
            decl.flags |= DeclFlags::EXPORTED;
        }
        decl.type_annotation = Some(ty);
        decl.value = value;
        decl.leading_comments = comments;
        self.decls.push(decl);
    }

    // ------------------------------------------------------------------
    // Interfaces and type aliases
    // ------------------------------------------------------------------

    fn scan_interface(&mut self, start: usize, comments: Vec<String>, export: ExportCtx) {
        self.cur.match_word("interface");
        self.cur.skip_whitespace_and_comments();
        let name = self.cur.read_ident().to_string();
        if name.is_empty() {
            self.skip_statement();
            return;
        }
        self.cur.skip_whitespace_and_comments();
        let generics = self.read_generics();
        self.cur.skip_whitespace_and_comments();
        let mut extends = None;
        if self.cur.match_word("extends") {
            let clause = self.read_until(&[b'{', b';', b'}'], true, false);
            if !clause.is_empty() {
                extends = Some(clause);
            }
        }
        if self.cur.peek() != Some(b'{') {
            self.skip_statement();
            return;
        }
        let bstart = self.cur.pos;
        self.cur.find_matching_close(b'{', b'}');
        let body = crate::braces::clean_block(self.cur.slice(bstart, self.cur.pos));

        let g = generics.clone().unwrap_or_default();
        let ext = extends
            .as_ref()
            .map(|e| format!(" extends {e}"))
            .unwrap_or_default();
        let text = format!("{}interface {name}{g}{ext} {body}", export_prefix(export));

        let mut decl =
            Declaration::new(DeclarationKind::Interface, name, text, self.span_from(start));
        if export.exported {
            decl.flags |= DeclFlags::EXPORTED;
        }
        decl.generics = generics;
        decl.extends = extends;
        decl.leading_comments = comments;

        if export.exported || self.module_scope {
            self.decls.push(decl);
        } else {
            // Held back; the processor pulls it in if referenced.
            self.hoisted.push(decl);
        }
    }

    fn scan_type_alias(&mut self, start: usize, comments: Vec<String>, export: ExportCtx) {
        self.cur.match_word("type");
        self.cur.skip_whitespace_and_comments();
        let name = self.cur.read_ident().to_string();
        self.cur.skip_whitespace_and_comments();
        let generics = self.read_generics();
        self.cur.skip_whitespace_and_comments();
        if self.cur.peek() != Some(b'=') {
            self.skip_statement();
            return;
        }
        self.cur.pos += 1;
        let rhs = self.read_until(&[b';'], true, false);
        self.consume_optional_semi();

        let g = generics.clone().unwrap_or_default();
        let text = format!("{}type {name}{g} = {rhs};", export_prefix(export));
        let mut decl = Declaration::new(DeclarationKind::Type, name, text, self.span_from(start));
        if export.exported {
            decl.flags |= DeclFlags::EXPORTED;
        }
        decl.generics = generics;
        decl.value = Some(rhs);
        decl.leading_comments = comments;
        self.decls.push(decl);
    }

    // ------------------------------------------------------------------
    // Enums
    // ------------------------------------------------------------------

    fn scan_enum(&mut self, start: usize, comments: Vec<String>, export: ExportCtx, is_const: bool) {
        self.cur.match_word("enum");
        self.cur.skip_whitespace_and_comments();
        let name = self.cur.read_ident().to_string();
        self.cur.skip_whitespace_and_comments();
        if self.cur.peek() != Some(b'{') {
            self.skip_statement();
            return;
        }
        let bstart = self.cur.pos;
        self.cur.find_matching_close(b'{', b'}');
        // Enum bodies are preserved verbatim; only the envelope is added.
        let body = self.cur.slice(bstart, self.cur.pos).to_string();

        let konst = if is_const { "const " } else { "" };
        let text = format!("{}declare {konst}enum {name} {body}", export_prefix(export));
        let mut decl = Declaration::new(DeclarationKind::Enum, name, text, self.span_from(start));
        if export.exported {
            decl.flags |= DeclFlags::EXPORTED;
        }
        decl.leading_comments = comments;
        self.decls.push(decl);
    }

    // ------------------------------------------------------------------
    // Classes
    // ------------------------------------------------------------------

    fn scan_class(
        &mut self,
        start: usize,
        comments: Vec<String>,
        export: ExportCtx,
        is_abstract: bool,
    ) {
        self.cur.match_word("class");
        self.cur.skip_whitespace_and_comments();
        let raw_name = self.cur.read_ident().to_string();
        self.cur.skip_whitespace_and_comments();
        let generics = self.read_generics();
        self.cur.skip_whitespace_and_comments();

        let heritage = self.read_until(&[b'{', b';', b'}'], true, false);
        let (extends, implements) = split_heritage(&heritage);

        if self.cur.peek() != Some(b'{') {
            self.skip_statement();
            return;
        }
        let body = self.scan_class_body();

        let g = generics.clone().unwrap_or_default();
        let ext = extends
            .as_ref()
            .map(|e| format!(" extends {e}"))
            .unwrap_or_default();
        let impls = implements
            .as_ref()
            .map(|i| format!(" implements {i}"))
            .unwrap_or_default();
        let abs = if is_abstract { "abstract " } else { "" };

        let (name, text) = if export.default {
            let spacer = if raw_name.is_empty() {
                String::new()
            } else {
                format!(" {raw_name}")
            };
            (
                "default".to_string(),
                format!("export default {abs}class{spacer}{g}{ext}{impls} {body}"),
            )
        } else {
            (
                raw_name.clone(),
                format!(
                    "{}declare {abs}class {raw_name}{g}{ext}{impls} {body}",
                    export_prefix(export)
                ),
            )
        };

        let mut decl = Declaration::new(DeclarationKind::Class, name, text, self.span_from(start));
        if export.exported {
            decl.flags |= DeclFlags::EXPORTED;
        }
        if export.default {
            decl.flags |= DeclFlags::DEFAULT;
        }
        decl.generics = generics;
        decl.extends = extends;
        decl.implements = implements;
        decl.leading_comments = comments;
        self.decls.push(decl);
    }

    // ------------------------------------------------------------------
    // Modules and namespaces
    // ------------------------------------------------------------------

    fn scan_module(&mut self, start: usize, comments: Vec<String>, export: ExportCtx) {
        let kw = self.cur.read_ident().to_string();
        self.cur.skip_whitespace_and_comments();

        let (name, source) = match self.cur.peek() {
            Some(q @ (b'\'' | b'"')) => {
                let qstart = self.cur.pos;
                self.cur.skip_string(q);
                let spec = self.cur.slice(qstart + 1, self.cur.pos - 1).to_string();
                (format!("'{spec}'"), Some(spec))
            }
            _ => {
                let mut name = self.cur.read_ident().to_string();
                while self.cur.peek() == Some(b'.') {
                    self.cur.pos += 1;
                    name.push('.');
                    name.push_str(self.cur.read_ident());
                }
                (name, None)
            }
        };
        self.cur.skip_whitespace_and_comments();
        if self.cur.peek() != Some(b'{') {
            self.skip_statement();
            return;
        }
        let bstart = self.cur.pos;
        self.cur.find_matching_close(b'{', b'}');
        let inner = self.cur.slice(bstart + 1, self.cur.pos.saturating_sub(1));
        let body = self.build_namespace_body(inner);

        let braced = if body.is_empty() {
            "{}".to_string()
        } else {
            format!("{{\n{body}\n}}")
        };
        let text = format!("{}declare {kw} {name} {braced}", export_prefix(export));
        let mut decl = Declaration::new(DeclarationKind::Module, name, text, self.span_from(start));
        if export.exported {
            decl.flags |= DeclFlags::EXPORTED;
        }
        decl.source = source;
        decl.leading_comments = comments;
        self.decls.push(decl);
    }

    /// `declare global { ... }`, recorded as a module named `global`.
    fn scan_global(&mut self, start: usize, comments: Vec<String>) {
        self.cur.match_word("global");
        self.cur.skip_whitespace_and_comments();
        if self.cur.peek() != Some(b'{') {
            self.skip_statement();
            return;
        }
        let bstart = self.cur.pos;
        self.cur.find_matching_close(b'{', b'}');
        let inner = self.cur.slice(bstart + 1, self.cur.pos.saturating_sub(1));
        let body = self.build_namespace_body(inner);
        let braced = if body.is_empty() {
            "{}".to_string()
        } else {
            format!("{{\n{body}\n}}")
        };
        let text = format!("declare global {braced}");
        let mut decl = Declaration::new(DeclarationKind::Module, "global", text, self.span_from(start));
        decl.leading_comments = comments;
        self.decls.push(decl);
    }

    /// Re-process a namespace body with a restricted inner scanner. Inner
    /// declarations drop their `declare ` prefix (the enclosing envelope
    /// supplies it) and indent one level.
    fn build_namespace_body(&self, inner: &str) -> String {
        let scanner =
            Scanner::with_module_scope(inner, self.keep_comments, self.isolated_declarations);
        let output = scanner.scan();
        let mut lines: Vec<String> = Vec::new();
        for decl in &output.declarations {
            for comment in &decl.leading_comments {
                for line in comment.lines() {
                    lines.push(format!("  {line}"));
                }
            }
            for line in strip_declare_prefix(&decl.text).lines() {
                lines.push(format!("  {line}"));
            }
        }
        lines.join("\n")
    }

    // ------------------------------------------------------------------
    // Read helpers
    // ------------------------------------------------------------------

    pub(crate) fn read_generics(&mut self) -> Option<String> {
        if self.cur.peek() == Some(b'<') {
            let start = self.cur.pos;
            self.cur.find_matching_close(b'<', b'>');
            Some(self.cur.slice(start, self.cur.pos).to_string())
        } else {
            None
        }
    }

    /// Balanced read until one of `stops` at depth zero, honouring ASI at
    /// newlines. `balance_angles` treats `<...>` as a bracket pair (type
    /// position); expression position must not, or a lone `<` comparison
    /// would swallow the rest of the file.
    pub(crate) fn read_until(&mut self, stops: &[u8], balance_angles: bool, member: bool) -> String {
        self.cur.skip_whitespace_and_comments();
        let start = self.cur.pos;
        let mut last_sig: u8 = 0;
        let mut last_was_arrow = false;
        loop {
            let Some(b) = self.cur.peek() else { break };
            // `=` as a stop must not fire on the `=` of an arrow.
            if stops.contains(&b) && !(b == b'=' && self.cur.peek_at(1) == Some(b'>')) {
                break;
            }
            match b {
                b'\'' | b'"' => {
                    self.cur.skip_string(b);
                    last_sig = b;
                    last_was_arrow = false;
                }
                b'`' => {
                    self.cur.skip_template_literal();
                    last_sig = b'`';
                    last_was_arrow = false;
                }
                b'/' => match self.cur.peek_at(1) {
                    Some(b'/') => self.cur.skip_line_comment(),
                    Some(b'*') => self.cur.skip_block_comment(),
                    _ => {
                        if self.cur.is_regex_start() {
                            self.cur.skip_regex();
                        } else {
                            self.cur.pos += 1;
                        }
                        last_sig = b'/';
                        last_was_arrow = false;
                    }
                },
                b'(' => {
                    self.cur.find_matching_close(b'(', b')');
                    last_sig = b')';
                    last_was_arrow = false;
                }
                b'[' => {
                    self.cur.find_matching_close(b'[', b']');
                    last_sig = b']';
                    last_was_arrow = false;
                }
                b'{' => {
                    self.cur.find_matching_close(b'{', b'}');
                    last_sig = b'}';
                    last_was_arrow = false;
                }
                b'<' if balance_angles => {
                    self.cur.find_matching_close(b'<', b'>');
                    last_sig = b'>';
                    last_was_arrow = false;
                }
                b'=' if self.cur.peek_at(1) == Some(b'>') => {
                    self.cur.pos += 2;
                    last_was_arrow = true;
                    last_sig = b'>';
                }
                b'\n' => {
                    let continues = last_was_arrow
                        || matches!(
                            last_sig,
                            b'+' | b'-'
                                | b'*'
                                | b'/'
                                | b'%'
                                | b'&'
                                | b'|'
                                | b'^'
                                | b'='
                                | b'?'
                                | b':'
                                | b','
                                | b'.'
                                | b'<'
                                | b'('
                                | b'['
                                | b'{'
                        )
                        || if member {
                            !self.cur.check_asi_member()
                        } else {
                            !self.cur.check_asi_top_level()
                        };
                    if continues {
                        self.cur.pos += 1;
                    } else {
                        break;
                    }
                }
                _ => {
                    if !matches!(b, b' ' | b'\t' | b'\r') {
                        last_sig = b;
                        last_was_arrow = false;
                    }
                    self.cur.pos += 1;
                }
            }
        }
        self.cur.slice(start, self.cur.pos).trim().to_string()
    }

    /// Read a return type. A `{` at depth zero ends the read (the function
    /// body) unless the type text so far ends with `|`, `&`, `is`, or
    /// `extends`, or is still empty (an object return type).
    pub(crate) fn read_return_type(&mut self) -> String {
        let mut ty = String::new();
        loop {
            let part = self.read_until(&[b';', b'{', b'}', b','], true, false);
            if !part.is_empty() {
                if !ty.is_empty() {
                    ty.push(' ');
                }
                ty.push_str(&part);
            }
            if self.cur.peek() != Some(b'{') {
                break;
            }
            let trimmed = ty.trim_end();
            let continues = trimmed.is_empty()
                || trimmed.ends_with('|')
                || trimmed.ends_with('&')
                || ends_with_word(trimmed, "is")
                || ends_with_word(trimmed, "extends");
            if !continues {
                break;
            }
            let bstart = self.cur.pos;
            self.cur.find_matching_close(b'{', b'}');
            if !ty.is_empty() && !ty.ends_with(' ') {
                ty.push(' ');
            }
            ty.push_str(self.cur.slice(bstart, self.cur.pos));
        }
        ty.trim().to_string()
    }

    /// Consume a function/method body or a trailing semicolon if one is
    /// next, without eating trivia that belongs to the next statement.
    pub(crate) fn try_consume_body_or_semi(&mut self) -> bool {
        let mut probe = self.cur.clone();
        probe.skip_whitespace_and_comments();
        match probe.peek() {
            Some(b'{') => {
                self.cur = probe;
                self.cur.find_matching_close(b'{', b'}');
                true
            }
            Some(b';') => {
                probe.pos += 1;
                self.cur = probe;
                false
            }
            _ => false,
        }
    }

    pub(crate) fn consume_optional_semi(&mut self) {
        let mut probe = self.cur.clone();
        probe.skip_whitespace_and_comments();
        if probe.peek() == Some(b';') {
            probe.pos += 1;
            self.cur = probe;
        }
    }

    /// Skip an unparseable statement to the next statement boundary,
    /// balancing brackets and honouring ASI.
    pub(crate) fn skip_statement(&mut self) {
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
                    self.cur.find_matching_close(b'{', b'}');
                }
                b'\n' => {
                    self.cur.pos += 1;
                    if self.cur.check_asi_top_level() {
                        return;
                    }
                }
                _ => self.cur.pos += 1,
            }
        }
    }

    pub(crate) fn span_from(&self, start: usize) -> Span {
        Span::new(start as u32, self.cur.pos as u32)
    }

    // ------------------------------------------------------------------
    // Overload implementation removal
    // ------------------------------------------------------------------

    fn remove_overload_implementations(&mut self) {
        use rustc_hash::FxHashMap;
        let mut by_name: FxHashMap<&str, Vec<usize>> = FxHashMap::default();
        for (i, d) in self.decls.iter().enumerate() {
            if d.kind == DeclarationKind::Function {
                by_name.entry(d.name.as_str()).or_default().push(i);
            }
        }
        let mut to_remove: Vec<usize> = Vec::new();
        for (name, idxs) in &by_name {
            if idxs.len() > 1 {
                if let Some(&impl_idx) =
                    idxs.iter().filter(|i| self.body_bearing.contains(*i)).last()
                {
                    tracing::debug!(name, "dropping overload implementation signature");
                    to_remove.push(impl_idx);
                }
            }
        }
        to_remove.sort_unstable_by(|a, b| b.cmp(a));
        for i in to_remove {
            self.decls.remove(i);
        }
    }
}

/// Split a class heritage clause into `extends` and `implements` parts.
fn split_heritage(heritage: &str) -> (Option<String>, Option<String>) {
    let h = heritage.trim();
    if h.is_empty() {
        return (None, None);
    }
    if let Some(rest) = h.strip_prefix("extends") {
        let rest = rest.trim_start();
        if let Some(idx) = find_top_level_word(rest, "implements") {
            let ext = rest[..idx].trim().to_string();
            let impls = rest[idx + "implements".len()..].trim().to_string();
            return (
                (!ext.is_empty()).then_some(ext),
                (!impls.is_empty()).then_some(impls),
            );
        }
        return ((!rest.is_empty()).then_some(rest.to_string()), None);
    }
    if let Some(rest) = h.strip_prefix("implements") {
        let rest = rest.trim().to_string();
        return (None, (!rest.is_empty()).then_some(rest));
    }
    (None, None)
}

/// Find a whole word at bracket depth zero.
fn find_top_level_word(s: &str, word: &str) -> Option<usize> {
    use dtsr_common::cursor::is_ident_char;
    let bytes = s.as_bytes();
    let mut cur = Cursor::new(s);
    let mut depth = 0i32;
    while let Some(b) = cur.peek() {
        match b {
            b'\'' | b'"' => {
                cur.skip_string(b);
                continue;
            }
            b'(' | b'[' | b'{' | b'<' => depth += 1,
            b')' | b']' | b'}' | b'>' => depth = (depth - 1).max(0),
            _ => {
                if depth == 0 && cur.peek_word(word) {
                    let at = cur.pos;
                    if at == 0 || !is_ident_char(bytes[at - 1]) {
                        return Some(at);
                    }
                }
            }
        }
        cur.pos += 1;
    }
    None
}

fn ends_with_word(s: &str, word: &str) -> bool {
    use dtsr_common::cursor::is_ident_char;
    if !s.ends_with(word) {
        return false;
    }
    let before = s.len() - word.len();
    before == 0 || !is_ident_char(s.as_bytes()[before - 1])
}

fn strip_declare_prefix(text: &str) -> String {
    if let Some(rest) = text.strip_prefix("export declare ") {
        format!("export {rest}")
    } else if let Some(rest) = text.strip_prefix("declare ") {
        rest.to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
#[path = "tests/scanner.rs"]
mod tests;
