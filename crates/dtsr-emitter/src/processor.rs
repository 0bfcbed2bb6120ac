//! Declaration processing and final emission.
//!
//! Output shape, in order: triple-slash directives, rewritten imports, a
//! blank line, type-only exports, then the declaration buckets (functions,
//! variables, interfaces, types, classes, enums, modules), value exports,
//! and the default export last. Within a bucket, scan order is preserved.
//!
//! Cross-declaration reference resolution is by name, late, through
//! whole-word text search: held-back non-exported interfaces are pulled in
//! transitively, and imported names not referenced by any retained
//! declaration are dropped.

use crate::context::ProcessingContext;
use crate::directives;
use crate::imports::{self, ImportItem};
use dtsr_common::contains_word;
use dtsr_scanner::{Declaration, DeclarationKind, ScanOutput};
use rustc_hash::FxHashSet;

/// Process scanned declarations into the final declaration string.
pub fn process_declarations(output: ScanOutput, ctx: &ProcessingContext) -> String {
    let ScanOutput {
        declarations,
        hoisted_interfaces,
    } = output;

    let directive_lines = directives::extract(&ctx.source_code);

    // One-pass partition into imports, emittable declarations, exports.
    let mut imports_in: Vec<Declaration> = Vec::new();
    let mut body: Vec<Declaration> = Vec::new();
    let mut exports: Vec<Declaration> = Vec::new();
    for d in declarations {
        match d.kind {
            DeclarationKind::Import => imports_in.push(d),
            DeclarationKind::Export => exports.push(d),
            DeclarationKind::Unknown => {}
            _ => body.push(d),
        }
    }

    // Export statements: exact-text dedupe, default isolated (always
    // last), type-only split from value exports.
    let mut seen_exports: FxHashSet<String> = FxHashSet::default();
    let mut type_only_exports: Vec<Declaration> = Vec::new();
    let mut value_exports: Vec<Declaration> = Vec::new();
    let mut default_export: Option<Declaration> = None;
    for e in exports {
        if !seen_exports.insert(e.text.clone()) {
            continue;
        }
        if e.is_default() {
            default_export = Some(e);
        } else if e.is_type_only() {
            type_only_exports.push(e);
        } else {
            value_exports.push(e);
        }
    }

    // Interface reference resolution. The retention test reads only
    // exported functions, classes, and type aliases; each pulled
    // interface then extends the string so transitive references
    // converge. Insertion keeps original source order.
    let mut reference_text = String::new();
    for d in &body {
        let participates = match d.kind {
            DeclarationKind::Class | DeclarationKind::Type => true,
            DeclarationKind::Function => d.is_exported(),
            _ => false,
        };
        if participates {
            reference_text.push_str(&d.text);
            reference_text.push('\n');
        }
    }
    let mut held = hoisted_interfaces;
    loop {
        let mut pulled: Vec<Declaration> = Vec::new();
        held.retain(|h| {
            if contains_word(&reference_text, &h.name) {
                pulled.push(h.clone());
                false
            } else {
                true
            }
        });
        if pulled.is_empty() {
            break;
        }
        tracing::debug!(count = pulled.len(), "pulling in referenced non-exported types");
        for p in pulled {
            reference_text.push_str(&p.text);
            reference_text.push('\n');
            let idx = body.partition_point(|d| d.span.start <= p.span.start);
            body.insert(idx, p);
        }
    }

    // Used-import detection over everything retained (imports excluded).
    let usage = combined_text(&body, &type_only_exports, &value_exports, &default_export);

    let mut rewritten: Vec<(String, String)> = Vec::new();
    for imp in &imports_in {
        let source = imp.source.clone().unwrap_or_default();
        if imp.is_side_effect() {
            // Side-effect imports are kept unconditionally; they may carry
            // type effects.
            rewritten.push((source, render(imp.leading_comments.as_slice(), &imp.text)));
            continue;
        }
        let Some(parsed) = imports::parse_import(&imp.text) else {
            rewritten.push((source, render(imp.leading_comments.as_slice(), &imp.text)));
            continue;
        };
        let used: Vec<ImportItem> = parsed
            .items
            .into_iter()
            .filter(|item| contains_word(&usage, &item.local_name))
            .collect();
        if used.is_empty() {
            tracing::debug!(source = %parsed.source, "eliding unused import");
            continue;
        }
        let text = imports::rebuild_import(&used, &parsed.source, parsed.type_only);
        rewritten.push((parsed.source, render(imp.leading_comments.as_slice(), &text)));
    }

    // Stable order: priority rank of the module prefix, then specifier.
    rewritten.sort_by(|(a, _), (b, _)| {
        let ra = priority_rank(a, &ctx.import_priority);
        let rb = priority_rank(b, &ctx.import_priority);
        ra.cmp(&rb).then_with(|| a.cmp(b))
    });

    // Emission.
    let mut lines: Vec<String> = Vec::new();
    lines.extend(directive_lines);
    for (_, text) in &rewritten {
        lines.push(text.clone());
    }
    let prologue_len = lines.len();

    let mut push_decl = |lines: &mut Vec<String>, d: &Declaration| {
        lines.push(render(d.leading_comments.as_slice(), &d.text));
    };

    let mut body_lines: Vec<String> = Vec::new();
    for e in &type_only_exports {
        push_decl(&mut body_lines, e);
    }
    for kind in [
        DeclarationKind::Function,
        DeclarationKind::Variable,
        DeclarationKind::Interface,
        DeclarationKind::Type,
        DeclarationKind::Class,
        DeclarationKind::Enum,
        DeclarationKind::Module,
    ] {
        for d in body.iter().filter(|d| d.kind == kind) {
            push_decl(&mut body_lines, d);
        }
    }
    for e in &value_exports {
        push_decl(&mut body_lines, e);
    }
    if let Some(e) = &default_export {
        push_decl(&mut body_lines, e);
    }

    if prologue_len > 0 && !body_lines.is_empty() {
        lines.push(String::new());
    }
    lines.extend(body_lines);
    lines.join("\n")
}

/// Declaration text only. Comments never feed usage detection; exported
/// variables contribute their annotations through the text itself.
fn combined_text(
    body: &[Declaration],
    type_only_exports: &[Declaration],
    value_exports: &[Declaration],
    default_export: &Option<Declaration>,
) -> String {
    let mut out = String::new();
    for d in body
        .iter()
        .chain(type_only_exports.iter())
        .chain(value_exports.iter())
        .chain(default_export.iter())
    {
        out.push_str(&d.text);
        out.push('\n');
    }
    out
}

fn priority_rank(source: &str, priority: &[String]) -> usize {
    priority
        .iter()
        .position(|prefix| source.starts_with(prefix.as_str()))
        .unwrap_or(priority.len())
}

fn render(comments: &[String], text: &str) -> String {
    if comments.is_empty() {
        return text.to_string();
    }
    let mut out = String::new();
    for c in comments {
        out.push_str(c);
        out.push('\n');
    }
    out.push_str(text);
    out
}

#[cfg(test)]
#[path = "tests/processor.rs"]
mod tests;
