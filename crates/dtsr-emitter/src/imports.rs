//! Import statement parsing, caching, and deterministic rebuilding.
//!
//! Imports are the one declaration kind the processor rewrites rather
//! than carries verbatim: only the names actually referenced by retained
//! declarations survive, and the statement is rebuilt in a canonical
//! shape. Parsed item lists are cached process-wide, keyed by statement
//! text, behind a bounded FIFO cache.

use dtsr_common::cursor::is_ident_start;
use dtsr_common::limits::IMPORT_ITEMS_CACHE_CAP;
use dtsr_common::{BoundedCache, Cursor};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// One imported binding.
///
/// `local_name` is what appears in code after any `X as Y` renaming;
/// `original_name` is what the exporting module exposes (`"*"` for a
/// namespace import).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportItem {
    pub local_name: String,
    pub original_name: String,
    pub is_type_only: bool,
    pub is_default: bool,
}

/// A parsed import statement.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedImport {
    pub items: Vec<ImportItem>,
    pub source: String,
    /// `import type ...` (whole-clause type-only).
    pub type_only: bool,
}

static IMPORT_CACHE: Lazy<Mutex<BoundedCache<String, ParsedImport>>> =
    Lazy::new(|| Mutex::new(BoundedCache::new(IMPORT_ITEMS_CACHE_CAP)));

/// Parse an import statement's clause into items. Returns `None` for
/// statements with no binding clause (side-effect imports included).
pub fn parse_import(text: &str) -> Option<ParsedImport> {
    {
        let cache = match IMPORT_CACHE.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(hit) = cache.get(text) {
            return Some(hit.clone());
        }
    }
    let parsed = parse_import_uncached(text)?;
    let mut cache = match IMPORT_CACHE.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    cache.insert(text.to_string(), parsed.clone());
    Some(parsed)
}

fn parse_import_uncached(text: &str) -> Option<ParsedImport> {
    let mut cur = Cursor::new(text);
    if !cur.match_word("import") {
        return None;
    }
    cur.skip_whitespace_and_comments();

    let mut type_only = false;
    if cur.peek_word("type") {
        let mut probe = cur.clone();
        probe.match_word("type");
        probe.skip_whitespace_and_comments();
        let clause_follows = match probe.peek() {
            Some(b'{') | Some(b'*') => true,
            Some(b) if is_ident_start(b) => !probe.peek_word("from"),
            _ => false,
        };
        if clause_follows {
            type_only = true;
            cur = probe;
        }
    }

    if matches!(cur.peek(), Some(b'\'' | b'"')) {
        // Side-effect import: no items.
        return None;
    }

    let mut items: Vec<ImportItem> = Vec::new();
    loop {
        cur.skip_whitespace_and_comments();
        match cur.peek() {
            Some(b'{') => {
                let start = cur.pos;
                cur.find_matching_close(b'{', b'}');
                let inner = &text[start + 1..cur.pos.saturating_sub(1)];
                parse_named_list(inner, type_only, &mut items);
            }
            Some(b'*') => {
                cur.pos += 1;
                cur.skip_whitespace_and_comments();
                cur.match_word("as");
                cur.skip_whitespace_and_comments();
                let local = cur.read_ident();
                if !local.is_empty() {
                    items.push(ImportItem {
                        local_name: local.to_string(),
                        original_name: "*".to_string(),
                        is_type_only: type_only,
                        is_default: false,
                    });
                }
            }
            Some(b',') => {
                cur.pos += 1;
            }
            Some(b) if is_ident_start(b) => {
                if cur.peek_word("from") {
                    cur.match_word("from");
                    break;
                }
                let name = cur.read_ident().to_string();
                items.push(ImportItem {
                    local_name: name.clone(),
                    original_name: name,
                    is_type_only: type_only,
                    is_default: true,
                });
            }
            _ => break,
        }
    }

    cur.skip_whitespace_and_comments();
    let mut source = String::new();
    if let Some(q @ (b'\'' | b'"')) = cur.peek() {
        let start = cur.pos;
        cur.skip_string(q);
        source = text[start + 1..cur.pos - 1].to_string();
    }

    Some(ParsedImport {
        items,
        source,
        type_only,
    })
}

fn parse_named_list(inner: &str, clause_type_only: bool, items: &mut Vec<ImportItem>) {
    for part in inner.split(',') {
        let mut p = part.trim();
        if p.is_empty() {
            continue;
        }
        let mut item_type_only = clause_type_only;
        if let Some(rest) = p.strip_prefix("type ") {
            item_type_only = true;
            p = rest.trim();
        }
        let (original, local) = match split_as(p) {
            Some((o, l)) => (o, l),
            None => (p, p),
        };
        if original.is_empty() {
            continue;
        }
        items.push(ImportItem {
            local_name: local.to_string(),
            original_name: original.to_string(),
            is_type_only: item_type_only,
            is_default: false,
        });
    }
}

fn split_as(p: &str) -> Option<(&str, &str)> {
    let idx = p.find(" as ")?;
    Some((p[..idx].trim(), p[idx + 4..].trim()))
}

/// Rebuild an import statement from the surviving items, in canonical
/// `import [type] [D][, * as N][, { a, b as c }] from 'M';` shape.
pub fn rebuild_import(items: &[ImportItem], source: &str, type_only: bool) -> String {
    let mut clause = String::new();
    if let Some(default) = items.iter().find(|i| i.is_default) {
        clause.push_str(&default.local_name);
    }
    if let Some(ns) = items.iter().find(|i| i.original_name == "*") {
        if !clause.is_empty() {
            clause.push_str(", ");
        }
        clause.push_str("* as ");
        clause.push_str(&ns.local_name);
    }
    let named: Vec<&ImportItem> = items
        .iter()
        .filter(|i| !i.is_default && i.original_name != "*")
        .collect();
    if !named.is_empty() {
        if !clause.is_empty() {
            clause.push_str(", ");
        }
        clause.push_str("{ ");
        for (i, item) in named.iter().enumerate() {
            if i > 0 {
                clause.push_str(", ");
            }
            if item.is_type_only && !type_only {
                clause.push_str("type ");
            }
            clause.push_str(&item.original_name);
            if item.local_name != item.original_name {
                clause.push_str(" as ");
                clause.push_str(&item.local_name);
            }
        }
        clause.push_str(" }");
    }
    let ty = if type_only { "type " } else { "" };
    format!("import {ty}{clause} from '{source}';")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_imports() {
        let parsed = parse_import("import { a, b as c } from 'mod';").unwrap();
        assert_eq!(parsed.source, "mod");
        assert_eq!(parsed.items.len(), 2);
        assert_eq!(parsed.items[0].local_name, "a");
        assert_eq!(parsed.items[1].local_name, "c");
        assert_eq!(parsed.items[1].original_name, "b");
    }

    #[test]
    fn test_parse_default_and_namespace() {
        let parsed = parse_import("import React, * as all from 'react';").unwrap();
        assert!(parsed.items[0].is_default);
        assert_eq!(parsed.items[1].original_name, "*");
        assert_eq!(parsed.items[1].local_name, "all");
    }

    #[test]
    fn test_parse_type_only_clause() {
        let parsed = parse_import("import type { T } from './t';").unwrap();
        assert!(parsed.type_only);
        assert!(parsed.items[0].is_type_only);
    }

    #[test]
    fn test_parse_inline_type_item() {
        let parsed = parse_import("import { type T, value } from './m';").unwrap();
        assert!(parsed.items[0].is_type_only);
        assert!(!parsed.items[1].is_type_only);
    }

    #[test]
    fn test_side_effect_import_has_no_items() {
        assert!(parse_import("import './styles.css';").is_none());
    }

    #[test]
    fn test_rebuild_named_subset() {
        let parsed = parse_import("import { a, b, c } from 'mod';").unwrap();
        let used: Vec<ImportItem> = parsed
            .items
            .into_iter()
            .filter(|i| i.local_name != "b")
            .collect();
        assert_eq!(
            rebuild_import(&used, &parsed.source, false),
            "import { a, c } from 'mod';"
        );
    }

    #[test]
    fn test_rebuild_mixed_clause() {
        let parsed = parse_import("import D, { x } from 'm';").unwrap();
        assert_eq!(
            rebuild_import(&parsed.items, "m", false),
            "import D, { x } from 'm';"
        );
    }

    #[test]
    fn test_rebuild_preserves_rename_and_type() {
        let items = vec![ImportItem {
            local_name: "Local".into(),
            original_name: "Orig".into(),
            is_type_only: true,
            is_default: false,
        }];
        assert_eq!(
            rebuild_import(&items, "m", false),
            "import { type Orig as Local } from 'm';"
        );
    }

    #[test]
    fn test_repeated_parse_hits_cache() {
        let text = "import { cached } from 'cache-test';";
        let first = parse_import(text).unwrap();
        let second = parse_import(text).unwrap();
        assert_eq!(first, second);
    }
}
