//! dtsr - a single-file TypeScript declaration (`.d.ts`) emitter.
//!
//! Each source file is processed in isolation: a character-level scanner
//! turns the text into declaration records, a type inference pass narrows
//! untyped initializers, and a processor orders the output, resolves
//! by-name references, and drops unused imports. No type checker, no
//! project graph, no I/O.
//!
//! ```
//! let dts = dtsr::process_source("export const port = 3000", false, false);
//! assert_eq!(dts, "export declare const port: 3000;");
//! ```
//!
//! Errors never escape: malformed input degrades to skipped statements or
//! `unknown` types, and the emitter always returns a (possibly empty)
//! string.

use rayon::prelude::*;

pub use dtsr_common::Span;
pub use dtsr_emitter::{ImportItem, ProcessingContext, process_declarations};
pub use dtsr_scanner::{DeclFlags, Declaration, DeclarationKind, ScanOutput, Scanner};

/// Emit the declaration file for one TypeScript source.
///
/// A leading byte-order mark is tolerated; empty input yields an empty
/// string. The result is byte-for-byte deterministic for a given
/// `(source, flags)` pair.
pub fn process_source(source: &str, keep_comments: bool, isolated_declarations: bool) -> String {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    if source.trim().is_empty() {
        return String::new();
    }
    let output = Scanner::new(source, keep_comments, isolated_declarations).scan();
    let ctx = ProcessingContext::new(source, keep_comments, isolated_declarations);
    process_declarations(output, &ctx)
}

/// Emit declaration files for a batch of sources in parallel.
///
/// Output order matches input order. `thread_count == 0` auto-detects
/// (the default rayon pool); any other value builds a dedicated pool of
/// exactly that many workers. Files share no state, so this is a plain
/// fan-out and join.
pub fn process_batch(sources: &[String], keep_comments: bool, thread_count: u32) -> Vec<String> {
    let run = || {
        sources
            .par_iter()
            .map(|src| process_source(src, keep_comments, false))
            .collect::<Vec<String>>()
    };
    if thread_count == 0 {
        return run();
    }
    match rayon::ThreadPoolBuilder::new()
        .num_threads(thread_count as usize)
        .build()
    {
        Ok(pool) => pool.install(run),
        Err(e) => {
            tracing::debug!(error = %e, "thread pool construction failed; running sequentially");
            sources
                .iter()
                .map(|src| process_source(src, keep_comments, false))
                .collect()
        }
    }
}
