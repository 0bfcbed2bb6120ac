//! Declaration processor for the dtsr emitter.
//!
//! The scanner produces declaration records; this crate owns everything
//! that happens after: triple-slash directive extraction, deterministic
//! output ordering, reference resolution for non-exported types, unused
//! import elision, and the final emission. The processor never rewrites
//! declaration text - it only includes, omits, or reorders.

pub mod context;
pub use context::ProcessingContext;

pub mod directives;

pub mod imports;
pub use imports::ImportItem;

pub mod processor;
pub use processor::process_declarations;
