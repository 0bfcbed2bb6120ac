//! Character-level TypeScript scanner for the dtsr declaration emitter.
//!
//! The scanner consumes raw source text and emits an ordered vector of
//! [`Declaration`] records without building a general AST. Each record
//! carries the already-shaped declaration text in `.d.ts` form; the
//! processor (in `dtsr-emitter`) only includes, omits, or reorders them.
//!
//! ```text
//! source ──▶ Scanner ──▶ Vec<Declaration> + held-back interfaces
//! ```
//!
//! Shaping that happens here:
//! - function/class/variable/interface/type/enum/module rendering
//! - DTS-safe parameter rebuilding
//! - class-body reshaping (modifier filtering, parameter-property lifting)
//! - initializer type inference for untyped bindings

pub mod declaration;
pub use declaration::{DeclFlags, Declaration, DeclarationKind};

pub mod scanner;
pub use scanner::{ScanOutput, Scanner};

mod braces;
mod class_body;
pub mod infer;
pub mod params;
