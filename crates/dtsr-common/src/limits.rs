//! Centralized limits and thresholds for the declaration emitter.
//!
//! This module provides shared constants for recursion depths, collapse
//! thresholds, and cache capacities used throughout the codebase.
//! Centralizing these values prevents duplicate definitions with
//! inconsistent values and documents the rationale for each limit.
//!
//! Several of these values are part of the emission contract: changing
//! them changes the emitted declaration text for some inputs.

/// Maximum recursion depth for initializer type inference.
///
/// Inference recurses through nested array and object literals. Past this
/// depth it stops and widens: `Record<string, unknown>` in object context,
/// `unknown[]` in array context, `unknown` otherwise. The scanner itself
/// is iterative and has no depth bound.
pub const MAX_INFER_DEPTH: usize = 12;

/// Function-type expressions longer than this always collapse to
/// `(...args: any[]) => any`.
pub const FN_COLLAPSE_LEN: usize = 200;

/// Function-type expressions longer than this collapse when they also
/// contain more than [`FN_COLLAPSE_ARROWS`] arrow tokens.
pub const FN_COLLAPSE_LEN_WITH_ARROWS: usize = 100;

/// Arrow-token count that, combined with [`FN_COLLAPSE_LEN_WITH_ARROWS`],
/// collapses a function-type expression.
pub const FN_COLLAPSE_ARROWS: usize = 2;

/// A function-type expression with more `<` tokens than this collapses
/// regardless of length.
pub const FN_COLLAPSE_ANGLES: usize = 5;

/// Maximum element count for emitting an all-literal array initializer as
/// a `readonly [...]` tuple. Longer arrays fall back to `T[]` or a union
/// element array.
pub const TUPLE_LITERAL_MAX: usize = 10;

/// Capacity of the process-wide substring-finder cache used by whole-word
/// matching. Inserting past this bound evicts the oldest entry.
pub const FINDER_CACHE_CAP: usize = 500;

/// Capacity of the process-wide import-items cache keyed by import
/// statement text. Inserting past this bound evicts the oldest entry.
pub const IMPORT_ITEMS_CACHE_CAP: usize = 200;
