//! Common types and utilities for the dtsr declaration emitter.
//!
//! This crate provides the foundations used across all dtsr crates:
//! - Source spans (`Span`)
//! - The character-level cursor and lexical primitives (`Cursor`)
//! - Comment collection and JSDoc helpers
//! - Whole-word identifier matching
//! - Bounded process-wide caches
//! - Centralized limits and thresholds

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::Span;

// Centralized limits and thresholds
pub mod limits;

// Character-level cursor over source bytes
pub mod cursor;
pub use cursor::{Cursor, is_ident_char, is_ident_start};

// Comment collection and JSDoc utilities
pub mod comments;

// Whole-word identifier matching
pub mod words;
pub use words::contains_word;

// Bounded insertion-ordered cache
pub mod cache;
pub use cache::BoundedCache;
