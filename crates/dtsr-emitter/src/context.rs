//! Processing options threaded through the emitter.

/// Options for one processing run. Constructed by the caller; the core
/// loads no configuration of its own.
#[derive(Clone, Debug, Default)]
pub struct ProcessingContext {
    /// The original source text (directive extraction reads the prologue
    /// directly rather than going through declarations).
    pub source_code: String,
    /// Attach leading comments to emitted declarations.
    pub keep_comments: bool,
    /// Skip initializer parsing for bindings with explicit non-generic
    /// annotations.
    pub isolated_declarations: bool,
    /// Module-specifier prefixes driving import sort order. Imports whose
    /// specifier matches an earlier prefix sort first; unmatched imports
    /// sort last, lexicographically.
    pub import_priority: Vec<String>,
}

impl ProcessingContext {
    pub fn new(source_code: impl Into<String>, keep_comments: bool, isolated: bool) -> Self {
        ProcessingContext {
            source_code: source_code.into(),
            keep_comments,
            isolated_declarations: isolated,
            import_priority: Vec::new(),
        }
    }
}
