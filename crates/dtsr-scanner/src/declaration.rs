//! Declaration records emitted by the scanner.
//!
//! A `Declaration` is immutable after the scanner emits it, with two
//! controlled exceptions owned by later passes: removal of overload
//! implementation signatures, and insertion of held-back non-exported
//! interfaces that turn out to be referenced.

use dtsr_common::Span;
use serde::{Deserialize, Serialize};

/// The syntactic kind of a scanned declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    Import,
    Function,
    Variable,
    Interface,
    Type,
    Class,
    Enum,
    /// Namespaces and ambient modules both land here; the name keeps the
    /// dotted path (namespaces) or the quoted specifier (ambient modules).
    Module,
    Export,
    Unknown,
}

bitflags::bitflags! {
    /// Boolean properties set at scan time.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct DeclFlags: u8 {
        const EXPORTED    = 1 << 0;
        const DEFAULT     = 1 << 1;
        const TYPE_ONLY   = 1 << 2;
        const SIDE_EFFECT = 1 << 3;
        const ASYNC       = 1 << 4;
        const GENERATOR   = 1 << 5;
    }
}

/// One scanned top-level (or module-scope) construct.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Declaration {
    pub kind: DeclarationKind,
    /// Canonical identifier; `""` for anonymous re-exports, quoted for
    /// ambient modules, dotted for nested namespaces, `"default"` for
    /// default exports.
    pub name: String,
    /// The already-shaped declaration text in `.d.ts` form. Leading
    /// comments are *not* part of this; they live in `leading_comments`
    /// and are attached at emission.
    pub text: String,
    pub flags: DeclFlags,
    /// Module specifier for imports and ambient modules.
    pub source: Option<String>,
    pub return_type: Option<String>,
    pub generics: Option<String>,
    pub extends: Option<String>,
    pub implements: Option<String>,
    pub modifiers: Option<String>,
    pub type_annotation: Option<String>,
    pub value: Option<String>,
    /// Verbatim comment blocks attached to the declaration; empty when
    /// comments are not kept.
    pub leading_comments: Vec<String>,
    /// Byte span of the statement in the original source. Used to stably
    /// order inserted non-exported types.
    pub span: Span,
}

impl Declaration {
    pub fn new(
        kind: DeclarationKind,
        name: impl Into<String>,
        text: impl Into<String>,
        span: Span,
    ) -> Self {
        Declaration {
            kind,
            name: name.into(),
            text: text.into(),
            flags: DeclFlags::empty(),
            source: None,
            return_type: None,
            generics: None,
            extends: None,
            implements: None,
            modifiers: None,
            type_annotation: None,
            value: None,
            leading_comments: Vec::new(),
            span,
        }
    }

    #[inline]
    pub fn is_exported(&self) -> bool {
        self.flags.contains(DeclFlags::EXPORTED)
    }

    #[inline]
    pub fn is_default(&self) -> bool {
        self.flags.contains(DeclFlags::DEFAULT)
    }

    #[inline]
    pub fn is_type_only(&self) -> bool {
        self.flags.contains(DeclFlags::TYPE_ONLY)
    }

    #[inline]
    pub fn is_side_effect(&self) -> bool {
        self.flags.contains(DeclFlags::SIDE_EFFECT)
    }

    /// The declaration as it appears in the output: leading comments (if
    /// any were kept) followed by the shaped text.
    pub fn render(&self) -> String {
        if self.leading_comments.is_empty() {
            return self.text.clone();
        }
        let mut out = String::new();
        for comment in &self.leading_comments {
            out.push_str(comment);
            out.push('\n');
        }
        out.push_str(&self.text);
        out
    }
}
