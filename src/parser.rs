//! The `Parser` plug-in contract (external collaborator interface).
//!
//! Parsers are not implemented by this crate — they are an opaque,
//! language-specific boundary the same way `codanna`'s `LanguageParser` trait
//! (`parsing/parser.rs`) separates tree-sitter grammars from the indexing
//! engine. This module only defines the shapes a conforming parser must
//! produce so that [`crate::tracker::ReferenceTracker`] can consume them.

use crate::reference::ReferenceType;
use crate::types::{CompactString, SymbolKind};

/// One symbol as reported directly by a parser, before the tracker assigns
/// it a process-wide [`crate::types::SymbolId`].
#[derive(Debug, Clone)]
pub struct RawSymbol {
    pub name: CompactString,
    pub kind: SymbolKind,
    pub line: u32,
    pub end_line: u32,
    pub column: u16,
    pub end_column: u16,
    pub signature: Option<CompactString>,
    pub doc_comment: Option<CompactString>,
    pub complexity: u32,
    pub parameter_count: u32,
    /// `Some(true/false)` when the parser can determine exported-ness
    /// directly (e.g. a `pub` keyword); `None` defers to the tracker's
    /// naming-convention fallback (spec.md §4.3).
    pub visibility: Option<bool>,
}

/// One lexical scope as reported by a parser. `end_line == 0` means
/// "unbounded" (extends to the end of the file), per spec.md §3/§4.3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeInfo {
    pub start_line: u32,
    pub end_line: u32,
}

impl ScopeInfo {
    pub fn new(start_line: u32, end_line: u32) -> Self {
        Self { start_line, end_line }
    }

    /// Does this scope cover `line`, treating `end_line == 0` as `+∞`?
    pub fn contains_line(&self, line: u32) -> bool {
        line >= self.start_line && (self.end_line == 0 || line <= self.end_line)
    }
}

/// A scope entry carrying the human name needed to derive parent objects in
/// the context engine (spec.md §4.7 "Parent objects... map `ScopeType →
/// SymbolType`"), in addition to the line range `ScopeInfo` tracks.
#[derive(Debug, Clone)]
pub struct NamedScope {
    pub name: CompactString,
    pub kind: SymbolKind,
    pub range: ScopeInfo,
}

/// An unresolved outgoing reference as a parser emits it: the target is
/// named textually, not yet linked to a `SymbolId` — cross-file resolution
/// is the tracker's job (spec.md §6).
#[derive(Debug, Clone)]
pub struct RawReference {
    pub reference_type: ReferenceType,
    pub referenced_name: CompactString,
    pub line: u32,
    pub column: u16,
}

/// Everything one parser invocation must produce for a single file.
#[derive(Debug, Clone, Default)]
pub struct ParsedFile {
    pub symbols: Vec<RawSymbol>,
    pub scopes: Vec<NamedScope>,
    /// Parallel to `symbols`: outgoing references keyed by the symbol's
    /// index within `symbols`.
    pub references: Vec<(usize, Vec<RawReference>)>,
}

/// Required of any language plug-in. Implementations live outside this
/// crate; this trait only fixes the boundary the tracker depends on.
pub trait Parser: Send + Sync {
    /// Parse one file's content into symbols, scopes, and raw references.
    /// Implementations should not panic; recoverable parse errors should be
    /// reported by returning as much of `ParsedFile` as could be recovered.
    fn parse(&self, path: &str, content: &[u8]) -> ParsedFile;

    /// Human name of the language this parser handles, e.g. `"rust"`.
    fn language(&self) -> &'static str;
}
