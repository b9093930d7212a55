//! `Symbol`: the unit the tracker indexes, and the `IsExported` naming-
//! convention fallback.
//!
//! Field layout is grounded on `symbol/mod.rs`'s `Symbol` struct in the
//! teacher crate (identity/location/signature/doc-comment fields), extended
//! with the scope chain, reference lists, and complexity fields spec.md §3
//! requires.

use crate::reference::Reference;
use crate::types::{CompactString, FileId, Range, SymbolId, SymbolKind};
use serde::{Deserialize, Serialize};

/// One enclosing lexical scope in a symbol's scope chain, outer to inner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeEntry {
    pub name: CompactString,
    pub kind: SymbolKind,
    pub start_line: u32,
    pub end_line: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    pub id: SymbolId,
    pub file_id: FileId,
    pub name: CompactString,
    pub kind: SymbolKind,
    pub range: Range,
    pub signature: Option<CompactString>,
    pub doc_comment: Option<CompactString>,
    /// Outer-to-inner chain of enclosing scopes, built by
    /// `crate::tracker::build_symbol_scope_chain`.
    pub scope_chain: Vec<ScopeEntry>,
    pub is_exported: bool,
    /// Cyclomatic-complexity proxy, parser-provided.
    pub complexity: u32,
    pub parameter_count: u32,
    pub outgoing_refs: Vec<Reference>,
    pub incoming_refs: Vec<Reference>,
}

impl Symbol {
    pub fn new(
        id: SymbolId,
        file_id: FileId,
        name: impl Into<CompactString>,
        kind: SymbolKind,
        range: Range,
    ) -> Self {
        Self {
            id,
            file_id,
            name: name.into(),
            kind,
            range,
            signature: None,
            doc_comment: None,
            scope_chain: Vec::new(),
            is_exported: false,
            complexity: 0,
            parameter_count: 0,
            outgoing_refs: Vec::new(),
            incoming_refs: Vec::new(),
        }
    }

    /// First-character-uppercase-and-no-leading-underscore test used by the
    /// context engine's `isPublicAPI` (spec.md §4.7), independent of the
    /// per-extension `IsExported` fallback below.
    pub fn looks_like_public_api(&self) -> bool {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(c) => c.is_uppercase() && c != '_',
            None => false,
        }
    }
}

/// Computes `IsExported` for a symbol, per spec.md §4.3: honors an explicit
/// parser-supplied visibility if present, else falls back to a per-extension
/// naming convention. Pure function of `(path, name, visibility)` — no
/// hidden state, matching spec.md §8 invariant 10.
pub fn compute_is_exported(path: &str, name: &str, visibility: Option<bool>) -> bool {
    if let Some(v) = visibility {
        return v;
    }
    if name.is_empty() {
        return false;
    }

    let extension = path.rsplit('.').next().unwrap_or("");
    match extension {
        "go" => name.chars().next().is_some_and(|c| c.is_uppercase()),
        "py" => !name.starts_with('_'),
        "js" | "ts" | "jsx" | "tsx" => !(name.starts_with('_') || name.starts_with('#')),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn go_exports_by_leading_uppercase() {
        assert!(compute_is_exported("pkg/widget.go", "NewWidget", None));
        assert!(!compute_is_exported("pkg/widget.go", "newWidget", None));
    }

    #[test]
    fn python_private_by_leading_underscore() {
        assert!(!compute_is_exported("mod.py", "_helper", None));
        assert!(compute_is_exported("mod.py", "helper", None));
    }

    #[test]
    fn js_and_ts_private_by_underscore_or_hash() {
        for ext in ["js", "ts", "jsx", "tsx"] {
            let path = format!("a.{ext}");
            assert!(!compute_is_exported(&path, "_private", None));
            assert!(!compute_is_exported(&path, "#private", None));
            assert!(compute_is_exported(&path, "public", None));
        }
    }

    #[test]
    fn empty_name_never_exported() {
        assert!(!compute_is_exported("a.go", "", None));
    }

    #[test]
    fn unknown_extension_defaults_to_exported() {
        assert!(compute_is_exported("a.rs", "anything", None));
    }

    #[test]
    fn explicit_visibility_wins_over_convention() {
        assert!(compute_is_exported("a.go", "lowercase", Some(true)));
        assert!(!compute_is_exported("a.go", "Uppercase", Some(false)));
    }
}
