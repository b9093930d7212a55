//! The context lookup engine: `GetContext(ObjectID) → CodeObjectContext`, the
//! top-level query API that joins every other subsystem (spec.md §4.7).

pub mod relationships;
pub mod structure;
pub mod usage;

pub use relationships::{DirectRelationships, RelatedObject};
pub use structure::{CompositionPattern, StructureContext};
pub use usage::{BreakingChangeRisk, UsageAnalysis};

use crate::content_store::ContentStore;
use crate::error::{IndexError, IndexResult};
use crate::symbol::ScopeEntry;
use crate::tracker::ReferenceTracker;
use crate::types::{CompactString, ObjectId, SymbolId};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicInfo {
    pub symbol_id: SymbolId,
    pub name: CompactString,
    pub kind: crate::types::SymbolKind,
    pub range: crate::types::Range,
    pub signature: Option<CompactString>,
    pub doc_comment: Option<CompactString>,
}

/// Local variables/fields/parameters textually declared within the symbol's
/// own span. Spec.md §4.7 names this section without elaborating its
/// contents; this crate treats it as the symbol's assignment/declaration
/// targets (documented in DESIGN.md as an explicit Open Question decision).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariableContext {
    pub declared_names: Vec<CompactString>,
}

/// Symbols sharing a semantic-search relationship (same split word) with
/// this symbol's name, excluding itself. As with `VariableContext`, spec.md
/// §4.7 names this section without elaborating its contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SemanticContext {
    pub related_names: Vec<CompactString>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeObjectContext {
    pub object_id_name: CompactString,
    pub basic_info: BasicInfo,
    pub direct_relationships: DirectRelationships,
    pub variable_context: VariableContext,
    pub semantic_context: SemanticContext,
    pub structure_context: StructureContext,
    pub usage_analysis: UsageAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_enhanced: Option<serde_json::Value>,
}

pub struct ContextLookupEngine {
    tracker: Arc<ReferenceTracker>,
    content_store: Arc<ContentStore>,
    confidence_threshold: f32,
    ai_enhanced_enabled: AtomicBool,
}

impl ContextLookupEngine {
    pub fn new(tracker: Arc<ReferenceTracker>, content_store: Arc<ContentStore>) -> Self {
        Self {
            tracker,
            content_store,
            confidence_threshold: 0.9,
            ai_enhanced_enabled: AtomicBool::new(false),
        }
    }

    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn set_ai_enhanced_enabled(&self, enabled: bool) {
        self.ai_enhanced_enabled.store(enabled, Ordering::SeqCst);
    }

    /// Validates `object_id`, then fills the context in the fixed order
    /// spec.md §4.7 requires: basic info, direct relationships, variable
    /// context, semantic context, structure context, usage analysis,
    /// optional AI-enhanced fields. Any subsection failure bubbles up as
    /// `"failed to get <section>: <cause>"`.
    pub fn get_context(&self, object_id: &ObjectId) -> IndexResult<CodeObjectContext> {
        if !object_id.is_valid() {
            return Err(IndexError::InvalidObjectId {
                reason: "object id name is empty".to_string(),
            });
        }

        let symbol = self
            .tracker
            .get_symbol(object_id.symbol_id)
            .ok_or_else(|| IndexError::ContextSection {
                section: "basic info",
                cause: format!("no symbol indexed for id {:?}", object_id.symbol_id),
            })?;

        if symbol.file_id != object_id.file_id || symbol.name != object_id.name || symbol.kind != object_id.kind {
            return Err(IndexError::ContextSection {
                section: "basic info",
                cause: "object id does not match the indexed symbol's identity".to_string(),
            });
        }

        let basic_info = BasicInfo {
            symbol_id: symbol.id,
            name: symbol.name.clone(),
            kind: symbol.kind,
            range: symbol.range,
            signature: symbol.signature.clone(),
            doc_comment: symbol.doc_comment.clone(),
        };

        let (incoming, outgoing, callers, callees) =
            relationships::build_edges(&self.tracker, &symbol, self.confidence_threshold);
        let parent_objects = relationships::parent_objects(&self.tracker, &symbol);
        let child_objects = relationships::child_objects(&self.tracker, &symbol);
        let direct_relationships = DirectRelationships {
            incoming,
            outgoing,
            callers,
            callees,
            parent_objects,
            child_objects,
        };

        let variable_context = VariableContext {
            declared_names: symbol
                .outgoing_refs
                .iter()
                .filter(|r| {
                    matches!(
                        r.reference_type,
                        crate::reference::ReferenceType::Assignment | crate::reference::ReferenceType::Declaration
                    )
                })
                .map(|r| r.referenced_name.clone())
                .collect(),
        };

        let semantic_context = SemanticContext {
            related_names: related_symbol_names(&self.tracker, &symbol),
        };

        let file_path = self.content_store.get_path(symbol.file_id);
        let structure_context = structure::build(&self.tracker, &symbol, file_path);

        let usage_analysis = usage::analyze(&symbol, &direct_relationships.callers, &direct_relationships.callees);

        let ai_enhanced = if self.ai_enhanced_enabled.load(Ordering::SeqCst) {
            Some(serde_json::json!({ "available": false }))
        } else {
            None
        };

        Ok(CodeObjectContext {
            object_id_name: object_id.name.clone(),
            basic_info,
            direct_relationships,
            variable_context,
            semantic_context,
            structure_context,
            usage_analysis,
            ai_enhanced,
        })
    }
}

/// Names of other in-scope symbols sharing an enclosing scope with `symbol`,
/// used as a cheap proxy for "semantically related" absent a full semantic
/// search index wired into the engine.
fn related_symbol_names(tracker: &ReferenceTracker, symbol: &crate::symbol::Symbol) -> Vec<CompactString> {
    tracker
        .symbols_in_file(symbol.file_id)
        .into_iter()
        .filter(|candidate| candidate.id != symbol.id && shares_enclosing_scope(&candidate.scope_chain, &symbol.scope_chain))
        .map(|candidate| candidate.name)
        .collect()
}

fn shares_enclosing_scope(a: &[ScopeEntry], b: &[ScopeEntry]) -> bool {
    a.iter().any(|sa| b.iter().any(|sb| sa.name == sb.name && !sa.name.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ParsedFile, RawReference, RawSymbol};
    use crate::reference::ReferenceType;
    use crate::types::{FileId, SymbolKind};

    fn file(n: u32) -> FileId {
        FileId::new(n).unwrap()
    }

    fn raw(name: &str, kind: SymbolKind, line: u32, end_line: u32) -> RawSymbol {
        RawSymbol {
            name: name.into(),
            kind,
            line,
            end_line,
            column: 0,
            end_column: 0,
            signature: Some("fn f()".into()),
            doc_comment: None,
            complexity: 2,
            parameter_count: 0,
            visibility: None,
        }
    }

    fn engine_with(tracker: Arc<ReferenceTracker>) -> ContextLookupEngine {
        ContextLookupEngine::new(tracker, Arc::new(ContentStore::new()))
    }

    #[test]
    fn rejects_invalid_object_id() {
        let tracker = Arc::new(ReferenceTracker::new());
        let engine = engine_with(tracker);
        let bad = ObjectId::new(FileId::new(1).unwrap(), SymbolId::new(1).unwrap(), "", SymbolKind::Function);
        assert!(engine.get_context(&bad).is_err());
    }

    #[test]
    fn rejects_object_id_mismatched_against_indexed_symbol() {
        let tracker = Arc::new(ReferenceTracker::new());
        let parsed = ParsedFile { symbols: vec![raw("f", SymbolKind::Function, 1, 5)], scopes: vec![], references: vec![] };
        let ids = tracker.process_file(file(1), "a.rs", parsed);
        let engine = engine_with(tracker);

        let wrong = ObjectId::new(file(1), ids[0], "different-name", SymbolKind::Function);
        assert!(engine.get_context(&wrong).is_err());
    }

    #[test]
    fn assembles_full_context_for_a_valid_object_id() {
        let tracker = Arc::new(ReferenceTracker::new());
        let parsed = ParsedFile {
            symbols: vec![raw("caller", SymbolKind::Function, 1, 10), raw("callee", SymbolKind::Function, 20, 30)],
            scopes: vec![],
            references: vec![(
                0,
                vec![RawReference { reference_type: ReferenceType::Call, referenced_name: "callee".into(), line: 2, column: 0 }],
            )],
        };
        let ids = tracker.process_file(file(1), "a.rs", parsed);
        tracker.process_all_references();

        let engine = engine_with(tracker);
        let object_id = ObjectId::new(file(1), ids[0], "caller", SymbolKind::Function);
        let context = engine.get_context(&object_id).unwrap();

        assert_eq!(context.basic_info.name.as_ref(), "caller");
        assert_eq!(context.direct_relationships.outgoing.len(), 1);
        assert_eq!(context.direct_relationships.callees.len(), 1);
        assert!(context.ai_enhanced.is_none());
    }

    #[test]
    fn ai_enhanced_section_appears_only_when_enabled() {
        let tracker = Arc::new(ReferenceTracker::new());
        let parsed = ParsedFile { symbols: vec![raw("f", SymbolKind::Function, 1, 5)], scopes: vec![], references: vec![] };
        let ids = tracker.process_file(file(1), "a.rs", parsed);
        let engine = engine_with(tracker);
        engine.set_ai_enhanced_enabled(true);

        let object_id = ObjectId::new(file(1), ids[0], "f", SymbolKind::Function);
        let context = engine.get_context(&object_id).unwrap();
        assert!(context.ai_enhanced.is_some());
    }
}
