//! Direct relationships section of `CodeObjectContext` (spec.md §4.7).

use crate::reference::{Reference, ReferenceType};
use crate::symbol::Symbol;
use crate::tracker::ReferenceTracker;
use crate::types::{CompactString, FileId, SymbolId, SymbolKind};
use serde::{Deserialize, Serialize};

/// Confidence assigned to an indexed (non-call) edge.
pub const INDEXED_EDGE_CONFIDENCE: f32 = 0.9;
/// Confidence assigned to a call edge.
pub const CALL_EDGE_CONFIDENCE: f32 = 0.95;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedObject {
    pub symbol_id: SymbolId,
    pub file_id: FileId,
    pub name: CompactString,
    pub kind: SymbolKind,
    pub reference_type: ReferenceType,
    pub confidence: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectRelationships {
    pub incoming: Vec<RelatedObject>,
    pub outgoing: Vec<RelatedObject>,
    pub callers: Vec<RelatedObject>,
    pub callees: Vec<RelatedObject>,
    pub parent_objects: Vec<RelatedObject>,
    pub child_objects: Vec<RelatedObject>,
}

fn confidence_for(reference_type: ReferenceType) -> f32 {
    match reference_type {
        ReferenceType::Call => CALL_EDGE_CONFIDENCE,
        _ => INDEXED_EDGE_CONFIDENCE,
    }
}

fn related_object(
    tracker: &ReferenceTracker,
    id: SymbolId,
    reference_type: ReferenceType,
) -> Option<RelatedObject> {
    let symbol = tracker.get_symbol(id)?;
    Some(RelatedObject {
        symbol_id: symbol.id,
        file_id: symbol.file_id,
        name: symbol.name.clone(),
        kind: symbol.kind,
        reference_type,
        confidence: confidence_for(reference_type),
    })
}

/// Builds the incoming/outgoing/caller/callee lists, filtering edges below
/// `confidence_threshold` (spec.md §4.7).
pub fn build_edges(
    tracker: &ReferenceTracker,
    symbol: &Symbol,
    confidence_threshold: f32,
) -> (Vec<RelatedObject>, Vec<RelatedObject>, Vec<RelatedObject>, Vec<RelatedObject>) {
    let incoming = edges_from(tracker, &symbol.incoming_refs, |r| r.source_symbol, confidence_threshold);
    let outgoing = edges_from(tracker, &symbol.outgoing_refs, |r| r.target_symbol.unwrap_or(symbol.id), confidence_threshold);

    let callers = incoming
        .iter()
        .filter(|o| o.reference_type == ReferenceType::Call && o.kind.is_callable())
        .cloned()
        .collect();
    let callees = outgoing
        .iter()
        .filter(|o| o.reference_type == ReferenceType::Call && o.kind.is_callable())
        .cloned()
        .collect();

    (incoming, outgoing, callers, callees)
}

fn edges_from(
    tracker: &ReferenceTracker,
    refs: &[Reference],
    endpoint: impl Fn(&Reference) -> SymbolId,
    confidence_threshold: f32,
) -> Vec<RelatedObject> {
    refs.iter()
        .filter(|r| r.target_symbol.is_some())
        .filter_map(|r| {
            let other = endpoint(r);
            let object = related_object(tracker, other, r.reference_type)?;
            (object.confidence >= confidence_threshold).then_some(object)
        })
        .collect()
}

/// Parent objects from the scope chain: skip the symbol itself, skip
/// unnamed scopes, map each enclosing scope's kind straight across (scope
/// kinds are already `SymbolKind`-typed in this crate).
pub fn parent_objects(tracker: &ReferenceTracker, symbol: &Symbol) -> Vec<RelatedObject> {
    symbol
        .scope_chain
        .iter()
        .filter(|scope| !scope.name.is_empty() && scope.name != symbol.name)
        .filter_map(|scope| {
            let candidates = tracker.symbols_named(&scope.name);
            candidates
                .into_iter()
                .filter_map(|id| tracker.get_symbol(id))
                .find(|s| s.kind == scope.kind && s.file_id == symbol.file_id)
        })
        .map(|s| RelatedObject {
            symbol_id: s.id,
            file_id: s.file_id,
            name: s.name,
            kind: s.kind,
            reference_type: ReferenceType::Declaration,
            confidence: INDEXED_EDGE_CONFIDENCE,
        })
        .collect()
}

/// Child objects: for classes, methods whose scope chain contains the class
/// (scope kind class/interface) plus fields whose span lies within the
/// class's span and whose scope chain contains the class; for modules, the
/// top-level exported symbols of the file.
pub fn child_objects(tracker: &ReferenceTracker, symbol: &Symbol) -> Vec<RelatedObject> {
    let in_file = tracker.symbols_in_file(symbol.file_id);

    match symbol.kind {
        SymbolKind::Class | SymbolKind::Interface | SymbolKind::Struct => in_file
            .into_iter()
            .filter(|candidate| candidate.id != symbol.id)
            .filter(|candidate| {
                let in_scope_chain = candidate
                    .scope_chain
                    .iter()
                    .any(|s| s.name == symbol.name && matches!(s.kind, SymbolKind::Class | SymbolKind::Interface | SymbolKind::Struct));
                if !in_scope_chain {
                    return false;
                }
                match candidate.kind {
                    SymbolKind::Method => true,
                    SymbolKind::Field | SymbolKind::Variable => symbol.range.contains(candidate.range.start_line, candidate.range.start_column),
                    _ => false,
                }
            })
            .map(|s| RelatedObject {
                symbol_id: s.id,
                file_id: s.file_id,
                name: s.name,
                kind: s.kind,
                reference_type: ReferenceType::Declaration,
                confidence: INDEXED_EDGE_CONFIDENCE,
            })
            .collect(),
        SymbolKind::Module => in_file
            .into_iter()
            .filter(|candidate| candidate.id != symbol.id && candidate.is_exported && candidate.scope_chain.is_empty())
            .map(|s| RelatedObject {
                symbol_id: s.id,
                file_id: s.file_id,
                name: s.name,
                kind: s.kind,
                reference_type: ReferenceType::Declaration,
                confidence: INDEXED_EDGE_CONFIDENCE,
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParsedFile;
    use crate::types::Range;

    fn file(n: u32) -> FileId {
        FileId::new(n).unwrap()
    }

    #[test]
    fn confidence_thresholds_match_spec() {
        assert_eq!(confidence_for(ReferenceType::Call), 0.95);
        assert_eq!(confidence_for(ReferenceType::Import), 0.9);
    }

    #[test]
    fn low_confidence_edges_are_filtered_out() {
        let tracker = ReferenceTracker::new();
        let parsed = ParsedFile { symbols: vec![], scopes: vec![], references: vec![] };
        let _ = tracker.process_file(file(1), "a.rs", parsed);
        let symbol = Symbol::new(
            SymbolId::new(1).unwrap(),
            file(1),
            "f",
            SymbolKind::Function,
            Range::new(1, 0, 1, 0),
        );
        let (incoming, outgoing, _, _) = build_edges(&tracker, &symbol, 0.99);
        assert!(incoming.is_empty());
        assert!(outgoing.is_empty());
    }
}
