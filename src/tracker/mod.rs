//! The reference tracker: the structural hub of the engine. Consumes a
//! parser's raw output per file, assigns symbol identities, builds the
//! bidirectional reference graph, and answers spatial/name/type-relationship
//! queries (spec.md §4.3).
//!
//! Concurrent structures use `dashmap` for the by-id/by-name/`(file,name)`
//! maps (teacher convention) and `parking_lot::RwLock` for the per-file
//! spatial index, matching the teacher's `parking_lot`-over-`std::sync`
//! preference throughout `storage/`.

mod scope;
mod spatial;

pub use scope::ScopeChainCache;
pub use spatial::SpatialIndex;

use crate::parser::{NamedScope, ParsedFile, RawReference};
use crate::reference::{Quality, Reference, ReferenceType};
use crate::symbol::{compute_is_exported, Symbol};
use crate::types::{CompactString, FileId, Range, SymbolId, SymbolKind};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::warn;

/// Ranked type-relationship entry: `GetImplementorsWithQuality` and friends
/// return these sorted by descending rank (spec.md §4.3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedSymbol {
    pub symbol_id: SymbolId,
    pub quality: Quality,
}

#[derive(Debug, Default, Clone)]
pub struct TypeRelationships {
    pub implements: Vec<SymbolId>,
    pub implemented_by: Vec<SymbolId>,
    pub extends: Vec<SymbolId>,
    pub extended_by: Vec<SymbolId>,
}

pub struct ReferenceTracker {
    symbols: DashMap<SymbolId, Symbol>,
    by_name: DashMap<CompactString, Vec<SymbolId>>,
    by_file_and_name: DashMap<(FileId, CompactString), SymbolId>,
    spatial_indexes: DashMap<FileId, RwLock<SpatialIndex>>,
    scope_cache: ScopeChainCache,
    next_symbol_id: AtomicU32,
}

impl Default for ReferenceTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceTracker {
    pub fn new() -> Self {
        Self {
            symbols: DashMap::new(),
            by_name: DashMap::new(),
            by_file_and_name: DashMap::new(),
            spatial_indexes: DashMap::new(),
            scope_cache: ScopeChainCache::new(),
            next_symbol_id: AtomicU32::new(1),
        }
    }

    fn allocate_symbol_id(&self) -> SymbolId {
        let raw = self.next_symbol_id.fetch_add(1, Ordering::Relaxed);
        SymbolId::new(raw).expect("symbol id counter starts at 1 and only increments")
    }

    /// Processes one file's parsed output: assigns `SymbolId`s, builds scope
    /// chains, populates the by-id/by-name/(file,name) indices and the
    /// per-file spatial index, and computes `IsExported`. Returns the
    /// allocated ids in the same order as `parsed.symbols`.
    pub fn process_file(&self, file_id: FileId, path: &str, parsed: ParsedFile) -> Vec<SymbolId> {
        let mut assigned = Vec::with_capacity(parsed.symbols.len());
        let mut spatial = SpatialIndex::new();

        for raw in &parsed.symbols {
            let id = self.allocate_symbol_id();
            let range = Range::new(raw.line, raw.column, raw.end_line, raw.end_column);
            let mut symbol = Symbol::new(id, file_id, raw.name.clone(), raw.kind, range);
            symbol.signature = raw.signature.clone();
            symbol.doc_comment = raw.doc_comment.clone();
            symbol.complexity = raw.complexity;
            symbol.parameter_count = raw.parameter_count;
            symbol.is_exported = compute_is_exported(path, &raw.name, raw.visibility);
            symbol.scope_chain = self
                .scope_cache
                .get_or_build(raw.line, named_scopes_for(&parsed.scopes));

            self.by_name
                .entry(raw.name.clone())
                .or_default()
                .push(id);
            self.by_file_and_name
                .insert((file_id, raw.name.clone()), id);
            spatial.insert(raw.line, raw.end_line, raw.column, raw.end_column, id);

            self.symbols.insert(id, symbol);
            assigned.push(id);
        }

        for (symbol_index, refs) in &parsed.references {
            let Some(&source_id) = assigned.get(*symbol_index) else {
                warn!(file = path, index = symbol_index, "reference attached to unknown symbol index, dropping");
                continue;
            };
            if let Some(mut symbol) = self.symbols.get_mut(&source_id) {
                for raw_ref in refs {
                    symbol.outgoing_refs.push(to_unresolved_reference(source_id, file_id, raw_ref));
                }
            }
        }

        self.spatial_indexes.insert(file_id, RwLock::new(spatial));
        assigned
    }

    pub fn find_at_location(&self, file_id: FileId, line: u32, column: u16) -> Option<SymbolId> {
        self.spatial_indexes
            .get(&file_id)?
            .read()
            .find_at_location(line, column)
    }

    pub fn find_by_name(&self, file_id: FileId, name: &str) -> Option<SymbolId> {
        self.by_file_and_name
            .get(&(file_id, CompactString::from(name)))
            .map(|id| *id)
    }

    pub fn get_symbol(&self, id: SymbolId) -> Option<Symbol> {
        self.symbols.get(&id).map(|s| s.clone())
    }

    pub fn symbols_named(&self, name: &str) -> Vec<SymbolId> {
        self.by_name
            .get(&CompactString::from(name))
            .map(|ids| ids.clone())
            .unwrap_or_default()
    }

    /// Every symbol loaded for `file_id`, in no particular order. Used by
    /// the context engine to derive a class's child objects without
    /// maintaining a separate per-file symbol list.
    pub fn symbols_in_file(&self, file_id: FileId) -> Vec<Symbol> {
        self.symbols
            .iter()
            .filter(|entry| entry.value().file_id == file_id)
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Resolves every symbol's outgoing references against the by-name
    /// index, materializes inverse edges on the target's incoming list, and
    /// deduplicates `(source, target, type)` triples keeping only the
    /// highest-quality instance (spec.md §4.3, invariant 3).
    pub fn process_all_references(&self) {
        // First pass: resolve target_symbol by referenced name, preferring
        // a same-file match.
        let symbol_ids: Vec<SymbolId> = self.symbols.iter().map(|e| *e.key()).collect();

        for source_id in &symbol_ids {
            let Some(mut symbol) = self.symbols.get_mut(source_id) else {
                continue;
            };
            let file_id = symbol.file_id;
            for reference in symbol.outgoing_refs.iter_mut() {
                if reference.target_symbol.is_some() {
                    continue;
                }
                if let Some(id) = self.by_file_and_name.get(&(file_id, reference.referenced_name.clone())) {
                    reference.target_symbol = Some(*id);
                } else if let Some(candidates) = self.by_name.get(&reference.referenced_name) {
                    if let Some(&first) = candidates.first() {
                        reference.target_symbol = Some(first);
                    }
                }
            }
        }

        // Dedup outgoing refs per source by (source, target, type), keeping
        // the highest quality.
        for source_id in &symbol_ids {
            if let Some(mut symbol) = self.symbols.get_mut(source_id) {
                dedup_by_quality(&mut symbol.outgoing_refs);
            }
        }

        // Materialize incoming edges.
        let mut incoming: HashMap<SymbolId, Vec<Reference>> = HashMap::new();
        for source_id in &symbol_ids {
            if let Some(symbol) = self.symbols.get(source_id) {
                for reference in &symbol.outgoing_refs {
                    if let Some(target) = reference.target_symbol {
                        incoming.entry(target).or_default().push(reference.clone());
                    }
                }
            }
        }

        for (target_id, mut refs) in incoming {
            dedup_by_quality(&mut refs);
            if let Some(mut symbol) = self.symbols.get_mut(&target_id) {
                symbol.incoming_refs = refs;
            }
        }
    }

    pub fn get_implementors(&self, interface: SymbolId) -> Vec<SymbolId> {
        self.get_implementors_with_quality(interface)
            .into_iter()
            .map(|r| r.symbol_id)
            .collect()
    }

    /// Implementors of `interface`, sorted by descending quality rank, per
    /// spec.md Scenario C. Duplicate implementors collapse to the entry
    /// carrying the highest quality seen.
    pub fn get_implementors_with_quality(&self, interface: SymbolId) -> Vec<RankedSymbol> {
        let mut best: HashMap<SymbolId, Quality> = HashMap::new();
        if let Some(symbol) = self.symbols.get(&interface) {
            for reference in &symbol.incoming_refs {
                if reference.reference_type == ReferenceType::Implements {
                    let entry = best.entry(reference.source_symbol).or_insert(reference.quality);
                    if reference.quality > *entry {
                        *entry = reference.quality;
                    }
                }
            }
        }
        let mut ranked: Vec<RankedSymbol> = best
            .into_iter()
            .map(|(symbol_id, quality)| RankedSymbol { symbol_id, quality })
            .collect();
        ranked.sort_by(|a, b| b.quality.cmp(&a.quality));
        ranked
    }

    pub fn get_implemented_interfaces(&self, symbol: SymbolId) -> Vec<SymbolId> {
        self.symbols
            .get(&symbol)
            .map(|s| {
                s.outgoing_refs
                    .iter()
                    .filter(|r| r.reference_type == ReferenceType::Implements)
                    .filter_map(|r| r.target_symbol)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn get_base_types(&self, symbol: SymbolId) -> Vec<SymbolId> {
        self.symbols
            .get(&symbol)
            .map(|s| {
                s.outgoing_refs
                    .iter()
                    .filter(|r| matches!(r.reference_type, ReferenceType::Inheritance | ReferenceType::Extends))
                    .filter_map(|r| r.target_symbol)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn get_derived_types(&self, symbol: SymbolId) -> Vec<SymbolId> {
        self.symbols
            .get(&symbol)
            .map(|s| {
                s.incoming_refs
                    .iter()
                    .filter(|r| matches!(r.reference_type, ReferenceType::Inheritance | ReferenceType::Extends))
                    .map(|r| r.source_symbol)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn get_type_relationships(&self, symbol: SymbolId) -> TypeRelationships {
        TypeRelationships {
            implements: self.get_implemented_interfaces(symbol),
            implemented_by: self.get_implementors(symbol),
            extends: self.get_base_types(symbol),
            extended_by: self.get_derived_types(symbol),
        }
    }
}

fn named_scopes_for(scopes: &[NamedScope]) -> &[NamedScope] {
    scopes
}

fn to_unresolved_reference(source: SymbolId, file_id: FileId, raw: &RawReference) -> Reference {
    Reference {
        reference_type: raw.reference_type,
        source_symbol: source,
        target_symbol: None,
        referenced_name: raw.referenced_name.clone(),
        file_id,
        line: raw.line,
        column: raw.column,
        quality: Quality::Heuristic,
    }
}

fn dedup_by_quality(refs: &mut Vec<Reference>) {
    let mut best: HashMap<(SymbolId, SymbolId, ReferenceType), usize> = HashMap::new();
    let mut keep = vec![true; refs.len()];

    for (i, reference) in refs.iter().enumerate() {
        let Some(key) = reference.dedup_key() else {
            continue;
        };
        match best.get(&key) {
            None => {
                best.insert(key, i);
            }
            Some(&existing) => {
                if refs[i].quality > refs[existing].quality {
                    keep[existing] = false;
                    best.insert(key, i);
                } else {
                    keep[i] = false;
                }
            }
        }
    }

    let mut kept = Vec::with_capacity(refs.len());
    for (i, reference) in refs.drain(..).enumerate() {
        if keep[i] {
            kept.push(reference);
        }
    }
    *refs = kept;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{RawSymbol, ScopeInfo};

    fn file(n: u32) -> FileId {
        FileId::new(n).unwrap()
    }

    fn raw_symbol(name: &str, kind: SymbolKind, line: u32, end_line: u32) -> RawSymbol {
        RawSymbol {
            name: name.into(),
            kind,
            line,
            end_line,
            column: 0,
            end_column: 0,
            signature: None,
            doc_comment: None,
            complexity: 1,
            parameter_count: 0,
            visibility: None,
        }
    }

    #[test]
    fn process_file_assigns_unique_increasing_ids() {
        let tracker = ReferenceTracker::new();
        let parsed = ParsedFile {
            symbols: vec![raw_symbol("a", SymbolKind::Function, 1, 5), raw_symbol("b", SymbolKind::Function, 10, 15)],
            scopes: vec![],
            references: vec![],
        };
        let ids = tracker.process_file(file(1), "a.rs", parsed);
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
    }

    #[test]
    fn find_at_location_uses_spatial_index() {
        let tracker = ReferenceTracker::new();
        let parsed = ParsedFile {
            symbols: vec![raw_symbol("outer", SymbolKind::Function, 1, 100), raw_symbol("inner", SymbolKind::Function, 10, 20)],
            scopes: vec![],
            references: vec![],
        };
        let ids = tracker.process_file(file(1), "a.rs", parsed);
        assert_eq!(tracker.find_at_location(file(1), 15, 0), Some(ids[1]));
        assert_eq!(tracker.find_at_location(file(1), 50, 0), Some(ids[0]));
    }

    #[test]
    fn process_all_references_builds_bidirectional_edges_and_dedups() {
        let tracker = ReferenceTracker::new();
        let parsed = ParsedFile {
            symbols: vec![raw_symbol("caller", SymbolKind::Function, 1, 5), raw_symbol("callee", SymbolKind::Function, 10, 15)],
            scopes: vec![],
            references: vec![(
                0,
                vec![
                    RawReference {
                        reference_type: ReferenceType::Call,
                        referenced_name: "callee".into(),
                        line: 2,
                        column: 0,
                    },
                    RawReference {
                        reference_type: ReferenceType::Call,
                        referenced_name: "callee".into(),
                        line: 3,
                        column: 0,
                    },
                ],
            )],
        };
        let ids = tracker.process_file(file(1), "a.rs", parsed);
        tracker.process_all_references();

        let callee = tracker.get_symbol(ids[1]).unwrap();
        assert_eq!(callee.incoming_refs.len(), 1, "duplicate (source,target,type) triples must dedup");
        assert_eq!(callee.incoming_refs[0].source_symbol, ids[0]);

        let caller = tracker.get_symbol(ids[0]).unwrap();
        assert_eq!(caller.outgoing_refs.len(), 1);
    }

    #[test]
    fn scenario_c_implementors_ranked_by_quality() {
        let tracker = ReferenceTracker::new();
        let parsed = ParsedFile {
            symbols: vec![
                raw_symbol("Writer", SymbolKind::Interface, 1, 1),
                raw_symbol("FileWriter", SymbolKind::Struct, 10, 10),
                raw_symbol("NetWriter", SymbolKind::Struct, 20, 20),
                raw_symbol("BufferWriter", SymbolKind::Struct, 30, 30),
            ],
            scopes: vec![],
            references: vec![
                (1, vec![RawReference { reference_type: ReferenceType::Implements, referenced_name: "Writer".into(), line: 10, column: 0 }]),
                (2, vec![RawReference { reference_type: ReferenceType::Implements, referenced_name: "Writer".into(), line: 20, column: 0 }]),
                (3, vec![RawReference { reference_type: ReferenceType::Implements, referenced_name: "Writer".into(), line: 30, column: 0 }]),
            ],
        };
        let ids = tracker.process_file(file(1), "a.rs", parsed);

        // Manually set qualities to match the scenario (assigned > returned > heuristic).
        {
            let mut file_writer = tracker.symbols.get_mut(&ids[1]).unwrap();
            file_writer.outgoing_refs[0].quality = Quality::Assigned;
        }
        {
            let mut net_writer = tracker.symbols.get_mut(&ids[2]).unwrap();
            net_writer.outgoing_refs[0].quality = Quality::Returned;
        }
        {
            let mut buffer_writer = tracker.symbols.get_mut(&ids[3]).unwrap();
            buffer_writer.outgoing_refs[0].quality = Quality::Heuristic;
        }

        tracker.process_all_references();

        let ranked = tracker.get_implementors_with_quality(ids[0]);
        let ranked_ids: Vec<SymbolId> = ranked.iter().map(|r| r.symbol_id).collect();
        assert_eq!(ranked_ids, vec![ids[1], ids[2], ids[3]]);
    }
}
