//! `Reference` edges between symbols and their quality ranking.
//!
//! Grounded on the edge-record shape `storage/graph.rs` uses for
//! `DependencyGraph` relationships, generalized to the typed
//! source/target/quality triple spec.md §3 specifies.

use crate::types::{CompactString, FileId, SymbolId};
use serde::{Deserialize, Serialize};

/// Kind of cross-symbol reference, per spec.md §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    Call,
    Import,
    Declaration,
    Assignment,
    Inheritance,
    Implements,
    Extends,
}

/// Ordinal confidence of a reference. Higher always wins when the same
/// `(source, target, type)` edge is reported more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    Heuristic,
    Returned,
    Assigned,
}

impl Quality {
    /// Numeric rank, matching spec.md §3's `heuristic (50) < returned (90) <
    /// assigned (95)`.
    pub fn rank(&self) -> u8 {
        match self {
            Quality::Heuristic => 50,
            Quality::Returned => 90,
            Quality::Assigned => 95,
        }
    }
}

/// A typed, located edge from one symbol to another.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reference {
    pub reference_type: ReferenceType,
    pub source_symbol: SymbolId,
    /// Resolved by the tracker once the referenced name is matched to a
    /// known symbol; `None` while the reference is still textual-only.
    pub target_symbol: Option<SymbolId>,
    pub referenced_name: CompactString,
    pub file_id: FileId,
    pub line: u32,
    pub column: u16,
    pub quality: Quality,
}

impl Reference {
    /// Key used for dedup/quality-ranking: `(source, target, type)`. Two
    /// references with the same key are the same logical edge reported at
    /// different qualities.
    pub fn dedup_key(&self) -> Option<(SymbolId, SymbolId, ReferenceType)> {
        self.target_symbol
            .map(|target| (self.source_symbol, target, self.reference_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_ranks_match_spec() {
        assert_eq!(Quality::Heuristic.rank(), 50);
        assert_eq!(Quality::Returned.rank(), 90);
        assert_eq!(Quality::Assigned.rank(), 95);
        assert!(Quality::Heuristic < Quality::Returned);
        assert!(Quality::Returned < Quality::Assigned);
    }
}
