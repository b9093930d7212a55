//! The seven logical index types the coordinator arbitrates access to
//! (spec.md §4.6), and the fixed tables the ordering strategies consult.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IndexType {
    Trigram,
    Symbol,
    Reference,
    CallGraph,
    Postings,
    Location,
    Content,
}

impl IndexType {
    pub const ALL: [IndexType; 7] = [
        IndexType::Trigram,
        IndexType::Symbol,
        IndexType::Reference,
        IndexType::CallGraph,
        IndexType::Postings,
        IndexType::Location,
        IndexType::Content,
    ];

    /// Baseline enum order used by the `numeric` ordering strategy; always
    /// acyclic by construction.
    pub fn numeric_rank(self) -> u8 {
        self as u8
    }

    /// Fixed priority table for the `priority` strategy: Trigram highest,
    /// Content lowest.
    pub fn priority_rank(self) -> u8 {
        match self {
            IndexType::Trigram => 0,
            IndexType::Symbol => 1,
            IndexType::Reference => 2,
            IndexType::CallGraph => 3,
            IndexType::Postings => 4,
            IndexType::Location => 5,
            IndexType::Content => 6,
        }
    }

    /// Direct dependency edges for the `dependency` strategy's DAG:
    /// `CallGraph -> Symbol`, `Reference -> Symbol`, `Postings -> Trigram`.
    /// A dependency must be acquired before its dependent.
    pub fn depends_on(self) -> &'static [IndexType] {
        match self {
            IndexType::CallGraph => &[IndexType::Symbol],
            IndexType::Reference => &[IndexType::Symbol],
            IndexType::Postings => &[IndexType::Trigram],
            _ => &[],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IndexType::Trigram => "trigram",
            IndexType::Symbol => "symbol",
            IndexType::Reference => "reference",
            IndexType::CallGraph => "call_graph",
            IndexType::Postings => "postings",
            IndexType::Location => "location",
            IndexType::Content => "content",
        }
    }
}

impl fmt::Display for IndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_rank_is_acyclic_by_construction() {
        let mut ranks: Vec<u8> = IndexType::ALL.iter().map(|t| t.numeric_rank()).collect();
        ranks.sort_unstable();
        ranks.dedup();
        assert_eq!(ranks.len(), IndexType::ALL.len());
    }

    #[test]
    fn priority_table_ranks_trigram_highest() {
        assert!(IndexType::Trigram.priority_rank() < IndexType::Content.priority_rank());
    }
}
