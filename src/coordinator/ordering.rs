//! Multi-lock ordering strategies (spec.md §4.6). The chosen strategy must
//! be stable across concurrent calls: for a given set of index types, every
//! caller in the process computes the same order.

use super::index_type::IndexType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockOrderingStrategy {
    Numeric,
    Dependency,
    Priority,
    Adaptive,
}

impl Default for LockOrderingStrategy {
    fn default() -> Self {
        Self::Numeric
    }
}

/// Orders `types` per the strategy, deduplicating repeats. `dependency`
/// falls back to `numeric` if the fixed DAG (augmented with whatever
/// `types` contains) would require a cycle to resolve, which cannot
/// actually happen given the fixed edges in `IndexType::depends_on`, but the
/// fallback is kept explicit per spec.md §4.6.
pub fn order(types: &[IndexType], strategy: LockOrderingStrategy) -> Vec<IndexType> {
    let mut unique: Vec<IndexType> = Vec::new();
    for t in types {
        if !unique.contains(t) {
            unique.push(*t);
        }
    }

    match strategy {
        LockOrderingStrategy::Numeric => {
            unique.sort_by_key(|t| t.numeric_rank());
            unique
        }
        LockOrderingStrategy::Priority => {
            unique.sort_by_key(|t| (t.priority_rank(), t.numeric_rank()));
            unique
        }
        LockOrderingStrategy::Dependency => dependency_order(&unique).unwrap_or_else(|| {
            let mut fallback = unique.clone();
            fallback.sort_by_key(|t| t.numeric_rank());
            fallback
        }),
        LockOrderingStrategy::Adaptive => {
            let by_priority = {
                let mut v = unique.clone();
                v.sort_by_key(|t| (t.priority_rank(), t.numeric_rank()));
                v
            };
            dependency_order(&by_priority).unwrap_or(by_priority)
        }
    }
}

/// Topological sort respecting `IndexType::depends_on`, restricted to the
/// requested set. Returns `None` on cycle detection.
fn dependency_order(requested: &[IndexType]) -> Option<Vec<IndexType>> {
    let mut result = Vec::with_capacity(requested.len());
    let mut visiting = Vec::new();
    let mut visited = Vec::new();

    fn visit(
        t: IndexType,
        requested: &[IndexType],
        visiting: &mut Vec<IndexType>,
        visited: &mut Vec<IndexType>,
        result: &mut Vec<IndexType>,
    ) -> bool {
        if visited.contains(&t) {
            return true;
        }
        if visiting.contains(&t) {
            return false;
        }
        visiting.push(t);
        for dep in t.depends_on() {
            if requested.contains(dep) && !visit(*dep, requested, visiting, visited, result) {
                return false;
            }
        }
        visiting.retain(|x| x != &t);
        visited.push(t);
        result.push(t);
        true
    }

    let mut ordered_inputs = requested.to_vec();
    ordered_inputs.sort_by_key(|t| t.numeric_rank());
    for t in &ordered_inputs {
        if !visit(*t, requested, &mut visiting, &mut visited, &mut result) {
            return None;
        }
    }
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_orders_by_enum_declaration() {
        let ordered = order(
            &[IndexType::Content, IndexType::Trigram, IndexType::Symbol],
            LockOrderingStrategy::Numeric,
        );
        assert_eq!(ordered, vec![IndexType::Trigram, IndexType::Symbol, IndexType::Content]);
    }

    #[test]
    fn dependency_orders_symbol_before_call_graph() {
        let ordered = order(
            &[IndexType::CallGraph, IndexType::Symbol],
            LockOrderingStrategy::Dependency,
        );
        assert_eq!(ordered, vec![IndexType::Symbol, IndexType::CallGraph]);
    }

    #[test]
    fn dependency_orders_trigram_before_postings() {
        let ordered = order(
            &[IndexType::Postings, IndexType::Trigram],
            LockOrderingStrategy::Dependency,
        );
        assert_eq!(ordered, vec![IndexType::Trigram, IndexType::Postings]);
    }

    #[test]
    fn priority_ranks_trigram_first() {
        let ordered = order(
            &[IndexType::Content, IndexType::Trigram],
            LockOrderingStrategy::Priority,
        );
        assert_eq!(ordered[0], IndexType::Trigram);
    }

    #[test]
    fn ordering_is_deterministic_across_calls() {
        let input = [IndexType::Reference, IndexType::CallGraph, IndexType::Symbol, IndexType::Trigram];
        let a = order(&input, LockOrderingStrategy::Adaptive);
        let b = order(&input, LockOrderingStrategy::Adaptive);
        assert_eq!(a, b);
    }

    #[test]
    fn duplicates_are_removed() {
        let ordered = order(
            &[IndexType::Symbol, IndexType::Symbol],
            LockOrderingStrategy::Numeric,
        );
        assert_eq!(ordered, vec![IndexType::Symbol]);
    }
}
