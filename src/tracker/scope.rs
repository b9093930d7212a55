//! Scope-chain construction and its collision-verified memoization cache
//! (spec.md §4.3, §9 "hash-keyed memoization").

use crate::parser::NamedScope;
use crate::symbol::ScopeEntry;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::collections::hash_map::DefaultHasher;

/// The subsequence of `scopes` whose `[start, end]` (with `end == 0`
/// treated as `+∞`) contains `line`, in input order.
pub fn build_symbol_scope_chain(line: u32, scopes: &[NamedScope]) -> Vec<ScopeEntry> {
    scopes
        .iter()
        .filter(|scope| scope.range.contains_line(line))
        .map(|scope| ScopeEntry {
            name: scope.name.clone(),
            kind: scope.kind,
            start_line: scope.range.start_line,
            end_line: scope.range.end_line,
        })
        .collect()
}

fn digest_key(line: u32, scopes: &[NamedScope]) -> u64 {
    let mut hasher = DefaultHasher::new();
    line.hash(&mut hasher);
    for scope in scopes {
        scope.name.hash(&mut hasher);
        scope.range.start_line.hash(&mut hasher);
        scope.range.end_line.hash(&mut hasher);
    }
    hasher.finish()
}

struct CachedChain {
    /// Representative payload used to verify a cache hit is actually for
    /// this query, not a 64-bit hash collision: the queried line plus the
    /// chain's own length. A mismatch means "not actually my entry" and the
    /// cache is bypassed, never overwritten.
    representative_line: u32,
    chain: Vec<ScopeEntry>,
}

/// Cache mapping a 64-bit digest of `(line, scopes)` to the resulting scope
/// chain. On cache hit, the cached entry's representative line is compared
/// against the query; a mismatch bypasses the cache entirely rather than
/// overwriting the existing (correct, for some other query) entry, per
/// spec.md §9.
#[derive(Default)]
pub struct ScopeChainCache {
    entries: RwLock<HashMap<u64, CachedChain>>,
}

impl ScopeChainCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build(&self, line: u32, scopes: &[NamedScope]) -> Vec<ScopeEntry> {
        let key = digest_key(line, scopes);

        if let Some(cached) = self.entries.read().get(&key) {
            if cached.representative_line == line {
                return cached.chain.clone();
            }
            // Hash collision with a different query: fall through and
            // recompute without touching the cache.
        }

        let chain = build_symbol_scope_chain(line, scopes);

        let mut entries = self.entries.write();
        entries.entry(key).or_insert_with(|| CachedChain {
            representative_line: line,
            chain: chain.clone(),
        });
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ScopeInfo;
    use crate::types::SymbolKind;

    fn named(name: &str, start: u32, end: u32) -> NamedScope {
        NamedScope {
            name: name.into(),
            kind: SymbolKind::Module,
            range: ScopeInfo::new(start, end),
        }
    }

    #[test]
    fn scenario_b_scope_chain_lengths() {
        let scopes = vec![
            named("outer", 10, 90),
            named("middle", 20, 80),
            named("inner", 30, 70),
            named("core", 40, 60),
        ];

        assert_eq!(build_symbol_scope_chain(50, &scopes).len(), 4);
        assert_eq!(build_symbol_scope_chain(95, &scopes).len(), 0);
        let chain65 = build_symbol_scope_chain(65, &scopes);
        assert_eq!(chain65.len(), 3);
        assert_eq!(chain65[0].name.as_ref(), "outer");
        assert_eq!(chain65[1].name.as_ref(), "middle");
        assert_eq!(chain65[2].name.as_ref(), "inner");
    }

    #[test]
    fn boundary_lines_are_included() {
        let scopes = vec![named("s", 10, 20)];
        assert_eq!(build_symbol_scope_chain(10, &scopes).len(), 1);
        assert_eq!(build_symbol_scope_chain(20, &scopes).len(), 1);
        assert_eq!(build_symbol_scope_chain(9, &scopes).len(), 0);
        assert_eq!(build_symbol_scope_chain(21, &scopes).len(), 0);
    }

    #[test]
    fn unbounded_scope_matches_any_line_past_start() {
        let scopes = vec![named("file", 1, 0)];
        assert_eq!(build_symbol_scope_chain(1, &scopes).len(), 1);
        assert_eq!(build_symbol_scope_chain(1_000_000, &scopes).len(), 1);
    }

    #[test]
    fn cache_returns_same_result_as_uncached_build() {
        let scopes = vec![named("outer", 10, 90), named("inner", 30, 70)];
        let cache = ScopeChainCache::new();
        let cached = cache.get_or_build(50, &scopes);
        let direct = build_symbol_scope_chain(50, &scopes);
        assert_eq!(cached.len(), direct.len());
        for (a, b) in cached.iter().zip(direct.iter()) {
            assert_eq!(a.name, b.name);
        }
    }

    #[test]
    fn cache_never_overwrites_on_collision() {
        // Simulate a collision by inserting a bogus entry under a known key,
        // then querying with a line that would hash differently but whose
        // representative check must fail safely rather than corrupt state.
        let cache = ScopeChainCache::new();
        let scopes = vec![named("outer", 10, 90)];
        let key = digest_key(50, &scopes);
        cache.entries.write().insert(
            key,
            CachedChain {
                representative_line: 999, // deliberately wrong
                chain: vec![],
            },
        );

        // Query with the real line: representative mismatch must bypass the
        // bogus cached entry and recompute correctly.
        let result = cache.get_or_build(50, &scopes);
        assert_eq!(result.len(), 1);

        // The original (bogus) entry must remain untouched.
        assert_eq!(cache.entries.read().get(&key).unwrap().representative_line, 999);
    }
}
