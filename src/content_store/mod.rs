//! Content-addressed, deduplicated storage of file bodies keyed by `FileId`.
//!
//! Two-tier hashing per spec.md §4.1: a fast non-cryptographic 64-bit hash
//! (`xxh3`, matching `DevsHero-NeuroSiphon`'s documented rationale —
//! "deterministic content hashing for cache invalidation... ~10 GB/s") is
//! checked first; only on a miss does the store pay for a strong 256-bit
//! `sha2` digest, which is the real dedup key across paths. Concurrent maps
//! use `dashmap`, the teacher's standard concurrent-map crate.

use crate::types::FileId;
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU32, Ordering};
use xxhash_rust::xxh3::xxh3_64;

type StrongDigest = [u8; 32];

struct StoredFile {
    bytes: Vec<u8>,
    fast_hash: u64,
    strong_digest: StrongDigest,
}

/// Deduplicated, content-addressed store of file bodies.
///
/// `path_to_id` and `id_to_content` are independently concurrent; a given
/// path's fast hash is checked before paying for the strong digest, so
/// repeated unchanged-content reloads (the overwhelmingly common case) never
/// touch `sha2`.
pub struct ContentStore {
    path_to_id: DashMap<String, FileId>,
    path_fast_hash: DashMap<String, u64>,
    id_to_content: DashMap<FileId, StoredFile>,
    /// Strong digest -> FileId, the true dedup key across distinct paths
    /// with identical content.
    digest_to_id: DashMap<StrongDigest, FileId>,
    /// Reverse of `path_to_id`, kept for the context engine's structure
    /// section (file path / module / package derivation).
    id_to_path: DashMap<FileId, String>,
    next_id: AtomicU32,
}

impl Default for ContentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentStore {
    pub fn new() -> Self {
        Self {
            path_to_id: DashMap::new(),
            path_fast_hash: DashMap::new(),
            id_to_content: DashMap::new(),
            digest_to_id: DashMap::new(),
            id_to_path: DashMap::new(),
            next_id: AtomicU32::new(1),
        }
    }

    /// Loads `bytes` for `path`. Idempotent with respect to unchanged
    /// content: reloading the same path with the same bytes returns the
    /// existing `FileId`. Reloading with changed content allocates a new
    /// `FileId` and drops the old mapping for that path (the old id's
    /// content remains retrievable by anyone still holding it, consistent
    /// with `InvalidateFile` being the only explicit removal path).
    pub fn load_file(&self, path: &str, bytes: Vec<u8>) -> FileId {
        let fast_hash = xxh3_64(&bytes);

        if let Some(cached_hash) = self.path_fast_hash.get(path) {
            if *cached_hash == fast_hash {
                if let Some(id) = self.path_to_id.get(path) {
                    return *id;
                }
            }
        }

        let strong_digest: StrongDigest = Sha256::digest(&bytes).into();
        if let Some(existing_id) = self.digest_to_id.get(&strong_digest) {
            let id = *existing_id;
            self.path_to_id.insert(path.to_string(), id);
            self.path_fast_hash.insert(path.to_string(), fast_hash);
            self.id_to_path.insert(id, path.to_string());
            return id;
        }

        let id = self.allocate_id();
        self.id_to_content.insert(
            id,
            StoredFile {
                bytes,
                fast_hash,
                strong_digest,
            },
        );
        self.digest_to_id.insert(strong_digest, id);
        self.path_to_id.insert(path.to_string(), id);
        self.path_fast_hash.insert(path.to_string(), fast_hash);
        self.id_to_path.insert(id, path.to_string());
        id
    }

    /// The most recently loaded path bound to `id`, if any.
    pub fn get_path(&self, id: FileId) -> Option<String> {
        self.id_to_path.get(&id).map(|p| p.clone())
    }

    /// Loads several files. Order of the returned vector matches `files`.
    pub fn batch_load_files(&self, files: Vec<(String, Vec<u8>)>) -> Vec<FileId> {
        files
            .into_iter()
            .map(|(path, bytes)| self.load_file(&path, bytes))
            .collect()
    }

    /// Returns the stored bytes and whether `id` is known. Never fails: an
    /// unknown id returns `(empty, false)`.
    pub fn get_content(&self, id: FileId) -> (Vec<u8>, bool) {
        match self.id_to_content.get(&id) {
            Some(entry) => (entry.bytes.clone(), true),
            None => (Vec::new(), false),
        }
    }

    /// Forgets `path`'s mapping so a subsequent `load_file` allocates fresh
    /// state for it (the underlying content, if shared with another path,
    /// is untouched).
    pub fn invalidate_file(&self, path: &str) {
        self.path_to_id.remove(path);
        self.path_fast_hash.remove(path);
    }

    /// Drops all stored state.
    pub fn clear(&self) {
        self.path_to_id.clear();
        self.path_fast_hash.clear();
        self.id_to_content.clear();
        self.digest_to_id.clear();
        self.id_to_path.clear();
    }

    /// No background resources to release; present for API parity with the
    /// spec's `Close()` and to give callers an explicit shutdown point.
    pub fn close(&self) {
        self.clear();
    }

    fn allocate_id(&self) -> FileId {
        let raw = self.next_id.fetch_add(1, Ordering::Relaxed);
        FileId::new(raw).expect("file id counter starts at 1 and only increments")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_content_round_trips_bytes_exactly() {
        let store = ContentStore::new();
        let bytes = b"line one\r\nline two\n\xEF\xBB\xBF".to_vec();
        let id = store.load_file("a.rs", bytes.clone());
        let (loaded, present) = store.get_content(id);
        assert!(present);
        assert_eq!(loaded, bytes);
    }

    #[test]
    fn reloading_unchanged_content_returns_same_id() {
        let store = ContentStore::new();
        let id1 = store.load_file("a.rs", b"fn main() {}".to_vec());
        let id2 = store.load_file("a.rs", b"fn main() {}".to_vec());
        assert_eq!(id1, id2);
    }

    #[test]
    fn reloading_changed_content_allocates_new_id() {
        let store = ContentStore::new();
        let id1 = store.load_file("a.rs", b"fn main() {}".to_vec());
        let id2 = store.load_file("a.rs", b"fn main() { println!(); }".to_vec());
        assert_ne!(id1, id2);
    }

    #[test]
    fn unknown_id_returns_empty_and_absent() {
        let store = ContentStore::new();
        let fake = FileId::new(999).unwrap();
        let (bytes, present) = store.get_content(fake);
        assert!(bytes.is_empty());
        assert!(!present);
    }

    #[test]
    fn empty_bytes_are_still_recorded() {
        let store = ContentStore::new();
        let id = store.load_file("empty.rs", Vec::new());
        let (bytes, present) = store.get_content(id);
        assert!(present);
        assert!(bytes.is_empty());
    }

    #[test]
    fn invalidate_then_reload_with_same_content_reuses_digest_but_is_a_fresh_path_binding() {
        let store = ContentStore::new();
        let id1 = store.load_file("a.rs", b"same".to_vec());
        store.invalidate_file("a.rs");
        let id2 = store.load_file("a.rs", b"same".to_vec());
        assert_eq!(id1, id2, "identical content dedups to the same FileId even after invalidation");
    }

    #[test]
    fn identical_content_at_different_paths_dedups_to_one_id() {
        let store = ContentStore::new();
        let id1 = store.load_file("a.rs", b"shared".to_vec());
        let id2 = store.load_file("b.rs", b"shared".to_vec());
        assert_eq!(id1, id2);
    }

    #[test]
    fn batch_load_preserves_input_order() {
        let store = ContentStore::new();
        let ids = store.batch_load_files(vec![
            ("a.rs".to_string(), b"a".to_vec()),
            ("b.rs".to_string(), b"b".to_vec()),
            ("c.rs".to_string(), b"c".to_vec()),
        ]);
        assert_eq!(ids.len(), 3);
        assert!(ids.iter().all(|id| id.value() > 0));
        assert_ne!(ids[0], ids[1]);
        assert_ne!(ids[1], ids[2]);
    }
}
