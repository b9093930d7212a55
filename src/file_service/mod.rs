//! Owns the path↔`FileId` bijection and the pluggable `FileSystem`
//! abstraction (spec.md §4.2). The real implementation walks with
//! `ignore`/`walkdir` for `.gitignore`-aware traversal parity with
//! `codanna`'s `FileWalker`; batch loads run on a `rayon` worker pool.

pub mod fs;
pub mod walker;

use crate::content_store::ContentStore;
use crate::error::{IndexError, IndexResult};
use crate::types::FileId;
use fs::FileSystem;
use rayon::prelude::*;
use std::path::Path;
use std::sync::Arc;

/// Outcome of loading one path in a batch.
pub enum LoadOutcome {
    /// A regular file was read and stored; `None` means it was a directory
    /// or symlinked directory, represented as the spec's `FileID = 0`
    /// sentinel (not expressible as a `FileId`, since `FileId` is non-zero).
    Loaded(Option<FileId>),
    Failed(IndexError),
}

pub struct FileLoader<F: FileSystem> {
    fs: Arc<F>,
    store: Arc<ContentStore>,
    max_file_size_bytes: u64,
    worker_count: usize,
}

impl<F: FileSystem> FileLoader<F> {
    pub fn new(fs: Arc<F>, store: Arc<ContentStore>, max_file_size_bytes: u64, worker_count: usize) -> Self {
        Self {
            fs,
            store,
            max_file_size_bytes,
            worker_count,
        }
    }

    /// Loads one file through the abstraction. Rejects files over the
    /// configured size limit; returns `None` (the spec's `FileID = 0`) for
    /// directories and symlinked directories, tolerating watcher noise
    /// rather than erroring.
    pub fn load_file(&self, path: &Path) -> IndexResult<Option<FileId>> {
        if self.fs.is_dir(path) {
            return Ok(None);
        }

        let stat = self
            .fs
            .stat(path)
            .map_err(|source| IndexError::FileRead {
                path: path.to_path_buf(),
                source,
            })?;

        if matches!(stat.kind, fs::EntryKind::Dir) {
            return Ok(None);
        }

        if stat.size > self.max_file_size_bytes {
            return Err(IndexError::FileTooLarge {
                path: path.to_path_buf(),
                size: stat.size,
                limit: self.max_file_size_bytes,
            });
        }

        let bytes = self.fs.read_file(path).map_err(|source| IndexError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Some(self.store.load_file(&path.to_string_lossy(), bytes)))
    }

    /// Loads every path in `paths` using a bounded worker pool (size
    /// `worker_count`). All workers share one content store, which is safe
    /// under concurrent `load_file` by construction (`dashmap` inside).
    /// Returns `(loaded, failed)` in input order; a path whose load failed
    /// contributes `None` to `loaded` at that position and an entry to
    /// `failed`.
    pub fn batch_load_files(
        &self,
        paths: &[std::path::PathBuf],
    ) -> (Vec<Option<FileId>>, Vec<(std::path::PathBuf, IndexError)>) {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.worker_count.max(1))
            .build()
            .expect("thread pool with a bounded worker count always builds");

        let results: Vec<(std::path::PathBuf, IndexResult<Option<FileId>>)> = pool.install(|| {
            paths
                .par_iter()
                .map(|path| (path.clone(), self.load_file(path)))
                .collect()
        });

        let mut loaded = Vec::with_capacity(results.len());
        let mut failed = Vec::new();
        for (path, result) in results {
            match result {
                Ok(id) => loaded.push(id),
                Err(err) => {
                    loaded.push(None);
                    failed.push((path, err));
                }
            }
        }
        (loaded, failed)
    }
}
