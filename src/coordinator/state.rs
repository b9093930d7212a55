//! Per-index atomics, the read/write locking protocol, and progress/health
//! tracking (spec.md §4.6).

use super::index_type::IndexType;
use super::snapshot::{IndexHealth, IndexStatusSnapshot};
use crate::error::{ErrorCode, IndexError};
use crate::utils::get_utc_timestamp;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

const READ_SPIN_BACKOFF: Duration = Duration::from_micros(100);
const WAIT_FOR_INDEX_POLL: Duration = Duration::from_millis(10);
/// Default ring depth per spec.md §4.6 ("the last 100 snapshots"). The
/// coordinator's configuration may override this per deployment.
pub const DEFAULT_STATUS_HISTORY_CAP: usize = 100;

/// Holds one active reader or writer's release obligation. Dropping without
/// calling `release` still releases (via `Drop`), matching the teacher's
/// RAII guard convention for its own storage locks.
pub struct LockGuard<'a> {
    state: &'a IndexState,
    is_write: bool,
    released: bool,
}

impl<'a> LockGuard<'a> {
    pub fn release(mut self) {
        self.do_release();
    }

    fn do_release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if self.is_write {
            self.state.is_indexing.store(false, Ordering::SeqCst);
            self.state.current_writer.store(0, Ordering::SeqCst);
            self.state.last_update.store(get_utc_timestamp(), Ordering::SeqCst);
            self.state.update_count.fetch_add(1, Ordering::SeqCst);
        } else {
            self.state.current_readers.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl<'a> Drop for LockGuard<'a> {
    fn drop(&mut self) {
        self.do_release();
    }
}

pub struct IndexState {
    pub index_type: IndexType,

    is_indexing: AtomicBool,
    last_update: AtomicU64,
    update_count: AtomicU64,
    progress: AtomicU64,
    start_time: AtomicU64,
    estimated_time: AtomicU64,
    files_processed: AtomicU64,
    total_files: AtomicU64,
    bytes_processed: AtomicU64,
    total_bytes: AtomicU64,
    current_readers: AtomicU64,
    current_writer: AtomicU64,
    queue_depth: AtomicU64,

    last_error: Mutex<Option<String>>,
    current_operation: Mutex<String>,
    history: Mutex<VecDeque<IndexStatusSnapshot>>,
    history_cap: usize,
}

impl IndexState {
    pub fn new(index_type: IndexType) -> Self {
        Self::with_history_cap(index_type, DEFAULT_STATUS_HISTORY_CAP)
    }

    pub fn with_history_cap(index_type: IndexType, history_cap: usize) -> Self {
        Self {
            index_type,
            is_indexing: AtomicBool::new(false),
            last_update: AtomicU64::new(0),
            update_count: AtomicU64::new(0),
            progress: AtomicU64::new(0),
            start_time: AtomicU64::new(0),
            estimated_time: AtomicU64::new(0),
            files_processed: AtomicU64::new(0),
            total_files: AtomicU64::new(0),
            bytes_processed: AtomicU64::new(0),
            total_bytes: AtomicU64::new(0),
            current_readers: AtomicU64::new(0),
            current_writer: AtomicU64::new(0),
            queue_depth: AtomicU64::new(0),
            last_error: Mutex::new(None),
            current_operation: Mutex::new(String::new()),
            history: Mutex::new(VecDeque::with_capacity(history_cap)),
            history_cap,
        }
    }

    /// Spins (100 µs backoff) until `currentWriter == 0 && !isIndexing`,
    /// then increments `currentReaders`.
    pub fn acquire_read(&self, timeout: Duration) -> Result<LockGuard<'_>, IndexError> {
        self.queue_depth.fetch_add(1, Ordering::SeqCst);
        let deadline = Instant::now() + timeout;
        loop {
            if self.current_writer.load(Ordering::SeqCst) == 0
                && !self.is_indexing.load(Ordering::SeqCst)
            {
                self.current_readers.fetch_add(1, Ordering::SeqCst);
                self.queue_depth.fetch_sub(1, Ordering::SeqCst);
                return Ok(LockGuard { state: self, is_write: false, released: false });
            }
            if Instant::now() >= deadline {
                self.queue_depth.fetch_sub(1, Ordering::SeqCst);
                return Err(IndexError::LockTimeout {
                    index_type: self.index_type.to_string(),
                    waited: timeout,
                });
            }
            std::thread::sleep(READ_SPIN_BACKOFF);
        }
    }

    /// Spins until `currentReaders == 0 && currentWriter == 0`, then
    /// CAS-sets `currentWriter := 1` and `isIndexing := true`.
    pub fn acquire_write(&self, timeout: Duration) -> Result<LockGuard<'_>, IndexError> {
        self.queue_depth.fetch_add(1, Ordering::SeqCst);
        let deadline = Instant::now() + timeout;
        loop {
            if self.current_readers.load(Ordering::SeqCst) == 0
                && self
                    .current_writer
                    .compare_exchange(0, 1, Ordering::SeqCst, Ordering::SeqCst)
                    .is_ok()
            {
                self.is_indexing.store(true, Ordering::SeqCst);
                self.queue_depth.fetch_sub(1, Ordering::SeqCst);
                return Ok(LockGuard { state: self, is_write: true, released: false });
            }
            if Instant::now() >= deadline {
                self.queue_depth.fetch_sub(1, Ordering::SeqCst);
                return Err(IndexError::LockTimeout {
                    index_type: self.index_type.to_string(),
                    waited: timeout,
                });
            }
            std::thread::sleep(READ_SPIN_BACKOFF);
        }
    }

    /// Polls `isIndexing` every 10 ms until clear or `timeout` expires.
    pub fn wait_for_index(&self, timeout: Duration) -> Result<(), IndexError> {
        let deadline = Instant::now() + timeout;
        while self.is_indexing.load(Ordering::SeqCst) {
            if Instant::now() >= deadline {
                return Err(IndexError::LockTimeout {
                    index_type: self.index_type.to_string(),
                    waited: timeout,
                });
            }
            std::thread::sleep(WAIT_FOR_INDEX_POLL);
        }
        Ok(())
    }

    pub fn start_operation(&self, operation: &str, total_files: u64, total_bytes: u64) {
        self.files_processed.store(0, Ordering::SeqCst);
        self.bytes_processed.store(0, Ordering::SeqCst);
        self.total_files.store(total_files, Ordering::SeqCst);
        self.total_bytes.store(total_bytes, Ordering::SeqCst);
        self.progress.store(0, Ordering::SeqCst);
        self.estimated_time.store(0, Ordering::SeqCst);
        self.start_time.store(get_utc_timestamp(), Ordering::SeqCst);
        *self.current_operation.lock() = operation.to_string();
        self.push_snapshot();
    }

    /// Progress is the max of files-completion and bytes-completion
    /// percentages; once past 5%, extrapolates a linear ETA from elapsed
    /// time and fraction complete.
    pub fn update_operation(&self, files: u64, bytes: u64) {
        self.files_processed.store(files, Ordering::SeqCst);
        self.bytes_processed.store(bytes, Ordering::SeqCst);

        let total_files = self.total_files.load(Ordering::SeqCst).max(1);
        let total_bytes = self.total_bytes.load(Ordering::SeqCst).max(1);
        let files_pct = (files as f64 / total_files as f64) * 100.0;
        let bytes_pct = (bytes as f64 / total_bytes as f64) * 100.0;
        let pct = files_pct.max(bytes_pct).clamp(0.0, 100.0);
        self.progress.store(pct as u64, Ordering::SeqCst);

        if pct > 5.0 {
            let start = self.start_time.load(Ordering::SeqCst);
            let now = get_utc_timestamp();
            let elapsed = now.saturating_sub(start).max(1);
            let total_estimate = (elapsed as f64 / (pct / 100.0)) as u64;
            self.estimated_time.store(total_estimate.saturating_sub(elapsed), Ordering::SeqCst);
        }
        self.push_snapshot();
    }

    pub fn complete_operation(&self) {
        self.progress.store(100, Ordering::SeqCst);
        self.estimated_time.store(0, Ordering::SeqCst);
        self.last_update.store(get_utc_timestamp(), Ordering::SeqCst);
        self.update_count.fetch_add(1, Ordering::SeqCst);
        self.push_snapshot();
    }

    pub fn record_error(&self, message: String) {
        *self.last_error.lock() = Some(message);
        self.push_snapshot();
    }

    pub fn clear_error(&self) {
        *self.last_error.lock() = None;
    }

    pub fn lock_holders(&self) -> u32 {
        let readers = self.current_readers.load(Ordering::SeqCst);
        let writer = self.current_writer.load(Ordering::SeqCst);
        (readers + writer) as u32
    }

    pub fn health(&self) -> IndexHealth {
        if self.last_error.lock().is_some() {
            IndexHealth::Unhealthy
        } else if self.is_indexing.load(Ordering::SeqCst) || self.lock_holders() > 0 {
            IndexHealth::Degraded
        } else {
            IndexHealth::Healthy
        }
    }

    pub fn snapshot(&self) -> IndexStatusSnapshot {
        let error_message = self.last_error.lock().clone();
        IndexStatusSnapshot {
            timestamp: get_utc_timestamp(),
            index_type_name: self.index_type.as_str().to_string(),
            is_indexing: self.is_indexing.load(Ordering::SeqCst),
            progress: self.progress.load(Ordering::SeqCst).min(100) as u8,
            current_operation: self.current_operation.lock().clone(),
            files_processed: self.files_processed.load(Ordering::SeqCst),
            total_files: self.total_files.load(Ordering::SeqCst),
            bytes_processed: self.bytes_processed.load(Ordering::SeqCst),
            total_bytes: self.total_bytes.load(Ordering::SeqCst),
            lock_holders: self.lock_holders(),
            queue_depth: self.queue_depth.load(Ordering::SeqCst) as u32,
            last_update: self.last_update.load(Ordering::SeqCst),
            update_count: self.update_count.load(Ordering::SeqCst),
            has_error: error_message.is_some(),
            error_message,
            estimated_time_remaining: self.estimated_time.load(Ordering::SeqCst),
        }
    }

    pub fn history(&self) -> Vec<IndexStatusSnapshot> {
        self.history.lock().iter().cloned().collect()
    }

    fn push_snapshot(&self) {
        let snapshot = self.snapshot();
        let mut history = self.history.lock();
        if history.len() == self.history_cap {
            history.pop_front();
        }
        history.push_back(snapshot);
    }
}

/// Maps a lock-timeout error onto the stable retryable error code, per
/// spec.md §6.
pub fn lock_timeout_code() -> ErrorCode {
    ErrorCode::LockTimeout
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_locks_are_shared() {
        let state = IndexState::new(IndexType::Symbol);
        let r1 = state.acquire_read(Duration::from_millis(50)).unwrap();
        let r2 = state.acquire_read(Duration::from_millis(50)).unwrap();
        assert_eq!(state.lock_holders(), 2);
        drop(r1);
        drop(r2);
        assert_eq!(state.lock_holders(), 0);
    }

    #[test]
    fn write_lock_excludes_reads() {
        let state = IndexState::new(IndexType::Symbol);
        let _w = state.acquire_write(Duration::from_millis(50)).unwrap();
        let err = state.acquire_read(Duration::from_millis(30));
        assert!(matches!(err, Err(IndexError::LockTimeout { .. })));
    }

    #[test]
    fn write_release_bumps_update_count_and_last_update() {
        let state = IndexState::new(IndexType::Symbol);
        let w = state.acquire_write(Duration::from_millis(50)).unwrap();
        w.release();
        assert_eq!(state.update_count.load(Ordering::SeqCst), 1);
        assert!(state.last_update.load(Ordering::SeqCst) > 0);
    }

    #[test]
    fn progress_tracks_max_of_files_and_bytes_completion() {
        let state = IndexState::new(IndexType::Content);
        state.start_operation("indexing", 10, 1000);
        state.update_operation(5, 100);
        let snapshot = state.snapshot();
        assert_eq!(snapshot.progress, 50);
    }

    #[test]
    fn complete_operation_forces_full_progress() {
        let state = IndexState::new(IndexType::Content);
        state.start_operation("indexing", 10, 1000);
        state.complete_operation();
        assert_eq!(state.snapshot().progress, 100);
    }

    #[test]
    fn health_degrades_while_indexing_and_turns_unhealthy_on_error() {
        let state = IndexState::new(IndexType::Content);
        assert_eq!(state.health(), IndexHealth::Healthy);
        let w = state.acquire_write(Duration::from_millis(50)).unwrap();
        assert_eq!(state.health(), IndexHealth::Degraded);
        w.release();
        state.record_error("disk full".to_string());
        assert_eq!(state.health(), IndexHealth::Unhealthy);
    }

    #[test]
    fn history_ring_caps_at_one_hundred() {
        let state = IndexState::new(IndexType::Content);
        for i in 0..150u64 {
            state.update_operation(i, i);
        }
        assert_eq!(state.history().len(), DEFAULT_STATUS_HISTORY_CAP);
    }

    #[test]
    fn wait_for_index_returns_once_write_releases() {
        let state = IndexState::new(IndexType::Symbol);
        let w = state.acquire_write(Duration::from_millis(50)).unwrap();
        let state_ref = &state;
        std::thread::scope(|scope| {
            scope.spawn(|| {
                std::thread::sleep(Duration::from_millis(20));
                w.release();
            });
            assert!(state_ref.wait_for_index(Duration::from_millis(200)).is_ok());
        });
    }
}
