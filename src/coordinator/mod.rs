//! The index coordinator: per-index-type locking, multi-lock acquisition,
//! ordering strategies, progress tracking, and on-demand health (spec.md
//! §4.6).

mod index_type;
mod ordering;
mod snapshot;
mod state;

pub use index_type::IndexType;
pub use ordering::LockOrderingStrategy;
pub use snapshot::{IndexHealth, IndexStatusSnapshot};
pub use state::LockGuard;

use crate::config::CoordinatorConfig;
use crate::error::IndexError;
use state::IndexState;
use std::time::Duration;

const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_MULTI_LOCK_BUFFER: Duration = Duration::from_millis(100);

pub struct IndexCoordinator {
    states: [IndexState; IndexType::ALL.len()],
    lock_timeout: Duration,
    multi_lock_buffer: Duration,
    strategy: LockOrderingStrategy,
}

impl IndexCoordinator {
    pub fn new() -> Self {
        Self::with_config(DEFAULT_LOCK_TIMEOUT, LockOrderingStrategy::Numeric)
    }

    pub fn with_config(lock_timeout: Duration, strategy: LockOrderingStrategy) -> Self {
        Self {
            states: IndexType::ALL.map(|t| IndexState::new(t)),
            lock_timeout,
            multi_lock_buffer: DEFAULT_MULTI_LOCK_BUFFER,
            strategy,
        }
    }

    /// Builds a coordinator from an operator-facing [`CoordinatorConfig`],
    /// honoring its lock timeout, multi-lock buffer, history depth, and
    /// ordering strategy.
    pub fn from_config(config: &CoordinatorConfig) -> Self {
        Self {
            states: IndexType::ALL.map(|t| IndexState::with_history_cap(t, config.status_history_len)),
            lock_timeout: Duration::from_millis(config.lock_timeout_ms),
            multi_lock_buffer: Duration::from_millis(config.multi_lock_buffer_ms),
            strategy: config.lock_ordering,
        }
    }

    fn state(&self, index_type: IndexType) -> &IndexState {
        &self.states[index_type.numeric_rank() as usize]
    }

    pub fn acquire_read(&self, index_type: IndexType) -> Result<LockGuard<'_>, IndexError> {
        self.state(index_type).acquire_read(self.lock_timeout)
    }

    pub fn acquire_write(&self, index_type: IndexType) -> Result<LockGuard<'_>, IndexError> {
        self.state(index_type).acquire_write(self.lock_timeout)
    }

    pub fn wait_for_index(&self, index_type: IndexType) -> Result<(), IndexError> {
        self.state(index_type).wait_for_index(self.lock_timeout)
    }

    /// Sorts `index_types` per the configured ordering strategy and
    /// acquires write locks in that order. On any failure, releases
    /// previously acquired locks in reverse order and returns
    /// `LockUnavailable` naming the failing index.
    pub fn acquire_write_locks(
        &self,
        index_types: &[IndexType],
    ) -> Result<Vec<LockGuard<'_>>, IndexError> {
        let ordered = ordering::order(index_types, self.strategy);
        let per_lock_timeout = self.lock_timeout + self.multi_lock_buffer / ordered.len().max(1) as u32;

        let mut acquired = Vec::with_capacity(ordered.len());
        for index_type in &ordered {
            match self.state(*index_type).acquire_write(per_lock_timeout) {
                Ok(guard) => acquired.push(guard),
                Err(_) => {
                    while let Some(guard) = acquired.pop() {
                        guard.release();
                    }
                    return Err(IndexError::LockUnavailable {
                        index_type: index_type.to_string(),
                        reason: "timed out acquiring multi-lock set".to_string(),
                    });
                }
            }
        }
        Ok(acquired)
    }

    pub fn start_operation(&self, index_type: IndexType, operation: &str, total_files: u64, total_bytes: u64) {
        self.state(index_type).start_operation(operation, total_files, total_bytes);
    }

    pub fn update_operation(&self, index_type: IndexType, files: u64, bytes: u64) {
        self.state(index_type).update_operation(files, bytes);
    }

    pub fn complete_operation(&self, index_type: IndexType) {
        self.state(index_type).complete_operation();
    }

    pub fn record_error(&self, index_type: IndexType, message: impl Into<String>) {
        self.state(index_type).record_error(message.into());
    }

    pub fn health(&self, index_type: IndexType) -> IndexHealth {
        self.state(index_type).health()
    }

    pub fn snapshot(&self, index_type: IndexType) -> IndexStatusSnapshot {
        self.state(index_type).snapshot()
    }

    pub fn history(&self, index_type: IndexType) -> Vec<IndexStatusSnapshot> {
        self.state(index_type).history()
    }

    pub fn snapshot_all(&self) -> Vec<IndexStatusSnapshot> {
        IndexType::ALL.iter().map(|t| self.snapshot(*t)).collect()
    }
}

impl Default for IndexCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
