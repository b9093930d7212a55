//! The stable, serializable status surface for one index (spec.md §6).

use super::index_type::IndexType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexHealth {
    Healthy,
    Degraded,
    Unhealthy,
}

impl IndexHealth {
    pub fn as_str(self) -> &'static str {
        match self {
            IndexHealth::Healthy => "healthy",
            IndexHealth::Degraded => "degraded",
            IndexHealth::Unhealthy => "unhealthy",
        }
    }
}

/// A point-in-time snapshot of one index's coordinator state. Field names
/// are part of the stable external wire contract (spec.md §6) and must
/// serialize exactly as listed there.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStatusSnapshot {
    pub timestamp: u64,
    #[serde(rename = "indexType")]
    pub index_type_name: String,
    pub is_indexing: bool,
    pub progress: u8,
    pub current_operation: String,
    pub files_processed: u64,
    pub total_files: u64,
    pub bytes_processed: u64,
    pub total_bytes: u64,
    pub lock_holders: u32,
    pub queue_depth: u32,
    pub last_update: u64,
    pub update_count: u64,
    pub has_error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub estimated_time_remaining: u64,
}

impl IndexStatusSnapshot {
    pub fn index_type(&self) -> Option<IndexType> {
        IndexType::ALL
            .into_iter()
            .find(|t| t.as_str() == self.index_type_name)
    }
}
