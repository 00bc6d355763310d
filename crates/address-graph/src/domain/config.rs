//! Engine configuration with validation.

use super::errors::ConfigError;
use serde::{Deserialize, Serialize};

/// Default page size requested from the address-history service.
pub const DEFAULT_PAGE_LIMIT: usize = 50;

/// Default number of entries re-requested from the previous page edge.
pub const DEFAULT_OVERLAP_BUFFER: usize = 3;

/// Default bound on concurrent node lookups.
pub const DEFAULT_MAX_CONCURRENT_LOOKUPS: usize = 8;

/// Pagination and lookup parameters for the graph engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Page size `L` sent as `limit`.
    pub page_limit: usize,
    /// Overlap `B` between consecutive pages. Must be below `page_limit`.
    pub overlap_buffer: usize,
    /// Maximum in-flight assemblies per page and previous-transaction
    /// lookups per assembly.
    pub max_concurrent_lookups: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            page_limit: DEFAULT_PAGE_LIMIT,
            overlap_buffer: DEFAULT_OVERLAP_BUFFER,
            max_concurrent_lookups: DEFAULT_MAX_CONCURRENT_LOOKUPS,
        }
    }
}

impl GraphConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_limit == 0 {
            return Err(ConfigError::Invalid("page_limit cannot be 0".into()));
        }

        // Each page must advance the offset by at least one entry.
        if self.overlap_buffer >= self.page_limit {
            return Err(ConfigError::Invalid(format!(
                "overlap_buffer ({}) must be smaller than page_limit ({})",
                self.overlap_buffer, self.page_limit
            )));
        }

        if self.max_concurrent_lookups == 0 {
            return Err(ConfigError::Invalid(
                "max_concurrent_lookups cannot be 0".into(),
            ));
        }

        Ok(())
    }

    /// Offset of page `page` (0-based): `page * L - page * B`.
    pub fn page_offset(&self, page: usize) -> usize {
        page * self.page_limit.saturating_sub(self.overlap_buffer)
    }
}
