// Chunk: docs/chunks/storage_config - Growth and capacity tunables

//! Tunables for buffer growth.
//!
//! The defaults favour small documents: character storage grows in steps of
//! 128 chars and the run table starts with room for 10 runs.

use crate::error::{Result, StorageError};

const DEFAULT_CHAR_GRANULARITY: usize = 0x80;
const DEFAULT_INITIAL_RUN_CAPACITY: usize = 10;

/// Capacity policy shared by the character buffer and the run table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageConfig {
    char_granularity: usize,
    initial_run_capacity: usize,
}

impl StorageConfig {
    /// Creates a validated configuration.
    ///
    /// `char_granularity` must be a non-zero power of two; allocations of the
    /// character array are rounded to a multiple of it. `initial_run_capacity`
    /// must be non-zero.
    pub fn new(char_granularity: usize, initial_run_capacity: usize) -> Result<Self> {
        if char_granularity == 0 || !char_granularity.is_power_of_two() {
            return Err(StorageError::InvalidConfig(
                "char granularity must be a non-zero power of two",
            ));
        }
        if initial_run_capacity == 0 {
            return Err(StorageError::InvalidConfig(
                "initial run capacity must be non-zero",
            ));
        }
        Ok(Self {
            char_granularity,
            initial_run_capacity,
        })
    }

    pub fn char_granularity(&self) -> usize {
        self.char_granularity
    }

    pub fn initial_run_capacity(&self) -> usize {
        self.initial_run_capacity
    }

    /// Returns an allocation size `>= min_size` for the character array.
    ///
    /// Small requests get one granule; larger ones are doubled and rounded so
    /// repeated growth stays amortized O(1) per char.
    pub(crate) fn char_allocation(&self, min_size: usize) -> usize {
        let granule = self.char_granularity;
        if min_size < granule {
            granule
        } else {
            (min_size * 2 + granule) & !(granule - 1)
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            char_granularity: DEFAULT_CHAR_GRANULARITY,
            initial_run_capacity: DEFAULT_INITIAL_RUN_CAPACITY,
        }
    }
}
