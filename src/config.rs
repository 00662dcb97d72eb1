//! Capacity constants for the machine, the transpiler and the program store.

use crate::error;
use crate::lang::Error;
use crate::store::{ENTRY_LEN, HEADER_LEN};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Number of cells on the tape.
    pub tape_len: usize,
    /// Instructions a single run may execute.
    pub step_budget: usize,
    /// Charge inert bytes against the step budget.
    pub count_inert: bool,
    /// Slots in the program store entry table.
    pub max_entries: usize,
    /// Largest program the store accepts.
    pub max_file_size: usize,
    /// Bytes reserved at the start of the region for header and table.
    pub metadata_size: usize,
    /// Total size of the backing region.
    pub region_size: usize,
    /// Output budget for generated C.
    pub compile_budget: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tape_len: 30000,
            step_budget: 100_000,
            count_inert: false,
            max_entries: 64,
            max_file_size: 8192,
            metadata_size: 4096,
            region_size: 0x20000,
            compile_budget: 16384,
        }
    }
}

impl Config {
    /// Defaults overlaid with any `TAPE_*` environment variables.
    pub fn from_env() -> Config {
        let mut config = Config::default();
        overlay("TAPE_TAPE_LEN", &mut config.tape_len);
        overlay("TAPE_STEP_BUDGET", &mut config.step_budget);
        overlay("TAPE_MAX_ENTRIES", &mut config.max_entries);
        overlay("TAPE_MAX_FILE_SIZE", &mut config.max_file_size);
        overlay("TAPE_REGION_SIZE", &mut config.region_size);
        overlay("TAPE_COMPILE_BUDGET", &mut config.compile_budget);
        overlay("TAPE_COUNT_INERT", &mut config.count_inert);
        config
    }

    /// Bytes available to program data.
    pub fn data_capacity(&self) -> usize {
        self.region_size.saturating_sub(self.metadata_size)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.tape_len == 0 {
            return Err(error!(InternalError; "TAPE LENGTH IS ZERO"));
        }
        if HEADER_LEN + self.max_entries * ENTRY_LEN + 4 > self.metadata_size {
            return Err(error!(InternalError; "ENTRY TABLE DOES NOT FIT METADATA"));
        }
        if self.metadata_size >= self.region_size {
            return Err(error!(InternalError; "REGION TOO SMALL"));
        }
        if self.region_size > u32::MAX as usize {
            return Err(error!(InternalError; "REGION TOO LARGE"));
        }
        Ok(())
    }
}

fn overlay<T: std::str::FromStr>(key: &str, slot: &mut T) {
    if let Ok(value) = std::env::var(key) {
        match value.trim().parse() {
            Ok(parsed) => *slot = parsed,
            Err(_) => tracing::warn!(key, value = value.as_str(), "ignoring unparsable setting"),
        }
    }
}
