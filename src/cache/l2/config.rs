use super::error::{L2CacheError, L2CacheResult};
use crate::constants::DEFAULT_L2_TOP_K;

#[derive(Debug, Clone)]
pub struct L2Config {
    /// Candidates retrieved per query.
    pub top_k: usize,
}

impl Default for L2Config {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_L2_TOP_K,
        }
    }
}

impl L2Config {
    pub fn with_top_k(top_k: usize) -> Self {
        Self { top_k }
    }

    pub fn validate(&self) -> L2CacheResult<()> {
        if self.top_k == 0 {
            return Err(L2CacheError::ConfigError {
                reason: "top_k must be > 0".to_string(),
            });
        }
        Ok(())
    }
}
