use serde::{Deserialize, Serialize};

/// Configuration for section extraction and chunk splitting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkerConfig {
    /// Hard character budget per chunk
    pub max_chunk_chars: usize,

    /// How far back to look for a declaration opener before a match
    pub context_lookback_chars: usize,

    /// How far past a match's line the boundary scan may run
    pub forward_window_chars: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: 4000,
            context_lookback_chars: 500,
            forward_window_chars: 2000,
        }
    }
}

impl ChunkerConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_chunk_chars == 0 {
            return Err("max_chunk_chars must be greater than 0".to_string());
        }
        if self.forward_window_chars == 0 {
            return Err("forward_window_chars must be greater than 0".to_string());
        }
        Ok(())
    }
}
