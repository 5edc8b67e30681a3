//! Runtime configuration.

/// Limits and initial block context for a [`Starknet`](super::Starknet) instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarknetConfig {
    /// Instructions one transaction may execute, nested calls included.
    pub max_steps: u64,
    /// Maximum nesting of function and contract calls.
    pub max_call_depth: usize,
    pub initial_block_number: u64,
    pub initial_block_timestamp: u64,
}

impl Default for StarknetConfig {
    fn default() -> Self {
        Self {
            max_steps: 1_000_000,
            max_call_depth: 64,
            initial_block_number: 0,
            initial_block_timestamp: 0,
        }
    }
}

impl StarknetConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-transaction step limit
    pub fn with_max_steps(mut self, steps: u64) -> Self {
        self.max_steps = steps;
        self
    }

    /// Set the call depth limit
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn with_initial_block_number(mut self, number: u64) -> Self {
        self.initial_block_number = number;
        self
    }

    pub fn with_initial_block_timestamp(mut self, timestamp: u64) -> Self {
        self.initial_block_timestamp = timestamp;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let config = StarknetConfig::default();
        assert_eq!(config.max_steps, 1_000_000);
        assert_eq!(config.max_call_depth, 64);
        assert_eq!(config.initial_block_number, 0);
    }

    #[test]
    fn test_builder_chain() {
        let config = StarknetConfig::new()
            .with_max_steps(10)
            .with_max_call_depth(2)
            .with_initial_block_timestamp(1_700_000_000);
        assert_eq!(config.max_steps, 10);
        assert_eq!(config.max_call_depth, 2);
        assert_eq!(config.initial_block_timestamp, 1_700_000_000);
    }
}
