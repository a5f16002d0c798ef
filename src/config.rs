//! Compression parameters.

use crate::error::{CompressionError, Result};

/// Parameters of the grammar builder and expander.
///
/// ```
/// use tree_repair::CompressorConfig;
///
/// let config = CompressorConfig::default()
///     .with_pattern_lengths(2, 4)
///     .with_min_frequency(3);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompressorConfig {
    /// Shortest pattern considered (at least 2).
    pub min_len: usize,
    /// Longest pattern considered.
    pub max_len: usize,
    /// Minimum number of non-overlapping occurrences for a replacement.
    pub min_frequency: usize,
    /// Stop after this many rules.
    pub max_rules: Option<usize>,
    /// Upper bound on the number of tokens a decompression may produce.
    pub max_expanded_tokens: usize,
}

impl Default for CompressorConfig {
    fn default() -> Self {
        Self {
            min_len: 2,
            max_len: 10,
            min_frequency: 2,
            max_rules: None,
            max_expanded_tokens: 1 << 26,
        }
    }
}

impl CompressorConfig {
    /// Digram-only RePair: every rule has exactly two symbols.
    pub fn digrams() -> Self {
        Self::default().with_pattern_lengths(2, 2)
    }

    pub fn with_pattern_lengths(mut self, min_len: usize, max_len: usize) -> Self {
        self.min_len = min_len;
        self.max_len = max_len;
        self
    }

    pub fn with_min_frequency(mut self, min_frequency: usize) -> Self {
        self.min_frequency = min_frequency;
        self
    }

    pub fn with_max_rules(mut self, max_rules: usize) -> Self {
        self.max_rules = Some(max_rules);
        self
    }

    pub fn with_max_expanded_tokens(mut self, limit: usize) -> Self {
        self.max_expanded_tokens = limit;
        self
    }

    /// Checks that the parameters guarantee termination and shrinking.
    pub fn validate(&self) -> Result<()> {
        if self.min_len < 2 {
            return Err(CompressionError::InvalidArgument(format!(
                "min_len must be at least 2, got {}",
                self.min_len
            )));
        }
        if self.max_len < self.min_len {
            return Err(CompressionError::InvalidArgument(format!(
                "max_len {} is below min_len {}",
                self.max_len, self.min_len
            )));
        }
        if self.min_frequency < 2 {
            return Err(CompressionError::InvalidArgument(format!(
                "min_frequency must be at least 2, got {}",
                self.min_frequency
            )));
        }
        if self.max_expanded_tokens == 0 {
            return Err(CompressionError::InvalidArgument(
                "max_expanded_tokens must be positive".to_owned(),
            ));
        }
        Ok(())
    }
}
