use thiserror::Error;

/// Errors returned by compression and decompression.
///
/// Every variant is fatal for the call that produced it; nothing partial is
/// ever returned alongside an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CompressionError {
    /// A parameter or collaborator result was unusable.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The token sequence or wire bytes do not describe a well-formed tree.
    #[error("malformed sequence at position {position}: {reason}")]
    MalformedSequence { position: usize, reason: String },

    /// The rule dependency graph is not acyclic.
    #[error("grammar cycle through rule R{rule}")]
    GrammarCycle { rule: u32 },

    /// A nonterminal is referenced but has no rule.
    #[error("unknown nonterminal R{rule}")]
    UnknownNonterminal { rule: u32 },

    /// Expanding the grammar would produce more tokens than allowed.
    #[error("grammar expansion exceeds {limit} tokens")]
    ExpansionLimit { limit: usize },
}

impl CompressionError {
    pub(crate) fn malformed(position: usize, reason: impl Into<String>) -> Self {
        CompressionError::MalformedSequence {
            position,
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CompressionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = CompressionError::GrammarCycle { rule: 3 };
        assert_eq!(err.to_string(), "grammar cycle through rule R3");

        let err = CompressionError::malformed(7, "missing end marker");
        assert_eq!(
            err.to_string(),
            "malformed sequence at position 7: missing end marker"
        );
    }
}
