//! Error types for subset splitting.

use thiserror::Error;

/// Result type for subset splitting operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for subset splitting operations.
///
/// Recoverable configuration anomalies (zero-sum or non-normalized proportions,
/// an ignored subset restriction) are not errors: they are logged and reported on
/// the returned values instead.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// An item entered an assignment strategy without any relevant label.
    ///
    /// This aborts the pass; items placed before it keep their subset.
    #[error("item {item_id:?} has no relevant label ids for this task")]
    EmptyLabelSet { item_id: String },

    /// An assignment was requested with no candidate subsets.
    #[error("no candidate subsets to assign into")]
    NoCandidateSubsets,

    /// Configuration values outside their documented range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A collaborator (label schema or configuration source) failed.
    #[error("source error: {0}")]
    Source(String),
}

impl Error {
    /// Create an empty-label-set error for `item_id`.
    pub fn empty_label_set(item_id: impl Into<String>) -> Self {
        Error::EmptyLabelSet {
            item_id: item_id.into(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Error::InvalidConfiguration(msg.into())
    }

    /// Create a collaborator error.
    pub fn source_failure(msg: impl Into<String>) -> Self {
        Error::Source(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_item() {
        let e = Error::empty_label_set("img-7");
        assert!(e.to_string().contains("img-7"));
        assert_eq!(
            Error::source_failure("db down").to_string(),
            "source error: db down"
        );
    }
}
