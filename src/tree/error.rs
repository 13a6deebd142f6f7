//! Tree validation error types
//!
//! Resolution failures (an id that does not exist) are not errors: lookups
//! return `Option` and moves return `false`. These errors describe edits that
//! were rejected because they would produce an invalid tree.

use thiserror::Error;

/// Errors raised while validating an edit to the configuration tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// A required title was blank
    #[error("{entity} title is required")]
    EmptyTitle { entity: &'static str },

    /// An explicit id collides with an existing one
    #[error("{entity} id '{id}' already exists")]
    DuplicateId { entity: &'static str, id: String },

    /// A referenced parent entity was not found
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    /// The URL is blank, unparsable or not http(s)
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Unknown item type
    #[error("Item type must be 'link' or 'iframe', got '{0}'")]
    InvalidItemType(String),

    /// Unknown open mode
    #[error("Open mode must be 'new_tab' or 'same_tab', got '{0}'")]
    InvalidOpenMode(String),

    /// Unknown group layout mode
    #[error("Group layout must be 'auto', 'full' or 'inline', got '{0}'")]
    InvalidGroupLayout(String),

    /// Removing the entity would leave its parent empty
    #[error("Cannot remove the last {0}")]
    LastRemaining(&'static str),
}

/// Result type alias for tree edits
pub type TreeResult<T> = Result<T, TreeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TreeError::DuplicateId {
            entity: "Group",
            id: "infra".to_string(),
        };
        assert_eq!(err.to_string(), "Group id 'infra' already exists");

        let err = TreeError::LastRemaining("subgroup");
        assert_eq!(err.to_string(), "Cannot remove the last subgroup");
    }
}
