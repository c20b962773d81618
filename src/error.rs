//! Error types for widget construction, navigation and configuration.
//!
//! Malformed host markup is reported once, at construction, instead of surfacing later as a
//! missing element on the first scroll event. An empty header set is not an error.

use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, TocError>;

/// Everything that can go wrong while mounting or driving the widget.
#[derive(Debug, Error)]
pub enum TocError {
    /// A required element was not found under its scope.
    #[error("no {role} element matches selector `{selector}`")]
    MissingElement {
        /// What the element is used for (box, items list, ...).
        role: &'static str,
        /// The selector that matched nothing.
        selector: String,
    },

    /// The rendered list does not line up with the headers it was built from, usually because
    /// the item template emits list entries of its own.
    #[error("rendered {links} links for {headers} headers")]
    LinkCountMismatch {
        /// Number of headers queried from the document.
        headers: usize,
        /// Number of list entries found after injecting the markup.
        links: usize,
    },

    /// Navigation was requested for a section that does not exist.
    #[error("section {index} is out of range ({count} sections)")]
    SectionOutOfRange {
        /// Requested ordinal.
        index: usize,
        /// Number of headers currently in the document.
        count: usize,
    },

    /// An option carried a value of the wrong shape.
    #[error("invalid option `{option}`: {reason}")]
    InvalidOption {
        /// Option name as the caller spelled it.
        option: &'static str,
        /// Human readable description of the problem.
        reason: String,
    },

    /// Widget configuration TOML could not be parsed.
    #[error("config parse error: {0}")]
    Toml(String),

    /// JSON overrides could not be parsed.
    #[error("options parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The host document rejected an operation.
    #[error("dom error: {0}")]
    Dom(String),

    /// Reading a config or layout file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
