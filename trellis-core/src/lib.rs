//! Trellis Core - Wiki-link indexing and resolution
//!
//! This library maintains a queryable, self-refreshing index over a
//! directory tree of text documents that reference one another through
//! inline `[[...]]` link markers, and resolves those links to document
//! metadata.

pub mod config;
pub mod document;
pub mod error;
pub mod header;
pub mod index;
pub mod link;
pub mod paths;
pub mod resolver;

pub use config::Config;
pub use document::DocMetadata;
pub use error::TrellisError;
pub use index::{CollectionIndex, IndexStatus, SearchHit};
pub use resolver::CompletionItem;

/// Result type alias for trellis operations
pub type Result<T> = std::result::Result<T, TrellisError>;
