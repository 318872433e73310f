//! Corpora Domain Layer
//!
//! This crate contains the core model of the corpus engine. It has no
//! external dependencies and defines the types, the label matching rule and the
//! trait interfaces that the store, ingestion and CLI layers depend upon.
//!
//! ## Key Concepts
//!
//! - **Label**: A configured rule binding document nodes to TEXT or META
//! - **Document Node**: The uniform tree JSON and XML files are converted into
//! - **Sentence**: A tokenized sentence tagged with its text categories
//! - **Meta Property**: A (label, property) identity classified corpus-wide as
//!   quantitative or categorical
//! - **Subfolder**: A named directory partition of the corpus
//!
//! ## Architecture
//!
//! - No external crate dependencies
//! - Infrastructure implementations live in other crates
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod label;
pub mod meta;
pub mod query;
pub mod sentence;
pub mod traits;

// Re-exports for convenience
pub use document::{Attributes, Candidate, DocNode, Scalar, TaggedContent, TaggedNode};
pub use label::{matches, Label, LabelCategory, MetaKind, SourceFileType};
pub use meta::{MetaIdentity, MetaProperty, MetaPropertyReference, MetaSummary, StoredValue};
pub use query::{FileRecord, MetaCondition, MetaFilter, QueryFilter, QueryResult};
pub use sentence::{ExtractedSentence, Sentence, SentenceId};
