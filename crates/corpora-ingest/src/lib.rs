//! Corpora Ingest
//!
//! Turns a directory of JSON, XML and CHAT transcript files into a queryable
//! corpus store.
//!
//! # Overview
//!
//! Each file is converted into a uniform document tree, walked against the
//! configured label catalog to produce sentences and document-level metadata,
//! and written to the store in its own transaction. Once every file is
//! written, a corpus-wide pass classifies each metadata property as
//! quantitative or categorical. An optional post-pass attaches sentence
//! embeddings.
//!
//! # Architecture
//!
//! ```text
//! file → document tree → walker (labels) → FileRecord → CorpusStore
//!                                                         ↓
//!                                   type inference, embeddings
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use corpora_ingest::{CorpusConfig, IngestionContext, Ingestor, NoProgress};
//! use corpora_store::SqliteStore;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CorpusConfig::from_toml(r#"
//! corpus_path = "corpus"
//!
//! [[labels]]
//! name = "body"
//! match_key = "body"
//! category = "text"
//! file_type = "json"
//! "#)?;
//!
//! let store = SqliteStore::recreate(&config.database)?;
//! let mut ingestor = Ingestor::new(IngestionContext::new(config), store)?;
//! let report = ingestor.process_files(&mut NoProgress)?;
//!
//! println!("Ingested {} of {} files", report.files_ingested, report.files_seen);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod error;
mod config;
mod types;
mod ingestor;

pub mod document;
pub mod embedding;
pub mod inference;
pub mod tokenizer;
pub mod transcript;
pub mod walker;


pub use error::{DocumentError, IngestError, InferenceError, StructuralError};
pub use config::{
    CategoryConfig, CorpusConfig, FileTypeConfig, KindConfig, LabelConfig, SubfolderConfig,
};
pub use types::{
    FailureKind, FileFailure, IngestionReport, NoProgress, ProgressEvent, ProgressSink,
};
pub use ingestor::{
    spawn_ingestion, BoxedEmbeddingModel, IngestionContext, IngestionHandle, Ingestor,
};
pub use embedding::{attach_embeddings, EmbeddingError, MockEmbeddingModel};
pub use inference::{classify, run_inference, InferenceOutcome};
pub use tokenizer::PunctuationTokenizer;
pub use transcript::{Transcript, TranscriptParser};
