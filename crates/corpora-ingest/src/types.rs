//! Report and progress types for ingestion runs

use crate::error::InferenceError;
use corpora_domain::{MetaIdentity, MetaProperty};
use std::fmt;
use std::path::PathBuf;
use tokio::sync::mpsc::UnboundedSender;

/// Why a file was left out of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The file is not valid UTF-8
    Decode,

    /// The file could not be read or parsed
    Parse,

    /// The document violates a label rule
    Structural,

    /// The store rejected the file
    Store,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::Decode => "decode",
            FailureKind::Parse => "parse",
            FailureKind::Structural => "structural",
            FailureKind::Store => "store",
        };
        f.write_str(name)
    }
}

/// A file that was skipped during ingestion
#[derive(Debug, Clone, PartialEq)]
pub struct FileFailure {
    /// Offending file
    pub path: PathBuf,

    /// Failure category
    pub kind: FailureKind,

    /// Error message, naming the label where one is involved
    pub message: String,
}

/// Summary of one ingestion run
#[derive(Debug, Clone, Default)]
pub struct IngestionReport {
    /// Files that passed the extension filter
    pub files_seen: usize,

    /// Files written to the store
    pub files_ingested: usize,

    /// Sentences written to the store
    pub sentences_written: usize,

    /// Distinct meta identities discovered
    pub meta_identities: usize,

    /// Files skipped, with the reason
    pub failures: Vec<FileFailure>,

    /// Meta properties classified by the inference pass
    pub classified: Vec<MetaProperty>,

    /// Meta identities the inference pass could not classify
    pub classification_failures: Vec<(MetaIdentity, InferenceError)>,

    /// Sentences embedded, when the embedding pass ran
    pub embedded: Option<usize>,
}

impl IngestionReport {
    /// Whether every file was ingested and every property classified
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.classification_failures.is_empty()
    }
}

/// Progress signal emitted by long-running passes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A pass starts; `total` increments will follow
    Task {
        /// Pass description
        message: String,
        /// Number of steps in the pass
        total: usize,
    },

    /// One step of the current pass completed
    Increment,
}

/// Receiver of progress events
pub trait ProgressSink {
    /// Deliver one event
    fn emit(&mut self, event: ProgressEvent);
}

/// Discards all progress events
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn emit(&mut self, _event: ProgressEvent) {}
}

impl ProgressSink for Vec<ProgressEvent> {
    fn emit(&mut self, event: ProgressEvent) {
        self.push(event);
    }
}

impl ProgressSink for UnboundedSender<ProgressEvent> {
    fn emit(&mut self, event: ProgressEvent) {
        // A dropped receiver only means nobody is watching
        let _ = self.send(event);
    }
}
