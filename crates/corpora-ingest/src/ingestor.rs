//! Ingestion orchestrator

use crate::config::CorpusConfig;
use crate::document;
use crate::embedding::{attach_embeddings, EmbeddingError, MockEmbeddingModel};
use crate::error::{DocumentError, IngestError};
use crate::inference::run_inference;
use crate::tokenizer::PunctuationTokenizer;
use crate::transcript::TranscriptParser;
use crate::types::{FailureKind, FileFailure, IngestionReport, ProgressEvent, ProgressSink};
use crate::walker::{extract_meta, extract_text};
use corpora_domain::traits::{CorpusStore, EmbeddingModel, SentenceTokenizer};
use corpora_domain::{FileRecord, Label, MetaIdentity, SourceFileType};
use corpora_store::SqliteStore;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Shareable embedding model used by the embedding pass
pub type BoxedEmbeddingModel = Box<dyn EmbeddingModel<Error = EmbeddingError> + Send + Sync>;

/// Everything one ingestion run needs, owned for the duration of the run
pub struct IngestionContext {
    /// Corpus configuration
    pub config: CorpusConfig,

    /// Sentence tokenizer for JSON and XML text
    pub tokenizer: Box<dyn SentenceTokenizer + Send + Sync>,

    /// Model for the embedding pass; a hash model is used when unset
    pub embedding_model: Option<BoxedEmbeddingModel>,
}

impl IngestionContext {
    /// Create a context with the default tokenizer
    pub fn new(config: CorpusConfig) -> Self {
        Self {
            config,
            tokenizer: Box::new(PunctuationTokenizer::new()),
            embedding_model: None,
        }
    }

    /// Replace the sentence tokenizer
    pub fn with_tokenizer(mut self, tokenizer: impl SentenceTokenizer + Send + Sync + 'static) -> Self {
        self.tokenizer = Box::new(tokenizer);
        self
    }

    /// Set the embedding model
    pub fn with_embedding_model(
        mut self,
        model: impl EmbeddingModel<Error = EmbeddingError> + Send + Sync + 'static,
    ) -> Self {
        self.embedding_model = Some(Box::new(model));
        self
    }
}

struct FileLabels {
    text: Vec<Label>,
    meta: Vec<Label>,
}

/// Drives extraction, writing, inference and embedding for one corpus
///
/// Files are extracted and written one at a time, each in its own
/// transaction. Inference and embedding run only after every file is written.
pub struct Ingestor<S: CorpusStore> {
    context: IngestionContext,
    store: S,
    parser: TranscriptParser,
    labels: BTreeMap<SourceFileType, FileLabels>,
}

impl<S> Ingestor<S>
where
    S: CorpusStore,
    S::Error: Display,
{
    /// Create an ingestor writing into `store`
    pub fn new(context: IngestionContext, store: S) -> Result<Self, IngestError> {
        context.config.validate().map_err(IngestError::Config)?;

        let parser = TranscriptParser::new().map_err(|e| IngestError::Config(e.to_string()))?;
        let labels = [SourceFileType::Json, SourceFileType::Xml]
            .into_iter()
            .map(|ft| {
                let labels = FileLabels {
                    text: context.config.text_labels(ft),
                    meta: context.config.meta_labels(ft),
                };
                (ft, labels)
            })
            .collect();

        Ok(Self {
            context,
            store,
            parser,
            labels,
        })
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consume the ingestor and return its store
    pub fn into_store(self) -> S {
        self.store
    }

    /// Every file under the corpus root that passes the extension filter
    pub fn discover_files(&self) -> Result<Vec<PathBuf>, IngestError> {
        let root = &self.context.config.corpus_path;
        if !root.is_dir() {
            return Err(IngestError::Config(format!(
                "Corpus path {} is not a directory",
                root.display()
            )));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_file() && self.context.config.accepts(entry.path()) {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    /// Extract one file into a store record
    pub fn extract_file(&self, path: &Path) -> Result<FileRecord, FileFailure> {
        let file_path = path.display().to_string();
        let document_failure = |source: DocumentError| {
            let kind = match source {
                DocumentError::Decode(_) => FailureKind::Decode,
                _ => FailureKind::Parse,
            };
            FileFailure {
                path: path.to_path_buf(),
                kind,
                message: IngestError::Document {
                    path: path.to_path_buf(),
                    source,
                }
                .to_string(),
            }
        };

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();

        let (sentences, meta_refs) = match SourceFileType::from_extension(&ext) {
            Some(SourceFileType::Transcript) => {
                let transcript = self.parser.parse_file(path).map_err(document_failure)?;
                (transcript.sentences, transcript.meta_refs)
            }
            Some(file_type) => {
                let doc = document::parse_file(path).map_err(document_failure)?;
                let labels = self.labels.get(&file_type).ok_or_else(|| {
                    document_failure(DocumentError::UnsupportedFormat(ext.clone()))
                })?;
                let sentences = extract_text(&doc, &labels.text, &*self.context.tokenizer);
                let meta_refs = extract_meta(&doc, &labels.meta, &file_path).map_err(|source| {
                    FileFailure {
                        path: path.to_path_buf(),
                        kind: FailureKind::Structural,
                        message: IngestError::Structural {
                            path: path.to_path_buf(),
                            source,
                        }
                        .to_string(),
                    }
                })?;
                (sentences, meta_refs)
            }
            None => return Err(document_failure(DocumentError::UnsupportedFormat(ext))),
        };

        Ok(FileRecord {
            subfolders: self.context.config.subfolders_for(path),
            file_path,
            sentences,
            meta_refs,
        })
    }

    /// Ingest every file, then classify meta properties and, if configured,
    /// attach embeddings
    pub fn process_files(
        &mut self,
        progress: &mut dyn ProgressSink,
    ) -> Result<IngestionReport, IngestError> {
        let files = self.discover_files()?;
        info!(
            "Processing {} files under {}",
            files.len(),
            self.context.config.corpus_path.display()
        );

        progress.emit(ProgressEvent::Task {
            message: "Processing files".to_string(),
            total: files.len(),
        });

        let mut report = IngestionReport {
            files_seen: files.len(),
            ..IngestionReport::default()
        };
        let mut identities: BTreeSet<MetaIdentity> = BTreeSet::new();

        for path in &files {
            match self.ingest_file(path, &mut identities) {
                Ok(written) => {
                    report.files_ingested += 1;
                    report.sentences_written += written;
                }
                Err(failure) => {
                    warn!("Skipping {}: {}", failure.path.display(), failure.message);
                    report.failures.push(failure);
                }
            }
            progress.emit(ProgressEvent::Increment);
        }
        report.meta_identities = identities.len();

        info!(
            "Ingested {} of {} files ({} sentences, {} meta properties)",
            report.files_ingested,
            report.files_seen,
            report.sentences_written,
            report.meta_identities
        );

        let labels = self.context.config.labels();
        let outcome = run_inference(&mut self.store, &labels)?;
        report.classified = outcome.classified;
        report.classification_failures = outcome.failures;

        if self.context.config.add_embeddings {
            progress.emit(ProgressEvent::Task {
                message: "Embedding sentences".to_string(),
                total: 1,
            });
            report.embedded = Some(self.embed()?);
            progress.emit(ProgressEvent::Increment);
        }

        Ok(report)
    }

    /// Run the embedding pass over the stored sentences
    pub fn embed(&mut self) -> Result<usize, IngestError> {
        match &self.context.embedding_model {
            Some(model) => attach_embeddings(&mut self.store, model.as_ref()),
            None => {
                let dimension = self.context.config.embedding_dimension;
                debug!("No embedding model set, using hash embeddings of dimension {}", dimension);
                attach_embeddings(&mut self.store, &MockEmbeddingModel::new(dimension))
            }
        }
    }

    fn ingest_file(
        &mut self,
        path: &Path,
        identities: &mut BTreeSet<MetaIdentity>,
    ) -> Result<usize, FileFailure> {
        let record = self.extract_file(path)?;

        let written = self.store.insert_file(&record).map_err(|e| FileFailure {
            path: path.to_path_buf(),
            kind: FailureKind::Store,
            message: e.to_string(),
        })?;

        for meta_ref in &record.meta_refs {
            let identity = meta_ref.identity();
            if !identities.contains(&identity) {
                debug!(
                    "New meta property {}/{} from {}",
                    identity.label_name, identity.property_name, record.file_path
                );
                identities.insert(identity);
            }
        }

        debug!(
            "Ingested {}: {} sentences, {} meta references",
            record.file_path,
            written,
            record.meta_refs.len()
        );
        Ok(written)
    }
}

/// A background ingestion run
pub struct IngestionHandle {
    /// Progress events; closes when the run finishes
    pub progress: UnboundedReceiver<ProgressEvent>,
    join: JoinHandle<Result<IngestionReport, IngestError>>,
}

impl IngestionHandle {
    /// Wait for the run to finish
    pub async fn wait(self) -> Result<IngestionReport, IngestError> {
        self.join
            .await
            .map_err(|e| IngestError::Join(e.to_string()))?
    }
}

/// Recreate the configured database and ingest the corpus on a blocking task
///
/// Must be called from within a tokio runtime. The run cannot be cancelled.
pub fn spawn_ingestion(context: IngestionContext) -> IngestionHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let join = tokio::task::spawn_blocking(move || {
        let mut tx = tx;
        let store = SqliteStore::recreate(&context.config.database)
            .map_err(|e| IngestError::Store(e.to_string()))?;
        let mut ingestor = Ingestor::new(context, store)?;
        ingestor.process_files(&mut tx)
    });
    IngestionHandle {
        progress: rx,
        join,
    }
}
