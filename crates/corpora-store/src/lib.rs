//! Corpora Storage Layer
//!
//! Implements the CorpusStore trait on SQLite.
//!
//! # Architecture
//!
//! - `sentences`, `text_categories` and `sent_tiers` hold sentence records
//! - `meta_properties` holds raw per-file metadata, unique on (file, property),
//!   with the value's [`quantity`] alongside for range filters
//! - `subfolders` holds file-to-subfolder membership
//! - `meta_property_stats` holds the corpus-wide classification
//!
//! Filters along independent dimensions map onto joins, so any combination
//! of subfolder, file, text category and meta filters is one statement.
//!
//! # Examples
//!
//! ```no_run
//! use corpora_store::SqliteStore;
//!
//! let store = SqliteStore::in_memory().unwrap();
//! // Store is now ready for ingestion
//! ```

#![warn(missing_docs)]

mod codec;
mod numeric;
mod query;

pub use numeric::quantity;

use corpora_domain::traits::CorpusStore;
use corpora_domain::{
    FileRecord, MetaIdentity, MetaKind, MetaProperty, MetaPropertyReference, MetaSummary, QueryFilter,
    QueryResult, Sentence, SentenceId, StoredValue,
};
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// I/O error while recreating the database file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Category set could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Embedding count differs from sentence count
    #[error("The number of embeddings ({actual}) does not match the number of sentences ({expected})")]
    EmbeddingCountMismatch {
        /// Stored sentence count
        expected: usize,
        /// Supplied vector count
        actual: usize,
    },

    /// A file already has a different value for this property
    #[error("Conflicting value for meta property \"{property_name}\" in {file_path}: stored {existing:?}, got {incoming:?}")]
    ConflictingMetaValue {
        /// File path
        file_path: String,
        /// Property name
        property_name: String,
        /// Value already stored
        existing: Option<String>,
        /// Value being inserted
        incoming: String,
    },
}

/// SQLite-based implementation of CorpusStore
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should have its own
/// SqliteStore instance; a store may be moved to a worker thread for the
/// duration of an ingestion run.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the store at the given path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use corpora_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("corpus.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory store
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::new(":memory:")
    }

    /// Delete any existing database at the path and create an empty one
    ///
    /// Used before a full reprocessing; there is no incremental re-ingestion.
    pub fn recreate<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if path.is_file() {
            std::fs::remove_file(path)?;
            debug!("Removed existing database {}", path.display());
        }
        Self::new(path)
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    fn load_sentences(
        &self,
        sql: &str,
        params: &[&dyn ToSql],
        include_embeddings: bool,
    ) -> Result<Vec<Sentence>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, |row| Self::row_to_sentence(row, include_embeddings))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut sentences = Vec::with_capacity(rows.len());
        for (mut sentence, blob) in rows {
            sentence.text_categories = self.fetch_text_categories(sentence.id)?;
            sentence.tiers = self.fetch_tiers(sentence.id)?;
            if let Some(bytes) = blob {
                sentence.embedding = Some(codec::decode_embedding(&bytes)?);
            }
            sentences.push(sentence);
        }
        Ok(sentences)
    }

    /// Columns: id, text, file_path, embedding, group_id
    fn row_to_sentence(
        row: &Row<'_>,
        include_embeddings: bool,
    ) -> rusqlite::Result<(Sentence, Option<Vec<u8>>)> {
        let blob: Option<Vec<u8>> = if include_embeddings { row.get(3)? } else { None };
        let sentence = Sentence {
            id: row.get(0)?,
            text: row.get(1)?,
            file_path: row.get(2)?,
            group_id: row.get(4)?,
            text_categories: BTreeSet::new(),
            tiers: BTreeMap::new(),
            embedding: None,
        };
        Ok((sentence, blob))
    }

    fn fetch_text_categories(&self, id: SentenceId) -> Result<BTreeSet<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT name FROM text_categories WHERE sentence_id = ?1")?;
        let names = stmt
            .query_map(params![id], |row| row.get::<_, String>(0))?
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(names)
    }

    fn fetch_tiers(&self, id: SentenceId) -> Result<BTreeMap<String, String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT name, value FROM sent_tiers WHERE sentence_id = ?1")?;
        let tiers = stmt
            .query_map(params![id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        Ok(tiers)
    }

    fn fetch_meta_for_file(&self, file_path: &str) -> Result<Vec<MetaPropertyReference>, StoreError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT label_name, property_name, value FROM meta_properties
             WHERE file_path = ?1 ORDER BY rowid",
        )?;
        let rows = stmt
            .query_map(params![file_path], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Value>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows
            .into_iter()
            .filter_map(|(label_name, property_name, value)| {
                codec::to_scalar(value).map(|value| MetaPropertyReference {
                    file_path: file_path.to_string(),
                    label_name,
                    property_name,
                    value,
                })
            })
            .collect())
    }
}

impl CorpusStore for SqliteStore {
    type Error = StoreError;

    fn insert_file(&mut self, record: &FileRecord) -> Result<usize, Self::Error> {
        let tx = self.conn.transaction()?;
        {
            let mut insert_sentence = tx.prepare_cached(
                "INSERT INTO sentences (text, file_path, embedding, group_id)
                 VALUES (?1, ?2, NULL, ?3)",
            )?;
            let mut insert_category = tx
                .prepare_cached("INSERT INTO text_categories (sentence_id, name) VALUES (?1, ?2)")?;
            let mut insert_tier = tx.prepare_cached(
                "INSERT INTO sent_tiers (sentence_id, name, value) VALUES (?1, ?2, ?3)",
            )?;

            for sentence in &record.sentences {
                insert_sentence.execute(params![
                    &sentence.text,
                    &record.file_path,
                    sentence.group_id
                ])?;
                let sentence_id = tx.last_insert_rowid();

                for name in &sentence.text_categories {
                    insert_category.execute(params![sentence_id, name])?;
                }
                for (name, value) in &sentence.tiers {
                    insert_tier.execute(params![sentence_id, name, value])?;
                }
            }

            let mut find_meta = tx.prepare_cached(
                "SELECT label_name, value FROM meta_properties
                 WHERE file_path = ?1 AND property_name = ?2",
            )?;
            let mut insert_meta = tx.prepare_cached(
                "INSERT INTO meta_properties (file_path, label_name, property_name, value, numeric_value)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;

            for reference in &record.meta_refs {
                let value = reference.value.as_text();
                let existing: Option<(String, Option<String>)> = find_meta
                    .query_row(params![&record.file_path, &reference.property_name], |row| {
                        Ok((row.get(0)?, row.get(1)?))
                    })
                    .optional()?;

                match existing {
                    None => {
                        insert_meta.execute(params![
                            &record.file_path,
                            &reference.label_name,
                            &reference.property_name,
                            &value,
                            quantity(&value)
                        ])?;
                    }
                    Some((label_name, Some(stored)))
                        if label_name == reference.label_name && stored == value => {}
                    Some((_, stored)) => {
                        return Err(StoreError::ConflictingMetaValue {
                            file_path: record.file_path.clone(),
                            property_name: reference.property_name.clone(),
                            existing: stored,
                            incoming: value,
                        });
                    }
                }
            }

            let mut insert_subfolder = tx.prepare_cached(
                "INSERT OR IGNORE INTO subfolders (file_path, subfolder_name) VALUES (?1, ?2)",
            )?;
            for name in &record.subfolders {
                insert_subfolder.execute(params![&record.file_path, name])?;
            }
        }
        tx.commit()?;

        debug!(
            "Inserted {} sentences, {} meta references for {}",
            record.sentences.len(),
            record.meta_refs.len(),
            record.file_path
        );
        Ok(record.sentences.len())
    }

    fn query(&self, filter: &QueryFilter) -> Result<QueryResult, Self::Error> {
        let statement = query::build(filter);
        let sentences = self.load_sentences(
            &statement.sql,
            &statement.param_refs(),
            filter.include_embeddings,
        )?;

        let file_paths: BTreeSet<&str> = sentences.iter().map(|s| s.file_path.as_str()).collect();
        let mut meta_by_file = BTreeMap::new();
        for file_path in file_paths {
            meta_by_file.insert(file_path.to_string(), self.fetch_meta_for_file(file_path)?);
        }

        Ok(QueryResult {
            sentences,
            meta_by_file,
        })
    }

    fn all_sentences(&self, include_embeddings: bool) -> Result<Vec<Sentence>, Self::Error> {
        self.load_sentences(
            "SELECT id, text, file_path, embedding, group_id FROM sentences ORDER BY id",
            &[],
            include_embeddings,
        )
    }

    fn all_sentence_texts(&self) -> Result<Vec<String>, Self::Error> {
        let mut stmt = self.conn.prepare("SELECT text FROM sentences ORDER BY id")?;
        let texts = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(texts)
    }

    fn sentence_count(&self) -> Result<usize, Self::Error> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM sentences", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn replace_embeddings(&mut self, vectors: &[Vec<f32>]) -> Result<(), Self::Error> {
        let expected = self.sentence_count()?;
        if vectors.len() != expected {
            return Err(StoreError::EmbeddingCountMismatch {
                expected,
                actual: vectors.len(),
            });
        }
        if let Some(first) = vectors.first() {
            if let Some(bad) = vectors.iter().position(|v| v.len() != first.len()) {
                return Err(StoreError::InvalidData(format!(
                    "Embedding {} has dimension {}, expected {}",
                    bad,
                    vectors[bad].len(),
                    first.len()
                )));
            }
        }

        let tx = self.conn.transaction()?;
        {
            let mut ids_stmt = tx.prepare("SELECT id FROM sentences ORDER BY id")?;
            let ids = ids_stmt
                .query_map([], |row| row.get::<_, SentenceId>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            let mut update = tx.prepare("UPDATE sentences SET embedding = ?1 WHERE id = ?2")?;
            for (id, vector) in ids.iter().zip(vectors) {
                update.execute(params![codec::encode_embedding(vector), id])?;
            }
        }
        tx.commit()?;

        debug!("Replaced {} embeddings", vectors.len());
        Ok(())
    }

    fn meta_value_sets(&self) -> Result<BTreeMap<MetaIdentity, Vec<StoredValue>>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT label_name, property_name, value FROM meta_properties
             ORDER BY label_name, property_name",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Value>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut sets: BTreeMap<MetaIdentity, Vec<StoredValue>> = BTreeMap::new();
        for (label_name, property_name, value) in rows {
            sets.entry(MetaIdentity::new(label_name, property_name))
                .or_default()
                .push(codec::to_stored_value(value));
        }
        Ok(sets)
    }

    fn save_meta_property(&mut self, property: &MetaProperty) -> Result<(), Self::Error> {
        let (min, max, categories) = match &property.summary {
            MetaSummary::Quantitative { min, max } => (Some(*min), Some(*max), None),
            MetaSummary::Categorical(values) => (None, None, Some(serde_json::to_string(values)?)),
        };

        self.conn.execute(
            "INSERT OR REPLACE INTO meta_property_stats
             (label_name, property_name, kind, min_value, max_value, categories)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                &property.identity.label_name,
                &property.identity.property_name,
                codec::kind_to_str(property.kind()),
                min,
                max,
                categories,
            ],
        )?;
        Ok(())
    }

    fn meta_properties(&self) -> Result<Vec<MetaProperty>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT label_name, property_name, kind, min_value, max_value, categories
             FROM meta_property_stats ORDER BY label_name, property_name",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<f64>>(3)?,
                    row.get::<_, Option<f64>>(4)?,
                    row.get::<_, Option<String>>(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut properties = Vec::with_capacity(rows.len());
        for (label_name, property_name, kind, min, max, categories) in rows {
            let summary = match codec::str_to_kind(&kind)? {
                MetaKind::Quantitative => MetaSummary::Quantitative {
                    min: min.ok_or_else(|| {
                        StoreError::InvalidData(format!("Missing min for {}", property_name))
                    })?,
                    max: max.ok_or_else(|| {
                        StoreError::InvalidData(format!("Missing max for {}", property_name))
                    })?,
                },
                MetaKind::Categorical => {
                    let values: BTreeSet<String> = match categories {
                        Some(json) => serde_json::from_str(&json)?,
                        None => BTreeSet::new(),
                    };
                    MetaSummary::Categorical(values)
                }
            };
            properties.push(MetaProperty {
                identity: MetaIdentity::new(label_name, property_name),
                summary,
            });
        }
        Ok(properties)
    }
}
