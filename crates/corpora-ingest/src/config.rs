//! Configuration for a corpus project

use crate::error::IngestError;
use corpora_domain::{Label, LabelCategory, MetaKind, SourceFileType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// Label category as written in the project file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryConfig {
    /// TEXT label
    Text,
    /// META label
    Meta,
}

/// Source format a label applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileTypeConfig {
    /// JSON documents
    Json,
    /// XML documents
    Xml,
}

/// Declared kind of a META label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindConfig {
    /// Numeric or date-like
    Quantitative,
    /// Distinct values
    Categorical,
}

/// One `[[labels]]` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelConfig {
    /// Label name
    pub name: String,

    /// JSON key or XML tag
    pub match_key: String,

    /// Text or meta
    pub category: CategoryConfig,

    /// Format the label applies to
    pub file_type: FileTypeConfig,

    /// Required XML attribute values
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub required_attrs: BTreeMap<String, String>,

    /// META values come from the element's attributes
    #[serde(default)]
    pub value_in_attrs: bool,

    /// Expected kind of a META label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<KindConfig>,
}

impl LabelConfig {
    /// Convert to the domain label
    pub fn to_label(&self) -> Label {
        Label {
            name: self.name.clone(),
            match_key: self.match_key.clone(),
            required_attrs: self
                .required_attrs
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            category: match self.category {
                CategoryConfig::Text => LabelCategory::Text,
                CategoryConfig::Meta => LabelCategory::Meta,
            },
            source_file_type: match self.file_type {
                FileTypeConfig::Json => SourceFileType::Json,
                FileTypeConfig::Xml => SourceFileType::Xml,
            },
            value_in_attrs: self.value_in_attrs,
            declared_kind: self.kind.map(|k| match k {
                KindConfig::Quantitative => MetaKind::Quantitative,
                KindConfig::Categorical => MetaKind::Categorical,
            }),
        }
    }
}

/// One `[[subfolders]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubfolderConfig {
    /// Subfolder name used in queries
    pub name: String,

    /// Directory whose files belong to the subfolder
    pub path: PathBuf,
}

/// Configuration for one corpus project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Root directory of the corpus
    pub corpus_path: PathBuf,

    /// Database file; recreated on every full ingestion
    #[serde(default = "default_database")]
    pub database: PathBuf,

    /// Only ingest files with these extensions
    #[serde(default)]
    pub included_extensions: Vec<String>,

    /// Skip files with these extensions (ignored when `included_extensions` is set)
    #[serde(default)]
    pub ignored_extensions: Vec<String>,

    /// Run the embedding pass after ingestion
    #[serde(default)]
    pub add_embeddings: bool,

    /// Dimension of the embedding model
    #[serde(default = "default_embedding_dimension")]
    pub embedding_dimension: usize,

    /// Named subfolders
    #[serde(default)]
    pub subfolders: Vec<SubfolderConfig>,

    /// Label catalog
    #[serde(default)]
    pub labels: Vec<LabelConfig>,
}

fn default_database() -> PathBuf {
    PathBuf::from("corpus.db")
}

fn default_embedding_dimension() -> usize {
    384
}

fn normalize_extension(ext: &str) -> String {
    format!(".{}", ext.trim_start_matches('.'))
}

impl CorpusConfig {
    /// Create a configuration with defaults for everything but the corpus root
    pub fn new(corpus_path: impl Into<PathBuf>) -> Self {
        Self {
            corpus_path: corpus_path.into(),
            database: default_database(),
            included_extensions: Vec::new(),
            ignored_extensions: Vec::new(),
            add_embeddings: false,
            embedding_dimension: default_embedding_dimension(),
            subfolders: Vec::new(),
            labels: Vec::new(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        let mut names = HashSet::new();
        for label in &self.labels {
            if !names.insert(label.name.as_str()) {
                return Err(format!("Duplicate label name \"{}\"", label.name));
            }
            if label.match_key.is_empty() {
                return Err(format!("Label \"{}\" has an empty match_key", label.name));
            }
            if label.file_type == FileTypeConfig::Json && !label.required_attrs.is_empty() {
                return Err(format!(
                    "Label \"{}\": required_attrs only apply to XML labels",
                    label.name
                ));
            }
            if label.value_in_attrs
                && (label.category != CategoryConfig::Meta || label.file_type != FileTypeConfig::Xml)
            {
                return Err(format!(
                    "Label \"{}\": value_in_attrs only applies to XML meta labels",
                    label.name
                ));
            }
            if label.kind.is_some() && label.category != CategoryConfig::Meta {
                return Err(format!(
                    "Label \"{}\": kind only applies to meta labels",
                    label.name
                ));
            }
        }

        let mut subfolder_names = HashSet::new();
        for subfolder in &self.subfolders {
            if !subfolder_names.insert(subfolder.name.as_str()) {
                return Err(format!("Duplicate subfolder name \"{}\"", subfolder.name));
            }
        }

        if self.embedding_dimension == 0 {
            return Err("embedding_dimension must be greater than 0".to_string());
        }

        let included: HashSet<String> =
            self.included_extensions.iter().map(|e| normalize_extension(e)).collect();
        if let Some(ext) = self
            .ignored_extensions
            .iter()
            .map(|e| normalize_extension(e))
            .find(|e| included.contains(e))
        {
            return Err(format!("Extension {} is both included and ignored", ext));
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, IngestError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate().map_err(IngestError::Config)?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }

    /// Make relative paths relative to `base` (the project file's directory)
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.corpus_path);
        resolve(&mut self.database);
        for subfolder in &mut self.subfolders {
            resolve(&mut subfolder.path);
        }
    }

    /// All labels in catalog order
    pub fn labels(&self) -> Vec<Label> {
        self.labels.iter().map(LabelConfig::to_label).collect()
    }

    /// TEXT labels for one source format
    pub fn text_labels(&self, file_type: SourceFileType) -> Vec<Label> {
        self.labels_for(LabelCategory::Text, file_type)
    }

    /// META labels for one source format
    pub fn meta_labels(&self, file_type: SourceFileType) -> Vec<Label> {
        self.labels_for(LabelCategory::Meta, file_type)
    }

    fn labels_for(&self, category: LabelCategory, file_type: SourceFileType) -> Vec<Label> {
        self.labels()
            .into_iter()
            .filter(|l| l.category == category && l.source_file_type == file_type)
            .collect()
    }

    /// Whether a file should be ingested, judged by its extension
    ///
    /// `included_extensions` wins over `ignored_extensions`; with neither set,
    /// every supported format is ingested.
    pub fn accepts(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        let ext = normalize_extension(ext);

        if !self.included_extensions.is_empty() {
            self.included_extensions
                .iter()
                .any(|e| normalize_extension(e) == ext)
        } else if !self.ignored_extensions.is_empty() {
            !self
                .ignored_extensions
                .iter()
                .any(|e| normalize_extension(e) == ext)
        } else {
            SourceFileType::from_extension(&ext).is_some()
        }
    }

    /// Names of every configured subfolder containing the file
    pub fn subfolders_for(&self, path: &Path) -> Vec<String> {
        self.subfolders
            .iter()
            .filter(|s| path.starts_with(&s.path))
            .map(|s| s.name.clone())
            .collect()
    }
}
