//! Label module - configured rules that bind document nodes to text or metadata

use crate::document::Candidate;
use std::fmt;

/// Whether a label marks text content or document metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelCategory {
    /// Leaves below a matching node are sentence text
    Text,

    /// The matching node carries a metadata value
    Meta,
}

impl LabelCategory {
    /// Get the category name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            LabelCategory::Text => "text",
            LabelCategory::Meta => "meta",
        }
    }
}

/// Source formats the corpus can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceFileType {
    /// `.json` documents
    Json,

    /// `.xml` documents
    Xml,

    /// `.cha` conversation transcripts
    Transcript,
}

impl SourceFileType {
    /// Map a file extension (with or without the leading dot) to a source type
    ///
    /// # Examples
    ///
    /// ```
    /// use corpora_domain::SourceFileType;
    ///
    /// assert_eq!(SourceFileType::from_extension(".xml"), Some(SourceFileType::Xml));
    /// assert_eq!(SourceFileType::from_extension("json"), Some(SourceFileType::Json));
    /// assert_eq!(SourceFileType::from_extension(".txt"), None);
    /// ```
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.') {
            "json" => Some(SourceFileType::Json),
            "xml" => Some(SourceFileType::Xml),
            "cha" => Some(SourceFileType::Transcript),
            _ => None,
        }
    }

    /// The extension for this type, including the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            SourceFileType::Json => ".json",
            SourceFileType::Xml => ".xml",
            SourceFileType::Transcript => ".cha",
        }
    }

    /// All supported source types
    pub fn all() -> [SourceFileType; 3] {
        [SourceFileType::Json, SourceFileType::Xml, SourceFileType::Transcript]
    }
}

impl fmt::Display for SourceFileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Classification of a metadata property across the corpus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaKind {
    /// Numeric or date-like values with a min/max range
    Quantitative,

    /// A finite set of distinct values
    Categorical,
}

impl MetaKind {
    /// Get the kind name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            MetaKind::Quantitative => "quantitative",
            MetaKind::Categorical => "categorical",
        }
    }

    /// Parse a kind from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "quantitative" => Some(MetaKind::Quantitative),
            "categorical" => Some(MetaKind::Categorical),
            _ => None,
        }
    }
}

impl std::str::FromStr for MetaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid meta kind: {}", s))
    }
}

/// A configured label
///
/// Labels are defined before ingestion and never change during a pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    /// Label identity; becomes the text category or meta label name
    pub name: String,

    /// JSON key or XML tag name the label binds to
    pub match_key: String,

    /// Attributes an XML element must carry with identical values
    pub required_attrs: Vec<(String, String)>,

    /// Text or meta
    pub category: LabelCategory,

    /// Format the label applies to
    pub source_file_type: SourceFileType,

    /// META only: values are the element's attributes rather than its content
    pub value_in_attrs: bool,

    /// META only: kind the project expects this property to have
    pub declared_kind: Option<MetaKind>,
}

impl Label {
    /// Create a TEXT label
    pub fn text(
        name: impl Into<String>,
        match_key: impl Into<String>,
        source_file_type: SourceFileType,
    ) -> Self {
        Self {
            name: name.into(),
            match_key: match_key.into(),
            required_attrs: Vec::new(),
            category: LabelCategory::Text,
            source_file_type,
            value_in_attrs: false,
            declared_kind: None,
        }
    }

    /// Create a META label whose value is the matched node's content
    pub fn meta(
        name: impl Into<String>,
        match_key: impl Into<String>,
        source_file_type: SourceFileType,
    ) -> Self {
        Self {
            category: LabelCategory::Meta,
            ..Self::text(name, match_key, source_file_type)
        }
    }

    /// Require an attribute value on matching XML elements
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.required_attrs.push((name.into(), value.into()));
        self
    }

    /// Take META values from the matched element's attributes
    pub fn with_value_in_attrs(mut self) -> Self {
        self.value_in_attrs = true;
        self
    }

    /// Declare the expected kind of a META label
    pub fn with_declared_kind(mut self, kind: MetaKind) -> Self {
        self.declared_kind = Some(kind);
        self
    }

    /// Check whether this label matches a candidate node
    ///
    /// Keys match by exact name. Elements match when the tag equals
    /// `match_key` and every required attribute is present with an identical
    /// value; extra attributes on the element are allowed.
    ///
    /// # Examples
    ///
    /// ```
    /// use corpora_domain::{Attributes, Candidate, Label, SourceFileType, TaggedNode};
    ///
    /// let label = Label::text("child", "u", SourceFileType::Xml).with_attr("who", "CHI");
    /// let attrs: Attributes = [("who", "CHI"), ("n", "4")].into_iter().collect();
    /// let node = TaggedNode::new("u", attrs);
    /// assert!(label.matches(Candidate::Element(&node)));
    ///
    /// let other = TaggedNode::new("u", [("who", "MOT")].into_iter().collect());
    /// assert!(!label.matches(Candidate::Element(&other)));
    /// ```
    pub fn matches(&self, candidate: Candidate<'_>) -> bool {
        match candidate {
            Candidate::Key(key) => key == self.match_key,
            Candidate::Element(node) => {
                node.tag == self.match_key
                    && self
                        .required_attrs
                        .iter()
                        .all(|(name, value)| node.attrs.get(name) == Some(value.as_str()))
            }
        }
    }
}

/// Free-function form of [`Label::matches`]
pub fn matches(label: &Label, candidate: Candidate<'_>) -> bool {
    label.matches(candidate)
}
