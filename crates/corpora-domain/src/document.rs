//! Document module - the uniform tree every source file is converted into

use std::fmt;

/// A terminal value in a document tree
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Text value
    Str(String),

    /// Integer value
    Int(i64),

    /// Floating point value
    Float(f64),

    /// Boolean value
    Bool(bool),
}

impl Scalar {
    /// Render the scalar as the text it contributes to a sentence or meta value
    ///
    /// # Examples
    ///
    /// ```
    /// use corpora_domain::Scalar;
    ///
    /// assert_eq!(Scalar::Int(3).as_text(), "3");
    /// assert_eq!(Scalar::Float(2.5).as_text(), "2.5");
    /// assert_eq!(Scalar::Bool(true).as_text(), "true");
    /// ```
    pub fn as_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Str(s) => f.write_str(s),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Str(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Str(s)
    }
}

/// Attributes of an XML element, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    /// Create an empty attribute bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attribute
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// Look up an attribute value by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over (name, value) pairs in document order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no attributes
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// What an XML element holds below its start tag
#[derive(Debug, Clone, PartialEq)]
pub enum TaggedContent {
    /// Child elements (text between them is discarded)
    Children(Vec<DocNode>),

    /// Trimmed text content of an element without child elements
    Text(String),

    /// Neither text nor child elements
    Empty,
}

/// A converted XML element
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedNode {
    /// Element name
    pub tag: String,

    /// Element attributes
    pub attrs: Attributes,

    /// Element content
    pub content: TaggedContent,
}

impl TaggedNode {
    /// Create an element with no content
    pub fn new(tag: impl Into<String>, attrs: Attributes) -> Self {
        Self {
            tag: tag.into(),
            attrs,
            content: TaggedContent::Empty,
        }
    }

    /// Set the element content
    pub fn with_content(mut self, content: TaggedContent) -> Self {
        self.content = content;
        self
    }
}

/// A node in the uniform document tree
///
/// JSON documents produce `Map`, `List`, `Scalar` and `Null` nodes.
/// XML documents produce a single `Tagged` root with `Tagged` descendants.
#[derive(Debug, Clone, PartialEq)]
pub enum DocNode {
    /// Object with keys in document order
    Map(Vec<(String, DocNode)>),

    /// Array
    List(Vec<DocNode>),

    /// Terminal value
    Scalar(Scalar),

    /// JSON `null`
    Null,

    /// XML element
    Tagged(TaggedNode),
}

impl DocNode {
    /// Shorthand for a string leaf
    pub fn text(s: impl Into<String>) -> Self {
        DocNode::Scalar(Scalar::Str(s.into()))
    }

    /// Shorthand for a map node
    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, DocNode)>) -> Self {
        DocNode::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Something a label can be matched against
///
/// Map keys are matched by name, XML elements by tag and attributes.
#[derive(Debug, Clone, Copy)]
pub enum Candidate<'a> {
    /// A JSON object key
    Key(&'a str),

    /// An XML element
    Element(&'a TaggedNode),
}
