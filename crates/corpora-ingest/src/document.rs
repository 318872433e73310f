//! Conversion of source files into the uniform document tree

use crate::error::DocumentError;
use corpora_domain::{Attributes, DocNode, Scalar, SourceFileType, TaggedContent, TaggedNode};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Read a file as UTF-8 text
pub fn read_text(path: &Path) -> Result<String, DocumentError> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8(bytes)?)
}

/// Convert a JSON or XML file into a document tree
///
/// Transcript files have their own adapter; any other extension is rejected.
pub fn parse_file(path: &Path) -> Result<DocNode, DocumentError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();

    match SourceFileType::from_extension(&ext) {
        Some(file_type @ (SourceFileType::Json | SourceFileType::Xml)) => {
            let text = read_text(path)?;
            parse_str(&text, file_type)
        }
        _ => Err(DocumentError::UnsupportedFormat(ext)),
    }
}

/// Convert document text of a known format into a document tree
pub fn parse_str(text: &str, file_type: SourceFileType) -> Result<DocNode, DocumentError> {
    match file_type {
        SourceFileType::Json => {
            let value: Value = serde_json::from_str(text)?;
            Ok(json_to_node(value))
        }
        SourceFileType::Xml => {
            let options = roxmltree::ParsingOptions {
                allow_dtd: true,
                ..roxmltree::ParsingOptions::default()
            };
            let doc = roxmltree::Document::parse_with_options(text, options)?;
            Ok(DocNode::Tagged(element_to_node(doc.root_element())))
        }
        SourceFileType::Transcript => Err(DocumentError::UnsupportedFormat(
            SourceFileType::Transcript.extension().to_string(),
        )),
    }
}

fn json_to_node(value: Value) -> DocNode {
    match value {
        Value::Null => DocNode::Null,
        Value::Bool(b) => DocNode::Scalar(Scalar::Bool(b)),
        Value::Number(n) => {
            let scalar = match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => Scalar::Int(i),
                (None, Some(x)) => Scalar::Float(x),
                (None, None) => Scalar::Str(n.to_string()),
            };
            DocNode::Scalar(scalar)
        }
        Value::String(s) => DocNode::Scalar(Scalar::Str(s)),
        Value::Array(items) => DocNode::List(items.into_iter().map(json_to_node).collect()),
        Value::Object(map) => DocNode::Map(
            map.into_iter()
                .map(|(k, v)| (k, json_to_node(v)))
                .collect(),
        ),
    }
}

fn element_to_node(element: roxmltree::Node<'_, '_>) -> TaggedNode {
    let attrs: Attributes = element
        .attributes()
        .map(|a| (a.name(), a.value()))
        .collect();

    let children: Vec<DocNode> = element
        .children()
        .filter(|n| n.is_element())
        .map(|n| DocNode::Tagged(element_to_node(n)))
        .collect();

    let content = if !children.is_empty() {
        TaggedContent::Children(children)
    } else {
        match element.text().map(str::trim) {
            Some(text) if !text.is_empty() => TaggedContent::Text(text.to_string()),
            _ => TaggedContent::Empty,
        }
    };

    TaggedNode::new(element.tag_name().name(), attrs).with_content(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_json_keeps_key_order_and_number_kinds() {
        let node = parse_str(r#"{"b": 1, "a": [2.5, null, true]}"#, SourceFileType::Json).unwrap();
        let DocNode::Map(entries) = node else {
            panic!("expected a map");
        };
        assert_eq!(entries[0].0, "b");
        assert_eq!(entries[0].1, DocNode::Scalar(Scalar::Int(1)));
        assert_eq!(
            entries[1].1,
            DocNode::List(vec![
                DocNode::Scalar(Scalar::Float(2.5)),
                DocNode::Null,
                DocNode::Scalar(Scalar::Bool(true)),
            ])
        );
    }

    #[test]
    fn test_xml_elements_become_tagged_nodes() {
        let xml = r#"<session lang="eng">
            <u who="CHI">  more cookie  </u>
            <pause/>
        </session>"#;
        let DocNode::Tagged(root) = parse_str(xml, SourceFileType::Xml).unwrap() else {
            panic!("expected a tagged root");
        };
        assert_eq!(root.tag, "session");
        assert_eq!(root.attrs.get("lang"), Some("eng"));

        let TaggedContent::Children(children) = &root.content else {
            panic!("expected children");
        };
        assert_eq!(children.len(), 2);
        let DocNode::Tagged(u) = &children[0] else {
            panic!("expected element");
        };
        assert_eq!(u.content, TaggedContent::Text("more cookie".to_string()));
        let DocNode::Tagged(pause) = &children[1] else {
            panic!("expected element");
        };
        assert_eq!(pause.content, TaggedContent::Empty);
    }

    #[test]
    fn test_xml_namespaced_tags_use_local_name() {
        let xml = r#"<c:doc xmlns:c="urn:x"><c:title>Hi</c:title></c:doc>"#;
        let DocNode::Tagged(root) = parse_str(xml, SourceFileType::Xml).unwrap() else {
            panic!("expected a tagged root");
        };
        assert_eq!(root.tag, "doc");
    }

    #[test]
    fn test_unsupported_extension() {
        let err = parse_file(Path::new("notes.txt")).unwrap_err();
        assert!(matches!(err, DocumentError::UnsupportedFormat(ext) if ext == ".txt"));
    }

    #[test]
    fn test_invalid_utf8_is_a_decode_error() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(&[b'"', 0xff, 0xfe, b'"']).unwrap();
        let err = parse_file(file.path()).unwrap_err();
        assert!(matches!(err, DocumentError::Decode(_)));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            parse_str("{", SourceFileType::Json),
            Err(DocumentError::Json(_))
        ));
    }
}
