//! Text and metadata extraction over a document tree
//!
//! Text extraction carries the set of TEXT labels matched on the path from
//! the root. Each frame gets its own copy of the set, so siblings never see a
//! label matched under another branch. Every leaf reached under at least one
//! TEXT label takes the next group ordinal, even when it holds no text.
//!
//! Metadata extraction visits every node once and tests every META label.

use crate::error::StructuralError;
use corpora_domain::traits::SentenceTokenizer;
use corpora_domain::{
    Candidate, DocNode, ExtractedSentence, Label, MetaPropertyReference, Scalar, TaggedContent,
    TaggedNode,
};
use std::collections::{BTreeSet, HashMap, HashSet};

/// A leaf reached under at least one TEXT label
#[derive(Debug, Clone, PartialEq)]
pub struct TextLeaf {
    /// Rendered leaf value; `None` for null or empty leaves
    pub text: Option<String>,

    /// Names of TEXT labels matched on the leaf's ancestors
    pub categories: BTreeSet<String>,
}

fn extend_with_matches(
    ancestors: &BTreeSet<String>,
    labels: &[Label],
    candidate: Candidate<'_>,
) -> BTreeSet<String> {
    let mut set = ancestors.clone();
    set.extend(
        labels
            .iter()
            .filter(|l| l.matches(candidate))
            .map(|l| l.name.clone()),
    );
    set
}

fn leaf(text: Option<String>, ancestors: &BTreeSet<String>) -> Vec<TextLeaf> {
    if ancestors.is_empty() {
        Vec::new()
    } else {
        vec![TextLeaf {
            text,
            categories: ancestors.clone(),
        }]
    }
}

/// Collect every leaf under a TEXT label, in traversal order
pub fn text_leaves(node: &DocNode, labels: &[Label]) -> Vec<TextLeaf> {
    leaves_below(node, labels, &BTreeSet::new())
}

fn leaves_below(node: &DocNode, labels: &[Label], ancestors: &BTreeSet<String>) -> Vec<TextLeaf> {
    match node {
        DocNode::Map(entries) => entries
            .iter()
            .flat_map(|(key, value)| {
                let scope = extend_with_matches(ancestors, labels, Candidate::Key(key));
                leaves_below(value, labels, &scope)
            })
            .collect(),
        DocNode::List(items) => items
            .iter()
            .flat_map(|item| leaves_below(item, labels, ancestors))
            .collect(),
        DocNode::Scalar(scalar) => leaf(Some(scalar.as_text()), ancestors),
        DocNode::Null => leaf(None, ancestors),
        DocNode::Tagged(element) => {
            let scope = extend_with_matches(ancestors, labels, Candidate::Element(element));
            match &element.content {
                TaggedContent::Children(children) => children
                    .iter()
                    .flat_map(|child| leaves_below(child, labels, &scope))
                    .collect(),
                TaggedContent::Text(text) => leaf(Some(text.clone()), &scope),
                TaggedContent::Empty => leaf(None, &scope),
            }
        }
    }
}

/// Extract the sentences of a document
///
/// `group_id` is the ordinal of the leaf each sentence was split from.
pub fn extract_text(
    node: &DocNode,
    labels: &[Label],
    tokenizer: &dyn SentenceTokenizer,
) -> Vec<ExtractedSentence> {
    let mut sentences = Vec::new();
    for (ordinal, leaf) in text_leaves(node, labels).into_iter().enumerate() {
        let Some(text) = leaf.text else {
            continue;
        };
        for sentence in tokenizer.sent_tokenize(&text) {
            sentences.push(ExtractedSentence::new(
                sentence,
                ordinal,
                leaf.categories.clone(),
            ));
        }
    }
    sentences
}

enum MetaMatch<'a> {
    Value(&'a Label, Option<Scalar>),
    Attributes(&'a Label, &'a TaggedNode),
}

fn describe(node: &DocNode) -> &'static str {
    match node {
        DocNode::Map(_) => "map",
        DocNode::List(_) => "list",
        DocNode::Tagged(_) => "element",
        DocNode::Scalar(_) => "scalar",
        DocNode::Null => "null",
    }
}

fn node_value(label: &Label, node: &DocNode) -> Result<Option<Scalar>, StructuralError> {
    match node {
        DocNode::Scalar(scalar) => Ok(Some(scalar.clone())),
        DocNode::Null => Ok(None),
        other => Err(StructuralError::IncompatibleValue {
            label: label.name.clone(),
            found: describe(other).to_string(),
        }),
    }
}

fn element_value(label: &Label, element: &TaggedNode) -> Result<Option<Scalar>, StructuralError> {
    match &element.content {
        TaggedContent::Text(text) => Ok(Some(Scalar::Str(text.clone()))),
        TaggedContent::Empty => Ok(None),
        TaggedContent::Children(_) => Err(StructuralError::IncompatibleValue {
            label: label.name.clone(),
            found: format!("element <{}> with child elements", element.tag),
        }),
    }
}

fn collect_meta_matches<'a>(
    node: &'a DocNode,
    labels: &'a [Label],
    found: &mut Vec<MetaMatch<'a>>,
) -> Result<(), StructuralError> {
    match node {
        DocNode::Map(entries) => {
            for (key, value) in entries {
                for label in labels.iter().filter(|l| l.matches(Candidate::Key(key))) {
                    found.push(MetaMatch::Value(label, node_value(label, value)?));
                }
                collect_meta_matches(value, labels, found)?;
            }
        }
        DocNode::List(items) => {
            for item in items {
                collect_meta_matches(item, labels, found)?;
            }
        }
        DocNode::Tagged(element) => {
            for label in labels.iter().filter(|l| l.matches(Candidate::Element(element))) {
                if label.value_in_attrs {
                    found.push(MetaMatch::Attributes(label, element));
                } else {
                    found.push(MetaMatch::Value(label, element_value(label, element)?));
                }
            }
            if let TaggedContent::Children(children) = &element.content {
                for child in children {
                    collect_meta_matches(child, labels, found)?;
                }
            }
        }
        DocNode::Scalar(_) | DocNode::Null => {}
    }
    Ok(())
}

/// Extract the document-level metadata of a file
///
/// A label without attribute mode may match more than once only with the
/// same value, which yields a single reference. In attribute mode every
/// attribute of the matched element becomes a reference, and each attribute
/// name may occur once per label.
pub fn extract_meta(
    node: &DocNode,
    labels: &[Label],
    file_path: &str,
) -> Result<Vec<MetaPropertyReference>, StructuralError> {
    let mut found = Vec::new();
    collect_meta_matches(node, labels, &mut found)?;

    let mut refs = Vec::new();
    // Compared as stored text, so `3` and `3.0` are the same value
    let mut seen_values: HashMap<&str, String> = HashMap::new();
    let mut seen_attrs: HashSet<(&str, &str)> = HashSet::new();

    for m in found {
        match m {
            MetaMatch::Value(_, None) => {}
            MetaMatch::Value(label, Some(value)) => {
                let text = value.as_text();
                match seen_values.get(label.name.as_str()) {
                    Some(existing) if *existing == text => continue,
                    Some(_) => {
                        return Err(StructuralError::DuplicateMetaLabel {
                            label: label.name.clone(),
                        })
                    }
                    None => {}
                }
                seen_values.insert(&label.name, text);
                refs.push(MetaPropertyReference::new(
                    file_path,
                    label.name.as_str(),
                    label.name.as_str(),
                    value,
                ));
            }
            MetaMatch::Attributes(label, element) => {
                for (name, value) in element.attrs.iter() {
                    if !seen_attrs.insert((label.name.as_str(), name)) {
                        return Err(StructuralError::DuplicateMetaAttribute {
                            label: label.name.clone(),
                            attribute: name.to_string(),
                        });
                    }
                    refs.push(MetaPropertyReference::new(
                        file_path,
                        label.name.as_str(),
                        name,
                        value,
                    ));
                }
            }
        }
    }
    Ok(refs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use corpora_domain::{Attributes, SourceFileType};

    struct Whole;

    impl SentenceTokenizer for Whole {
        fn sent_tokenize(&self, text: &str) -> Vec<String> {
            vec![text.to_string()]
        }
    }

    fn element(tag: &str, attrs: &[(&str, &str)], content: TaggedContent) -> DocNode {
        let attrs: Attributes = attrs.iter().copied().collect();
        DocNode::Tagged(TaggedNode::new(tag, attrs).with_content(content))
    }

    fn cats(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_nested_labels_compose() {
        let doc = DocNode::map([(
            "label_1",
            DocNode::map([
                (
                    "label_2",
                    DocNode::List(vec![DocNode::text("string 1"), DocNode::text("string 2")]),
                ),
                ("label_3", DocNode::text("string 3")),
            ]),
        )]);
        let labels = vec![
            Label::text("one", "label_1", SourceFileType::Json),
            Label::text("two", "label_2", SourceFileType::Json),
        ];

        let sentences = extract_text(&doc, &labels, &Whole);
        assert_eq!(sentences.len(), 3);
        assert_eq!(sentences[0].text_categories, cats(&["one", "two"]));
        assert_eq!(sentences[1].text_categories, cats(&["one", "two"]));
        assert_eq!(sentences[2].text_categories, cats(&["one"]));
        let groups: Vec<usize> = sentences.iter().map(|s| s.group_id).collect();
        assert_eq!(groups, vec![0, 1, 2]);
    }

    #[test]
    fn test_sibling_scope_does_not_leak() {
        let doc = DocNode::map([
            ("a", DocNode::text("under a")),
            ("b", DocNode::text("under b")),
        ]);
        let labels = vec![
            Label::text("A", "a", SourceFileType::Json),
            Label::text("B", "b", SourceFileType::Json),
        ];
        let sentences = extract_text(&doc, &labels, &Whole);
        assert_eq!(sentences[0].text_categories, cats(&["A"]));
        assert_eq!(sentences[1].text_categories, cats(&["B"]));
    }

    #[test]
    fn test_unlabelled_leaves_are_dropped_and_take_no_ordinal() {
        let doc = DocNode::map([
            ("title", DocNode::text("Ignored")),
            ("body", DocNode::List(vec![DocNode::Null, DocNode::text("Kept.")])),
        ]);
        let labels = vec![Label::text("body", "body", SourceFileType::Json)];
        let sentences = extract_text(&doc, &labels, &Whole);
        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0].text, "Kept.");
        assert_eq!(sentences[0].group_id, 1);
    }

    #[test]
    fn test_xml_attribute_match_is_superset() {
        let doc = element(
            "session",
            &[],
            TaggedContent::Children(vec![
                element("u", &[("who", "CHI"), ("n", "1")], TaggedContent::Text("Hi.".into())),
                element("u", &[("who", "MOT")], TaggedContent::Text("Hello.".into())),
            ]),
        );
        let labels = vec![Label::text("child", "u", SourceFileType::Xml).with_attr("who", "CHI")];
        let sentences = extract_text(&doc, &labels, &Whole);
        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0].text, "Hi.");
    }

    #[test]
    fn test_scalars_render_as_text() {
        let doc = DocNode::map([(
            "t",
            DocNode::List(vec![
                DocNode::Scalar(Scalar::Int(7)),
                DocNode::Scalar(Scalar::Float(1.5)),
                DocNode::Scalar(Scalar::Bool(true)),
            ]),
        )]);
        let labels = vec![Label::text("t", "t", SourceFileType::Json)];
        let texts: Vec<String> = extract_text(&doc, &labels, &Whole)
            .into_iter()
            .map(|s| s.text)
            .collect();
        assert_eq!(texts, vec!["7", "1.5", "true"]);
    }

    #[test]
    fn test_duplicate_meta_with_same_value_collapses() {
        let doc = DocNode::List(vec![
            DocNode::map([("lang", DocNode::text("eng"))]),
            DocNode::map([("lang", DocNode::text("eng"))]),
        ]);
        let labels = vec![Label::meta("lang", "lang", SourceFileType::Json)];
        let refs = extract_meta(&doc, &labels, "f.json").unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].property_name, "lang");
    }

    #[test]
    fn test_duplicate_meta_compares_stored_text() {
        let doc = DocNode::List(vec![
            DocNode::map([("age", DocNode::Scalar(Scalar::Int(3)))]),
            DocNode::map([("age", DocNode::Scalar(Scalar::Float(3.0)))]),
        ]);
        let labels = vec![Label::meta("age", "age", SourceFileType::Json)];
        let refs = extract_meta(&doc, &labels, "f.json").unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].value.as_text(), "3");
    }

    #[test]
    fn test_duplicate_meta_with_different_value_fails() {
        let doc = DocNode::List(vec![
            DocNode::map([("lang", DocNode::text("eng"))]),
            DocNode::map([("lang", DocNode::text("fra"))]),
        ]);
        let labels = vec![Label::meta("lang", "lang", SourceFileType::Json)];
        let err = extract_meta(&doc, &labels, "f.json").unwrap_err();
        assert_eq!(
            err,
            StructuralError::DuplicateMetaLabel {
                label: "lang".to_string()
            }
        );
    }

    #[test]
    fn test_meta_value_must_be_scalar() {
        let doc = DocNode::map([("age", DocNode::List(vec![DocNode::Scalar(Scalar::Int(3))]))]);
        let labels = vec![Label::meta("age", "age", SourceFileType::Json)];
        assert!(matches!(
            extract_meta(&doc, &labels, "f.json"),
            Err(StructuralError::IncompatibleValue { .. })
        ));
    }

    #[test]
    fn test_null_meta_value_is_skipped() {
        let doc = DocNode::map([("age", DocNode::Null), ("x", DocNode::map([("age", DocNode::Scalar(Scalar::Int(4)))]))]);
        let labels = vec![Label::meta("age", "age", SourceFileType::Json)];
        let refs = extract_meta(&doc, &labels, "f.json").unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].value, Scalar::Int(4));
    }

    #[test]
    fn test_attribute_mode_meta() {
        let doc = element(
            "session",
            &[],
            TaggedContent::Children(vec![
                element("participant", &[("age", "3"), ("sex", "f")], TaggedContent::Empty),
                element("setting", &[("place", "home")], TaggedContent::Empty),
            ]),
        );
        let labels = vec![
            Label::meta("participant", "participant", SourceFileType::Xml).with_value_in_attrs(),
            Label::meta("setting", "setting", SourceFileType::Xml).with_value_in_attrs(),
        ];
        let refs = extract_meta(&doc, &labels, "f.xml").unwrap();
        let props: Vec<(&str, &str)> = refs
            .iter()
            .map(|r| (r.label_name.as_str(), r.property_name.as_str()))
            .collect();
        assert_eq!(
            props,
            vec![("participant", "age"), ("participant", "sex"), ("setting", "place")]
        );
        assert_eq!(refs[0].value, Scalar::from("3"));
    }

    #[test]
    fn test_attribute_mode_rejects_repeated_attribute() {
        let doc = element(
            "session",
            &[],
            TaggedContent::Children(vec![
                element("participant", &[("age", "3")], TaggedContent::Empty),
                element("participant", &[("age", "30")], TaggedContent::Empty),
            ]),
        );
        let labels =
            vec![Label::meta("participant", "participant", SourceFileType::Xml).with_value_in_attrs()];
        let err = extract_meta(&doc, &labels, "f.xml").unwrap_err();
        assert_eq!(
            err,
            StructuralError::DuplicateMetaAttribute {
                label: "participant".to_string(),
                attribute: "age".to_string(),
            }
        );
    }

    #[test]
    fn test_xml_meta_from_text_content() {
        let doc = element(
            "doc",
            &[],
            TaggedContent::Children(vec![element("date", &[], TaggedContent::Text("2020-01-02".into()))]),
        );
        let labels = vec![Label::meta("date", "date", SourceFileType::Xml)];
        let refs = extract_meta(&doc, &labels, "f.xml").unwrap();
        assert_eq!(refs[0].value, Scalar::from("2020-01-02"));
        assert_eq!(refs[0].file_path, "f.xml");
    }
}
