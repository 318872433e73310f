//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use corpora_domain::{MetaProperty, MetaPropertyReference, MetaSummary, QueryResult, Sentence};
use corpora_ingest::IngestionReport;
use serde_json::{json, Value};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

const MAX_CATEGORY_VALUES: usize = 8;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

fn sentence_json(s: &Sentence) -> Value {
    let mut value = json!({
        "id": s.id,
        "text": s.text,
        "file_path": s.file_path,
        "group_id": s.group_id,
        "text_categories": s.text_categories,
        "tiers": s.tiers,
    });
    if let Some(embedding) = &s.embedding {
        value["embedding"] = json!(embedding);
    }
    value
}

fn meta_json(r: &MetaPropertyReference) -> Value {
    json!({
        "label_name": r.label_name,
        "property_name": r.property_name,
        "value": r.value.as_text(),
    })
}

fn summary_text(summary: &MetaSummary) -> String {
    match summary {
        MetaSummary::Quantitative { min, max } => format!("{} .. {}", min, max),
        MetaSummary::Categorical(values) => {
            let shown: Vec<&str> = values
                .iter()
                .take(MAX_CATEGORY_VALUES)
                .map(String::as_str)
                .collect();
            let mut text = shown.join(", ");
            if values.len() > MAX_CATEGORY_VALUES {
                text.push_str(&format!(", ... ({} more)", values.len() - MAX_CATEGORY_VALUES));
            }
            text
        }
    }
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a query result.
    pub fn format_query(&self, result: &QueryResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let meta: serde_json::Map<String, Value> = result
                    .meta_by_file
                    .iter()
                    .map(|(file, refs)| (file.clone(), refs.iter().map(meta_json).collect()))
                    .collect();
                let value = json!({
                    "sentences": result.sentences.iter().map(sentence_json).collect::<Vec<_>>(),
                    "meta_by_file": meta,
                });
                Ok(serde_json::to_string_pretty(&value)?)
            }
            _ => self.format_sentences(&result.sentences),
        }
    }

    /// Format sentences.
    pub fn format_sentences(&self, sentences: &[Sentence]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let values: Vec<Value> = sentences.iter().map(sentence_json).collect();
                Ok(serde_json::to_string_pretty(&values)?)
            }
            OutputFormat::Table => Ok(self.format_sentences_table(sentences)),
            OutputFormat::Quiet => Ok(sentences
                .iter()
                .map(|s| s.text.as_str())
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    /// Format bare sentence texts.
    pub fn format_texts(&self, texts: &[String]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(texts)?),
            _ => Ok(texts.join("\n")),
        }
    }

    fn format_sentences_table(&self, sentences: &[Sentence]) -> String {
        if sentences.is_empty() {
            return self.colorize("No sentences found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["ID", "File", "Group", "Categories", "Text"]);

        for s in sentences {
            let categories = s
                .text_categories
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            builder.push_record([
                s.id.to_string(),
                s.file_path.clone(),
                s.group_id.to_string(),
                categories,
                s.text.clone(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format classified meta properties.
    pub fn format_properties(&self, properties: &[MetaProperty]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let values: Vec<Value> = properties
                    .iter()
                    .map(|p| {
                        let mut value = json!({
                            "label_name": p.identity.label_name,
                            "property_name": p.identity.property_name,
                            "kind": p.kind().as_str(),
                        });
                        match &p.summary {
                            MetaSummary::Quantitative { min, max } => {
                                value["min"] = json!(min);
                                value["max"] = json!(max);
                            }
                            MetaSummary::Categorical(values) => {
                                value["cat_values"] = json!(values);
                            }
                        }
                        value
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&values)?)
            }
            OutputFormat::Quiet => Ok(properties
                .iter()
                .map(|p| format!("{}:{}", p.identity.label_name, p.identity.property_name))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if properties.is_empty() {
                    return Ok(self.colorize("No meta properties found.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["Label", "Property", "Kind", "Values"]);
                for p in properties {
                    builder.push_record([
                        p.identity.label_name.clone(),
                        p.identity.property_name.clone(),
                        p.kind().as_str().to_string(),
                        summary_text(&p.summary),
                    ]);
                }
                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));
                Ok(table.to_string())
            }
        }
    }

    /// Format an ingestion report.
    pub fn format_report(&self, report: &IngestionReport) -> Result<String> {
        if self.format == OutputFormat::Json {
            let value = json!({
                "files_seen": report.files_seen,
                "files_ingested": report.files_ingested,
                "sentences_written": report.sentences_written,
                "meta_identities": report.meta_identities,
                "classified": report.classified.len(),
                "embedded": report.embedded,
                "failures": report.failures.iter().map(|f| json!({
                    "path": f.path.display().to_string(),
                    "kind": f.kind.to_string(),
                    "message": f.message,
                })).collect::<Vec<_>>(),
                "classification_failures": report.classification_failures.iter().map(|(id, e)| json!({
                    "label_name": id.label_name,
                    "property_name": id.property_name,
                    "message": e.to_string(),
                })).collect::<Vec<_>>(),
            });
            return Ok(serde_json::to_string_pretty(&value)?);
        }

        let mut lines = vec![self.success(&format!(
            "Ingested {} of {} file(s): {} sentence(s), {} meta propert{}",
            report.files_ingested,
            report.files_seen,
            report.sentences_written,
            report.classified.len(),
            if report.classified.len() == 1 { "y" } else { "ies" }
        ))];
        if let Some(embedded) = report.embedded {
            lines.push(self.info(&format!("Embedded {} sentence(s)", embedded)));
        }
        for failure in &report.failures {
            lines.push(self.warning(&format!("Skipped ({}): {}", failure.kind, failure.message)));
        }
        for (identity, e) in &report.classification_failures {
            lines.push(self.warning(&format!(
                "Unclassified {}:{}: {}",
                identity.label_name, identity.property_name, e
            )));
        }
        Ok(lines.join("\n"))
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corpora_domain::MetaIdentity;
    use corpora_ingest::{FailureKind, FileFailure};
    use std::collections::{BTreeMap, BTreeSet};
    use std::path::PathBuf;

    fn create_test_sentence() -> Sentence {
        Sentence {
            id: 1,
            text: "More cookie.".to_string(),
            file_path: "corpus/a.json".to_string(),
            group_id: 0,
            text_categories: BTreeSet::from(["child".to_string()]),
            tiers: BTreeMap::new(),
            embedding: None,
        }
    }

    #[test]
    fn test_json_format() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_sentences(&[create_test_sentence()]).unwrap();
        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed[0]["text"], "More cookie.");
        assert_eq!(parsed[0]["text_categories"][0], "child");
        assert!(parsed[0].get("embedding").is_none());
    }

    #[test]
    fn test_quiet_format() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let output = formatter.format_sentences(&[create_test_sentence()]).unwrap();
        assert_eq!(output, "More cookie.");
    }

    #[test]
    fn test_table_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_sentences(&[create_test_sentence()]).unwrap();
        assert!(output.contains("Categories"));
        assert!(output.contains("More cookie."));
    }

    #[test]
    fn test_empty_sentences() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_sentences(&[]).unwrap();
        assert!(output.contains("No sentences found"));
    }

    #[test]
    fn test_query_json_includes_meta() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let mut result = QueryResult::default();
        result.sentences.push(create_test_sentence());
        result.meta_by_file.insert(
            "corpus/a.json".to_string(),
            vec![MetaPropertyReference::new("corpus/a.json", "age", "age", corpora_domain::Scalar::Int(3))],
        );
        let parsed: Value = serde_json::from_str(&formatter.format_query(&result).unwrap()).unwrap();
        assert_eq!(parsed["meta_by_file"]["corpus/a.json"][0]["value"], "3");
    }

    #[test]
    fn test_properties_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let properties = vec![
            MetaProperty {
                identity: MetaIdentity::new("age", "age"),
                summary: MetaSummary::Quantitative { min: 3.0, max: 6.0 },
            },
            MetaProperty {
                identity: MetaIdentity::new("speaker", "sex"),
                summary: MetaSummary::Categorical(BTreeSet::from([
                    "female".to_string(),
                    "male".to_string(),
                ])),
            },
        ];
        let output = formatter.format_properties(&properties).unwrap();
        assert!(output.contains("quantitative"));
        assert!(output.contains("3 .. 6"));
        assert!(output.contains("female, male"));
    }

    #[test]
    fn test_report_lists_failures() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let report = IngestionReport {
            files_seen: 2,
            files_ingested: 1,
            failures: vec![FileFailure {
                path: PathBuf::from("bad.json"),
                kind: FailureKind::Decode,
                message: "Decode error in bad.json".to_string(),
            }],
            ..IngestionReport::default()
        };
        let output = formatter.format_report(&report).unwrap();
        assert!(output.starts_with("✓ Ingested 1 of 2 file(s)"));
        assert!(output.contains("⚠ Skipped (decode): Decode error in bad.json"));
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let msg = formatter.success("test");
        assert_eq!(msg, "✓ test");
    }
}
