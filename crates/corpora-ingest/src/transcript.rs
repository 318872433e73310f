//! Adapter for CHAT conversation transcripts (`.cha`)
//!
//! Each utterance becomes one sentence tagged with its speaker code; dependent
//! tiers travel with it. Headers become document-level metadata, and the
//! `@Participants` and `@ID` headers are flattened into one property per
//! participant field.

use crate::document::read_text;
use crate::error::DocumentError;
use corpora_domain::{ExtractedSentence, MetaPropertyReference, Scalar};
use regex::Regex;
use std::collections::BTreeSet;
use std::path::Path;

/// Label name shared by every flattened participant property
pub const PARTICIPANTS_LABEL: &str = "Participants";

const ID_FIELDS: [&str; 10] = [
    "language",
    "corpus",
    "code",
    "age",
    "sex",
    "group",
    "ses",
    "role",
    "education",
    "custom",
];

const PARTICIPANT_FIELDS: [&str; 10] = [
    "name",
    "role",
    "language",
    "corpus",
    "age",
    "sex",
    "group",
    "ses",
    "education",
    "custom",
];

const VALUELESS_HEADERS: [&str; 3] = ["Begin", "End", "UTF8"];

/// Sentences and metadata extracted from one transcript
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    /// One sentence per utterance
    pub sentences: Vec<ExtractedSentence>,

    /// Header and participant metadata
    pub meta_refs: Vec<MetaPropertyReference>,
}

#[derive(Debug, Default)]
struct Participant {
    code: String,
    fields: Vec<(&'static str, String)>,
}

impl Participant {
    fn set(&mut self, field: &'static str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        match self.fields.iter_mut().find(|(f, _)| *f == field) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.fields.push((field, value.to_string())),
        }
    }

    fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| v.as_str())
    }
}

/// Line grammar for CHAT files
#[derive(Debug, Clone)]
pub struct TranscriptParser {
    header: Regex,
    utterance: Regex,
    tier: Regex,
    age: Regex,
    bullet: Regex,
}

impl TranscriptParser {
    /// Compile the line grammar
    pub fn new() -> Result<Self, DocumentError> {
        Ok(Self {
            header: Regex::new(r"^@([^:\t]+):\s*(.*)$")?,
            utterance: Regex::new(r"^\*([^:\s]+):\s*(.*)$")?,
            tier: Regex::new(r"^(%[^:\s]+):\s*(.*)$")?,
            age: Regex::new(r"^(\d+);(\d{1,2})?(?:\.(\d{1,2}))?$")?,
            bullet: Regex::new("\u{15}[^\u{15}]*\u{15}")?,
        })
    }

    /// Read and parse a transcript file
    pub fn parse_file(&self, path: &Path) -> Result<Transcript, DocumentError> {
        let text = read_text(path)?;
        Ok(self.parse(&text, &path.display().to_string()))
    }

    /// Convert a CHILDES age (`Y;MM.DD`, month and day optional) to years
    ///
    /// ```
    /// use corpora_ingest::TranscriptParser;
    ///
    /// let parser = TranscriptParser::new().unwrap();
    /// assert_eq!(parser.age_in_years("2;06."), Some(2.5));
    /// assert_eq!(parser.age_in_years("Target_Child"), None);
    /// ```
    pub fn age_in_years(&self, value: &str) -> Option<f64> {
        let caps = self.age.captures(value.trim().trim_end_matches('.'))?;
        let part = |i: usize| -> Option<f64> {
            match caps.get(i) {
                Some(m) => m.as_str().parse::<f64>().ok(),
                None => Some(0.0),
            }
        };
        Some(part(1)? + part(2)? / 12.0 + part(3)? / 365.0)
    }

    fn clean(&self, text: &str) -> String {
        self.bullet.replace_all(text, "").trim().to_string()
    }

    /// Parse transcript text
    pub fn parse(&self, text: &str, file_path: &str) -> Transcript {
        let mut headers: Vec<(String, String)> = Vec::new();
        let mut participants: Vec<Participant> = Vec::new();
        let mut sentences: Vec<ExtractedSentence> = Vec::new();
        let mut utterances = 0usize;
        // Tiers attach to the latest utterance only if it produced a sentence
        let mut current: Option<usize> = None;

        for line in logical_lines(text) {
            if let Some(caps) = self.utterance.captures(&line) {
                let ordinal = utterances;
                utterances += 1;
                let main = self.clean(&caps[2]);
                if main.is_empty() {
                    current = None;
                    continue;
                }
                let categories: BTreeSet<String> = [caps[1].to_string()].into_iter().collect();
                sentences.push(ExtractedSentence::new(main, ordinal, categories));
                current = Some(sentences.len() - 1);
            } else if let Some(caps) = self.tier.captures(&line) {
                if let Some(sentence) = current.and_then(|i| sentences.get_mut(i)) {
                    sentence.tiers.insert(caps[1].to_string(), self.clean(&caps[2]));
                }
            } else if let Some(caps) = self.header.captures(&line) {
                let name = caps[1].trim();
                let value = caps[2].trim();
                match name {
                    "Participants" => parse_participants(value, &mut participants),
                    "ID" => parse_id(value, &mut participants),
                    _ if VALUELESS_HEADERS.contains(&name) || value.is_empty() => {}
                    _ => match headers.iter_mut().find(|(n, _)| n == name) {
                        Some((_, existing)) => {
                            existing.push_str("; ");
                            existing.push_str(value);
                        }
                        None => headers.push((name.to_string(), value.to_string())),
                    },
                }
            }
        }

        let mut meta_refs: Vec<MetaPropertyReference> = headers
            .into_iter()
            .map(|(name, value)| MetaPropertyReference::new(file_path, name.as_str(), name.as_str(), value))
            .collect();

        for participant in &participants {
            for field in PARTICIPANT_FIELDS {
                let Some(value) = participant.get(field) else {
                    continue;
                };
                let scalar = match self.age_in_years(value) {
                    Some(years) if field == "age" => Scalar::Float(years),
                    _ => Scalar::from(value),
                };
                meta_refs.push(MetaPropertyReference::new(
                    file_path,
                    PARTICIPANTS_LABEL,
                    format!("{}-{}", participant.code, field),
                    scalar,
                ));
            }
        }

        Transcript {
            sentences,
            meta_refs,
        }
    }
}

/// Join tab-indented continuation lines onto the line they continue
fn logical_lines(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for raw in text.lines() {
        let raw = raw.trim_start_matches('\u{feff}').trim_end_matches('\r');
        if raw.trim().is_empty() {
            continue;
        }
        match lines.last_mut() {
            Some(previous) if raw.starts_with('\t') => {
                previous.push(' ');
                previous.push_str(raw.trim());
            }
            _ => lines.push(raw.to_string()),
        }
    }
    lines
}

fn participant<'a>(participants: &'a mut Vec<Participant>, code: &str) -> &'a mut Participant {
    let index = match participants.iter().position(|p| p.code == code) {
        Some(index) => index,
        None => {
            participants.push(Participant {
                code: code.to_string(),
                fields: Vec::new(),
            });
            participants.len() - 1
        }
    };
    &mut participants[index]
}

/// `CHI Ruth Target_Child, MOT Mother`
fn parse_participants(value: &str, participants: &mut Vec<Participant>) {
    for entry in value.split(',') {
        let words: Vec<&str> = entry.split_whitespace().collect();
        let Some((code, rest)) = words.split_first() else {
            continue;
        };
        let p = participant(participants, code);
        if let Some((role, name)) = rest.split_last() {
            p.set("role", role);
            p.set("name", &name.join(" "));
        }
    }
}

/// `eng|corpus|CHI|2;06.|female|||Target_Child|||`
fn parse_id(value: &str, participants: &mut Vec<Participant>) {
    let fields: Vec<&str> = value.split('|').collect();
    let Some(code) = fields.get(2).map(|c| c.trim()).filter(|c| !c.is_empty()) else {
        return;
    };
    let p = participant(participants, code);
    for (field, value) in ID_FIELDS.iter().zip(fields.iter()) {
        if *field != "code" {
            p.set(*field, value);
        }
    }
}
