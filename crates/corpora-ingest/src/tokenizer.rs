//! Default sentence tokenizer

use corpora_domain::traits::SentenceTokenizer;

const DEFAULT_ABBREVIATIONS: &[&str] = &[
    "mr.", "mrs.", "dr.", "ms.", "st.", "e.g.", "i.e.", "etc.", "vs.",
];

/// Splits text at sentence-final punctuation
///
/// A boundary is a run of `.`, `!` or `?` followed by whitespace or the end of
/// the text. The punctuation stays with the sentence. Known abbreviations do
/// not end a sentence.
#[derive(Debug, Clone)]
pub struct PunctuationTokenizer {
    abbreviations: Vec<String>,
}

impl Default for PunctuationTokenizer {
    fn default() -> Self {
        Self {
            abbreviations: DEFAULT_ABBREVIATIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl PunctuationTokenizer {
    /// Create a tokenizer with the default abbreviation list
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an abbreviation (case-insensitive, including its final period)
    pub fn with_abbreviation(mut self, abbreviation: impl Into<String>) -> Self {
        self.abbreviations.push(abbreviation.into().to_lowercase());
        self
    }

    fn is_abbreviation(&self, segment: &str) -> bool {
        let word = segment
            .rsplit(char::is_whitespace)
            .next()
            .unwrap_or(segment)
            .to_lowercase();
        self.abbreviations.iter().any(|a| *a == word)
    }
}

fn is_terminal(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

impl SentenceTokenizer for PunctuationTokenizer {
    fn sent_tokenize(&self, text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut start = 0;
        let mut chars = text.char_indices().peekable();

        while let Some((_, c)) = chars.next() {
            if !is_terminal(c) {
                continue;
            }
            while let Some(&(_, next)) = chars.peek() {
                if is_terminal(next) {
                    chars.next();
                } else {
                    break;
                }
            }
            let end = chars.peek().map_or(text.len(), |&(i, _)| i);
            let at_boundary = chars.peek().map_or(true, |&(_, next)| next.is_whitespace());
            let segment = &text[start..end];

            if at_boundary && !self.is_abbreviation(segment) {
                let sentence = segment.trim();
                if !sentence.is_empty() {
                    sentences.push(sentence.to_string());
                }
                start = end;
            }
        }

        let rest = text[start..].trim();
        if !rest.is_empty() {
            sentences.push(rest.to_string());
        }
        sentences
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(text: &str) -> Vec<String> {
        PunctuationTokenizer::new().sent_tokenize(text)
    }

    #[test]
    fn test_splits_on_terminal_punctuation() {
        assert_eq!(
            split("Hello there. How are you? Fine!"),
            vec!["Hello there.", "How are you?", "Fine!"]
        );
    }

    #[test]
    fn test_keeps_punctuation_runs_together() {
        assert_eq!(split("What?! No..."), vec!["What?!", "No..."]);
    }

    #[test]
    fn test_no_split_inside_tokens() {
        assert_eq!(split("Version 2.5 is out."), vec!["Version 2.5 is out."]);
    }

    #[test]
    fn test_abbreviations() {
        assert_eq!(
            split("Dr. Smith met Mrs. Jones, e.g. at noon. Then left."),
            vec!["Dr. Smith met Mrs. Jones, e.g. at noon.", "Then left."]
        );
    }

    #[test]
    fn test_custom_abbreviation() {
        let tokenizer = PunctuationTokenizer::new().with_abbreviation("Prof.");
        assert_eq!(
            tokenizer.sent_tokenize("Prof. Lee spoke."),
            vec!["Prof. Lee spoke."]
        );
    }

    #[test]
    fn test_trailing_text_without_punctuation() {
        assert_eq!(split("  one. two  "), vec!["one.", "two"]);
        assert!(split("   ").is_empty());
    }
}
