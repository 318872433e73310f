//! Corpus-wide type inference over metadata values
//!
//! Values are stored as untyped text during ingestion. Once every file is
//! written, each (label, property) identity is classified from its full set
//! of distinct values: more than three quarters quantitative tokens makes it
//! quantitative, anything else categorical.

use crate::error::{IngestError, InferenceError};
use corpora_domain::traits::CorpusStore;
use corpora_domain::{Label, MetaIdentity, MetaProperty, MetaSummary, StoredValue};
use std::collections::BTreeSet;
use std::fmt::Display;
use tracing::{debug, info, warn};

pub use corpora_store::quantity;

/// Share of quantitative tokens a property must exceed to be quantitative
pub const QUANTITATIVE_THRESHOLD: f64 = 0.75;

fn as_text(value: &StoredValue) -> Result<String, InferenceError> {
    match value {
        StoredValue::Text(s) => Ok(s.clone()),
        StoredValue::Integer(i) => Ok(i.to_string()),
        StoredValue::Real(x) => Ok(x.to_string()),
        StoredValue::Null => Err(InferenceError::IncompatibleValue("NULL".to_string())),
        StoredValue::Blob(bytes) => Err(InferenceError::IncompatibleValue(format!(
            "{}-byte blob",
            bytes.len()
        ))),
    }
}

/// Classify one identity from its distinct values
pub fn classify(values: &[StoredValue]) -> Result<MetaSummary, InferenceError> {
    if values.is_empty() {
        return Err(InferenceError::Empty);
    }

    let texts = values.iter().map(as_text).collect::<Result<Vec<_>, _>>()?;
    let quantities: Vec<f64> = texts.iter().filter_map(|t| quantity(t)).collect();

    if quantities.len() as f64 / texts.len() as f64 > QUANTITATIVE_THRESHOLD {
        let min = quantities.iter().copied().fold(f64::INFINITY, f64::min);
        let max = quantities.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Ok(MetaSummary::Quantitative { min, max })
    } else {
        Ok(MetaSummary::Categorical(texts.into_iter().collect::<BTreeSet<_>>()))
    }
}

/// Outcome of one inference pass
#[derive(Debug, Clone, Default)]
pub struct InferenceOutcome {
    /// Properties classified and persisted
    pub classified: Vec<MetaProperty>,

    /// Identities whose values could not be classified
    pub failures: Vec<(MetaIdentity, InferenceError)>,
}

/// Classify every meta identity in the store and persist the results
///
/// A failure on one identity is recorded and the pass moves on. Labels with a
/// declared kind are checked against the inferred one; the inferred kind is
/// kept.
pub fn run_inference<S>(store: &mut S, labels: &[Label]) -> Result<InferenceOutcome, IngestError>
where
    S: CorpusStore,
    S::Error: Display,
{
    let value_sets = store
        .meta_value_sets()
        .map_err(|e| IngestError::Store(e.to_string()))?;

    info!("Classifying {} meta properties", value_sets.len());

    let mut outcome = InferenceOutcome::default();
    for (identity, values) in value_sets {
        let summary = match classify(&values) {
            Ok(summary) => summary,
            Err(e) => {
                warn!(
                    "Could not classify {}/{}: {}",
                    identity.label_name, identity.property_name, e
                );
                outcome.failures.push((identity, e));
                continue;
            }
        };

        let property = MetaProperty { identity, summary };
        let declared = labels
            .iter()
            .find(|l| l.name == property.identity.label_name)
            .and_then(|l| l.declared_kind);
        if let Some(declared) = declared.filter(|k| *k != property.kind()) {
            warn!(
                "Meta property {}/{} declared {} but inferred {}; keeping {}",
                property.identity.label_name,
                property.identity.property_name,
                declared.as_str(),
                property.kind().as_str(),
                property.kind().as_str()
            );
        }

        debug!(
            "Classified {}/{} as {}",
            property.identity.label_name,
            property.identity.property_name,
            property.kind().as_str()
        );
        store
            .save_meta_property(&property)
            .map_err(|e| IngestError::Store(e.to_string()))?;
        outcome.classified.push(property);
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate};

    fn texts(values: &[&str]) -> Vec<StoredValue> {
        values.iter().map(|v| StoredValue::Text(v.to_string())).collect()
    }

    #[test]
    fn test_all_numeric_is_quantitative() {
        let summary = classify(&texts(&["3", "4", "5", "6"])).unwrap();
        assert_eq!(summary, MetaSummary::Quantitative { min: 3.0, max: 6.0 });
    }

    #[test]
    fn test_two_thirds_numeric_is_categorical() {
        let summary = classify(&texts(&["3", "4", "cat"])).unwrap();
        let expected: BTreeSet<String> =
            ["3", "4", "cat"].iter().map(|s| s.to_string()).collect();
        assert_eq!(summary, MetaSummary::Categorical(expected));
    }

    #[test]
    fn test_exactly_three_quarters_is_categorical() {
        let summary = classify(&texts(&["1", "2", "3", "x"])).unwrap();
        assert!(matches!(summary, MetaSummary::Categorical(_)));
    }

    #[test]
    fn test_quantitative_range_ignores_non_numeric_values() {
        let summary = classify(&texts(&["1", "2", "3", "4", "9.5", "n/a"])).unwrap();
        assert_eq!(summary, MetaSummary::Quantitative { min: 1.0, max: 9.5 });
    }

    #[test]
    fn test_dates_are_quantitative() {
        let summary = classify(&texts(&["2020-01-01", "2020/01/03", "02.01.2020"])).unwrap();
        let day = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().num_days_from_ce() as f64;
        assert_eq!(summary, MetaSummary::Quantitative { min: day, max: day + 2.0 });
    }

    #[test]
    fn test_datetime_token() {
        assert!(quantity("2021-06-01T12:30:00").is_some());
        assert_eq!(quantity("NaN"), None);
        assert_eq!(quantity("inf"), None);
    }

    #[test]
    fn test_null_is_incompatible() {
        let mut values = texts(&["1"]);
        values.push(StoredValue::Null);
        let err = classify(&values).unwrap_err();
        assert_eq!(err.to_string(), "Incompatible meta property value: NULL");
    }

    #[test]
    fn test_empty_value_set() {
        assert_eq!(classify(&[]), Err(InferenceError::Empty));
    }
}
