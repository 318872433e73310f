//! Integration tests for corpora-store
//!
//! These tests verify the write contract and compositional queries.

use corpora_domain::traits::CorpusStore;
use corpora_domain::{
    ExtractedSentence, FileRecord, MetaFilter, MetaIdentity, MetaProperty,
    MetaPropertyReference, MetaSummary, QueryFilter, Scalar, StoredValue,
};
use corpora_store::{SqliteStore, StoreError};
use std::collections::BTreeSet;

fn cats(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn record(path: &str, sentences: &[(&str, usize, &[&str])], subfolders: &[&str]) -> FileRecord {
    FileRecord {
        file_path: path.to_string(),
        sentences: sentences
            .iter()
            .map(|(text, group, c)| ExtractedSentence::new(*text, *group, cats(c)))
            .collect(),
        meta_refs: Vec::new(),
        subfolders: subfolders.iter().map(|s| s.to_string()).collect(),
    }
}

/// Two files in subfolder A, one in B; age and sex metadata on each
fn populated_store() -> SqliteStore {
    let mut store = SqliteStore::in_memory().unwrap();

    let mut a1 = record(
        "corpus/A/one.json",
        &[("Hello there.", 0, &["child"]), ("I am here.", 1, &["adult"])],
        &["A"],
    );
    a1.meta_refs = vec![
        MetaPropertyReference::new("corpus/A/one.json", "age", "age", Scalar::Int(3)),
        MetaPropertyReference::new("corpus/A/one.json", "speaker", "sex", "female"),
    ];

    let mut a2 = record(
        "corpus/A/two.json",
        &[("Look!", 0, &["child", "adult"])],
        &["A"],
    );
    a2.meta_refs = vec![
        MetaPropertyReference::new("corpus/A/two.json", "age", "age", Scalar::Int(5)),
        MetaPropertyReference::new("corpus/A/two.json", "speaker", "sex", "male"),
    ];

    let mut b1 = record("corpus/B/three.json", &[("Bye.", 0, &["child"])], &["B"]);
    b1.meta_refs = vec![
        MetaPropertyReference::new("corpus/B/three.json", "age", "age", Scalar::Float(4.5)),
        MetaPropertyReference::new("corpus/B/three.json", "speaker", "sex", "female"),
    ];

    for r in [&a1, &a2, &b1] {
        store.insert_file(r).unwrap();
    }
    store
}

fn texts(result: &corpora_domain::QueryResult) -> Vec<&str> {
    result.sentences.iter().map(|s| s.text.as_str()).collect()
}

#[test]
fn test_store_initialization() {
    let store = SqliteStore::in_memory();
    assert!(store.is_ok(), "Store should initialize successfully");
    assert_eq!(store.unwrap().sentence_count().unwrap(), 0);
}

#[test]
fn test_empty_query_returns_everything() {
    let store = populated_store();
    let result = store.query(&QueryFilter::all()).unwrap();
    assert_eq!(texts(&result), vec!["Hello there.", "I am here.", "Look!", "Bye."]);
    assert_eq!(result.meta_by_file.len(), 3);
}

#[test]
fn test_sentence_fields_round_trip() {
    let store = populated_store();
    let all = store.all_sentences(false).unwrap();
    let look = &all[2];
    assert_eq!(look.file_path, "corpus/A/two.json");
    assert_eq!(look.group_id, 0);
    assert_eq!(look.text_categories, cats(&["adult", "child"]));
    assert!(look.embedding.is_none());
}

#[test]
fn test_subfolder_and_category_intersect() {
    let store = populated_store();
    let filter = QueryFilter::all().in_subfolders(["A"]).with_categories(["child"]);
    let result = store.query(&filter).unwrap();
    assert_eq!(texts(&result), vec!["Hello there.", "Look!"]);
}

#[test]
fn test_multiple_categories_do_not_duplicate_sentences() {
    let store = populated_store();
    let filter = QueryFilter::all().with_categories(["child", "adult"]);
    let result = store.query(&filter).unwrap();
    assert_eq!(result.len(), 4);
}

#[test]
fn test_file_path_filter() {
    let store = populated_store();
    let filter = QueryFilter::all().in_files(["corpus/B/three.json"]);
    let result = store.query(&filter).unwrap();
    assert_eq!(texts(&result), vec!["Bye."]);
    assert_eq!(result.meta_by_file.keys().collect::<Vec<_>>(), vec!["corpus/B/three.json"]);
}

#[test]
fn test_meta_filters_are_anded() {
    let store = populated_store();

    let exact = QueryFilter::all().with_meta(MetaFilter::equals("speaker", "sex", "female"));
    assert_eq!(texts(&store.query(&exact).unwrap()), vec!["Hello there.", "I am here.", "Bye."]);

    let both = exact
        .clone()
        .with_meta(MetaFilter::range("age", "age", 4.0, 6.0));
    assert_eq!(texts(&store.query(&both).unwrap()), vec!["Bye."]);

    let any = QueryFilter::all().with_meta(MetaFilter::any_of("speaker", "sex", ["male", "other"]));
    assert_eq!(texts(&store.query(&any).unwrap()), vec!["Look!"]);
}

fn store_with_values(property: &str, values: &[&str]) -> SqliteStore {
    let mut store = SqliteStore::in_memory().unwrap();
    for (i, value) in values.iter().enumerate() {
        let path = format!("f{}", i);
        let mut r = record(&path, &[("Said.", 0, &["child"])], &[]);
        r.meta_refs = vec![MetaPropertyReference::new(&path, property, property, *value)];
        store.insert_file(&r).unwrap();
    }
    store
}

fn matched_files(store: &SqliteStore, filter: MetaFilter) -> Vec<String> {
    store
        .query(&QueryFilter::all().with_meta(filter))
        .unwrap()
        .sentences
        .into_iter()
        .map(|s| s.file_path)
        .collect()
}

#[test]
fn test_range_filter_skips_non_numeric_values() {
    let store = store_with_values("m", &["1", "2", "3", "4", "5", "unknown"]);

    assert!(matched_files(&store, MetaFilter::range("m", "m", 0.0, 0.5)).is_empty());
    assert_eq!(
        matched_files(&store, MetaFilter::range("m", "m", -10.0, 10.0)),
        vec!["f0", "f1", "f2", "f3", "f4"]
    );
}

#[test]
fn test_range_filter_on_dates_uses_day_numbers() {
    let store = store_with_values("born", &["2020-01-01", "2020-06-01", "2021-01-01"]);

    let first = corpora_store::quantity("2020-01-01").unwrap();
    let last = corpora_store::quantity("2021-01-01").unwrap();
    assert_eq!(
        matched_files(&store, MetaFilter::range("born", "born", first, last)),
        vec!["f0", "f1", "f2"]
    );
    assert_eq!(
        matched_files(&store, MetaFilter::range("born", "born", first, first + 200.0)),
        vec!["f0", "f1"]
    );
    assert!(matched_files(&store, MetaFilter::range("born", "born", 2020.0, 2021.0)).is_empty());
}

#[test]
fn test_unknown_meta_property_returns_nothing() {
    let store = populated_store();
    let filter = QueryFilter::all().with_meta(MetaFilter::equals("speaker", "height", "tall"));
    let result = store.query(&filter).unwrap();
    assert!(result.is_empty());
    assert!(result.meta_by_file.is_empty());
}

#[test]
fn test_identical_meta_reference_is_a_no_op() {
    let mut store = SqliteStore::in_memory().unwrap();
    let mut r = record("f.json", &[], &[]);
    r.meta_refs = vec![
        MetaPropertyReference::new("f.json", "lang", "lang", "eng"),
        MetaPropertyReference::new("f.json", "lang", "lang", "eng"),
    ];
    store.insert_file(&r).unwrap();

    let sets = store.meta_value_sets().unwrap();
    assert_eq!(
        sets.get(&MetaIdentity::new("lang", "lang")),
        Some(&vec![StoredValue::Text("eng".to_string())])
    );
}

#[test]
fn test_conflicting_meta_value_rolls_back_the_file() {
    let mut store = SqliteStore::in_memory().unwrap();
    let mut r = record("f.json", &[("Kept out.", 0, &["t"])], &["A"]);
    r.meta_refs = vec![
        MetaPropertyReference::new("f.json", "lang", "lang", "eng"),
        MetaPropertyReference::new("f.json", "lang", "lang", "fra"),
    ];

    let result = store.insert_file(&r);
    assert!(matches!(result, Err(StoreError::ConflictingMetaValue { .. })));
    assert_eq!(store.sentence_count().unwrap(), 0);
    assert!(store.meta_value_sets().unwrap().is_empty());
}

#[test]
fn test_group_ordinals_beyond_u32_round_trip() {
    let mut store = SqliteStore::in_memory().unwrap();
    let group = u32::MAX as usize + 1;
    store
        .insert_file(&record("big.json", &[("Late.", group, &["child"])], &[]))
        .unwrap();
    assert_eq!(store.all_sentences(false).unwrap()[0].group_id, group);
}

#[test]
fn test_tiers_are_stored_per_sentence() {
    let mut store = SqliteStore::in_memory().unwrap();
    let r = FileRecord {
        file_path: "t.cha".to_string(),
        sentences: vec![ExtractedSentence::new("more cookie .", 0, cats(&["CHI"]))
            .with_tier("%mor", "qn|more n|cookie .")],
        meta_refs: Vec::new(),
        subfolders: Vec::new(),
    };
    store.insert_file(&r).unwrap();

    let all = store.all_sentences(false).unwrap();
    assert_eq!(all[0].tiers.get("%mor").map(String::as_str), Some("qn|more n|cookie ."));
}

#[test]
fn test_replace_embeddings_in_row_order() {
    let mut store = populated_store();
    let vectors = vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![0.5, 0.5], vec![-1.0, 0.0]];
    store.replace_embeddings(&vectors).unwrap();

    let all = store.all_sentences(true).unwrap();
    let stored: Vec<Vec<f32>> = all.into_iter().map(|s| s.embedding.unwrap()).collect();
    assert_eq!(stored, vectors);

    let queried = store
        .query(&QueryFilter::all().in_files(["corpus/B/three.json"]).with_embeddings())
        .unwrap();
    assert_eq!(queried.sentences[0].embedding, Some(vec![-1.0, 0.0]));
}

#[test]
fn test_replace_embeddings_requires_matching_count() {
    let mut store = populated_store();
    let result = store.replace_embeddings(&[vec![1.0]]);
    assert!(matches!(
        result,
        Err(StoreError::EmbeddingCountMismatch { expected: 4, actual: 1 })
    ));
}

#[test]
fn test_replace_embeddings_requires_uniform_dimension() {
    let mut store = populated_store();
    let vectors = vec![vec![1.0], vec![1.0], vec![1.0, 2.0], vec![1.0]];
    assert!(matches!(store.replace_embeddings(&vectors), Err(StoreError::InvalidData(_))));
}

#[test]
fn test_sentence_texts_in_insertion_order() {
    let store = populated_store();
    assert_eq!(
        store.all_sentence_texts().unwrap(),
        vec!["Hello there.", "I am here.", "Look!", "Bye."]
    );
}

#[test]
fn test_meta_property_classification_last_write_wins() {
    let mut store = SqliteStore::in_memory().unwrap();
    let identity = MetaIdentity::new("age", "age");

    store
        .save_meta_property(&MetaProperty {
            identity: identity.clone(),
            summary: MetaSummary::Categorical(cats(&["3", "x"])),
        })
        .unwrap();
    store
        .save_meta_property(&MetaProperty {
            identity: identity.clone(),
            summary: MetaSummary::Quantitative { min: 3.0, max: 6.0 },
        })
        .unwrap();

    let properties = store.meta_properties().unwrap();
    assert_eq!(properties.len(), 1);
    assert_eq!(properties[0].identity, identity);
    assert_eq!(properties[0].summary, MetaSummary::Quantitative { min: 3.0, max: 6.0 });
}

#[test]
fn test_recreate_discards_previous_contents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corpus.db");

    {
        let mut store = SqliteStore::new(&path).unwrap();
        store.insert_file(&record("a.json", &[("One.", 0, &["t"])], &[])).unwrap();
        assert_eq!(store.sentence_count().unwrap(), 1);
    }

    let reopened = SqliteStore::new(&path).unwrap();
    assert_eq!(reopened.sentence_count().unwrap(), 1);
    drop(reopened);

    let fresh = SqliteStore::recreate(&path).unwrap();
    assert_eq!(fresh.sentence_count().unwrap(), 0);
}
