//! Command tests against a project in a temporary directory

use corpora_cli::cli::{IngestArgs, QueryArgs};
use corpora_cli::commands::{self, open_store};
use corpora_cli::{CliError, Config, Formatter, OutputFormat};
use corpora_domain::traits::CorpusStore;
use corpora_domain::MetaFilter;
use std::fs;
use std::path::Path;

const PROJECT: &str = r#"
[corpus]
corpus_path = "corpus"
database = "corpus.db"
embedding_dimension = 4

[[corpus.labels]]
name = "child"
match_key = "child"
category = "text"
file_type = "json"

[[corpus.labels]]
name = "age"
match_key = "age"
category = "meta"
file_type = "json"
"#;

fn project(root: &Path) -> Config {
    fs::create_dir_all(root.join("corpus")).unwrap();
    fs::write(root.join("corpus/a.json"), r#"{"age": 2, "child": "Up. Down."}"#).unwrap();
    fs::write(root.join("corpus/b.json"), r#"{"age": 5, "child": "Again!"}"#).unwrap();
    let path = root.join("corpora.toml");
    fs::write(&path, PROJECT).unwrap();
    Config::load(&path).unwrap()
}

fn quiet() -> Formatter {
    Formatter::new(OutputFormat::Quiet, false)
}

#[tokio::test]
async fn test_ingest_then_embed() {
    let dir = tempfile::tempdir().unwrap();
    let config = project(dir.path());

    commands::execute_ingest(IngestArgs { embed: false }, &config, OutputFormat::Quiet, &quiet())
        .await
        .unwrap();
    let store = open_store(&config).unwrap();
    assert_eq!(store.sentence_count().unwrap(), 3);
    assert!(store.all_sentences(true).unwrap()[0].embedding.is_none());
    assert_eq!(store.meta_properties().unwrap().len(), 1);

    commands::execute_embed(&config, &quiet()).await.unwrap();
    let sentences = open_store(&config).unwrap().all_sentences(true).unwrap();
    assert!(sentences
        .iter()
        .all(|s| s.embedding.as_ref().map(Vec::len) == Some(4)));
}

#[tokio::test]
async fn test_query_after_ingest() {
    let dir = tempfile::tempdir().unwrap();
    let config = project(dir.path());
    commands::execute_ingest(IngestArgs { embed: true }, &config, OutputFormat::Quiet, &quiet())
        .await
        .unwrap();

    let args = QueryArgs {
        subfolders: vec![],
        files: vec![],
        categories: vec!["child".to_string()],
        meta: vec![MetaFilter::range("age", "age", 4.0, 6.0)],
        embeddings: false,
    };
    let filter = commands::query::build_filter(args);
    let result = open_store(&config).unwrap().query(&filter).unwrap();
    assert_eq!(result.sentences.len(), 1);
    assert_eq!(result.sentences[0].text, "Again!");
}

#[tokio::test]
async fn test_commands_require_ingestion() {
    let dir = tempfile::tempdir().unwrap();
    let config = project(dir.path());

    let result = commands::execute_properties(&config, &quiet()).await;
    assert!(matches!(result, Err(CliError::NotIngested(_))));
    assert!(!config.corpus.database.exists());
}
