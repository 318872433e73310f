//! Ingest command implementation.

use crate::cli::IngestArgs;
use crate::config::{Config, OutputFormat};
use crate::error::Result;
use crate::output::Formatter;
use corpora_ingest::{spawn_ingestion, IngestionContext, ProgressEvent};
use std::io::Write;
use tracing::info;

/// Execute the ingest command.
pub async fn execute_ingest(
    args: IngestArgs,
    config: &Config,
    format: OutputFormat,
    formatter: &Formatter,
) -> Result<()> {
    let mut corpus = config.corpus.clone();
    if args.embed {
        corpus.add_embeddings = true;
    }

    info!(
        "Ingesting {} into {}",
        corpus.corpus_path.display(),
        corpus.database.display()
    );
    let mut handle = spawn_ingestion(IngestionContext::new(corpus));

    // Progress goes to stderr so that JSON output stays parseable
    let show_progress = format == OutputFormat::Table;
    let mut task = String::new();
    let (mut done, mut total) = (0usize, 0usize);
    while let Some(event) = handle.progress.recv().await {
        match event {
            ProgressEvent::Task { message, total: steps } => {
                if show_progress && !task.is_empty() {
                    eprintln!();
                }
                task = message;
                done = 0;
                total = steps;
            }
            ProgressEvent::Increment => done += 1,
        }
        if show_progress {
            eprint!("\r{} {}/{}", task, done, total);
            std::io::stderr().flush()?;
        }
    }
    if show_progress && !task.is_empty() {
        eprintln!();
    }

    let report = handle.wait().await?;
    println!("{}", formatter.format_report(&report)?);

    Ok(())
}
