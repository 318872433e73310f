//! Sentences command implementation.

use crate::cli::SentencesArgs;
use crate::commands::open_store;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use corpora_domain::traits::CorpusStore;

/// Execute the sentences command.
pub async fn execute_sentences(
    args: SentencesArgs,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    let store = open_store(config)?;

    let output = if args.texts_only {
        formatter.format_texts(&store.all_sentence_texts()?)?
    } else {
        formatter.format_sentences(&store.all_sentences(false)?)?
    };
    println!("{}", output);

    Ok(())
}
