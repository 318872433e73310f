//! Query command implementation.

use crate::cli::QueryArgs;
use crate::commands::open_store;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use corpora_domain::traits::CorpusStore;
use corpora_domain::QueryFilter;

/// Build a store filter from command arguments.
pub fn build_filter(args: QueryArgs) -> QueryFilter {
    let mut filter = QueryFilter::all()
        .in_subfolders(args.subfolders)
        .in_files(args.files)
        .with_categories(args.categories);

    for meta in args.meta {
        filter = filter.with_meta(meta);
    }

    if args.embeddings {
        filter = filter.with_embeddings();
    }

    filter
}

/// Execute the query command.
pub async fn execute_query(args: QueryArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let store = open_store(config)?;
    let result = store.query(&build_filter(args))?;

    println!("{}", formatter.format_query(&result)?);

    Ok(())
}
