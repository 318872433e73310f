//! Properties command implementation.

use crate::commands::open_store;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use corpora_domain::traits::CorpusStore;

/// Execute the properties command.
pub async fn execute_properties(config: &Config, formatter: &Formatter) -> Result<()> {
    let store = open_store(config)?;
    let properties = store.meta_properties()?;

    println!("{}", formatter.format_properties(&properties)?);

    Ok(())
}
