//! Command implementations.

pub mod embed;
pub mod ingest;
pub mod properties;
pub mod query;
pub mod sentences;

pub use self::embed::execute_embed;
pub use self::ingest::execute_ingest;
pub use self::properties::execute_properties;
pub use self::query::execute_query;
pub use self::sentences::execute_sentences;

use crate::config::Config;
use crate::error::{CliError, Result};
use corpora_store::SqliteStore;
use tracing::debug;

/// Open the database an earlier `ingest` produced.
pub fn open_store(config: &Config) -> Result<SqliteStore> {
    let database = &config.corpus.database;
    if !database.exists() {
        return Err(CliError::NotIngested(database.display().to_string()));
    }
    debug!("Opening corpus database {}", database.display());
    Ok(SqliteStore::new(database)?)
}
