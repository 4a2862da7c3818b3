pub mod act;
pub mod list;
pub mod view;

use crate::config::Config;
use crate::source::{JsonFileSource, SourceError};
use anyhow::Result;
use colored::Colorize;

/// Open the request source described by `config`.
pub fn open_source(config: &Config) -> Result<JsonFileSource> {
    let path = config.data_path()?;
    tracing::debug!(path = %path.display(), "using request store");
    Ok(JsonFileSource::new(path).with_page_size(config.page_size))
}

/// Wrap a source error for `main`'s error printer, printing its hint first.
pub fn source_error(err: SourceError, what: String) -> anyhow::Error {
    if let Some(hint) = err.hint() {
        eprintln!("  {} {}", "hint:".yellow(), hint);
    }
    anyhow::Error::new(err).context(what)
}
