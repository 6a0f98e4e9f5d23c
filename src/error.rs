//! Fatal build errors.
//!
//! These travel inside `anyhow::Error` through the pipeline; callers that
//! need to tell them apart use `downcast_ref::<BuildError>()`.

use std::io;
use std::path::PathBuf;

use crate::content::FrontMatterError;

#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    #[error("{}: invalid front matter: {source}", path.display())]
    Validation {
        path: PathBuf,
        #[source]
        source: FrontMatterError,
    },

    #[error("url conflict: {url} is produced by both {first} and {second}")]
    UrlConflict {
        url: String,
        first: String,
        second: String,
    },

    #[error("no layout found for {kind} (tried {})", candidates.join(", "))]
    LayoutMissing {
        kind: String,
        candidates: Vec<String>,
    },

    #[error("failed to write search index to {}: {source}", path.display())]
    SearchIndexWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
