//! Error type shared by the catalog, resolver and recipe store

use std::path::PathBuf;

/// Errors raised while loading recipes or resolving a production chain.
#[derive(Debug, thiserror::Error)]
pub enum CalcError {
    /// A non-raw item has no recipe in the catalog.
    #[error("item '{item}' does not exist in the recipe list; check the recipe source")]
    UnknownItem { item: String },

    /// The recipe source is malformed.
    #[error("bad recipe data in {origin}: {detail}")]
    DataSource { origin: String, detail: String },

    /// Resolution re-entered an item already on the active path.
    #[error("cyclic recipe dependency: {}", chain.join(" -> "))]
    CyclicDependency { chain: Vec<String> },

    /// Speed factors scale cycle duration and must be strictly positive.
    #[error("speed factor must be positive and finite, got {speed}")]
    InvalidSpeed { speed: f64 },

    #[error("throughput must be non-negative and finite, got {throughput}")]
    InvalidThroughput { throughput: f64 },

    #[error(transparent)]
    Database(#[from] rusqlite::Error),

    #[error(transparent)]
    Pattern(#[from] regex::Error),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl CalcError {
    pub(crate) fn data_source(origin: impl Into<String>, detail: impl Into<String>) -> Self {
        CalcError::DataSource {
            origin: origin.into(),
            detail: detail.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CalcError>;
