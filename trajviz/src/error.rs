use std::path::PathBuf;

use plotters::drawing::DrawingAreaErrorKind;
use polars::prelude::PolarsError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read csv: {0}")]
    Csv(#[from] PolarsError),

    #[error("column `{column}` row {row}: `{value}` is not a number")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },

    #[error("column `{column}` has {found} rows, expected {expected}")]
    Ragged {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("entity `{entity}` has no `{column}` column")]
    MissingComponent { entity: String, column: String },

    #[error("plotting failed: {0}")]
    Plot(String),

    #[error("window error: {0}")]
    Window(#[from] minifb::Error),

    #[error("invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl<E> From<DrawingAreaErrorKind<E>> for Error
where
    E: std::error::Error + Send + Sync,
{
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        Error::Plot(err.to_string())
    }
}
