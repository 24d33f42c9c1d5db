//! Error types for the loading stage.
//!
//! Parse failures on individual values are recovered as nulls and counted in
//! the load report; only a malformed file or a missing required column can
//! fail the load as a whole.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be opened or read as CSV.
    #[error("invalid CSV input: {0}")]
    Csv(#[from] csv::Error),

    /// A column the cleaning pipeline cannot run without is absent.
    #[error("required column '{0}' is missing from the input")]
    MissingColumn(&'static str),
}
