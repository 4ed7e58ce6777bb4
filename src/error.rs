//! Error types for tavle operations.

use thiserror::Error;

/// Errors that can occur during markup conversion or normalization.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("normalization did not converge after {rounds} rounds ({mutations} mutations applied)")]
    NormalizeDiverged { rounds: usize, mutations: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
