//! Error types for segsieve

use std::collections::TryReserveError;
use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("segment {index} would push strike offsets past 2^48")]
    RangeOverflow { index: u64 },

    #[error("input {0} exceeds 2^64 - 1")]
    InputOverflow(String),

    #[error("allocation failed: {0}")]
    Allocation(#[from] TryReserveError),

    #[error("segment 0 has not been sieved yet")]
    NotStarted,

    #[error("expected segment {expected}, got {requested}")]
    OutOfOrder { expected: u64, requested: u64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Coarse failure category, used when reporting a terminal diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    RangeOverflow,
    AllocationFailure,
    Misuse,
    Config,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::RangeOverflow { .. } | Error::InputOverflow(_) => ErrorKind::RangeOverflow,
            Error::Allocation(_) => ErrorKind::AllocationFailure,
            Error::NotStarted | Error::OutOfOrder { .. } => ErrorKind::Misuse,
            Error::InvalidConfig(_) => ErrorKind::Config,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::RangeOverflow => "RangeOverflow",
            ErrorKind::AllocationFailure => "AllocationFailure",
            ErrorKind::Misuse => "Misuse",
            ErrorKind::Config => "Config",
        };
        f.write_str(name)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
