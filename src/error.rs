use std::fmt;
use thiserror::Error;

/// Which input string failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grammar {
    Cigar,
    Md,
    Seq,
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grammar::Cigar => write!(f, "CIGAR"),
            Grammar::Md => write!(f, "MD:Z"),
            Grammar::Seq => write!(f, "SEQ"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Malformed {grammar} string {input:?}: {message}")]
    Parse {
        grammar: Grammar,
        input: String,
        message: String,
    },
    #[error("Missing precondition: {0}")]
    Precondition(String),
    #[error("Reference and read lengths differ: reference {reference}, read {read}")]
    LengthMismatch { reference: usize, read: usize },
}

impl Error {
    pub(crate) fn parse(grammar: Grammar, input: &str, message: impl Into<String>) -> Self {
        Error::Parse {
            grammar,
            input: input.to_string(),
            message: message.into(),
        }
    }

    /// Short name used when summarising failures per kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Parse { .. } => "ParseError",
            Error::Precondition(_) => "PreconditionError",
            Error::LengthMismatch { .. } => "LengthMismatchError",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
