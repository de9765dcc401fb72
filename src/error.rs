// src/error.rs

use std::fmt;

use thiserror::Error;

/// Pipeline stage an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Input,
    Fetch,
    Parse,
    Resolve,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Input => write!(f, "input"),
            Stage::Fetch => write!(f, "fetch"),
            Stage::Parse => write!(f, "parse"),
            Stage::Resolve => write!(f, "resolve"),
        }
    }
}

/// Hard failures of a single carrier lookup.
///
/// Absent fields and addresses that do not decompose are not errors; they
/// surface as empty strings on the record instead.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("carrier identifier missing")]
    MissingIdentifier,

    #[error("carrier identifier {0:?} contains no digits")]
    InvalidIdentifier(String),

    #[error("fetching {url} failed")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("no carrier snapshot found for {identifier}")]
    NotFound { identifier: String },
}

impl LookupError {
    pub fn stage(&self) -> Stage {
        match self {
            LookupError::MissingIdentifier | LookupError::InvalidIdentifier(_) => Stage::Input,
            LookupError::Fetch { .. } => Stage::Fetch,
            LookupError::NotFound { .. } => Stage::Parse,
        }
    }
}

/// The geocoding service produced nothing usable for an address.
#[derive(Error, Debug)]
pub enum Unresolved {
    #[error("no address to resolve")]
    EmptyInput,

    #[error("geocoder unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    #[error("geocoder returned no matches")]
    NoMatch,
}

impl Unresolved {
    pub fn stage(&self) -> Stage {
        Stage::Resolve
    }
}
