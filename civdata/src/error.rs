use crate::category::Category;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures while reading and composing rulesets.
///
/// Only [`Error::PackageIo`] and [`Error::UnknownRuleset`] ever leave a load
/// call. The other variants describe problems the loader absorbs: they are
/// logged and the offending category or object is dropped.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Cannot read package at {path}: {source}")]
    PackageIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Malformed {category}: {source}")]
    CategoryParse {
        category: Category,
        #[source]
        source: serde_json::Error,
    },
    #[error("{category} entry #{index} is missing a name")]
    ObjectNaming { category: Category, index: usize },
    #[error("Unknown ruleset: {0}")]
    UnknownRuleset(String),
}

pub type Result<T> = std::result::Result<T, Error>;
