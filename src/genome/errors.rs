use crate::config::ConfigError;
use crate::models::{BoundsError, WeightsError};
use std::path::PathBuf;

/// Problems found while declaring the fields of a genome
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("DuplicateField: '{field}' is declared twice in {type_name}")]
    DuplicateField {
        type_name: &'static str,
        field: String,
    },
    #[error("DuplicateAlias: alias '{alias}' of '{field}' is already used in {type_name}")]
    DuplicateAlias {
        type_name: &'static str,
        field: String,
        alias: String,
    },
    #[error("NoField: alias '{alias}' given before any field of {type_name}")]
    NoField {
        type_name: &'static str,
        alias: String,
    },
    #[error("MissingClosure: no {closure} function provided for field '{field}' of {type_name}")]
    MissingClosure {
        type_name: &'static str,
        field: String,
        closure: &'static str,
    },
    #[error("SchemaError: {0}")]
    Bounds(#[from] BoundsError),
    #[error("SchemaError: {0}")]
    Config(#[from] ConfigError),
    #[error("SchemaError: {0}")]
    Weights(#[from] WeightsError),
}

#[derive(Debug, thiserror::Error)]
pub enum GenomeError {
    #[error("NoMutationRates: {type_name} has no field with a positive mutation rate")]
    NoMutationRates { type_name: &'static str },
    #[error("UnknownField: {type_name} has no field named '{field}'")]
    UnknownField {
        type_name: &'static str,
        field: String,
    },
    #[error("NotAnObject: json for {type_name} must be an object")]
    NotAnObject { type_name: &'static str },
    #[error(
        "JsonMismatch: json for {type_name} does not match its fields. missing={missing:?}, unexpected={unexpected:?}, invalid={invalid:?}"
    )]
    JsonMismatch {
        type_name: &'static str,
        missing: Vec<String>,
        unexpected: Vec<String>,
        invalid: Vec<String>,
    },
    #[error("NotEnoughInstances: aggregating {type_name} requires at least 2 instances, got {count}")]
    NotEnoughInstances { type_name: &'static str, count: usize },
    #[error("Json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenomeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failure to follow a `field[index].subfield` path
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("UnknownField: {type_name} has no field '{field}' (in '{path}')")]
    UnknownField {
        type_name: String,
        field: String,
        path: String,
    },
    #[error("IndexOutOfBounds: index {index} is out of bounds for {type_name} of length {len} (in '{path}')")]
    IndexOutOfBounds {
        type_name: String,
        index: usize,
        len: usize,
        path: String,
    },
    #[error("InvalidPath: unable to follow '{remainder}' into {type_name} (in '{path}')")]
    InvalidPath {
        type_name: String,
        remainder: String,
        path: String,
    },
}

impl ExtractError {
    pub(crate) fn invalid_path(type_name: impl Into<String>, remainder: &str, path: &str) -> Self {
        Self::InvalidPath {
            type_name: type_name.into(),
            remainder: remainder.to_string(),
            path: path.to_string(),
        }
    }
}
