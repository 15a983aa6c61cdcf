use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TypeMismatch: wrong config file type. Expected '{expected}' got '{found}'")]
    TypeMismatch { expected: String, found: String },
    #[error("DuplicateField: '{field}' is already declared in {config}")]
    DuplicateField { config: String, field: String },
    #[error("UnknownField: unable to find configuration value '{field}' in {config}")]
    UnknownField { config: String, field: String },
    #[error("WrongType: '{field}' of {config} does not hold a {expected}")]
    WrongType {
        config: String,
        field: String,
        expected: String,
    },
    #[error("NotAnObject: json snapshot of {config} must be an object")]
    NotAnObject { config: String },
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn unknown_field(config: &str, field: &str) -> Self {
        Self::UnknownField {
            config: config.to_string(),
            field: field.to_string(),
        }
    }
}
