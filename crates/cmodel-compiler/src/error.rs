use std::sync::Arc;

use cmodel_core::CompileError;

/// Failure while building a schema. The first one recorded is kept.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("parse error: {message}")]
    Parse { message: String },

    #[error("parse error at line {line}: {message}")]
    ParseAt { line: u32, message: String },

    #[error("content model of `{element}` could not be compiled")]
    Compile {
        element: String,
        #[source]
        source: CompileError,
    },

    #[error("content model of `{element}` is incomplete")]
    UninitializedModel { element: String },
}

/// Errors returned by queries on a `Schema`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SchemaError {
    /// The build recorded an error; every query reports the same one.
    #[error("schema build failed: {0}")]
    Poisoned(#[source] Arc<BuildError>),
}

impl SchemaError {
    /// The build error behind this failure.
    pub fn build_error(&self) -> &BuildError {
        match self {
            Self::Poisoned(error) => error,
        }
    }
}

pub type Result<T> = std::result::Result<T, SchemaError>;
