//! Resource loading errors.

use std::path::PathBuf;

use bg_core::CoreError;
use thiserror::Error;

pub type ResourceResult<T> = Result<T, ResourceError>;

/// Errors returned by [`ResourceCache`](crate::ResourceCache) lookups.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// No loader was registered for the requested type.
    #[error("Type {type_name} has no registered resource loader")]
    UnregisteredType { type_name: &'static str },

    /// The resource could not be read, parsed or built.
    #[error("While loading {type_name} '{id}': {source}")]
    Load {
        type_name: &'static str,
        id: String,
        #[source]
        source: LoadError,
    },

    #[error("Failed to read asset config {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },
}

impl ResourceError {
    /// The resource id involved, if this error concerns a single resource.
    pub fn id(&self) -> Option<&str> {
        match self {
            ResourceError::Load { id, .. } => Some(id),
            _ => None,
        }
    }
}

/// Underlying cause of a [`ResourceError::Load`].
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("invalid resource id: {reason}")]
    InvalidId { reason: &'static str },

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed resource file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value: {0}")]
    Value(#[from] CoreError),

    #[error("{what}")]
    Invalid { what: String },

    /// A dependency loaded through the cache failed.
    #[error("dependency failed: {0}")]
    Dependency(Box<ResourceError>),

    #[error("loader produced a value of the wrong type")]
    TypeMismatch,
}

impl From<ResourceError> for LoadError {
    fn from(err: ResourceError) -> Self {
        LoadError::Dependency(Box::new(err))
    }
}
