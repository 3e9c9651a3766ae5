//! Error handling for the navigation engine
//!
//! The frame tick itself never fails: collaborator failures are logged and
//! the previous known-good state is kept. `EngineError` covers the paths that
//! do report to callers (configuration, drag session requests, collaborators).

use crate::persistence::{PersistenceError, PrimId};
use crate::tiles::FetchError;
use std::error::Error as StdError;
use std::fmt;

/// Main error type for the engine
#[derive(Debug)]
pub enum EngineError {
    // Gesture arbitration
    InputOwned {
        owner: String,
    },
    SessionActive {
        target: PrimId,
    },

    // Scene and store lookups
    NotFound {
        kind: &'static str,
        id: i64,
    },

    // Collaborators
    TileFetch(FetchError),
    Persistence(PersistenceError),

    // Configuration
    ConfigRead {
        path: String,
        error: String,
    },
    ConfigParse {
        error: String,
    },
    InvalidConfig {
        field: String,
        value: String,
        reason: String,
    },

    Serialization {
        error: String,
    },

    /// Another error with a note on what was being attempted
    Context {
        context: String,
        source: Box<EngineError>,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InputOwned { owner } => {
                write!(f, "Pointer input is held by {}", owner)
            }
            EngineError::SessionActive { target } => {
                write!(f, "A drag session is already active on prim {}", target)
            }
            EngineError::NotFound { kind, id } => write!(f, "No {} with id {}", kind, id),
            EngineError::TileFetch(err) => write!(f, "Tile fetch failed: {}", err),
            EngineError::Persistence(err) => write!(f, "Persistence failed: {}", err),
            EngineError::ConfigRead { path, error } => {
                write!(f, "Cannot read config {}: {}", path, error)
            }
            EngineError::ConfigParse { error } => write!(f, "Malformed config: {}", error),
            EngineError::InvalidConfig {
                field,
                value,
                reason,
            } => write!(f, "Invalid config {} = {}: {}", field, value, reason),
            EngineError::Serialization { error } => write!(f, "Serialization failed: {}", error),
            EngineError::Context { context, source } => write!(f, "{}: {}", context, source),
        }
    }
}

impl StdError for EngineError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            EngineError::TileFetch(err) => Some(err),
            EngineError::Persistence(err) => Some(err),
            EngineError::Context { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

impl From<serde_json::Error> for EngineError {
    fn from(error: serde_json::Error) -> Self {
        EngineError::Serialization {
            error: error.to_string(),
        }
    }
}

impl From<toml::de::Error> for EngineError {
    fn from(error: toml::de::Error) -> Self {
        EngineError::ConfigParse {
            error: error.to_string(),
        }
    }
}

impl From<PersistenceError> for EngineError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::PrimNotFound(id) => EngineError::NotFound { kind: "prim", id },
            PersistenceError::RegionNotFound(id) => EngineError::NotFound { kind: "region", id },
            other => EngineError::Persistence(other),
        }
    }
}

impl From<FetchError> for EngineError {
    fn from(err: FetchError) -> Self {
        EngineError::TileFetch(err)
    }
}

/// `Option` to `EngineResult` with a lazily built error
pub trait OptionExt<T> {
    fn ok_or_engine<F>(self, f: F) -> EngineResult<T>
    where
        F: FnOnce() -> EngineError;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_engine<F>(self, f: F) -> EngineResult<T>
    where
        F: FnOnce() -> EngineError,
    {
        self.ok_or_else(f)
    }
}

/// Attach what was being attempted, keeping the original error as the source
pub trait ErrorContext<T> {
    fn context(self, what: &str) -> EngineResult<T>;
    fn with_context<F>(self, f: F) -> EngineResult<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: Into<EngineError>,
{
    fn context(self, what: &str) -> EngineResult<T> {
        self.with_context(|| what.to_string())
    }

    fn with_context<F>(self, f: F) -> EngineResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| EngineError::Context {
            context: f(),
            source: Box::new(e.into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::TileCoord;

    #[test]
    fn test_session_message_names_prim() {
        let err = EngineError::SessionActive { target: 7 };
        assert_eq!(err.to_string(), "A drag session is already active on prim 7");
    }

    #[test]
    fn test_missing_prim_maps_to_not_found() {
        let err: EngineError = PersistenceError::PrimNotFound(12).into();
        assert!(matches!(err, EngineError::NotFound { kind: "prim", id: 12 }));
    }

    #[test]
    fn test_context_keeps_source_chain() {
        let fetch = FetchError::NotFound(TileCoord { x: 1, y: 2, zoom: 3 });
        let result: Result<(), FetchError> = Err(fetch.clone());
        let err = result.context("loading tile").expect_err("Failed to wrap error");

        assert_eq!(err.to_string(), "loading tile: Tile fetch failed: tile 3/1/2 not found");
        let source = err.source().expect("Failed to get source");
        assert!(matches!(
            source.downcast_ref::<EngineError>(),
            Some(EngineError::TileFetch(inner)) if *inner == fetch
        ));
    }

    #[test]
    fn test_option_ext() {
        let missing: Option<u8> = None;
        let result = missing.ok_or_engine(|| EngineError::NotFound { kind: "handle", id: 4 });
        assert_eq!(result.expect_err("Failed to map None").to_string(), "No handle with id 4");
    }
}
