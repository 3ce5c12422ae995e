//! Error types for calibsim.

use thiserror::Error;

/// The main error type for calibsim operations.
#[derive(Error, Debug)]
pub enum SceneError {
    /// A required configuration key is absent.
    #[error("configuration key '{0}' is missing")]
    ConfigurationMissing(String),

    /// A configuration key holds a value of the wrong type.
    #[error("configuration key '{key}' should be {expected}")]
    WrongType { key: String, expected: &'static str },

    /// A vector-valued field has the wrong number of elements.
    #[error("'{field}' expects {expected} elements, got {actual}")]
    MalformedVector {
        field: String,
        expected: String,
        actual: usize,
    },

    /// A scalar field holds a value outside its valid range.
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    /// The distortion model kind is not one this crate understands.
    #[error("unsupported camera distortion model '{0}'")]
    UnsupportedDistortionModel(String),

    /// An entity with the same frame and name is already registered.
    #[error("entity '{name}' already exists in frame '{frame_id}'")]
    DuplicateEntityName { frame_id: String, name: String },

    /// An entity was constructed without a reference frame.
    #[error("entity '{0}' has an empty frame id")]
    EmptyFrameId(String),

    /// No entity matches the given key.
    #[error("entity '{0}' not found")]
    EntityNotFound(String),

    /// The entity's control mode does not accept the interaction.
    #[error("entity '{name}' does not accept {interaction} interactions")]
    UnsupportedInteraction {
        name: String,
        interaction: &'static str,
    },

    /// The registry has been closed.
    #[error("registry is closed")]
    RegistryClosed,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parse error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for calibsim operations.
pub type Result<T> = std::result::Result<T, SceneError>;

impl SceneError {
    /// Builds a [`SceneError::MalformedVector`] for an exact-length field.
    pub fn malformed(field: impl Into<String>, expected: usize, actual: usize) -> Self {
        SceneError::MalformedVector {
            field: field.into(),
            expected: expected.to_string(),
            actual,
        }
    }

    /// Builds a [`SceneError::MalformedVector`] for a minimum-length field.
    pub fn too_short(field: impl Into<String>, minimum: usize, actual: usize) -> Self {
        SceneError::MalformedVector {
            field: field.into(),
            expected: format!("at least {minimum}"),
            actual,
        }
    }
}
