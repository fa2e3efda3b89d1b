use scene_core::{ErrorKind, SceneError};

/// Alias for `Result<T, BridgeError>`.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors raised while registering types or moving data across the bridge.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// No type is registered under this name.
    #[error("unknown type: \"{0}\"")]
    UnknownType(String),

    /// A type with this name is already registered.
    #[error("type already registered: \"{0}\"")]
    DuplicateType(String),

    /// A byte buffer is smaller than the layout it is read as.
    #[error("type \"{type_name}\" needs {expected} bytes, got {found}")]
    ShortBuffer {
        /// The type being read.
        type_name: String,
        /// Bytes required by the layout.
        expected: usize,
        /// Bytes available.
        found: usize,
    },

    /// The wire document is not valid JSON of the expected shape.
    #[error("malformed wire document: {0}")]
    Wire(#[from] serde_json::Error),
}

impl From<BridgeError> for SceneError {
    fn from(err: BridgeError) -> Self {
        let kind = match err {
            BridgeError::Wire(_) => ErrorKind::ParseError,
            BridgeError::UnknownType(_) => ErrorKind::InvalidReference,
            BridgeError::DuplicateType(_) | BridgeError::ShortBuffer { .. } => {
                ErrorKind::ValidationError
            }
        };
        SceneError::new(kind, err.to_string())
    }
}
