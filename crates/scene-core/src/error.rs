use std::fmt;

/// Alias for `Result<T, SceneError>`.
pub type SceneResult<T> = Result<T, SceneError>;

/// Categorized error kinds for loading, validating, and bridging scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The scene file does not exist.
    FileNotFound,
    /// The source document is malformed.
    ParseError,
    /// A required key is absent.
    MissingRequired,
    /// A node has the wrong shape (e.g. a scalar where a mapping was expected).
    InvalidType,
    /// A hierarchy entry names an entity that does not exist.
    InvalidReference,
    /// A uniqueness or format rule was violated.
    ValidationError,
    /// The hierarchy contains a cycle.
    CircularDependency,
    /// An allocation could not be satisfied.
    OutOfMemory,
}

impl ErrorKind {
    /// Stable short code printed by tooling.
    pub fn code(self) -> &'static str {
        match self {
            Self::FileNotFound => "E001",
            Self::ParseError => "E002",
            Self::MissingRequired => "E003",
            Self::InvalidType => "E004",
            Self::InvalidReference => "E005",
            Self::ValidationError => "E006",
            Self::CircularDependency => "E007",
            Self::OutOfMemory => "E008",
        }
    }

    /// Human-readable kind name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FileNotFound => "file not found",
            Self::ParseError => "parse error",
            Self::MissingRequired => "missing required field",
            Self::InvalidType => "invalid type",
            Self::InvalidReference => "invalid reference",
            Self::ValidationError => "validation error",
            Self::CircularDependency => "circular dependency",
            Self::OutOfMemory => "out of memory",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error record: kind, message, and a best-effort location.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct SceneError {
    /// What went wrong.
    pub kind: ErrorKind,
    /// Details for the user.
    pub message: String,
    /// Dotted location within the document, e.g. `entities.Player.tags[1]`.
    pub path: Option<String>,
    /// 1-based line, when the source parser reported one.
    pub line: Option<usize>,
    /// 1-based column, when the source parser reported one.
    pub column: Option<usize>,
}

impl SceneError {
    /// Creates an error without location information.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            path: None,
            line: None,
            column: None,
        }
    }

    /// Attaches a document path.
    #[must_use]
    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attaches a line and column.
    #[must_use]
    pub fn with_position(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    /// Shorthand for [`ErrorKind::FileNotFound`].
    pub fn file_not_found(path: impl fmt::Display) -> Self {
        Self::new(ErrorKind::FileNotFound, format!("cannot open {path}"))
    }

    /// Shorthand for [`ErrorKind::ParseError`].
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ParseError, message)
    }

    /// Shorthand for [`ErrorKind::MissingRequired`].
    pub fn missing(key: &str) -> Self {
        Self::new(ErrorKind::MissingRequired, format!("missing required key \"{key}\""))
    }

    /// Shorthand for [`ErrorKind::InvalidType`].
    pub fn invalid_type(expected: &str, found: &str) -> Self {
        Self::new(
            ErrorKind::InvalidType,
            format!("expected {expected}, found {found}"),
        )
    }

    /// Shorthand for [`ErrorKind::InvalidReference`].
    pub fn invalid_reference(name: &str) -> Self {
        Self::new(
            ErrorKind::InvalidReference,
            format!("entity \"{name}\" is not declared"),
        )
    }

    /// Shorthand for [`ErrorKind::ValidationError`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValidationError, message)
    }

    /// The stable code of this error's kind.
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}
