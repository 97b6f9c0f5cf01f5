//! Error types for the sift crate.

use std::fmt;

use thiserror::Error;

/// Errors raised while defining a searcher or binding it to a scope.
///
/// Errors produced by setup and filter steps are never wrapped in this type;
/// they travel through `search` as the searcher's own error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearcherError {
    /// A default model was registered twice.
    #[error("model already defined for {searcher}")]
    ModelAlreadyDefined { searcher: &'static str },

    /// A setup step was registered twice.
    #[error("setup already defined for {searcher}")]
    SetupAlreadyDefined { searcher: &'static str },

    /// Neither an explicit scope nor a default model is available.
    #[error("no default scope or model configured for {searcher}")]
    NoDefaultScope { searcher: &'static str },

    /// A filter was registered with neither a method name nor a body.
    #[error("filter requires either a method name or a block")]
    MissingFilterStep,

    /// A named step was not handled by the searcher's dispatch.
    #[error("no step named '{name}' on {searcher}")]
    UnknownStep { name: String, searcher: &'static str },
}

/// Broad classification of a [`SearcherError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The searcher definition or its binding is inconsistent.
    Configuration,
    /// A registration call received invalid arguments.
    Argument,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Configuration => write!(f, "configuration"),
            ErrorKind::Argument => write!(f, "argument"),
        }
    }
}

impl SearcherError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SearcherError::MissingFilterStep => ErrorKind::Argument,
            _ => ErrorKind::Configuration,
        }
    }

    /// Returns `true` for configuration errors.
    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }

    /// Returns `true` for argument errors.
    pub fn is_argument(&self) -> bool {
        self.kind() == ErrorKind::Argument
    }

    /// Creates an unknown-step error for the searcher type `S`.
    pub fn unknown_step<S>(name: impl Into<String>) -> Self {
        SearcherError::UnknownStep {
            name: name.into(),
            searcher: std::any::type_name::<S>(),
        }
    }
}

/// Result type for definition-time operations.
pub type Result<T> = std::result::Result<T, SearcherError>;
