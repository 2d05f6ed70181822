//! @ai:module:intent Define error types for every stage of the annotation compiler
//! @ai:module:layer domain
//! @ai:module:public_api Error, Result, LexError, ParseError, LinkError, InspectError
//! @ai:module:stateless true

use crate::annotation::Location;
use crate::inspector::{Diagnostic, InspectFailure};
use std::path::PathBuf;
use thiserror::Error;

/// @ai:intent Errors raised while scanning one file
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("Invalid annotation at {location}: `{content}`")]
    InvalidAnnotation { location: Location, content: String },

    #[error("Invalid scope `{scope}` at {location}")]
    InvalidScope { location: Location, scope: String },

    #[error("Invalid type `{ty}` at {location}")]
    InvalidType { location: Location, ty: String },

    #[error("Unbalanced declaration nesting at {location}: {message}")]
    UnbalancedNesting { location: Location, message: String },
}

/// @ai:intent Errors raised while folding one file's tokens into a tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unexpected {token} at {location}: no matching declaration is open")]
    UnmatchedEnd { location: Location, token: String },

    #[error("Scope annotation for `{name}` at {location} has no matching register annotation")]
    ScopeWithoutRegister { location: Location, name: String },

    #[error("Scope of `{name}` declared twice at {location}")]
    DuplicateScope { location: Location, name: String },

    #[error("Dependency `{name}` registered twice in `{declaration}` at {location}")]
    DuplicateDependency {
        location: Location,
        name: String,
        declaration: String,
    },

    #[error("Parent of `{declaration}` declared twice at {location}")]
    DuplicateParent { location: Location, declaration: String },

    #[error("{token} at {location} is not inside an injectable type")]
    OrphanAnnotation { location: Location, token: String },

    #[error("Declaration opened at {location} is never closed")]
    UnclosedDeclaration { location: Location },
}

/// @ai:intent Errors raised while merging all files into one graph
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    #[error("Type `{name}` declared at {location} is already declared at {previous}")]
    DuplicateDeclaration {
        name: String,
        location: Location,
        previous: Location,
    },

    #[error("Type `{name}` declares parent `{parent}` at {location} but was given parent `{previous}` elsewhere")]
    ConflictingParent {
        name: String,
        parent: String,
        previous: String,
        location: Location,
    },

    #[error("Dependency `{name}` of `{declaration}` registered at {location} is already registered at {previous}")]
    DuplicateDependency {
        name: String,
        declaration: String,
        location: Location,
        previous: Location,
    },
}

/// @ai:intent Errors found while validating the linked graph
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InspectError {
    #[error("Parent `{parent}` of `{declaration}` at {location} is not declared in any input file")]
    UnresolvedParent {
        declaration: String,
        parent: String,
        location: Location,
    },

    #[error("Dependency `{dependency}` not found, declared in `{declaration}` at {location}")]
    DependencyNotFound {
        dependency: String,
        declaration: String,
        location: Location,
    },

    #[error("Dependency `{dependency}` in `{declaration}` at {location} is ambiguous: `{resolver}` registers {candidates}")]
    AmbiguousBinding {
        dependency: String,
        declaration: String,
        resolver: String,
        candidates: String,
        location: Location,
    },

    #[error("Parent chain of `{declaration}` at {location} loops back to itself")]
    ParentCycle { declaration: String, location: Location },

    #[error("Dependency `{dependency}` in `{declaration}` at {location} closes a cycle of transient dependencies")]
    TransientCycle {
        dependency: String,
        declaration: String,
        location: Location,
    },
}

/// @ai:intent Unified error type for all compiler operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error("{} error(s) found while checking the dependency graph", .0.errors.len())]
    Inspect(InspectFailure),

    #[error("{} file(s) failed to parse", .0.len())]
    Sources(Vec<Error>),

    #[error("Invalid configuration {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl LexError {
    pub fn location(&self) -> &Location {
        match self {
            LexError::InvalidAnnotation { location, .. }
            | LexError::InvalidScope { location, .. }
            | LexError::InvalidType { location, .. }
            | LexError::UnbalancedNesting { location, .. } => location,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            LexError::InvalidAnnotation { .. } => "E101",
            LexError::InvalidScope { .. } => "E102",
            LexError::InvalidType { .. } => "E103",
            LexError::UnbalancedNesting { .. } => "E104",
        }
    }
}

impl ParseError {
    pub fn location(&self) -> &Location {
        match self {
            ParseError::UnmatchedEnd { location, .. }
            | ParseError::ScopeWithoutRegister { location, .. }
            | ParseError::DuplicateScope { location, .. }
            | ParseError::DuplicateDependency { location, .. }
            | ParseError::DuplicateParent { location, .. }
            | ParseError::OrphanAnnotation { location, .. }
            | ParseError::UnclosedDeclaration { location } => location,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ParseError::UnmatchedEnd { .. } => "E201",
            ParseError::ScopeWithoutRegister { .. } => "E202",
            ParseError::DuplicateScope { .. } => "E203",
            ParseError::DuplicateDependency { .. } => "E204",
            ParseError::DuplicateParent { .. } => "E205",
            ParseError::OrphanAnnotation { .. } => "E206",
            ParseError::UnclosedDeclaration { .. } => "E207",
        }
    }
}

impl LinkError {
    pub fn location(&self) -> &Location {
        match self {
            LinkError::DuplicateDeclaration { location, .. }
            | LinkError::ConflictingParent { location, .. }
            | LinkError::DuplicateDependency { location, .. } => location,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            LinkError::DuplicateDeclaration { .. } => "E301",
            LinkError::ConflictingParent { .. } => "E302",
            LinkError::DuplicateDependency { .. } => "E303",
        }
    }
}

impl InspectError {
    pub fn location(&self) -> &Location {
        match self {
            InspectError::UnresolvedParent { location, .. }
            | InspectError::DependencyNotFound { location, .. }
            | InspectError::AmbiguousBinding { location, .. }
            | InspectError::ParentCycle { location, .. }
            | InspectError::TransientCycle { location, .. } => location,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            InspectError::UnresolvedParent { .. } => "E401",
            InspectError::DependencyNotFound { .. } => "E402",
            InspectError::AmbiguousBinding { .. } => "E403",
            InspectError::ParentCycle { .. } => "E404",
            InspectError::TransientCycle { .. } => "E405",
        }
    }
}

impl Error {
    /// @ai:intent Flatten compile errors into located diagnostics for reporting
    /// @ai:post empty for IO, configuration and serialization failures
    /// @ai:post inspection warnings are included with their own severity
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            Error::Lex(error) => vec![Diagnostic::error(
                error.code(),
                error.to_string(),
                error.location().clone(),
            )],
            Error::Parse(error) => vec![Diagnostic::error(
                error.code(),
                error.to_string(),
                error.location().clone(),
            )],
            Error::Link(error) => vec![Diagnostic::error(
                error.code(),
                error.to_string(),
                error.location().clone(),
            )],
            Error::Inspect(failure) => failure
                .errors
                .iter()
                .map(Diagnostic::from)
                .chain(failure.warnings.iter().cloned())
                .collect(),
            Error::Sources(errors) => errors.iter().flat_map(Error::diagnostics).collect(),
            Error::Io(_) | Error::FileRead { .. } | Error::Config { .. } | Error::Json(_) => {
                Vec::new()
            }
        }
    }

    /// @ai:intent Whether the input was read but rejected, as opposed to an environment failure
    pub fn is_validation(&self) -> bool {
        match self {
            Error::Lex(_) | Error::Parse(_) | Error::Link(_) | Error::Inspect(_) => true,
            Error::Sources(errors) => errors.iter().all(Error::is_validation),
            Error::Io(_) | Error::FileRead { .. } | Error::Config { .. } | Error::Json(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn location(line: usize) -> Location {
        Location::new(Path::new("Service.swift"), line, 0, 1)
    }

    #[test]
    fn test_codes_are_stable() {
        let lex = LexError::InvalidScope {
            location: location(3),
            scope: "forever".to_string(),
        };
        let inspect = InspectError::ParentCycle {
            declaration: "A".to_string(),
            location: location(0),
        };
        assert_eq!(lex.code(), "E102");
        assert_eq!(inspect.code(), "E404");
        assert_eq!(lex.location().line, 3);
    }

    #[test]
    fn test_sources_flatten_into_diagnostics() {
        let error = Error::Sources(vec![
            Error::Lex(LexError::InvalidType {
                location: location(1),
                ty: "[Int".to_string(),
            }),
            Error::Parse(ParseError::UnclosedDeclaration {
                location: location(7),
            }),
        ]);

        let diagnostics = error.diagnostics();
        let codes: Vec<_> = diagnostics.iter().map(|d| d.code.as_str()).collect();
        assert_eq!(codes, vec!["E103", "E207"]);
        assert!(error.is_validation());
    }

    #[test]
    fn test_environment_failures_are_not_validation() {
        let error = Error::Config {
            path: "weaver.toml".into(),
            message: "expected a table".to_string(),
        };
        assert!(error.diagnostics().is_empty());
        assert!(!error.is_validation());
    }
}
