//! @ai:module:intent Define the token stream produced from annotated source files
//! @ai:module:layer domain
//! @ai:module:public_api Annotation, Token, Location, AccessLevel
//! @ai:module:stateless true

use crate::scope::Scope;
use crate::types::Type;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// @ai:intent Represents a located span of a source file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct Location {
    pub file: PathBuf,
    /// 0-based line of the first byte of the span
    pub line: usize,
    pub offset: usize,
    pub length: usize,
}

impl Location {
    /// @ai:intent Create a new Location
    pub fn new(file: impl Into<PathBuf>, line: usize, offset: usize, length: usize) -> Self {
        Self {
            file: file.into(),
            line,
            offset,
            length,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line)
    }
}

/// @ai:intent Visibility of an injectable type, forwarded to generated code
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    #[default]
    Internal,
    Public,
}

/// @ai:intent Payload of a token: one annotation directive or a declaration boundary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Annotation {
    /// `parent = Type`
    ParentResolver { ty: Type },
    /// `name -> Type`
    Register { name: String, ty: Type },
    /// `name.scope = .scope`
    Scope { name: String, scope: Scope },
    /// `name <- Type`
    Reference { name: String, ty: Type },
    /// `key = value`
    Configuration { key: String, value: String },
    InjectableType { ty: Type, access: AccessLevel },
    EndOfInjectableType,
    AnyDeclaration,
    EndOfAnyDeclaration,
}

impl Annotation {
    /// @ai:intent Short name of the token kind, used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Annotation::ParentResolver { .. } => "parent resolver annotation",
            Annotation::Register { .. } => "register annotation",
            Annotation::Scope { .. } => "scope annotation",
            Annotation::Reference { .. } => "reference annotation",
            Annotation::Configuration { .. } => "configuration annotation",
            Annotation::InjectableType { .. } => "injectable type",
            Annotation::EndOfInjectableType => "end of injectable type",
            Annotation::AnyDeclaration => "declaration",
            Annotation::EndOfAnyDeclaration => "end of declaration",
        }
    }
}

/// @ai:intent A located token; offsets are byte positions into the file text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Token {
    pub annotation: Annotation,
    pub offset: usize,
    pub length: usize,
    pub line: usize,
}

impl Token {
    pub fn new(annotation: Annotation, offset: usize, length: usize, line: usize) -> Self {
        Self {
            annotation,
            offset,
            length,
            line,
        }
    }

    /// @ai:intent Attach a file path to this token's span
    pub fn location(&self, file: &Path) -> Location {
        Location::new(file, self.line, self.offset, self.length)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (line {}, offset {}, length {})",
            self.annotation.kind_name(),
            self.line,
            self.offset,
            self.length
        )
    }
}
