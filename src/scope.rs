//! @ai:module:intent Define the lifetime policies an annotated dependency can have
//! @ai:module:layer domain
//! @ai:module:public_api Scope
//! @ai:module:stateless true

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifetime of an instance built by a dependency container.
///
/// - `transient`: a new instance every time the dependency is resolved.
/// - `container`: built when its container is initialized, lives as long as the container.
/// - `weak`: built on first resolution, lives while strong references to it live,
///   and is shared with children meanwhile.
/// - `lazy`: built on first resolution, lives as long as its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Transient,
    #[default]
    Container,
    Weak,
    Lazy,
}

impl Scope {
    pub const ALL: [Scope; 4] = [Scope::Transient, Scope::Container, Scope::Weak, Scope::Lazy];

    /// @ai:intent Identifier used in annotations and diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Transient => "transient",
            Scope::Container => "container",
            Scope::Weak => "weak",
            Scope::Lazy => "lazy",
        }
    }

    /// @ai:intent Whether a resolution always builds a fresh instance
    pub fn is_transient(&self) -> bool {
        matches!(self, Scope::Transient)
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scope::ALL
            .into_iter()
            .find(|scope| scope.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
