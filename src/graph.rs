//! @ai:module:intent Define the cross-file dependency graph and its validated form
//! @ai:module:layer domain
//! @ai:module:public_api DependencyGraph, Resolver, ParentLink, ValidatedGraph, ValidatedResolver, BoundReference, Binding
//! @ai:module:stateless true

use crate::annotation::{AccessLevel, Location};
use crate::ast::{Configuration, Reference, Register};
use crate::types::Type;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Where a resolver gets the dependencies it does not register itself.
///
/// Parent links are kept by name. An explicit `parent = Type` annotation starts
/// as `Pending` and is turned into `Resolved` or `Unresolved` once every file
/// has been merged, since the parent may be declared in a file linked later.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ParentLink {
    Root,
    /// No explicit parent: the lexically enclosing injectable type.
    Enclosing { name: String },
    Pending { name: String, location: Location },
    Resolved { name: String, location: Location },
    Unresolved { name: String, location: Location },
}

impl ParentLink {
    /// @ai:intent Name of the parent type, whatever its resolution state
    pub fn name(&self) -> Option<&str> {
        match self {
            ParentLink::Root => None,
            ParentLink::Enclosing { name }
            | ParentLink::Pending { name, .. }
            | ParentLink::Resolved { name, .. }
            | ParentLink::Unresolved { name, .. } => Some(name),
        }
    }

    pub fn is_explicit(&self) -> bool {
        matches!(
            self,
            ParentLink::Pending { .. } | ParentLink::Resolved { .. } | ParentLink::Unresolved { .. }
        )
    }
}

/// @ai:intent One annotated type with its own registrations and references
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Resolver {
    pub ty: Type,
    pub access: AccessLevel,
    pub location: Location,
    pub registrations: Vec<Register>,
    pub references: Vec<Reference>,
    pub configuration: Vec<Configuration>,
    pub parent: ParentLink,
    pub enclosing: Option<String>,
    pub nested: Vec<String>,
}

impl Resolver {
    pub fn name(&self) -> &str {
        &self.ty.name
    }
}

/// @ai:intent Every resolver of one compiler run, keyed by type name
/// @ai:invariant resolvers refer to each other by name only
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DependencyGraph {
    resolvers: IndexMap<String, Resolver>,
    injectable_types_count: usize,
}

impl DependencyGraph {
    pub fn get(&self, name: &str) -> Option<&Resolver> {
        self.resolvers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolvers.contains_key(name)
    }

    /// @ai:intent Resolvers in declaration order
    pub fn resolvers(&self) -> impl Iterator<Item = &Resolver> {
        self.resolvers.values()
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// @ai:intent Number of distinct annotated types, for reporting
    pub fn injectable_types_count(&self) -> usize {
        self.injectable_types_count
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Resolver> {
        self.resolvers.get_mut(name)
    }

    pub(crate) fn insert(&mut self, resolver: Resolver) {
        self.resolvers.insert(resolver.ty.name.clone(), resolver);
        self.injectable_types_count = self.resolvers.len();
    }

    /// @ai:intent Look up every pending parent link now that all files are merged
    /// @ai:post no ParentLink::Pending remains
    pub(crate) fn resolve_parents(&mut self) {
        let updates: Vec<(usize, ParentLink)> = self
            .resolvers
            .values()
            .enumerate()
            .filter_map(|(idx, resolver)| match &resolver.parent {
                ParentLink::Pending { name, location } => {
                    let link = if self.resolvers.contains_key(name) {
                        ParentLink::Resolved {
                            name: name.clone(),
                            location: location.clone(),
                        }
                    } else {
                        ParentLink::Unresolved {
                            name: name.clone(),
                            location: location.clone(),
                        }
                    };
                    Some((idx, link))
                }
                _ => None,
            })
            .collect();

        for (idx, link) in updates {
            self.resolvers[idx].parent = link;
        }
    }
}

/// @ai:intent The registration a reference resolves to, and who declares it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Binding {
    pub resolver: String,
    pub registration: Register,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoundReference {
    pub reference: Reference,
    pub binding: Binding,
    /// Generated code must reach this dependency through a lazy accessor.
    pub requires_indirection: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidatedResolver {
    pub ty: Type,
    pub access: AccessLevel,
    pub location: Location,
    pub registrations: Vec<Register>,
    pub references: Vec<BoundReference>,
    pub configuration: Vec<Configuration>,
    pub parent: Option<String>,
    pub enclosing: Option<String>,
    pub nested: Vec<String>,
}

/// @ai:intent Input contract of the code generator: a graph with no dangling references
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidatedGraph {
    resolvers: IndexMap<String, ValidatedResolver>,
    injectable_types_count: usize,
}

impl ValidatedGraph {
    pub(crate) fn new(
        resolvers: IndexMap<String, ValidatedResolver>,
        injectable_types_count: usize,
    ) -> Self {
        Self {
            resolvers,
            injectable_types_count,
        }
    }

    pub fn get(&self, name: &str) -> Option<&ValidatedResolver> {
        self.resolvers.get(name)
    }

    pub fn resolvers(&self) -> impl Iterator<Item = &ValidatedResolver> {
        self.resolvers.values()
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    pub fn injectable_types_count(&self) -> usize {
        self.injectable_types_count
    }
}
