//! @ai:module:intent Validate the linked dependency graph and compute reference bindings
//! @ai:module:layer application
//! @ai:module:public_api Inspector, InspectOptions, Inspection, InspectFailure, Diagnostic, Severity
//! @ai:module:depends_on graph, ast, error
//! @ai:module:stateless true

use crate::annotation::Location;
use crate::ast::{Reference, Register};
use crate::error::InspectError;
use crate::graph::{
    Binding, BoundReference, DependencyGraph, ParentLink, Resolver, ValidatedGraph,
    ValidatedResolver,
};
use crate::scope::Scope;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// @ai:intent Severity level for reported issues
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

/// @ai:intent A single located issue, ready to be rendered
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: String,
    pub message: String,
    pub location: Location,
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn error(code: &str, message: String, location: Location) -> Self {
        Self {
            severity: Severity::Error,
            code: code.to_string(),
            message,
            location,
            suggestion: None,
        }
    }

    pub fn warning(code: &str, message: String, location: Location) -> Self {
        Self {
            severity: Severity::Warning,
            code: code.to_string(),
            message,
            location,
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl From<&InspectError> for Diagnostic {
    fn from(error: &InspectError) -> Self {
        let diagnostic = Diagnostic::error(error.code(), error.to_string(), error.location().clone());
        match error {
            InspectError::DependencyNotFound { dependency, .. } => diagnostic.with_suggestion(
                format!("Register it in this type or one of its parents with `// weaver: {}`", dependency.replacen(':', " ->", 1)),
            ),
            InspectError::TransientCycle { .. } => diagnostic
                .with_suggestion("Give one of the dependencies in the cycle a non-transient scope"),
            InspectError::UnresolvedParent { .. }
            | InspectError::AmbiguousBinding { .. }
            | InspectError::ParentCycle { .. } => diagnostic,
        }
    }
}

/// @ai:intent Configuration for the inspector
#[derive(Debug, Clone, Copy)]
pub struct InspectOptions {
    pub warn_unused: bool,
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self { warn_unused: true }
    }
}

/// @ai:intent Outcome of a successful inspection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inspection {
    pub graph: ValidatedGraph,
    pub warnings: Vec<Diagnostic>,
}

/// @ai:intent Outcome of a failed inspection; warnings found on the way are kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectFailure {
    pub errors: Vec<InspectError>,
    pub warnings: Vec<Diagnostic>,
}

/// @ai:intent Read-only validator over a linked graph
pub struct Inspector<'g> {
    graph: &'g DependencyGraph,
    options: InspectOptions,
}

/// Result of looking for a registration in one resolver.
enum Search<'g> {
    Found(&'g Register),
    Ambiguous(Vec<&'g Register>),
    Missing,
}

/// Cycle found while walking from a reference back to its declaring resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cycle {
    None,
    TransientOnly,
    Strong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Gray,
    Black,
}

#[derive(Debug, Clone)]
struct Edge {
    target: String,
    scope: Scope,
}

/// "X depends on T" edges: X registers T, or X references T.
struct DependencyEdges {
    edges: HashMap<String, Vec<Edge>>,
}

impl<'g> Inspector<'g> {
    pub fn new(graph: &'g DependencyGraph, options: InspectOptions) -> Self {
        Self { graph, options }
    }

    /// @ai:intent Bind every reference, detect cycles and collect every error in one pass
    /// @ai:post Ok graph has a binding for every reference
    /// @ai:effects pure
    pub fn inspect(&self) -> Result<Inspection, InspectFailure> {
        let mut errors = Vec::new();
        let mut bindings: HashMap<&str, Vec<(&Reference, Binding)>> = HashMap::new();

        for resolver in self.graph.resolvers() {
            errors.extend(self.check_parent(resolver));

            let bound = bindings.entry(resolver.name()).or_default();
            for reference in &resolver.references {
                match self.bind(resolver, reference) {
                    Ok(Some(binding)) => bound.push((reference, binding)),
                    Ok(None) => {}
                    Err(error) => errors.push(error),
                }
            }
        }

        let edges = DependencyEdges::build(self.graph, &bindings);
        let mut validated = IndexMap::new();

        for resolver in self.graph.resolvers() {
            let mut references = Vec::new();

            for (reference, binding) in bindings.get(resolver.name()).into_iter().flatten() {
                let cycle = edges.cycle_through(
                    resolver.name(),
                    &reference.ty.name,
                    binding.registration.scope,
                );
                if cycle == Cycle::TransientOnly {
                    errors.push(InspectError::TransientCycle {
                        dependency: reference.describe(),
                        declaration: resolver.name().to_string(),
                        location: reference.location.clone(),
                    });
                }
                references.push(BoundReference {
                    reference: (*reference).clone(),
                    binding: binding.clone(),
                    requires_indirection: cycle == Cycle::Strong,
                });
            }

            validated.insert(
                resolver.name().to_string(),
                ValidatedResolver {
                    ty: resolver.ty.clone(),
                    access: resolver.access,
                    location: resolver.location.clone(),
                    registrations: resolver.registrations.clone(),
                    references,
                    configuration: resolver.configuration.clone(),
                    parent: self
                        .parent_of(resolver)
                        .ok()
                        .flatten()
                        .map(|parent| parent.name().to_string()),
                    enclosing: resolver.enclosing.clone(),
                    nested: resolver.nested.clone(),
                },
            );
        }

        let warnings = if self.options.warn_unused {
            self.unused_registrations(&bindings)
        } else {
            Vec::new()
        };
        for warning in &warnings {
            tracing::warn!(location = %warning.location, "{}", warning.message);
        }

        if !errors.is_empty() {
            tracing::debug!(errors = errors.len(), "dependency graph is invalid");
            return Err(InspectFailure { errors, warnings });
        }

        Ok(Inspection {
            graph: ValidatedGraph::new(validated, self.graph.injectable_types_count()),
            warnings,
        })
    }

    /// Ok(None) for a root, Err(name) when the declared parent is not in the graph.
    fn parent_of(&self, resolver: &Resolver) -> Result<Option<&'g Resolver>, String> {
        match &resolver.parent {
            ParentLink::Root => Ok(None),
            ParentLink::Enclosing { name }
            | ParentLink::Pending { name, .. }
            | ParentLink::Resolved { name, .. } => {
                self.graph.get(name).map(Some).ok_or_else(|| name.clone())
            }
            ParentLink::Unresolved { name, .. } => Err(name.clone()),
        }
    }

    fn check_parent(&self, resolver: &Resolver) -> Option<InspectError> {
        let mut visited = HashSet::new();
        let mut current = resolver;

        loop {
            visited.insert(current.name());
            match self.parent_of(current) {
                Ok(None) => return None,
                Err(parent) => {
                    // Reported once, on the resolver declaring the missing parent.
                    if current.name() != resolver.name() {
                        return None;
                    }
                    return Some(InspectError::UnresolvedParent {
                        declaration: resolver.name().to_string(),
                        parent,
                        location: resolver.location.clone(),
                    });
                }
                Ok(Some(parent)) if parent.name() == resolver.name() => {
                    return Some(InspectError::ParentCycle {
                        declaration: resolver.name().to_string(),
                        location: resolver.location.clone(),
                    });
                }
                Ok(Some(parent)) if visited.contains(parent.name()) => return None,
                Ok(Some(parent)) => current = parent,
            }
        }
    }

    /// @ai:intent Find the registration a reference binds to along the ancestor chain
    /// @ai:post Ok(None) when the chain ends at an unresolved parent
    fn bind(&self, resolver: &Resolver, reference: &Reference) -> Result<Option<Binding>, InspectError> {
        let mut visited = HashSet::new();
        let mut current = self.graph.get(resolver.name());

        while let Some(node) = current {
            if !visited.insert(node.name()) {
                break;
            }

            match search(node, reference) {
                Search::Found(registration) => {
                    return Ok(Some(Binding {
                        resolver: node.name().to_string(),
                        registration: registration.clone(),
                    }));
                }
                Search::Ambiguous(candidates) => {
                    return Err(InspectError::AmbiguousBinding {
                        dependency: reference.describe(),
                        declaration: resolver.name().to_string(),
                        resolver: node.name().to_string(),
                        candidates: candidates
                            .iter()
                            .map(|candidate| format!("`{}`", candidate.describe()))
                            .collect::<Vec<_>>()
                            .join(", "),
                        location: reference.location.clone(),
                    });
                }
                Search::Missing => {}
            }

            current = match self.parent_of(node) {
                Ok(parent) => parent,
                Err(_) => return Ok(None),
            };
        }

        Err(InspectError::DependencyNotFound {
            dependency: reference.describe(),
            declaration: resolver.name().to_string(),
            location: reference.location.clone(),
        })
    }

    fn unused_registrations(&self, bindings: &HashMap<&str, Vec<(&Reference, Binding)>>) -> Vec<Diagnostic> {
        let used: HashSet<(&str, &str)> = bindings
            .values()
            .flatten()
            .map(|(_, binding)| (binding.resolver.as_str(), binding.registration.name.as_str()))
            .collect();

        self.graph
            .resolvers()
            .flat_map(|resolver| {
                resolver
                    .registrations
                    .iter()
                    .filter(|registration| !used.contains(&(resolver.name(), registration.name.as_str())))
                    .map(|registration| {
                        Diagnostic::warning(
                            "W401",
                            format!(
                                "Registration `{}` in `{}` is never referenced",
                                registration.describe(),
                                resolver.name()
                            ),
                            registration.location.clone(),
                        )
                        .with_suggestion(format!(
                            "Reference it with `// weaver: {} <- {}` or remove it",
                            registration.name, registration.ty
                        ))
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}

/// Matches by name and type index; generics must then agree exactly.
fn search<'g>(resolver: &'g Resolver, reference: &Reference) -> Search<'g> {
    let index = reference.ty.index();
    let candidates: Vec<&Register> = resolver
        .registrations
        .iter()
        .filter(|registration| registration.name == reference.name && registration.ty.index() == index)
        .collect();

    if let Some(exact) = candidates.iter().copied().find(|registration| registration.ty == reference.ty) {
        Search::Found(exact)
    } else if candidates.is_empty() {
        Search::Missing
    } else {
        Search::Ambiguous(candidates)
    }
}

impl DependencyEdges {
    fn build(graph: &DependencyGraph, bindings: &HashMap<&str, Vec<(&Reference, Binding)>>) -> Self {
        let mut edges: HashMap<String, Vec<Edge>> = HashMap::new();

        for resolver in graph.resolvers() {
            let outgoing = edges.entry(resolver.name().to_string()).or_default();

            for registration in &resolver.registrations {
                if graph.contains(&registration.ty.name) {
                    outgoing.push(Edge {
                        target: registration.ty.name.clone(),
                        scope: registration.scope,
                    });
                }
            }

            for (reference, binding) in bindings.get(resolver.name()).into_iter().flatten() {
                if graph.contains(&reference.ty.name) {
                    outgoing.push(Edge {
                        target: reference.ty.name.clone(),
                        scope: binding.registration.scope,
                    });
                }
            }
        }

        Self { edges }
    }

    /// Walks from `first` looking for a way back to `root`, which stays gray for
    /// the whole walk. Colors are keyed by (node, non-transient edge seen so far).
    fn cycle_through(&self, root: &str, first: &str, scope: Scope) -> Cycle {
        let strong = !scope.is_transient();
        if first == root {
            return if strong { Cycle::Strong } else { Cycle::TransientOnly };
        }

        let mut colors = HashMap::new();
        colors.insert((root.to_string(), false), Color::Gray);
        colors.insert((root.to_string(), true), Color::Gray);

        let mut transient_cycle = false;
        if self.walk(first, strong, root, &mut colors, &mut transient_cycle) {
            Cycle::Strong
        } else if transient_cycle {
            Cycle::TransientOnly
        } else {
            Cycle::None
        }
    }

    fn walk(
        &self,
        node: &str,
        strong: bool,
        root: &str,
        colors: &mut HashMap<(String, bool), Color>,
        transient_cycle: &mut bool,
    ) -> bool {
        colors.insert((node.to_string(), strong), Color::Gray);

        for edge in self.edges.get(node).into_iter().flatten() {
            let strong = strong || !edge.scope.is_transient();

            match colors.get(&(edge.target.clone(), strong)) {
                Some(Color::Gray) if edge.target == root => {
                    if strong {
                        return true;
                    }
                    *transient_cycle = true;
                }
                Some(Color::Gray) | Some(Color::Black) => {}
                None => {
                    if self.walk(&edge.target, strong, root, colors, transient_cycle) {
                        return true;
                    }
                }
            }
        }

        colors.insert((node.to_string(), strong), Color::Black);
        false
    }
}
