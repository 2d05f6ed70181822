//! @ai:module:intent Merge the syntax trees of all input files into one dependency graph
//! @ai:module:layer application
//! @ai:module:public_api Linker, LinkOptions, link
//! @ai:module:depends_on ast, graph, error
//! @ai:module:stateless true

use crate::ast::{Expr, TypeDeclaration};
use crate::error::LinkError;
use crate::graph::{DependencyGraph, ParentLink, Resolver};

/// @ai:intent Options controlling how declarations from different files are merged
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkOptions {
    /// Treat a type declared in several places as one resolver whose
    /// annotations are the union of all declarations.
    pub allow_augmentation: bool,
}

/// @ai:intent Sequential merger of per-file trees
pub struct Linker {
    options: LinkOptions,
    graph: DependencyGraph,
}

impl Linker {
    pub fn new(options: LinkOptions) -> Self {
        Self {
            options,
            graph: DependencyGraph::default(),
        }
    }

    /// @ai:intent Merge every file, then resolve parent links against the full graph
    /// @ai:post every explicit parent link is Resolved or Unresolved
    /// @ai:effects pure
    pub fn link(mut self, files: &[Expr]) -> Result<DependencyGraph, LinkError> {
        for file in files {
            self.link_declarations(file.children(), None)?;
        }

        self.graph.resolve_parents();

        tracing::debug!(
            files = files.len(),
            types = self.graph.injectable_types_count(),
            "linked dependency graph"
        );

        Ok(self.graph)
    }

    fn link_declarations(
        &mut self,
        children: &[Expr],
        enclosing: Option<&str>,
    ) -> Result<(), LinkError> {
        for child in children {
            if let Expr::TypeDeclaration(declaration) = child {
                self.link_declaration(declaration, enclosing)?;
            }
        }
        Ok(())
    }

    fn link_declaration(
        &mut self,
        declaration: &TypeDeclaration,
        enclosing: Option<&str>,
    ) -> Result<(), LinkError> {
        let resolver = build_resolver(declaration, enclosing);
        let name = resolver.ty.name.clone();

        if !self.graph.contains(&name) {
            self.graph.insert(resolver);
        } else if !self.options.allow_augmentation {
            let previous = self
                .graph
                .get(&name)
                .map(|existing| existing.location.clone())
                .unwrap_or_default();
            return Err(LinkError::DuplicateDeclaration {
                name,
                location: declaration.location.clone(),
                previous,
            });
        } else if let Some(existing) = self.graph.get_mut(&name) {
            augment(existing, resolver)?;
        }

        self.link_declarations(&declaration.children, Some(&declaration.ty.name))
    }
}

fn build_resolver(declaration: &TypeDeclaration, enclosing: Option<&str>) -> Resolver {
    let mut resolver = Resolver {
        ty: declaration.ty.clone(),
        access: declaration.access,
        location: declaration.location.clone(),
        registrations: Vec::new(),
        references: Vec::new(),
        configuration: Vec::new(),
        parent: match (&declaration.parent, enclosing) {
            (Some(parent), _) => ParentLink::Pending {
                name: parent.name.clone(),
                location: declaration.location.clone(),
            },
            (None, Some(enclosing)) => ParentLink::Enclosing {
                name: enclosing.to_string(),
            },
            (None, None) => ParentLink::Root,
        },
        enclosing: enclosing.map(str::to_string),
        nested: Vec::new(),
    };

    for child in &declaration.children {
        match child {
            Expr::Register(register) => resolver.registrations.push(register.clone()),
            Expr::Reference(reference) => resolver.references.push(reference.clone()),
            Expr::Configuration(configuration) => {
                resolver.configuration.push(configuration.clone())
            }
            Expr::TypeDeclaration(nested) => resolver.nested.push(nested.ty.name.clone()),
            Expr::File { .. } => {}
        }
    }

    resolver
}

/// Folds a re-declaration into the resolver seen first.
fn augment(existing: &mut Resolver, addition: Resolver) -> Result<(), LinkError> {
    match (&existing.parent, &addition.parent) {
        (ParentLink::Pending { name: previous, .. }, ParentLink::Pending { name, location })
            if previous != name =>
        {
            return Err(LinkError::ConflictingParent {
                name: existing.ty.name.clone(),
                parent: name.clone(),
                previous: previous.clone(),
                location: location.clone(),
            });
        }
        (current, ParentLink::Pending { .. }) if !current.is_explicit() => {
            existing.parent = addition.parent.clone();
        }
        _ => {}
    }

    for registration in &addition.registrations {
        if let Some(previous) = existing
            .registrations
            .iter()
            .find(|known| known.name == registration.name)
        {
            return Err(LinkError::DuplicateDependency {
                name: registration.name.clone(),
                declaration: existing.ty.name.clone(),
                location: registration.location.clone(),
                previous: previous.location.clone(),
            });
        }
    }

    existing.registrations.extend(addition.registrations);
    existing.references.extend(addition.references);
    existing.configuration.extend(addition.configuration);
    existing.nested.extend(addition.nested);
    Ok(())
}

/// @ai:intent Link parsed files with the given options
/// @ai:effects pure
pub fn link(files: &[Expr], options: LinkOptions) -> Result<DependencyGraph, LinkError> {
    Linker::new(options).link(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::DEFAULT_MARKER;
    use crate::parser::parse_source;
    use std::path::Path;

    fn parse(name: &str, source: &str) -> Expr {
        parse_source(source, Path::new(name), DEFAULT_MARKER).unwrap()
    }

    #[test]
    fn test_parent_declared_in_later_file_is_resolved() {
        let child = parse(
            "Child.swift",
            "// weaver: parent = Root\nfinal class Child {\n  // weaver: api <- API\n}\n",
        );
        let root = parse("Root.swift", "final class Root {\n  // weaver: api -> API\n}\n");

        let graph = link(&[child, root], LinkOptions::default()).unwrap();

        assert_eq!(graph.injectable_types_count(), 2);
        match &graph.get("Child").unwrap().parent {
            ParentLink::Resolved { name, location } => {
                assert_eq!(name, "Root");
                assert_eq!(location.file, Path::new("Child.swift"));
            }
            other => panic!("unexpected parent link: {other:?}"),
        }
        assert_eq!(graph.get("Root").unwrap().parent, ParentLink::Root);
    }

    #[test]
    fn test_missing_parent_is_deferred_not_failed() {
        let child = parse(
            "Child.swift",
            "// weaver: parent = Nowhere\nfinal class Child {\n  // weaver: api <- API\n}\n",
        );
        let graph = link(&[child], LinkOptions::default()).unwrap();
        assert!(matches!(
            graph.get("Child").unwrap().parent,
            ParentLink::Unresolved { ref name, .. } if name == "Nowhere"
        ));
    }

    #[test]
    fn test_nested_declaration_gets_enclosing_parent() {
        let file = parse(
            "Outer.swift",
            "final class Outer {\n  // weaver: api -> API\n  final class Inner {\n    // weaver: api <- API\n  }\n}\n",
        );
        let graph = link(&[file], LinkOptions::default()).unwrap();

        assert_eq!(graph.get("Outer").unwrap().nested, vec!["Inner".to_string()]);
        let inner = graph.get("Inner").unwrap();
        assert_eq!(inner.enclosing.as_deref(), Some("Outer"));
        assert_eq!(
            inner.parent,
            ParentLink::Enclosing {
                name: "Outer".to_string()
            }
        );
    }

    #[test]
    fn test_duplicate_declaration_across_files_fails() {
        let first = parse("A.swift", "final class Service {\n  // weaver: api -> API\n}\n");
        let second = parse("B.swift", "extension Service {\n  // weaver: logger -> Logger\n}\n");

        match link(&[first, second], LinkOptions::default()) {
            Err(LinkError::DuplicateDeclaration {
                name,
                location,
                previous,
            }) => {
                assert_eq!(name, "Service");
                assert_eq!(location.file, Path::new("B.swift"));
                assert_eq!(previous.file, Path::new("A.swift"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_augmentation_merges_declarations() {
        let first = parse("A.swift", "final class Service {\n  // weaver: api -> API\n}\n");
        let second = parse(
            "B.swift",
            "// weaver: parent = Root\nextension Service {\n  // weaver: logger <- Logger\n}\n",
        );
        let options = LinkOptions {
            allow_augmentation: true,
        };

        let graph = link(&[first, second], options).unwrap();
        let service = graph.get("Service").unwrap();

        assert_eq!(graph.injectable_types_count(), 1);
        assert_eq!(service.registrations.len(), 1);
        assert_eq!(service.references.len(), 1);
        assert_eq!(service.parent.name(), Some("Root"));
    }

    #[test]
    fn test_augmentation_with_same_registration_name_fails() {
        let first = parse("A.swift", "final class Service {\n  // weaver: api -> API\n}\n");
        let second = parse(
            "B.swift",
            "extension Service {\n  // weaver: api -> OtherAPI\n  // weaver: api.scope = .weak\n}\n",
        );
        let options = LinkOptions {
            allow_augmentation: true,
        };

        let error = link(&[first, second], options).unwrap_err();
        assert_eq!(error.code(), "E303");
        match error {
            LinkError::DuplicateDependency {
                name,
                declaration,
                location,
                previous,
            } => {
                assert_eq!(name, "api");
                assert_eq!(declaration, "Service");
                assert_eq!(location.file, Path::new("B.swift"));
                assert_eq!(previous.file, Path::new("A.swift"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_augmentation_with_conflicting_parents_fails() {
        let first = parse("A.swift", "// weaver: parent = Root\nfinal class Service {\n}\n");
        let second = parse("B.swift", "// weaver: parent = Other\nextension Service {\n}\n");
        let options = LinkOptions {
            allow_augmentation: true,
        };

        assert!(matches!(
            link(&[first, second], options),
            Err(LinkError::ConflictingParent { .. })
        ));
    }
}
