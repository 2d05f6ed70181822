//! @ai:module:intent Define the per-file syntax tree built from a token stream
//! @ai:module:layer domain
//! @ai:module:public_api Expr, TypeDeclaration, Register, Reference, Configuration
//! @ai:module:stateless true

use crate::annotation::{AccessLevel, Location};
use crate::scope::Scope;
use crate::types::Type;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// @ai:intent Node of the annotation syntax tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "expr", rename_all = "snake_case")]
pub enum Expr {
    File { path: PathBuf, children: Vec<Expr> },
    TypeDeclaration(TypeDeclaration),
    Register(Register),
    Reference(Reference),
    Configuration(Configuration),
}

/// @ai:intent An injectable type and everything declared in its body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypeDeclaration {
    pub ty: Type,
    pub access: AccessLevel,
    pub parent: Option<Type>,
    pub children: Vec<Expr>,
    pub location: Location,
}

/// `name -> Type` combined with its optional `name.scope` annotation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Register {
    pub name: String,
    pub ty: Type,
    pub scope: Scope,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Reference {
    pub name: String,
    pub ty: Type,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Configuration {
    pub key: String,
    pub value: String,
    pub location: Location,
}

impl Expr {
    /// @ai:intent Children of a container node; empty for leaves
    pub fn children(&self) -> &[Expr] {
        match self {
            Expr::File { children, .. } => children,
            Expr::TypeDeclaration(declaration) => &declaration.children,
            Expr::Register(_) | Expr::Reference(_) | Expr::Configuration(_) => &[],
        }
    }

    /// @ai:intent Count the type declarations in this subtree
    pub fn type_declaration_count(&self) -> usize {
        let own = usize::from(matches!(self, Expr::TypeDeclaration(_)));
        own + self
            .children()
            .iter()
            .map(Expr::type_declaration_count)
            .sum::<usize>()
    }
}

impl TypeDeclaration {
    /// @ai:intent Registrations declared directly in this body
    pub fn registrations(&self) -> impl Iterator<Item = &Register> {
        self.children.iter().filter_map(|child| match child {
            Expr::Register(register) => Some(register),
            _ => None,
        })
    }

    /// @ai:intent References declared directly in this body
    pub fn references(&self) -> impl Iterator<Item = &Reference> {
        self.children.iter().filter_map(|child| match child {
            Expr::Reference(reference) => Some(reference),
            _ => None,
        })
    }
}

impl Register {
    pub fn describe(&self) -> String {
        format!("{}: {}", self.name, self.ty)
    }
}

impl Reference {
    pub fn describe(&self) -> String {
        format!("{}: {}", self.name, self.ty)
    }
}
