//! @ai:module:intent Fold one file's token stream into a tree of type declarations
//! @ai:module:layer application
//! @ai:module:public_api Parser, parse_source
//! @ai:module:depends_on annotation, ast, lexer, error
//! @ai:module:stateless true

use crate::annotation::{AccessLevel, Annotation, Location, Token};
use crate::ast::{Configuration, Expr, Reference, Register, TypeDeclaration};
use crate::error::{Error, ParseError};
use crate::lexer::Lexer;
use crate::scope::Scope;
use crate::types::Type;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// @ai:intent Builds the syntax tree of one file from its tokens
pub struct Parser<'a> {
    tokens: &'a [Token],
    file: PathBuf,
}

/// An injectable declaration whose end token has not been reached yet.
struct DeclarationBuilder {
    ty: Type,
    access: AccessLevel,
    parent: Option<Type>,
    location: Location,
    children: Vec<Expr>,
    registered: HashSet<String>,
    scopes: Vec<(String, Scope, Location)>,
}

enum Frame {
    Injectable(DeclarationBuilder),
    /// Unannotated declaration; injectable types found inside it move up one level.
    Any {
        location: Location,
        hoisted: Vec<Expr>,
    },
}

impl Frame {
    fn location(&self) -> &Location {
        match self {
            Frame::Injectable(builder) => &builder.location,
            Frame::Any { location, .. } => location,
        }
    }
}

impl DeclarationBuilder {
    fn new(ty: Type, access: AccessLevel, parent: Option<Type>, location: Location) -> Self {
        Self {
            ty,
            access,
            parent,
            location,
            children: Vec::new(),
            registered: HashSet::new(),
            scopes: Vec::new(),
        }
    }

    fn set_parent(&mut self, parent: Type, location: Location) -> Result<(), ParseError> {
        if self.parent.is_some() {
            return Err(ParseError::DuplicateParent {
                location,
                declaration: self.ty.to_string(),
            });
        }
        self.parent = Some(parent);
        Ok(())
    }

    fn register(&mut self, name: &str, ty: &Type, location: Location) -> Result<(), ParseError> {
        if !self.registered.insert(name.to_string()) {
            return Err(ParseError::DuplicateDependency {
                location,
                name: name.to_string(),
                declaration: self.ty.to_string(),
            });
        }
        self.children.push(Expr::Register(Register {
            name: name.to_string(),
            ty: ty.clone(),
            scope: Scope::default(),
            location,
        }));
        Ok(())
    }

    /// Pairs every scope annotation with its registration.
    fn finish(mut self) -> Result<TypeDeclaration, ParseError> {
        let mut scoped = HashSet::new();

        for (name, scope, location) in self.scopes {
            if !scoped.insert(name.clone()) {
                return Err(ParseError::DuplicateScope { location, name });
            }

            let register = self.children.iter_mut().find_map(|child| match child {
                Expr::Register(register) if register.name == name => Some(register),
                _ => None,
            });

            match register {
                Some(register) => register.scope = scope,
                None => return Err(ParseError::ScopeWithoutRegister { location, name }),
            }
        }

        Ok(TypeDeclaration {
            ty: self.ty,
            access: self.access,
            parent: self.parent,
            children: self.children,
            location: self.location,
        })
    }
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token], file: impl Into<PathBuf>) -> Self {
        Self {
            tokens,
            file: file.into(),
        }
    }

    /// @ai:intent Build the file's tree, honoring declaration nesting
    /// @ai:post result is an Expr::File whose children are top-level type declarations
    /// @ai:effects pure
    pub fn parse(&self) -> Result<Expr, ParseError> {
        let mut root = Vec::new();
        let mut frames: Vec<Frame> = Vec::new();
        let mut pending_parent: Option<Type> = None;

        for (idx, token) in self.tokens.iter().enumerate() {
            let location = token.location(&self.file);

            match &token.annotation {
                Annotation::ParentResolver { ty } => {
                    // A run of parent annotations belongs to whatever follows the run.
                    let target = self.tokens[idx + 1..]
                        .iter()
                        .map(|next| &next.annotation)
                        .find(|next| !matches!(next, Annotation::ParentResolver { .. }));
                    if let Some(Annotation::InjectableType { ty: declaration, .. }) = target {
                        if pending_parent.is_some() {
                            return Err(ParseError::DuplicateParent {
                                location,
                                declaration: declaration.to_string(),
                            });
                        }
                        pending_parent = Some(ty.clone());
                    } else {
                        enclosing(&mut frames, token, location.clone())?
                            .set_parent(ty.clone(), location)?;
                    }
                }
                Annotation::InjectableType { ty, access } => {
                    frames.push(Frame::Injectable(DeclarationBuilder::new(
                        ty.clone(),
                        *access,
                        pending_parent.take(),
                        location,
                    )));
                }
                Annotation::AnyDeclaration => frames.push(Frame::Any {
                    location,
                    hoisted: Vec::new(),
                }),
                Annotation::EndOfInjectableType => match frames.pop() {
                    Some(Frame::Injectable(builder)) => {
                        let declaration = builder.finish()?;
                        attach(&mut frames, &mut root, Expr::TypeDeclaration(declaration));
                    }
                    _ => return Err(unmatched_end(token, location)),
                },
                Annotation::EndOfAnyDeclaration => match frames.pop() {
                    Some(Frame::Any { hoisted, .. }) => {
                        for declaration in hoisted {
                            attach(&mut frames, &mut root, declaration);
                        }
                    }
                    _ => return Err(unmatched_end(token, location)),
                },
                Annotation::Register { name, ty } => {
                    enclosing(&mut frames, token, location.clone())?.register(name, ty, location)?;
                }
                Annotation::Scope { name, scope } => {
                    enclosing(&mut frames, token, location.clone())?
                        .scopes
                        .push((name.clone(), *scope, location));
                }
                Annotation::Reference { name, ty } => {
                    enclosing(&mut frames, token, location.clone())?
                        .children
                        .push(Expr::Reference(Reference {
                            name: name.clone(),
                            ty: ty.clone(),
                            location,
                        }));
                }
                Annotation::Configuration { key, value } => {
                    enclosing(&mut frames, token, location.clone())?
                        .children
                        .push(Expr::Configuration(Configuration {
                            key: key.clone(),
                            value: value.clone(),
                            location,
                        }));
                }
            }
        }

        if let Some(frame) = frames.last() {
            return Err(ParseError::UnclosedDeclaration {
                location: frame.location().clone(),
            });
        }

        let file = Expr::File {
            path: self.file.clone(),
            children: root,
        };
        tracing::debug!(
            file = %self.file.display(),
            declarations = file.type_declaration_count(),
            "parsed file"
        );
        Ok(file)
    }
}

/// Directives only make sense directly inside an injectable declaration.
fn enclosing<'f>(
    frames: &'f mut [Frame],
    token: &Token,
    location: Location,
) -> Result<&'f mut DeclarationBuilder, ParseError> {
    match frames.last_mut() {
        Some(Frame::Injectable(builder)) => Ok(builder),
        _ => Err(ParseError::OrphanAnnotation {
            location,
            token: token.annotation.kind_name().to_string(),
        }),
    }
}

fn attach(frames: &mut [Frame], root: &mut Vec<Expr>, declaration: Expr) {
    match frames.last_mut() {
        Some(Frame::Injectable(builder)) => builder.children.push(declaration),
        Some(Frame::Any { hoisted, .. }) => hoisted.push(declaration),
        None => root.push(declaration),
    }
}

fn unmatched_end(token: &Token, location: Location) -> ParseError {
    ParseError::UnmatchedEnd {
        location,
        token: token.annotation.kind_name().to_string(),
    }
}

/// @ai:intent Lex and parse one file's contents
/// @ai:effects pure
pub fn parse_source(contents: &str, path: &Path, marker: &str) -> Result<Expr, Error> {
    let tokens = Lexer::new(contents, path).with_marker(marker).tokenize()?;
    Ok(Parser::new(&tokens, path).parse()?)
}
