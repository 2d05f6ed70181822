//! @ai:module:intent Weaver annotation compiler front-end: tokens, syntax trees, dependency graph, validation
//! @ai:module:layer infrastructure
//! @ai:module:public_api lexer, parser, linker, inspector, pipeline, config, output, error
//! @ai:module:stateless true
//!
//! # Weaver
//!
//! Reads dependency-injection annotations written in source comments
//! (`// weaver: api -> APIProtocol`), builds a cross-file dependency graph
//! and checks that every declared dependency can be resolved before code is
//! generated.
//!
//! ## Example
//!
//! ```rust,no_run
//! use weaver_codegen::{output, pipeline, WeaverConfig};
//! use std::path::PathBuf;
//!
//! let config = WeaverConfig::default();
//! let compilation = pipeline::compile(&[PathBuf::from("Sources")], &config).unwrap();
//!
//! let graph = &compilation.inspection.unwrap().graph;
//! println!("{}", output::to_json(graph, true).unwrap());
//! ```

pub mod annotation;
pub mod ast;
pub mod config;
pub mod error;
pub mod graph;
pub mod inspector;
pub mod language;
pub mod lexer;
pub mod linker;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod scope;
pub mod types;

pub use annotation::{AccessLevel, Annotation, Location, Token};
pub use ast::{Configuration, Expr, Reference, Register, TypeDeclaration};
pub use config::WeaverConfig;
pub use error::{Error, InspectError, LexError, LinkError, ParseError, Result};
pub use graph::{
    Binding, BoundReference, DependencyGraph, ParentLink, Resolver, ValidatedGraph,
    ValidatedResolver,
};
pub use inspector::{Diagnostic, InspectFailure, InspectOptions, Inspection, Inspector, Severity};
pub use lexer::Lexer;
pub use linker::{link, LinkOptions, Linker};
pub use output::{format_check_report, format_tokens, to_json, CheckReport, OutputFormat};
pub use parser::{parse_source, Parser};
pub use pipeline::{compile, export, Compilation, ExportedGraph, SourceFile};
pub use scope::Scope;
pub use types::{Type, TypeIndex};
