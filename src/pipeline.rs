//! @ai:module:intent Run the compiler front-end over files on disk: read, lex and parse, link, inspect
//! @ai:module:layer application
//! @ai:module:public_api SourceFile, Compilation, ExportedGraph, collect_paths, read_sources, parse_sources, compile, export
//! @ai:module:depends_on config, lexer, parser, linker, inspector
//! @ai:module:stateless true

use crate::ast::Expr;
use crate::config::WeaverConfig;
use crate::error::{Error, Result};
use crate::graph::{DependencyGraph, ValidatedGraph};
use crate::inspector::{Inspection, Inspector};
use crate::language::is_source_file;
use crate::linker::Linker;
use crate::parser::parse_source;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// @ai:intent One input file held in memory
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub contents: String,
}

/// @ai:intent Everything produced by one compiler run
#[derive(Debug, Clone, Serialize)]
pub struct Compilation {
    pub files: usize,
    pub graph: DependencyGraph,
    /// None when inspection is disabled in the configuration.
    pub inspection: Option<Inspection>,
}

/// @ai:intent Expand inputs into a sorted, deduplicated list of source files
/// @ai:pre every path exists
/// @ai:effects fs:read
pub fn collect_paths(inputs: &[PathBuf], extensions: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for input in inputs {
        if input.is_file() {
            paths.push(input.clone());
        } else if input.is_dir() {
            paths.extend(
                WalkDir::new(input)
                    .into_iter()
                    .filter_map(|e| e.ok())
                    .filter(|e| e.file_type().is_file())
                    .filter(|e| is_source_file(e.path(), extensions))
                    .map(|e| e.into_path()),
            );
        } else {
            return Err(Error::FileRead {
                path: input.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file or directory"),
            });
        }
    }

    paths.sort();
    paths.dedup();
    Ok(paths)
}

/// @ai:effects fs:read
pub fn read_sources(paths: &[PathBuf]) -> Result<Vec<SourceFile>> {
    paths
        .iter()
        .map(|path| {
            let contents = std::fs::read_to_string(path).map_err(|source| Error::FileRead {
                path: path.clone(),
                source,
            })?;
            Ok(SourceFile {
                path: path.clone(),
                contents,
            })
        })
        .collect()
}

/// @ai:intent Lex and parse every file, reporting all failing files at once
/// @ai:post Ok trees are in input order
/// @ai:effects pure
pub fn parse_sources(sources: &[SourceFile], marker: &str, parallel: bool) -> Result<Vec<Expr>> {
    let parse_one = |source: &SourceFile| {
        tracing::debug!("Parsing {}", source.path.display());
        parse_source(&source.contents, &source.path, marker)
    };

    let results: Vec<Result<Expr>> = if parallel {
        sources.par_iter().map(parse_one).collect()
    } else {
        sources.iter().map(parse_one).collect()
    };

    let mut files = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(file) => files.push(file),
            Err(e) => failures.push(e),
        }
    }

    match failures.len() {
        0 => Ok(files),
        1 => Err(failures.remove(0)),
        _ => Err(Error::Sources(failures)),
    }
}

/// @ai:intent Graph written by `export`: linked only, or also bound and checked
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ExportedGraph {
    Linked(DependencyGraph),
    Validated(ValidatedGraph),
}

fn load_inputs(inputs: &[PathBuf], config: &WeaverConfig) -> Result<Vec<SourceFile>> {
    let paths = collect_paths(inputs, &config.input.extensions)?;
    tracing::info!("Found {} source files", paths.len());
    read_sources(&paths)
}

/// @ai:intent Full front-end run over paths on disk
/// @ai:effects fs:read
pub fn compile(inputs: &[PathBuf], config: &WeaverConfig) -> Result<Compilation> {
    let sources = load_inputs(inputs, config)?;
    compile_sources(&sources, config)
}

/// @ai:intent Build the graph to export; inspection runs only for the validated form
/// @ai:effects fs:read
pub fn export(inputs: &[PathBuf], config: &WeaverConfig, validated: bool) -> Result<ExportedGraph> {
    let sources = load_inputs(inputs, config)?;
    export_sources(&sources, config, validated)
}

/// @ai:effects pure
pub fn export_sources(
    sources: &[SourceFile],
    config: &WeaverConfig,
    validated: bool,
) -> Result<ExportedGraph> {
    let mut config = config.clone();
    config.inspect.enabled = validated;

    let compilation = compile_sources(sources, &config)?;
    Ok(match compilation.inspection {
        Some(inspection) => ExportedGraph::Validated(inspection.graph),
        None => ExportedGraph::Linked(compilation.graph),
    })
}

/// @ai:intent Front-end run over sources already in memory
/// @ai:effects pure
pub fn compile_sources(sources: &[SourceFile], config: &WeaverConfig) -> Result<Compilation> {
    let files = parse_sources(sources, &config.annotations.marker, config.input.parallel)?;

    let graph = Linker::new(config.link_options()).link(&files)?;
    tracing::info!("Linked {} injectable types", graph.injectable_types_count());

    let inspection = if config.inspect.enabled {
        let inspection = Inspector::new(&graph, config.inspect_options())
            .inspect()
            .map_err(Error::Inspect)?;
        tracing::info!(
            "Inspection passed with {} warnings",
            inspection.warnings.len()
        );
        Some(inspection)
    } else {
        tracing::info!("Inspection disabled");
        None
    };

    Ok(Compilation {
        files: sources.len(),
        graph,
        inspection,
    })
}

/// @ai:intent Source file for a single path, for commands working on one file
/// @ai:effects fs:read
pub fn read_source(path: &Path) -> Result<SourceFile> {
    read_sources(&[path.to_path_buf()]).map(|mut sources| sources.remove(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InspectError;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_collect_paths_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "b/Second.swift", "");
        write(dir.path(), "a/First.swift", "");
        write(dir.path(), "a/Notes.md", "");
        let explicit = write(dir.path(), "Script.sh", "");

        let paths = collect_paths(
            &[dir.path().to_path_buf(), explicit.clone()],
            &["swift".to_string()],
        )
        .unwrap();

        assert_eq!(
            paths,
            vec![
                explicit,
                dir.path().join("a/First.swift"),
                dir.path().join("b/Second.swift"),
            ]
        );
    }

    #[test]
    fn test_missing_input_is_a_read_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("Missing.swift");
        assert!(matches!(
            collect_paths(&[missing], &["swift".to_string()]),
            Err(Error::FileRead { .. })
        ));
    }

    #[test]
    fn test_compile_directory() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "Root.swift",
            "final class Root {\n  // weaver: api -> API\n}\n",
        );
        write(
            dir.path(),
            "Feature/Child.swift",
            "// weaver: parent = Root\nfinal class Child {\n  // weaver: api <- API\n}\n",
        );

        let compilation = compile(&[dir.path().to_path_buf()], &WeaverConfig::default()).unwrap();

        assert_eq!(compilation.files, 2);
        assert_eq!(compilation.graph.injectable_types_count(), 2);
        let inspection = compilation.inspection.unwrap();
        let child = inspection.graph.get("Child").unwrap();
        assert_eq!(child.references[0].binding.resolver, "Root");
        assert!(inspection.warnings.is_empty());
    }

    #[test]
    fn test_every_failing_file_is_reported() {
        let sources = vec![
            SourceFile {
                path: "A.swift".into(),
                contents: "class A {\n  // weaver: api -> \n}\n".to_string(),
            },
            SourceFile {
                path: "B.swift".into(),
                contents: "class B {\n  // weaver: api -> API\n}\n".to_string(),
            },
            SourceFile {
                path: "C.swift".into(),
                contents: "class C {\n  // weaver: api.scope = .forever\n  // weaver: api -> API\n}\n"
                    .to_string(),
            },
        ];

        for parallel in [false, true] {
            match parse_sources(&sources, "weaver", parallel) {
                Err(Error::Sources(errors)) => {
                    let files: Vec<_> = errors
                        .iter()
                        .flat_map(Error::diagnostics)
                        .map(|d| d.location.file)
                        .collect();
                    assert_eq!(files, vec![PathBuf::from("A.swift"), PathBuf::from("C.swift")]);
                }
                other => panic!("unexpected result: {other:?}"),
            }
        }
    }

    #[test]
    fn test_inspection_errors_are_collected() {
        let sources = vec![SourceFile {
            path: "A.swift".into(),
            contents: "class A {\n  // weaver: x <- X\n  // weaver: y <- Y\n}\n".to_string(),
        }];

        match compile_sources(&sources, &WeaverConfig::default()) {
            Err(Error::Inspect(failure)) => {
                assert_eq!(failure.errors.len(), 2);
                assert!(failure
                    .errors
                    .iter()
                    .all(|e| matches!(e, InspectError::DependencyNotFound { .. })));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_inspection_can_be_disabled() {
        let sources = vec![SourceFile {
            path: "A.swift".into(),
            contents: "class A {\n  // weaver: x <- X\n}\n".to_string(),
        }];
        let mut config = WeaverConfig::default();
        config.inspect.enabled = false;

        let compilation = compile_sources(&sources, &config).unwrap();

        assert!(compilation.inspection.is_none());
        assert_eq!(compilation.graph.len(), 1);
    }

    #[test]
    fn test_exported_graph_reads_back_unchanged() {
        let sources = vec![SourceFile {
            path: "Root.swift".into(),
            contents: "public final class Root {\n  // weaver: cache -> Cache<String>?\n  // weaver: cache.scope = .weak\n  // weaver: name = root\n  final class Child {\n    // weaver: cache <- Cache<String>?\n  }\n}\n"
                .to_string(),
        }];

        let compilation = compile_sources(&sources, &WeaverConfig::default()).unwrap();
        let validated = compilation.inspection.unwrap().graph;

        let json = serde_json::to_string(&compilation.graph).unwrap();
        assert_eq!(serde_json::from_str::<DependencyGraph>(&json).unwrap(), compilation.graph);

        let json = serde_json::to_string(&validated).unwrap();
        let restored: crate::graph::ValidatedGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, validated);
        assert_eq!(restored.get("Child").unwrap().references[0].binding.resolver, "Root");
    }

    #[test]
    fn test_export_links_without_inspecting() {
        let sources = vec![SourceFile {
            path: "A.swift".into(),
            contents: "class A {\n  // weaver: x <- X\n}\n".to_string(),
        }];
        let mut config = WeaverConfig::default();
        config.inspect.enabled = true;

        match export_sources(&sources, &config, false).unwrap() {
            ExportedGraph::Linked(graph) => assert_eq!(graph.get("A").unwrap().references.len(), 1),
            other => panic!("unexpected export: {other:?}"),
        }

        config.inspect.enabled = false;
        assert!(matches!(
            export_sources(&sources, &config, true),
            Err(Error::Inspect(_))
        ));
    }
}
