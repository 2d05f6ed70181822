//! @ai:module:intent CLI entry point for the weaver annotation compiler
//! @ai:module:layer presentation
//! @ai:module:public_api main
//! @ai:module:depends_on config, pipeline, lexer, output

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use weaver_codegen::config::CONFIG_FILE_NAME;
use weaver_codegen::{output, pipeline, Error, Lexer, OutputFormat, WeaverConfig};

#[derive(Parser)]
#[command(name = "weaver")]
#[command(author, version, about = "Weaver - dependency injection annotation compiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the configuration file
    #[arg(long, global = true, default_value = CONFIG_FILE_NAME)]
    config: PathBuf,

    /// Only log warnings and errors
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, short, global = true, value_enum, default_value = "text")]
    format: Format,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate annotations and the dependency graph
    Check {
        /// Files or directories to compile
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,

        /// Merge types declared in several places
        #[arg(long)]
        allow_augmentation: bool,

        /// Annotation marker word (overrides the configuration)
        #[arg(long)]
        marker: Option<String>,
    },

    /// Export the dependency graph as JSON
    Export {
        /// Files or directories to compile
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,

        /// Export the validated graph with reference bindings
        #[arg(long)]
        validated: bool,
    },

    /// Show the token stream of a single file
    Tokens {
        /// Path to file
        path: PathBuf,
    },

    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    JsonPretty,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
            Format::JsonPretty => OutputFormat::JsonPretty,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

fn init_tracing(quiet: bool) {
    let level = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("weaver_codegen={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn init(path: &Path, force: bool) -> weaver_codegen::Result<ExitCode> {
    if path.exists() && !force {
        eprintln!("{} already exists, use --force to overwrite", path.display());
        return Ok(ExitCode::from(2));
    }
    WeaverConfig::default().save(path)?;
    tracing::info!("Wrote {}", path.display());
    Ok(ExitCode::SUCCESS)
}

fn run(cli: Cli) -> weaver_codegen::Result<ExitCode> {
    let format = OutputFormat::from(cli.format);
    if let Commands::Init { force } = cli.command {
        return init(&cli.config, force);
    }
    let mut config = WeaverConfig::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Check {
            paths,
            allow_augmentation,
            marker,
        } => {
            config.link.allow_augmentation |= allow_augmentation;
            if let Some(marker) = marker {
                config.annotations.marker = marker;
            }

            let report = match pipeline::compile(&paths, &config) {
                Ok(compilation) => output::CheckReport::from_compilation(&compilation),
                Err(e) if e.is_validation() => output::CheckReport::from_error(&e),
                Err(e) => return Err(e),
            };

            println!("{}", output::format_check_report(&report, format)?);
            Ok(exit_code(report.passed()))
        }

        Commands::Export {
            paths,
            pretty,
            validated,
        } => {
            let exported = match pipeline::export(&paths, &config, validated) {
                Ok(exported) => exported,
                Err(e) if e.is_validation() => return report_failure(&e, format),
                Err(e) => return Err(e),
            };

            let json = output::to_json(&exported, pretty)?;
            println!("{}", json);
            Ok(ExitCode::SUCCESS)
        }

        Commands::Tokens { path } => {
            let source = pipeline::read_source(&path)?;
            let tokens = Lexer::new(&source.contents, &source.path)
                .with_marker(&config.annotations.marker)
                .tokenize();

            match tokens {
                Ok(tokens) => {
                    println!("{}", output::format_tokens(&tokens, format)?);
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => report_failure(&Error::Lex(e), format),
            }
        }

        Commands::Init { force } => init(&cli.config, force),
    }
}

fn report_failure(error: &Error, format: OutputFormat) -> weaver_codegen::Result<ExitCode> {
    let report = output::CheckReport::from_error(error);
    eprintln!("{}", output::format_check_report(&report, format)?);
    Ok(exit_code(false))
}

fn exit_code(passed: bool) -> ExitCode {
    if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
