//! @ai:module:intent Format compiler results for the terminal (colored text) or machines (JSON)
//! @ai:module:layer infrastructure
//! @ai:module:public_api OutputFormat, CheckReport, format_check_report, format_tokens, to_json
//! @ai:module:depends_on inspector, pipeline, annotation
//! @ai:module:stateless true

use crate::annotation::{Annotation, Token};
use crate::error::{Error, Result};
use crate::inspector::{Diagnostic, Severity};
use crate::pipeline::Compilation;
use colored::Colorize;
use serde::Serialize;

/// @ai:intent Output format options
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    JsonPretty,
}

/// @ai:intent Summary of a `check` run, successful or not
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckReport {
    pub files_checked: Option<usize>,
    pub injectable_types: Option<usize>,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl CheckReport {
    pub fn from_compilation(compilation: &Compilation) -> Self {
        Self {
            files_checked: Some(compilation.files),
            injectable_types: Some(compilation.graph.injectable_types_count()),
            errors: Vec::new(),
            warnings: compilation
                .inspection
                .as_ref()
                .map(|inspection| inspection.warnings.clone())
                .unwrap_or_default(),
        }
    }

    /// @ai:pre error is a validation failure
    pub fn from_error(error: &Error) -> Self {
        let (errors, warnings): (Vec<Diagnostic>, Vec<Diagnostic>) = error
            .diagnostics()
            .into_iter()
            .partition(|diagnostic| diagnostic.severity == Severity::Error);
        Self {
            errors,
            warnings,
            ..Self::default()
        }
    }

    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }
}

/// @ai:intent Format a check report as a string
/// @ai:effects pure
pub fn format_check_report(report: &CheckReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(report, false),
        OutputFormat::JsonPretty => to_json(report, true),
        OutputFormat::Text => Ok(format_check_report_text(report)),
    }
}

fn format_check_report_text(report: &CheckReport) -> String {
    let mut output = String::new();

    for diagnostic in report.errors.iter().chain(&report.warnings) {
        output.push_str(&format_diagnostic(diagnostic));
    }

    if !report.errors.is_empty() || !report.warnings.is_empty() {
        output.push('\n');
    }

    if let (Some(files), Some(types)) = (report.files_checked, report.injectable_types) {
        output.push_str(&format!(
            "Checked {} files, {} injectable types\n",
            files, types
        ));
    }

    if !report.errors.is_empty() {
        output.push_str(&format!(
            "{} errors, {} warnings\n",
            report.errors.len().to_string().red().bold(),
            report.warnings.len().to_string().yellow()
        ));
    } else if !report.warnings.is_empty() {
        output.push_str(&format!(
            "{} {} warnings\n",
            "OK".green().bold(),
            report.warnings.len().to_string().yellow()
        ));
    } else {
        output.push_str(&format!("{} No issues found\n", "OK".green().bold()));
    }

    output
}

/// @ai:intent Render one diagnostic as a colored line plus optional hint
/// @ai:effects pure
pub fn format_diagnostic(diagnostic: &Diagnostic) -> String {
    let severity = match diagnostic.severity {
        Severity::Error => "ERROR".red().bold(),
        Severity::Warning => "WARN".yellow().bold(),
    };

    let mut output = format!(
        "{} {} - {} ({})\n",
        severity,
        diagnostic.location.to_string().dimmed(),
        diagnostic.message,
        diagnostic.code.dimmed()
    );

    if let Some(suggestion) = &diagnostic.suggestion {
        output.push_str(&format!("  {} {}\n", "hint:".cyan(), suggestion));
    }

    output
}

/// @ai:intent Dump a token stream, one token per line in text mode
/// @ai:effects pure
pub fn format_tokens(tokens: &[Token], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(&tokens, false),
        OutputFormat::JsonPretty => to_json(&tokens, true),
        OutputFormat::Text => Ok(format_tokens_text(tokens)),
    }
}

fn format_tokens_text(tokens: &[Token]) -> String {
    let mut output = String::new();
    let mut depth = 0usize;

    for token in tokens {
        if matches!(
            token.annotation,
            Annotation::EndOfInjectableType | Annotation::EndOfAnyDeclaration
        ) {
            depth = depth.saturating_sub(1);
        }

        output.push_str(&format!(
            "{:>4}:{:<6} {:>5}  {}{}\n",
            token.line,
            token.offset,
            token.length,
            "  ".repeat(depth),
            describe_token(&token.annotation)
        ));

        if matches!(
            token.annotation,
            Annotation::InjectableType { .. } | Annotation::AnyDeclaration
        ) {
            depth += 1;
        }
    }

    output.push_str(&format!("\n{} tokens\n", tokens.len()));
    output
}

fn describe_token(annotation: &Annotation) -> String {
    match annotation {
        Annotation::ParentResolver { ty } => format!("{} {}", "parent".cyan(), ty),
        Annotation::Register { name, ty } => format!("{} {} -> {}", "register".cyan(), name, ty),
        Annotation::Scope { name, scope } => format!("{} {}.scope = .{}", "scope".cyan(), name, scope),
        Annotation::Reference { name, ty } => format!("{} {} <- {}", "reference".cyan(), name, ty),
        Annotation::Configuration { key, value } => {
            format!("{} {} = {}", "configuration".cyan(), key, value)
        }
        Annotation::InjectableType { ty, access } => {
            format!("{} {} ({:?})", "injectable".green().bold(), ty.to_string().bold(), access)
        }
        Annotation::EndOfInjectableType => "end injectable".green().to_string(),
        Annotation::AnyDeclaration => "declaration".dimmed().to_string(),
        Annotation::EndOfAnyDeclaration => "end declaration".dimmed().to_string(),
    }
}

/// @ai:intent Format any serializable value as JSON
/// @ai:effects pure
pub fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::Location;
    use crate::error::InspectError;
    use crate::inspector::InspectFailure;
    use crate::lexer::Lexer;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_failed_report_lists_every_error() {
        plain();
        let error = Error::Inspect(InspectFailure {
            errors: vec![InspectError::DependencyNotFound {
                dependency: "api: API".to_string(),
                declaration: "Home".to_string(),
                location: Location::new("Home.swift", 4, 60, 24),
            }],
            warnings: vec![Diagnostic::warning(
                "W401",
                "Registration `logger: Logger` in `Home` is never referenced".to_string(),
                Location::new("Home.swift", 2, 20, 30),
            )],
        });

        let report = CheckReport::from_error(&error);
        let text = format_check_report(&report, OutputFormat::Text).unwrap();

        assert!(!report.passed());
        assert!(text.contains("ERROR Home.swift:4"));
        assert!(text.contains("(E402)"));
        assert!(text.contains("hint: Register it in this type or one of its parents with `// weaver: api -> API`"));
        assert_eq!(report.warnings.len(), 1);
        assert!(text.contains("WARN Home.swift:2"));
        assert!(text.contains("1 errors, 1 warnings"));
    }

    #[test]
    fn test_json_report_is_machine_readable() {
        let report = CheckReport {
            files_checked: Some(3),
            injectable_types: Some(2),
            errors: Vec::new(),
            warnings: vec![Diagnostic::warning(
                "W401",
                "Registration `x: X` in `A` is never referenced".to_string(),
                Location::new("A.swift", 1, 16, 18),
            )],
        };

        let json = format_check_report(&report, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["files_checked"], 3);
        assert_eq!(value["warnings"][0]["severity"], "warning");
        assert_eq!(value["warnings"][0]["location"]["line"], 1);
        assert!(report.passed());
    }

    #[test]
    fn test_token_dump_indents_nested_declarations() {
        plain();
        let source = "final class A {\n  // weaver: x -> X\n  func f() {\n  }\n}\n";
        let tokens = Lexer::new(source, "A.swift").tokenize().unwrap();

        let text = format_tokens(&tokens, OutputFormat::Text).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert!(lines[0].ends_with("injectable A (Internal)"));
        assert!(lines[1].ends_with("  register x -> X"));
        assert!(lines[2].ends_with("  declaration"));
        assert!(lines[3].ends_with("  end declaration"));
        assert!(lines[4].ends_with("end injectable"));
        assert!(text.ends_with("5 tokens\n"));
    }
}
