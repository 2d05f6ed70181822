//! @ai:module:intent Scan one source file into an ordered stream of located annotation tokens
//! @ai:module:layer application
//! @ai:module:public_api Lexer, DEFAULT_MARKER
//! @ai:module:depends_on annotation, language, types, scope, error
//! @ai:module:stateless true

use crate::annotation::{AccessLevel, Annotation, Location, Token};
use crate::error::LexError;
use crate::language::{is_member_keyword, is_public_modifier, is_statement_keyword, DeclarationKind};
use crate::scope::Scope;
use crate::types::Type;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Word that introduces an annotation comment, as in `// weaver: api -> API`.
pub const DEFAULT_MARKER: &str = "weaver";

static PARENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^parent\s*=\s*(.+)$").expect("Invalid regex"));
static SCOPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)\.scope\s*=\s*(.*)$").expect("Invalid regex"));
static REGISTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)\s*->\s*(.+)$").expect("Invalid regex"));
static REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)\s*<-\s*(.+)$").expect("Invalid regex"));
static CONFIGURATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+(?:\.\w+)?)\s*=\s*(.+)$").expect("Invalid regex"));

/// @ai:intent Tokenizer for a single file's text
pub struct Lexer<'a> {
    source: &'a str,
    file: PathBuf,
    marker: String,
}

/// A declaration keyword whose body has not been opened yet.
#[derive(Debug, Clone)]
struct Pending {
    kind: DeclarationKind,
    name: Option<String>,
    generics: Vec<String>,
    access: AccessLevel,
    offset: usize,
    line: usize,
}

#[derive(Debug, Clone)]
struct Declaration {
    pending: Pending,
    length: usize,
}

#[derive(Debug, Clone, Copy)]
struct Brace {
    offset: usize,
    line: usize,
    declaration: Option<usize>,
}

#[derive(Debug, Clone)]
enum Event<'s> {
    Comment {
        offset: usize,
        length: usize,
        line: usize,
        content: &'s str,
        directive: &'s str,
    },
    Open {
        declaration: usize,
        offset: usize,
    },
    Close {
        declaration: usize,
        offset: usize,
        line: usize,
    },
}

impl Event<'_> {
    fn offset(&self) -> usize {
        match self {
            Event::Comment { offset, .. }
            | Event::Open { offset, .. }
            | Event::Close { offset, .. } => *offset,
        }
    }
}

impl Declaration {
    fn is_injectable_candidate(&self) -> bool {
        self.pending.kind.is_type_like() && self.pending.name.is_some()
    }
}

impl<'a> Lexer<'a> {
    /// @ai:intent Create a lexer over a file's contents using the default marker
    pub fn new(source: &'a str, file: impl Into<PathBuf>) -> Self {
        Self {
            source,
            file: file.into(),
            marker: format!("{}:", DEFAULT_MARKER),
        }
    }

    /// @ai:intent Use a different annotation marker word
    pub fn with_marker(mut self, marker: &str) -> Self {
        self.marker = format!("{}:", marker);
        self
    }

    /// @ai:intent Produce the file's tokens in source order
    /// @ai:post token offsets index into the original text; lines are 0-based
    /// @ai:effects pure
    pub fn tokenize(&self) -> Result<Vec<Token>, LexError> {
        let scanner = Scanner::new(self.source, &self.file, &self.marker);
        let (mut events, declarations) = scanner.scan()?;
        events.sort_by_key(Event::offset);

        let annotations = events
            .iter()
            .map(|event| match event {
                Event::Comment {
                    offset,
                    length,
                    line,
                    content,
                    directive,
                } => {
                    let location = Location::new(&self.file, *line, *offset, *length);
                    classify(directive, content, location).map(Some)
                }
                Event::Open { .. } | Event::Close { .. } => Ok(None),
            })
            .collect::<Result<Vec<_>, LexError>>()?;

        let injectable = mark_injectable(&events, &annotations, &declarations);

        let mut tokens = Vec::with_capacity(events.len());
        for (event, annotation) in events.iter().zip(annotations) {
            let token = match event {
                Event::Comment {
                    offset,
                    length,
                    line,
                    ..
                } => match annotation {
                    Some(annotation) => Token::new(annotation, *offset, *length, *line),
                    None => continue,
                },
                Event::Open { declaration, .. } => {
                    let Declaration { pending, length } = &declarations[*declaration];
                    let annotation = match (&pending.name, injectable[*declaration]) {
                        (Some(name), true) => Annotation::InjectableType {
                            ty: Type::new(name.clone(), pending.generics.clone(), false),
                            access: pending.access,
                        },
                        _ => Annotation::AnyDeclaration,
                    };
                    Token::new(annotation, pending.offset, *length, pending.line)
                }
                Event::Close {
                    declaration,
                    offset,
                    line,
                } => {
                    let annotation = if injectable[*declaration] {
                        Annotation::EndOfInjectableType
                    } else {
                        Annotation::EndOfAnyDeclaration
                    };
                    Token::new(annotation, *offset, 1, *line)
                }
            };
            tokens.push(token);
        }

        tracing::debug!(
            file = %self.file.display(),
            tokens = tokens.len(),
            "tokenized file"
        );

        Ok(tokens)
    }
}

/// @ai:intent Turn one annotation directive into its token payload
/// @ai:effects pure
fn classify(directive: &str, content: &str, location: Location) -> Result<Annotation, LexError> {
    if let Some(captures) = PARENT.captures(directive) {
        let ty = parse_type(&captures[1], &location)?;
        return Ok(Annotation::ParentResolver { ty });
    }

    if let Some(captures) = SCOPE.captures(directive) {
        let value = captures[2].trim();
        let scope = value
            .strip_prefix('.')
            .ok_or_else(|| value.to_string())
            .and_then(|identifier| identifier.parse::<Scope>())
            .map_err(|scope| LexError::InvalidScope {
                location: location.clone(),
                scope,
            })?;
        return Ok(Annotation::Scope {
            name: captures[1].to_string(),
            scope,
        });
    }

    if let Some(captures) = REGISTER.captures(directive) {
        let ty = parse_type(&captures[2], &location)?;
        return Ok(Annotation::Register {
            name: captures[1].to_string(),
            ty,
        });
    }

    if let Some(captures) = REFERENCE.captures(directive) {
        let ty = parse_type(&captures[2], &location)?;
        return Ok(Annotation::Reference {
            name: captures[1].to_string(),
            ty,
        });
    }

    if let Some(captures) = CONFIGURATION.captures(directive) {
        return Ok(Annotation::Configuration {
            key: captures[1].to_string(),
            value: captures[2].trim().to_string(),
        });
    }

    Err(LexError::InvalidAnnotation {
        location,
        content: content.to_string(),
    })
}

fn parse_type(input: &str, location: &Location) -> Result<Type, LexError> {
    Type::parse(input).ok_or_else(|| LexError::InvalidType {
        location: location.clone(),
        ty: input.trim().to_string(),
    })
}

/// A type-like declaration is injectable when an annotation sits directly in its
/// body, or when a `parent` annotation immediately precedes it.
fn mark_injectable(
    events: &[Event<'_>],
    annotations: &[Option<Annotation>],
    declarations: &[Declaration],
) -> Vec<bool> {
    let mut injectable = vec![false; declarations.len()];
    let mut open: Vec<usize> = Vec::new();

    for (idx, event) in events.iter().enumerate() {
        match event {
            Event::Open { declaration, .. } => open.push(*declaration),
            Event::Close { .. } => {
                open.pop();
            }
            Event::Comment { .. } => {
                if matches!(annotations[idx], Some(Annotation::ParentResolver { .. })) {
                    if let Some(Event::Open { declaration, .. }) = events.get(idx + 1) {
                        if declarations[*declaration].is_injectable_candidate() {
                            injectable[*declaration] = true;
                            continue;
                        }
                    }
                }

                if let Some(&enclosing) = open.last() {
                    if declarations[enclosing].is_injectable_candidate() {
                        injectable[enclosing] = true;
                    }
                }
            }
        }
    }

    injectable
}

/// Byte-level scanner locating annotation comments and declaration bodies.
struct Scanner<'s> {
    src: &'s str,
    bytes: &'s [u8],
    file: &'s Path,
    marker: &'s str,
    pos: usize,
    line: usize,
    events: Vec<Event<'s>>,
    declarations: Vec<Declaration>,
    braces: Vec<Brace>,
    pending: Option<Pending>,
    /// Words seen since the last statement boundary; holds declaration modifiers.
    statement_words: Vec<&'s str>,
    previous: Option<u8>,
}

impl<'s> Scanner<'s> {
    fn new(src: &'s str, file: &'s Path, marker: &'s str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            file,
            marker,
            pos: 0,
            line: 0,
            events: Vec::new(),
            declarations: Vec::new(),
            braces: Vec::new(),
            pending: None,
            statement_words: Vec::new(),
            previous: None,
        }
    }

    fn scan(mut self) -> Result<(Vec<Event<'s>>, Vec<Declaration>), LexError> {
        while let Some(&byte) = self.bytes.get(self.pos) {
            match byte {
                b'\n' => {
                    self.line += 1;
                    self.pos += 1;
                    self.statement_words.clear();
                }
                b'/' if self.peek(1) == Some(b'/') => self.line_comment(),
                b'/' if self.peek(1) == Some(b'*') => self.block_comment(),
                b'"' => self.string_literal(),
                b'{' => self.open_brace(),
                b'}' => self.close_brace()?,
                b';' => {
                    self.pending = None;
                    self.statement_words.clear();
                    self.previous = Some(byte);
                    self.pos += 1;
                }
                b if is_identifier_start(b) => self.word(),
                b => {
                    if !b.is_ascii_whitespace() {
                        self.previous = Some(b);
                    }
                    self.pos += 1;
                }
            }
        }

        if let Some(brace) = self.braces.last() {
            return Err(LexError::UnbalancedNesting {
                location: Location::new(self.file, brace.line, brace.offset, 1),
                message: "`{` is never closed".to_string(),
            });
        }

        Ok((self.events, self.declarations))
    }

    fn peek(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn end_of_line(&self, from: usize) -> usize {
        self.bytes[from..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|idx| from + idx)
            .unwrap_or(self.bytes.len())
    }

    fn line_comment(&mut self) {
        let start = self.pos;
        let end = self.end_of_line(start);
        let src = self.src;
        let content = src[start..end].trim_start_matches('/').trim();

        if let Some(directive) = content.strip_prefix(self.marker) {
            let length = end - start + usize::from(end < self.bytes.len());
            self.events.push(Event::Comment {
                offset: start,
                length,
                line: self.line,
                content,
                directive: directive.trim(),
            });
        }

        self.pos = end;
    }

    fn block_comment(&mut self) {
        let mut depth = 0usize;
        while self.pos < self.bytes.len() {
            match (self.bytes[self.pos], self.peek(1)) {
                (b'/', Some(b'*')) => {
                    depth += 1;
                    self.pos += 2;
                }
                (b'*', Some(b'/')) => {
                    depth -= 1;
                    self.pos += 2;
                    if depth == 0 {
                        return;
                    }
                }
                (b'\n', _) => {
                    self.line += 1;
                    self.pos += 1;
                }
                _ => self.pos += 1,
            }
        }
    }

    fn string_literal(&mut self) {
        self.previous = Some(b'"');

        if self.bytes[self.pos..].starts_with(b"\"\"\"") {
            self.pos += 3;
            while self.pos < self.bytes.len() {
                if self.bytes[self.pos..].starts_with(b"\"\"\"") {
                    self.pos += 3;
                    return;
                }
                if self.bytes[self.pos] == b'\n' {
                    self.line += 1;
                }
                self.pos += 1;
            }
            return;
        }

        self.pos += 1;
        while let Some(&byte) = self.bytes.get(self.pos) {
            match byte {
                b'\\' => self.pos += 2,
                b'"' => {
                    self.pos += 1;
                    return;
                }
                b'\n' => return,
                _ => self.pos += 1,
            }
        }
    }

    fn read_identifier(&mut self) -> &'s str {
        let start = self.pos;
        while self
            .bytes
            .get(self.pos)
            .is_some_and(|&b| is_identifier_continue(b))
        {
            self.pos += 1;
        }
        let src = self.src;
        &src[start..self.pos]
    }

    fn skip_blanks(&mut self) {
        while matches!(self.peek(0), Some(b' ' | b'\t')) {
            self.pos += 1;
        }
    }

    /// Next identifier on the same line, without consuming it.
    fn peek_word(&self) -> Option<&'s str> {
        let mut pos = self.pos;
        while matches!(self.bytes.get(pos), Some(b' ' | b'\t')) {
            pos += 1;
        }
        let start = pos;
        while self.bytes.get(pos).is_some_and(|&b| is_identifier_continue(b)) {
            pos += 1;
        }
        let src = self.src;
        let word = &src[start..pos];
        (!word.is_empty() && is_identifier_start(self.bytes[start])).then_some(word)
    }

    fn word(&mut self) {
        let start = self.pos;
        let word = self.read_identifier();
        let member_access = self.previous == Some(b'.');
        self.previous = Some(b'a');

        if member_access {
            return;
        }

        if is_statement_keyword(word) {
            self.pending = None;
            self.statement_words.push(word);
            return;
        }

        let Some(kind) = DeclarationKind::from_keyword(word) else {
            self.statement_words.push(word);
            return;
        };

        let is_modifier = kind == DeclarationKind::Class
            && self.peek_word().map_or(true, is_member_keyword);
        if is_modifier || self.statement_words.contains(&"import") {
            self.statement_words.push(word);
            return;
        }

        let access = if self.statement_words.iter().any(|w| is_public_modifier(w)) {
            AccessLevel::Public
        } else {
            AccessLevel::Internal
        };
        let line = self.line;
        let (name, generics) = if kind.has_name() {
            self.read_declared_name(kind)
        } else {
            (Some(word.to_string()), Vec::new())
        };

        self.statement_words.push(word);
        self.pending = Some(Pending {
            kind,
            name,
            generics,
            access,
            offset: start,
            line,
        });
    }

    /// Reads `Name`, `Outer.Name` or `Name<T: Constraint, U>` after a declaration keyword.
    fn read_declared_name(&mut self, kind: DeclarationKind) -> (Option<String>, Vec<String>) {
        self.skip_blanks();

        let name = if self.peek(0).is_some_and(is_identifier_start) {
            let start = self.pos;
            while self
                .peek(0)
                .is_some_and(|b| is_identifier_continue(b) || b == b'.')
            {
                self.pos += 1;
            }
            self.src[start..self.pos].to_string()
        } else {
            // Operator functions such as `func ==(lhs:rhs:)`.
            let start = self.pos;
            while self
                .peek(0)
                .is_some_and(|b| !matches!(b, b'(' | b'<' | b'{' | b' ' | b'\t' | b'\n'))
            {
                self.pos += 1;
            }
            self.src[start..self.pos].to_string()
        };

        if name.is_empty() {
            return (None, Vec::new());
        }

        let mut generics = Vec::new();
        if kind.is_type_like() && self.peek(0) == Some(b'<') {
            let start = self.pos + 1;
            let mut depth = 0usize;
            while let Some(byte) = self.peek(0) {
                match byte {
                    b'<' => depth += 1,
                    b'>' => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    b'{' | b'\n' => break,
                    _ => {}
                }
                self.pos += 1;
            }
            generics = split_generic_parameters(&self.src[start..self.pos]);
            if self.peek(0) == Some(b'>') {
                self.pos += 1;
            }
        }

        self.previous = Some(b'a');
        (Some(name), generics)
    }

    fn open_brace(&mut self) {
        let declaration = self.pending.take().map(|pending| {
            let idx = self.declarations.len();
            self.events.push(Event::Open {
                declaration: idx,
                offset: pending.offset,
            });
            self.declarations.push(Declaration { pending, length: 0 });
            idx
        });

        self.braces.push(Brace {
            offset: self.pos,
            line: self.line,
            declaration,
        });
        self.statement_words.clear();
        self.previous = Some(b'{');
        self.pos += 1;
    }

    fn close_brace(&mut self) -> Result<(), LexError> {
        let brace = self.braces.pop().ok_or_else(|| LexError::UnbalancedNesting {
            location: Location::new(self.file, self.line, self.pos, 1),
            message: "`}` has no matching `{`".to_string(),
        })?;

        if let Some(idx) = brace.declaration {
            let declaration = &mut self.declarations[idx];
            declaration.length = self.pos + 1 - declaration.pending.offset;
            self.events.push(Event::Close {
                declaration: idx,
                offset: self.pos,
                line: self.line,
            });
        }

        self.pending = None;
        self.statement_words.clear();
        self.previous = Some(b'}');
        self.pos += 1;
        Ok(())
    }
}

/// `T: Equatable, U` -> `["T", "U"]`
fn split_generic_parameters(clause: &str) -> Vec<String> {
    clause
        .split(',')
        .map(|parameter| parameter.split(':').next().unwrap_or_default().trim().to_string())
        .filter(|parameter| !parameter.is_empty())
        .collect()
}

fn is_identifier_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_'
}

fn is_identifier_continue(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
        Lexer::new(source, "Test.swift").tokenize()
    }

    const SERVICE: &str = "// weaver: parent = MainDependencyResolver
// regular comment
final class MyService {
  let dependencies: DependencyResolver

  // weaver: api -> APIProtocol
  // weaver: api.scope = .container

  // weaver: router -> RouterProtocol
  // weaver: router.scope = .weak

  // weaver: parent = MyServiceDependencyResolver
  final class MyEmbeddedService {

    // weaver: session -> SessionProtocol?
    // weaver: session.scope = .transient
  }

  init(_ dependencies: DependencyResolver) {
    self.dependencies = dependencies
  }

  func doSomething() {
    router.redirect { result in print(result) }
  }
}
";

    #[test]
    fn test_tokenize_should_provide_a_full_token_list() {
        let tokens = tokenize(SERVICE).unwrap();

        let expected = vec![
            Token::new(
                Annotation::ParentResolver {
                    ty: Type::named("MainDependencyResolver"),
                },
                0,
                43,
                0,
            ),
            Token::new(
                Annotation::InjectableType {
                    ty: Type::named("MyService"),
                    access: AccessLevel::Internal,
                },
                68,
                538,
                2,
            ),
            Token::new(
                Annotation::Register {
                    name: "api".to_string(),
                    ty: Type::named("APIProtocol"),
                },
                128,
                30,
                5,
            ),
            Token::new(
                Annotation::Scope {
                    name: "api".to_string(),
                    scope: Scope::Container,
                },
                160,
                34,
                6,
            ),
            Token::new(
                Annotation::Register {
                    name: "router".to_string(),
                    ty: Type::named("RouterProtocol"),
                },
                197,
                36,
                8,
            ),
            Token::new(
                Annotation::Scope {
                    name: "router".to_string(),
                    scope: Scope::Weak,
                },
                235,
                32,
                9,
            ),
            Token::new(
                Annotation::ParentResolver {
                    ty: Type::named("MyServiceDependencyResolver"),
                },
                270,
                48,
                11,
            ),
            Token::new(
                Annotation::InjectableType {
                    ty: Type::named("MyEmbeddedService"),
                    access: AccessLevel::Internal,
                },
                326,
                115,
                12,
            ),
            Token::new(
                Annotation::Register {
                    name: "session".to_string(),
                    ty: Type::new("SessionProtocol", Vec::new(), true),
                },
                357,
                39,
                14,
            ),
            Token::new(
                Annotation::Scope {
                    name: "session".to_string(),
                    scope: Scope::Transient,
                },
                400,
                38,
                15,
            ),
            Token::new(Annotation::EndOfInjectableType, 440, 1, 16),
            Token::new(Annotation::AnyDeclaration, 445, 83, 18),
            Token::new(Annotation::EndOfAnyDeclaration, 527, 1, 20),
            Token::new(Annotation::AnyDeclaration, 532, 72, 22),
            Token::new(Annotation::EndOfAnyDeclaration, 603, 1, 24),
            Token::new(Annotation::EndOfInjectableType, 605, 1, 25),
        ];

        assert_eq!(tokens.len(), 16);
        assert_eq!(tokens, expected);
    }

    #[test]
    fn test_tokenizer_should_throw_an_error_with_the_right_line_and_content_on_a_register_rule() {
        let source = "// weaver: parent = MainDependencyResolver
final class MyService {
  let dependencies: DependencyResolver

  // weaver: api --> APIProtocol
  // weaver: api.scope = .container

  init(_ dependencies: DependencyResolver) {
    self.dependencies = dependencies
  }
}
";
        match tokenize(source) {
            Err(LexError::InvalidAnnotation { location, content }) => {
                assert_eq!(location.line, 4);
                assert_eq!(content, "weaver: api --> APIProtocol");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_tokenizer_should_throw_an_error_with_the_right_line_and_content_on_a_scope_rule() {
        let source = "// weaver: parent = MainDependencyResolver
final class MyService {
  let dependencies: DependencyResolver

  // weaver: api -> APIProtocol
  // weaver: api.scope = .thisScopeDoesNotExists

  init(_ dependencies: DependencyResolver) {
    self.dependencies = dependencies
  }
}
";
        match tokenize(source) {
            Err(LexError::InvalidScope { location, scope }) => {
                assert_eq!(location.line, 5);
                assert_eq!(scope, "thisScopeDoesNotExists");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_type_in_register() {
        let source = "class A {\n  // weaver: api -> API<\n}\n";
        match tokenize(source) {
            Err(LexError::InvalidType { location, ty }) => {
                assert_eq!(location.line, 1);
                assert_eq!(ty, "API<");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_deeply_nested_type_is_invalid() {
        let ty = format!("{}API{}", "[".repeat(4000), "]".repeat(4000));
        let source = format!("class A {{\n  // weaver: api -> {ty}\n}}\n");
        let err = tokenize(&source).unwrap_err();
        assert_eq!(err.code(), "E103");
        assert_eq!(err.location().line, 1);
    }

    #[test]
    fn test_unbalanced_closing_brace() {
        let err = tokenize("class A {\n}\n}\n").unwrap_err();
        assert!(matches!(err, LexError::UnbalancedNesting { ref location, .. } if location.line == 2));
    }

    #[test]
    fn test_unclosed_brace() {
        let err = tokenize("class A {\n  func f() {\n}\n").unwrap_err();
        assert!(matches!(err, LexError::UnbalancedNesting { ref location, .. } if location.line == 0));
    }

    #[test]
    fn test_reference_and_configuration() {
        let source = "public final class Home<T: Equatable> {\n  // weaver: self.isIsolated = true\n  // weaver: logger <- Logger\n}\n";
        let tokens = tokenize(source).unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.annotation.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                Annotation::InjectableType {
                    ty: Type::new("Home", vec!["T".to_string()], false),
                    access: AccessLevel::Public,
                },
                Annotation::Configuration {
                    key: "self.isIsolated".to_string(),
                    value: "true".to_string(),
                },
                Annotation::Reference {
                    name: "logger".to_string(),
                    ty: Type::named("Logger"),
                },
                Annotation::EndOfInjectableType,
            ]
        );
    }

    #[test]
    fn test_ignores_braces_and_markers_in_strings_and_block_comments() {
        let source = r#"struct Plain {
  let text = "} // weaver: nope -> Nope {"
  /* class Hidden { // weaver: nope -> Nope } */
  class func make() -> Plain { Plain() }
  var computed: Int { get { 1 } }
}
"#;
        let tokens = tokenize(source).unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.annotation.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                Annotation::AnyDeclaration,
                Annotation::AnyDeclaration,
                Annotation::EndOfAnyDeclaration,
                Annotation::EndOfAnyDeclaration,
            ]
        );
    }

    #[test]
    fn test_custom_marker() {
        let source = "class A {\n  // di: api -> API\n  // weaver: ignored -> Ignored\n}\n";
        let tokens = Lexer::new(source, "A.swift").with_marker("di").tokenize().unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(
            tokens[1].annotation,
            Annotation::Register {
                name: "api".to_string(),
                ty: Type::named("API"),
            }
        );
    }
}
