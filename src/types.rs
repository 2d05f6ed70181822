//! @ai:module:intent Parse and render type expressions found in annotations
//! @ai:module:layer domain
//! @ai:module:public_api Type, TypeIndex
//! @ai:module:stateless true

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static TYPE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*$").expect("Invalid regex")
});

/// Deepest generic or collection nesting accepted in a type expression.
pub const MAX_NESTING: usize = 64;

/// @ai:intent Representation of a host-language type written in an annotation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Type {
    pub name: String,
    pub generic_names: Vec<String>,
    pub is_optional: bool,
}

/// @ai:intent Lookup key that ignores generics: base name plus optionality
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeIndex(String);

impl Type {
    /// @ai:intent Build a type from its parts
    pub fn new(name: impl Into<String>, generic_names: Vec<String>, is_optional: bool) -> Self {
        Self {
            name: name.into(),
            generic_names,
            is_optional,
        }
    }

    /// @ai:intent Build a non-optional, non-generic type
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new(), false)
    }

    /// @ai:intent Parse a type string; None when the string is not a type
    /// @ai:example ("Foo") -> Some(Foo)
    /// @ai:example ("Foo<A, B>?") -> Some(optional Foo with generics A, B)
    /// @ai:example ("[String: Int]") -> Some(Dictionary<String, Int>)
    /// @ai:example ("Foo<") -> None
    /// @ai:post None when nesting exceeds MAX_NESTING
    /// @ai:effects pure
    pub fn parse(input: &str) -> Option<Type> {
        parse_nested(input, 0)
    }

    /// @ai:intent Key used to match declarations regardless of generic spelling
    pub fn index(&self) -> TypeIndex {
        TypeIndex(format!("{}{}", self.name, if self.is_optional { "?" } else { "" }))
    }

    /// @ai:intent Generic clause as written in generated code, empty when not generic
    pub fn generics(&self) -> String {
        if self.generic_names.is_empty() {
            String::new()
        } else {
            format!("<{}>", self.generic_names.join(", "))
        }
    }
}

fn parse_nested(input: &str, depth: usize) -> Option<Type> {
    if depth > MAX_NESTING {
        return None;
    }

    let input = input.trim();
    let (body, is_optional) = match input.strip_suffix('?') {
        Some(body) => (body.trim_end(), true),
        None => (input, false),
    };

    if body.is_empty() {
        return None;
    }

    if let Some(inner) = body.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
        return parse_collection(inner, is_optional, depth);
    }

    parse_generic(body, is_optional, depth)
}

fn parse_generic(body: &str, is_optional: bool, depth: usize) -> Option<Type> {
    let Some(open) = body.find('<') else {
        return TYPE_NAME
            .is_match(body)
            .then(|| Type::new(body, Vec::new(), is_optional));
    };

    let name = body[..open].trim_end();
    let arguments = body[open + 1..].strip_suffix('>')?;
    if !TYPE_NAME.is_match(name) {
        return None;
    }

    let generic_names = split_top_level(arguments, ',')
        .into_iter()
        .map(|argument| argument.trim().to_string())
        .collect::<Vec<_>>();

    if generic_names
        .iter()
        .any(|argument| parse_nested(argument, depth + 1).is_none())
    {
        return None;
    }

    Some(Type::new(name, generic_names, is_optional))
}

fn parse_collection(inner: &str, is_optional: bool, depth: usize) -> Option<Type> {
    let parts = split_top_level(inner, ':');
    let parts: Vec<String> = parts.into_iter().map(|part| part.trim().to_string()).collect();

    if parts.iter().any(|part| parse_nested(part, depth + 1).is_none()) {
        return None;
    }

    match parts.len() {
        1 => Some(Type::new("Array", parts, is_optional)),
        2 => Some(Type::new("Dictionary", parts, is_optional)),
        _ => None,
    }
}

/// Splits on `separator` outside of `<>` and `[]` nesting.
fn split_top_level(input: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;

    for (idx, ch) in input.char_indices() {
        match ch {
            '<' | '[' => depth += 1,
            '>' | ']' => depth -= 1,
            c if c == separator && depth == 0 => {
                parts.push(&input[start..idx]);
                start = idx + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.name,
            self.generics(),
            if self.is_optional { "?" } else { "" }
        )
    }
}

impl fmt::Display for TypeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
