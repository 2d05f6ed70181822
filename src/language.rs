//! @ai:module:intent Define the host-language declaration keywords the lexer tracks
//! @ai:module:layer domain
//! @ai:module:public_api DeclarationKind, is_source_file
//! @ai:module:stateless true

use std::path::Path;

/// @ai:intent A declaration construct whose `{ ... }` body the lexer tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Class,
    Struct,
    Enum,
    Extension,
    Protocol,
    Actor,
    Func,
    Init,
    Deinit,
    Subscript,
}

impl DeclarationKind {
    /// @ai:intent Map a keyword to its declaration kind
    /// @ai:example ("struct") -> Some(Struct)
    /// @ai:example ("let") -> None
    /// @ai:effects pure
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "class" => Some(DeclarationKind::Class),
            "struct" => Some(DeclarationKind::Struct),
            "enum" => Some(DeclarationKind::Enum),
            "extension" => Some(DeclarationKind::Extension),
            "protocol" => Some(DeclarationKind::Protocol),
            "actor" => Some(DeclarationKind::Actor),
            "func" => Some(DeclarationKind::Func),
            "init" => Some(DeclarationKind::Init),
            "deinit" => Some(DeclarationKind::Deinit),
            "subscript" => Some(DeclarationKind::Subscript),
            _ => None,
        }
    }

    /// @ai:intent Check whether this declaration introduces a type that can be injectable
    pub fn is_type_like(&self) -> bool {
        matches!(
            self,
            DeclarationKind::Class
                | DeclarationKind::Struct
                | DeclarationKind::Enum
                | DeclarationKind::Extension
                | DeclarationKind::Protocol
                | DeclarationKind::Actor
        )
    }

    /// @ai:intent Check whether the keyword is followed by a name in source
    pub fn has_name(&self) -> bool {
        !matches!(
            self,
            DeclarationKind::Init | DeclarationKind::Deinit | DeclarationKind::Subscript
        )
    }
}

/// @ai:intent Keywords that start a body-less member and cancel a pending declaration
pub fn is_statement_keyword(word: &str) -> bool {
    matches!(word, "var" | "let" | "case" | "typealias" | "associatedtype")
}

/// @ai:intent Keywords after which `class` is a modifier rather than a declaration
pub fn is_member_keyword(word: &str) -> bool {
    matches!(
        word,
        "func"
            | "var"
            | "let"
            | "init"
            | "subscript"
            | "static"
            | "final"
            | "override"
            | "public"
            | "private"
            | "fileprivate"
            | "internal"
            | "open"
            | "class"
    )
}

/// @ai:intent Check whether the modifier makes a declaration public
pub fn is_public_modifier(word: &str) -> bool {
    matches!(word, "public" | "open")
}

/// @ai:intent Check if a file should be parsed based on its extension
/// @ai:example ("App/Service.swift", ["swift"]) -> true
/// @ai:example ("App/Service.h", ["swift"]) -> false
/// @ai:effects pure
pub fn is_source_file(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|allowed| allowed == ext))
        .unwrap_or(false)
}
