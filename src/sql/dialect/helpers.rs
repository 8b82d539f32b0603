//! Shared helper functions for SQL dialect implementations.
//!
//! This module provides reusable building blocks that dialects can compose
//! to implement the `SqlDialect` trait with minimal duplication.

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Identifier Quoting
// =============================================================================

/// Quote identifier with double quotes (ANSI style).
/// Used by: SQLite
pub fn quote_double(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote identifier with square brackets.
/// Used by: T-SQL (SQL Server, Azure SQL)
pub fn quote_bracket(ident: &str) -> String {
    format!("[{}]", ident.replace(']', "]]"))
}

/// Strip one layer of `[...]`, `"..."` or `` `...` `` quoting from an identifier.
///
/// Doubled closing delimiters inside the quotes are collapsed back.
pub fn unquote_identifier(ident: &str) -> String {
    let ident = ident.trim();
    let mut chars = ident.chars();
    let (first, last) = match (chars.next(), chars.next_back()) {
        (Some(f), Some(l)) => (f, l),
        _ => return ident.to_string(),
    };

    let inner = &ident[first.len_utf8()..ident.len() - last.len_utf8()];
    match (first, last) {
        ('[', ']') => inner.replace("]]", "]"),
        ('"', '"') => inner.replace("\"\"", "\""),
        ('`', '`') => inner.replace("``", "`"),
        _ => ident.to_string(),
    }
}

// =============================================================================
// Declared Types
// =============================================================================

static TYPE_MODIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*([^(]*?)\s*\(\s*(max|-?\d+)\s*(?:,\s*(-?\d+)\s*)?\)").expect("valid regex")
});

/// Lowercased type name without any `(n)` / `(p, s)` modifier.
///
/// `NVARCHAR(50)` becomes `nvarchar`, `double precision` stays as is.
pub fn base_type_name(declared_type: &str) -> String {
    let name = match declared_type.find('(') {
        Some(idx) => &declared_type[..idx],
        None => declared_type,
    };
    name.trim().to_lowercase()
}

/// Numeric modifiers parsed from a declared type such as `DECIMAL(10,2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TypeModifiers {
    /// First modifier; `None` for `(max)`.
    pub first: Option<i64>,
    /// Second modifier (scale), if present.
    pub second: Option<i64>,
}

/// Parse the `(n)` or `(p, s)` modifier of a declared type.
///
/// Returns `None` when the type carries no modifier.
pub fn parse_type_modifiers(declared_type: &str) -> Option<TypeModifiers> {
    let caps = TYPE_MODIFIER.captures(declared_type)?;
    let first = caps
        .get(2)
        .and_then(|m| m.as_str().parse::<i64>().ok());
    let second = caps
        .get(3)
        .and_then(|m| m.as_str().parse::<i64>().ok());
    Some(TypeModifiers { first, second })
}
