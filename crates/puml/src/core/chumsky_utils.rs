//! Shared chumsky parser utilities for diagram parsing
//!
//! PlantUML is line-oriented, so every statement parser works on a single
//! trimmed line and none of these combinators consume newlines.

use chumsky::prelude::*;
use chumsky::text::ident;

/// Parse inline whitespace only (spaces and tabs, no newlines).
pub fn inline_whitespace<'src>() -> impl Parser<'src, &'src str, ()> + Clone {
    just(' ').or(just('\t')).repeated().ignored()
}

/// Parse required inline whitespace (at least one space or tab).
pub fn inline_whitespace_required<'src>() -> impl Parser<'src, &'src str, ()> + Clone {
    just(' ').or(just('\t')).repeated().at_least(1).ignored()
}

/// Parse a double-quoted string, returning the text between the quotes.
pub fn quoted_string<'src>() -> impl Parser<'src, &'src str, String> + Clone {
    just('"')
        .ignore_then(none_of('"').repeated().to_slice())
        .then_ignore(just('"'))
        .map(|s: &str| s.to_string())
}

/// Parse a possibly dotted or `::`-separated identifier such as `net.model.Order`.
///
/// A trailing separator is not consumed, so `A..>B` still leaves `..>` for
/// the arrow parser.
pub fn qualified_name<'src>() -> impl Parser<'src, &'src str, String> + Clone {
    let separator = just("::").or(just("."));

    ident()
        .then(separator.then(ident()).repeated())
        .to_slice()
        .map(|s: &str| s.to_string())
}

/// Parse the rest of the line, trimmed.
pub fn rest_of_line<'src>() -> impl Parser<'src, &'src str, String> + Clone {
    none_of("\n\r")
        .repeated()
        .to_slice()
        .map(|s: &str| s.trim().to_string())
}
