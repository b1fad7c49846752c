//! Parser for the term surface syntax.
//!
//! Syntax:
//! - `"..."` - string literal (no escapes; the next `"` ends the token)
//! - `()` - the unit value
//! - `(` term `)` - parenthesised term
//! - identifier starting `[A-Z]` - variable
//! - `[0-9]+` - integer literal, canonical form only (`01` is an error)
//! - identifier starting `[a-z]` followed by zero or more space-separated
//!   atoms - constructor application
//!
//! Printing via [`crate::term::format_term`] round-trips through this
//! parser.

use crate::symbol::SymbolStore;
use crate::term::{TermId, TermStore};

/// Parse error with a byte position into the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Parse error at position {}: {}",
            self.position, self.message
        )
    }
}

impl std::error::Error for ParseError {}

fn err<T>(message: &str, position: usize) -> Result<T, ParseError> {
    Err(ParseError {
        message: message.to_string(),
        position,
    })
}

/// Parse a complete term; trailing input is an error.
pub fn parse_term(
    input: &str,
    symbols: &SymbolStore,
    terms: &TermStore,
) -> Result<TermId, ParseError> {
    let mut pos = 0;
    let term = parse_spine(input, &mut pos, symbols, terms)?;
    skip_whitespace(input, &mut pos);
    if pos < input.len() {
        return err("Unexpected characters after term", pos);
    }
    Ok(term)
}

fn skip_whitespace(input: &str, pos: &mut usize) {
    let bytes = input.as_bytes();
    while *pos < bytes.len() && bytes[*pos].is_ascii_whitespace() {
        *pos += 1;
    }
}

/// Parse a term spine: a lowercase identifier consumes following atoms as
/// arguments; anything else is a single atom.
fn parse_spine(
    input: &str,
    pos: &mut usize,
    symbols: &SymbolStore,
    terms: &TermStore,
) -> Result<TermId, ParseError> {
    skip_whitespace(input, pos);
    let bytes = input.as_bytes();
    if *pos >= bytes.len() {
        return err("Unexpected end of input", *pos);
    }

    if bytes[*pos].is_ascii_lowercase() {
        let name = parse_identifier(input, pos)?;
        let func = symbols.intern(&name);
        let mut args: smallvec::SmallVec<[TermId; 4]> = smallvec::SmallVec::new();
        loop {
            skip_whitespace(input, pos);
            if *pos >= bytes.len() || bytes[*pos] == b')' {
                break;
            }
            args.push(parse_atom(input, pos, symbols, terms)?);
        }
        Ok(terms.ctor(func, args))
    } else {
        parse_atom(input, pos, symbols, terms)
    }
}

/// Parse an atomic term: literal, unit, variable, nullary constructor, or
/// parenthesised spine.
fn parse_atom(
    input: &str,
    pos: &mut usize,
    symbols: &SymbolStore,
    terms: &TermStore,
) -> Result<TermId, ParseError> {
    skip_whitespace(input, pos);
    let bytes = input.as_bytes();
    if *pos >= bytes.len() {
        return err("Unexpected end of input", *pos);
    }

    match bytes[*pos] {
        b'"' => {
            let start = *pos;
            *pos += 1;
            match input[*pos..].find('"') {
                Some(offset) => {
                    let contents = &input[*pos..*pos + offset];
                    *pos += offset + 1;
                    Ok(terms.string(symbols.intern(contents)))
                }
                None => err("Unterminated string literal", start),
            }
        }
        b'(' => {
            *pos += 1;
            skip_whitespace(input, pos);
            if *pos < bytes.len() && bytes[*pos] == b')' {
                *pos += 1;
                return Ok(terms.triv());
            }
            let term = parse_spine(input, pos, symbols, terms)?;
            skip_whitespace(input, pos);
            if *pos < bytes.len() && bytes[*pos] == b')' {
                *pos += 1;
                Ok(term)
            } else {
                err("Expected `)`", *pos)
            }
        }
        c if c.is_ascii_uppercase() => {
            let name = parse_identifier(input, pos)?;
            Ok(terms.var(symbols.intern(&name)))
        }
        c if c.is_ascii_digit() => parse_integer(input, pos, terms),
        c if c.is_ascii_lowercase() => {
            let name = parse_identifier(input, pos)?;
            Ok(terms.ctor0(symbols.intern(&name)))
        }
        _ => err("Unexpected character", *pos),
    }
}

fn parse_identifier(input: &str, pos: &mut usize) -> Result<String, ParseError> {
    let bytes = input.as_bytes();
    let start = *pos;
    while *pos < bytes.len() && (bytes[*pos].is_ascii_alphanumeric() || bytes[*pos] == b'_') {
        *pos += 1;
    }
    if *pos == start {
        return err("Expected identifier", start);
    }
    Ok(input[start..*pos].to_string())
}

fn parse_integer(input: &str, pos: &mut usize, terms: &TermStore) -> Result<TermId, ParseError> {
    let bytes = input.as_bytes();
    let start = *pos;
    while *pos < bytes.len() && bytes[*pos].is_ascii_digit() {
        *pos += 1;
    }
    if *pos < bytes.len() && (bytes[*pos].is_ascii_alphanumeric() || bytes[*pos] == b'_') {
        return err("Malformed integer literal", start);
    }
    let digits = &input[start..*pos];
    if digits.len() > 1 && digits.starts_with('0') {
        return err("Non-canonical integer literal", start);
    }
    match digits.parse::<i64>() {
        Ok(value) => Ok(terms.int(value)),
        Err(_) => err("Integer literal out of range", start),
    }
}

#[cfg(test)]
#[path = "tests/parser.rs"]
mod tests;
