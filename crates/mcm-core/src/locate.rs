// Declaration locator: finds `export const NAME[: Type] = <literal>` in a
// document and splits it into head / literal / tail.
use regex::Regex;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::scan::scan_literal;

/// Verbatim text following a literal's closing bracket.
///
/// Never interpreted; carried from load to save so trailing statements and
/// comments survive edits unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tail(String);

impl Tail {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A declaration split out of its document.
#[derive(Debug, Clone)]
pub struct Extracted<'a> {
    /// Text before the declaration keyword (imports, interfaces, comments).
    pub head: &'a str,
    /// Type annotation as written, without the leading colon.
    pub annotation: Option<&'a str>,
    /// The bracketed literal, opening through closing bracket.
    pub literal: &'a str,
    /// Byte offsets of the opening and closing bracket (inclusive).
    pub span: (usize, usize),
    pub tail: Tail,
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

fn declaration_pattern(name: &str) -> Result<Regex, regex::Error> {
    // the name must be followed by `:` or `=`, so `fooBar` never matches `foo`
    Regex::new(&format!(
        r"(?:\bexport\s+)?\bconst\s+{}\s*(?::\s*([^=;]+?))?\s*=",
        regex::escape(name)
    ))
}

/// Locates the declaration `name` and extracts its literal and tail.
pub fn locate<'a>(document: &'a str, name: &str) -> StoreResult<Extracted<'a>> {
    let not_found = || StoreError::NotFound {
        name: name.to_string(),
    };
    if !is_identifier(name) {
        return Err(not_found());
    }
    let re = declaration_pattern(name).map_err(|_| not_found())?;
    let caps = re.captures(document).ok_or_else(not_found)?;
    let whole = caps.get(0).ok_or_else(not_found)?;
    let annotation = caps.get(1).map(|m| m.as_str().trim());

    let open = document[whole.end()..]
        .find(['[', '{'])
        .map(|off| whole.end() + off)
        .ok_or_else(not_found)?;
    let close = scan_literal(document, open)?;
    debug!(name, open, close, "located literal");

    Ok(Extracted {
        head: &document[..whole.start()],
        annotation,
        literal: &document[open..=close],
        span: (open, close),
        tail: Tail::new(&document[close + 1..]),
    })
}

/// Convenience form returning just the literal text and the tail.
pub fn locate_and_extract(document: &str, name: &str) -> StoreResult<(String, Tail)> {
    let ex = locate(document, name)?;
    Ok((ex.literal.to_string(), ex.tail))
}
