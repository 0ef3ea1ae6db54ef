// Canonical literal rendering and document reassembly.
use std::fmt::Write as _;

use tracing::debug;

use crate::collection::Collection;
use crate::literal::Value;
use crate::locate::Tail;

const INDENT: &str = "    ";

/// Everything written in front of the literal.
#[derive(Debug, Clone, Default)]
pub struct DeclarationHeader {
    /// Text placed before the declaration (interface definitions, imports).
    pub preamble: String,
    pub name: String,
    /// Type annotation, e.g. `DiaryItem[]`; omitted when empty.
    pub annotation: String,
}

impl DeclarationHeader {
    pub fn new(name: impl Into<String>, annotation: impl Into<String>) -> Self {
        Self {
            preamble: String::new(),
            name: name.into(),
            annotation: annotation.into(),
        }
    }

    pub fn with_preamble(mut self, preamble: impl Into<String>) -> Self {
        self.preamble = preamble.into();
        self
    }
}

/// Renders a value with four-space indentation and insertion-ordered keys.
pub fn render_literal(v: &Value) -> String {
    let mut out = String::new();
    write_value(v, 0, &mut out).ok();
    out
}

/// Reassembles the full document around a (possibly edited) collection.
pub fn render_document(collection: &Collection, header: &DeclarationHeader, tail: &Tail) -> String {
    let literal = render_literal(&collection.to_value());
    let mut out = String::with_capacity(header.preamble.len() + literal.len() + tail.as_str().len() + 64);
    if !header.preamble.is_empty() {
        out.push_str(&header.preamble);
        if !header.preamble.ends_with('\n') {
            out.push('\n');
        }
    }
    out.push_str("export const ");
    out.push_str(&header.name);
    if !header.annotation.is_empty() {
        out.push_str(": ");
        out.push_str(&header.annotation);
    }
    out.push_str(" = ");
    out.push_str(&literal);
    // the tail must open with the statement terminator
    if tail.is_empty() {
        out.push_str(";\n");
    } else {
        if !tail.as_str().trim_start().starts_with(';') {
            out.push_str(";\n");
        }
        out.push_str(tail.as_str());
    }
    debug!(name = %header.name, records = collection.len(), bytes = out.len(), "rendered document");
    out
}

fn write_value(v: &Value, depth: usize, out: &mut String) -> std::fmt::Result {
    match v {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => write!(out, "{}", if *b { "true" } else { "false" })?,
        Value::Int(x) => write!(out, "{}", x)?,
        Value::Float(x) => write_float(*x, out)?,
        Value::Str(s) => write_string(s, out),
        Value::Array(items) => {
            if items.is_empty() {
                out.push_str("[]");
                return Ok(());
            }
            out.push_str("[\n");
            for (i, it) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(",\n");
                }
                pad(depth + 1, out);
                write_value(it, depth + 1, out)?;
            }
            out.push('\n');
            pad(depth, out);
            out.push(']');
        }
        Value::Object(members) => {
            if members.is_empty() {
                out.push_str("{}");
                return Ok(());
            }
            out.push_str("{\n");
            for (i, (name, val)) in members.iter().enumerate() {
                if i > 0 {
                    out.push_str(",\n");
                }
                pad(depth + 1, out);
                write_string(name, out);
                out.push_str(": ");
                write_value(val, depth + 1, out)?;
            }
            out.push('\n');
            pad(depth, out);
            out.push('}');
        }
    }
    Ok(())
}

fn pad(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn write_float(x: f64, out: &mut String) -> std::fmt::Result {
    if x.is_nan() {
        out.push_str("NaN");
    } else if x.is_infinite() {
        out.push_str(if x > 0.0 { "Infinity" } else { "-Infinity" });
    } else {
        // Debug keeps a `.0` or exponent, so the value reads back as a float
        write!(out, "{:?}", x)?;
    }
    Ok(())
}

fn write_string(s: &str, out: &mut String) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if c.is_control() => {
                write!(out, "\\u{:04x}", c as u32).ok();
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
