// Tolerant literal parser (JSON5-style) producing a generic value tree.
// Accepts unquoted keys, trailing commas, '/"/` strings, hex numbers,
// Infinity/NaN and // or /* */ comments. Comments are discarded.
use crate::error::{StoreError, StoreResult};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Array(Vec<Value>),
    /// Members in insertion order.
    Object(Vec<(String, Value)>),
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "a boolean",
            Value::Int(_) | Value::Float(_) => "a number",
            Value::Str(_) => "a string",
            Value::Array(_) => "an array",
            Value::Object(_) => "an object",
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(members) => members.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Sets `key` on an object, replacing in place or appending. No-op on non-objects.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        if let Value::Object(members) = self {
            let key = key.into();
            match members.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => members.push((key, value)),
            }
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            _ => None,
        }
    }
}

/// Parses a literal's text into a [`Value`].
///
/// Only whitespace and comments may follow the top-level value.
pub fn parse_literal(text: &str) -> StoreResult<Value> {
    let mut p = Parser { src: text, pos: 0 };
    p.skip_trivia()?;
    let v = p.parse_value(0)?;
    p.skip_trivia()?;
    if p.pos < p.src.len() {
        return Err(p.error("unexpected content after literal"));
    }
    Ok(v)
}

const MAX_DEPTH: usize = 256;

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn error(&self, msg: impl Into<String>) -> StoreError {
        StoreError::parse(self.pos, msg)
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_byte_at(&self, off: usize) -> Option<u8> {
        self.src.as_bytes().get(self.pos + off).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> StoreResult<()> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(self.error(match self.peek() {
                Some(found) => format!("expected '{c}', found '{found}'"),
                None => format!("expected '{c}', found end of input"),
            }))
        }
    }

    // whitespace and comments
    fn skip_trivia(&mut self) -> StoreResult<()> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() || c == '\u{feff}' => {
                    self.bump();
                }
                Some('/') if self.peek_byte_at(1) == Some(b'/') => {
                    match self.src[self.pos..].find('\n') {
                        Some(off) => self.pos += off + 1,
                        None => self.pos = self.src.len(),
                    }
                }
                Some('/') if self.peek_byte_at(1) == Some(b'*') => {
                    let start = self.pos;
                    match self.src[self.pos + 2..].find("*/") {
                        Some(off) => self.pos += 2 + off + 2,
                        None => {
                            return Err(StoreError::parse(start, "unterminated block comment"));
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn parse_value(&mut self, depth: usize) -> StoreResult<Value> {
        if depth > MAX_DEPTH {
            return Err(self.error("literal nested too deeply"));
        }
        match self.peek() {
            Some('{') => self.parse_object(depth),
            Some('[') => self.parse_array(depth),
            Some(q @ ('"' | '\'' | '`')) => Ok(Value::Str(self.parse_string(q)?)),
            Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => self.parse_number(),
            Some(c) if is_ident_start(c) => {
                let start = self.pos;
                let word = self.parse_identifier();
                match word {
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    "null" => Ok(Value::Null),
                    "Infinity" => Ok(Value::Float(f64::INFINITY)),
                    "NaN" => Ok(Value::Float(f64::NAN)),
                    other => Err(StoreError::parse(start, format!("unexpected identifier `{other}`"))),
                }
            }
            Some(c) => Err(self.error(format!("unexpected character '{c}'"))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn parse_object(&mut self, depth: usize) -> StoreResult<Value> {
        self.expect('{')?;
        let mut members: Vec<(String, Value)> = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.eat('}') {
                break;
            }
            let key = match self.peek() {
                Some(q @ ('"' | '\'' | '`')) => self.parse_string(q)?,
                Some(c) if is_ident_start(c) => self.parse_identifier().to_string(),
                Some(c) => return Err(self.error(format!("expected object key, found '{c}'"))),
                None => return Err(self.error("unterminated object")),
            };
            self.skip_trivia()?;
            self.expect(':')?;
            self.skip_trivia()?;
            let val = self.parse_value(depth + 1)?;
            match members.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = val,
                None => members.push((key, val)),
            }
            self.skip_trivia()?;
            if self.eat(',') {
                continue;
            }
            self.skip_trivia()?;
            self.expect('}')?;
            break;
        }
        Ok(Value::Object(members))
    }

    fn parse_array(&mut self, depth: usize) -> StoreResult<Value> {
        self.expect('[')?;
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.eat(']') {
                break;
            }
            items.push(self.parse_value(depth + 1)?);
            self.skip_trivia()?;
            if self.eat(',') {
                continue;
            }
            self.expect(']')?;
            break;
        }
        Ok(Value::Array(items))
    }

    fn parse_identifier(&mut self) -> &'a str {
        let src = self.src;
        let start = self.pos;
        while let Some(c) = self.peek() {
            if is_ident_continue(c) {
                self.bump();
            } else {
                break;
            }
        }
        &src[start..self.pos]
    }

    fn parse_string(&mut self, quote: char) -> StoreResult<String> {
        let start = self.pos;
        self.bump();
        let mut out = String::new();
        loop {
            let Some(c) = self.bump() else {
                return Err(StoreError::parse(start, "unterminated string"));
            };
            match c {
                c if c == quote => return Ok(out),
                '\\' => self.parse_escape(&mut out)?,
                '\n' | '\r' if quote != '`' => {
                    return Err(StoreError::parse(self.pos - 1, "newline in string"));
                }
                c => out.push(c),
            }
        }
    }

    fn parse_escape(&mut self, out: &mut String) -> StoreResult<()> {
        let at = self.pos - 1;
        let Some(c) = self.bump() else {
            return Err(StoreError::parse(at, "unterminated escape"));
        };
        match c {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' if !self.peek().is_some_and(|d| d.is_ascii_digit()) => out.push('\0'),
            'x' => {
                let code = self.hex_digits(2, at)?;
                out.push(char::from_u32(code).ok_or_else(|| StoreError::parse(at, "bad \\x escape"))?);
            }
            'u' => out.push(self.unicode_escape(at)?),
            // line continuation
            '\n' => {}
            '\r' => {
                self.eat('\n');
            }
            '\u{2028}' | '\u{2029}' => {}
            c if c.is_ascii_digit() => {
                return Err(StoreError::parse(at, "octal escapes are not allowed"));
            }
            c => out.push(c),
        }
        Ok(())
    }

    fn hex_digits(&mut self, n: usize, at: usize) -> StoreResult<u32> {
        let end = self.pos + n;
        let digits = self
            .src
            .get(self.pos..end)
            .ok_or_else(|| StoreError::parse(at, "truncated escape"))?;
        let code = u32::from_str_radix(digits, 16)
            .map_err(|_| StoreError::parse(at, format!("bad hex digits `{digits}`")))?;
        self.pos = end;
        Ok(code)
    }

    fn unicode_escape(&mut self, at: usize) -> StoreResult<char> {
        if self.eat('{') {
            let close = self.src[self.pos..]
                .find('}')
                .ok_or_else(|| StoreError::parse(at, "unterminated \\u{...} escape"))?;
            let digits = &self.src[self.pos..self.pos + close];
            let code = u32::from_str_radix(digits, 16)
                .map_err(|_| StoreError::parse(at, format!("bad hex digits `{digits}`")))?;
            self.pos += close + 1;
            return char::from_u32(code).ok_or_else(|| StoreError::parse(at, "invalid code point"));
        }
        let hi = self.hex_digits(4, at)?;
        if (0xD800..0xDC00).contains(&hi) {
            // surrogate pair: a second \uXXXX must follow
            if self.src[self.pos..].starts_with("\\u") {
                self.pos += 2;
                let lo = self.hex_digits(4, at)?;
                if (0xDC00..0xE000).contains(&lo) {
                    let code = 0x10000 + ((hi - 0xD800) << 10) + (lo - 0xDC00);
                    return char::from_u32(code)
                        .ok_or_else(|| StoreError::parse(at, "invalid surrogate pair"));
                }
            }
            return Err(StoreError::parse(at, "unpaired surrogate"));
        }
        char::from_u32(hi).ok_or_else(|| StoreError::parse(at, "invalid code point"))
    }

    fn parse_number(&mut self) -> StoreResult<Value> {
        let start = self.pos;
        let negative = match self.peek() {
            Some('-') => {
                self.bump();
                true
            }
            Some('+') => {
                self.bump();
                false
            }
            _ => false,
        };
        let sign = if negative { -1.0 } else { 1.0 };

        if self.peek().is_some_and(is_ident_start) {
            return match self.parse_identifier() {
                "Infinity" => Ok(Value::Float(sign * f64::INFINITY)),
                "NaN" => Ok(Value::Float(f64::NAN)),
                _ => Err(StoreError::parse(start, "invalid number")),
            };
        }

        if self.src[self.pos..].starts_with("0x") || self.src[self.pos..].starts_with("0X") {
            self.pos += 2;
            let digits_start = self.pos;
            while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                self.bump();
            }
            let digits = &self.src[digits_start..self.pos];
            let n = i128::from_str_radix(digits, 16)
                .ok()
                .and_then(|n| i64::try_from(if negative { -n } else { n }).ok())
                .ok_or_else(|| StoreError::parse(start, "invalid hex number"))?;
            return Ok(Value::Int(n));
        }

        let body_start = self.pos;
        let mut is_float = false;
        let mut digits = 0usize;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            digits += 1;
        }
        if self.eat('.') {
            is_float = true;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
                digits += 1;
            }
        }
        if digits == 0 {
            return Err(StoreError::parse(start, "invalid number"));
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            is_float = true;
            self.bump();
            if matches!(self.peek(), Some('+' | '-')) {
                self.bump();
            }
            let exp_start = self.pos;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
            }
            if self.pos == exp_start {
                return Err(StoreError::parse(start, "missing exponent digits"));
            }
        }

        let body = &self.src[body_start..self.pos];
        // negate in i128 so i64::MIN stays an integer
        if !is_float
            && let Ok(n) = body.parse::<i128>()
            && let Ok(n) = i64::try_from(if negative { -n } else { n })
        {
            return Ok(Value::Int(n));
        }
        let f: f64 = body
            .parse()
            .map_err(|_| StoreError::parse(start, "invalid number"))?;
        Ok(Value::Float(sign * f))
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}
