//! OpenStep ("old-style ASCII") property lists
//!
//! `project.pbxproj` files are written in the NeXTSTEP property-list dialect:
//! dictionaries `{ key = value; }`, arrays `( a, b, )`, quoted or bare strings,
//! `<hex>` data, and C-style comments. This module parses that dialect into a
//! [`Value`] tree and writes a tree back out. Xcode-specific layout (sections,
//! reference comments) lives in the project writer, which drives
//! [`write_value`] with a [`WriteStyle`].

use std::collections::BTreeMap;
use thiserror::Error;

/// Dictionary type. Keys are kept sorted, which matches how Xcode orders them.
pub type Dict = BTreeMap<String, Value>;

/// A property-list value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    String(String),
    Array(Vec<Value>),
    Dict(Dict),
    Data(Vec<u8>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Value::Dict(dict) => Some(dict),
            _ => None,
        }
    }

    pub fn as_dict_mut(&mut self) -> Option<&mut Dict> {
        match self {
            Value::Dict(dict) => Some(dict),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Dict> for Value {
    fn from(dict: Dict) -> Self {
        Value::Dict(dict)
    }
}

/// Errors produced while parsing a property list
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlistError {
    #[error("line {line}: unexpected end of input")]
    UnexpectedEof { line: usize },

    #[error("line {line}: expected {expected}, found '{found}'")]
    Unexpected {
        line: usize,
        expected: &'static str,
        found: char,
    },

    #[error("line {line}: unterminated comment")]
    UnterminatedComment { line: usize },

    #[error("line {line}: invalid data literal")]
    InvalidData { line: usize },

    #[error("line {line}: unexpected content after the root value")]
    TrailingContent { line: usize },
}

/// Parses a complete property list document
pub fn parse(input: &str) -> Result<Value, PlistError> {
    let mut parser = Parser::new(input);
    parser.skip_trivia()?;
    let value = parser.parse_value()?;
    parser.skip_trivia()?;
    if parser.peek().is_some() {
        return Err(PlistError::TrailingContent { line: parser.line });
    }
    Ok(value)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        let input = input.strip_prefix('\u{feff}').unwrap_or(input);
        Self {
            chars: input.chars().collect(),
            pos: 0,
            line: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn expect(&mut self, wanted: char, expected: &'static str) -> Result<(), PlistError> {
        match self.bump() {
            Some(c) if c == wanted => Ok(()),
            Some(found) => Err(PlistError::Unexpected {
                line: self.line,
                expected,
                found,
            }),
            None => Err(PlistError::UnexpectedEof { line: self.line }),
        }
    }

    fn skip_trivia(&mut self) -> Result<(), PlistError> {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(c), _) if c.is_whitespace() => {
                    self.bump();
                }
                (Some('/'), Some('/')) => {
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                (Some('/'), Some('*')) => {
                    let start = self.line;
                    self.pos += 2;
                    loop {
                        match self.bump() {
                            Some('*') if self.peek() == Some('/') => {
                                self.pos += 1;
                                break;
                            }
                            Some(_) => {}
                            None => return Err(PlistError::UnterminatedComment { line: start }),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn parse_value(&mut self) -> Result<Value, PlistError> {
        match self.peek() {
            Some('{') => self.parse_dict(),
            Some('(') => self.parse_array(),
            Some('<') => self.parse_data(),
            Some('"') | Some('\'') => self.parse_quoted().map(Value::String),
            Some(c) if is_bare_char(c) => Ok(Value::String(self.parse_bare())),
            Some(found) => Err(PlistError::Unexpected {
                line: self.line,
                expected: "a value",
                found,
            }),
            None => Err(PlistError::UnexpectedEof { line: self.line }),
        }
    }

    fn parse_dict(&mut self) -> Result<Value, PlistError> {
        self.expect('{', "'{'")?;
        let mut dict = Dict::new();
        loop {
            self.skip_trivia()?;
            match self.peek() {
                Some('}') => {
                    self.bump();
                    return Ok(Value::Dict(dict));
                }
                Some('"') | Some('\'') => {
                    let key = self.parse_quoted()?;
                    let value = self.parse_entry_tail()?;
                    dict.insert(key, value);
                }
                Some(c) if is_bare_char(c) => {
                    let key = self.parse_bare();
                    let value = self.parse_entry_tail()?;
                    dict.insert(key, value);
                }
                Some(found) => {
                    return Err(PlistError::Unexpected {
                        line: self.line,
                        expected: "a dictionary key or '}'",
                        found,
                    })
                }
                None => return Err(PlistError::UnexpectedEof { line: self.line }),
            }
        }
    }

    /// Parses `= value;` following a dictionary key
    fn parse_entry_tail(&mut self) -> Result<Value, PlistError> {
        self.skip_trivia()?;
        self.expect('=', "'='")?;
        self.skip_trivia()?;
        let value = self.parse_value()?;
        self.skip_trivia()?;
        self.expect(';', "';'")?;
        Ok(value)
    }

    fn parse_array(&mut self) -> Result<Value, PlistError> {
        self.expect('(', "'('")?;
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some(')') {
                self.bump();
                return Ok(Value::Array(items));
            }
            items.push(self.parse_value()?);
            self.skip_trivia()?;
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(')') => {}
                Some(found) => {
                    return Err(PlistError::Unexpected {
                        line: self.line,
                        expected: "',' or ')'",
                        found,
                    })
                }
                None => return Err(PlistError::UnexpectedEof { line: self.line }),
            }
        }
    }

    fn parse_data(&mut self) -> Result<Value, PlistError> {
        self.expect('<', "'<'")?;
        let mut digits = String::new();
        loop {
            match self.bump() {
                Some('>') => break,
                Some(c) if c.is_ascii_hexdigit() => digits.push(c),
                Some(c) if c.is_whitespace() => {}
                Some(_) => return Err(PlistError::InvalidData { line: self.line }),
                None => return Err(PlistError::UnexpectedEof { line: self.line }),
            }
        }
        if digits.len() % 2 != 0 {
            return Err(PlistError::InvalidData { line: self.line });
        }
        let bytes = (0..digits.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&digits[i..i + 2], 16))
            .collect::<Result<Vec<u8>, _>>()
            .map_err(|_| PlistError::InvalidData { line: self.line })?;
        Ok(Value::Data(bytes))
    }

    fn parse_quoted(&mut self) -> Result<String, PlistError> {
        let quote = self.bump().ok_or(PlistError::UnexpectedEof { line: self.line })?;
        let mut out = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(out),
                Some('\\') => {
                    let escaped = self
                        .bump()
                        .ok_or(PlistError::UnexpectedEof { line: self.line })?;
                    match escaped {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        'a' => out.push('\u{7}'),
                        'b' => out.push('\u{8}'),
                        'f' => out.push('\u{c}'),
                        'v' => out.push('\u{b}'),
                        'U' => out.push(self.parse_unicode_escape()?),
                        other => out.push(other),
                    }
                }
                Some(c) => out.push(c),
                None => return Err(PlistError::UnexpectedEof { line: self.line }),
            }
        }
    }

    fn parse_unicode_escape(&mut self) -> Result<char, PlistError> {
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = self
                .bump()
                .and_then(|c| c.to_digit(16))
                .ok_or(PlistError::InvalidData { line: self.line })?;
            code = code * 16 + digit;
        }
        Ok(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    fn parse_bare(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if !is_bare_char(c) {
                break;
            }
            // A comment may follow a bare word without whitespace.
            if c == '/' && matches!(self.peek_at(1), Some('/') | Some('*')) {
                break;
            }
            out.push(c);
            self.pos += 1;
        }
        out
    }
}

fn is_bare_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '/' | ':' | '.' | '-' | '+')
}

/// Whether a string can be written without quotes
pub fn is_bare_safe(s: &str) -> bool {
    !s.is_empty()
        && !s.contains("//")
        && !s.contains("/*")
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '/' | ':' | '.'))
}

/// Quotes and escapes a string when needed
pub fn quote(s: &str) -> String {
    if is_bare_safe(s) {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

/// Layout options for [`write_value`]
pub struct WriteStyle<'a> {
    /// Write dictionaries and arrays on one line
    pub single_line: bool,
    /// Returns a comment for a string value, used for object references
    pub annotate: &'a dyn Fn(&str) -> Option<String>,
}

impl WriteStyle<'_> {
    fn inline(&self) -> WriteStyle<'_> {
        WriteStyle {
            single_line: true,
            annotate: self.annotate,
        }
    }
}

fn no_annotation(_: &str) -> Option<String> {
    None
}

/// Dictionary entries with `isa` first and the rest in key order
pub fn ordered_entries(dict: &Dict) -> impl Iterator<Item = (&String, &Value)> {
    let isa = dict.get_key_value("isa");
    isa.into_iter()
        .chain(dict.iter().filter(|(key, _)| key.as_str() != "isa"))
}

/// Appends `value` to `out`. `indent` is the tab depth of the line holding the value.
pub fn write_value(out: &mut String, value: &Value, indent: usize, style: &WriteStyle<'_>) {
    match value {
        Value::String(s) => {
            out.push_str(&quote(s));
            if let Some(comment) = (style.annotate)(s) {
                out.push_str(" /* ");
                out.push_str(&comment);
                out.push_str(" */");
            }
        }
        Value::Data(bytes) => {
            out.push('<');
            for byte in bytes {
                out.push_str(&format!("{:02x}", byte));
            }
            out.push('>');
        }
        Value::Array(items) if style.single_line => {
            out.push('(');
            for item in items {
                write_value(out, item, indent, style);
                out.push_str(", ");
            }
            out.push(')');
        }
        Value::Array(items) => {
            out.push_str("(\n");
            for item in items {
                push_tabs(out, indent + 1);
                write_value(out, item, indent + 1, style);
                out.push_str(",\n");
            }
            push_tabs(out, indent);
            out.push(')');
        }
        Value::Dict(dict) if style.single_line => {
            out.push('{');
            for (key, item) in ordered_entries(dict) {
                out.push_str(&quote(key));
                out.push_str(" = ");
                write_value(out, item, indent, &style.inline());
                out.push_str("; ");
            }
            out.push('}');
        }
        Value::Dict(dict) => {
            out.push_str("{\n");
            for (key, item) in ordered_entries(dict) {
                push_tabs(out, indent + 1);
                out.push_str(&quote(key));
                out.push_str(" = ");
                write_value(out, item, indent + 1, style);
                out.push_str(";\n");
            }
            push_tabs(out, indent);
            out.push('}');
        }
    }
}

pub fn push_tabs(out: &mut String, count: usize) {
    for _ in 0..count {
        out.push('\t');
    }
}

/// Serializes a value as a standalone document with the UTF-8 marker line
pub fn to_string(value: &Value) -> String {
    let mut out = String::from("// !$*UTF8*$!\n");
    write_value(
        &mut out,
        value,
        0,
        &WriteStyle {
            single_line: false,
            annotate: &no_annotation,
        },
    );
    out.push('\n');
    out
}
