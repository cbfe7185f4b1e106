use crate::sexp::node::Sexp;
use std::borrow::Cow;
use std::fmt;

/// One slot of a node: an atom or a nested node.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Symbol(String),
    List(Sexp),
}

impl Value {
    /// Build a symbol atom.
    pub fn sym(name: impl Into<String>) -> Self {
        Value::Symbol(name.into())
    }

    /// True for nested nodes, false for atoms.
    pub fn is_sequence(&self) -> bool {
        matches!(self, Value::List(_))
    }

    pub fn as_sexp(&self) -> Option<&Sexp> {
        match self {
            Value::List(sexp) => Some(sexp),
            _ => None,
        }
    }

    pub fn as_sexp_mut(&mut self) -> Option<&mut Sexp> {
        match self {
            Value::List(sexp) => Some(sexp),
            _ => None,
        }
    }

    pub fn into_sexp(self) -> Option<Sexp> {
        match self {
            Value::List(sexp) => Some(sexp),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Value::Symbol(name) => Some(name),
            _ => None,
        }
    }

    /// Classify a bare word from data or pattern text.
    ///
    /// `nil`, `true` and `false` are keywords, numeric words become numbers,
    /// everything else is a symbol.
    pub fn from_word(word: &str) -> Self {
        match word {
            "nil" => return Value::Nil,
            "true" => return Value::Bool(true),
            "false" => return Value::Bool(false),
            _ => {}
        }
        if looks_numeric(word) {
            if let Ok(n) = word.parse::<i64>() {
                return Value::Int(n);
            }
            if let Ok(f) = word.parse::<f64>() {
                return Value::Float(f);
            }
        }
        Value::Symbol(word.to_string())
    }

    /// The text a regex is run against when matching an atom.
    ///
    /// Nodes have no text form; callers never ask for one.
    pub fn text_form(&self) -> Cow<'_, str> {
        match self {
            Value::Nil => Cow::Borrowed(""),
            Value::Bool(b) => Cow::Owned(b.to_string()),
            Value::Int(n) => Cow::Owned(n.to_string()),
            Value::Float(f) => Cow::Owned(f.to_string()),
            Value::Str(s) | Value::Symbol(s) => Cow::Borrowed(s),
            Value::List(sexp) => Cow::Owned(sexp.to_source()),
        }
    }

    /// Render as data text that [`crate::sexp::reader`] reads back.
    pub fn to_source(&self) -> String {
        let mut out = String::new();
        self.write_source(&mut out);
        out
    }

    pub(crate) fn write_source(&self, out: &mut String) {
        match self {
            Value::Nil => out.push_str("nil"),
            Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Int(n) => out.push_str(&n.to_string()),
            Value::Float(f) => out.push_str(&format!("{f:?}")),
            Value::Str(s) => write_quoted(s, out),
            Value::Symbol(s) => write_symbol(s, out),
            Value::List(sexp) => sexp.write_source(out),
        }
    }
}

/// Symbols that would not read back as themselves are written `#"..."`.
pub(crate) fn write_symbol(name: &str, out: &mut String) {
    if reads_as_symbol(name) {
        out.push_str(name);
    } else {
        out.push('#');
        write_quoted(name, out);
    }
}

fn reads_as_symbol(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '(' | ')' | '[' | ']' | '"' | ';'))
        && matches!(Value::from_word(name), Value::Symbol(_))
}

fn looks_numeric(word: &str) -> bool {
    let digits = word.strip_prefix(|c: char| c == '-' || c == '+').unwrap_or(word);
    digits
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || (c == '.' && digits.len() > 1))
}

pub(crate) fn write_quoted(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Str(s) => {
                let mut out = String::new();
                write_quoted(s, &mut out);
                f.write_str(&out)
            }
            Value::Symbol(s) => write!(f, ":{s}"),
            Value::List(sexp) => write!(f, "{sexp}"),
        }
    }
}

impl From<Sexp> for Value {
    fn from(sexp: Sexp) -> Self {
        Value::List(sexp)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}
