//! Reader for s-expression data text.
//!
//! ```text
//! (class cake nil
//!   (defn foo (args) (add a b)))
//! ```
//!
//! Bare words are classified with [`Value::from_word`]; every node records
//! the line of its opening paren.

use crate::lexer::{Lexer, Spanned, Token};
use crate::sexp::errors::ReadError;
use crate::sexp::node::Sexp;
use crate::sexp::value::Value;

/// Read every top-level form.
pub fn read_all(text: &str) -> Result<Vec<Value>, ReadError> {
    let tokens = Lexer::data(text)
        .tokenize()
        .map_err(|e| ReadError::Lex {
            message: e.message,
            line: e.line,
        })?;

    let mut reader = Reader { tokens, pos: 0 };
    let mut forms = Vec::new();
    while reader.pos < reader.tokens.len() {
        forms.push(reader.form()?);
    }
    Ok(forms)
}

/// Read exactly one top-level form, atom or node.
pub fn read_value(text: &str) -> Result<Value, ReadError> {
    let mut forms = read_all(text)?;
    match (forms.pop(), forms.len()) {
        (Some(value), 0) => Ok(value),
        (last, rest) => Err(ReadError::FormCount {
            count: rest + usize::from(last.is_some()),
        }),
    }
}

/// Read exactly one top-level node.
pub fn read_one(text: &str) -> Result<Sexp, ReadError> {
    let mut forms = read_all(text)?;
    if forms.len() != 1 {
        return Err(ReadError::FormCount { count: forms.len() });
    }
    match forms.pop() {
        Some(Value::List(sexp)) => Ok(sexp),
        Some(atom) => Err(ReadError::NotAList {
            atom: atom.to_string(),
        }),
        None => Err(ReadError::FormCount { count: 0 }),
    }
}

struct Reader {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Reader {
    fn next(&mut self) -> Option<&Spanned> {
        let spanned = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(spanned)
    }

    fn form(&mut self) -> Result<Value, ReadError> {
        let Some(Spanned { token, line }) = self.next().cloned() else {
            return Err(ReadError::FormCount { count: 0 });
        };

        match token {
            Token::Open => self.list(line).map(Value::List),
            Token::Close => Err(ReadError::UnexpectedClose { line }),
            Token::Word(word) => Ok(Value::from_word(&word)),
            Token::Str(s) => Ok(Value::Str(s)),
            Token::Symbol(name) => Ok(Value::Symbol(name)),
            Token::OpenBracket => Err(ReadError::UnsupportedToken {
                token: "[".to_string(),
                line,
            }),
            Token::CloseBracket => Err(ReadError::UnsupportedToken {
                token: "]".to_string(),
                line,
            }),
            Token::Regex(re) => Err(ReadError::UnsupportedToken {
                token: format!("/{re}/"),
                line,
            }),
        }
    }

    fn list(&mut self, line: usize) -> Result<Sexp, ReadError> {
        let mut items = Vec::new();
        loop {
            match self.tokens.get(self.pos).map(|s| &s.token) {
                None => return Err(ReadError::Unclosed { line }),
                Some(Token::Close) => {
                    self.pos += 1;
                    return Ok(Sexp::from_vec(items).with_line(line));
                }
                Some(_) => items.push(self.form()?),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_nested_forms() {
        let sexp = read_one("(class cake nil (defn foo (args) (add a b)))").unwrap();
        assert_eq!(sexp.len(), 4);
        assert_eq!(sexp[2], Value::Nil);
        assert_eq!(sexp.mass(), 4);
    }

    #[test]
    fn read_all_keeps_every_form() {
        let forms = read_all("(a) 42 (b)").unwrap();
        assert_eq!(forms.len(), 3);
        assert_eq!(forms[1], Value::Int(42));
    }

    #[test]
    fn read_value_accepts_atoms() {
        assert_eq!(read_value("foo").unwrap(), Value::sym("foo"));
        assert_eq!(read_value(" (a 1) ").unwrap().to_source(), "(a 1)");
    }

    #[test]
    fn quoted_symbols_read_back() {
        let sexp = read_one(r#"(a #"b c" #"nil" nil)"#).unwrap();
        assert_eq!(sexp[1], Value::sym("b c"));
        assert_eq!(sexp[2], Value::sym("nil"));
        assert_eq!(sexp[3], Value::Nil);
        assert_eq!(read_one(&sexp.to_source()).unwrap(), sexp);
    }

    #[test]
    fn empty_list() {
        assert_eq!(read_one("()").unwrap(), Sexp::new());
    }

    #[test]
    fn errors() {
        assert_eq!(read_one("(a"), Err(ReadError::Unclosed { line: 1 }));
        assert_eq!(read_one("a)"), Err(ReadError::UnexpectedClose { line: 1 }));
        assert!(matches!(
            read_all("(a))"),
            Err(ReadError::UnexpectedClose { line: 1 })
        ));
        assert!(matches!(
            read_all("(a [t b])"),
            Err(ReadError::UnsupportedToken { .. })
        ));
        assert_eq!(read_one("(a) (b)"), Err(ReadError::FormCount { count: 2 }));
        assert!(matches!(read_one("42"), Err(ReadError::NotAList { .. })));
        assert_eq!(read_value(""), Err(ReadError::FormCount { count: 0 }));
        assert_eq!(read_value("a b"), Err(ReadError::FormCount { count: 2 }));
    }

    #[test]
    fn records_lines() {
        let sexp = read_one("(a\n  (b)\n  (c\n    (d)))").unwrap();
        let lines: Vec<_> = sexp.walk().map(|(_, n)| n.line()).collect();
        assert_eq!(lines, vec![Some(1), Some(2), Some(3), Some(4)]);
    }
}
