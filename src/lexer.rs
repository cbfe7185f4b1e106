//! Tokenizer shared by the data reader and the pattern parser.
//!
//! Both grammars are parenthesised s-expressions over the same atom syntax.
//! The pattern grammar additionally uses `[ ... ]` commands and `/regex/`
//! literals; the reader rejects those tokens itself. Symbols that cannot be
//! written as bare words are quoted as `#"..."` in both grammars.

use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Open,
    Close,
    OpenBracket,
    CloseBracket,
    /// A bare word: symbol, number, `nil`, `_`, `___`, ...
    Word(String),
    /// A double-quoted string literal with escapes resolved.
    Str(String),
    /// A `#"..."` symbol, for names that are not valid bare words.
    Symbol(String),
    /// A `/.../` literal; only produced when regex literals are enabled.
    Regex(String),
}

/// A token together with the 1-based line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub token: Token,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub message: String,
    pub line: usize,
}

pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    regex_literals: bool,
}

impl<'a> Lexer<'a> {
    /// Lexer for data text: `/` is an ordinary word character.
    pub fn data(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
            regex_literals: false,
        }
    }

    /// Lexer for pattern text: a word starting with `/` is a regex literal.
    pub fn pattern(input: &'a str) -> Self {
        Self {
            regex_literals: true,
            ..Self::data(input)
        }
    }

    /// Tokenize the whole input.
    pub fn tokenize(mut self) -> Result<Vec<Spanned>, LexError> {
        let mut tokens = Vec::new();
        while let Some(spanned) = self.next_token()? {
            tokens.push(spanned);
        }
        Ok(tokens)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn skip_trivia(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() {
                self.bump();
            } else if c == ';' {
                while let Some(&c) = self.chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.bump();
                }
            } else {
                break;
            }
        }
    }

    fn next_token(&mut self) -> Result<Option<Spanned>, LexError> {
        self.skip_trivia();
        let line = self.line;
        let Some(&c) = self.chars.peek() else {
            return Ok(None);
        };

        let token = match c {
            '(' => {
                self.bump();
                Token::Open
            }
            ')' => {
                self.bump();
                Token::Close
            }
            '[' => {
                self.bump();
                Token::OpenBracket
            }
            ']' => {
                self.bump();
                Token::CloseBracket
            }
            '"' => {
                self.bump();
                Token::Str(self.string_literal(line)?)
            }
            '#' => {
                self.bump();
                if self.chars.peek() == Some(&'"') {
                    self.bump();
                    Token::Symbol(self.string_literal(line)?)
                } else {
                    Token::Word(format!("#{}", self.word()))
                }
            }
            '/' if self.regex_literals => {
                self.bump();
                Token::Regex(self.regex_literal(line)?)
            }
            _ => Token::Word(self.word()),
        };

        Ok(Some(Spanned { token, line }))
    }

    fn string_literal(&mut self, line: usize) -> Result<String, LexError> {
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some(other) => out.push(other),
                    None => break,
                },
                Some(c) => out.push(c),
                None => break,
            }
        }
        Err(LexError {
            message: "unterminated string literal".to_string(),
            line,
        })
    }

    fn regex_literal(&mut self, line: usize) -> Result<String, LexError> {
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('/') => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('/') => out.push('/'),
                    Some(other) => {
                        out.push('\\');
                        out.push(other);
                    }
                    None => break,
                },
                Some(c) => out.push(c),
                None => break,
            }
        }
        Err(LexError {
            message: "unterminated regex literal".to_string(),
            line,
        })
    }

    fn word(&mut self) -> String {
        let mut out = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() || matches!(c, '(' | ')' | '[' | ']' | '"' | ';') {
                break;
            }
            out.push(c);
            self.bump();
        }
        out
    }
}
