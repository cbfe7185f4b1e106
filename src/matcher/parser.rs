//! Recursive-descent parser for pattern text.
//!
//! ```text
//! (defn [m /^test_/] (args ___) ___)
//! ```
//!
//! Parenthesised forms become structural matchers, bare words, strings and
//! `#"..."` symbols become literal values, and `[command ...]` forms build
//! the remaining variants. When the input holds several top-level forms only the last one
//! is kept.

use crate::lexer::{Lexer, Spanned, Token};
use crate::matcher::algebra::{Matcher, TextPattern};
use crate::matcher::errors::PatternError;
use crate::sexp::{Sexp, Value};
use std::str::FromStr;
use tracing::trace;

/// Bracket commands understood by the parser.
pub const COMMANDS: &[&str] = &[
    "atom", "t", "m", "not?", "-", "any", "all", "child", "include", ">>",
];

/// Parse pattern text. Empty input (or input holding only comments) yields
/// `None`.
pub fn parse(text: &str) -> Result<Option<Matcher>, PatternError> {
    let tokens = Lexer::pattern(text)
        .tokenize()
        .map_err(|e| PatternError::malformed(e.message, e.line))?;

    let mut parser = Parser { tokens, pos: 0 };
    let mut last = None;
    while !parser.at_end() {
        last = Some(parser.form()?);
    }
    trace!(pattern = text, parsed = ?last, "parsed pattern");
    Ok(last)
}

impl Matcher {
    /// Parse pattern text; see [`parse`].
    pub fn parse(text: &str) -> Result<Option<Matcher>, PatternError> {
        parse(text)
    }
}

impl FromStr for Matcher {
    type Err = PatternError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        parse(text)?.ok_or_else(|| PatternError::malformed("empty pattern", 1))
    }
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn next(&mut self) -> Option<Spanned> {
        let spanned = self.tokens.get(self.pos).cloned()?;
        self.pos += 1;
        Some(spanned)
    }

    fn form(&mut self) -> Result<Matcher, PatternError> {
        let Some(Spanned { token, line }) = self.next() else {
            return Err(PatternError::malformed("unexpected end of pattern", self.last_line()));
        };

        match token {
            Token::Open => {
                let elements = self.forms_until(&Token::Close, "unclosed '('", line)?;
                Ok(Matcher::Structural(elements))
            }
            Token::OpenBracket => self.command(line),
            Token::Close => Err(PatternError::malformed("unexpected ')'", line)),
            Token::CloseBracket => Err(PatternError::malformed("unexpected ']'", line)),
            Token::Word(word) => Ok(match word.as_str() {
                "_" => Matcher::Wild,
                "___" => Matcher::Remaining,
                _ => Matcher::Equals(Value::from_word(&word)),
            }),
            Token::Str(s) => Ok(Matcher::Equals(Value::Str(s))),
            Token::Symbol(name) => Ok(Matcher::Equals(Value::Symbol(name))),
            Token::Regex(re) => TextPattern::new(&re).map(Matcher::Pattern),
        }
    }

    fn forms_until(
        &mut self,
        close: &Token,
        unclosed: &str,
        line: usize,
    ) -> Result<Vec<Matcher>, PatternError> {
        let mut forms = Vec::new();
        loop {
            match self.peek() {
                None => return Err(PatternError::malformed(unclosed, line)),
                Some(token) if token == close => {
                    self.pos += 1;
                    return Ok(forms);
                }
                Some(_) => forms.push(self.form()?),
            }
        }
    }

    fn command(&mut self, line: usize) -> Result<Matcher, PatternError> {
        let name = match self.next() {
            Some(Spanned {
                token: Token::Word(name),
                ..
            }) => name,
            Some(Spanned { line, .. }) => {
                return Err(PatternError::malformed("expected a command name after '['", line))
            }
            None => return Err(PatternError::malformed("unclosed '['", line)),
        };
        if name == "t" {
            return self.type_command(line);
        }
        let mut args = self.forms_until(&Token::CloseBracket, "unclosed '['", line)?;

        let arity = |expected: &str| {
            PatternError::malformed(format!("[{name}] takes {expected}"), line)
        };

        match name.as_str() {
            "atom" if args.is_empty() => Ok(Matcher::Atom),
            "atom" => Err(arity("no arguments")),
            "m" => match args.pop() {
                Some(Matcher::Pattern(pattern)) if args.is_empty() => Ok(Matcher::Pattern(pattern)),
                Some(Matcher::Equals(value)) if args.is_empty() && !value.is_sequence() => {
                    TextPattern::exact(&value.text_form()).map(Matcher::Pattern)
                }
                _ => Err(arity("a single regex or atom")),
            },
            "not?" | "-" | "child" | "include" => {
                let inner = single(args).ok_or_else(|| arity("exactly one pattern"))?;
                Ok(match name.as_str() {
                    "child" => Matcher::Child(Box::new(inner)),
                    "include" => Matcher::Include(Box::new(inner)),
                    _ => Matcher::Not(Box::new(inner)),
                })
            }
            "any" => Ok(Matcher::Any(args)),
            "all" => Ok(Matcher::All(args)),
            ">>" => sibling(args).ok_or_else(|| arity("two patterns and an optional gap")),
            _ => Err(PatternError::UnknownCommand {
                suggestion: suggest(&name),
                name,
            }),
        }
    }

    /// `[t tag]`: the tag is read as plain data, so `_` and `(a b)` are
    /// literal tags here.
    fn type_command(&mut self, line: usize) -> Result<Matcher, PatternError> {
        let arity = || PatternError::malformed("[t] takes a single literal tag", line);
        if self.peek() == Some(&Token::CloseBracket) {
            return Err(arity());
        }
        let tag = self.literal(line)?;
        match self.next() {
            Some(Spanned {
                token: Token::CloseBracket,
                ..
            }) => Ok(Matcher::Type(tag)),
            Some(_) => Err(arity()),
            None => Err(PatternError::malformed("unclosed '['", line)),
        }
    }

    fn literal(&mut self, line: usize) -> Result<Value, PatternError> {
        let Some(Spanned { token, line }) = self.next() else {
            return Err(PatternError::malformed("unclosed '['", line));
        };
        match token {
            Token::Open => {
                let mut items = Vec::new();
                loop {
                    match self.peek() {
                        None => return Err(PatternError::malformed("unclosed '('", line)),
                        Some(Token::Close) => {
                            self.pos += 1;
                            return Ok(Value::List(Sexp::from_vec(items).with_line(line)));
                        }
                        Some(_) => items.push(self.literal(line)?),
                    }
                }
            }
            Token::Word(word) => Ok(Value::from_word(&word)),
            Token::Str(s) => Ok(Value::Str(s)),
            Token::Symbol(name) => Ok(Value::Symbol(name)),
            Token::Close | Token::OpenBracket | Token::CloseBracket | Token::Regex(_) => Err(
                PatternError::malformed("[t] takes a single literal tag", line),
            ),
        }
    }

    fn last_line(&self) -> usize {
        self.tokens.last().map_or(1, |s| s.line)
    }
}

fn single(mut args: Vec<Matcher>) -> Option<Matcher> {
    if args.len() == 1 {
        args.pop()
    } else {
        None
    }
}

fn sibling(args: Vec<Matcher>) -> Option<Matcher> {
    let mut args = args.into_iter();
    let subject = args.next()?;
    let sibling = args.next()?;
    let distance = match args.next() {
        None => 1,
        Some(Matcher::Equals(Value::Int(n))) if n >= 1 => usize::try_from(n).ok()?,
        Some(_) => return None,
    };
    if args.next().is_some() {
        return None;
    }
    Some(Matcher::sibling_at(subject, sibling, distance))
}

fn suggest(name: &str) -> Option<String> {
    COMMANDS
        .iter()
        .map(|cmd| (strsim::levenshtein(name, cmd), *cmd))
        .filter(|(distance, _)| *distance <= 2)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, cmd)| cmd.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sexp::Sexp;

    fn q(text: &str) -> Matcher {
        parse(text).unwrap().unwrap()
    }

    fn lit(word: &str) -> Matcher {
        Matcher::Equals(Value::from_word(word))
    }

    #[test]
    fn empty_input_is_absent() {
        assert_eq!(parse("").unwrap(), None);
        assert_eq!(parse("  ; just a comment\n").unwrap(), None);
        assert!("".parse::<Matcher>().is_err());
    }

    #[test]
    fn atoms() {
        assert_eq!(q("nil"), Matcher::Equals(Value::Nil));
        assert_eq!(q("_"), Matcher::Wild);
        assert_eq!(q("___"), Matcher::Remaining);
        assert_eq!(q("42"), Matcher::Equals(Value::Int(42)));
        assert_eq!(q("\"s\""), Matcher::Equals(Value::Str("s".into())));
        assert_eq!(q("true"), Matcher::Equals(Value::Bool(true)));
    }

    #[test]
    fn structural_forms() {
        assert_eq!(q("()"), Matcher::Structural(vec![]));
        assert_eq!(q("(a)"), Matcher::Structural(vec![lit("a")]));
        assert_eq!(
            q("(a 42 \"s\")"),
            Matcher::Structural(vec![
                lit("a"),
                Matcher::Equals(Value::Int(42)),
                Matcher::Equals(Value::Str("s".into())),
            ])
        );
        assert_eq!(
            q("(a _ (b cde) ___)"),
            Matcher::Structural(vec![
                lit("a"),
                Matcher::Wild,
                Matcher::Structural(vec![lit("b"), lit("cde")]),
                Matcher::Remaining,
            ])
        );
    }

    #[test]
    fn last_form_wins() {
        assert_eq!(q("(a) (b)"), Matcher::Structural(vec![lit("b")]));
    }

    #[test]
    fn bracket_commands() {
        assert_eq!(q("(a [t b])"), Matcher::Structural(vec![lit("a"), Matcher::t("b")]));
        assert_eq!(
            q("(a [m /b/])"),
            Matcher::Structural(vec![lit("a"), Matcher::m("b").unwrap()])
        );
        assert_eq!(q("[m test]"), Matcher::exact("test").unwrap());
        assert_eq!(q("[atom]"), Matcher::Atom);
        assert_eq!(q("(atom)"), Matcher::Structural(vec![lit("atom")]));
        assert_eq!(q("[not? _]"), Matcher::negate(Matcher::Wild));
        assert_eq!(q("[- _]"), Matcher::negate(Matcher::Wild));
        assert_eq!(q("[child (a)]"), Matcher::child(q("(a)")));
        assert_eq!(q("[include a]"), Matcher::include(Matcher::sym("a")));
        assert_eq!(q("[any (a) (b)]"), q("(a)") | q("(b)"));
        assert_eq!(q("[all (a) _]"), q("(a)") & Matcher::Wild);
        assert_eq!(q("[>> (a) (b)]"), q("(a)") >> q("(b)"));
        assert_eq!(q("[>> (a) (b) 3]"), Matcher::sibling_at(q("(a)"), q("(b)"), 3));
    }

    #[test]
    fn type_tags_are_literal_data() {
        assert_eq!(q("[t _]"), Matcher::t("_"));
        assert_eq!(q("[t ___]"), Matcher::t("___"));
        assert_eq!(q("[t nil]"), Matcher::Type(Value::Nil));
        assert_eq!(q(r#"[t #"a b"]"#), Matcher::t("a b"));
        assert_eq!(
            q("[t (a (_ 1))]"),
            Matcher::type_of(Value::List(Sexp::parse("(a (_ 1))").unwrap()))
        );
    }

    #[test]
    fn empty_combinations_are_constants() {
        let tree = Sexp::parse("(a (b))").unwrap();
        assert_eq!(q("[any]"), Matcher::Any(vec![]));
        assert_eq!(q("[all]"), Matcher::All(vec![]));
        assert!(!q("[any]").satisfies(&Value::List(tree.clone())));
        assert!(q("[all]").satisfies(&Value::List(tree)));
        assert!(q("[all]").satisfies(&Value::Nil));
    }

    #[test]
    fn quoted_symbols_are_literals() {
        assert_eq!(q(r#"#"_""#), Matcher::sym("_"));
        assert_eq!(
            q(r#"(#"a b" _)"#),
            Matcher::Structural(vec![Matcher::sym("a b"), Matcher::Wild])
        );
        assert_eq!(q(r#"#"42""#), Matcher::sym("42"));
    }

    #[test]
    fn regex_escapes() {
        let m = q(r"[m /a\/b/]");
        assert!(m.satisfies(&Value::sym("a/b")));
        assert!(q(r"[m /^\d+$/]").satisfies(&Value::Int(12)));
    }

    #[test]
    fn unbalanced_brackets_are_malformed() {
        for bad in ["(a", "a)", "[a", "a]", "(defn [t atom]", "[t (a]", "(a]"] {
            assert!(
                matches!(parse(bad), Err(PatternError::MalformedSyntax { .. })),
                "{bad} should be malformed"
            );
        }
    }

    #[test]
    fn malformed_reports_line() {
        match parse("(a\n  (b\n") {
            Err(PatternError::MalformedSyntax { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn bad_arity_is_malformed() {
        for bad in ["[atom x]", "[t]", "[t a b]", "[t [atom]]", "[t /a/]", "[m]", "[child]", "[>> a]", "[>> a b 0]", "[>> a b c]", "[]"] {
            assert!(
                matches!(parse(bad), Err(PatternError::MalformedSyntax { .. })),
                "{bad} should be malformed"
            );
        }
    }

    #[test]
    fn unknown_command_suggests() {
        match parse("[chlid (a)]") {
            Err(PatternError::UnknownCommand { name, suggestion }) => {
                assert_eq!(name, "chlid");
                assert_eq!(suggestion.as_deref(), Some("child"));
            }
            other => panic!("unexpected {other:?}"),
        }
        let err = parse("[frobnicate]").unwrap_err();
        assert_eq!(err.to_string(), "unknown pattern command '[frobnicate ...]'");
    }

    #[test]
    fn invalid_regex() {
        assert!(matches!(parse("[m /(/]"), Err(PatternError::InvalidRegex { .. })));
    }

    #[test]
    fn parsed_pattern_matches_tree() {
        let tree = Sexp::parse(
            "(class cake nil (defn foo (args) (add a b)) (defn bar (args) (sub a b)))",
        )
        .unwrap();
        let defn = q("(defn _ (args) ___)");
        let hits = tree.walk().filter(|(_, node)| defn.satisfies(*node)).count();
        assert_eq!(hits, 2);
    }
}
