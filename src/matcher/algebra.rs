use crate::matcher::errors::PatternError;
use crate::sexp::{Sexp, Value};
use regex::Regex;
use std::fmt;

/// A regular expression tested against the text form of an atom.
///
/// Two patterns are equal when their sources are equal.
#[derive(Clone)]
pub struct TextPattern {
    regex: Regex,
}

impl TextPattern {
    /// Compile a regular expression (unanchored, like `/re/`).
    pub fn new(source: &str) -> Result<Self, PatternError> {
        let regex = Regex::new(source).map_err(|source_err| PatternError::InvalidRegex {
            pattern: source.to_string(),
            source: source_err,
        })?;
        Ok(Self { regex })
    }

    /// A pattern matching exactly `text` and nothing else.
    pub fn exact(text: &str) -> Result<Self, PatternError> {
        Self::new(&format!(r"\A{}\z", regex::escape(text)))
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for TextPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl fmt::Debug for TextPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.as_str())
    }
}

/// The matcher algebra.
///
/// Matchers only test trees, they never modify them. Literal values inside a
/// pattern are represented by [`Matcher::Equals`].
#[derive(Debug, Clone, PartialEq)]
pub enum Matcher {
    /// `_`: anything.
    Wild,
    /// `___`: anything; as the last element of a structural pattern it
    /// absorbs every remaining slot.
    Remaining,
    /// `atom`: any non-sequence value.
    Atom,
    /// `t(tag)`: a sequence whose slot 0 equals the tag.
    Type(Value),
    /// `m(/re/)`: an atom whose text form matches the regex.
    Pattern(TextPattern),
    /// A sequence with at least one direct slot satisfying the inner matcher.
    Include(Box<Matcher>),
    /// The value itself or any descendant node satisfies the inner matcher.
    Child(Box<Matcher>),
    /// Two slots `i < j` of a sequence, `j - i >= distance`, satisfying
    /// `subject` and `sibling` respectively.
    Sibling {
        subject: Box<Matcher>,
        sibling: Box<Matcher>,
        distance: usize,
    },
    Not(Box<Matcher>),
    Any(Vec<Matcher>),
    All(Vec<Matcher>),
    /// `q(...)`: a sequence shape matched position by position.
    Structural(Vec<Matcher>),
    /// A plain value used as a pattern: exact equality.
    Equals(Value),
}

/// The thing a matcher is tested against: an atom or a node.
#[derive(Debug, Clone, Copy)]
pub enum Subject<'a> {
    Value(&'a Value),
    Node(&'a Sexp),
}

impl<'a> Subject<'a> {
    pub fn as_sexp(self) -> Option<&'a Sexp> {
        match self {
            Subject::Value(value) => value.as_sexp(),
            Subject::Node(node) => Some(node),
        }
    }

    /// The atom, or `None` when the subject is a sequence.
    pub fn as_atom(self) -> Option<&'a Value> {
        match self {
            Subject::Value(value) if !value.is_sequence() => Some(value),
            _ => None,
        }
    }

    pub fn is_sequence(self) -> bool {
        self.as_sexp().is_some()
    }

    fn equals(self, value: &Value) -> bool {
        match self {
            Subject::Value(v) => v == value,
            Subject::Node(node) => value.as_sexp() == Some(node),
        }
    }
}

impl<'a> From<&'a Value> for Subject<'a> {
    fn from(value: &'a Value) -> Self {
        Subject::Value(value)
    }
}

impl<'a> From<&'a Sexp> for Subject<'a> {
    fn from(node: &'a Sexp) -> Self {
        Subject::Node(node)
    }
}

impl Matcher {
    /// Test `x` against this matcher.
    ///
    /// Shape mismatches are simply `false`; matching is total over any tree.
    pub fn satisfies<'a>(&self, x: impl Into<Subject<'a>>) -> bool {
        self.test(x.into())
    }

    fn test(&self, x: Subject<'_>) -> bool {
        match self {
            Matcher::Wild | Matcher::Remaining => true,
            Matcher::Atom => !x.is_sequence(),
            Matcher::Type(tag) => x
                .as_sexp()
                .and_then(Sexp::tag)
                .is_some_and(|first| first == tag),
            Matcher::Pattern(pattern) => x
                .as_atom()
                .is_some_and(|atom| pattern.is_match(&atom.text_form())),
            Matcher::Include(inner) => x
                .as_sexp()
                .is_some_and(|sexp| sexp.iter().any(|item| inner.satisfies(item))),
            Matcher::Child(inner) => {
                inner.test(x)
                    || x.as_sexp().is_some_and(|sexp| {
                        sexp.nodes().skip(1).any(|node| inner.satisfies(node))
                    })
            }
            Matcher::Sibling {
                subject,
                sibling,
                distance,
            } => x
                .as_sexp()
                .is_some_and(|sexp| sibling_match(sexp, subject, sibling, *distance)),
            Matcher::Not(inner) => !inner.test(x),
            Matcher::Any(options) => options.iter().any(|m| m.test(x)),
            Matcher::All(required) => required.iter().all(|m| m.test(x)),
            Matcher::Structural(elements) => x
                .as_sexp()
                .is_some_and(|sexp| structural_match(elements, sexp)),
            Matcher::Equals(value) => x.equals(value),
        }
    }

    /// True when this matcher accepts a variable number of trailing slots.
    pub fn is_greedy(&self) -> bool {
        match self {
            Matcher::Remaining => true,
            Matcher::Structural(elements) => matches!(elements.last(), Some(Matcher::Remaining)),
            Matcher::Wild
            | Matcher::Atom
            | Matcher::Type(_)
            | Matcher::Pattern(_)
            | Matcher::Include(_)
            | Matcher::Child(_)
            | Matcher::Sibling { .. }
            | Matcher::Not(_)
            | Matcher::Any(_)
            | Matcher::All(_)
            | Matcher::Equals(_) => false,
        }
    }

    /// True if `value` or, for a node, any node inside it satisfies this
    /// matcher.
    pub fn matches_within(&self, value: &Value) -> bool {
        match value {
            Value::List(sexp) => sexp.nodes().any(|node| self.satisfies(node)),
            atom => self.satisfies(atom),
        }
    }
}

fn structural_match(elements: &[Matcher], sexp: &Sexp) -> bool {
    let greedy = matches!(elements.last(), Some(Matcher::Remaining));
    let fixed = if greedy {
        elements.len() - 1
    } else {
        elements.len()
    };

    let arity_ok = if greedy {
        sexp.len() >= fixed
    } else {
        sexp.len() == fixed
    };

    arity_ok
        && elements[..fixed]
            .iter()
            .zip(sexp.iter())
            .all(|(element, item)| element.satisfies(item))
}

fn sibling_match(sexp: &Sexp, subject: &Matcher, sibling: &Matcher, distance: usize) -> bool {
    let positions = |m: &Matcher| -> Vec<usize> {
        sexp.iter()
            .enumerate()
            .filter(|(_, item)| m.satisfies(*item))
            .map(|(i, _)| i)
            .collect()
    };

    let subjects = positions(subject);
    if subjects.is_empty() {
        return false;
    }
    let siblings = positions(sibling);

    subjects
        .iter()
        .any(|&i| siblings.iter().any(|&j| j > i && j - i >= distance))
}
