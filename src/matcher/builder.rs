//! Programmatic construction of matchers.
//!
//! Every variant has a constructor, plain values coerce into
//! [`Matcher::Equals`], and the usual combinators have operator sugar:
//!
//! ```
//! use sexp_path::Matcher;
//!
//! let defn = Matcher::q([Matcher::sym("defn"), Matcher::Wild, Matcher::Remaining]);
//! let either = defn.clone() | Matcher::t("defs");
//! let ordered = Matcher::t("args") >> Matcher::t("body");
//! let not_defn = -defn;
//! # let _ = (either, ordered, not_defn);
//! ```

use crate::matcher::algebra::{Matcher, TextPattern};
use crate::matcher::errors::PatternError;
use crate::sexp::{Sexp, Value};
use std::ops::{BitAnd, BitOr, Neg, Not, Shr};

impl Matcher {
    pub fn wild() -> Self {
        Matcher::Wild
    }

    pub fn remaining() -> Self {
        Matcher::Remaining
    }

    pub fn atom() -> Self {
        Matcher::Atom
    }

    /// `t(:name)`: a node tagged with the symbol `name`.
    pub fn t(name: &str) -> Self {
        Matcher::Type(Value::sym(name))
    }

    /// A node whose tag is an arbitrary value.
    pub fn type_of(tag: impl Into<Value>) -> Self {
        Matcher::Type(tag.into())
    }

    /// `m(/re/)`, unanchored.
    pub fn m(re: &str) -> Result<Self, PatternError> {
        TextPattern::new(re).map(Matcher::Pattern)
    }

    /// An atom whose text form is exactly `text`.
    pub fn exact(text: &str) -> Result<Self, PatternError> {
        TextPattern::exact(text).map(Matcher::Pattern)
    }

    pub fn include(inner: impl Into<Matcher>) -> Self {
        Matcher::Include(Box::new(inner.into()))
    }

    pub fn child(inner: impl Into<Matcher>) -> Self {
        Matcher::Child(Box::new(inner.into()))
    }

    pub fn sibling(subject: impl Into<Matcher>, sibling: impl Into<Matcher>) -> Self {
        Self::sibling_at(subject, sibling, 1)
    }

    /// Sibling with a minimum gap between the two positions.
    pub fn sibling_at(
        subject: impl Into<Matcher>,
        sibling: impl Into<Matcher>,
        distance: usize,
    ) -> Self {
        Matcher::Sibling {
            subject: Box::new(subject.into()),
            sibling: Box::new(sibling.into()),
            distance,
        }
    }

    pub fn negate(inner: impl Into<Matcher>) -> Self {
        Matcher::Not(Box::new(inner.into()))
    }

    pub fn any(a: impl Into<Matcher>, b: impl Into<Matcher>) -> Self {
        Matcher::Any(vec![a.into(), b.into()])
    }

    pub fn all(a: impl Into<Matcher>, b: impl Into<Matcher>) -> Self {
        Matcher::All(vec![a.into(), b.into()])
    }

    pub fn any_of<I>(options: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Matcher>,
    {
        Matcher::Any(options.into_iter().map(Into::into).collect())
    }

    pub fn all_of<I>(required: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Matcher>,
    {
        Matcher::All(required.into_iter().map(Into::into).collect())
    }

    /// `q(...)`: a structural matcher from a mix of values and matchers.
    pub fn q<I>(elements: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Matcher>,
    {
        Matcher::Structural(elements.into_iter().map(Into::into).collect())
    }

    pub fn equals(value: impl Into<Value>) -> Self {
        Matcher::Equals(value.into())
    }

    /// A literal symbol.
    pub fn sym(name: &str) -> Self {
        Matcher::Equals(Value::sym(name))
    }
}

impl From<Value> for Matcher {
    fn from(value: Value) -> Self {
        Matcher::Equals(value)
    }
}

impl From<Sexp> for Matcher {
    fn from(sexp: Sexp) -> Self {
        Matcher::Equals(Value::List(sexp))
    }
}

/// Append to an existing `Any`/`All` instead of nesting, so `a | b | c`
/// renders flat.
fn chain(lhs: Matcher, rhs: Matcher, any: bool) -> Matcher {
    match (lhs, any) {
        (Matcher::Any(mut options), true) => {
            options.push(rhs);
            Matcher::Any(options)
        }
        (Matcher::All(mut required), false) => {
            required.push(rhs);
            Matcher::All(required)
        }
        (lhs, true) => Matcher::Any(vec![lhs, rhs]),
        (lhs, false) => Matcher::All(vec![lhs, rhs]),
    }
}

impl<T: Into<Matcher>> BitOr<T> for Matcher {
    type Output = Matcher;

    fn bitor(self, rhs: T) -> Matcher {
        chain(self, rhs.into(), true)
    }
}

impl<T: Into<Matcher>> BitAnd<T> for Matcher {
    type Output = Matcher;

    fn bitand(self, rhs: T) -> Matcher {
        chain(self, rhs.into(), false)
    }
}

impl<T: Into<Matcher>> Shr<T> for Matcher {
    type Output = Matcher;

    fn shr(self, rhs: T) -> Matcher {
        Matcher::sibling(self, rhs)
    }
}

impl Not for Matcher {
    type Output = Matcher;

    fn not(self) -> Matcher {
        Matcher::negate(self)
    }
}

impl Neg for Matcher {
    type Output = Matcher;

    fn neg(self) -> Matcher {
        Matcher::negate(self)
    }
}

/// Anything that may be handed to search or replace as a pattern.
///
/// Only real matchers succeed; plain values are rejected with
/// [`PatternError::InvalidPattern`] rather than silently compared by value.
pub trait AsMatcher {
    fn as_matcher(&self) -> Result<&Matcher, PatternError>;
}

impl AsMatcher for Matcher {
    fn as_matcher(&self) -> Result<&Matcher, PatternError> {
        Ok(self)
    }
}

impl AsMatcher for Value {
    fn as_matcher(&self) -> Result<&Matcher, PatternError> {
        Err(PatternError::invalid(format!("{self} needs a pattern")))
    }
}

impl AsMatcher for Sexp {
    fn as_matcher(&self) -> Result<&Matcher, PatternError> {
        Err(PatternError::invalid(format!("{self} needs a pattern")))
    }
}

impl AsMatcher for Term {
    fn as_matcher(&self) -> Result<&Matcher, PatternError> {
        match self {
            Term::Matcher(m) => Ok(m),
            Term::Value(value) => value.as_matcher(),
        }
    }
}

impl<T: AsMatcher + ?Sized> AsMatcher for &T {
    fn as_matcher(&self) -> Result<&Matcher, PatternError> {
        (**self).as_matcher()
    }
}

/// An operand that is either a matcher or a plain value.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Matcher(Matcher),
    Value(Value),
}

impl Term {
    pub fn is_matcher(&self) -> bool {
        matches!(self, Term::Matcher(_))
    }

    /// A plain value becomes an exact-equality matcher.
    pub fn into_matcher(self) -> Matcher {
        match self {
            Term::Matcher(m) => m,
            Term::Value(value) => Matcher::Equals(value),
        }
    }

    /// Case equality: a matcher on either side is tested against the other
    /// side; two plain values compare by value.
    pub fn triple_eq(&self, other: &Term) -> bool {
        match (self, other) {
            (Term::Matcher(a), Term::Matcher(b)) => a == b,
            (Term::Matcher(m), Term::Value(value)) | (Term::Value(value), Term::Matcher(m)) => {
                m.satisfies(value)
            }
            (Term::Value(a), Term::Value(b)) => a == b,
        }
    }

    /// True if the matcher side is satisfied by the value side or by any
    /// node inside it. Exactly one side must be a matcher.
    pub fn matches(&self, other: &Term) -> Result<bool, PatternError> {
        match (self, other) {
            (Term::Matcher(m), Term::Value(value)) | (Term::Value(value), Term::Matcher(m)) => {
                Ok(m.matches_within(value))
            }
            (Term::Value(_), Term::Value(_)) => {
                Err(PatternError::invalid("operand must be a pattern"))
            }
            (Term::Matcher(_), Term::Matcher(_)) => {
                Err(PatternError::invalid("operands can't both be patterns"))
            }
        }
    }
}

impl From<Matcher> for Term {
    fn from(m: Matcher) -> Self {
        Term::Matcher(m)
    }
}

impl From<Value> for Term {
    fn from(value: Value) -> Self {
        Term::Value(value)
    }
}

impl From<Sexp> for Term {
    fn from(sexp: Sexp) -> Self {
        Term::Value(Value::List(sexp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(text: &str) -> Sexp {
        Sexp::parse(text).unwrap()
    }

    #[test]
    fn structural_from_mixed_elements() {
        let m = Matcher::q([
            Matcher::sym("a"),
            Matcher::Wild,
            Matcher::from(Value::Int(1)),
            Matcher::Remaining,
        ]);
        assert!(m.satisfies(&s("(a x 1)")));
        assert!(m.satisfies(&s("(a (y) 1 2 3)")));
        assert!(!m.satisfies(&s("(a x 2)")));
        assert_eq!(m, Matcher::parse("(a _ 1 ___)").unwrap().unwrap());
    }

    #[test]
    fn operators_flatten_chains() {
        let m = Matcher::t("a") | Matcher::t("b") | Matcher::t("c");
        assert!(matches!(&m, Matcher::Any(options) if options.len() == 3));
        let m = Matcher::t("a") & Matcher::Wild & Matcher::Atom;
        assert!(matches!(&m, Matcher::All(required) if required.len() == 3));
        assert_eq!(!Matcher::Wild, -Matcher::Wild);
        assert_eq!(Matcher::t("a") >> Matcher::t("b"), Matcher::sibling(Matcher::t("a"), Matcher::t("b")));
    }

    #[test]
    fn named_combinators() {
        assert_eq!(Matcher::any(Matcher::Wild, Matcher::Atom), Matcher::Wild | Matcher::Atom);
        assert_eq!(Matcher::all(Matcher::Wild, Matcher::Atom), Matcher::Wild & Matcher::Atom);
        assert_eq!(Matcher::any_of([Matcher::Wild]), Matcher::Any(vec![Matcher::Wild]));
        assert!(!Matcher::any_of(Vec::<Matcher>::new()).satisfies(&s("(a)")));
        assert!(Matcher::all_of(Vec::<Matcher>::new()).satisfies(&s("(a)")));
    }

    #[test]
    fn values_coerce_to_equals() {
        assert_eq!(Matcher::from(Value::Nil), Matcher::Equals(Value::Nil));
        assert_eq!(Matcher::from(s("(a)")), Matcher::Equals(Value::List(s("(a)"))));
        assert_eq!(Matcher::equals(3), Matcher::Equals(Value::Int(3)));
        assert_eq!(Matcher::type_of(7), Matcher::Type(Value::Int(7)));
    }

    #[test]
    fn plain_values_are_not_patterns() {
        assert!(Matcher::Wild.as_matcher().is_ok());
        assert!(matches!(
            Value::sym("a").as_matcher(),
            Err(PatternError::InvalidPattern { .. })
        ));
        assert!(s("(a)").as_matcher().is_err());
        assert!(Term::from(Matcher::Atom).as_matcher().is_ok());
        assert!(Term::from(Value::Nil).as_matcher().is_err());
    }

    #[test]
    fn triple_equals() {
        let sexp = Term::from(s("(a b)"));
        let pattern = Term::from(Matcher::t("a"));
        assert!(pattern.triple_eq(&sexp));
        assert!(sexp.triple_eq(&pattern));
        assert!(sexp.triple_eq(&Term::from(s("(a b)"))));
        assert!(!sexp.triple_eq(&Term::from(s("(a c)"))));
        assert!(pattern.triple_eq(&Term::from(Matcher::t("a"))));
        assert!(!pattern.triple_eq(&Term::from(Matcher::t("b"))));
    }

    #[test]
    fn symmetric_match_requires_one_pattern() {
        let tree = Term::from(s("(class x (defn y))"));
        let defn = Term::from(Matcher::t("defn"));
        assert_eq!(defn.matches(&tree).unwrap(), true);
        assert_eq!(tree.matches(&defn).unwrap(), true);
        assert_eq!(Term::from(Matcher::t("nope")).matches(&tree).unwrap(), false);

        let err = tree.matches(&tree.clone()).unwrap_err();
        assert_eq!(err.to_string(), "invalid pattern: operand must be a pattern");
        let err = defn.matches(&defn.clone()).unwrap_err();
        assert_eq!(err.to_string(), "invalid pattern: operands can't both be patterns");
    }

    #[test]
    fn into_matcher() {
        assert_eq!(Term::from(Value::Int(1)).into_matcher(), Matcher::Equals(Value::Int(1)));
        assert_eq!(Term::from(Matcher::Atom).into_matcher(), Matcher::Atom);
        assert!(Term::from(Matcher::Atom).is_matcher());
    }
}
