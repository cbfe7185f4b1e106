//! Canonical renderings of matchers.
//!
//! `Display` produces the debug form used in fixtures and error messages
//! (`q(:a, _) | t(:b)`); the alternate flag (`{:#}`) spells every combinator
//! as a call (`any(q(:a, _), t(:b))`). [`Matcher::to_pattern_text`] produces
//! text in the pattern grammar that [`Matcher::parse`] reads back.

use crate::matcher::algebra::Matcher;
use crate::sexp::value::{write_quoted, write_symbol};
use crate::sexp::Value;
use std::fmt;

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let call_form = f.alternate();
        match self {
            Matcher::Wild => write!(f, "_"),
            Matcher::Remaining => write!(f, "___"),
            Matcher::Atom => write!(f, "atom"),
            Matcher::Type(tag) => write!(f, "t({tag})"),
            Matcher::Pattern(pattern) => write!(f, "m(/{}/)", pattern.as_str()),
            Matcher::Include(inner) => call(f, "include", &[&**inner]),
            Matcher::Child(inner) => call(f, "child", &[&**inner]),
            Matcher::Not(inner) => call(f, "not?", &[&**inner]),
            Matcher::Sibling {
                subject,
                sibling,
                distance,
            } => {
                if *distance != 1 {
                    write!(f, "sibling(")?;
                    write_child(f, subject)?;
                    write!(f, ", ")?;
                    write_child(f, sibling)?;
                    return write!(f, ", {distance})");
                }
                if call_form {
                    return call(f, "sibling", &[&**subject, &**sibling]);
                }
                infix(f, ">>", self, &[&**subject, &**sibling])
            }
            Matcher::Any(options) => {
                if call_form || options.is_empty() {
                    call_list(f, "any", options)
                } else {
                    infix_list(f, "|", self, options)
                }
            }
            Matcher::All(required) => {
                if call_form || required.is_empty() {
                    call_list(f, "all", required)
                } else {
                    infix_list(f, "&", self, required)
                }
            }
            Matcher::Structural(elements) => call_list(f, "q", elements),
            Matcher::Equals(value) => write!(f, "{value}"),
        }
    }
}

fn write_child(f: &mut fmt::Formatter<'_>, m: &Matcher) -> fmt::Result {
    if f.alternate() {
        write!(f, "{m:#}")
    } else {
        write!(f, "{m}")
    }
}

fn call(f: &mut fmt::Formatter<'_>, name: &str, args: &[&Matcher]) -> fmt::Result {
    write!(f, "{name}(")?;
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write_child(f, arg)?;
    }
    write!(f, ")")
}

fn call_list(f: &mut fmt::Formatter<'_>, name: &str, args: &[Matcher]) -> fmt::Result {
    write!(f, "{name}(")?;
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write_child(f, arg)?;
    }
    write!(f, ")")
}

fn is_infix(m: &Matcher) -> bool {
    match m {
        Matcher::Any(operands) | Matcher::All(operands) => !operands.is_empty(),
        Matcher::Sibling { distance, .. } => *distance == 1,
        _ => false,
    }
}

/// Chains of `|` or `&` read the same either way round; `>>` does not, so a
/// sibling operand is always parenthesised.
fn write_operand(f: &mut fmt::Formatter<'_>, parent: &Matcher, operand: &Matcher) -> fmt::Result {
    let grouped = matches!(operand, Matcher::Sibling { .. })
        || std::mem::discriminant(operand) != std::mem::discriminant(parent);
    if is_infix(operand) && grouped {
        write!(f, "({operand})")
    } else {
        write!(f, "{operand}")
    }
}

fn infix(
    f: &mut fmt::Formatter<'_>,
    op: &str,
    parent: &Matcher,
    operands: &[&Matcher],
) -> fmt::Result {
    for (i, operand) in operands.iter().enumerate() {
        if i > 0 {
            write!(f, " {op} ")?;
        }
        write_operand(f, parent, operand)?;
    }
    Ok(())
}

fn infix_list(
    f: &mut fmt::Formatter<'_>,
    op: &str,
    parent: &Matcher,
    operands: &[Matcher],
) -> fmt::Result {
    for (i, operand) in operands.iter().enumerate() {
        if i > 0 {
            write!(f, " {op} ")?;
        }
        write_operand(f, parent, operand)?;
    }
    Ok(())
}

impl Matcher {
    /// Render in the textual pattern grammar, e.g. `(defn [atom] _ ___)`.
    pub fn to_pattern_text(&self) -> String {
        let mut out = String::new();
        self.write_pattern_text(&mut out);
        out
    }

    fn write_pattern_text(&self, out: &mut String) {
        match self {
            Matcher::Wild => out.push('_'),
            Matcher::Remaining => out.push_str("___"),
            Matcher::Atom => out.push_str("[atom]"),
            Matcher::Type(tag) => {
                out.push_str("[t ");
                write_literal(tag, out);
                out.push(']');
            }
            Matcher::Pattern(pattern) => {
                out.push_str("[m /");
                escape_delimiters(pattern.as_str(), out);
                out.push_str("/]");
            }
            Matcher::Include(inner) => command(out, "include", [&**inner]),
            Matcher::Child(inner) => command(out, "child", [&**inner]),
            Matcher::Not(inner) => command(out, "not?", [&**inner]),
            Matcher::Sibling {
                subject,
                sibling,
                distance,
            } => {
                out.push_str("[>> ");
                subject.write_pattern_text(out);
                out.push(' ');
                sibling.write_pattern_text(out);
                if *distance != 1 {
                    out.push_str(&format!(" {distance}"));
                }
                out.push(']');
            }
            Matcher::Any(options) => command(out, "any", options),
            Matcher::All(required) => command(out, "all", required),
            Matcher::Structural(elements) => {
                out.push('(');
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    element.write_pattern_text(out);
                }
                out.push(')');
            }
            Matcher::Equals(value) => write_literal(value, out),
        }
    }
}

/// A value as pattern text. Symbols the pattern grammar would read as
/// something else (`_`, `___`, a regex literal) are quoted.
fn write_literal(value: &Value, out: &mut String) {
    match value {
        Value::Symbol(name) if name == "_" || name == "___" || name.starts_with('/') => {
            out.push('#');
            write_quoted(name, out);
        }
        Value::Symbol(name) => write_symbol(name, out),
        Value::List(sexp) => {
            out.push('(');
            for (i, item) in sexp.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                write_literal(item, out);
            }
            out.push(')');
        }
        atom => atom.write_source(out),
    }
}

fn command<'a>(out: &mut String, name: &str, args: impl IntoIterator<Item = &'a Matcher>) {
    out.push('[');
    out.push_str(name);
    for arg in args {
        out.push(' ');
        arg.write_pattern_text(out);
    }
    out.push(']');
}

/// Escape bare `/` so the regex survives inside `/.../`.
fn escape_delimiters(source: &str, out: &mut String) {
    let mut escaped = false;
    for c in source.chars() {
        if c == '/' && !escaped {
            out.push('\\');
        }
        escaped = c == '\\' && !escaped;
        out.push(c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sexp::Value;

    fn q(text: &str) -> Matcher {
        Matcher::parse(text).unwrap().unwrap()
    }

    #[test]
    fn debug_rendering() {
        assert_eq!(Matcher::Wild.to_string(), "_");
        assert_eq!(Matcher::Remaining.to_string(), "___");
        assert_eq!(Matcher::Atom.to_string(), "atom");
        assert_eq!(Matcher::t("a").to_string(), "t(:a)");
        assert_eq!(q("(a)").to_string(), "q(:a)");
        assert_eq!(q("(a [m /a/])").to_string(), "q(:a, m(/a/))");
        assert_eq!((q("(a)") | q("(c)")).to_string(), "q(:a) | q(:c)");
        assert_eq!((q("(a)") & q("(a)")).to_string(), "q(:a) & q(:a)");
        assert_eq!(Matcher::negate(q("(b)")).to_string(), "not?(q(:b))");
        assert_eq!(Matcher::child(q("(a)")).to_string(), "child(q(:a))");
        assert_eq!(Matcher::include(q("(a)")).to_string(), "include(q(:a))");
        assert_eq!(Matcher::include(Matcher::sym("a")).to_string(), "include(:a)");
        assert_eq!((q("(a)") >> q("(b)")).to_string(), "q(:a) >> q(:b)");
        assert_eq!(
            q("(a 42 \"s\" nil _ ___)").to_string(),
            "q(:a, 42, \"s\", nil, _, ___)"
        );
    }

    #[test]
    fn call_form_rendering() {
        assert_eq!(format!("{:#}", q("(a)") | q("(c)")), "any(q(:a), q(:c))");
        assert_eq!(format!("{:#}", q("(a)") & q("(a)")), "all(q(:a), q(:a))");
        assert_eq!(format!("{:#}", q("(a)") >> q("(b)")), "sibling(q(:a), q(:b))");
    }

    #[test]
    fn sibling_with_distance() {
        let m = Matcher::sibling_at(q("(a)"), q("(b)"), 3);
        assert_eq!(m.to_string(), "sibling(q(:a), q(:b), 3)");
        assert_eq!(format!("{m:#}"), "sibling(q(:a), q(:b), 3)");
    }

    #[test]
    fn nested_infix_gets_parens() {
        let m = (q("(a)") | q("(b)")) & q("(c)");
        assert_eq!(m.to_string(), "(q(:a) | q(:b)) & q(:c)");
        let chained = q("(a)") | q("(b)") | q("(c)");
        assert_eq!(chained.to_string(), "q(:a) | q(:b) | q(:c)");
    }

    #[test]
    fn sibling_grouping_is_kept() {
        let (a, b, c) = (Matcher::t("a"), Matcher::t("b"), Matcher::t("c"));
        let left = (a.clone() >> b.clone()) >> c.clone();
        let right = a >> (b >> c);
        assert_eq!(left.to_string(), "(t(:a) >> t(:b)) >> t(:c)");
        assert_eq!(right.to_string(), "t(:a) >> (t(:b) >> t(:c))");
        assert_eq!(
            (left | Matcher::Atom).to_string(),
            "((t(:a) >> t(:b)) >> t(:c)) | atom"
        );
    }

    #[test]
    fn empty_combinations() {
        assert_eq!(Matcher::any_of(Vec::<Matcher>::new()).to_string(), "any()");
        assert_eq!(Matcher::all_of(Vec::<Matcher>::new()).to_string(), "all()");
        assert_eq!(Matcher::any_of(Vec::<Matcher>::new()).to_pattern_text(), "[any]");
        assert_eq!(q("[all]"), Matcher::All(vec![]));
    }

    #[test]
    fn pattern_text() {
        assert_eq!(q("(a _ (b cde) ___)").to_pattern_text(), "(a _ (b cde) ___)");
        assert_eq!(q("(a [t b])").to_pattern_text(), "(a [t b])");
        assert_eq!(q("(a [m /b/])").to_pattern_text(), "(a [m /b/])");
        assert_eq!(Matcher::Atom.to_pattern_text(), "[atom]");
        assert_eq!(
            Matcher::sibling_at(Matcher::t("a"), Matcher::Wild, 2).to_pattern_text(),
            "[>> [t a] _ 2]"
        );
        assert_eq!(
            (Matcher::t("a") | Matcher::from(Value::Nil)).to_pattern_text(),
            "[any [t a] nil]"
        );
    }

    #[test]
    fn literals_that_collide_with_the_grammar_are_quoted() {
        let cases = [
            (Matcher::sym("a b"), r#"#"a b""#),
            (Matcher::sym("_"), r#"#"_""#),
            (Matcher::sym("___"), r#"#"___""#),
            (Matcher::sym("/x"), r#"#"/x""#),
            (Matcher::sym("nil"), r#"#"nil""#),
            (Matcher::t("_"), r#"[t #"_"]"#),
            (Matcher::Type(Value::Nil), "[t nil]"),
            (Matcher::Type(Value::Int(3)), "[t 3]"),
        ];
        for (m, text) in cases {
            assert_eq!(m.to_pattern_text(), text);
            assert_eq!(q(text), m, "{text}");
        }

        let list = Matcher::Type(Value::List(crate::sexp::Sexp::from_vec(vec![
            Value::sym("a"),
            Value::sym("_"),
        ])));
        assert_eq!(list.to_pattern_text(), r#"[t (a #"_")]"#);
        assert_eq!(q(&list.to_pattern_text()), list);
    }

    #[test]
    fn regex_delimiters_are_escaped() {
        let m = Matcher::m("a/b").unwrap();
        assert_eq!(m.to_pattern_text(), r"[m /a\/b/]");
        assert_eq!(q(&m.to_pattern_text()), m);
    }
}
