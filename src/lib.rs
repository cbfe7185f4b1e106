//! sexp-path: pattern matching, search and rewriting for s-expression trees
//!
//! Trees are [`Sexp`] nodes holding [`Value`] slots. Patterns are
//! [`Matcher`]s, built programmatically or parsed from pattern text, and
//! are applied to trees by the search and replace engines.
//!
//! # Architecture
//!
//! Matching is total: a matcher answers `true` or `false` for any value or
//! node and never fails. Errors only come from turning text into patterns
//! or trees, and from handing a plain value to an operation that needs a
//! matcher.
//!
//! Identity of a match is its [`NodePath`] from the searched root, so
//! value-equal subtrees at different positions stay distinct and replace
//! can substitute exactly the occurrence that matched.
//!
//! # Example
//!
//! ```
//! use sexp_path::{divide, replace, Matcher, Sexp, Value};
//!
//! let tree = Sexp::parse(
//!     "(class cake nil (defn foo (args) (add a b)) (defn bar (args) (sub a b)))",
//! )?;
//!
//! let defn: Matcher = "(defn _ (args) ___)".parse()?;
//! assert_eq!(divide(&tree, &defn)?.len(), 2);
//!
//! let renamed = replace(tree, &Matcher::t("sub"), |_| Value::sym("minus"))?;
//! assert!(renamed.to_source().contains("minus"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cache;
pub mod config;
pub mod files;
pub mod lexer;
pub mod matcher;
pub mod search;
pub mod sexp;

// Re-exports
pub use config::{
    apply_rules, load_from_path, load_from_str, ApplicationError, ConfigError, RuleConfig,
    RuleResult,
};
pub use matcher::{AsMatcher, Matcher, PatternError, Term};
pub use search::{
    divide, find_and_replace_all, gsub, replace, search, sub, MatchCollection, MatchResult, Search,
};
pub use sexp::{NodePath, ReadError, Sexp, Value};
