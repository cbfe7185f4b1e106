//! The matcher algebra, its builders and the pattern text parser.
//!
//! Matchers are built either programmatically ([`Matcher::q`], operators)
//! or from pattern text ([`Matcher::parse`]), and are tested against values
//! and nodes with [`Matcher::satisfies`].

pub mod algebra;
pub mod builder;
pub mod errors;
pub mod parser;
mod render;

pub use algebra::{Matcher, Subject, TextPattern};
pub use builder::{AsMatcher, Term};
pub use errors::PatternError;
pub use parser::parse;
