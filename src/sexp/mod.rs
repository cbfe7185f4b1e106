//! The s-expression tree the matcher engine operates on.
//!
//! A [`Sexp`] is an ordered sequence of [`Value`] slots. Nodes are read from
//! data text with [`reader`], walked in pre-order with [`Sexp::walk`], and
//! addressed by [`NodePath`] when an exact occurrence has to be rewritten.

pub mod errors;
pub mod node;
pub mod reader;
pub mod value;
pub mod walk;

pub use errors::ReadError;
pub use node::Sexp;
pub use reader::{read_all, read_one, read_value};
pub use value::Value;
pub use walk::{NodePath, Nodes, Walk};
