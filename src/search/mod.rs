//! Searching trees and rewriting what was found.

pub mod engine;
pub mod replacer;
pub mod result;

pub use engine::{divide, search, Search};
pub use replacer::{find_and_replace_all, gsub, replace, sub};
pub use result::{MatchCollection, MatchResult};
