//! Rewrite rule files: TOML documents listing patterns and what to do with
//! the nodes they match.

pub mod applicator;
pub mod loader;
pub mod schema;

pub use applicator::{apply_rule, apply_rules, ApplicationError, RuleResult};
pub use loader::{load_from_path, load_from_str, ConfigError};
pub use schema::{
    Action, Constraints, Metadata, RuleConfig, RuleDefinition, ValidationError, ValidationIssue,
};
