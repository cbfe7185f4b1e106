use crate::cache::get_or_parse_pattern;
use crate::sexp::read_value;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct RuleConfig {
    #[serde(default)]
    pub meta: Metadata,
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

impl RuleConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.rules.is_empty() {
            issues.push(ValidationIssue::EmptyRuleList);
        }

        let mut seen = HashSet::new();
        for rule in &self.rules {
            if rule.id.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    rule_id: None,
                    field: "id",
                });
            } else if !seen.insert(rule.id.as_str()) {
                issues.push(ValidationIssue::DuplicateId {
                    rule_id: rule.id.clone(),
                });
            }
            rule.validate_into(&mut issues);
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RuleDefinition {
    pub id: String,
    /// Pattern text; required by every action except `rename`.
    #[serde(default)]
    pub pattern: Option<String>,
    pub action: Action,
    #[serde(default)]
    pub constraint: Option<Constraints>,
}

impl RuleDefinition {
    fn validate_into(&self, issues: &mut Vec<ValidationIssue>) {
        let rule_id = Some(self.id.clone());
        let invalid = |field: &'static str, message: String| ValidationIssue::InvalidValue {
            rule_id: rule_id.clone(),
            field,
            message,
        };

        match (&self.action, self.pattern.as_deref()) {
            (Action::Rename { .. }, Some(_)) => issues.push(invalid(
                "pattern",
                "rename works on atoms and takes no pattern".to_string(),
            )),
            (Action::Rename { .. }, None) => {}
            (_, None) => issues.push(ValidationIssue::MissingField {
                rule_id: rule_id.clone(),
                field: "pattern",
            }),
            (_, Some(text)) => match get_or_parse_pattern(text) {
                Ok(Some(_)) => {}
                Ok(None) => issues.push(ValidationIssue::MissingField {
                    rule_id: rule_id.clone(),
                    field: "pattern",
                }),
                Err(e) => issues.push(invalid("pattern", e.to_string())),
            },
        }

        match &self.action {
            Action::Replace { with } | Action::ReplaceFirst { with } => {
                if let Err(e) = read_value(with) {
                    issues.push(invalid("action.with", e.to_string()));
                }
            }
            Action::Rename { from, to } => {
                for (field, text) in [("action.from", from), ("action.to", to)] {
                    match read_value(text) {
                        Ok(value) if value.is_sequence() => {
                            issues.push(invalid(field, format!("'{text}' is not an atom")))
                        }
                        Ok(_) => {}
                        Err(e) => issues.push(invalid(field, e.to_string())),
                    }
                }
            }
            Action::Expect { .. } => {}
        }

        if let Some(constraint) = &self.constraint {
            if constraint.ensure_absent && constraint.ensure_present {
                issues.push(ValidationIssue::InvalidCombo {
                    rule_id: rule_id.clone(),
                    message: "ensure_absent and ensure_present cannot both be true".to_string(),
                });
            }
            if self.pattern.is_none() && (constraint.ensure_absent || constraint.ensure_present) {
                issues.push(ValidationIssue::InvalidCombo {
                    rule_id: rule_id.clone(),
                    message: "constraints need a pattern to check".to_string(),
                });
            }
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Action {
    /// Replace every outermost match with a value in data text.
    Replace { with: String },
    /// Replace only the first match.
    ReplaceFirst { with: String },
    /// Swap one atom for another everywhere in the tree.
    Rename { from: String, to: String },
    /// Fail unless the pattern matches exactly `count` nodes.
    Expect { count: usize },
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Constraints {
    /// Skip the rule when nothing matches the pattern.
    #[serde(default)]
    pub ensure_absent: bool,
    /// Skip the rule when the pattern already matches somewhere.
    #[serde(default)]
    pub ensure_present: bool,
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub enum ValidationIssue {
    EmptyRuleList,
    MissingField {
        rule_id: Option<String>,
        field: &'static str,
    },
    DuplicateId {
        rule_id: String,
    },
    InvalidValue {
        rule_id: Option<String>,
        field: &'static str,
        message: String,
    },
    InvalidCombo {
        rule_id: Option<String>,
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyRuleList => write!(f, "rule file contains no rules"),
            ValidationIssue::MissingField { rule_id, field } => match rule_id {
                Some(id) => write!(f, "rule '{id}' missing required field '{field}'"),
                None => write!(f, "rule missing required field '{field}'"),
            },
            ValidationIssue::DuplicateId { rule_id } => {
                write!(f, "rule id '{rule_id}' is used more than once")
            }
            ValidationIssue::InvalidValue {
                rule_id,
                field,
                message,
            } => match rule_id {
                Some(id) => write!(f, "rule '{id}' has invalid '{field}': {message}"),
                None => write!(f, "invalid '{field}': {message}"),
            },
            ValidationIssue::InvalidCombo { rule_id, message } => match rule_id {
                Some(id) => write!(f, "rule '{id}' has invalid configuration: {message}"),
                None => write!(f, "invalid rule configuration: {message}"),
            },
        }
    }
}
