use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum PatternError {
    /// Pattern text could not be parsed (unbalanced brackets, bad literal).
    #[error("malformed pattern syntax at line {line}: {message}")]
    MalformedSyntax { message: String, line: usize },

    /// A plain value was supplied where a matcher is required.
    #[error("invalid pattern: {message}")]
    InvalidPattern { message: String },

    #[error("invalid regex /{pattern}/: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("unknown pattern command '[{name} ...]'{}", did_you_mean(.suggestion))]
    UnknownCommand {
        name: String,
        suggestion: Option<String>,
    },
}

impl PatternError {
    pub(crate) fn malformed(message: impl Into<String>, line: usize) -> Self {
        PatternError::MalformedSyntax {
            message: message.into(),
            line,
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        PatternError::InvalidPattern {
            message: message.into(),
        }
    }
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(", did you mean '{s}'?"),
        None => String::new(),
    }
}
