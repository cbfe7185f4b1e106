use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    #[error("unexpected ')' at line {line}")]
    UnexpectedClose { line: usize },

    #[error("unclosed '(' opened at line {line}")]
    Unclosed { line: usize },

    #[error("'{token}' is not valid in data text (line {line})")]
    UnsupportedToken { token: String, line: usize },

    #[error("{message} (line {line})")]
    Lex { message: String, line: usize },

    #[error("expected exactly one form, found {count}")]
    FormCount { count: usize },

    #[error("expected a list, found atom {atom}")]
    NotAList { atom: String },
}
