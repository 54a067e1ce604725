use crate::node::Category;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Syntax,
    MissingMember,
    InvalidEnumValue,
    TypeMismatch,
    Category,
    NonFiniteNumber,
}

/// Everything the tree model, the mapping layer and the codec can fail with.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Error {
    /// Malformed JSON text. Line and column are 1-based.
    #[error("syntax error at line {line}, column {column}: {message}")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },
    #[error("member \"{0}\" not found")]
    MissingMember(String),
    #[error("invalid {type_name} \"{value}\"")]
    InvalidEnumValue {
        type_name: &'static str,
        value: String,
    },
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },
    /// A tree operation that contradicts the node's current content.
    #[error("cannot {action} on {category} node")]
    Category {
        category: Category,
        action: &'static str,
    },
    #[error("cannot encode {0}: JSON numbers must be finite")]
    NonFiniteNumber(f64),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Syntax { .. } => ErrorKind::Syntax,
            Error::MissingMember(_) => ErrorKind::MissingMember,
            Error::InvalidEnumValue { .. } => ErrorKind::InvalidEnumValue,
            Error::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Error::Category { .. } => ErrorKind::Category,
            Error::NonFiniteNumber(_) => ErrorKind::NonFiniteNumber,
        }
    }

    pub(crate) fn mismatch(expected: &'static str, found: impl Into<String>) -> Self {
        Error::TypeMismatch {
            expected,
            found: found.into(),
        }
    }
}

pub fn to_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Syntax => 3,
        ErrorKind::MissingMember => 4,
        ErrorKind::InvalidEnumValue => 5,
        ErrorKind::TypeMismatch => 6,
        ErrorKind::Category => 7,
        ErrorKind::NonFiniteNumber => 8,
    }
}
