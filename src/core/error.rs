use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Parse,
    NotFound,
    AlreadyExists,
    InvalidArgument,
    UnknownField,
    InvalidQueryValue,
    CorruptStore,
    Codec,
    Config,
}

#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub context: String,
}

impl Error {
    pub fn new(kind: ErrorKind, context: impl Into<String>) -> Self {
        Error { kind, context: context.into() }
    }

    pub fn unknown_field(name: &str) -> Self {
        Error::new(ErrorKind::UnknownField, format!("field '{}' is not declared", name))
    }

    pub fn corrupt(line: usize, context: impl fmt::Display) -> Self {
        Error::new(ErrorKind::CorruptStore, format!("line {}: {}", line, context))
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.context)
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error {
            kind: ErrorKind::Io,
            context: err.to_string(),
        }
    }
}

impl From<lz4_flex::frame::Error> for Error {
    fn from(err: lz4_flex::frame::Error) -> Self {
        Error {
            kind: ErrorKind::Codec,
            context: format!("lz4 frame error: {}", err),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            kind: ErrorKind::Parse,
            context: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error {
            kind: ErrorKind::Config,
            context: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
