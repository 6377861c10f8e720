use std::error;
use std::fmt;
use std::io;
use std::result;

pub type Result<T> = result::Result<T, SassError>;

#[derive(Debug, Clone, PartialEq)]
pub struct SassError {
    pub message: String,
    pub kind: ErrorKind,
}

impl SassError {
    pub fn new<S: Into<String>>(kind: ErrorKind, message: S) -> SassError {
        SassError {
            kind: kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for SassError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl error::Error for SassError {}

impl From<io::Error> for SassError {
    fn from(err: io::Error) -> SassError {
        SassError {
            message: err.to_string(),
            kind: ErrorKind::IoError,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ErrorKind {
    IoError,
    DefinitionNotFound,
    ArgumentMismatch,
    NodeNotExpanded,
    NotAllowedInFunction,
    NotAllowedInMixin,
    ReturnOutsideFunction,
    InvalidDirective,
    InvalidCondition,
    InvalidArguments,
    IncompatibleUnits,
    InvalidSquareUnits,
    ImportNotFound,
    InvalidValue,
}
