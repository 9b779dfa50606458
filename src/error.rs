use crate::object::ObjectHolder;
use std::error::Error;
use std::fmt;
use std::io;

#[derive(Debug)]
pub struct RuntimeError {
    message: String,
}

impl RuntimeError {
    pub fn new(message: impl Into<String>) -> ErrorType {
        ErrorType::Runtime(RuntimeError {
            message: message.into(),
        })
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for RuntimeError {}

#[derive(Debug)]
pub enum ErrorType {
    /// Carrier for a value travelling from a `return` statement to the
    /// enclosing method body. Absorbed there; never surfaced to callers.
    Return(ObjectHolder),
    Runtime(RuntimeError),
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorType::Return(_) => write!(f, "return outside of a method body"),
            ErrorType::Runtime(x) => x.fmt(f),
        }
    }
}

impl Error for ErrorType {}

impl From<fmt::Error> for ErrorType {
    fn from(error: fmt::Error) -> ErrorType {
        RuntimeError::new(format!("output error: {}", error))
    }
}

impl From<io::Error> for ErrorType {
    fn from(error: io::Error) -> ErrorType {
        RuntimeError::new(format!("output error: {}", error))
    }
}
