//! Error definitions.
use std::error::Error;
use std::{fmt, result};

/// A specialized Result type for this library.
pub type Result<T, E = SimtextError> = result::Result<T, E>;

/// Errors in this library.
#[derive(Debug)]
pub enum SimtextError {
    /// Contains [`InputError`].
    Input(InputError),
}

impl fmt::Display for SimtextError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Input(e) => e.fmt(f),
        }
    }
}

impl Error for SimtextError {}

impl SimtextError {
    pub(crate) fn input<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::Input(InputError { msg: msg.into() })
    }
}

/// Error used when the input argument is invalid.
#[derive(Debug)]
pub struct InputError {
    msg: String,
}

impl InputError {
    /// Gets the error message.
    pub fn msg(&self) -> &str {
        &self.msg
    }
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InputError: {}", self.msg)
    }
}
