use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Message shown for both unknown usernames and wrong passwords so the
/// login form does not reveal which accounts exist.
const INVALID_CREDENTIALS: &str = "Invalid credentials. Please check your username and password.";

/// Authentication failures raised by a login attempt
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("{}", INVALID_CREDENTIALS)]
    NotFound,

    #[error("{}", INVALID_CREDENTIALS)]
    BadCredential,
}

/// Form field a validation error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Username,
    Password,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Username => write!(f, "Username"),
            Field::Password => write!(f, "Password"),
        }
    }
}

/// Rejected signup or login form input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} cannot be empty")]
    EmptyField(Field),

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Username already exists. Please choose a different username.")]
    DuplicateUser,
}

/// Non-fatal arithmetic failures. The calculator shows an error marker
/// and stays usable.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalculationError {
    #[error("Division by zero is not allowed")]
    DivideByZero,

    #[error("Cannot calculate square root of negative number")]
    NegativeSquareRoot,

    #[error("Cannot calculate log of non-positive number")]
    NonPositiveLogarithm,

    #[error("Factorial only works with non-negative integers")]
    InvalidFactorial,

    #[error("Result is too large to display")]
    NonFinite,

    #[error("Invalid input. Please enter a valid number.")]
    InvalidInput,
}

/// Failures of the durable JSON files backing the stores
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("could not read {}: {reason}", .path.display())]
    Unreadable { path: PathBuf, reason: String },

    #[error("could not save to {}: {reason}", .path.display())]
    Unwritable { path: PathBuf, reason: String },
}

impl StorageError {
    pub fn unreadable(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        StorageError::Unreadable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn unwritable(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        StorageError::Unwritable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Everything a session operation can report back to the front end
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Please log in to use the calculator")]
    NotAuthenticated,

    #[error("Log out before creating another account")]
    AlreadyAuthenticated,

    #[error("Password hashing failed: {0}")]
    HashFailure(String),
}
