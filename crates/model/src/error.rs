use std::fmt::{self, Display, Formatter};

/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The provider is not configured, e.g. the credential is missing.
    Configuration,
    /// The service answered with a non-success status.
    Remote,
    /// The request never got an answer (DNS, connection, timeout).
    Transport,
    /// The service answered with a body that is not a usable completion.
    InvalidResponse,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Configuration => write!(f, "Configuration error"),
            ErrorKind::Remote => write!(f, "Remote rejection"),
            ErrorKind::Transport => write!(f, "Transport failure"),
            ErrorKind::InvalidResponse => write!(f, "Invalid response"),
        }
    }
}
