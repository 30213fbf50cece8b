use std::fmt;

/// Failure of the optimization call. Terminal for the submission cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendError {
    Transport(String),
    Status { status: u16, body: String },
    Decode(String),
    /// The backend answered but reported a problem with the data in the body.
    Reported(String),
    WeightCountMismatch { expected: usize, got: usize },
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Transport(detail) => {
                write!(f, "optimization backend unreachable: {detail}")
            }
            BackendError::Status { status, body } => {
                write!(f, "optimization backend HTTP {status}: {body}")
            }
            BackendError::Decode(detail) => {
                write!(f, "optimization backend returned an unreadable response: {detail}")
            }
            BackendError::Reported(message) => {
                write!(f, "optimization backend error: {message}")
            }
            BackendError::WeightCountMismatch { expected, got } => write!(
                f,
                "optimization backend returned {got} weights for {expected} symbols"
            ),
        }
    }
}

impl std::error::Error for BackendError {}
