use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    InvalidOption(String),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("No valid solution found")]
    NoSolution,
    #[error("matrix has {nodes} nodes, the solver supports at most {max}")]
    TooManyNodes { nodes: usize, max: usize },
    #[error("tour cost overflowed the matrix cost type")]
    CostOverflow,
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// How a caller should surface an [`Error`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// The request itself was unusable.
    Client,
    /// The request was fine but no tour exists.
    NoSolution,
    Internal,
}

impl Error {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn invalid_option(message: impl Into<String>) -> Self {
        Self::InvalidOption(message.into())
    }

    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) | Self::InvalidOption(_) | Self::TooManyNodes { .. } => {
                ErrorKind::Client
            }
            Self::NoSolution => ErrorKind::NoSolution,
            Self::Io(_)
            | Self::Json(_)
            | Self::InvalidData(_)
            | Self::CostOverflow
            | Self::Other(_) => ErrorKind::Internal,
        }
    }
}
