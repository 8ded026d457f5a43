use std::error::Error;
use std::{fmt, io};

pub struct RuntimeError {
    _message: String,
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self._message)
    }
}

impl fmt::Debug for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self._message)
    }
}

impl Error for RuntimeError {}
impl RuntimeError {
    pub fn new<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            _message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self._message
    }
}

impl From<ListingError> for RuntimeError {
    fn from(error: ListingError) -> Self {
        Self::new(error.to_string())
    }
}

impl From<io::Error> for RuntimeError {
    fn from(error: io::Error) -> Self {
        Self::new(format!("I/O error: {error}"))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListingErrorKind {
    NotFound,
    RateLimited,
    Unauthorized,
    TransientNetworkError,
    TruncatedListing,
    OutputWriteError,
}

impl fmt::Display for ListingErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotFound => "NotFound",
            Self::RateLimited => "RateLimited",
            Self::Unauthorized => "Unauthorized",
            Self::TransientNetworkError => "TransientNetworkError",
            Self::TruncatedListing => "TruncatedListing",
            Self::OutputWriteError => "OutputWriteError",
        };
        write!(f, "{name}")
    }
}

/// A fatal failure tied to the repository path (or output file) that caused it.
pub struct ListingError {
    _kind: ListingErrorKind,
    _path: String,
    _detail: String,
}

impl fmt::Display for ListingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self._kind {
            ListingErrorKind::OutputWriteError => "writing",
            _ => "listing",
        };
        write!(
            f,
            "{} while {action} \"{}\": {}",
            self._kind, self._path, self._detail
        )
    }
}

impl fmt::Debug for ListingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Error for ListingError {}
impl ListingError {
    pub fn new<P, D>(kind: ListingErrorKind, path: P, detail: D) -> Self
    where
        P: Into<String>,
        D: Into<String>,
    {
        Self {
            _kind: kind,
            _path: path.into(),
            _detail: detail.into(),
        }
    }

    pub fn kind(&self) -> ListingErrorKind {
        self._kind
    }

    pub fn path(&self) -> &str {
        &self._path
    }

    pub fn detail(&self) -> &str {
        &self._detail
    }
}
