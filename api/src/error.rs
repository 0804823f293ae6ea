use thiserror::Error;

/// Failure of a single backend request.
///
/// Nothing in the dashboard retries; callers classify the error with
/// [`ApiError::kind`] and either reload the page or show it inline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("session expired (HTTP 401)")]
    Unauthorized,

    #[error("backend unreachable: {0}")]
    Unreachable(String),

    #[error("not found (HTTP 404)")]
    NotFound,

    #[error("Error: {0}")]
    Status(u16),

    #[error("response envelope carried status {status} without data")]
    EmptyEnvelope { status: u16 },

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("invalid request url: {0}")]
    Url(String),
}

/// Coarse taxonomy the views act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 401 or an unreachable server: the only recovery is a full page reload.
    AuthExpired,
    /// 404 on a single resource lookup.
    NotFound,
    /// Anything else; shown inline as `Error: <status>`.
    Generic,
}

impl ApiError {
    pub fn from_status(status: u16) -> Self {
        match status {
            0 => Self::Unreachable("status 0".into()),
            401 => Self::Unauthorized,
            404 => Self::NotFound,
            other => Self::Status(other),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized | Self::Unreachable(_) => ErrorKind::AuthExpired,
            Self::NotFound => ErrorKind::NotFound,
            _ => ErrorKind::Generic,
        }
    }

    /// HTTP status code when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::NotFound => Some(404),
            Self::Status(code) => Some(*code),
            Self::EmptyEnvelope { status } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_status(status.as_u16());
        }
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Unreachable(err.to_string())
        }
    }
}

impl From<url::ParseError> for ApiError {
    fn from(err: url::ParseError) -> Self {
        Self::Url(err.to_string())
    }
}
