use std::fmt;

use serde::Deserialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;
pub type TokenReaderResult<T> = std::result::Result<T, TokenReaderError>;

#[derive(Error, Debug)]
pub enum Error {
    /// Etsy answered with an `errors` payload.
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("{message}")]
    InternalOAuth {
        message: &'static str,
        #[source]
        source: Option<TransportError>,
    },
    #[error("provider rejected the token request (status {status:?}) : {body}")]
    ProviderResponse { status: Option<u16>, body: String },
    #[error("malformed JSON : {0}")]
    Parse(#[from] serde_json::Error),
    #[error("malformed profile : {0}")]
    MalformedProfile(String),
    #[error("missing parameter : {0}")]
    MissingParameter(&'static str),
    #[error("missing required option : {0}")]
    MissingOption(&'static str),
    #[error("option {option} is not a valid URL : {source}")]
    InvalidUrl {
        option: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("token acquisition failed : {0}")]
    TokenReader(#[from] TokenReaderError),
    #[error("request failed : {0}")]
    Transport(#[from] TransportError),
}

impl Error {
    pub(crate) fn internal(message: &'static str, source: TransportError) -> Self {
        Error::InternalOAuth {
            message,
            source: Some(source),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.into())
    }
}

/// Error reported by the Etsy API itself.
#[derive(Error, Debug, Clone, PartialEq, Deserialize)]
#[error("{message} ({code})")]
pub struct ApiError {
    pub message: String,
    #[serde(default)]
    pub code: ErrorCode,
}

impl ApiError {
    pub fn new<M, C>(message: M, code: C) -> Self
    where
        M: Into<String>,
        C: Into<ErrorCode>,
    {
        ApiError {
            message: message.into(),
            code: code.into(),
        }
    }
}

/// Etsy sends error codes either as strings or as numbers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ErrorCode {
    Number(i64),
    Text(String),
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Number(n) => write!(f, "{}", n),
            ErrorCode::Text(s) => f.write_str(s),
        }
    }
}

/// Empty text, for errors Etsy reports without a code.
impl Default for ErrorCode {
    fn default() -> Self {
        ErrorCode::Text(String::new())
    }
}

impl From<&str> for ErrorCode {
    fn from(code: &str) -> Self {
        ErrorCode::Text(code.to_string())
    }
}

impl From<String> for ErrorCode {
    fn from(code: String) -> Self {
        ErrorCode::Text(code)
    }
}

impl From<i64> for ErrorCode {
    fn from(code: i64) -> Self {
        ErrorCode::Number(code)
    }
}

impl PartialEq<str> for ErrorCode {
    fn eq(&self, other: &str) -> bool {
        match self {
            ErrorCode::Text(s) => s == other,
            ErrorCode::Number(n) => n.to_string() == other,
        }
    }
}

impl PartialEq<&str> for ErrorCode {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

/// Failure of a signed request: either the request never completed, or the
/// server answered with a non-success status.
#[derive(Error, Debug)]
pub struct TransportError {
    pub status: Option<u16>,
    pub body: Option<String>,
    #[source]
    pub source: Option<reqwest::Error>,
}

impl TransportError {
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        TransportError {
            status: Some(status),
            body: Some(body.into()),
            source: None,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError {
            status: err.status().map(|s| s.as_u16()),
            body: None,
            source: Some(err),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.status, &self.source) {
            (Some(status), _) => write!(f, "server responded with status {}", status),
            (None, Some(_)) => f.write_str("request could not be completed"),
            (None, None) => f.write_str("request failed"),
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum TokenReaderError {
    #[error("response has malformed format: not found {0} in {1}")]
    TokenKeyNotFound(&'static str, String),
}
