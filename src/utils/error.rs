use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Could not read access key file '{path}': {source}")]
    CredentialReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Access key is not usable: {reason}")]
    CredentialInvalidError { reason: String },

    #[error("'{path}' not found")]
    InputNotFoundError { path: String },

    #[error("Could not decode JSON from '{path}': {source}")]
    InputParseError {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Error reading '{path}': {source}")]
    InputReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP error occurred: {status}")]
    HttpStatusError { status: u16, body: String },

    #[error("Connection error occurred: {0}")]
    ConnectionError(#[source] reqwest::Error),

    #[error("Timeout error occurred: {0}")]
    TimeoutError(#[source] reqwest::Error),

    #[error("An error occurred during the request: {0}")]
    RequestError(#[source] reqwest::Error),

    #[error("An unexpected error occurred: {message}")]
    UnexpectedError { message: String },
}

/// Machine-readable tag for each failure, stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Config,
    CredentialRead,
    CredentialInvalid,
    InputNotFound,
    InputParse,
    InputRead,
    HttpStatus,
    Connection,
    Timeout,
    Request,
    Unexpected,
}

/// Which stage of a run produced the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    LocalInput,
    Remote,
    Transport,
}

impl SyncError {
    /// Classify a transport-level reqwest failure.
    ///
    /// A timeout while the connection is still being set up counts as a
    /// connection error; only deadlines hit after connecting are timeouts.
    pub fn from_transport(error: reqwest::Error) -> Self {
        if error.is_connect() {
            Self::ConnectionError(error)
        } else if error.is_timeout() {
            Self::TimeoutError(error)
        } else {
            Self::RequestError(error)
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => ErrorKind::Config,
            Self::CredentialReadError { .. } => ErrorKind::CredentialRead,
            Self::CredentialInvalidError { .. } => ErrorKind::CredentialInvalid,
            Self::InputNotFoundError { .. } => ErrorKind::InputNotFound,
            Self::InputParseError { .. } => ErrorKind::InputParse,
            Self::InputReadError { .. } => ErrorKind::InputRead,
            Self::HttpStatusError { .. } => ErrorKind::HttpStatus,
            Self::ConnectionError(_) => ErrorKind::Connection,
            Self::TimeoutError(_) => ErrorKind::Timeout,
            Self::RequestError(_) => ErrorKind::Request,
            Self::UnexpectedError { .. } => ErrorKind::Unexpected,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self.kind() {
            ErrorKind::Config | ErrorKind::CredentialRead | ErrorKind::CredentialInvalid => {
                ErrorCategory::Configuration
            }
            ErrorKind::InputNotFound | ErrorKind::InputParse | ErrorKind::InputRead => {
                ErrorCategory::LocalInput
            }
            ErrorKind::HttpStatus | ErrorKind::Unexpected => ErrorCategory::Remote,
            ErrorKind::Connection | ErrorKind::Timeout | ErrorKind::Request => {
                ErrorCategory::Transport
            }
        }
    }

    /// Process exit status for this failure. Success is 0.
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::Config | ErrorKind::CredentialRead | ErrorKind::CredentialInvalid => 2,
            ErrorKind::InputNotFound => 3,
            ErrorKind::InputParse => 4,
            ErrorKind::InputRead => 5,
            ErrorKind::HttpStatus => 6,
            ErrorKind::Connection => 7,
            ErrorKind::Timeout => 8,
            ErrorKind::Request => 9,
            ErrorKind::Unexpected => 10,
        }
    }

    /// True when nothing was sent to the remote bin.
    pub fn is_local(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Configuration | ErrorCategory::LocalInput
        )
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatusError { status, .. } => Some(*status),
            Self::ConnectionError(e) | Self::TimeoutError(e) | Self::RequestError(e) => {
                e.status().map(|s| s.as_u16())
            }
            _ => None,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::InputNotFoundError { path } => {
                format!("Error: '{}' not found in the current directory.", path)
            }
            Self::InputParseError { path, .. } => format!(
                "Error: Could not decode JSON from '{}'. Please check its format.",
                path
            ),
            Self::HttpStatusError { status, body } => format!(
                "HTTP error occurred: {}\nResponse content: {}",
                status, body
            ),
            other => format!("Error: {}", other),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Config => "Check the command-line flags, environment variables and config file",
            ErrorKind::CredentialRead => {
                "Create the access key file or set PRICE_SYNC_ACCESS_KEY"
            }
            ErrorKind::CredentialInvalid => {
                "The access key must be a single line without control characters"
            }
            ErrorKind::InputNotFound => "Check the --input path or run from the directory holding it",
            ErrorKind::InputParse => "Fix the JSON syntax in the input file",
            ErrorKind::InputRead => "Check the input file's permissions and encoding",
            ErrorKind::HttpStatus => match self.status() {
                Some(401) | Some(403) => "Verify the access key and the access key header name",
                Some(404) => "Verify the bin endpoint URL",
                Some(s) if s >= 500 => "The remote service failed; re-run later, the update is a full replace",
                _ => "Inspect the response content above",
            },
            ErrorKind::Connection => "Check network connectivity and the endpoint host",
            ErrorKind::Timeout => "Re-run later or raise --timeout-seconds",
            ErrorKind::Request => "Inspect the request error above; re-running is safe",
            ErrorKind::Unexpected => "The update may have been applied; fetch the bin to confirm",
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
