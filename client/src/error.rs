//! Client error types

use shared::{BackendErrorKind, Language};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with an error body
    #[error("API error {status}: {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// No signed-in session; the user has to log in
    #[error("not signed in")]
    MissingSession,

    #[error("configuration error: {0}")]
    Config(String),

    /// The API has no route for this operation on the table
    #[error("{operation} is not available for {table}")]
    Unsupported {
        table: &'static str,
        operation: &'static str,
    },
}

impl ClientError {
    /// What went wrong, for choosing the user-facing message
    pub fn kind(&self) -> BackendErrorKind {
        match self {
            ClientError::Api { status, code, message } => {
                match BackendErrorKind::classify(code.as_deref(), message) {
                    BackendErrorKind::Generic if *status == 401 => BackendErrorKind::SessionExpired,
                    BackendErrorKind::Generic if *status == 404 => BackendErrorKind::NotFound,
                    kind => kind,
                }
            }
            ClientError::Transport(_) => BackendErrorKind::Network,
            ClientError::MissingSession => BackendErrorKind::SessionExpired,
            ClientError::Config(_) | ClientError::Unsupported { .. } => BackendErrorKind::Generic,
        }
    }

    pub fn user_message(&self, language: Language) -> &'static str {
        self.kind().message(language)
    }

    pub fn is_mixing(&self) -> bool {
        self.kind() == BackendErrorKind::Mixing
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
