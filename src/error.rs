// src/error.rs
//! Client-side error taxonomy shared by every view

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    /// Caught before any request is issued
    #[error("{0}")]
    Validation(String),

    /// HTTP 409 from the JD upload endpoint
    #[error("\"{file_name}\" was not uploaded because it is a duplicate of \"{existing}\".")]
    Conflict { file_name: String, existing: String },

    #[error("{message}")]
    Server { status: u16, message: String },

    /// The request never reached the server or never came back
    #[error("{0}")]
    Network(String),

    #[error("Failed to read server response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Network(format!(
                "The server did not respond in time. Please check your connection. ({})",
                err
            ))
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(format!(
                "Could not reach the analysis server. Please check your connection. ({})",
                err
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_message_names_existing_file() {
        let err = ClientError::Conflict {
            file_name: "jd_new.pdf".to_string(),
            existing: "jd_old.pdf".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "\"jd_new.pdf\" was not uploaded because it is a duplicate of \"jd_old.pdf\"."
        );
    }

    #[test]
    fn test_server_error_displays_message_only() {
        let err = ClientError::Server {
            status: 500,
            message: "model timeout".to_string(),
        };
        assert_eq!(err.to_string(), "model timeout");
        assert!(!err.is_network());
    }
}
