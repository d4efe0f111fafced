use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Profile file does not exist yet
    #[error("config file not found: '{}'", .0.display())]
    ProfileFileNotFound(PathBuf),
    /// Requested profile name is not in the profile file
    #[error("specified profile name not found in config: '{0}'")]
    ProfileNotFound(String),
    /// Profile file exists but is not the expected TOML shape
    #[error("bad toml file: {}", .0.message())]
    Malformed(#[from] toml::de::Error),
    /// No profile carries the default marker
    #[error("default profile config not found. You can configure profile by running `kt profile add` and `kt profile set-default`")]
    NoDefault,
    /// Profile is already the default one
    #[error("specified profile name is already set as default: '{0}'")]
    AlreadyDefault(String),
    /// Expected form field missing from a server response
    #[error("protocol error: {0}")]
    Protocol(String),
    /// Login was rejected by the server
    #[error("login failed with status {0}")]
    Auth(StatusCode),
    /// Post submission was rejected by the server
    #[error("post failed with status {0}")]
    Submit(StatusCode),
    /// Error during input validation.
    #[error("validation error: {0}")]
    Validation(String),
    /// Home directory could not be determined
    #[error("failed to find the home directory")]
    HomeDirNotFound,
    /// Error during file I/O operations
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// Error while serializing profiles to TOML
    #[error("toml error: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// Error raised by the HTTP transport
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    /// Error when user input fails.
    #[error("inquire error: {0}")]
    Inquire(#[from] inquire::InquireError),
}

impl AppError {
    /// Failures outside the profile and server rules, logged at `error`
    pub fn is_unexpected(&self) -> bool {
        matches!(
            self,
            AppError::Io(_)
                | AppError::Serialize(_)
                | AppError::Http(_)
                | AppError::Inquire(_)
                | AppError::HomeDirNotFound
        )
    }
}
