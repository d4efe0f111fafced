use colored::Colorize;
use validator::ValidateUrl;

use crate::{error::AppError, prompt::Prompter};

/// Schemes a server URL may start with
const ALLOWED_SCHEMES: [&str; 2] = ["http://", "https://"];
/// Maximum length for a profile name
const MAX_PROFILE_NAME_LENGTH: usize = 30;

/// Prompts user for input until valid input is provided
pub fn prompt_until_valid<P, F>(
    prompter: &P,
    prompt_message: &str,
    input_validation: F,
) -> Result<String, AppError>
where
    P: Prompter + ?Sized,
    F: Fn(&str) -> Result<(), AppError>,
{
    loop {
        let input: String = prompter.text(prompt_message)?;
        match input_validation(&input) {
            Ok(_) => break Ok(input),
            Err(AppError::Validation(msg)) => eprintln!("{}", msg.red()),
            Err(e) => return Err(e),
        }
    }
}

/// Validates a server URL
pub fn validate_server_url(url: &str) -> Result<(), AppError> {
    if !ALLOWED_SCHEMES.iter().any(|scheme| url.starts_with(scheme)) {
        Err(AppError::Validation(
            "Server URL must start with protocol [http://|https://]".to_string(),
        ))
    } else if !url.validate_url() {
        Err(AppError::Validation(format!("Invalid server URL: '{url}'")))
    } else {
        Ok(())
    }
}

/// Validates a profile name input
pub fn validate_profile_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        Err(AppError::Validation("Profile name cannot be empty".to_string()))
    } else if name.len() > MAX_PROFILE_NAME_LENGTH {
        Err(AppError::Validation(format!(
            "Profile name too long (max {} characters)",
            MAX_PROFILE_NAME_LENGTH
        )))
    } else if name.contains(':') {
        Err(AppError::Validation("Profile name cannot contain ':'".to_string()))
    } else {
        Ok(())
    }
}

/// Validates a user name input
pub fn validate_user_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        Err(AppError::Validation("User name cannot be empty".to_string()))
    } else {
        Ok(())
    }
}
