use std::ffi::{OsStr, OsString};

use colored::Colorize;
use inquire::{Confirm, Editor, Password, Text};

use crate::error::AppError;

/// Editor used to compose a message when `EDITOR` is unset
const FALLBACK_EDITOR: &str = "vi";

/// Source of interactive user input
pub trait Prompter {
    /// Asks for a line of text
    fn text(&self, message: &str) -> Result<String, AppError>;
    /// Asks for a secret without echoing it
    fn password(&self, message: &str) -> Result<String, AppError>;
    /// Asks a yes/no question, defaulting to no
    fn confirm(&self, message: &str) -> Result<bool, AppError>;
    /// Opens an editor and returns what was written
    fn editor(&self, message: &str) -> Result<String, AppError>;
}

/// Terminal prompts backed by `inquire`
pub struct InquirePrompter {
    editor_command: OsString,
}

impl InquirePrompter {
    /// Picks the editor from `EDITOR`, falling back to `vi`
    pub fn from_env() -> Self {
        let editor_command = std::env::var_os("EDITOR")
            .filter(|editor| !editor.is_empty())
            .unwrap_or_else(|| OsString::from(FALLBACK_EDITOR));
        InquirePrompter { editor_command }
    }
}

impl Prompter for InquirePrompter {
    fn text(&self, message: &str) -> Result<String, AppError> {
        Ok(Text::new(&format!("{}", message.blue())).prompt()?)
    }

    fn password(&self, message: &str) -> Result<String, AppError> {
        Ok(Password::new(&format!("{}", message.blue()))
            .without_confirmation()
            .prompt()?)
    }

    fn confirm(&self, message: &str) -> Result<bool, AppError> {
        Ok(Confirm::new(&format!("{}", message.yellow()))
            .with_default(false)
            .prompt()?)
    }

    fn editor(&self, message: &str) -> Result<String, AppError> {
        // EDITOR may carry arguments, e.g. "code --wait"
        let command = self.editor_command.to_string_lossy().into_owned();
        let mut parts = command.split_whitespace().map(OsStr::new);
        let program = parts.next().unwrap_or(OsStr::new(FALLBACK_EDITOR));
        let args: Vec<&OsStr> = parts.collect();

        Ok(Editor::new(&format!("{}", message.blue()))
            .with_editor_command(program)
            .with_args(&args)
            .prompt()?)
    }
}

/// Prompter replaying canned answers, for tests
#[cfg(test)]
pub struct ScriptedPrompter {
    answers: std::cell::RefCell<std::collections::VecDeque<String>>,
    asked: std::cell::RefCell<Vec<String>>,
}

#[cfg(test)]
impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedPrompter {
            answers: std::cell::RefCell::new(answers.into_iter().map(Into::into).collect()),
            asked: std::cell::RefCell::new(Vec::new()),
        }
    }

    /// Messages shown so far, in order
    pub fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }

    pub fn is_exhausted(&self) -> bool {
        self.answers.borrow().is_empty()
    }

    fn next(&self, message: &str) -> Result<String, AppError> {
        self.asked.borrow_mut().push(message.to_string());
        self.answers
            .borrow_mut()
            .pop_front()
            .ok_or(AppError::Inquire(inquire::InquireError::NotTTY))
    }
}

#[cfg(test)]
impl Prompter for ScriptedPrompter {
    fn text(&self, message: &str) -> Result<String, AppError> {
        self.next(message)
    }

    fn password(&self, message: &str) -> Result<String, AppError> {
        self.next(message)
    }

    fn confirm(&self, message: &str) -> Result<bool, AppError> {
        let answer = self.next(message)?;
        Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
    }

    fn editor(&self, message: &str) -> Result<String, AppError> {
        self.next(message)
    }
}
