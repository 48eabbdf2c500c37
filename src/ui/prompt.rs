//! The interactive collaborator: everything the workflow asks the user.
//!
//! The workflow only hands over option lists and reads back the chosen value. How a
//! prompt looks is up to the [`Selector`] implementation. [`InquireSelector`] renders
//! prompts in the terminal with `inquire`.

use inquire::{Confirm, InquireError, Select, Text};
use thiserror::Error;

/// Maximum number of options shown at once before the list scrolls
pub const PAGE_SIZE: usize = 15;

const OPTIONS_HIDDEN_HINT: &str = "[Some options hidden, use arrow keys to reveal]";

/// Errors from an interactive prompt
#[derive(Error, Debug)]
pub enum PromptError {
    /// The user pressed Esc or Ctrl+C
    #[error("Operation cancelled by user")]
    Cancelled,

    #[error("Prompt failed: {0}")]
    Failed(String),
}

impl From<InquireError> for PromptError {
    fn from(err: InquireError) -> Self {
        match err {
            InquireError::OperationCanceled | InquireError::OperationInterrupted => {
                PromptError::Cancelled
            }
            other => PromptError::Failed(other.to_string()),
        }
    }
}

/// Severity of a status line shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Info,
    Success,
    Warning,
    Error,
}

/// Source of user choices and sink of status messages.
pub trait Selector {
    /// Pick exactly one of `options`.
    fn select(&mut self, prompt: &str, options: &[String]) -> Result<String, PromptError>;

    /// Free-text answer.
    fn text(&mut self, prompt: &str) -> Result<String, PromptError>;

    /// Yes/no answer.
    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, PromptError>;

    /// Show a status line. The default only logs it.
    fn notify(&mut self, notice: Notice, message: &str) {
        match notice {
            Notice::Warning => tracing::warn!("{}", message),
            Notice::Error => tracing::error!("{}", message),
            Notice::Info | Notice::Success => tracing::info!("{}", message),
        }
    }
}

/// Terminal prompts backed by `inquire`.
#[derive(Debug, Default, Clone, Copy)]
pub struct InquireSelector;

impl Selector for InquireSelector {
    fn select(&mut self, prompt: &str, options: &[String]) -> Result<String, PromptError> {
        let message = if options.len() > PAGE_SIZE {
            format!("{} {}", prompt, OPTIONS_HIDDEN_HINT)
        } else {
            prompt.to_string()
        };

        let choice = Select::new(&message, options.to_vec())
            .with_page_size(PAGE_SIZE)
            .prompt()?;
        tracing::debug!("chose {}", choice);
        Ok(choice)
    }

    fn text(&mut self, prompt: &str) -> Result<String, PromptError> {
        Ok(Text::new(prompt).prompt()?)
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, PromptError> {
        Ok(Confirm::new(prompt).with_default(default).prompt()?)
    }

    fn notify(&mut self, notice: Notice, message: &str) {
        let prefix = match notice {
            Notice::Info => "INFO",
            Notice::Success => "SUCCESS",
            Notice::Warning => "WARNING",
            Notice::Error => "ERROR",
        };
        match notice {
            Notice::Error | Notice::Warning => eprintln!("{prefix}  {message}"),
            Notice::Info | Notice::Success => println!("{prefix}  {message}"),
        }
        tracing::info!("{}", message);
    }
}
