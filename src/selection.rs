use anyhow::Result;
use inquire::{Select, Text, validator::Validation};
use std::error::Error;

use crate::discovery::WorktreeItem;

/// Type alias for validation functions
pub type ValidatorFn = fn(&str) -> Result<Validation, Box<dyn Error + Send + Sync>>;

/// Trait for providing interactive selection functionality
/// This allows us to abstract away the interactive prompts for testing
pub trait SelectionProvider {
    /// Present a filterable selection menu and return the user's choice
    ///
    /// # Errors
    /// Returns an error if the selection process fails or user cancels
    fn select(&self, prompt: &str, options: Vec<String>) -> Result<String>;

    /// Get text input from the user with validation
    ///
    /// # Errors
    /// Returns an error if the input process fails or user cancels
    fn get_text_input(&self, prompt: &str, validator: Option<ValidatorFn>) -> Result<String>;
}

/// Real implementation using inquire for production use
pub struct RealSelectionProvider;

impl SelectionProvider for RealSelectionProvider {
    fn select(&self, prompt: &str, options: Vec<String>) -> Result<String> {
        let selection = Select::new(prompt, options)
            .with_page_size(15)
            .with_vim_mode(true)
            .prompt()?;
        Ok(selection)
    }

    fn get_text_input(&self, prompt: &str, validator: Option<ValidatorFn>) -> Result<String> {
        let mut text_prompt = Text::new(prompt);

        if let Some(validation_fn) = validator {
            text_prompt = text_prompt.with_validator(validation_fn);
        }

        let result = text_prompt.prompt()?;
        Ok(result)
    }
}

/// Mock implementation for testing that returns a predetermined value
pub struct MockSelectionProvider {
    pub response: String,
}

impl MockSelectionProvider {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

impl SelectionProvider for MockSelectionProvider {
    fn select(&self, _prompt: &str, options: Vec<String>) -> Result<String> {
        // Validate that the response is actually in the options
        if options.contains(&self.response) {
            Ok(self.response.clone())
        } else {
            anyhow::bail!("Mock response '{}' not found in options", self.response)
        }
    }

    fn get_text_input(&self, _prompt: &str, validator: Option<ValidatorFn>) -> Result<String> {
        if let Some(validation_fn) = validator {
            if let Ok(Validation::Invalid(_)) = validation_fn(&self.response) {
                anyhow::bail!("Mock response '{}' failed validation", self.response);
            }
        }
        Ok(self.response.clone())
    }
}

/// Display line for a worktree: `repo/branch (path)`, with the main
/// checkout flagged
#[must_use]
pub fn format_worktree_option(item: &WorktreeItem) -> String {
    let marker = if item.is_main { " [main]" } else { "" };
    format!(
        "{}/{} ({}){}",
        item.repo_name,
        item.branch,
        item.path.display(),
        marker
    )
}

/// Lets the user pick one of `items`.
///
/// # Errors
/// Returns an error if `items` is empty or the selection fails
pub fn select_worktree<'a>(
    prompt: &str,
    items: &'a [WorktreeItem],
    provider: &dyn SelectionProvider,
) -> Result<&'a WorktreeItem> {
    if items.is_empty() {
        anyhow::bail!("No worktrees found");
    }

    let options: Vec<String> = items.iter().map(format_worktree_option).collect();
    let selection = provider.select(prompt, options.clone())?;

    options
        .iter()
        .position(|option| *option == selection)
        .map(|index| &items[index])
        .ok_or_else(|| anyhow::anyhow!("Invalid selection: {}", selection))
}

/// Rejects blank input
///
/// # Errors
/// Never fails; invalid input is reported through [`Validation::Invalid`]
pub fn require_non_blank(input: &str) -> Result<Validation, Box<dyn Error + Send + Sync>> {
    if input.trim().is_empty() {
        Ok(Validation::Invalid("A value is required".into()))
    } else {
        Ok(Validation::Valid)
    }
}
