//! Spinner utilities using indicatif for terminal output
//!
//! A sync runs for an unknown amount of time, so the CLI shows a
//! spinner rather than a bar with a total.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const SPINNER_TEMPLATE: &str = "[{elapsed_precise}] {spinner:.green} {msg}";
const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Create a spinner for indeterminate operations
///
/// # Example
/// ```
/// use tipsheet::cli::output::progress::create_spinner;
///
/// let spinner = create_spinner();
/// spinner.set_message("Syncing...");
/// // do work
/// spinner.finish_with_message("Done");
/// ```
pub fn create_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template(SPINNER_TEMPLATE)
            .expect("Invalid spinner template")
            .tick_chars(SPINNER_CHARS),
    );
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Create a spinner with a custom message
pub fn create_spinner_with_message(message: impl Into<String>) -> ProgressBar {
    let spinner = create_spinner();
    spinner.set_message(message.into());
    spinner
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_spinner() {
        let spinner = create_spinner();
        spinner.set_message("Testing");
        spinner.finish();
    }

    #[test]
    fn test_create_spinner_with_message() {
        let spinner = create_spinner_with_message("Initial message");
        spinner.finish();
    }

    #[test]
    fn test_spinner_messages() {
        let spinner = create_spinner();
        spinner.set_message("Step 1");
        spinner.set_message("Step 2");
        spinner.finish_and_clear();
    }
}
