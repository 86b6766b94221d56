//! Classifying tool failures.

use regex::Regex;
use std::sync::LazyLock;

/// Messages that mean the executable itself could not be found.
static NOT_FOUND_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(not found|cannot find|can't find|no such file|command not found|enoent|is not recognized as an internal or external command)",
    )
    .expect("NOT_FOUND_REGEX must compile")
});

/// Coarse class of a tool failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The tool binary is missing: detection was a false positive.
    NotFound,
    /// Anything else, such as bad arguments or a network failure.
    Other,
}

/// Classify a failure message.
///
/// ```
/// use toolwarden::detection::{classify_error, ErrorClass};
///
/// assert_eq!(classify_error("spawn greenframe ENOENT"), ErrorClass::NotFound);
/// assert_eq!(classify_error("Error: invalid URL"), ErrorClass::Other);
/// ```
pub fn classify_error(message: &str) -> ErrorClass {
    if NOT_FOUND_REGEX.is_match(message) {
        ErrorClass::NotFound
    } else {
        ErrorClass::Other
    }
}
