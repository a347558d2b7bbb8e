use non_empty_string::NonEmptyString;

/// Error returned when a required text field is empty or only whitespace.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("{field} must not be empty")]
pub struct EmptyStringError {
    /// The name of the field that was empty.
    pub field: &'static str,
}

/// Trims `value` and checks that something is left.
///
/// # Errors
///
/// Returns [`EmptyStringError`] naming `field` if the trimmed value is empty.
pub fn required(field: &'static str, value: &str) -> Result<NonEmptyString, EmptyStringError> {
    NonEmptyString::new(value.trim().to_string()).map_err(|_| EmptyStringError { field })
}
