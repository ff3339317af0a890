//! Validated names used to build file paths.

use std::fmt;
use std::str::FromStr;

use crate::IoError;

/// Name of a classification run, used as the artifact file prefix.
///
/// Must match `[a-zA-Z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentName(String);

impl ExperimentName {
    /// Parse and validate an experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidExperimentName`] if the name is empty or
    /// contains characters outside `[a-zA-Z0-9_-]`.
    pub fn new(name: impl Into<String>) -> Result<Self, IoError> {
        let name = name.into();
        let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '-');
        if name.is_empty() || !name.chars().all(allowed) {
            return Err(IoError::InvalidExperimentName { name });
        }
        Ok(Self(name))
    }

    /// Return the experiment name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExperimentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ExperimentName {
    type Err = IoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Check that a series label is usable as a single file name.
///
/// Labels become `<label>.hts` in a cache directory, so they must be non-empty,
/// must not start with a dot, and must not contain path separators.
pub(crate) fn validate_label(label: &str) -> Result<(), IoError> {
    if label.is_empty() || label.starts_with('.') || label.contains(['/', '\\', '\0']) {
        return Err(IoError::InvalidLabel {
            label: label.to_owned(),
        });
    }
    Ok(())
}
