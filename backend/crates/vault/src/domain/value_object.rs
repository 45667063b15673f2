//! Value Objects

use std::fmt;

use crate::error::VaultError;

/// Maximum title length in characters
pub const TITLE_MAX_LENGTH: usize = 255;

/// Record title, at most [`TITLE_MAX_LENGTH`] characters
///
/// Length is counted in characters, not bytes, so multibyte titles get the
/// same budget as ASCII ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordTitle(String);

impl RecordTitle {
    pub fn new(raw: String) -> Result<Self, VaultError> {
        if raw.chars().count() > TITLE_MAX_LENGTH {
            return Err(VaultError::Validation(
                "Title must be less than 256 characters long".to_string(),
            ));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RecordTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_at_limit_accepted() {
        let title = RecordTitle::new("a".repeat(TITLE_MAX_LENGTH));
        assert!(title.is_ok());
    }

    #[test]
    fn test_title_over_limit_rejected() {
        let result = RecordTitle::new("a".repeat(TITLE_MAX_LENGTH + 1));
        assert!(matches!(result, Err(VaultError::Validation(_))));
    }

    #[test]
    fn test_empty_title_accepted() {
        assert!(RecordTitle::new(String::new()).is_ok());
    }

    #[test]
    fn test_title_counts_characters_not_bytes() {
        // 255 three-byte characters exceed 255 bytes but not 255 chars
        let title = RecordTitle::new("あ".repeat(TITLE_MAX_LENGTH));
        assert!(title.is_ok());
    }
}
