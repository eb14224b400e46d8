//! Tag name validation.
//!
//! Tags are free-form labels, but they travel through whitespace-separated
//! browse commands and comma-separated listings, so a valid tag:
//! - is not empty
//! - contains no whitespace or control characters
//! - contains no commas

use crate::error::DbError;

/// Validates a single tag name.
///
/// # Examples
/// ```
/// use jsondb::tags::validate_tag_name;
///
/// assert!(validate_tag_name("fred").is_ok());
/// assert!(validate_tag_name("to-do").is_ok());
/// assert!(validate_tag_name("prio:1").is_ok());
///
/// assert!(validate_tag_name("").is_err());
/// assert!(validate_tag_name("two words").is_err());
/// assert!(validate_tag_name("a,b").is_err());
/// ```
pub fn validate_tag_name(name: &str) -> Result<(), TagValidationError> {
    if name.is_empty() {
        return Err(TagValidationError::Empty);
    }

    for ch in name.chars() {
        if ch.is_whitespace() {
            return Err(TagValidationError::Whitespace);
        }
        if ch.is_control() || ch == ',' {
            return Err(TagValidationError::InvalidCharacter(ch));
        }
    }

    Ok(())
}

/// Validates every tag, reporting the first bad one.
pub fn validate_tags<I, S>(tags: I) -> Result<(), DbError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for tag in tags {
        let tag = tag.as_ref();
        validate_tag_name(tag)
            .map_err(|e| DbError::Validation(format!("invalid tag '{}': {}", tag, e)))?;
    }
    Ok(())
}

/// Error type for tag name validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValidationError {
    Empty,
    Whitespace,
    InvalidCharacter(char),
}

impl std::fmt::Display for TagValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagValidationError::Empty => write!(f, "tag name cannot be empty"),
            TagValidationError::Whitespace => write!(f, "tag name cannot contain whitespace"),
            TagValidationError::InvalidCharacter(ch) => {
                write!(f, "tag name contains invalid character {:?}", ch)
            }
        }
    }
}

impl std::error::Error for TagValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_tags() {
        assert!(validate_tag_name("x").is_ok());
        assert!(validate_tag_name("gunther").is_ok());
        assert!(validate_tag_name("Ünïcode").is_ok());
        assert!(validate_tag_name("7up").is_ok());
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(validate_tag_name(""), Err(TagValidationError::Empty));
    }

    #[test]
    fn rejects_whitespace() {
        assert_eq!(
            validate_tag_name("a b"),
            Err(TagValidationError::Whitespace)
        );
        assert_eq!(
            validate_tag_name("tab\there"),
            Err(TagValidationError::Whitespace)
        );
    }

    #[test]
    fn rejects_commas_and_control_chars() {
        assert_eq!(
            validate_tag_name("a,b"),
            Err(TagValidationError::InvalidCharacter(','))
        );
        assert_eq!(
            validate_tag_name("bell\u{7}"),
            Err(TagValidationError::InvalidCharacter('\u{7}'))
        );
    }

    #[test]
    fn validate_tags_names_the_offender() {
        let err = validate_tags(["ok", "not ok"]).unwrap_err();
        assert!(err.to_string().contains("'not ok'"));
    }
}
