//! Input validation shared by the services and the HTTP layer.

use crate::types::LibraryError;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;
pub const MAX_COMMENT_CHARS: usize = 2000;
pub const MAX_TITLE_CHARS: usize = 500;
pub const MAX_LOAN_DAYS: u32 = libris_config::MAX_LOAN_DAYS;

pub struct Validator;

impl Validator {
    /// Parse a path segment into a positive row id.
    ///
    /// ```
    /// use libris_library::Validator;
    ///
    /// assert_eq!(Validator::record_id("42", "book id").unwrap(), 42);
    /// assert!(Validator::record_id("abc", "book id").is_err());
    /// assert!(Validator::record_id("0", "book id").is_err());
    /// ```
    pub fn record_id(raw: &str, label: &str) -> Result<i64, LibraryError> {
        match raw.trim().parse::<i64>() {
            Ok(id) if id > 0 => Ok(id),
            _ => Err(LibraryError::validation(format!(
                "{label} must be a positive integer"
            ))),
        }
    }

    /// Clamp pagination to `1..=MAX_PAGE_SIZE` and a non-negative offset.
    pub fn page(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let offset = offset.unwrap_or(0).max(0);
        (limit, offset)
    }

    pub fn title(title: &str) -> Result<String, LibraryError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(LibraryError::validation("title cannot be empty"));
        }
        if title.chars().count() > MAX_TITLE_CHARS {
            return Err(LibraryError::validation(format!(
                "title too long (max {MAX_TITLE_CHARS} characters)"
            )));
        }
        Ok(title.to_string())
    }

    pub fn total_copies(copies: Option<i64>) -> Result<i64, LibraryError> {
        match copies.unwrap_or(1) {
            copies if copies >= 1 => Ok(copies),
            _ => Err(LibraryError::validation("total_copies must be at least 1")),
        }
    }

    pub fn rating(rating: i64) -> Result<i64, LibraryError> {
        if (1..=5).contains(&rating) {
            Ok(rating)
        } else {
            Err(LibraryError::validation("rating must be between 1 and 5"))
        }
    }

    /// Trim a review comment, treating blank text as absent.
    pub fn comment(comment: Option<String>) -> Result<Option<String>, LibraryError> {
        let Some(comment) = comment else {
            return Ok(None);
        };
        let comment = comment.trim();
        if comment.is_empty() {
            return Ok(None);
        }
        if comment.chars().count() > MAX_COMMENT_CHARS {
            return Err(LibraryError::validation(format!(
                "comment too long (max {MAX_COMMENT_CHARS} characters)"
            )));
        }
        Ok(Some(comment.to_string()))
    }

    pub fn loan_days(days: u32) -> Result<u32, LibraryError> {
        if (1..=MAX_LOAN_DAYS).contains(&days) {
            Ok(days)
        } else {
            Err(LibraryError::validation(format!(
                "loan_days must be between 1 and {MAX_LOAN_DAYS}"
            )))
        }
    }

    /// Blank optional text becomes `None`.
    pub fn optional_text(value: Option<String>) -> Option<String> {
        value
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_ids_must_be_positive_integers() {
        assert_eq!(Validator::record_id(" 7 ", "book id").unwrap(), 7);
        for raw in ["abc", "-3", "0", "1.5", ""] {
            let err = Validator::record_id(raw, "book id").unwrap_err();
            assert_eq!(err.to_string(), "book id must be a positive integer");
        }
    }

    #[test]
    fn page_is_clamped() {
        assert_eq!(Validator::page(None, None), (DEFAULT_PAGE_SIZE, 0));
        assert_eq!(Validator::page(Some(0), Some(-5)), (1, 0));
        assert_eq!(Validator::page(Some(1000), Some(40)), (MAX_PAGE_SIZE, 40));
    }

    #[test]
    fn ratings_outside_one_to_five_are_rejected() {
        assert!(Validator::rating(0).is_err());
        assert!(Validator::rating(6).is_err());
        assert_eq!(Validator::rating(5).unwrap(), 5);
    }

    #[test]
    fn comments_are_trimmed_and_bounded() {
        assert_eq!(Validator::comment(Some("   ".into())).unwrap(), None);
        assert_eq!(
            Validator::comment(Some(" great ".into())).unwrap().as_deref(),
            Some("great")
        );
        assert!(Validator::comment(Some("x".repeat(MAX_COMMENT_CHARS + 1))).is_err());
    }

    #[test]
    fn copies_default_to_one() {
        assert_eq!(Validator::total_copies(None).unwrap(), 1);
        assert!(Validator::total_copies(Some(0)).is_err());
    }
}
