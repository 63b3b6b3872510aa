//! Shared utility functions for Madang crates.

/// Date utility functions
pub mod dates {
    use chrono::{Local, NaiveDate};

    /// ISO calendar date format used for `orderdate` values.
    pub const DATE_FORMAT: &str = "%Y-%m-%d";

    /// Today's date in the local time zone.
    pub fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format(DATE_FORMAT).to_string()
    }

    /// True if `s` is a well-formed "YYYY-MM-DD" calendar date.
    pub fn is_iso_date(s: &str) -> bool {
        // chrono accepts unpadded fields, the stored text must sort lexically
        s.len() == 10 && NaiveDate::parse_from_str(s, DATE_FORMAT).is_ok()
    }

}

/// Form field parsing
pub mod fields {
    use crate::error::FieldError;

    /// Parse a user-entered form field as an integer.
    ///
    /// Surrounding whitespace is ignored. Anything else that is not a
    /// base-10 `i64` (empty input, decimals, letters) is rejected with a
    /// [`FieldError`] naming the field.
    pub fn parse_int_field(field: &'static str, input: &str) -> Result<i64, FieldError> {
        input.trim().parse::<i64>().map_err(|_| FieldError {
            field,
            value: input.to_string(),
        })
    }

}

/// Error types
pub mod error {
    use std::fmt;

    /// A form field that did not hold a valid integer.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct FieldError {
        pub field: &'static str,
        pub value: String,
    }

    impl fmt::Display for FieldError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{} must be an integer, got {:?}", self.field, self.value)
        }
    }

    impl std::error::Error for FieldError {}
}
