use std::{fmt, str::FromStr};

/// A validated subject code: 3-4 ASCII letters, stored uppercase.
///
/// Subject codes identify the discipline a course belongs to, e.g. `CMPS`
/// or `BIO`. Lowercase input is accepted and normalised to uppercase.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SubjectCode(String);

impl SubjectCode {
    /// Creates a new `SubjectCode` from a string.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSubjectError` if the string is not 3-4 characters
    /// long or contains characters other than ASCII letters.
    pub fn new(s: String) -> Result<Self, InvalidSubjectError> {
        let len = s.chars().count();
        if !(3..=4).contains(&len) || !s.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(InvalidSubjectError(s));
        }
        Ok(Self(s.to_ascii_uppercase()))
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SubjectCode {
    type Error = InvalidSubjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for SubjectCode {
    type Error = InvalidSubjectError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.to_string())
    }
}

impl AsRef<str> for SubjectCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SubjectCode {
    type Err = InvalidSubjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

/// Error returned when a string is not a valid subject code.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid subject code '{0}': must be 3-4 ASCII letters")]
pub struct InvalidSubjectError(String);

/// A validated course number.
///
/// Course numbers are 3-4 digit values whose leading digit is 1-8; the 9xx
/// and 9xxx blocks are reserved. The number also determines the level a
/// course is classified at (see [`LevelPolicy`]).
///
/// [`LevelPolicy`]: crate::domain::department::LevelPolicy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CourseNumber(u16);

impl CourseNumber {
    /// Creates a new `CourseNumber` from a raw value.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidNumberError::Unrecognised`] if the value is not a
    /// 3-4 digit number with leading digit 1-8.
    pub const fn new(number: u16) -> Result<Self, InvalidNumberError> {
        if matches!(number, 100..=899 | 1000..=8999) {
            Ok(Self(number))
        } else {
            Err(InvalidNumberError::Unrecognised(number))
        }
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }
}

impl fmt::Display for CourseNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CourseNumber {
    type Err = InvalidNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number = s
            .parse::<u16>()
            .map_err(|_| InvalidNumberError::NotNumeric(s.to_string()))?;
        Self::new(number)
    }
}

impl TryFrom<u16> for CourseNumber {
    type Error = InvalidNumberError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Errors that can occur when validating a course number.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InvalidNumberError {
    /// The input is not a numeric string.
    #[error("Expected a 3-4 digit course number, got '{0}'")]
    NotNumeric(String),
    /// The value is outside the recognised range.
    #[error("Course number {0} is outside the recognised range (3-4 digits, leading digit 1-8)")]
    Unrecognised(u16),
}

/// The immutable identity of a course: subject code plus course number.
///
/// Format: `{SUBJECT}-{NUMBER}`, e.g. `CMPS-433` or `BIO-323`.
///
/// Course codes order by subject first, then by number, which gives catalog
/// listings their conventional ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CourseCode {
    subject: SubjectCode,
    number: CourseNumber,
}

impl CourseCode {
    /// Create a course code from pre-validated parts.
    #[must_use]
    pub const fn new(subject: SubjectCode, number: CourseNumber) -> Self {
        Self { subject, number }
    }

    /// Returns the subject component as a string.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the numeric component.
    #[must_use]
    pub const fn number(&self) -> CourseNumber {
        self.number
    }
}

impl fmt::Display for CourseCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-{}", self.subject, self.number)
    }
}

/// Errors that can occur when parsing a course code.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseCodeError {
    /// Malformed structure (missing or misplaced separator).
    #[error("Invalid course code '{0}': expected SUBJECT-NUMBER, e.g. CMPS-433")]
    Syntax(String),

    /// The subject segment failed validation.
    #[error(transparent)]
    Subject(#[from] InvalidSubjectError),

    /// The number segment failed validation.
    #[error("Invalid course number in '{code}': {source}")]
    Number {
        /// The full input that was being parsed.
        code: String,
        /// The underlying number validation failure.
        source: InvalidNumberError,
    },
}

impl FromStr for CourseCode {
    type Err = ParseCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((subject_str, number_str)) = s.split_once('-') else {
            return Err(ParseCodeError::Syntax(s.to_string()));
        };
        if subject_str.is_empty() || number_str.is_empty() || number_str.contains('-') {
            return Err(ParseCodeError::Syntax(s.to_string()));
        }

        let subject = SubjectCode::new(subject_str.to_string())?;
        let number = number_str
            .parse::<CourseNumber>()
            .map_err(|source| ParseCodeError::Number {
                code: s.to_string(),
                source,
            })?;

        Ok(Self::new(subject, number))
    }
}

impl TryFrom<&str> for CourseCode {
    type Error = ParseCodeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::from_str(value)
    }
}
