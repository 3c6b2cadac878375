use std::{fmt, ops::Deref, str::FromStr};

use non_empty_string::NonEmptyString;

/// A validated name segment for a topic, subtopic, or concept.
///
/// Name segments form composite IDs by being joined with `_`, and dotted
/// ordinal addresses use `.`, so a name may not contain either character
/// (nor leading/trailing whitespace, which would make IDs ambiguous to
/// re-parse).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NameString(NonEmptyString);

impl NameString {
    /// Creates a new `NameString` from a string.
    ///
    /// # Errors
    ///
    /// Returns `InvalidNameError` if the string is empty, contains `_` or
    /// `.`, or has leading/trailing whitespace.
    pub fn new(s: String) -> Result<Self, InvalidNameError> {
        if s.contains(['_', '.']) || s.trim() != s {
            return Err(InvalidNameError(s));
        }

        let non_empty = NonEmptyString::new(s.clone()).map_err(|_| InvalidNameError(s))?;
        Ok(Self(non_empty))
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for NameString {
    type Error = InvalidNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for NameString {
    type Error = InvalidNameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.to_string())
    }
}

impl AsRef<str> for NameString {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl Deref for NameString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.0.as_str()
    }
}

impl fmt::Display for NameString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NameString {
    type Err = InvalidNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl serde::Serialize for NameString {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for NameString {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

/// Error returned when a string is not usable as a name segment.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid name '{0}': must be non-empty, free of '_' and '.', and not padded with whitespace")]
pub struct InvalidNameError(String);
