use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const ASIN_LEN: usize = 10;

/// Amazon Standard Identification Number, normalized to uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Asin(String);

impl Asin {
    /// Parse and normalize an ASIN to uppercase.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyAsin);
        }

        let normalized = trimmed.to_ascii_uppercase();
        for (index, ch) in normalized.chars().enumerate() {
            if !ch.is_ascii_alphanumeric() {
                return Err(ValidationError::AsinInvalidChar { ch, index });
            }
        }

        let len = normalized.len();
        if len != ASIN_LEN {
            return Err(ValidationError::AsinLength {
                len,
                expected: ASIN_LEN,
            });
        }

        Ok(Self(normalized))
    }

    /// Parse a list, dropping repeats while keeping the first occurrence.
    pub fn parse_list<I, S>(inputs: I) -> Result<Vec<Self>, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed: Vec<Self> = Vec::new();
        for input in inputs {
            let asin = Self::parse(input.as_ref())?;
            if !parsed.contains(&asin) {
                parsed.push(asin);
            }
        }
        Ok(parsed)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Asin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Asin {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Asin {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Asin> for String {
    fn from(value: Asin) -> Self {
        value.0
    }
}
