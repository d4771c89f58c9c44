use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Size classes measured by a full run, smallest first.
pub const DEFAULT_SIZE_CLASSES: &[&str] = &[
    "10kb", "50kb", "100kb", "500kb", "1000kb", "1500kb", "5000kb", "10000kb", "15000kb",
];

/// Named fixture-pair bucket (e.g. `"10kb"`).
///
/// The name is used verbatim in fixture and output file names, so it may not be empty
/// and may not contain path separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PayloadSizeClass(String);

impl PayloadSizeClass {
    pub fn new(name: impl Into<String>) -> Result<Self, ModelError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ModelError::EmptySizeClass);
        }
        if trimmed.contains(['/', '\\']) || trimmed == "." || trimmed == ".." {
            return Err(ModelError::InvalidSizeClass(name));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// All [`DEFAULT_SIZE_CLASSES`] in order.
    pub fn defaults() -> Vec<PayloadSizeClass> {
        DEFAULT_SIZE_CLASSES
            .iter()
            .map(|s| PayloadSizeClass(s.to_string()))
            .collect()
    }
}

impl fmt::Display for PayloadSizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PayloadSizeClass {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for PayloadSizeClass {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PayloadSizeClass> for String {
    fn from(value: PayloadSizeClass) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_whitespace() {
        let size: PayloadSizeClass = " 10kb ".parse().unwrap();
        assert_eq!(size.as_str(), "10kb");
    }

    #[test]
    fn rejects_empty_and_paths() {
        assert_eq!(PayloadSizeClass::new("  "), Err(ModelError::EmptySizeClass));
        assert!(matches!(
            PayloadSizeClass::new("../etc"),
            Err(ModelError::InvalidSizeClass(_))
        ));
        assert!(PayloadSizeClass::new("..").is_err());
    }

    #[test]
    fn defaults_are_ordered() {
        let sizes = PayloadSizeClass::defaults();
        assert_eq!(sizes.len(), 9);
        assert_eq!(sizes[0].as_str(), "10kb");
        assert_eq!(sizes[8].as_str(), "15000kb");
    }

    #[test]
    fn serde_as_plain_string() {
        let size = PayloadSizeClass::new("50kb").unwrap();
        let json = serde_json::to_string(&size).unwrap();
        assert_eq!(json, r#""50kb""#);

        let bad: Result<PayloadSizeClass, _> = serde_json::from_str(r#""""#);
        assert!(bad.is_err());
    }
}
