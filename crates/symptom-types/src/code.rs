//! Canonical symptom identifier.

use std::borrow::Borrow;
use std::fmt;

/// Canonical machine identifier for one symptom concept.
///
/// Codes are opaque strings, unique within a [`Vocabulary`](crate::Vocabulary)
/// and immutable once loaded.
///
/// # Examples
///
/// ```
/// use symptom_types::SymptomCode;
///
/// let code = SymptomCode::new("dau_dau");
/// assert_eq!(code.as_str(), "dau_dau");
/// assert_eq!(code.to_string(), "dau_dau");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SymptomCode(String);

impl SymptomCode {
    /// Creates a code from its textual form.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the code, returning the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SymptomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SymptomCode {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SymptomCode {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for SymptomCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SymptomCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_borrow_lookup() {
        let mut map = HashMap::new();
        map.insert(SymptomCode::new("ho"), 1);
        assert_eq!(map.get("ho"), Some(&1));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_transparent() {
        let code = SymptomCode::new("sot");
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"sot\"");
    }
}
