use serde::Deserialize;
use serde::Serialize;

/// Normalized account identifier.
///
/// Lookup and insert both go through this type, so the store only ever
/// sees the trimmed, lower-cased form. Syntactic checks live in
/// [`crate::validation`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Email {
    fn from(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }
}

impl From<String> for Email {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
