//! The user's API credential.

use std::fmt;

/// A non-empty, trimmed API key.
///
/// `Debug` and `Display` print a redacted form (`sk-…abcd`); use
/// [`Credential::expose`] only when building the upstream request.
///
/// # Example
/// ```
/// use contextor::Credential;
/// let c = Credential::new("  sk-test-1234abcd ").unwrap();
/// assert_eq!(c.to_string(), "sk-…abcd");
/// assert!(Credential::new("   ").is_none());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Returns `None` for blank input.
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let key = raw.as_ref().trim();
        (!key.is_empty()).then(|| Self(key.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn redacted(&self) -> String {
        let prefix = if self.0.starts_with("sk-") { "sk-" } else { "" };
        let count = self.0.chars().count();
        if count <= 8 {
            return format!("{prefix}…");
        }
        let tail: String = self.0.chars().skip(count - 4).collect();
        format!("{prefix}…{tail}")
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&self.redacted()).finish()
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_never_printed() {
        let c = Credential::new("sk-proj-verysecretvalue9876").unwrap();
        assert_eq!(c.expose(), "sk-proj-verysecretvalue9876");
        assert!(!format!("{c:?}").contains("verysecret"));
        assert_eq!(format!("{c}"), "sk-…9876");
    }

    #[test]
    fn short_keys_show_no_tail() {
        assert_eq!(Credential::new("abc").unwrap().redacted(), "…");
        assert_eq!(Credential::new("other-key-5555").unwrap().redacted(), "…5555");
    }
}
