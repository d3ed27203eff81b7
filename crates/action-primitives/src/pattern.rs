use crate::errors::ActionError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// URL matcher used by navigation races and URL assertions.
///
/// Serialized as a regular expression source string.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UrlPattern {
    source: String,
    matcher: Matcher,
}

#[derive(Clone)]
enum Matcher {
    Literal(String),
    Regex(Regex),
}

impl UrlPattern {
    pub fn regex(source: impl Into<String>) -> Result<Self, ActionError> {
        let source = source.into();
        let regex = Regex::new(&source).map_err(|err| {
            ActionError::InvalidAction(format!("bad url pattern '{}': {}", source, err))
        })?;
        Ok(Self {
            source,
            matcher: Matcher::Regex(regex),
        })
    }

    /// Matches any URL containing `fragment` literally.
    pub fn contains(fragment: &str) -> Self {
        Self {
            source: regex::escape(fragment),
            matcher: Matcher::Literal(fragment.to_string()),
        }
    }

    pub fn is_match(&self, url: &str) -> bool {
        match &self.matcher {
            Matcher::Literal(fragment) => url.contains(fragment.as_str()),
            Matcher::Regex(regex) => regex.is_match(url),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Debug for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UrlPattern({})", self.source)
    }
}

impl fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl TryFrom<String> for UrlPattern {
    type Error = ActionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::regex(value)
    }
}

impl From<UrlPattern> for String {
    fn from(pattern: UrlPattern) -> Self {
        pattern.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_escapes_metacharacters() {
        let pattern = UrlPattern::contains("inventory.html");
        assert!(pattern.is_match("https://www.saucedemo.com/v1/inventory.html"));
        assert!(!pattern.is_match("https://www.saucedemo.com/v1/inventoryXhtml"));
    }

    #[test]
    fn literal_serializes_as_escaped_regex() {
        let pattern = UrlPattern::contains("cart.html");
        let round: UrlPattern =
            serde_json::from_value(serde_json::to_value(&pattern).unwrap()).unwrap();
        assert_eq!(round.as_str(), "cart\\.html");
        assert!(round.is_match("https://www.saucedemo.com/v1/cart.html"));
    }

    #[test]
    fn invalid_regex_is_rejected() {
        assert!(matches!(
            UrlPattern::regex("(unclosed"),
            Err(ActionError::InvalidAction(_))
        ));
    }

    #[test]
    fn deserializes_from_plain_string() {
        let pattern: UrlPattern = serde_json::from_str("\"saucelabs\\\\.com\"").unwrap();
        assert!(pattern.is_match("https://saucelabs.com/"));
    }
}
