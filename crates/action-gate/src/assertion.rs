//! Assertion vocabulary

use crate::errors::GateError;
use action_primitives::UrlPattern;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Ordering a list of rendered values is expected to follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    NameAsc,
    NameDesc,
    PriceAsc,
    PriceDesc,
}

impl SortOrder {
    /// Whether `values` follow this order. Prices are read as `$x.yy`.
    pub fn is_sorted(&self, values: &[String]) -> Result<bool, GateError> {
        let in_order = |ord: Ordering| match self {
            SortOrder::NameAsc | SortOrder::PriceAsc => ord != Ordering::Greater,
            SortOrder::NameDesc | SortOrder::PriceDesc => ord != Ordering::Less,
        };
        match self {
            SortOrder::NameAsc | SortOrder::NameDesc => Ok(values
                .windows(2)
                .all(|pair| in_order(pair[0].cmp(&pair[1])))),
            SortOrder::PriceAsc | SortOrder::PriceDesc => {
                let prices = values
                    .iter()
                    .map(|value| parse_price_cents(value))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(prices.windows(2).all(|pair| in_order(pair[0].cmp(&pair[1]))))
            }
        }
    }
}

/// Parse `"$29.99"` into cents.
pub fn parse_price_cents(raw: &str) -> Result<u64, GateError> {
    let unparseable = |reason: &str| GateError::Unparseable {
        value: raw.to_string(),
        reason: reason.to_string(),
    };
    let digits = raw.trim().trim_start_matches('$');
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, "0"));
    let whole: u64 = whole.parse().map_err(|_| unparseable("not a price"))?;
    let fraction = match fraction.len() {
        1 => fraction.parse::<u64>().map(|f| f * 10),
        2 => fraction.parse::<u64>(),
        _ => return Err(unparseable("expected two decimal places")),
    }
    .map_err(|_| unparseable("not a price"))?;
    whole
        .checked_mul(100)
        .and_then(|cents| cents.checked_add(fraction))
        .ok_or_else(|| unparseable("price out of range"))
}

/// One expectation about the page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Assertion {
    UrlMatches { pattern: UrlPattern },
    Visible { selector: String },
    Hidden { selector: String },
    TextContains { selector: String, text: String },
    CountEquals { selector: String, count: usize },
    InputValueEquals { selector: String, value: String },
    SortedBy { selector: String, order: SortOrder },
}

impl Assertion {
    pub fn url_matches(pattern: UrlPattern) -> Self {
        Assertion::UrlMatches { pattern }
    }

    pub fn visible(selector: impl Into<String>) -> Self {
        Assertion::Visible {
            selector: selector.into(),
        }
    }

    pub fn hidden(selector: impl Into<String>) -> Self {
        Assertion::Hidden {
            selector: selector.into(),
        }
    }

    pub fn text_contains(selector: impl Into<String>, text: impl Into<String>) -> Self {
        Assertion::TextContains {
            selector: selector.into(),
            text: text.into(),
        }
    }

    pub fn count_equals(selector: impl Into<String>, count: usize) -> Self {
        Assertion::CountEquals {
            selector: selector.into(),
            count,
        }
    }

    pub fn input_value_equals(selector: impl Into<String>, value: impl Into<String>) -> Self {
        Assertion::InputValueEquals {
            selector: selector.into(),
            value: value.into(),
        }
    }

    pub fn sorted_by(selector: impl Into<String>, order: SortOrder) -> Self {
        Assertion::SortedBy {
            selector: selector.into(),
            order,
        }
    }

    /// Human-readable expected state.
    pub fn expected(&self) -> String {
        match self {
            Assertion::UrlMatches { pattern } => format!("url matching /{}/", pattern),
            Assertion::Visible { .. } => "at least one visible element".to_string(),
            Assertion::Hidden { .. } => "no visible element".to_string(),
            Assertion::TextContains { text, .. } => format!("text containing {:?}", text),
            Assertion::CountEquals { count, .. } => format!("{} element(s)", count),
            Assertion::InputValueEquals { value, .. } => format!("input value {:?}", value),
            Assertion::SortedBy { order, .. } => format!("values sorted {:?}", order),
        }
    }
}

impl fmt::Display for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Assertion::UrlMatches { pattern } => write!(f, "url matches {}", pattern),
            Assertion::Visible { selector } => write!(f, "{} visible", selector),
            Assertion::Hidden { selector } => write!(f, "{} hidden", selector),
            Assertion::TextContains { selector, text } => {
                write!(f, "{} contains {:?}", selector, text)
            }
            Assertion::CountEquals { selector, count } => {
                write!(f, "{} count == {}", selector, count)
            }
            Assertion::InputValueEquals { selector, value } => {
                write!(f, "{} value == {:?}", selector, value)
            }
            Assertion::SortedBy { selector, order } => write!(f, "{} sorted {:?}", selector, order),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn parses_dollar_prices() {
        assert_eq!(parse_price_cents("$29.99").unwrap(), 2999);
        assert_eq!(parse_price_cents("$7.5").unwrap(), 750);
        assert_eq!(parse_price_cents("15").unwrap(), 1500);
        assert!(parse_price_cents("$abc").is_err());
        assert!(parse_price_cents("$1.999").is_err());
    }

    #[test]
    fn oversized_price_is_unparseable() {
        let err = parse_price_cents("$184467440737095516.15").unwrap_err();
        assert!(matches!(err, GateError::Unparseable { .. }));
        assert!(err.to_string().contains("out of range"), "{}", err);
    }

    #[test]
    fn price_order_compares_numerically() {
        let prices = strings(&["$7.99", "$9.99", "$15.99", "$15.99", "$29.99", "$49.99"]);
        assert!(SortOrder::PriceAsc.is_sorted(&prices).unwrap());
        assert!(!SortOrder::PriceDesc.is_sorted(&prices).unwrap());
    }

    #[test]
    fn name_order_is_lexicographic() {
        let names = strings(&["Sauce Labs Onesie", "Sauce Labs Backpack"]);
        assert!(SortOrder::NameDesc.is_sorted(&names).unwrap());
        assert!(!SortOrder::NameAsc.is_sorted(&names).unwrap());
    }

    #[test]
    fn serializes_with_type_tag() {
        let value = serde_json::to_value(Assertion::count_equals(".cart_item", 1)).unwrap();
        assert_eq!(value["type"], "count_equals");
        assert_eq!(value["count"], 1);
    }
}
