use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid symbol {value:?}: symbols must be non-empty and contain no whitespace")]
pub struct SymbolError {
    value: String,
}

/// Ticker symbol used as the aggregation key across sources.
///
/// Symbols are normalized (trimmed, uppercased) on construction so that
/// "btc" from one source and "BTC" from another land in the same aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Create a symbol from an arbitrary string, trimming and uppercasing.
    pub fn new(value: impl AsRef<str>) -> Self {
        Self(value.as_ref().trim().to_uppercase())
    }

    /// Create a symbol, validating that it is usable as an aggregation key.
    pub fn parse(value: impl AsRef<str>) -> Result<Self, SymbolError> {
        let normalized = value.as_ref().trim().to_uppercase();
        if normalized.is_empty() || normalized.chars().any(char::is_whitespace) {
            return Err(SymbolError {
                value: value.as_ref().to_string(),
            });
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_case_and_whitespace() {
        assert_eq!(Symbol::new("btc").as_str(), "BTC");
        assert_eq!(Symbol::new("  eth  ").as_str(), "ETH");
        assert_eq!(Symbol::new("Doge").as_str(), "DOGE");
    }

    #[test]
    fn test_normalized_symbols_compare_equal() {
        assert_eq!(Symbol::new("btc"), Symbol::new("BTC"));
        assert_ne!(Symbol::new("BTC"), Symbol::new("ETH"));
    }

    #[test]
    fn test_parse_rejects_empty_values() {
        assert!(Symbol::parse("").is_err());
        assert!(Symbol::parse("   ").is_err());
    }

    #[test]
    fn test_parse_rejects_embedded_whitespace() {
        assert!(Symbol::parse("BT C").is_err());
        assert!(Symbol::parse("BTC\tETH").is_err());
    }

    #[test]
    fn test_parse_accepts_normal_tickers() {
        assert_eq!(Symbol::parse("usdc").unwrap().as_str(), "USDC");
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        let mut symbols = vec![Symbol::new("XYZ"), Symbol::new("BTC"), Symbol::new("ETH")];
        symbols.sort();
        let ordered: Vec<&str> = symbols.iter().map(Symbol::as_str).collect();
        assert_eq!(ordered, vec!["BTC", "ETH", "XYZ"]);
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let json = serde_json::to_string(&Symbol::new("btc")).unwrap();
        assert_eq!(json, "\"BTC\"");
    }
}
