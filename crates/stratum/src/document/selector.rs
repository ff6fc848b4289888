//! Equality-based selector expressions over string maps.
//!
//! Supports the comma-joined forms `k=v`, `k==v`, `k!=v`, `k` (exists),
//! and `!k` (does not exist). An empty expression selects everything.

use std::collections::HashMap;

use crate::error::{DocumentError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Requirement {
    Equals { key: String, value: String },
    NotEquals { key: String, value: String },
    Exists { key: String },
    DoesNotExist { key: String },
}

impl Requirement {
    fn holds(&self, map: &HashMap<String, String>) -> bool {
        match self {
            Requirement::Equals { key, value } => map.get(key) == Some(value),
            Requirement::NotEquals { key, value } => map.get(key) != Some(value),
            Requirement::Exists { key } => map.contains_key(key),
            Requirement::DoesNotExist { key } => !map.contains_key(key),
        }
    }
}

/// A parsed selector expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    requirements: Vec<Requirement>,
}

impl Selector {
    /// Parses a selector expression, failing on malformed terms.
    pub fn parse(expression: &str) -> Result<Self> {
        let invalid = |reason: &str| DocumentError::InvalidSelector {
            selector: expression.to_string(),
            reason: reason.to_string(),
        };

        let mut requirements = Vec::new();
        for term in expression.split(',') {
            let term = term.trim();
            if term.is_empty() {
                if expression.trim().is_empty() {
                    continue;
                }
                return Err(invalid("empty term"));
            }

            let requirement = if let Some(key) = term.strip_prefix('!') {
                let key = key.trim();
                if key.is_empty() || key.contains('=') {
                    return Err(invalid("'!' must be followed by a bare key"));
                }
                Requirement::DoesNotExist {
                    key: key.to_string(),
                }
            } else if let Some((key, value)) = term.split_once("!=") {
                Requirement::NotEquals {
                    key: parse_key(key).ok_or_else(|| invalid("missing key"))?,
                    value: value.trim().to_string(),
                }
            } else if let Some((key, value)) = term.split_once("==") {
                Requirement::Equals {
                    key: parse_key(key).ok_or_else(|| invalid("missing key"))?,
                    value: value.trim().to_string(),
                }
            } else if let Some((key, value)) = term.split_once('=') {
                Requirement::Equals {
                    key: parse_key(key).ok_or_else(|| invalid("missing key"))?,
                    value: value.trim().to_string(),
                }
            } else {
                Requirement::Exists {
                    key: term.to_string(),
                }
            };
            requirements.push(requirement);
        }

        Ok(Self { requirements })
    }

    /// True iff every requirement holds against the map.
    pub fn matches(&self, map: &HashMap<String, String>) -> bool {
        self.requirements.iter().all(|r| r.holds(map))
    }
}

fn parse_key(raw: &str) -> Option<String> {
    let key = raw.trim();
    if key.is_empty() {
        None
    } else {
        Some(key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_equality_terms() {
        let selector = Selector::parse("app=web,tier==frontend").unwrap();
        assert!(selector.matches(&labels(&[("app", "web"), ("tier", "frontend")])));
        assert!(!selector.matches(&labels(&[("app", "web"), ("tier", "backend")])));
    }

    #[test]
    fn test_inequality_and_existence() {
        let selector = Selector::parse("env!=prod,app,!legacy").unwrap();
        assert!(selector.matches(&labels(&[("env", "staging"), ("app", "web")])));
        assert!(!selector.matches(&labels(&[("env", "prod"), ("app", "web")])));
        assert!(!selector.matches(&labels(&[("env", "staging")])));
        assert!(!selector.matches(&labels(&[
            ("env", "staging"),
            ("app", "web"),
            ("legacy", "true")
        ])));
    }

    #[test]
    fn test_empty_selector_matches_everything() {
        let selector = Selector::parse("").unwrap();
        assert!(selector.matches(&labels(&[])));
        assert!(selector.matches(&labels(&[("anything", "goes")])));
    }

    #[test]
    fn test_malformed_selectors() {
        assert!(Selector::parse("=web").is_err());
        assert!(Selector::parse("!").is_err());
        assert!(Selector::parse("app=web,,tier=db").is_err());
        assert!(Selector::parse("!app=web").is_err());
    }
}
