// 🏷️ Classification Heuristics - advisory grouping of resolved currencies
//
// Best-effort rules layered over the registry. Everything here works from
// already-resolved attributes, holds no table state, and never mutates the
// registry: a wrong classification is a cosmetic problem, not a data one.

use serde::{Deserialize, Serialize};

use crate::handle::Currency;

// ============================================================================
// RULE DEFINITION
// ============================================================================

/// A single grouping rule. Patterns match the currency's ISO code (or its
/// canonical id when no code is declared), case-insensitively, with `*`
/// wildcards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupRule {
    /// Rule ID for tracking
    pub id: String,

    /// Pattern to match (supports wildcards with *)
    pub pattern: String,

    /// Group to assign
    pub group: String,

    /// Confidence score (0.0 - 1.0)
    pub confidence: f64,

    /// Description/notes about this rule
    pub description: Option<String>,

    /// Priority (higher = applied first)
    #[serde(default = "default_priority")]
    pub priority: i32,
}

fn default_priority() -> i32 {
    0
}

impl GroupRule {
    /// Check if the pattern matches the given key.
    pub fn matches(&self, key: &str) -> bool {
        let pattern = self.pattern.to_lowercase();
        let key = key.to_lowercase();

        if !pattern.contains('*') {
            return key.contains(&pattern);
        }

        let parts: Vec<&str> = pattern.split('*').collect();

        if let Some(first) = parts.first() {
            if !first.is_empty() && !key.starts_with(first) {
                return false;
            }
        }
        if let Some(last) = parts.last() {
            if !last.is_empty() && !key.ends_with(last) {
                return false;
            }
        }

        // middle parts must appear in order
        let mut pos = parts[0].len();
        for part in &parts[1..parts.len().saturating_sub(1)] {
            if part.is_empty() {
                continue;
            }
            match key[pos..].find(part) {
                Some(found) => pos += found + part.len(),
                None => return false,
            }
        }

        true
    }
}

// ============================================================================
// CLASSIFICATION RESULT
// ============================================================================

/// Outcome of classifying one currency. An unmatched currency yields the
/// default result rather than an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupResult {
    pub group: Option<String>,
    pub confidence: f64,
    pub rule_id: Option<String>,
}

// ============================================================================
// HEURISTICS ENGINE
// ============================================================================

/// Prioritized first-match-wins rule engine over currency keys.
pub struct Heuristics {
    rules: Vec<GroupRule>,
}

impl Heuristics {
    /// Create a new empty engine.
    pub fn new() -> Self {
        Heuristics { rules: Vec::new() }
    }

    /// Engine preloaded with the stock grouping rules.
    pub fn with_default_rules() -> Self {
        Self::from_rules(vec![
            GroupRule {
                id: "testing".to_string(),
                pattern: "xts".to_string(),
                group: "testing".to_string(),
                confidence: 0.95,
                description: Some("XTS is reserved for testing".to_string()),
                priority: 20,
            },
            GroupRule {
                id: "special-purpose".to_string(),
                pattern: "x*".to_string(),
                group: "special-purpose".to_string(),
                confidence: 0.8,
                description: Some(
                    "ISO 4217 reserves the X prefix for supranational and special-purpose codes"
                        .to_string(),
                ),
                priority: 10,
            },
        ])
    }

    /// Create an engine from a list of rules.
    pub fn from_rules(mut rules: Vec<GroupRule>) -> Self {
        // higher priority first
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        Heuristics { rules }
    }

    /// Add a single rule.
    pub fn add_rule(&mut self, rule: GroupRule) {
        self.rules.push(rule);
        self.rules.sort_by(|a, b| b.priority.cmp(&a.priority));
    }

    /// Classify one currency. First matching rule wins; no match yields the
    /// default result.
    pub fn classify(&self, currency: &Currency) -> GroupResult {
        let key = currency
            .iso_code()
            .map(|code| code.to_lowercase())
            .unwrap_or_else(|_| currency.id().to_string());

        for rule in &self.rules {
            if rule.matches(&key) {
                return GroupResult {
                    group: Some(rule.group.clone()),
                    confidence: rule.confidence,
                    rule_id: Some(rule.id.clone()),
                };
            }
        }

        GroupResult::default()
    }

    /// Group a collection of handles. Currencies no rule claims fall back
    /// to "iso" or "custom" by declared compliance.
    pub fn group(&self, handles: &[Currency]) -> Vec<(String, Vec<Currency>)> {
        let mut groups: Vec<(String, Vec<Currency>)> = Vec::new();
        for handle in handles {
            let name = match self.classify(handle).group {
                Some(group) => group,
                None if handle.is_iso() => "iso".to_string(),
                None => "custom".to_string(),
            };
            match groups.iter_mut().find(|(existing, _)| *existing == name) {
                Some((_, members)) => members.push(handle.clone()),
                None => groups.push((name, vec![handle.clone()])),
            }
        }
        groups
    }

    /// Get number of rules loaded.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

impl Default for Heuristics {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// STATELESS HELPERS
// ============================================================================

/// True when the resolved record plausibly describes an ISO 4217 currency,
/// even one registered without an explicit code: three ASCII letters plus an
/// assigned numeric code.
pub fn likely_iso(currency: &Currency) -> bool {
    if currency.is_iso() {
        return true;
    }
    let id = currency.id();
    id.len() == 3 && id.chars().all(|c| c.is_ascii_alphabetic()) && currency.iso_numeric().is_ok()
}

/// Split handles into (iso, custom) by declared ISO compliance.
pub fn partition_iso(handles: Vec<Currency>) -> (Vec<Currency>, Vec<Currency>) {
    handles.into_iter().partition(|currency| currency.is_iso())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::CurrencyDef;
    use crate::registry::CurrencyRegistry;

    fn rule(id: &str, pattern: &str, group: &str, priority: i32) -> GroupRule {
        GroupRule {
            id: id.to_string(),
            pattern: pattern.to_string(),
            group: group.to_string(),
            confidence: 0.9,
            description: None,
            priority,
        }
    }

    fn registry() -> CurrencyRegistry {
        CurrencyRegistry::from_seed(vec![
            CurrencyDef::iso("USD").with_iso_numeric(840),
            CurrencyDef::iso("XAU").with_name("Gold (troy ounce)"),
            CurrencyDef::iso("XTS").with_name("Testing Code"),
            CurrencyDef::new("btc").with_name("Bitcoin"),
        ])
        .unwrap()
    }

    #[test]
    fn test_exact_pattern_match() {
        let r = rule("gold", "XAU", "commodity", 0);
        assert!(r.matches("xau"));
        assert!(r.matches("XAU"));
        assert!(!r.matches("usd"));
    }

    #[test]
    fn test_wildcard_pattern() {
        let r = rule("x-codes", "x*", "special", 0);
        assert!(r.matches("xau"));
        assert!(r.matches("xts"));
        assert!(!r.matches("usd"));

        let middle = rule("mid", "*t*", "has-t", 0);
        assert!(middle.matches("xts"));
        assert!(middle.matches("btc"));
        assert!(!middle.matches("usd"));
    }

    #[test]
    fn test_classify_first_match_wins_by_priority() {
        let registry = registry();
        let heuristics = Heuristics::with_default_rules();

        let xts = registry.find("xts").unwrap();
        let result = heuristics.classify(&xts);
        assert_eq!(result.group, Some("testing".to_string()));
        assert_eq!(result.rule_id, Some("testing".to_string()));

        let xau = registry.find("xau").unwrap();
        let result = heuristics.classify(&xau);
        assert_eq!(result.group, Some("special-purpose".to_string()));
    }

    #[test]
    fn test_classify_no_match_is_default() {
        let registry = registry();
        let heuristics = Heuristics::with_default_rules();

        let result = heuristics.classify(&registry.find("usd").unwrap());
        assert_eq!(result, GroupResult::default());
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_group_falls_back_to_compliance() {
        let registry = registry();
        let heuristics = Heuristics::with_default_rules();

        let groups = heuristics.group(&registry.all());
        let names: Vec<&str> = groups.iter().map(|(name, _)| name.as_str()).collect();
        assert!(names.contains(&"iso"));
        assert!(names.contains(&"custom"));
        assert!(names.contains(&"special-purpose"));
        assert!(names.contains(&"testing"));
    }

    #[test]
    fn test_likely_iso() {
        let registry = registry();
        assert!(likely_iso(&registry.find("usd").unwrap()));
        assert!(!likely_iso(&registry.find("btc").unwrap()));

        // three letters + an assigned numeric code looks ISO even without
        // a declared iso_code
        registry
            .register(CurrencyDef::new("chf").with_iso_numeric(756))
            .unwrap();
        assert!(likely_iso(&registry.find("chf").unwrap()));
    }

    #[test]
    fn test_partition_iso() {
        let registry = registry();
        let (iso, custom) = partition_iso(registry.all());
        assert_eq!(iso.len(), 3);
        assert_eq!(custom.len(), 1);
        assert_eq!(custom[0].id(), "btc");
    }

    #[test]
    fn test_classification_never_mutates_the_table() {
        let registry = registry();
        let before: Vec<String> = registry.all().iter().map(|c| c.id().to_string()).collect();

        let heuristics = Heuristics::with_default_rules();
        for handle in registry.all() {
            let _ = heuristics.classify(&handle);
        }
        let _ = heuristics.group(&registry.all());

        let after: Vec<String> = registry.all().iter().map(|c| c.id().to_string()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_rule_priority_ordering() {
        let mut heuristics = Heuristics::new();
        heuristics.add_rule(rule("broad", "x*", "broad", 1));
        heuristics.add_rule(rule("narrow", "xau", "narrow", 100));
        assert_eq!(heuristics.rule_count(), 2);

        let registry = registry();
        let result = heuristics.classify(&registry.find("xau").unwrap());
        assert_eq!(result.group, Some("narrow".to_string()));
    }
}
