// 🪙 Currency Handle - lightweight reference into the registry
//
// A handle wraps a canonical key plus shared access to the table. It is NOT
// a snapshot: re-registering a currency is observed by every handle already
// in flight. Identity lives in the key; attributes live in the table.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::record::CurrencyRecord;
use crate::registry::SharedTable;

// ============================================================================
// ATTRIBUTE ERROR
// ============================================================================

/// An accessor needed an attribute the underlying record does not carry.
///
/// Raised lazily, at access time - registering a currency without optional
/// attributes is always allowed, and the gap only surfaces when something
/// actually asks for the missing field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeError {
    /// The accessor that was invoked
    pub accessor: &'static str,
    /// Canonical id of the currency it was invoked on
    pub currency: String,
    /// The attribute that is not set
    pub attribute: &'static str,
}

impl fmt::Display for AttributeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: missing attribute '{}'",
            self.currency, self.accessor, self.attribute
        )
    }
}

impl std::error::Error for AttributeError {}

// ============================================================================
// CURRENCY HANDLE
// ============================================================================

/// A cheap, clonable reference to one registered currency.
///
/// Equality and hashing use the canonical id alone. Ordering
/// (`partial_cmp`) uses `priority` alone, so two distinct currencies with
/// the same priority compare as `Ordering::Equal` while remaining unequal
/// under `==`, and two equal handles need not compare as `Equal` once their
/// priorities diverge. The two relations are intentionally independent -
/// priority exists for display sorting, the id for identity - which is why
/// there is no `Ord` impl.
#[derive(Clone)]
pub struct Currency {
    id: String,
    table: SharedTable,
}

impl Currency {
    pub(crate) fn new(id: String, table: SharedTable) -> Self {
        Currency { id, table }
    }

    /// Canonical lowercase key.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The current record behind this handle, or `None` if the currency
    /// was unregistered after the handle was obtained.
    pub fn record(&self) -> Option<Arc<CurrencyRecord>> {
        self.table.read().unwrap().get(&self.id)
    }

    fn missing(&self, accessor: &'static str, attribute: &'static str) -> AttributeError {
        AttributeError {
            accessor,
            currency: self.id.clone(),
            attribute,
        }
    }

    // ------------------------------------------------------------------------
    // Pass-through accessors
    // ------------------------------------------------------------------------

    pub fn priority(&self) -> Option<i32> {
        self.record().and_then(|r| r.priority)
    }

    pub fn name(&self) -> Option<String> {
        self.record().and_then(|r| r.name.clone())
    }

    pub fn symbol(&self) -> Option<String> {
        self.record().and_then(|r| r.symbol.clone())
    }

    pub fn disambiguate_symbol(&self) -> Option<String> {
        self.record().and_then(|r| r.disambiguate_symbol.clone())
    }

    pub fn html_entity(&self) -> Option<String> {
        self.record().and_then(|r| r.html_entity.clone())
    }

    pub fn subunit(&self) -> Option<String> {
        self.record().and_then(|r| r.subunit.clone())
    }

    pub fn subunit_to_unit(&self) -> u64 {
        self.record().map(|r| r.subunit_to_unit).unwrap_or(1)
    }

    pub fn decimal_mark(&self) -> Option<String> {
        self.record().and_then(|r| r.decimal_mark.clone())
    }

    pub fn thousands_separator(&self) -> Option<String> {
        self.record().and_then(|r| r.thousands_separator.clone())
    }

    pub fn symbol_first(&self) -> bool {
        self.record().map(|r| r.symbol_first).unwrap_or(false)
    }

    pub fn format(&self) -> Option<String> {
        self.record().and_then(|r| r.format.clone())
    }

    // ------------------------------------------------------------------------
    // Required-attribute accessors
    // ------------------------------------------------------------------------

    /// ISO 4217 3-letter code. Custom currencies usually lack one.
    pub fn iso_code(&self) -> Result<String, AttributeError> {
        self.record()
            .and_then(|r| r.iso_code.clone())
            .ok_or_else(|| self.missing("iso_code", "iso_code"))
    }

    /// ISO 4217 numeric code.
    pub fn iso_numeric(&self) -> Result<u32, AttributeError> {
        self.record()
            .and_then(|r| r.iso_numeric)
            .ok_or_else(|| self.missing("iso_numeric", "iso_numeric"))
    }

    /// Smallest physical denomination, in subunits.
    pub fn smallest_denomination(&self) -> Result<u64, AttributeError> {
        self.record()
            .and_then(|r| r.smallest_denomination)
            .ok_or_else(|| self.missing("smallest_denomination", "smallest_denomination"))
    }

    // ------------------------------------------------------------------------
    // Derived accessors
    // ------------------------------------------------------------------------

    /// Whether the currency declares an ISO 4217 code.
    pub fn is_iso(&self) -> bool {
        self.record().map(|r| r.is_iso()).unwrap_or(false)
    }

    /// Decimal display precision.
    pub fn exponent(&self) -> u32 {
        self.record().map(|r| r.exponent()).unwrap_or(0)
    }

    /// Display code: symbol, else uppercased ISO code / id.
    pub fn code(&self) -> String {
        self.record()
            .map(|r| r.code())
            .unwrap_or_else(|| self.id.to_uppercase())
    }

    /// Three-way compare on priority: ascending, unprioritized currencies
    /// last, absent-vs-absent equal.
    pub fn cmp_priority(&self, other: &Self) -> Ordering {
        match (self.priority(), other.priority()) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

// ============================================================================
// IDENTITY AND ORDERING
// ============================================================================

impl PartialEq for Currency {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Currency {}

impl Hash for Currency {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Currency {
    /// Compares priority only - independent of `==`, see the type docs.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp_priority(other))
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id.to_uppercase())
    }
}

impl fmt::Debug for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Currency").field("id", &self.id).finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::CurrencyDef;
    use crate::registry::CurrencyRegistry;
    use std::collections::HashSet;

    fn registry() -> CurrencyRegistry {
        CurrencyRegistry::from_seed(vec![
            CurrencyDef::iso("USD")
                .with_name("United States Dollar")
                .with_symbol("$")
                .with_priority(1)
                .with_iso_numeric(840)
                .with_subunit_to_unit(100)
                .with_smallest_denomination(1),
            CurrencyDef::iso("EUR")
                .with_name("Euro")
                .with_symbol("€")
                .with_priority(2)
                .with_iso_numeric(978)
                .with_subunit_to_unit(100),
            CurrencyDef::iso("GBP")
                .with_name("British Pound")
                .with_symbol("£")
                .with_priority(2)
                .with_iso_numeric(826)
                .with_subunit_to_unit(100),
            CurrencyDef::new("btc").with_name("Bitcoin"),
        ])
        .unwrap()
    }

    #[test]
    fn test_equality_is_by_canonical_id() {
        let registry = registry();
        let a = registry.find("EUR").unwrap();
        let b = registry.find("eur").unwrap();
        let c = registry.find("usd").unwrap();

        assert_eq!(a, b);
        assert_eq!(b, a);
        assert_ne!(a, c);
    }

    #[test]
    fn test_hash_is_consistent_with_equality() {
        let registry = registry();
        let mut seen = HashSet::new();
        seen.insert(registry.find("EUR").unwrap());

        assert!(seen.contains(&registry.find("eur").unwrap()));
        assert!(!seen.contains(&registry.find("usd").unwrap()));
    }

    #[test]
    fn test_ordering_follows_priority() {
        let registry = registry();
        let usd = registry.find("usd").unwrap();
        let eur = registry.find("eur").unwrap();

        assert_eq!(usd.cmp_priority(&eur), Ordering::Less);
        assert_eq!(eur.cmp_priority(&usd), Ordering::Greater);
        assert!(usd < eur);
    }

    #[test]
    fn test_unprioritized_currencies_sort_last() {
        let registry = registry();
        let usd = registry.find("usd").unwrap();
        let btc = registry.find("btc").unwrap();

        assert_eq!(usd.cmp_priority(&btc), Ordering::Less);
        assert_eq!(btc.cmp_priority(&usd), Ordering::Greater);
    }

    #[test]
    fn test_equality_and_ordering_diverge() {
        let registry = registry();
        let eur = registry.find("eur").unwrap();
        let gbp = registry.find("gbp").unwrap();

        // same priority: equal under the comparator, distinct under ==
        assert_eq!(eur.cmp_priority(&gbp), Ordering::Equal);
        assert_ne!(eur, gbp);

        // and a handle compared against its re-registered self stays ==
        // even if its priority changes in between
        registry
            .register(
                CurrencyDef::iso("EUR")
                    .with_name("Euro")
                    .with_priority(50),
            )
            .unwrap();
        let eur_after = registry.find("eur").unwrap();
        assert_eq!(eur, eur_after);
        assert_eq!(eur.cmp_priority(&eur_after), Ordering::Equal);
    }

    #[test]
    fn test_sort_by_priority() {
        let registry = registry();
        let mut handles = vec![
            registry.find("btc").unwrap(),
            registry.find("gbp").unwrap(),
            registry.find("usd").unwrap(),
        ];
        handles.sort_by(|a, b| a.cmp_priority(b));

        let ids: Vec<&str> = handles.iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec!["usd", "gbp", "btc"]);
    }

    #[test]
    fn test_display_is_uppercased_id() {
        let registry = registry();
        assert_eq!(registry.find("eur").unwrap().to_string(), "EUR");
        assert_eq!(registry.find("btc").unwrap().to_string(), "BTC");
    }

    #[test]
    fn test_code_falls_back_without_symbol() {
        let registry = registry();
        assert_eq!(registry.find("usd").unwrap().code(), "$");
        assert_eq!(registry.find("btc").unwrap().code(), "BTC");
    }

    #[test]
    fn test_required_attribute_errors_name_the_gap() {
        let registry = registry();
        let btc = registry.find("btc").unwrap();

        let err = btc.iso_numeric().unwrap_err();
        assert_eq!(err.accessor, "iso_numeric");
        assert_eq!(err.currency, "btc");
        assert_eq!(err.attribute, "iso_numeric");
        assert_eq!(err.to_string(), "[btc] iso_numeric: missing attribute 'iso_numeric'");

        assert!(btc.iso_code().is_err());
        assert!(btc.smallest_denomination().is_err());

        // present attributes come straight through
        let usd = registry.find("usd").unwrap();
        assert_eq!(usd.iso_code().unwrap(), "USD");
        assert_eq!(usd.iso_numeric().unwrap(), 840);
        assert_eq!(usd.smallest_denomination().unwrap(), 1);
    }

    #[test]
    fn test_handles_observe_reregistration() {
        let registry = registry();
        let eur = registry.find("eur").unwrap();
        assert_eq!(eur.name(), Some("Euro".to_string()));

        registry
            .register(CurrencyDef::iso("EUR").with_name("Renamed Euro"))
            .unwrap();
        assert_eq!(eur.name(), Some("Renamed Euro".to_string()));
    }

    #[test]
    fn test_dangling_handle_degrades_softly() {
        let registry = registry();
        let eur = registry.find("eur").unwrap();
        registry.unregister("eur");

        assert!(eur.record().is_none());
        assert_eq!(eur.name(), None);
        assert_eq!(eur.subunit_to_unit(), 1);
        assert!(!eur.is_iso());
        assert!(eur.iso_code().is_err());

        // identity survives removal
        assert_eq!(eur.to_string(), "EUR");
        assert_eq!(eur.code(), "EUR");
    }

    #[test]
    fn test_exponent_passes_through() {
        let registry = registry();
        assert_eq!(registry.find("usd").unwrap().exponent(), 2);

        registry
            .register(
                CurrencyDef::iso("MGA")
                    .with_name("Malagasy Ariary")
                    .with_subunit_to_unit(5),
            )
            .unwrap();
        assert_eq!(registry.find("mga").unwrap().exponent(), 1);
    }
}
