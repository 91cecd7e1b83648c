// 💱 Currency Record - immutable value object + raw attribute bag
//
// A CurrencyRecord is what the registry resolves to: one currency's display
// and arithmetic rules, frozen at registration time. Records are replaced
// whole, never mutated in place.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::normalize;

// ============================================================================
// EXPONENT OVERRIDES
// ============================================================================

/// Currencies whose exponent is fixed at 1 regardless of their subunit
/// ratio: the Malagasy ariary and the Mauritanian ouguiya, both divided
/// into 5 subunits.
const EXPONENT_OVERRIDES: [&str; 2] = ["mga", "mru"];

// ============================================================================
// CURRENCY RECORD
// ============================================================================

/// One currency's resolved attributes.
///
/// `id` is the canonical lowercase key and the only field guaranteed to be
/// present; everything else is optional metadata a custom registration may
/// omit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyRecord {
    /// Canonical lowercase key - unique within the table
    pub id: String,

    /// Default ordering among currencies (not required to be unique)
    pub priority: Option<i32>,

    /// ISO 4217 3-letter code
    pub iso_code: Option<String>,

    /// ISO 4217 3-digit numeric code - unique within the numeric index
    pub iso_numeric: Option<u32>,

    /// Display name
    pub name: Option<String>,

    /// Presentation strings
    pub symbol: Option<String>,
    pub disambiguate_symbol: Option<String>,
    pub html_entity: Option<String>,

    /// Name of the fractional unit ("Cent", "Penny", ...)
    pub subunit: Option<String>,

    /// Subunits per unit - always positive
    pub subunit_to_unit: u64,

    /// Formatting punctuation
    pub decimal_mark: Option<String>,
    pub thousands_separator: Option<String>,

    /// Symbol placement: before the amount when true
    pub symbol_first: bool,

    /// Smallest physical denomination, in subunits
    pub smallest_denomination: Option<u64>,

    /// Display format template
    pub format: Option<String>,
}

impl CurrencyRecord {
    /// Whether this record carries an ISO 4217 code.
    pub fn is_iso(&self) -> bool {
        self.iso_code.is_some()
    }

    /// Decimal display precision: base-10 log of the subunit ratio, rounded.
    ///
    /// The ariary and the ouguiya report 1 whatever their ratio says.
    pub fn exponent(&self) -> u32 {
        if EXPONENT_OVERRIDES.contains(&self.id.as_str()) {
            return 1;
        }
        (self.subunit_to_unit as f64).log10().round() as u32
    }

    /// Display code: the symbol when present, else the uppercased ISO
    /// code / id.
    pub fn code(&self) -> String {
        match &self.symbol {
            Some(symbol) if !symbol.is_empty() => symbol.clone(),
            _ => self
                .iso_code
                .as_deref()
                .unwrap_or(&self.id)
                .to_uppercase(),
        }
    }
}

// ============================================================================
// CURRENCY DEFINITION (ATTRIBUTE BAG)
// ============================================================================

/// Raw attribute bag accepted by register/inherit and produced by the seed
/// source.
///
/// Every field is optional so that merge semantics can tell "explicitly
/// set" apart from "absent". Unrecognized keys are ignored on
/// deserialization; `separator` and `delimiter` are accepted as aliases for
/// the punctuation fields; `iso_numeric` accepts a number or numeric text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrencyDef {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub priority: Option<i32>,

    #[serde(default)]
    pub iso_code: Option<String>,

    #[serde(default, deserialize_with = "de_iso_numeric")]
    pub iso_numeric: Option<u32>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub symbol: Option<String>,

    #[serde(default)]
    pub disambiguate_symbol: Option<String>,

    #[serde(default)]
    pub html_entity: Option<String>,

    #[serde(default)]
    pub subunit: Option<String>,

    #[serde(default)]
    pub subunit_to_unit: Option<u64>,

    #[serde(default, alias = "separator")]
    pub decimal_mark: Option<String>,

    #[serde(default, alias = "delimiter")]
    pub thousands_separator: Option<String>,

    #[serde(default)]
    pub symbol_first: Option<bool>,

    #[serde(default)]
    pub smallest_denomination: Option<u64>,

    #[serde(default)]
    pub format: Option<String>,
}

/// Accept `978`, `"978"`, or nothing at all for the numeric code.
fn de_iso_numeric<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Num(n)) => u32::try_from(n).ok(),
        Some(Raw::Text(s)) => normalize::numeric_key(&s),
        None => None,
    })
}

impl CurrencyDef {
    /// Create a definition keyed by a custom identifier.
    pub fn new(id: impl Into<String>) -> Self {
        CurrencyDef {
            id: Some(id.into()),
            ..CurrencyDef::default()
        }
    }

    /// Create a definition keyed by an ISO code.
    pub fn iso(iso_code: impl Into<String>) -> Self {
        CurrencyDef {
            iso_code: Some(iso_code.into()),
            ..CurrencyDef::default()
        }
    }

    /// Builder: display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builder: display symbol
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Builder: ordering priority
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Builder: ISO numeric code
    pub fn with_iso_numeric(mut self, iso_numeric: u32) -> Self {
        self.iso_numeric = Some(iso_numeric);
        self
    }

    /// Builder: fractional unit name
    pub fn with_subunit(mut self, subunit: impl Into<String>) -> Self {
        self.subunit = Some(subunit.into());
        self
    }

    /// Builder: subunits per unit
    pub fn with_subunit_to_unit(mut self, ratio: u64) -> Self {
        self.subunit_to_unit = Some(ratio);
        self
    }

    /// Builder: symbol placement
    pub fn with_symbol_first(mut self, symbol_first: bool) -> Self {
        self.symbol_first = Some(symbol_first);
        self
    }

    /// Builder: smallest physical denomination
    pub fn with_smallest_denomination(mut self, denomination: u64) -> Self {
        self.smallest_denomination = Some(denomination);
        self
    }

    /// Canonical key for this bag: `id` when present, else `iso_code`,
    /// lowercased. A bag with neither cannot be registered.
    pub fn canonical_id(&self) -> Option<String> {
        self.id
            .as_deref()
            .or(self.iso_code.as_deref())
            .map(normalize::canonical_key)
    }

    /// Build a definition from a loose JSON mapping. Unrecognized keys are
    /// dropped.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// The full attribute set of an existing record, as a bag.
    pub fn from_record(record: &CurrencyRecord) -> Self {
        CurrencyDef {
            id: Some(record.id.clone()),
            priority: record.priority,
            iso_code: record.iso_code.clone(),
            iso_numeric: record.iso_numeric,
            name: record.name.clone(),
            symbol: record.symbol.clone(),
            disambiguate_symbol: record.disambiguate_symbol.clone(),
            html_entity: record.html_entity.clone(),
            subunit: record.subunit.clone(),
            subunit_to_unit: Some(record.subunit_to_unit),
            decimal_mark: record.decimal_mark.clone(),
            thousands_separator: record.thousands_separator.clone(),
            symbol_first: Some(record.symbol_first),
            smallest_denomination: record.smallest_denomination,
            format: record.format.clone(),
        }
    }

    /// Overlay this bag's explicit fields on a parent's attributes.
    ///
    /// Identity fields (`id`, `iso_code`, `iso_numeric`) transfer from the
    /// parent only when the child brings no key of its own: a child keyed as
    /// a new currency must not claim the parent's codes, the numeric index
    /// keeps one holder per code.
    pub fn merged_over(&self, parent: &CurrencyDef) -> CurrencyDef {
        let keeps_parent_key = self.id.is_none() && self.iso_code.is_none();
        CurrencyDef {
            id: self
                .id
                .clone()
                .or_else(|| parent.id.clone().filter(|_| keeps_parent_key)),
            priority: self.priority.or(parent.priority),
            iso_code: self
                .iso_code
                .clone()
                .or_else(|| parent.iso_code.clone().filter(|_| keeps_parent_key)),
            iso_numeric: self
                .iso_numeric
                .or(parent.iso_numeric.filter(|_| keeps_parent_key)),
            name: self.name.clone().or_else(|| parent.name.clone()),
            symbol: self.symbol.clone().or_else(|| parent.symbol.clone()),
            disambiguate_symbol: self
                .disambiguate_symbol
                .clone()
                .or_else(|| parent.disambiguate_symbol.clone()),
            html_entity: self
                .html_entity
                .clone()
                .or_else(|| parent.html_entity.clone()),
            subunit: self.subunit.clone().or_else(|| parent.subunit.clone()),
            subunit_to_unit: self.subunit_to_unit.or(parent.subunit_to_unit),
            decimal_mark: self
                .decimal_mark
                .clone()
                .or_else(|| parent.decimal_mark.clone()),
            thousands_separator: self
                .thousands_separator
                .clone()
                .or_else(|| parent.thousands_separator.clone()),
            symbol_first: self.symbol_first.or(parent.symbol_first),
            smallest_denomination: self
                .smallest_denomination
                .or(parent.smallest_denomination),
            format: self.format.clone().or_else(|| parent.format.clone()),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, subunit_to_unit: u64) -> CurrencyRecord {
        CurrencyRecord {
            id: id.to_string(),
            priority: None,
            iso_code: None,
            iso_numeric: None,
            name: None,
            symbol: None,
            disambiguate_symbol: None,
            html_entity: None,
            subunit: None,
            subunit_to_unit,
            decimal_mark: None,
            thousands_separator: None,
            symbol_first: false,
            smallest_denomination: None,
            format: None,
        }
    }

    #[test]
    fn test_exponent_from_subunit_ratio() {
        assert_eq!(record("usd", 100).exponent(), 2);
        assert_eq!(record("jpy", 1).exponent(), 0);
        assert_eq!(record("kwd", 1000).exponent(), 3);
        assert_eq!(record("mga", 5).exponent(), 1);
    }

    #[test]
    fn test_exponent_overrides_win_over_ratio() {
        // The override list is authoritative even when the stored ratio
        // disagrees with it.
        assert_eq!(record("mga", 100).exponent(), 1);
        assert_eq!(record("mru", 1000).exponent(), 1);
    }

    #[test]
    fn test_code_prefers_symbol() {
        let mut rec = record("usd", 100);
        rec.symbol = Some("$".to_string());
        rec.iso_code = Some("USD".to_string());
        assert_eq!(rec.code(), "$");
    }

    #[test]
    fn test_code_falls_back_to_uppercased_id() {
        let mut rec = record("btc", 100_000_000);
        assert_eq!(rec.code(), "BTC");

        rec.iso_code = Some("XBT".to_string());
        assert_eq!(rec.code(), "XBT");
    }

    #[test]
    fn test_canonical_id_prefers_explicit_id() {
        let def = CurrencyDef {
            id: Some("Custom".to_string()),
            iso_code: Some("USD".to_string()),
            ..CurrencyDef::default()
        };
        assert_eq!(def.canonical_id(), Some("custom".to_string()));
    }

    #[test]
    fn test_canonical_id_falls_back_to_iso_code() {
        let def = CurrencyDef::iso("EUR");
        assert_eq!(def.canonical_id(), Some("eur".to_string()));

        let keyless = CurrencyDef::default().with_name("No Key");
        assert_eq!(keyless.canonical_id(), None);
    }

    #[test]
    fn test_deserialization_accepts_aliases() {
        let def: CurrencyDef = serde_json::from_str(
            r#"{"iso_code": "EUR", "separator": ",", "delimiter": "."}"#,
        )
        .unwrap();
        assert_eq!(def.decimal_mark, Some(",".to_string()));
        assert_eq!(def.thousands_separator, Some(".".to_string()));
    }

    #[test]
    fn test_deserialization_ignores_unknown_keys() {
        let def = CurrencyDef::from_value(serde_json::json!({
            "iso_code": "EUR",
            "exchange_rate": 1.09,
            "country": "EU"
        }))
        .unwrap();
        assert_eq!(def.iso_code, Some("EUR".to_string()));
    }

    #[test]
    fn test_iso_numeric_accepts_number_or_text() {
        let from_num: CurrencyDef =
            serde_json::from_str(r#"{"iso_code": "EUR", "iso_numeric": 978}"#).unwrap();
        let from_text: CurrencyDef =
            serde_json::from_str(r#"{"iso_code": "EUR", "iso_numeric": "978"}"#).unwrap();
        assert_eq!(from_num.iso_numeric, Some(978));
        assert_eq!(from_text.iso_numeric, Some(978));

        let malformed: CurrencyDef =
            serde_json::from_str(r#"{"iso_code": "EUR", "iso_numeric": "n/a"}"#).unwrap();
        assert_eq!(malformed.iso_numeric, None);
    }

    #[test]
    fn test_merge_child_fields_take_precedence() {
        let parent = CurrencyDef::iso("USD")
            .with_name("United States Dollar")
            .with_symbol("$")
            .with_subunit_to_unit(100);
        let child = CurrencyDef::iso("USX").with_name("Test");

        let merged = child.merged_over(&parent);
        assert_eq!(merged.iso_code, Some("USX".to_string()));
        assert_eq!(merged.name, Some("Test".to_string()));
        assert_eq!(merged.symbol, Some("$".to_string()));
        assert_eq!(merged.subunit_to_unit, Some(100));
    }

    #[test]
    fn test_merge_keyed_child_does_not_inherit_identity() {
        let parent = CurrencyDef::iso("USD")
            .with_name("United States Dollar")
            .with_iso_numeric(840);
        let parent = CurrencyDef {
            id: Some("usd".to_string()),
            ..parent
        };
        let child = CurrencyDef::iso("USX");

        let merged = child.merged_over(&parent);
        assert_eq!(merged.id, None);
        assert_eq!(merged.iso_code, Some("USX".to_string()));
        assert_eq!(merged.iso_numeric, None);
        assert_eq!(merged.canonical_id(), Some("usx".to_string()));
    }

    #[test]
    fn test_merge_keyless_child_re_registers_parent() {
        let parent = CurrencyDef::iso("USD").with_iso_numeric(840);
        let child = CurrencyDef::default().with_name("Renamed Dollar");

        let merged = child.merged_over(&parent);
        assert_eq!(merged.canonical_id(), Some("usd".to_string()));
        assert_eq!(merged.iso_numeric, Some(840));
        assert_eq!(merged.name, Some("Renamed Dollar".to_string()));
    }
}
