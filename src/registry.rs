// 🗂️ Currency Table - process-wide registry of currency definitions
//
// Primary index: canonical key → record. Secondary index: ISO numeric code
// → canonical key. Every mutation updates both indices under one write
// lock; lookups take shared read locks and hand out cheap handles.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::handle::Currency;
use crate::normalize;
use crate::record::{CurrencyDef, CurrencyRecord};
use crate::seed;

// ============================================================================
// ERRORS
// ============================================================================

/// Hard failures of the registration and coercion paths.
///
/// Lookups (`find`, `find_by_iso_numeric`) never produce these; absence is
/// an expected outcome there and is reported as `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// An identifier that was promised to resolve did not (wrap, inherit)
    UnknownCurrency(String),

    /// A definition with no `id` and no `iso_code` cannot be keyed
    MissingCurrencyId,

    /// `subunit_to_unit` must stay positive
    InvalidSubunitRatio { id: String },

    /// The numeric index keeps one holder per ISO numeric code
    DuplicateIsoNumeric {
        id: String,
        iso_numeric: u32,
        held_by: String,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::UnknownCurrency(id) => {
                write!(f, "unknown currency: {}", id)
            }
            RegistryError::MissingCurrencyId => {
                write!(f, "currency definition carries neither id nor iso_code")
            }
            RegistryError::InvalidSubunitRatio { id } => {
                write!(f, "currency '{}': subunit_to_unit must be greater than zero", id)
            }
            RegistryError::DuplicateIsoNumeric {
                id,
                iso_numeric,
                held_by,
            } => {
                write!(
                    f,
                    "currency '{}': iso_numeric {} is already registered to '{}'",
                    id, iso_numeric, held_by
                )
            }
        }
    }
}

impl std::error::Error for RegistryError {}

// ============================================================================
// SHARED TABLE STATE
// ============================================================================

pub(crate) type SharedTable = Arc<RwLock<TableInner>>;

/// The two lookup indices plus registration order. Mutated only as a whole,
/// under the outer write lock.
#[derive(Debug, Default)]
pub(crate) struct TableInner {
    records: HashMap<String, Arc<CurrencyRecord>>,
    numeric: HashMap<u32, String>,
    order: Vec<String>,
}

impl TableInner {
    pub(crate) fn get(&self, id: &str) -> Option<Arc<CurrencyRecord>> {
        self.records.get(id).cloned()
    }
}

// ============================================================================
// LOOSE INPUTS
// ============================================================================

/// Loose input accepted by [`CurrencyRegistry::wrap`].
#[derive(Debug, Clone)]
pub enum CurrencyInput {
    /// An already-resolved handle - passes through unchanged
    Handle(Currency),
    /// A raw identifier still to be resolved
    Id(String),
    /// Explicit absence
    None,
}

impl From<Currency> for CurrencyInput {
    fn from(handle: Currency) -> Self {
        CurrencyInput::Handle(handle)
    }
}

impl From<&Currency> for CurrencyInput {
    fn from(handle: &Currency) -> Self {
        CurrencyInput::Handle(handle.clone())
    }
}

impl From<&str> for CurrencyInput {
    fn from(id: &str) -> Self {
        CurrencyInput::Id(id.to_string())
    }
}

impl From<String> for CurrencyInput {
    fn from(id: String) -> Self {
        CurrencyInput::Id(id)
    }
}

impl<T: Into<CurrencyInput>> From<Option<T>> for CurrencyInput {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(inner) => inner.into(),
            None => CurrencyInput::None,
        }
    }
}

/// Key accepted by [`CurrencyRegistry::unregister`]: a plain identifier or
/// an attribute bag carrying one.
#[derive(Debug, Clone)]
pub enum RemovalKey {
    Id(String),
    Def(CurrencyDef),
}

impl From<&str> for RemovalKey {
    fn from(id: &str) -> Self {
        RemovalKey::Id(id.to_string())
    }
}

impl From<String> for RemovalKey {
    fn from(id: String) -> Self {
        RemovalKey::Id(id)
    }
}

impl From<CurrencyDef> for RemovalKey {
    fn from(def: CurrencyDef) -> Self {
        RemovalKey::Def(def)
    }
}

impl From<&CurrencyDef> for RemovalKey {
    fn from(def: &CurrencyDef) -> Self {
        RemovalKey::Def(def.clone())
    }
}

// ============================================================================
// CURRENCY REGISTRY
// ============================================================================

/// The mutable, process-wide table of currency definitions.
///
/// Cloning shares the underlying table: every clone (and every handle)
/// observes the same registrations. The original seed sequence is retained
/// so `reset` can restore the table to its initial state.
#[derive(Clone)]
pub struct CurrencyRegistry {
    table: SharedTable,
    seed: Arc<Vec<CurrencyDef>>,
}

impl CurrencyRegistry {
    /// Registry seeded with the bundled ISO 4217 table.
    pub fn new() -> Self {
        // the bundled table registers cleanly; a failure here means the
        // embedded data itself is broken
        Self::from_seed(seed::bundled()).expect("bundled currency table is valid")
    }

    /// Registry with no seed at all. `reset` empties it.
    pub fn empty() -> Self {
        CurrencyRegistry {
            table: Arc::new(RwLock::new(TableInner::default())),
            seed: Arc::new(Vec::new()),
        }
    }

    /// Registry seeded from an ordered sequence of definition records.
    pub fn from_seed(defs: Vec<CurrencyDef>) -> Result<Self, RegistryError> {
        let mut inner = TableInner::default();
        for def in &defs {
            Self::insert(&mut inner, def)?;
        }
        Ok(CurrencyRegistry {
            table: Arc::new(RwLock::new(inner)),
            seed: Arc::new(defs),
        })
    }

    // ------------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------------

    /// Resolve an identifier to a handle. Total over all inputs: unknown
    /// keys yield `None`, never an error.
    pub fn find(&self, identifier: &str) -> Option<Currency> {
        let key = normalize::canonical_key(identifier);
        let known = self.table.read().unwrap().records.contains_key(&key);
        known.then(|| Currency::new(key, Arc::clone(&self.table)))
    }

    /// Resolve an ISO numeric code (as a number or numeric text) to a
    /// handle. Malformed or unassigned codes yield `None`.
    pub fn find_by_iso_numeric(&self, num: impl ToString) -> Option<Currency> {
        let num = normalize::numeric_key(&num.to_string())?;
        let id = self.table.read().unwrap().numeric.get(&num).cloned()?;
        Some(Currency::new(id, Arc::clone(&self.table)))
    }

    /// Idempotent coercion to a handle.
    ///
    /// Handles pass through unchanged and explicit absence stays absent;
    /// a raw identifier is resolved via `find` and failure to resolve is
    /// reported as [`RegistryError::UnknownCurrency`] - callers of `wrap`
    /// assume a valid currency exists.
    pub fn wrap(&self, value: impl Into<CurrencyInput>) -> Result<Option<Currency>, RegistryError> {
        match value.into() {
            CurrencyInput::Handle(handle) => Ok(Some(handle)),
            CurrencyInput::Id(id) => self
                .find(&id)
                .map(Some)
                .ok_or(RegistryError::UnknownCurrency(id)),
            CurrencyInput::None => Ok(None),
        }
    }

    /// Every live currency, in registration order.
    pub fn all(&self) -> Vec<Currency> {
        let inner = self.table.read().unwrap();
        inner
            .order
            .iter()
            .map(|id| Currency::new(id.clone(), Arc::clone(&self.table)))
            .collect()
    }

    /// Number of live currencies.
    pub fn count(&self) -> usize {
        self.table.read().unwrap().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    /// Register a currency from an attribute bag.
    ///
    /// Re-registering an existing id replaces its record and moves or drops
    /// its numeric-index entry to match. Missing optional attributes are
    /// fine; only a bag with no keying information at all is rejected, plus
    /// the two invariant violations (`subunit_to_unit == 0`, numeric code
    /// held by another currency).
    pub fn register(&self, def: CurrencyDef) -> Result<Currency, RegistryError> {
        let mut inner = self.table.write().unwrap();
        let id = Self::insert(&mut inner, &def)?;
        drop(inner);
        Ok(Currency::new(id, Arc::clone(&self.table)))
    }

    /// Register a currency derived from an existing one: the child's
    /// explicit attributes overlay a copy of the parent's.
    ///
    /// Fails with [`RegistryError::UnknownCurrency`] when the parent is not
    /// registered.
    pub fn inherit(&self, parent: &str, def: CurrencyDef) -> Result<Currency, RegistryError> {
        let parent_record = self
            .find(parent)
            .and_then(|handle| handle.record())
            .ok_or_else(|| RegistryError::UnknownCurrency(parent.to_string()))?;
        let merged = def.merged_over(&CurrencyDef::from_record(&parent_record));
        self.register(merged)
    }

    /// Remove a currency by identifier or by an attribute bag carrying one.
    ///
    /// Returns whether a record was removed; absence is not an error.
    pub fn unregister(&self, key: impl Into<RemovalKey>) -> bool {
        let id = match key.into() {
            RemovalKey::Id(id) => normalize::canonical_key(&id),
            RemovalKey::Def(def) => match def.canonical_id() {
                Some(id) => id,
                None => return false,
            },
        };

        let mut inner = self.table.write().unwrap();
        match inner.records.remove(&id) {
            Some(record) => {
                if let Some(num) = record.iso_numeric {
                    inner.numeric.remove(&num);
                }
                inner.order.retain(|entry| entry != &id);
                true
            }
            None => false,
        }
    }

    /// Restore the table to its original seeded state, discarding every
    /// runtime registration and unregistration. Idempotent.
    pub fn reset(&self) {
        let mut fresh = TableInner::default();
        for def in self.seed.iter() {
            // the seed sequence already registered once at construction
            let _ = Self::insert(&mut fresh, def);
        }
        *self.table.write().unwrap() = fresh;
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    /// Validate a definition and insert it into both indices. The caller
    /// holds the write lock (or owns the table exclusively), so the two
    /// index updates are observed together.
    fn insert(inner: &mut TableInner, def: &CurrencyDef) -> Result<String, RegistryError> {
        let id = def.canonical_id().ok_or(RegistryError::MissingCurrencyId)?;

        let subunit_to_unit = def.subunit_to_unit.unwrap_or(1);
        if subunit_to_unit == 0 {
            return Err(RegistryError::InvalidSubunitRatio { id });
        }

        if let Some(num) = def.iso_numeric {
            if let Some(holder) = inner.numeric.get(&num) {
                if *holder != id {
                    return Err(RegistryError::DuplicateIsoNumeric {
                        id,
                        iso_numeric: num,
                        held_by: holder.clone(),
                    });
                }
            }
        }

        let record = CurrencyRecord {
            id: id.clone(),
            priority: def.priority,
            iso_code: def.iso_code.clone(),
            iso_numeric: def.iso_numeric,
            name: def.name.clone(),
            symbol: def.symbol.clone(),
            disambiguate_symbol: def.disambiguate_symbol.clone(),
            html_entity: def.html_entity.clone(),
            subunit: def.subunit.clone(),
            subunit_to_unit,
            decimal_mark: def.decimal_mark.clone(),
            thousands_separator: def.thousands_separator.clone(),
            symbol_first: def.symbol_first.unwrap_or(false),
            smallest_denomination: def.smallest_denomination,
            format: def.format.clone(),
        };

        if let Some(previous) = inner.records.insert(id.clone(), Arc::new(record)) {
            // replacement: the numeric entry for the old record, if any,
            // belongs to this id and goes away with it
            if let Some(old) = previous.iso_numeric {
                inner.numeric.remove(&old);
            }
        } else {
            inner.order.push(id.clone());
        }

        if let Some(num) = def.iso_numeric {
            inner.numeric.insert(num, id.clone());
        }

        Ok(id)
    }
}

impl Default for CurrencyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CurrencyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurrencyRegistry")
            .field("count", &self.count())
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================
