// 🔑 Key Normalization - heterogeneous identifiers → canonical lookup keys
// Text identifiers normalize by lowercasing; numeric identifiers normalize
// leniently and report malformed input as absent, never as an error.

/// Canonical lookup key for a currency identifier.
///
/// Example: "EUR" → "eur"
pub fn canonical_key(identifier: &str) -> String {
    identifier.to_lowercase()
}

/// Normalize a numeric or numeric-text value to an ISO numeric key.
///
/// Accepts surrounding whitespace. Anything that does not parse as an
/// unsigned integer yields `None`.
pub fn numeric_key(input: &str) -> Option<u32> {
    input.trim().parse::<u32>().ok()
}

// ============================================================================
// TESTS
// ============================================================================
