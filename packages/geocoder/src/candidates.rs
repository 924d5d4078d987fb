//! Fallback query candidates for hard-to-geocode addresses.
//!
//! Highway service areas are the common failure case: Nominatim rarely
//! knows "Service Area Holzkirchen, Autobahn A8" verbatim, but does
//! know "Raststaette Holzkirchen". Candidates are ordered from most to
//! least faithful to the caller's input; a match on anything but the
//! first candidate counts as a fallback.

use std::sync::LazyLock;

use regex::Regex;

/// Matches the English "service area" vocabulary.
static SERVICE_AREA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bservice\s+area\b").expect("valid regex"));

/// Matches the word "autobahn".
static AUTOBAHN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bautobahn\b").expect("valid regex"));

/// Matches autobahn route numbers ("A8", "A 99").
static ROUTE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bA\s?\d+\b").expect("valid regex"));

/// Collapses runs of whitespace left behind by the removals.
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("valid regex"));

/// Builds the ordered, deduplicated list of query candidates for an
/// address. The first entry is the primary (non-fallback) query.
#[must_use]
pub fn query_candidates(address: &str) -> Vec<String> {
    let trimmed = address.trim();

    // Keep the search scoped to Germany.
    let lower = trimmed.to_lowercase();
    let primary = if lower.contains("germany") || lower.contains("deutschland") {
        trimmed.to_string()
    } else {
        format!("{trimmed}, Germany")
    };

    let simplified = simplify(&primary);

    let mut candidates = vec![primary];
    if !simplified.is_empty() && !candidates.contains(&simplified) {
        candidates.push(simplified);
    }
    candidates
}

/// Strips autobahn vocabulary and swaps in the local term for service
/// areas.
fn simplify(query: &str) -> String {
    let replaced = SERVICE_AREA_RE.replace_all(query, "raststaette");
    let replaced = AUTOBAHN_RE.replace_all(&replaced, "");
    let replaced = ROUTE_NUMBER_RE.replace_all(&replaced, "");
    WHITESPACE_RE.replace_all(&replaced, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_country_scope() {
        let candidates = query_candidates("Marienplatz 1, München");
        assert_eq!(candidates[0], "Marienplatz 1, München, Germany");
    }

    #[test]
    fn keeps_existing_country_scope() {
        let candidates = query_candidates("Marienplatz 1, München, Deutschland");
        assert_eq!(candidates[0], "Marienplatz 1, München, Deutschland");
    }

    #[test]
    fn simplifies_service_area_addresses() {
        let candidates = query_candidates("Service Area Holzkirchen, Autobahn A8");
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[1], "raststaette Holzkirchen, , Germany");
    }

    #[test]
    fn plain_addresses_have_no_fallback() {
        let candidates = query_candidates("Hauptstraße 5, Berlin");
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn strips_route_numbers_with_space() {
        let simplified = simplify("Rasthof an der A 99, Germany");
        assert!(!simplified.contains("99"));
    }
}
