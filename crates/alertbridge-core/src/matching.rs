//! Organization identity matching.
//!
//! Two heuristics live here, both pure:
//!
//! - [`match_organization`] pairs a display name with one organization from
//!   another system, using case folding, business-suffix stripping, and a
//!   conservative containment check.
//! - [`match_device_prefix`] guesses the owner of a device from the leading
//!   letters of its name (`CVC-S5TB` belongs to "Carlos Van Copper").
//!
//! Both return `None` rather than guess: an unmapped row is cheap to fix by
//! hand, a wrong mapping files tickets against the wrong client.

/// Anything with a display name that can take part in matching.
pub trait NamedOrganization {
    fn name(&self) -> &str;
}

/// Trailing business-entity suffixes removed during normalization, applied
/// in this order.
const ENTITY_SUFFIXES: [&str; 14] = [
    ", llc", " llc", ", inc", " inc", ", corp", " corp", ", co", " co", ", ltd", " ltd", ", pllc",
    " pllc", ", company", " company",
];

/// Words that never contribute to an organization's initials.
const INITIALS_STOPWORDS: [&str; 5] = ["LLC", "INC", "CORP", "P.C.", "&"];

/// Minimum normalized length before containment matching is attempted.
const MIN_CONTAINMENT_LEN: usize = 5;

/// Lower-case `name`, strip business suffixes, and trim.
pub fn normalize_org_name(name: &str) -> String {
    let mut lower = name.to_lowercase();
    for suffix in ENTITY_SUFFIXES {
        if lower.ends_with(suffix) {
            let keep = lower.len() - suffix.len();
            lower.truncate(keep);
        }
    }
    lower.trim().to_string()
}

/// Find the organization whose name matches `candidate`.
///
/// Tried in order, first hit wins:
/// 1. exact match on lower-cased names
/// 2. exact match on normalized names
/// 3. containment: both normalized names at least 5 characters, one contains
///    the other, and the shorter is at least 70% of the longer
pub fn match_organization<'a, T: NamedOrganization>(
    candidate: &str,
    orgs: &'a [T],
) -> Option<&'a T> {
    let candidate_lower = candidate.to_lowercase();
    if let Some(org) = orgs
        .iter()
        .find(|org| org.name().to_lowercase() == candidate_lower)
    {
        return Some(org);
    }

    let candidate_clean = normalize_org_name(candidate);
    if let Some(org) = orgs
        .iter()
        .find(|org| normalize_org_name(org.name()) == candidate_clean)
    {
        return Some(org);
    }

    if candidate_clean.chars().count() < MIN_CONTAINMENT_LEN {
        return None;
    }

    orgs.iter().find(|org| {
        let clean = normalize_org_name(org.name());
        clean.chars().count() >= MIN_CONTAINMENT_LEN && contains_closely(&candidate_clean, &clean)
    })
}

/// One string contains the other and the lengths are within 70%.
fn contains_closely(a: &str, b: &str) -> bool {
    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if !longer.contains(shorter) {
        return false;
    }
    // shorter / longer >= 0.7, kept in integers.
    shorter.chars().count() * 10 >= longer.chars().count() * 7
}

/// Leading part of a device name used for owner matching.
///
/// Upper-cased text before the first hyphen or ASCII digit. When there is
/// no such character, or it is the very first one, the whole upper-cased
/// name is used so an empty prefix never matches everything.
pub fn device_prefix(device_name: &str) -> String {
    let upper = device_name.to_uppercase();
    match upper.find(|c: char| c == '-' || c.is_ascii_digit()) {
        Some(idx) if idx > 0 => upper[..idx].to_string(),
        _ => upper,
    }
}

/// Initials of an upper-cased organization name, skipping entity words.
pub fn org_initials(upper_name: &str) -> String {
    upper_name
        .split_whitespace()
        .filter(|word| !INITIALS_STOPWORDS.contains(word))
        .filter_map(|word| word.chars().next())
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

/// Find the organization a device most likely belongs to, by name prefix.
///
/// For each organization in order, matches when its upper-cased name starts
/// with the device prefix, or when its initials equal the prefix.
pub fn match_device_prefix<'a, T: NamedOrganization>(
    device_name: &str,
    orgs: &'a [T],
) -> Option<&'a T> {
    if device_name.trim().is_empty() {
        return None;
    }

    let prefix = device_prefix(device_name);
    orgs.iter().find(|org| {
        let upper = org.name().to_uppercase();
        upper.starts_with(&prefix) || org_initials(&upper) == prefix
    })
}
