//! Wildcard attribute patterns.
//!
//! Fetch rules may name a family of attributes with `%` (SQL style) or `*`
//! (glob style), e.g. `icd_n18%`. Fixtures need concrete column names, so
//! each marker is replaced by a random two-letter suffix.

use crate::rng::SeededRandom;

const ALPHABET: &[u8; 26] = b"abcdefghijklmnopqrstuvwxyz";

/// Markers in substitution order
const MARKERS: [char; 2] = ['%', '*'];

/// True if the name contains `%` or `*`
pub fn is_wildcard(name: &str) -> bool {
    name.contains(MARKERS)
}

/// Two lowercase letters; two draws, first letter first
fn random_suffix(rng: &mut SeededRandom) -> String {
    (0..2)
        .map(|_| ALPHABET[rng.index(ALPHABET.len())] as char)
        .collect()
}

/// Expand a single name into a concrete one.
///
/// Concrete names are returned unchanged and consume no draws. Otherwise
/// every `%` is replaced left to right, then every `*`, each marker
/// consuming two draws.
pub fn expand_one(name: &str, rng: &mut SeededRandom) -> String {
    let mut expanded = name.to_string();
    for marker in MARKERS {
        while let Some(pos) = expanded.find(marker) {
            let suffix = random_suffix(rng);
            expanded.replace_range(pos..pos + marker.len_utf8(), &suffix);
        }
    }
    expanded
}

/// Expand every name in iteration order, one output per input.
///
/// No deduplication: the same pattern twice yields two fresh names.
pub fn expand_many<'a, I>(names: I, rng: &mut SeededRandom) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    names
        .into_iter()
        .map(|name| {
            let concrete = expand_one(name, rng);
            if concrete != *name {
                tracing::trace!(pattern = %name, expanded = %concrete, "expanded wildcard");
            }
            concrete
        })
        .collect()
}

/// Drop wildcard names instead of expanding them.
#[deprecated(note = "use `expand_many`, which keeps wildcard attributes as concrete names")]
pub fn filter_concrete<'a, I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    names
        .into_iter()
        .filter(|name| !is_wildcard(name))
        .cloned()
        .collect()
}
