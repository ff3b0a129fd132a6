//! Vehicle-name slug normalization.
//!
//! Reference files are addressed by a filesystem-safe slug derived from the
//! vehicle's display name. Pure functions, no I/O.

use regex::Regex;
use std::sync::LazyLock;

// Compiled once, reused across calls.
static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static RE_DISALLOWED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9_-]").unwrap());

/// Normalize a vehicle display name into a lookup slug.
///
/// Lower-cases, maps whitespace runs to a single underscore, and strips
/// everything outside `[a-z0-9_-]`. Idempotent: normalizing a slug yields
/// the same slug.
pub fn vehicle_slug(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let underscored = RE_WHITESPACE.replace_all(&lowered, "_");
    RE_DISALLOWED.replace_all(&underscored, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_underscores() {
        assert_eq!(vehicle_slug("F 16A"), "f_16a");
    }

    #[test]
    fn keeps_hyphens() {
        assert_eq!(vehicle_slug("F-16C Block 50"), "f-16c_block_50");
    }

    #[test]
    fn strips_disallowed_characters() {
        assert_eq!(vehicle_slug("Bf 109 G-2/trop"), "bf_109_g-2trop");
        assert_eq!(vehicle_slug("A.C.IV"), "aciv");
    }

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(vehicle_slug("  Spitfire   Mk IX  "), "spitfire_mk_ix");
    }

    #[test]
    fn idempotent() {
        let once = vehicle_slug("F-16C Block 50");
        assert_eq!(vehicle_slug(&once), once);
    }

    #[test]
    fn empty_input() {
        assert_eq!(vehicle_slug(""), "");
    }
}
