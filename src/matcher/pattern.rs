//! Suffix pattern implementation.

use std::fmt;

/// Size of the URL-safe base64 alphabet used by user-friendly addresses.
const ALPHABET_SIZE: u64 = 64;

/// Returns true if `address` ends with `suffix`.
///
/// With `case_sensitive == false` both operands are lowercased in full before
/// the comparison. An empty suffix always matches.
pub fn matches(address: &str, suffix: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        address.ends_with(suffix)
    } else {
        address.to_lowercase().ends_with(&suffix.to_lowercase())
    }
}

/// A compiled suffix pattern for efficient matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixPattern {
    /// The suffix as given
    suffix: String,
    /// The suffix compared against addresses (lowercased if case insensitive)
    folded: String,
    /// Whether matching is case sensitive
    case_sensitive: bool,
}

impl SuffixPattern {
    /// Creates a new pattern.
    pub fn new(suffix: impl Into<String>, case_sensitive: bool) -> Self {
        let suffix = suffix.into();
        let folded = if case_sensitive {
            suffix.clone()
        } else {
            suffix.to_lowercase()
        };

        Self {
            suffix,
            folded,
            case_sensitive,
        }
    }

    /// Returns the suffix as given.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Matches an address against this pattern.
    #[inline]
    pub fn matches(&self, address: &str) -> bool {
        if self.case_sensitive {
            address.ends_with(&self.folded)
        } else {
            address.to_lowercase().ends_with(&self.folded)
        }
    }

    /// Returns the estimated difficulty (number of attempts to find a match).
    ///
    /// Each character has 64 possible values; a letter matched case
    /// insensitively accepts two of them.
    pub fn estimated_difficulty(&self) -> u64 {
        self.suffix.chars().fold(1u64, |acc, c| {
            let choices = if !self.case_sensitive && c.is_ascii_alphabetic() {
                ALPHABET_SIZE / 2
            } else {
                ALPHABET_SIZE
            };
            acc.saturating_mul(choices)
        })
    }

    /// Returns a human-readable difficulty estimate.
    ///
    /// Buckets assume a few hundred derivations per second per core; TON key
    /// derivation is PBKDF2-bound and far slower than raw hashing.
    pub fn difficulty_description(&self) -> String {
        let diff = self.estimated_difficulty();
        match diff {
            0..=1_000 => "Very Easy (seconds)".into(),
            1_001..=100_000 => "Easy (minutes)".into(),
            100_001..=10_000_000 => "Medium (hours)".into(),
            10_000_001..=1_000_000_000 => "Hard (days)".into(),
            _ => "Very Hard (months or more)".into(),
        }
    }
}

impl fmt::Display for SuffixPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = if self.case_sensitive {
            "case-sensitive"
        } else {
            "case-insensitive"
        };
        write!(f, "...{} ({})", self.suffix, mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UPPER: &str = "UQDx2cvZ3fWuP9kE5Hw_kIoO1mZtT4oJgVbL1c4v7c-XAB";
    const LOWER: &str = "UQDx2cvZ3fWuP9kE5Hw_kIoO1mZtT4oJgVbL1c4v7c-Xab";

    #[test]
    fn test_case_sensitive_match() {
        assert!(matches(UPPER, "AB", true));
        assert!(!matches(LOWER, "AB", true));
    }

    #[test]
    fn test_case_insensitive_match() {
        assert!(matches(UPPER, "ab", false));
        assert!(matches(LOWER, "AB", false));
        assert!(!matches(UPPER, "ac", false));
    }

    #[test]
    fn test_empty_suffix_always_matches() {
        assert!(matches(UPPER, "", true));
        assert!(matches(UPPER, "", false));
    }

    #[test]
    fn test_suffix_longer_than_address() {
        assert!(!matches("AB", "XAB", true));
        assert!(!matches("AB", "xab", false));
    }

    #[test]
    fn test_pattern_agrees_with_free_function() {
        let suffixes = ["AB", "ab", "-xAb", "_", "c-XAB", "Z"];
        for suffix in suffixes {
            for case_sensitive in [true, false] {
                let pattern = SuffixPattern::new(suffix, case_sensitive);
                for address in [UPPER, LOWER] {
                    assert_eq!(
                        pattern.matches(address),
                        matches(address, suffix, case_sensitive),
                        "suffix={suffix} case_sensitive={case_sensitive} address={address}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_matching_is_deterministic() {
        let pattern = SuffixPattern::new("xab", false);
        let first = pattern.matches(UPPER);
        assert!((0..100).all(|_| pattern.matches(UPPER) == first));
    }

    #[test]
    fn test_suffix_is_kept_as_given() {
        let pattern = SuffixPattern::new("TON", false);
        assert_eq!(pattern.suffix(), "TON");
        assert!(!pattern.is_case_sensitive());
        assert_eq!(pattern.to_string(), "...TON (case-insensitive)");
    }

    #[test]
    fn test_difficulty() {
        assert_eq!(SuffixPattern::new("AB", true).estimated_difficulty(), 4096); // 64^2
        assert_eq!(SuffixPattern::new("AB", false).estimated_difficulty(), 1024); // 32^2
        assert_eq!(SuffixPattern::new("A1", false).estimated_difficulty(), 2048);
        assert_eq!(
            SuffixPattern::new("A".repeat(20), true).estimated_difficulty(),
            u64::MAX
        );
    }
}
