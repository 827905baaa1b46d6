//! Natural-sort comparator.
//!
//! A name is split into maximal runs of decimal digits and maximal runs of
//! everything else. Digit runs compare by numeric magnitude (leading zeros
//! stripped, length before bytes, so arbitrarily long digit runs never
//! overflow), text runs compare lexicographically by code point after
//! lower-casing. This yields `file2 < file10 < file10b`.

use std::cmp::Ordering;

/// One token of a sort key.
#[derive(Debug, Clone)]
pub enum Token {
    /// Maximal run of ASCII decimal digits, kept as the raw digit string.
    Number(String),
    /// Maximal run of non-digit characters, lower-cased.
    Text(String),
}

impl Token {
    fn as_str(&self) -> &str {
        match self {
            Self::Number(s) | Self::Text(s) => s,
        }
    }
}

/// Compare two digit runs by numeric magnitude without parsing.
fn cmp_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

impl Ord for Token {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => cmp_digit_runs(a, b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            // Mismatched token types at the same position cannot arise from
            // two tokenized keys with equal prefixes, but a total order is
            // required regardless: fall back to the raw text.
            _ => self.as_str().cmp(other.as_str()),
        }
    }
}

impl PartialOrd for Token {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Eq must agree with Ord: "007" and "7" are the same numeric token.
impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Token {}

/// Sort key for natural ordering of names.
///
/// Keys compare token-by-token; a key that is a strict prefix of another
/// sorts first. Ties between distinct names are resolved by the stable sort
/// that consumes these keys, preserving insertion order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SortKey(Vec<Token>);

impl SortKey {
    /// The tokens of this key, mostly useful for diagnostics.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.0
    }
}

/// Compute the natural-sort key for a name.
#[must_use]
pub fn sort_key(name: &str) -> SortKey {
    let mut tokens = Vec::new();
    let mut run = String::new();
    let mut run_is_digits = false;

    for ch in name.chars() {
        let is_digit = ch.is_ascii_digit();
        if !run.is_empty() && is_digit != run_is_digits {
            tokens.push(finish_run(run, run_is_digits));
            run = String::new();
        }
        run_is_digits = is_digit;
        if is_digit {
            run.push(ch);
        } else {
            run.extend(ch.to_lowercase());
        }
    }
    if !run.is_empty() {
        tokens.push(finish_run(run, run_is_digits));
    }

    SortKey(tokens)
}

fn finish_run(run: String, is_digits: bool) -> Token {
    if is_digits {
        Token::Number(run)
    } else {
        Token::Text(run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lt(a: &str, b: &str) {
        assert!(sort_key(a) < sort_key(b), "{a:?} should sort before {b:?}");
    }

    #[test]
    fn test_numeric_runs_compare_by_value() {
        lt("file2", "file10");
        lt("file10", "file10b");
        lt("2.txt", "10.txt");
        lt("10.txt", "a.txt");
    }

    #[test]
    fn test_prefix_sorts_first() {
        lt("file", "file2");
        lt("a", "ab");
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(sort_key("FILE2"), sort_key("file2"));
        lt("Apple", "banana");
    }

    #[test]
    fn test_leading_zeros_equal_in_value() {
        assert_eq!(sort_key("file007"), sort_key("file7"));
        lt("file007", "file8");
    }

    #[test]
    fn test_long_digit_runs_do_not_overflow() {
        let small = format!("v{}", "9".repeat(40));
        let large = format!("v1{}", "0".repeat(40));
        lt(&small, &large);
    }

    #[test]
    fn test_full_ordering_example() {
        let mut names = vec!["b.txt", "a.txt", "10.txt", "2.txt"];
        names.sort_by_cached_key(|n| sort_key(n));
        assert_eq!(names, vec!["2.txt", "10.txt", "a.txt", "b.txt"]);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Comparison is antisymmetric.
            #[test]
            fn antisymmetric(a in "[a-zA-Z0-9]{0,12}", b in "[a-zA-Z0-9]{0,12}") {
                let (ka, kb) = (sort_key(&a), sort_key(&b));
                prop_assert_eq!(ka.cmp(&kb), kb.cmp(&ka).reverse());
            }

            /// Comparison is transitive.
            #[test]
            fn transitive(
                a in "[a-zA-Z0-9]{0,12}",
                b in "[a-zA-Z0-9]{0,12}",
                c in "[a-zA-Z0-9]{0,12}",
            ) {
                let (ka, kb, kc) = (sort_key(&a), sort_key(&b), sort_key(&c));
                if ka <= kb && kb <= kc {
                    prop_assert!(ka <= kc, "{:?} <= {:?} <= {:?} broke", a, b, c);
                }
            }

            /// A key always equals itself.
            #[test]
            fn reflexive_equality(a in "[a-zA-Z0-9]{0,12}") {
                prop_assert_eq!(sort_key(&a), sort_key(&a));
            }

            /// Sorting arbitrary names never panics and is idempotent.
            #[test]
            fn sort_is_idempotent(
                names in proptest::collection::vec("[a-zA-Z0-9._ -]{0,10}", 0..20),
            ) {
                let mut once = names;
                once.sort_by_cached_key(|n| sort_key(n));
                let mut twice = once.clone();
                twice.sort_by_cached_key(|n| sort_key(n));
                prop_assert_eq!(once, twice);
            }
        }
    }
}
