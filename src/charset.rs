//! Character sets and the sampling pool built from them.

use rand::Rng;
use serde::{Deserialize, Serialize};

const LETTERS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
const NUMBERS: &str = "0123456789";
const SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?/~`";

/// A named group of characters eligible for scrambling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharacterSet {
    /// `A-Z` and `a-z`
    Letters,
    /// `0-9`
    Numbers,
    /// Printable ASCII punctuation
    Symbols,
    /// Letters followed by numbers
    #[default]
    Alphanumeric,
    /// Letters, numbers and symbols
    All,
}

impl CharacterSet {
    /// The characters this tag contributes to a pool, in order.
    pub fn alphabet(self) -> &'static [&'static str] {
        match self {
            CharacterSet::Letters => &[LETTERS],
            CharacterSet::Numbers => &[NUMBERS],
            CharacterSet::Symbols => &[SYMBOLS],
            CharacterSet::Alphanumeric => &[LETTERS, NUMBERS],
            CharacterSet::All => &[LETTERS, NUMBERS, SYMBOLS],
        }
    }
}

/// One tag or an ordered list of tags, as accepted by `characterSet`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CharacterSets {
    One(CharacterSet),
    Many(Vec<CharacterSet>),
}

impl CharacterSets {
    /// The tags in request order.
    pub fn as_slice(&self) -> &[CharacterSet] {
        match self {
            CharacterSets::One(set) => std::slice::from_ref(set),
            CharacterSets::Many(sets) => sets,
        }
    }
}

impl Default for CharacterSets {
    fn default() -> Self {
        CharacterSets::One(CharacterSet::default())
    }
}

impl From<CharacterSet> for CharacterSets {
    fn from(set: CharacterSet) -> Self {
        CharacterSets::One(set)
    }
}

impl From<Vec<CharacterSet>> for CharacterSets {
    fn from(sets: Vec<CharacterSet>) -> Self {
        CharacterSets::Many(sets)
    }
}

/// Concrete alphabet resolved from one or more [`CharacterSet`] tags.
///
/// The pool is never empty: resolving no tags yields the letters set.
///
/// ```rust
/// use scrimr_core::{CharacterPool, CharacterSet};
///
/// let pool = CharacterPool::from_sets(&[CharacterSet::Numbers]);
/// assert_eq!(pool.as_str(), "0123456789");
///
/// let fallback = CharacterPool::from_sets(&[]);
/// assert_eq!(fallback.len(), 52);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharacterPool {
    alphabet: String,
    chars: Vec<char>,
}

impl CharacterPool {
    /// Concatenate the alphabets of `sets` in order.
    pub fn from_sets(sets: &[CharacterSet]) -> Self {
        let mut alphabet: String = sets
            .iter()
            .flat_map(|set| set.alphabet().iter().copied())
            .collect();
        if alphabet.is_empty() {
            alphabet.push_str(LETTERS);
        }
        let chars = alphabet.chars().collect();
        Self { alphabet, chars }
    }

    /// The resolved alphabet, duplicates included.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.alphabet
    }

    /// Number of entries in the pool.
    #[inline]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Check whether `ch` can be produced by [`sample`](Self::sample).
    pub fn contains(&self, ch: char) -> bool {
        self.chars.contains(&ch)
    }

    /// Draw one character uniformly from the pool.
    #[inline]
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> char {
        self.chars[rng.random_range(0..self.chars.len())]
    }
}

impl Default for CharacterPool {
    fn default() -> Self {
        Self::from_sets(&[CharacterSet::default()])
    }
}

impl From<&CharacterSets> for CharacterPool {
    fn from(sets: &CharacterSets) -> Self {
        Self::from_sets(sets.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_single_sets() {
        assert_eq!(CharacterPool::from_sets(&[CharacterSet::Letters]).as_str(), LETTERS);
        assert_eq!(CharacterPool::from_sets(&[CharacterSet::Numbers]).as_str(), NUMBERS);
        assert_eq!(CharacterPool::from_sets(&[CharacterSet::Symbols]).as_str(), SYMBOLS);
    }

    #[test]
    fn test_composite_sets() {
        let alnum = CharacterPool::from_sets(&[CharacterSet::Alphanumeric]);
        assert_eq!(alnum.as_str(), format!("{LETTERS}{NUMBERS}"));

        let all = CharacterPool::from_sets(&[CharacterSet::All]);
        assert_eq!(all.as_str(), format!("{LETTERS}{NUMBERS}{SYMBOLS}"));
    }

    #[test]
    fn test_concatenates_in_order() {
        let pool = CharacterPool::from_sets(&[CharacterSet::Numbers, CharacterSet::Symbols]);
        assert_eq!(pool.as_str(), format!("{NUMBERS}{SYMBOLS}"));
    }

    #[test]
    fn test_empty_falls_back_to_letters() {
        let pool = CharacterPool::from_sets(&[]);
        assert_eq!(pool.as_str(), LETTERS);
        assert!(!pool.is_empty());
    }

    #[test]
    fn test_never_empty_for_any_tag() {
        for set in [
            CharacterSet::Letters,
            CharacterSet::Numbers,
            CharacterSet::Symbols,
            CharacterSet::Alphanumeric,
            CharacterSet::All,
        ] {
            assert!(CharacterPool::from_sets(&[set]).len() > 0, "{set:?}");
        }
    }

    #[test]
    fn test_sample_stays_in_pool() {
        let pool = CharacterPool::from_sets(&[CharacterSet::Numbers]);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            assert!(pool.contains(pool.sample(&mut rng)));
        }
    }

    #[test]
    fn test_deserialize_one_or_many() {
        let one: CharacterSets = serde_json::from_str("\"numbers\"").unwrap();
        assert_eq!(one.as_slice(), &[CharacterSet::Numbers]);

        let many: CharacterSets = serde_json::from_str("[\"letters\", \"symbols\"]").unwrap();
        assert_eq!(many.as_slice(), &[CharacterSet::Letters, CharacterSet::Symbols]);
    }
}
