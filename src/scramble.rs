//! Scrambled placeholder text generation.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::CharacterPool;

/// Chance that a word ends early after each appended character.
const EARLY_WORD_END: f64 = 0.3;

/// Language preset for word-shaped placeholder text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Zh,
    Ja,
    #[default]
    Auto,
}

impl Language {
    /// Default `(space_frequency, word_length_range)` for this language.
    pub fn preset(self) -> (f64, (usize, usize)) {
        match self {
            Language::En => (0.18, (3, 8)),
            Language::Zh => (0.05, (1, 4)),
            Language::Ja => (0.08, (2, 6)),
            Language::Auto => (0.15, (3, 7)),
        }
    }
}

/// Controls how words and spaces are synthesized.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpaceConfig {
    /// Whether word/space synthesis is used at all
    pub enabled: bool,
    /// Probability in `[0, 1]` of inserting a space between words
    space_frequency: f64,
    /// Inclusive `(min, max)` word length; `min <= max` always holds
    word_length_range: (usize, usize),
    /// Preset the frequency and range came from
    pub language: Language,
}

impl SpaceConfig {
    /// An enabled config using the preset for `language`.
    pub fn for_language(language: Language) -> Self {
        let (space_frequency, word_length_range) = language.preset();
        Self {
            enabled: true,
            space_frequency,
            word_length_range,
            language,
        }
    }

    /// A config with no space synthesis.
    pub fn disabled() -> Self {
        Self::for_language(Language::Auto).with_enabled(false)
    }

    /// Turn synthesis on or off, keeping the preset.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Override the space frequency, clamped to `[0, 1]`.
    pub fn with_space_frequency(mut self, frequency: f64) -> Self {
        self.space_frequency = if frequency.is_nan() { 0.0 } else { frequency.clamp(0.0, 1.0) };
        self
    }

    /// Override the word length range. The bounds are reordered if needed.
    pub fn with_word_length_range(mut self, min: usize, max: usize) -> Self {
        self.word_length_range = (min.min(max), min.max(max));
        self
    }

    /// Probability of inserting a space between words.
    #[inline]
    pub fn space_frequency(&self) -> f64 {
        self.space_frequency
    }

    /// Inclusive `(min, max)` word length.
    #[inline]
    pub fn word_length_range(&self) -> (usize, usize) {
        self.word_length_range
    }
}

impl Default for SpaceConfig {
    fn default() -> Self {
        Self::for_language(Language::Auto)
    }
}

/// Generate `length` characters drawn independently from `pool`.
pub fn generate_uniform<R: Rng + ?Sized>(length: usize, pool: &CharacterPool, rng: &mut R) -> String {
    (0..length).map(|_| pool.sample(rng)).collect()
}

/// Generate `length` characters shaped like words separated by single spaces.
///
/// Falls back to [`generate_uniform`] when `config.enabled` is false. The
/// result never starts or ends with a space and never contains two spaces
/// in a row.
///
/// ```rust
/// use rand::SeedableRng;
/// use scrimr_core::{generate_words, CharacterPool, Language, SpaceConfig};
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(1);
/// let text = generate_words(24, &CharacterPool::default(), &SpaceConfig::for_language(Language::En), &mut rng);
/// assert_eq!(text.chars().count(), 24);
/// assert!(!text.starts_with(' ') && !text.ends_with(' '));
/// ```
pub fn generate_words<R: Rng + ?Sized>(length: usize, pool: &CharacterPool, config: &SpaceConfig, rng: &mut R) -> String {
    if !config.enabled {
        return generate_uniform(length, pool, rng);
    }

    let (min_word, max_word) = config.word_length_range;
    let mut raw: Vec<char> = Vec::with_capacity(length);
    let mut word_start = true;

    while raw.len() < length {
        let remaining = length - raw.len();
        if word_start {
            let word_len = rng.random_range(min_word..=max_word).min(remaining);
            raw.extend((0..word_len).map(|_| pool.sample(rng)));
            word_start = false;
        } else if remaining > 1 && rng.random_bool(config.space_frequency) {
            raw.push(' ');
            word_start = true;
        } else {
            raw.push(pool.sample(rng));
            if rng.random_bool(EARLY_WORD_END) {
                word_start = true;
            }
        }
    }

    // Collapse runs of spaces and trim both ends.
    let mut text: Vec<char> = Vec::with_capacity(length);
    for ch in raw {
        if ch == ' ' && (text.is_empty() || text.last() == Some(&' ')) {
            continue;
        }
        text.push(ch);
    }
    text.truncate(length);
    while text.last() == Some(&' ') {
        text.pop();
    }
    while text.len() < length {
        text.push(pool.sample(rng));
    }

    text.into_iter().collect()
}

/// Replace `ch` with a pool sample; literal spaces pass through unchanged.
#[inline]
pub fn scramble_char<R: Rng + ?Sized>(ch: char, pool: &CharacterPool, rng: &mut R) -> char {
    if ch == ' ' {
        ' '
    } else {
        pool.sample(rng)
    }
}

/// Character count of `text`, or `default` when it is missing or empty.
pub fn text_length(text: Option<&str>, default: usize) -> usize {
    match text {
        Some(text) if !text.is_empty() => text.chars().count(),
        _ => default,
    }
}
