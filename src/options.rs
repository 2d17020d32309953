//! Option bags shared by the component and the DOM scanner.
//!
//! [`ScrimrOptions`] is what callers and markup supply: every field is
//! optional. [`ScrimrOptions::resolve`] fills in defaults and validates the
//! result into a [`ResolvedOptions`].

use serde::{Deserialize, Deserializer};

use crate::length::{LengthMode, LengthScheduler};
use crate::scramble::{Language, SpaceConfig};
use crate::transition::TransitionEffect;
use crate::{CharacterPool, CharacterSets, ConfigError};

pub const DEFAULT_MIN_LENGTH: usize = 10;
pub const DEFAULT_MAX_LENGTH: usize = 30;
pub const DEFAULT_LENGTH_CHANGE_INTERVAL_MS: u64 = 150;
pub const DEFAULT_SCRAMBLE_INTERVAL_MS: u64 = 50;
/// Slowest scramble cadence used when the user asks for reduced motion
pub const REDUCED_MOTION_SCRAMBLE_INTERVAL_MS: u64 = 400;
pub const DEFAULT_TRANSITION_DURATION_MS: u64 = 1000;
pub const DEFAULT_SHIMMER_COLORS: [&str; 3] = ["#9333ea", "#ec4899", "#3b82f6"];
pub const DEFAULT_SHIMMER_SPEED_S: f64 = 3.0;
pub const DEFAULT_SHIMMER_SIZE_PCT: u32 = 200;
pub const DEFAULT_ARIA_LABEL: &str = "Loading...";

/// Layout of the animated element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Text,
    #[default]
    Inline,
    Block,
}

/// Font family applied while scrambling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    #[default]
    Mono,
    Sans,
    Serif,
    System,
}

/// Partial configuration. Unset fields fall back to defaults on resolve.
///
/// Field names follow the camelCase spelling used by the JSON blob in
/// `data-scrimr`.
///
/// ```rust
/// use scrimr_core::ScrimrOptions;
///
/// let opts: ScrimrOptions = serde_json::from_str(r#"{"minLength": 4, "maxLength": 6}"#).unwrap();
/// let resolved = opts.resolve().unwrap();
/// assert_eq!(resolved.length.range(), (4, 6));
/// assert_eq!(resolved.scramble_interval_ms, 50);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScrimrOptions {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub random_spaces: Option<bool>,
    pub language: Option<Language>,
    pub length_mode: Option<LengthMode>,
    pub length_change_interval: Option<u64>,
    pub character_set: Option<CharacterSets>,
    pub scramble_interval: Option<u64>,
    pub transition_effect: Option<TransitionEffect>,
    pub transition_duration: Option<u64>,
    pub enable_shimmer: Option<bool>,
    #[serde(deserialize_with = "one_or_many")]
    pub shimmer_colors: Option<Vec<String>>,
    pub shimmer_speed: Option<f64>,
    pub shimmer_size: Option<u32>,
    pub variant: Option<Variant>,
    pub font_family: Option<FontFamily>,
    pub aria_label: Option<String>,
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(Option::<OneOrMany>::deserialize(deserializer)?.map(|colors| match colors {
        OneOrMany::One(color) => vec![color],
        OneOrMany::Many(colors) => colors,
    }))
}

impl ScrimrOptions {
    /// Parse an options preset file.
    #[cfg(feature = "toml")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Overlay every field that is set in `other`.
    pub fn merge(&mut self, other: &ScrimrOptions) {
        let other = other.clone();
        self.min_length = other.min_length.or(self.min_length);
        self.max_length = other.max_length.or(self.max_length);
        self.random_spaces = other.random_spaces.or(self.random_spaces);
        self.language = other.language.or(self.language);
        self.length_mode = other.length_mode.or(self.length_mode);
        self.length_change_interval = other.length_change_interval.or(self.length_change_interval);
        self.character_set = other.character_set.or(self.character_set.take());
        self.scramble_interval = other.scramble_interval.or(self.scramble_interval);
        self.transition_effect = other.transition_effect.or(self.transition_effect);
        self.transition_duration = other.transition_duration.or(self.transition_duration);
        self.enable_shimmer = other.enable_shimmer.or(self.enable_shimmer);
        self.shimmer_colors = other.shimmer_colors.or(self.shimmer_colors.take());
        self.shimmer_speed = other.shimmer_speed.or(self.shimmer_speed);
        self.shimmer_size = other.shimmer_size.or(self.shimmer_size);
        self.variant = other.variant.or(self.variant);
        self.font_family = other.font_family.or(self.font_family);
        self.aria_label = other.aria_label.or(self.aria_label.take());
    }

    /// Copy of `self` with `other` overlaid.
    pub fn merged(&self, other: &ScrimrOptions) -> ScrimrOptions {
        let mut merged = self.clone();
        merged.merge(other);
        merged
    }

    /// Apply defaults and validate.
    pub fn resolve(&self) -> Result<ResolvedOptions, ConfigError> {
        let length = LengthScheduler::new(
            self.length_mode.unwrap_or_default(),
            self.min_length.unwrap_or(DEFAULT_MIN_LENGTH),
            self.max_length.unwrap_or(DEFAULT_MAX_LENGTH),
            self.length_change_interval.unwrap_or(DEFAULT_LENGTH_CHANGE_INTERVAL_MS),
        )?;
        Ok(self.resolve_with(length))
    }

    fn resolve_with(&self, length: LengthScheduler) -> ResolvedOptions {
        let space = SpaceConfig::for_language(self.language.unwrap_or_default())
            .with_enabled(self.random_spaces.unwrap_or(false));
        let character_set = self.character_set.clone().unwrap_or_default();
        let shimmer_speed = self
            .shimmer_speed
            .filter(|speed| speed.is_finite() && *speed >= 0.0)
            .unwrap_or(DEFAULT_SHIMMER_SPEED_S);

        ResolvedOptions {
            length,
            space,
            pool: CharacterPool::from(&character_set),
            character_set,
            scramble_interval_ms: self.scramble_interval.unwrap_or(DEFAULT_SCRAMBLE_INTERVAL_MS),
            transition_effect: self.transition_effect.unwrap_or_default(),
            transition_duration_ms: self.transition_duration.unwrap_or(DEFAULT_TRANSITION_DURATION_MS),
            enable_shimmer: self.enable_shimmer.unwrap_or(true),
            shimmer_colors: self
                .shimmer_colors
                .clone()
                .unwrap_or_else(|| DEFAULT_SHIMMER_COLORS.iter().map(|c| (*c).to_owned()).collect()),
            shimmer_speed_s: shimmer_speed,
            shimmer_size_pct: self.shimmer_size.unwrap_or(DEFAULT_SHIMMER_SIZE_PCT),
            variant: self.variant.unwrap_or_default(),
            font_family: self.font_family.unwrap_or_default(),
            aria_label: self.aria_label.clone().unwrap_or_else(|| DEFAULT_ARIA_LABEL.to_owned()),
        }
    }
}

/// Fully-defaulted, validated configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedOptions {
    /// Length mode, range and re-sample interval
    pub length: LengthScheduler,
    /// Word/space synthesis; `enabled` mirrors `randomSpaces`
    pub space: SpaceConfig,
    /// Tags the pool was built from
    pub character_set: CharacterSets,
    /// Sampling pool
    pub pool: CharacterPool,
    pub scramble_interval_ms: u64,
    pub transition_effect: TransitionEffect,
    pub transition_duration_ms: u64,
    pub enable_shimmer: bool,
    pub shimmer_colors: Vec<String>,
    /// Seconds per shimmer sweep
    pub shimmer_speed_s: f64,
    /// `background-size` width in percent
    pub shimmer_size_pct: u32,
    pub variant: Variant,
    pub font_family: FontFamily,
    pub aria_label: String,
}

impl ResolvedOptions {
    /// Slow scrambling down to at most one regeneration per
    /// [`REDUCED_MOTION_SCRAMBLE_INTERVAL_MS`].
    pub fn with_reduced_motion(mut self) -> Self {
        if self.scramble_interval_ms > 0 {
            self.scramble_interval_ms = self.scramble_interval_ms.max(REDUCED_MOTION_SCRAMBLE_INTERVAL_MS);
        }
        self
    }
}

impl Default for ResolvedOptions {
    fn default() -> Self {
        ScrimrOptions::default().resolve_with(LengthScheduler::default())
    }
}
