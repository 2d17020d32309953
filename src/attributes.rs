//! `data-scrimr-*` attribute parsing.
//!
//! An element opts in with `data-scrimr`. Its value may hold a JSON options
//! object; individual `data-scrimr-*` attributes override it. Bad values are
//! reported as warnings and otherwise ignored. A bad field inside the JSON
//! object only drops that field.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{CharacterSets, ConfigError, ScrimrOptions};

/// Marker attribute enabling an element.
pub const MARKER: &str = "data-scrimr";

pub const MIN_LENGTH: &str = "data-scrimr-min-length";
pub const MAX_LENGTH: &str = "data-scrimr-max-length";
pub const RANDOM_SPACES: &str = "data-scrimr-random-spaces";
pub const LANGUAGE: &str = "data-scrimr-language";
pub const LENGTH_MODE: &str = "data-scrimr-length-mode";
pub const LENGTH_CHANGE_INTERVAL: &str = "data-scrimr-length-change-interval";
pub const CHARACTER_SET: &str = "data-scrimr-character-set";
pub const SCRAMBLE_INTERVAL: &str = "data-scrimr-scramble-interval";
pub const TRANSITION_EFFECT: &str = "data-scrimr-transition-effect";
pub const TRANSITION_DURATION: &str = "data-scrimr-transition-duration";
pub const FONT_FAMILY: &str = "data-scrimr-font-family";
pub const ENABLE_SHIMMER: &str = "data-scrimr-enable-shimmer";
pub const SHIMMER_SPEED: &str = "data-scrimr-shimmer-speed";
pub const SHIMMER_SIZE: &str = "data-scrimr-shimmer-size";
pub const SHIMMER_COLORS: &str = "data-scrimr-shimmer-colors";
pub const VARIANT: &str = "data-scrimr-variant";
pub const ARIA_LABEL: &str = "data-scrimr-aria-label";

/// Selector matching every element that carries the marker.
pub const MARKER_SELECTOR: &str = "[data-scrimr]";

/// Result of reading an element's attributes.
#[derive(Debug, Default)]
pub struct ParsedAttributes {
    pub options: ScrimrOptions,
    /// Values that could not be parsed and were skipped
    pub warnings: Vec<ConfigError>,
}

/// An element is enabled unless its marker is absent or `"false"`.
pub fn is_enabled(marker: Option<&str>) -> bool {
    marker.is_some_and(|value| value.trim() != "false")
}

/// Build options from attribute values.
///
/// `attribute` looks up an attribute by name on the element being read.
/// Empty values count as unset.
///
/// ```rust
/// use scrimr_core::attributes::parse_attributes;
///
/// let parsed = parse_attributes(|name| match name {
///     "data-scrimr" => Some(r#"{"maxLength": 12}"#.to_string()),
///     "data-scrimr-min-length" => Some("4".to_string()),
///     _ => None,
/// });
/// assert_eq!(parsed.options.min_length, Some(4));
/// assert_eq!(parsed.options.max_length, Some(12));
/// assert!(parsed.warnings.is_empty());
/// ```
pub fn parse_attributes<F>(attribute: F) -> ParsedAttributes
where
    F: Fn(&str) -> Option<String>,
{
    let mut parsed = ParsedAttributes::default();
    let get = |name: &str| attribute(name).filter(|value| !value.trim().is_empty());

    if let Some(blob) = get(MARKER) {
        let blob = blob.trim();
        if blob != "true" && blob != "false" {
            match serde_json::from_str::<Value>(blob) {
                Ok(Value::Object(fields)) => parsed.options = parse_blob(fields, &mut parsed.warnings),
                Ok(_) => parsed.warnings.push(ConfigError::InvalidAttribute {
                    attribute: MARKER,
                    value: blob.to_owned(),
                }),
                Err(source) => parsed.warnings.push(ConfigError::InvalidJson {
                    attribute: MARKER,
                    source,
                }),
            }
        }
    }

    let mut overrides = ScrimrOptions::default();
    let mut warn = |error: ConfigError| parsed.warnings.push(error);

    overrides.min_length = get(MIN_LENGTH).and_then(|v| parse_number(MIN_LENGTH, &v, &mut warn));
    overrides.max_length = get(MAX_LENGTH).and_then(|v| parse_number(MAX_LENGTH, &v, &mut warn));
    overrides.random_spaces = get(RANDOM_SPACES).map(|v| v.trim() == "true");
    overrides.language = get(LANGUAGE).and_then(|v| parse_keyword(LANGUAGE, &v, &mut warn));
    overrides.length_mode = get(LENGTH_MODE).and_then(|v| parse_keyword(LENGTH_MODE, &v, &mut warn));
    overrides.length_change_interval =
        get(LENGTH_CHANGE_INTERVAL).and_then(|v| parse_number(LENGTH_CHANGE_INTERVAL, &v, &mut warn));
    overrides.character_set = get(CHARACTER_SET).and_then(|v| parse_character_sets(&v, &mut warn));
    overrides.scramble_interval =
        get(SCRAMBLE_INTERVAL).and_then(|v| parse_number(SCRAMBLE_INTERVAL, &v, &mut warn));
    overrides.transition_effect =
        get(TRANSITION_EFFECT).and_then(|v| parse_keyword(TRANSITION_EFFECT, &v, &mut warn));
    overrides.transition_duration =
        get(TRANSITION_DURATION).and_then(|v| parse_number(TRANSITION_DURATION, &v, &mut warn));
    overrides.font_family = get(FONT_FAMILY).and_then(|v| parse_keyword(FONT_FAMILY, &v, &mut warn));
    overrides.enable_shimmer = get(ENABLE_SHIMMER).map(|v| v.trim() == "true");
    overrides.shimmer_speed = get(SHIMMER_SPEED).and_then(|v| parse_number(SHIMMER_SPEED, &v, &mut warn));
    overrides.shimmer_size = get(SHIMMER_SIZE).and_then(|v| parse_number(SHIMMER_SIZE, &v, &mut warn));
    overrides.shimmer_colors = get(SHIMMER_COLORS).map(|v| parse_colors(&v));
    overrides.variant = get(VARIANT).and_then(|v| parse_keyword(VARIANT, &v, &mut warn));
    overrides.aria_label = get(ARIA_LABEL);

    parsed.options.merge(&overrides);
    parsed
}

/// Read a JSON options object one field at a time.
fn parse_blob(fields: Map<String, Value>, warnings: &mut Vec<ConfigError>) -> ScrimrOptions {
    let mut options = ScrimrOptions::default();
    for (key, value) in fields {
        let shown = format!("{key}: {value}");
        let single = Value::Object(Map::from_iter([(key, value)]));
        match serde_json::from_value::<ScrimrOptions>(single) {
            Ok(field) => options.merge(&field),
            Err(_) => warnings.push(ConfigError::InvalidAttribute {
                attribute: MARKER,
                value: shown,
            }),
        }
    }
    options
}

fn parse_number<T: std::str::FromStr>(
    attribute: &'static str,
    raw: &str,
    warn: &mut impl FnMut(ConfigError),
) -> Option<T> {
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn(ConfigError::InvalidAttribute {
                attribute,
                value: raw.to_owned(),
            });
            None
        }
    }
}

/// Lower-case keyword such as `dynamic` or `typewriter`.
fn parse_keyword<T: DeserializeOwned>(
    attribute: &'static str,
    raw: &str,
    warn: &mut impl FnMut(ConfigError),
) -> Option<T> {
    match serde_json::from_value(Value::String(raw.trim().to_owned())) {
        Ok(value) => Some(value),
        Err(_) => {
            warn(ConfigError::InvalidAttribute {
                attribute,
                value: raw.to_owned(),
            });
            None
        }
    }
}

/// A JSON array of set names, or a single bare name.
fn parse_character_sets(raw: &str, warn: &mut impl FnMut(ConfigError)) -> Option<CharacterSets> {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        return match serde_json::from_str(trimmed) {
            Ok(sets) => Some(sets),
            Err(source) => {
                warn(ConfigError::InvalidJson {
                    attribute: CHARACTER_SET,
                    source,
                });
                None
            }
        };
    }
    parse_keyword(CHARACTER_SET, trimmed, warn)
}

/// A JSON array of colors, or the raw value as a single color.
fn parse_colors(raw: &str) -> Vec<String> {
    serde_json::from_str::<Vec<String>>(raw.trim()).unwrap_or_else(|_| vec![raw.trim().to_owned()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CharacterSet, FontFamily, LengthMode, TransitionEffect, Variant};
    use std::collections::HashMap;

    fn parse(pairs: &[(&str, &str)]) -> ParsedAttributes {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        parse_attributes(|name| map.get(name).cloned())
    }

    #[test]
    fn test_marker_values() {
        assert!(is_enabled(Some("")));
        assert!(is_enabled(Some("true")));
        assert!(is_enabled(Some("{\"maxLength\": 3}")));
        assert!(!is_enabled(Some("false")));
        assert!(!is_enabled(None));
    }

    #[test]
    fn test_bare_marker_has_no_options() {
        let parsed = parse(&[(MARKER, "")]);
        assert_eq!(parsed.options, ScrimrOptions::default());
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_individual_attributes() {
        let parsed = parse(&[
            (MARKER, ""),
            (MIN_LENGTH, "3"),
            (MAX_LENGTH, " 9 "),
            (RANDOM_SPACES, "true"),
            (LENGTH_MODE, "dynamic"),
            (CHARACTER_SET, "numbers"),
            (TRANSITION_EFFECT, "fade"),
            (FONT_FAMILY, "serif"),
            (ENABLE_SHIMMER, "false"),
            (SHIMMER_SPEED, "1.5"),
            (SHIMMER_COLORS, "[\"red\", \"blue\"]"),
            (VARIANT, "block"),
            (ARIA_LABEL, "Fetching"),
        ]);
        assert!(parsed.warnings.is_empty());
        let o = parsed.options;
        assert_eq!(o.min_length, Some(3));
        assert_eq!(o.max_length, Some(9));
        assert_eq!(o.random_spaces, Some(true));
        assert_eq!(o.length_mode, Some(LengthMode::Dynamic));
        assert_eq!(o.character_set, Some(CharacterSets::One(CharacterSet::Numbers)));
        assert_eq!(o.transition_effect, Some(TransitionEffect::Fade));
        assert_eq!(o.font_family, Some(FontFamily::Serif));
        assert_eq!(o.enable_shimmer, Some(false));
        assert_eq!(o.shimmer_speed, Some(1.5));
        assert_eq!(o.shimmer_colors, Some(vec!["red".to_string(), "blue".to_string()]));
        assert_eq!(o.variant, Some(Variant::Block));
        assert_eq!(o.aria_label.as_deref(), Some("Fetching"));
    }

    #[test]
    fn test_attributes_override_json() {
        let parsed = parse(&[(MARKER, r#"{"minLength": 2, "maxLength": 20}"#), (MAX_LENGTH, "8")]);
        assert_eq!(parsed.options.min_length, Some(2));
        assert_eq!(parsed.options.max_length, Some(8));
    }

    #[test]
    fn test_bad_json_still_applies_attributes() {
        let parsed = parse(&[(MARKER, "{oops"), (MAX_LENGTH, "8")]);
        assert_eq!(parsed.warnings.len(), 1);
        assert!(matches!(parsed.warnings[0], ConfigError::InvalidJson { attribute: MARKER, .. }));
        assert_eq!(parsed.options.max_length, Some(8));
    }

    #[test]
    fn test_bad_values_are_skipped() {
        let parsed = parse(&[(MARKER, ""), (MIN_LENGTH, "abc"), (TRANSITION_EFFECT, "explode"), (MAX_LENGTH, "")]);
        assert_eq!(parsed.warnings.len(), 2);
        assert_eq!(parsed.options.min_length, None);
        assert_eq!(parsed.options.transition_effect, None);
        assert_eq!(parsed.options.max_length, None);
    }

    #[test]
    fn test_bad_json_field_keeps_the_rest() {
        let parsed = parse(&[(
            MARKER,
            r#"{"maxLength": 8, "transitionEffect": "instant", "shimmerSize": -5, "variant": "sideways"}"#,
        )]);
        assert_eq!(parsed.options.max_length, Some(8));
        assert_eq!(parsed.options.transition_effect, Some(TransitionEffect::Instant));
        assert_eq!(parsed.options.shimmer_size, None);
        assert_eq!(parsed.options.variant, None);
        assert_eq!(parsed.warnings.len(), 2);
        assert!(parsed
            .warnings
            .iter()
            .all(|w| matches!(w, ConfigError::InvalidAttribute { attribute: MARKER, .. })));
    }

    #[test]
    fn test_json_that_is_not_an_object() {
        let parsed = parse(&[(MARKER, "[1, 2]"), (MIN_LENGTH, "4")]);
        assert_eq!(parsed.warnings.len(), 1);
        assert!(matches!(parsed.warnings[0], ConfigError::InvalidAttribute { attribute: MARKER, .. }));
        assert_eq!(parsed.options.min_length, Some(4));
    }

    #[test]
    fn test_character_set_array() {
        let parsed = parse(&[(MARKER, ""), (CHARACTER_SET, "[\"letters\", \"symbols\"]")]);
        assert_eq!(
            parsed.options.character_set,
            Some(CharacterSets::Many(vec![CharacterSet::Letters, CharacterSet::Symbols]))
        );
    }

    #[test]
    fn test_single_bare_color() {
        let parsed = parse(&[(MARKER, ""), (SHIMMER_COLORS, "#ff0000")]);
        assert_eq!(parsed.options.shimmer_colors, Some(vec!["#ff0000".to_string()]));
    }
}
