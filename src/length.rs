//! Placeholder length scheduling.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::options::{DEFAULT_LENGTH_CHANGE_INTERVAL_MS, DEFAULT_MAX_LENGTH, DEFAULT_MIN_LENGTH};
use crate::ConfigError;

/// How the placeholder length is chosen while loading.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthMode {
    /// Constant length of `max_length`
    #[default]
    Fixed,
    /// Constant length taken from the known content, `max_length` otherwise
    Content,
    /// Re-sampled from `[min_length, max_length]` on a timer
    Dynamic,
}

/// Decides the target placeholder length per tick.
///
/// ```rust
/// use rand::SeedableRng;
/// use scrimr_core::{LengthMode, LengthScheduler};
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(0);
/// let scheduler = LengthScheduler::new(LengthMode::Dynamic, 3, 3, 150).unwrap();
/// assert_eq!(scheduler.sample(&mut rng), 3);
/// assert!(LengthScheduler::new(LengthMode::Dynamic, 8, 2, 150).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LengthScheduler {
    mode: LengthMode,
    min_length: usize,
    max_length: usize,
    change_interval_ms: u64,
}

impl LengthScheduler {
    /// Create a scheduler. `min_length > max_length` is rejected.
    pub fn new(mode: LengthMode, min_length: usize, max_length: usize, change_interval_ms: u64) -> Result<Self, ConfigError> {
        if min_length > max_length {
            return Err(ConfigError::InvalidLengthRange {
                min: min_length,
                max: max_length,
            });
        }
        Ok(Self {
            mode,
            min_length,
            max_length,
            change_interval_ms,
        })
    }

    #[inline]
    pub fn mode(&self) -> LengthMode {
        self.mode
    }

    #[inline]
    pub fn range(&self) -> (usize, usize) {
        (self.min_length, self.max_length)
    }

    /// Length to use when loading starts.
    ///
    /// `content_len` is the length of the content being replaced, when known.
    pub fn initial_length<R: Rng + ?Sized>(&self, content_len: Option<usize>, rng: &mut R) -> usize {
        match self.mode {
            LengthMode::Fixed => self.max_length,
            LengthMode::Content => content_len.filter(|&len| len > 0).unwrap_or(self.max_length),
            LengthMode::Dynamic => self.sample(rng),
        }
    }

    /// Uniform sample from `[min_length, max_length]`.
    #[inline]
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        rng.random_range(self.min_length..=self.max_length)
    }

    /// Re-sample period in milliseconds, or `None` when length never changes.
    pub fn resample_interval_ms(&self) -> Option<u64> {
        match self.mode {
            LengthMode::Dynamic if self.change_interval_ms > 0 => Some(self.change_interval_ms),
            _ => None,
        }
    }
}

impl Default for LengthScheduler {
    fn default() -> Self {
        Self {
            mode: LengthMode::Fixed,
            min_length: DEFAULT_MIN_LENGTH,
            max_length: DEFAULT_MAX_LENGTH,
            change_interval_ms: DEFAULT_LENGTH_CHANGE_INTERVAL_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_fixed_uses_max_length() {
        let mut rng = StdRng::seed_from_u64(1);
        let scheduler = LengthScheduler::new(LengthMode::Fixed, 10, 30, 150).unwrap();
        assert_eq!(scheduler.initial_length(Some(4), &mut rng), 30);
        assert_eq!(scheduler.resample_interval_ms(), None);
    }

    #[test]
    fn test_content_prefers_content_length() {
        let mut rng = StdRng::seed_from_u64(1);
        let scheduler = LengthScheduler::new(LengthMode::Content, 10, 30, 150).unwrap();
        assert_eq!(scheduler.initial_length(Some(4), &mut rng), 4);
        assert_eq!(scheduler.initial_length(Some(0), &mut rng), 30);
        assert_eq!(scheduler.initial_length(None, &mut rng), 30);
    }

    #[test]
    fn test_dynamic_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(2);
        let scheduler = LengthScheduler::new(LengthMode::Dynamic, 5, 9, 150).unwrap();
        for _ in 0..500 {
            let len = scheduler.sample(&mut rng);
            assert!((5..=9).contains(&len));
        }
        assert_eq!(scheduler.resample_interval_ms(), Some(150));
    }

    #[test]
    fn test_dynamic_degenerate_range() {
        let mut rng = StdRng::seed_from_u64(3);
        let scheduler = LengthScheduler::new(LengthMode::Dynamic, 3, 3, 150).unwrap();
        for _ in 0..50 {
            assert_eq!(scheduler.sample(&mut rng), 3);
        }
    }

    #[test]
    fn test_dynamic_zero_interval_never_resamples() {
        let scheduler = LengthScheduler::new(LengthMode::Dynamic, 3, 8, 0).unwrap();
        assert_eq!(scheduler.resample_interval_ms(), None);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = LengthScheduler::new(LengthMode::Fixed, 9, 2, 150).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLengthRange { min: 9, max: 2 }));
    }
}
