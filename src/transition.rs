//! Transitions from scrambled text to the final text.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::scramble::scramble_char;
use crate::CharacterPool;

/// Fixed step length of the decode effect.
pub const DECODE_STEP_MS: u64 = 50;
/// Delay before the fade effect swaps in the final text.
pub const FADE_REVEAL_DELAY_MS: u64 = 100;
/// Length of the opacity transition that follows the fade reveal.
pub const FADE_DURATION_MS: u64 = 300;

/// How scrambled text converges to the final text once loading ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionEffect {
    /// Swap immediately
    Instant,
    /// Swap after a short delay under an opacity transition
    Fade,
    /// Reveal the final text one character at a time
    Typewriter,
    /// Reveal characters at random with rising probability
    #[default]
    Decode,
}

/// Output of one transition step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionStep {
    /// New text to display, if it changed
    pub text: Option<String>,
    /// The transition has finished
    pub done: bool,
}

impl TransitionStep {
    fn show(text: String, done: bool) -> Self {
        Self { text: Some(text), done }
    }

    fn idle(done: bool) -> Self {
        Self { text: None, done }
    }
}

/// The first `k` characters of `text`.
pub fn typewriter_frame(text: &str, k: usize) -> String {
    text.chars().take(k).collect()
}

/// `target` with each character revealed with probability `progress`.
///
/// Unrevealed characters are scrambled from `pool`; spaces always pass through.
pub fn decode_frame<R: Rng + ?Sized>(target: &str, progress: f64, pool: &CharacterPool, rng: &mut R) -> String {
    let progress = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
    target
        .chars()
        .map(|ch| {
            if rng.random_bool(progress) {
                ch
            } else {
                scramble_char(ch, pool, rng)
            }
        })
        .collect()
}

/// A one-shot, step-driven transition towards `target`.
///
/// Call [`start`](Self::start) once, then [`advance`](Self::advance) every
/// [`delay_ms`](Self::delay_ms) until a step reports `done`.
///
/// ```rust
/// use rand::SeedableRng;
/// use scrimr_core::{CharacterPool, Transition, TransitionEffect};
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(0);
/// let pool = CharacterPool::default();
/// let mut typing = Transition::new(TransitionEffect::Typewriter, "Hi", 100);
/// assert!(!typing.start().done);
/// assert_eq!(typing.delay_ms(), 50);
/// assert_eq!(typing.advance(&pool, &mut rng).text.as_deref(), Some(""));
/// assert_eq!(typing.advance(&pool, &mut rng).text.as_deref(), Some("H"));
/// let last = typing.advance(&pool, &mut rng);
/// assert_eq!(last.text.as_deref(), Some("Hi"));
/// assert!(last.done);
/// ```
#[derive(Clone, Debug)]
pub struct Transition {
    effect: TransitionEffect,
    target: String,
    target_len: usize,
    /// Index of the next step to run
    step: usize,
    /// Number of steps before the terminal one
    steps: usize,
    step_ms: u64,
    done: bool,
}

impl Transition {
    /// Prepare a transition; nothing is displayed until [`start`](Self::start).
    pub fn new(effect: TransitionEffect, target: &str, duration_ms: u64) -> Self {
        let target_len = target.chars().count();
        let (steps, step_ms) = match effect {
            TransitionEffect::Instant => (0, 1),
            TransitionEffect::Fade => (1, FADE_REVEAL_DELAY_MS),
            TransitionEffect::Typewriter => {
                let step_ms = if target_len == 0 { 1 } else { duration_ms / target_len as u64 };
                (target_len, step_ms.max(1))
            }
            TransitionEffect::Decode => (duration_ms.div_ceil(DECODE_STEP_MS) as usize, DECODE_STEP_MS),
        };
        Self {
            effect,
            target: target.to_owned(),
            target_len,
            step: 0,
            steps,
            step_ms,
            done: false,
        }
    }

    #[inline]
    pub fn effect(&self) -> TransitionEffect {
        self.effect
    }

    #[inline]
    pub fn target(&self) -> &str {
        &self.target
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Index of the next step.
    #[inline]
    pub fn step(&self) -> usize {
        self.step
    }

    /// Milliseconds until the next call to [`advance`](Self::advance).
    #[inline]
    pub fn delay_ms(&self) -> u64 {
        self.step_ms
    }

    /// Apply whatever happens synchronously when the transition begins.
    ///
    /// Instant swaps complete here, as do typewriter runs over empty text and
    /// zero-length decodes.
    pub fn start(&mut self) -> TransitionStep {
        let immediate = match self.effect {
            TransitionEffect::Instant => true,
            TransitionEffect::Typewriter => self.target_len == 0,
            TransitionEffect::Decode => self.steps == 0,
            TransitionEffect::Fade => false,
        };
        if immediate {
            self.done = true;
            TransitionStep::show(self.target.clone(), true)
        } else {
            TransitionStep::idle(false)
        }
    }

    /// Run the next step.
    pub fn advance<R: Rng + ?Sized>(&mut self, pool: &CharacterPool, rng: &mut R) -> TransitionStep {
        if self.done {
            return TransitionStep::idle(true);
        }
        let step = self.step;
        self.step += 1;

        match self.effect {
            TransitionEffect::Instant => {
                self.done = true;
                TransitionStep::show(self.target.clone(), true)
            }
            TransitionEffect::Fade => {
                if step == 0 {
                    self.step_ms = FADE_DURATION_MS;
                    TransitionStep::show(self.target.clone(), false)
                } else {
                    self.done = true;
                    TransitionStep::idle(true)
                }
            }
            TransitionEffect::Typewriter => {
                self.done = step >= self.steps;
                TransitionStep::show(typewriter_frame(&self.target, step), self.done)
            }
            TransitionEffect::Decode => {
                if step < self.steps {
                    let progress = step as f64 / self.steps as f64;
                    TransitionStep::show(decode_frame(&self.target, progress, pool, rng), false)
                } else {
                    self.done = true;
                    TransitionStep::show(self.target.clone(), true)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CharacterSet;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn run_to_end(transition: &mut Transition, rng: &mut StdRng) -> Vec<TransitionStep> {
        let pool = CharacterPool::default();
        let mut steps = vec![transition.start()];
        while !transition.is_done() {
            steps.push(transition.advance(&pool, rng));
            assert!(steps.len() < 10_000, "transition never finished");
        }
        steps
    }

    #[test]
    fn test_instant_completes_on_start() {
        let mut t = Transition::new(TransitionEffect::Instant, "Done", 1000);
        let step = t.start();
        assert_eq!(step.text.as_deref(), Some("Done"));
        assert!(step.done);
    }

    #[test]
    fn test_fade_reveals_then_settles() {
        let mut rng = StdRng::seed_from_u64(0);
        let pool = CharacterPool::default();
        let mut t = Transition::new(TransitionEffect::Fade, "Done", 1000);
        assert_eq!(t.start(), TransitionStep::idle(false));
        assert_eq!(t.delay_ms(), FADE_REVEAL_DELAY_MS);

        let reveal = t.advance(&pool, &mut rng);
        assert_eq!(reveal.text.as_deref(), Some("Done"));
        assert!(!reveal.done);
        assert_eq!(t.delay_ms(), FADE_DURATION_MS);

        assert_eq!(t.advance(&pool, &mut rng), TransitionStep::idle(true));
    }

    #[test]
    fn test_typewriter_prefixes() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut t = Transition::new(TransitionEffect::Typewriter, "Hello", 500);
        assert_eq!(t.delay_ms(), 100);
        let steps = run_to_end(&mut t, &mut rng);
        let texts: Vec<_> = steps.iter().skip(1).map(|s| s.text.clone().unwrap()).collect();
        assert_eq!(texts, vec!["", "H", "He", "Hel", "Hell", "Hello"]);
        assert!(steps.last().unwrap().done);
        assert!(steps[..steps.len() - 1].iter().all(|s| !s.done));
    }

    #[test]
    fn test_typewriter_empty_text_completes() {
        let mut t = Transition::new(TransitionEffect::Typewriter, "", 500);
        let step = t.start();
        assert!(step.done);
        assert_eq!(step.text.as_deref(), Some(""));
    }

    #[test]
    fn test_typewriter_zero_duration_is_clamped() {
        let t = Transition::new(TransitionEffect::Typewriter, "abc", 0);
        assert_eq!(t.delay_ms(), 1);
    }

    #[test]
    fn test_decode_step_count() {
        let t = Transition::new(TransitionEffect::Decode, "Done", 1000);
        assert_eq!(t.steps, 20);
        let t = Transition::new(TransitionEffect::Decode, "Done", 1010);
        assert_eq!(t.steps, 21);
    }

    #[test]
    fn test_decode_ends_on_exact_text() {
        let mut rng = StdRng::seed_from_u64(77);
        let target = "The quick brown fox";
        let mut t = Transition::new(TransitionEffect::Decode, target, 300);
        let steps = run_to_end(&mut t, &mut rng);
        // start + 6 decode steps + final
        assert_eq!(steps.len(), 8);
        for step in &steps[1..steps.len() - 1] {
            let text = step.text.as_deref().unwrap();
            assert_eq!(text.chars().count(), target.chars().count());
            for (a, b) in text.chars().zip(target.chars()) {
                assert_eq!(a == ' ', b == ' ');
            }
        }
        assert_eq!(steps.last().unwrap().text.as_deref(), Some(target));
    }

    #[test]
    fn test_decode_zero_duration_completes() {
        let mut t = Transition::new(TransitionEffect::Decode, "abc", 0);
        assert_eq!(t.start(), TransitionStep::show("abc".into(), true));
    }

    #[test]
    fn test_decode_frame_bounds() {
        let pool = CharacterPool::from_sets(&[CharacterSet::Numbers]);
        let mut rng = StdRng::seed_from_u64(4);
        assert_eq!(decode_frame("a b c", 1.0, &pool, &mut rng), "a b c");
        let scrambled = decode_frame("a b c", 0.0, &pool, &mut rng);
        let chars: Vec<char> = scrambled.chars().collect();
        assert_eq!(chars[1], ' ');
        assert_eq!(chars[3], ' ');
        assert!(chars[0].is_ascii_digit() && chars[2].is_ascii_digit() && chars[4].is_ascii_digit());
    }

    #[test]
    fn test_advance_after_done_is_noop() {
        let mut rng = StdRng::seed_from_u64(0);
        let pool = CharacterPool::default();
        let mut t = Transition::new(TransitionEffect::Instant, "x", 0);
        t.start();
        assert_eq!(t.advance(&pool, &mut rng), TransitionStep::idle(true));
    }

    #[test]
    fn test_typewriter_frame_multibyte() {
        assert_eq!(typewriter_frame("héllo", 2), "hé");
        assert_eq!(typewriter_frame("abc", 10), "abc");
    }
}
