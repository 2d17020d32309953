//! Per-subject scramble state machine.

use rand::Rng;

use crate::scramble::generate_words;
use crate::timer::{TimerKind, Timers};
use crate::transition::{Transition, TransitionEffect};
use crate::ResolvedOptions;

/// Lifecycle phase of an animation subject.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    /// Nothing has started yet, or the subject was cancelled
    #[default]
    Idle,
    /// Scrambling placeholder text
    Loading,
    /// Converging on the final text
    Transitioning,
    /// Final text shown, no timers running
    Settled,
}

/// What a call to the controller changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Changes {
    /// The displayed text changed
    pub text: bool,
    /// A fade transition swapped in the final text
    pub fade_revealed: bool,
    /// The subject reached [`Phase::Settled`]
    pub settled: bool,
}

impl Changes {
    fn merge(&mut self, other: Changes) {
        self.text |= other.text;
        self.fade_revealed |= other.fade_revealed;
        self.settled |= other.settled;
    }
}

/// Platform-agnostic scramble controller for a single subject.
///
/// Like a frame player, the controller does not read a clock. The host
/// passes the current time in milliseconds to every call and polls
/// [`advance`](Self::advance) at least as often as
/// [`next_due_ms`](Self::next_due_ms) requires. Each transition method first
/// clears every timer it does not keep, so two effects never race on one
/// subject.
///
/// ## Example
///
/// ```rust
/// use rand::SeedableRng;
/// use scrimr_core::{Phase, ScrambleController, ScrimrOptions, TransitionEffect};
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(7);
/// let options = ScrimrOptions {
///     min_length: Some(5),
///     max_length: Some(5),
///     transition_effect: Some(TransitionEffect::Instant),
///     ..Default::default()
/// }
/// .resolve()
/// .unwrap();
///
/// let mut controller = ScrambleController::new(options);
/// controller.start_loading(0, &mut rng);
/// assert_eq!(controller.phase(), Phase::Loading);
///
/// // Advance time (call this from your timer)
/// controller.advance(50, false, &mut rng);
/// assert_eq!(controller.text().chars().count(), 5);
///
/// controller.finish_loading("Done", 60);
/// assert_eq!(controller.text(), "Done");
/// assert_eq!(controller.phase(), Phase::Settled);
/// ```
#[derive(Clone, Debug)]
pub struct ScrambleController {
    options: ResolvedOptions,
    phase: Phase,
    /// Currently displayed text
    text: String,
    /// Target placeholder length
    display_length: usize,
    /// Length of the content being replaced, when known
    content_len: Option<usize>,
    timers: Timers,
    transition: Option<Transition>,
}

impl ScrambleController {
    /// Create an idle controller.
    pub fn new(options: ResolvedOptions) -> Self {
        let display_length = options.length.range().1;
        Self {
            options,
            phase: Phase::Idle,
            text: String::new(),
            display_length,
            content_len: None,
            timers: Timers::default(),
            transition: None,
        }
    }

    #[inline]
    pub fn options(&self) -> &ResolvedOptions {
        &self.options
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Check if placeholder text is currently being scrambled.
    #[inline]
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    #[inline]
    pub fn is_transitioning(&self) -> bool {
        self.phase == Phase::Transitioning
    }

    /// The displayed text.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Current target length of the placeholder.
    #[inline]
    pub fn display_length(&self) -> usize {
        self.display_length
    }

    /// Effect of the transition in flight, if any.
    pub fn transition_effect(&self) -> Option<TransitionEffect> {
        self.transition.as_ref().map(Transition::effect)
    }

    #[inline]
    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    /// Earliest time at which [`advance`](Self::advance) has work to do.
    #[inline]
    pub fn next_due_ms(&self) -> Option<u64> {
        self.timers.next_due_ms()
    }

    /// Move every pending deadline `offset_ms` later.
    pub fn shift_timers(&mut self, offset_ms: u64) {
        self.timers.shift(offset_ms);
    }

    /// Record the length of the content being replaced.
    pub fn set_content_len(&mut self, content_len: Option<usize>) {
        self.content_len = content_len;
    }

    /// Replace the options. A loading subject restarts with the new timers.
    pub fn set_options<R: Rng + ?Sized>(&mut self, options: ResolvedOptions, now_ms: u64, rng: &mut R) -> Changes {
        self.options = options;
        if self.phase == Phase::Loading {
            self.start_loading(now_ms, rng)
        } else {
            Changes::default()
        }
    }

    /// Enter [`Phase::Loading`] from any phase.
    pub fn start_loading<R: Rng + ?Sized>(&mut self, now_ms: u64, rng: &mut R) -> Changes {
        self.timers.clear_all();
        self.transition = None;

        self.display_length = self.options.length.initial_length(self.content_len, rng);
        self.text = self.generate(rng);

        self.timers.scramble.start(now_ms, self.options.scramble_interval_ms);
        if let Some(period) = self.options.length.resample_interval_ms() {
            self.timers.length.start(now_ms, period);
        }
        self.phase = Phase::Loading;
        log::trace!("scramble started, length {}", self.display_length);

        Changes {
            text: true,
            ..Default::default()
        }
    }

    /// Leave loading and start the configured transition towards `final_text`.
    pub fn finish_loading(&mut self, final_text: &str, now_ms: u64) -> Changes {
        self.timers.clear_all();

        let mut transition = Transition::new(
            self.options.transition_effect,
            final_text,
            self.options.transition_duration_ms,
        );
        let mut changes = Changes::default();
        let step = transition.start();
        if let Some(text) = step.text {
            changes.text = text != self.text;
            self.text = text;
        }

        if step.done {
            self.settle();
            changes.settled = true;
        } else {
            self.timers.transition.start(now_ms, transition.delay_ms());
            self.transition = Some(transition);
            self.phase = Phase::Transitioning;
        }
        changes
    }

    /// Run every timer due at `now_ms`.
    ///
    /// Scramble ticks are skipped, not cancelled, while `scramble_paused`.
    /// Missed scramble and length ticks run once, however long the gap.
    pub fn advance<R: Rng + ?Sized>(&mut self, now_ms: u64, scramble_paused: bool, rng: &mut R) -> Changes {
        let mut changes = Changes::default();
        while let Some(kind) = self.timers.pop_due(now_ms) {
            match kind {
                TimerKind::Length => {
                    if self.phase == Phase::Loading {
                        self.display_length = self.options.length.sample(rng);
                    }
                }
                TimerKind::Scramble => {
                    if self.phase == Phase::Loading && !scramble_paused {
                        self.text = self.generate(rng);
                        changes.text = true;
                    }
                }
                TimerKind::Transition => changes.merge(self.step_transition(rng)),
            }
        }
        changes
    }

    /// Stop every timer and return to [`Phase::Idle`].
    pub fn cancel(&mut self) {
        self.timers.clear_all();
        self.transition = None;
        self.phase = Phase::Idle;
    }

    fn step_transition<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Changes {
        let Some(transition) = self.transition.as_mut() else {
            self.timers.transition.clear();
            return Changes::default();
        };

        let mut changes = Changes::default();
        let step = transition.advance(&self.options.pool, rng);
        if let Some(text) = step.text {
            changes.fade_revealed = transition.effect() == TransitionEffect::Fade;
            changes.text = true;
            self.text = text;
        }
        if step.done {
            self.settle();
            changes.settled = true;
        } else if let Some(interval) = self.timers.transition.interval_mut() {
            if interval.period_ms() != transition.delay_ms() {
                interval.reschedule(transition.delay_ms());
            }
        }
        changes
    }

    fn settle(&mut self) {
        self.timers.clear_all();
        self.transition = None;
        self.phase = Phase::Settled;
    }

    fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        generate_words(self.display_length, &self.options.pool, &self.options.space, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LengthMode, ScrimrOptions};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn controller(opts: ScrimrOptions) -> ScrambleController {
        ScrambleController::new(opts.resolve().unwrap())
    }

    #[test]
    fn test_basic_loading() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut ctrl = controller(ScrimrOptions::default());
        assert_eq!(ctrl.phase(), Phase::Idle);

        let changes = ctrl.start_loading(0, &mut rng);
        assert!(changes.text);
        assert_eq!(ctrl.phase(), Phase::Loading);
        assert_eq!(ctrl.text().chars().count(), 30);
        assert_eq!(ctrl.timers().running(), 1);
        assert_eq!(ctrl.next_due_ms(), Some(50));

        let before = ctrl.text().to_owned();
        assert!(!ctrl.advance(49, false, &mut rng).text);
        assert_eq!(ctrl.text(), before);
        assert!(ctrl.advance(50, false, &mut rng).text);
        assert_eq!(ctrl.text().chars().count(), 30);
    }

    #[test]
    fn test_paused_scramble_skips_ticks() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut ctrl = controller(ScrimrOptions::default());
        ctrl.start_loading(0, &mut rng);
        let before = ctrl.text().to_owned();

        assert!(!ctrl.advance(500, true, &mut rng).text);
        assert_eq!(ctrl.text(), before);
        // The interval keeps running.
        assert_eq!(ctrl.next_due_ms(), Some(550));
        assert!(ctrl.advance(550, false, &mut rng).text);
    }

    #[test]
    fn test_long_gap_regenerates_once() {
        let mut rng = StdRng::seed_from_u64(14);
        let mut ctrl = controller(ScrimrOptions {
            length_mode: Some(LengthMode::Dynamic),
            ..Default::default()
        });
        ctrl.start_loading(0, &mut rng);
        let now = u64::MAX / 2;
        assert!(ctrl.advance(now, false, &mut rng).text);
        assert!(ctrl.next_due_ms().is_some_and(|due| due > now));
        assert_eq!(ctrl.advance(now, false, &mut rng), Changes::default());
    }

    #[test]
    fn test_zero_scramble_interval_does_not_loop() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut ctrl = controller(ScrimrOptions {
            scramble_interval: Some(0),
            ..Default::default()
        });
        ctrl.start_loading(0, &mut rng);
        assert_eq!(ctrl.timers().running(), 0);
        assert_eq!(ctrl.advance(10_000, false, &mut rng), Changes::default());
    }

    #[test]
    fn test_dynamic_length_resamples() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut ctrl = controller(ScrimrOptions {
            min_length: Some(3),
            max_length: Some(12),
            length_mode: Some(LengthMode::Dynamic),
            length_change_interval: Some(100),
            ..Default::default()
        });
        ctrl.start_loading(0, &mut rng);
        assert_eq!(ctrl.timers().running(), 2);
        for now in (50..2000).step_by(50) {
            ctrl.advance(now, false, &mut rng);
            assert!((3..=12).contains(&ctrl.display_length()));
            assert_eq!(ctrl.text().chars().count(), ctrl.display_length());
        }
    }

    #[test]
    fn test_content_length_mode() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut ctrl = controller(ScrimrOptions {
            length_mode: Some(LengthMode::Content),
            ..Default::default()
        });
        ctrl.set_content_len(Some(7));
        ctrl.start_loading(0, &mut rng);
        assert_eq!(ctrl.text().chars().count(), 7);
    }

    #[test]
    fn test_instant_transition() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut ctrl = controller(ScrimrOptions {
            transition_effect: Some(TransitionEffect::Instant),
            ..Default::default()
        });
        ctrl.start_loading(0, &mut rng);
        let changes = ctrl.finish_loading("Done", 10);
        assert!(changes.text && changes.settled);
        assert_eq!(ctrl.text(), "Done");
        assert_eq!(ctrl.phase(), Phase::Settled);
        assert_eq!(ctrl.timers().running(), 0);
    }

    #[test]
    fn test_decode_transition_settles() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut ctrl = controller(ScrimrOptions {
            transition_duration: Some(200),
            ..Default::default()
        });
        ctrl.start_loading(0, &mut rng);
        ctrl.finish_loading("Hello world", 100);
        assert_eq!(ctrl.phase(), Phase::Transitioning);
        assert_eq!(ctrl.timers().running(), 1);
        assert!(ctrl.timers().transition.is_running());

        // 4 decode steps then the final one, 50 ms apart.
        ctrl.advance(300, false, &mut rng);
        assert_eq!(ctrl.phase(), Phase::Transitioning);
        assert_eq!(ctrl.text().chars().count(), 11);
        let changes = ctrl.advance(350, false, &mut rng);
        assert!(changes.settled);
        assert_eq!(ctrl.text(), "Hello world");
        assert_eq!(ctrl.next_due_ms(), None);
    }

    #[test]
    fn test_fade_transition() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut ctrl = controller(ScrimrOptions {
            transition_effect: Some(TransitionEffect::Fade),
            ..Default::default()
        });
        ctrl.start_loading(0, &mut rng);
        let changes = ctrl.finish_loading("Done", 0);
        assert!(!changes.text);
        assert_eq!(ctrl.transition_effect(), Some(TransitionEffect::Fade));

        let reveal = ctrl.advance(100, false, &mut rng);
        assert!(reveal.fade_revealed && reveal.text && !reveal.settled);
        assert_eq!(ctrl.text(), "Done");
        assert_eq!(ctrl.next_due_ms(), Some(400));

        assert!(ctrl.advance(400, false, &mut rng).settled);
        assert_eq!(ctrl.phase(), Phase::Settled);
    }

    #[test]
    fn test_typewriter_over_big_jump() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut ctrl = controller(ScrimrOptions {
            transition_effect: Some(TransitionEffect::Typewriter),
            transition_duration: Some(400),
            ..Default::default()
        });
        ctrl.start_loading(0, &mut rng);
        ctrl.finish_loading("abcd", 0);
        ctrl.advance(100, false, &mut rng);
        assert_eq!(ctrl.text(), "");
        ctrl.advance(300, false, &mut rng);
        assert_eq!(ctrl.text(), "ab");
        assert!(ctrl.advance(10_000, false, &mut rng).settled);
        assert_eq!(ctrl.text(), "abcd");
    }

    #[test]
    fn test_restart_from_settled() {
        let mut rng = StdRng::seed_from_u64(10);
        let mut ctrl = controller(ScrimrOptions {
            transition_effect: Some(TransitionEffect::Instant),
            ..Default::default()
        });
        ctrl.start_loading(0, &mut rng);
        ctrl.finish_loading("Done", 10);
        ctrl.start_loading(20, &mut rng);
        assert_eq!(ctrl.phase(), Phase::Loading);
        assert_eq!(ctrl.timers().running(), 1);
        assert_eq!(ctrl.next_due_ms(), Some(70));
    }

    #[test]
    fn test_restart_mid_transition_drops_transition_timer() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut ctrl = controller(ScrimrOptions::default());
        ctrl.start_loading(0, &mut rng);
        ctrl.finish_loading("Done", 0);
        assert!(ctrl.timers().transition.is_running());

        ctrl.start_loading(10, &mut rng);
        assert!(!ctrl.timers().transition.is_running());
        assert_eq!(ctrl.transition_effect(), None);
    }

    #[test]
    fn test_set_options_restarts_loading() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut ctrl = controller(ScrimrOptions::default());
        ctrl.start_loading(0, &mut rng);
        let new_opts = ScrimrOptions {
            max_length: Some(12),
            scramble_interval: Some(200),
            ..Default::default()
        }
        .resolve()
        .unwrap();
        assert!(ctrl.set_options(new_opts, 40, &mut rng).text);
        assert_eq!(ctrl.text().chars().count(), 12);
        assert_eq!(ctrl.next_due_ms(), Some(240));
    }

    #[test]
    fn test_cancel_clears_everything() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut ctrl = controller(ScrimrOptions {
            length_mode: Some(LengthMode::Dynamic),
            ..Default::default()
        });
        ctrl.start_loading(0, &mut rng);
        ctrl.cancel();
        assert_eq!(ctrl.phase(), Phase::Idle);
        assert_eq!(ctrl.timers().running(), 0);
        assert_eq!(ctrl.advance(1_000, false, &mut rng), Changes::default());
    }
}
