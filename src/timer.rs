//! Virtual-clock timers owned by an animation subject.
//!
//! Nothing here reads a real clock. The host passes the current time in
//! milliseconds and each slot reports whether it is due. Starting a slot
//! always replaces whatever it held before, so a subject can never run two
//! intervals of the same kind.

/// A repeating deadline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Interval {
    period_ms: u64,
    next_due_ms: u64,
}

impl Interval {
    /// First fire is one period after `now_ms`. Returns `None` for a zero period.
    pub fn start(now_ms: u64, period_ms: u64) -> Option<Self> {
        (period_ms > 0).then(|| Self {
            period_ms,
            next_due_ms: now_ms.saturating_add(period_ms),
        })
    }

    #[inline]
    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    #[inline]
    pub fn next_due_ms(&self) -> u64 {
        self.next_due_ms
    }

    #[inline]
    pub fn is_due(&self, now_ms: u64) -> bool {
        self.next_due_ms <= now_ms
    }

    /// Consume one deadline and schedule the next one.
    #[inline]
    pub fn fire(&mut self) {
        self.next_due_ms = self.next_due_ms.saturating_add(self.period_ms);
    }

    /// Consume every deadline up to `now_ms` at once.
    ///
    /// The next deadline is the first one after `now_ms` on the original grid.
    pub fn fire_through(&mut self, now_ms: u64) {
        if self.next_due_ms > now_ms {
            return;
        }
        let missed = (now_ms - self.next_due_ms) / self.period_ms + 1;
        self.next_due_ms = self
            .next_due_ms
            .saturating_add(missed.saturating_mul(self.period_ms));
    }

    /// Move the deadline `offset_ms` later.
    #[inline]
    pub fn shift(&mut self, offset_ms: u64) {
        self.next_due_ms = self.next_due_ms.saturating_add(offset_ms);
    }

    /// Change the period; the next deadline becomes `period_ms` after the last one.
    pub fn reschedule(&mut self, period_ms: u64) {
        let period_ms = period_ms.max(1);
        self.next_due_ms = self.next_due_ms.saturating_sub(self.period_ms).saturating_add(period_ms);
        self.period_ms = period_ms;
    }
}

/// Holds at most one running [`Interval`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimerSlot(Option<Interval>);

impl TimerSlot {
    /// Clear the slot, then start a new interval in it.
    ///
    /// Returns `false` when `period_ms` is zero and nothing was started.
    pub fn start(&mut self, now_ms: u64, period_ms: u64) -> bool {
        self.0 = Interval::start(now_ms, period_ms);
        self.0.is_some()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.0 = None;
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.0.is_some()
    }

    #[inline]
    pub fn next_due_ms(&self) -> Option<u64> {
        self.0.map(|interval| interval.next_due_ms())
    }

    #[inline]
    pub fn interval_mut(&mut self) -> Option<&mut Interval> {
        self.0.as_mut()
    }
}

/// Which timer of a subject fired.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerKind {
    /// Length re-sample
    Length,
    /// Scramble regeneration
    Scramble,
    /// Transition step
    Transition,
}

/// The three timers every subject owns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Timers {
    pub length: TimerSlot,
    pub scramble: TimerSlot,
    pub transition: TimerSlot,
}

impl Timers {
    /// Clear every slot.
    pub fn clear_all(&mut self) {
        self.length.clear();
        self.scramble.clear();
        self.transition.clear();
    }

    /// Number of running slots.
    pub fn running(&self) -> usize {
        [self.length, self.scramble, self.transition]
            .iter()
            .filter(|slot| slot.is_running())
            .count()
    }

    /// Move every pending deadline `offset_ms` later.
    pub fn shift(&mut self, offset_ms: u64) {
        for slot in [&mut self.length, &mut self.scramble, &mut self.transition] {
            if let Some(interval) = slot.interval_mut() {
                interval.shift(offset_ms);
            }
        }
    }

    /// Earliest pending deadline across all slots.
    pub fn next_due_ms(&self) -> Option<u64> {
        [self.length, self.scramble, self.transition]
            .iter()
            .filter_map(TimerSlot::next_due_ms)
            .min()
    }

    /// Pop the earliest slot due at `now_ms`.
    ///
    /// Length and scramble ticks that were missed collapse into one, so a
    /// long gap between calls costs a single fire per slot. Transition steps
    /// are bounded and fire one period at a time. Ties go to length, then
    /// scramble, then transition.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<TimerKind> {
        let mut best: Option<(u64, TimerKind)> = None;
        for (kind, slot) in [
            (TimerKind::Length, &self.length),
            (TimerKind::Scramble, &self.scramble),
            (TimerKind::Transition, &self.transition),
        ] {
            if let Some(due) = slot.next_due_ms() {
                if due <= now_ms && best.map_or(true, |(best_due, _)| due < best_due) {
                    best = Some((due, kind));
                }
            }
        }
        let (_, kind) = best?;
        let slot = match kind {
            TimerKind::Length => &mut self.length,
            TimerKind::Scramble => &mut self.scramble,
            TimerKind::Transition => &mut self.transition,
        };
        if let Some(interval) = slot.interval_mut() {
            match kind {
                TimerKind::Transition => interval.fire(),
                TimerKind::Length | TimerKind::Scramble => interval.fire_through(now_ms),
            }
        }
        Some(kind)
    }
}
