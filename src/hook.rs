//! Loading flag helper for hosts driving a [`ScrimrComponent`](crate::ScrimrComponent).

use std::fmt;

/// A loading flag with an optional automatic stop.
///
/// ```rust
/// use scrimr_core::LoadingToggle;
///
/// let mut toggle = LoadingToggle::new(true, Some(1_000), 0);
/// assert!(toggle.is_loading());
/// assert!(!toggle.tick(999));
/// assert!(toggle.tick(1_000));
/// assert!(!toggle.is_loading());
/// ```
pub struct LoadingToggle {
    is_loading: bool,
    loading_duration_ms: Option<u64>,
    deadline_ms: Option<u64>,
    on_complete: Option<Box<dyn FnMut()>>,
}

impl fmt::Debug for LoadingToggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadingToggle")
            .field("is_loading", &self.is_loading)
            .field("loading_duration_ms", &self.loading_duration_ms)
            .field("deadline_ms", &self.deadline_ms)
            .finish_non_exhaustive()
    }
}

impl LoadingToggle {
    /// Create a toggle. A zero duration never stops automatically.
    pub fn new(default_loading: bool, loading_duration_ms: Option<u64>, now_ms: u64) -> Self {
        let mut toggle = Self {
            is_loading: false,
            loading_duration_ms: loading_duration_ms.filter(|&ms| ms > 0),
            deadline_ms: None,
            on_complete: None,
        };
        toggle.set_loading(default_loading, now_ms);
        toggle
    }

    /// Called whenever loading stops through [`stop_loading`](Self::stop_loading)
    /// or the automatic stop.
    pub fn with_on_complete(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    #[inline]
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// When the automatic stop will fire, if armed.
    #[inline]
    pub fn deadline_ms(&self) -> Option<u64> {
        self.deadline_ms
    }

    pub fn start_loading(&mut self, now_ms: u64) {
        self.set_loading(true, now_ms);
    }

    pub fn stop_loading(&mut self) {
        self.set_loading(false, 0);
        self.notify();
    }

    /// Set the flag without notifying.
    pub fn set_loading(&mut self, loading: bool, now_ms: u64) {
        self.is_loading = loading;
        self.deadline_ms = match (loading, self.loading_duration_ms) {
            (true, Some(duration)) => Some(now_ms.saturating_add(duration)),
            _ => None,
        };
    }

    /// Fire the automatic stop when due. Returns `true` when it fired.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        match self.deadline_ms {
            Some(deadline) if self.is_loading && now_ms >= deadline => {
                self.set_loading(false, now_ms);
                self.notify();
                true
            }
            _ => false,
        }
    }

    fn notify(&mut self) {
        if let Some(callback) = self.on_complete.as_mut() {
            callback();
        }
    }
}
