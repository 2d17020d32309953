//! Attribute-driven scanner managing scramble animations on a document.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::animation::Changes;
use crate::attributes::{self, parse_attributes, MARKER_SELECTOR};
use crate::registry::{ElementState, Registry};
use crate::shimmer::{
    shimmer_declarations, Keyframes, FONT_STYLESHEET, FONT_STYLESHEET_ID, SHIMMER_ACTIVE_CLASS,
    SHIMMER_STYLESHEET, SHIMMER_STYLESHEET_ID, SHIMMER_STYLE_PROPERTIES,
};
use crate::transition::{TransitionEffect, FADE_DURATION_MS};
use crate::{Dom, ElementId, FontFamily, ResolvedOptions, ScrambleController, ScrimrOptions, Target};

/// Bulk operation applied by [`Scrimr::batch`].
#[derive(Clone, Copy, Debug)]
pub enum BatchOp<'a> {
    Init(Option<&'a ScrimrOptions>),
    Destroy,
    /// Complete with the given text, or each element's original content
    Complete(Option<&'a str>),
}

/// Imperative scramble manager over a [`Dom`].
///
/// Time is virtual: every timer-driven effect happens inside
/// [`tick`](Self::tick), and operations that start timers use the time of
/// the most recent tick. Timers started before the first tick count from
/// that tick, so the host may pass any epoch.
///
/// ## Example
///
/// ```rust
/// use scrimr_core::{Dom, MemoryDom, Scrimr};
///
/// let mut dom = MemoryDom::new();
/// let title = dom.append_element(dom.root(), "h1");
/// dom.set_attribute(title, "data-scrimr", r#"{"transitionEffect": "instant"}"#);
/// dom.set_text_content(title, "Welcome");
///
/// let mut scrimr = Scrimr::new(dom);
/// scrimr.init(None);
/// assert!(scrimr.is_active(title));
/// assert_eq!(scrimr.dom().attribute(title, "aria-busy").as_deref(), Some("true"));
///
/// scrimr.tick(50);
/// scrimr.complete(title, None);
/// assert_eq!(scrimr.dom().text_content(title), "Welcome");
/// ```
pub struct Scrimr<D: Dom> {
    dom: D,
    registry: Registry,
    rng: StdRng,
    now_ms: u64,
    clock_started: bool,
    initialized: bool,
    auto_init_pending: bool,
}

impl<D: Dom> Scrimr<D> {
    /// Create a scanner seeded from the operating system.
    pub fn new(dom: D) -> Self {
        Self::with_rng(dom, StdRng::from_os_rng())
    }

    /// Create a scanner with a fixed random source.
    pub fn with_rng(dom: D, rng: StdRng) -> Self {
        Self {
            dom,
            registry: Registry::default(),
            rng,
            now_ms: 0,
            clock_started: false,
            initialized: false,
            auto_init_pending: false,
        }
    }

    #[inline]
    pub fn dom(&self) -> &D {
        &self.dom
    }

    #[inline]
    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    pub fn into_dom(self) -> D {
        self.dom
    }

    /// Time of the most recent [`tick`](Self::tick).
    #[inline]
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Earliest time at which [`tick`](Self::tick) has work to do.
    pub fn next_due_ms(&self) -> Option<u64> {
        self.registry.next_due_ms()
    }

    /// Initialise every enabled element under `root`, or the whole document.
    ///
    /// Returns the newly managed elements.
    pub fn init(&mut self, root: Option<ElementId>) -> Vec<ElementId> {
        self.initialized = true;
        self.auto_init_pending = false;
        let started = self.scan_and_init(root);
        log::debug!("scrimr initialised {} element(s)", started.len());
        started
    }

    /// Initialise the document now, or on the first tick after it is ready.
    pub fn auto_init(&mut self) {
        if self.initialized {
            return;
        }
        if self.dom.is_ready() {
            self.init(None);
        } else {
            self.auto_init_pending = true;
        }
    }

    /// Initialise enabled, unmanaged elements under `root`.
    pub fn scan_and_init(&mut self, root: Option<ElementId>) -> Vec<ElementId> {
        let candidates = self.dom.query_selector_all(root, MARKER_SELECTOR);
        let mut started = Vec::new();
        for element in candidates {
            if self.registry.contains(element) {
                continue;
            }
            let marker = self.dom.attribute(element, attributes::MARKER);
            if attributes::is_enabled(marker.as_deref()) && self.init_element(element, None).is_some() {
                started.push(element);
            } else {
                self.dom.release(element);
            }
        }
        started
    }

    /// Start managing one element.
    ///
    /// Without explicit options they are read from the element's attributes.
    /// An element that is already managed keeps its state. Returns `None` when
    /// the target does not resolve or the options are invalid.
    pub fn init_element<'t>(
        &mut self,
        target: impl Into<Target<'t>>,
        options: Option<&ScrimrOptions>,
    ) -> Option<&ElementState> {
        let element = self.resolve(target.into())?;
        if self.registry.contains(element) {
            return self.registry.get(element);
        }

        let requested = match options {
            Some(options) => options.clone(),
            None => {
                let parsed = parse_attributes(|name| self.dom.attribute(element, name));
                for warning in &parsed.warnings {
                    log::warn!("scrimr: {warning}");
                }
                parsed.options
            }
        };
        let resolved = match requested.resolve() {
            Ok(resolved) => motion_adjusted(&self.dom, resolved),
            Err(err) => {
                log::warn!("scrimr: not initialising element: {err}");
                return None;
            }
        };

        let original_content = self.dom.text_content(element);
        let original_classes = self.dom.class_name(element);

        let mut controller = ScrambleController::new(resolved);
        let content_len = original_content.chars().count();
        controller.set_content_len((content_len > 0).then_some(content_len));

        apply_font(&mut self.dom, element, controller.options());
        apply_shimmer(&mut self.dom, element, controller.options());
        controller.start_loading(self.now_ms, &mut self.rng);
        self.dom.set_text_content(element, controller.text());

        self.dom.set_attribute(element, "aria-label", &controller.options().aria_label);
        self.dom.set_attribute(element, "aria-busy", "true");
        self.dom.set_attribute(element, "aria-live", "polite");

        log::trace!("scrimr: managing element {}", element.index());
        self.registry.insert(ElementState::new(
            element,
            original_content,
            original_classes,
            requested,
            controller,
        ));
        self.registry.get(element)
    }

    /// Stop managing an element and restore its text and classes.
    pub fn destroy<'t>(&mut self, target: impl Into<Target<'t>>) -> bool {
        let Some(element) = self.resolve(target.into()) else {
            return false;
        };
        let Some(mut state) = self.registry.remove(element) else {
            return false;
        };
        state.controller.cancel();

        self.dom.set_text_content(element, state.original_content());
        self.dom.set_class_name(element, state.original_classes());
        clear_shimmer(&mut self.dom, element);
        self.dom.set_style_property(element, "opacity", "");
        self.dom.set_style_property(element, "transition", "");
        for name in ["aria-label", "aria-busy", "aria-live"] {
            self.dom.remove_attribute(element, name);
        }
        self.dom.release(element);
        log::debug!("scrimr: released element {}", element.index());
        true
    }

    /// Stop every element and forget the document was initialised.
    pub fn destroy_all(&mut self) -> usize {
        let elements = self.registry.elements();
        let count = elements.iter().filter(|&&element| self.destroy(element)).count();
        self.initialized = false;
        self.auto_init_pending = false;
        count
    }

    /// End loading and transition to `final_text`, or the original content
    /// when it is `None` or empty.
    pub fn complete<'t>(&mut self, target: impl Into<Target<'t>>, final_text: Option<&str>) -> bool {
        let Some(element) = self.resolve(target.into()) else {
            return false;
        };
        let Some(state) = self.registry.get_mut(element) else {
            return false;
        };

        let text = match final_text {
            Some(text) if !text.is_empty() => text.to_owned(),
            _ => state.original_content().to_owned(),
        };
        state.is_active = false;
        self.dom.set_attribute(element, "aria-busy", "false");
        clear_shimmer(&mut self.dom, element);

        if state.options().transition_effect == TransitionEffect::Fade {
            self.dom.set_style_property(element, "opacity", "0");
        }
        log::debug!(
            "scrimr: completing element {} with {:?}",
            element.index(),
            state.options().transition_effect
        );
        let changes = state.controller.finish_loading(&text, self.now_ms);
        apply_changes(&mut self.dom, state, changes);
        true
    }

    /// Overlay `options` onto an element's options. A scrambling element
    /// restarts with the result.
    pub fn update<'t>(&mut self, target: impl Into<Target<'t>>, options: &ScrimrOptions) -> bool {
        let Some(element) = self.resolve(target.into()) else {
            return false;
        };
        let Some(state) = self.registry.get_mut(element) else {
            return false;
        };
        let requested = state.requested.merged(options);
        let resolved = match requested.resolve() {
            Ok(resolved) => motion_adjusted(&self.dom, resolved),
            Err(err) => {
                log::warn!("scrimr: ignoring update: {err}");
                return false;
            }
        };
        state.requested = requested;
        log::debug!("scrimr: updated options of element {}", element.index());

        if state.is_active {
            apply_font(&mut self.dom, element, &resolved);
            clear_shimmer(&mut self.dom, element);
            apply_shimmer(&mut self.dom, element, &resolved);
            self.dom.set_attribute(element, "aria-label", &resolved.aria_label);
        }
        let changes = state.controller.set_options(resolved, self.now_ms, &mut self.rng);
        apply_changes(&mut self.dom, state, changes);
        true
    }

    pub fn get_state<'t>(&self, target: impl Into<Target<'t>>) -> Option<&ElementState> {
        let element = self.resolve(target.into())?;
        self.registry.get(element)
    }

    /// Every managed element, in registration order.
    pub fn get_all_active(&self) -> Vec<&ElementState> {
        self.registry.iter().collect()
    }

    /// The target is managed.
    pub fn is_active<'t>(&self, target: impl Into<Target<'t>>) -> bool {
        self.resolve(target.into())
            .is_some_and(|element| self.registry.contains(element))
    }

    /// Apply `op` to every element matching `selector`.
    ///
    /// Returns how many elements the operation succeeded on.
    pub fn batch(&mut self, selector: &str, op: BatchOp<'_>) -> usize {
        let elements = self.dom.query_selector_all(None, selector);
        let mut count = 0;
        for element in elements {
            let ok = match op {
                BatchOp::Init(options) => self.init_element(element, options).is_some(),
                BatchOp::Destroy => self.destroy(element),
                BatchOp::Complete(text) => self.complete(element, text),
            };
            count += usize::from(ok);
            if !self.registry.contains(element) {
                self.dom.release(element);
            }
        }
        count
    }

    /// Advance virtual time to `now_ms` and run every due timer.
    ///
    /// Scrambling is skipped while the document is hidden. Returns how many
    /// elements changed their text.
    pub fn tick(&mut self, now_ms: u64) -> usize {
        if !self.clock_started {
            self.clock_started = true;
            let offset = now_ms.saturating_sub(self.now_ms);
            if offset > 0 {
                for element in self.registry.elements() {
                    if let Some(state) = self.registry.get_mut(element) {
                        state.controller.shift_timers(offset);
                    }
                }
            }
        }
        self.now_ms = self.now_ms.max(now_ms);
        if self.auto_init_pending && self.dom.is_ready() {
            self.init(None);
        }

        let hidden = self.dom.is_hidden();
        let mut changed = 0;
        for element in self.registry.elements() {
            let Some(state) = self.registry.get_mut(element) else {
                continue;
            };
            let changes = state.controller.advance(self.now_ms, hidden, &mut self.rng);
            changed += usize::from(changes.text);
            apply_changes(&mut self.dom, state, changes);
        }
        changed
    }

    fn resolve(&self, target: Target<'_>) -> Option<ElementId> {
        match target {
            Target::Element(element) => Some(element),
            Target::Selector(selector) => self.dom.query_selector(selector),
        }
    }
}

fn apply_changes<D: Dom>(dom: &mut D, state: &ElementState, changes: Changes) {
    let element = state.element();
    if changes.text {
        dom.set_text_content(element, state.text());
    }
    if changes.fade_revealed {
        dom.set_style_property(element, "transition", &format!("opacity {FADE_DURATION_MS}ms ease-in-out"));
        dom.set_style_property(element, "opacity", "1");
    }
    if changes.settled && state.options().transition_effect == TransitionEffect::Fade {
        dom.set_style_property(element, "transition", "");
        dom.set_style_property(element, "opacity", "");
    }
}

fn motion_adjusted<D: Dom>(dom: &D, resolved: ResolvedOptions) -> ResolvedOptions {
    if dom.prefers_reduced_motion() {
        resolved.with_reduced_motion()
    } else {
        resolved
    }
}

fn apply_font<D: Dom>(dom: &mut D, element: ElementId, options: &ResolvedOptions) {
    dom.ensure_stylesheet(FONT_STYLESHEET_ID, FONT_STYLESHEET);
    for family in FontFamily::ALL {
        dom.remove_class(element, family.scanner_class());
    }
    dom.add_class(element, options.font_family.scanner_class());
}

fn apply_shimmer<D: Dom>(dom: &mut D, element: ElementId, options: &ResolvedOptions) {
    let declarations = shimmer_declarations(options, Keyframes::Scanner);
    if declarations.is_empty() {
        return;
    }
    dom.ensure_stylesheet(SHIMMER_STYLESHEET_ID, SHIMMER_STYLESHEET);
    for (property, value) in &declarations {
        dom.set_style_property(element, property, value);
    }
    dom.add_class(element, SHIMMER_ACTIVE_CLASS);
}

fn clear_shimmer<D: Dom>(dom: &mut D, element: ElementId) {
    for property in SHIMMER_STYLE_PROPERTIES {
        dom.set_style_property(element, property, "");
    }
    dom.remove_class(element, SHIMMER_ACTIVE_CLASS);
}
