//! Declarative component adapter.
//!
//! [`ScrimrComponent`] follows the usual mount/update/unmount lifecycle of a
//! view component. Props changes drive the scramble controller, and
//! [`render`](ScrimrComponent::render) describes what to show.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::render::{join_classes, RenderOutput};
use crate::shimmer::{shimmer_declarations, Keyframes};
use crate::transition::TransitionEffect;
use crate::{text_length, ConfigError, Phase, ResolvedOptions, ScrambleController, ScrimrOptions};

/// Component props.
#[derive(Clone, Debug, PartialEq)]
pub struct ScrimrProps {
    /// Defaults to `true`
    pub is_loading: bool,
    /// Final text; takes precedence over `children`
    pub text: Option<String>,
    /// Real content shown when not loading
    pub children: Option<String>,
    pub options: ScrimrOptions,
    /// Extra classes appended to the rendered class list
    pub class_name: Option<String>,
    /// Scramble slowly for users who prefer reduced motion
    pub reduced_motion: bool,
}

impl Default for ScrimrProps {
    fn default() -> Self {
        Self {
            is_loading: true,
            text: None,
            children: None,
            options: ScrimrOptions::default(),
            class_name: None,
            reduced_motion: false,
        }
    }
}

impl ScrimrProps {
    fn resolve(&self) -> Result<ResolvedOptions, ConfigError> {
        let options = self.options.resolve()?;
        Ok(if self.reduced_motion {
            options.with_reduced_motion()
        } else {
            options
        })
    }

    /// Text the component converges to once loading ends.
    pub fn final_text(&self) -> &str {
        self.text
            .as_deref()
            .filter(|text| !text.is_empty())
            .or(self.children.as_deref())
            .unwrap_or("")
    }
}

/// A scramble placeholder driven by props.
///
/// ```rust
/// use scrimr_core::{ScrimrComponent, ScrimrOptions, ScrimrProps, TransitionEffect};
///
/// let props = ScrimrProps {
///     text: Some("Ready".into()),
///     options: ScrimrOptions {
///         min_length: Some(8),
///         max_length: Some(8),
///         transition_effect: Some(TransitionEffect::Instant),
///         ..Default::default()
///     },
///     ..Default::default()
/// };
/// let mut component = ScrimrComponent::new(props.clone()).unwrap();
/// component.mount(0);
/// assert_eq!(component.render().text.chars().count(), 8);
/// assert!(component.render().aria_busy);
///
/// component.update(ScrimrProps { is_loading: false, ..props }, 120).unwrap();
/// assert_eq!(component.render().text, "Ready");
/// ```
pub struct ScrimrComponent {
    props: ScrimrProps,
    controller: ScrambleController,
    rng: StdRng,
    mounted: bool,
}

impl ScrimrComponent {
    pub fn new(props: ScrimrProps) -> Result<Self, ConfigError> {
        Self::with_rng(props, StdRng::from_os_rng())
    }

    pub fn with_rng(props: ScrimrProps, rng: StdRng) -> Result<Self, ConfigError> {
        let options = props.resolve()?;
        let mut controller = ScrambleController::new(options);
        controller.set_content_len(content_len(&props));
        Ok(Self {
            props,
            controller,
            rng,
            mounted: false,
        })
    }

    #[inline]
    pub fn props(&self) -> &ScrimrProps {
        &self.props
    }

    #[inline]
    pub fn options(&self) -> &ResolvedOptions {
        self.controller.options()
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.controller.phase()
    }

    #[inline]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Earliest time at which [`advance`](Self::advance) has work to do.
    pub fn next_due_ms(&self) -> Option<u64> {
        self.controller.next_due_ms()
    }

    /// Attach the component; starts scrambling when loading.
    pub fn mount(&mut self, now_ms: u64) {
        self.mounted = true;
        if self.props.is_loading {
            self.controller.start_loading(now_ms, &mut self.rng);
        }
    }

    /// Apply new props.
    ///
    /// Invalid options leave the component untouched.
    pub fn update(&mut self, props: ScrimrProps, now_ms: u64) -> Result<(), ConfigError> {
        let options = props.resolve()?;
        let old = std::mem::replace(&mut self.props, props);
        self.controller.set_content_len(content_len(&self.props));
        if !self.mounted {
            self.controller.set_options(options, now_ms, &mut self.rng);
            return Ok(());
        }

        let options_changed =
            old.options != self.props.options || old.reduced_motion != self.props.reduced_motion;
        if self.props.is_loading {
            if !old.is_loading || self.controller.phase() != Phase::Loading {
                self.controller = ScrambleController::new(options);
                self.controller.set_content_len(content_len(&self.props));
                self.controller.start_loading(now_ms, &mut self.rng);
            } else if options_changed {
                self.controller.set_options(options, now_ms, &mut self.rng);
            }
            return Ok(());
        }

        if options_changed {
            self.controller.set_options(options, now_ms, &mut self.rng);
        }
        let text_changed = old.final_text() != self.props.final_text();
        if old.is_loading || text_changed {
            self.finish(now_ms);
        }
        Ok(())
    }

    /// Detach the component and stop every timer.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.controller.cancel();
    }

    /// Run due timers. Returns `true` when the rendered text changed.
    pub fn advance(&mut self, now_ms: u64) -> bool {
        self.controller.advance(now_ms, false, &mut self.rng).text
    }

    /// Describe the element to display.
    pub fn render(&self) -> RenderOutput {
        let options = self.controller.options();
        let loading = self.props.is_loading && self.controller.is_loading();

        let text = match self.controller.phase() {
            Phase::Idle => self.props.children.clone().unwrap_or_default(),
            _ => self.controller.text().to_owned(),
        };

        let fading = self.controller.transition_effect() == Some(TransitionEffect::Fade);
        let class_name = join_classes([
            options.variant.utility_class(),
            if fading { "transition-opacity duration-300" } else { "" },
            if loading { "select-none" } else { "" },
            self.props.class_name.as_deref().unwrap_or(""),
            options.font_family.utility_class(),
        ]);

        let style = if loading {
            shimmer_declarations(options, Keyframes::Component)
        } else {
            Vec::new()
        };
        let keyframes = RenderOutput::keyframes_for(&style);

        RenderOutput {
            text,
            class_name,
            style,
            aria_label: loading.then(|| options.aria_label.clone()),
            aria_busy: loading,
            keyframes,
        }
    }

    fn finish(&mut self, now_ms: u64) {
        let final_text = self.props.final_text().to_owned();
        if final_text.is_empty() {
            self.controller.cancel();
        } else {
            self.controller.finish_loading(&final_text, now_ms);
        }
    }
}

fn content_len(props: &ScrimrProps) -> Option<usize> {
    let len = text_length(Some(props.final_text()), 0);
    (len > 0).then_some(len)
}
