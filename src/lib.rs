//! # scrimr-core
//!
//! Scrambled-text loading placeholders.
//!
//! This crate provides platform-agnostic logic for:
//! - Generating scrambled placeholder text from configurable character sets
//! - Scheduling placeholder length (fixed, content-sized or dynamic)
//! - Transitioning to the final text (instant, fade, typewriter, decode)
//! - Managing many elements of a document from `data-scrimr` attributes
//! - Driving a single placeholder declaratively from props
//!
//! Nothing here reads a clock. Hosts pass the current time in milliseconds
//! and call `tick`/`advance` at least as often as `next_due_ms` asks.
//!
//! ## Features
//!
//! - `toml` - Load option presets from TOML
//! - `web` - Browser [`Dom`] implementation and component rendering
//!
//! ## Example
//!
//! ```rust
//! use scrimr_core::{Dom, MemoryDom, Scrimr, ScrimrOptions, TransitionEffect};
//!
//! let mut dom = MemoryDom::new();
//! let status = dom.append_element(dom.root(), "span");
//! dom.set_attribute(status, "id", "status");
//! dom.set_text_content(status, "Profile loaded");
//!
//! let mut scrimr = Scrimr::new(dom);
//! let options = ScrimrOptions {
//!     transition_effect: Some(TransitionEffect::Typewriter),
//!     transition_duration: Some(280),
//!     ..Default::default()
//! };
//! scrimr.init_element("#status", Some(&options));
//!
//! // Call from your timer
//! scrimr.tick(50);
//! scrimr.complete("#status", None);
//! scrimr.tick(1_000);
//! assert_eq!(scrimr.dom().text_content(status), "Profile loaded");
//! ```

mod animation;
pub mod attributes;
mod charset;
mod component;
mod dom;
mod error;
mod hook;
mod length;
mod options;
mod registry;
pub mod render;
mod scanner;
pub mod scramble;
pub mod selector;
pub mod shimmer;
pub mod timer;
pub mod transition;

pub use animation::{Changes, Phase, ScrambleController};
pub use charset::{CharacterPool, CharacterSet, CharacterSets};
pub use component::{ScrimrComponent, ScrimrProps};
pub use dom::{Dom, ElementId, MemoryDom, Target};
pub use error::ConfigError;
pub use hook::LoadingToggle;
pub use length::{LengthMode, LengthScheduler};
pub use options::{FontFamily, ResolvedOptions, ScrimrOptions, Variant};
pub use registry::{ElementState, Registry};
pub use render::RenderOutput;
pub use scanner::{BatchOp, Scrimr};
pub use scramble::{generate_uniform, generate_words, text_length, Language, SpaceConfig};
pub use transition::{Transition, TransitionEffect, TransitionStep};

#[cfg(feature = "web")]
pub use render::web::{render_to_element, WebDom};
