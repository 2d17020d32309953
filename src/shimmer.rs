//! Shimmer gradient, font classes and the stylesheets they rely on.

use crate::{FontFamily, ResolvedOptions, Variant};

/// Class toggled on scanner-managed elements while the shimmer runs.
pub const SHIMMER_ACTIVE_CLASS: &str = "scrimr-shimmer-active";
/// Id of the `<style>` element holding [`SHIMMER_STYLESHEET`].
pub const SHIMMER_STYLESHEET_ID: &str = "scrimr-shimmer-styles";
/// Id of the `<style>` element holding [`FONT_STYLESHEET`].
pub const FONT_STYLESHEET_ID: &str = "scrimr-font-styles";

/// Keyframes and clip rules injected once by the scanner.
pub const SHIMMER_STYLESHEET: &str = "\
@keyframes scrimr-shimmer {
  0% { background-position: -100% 50%; }
  100% { background-position: 100% 50%; }
}
.scrimr-shimmer-active {
  background-clip: text;
  -webkit-background-clip: text;
  -webkit-text-fill-color: transparent;
}
";

/// Font family classes injected once by the scanner.
pub const FONT_STYLESHEET: &str = "\
.scrimr-font-mono { font-family: ui-monospace, SFMono-Regular, \"SF Mono\", Consolas, \"Liberation Mono\", Menlo, monospace; }
.scrimr-font-sans { font-family: ui-sans-serif, system-ui, -apple-system, BlinkMacSystemFont, \"Segoe UI\", Roboto, sans-serif; }
.scrimr-font-serif { font-family: ui-serif, Georgia, Cambria, \"Times New Roman\", Times, serif; }
.scrimr-font-system { font-family: system-ui; }
";

/// Keyframes rendered alongside the declarative component.
pub const COMPONENT_KEYFRAMES: &str = "\
@keyframes shimmer {
  0% { background-position: 200% 50%; }
  100% { background-position: -200% 50%; }
}
";

/// Inline style properties the scanner sets or may leave behind.
pub const SHIMMER_STYLE_PROPERTIES: [&str; 6] = [
    "background-image",
    "background-size",
    "animation",
    "background-clip",
    "-webkit-background-clip",
    "-webkit-text-fill-color",
];

/// Which keyframes a shimmer animation refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Keyframes {
    /// `scrimr-shimmer`, injected by the scanner
    Scanner,
    /// `shimmer`, rendered by the component
    Component,
}

impl Keyframes {
    fn name(self) -> &'static str {
        match self {
            Keyframes::Scanner => "scrimr-shimmer",
            Keyframes::Component => "shimmer",
        }
    }
}

/// A looping horizontal gradient; the first color is repeated at the end.
///
/// Returns `None` for an empty color list.
///
/// ```rust
/// use scrimr_core::shimmer::shimmer_gradient;
///
/// let colors = vec!["red".to_string(), "blue".to_string()];
/// assert_eq!(shimmer_gradient(&colors).unwrap(), "linear-gradient(90deg, red, blue, red)");
/// ```
pub fn shimmer_gradient(colors: &[String]) -> Option<String> {
    let first = colors.first()?;
    let stops: Vec<&str> = colors.iter().chain(std::iter::once(first)).map(String::as_str).collect();
    Some(format!("linear-gradient(90deg, {})", stops.join(", ")))
}

/// Inline style declarations for the shimmer sweep.
///
/// Empty when shimmer is disabled. The component variant also carries the
/// text-clip properties the scanner gets from [`SHIMMER_ACTIVE_CLASS`].
pub fn shimmer_declarations(options: &ResolvedOptions, keyframes: Keyframes) -> Vec<(&'static str, String)> {
    if !options.enable_shimmer {
        return Vec::new();
    }
    let mut declarations = Vec::with_capacity(6);
    if let Some(gradient) = shimmer_gradient(&options.shimmer_colors) {
        declarations.push(("background-image", gradient));
    }
    declarations.push(("background-size", format!("{}% 100%", options.shimmer_size_pct)));
    if keyframes == Keyframes::Component {
        declarations.push(("background-clip", "text".to_owned()));
        declarations.push(("-webkit-background-clip", "text".to_owned()));
        declarations.push(("-webkit-text-fill-color", "transparent".to_owned()));
    }
    declarations.push((
        "animation",
        format!("{} {}s linear infinite", keyframes.name(), options.shimmer_speed_s),
    ));
    declarations
}

impl FontFamily {
    /// Class defined by [`FONT_STYLESHEET`].
    pub fn scanner_class(self) -> &'static str {
        match self {
            FontFamily::Mono => "scrimr-font-mono",
            FontFamily::Sans => "scrimr-font-sans",
            FontFamily::Serif => "scrimr-font-serif",
            FontFamily::System => "scrimr-font-system",
        }
    }

    /// Utility class used by the component; empty for the system font.
    pub fn utility_class(self) -> &'static str {
        match self {
            FontFamily::Mono => "font-mono",
            FontFamily::Sans => "font-sans",
            FontFamily::Serif => "font-serif",
            FontFamily::System => "",
        }
    }

    pub const ALL: [FontFamily; 4] = [FontFamily::Mono, FontFamily::Sans, FontFamily::Serif, FontFamily::System];
}

impl Variant {
    /// Utility class used by the component.
    pub fn utility_class(self) -> &'static str {
        match self {
            Variant::Text => "",
            Variant::Inline => "inline-block",
            Variant::Block => "block w-full",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScrimrOptions;

    #[test]
    fn test_gradient_loops() {
        let colors: Vec<String> = ["#9333ea", "#ec4899", "#3b82f6"].iter().map(|c| c.to_string()).collect();
        assert_eq!(
            shimmer_gradient(&colors).unwrap(),
            "linear-gradient(90deg, #9333ea, #ec4899, #3b82f6, #9333ea)"
        );
        assert_eq!(shimmer_gradient(&["red".to_string()]).unwrap(), "linear-gradient(90deg, red, red)");
        assert_eq!(shimmer_gradient(&[]), None);
    }

    #[test]
    fn test_scanner_declarations() {
        let options = ResolvedOptions::default();
        let decls = shimmer_declarations(&options, Keyframes::Scanner);
        assert_eq!(decls.len(), 3);
        assert_eq!(decls[1], ("background-size", "200% 100%".to_string()));
        assert_eq!(decls[2], ("animation", "scrimr-shimmer 3s linear infinite".to_string()));
    }

    #[test]
    fn test_component_declarations() {
        let options = ScrimrOptions {
            shimmer_speed: Some(1.5),
            ..Default::default()
        }
        .resolve()
        .unwrap();
        let decls = shimmer_declarations(&options, Keyframes::Component);
        assert_eq!(decls.len(), 6);
        assert!(decls.contains(&("-webkit-text-fill-color", "transparent".to_string())));
        assert_eq!(decls.last().unwrap().1, "shimmer 1.5s linear infinite");
    }

    #[test]
    fn test_disabled_shimmer_has_no_declarations() {
        let options = ScrimrOptions {
            enable_shimmer: Some(false),
            ..Default::default()
        }
        .resolve()
        .unwrap();
        assert!(shimmer_declarations(&options, Keyframes::Scanner).is_empty());
    }

    #[test]
    fn test_font_classes() {
        assert_eq!(FontFamily::Mono.scanner_class(), "scrimr-font-mono");
        assert_eq!(FontFamily::System.utility_class(), "");
        assert!(FONT_STYLESHEET.contains(FontFamily::Serif.scanner_class()));
    }
}
