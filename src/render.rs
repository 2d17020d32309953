//! Render output of the declarative component.

use crate::shimmer::COMPONENT_KEYFRAMES;

/// Result of a render pass.
///
/// This is a platform-agnostic description of the element to show. Each
/// host maps it onto its own view layer.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderOutput {
    /// Text to display
    pub text: String,
    /// Space-separated class list
    pub class_name: String,
    /// Inline style declarations
    pub style: Vec<(&'static str, String)>,
    /// Accessible name while loading
    pub aria_label: Option<String>,
    /// Loading state; the element stays a polite live region either way
    pub aria_busy: bool,
    /// Keyframes the inline animation refers to, when one is set
    pub keyframes: Option<&'static str>,
}

impl RenderOutput {
    /// ARIA attributes to set on the element.
    ///
    /// `aria-live` and `aria-busy` are always present so the final text is
    /// announced when loading ends. The label only applies while busy.
    ///
    /// ```rust
    /// use scrimr_core::RenderOutput;
    ///
    /// let output = RenderOutput {
    ///     text: "x7Qp".into(),
    ///     class_name: String::new(),
    ///     style: Vec::new(),
    ///     aria_label: Some("Loading...".into()),
    ///     aria_busy: true,
    ///     keyframes: None,
    /// };
    /// assert_eq!(
    ///     output.aria_attributes(),
    ///     vec![("aria-label", "Loading...".to_string()), ("aria-busy", "true".to_string()), ("aria-live", "polite".to_string())]
    /// );
    /// ```
    pub fn aria_attributes(&self) -> Vec<(&'static str, String)> {
        let mut attributes = Vec::with_capacity(3);
        if let Some(label) = self.aria_label.as_ref().filter(|_| self.aria_busy) {
            attributes.push(("aria-label", label.clone()));
        }
        attributes.push(("aria-busy", self.aria_busy.to_string()));
        attributes.push(("aria-live", "polite".to_owned()));
        attributes
    }

    /// Inline style as a `style` attribute value.
    pub fn style_string(&self) -> String {
        self.style
            .iter()
            .map(|(property, value)| format!("{property}: {value};"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub(crate) fn keyframes_for(style: &[(&'static str, String)]) -> Option<&'static str> {
        style
            .iter()
            .any(|(property, _)| *property == "animation")
            .then_some(COMPONENT_KEYFRAMES)
    }
}

/// Join non-empty class fragments with single spaces.
pub(crate) fn join_classes<'a>(classes: impl IntoIterator<Item = &'a str>) -> String {
    classes
        .into_iter()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Browser implementations.
#[cfg(feature = "web")]
pub mod web {
    use super::*;
    use crate::{Dom, ElementId};
    use rustc_hash::FxHashMap;
    use std::cell::{Cell, RefCell};
    use wasm_bindgen::JsCast;
    use web_sys::{Document, Element, HtmlElement, VisibilityState};

    /// Attribute carrying an element's handle.
    pub const HANDLE_ATTRIBUTE: &str = "data-scrimr-id";

    /// [`Dom`] over the browser document.
    ///
    /// Elements get a handle stamped into [`HANDLE_ATTRIBUTE`] on first
    /// sight. [`Dom::release`] drops the element and its stamp.
    pub struct WebDom {
        document: Document,
        elements: RefCell<FxHashMap<usize, Element>>,
        next_id: Cell<usize>,
    }

    impl WebDom {
        /// Wrap the current window's document.
        pub fn from_window() -> Result<Self, String> {
            let window = web_sys::window().ok_or("No window available")?;
            let document = window.document().ok_or("No document available")?;
            Ok(Self::new(document))
        }

        pub fn new(document: Document) -> Self {
            Self {
                document,
                elements: RefCell::new(FxHashMap::default()),
                next_id: Cell::new(0),
            }
        }

        /// Handle for `element`, registering it if needed.
        pub fn element_id(&self, element: &Element) -> ElementId {
            let mut elements = self.elements.borrow_mut();
            let stamped = element
                .get_attribute(HANDLE_ATTRIBUTE)
                .and_then(|value| value.parse::<usize>().ok());
            if let Some(id) = stamped {
                match elements.get(&id).map(|known| known == element) {
                    Some(true) => return ElementId::new(id),
                    // A clone of a stamped element carries a foreign stamp.
                    Some(false) => {}
                    None if id < self.next_id.get() => {
                        elements.insert(id, element.clone());
                        return ElementId::new(id);
                    }
                    None => {}
                }
            }

            let id = self.next_id.get();
            self.next_id.set(id + 1);
            if element.set_attribute(HANDLE_ATTRIBUTE, &id.to_string()).is_err() {
                log::warn!("scrimr: could not stamp element handle");
            }
            elements.insert(id, element.clone());
            ElementId::new(id)
        }

        /// The element behind a handle.
        pub fn element(&self, id: ElementId) -> Option<Element> {
            self.elements.borrow().get(&id.index()).cloned()
        }

        fn html_element(&self, id: ElementId) -> Option<HtmlElement> {
            self.element(id)?.dyn_into::<HtmlElement>().ok()
        }
    }

    impl Dom for WebDom {
        fn query_selector_all(&self, root: Option<ElementId>, selector: &str) -> Vec<ElementId> {
            let list = match root {
                Some(root) => match self.element(root) {
                    Some(root) => root.query_selector_all(selector),
                    None => return Vec::new(),
                },
                None => self.document.query_selector_all(selector),
            };
            let Ok(list) = list else {
                return Vec::new();
            };
            (0..list.length())
                .filter_map(|i| list.get(i))
                .filter_map(|node| node.dyn_into::<Element>().ok())
                .map(|element| self.element_id(&element))
                .collect()
        }

        fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
            self.element(element)?.get_attribute(name)
        }

        fn set_attribute(&mut self, element: ElementId, name: &str, value: &str) {
            if let Some(element) = self.element(element) {
                if element.set_attribute(name, value).is_err() {
                    log::warn!("scrimr: could not set attribute {name}");
                }
            }
        }

        fn remove_attribute(&mut self, element: ElementId, name: &str) {
            if let Some(element) = self.element(element) {
                if element.remove_attribute(name).is_err() {
                    log::warn!("scrimr: could not remove attribute {name}");
                }
            }
        }

        fn text_content(&self, element: ElementId) -> String {
            self.element(element)
                .and_then(|element| element.text_content())
                .unwrap_or_default()
        }

        fn set_text_content(&mut self, element: ElementId, text: &str) {
            if let Some(element) = self.element(element) {
                element.set_text_content(Some(text));
            }
        }

        fn class_name(&self, element: ElementId) -> String {
            self.element(element).map(|element| element.class_name()).unwrap_or_default()
        }

        fn set_class_name(&mut self, element: ElementId, class_name: &str) {
            if let Some(element) = self.element(element) {
                element.set_class_name(class_name);
            }
        }

        fn add_class(&mut self, element: ElementId, class: &str) {
            if let Some(element) = self.element(element) {
                if element.class_list().add_1(class).is_err() {
                    log::warn!("scrimr: could not add class {class}");
                }
            }
        }

        fn remove_class(&mut self, element: ElementId, class: &str) {
            if let Some(element) = self.element(element) {
                if element.class_list().remove_1(class).is_err() {
                    log::warn!("scrimr: could not remove class {class}");
                }
            }
        }

        fn style_property(&self, element: ElementId, property: &str) -> Option<String> {
            let value = self.html_element(element)?.style().get_property_value(property).ok()?;
            (!value.is_empty()).then_some(value)
        }

        fn set_style_property(&mut self, element: ElementId, property: &str, value: &str) {
            let Some(element) = self.html_element(element) else {
                return;
            };
            let style = element.style();
            let result = if value.is_empty() {
                style.remove_property(property).map(|_| ())
            } else {
                style.set_property(property, value)
            };
            if result.is_err() {
                log::warn!("scrimr: could not set style {property}");
            }
        }

        fn ensure_stylesheet(&mut self, id: &str, css: &str) {
            if self.document.get_element_by_id(id).is_some() {
                return;
            }
            let Some(head) = self.document.head() else {
                return;
            };
            let Ok(style) = self.document.create_element("style") else {
                return;
            };
            style.set_id(id);
            style.set_text_content(Some(css));
            if head.append_child(&style).is_err() {
                log::warn!("scrimr: could not inject stylesheet {id}");
            }
        }

        fn release(&mut self, element: ElementId) {
            let Some(element) = self.elements.borrow_mut().remove(&element.index()) else {
                return;
            };
            if element.remove_attribute(HANDLE_ATTRIBUTE).is_err() {
                log::warn!("scrimr: could not clear element handle");
            }
        }

        fn is_hidden(&self) -> bool {
            self.document.visibility_state() == VisibilityState::Hidden
        }

        fn is_ready(&self) -> bool {
            self.document.ready_state() != "loading"
        }

        fn prefers_reduced_motion(&self) -> bool {
            web_sys::window()
                .and_then(|window| window.match_media("(prefers-reduced-motion: reduce)").ok().flatten())
                .is_some_and(|query| query.matches())
        }
    }

    /// Apply a component render pass to an element.
    pub fn render_to_element(output: &RenderOutput, element: &HtmlElement) -> Result<(), String> {
        element.set_text_content(Some(&output.text));
        element.set_class_name(&output.class_name);
        element
            .set_attribute("style", &output.style_string())
            .map_err(|_| "Failed to set style")?;
        for name in ["aria-label", "aria-busy", "aria-live"] {
            element.remove_attribute(name).map_err(|_| "Failed to clear ARIA attribute")?;
        }
        for (name, value) in output.aria_attributes() {
            element.set_attribute(name, &value).map_err(|_| "Failed to set ARIA attribute")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_classes_skips_empty() {
        assert_eq!(join_classes(["inline-block", "", " select-none ", "font-mono"]), "inline-block select-none font-mono");
        assert_eq!(join_classes(["", ""]), "");
    }

    #[test]
    fn test_style_string() {
        let output = RenderOutput {
            text: String::new(),
            class_name: String::new(),
            style: vec![("background-size", "200% 100%".into()), ("animation", "shimmer 3s linear infinite".into())],
            aria_label: None,
            aria_busy: false,
            keyframes: None,
        };
        assert_eq!(output.style_string(), "background-size: 200% 100%; animation: shimmer 3s linear infinite;");
        assert_eq!(
            output.aria_attributes(),
            vec![("aria-busy", "false".to_owned()), ("aria-live", "polite".to_owned())]
        );
        assert_eq!(RenderOutput::keyframes_for(&output.style), Some(COMPONENT_KEYFRAMES));
        assert_eq!(RenderOutput::keyframes_for(&[]), None);
    }
}
