//! Document abstraction used by the scanner.
//!
//! [`Dom`] is the small slice of a document the scanner needs: selector
//! queries, attributes, text, classes, inline styles and stylesheet
//! injection. [`MemoryDom`] implements it in memory for tests and headless
//! hosts; the `web` feature adds a browser implementation in
//! [`render::web`](crate::render).

use crate::selector::{Selector, SelectorSubject};

/// Opaque handle to an element of a [`Dom`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

impl ElementId {
    #[inline]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// An element given either directly or by selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target<'a> {
    Element(ElementId),
    /// Resolved to the first match in document order
    Selector(&'a str),
}

impl From<ElementId> for Target<'_> {
    fn from(id: ElementId) -> Self {
        Target::Element(id)
    }
}

impl<'a> From<&'a str> for Target<'a> {
    fn from(selector: &'a str) -> Self {
        Target::Selector(selector)
    }
}

/// Document operations the scanner relies on.
///
/// Invalid selectors match nothing. Operations on unknown elements are
/// no-ops.
pub trait Dom {
    /// Elements matching `selector`, in document order.
    ///
    /// With a `root`, only its descendants are searched.
    fn query_selector_all(&self, root: Option<ElementId>, selector: &str) -> Vec<ElementId>;

    /// First element matching `selector`.
    fn query_selector(&self, selector: &str) -> Option<ElementId> {
        self.query_selector_all(None, selector).into_iter().next()
    }

    fn attribute(&self, element: ElementId, name: &str) -> Option<String>;
    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str);
    fn remove_attribute(&mut self, element: ElementId, name: &str);

    /// Concatenated text of the element and its descendants.
    fn text_content(&self, element: ElementId) -> String;
    /// Replace all children with a single text node.
    fn set_text_content(&mut self, element: ElementId, text: &str);

    fn class_name(&self, element: ElementId) -> String {
        self.attribute(element, "class").unwrap_or_default()
    }

    fn set_class_name(&mut self, element: ElementId, class_name: &str) {
        self.set_attribute(element, "class", class_name);
    }

    fn add_class(&mut self, element: ElementId, class: &str) {
        let current = self.class_name(element);
        if current.split_whitespace().any(|c| c == class) {
            return;
        }
        let updated = if current.trim().is_empty() {
            class.to_owned()
        } else {
            format!("{} {class}", current.trim_end())
        };
        self.set_class_name(element, &updated);
    }

    fn remove_class(&mut self, element: ElementId, class: &str) {
        let current = self.class_name(element);
        if !current.split_whitespace().any(|c| c == class) {
            return;
        }
        let updated: Vec<&str> = current.split_whitespace().filter(|c| *c != class).collect();
        self.set_class_name(element, &updated.join(" "));
    }

    fn style_property(&self, element: ElementId, property: &str) -> Option<String>;
    /// Set an inline style property; an empty value removes it.
    fn set_style_property(&mut self, element: ElementId, property: &str, value: &str);

    /// Add a `<style>` element with `id` unless one already exists.
    fn ensure_stylesheet(&mut self, id: &str, css: &str);

    /// The scanner no longer needs this handle.
    ///
    /// Implementations that track handles may drop the element here.
    fn release(&mut self, _element: ElementId) {}

    /// The document is in a background tab.
    fn is_hidden(&self) -> bool {
        false
    }

    /// The document has finished parsing.
    fn is_ready(&self) -> bool {
        true
    }

    /// The user asked for reduced motion.
    fn prefers_reduced_motion(&self) -> bool {
        false
    }
}

#[derive(Clone, Debug)]
struct Node {
    tag: String,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    attributes: Vec<(String, String)>,
    text: String,
    style: Vec<(String, String)>,
}

impl SelectorSubject for Node {
    fn tag_name(&self) -> &str {
        &self.tag
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }
}

/// In-memory element tree.
///
/// The tree starts with a `body` root. Elements are never freed; replacing
/// an element's text detaches its children.
///
/// ```rust
/// use scrimr_core::{Dom, MemoryDom};
///
/// let mut dom = MemoryDom::new();
/// let span = dom.append_element(dom.root(), "span");
/// dom.set_attribute(span, "data-scrimr", "");
/// dom.set_text_content(span, "Hello");
/// assert_eq!(dom.query_selector("[data-scrimr]"), Some(span));
/// assert_eq!(dom.text_content(dom.root()), "Hello");
/// ```
#[derive(Clone, Debug)]
pub struct MemoryDom {
    nodes: Vec<Node>,
    stylesheets: Vec<(String, String)>,
    hidden: bool,
    ready: bool,
    reduced_motion: bool,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                tag: "body".to_owned(),
                parent: None,
                children: Vec::new(),
                attributes: Vec::new(),
                text: String::new(),
                style: Vec::new(),
            }],
            stylesheets: Vec::new(),
            hidden: false,
            ready: true,
            reduced_motion: false,
        }
    }

    /// The `body` element.
    #[inline]
    pub fn root(&self) -> ElementId {
        ElementId(0)
    }

    /// Create a `tag` element as the last child of `parent`.
    pub fn append_element(&mut self, parent: ElementId, tag: &str) -> ElementId {
        let id = ElementId(self.nodes.len());
        self.nodes.push(Node {
            tag: tag.to_ascii_lowercase(),
            parent: Some(parent),
            children: Vec::new(),
            attributes: Vec::new(),
            text: String::new(),
            style: Vec::new(),
        });
        if let Some(parent) = self.nodes.get_mut(parent.0) {
            parent.children.push(id);
        }
        id
    }

    /// Mark the document as hidden, like a background tab.
    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    /// Mark whether the document has finished loading.
    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    /// Report a reduced-motion preference.
    pub fn set_reduced_motion(&mut self, reduced_motion: bool) {
        self.reduced_motion = reduced_motion;
    }

    /// CSS of the stylesheet with `id`, if injected.
    pub fn stylesheet(&self, id: &str) -> Option<&str> {
        self.stylesheets.iter().find(|(i, _)| i == id).map(|(_, css)| css.as_str())
    }

    /// Number of injected stylesheets.
    pub fn stylesheet_count(&self) -> usize {
        self.stylesheets.len()
    }

    /// Parent of `element`; `None` for the root and detached elements.
    pub fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.node(element).and_then(|node| node.parent)
    }

    fn node(&self, element: ElementId) -> Option<&Node> {
        self.nodes.get(element.0)
    }

    fn node_mut(&mut self, element: ElementId) -> Option<&mut Node> {
        self.nodes.get_mut(element.0)
    }

    fn collect_descendants(&self, element: ElementId, out: &mut Vec<ElementId>) {
        if let Some(node) = self.node(element) {
            for &child in &node.children {
                out.push(child);
                self.collect_descendants(child, out);
            }
        }
    }

    fn collect_text(&self, element: ElementId, out: &mut String) {
        if let Some(node) = self.node(element) {
            out.push_str(&node.text);
            for &child in &node.children {
                self.collect_text(child, out);
            }
        }
    }
}

impl Dom for MemoryDom {
    fn query_selector_all(&self, root: Option<ElementId>, selector: &str) -> Vec<ElementId> {
        let Some(selector) = Selector::parse(selector) else {
            return Vec::new();
        };
        let mut candidates = Vec::new();
        match root {
            Some(root) => self.collect_descendants(root, &mut candidates),
            None => {
                candidates.push(self.root());
                self.collect_descendants(self.root(), &mut candidates);
            }
        }
        candidates
            .into_iter()
            .filter(|&id| self.node(id).is_some_and(|node| selector.matches(node)))
            .collect()
    }

    fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
        self.node(element)
            .and_then(|node| SelectorSubject::attribute(node, name))
            .map(str::to_owned)
    }

    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str) {
        let Some(node) = self.node_mut(element) else {
            return;
        };
        match node.attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value.to_owned(),
            None => node.attributes.push((name.to_owned(), value.to_owned())),
        }
    }

    fn remove_attribute(&mut self, element: ElementId, name: &str) {
        if let Some(node) = self.node_mut(element) {
            node.attributes.retain(|(n, _)| n != name);
        }
    }

    fn text_content(&self, element: ElementId) -> String {
        let mut text = String::new();
        self.collect_text(element, &mut text);
        text
    }

    fn set_text_content(&mut self, element: ElementId, text: &str) {
        let Some(node) = self.node_mut(element) else {
            return;
        };
        node.text = text.to_owned();
        let children = std::mem::take(&mut node.children);
        for child in children {
            if let Some(child) = self.node_mut(child) {
                child.parent = None;
            }
        }
    }

    fn style_property(&self, element: ElementId, property: &str) -> Option<String> {
        self.node(element)?
            .style
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.clone())
    }

    fn set_style_property(&mut self, element: ElementId, property: &str, value: &str) {
        let Some(node) = self.node_mut(element) else {
            return;
        };
        node.style.retain(|(p, _)| p != property);
        if !value.is_empty() {
            node.style.push((property.to_owned(), value.to_owned()));
        }
    }

    fn ensure_stylesheet(&mut self, id: &str, css: &str) {
        if self.stylesheet(id).is_none() {
            self.stylesheets.push((id.to_owned(), css.to_owned()));
        }
    }

    fn is_hidden(&self) -> bool {
        self.hidden
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion
    }
}
