//! Per-element bookkeeping for the scanner.

use rustc_hash::FxHashMap;

use crate::{ElementId, Phase, ResolvedOptions, ScrambleController, ScrimrOptions};

/// Everything the scanner remembers about one managed element.
#[derive(Clone, Debug)]
pub struct ElementState {
    element: ElementId,
    original_content: String,
    original_classes: String,
    /// Options as requested, before defaults; `update` overlays onto these
    pub(crate) requested: ScrimrOptions,
    pub(crate) controller: ScrambleController,
    pub(crate) is_active: bool,
}

impl ElementState {
    pub(crate) fn new(
        element: ElementId,
        original_content: String,
        original_classes: String,
        requested: ScrimrOptions,
        controller: ScrambleController,
    ) -> Self {
        Self {
            element,
            original_content,
            original_classes,
            requested,
            controller,
            is_active: true,
        }
    }

    #[inline]
    pub fn element(&self) -> ElementId {
        self.element
    }

    /// Text the element held before it was initialised.
    #[inline]
    pub fn original_content(&self) -> &str {
        &self.original_content
    }

    /// Class attribute the element held before it was initialised.
    #[inline]
    pub fn original_classes(&self) -> &str {
        &self.original_classes
    }

    #[inline]
    pub fn options(&self) -> &ResolvedOptions {
        self.controller.options()
    }

    /// Still scrambling, i.e. not yet completed.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.controller.phase()
    }

    /// Text currently shown in the element.
    #[inline]
    pub fn text(&self) -> &str {
        self.controller.text()
    }

    #[inline]
    pub fn display_length(&self) -> usize {
        self.controller.display_length()
    }
}

/// Managed elements keyed by handle, iterated in registration order.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    entries: FxHashMap<ElementId, ElementState>,
    order: Vec<ElementId>,
}

impl Registry {
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn contains(&self, element: ElementId) -> bool {
        self.entries.contains_key(&element)
    }

    pub fn get(&self, element: ElementId) -> Option<&ElementState> {
        self.entries.get(&element)
    }

    pub fn get_mut(&mut self, element: ElementId) -> Option<&mut ElementState> {
        self.entries.get_mut(&element)
    }

    /// Register a state. An element already present keeps its old state and
    /// `false` is returned.
    pub fn insert(&mut self, state: ElementState) -> bool {
        let element = state.element;
        if self.entries.contains_key(&element) {
            return false;
        }
        self.entries.insert(element, state);
        self.order.push(element);
        true
    }

    pub fn remove(&mut self, element: ElementId) -> Option<ElementState> {
        let state = self.entries.remove(&element)?;
        self.order.retain(|&id| id != element);
        Some(state)
    }

    /// Handles in registration order.
    pub fn elements(&self) -> Vec<ElementId> {
        self.order.clone()
    }

    /// States in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ElementState> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    /// Earliest timer deadline across all elements.
    pub fn next_due_ms(&self) -> Option<u64> {
        self.entries.values().filter_map(|state| state.controller.next_due_ms()).min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(index: usize) -> ElementState {
        ElementState::new(
            ElementId::new(index),
            format!("content {index}"),
            String::new(),
            ScrimrOptions::default(),
            ScrambleController::new(ResolvedOptions::default()),
        )
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut registry = Registry::default();
        assert!(registry.insert(state(1)));
        let mut again = state(1);
        again.is_active = false;
        assert!(!registry.insert(again));
        assert_eq!(registry.len(), 1);
        assert!(registry.get(ElementId::new(1)).unwrap().is_active());
    }

    #[test]
    fn test_registration_order() {
        let mut registry = Registry::default();
        for i in [5, 2, 9] {
            registry.insert(state(i));
        }
        registry.remove(ElementId::new(2));
        let order: Vec<usize> = registry.iter().map(|s| s.element().index()).collect();
        assert_eq!(order, vec![5, 9]);
        assert_eq!(registry.elements(), vec![ElementId::new(5), ElementId::new(9)]);
        assert!(registry.remove(ElementId::new(2)).is_none());
    }

    #[test]
    fn test_next_due_across_elements() {
        let mut registry = Registry::default();
        assert_eq!(registry.next_due_ms(), None);
        let mut rng = rand::rng();
        let mut a = state(1);
        a.controller.start_loading(10, &mut rng);
        let mut b = state(2);
        b.controller.start_loading(0, &mut rng);
        registry.insert(a);
        registry.insert(b);
        assert_eq!(registry.next_due_ms(), Some(50));
    }
}
