//! Dismiss stack
//!
//! An owned registry of dismissible layers (revealed content, popovers).
//! Components push a layer when they open and pop it when they close; an
//! Escape press belongs to the topmost layer only. The stack is passed to
//! the components that share it instead of living in a global.

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};
use std::sync::Arc;

new_key_type! {
    /// Identifies one pushed layer
    pub struct LayerToken;
}

/// Shared handle to a dismiss stack
pub type SharedDismissStack = Arc<Mutex<DismissStack>>;

#[derive(Debug, Default)]
pub struct DismissStack {
    layers: SlotMap<LayerToken, ()>,
    order: Vec<LayerToken>,
}

impl DismissStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedDismissStack {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Push a new topmost layer
    pub fn push(&mut self) -> LayerToken {
        let token = self.layers.insert(());
        self.order.push(token);
        token
    }

    /// Remove a layer wherever it sits. Returns false for stale tokens.
    pub fn remove(&mut self, token: LayerToken) -> bool {
        if self.layers.remove(token).is_none() {
            return false;
        }
        self.order.retain(|t| *t != token);
        true
    }

    pub fn top(&self) -> Option<LayerToken> {
        self.order.last().copied()
    }

    pub fn is_top(&self, token: LayerToken) -> bool {
        self.top() == Some(token)
    }

    pub fn contains(&self, token: LayerToken) -> bool {
        self.layers.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_order() {
        let mut stack = DismissStack::new();
        let a = stack.push();
        let b = stack.push();
        assert!(stack.is_top(b));
        assert!(!stack.is_top(a));

        assert!(stack.remove(b));
        assert!(stack.is_top(a));
        assert!(!stack.remove(b));
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_remove_from_middle() {
        let mut stack = DismissStack::new();
        let a = stack.push();
        let b = stack.push();
        let c = stack.push();

        assert!(stack.remove(b));
        assert_eq!(stack.top(), Some(c));
        assert!(stack.remove(c));
        assert_eq!(stack.top(), Some(a));
        assert!(!stack.contains(b));
    }
}
