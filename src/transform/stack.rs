//! Fixed-depth model/view matrix stack.

use crate::foundation::core::Mat4;

/// Fixed-depth matrix stack.
///
/// Slot 0 holds the view matrix; each pushed slot accumulates model transforms on top of it.
/// The projection is kept separately and applied by [`TransformStack::mvp`].
///
/// Underflow and overflow are programmer errors and panic: the depth mirrors a bounded
/// scene traversal, so running past either end means the caller's push/pop pairing is broken.
#[derive(Clone, Debug)]
pub struct TransformStack {
    projection: Mat4,
    slots: Box<[Mat4]>,
    top: usize,
}

impl TransformStack {
    /// Create a stack with `max_depth` slots, reset to identity projection and view.
    pub fn new(max_depth: usize) -> Self {
        assert!(max_depth >= 1, "transform stack needs at least one slot");
        Self {
            projection: Mat4::IDENTITY,
            slots: vec![Mat4::IDENTITY; max_depth].into_boxed_slice(),
            top: 0,
        }
    }

    /// Reinitialize to depth 1 with the given projection and view.
    pub fn reset(&mut self, projection: Mat4, view: Mat4) {
        self.projection = projection;
        self.top = 0;
        self.slots[0] = view;
    }

    /// Duplicate the current top into a new slot.
    pub fn push(&mut self) {
        assert!(
            self.top + 1 < self.slots.len(),
            "transform stack overflow (max depth {})",
            self.slots.len()
        );
        self.slots[self.top + 1] = self.slots[self.top];
        self.top += 1;
    }

    /// Discard the top slot.
    pub fn pop(&mut self) {
        assert!(self.top > 0, "transform stack underflow");
        self.top -= 1;
    }

    /// Replace the top with `top * m`.
    pub fn multiply_matrix(&mut self, m: Mat4) {
        self.slots[self.top] *= m;
    }

    pub fn top(&self) -> Mat4 {
        self.slots[self.top]
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// `projection * top`.
    pub fn mvp(&self) -> Mat4 {
        self.projection * self.slots[self.top]
    }

    /// Occupied slots, including the base view slot.
    pub fn depth(&self) -> usize {
        self.top + 1
    }

    pub fn max_depth(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/stack.rs"]
mod tests;
