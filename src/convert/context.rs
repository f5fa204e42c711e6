//! Ambient material context for one conversion call.
//!
//! Callers push a [`ConversionContext`] for the duration of a call with
//! [`ConversionContext::push`]; the returned guard pops it on every exit path.
//! Contexts are per thread and nest.

use std::cell::RefCell;

use serde::{Deserialize, Serialize};

use crate::host::ElementId;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionContext {
    pub graphics_style_id: ElementId,
    pub material_id: ElementId,
    /// Material per guest face index, taking precedence over `material_id`.
    pub face_material_ids: Option<Vec<ElementId>>,
}

thread_local! {
    static STACK: RefCell<Vec<ConversionContext>> = const { RefCell::new(Vec::new()) };
}

impl ConversionContext {
    #[must_use]
    pub fn with_material(material_id: ElementId) -> Self {
        Self {
            material_id,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_graphics_style(mut self, graphics_style_id: ElementId) -> Self {
        self.graphics_style_id = graphics_style_id;
        self
    }

    #[must_use]
    pub fn with_face_materials(mut self, face_material_ids: Vec<ElementId>) -> Self {
        self.face_material_ids = Some(face_material_ids);
        self
    }

    /// Makes `self` the current context until the guard is dropped.
    #[must_use = "the context is popped when the guard is dropped"]
    pub fn push(self) -> ContextGuard {
        STACK.with(|stack| stack.borrow_mut().push(self));
        ContextGuard { _private: () }
    }

    /// The innermost pushed context, or the default one.
    #[must_use]
    pub fn current() -> Self {
        STACK.with(|stack| stack.borrow().last().cloned().unwrap_or_default())
    }

    /// Number of contexts pushed on this thread.
    #[must_use]
    pub fn depth() -> usize {
        STACK.with(|stack| stack.borrow().len())
    }

    /// Material of guest face `face`: the per-face entry when present, else
    /// the context material, else `fallback`.
    #[must_use]
    pub fn face_material(&self, face: usize, fallback: Option<i64>) -> ElementId {
        if let Some(id) = self.face_material_ids.as_ref().and_then(|ids| ids.get(face)) {
            return *id;
        }
        if self.material_id.is_valid() {
            return self.material_id;
        }
        fallback.map_or(ElementId::INVALID, ElementId)
    }
}

/// Pops the context pushed by [`ConversionContext::push`].
#[derive(Debug)]
pub struct ContextGuard {
    _private: (),
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}
