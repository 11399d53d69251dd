use std::cell::RefCell;
use std::rc::Rc;

use crate::BuildStack;

// Thread-local stack of BuildStack handles (safe, no raw pointers).
thread_local! {
    static BUILD_STACKS: RefCell<Vec<Rc<BuildStack>>> = const { RefCell::new(Vec::new()) };
}

/// Guard that restores the previous build stack on drop.
#[must_use = "ScopedBuildStack restores the previous build stack on drop"]
pub struct ScopedBuildStack;

impl Drop for ScopedBuildStack {
    fn drop(&mut self) {
        BUILD_STACKS.with(|stacks| {
            let mut stacks = stacks.borrow_mut();
            stacks.pop();
        });
    }
}

/// Makes `stack` the active build stack for the duration of the scope.
/// Returns a guard that restores the previous one on drop.
pub fn enter(stack: &Rc<BuildStack>) -> ScopedBuildStack {
    BUILD_STACKS.with(|stacks| {
        stacks.borrow_mut().push(Rc::clone(stack));
    });
    ScopedBuildStack
}

/// Access the active build stack.
///
/// # Panics
/// Panics if there is no active build stack.
pub fn with_build_stack<R>(f: impl FnOnce(&BuildStack) -> R) -> R {
    BUILD_STACKS.with(|stacks| {
        let stack = stacks
            .borrow()
            .last()
            .expect("with_build_stack: no active build stack")
            .clone();
        f(&stack)
    })
}

/// Try to access the active build stack.
/// Returns None if there is no active build stack.
pub fn try_with_build_stack<R>(f: impl FnOnce(&BuildStack) -> R) -> Option<R> {
    BUILD_STACKS.with(|stacks| {
        let stack = stacks.borrow().last()?.clone();
        Some(f(&stack))
    })
}
