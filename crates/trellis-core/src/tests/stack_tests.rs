use std::rc::Rc;

use super::BuildStack;
use crate::{
    enter, try_with_build_stack, with_build_stack, ElementRegistry, ForEachState, NodeId, NodeKind,
    StackError,
};
use trellis_layout::VisualState;

fn stack() -> BuildStack {
    BuildStack::new(Rc::new(ElementRegistry::new()))
}

fn atomic(stack: &BuildStack, tag: &str) -> NodeId {
    stack
        .registry()
        .create_node(tag, NodeKind::Frame { atomic: true })
}

fn container(stack: &BuildStack, tag: &str) -> NodeId {
    stack
        .registry()
        .create_node(tag, NodeKind::Frame { atomic: false })
}

fn children(stack: &BuildStack, id: NodeId) -> Vec<NodeId> {
    stack
        .registry()
        .with_node(id, |node| node.children())
        .unwrap()
}

#[test]
fn pushing_onto_an_atomic_top_closes_it_first() {
    let stack = stack();
    let root = container(&stack, "Column");
    let first = atomic(&stack, "Text");
    let second = atomic(&stack, "Text");
    stack.push(root);
    stack.push(first);

    stack.push(second);

    assert_eq!(stack.depth(), 2);
    assert_eq!(stack.main_element_node(), Some(second));
    assert_eq!(children(&stack, root), vec![first]);
}

#[test]
fn the_root_element_is_never_popped() {
    let stack = stack();
    let root = container(&stack, "Column");
    stack.push(root);
    stack.pop(None);
    stack.pop(None);
    assert_eq!(stack.depth(), 1);
    assert_eq!(stack.main_element_node(), Some(root));
}

#[test]
fn pop_mounts_under_the_new_top_at_the_requested_slot() {
    let stack = stack();
    let root = container(&stack, "Column");
    let a = atomic(&stack, "Text");
    let b = atomic(&stack, "Text");
    stack.push(root);
    stack.push(a);
    stack.pop(None);
    stack.push(b);
    stack.pop(Some(0));

    assert_eq!(children(&stack, root), vec![b, a]);
}

#[test]
fn pop_container_closes_the_atomic_run_and_stops_at_the_root() {
    let stack = stack();
    let root = container(&stack, "Page");
    let inner = atomic(&stack, "Button");
    let innermost = atomic(&stack, "Text");
    // the posited state: two atomic elements left open above the root
    stack.elements.borrow_mut().extend([root, inner, innermost]);

    stack.pop_container();

    assert_eq!(stack.depth(), 1);
    assert_eq!(stack.main_element_node(), Some(root));
    assert_eq!(children(&stack, root), vec![inner]);
    assert_eq!(children(&stack, inner), vec![innermost]);
}

#[test]
fn pop_container_closes_a_plain_container_in_one_step() {
    let stack = stack();
    let root = container(&stack, "Page");
    let row = container(&stack, "Row");
    stack.push(root);
    stack.push(row);

    stack.pop_container();

    assert_eq!(stack.depth(), 1);
    assert_eq!(children(&stack, root), vec![row]);
}

#[test]
fn finish_returns_the_detached_subtree() {
    let stack = stack();
    let card = container(&stack, "Card");
    let text = atomic(&stack, "Text");
    stack.push(card);
    stack.push(text);
    stack.pop(None);

    let finished = stack.finish().unwrap();
    assert_eq!(finished, card);
    assert!(stack.is_empty());
    assert_eq!(children(&stack, card), vec![text]);
    let flagged = stack
        .registry()
        .with_node(card, |node| node.needs_debug_boundary())
        .unwrap();
    assert!(flagged);

    assert_eq!(stack.finish(), Err(StackError::EmptyStack));
}

#[test]
fn a_small_page_builds_into_the_expected_tree() {
    let stack = stack();
    let column = container(&stack, "Column");
    let row = container(&stack, "Row");
    let minus = atomic(&stack, "Button");
    let label = atomic(&stack, "Text");
    let plus = atomic(&stack, "Button");

    stack.push(column);
    stack.push(row);
    stack.push(minus);
    stack.push(label);
    stack.push(plus);
    stack.pop_container();

    assert_eq!(stack.depth(), 1);
    assert_eq!(stack.main_element_node(), Some(column));
    assert_eq!(children(&stack, column), vec![row]);
    assert_eq!(children(&stack, row), vec![minus, label, plus]);

    stack.pop(None);
    assert_eq!(stack.depth(), 1);
    assert_eq!(stack.main_element_node(), Some(column));
}

#[test]
fn key_paths_round_trip_including_empty_segments() {
    let stack = stack();
    assert_eq!(stack.view_key(), "");

    stack.push_key("a");
    assert_eq!(stack.view_key(), "a");
    stack.push_key("");
    assert_eq!(stack.view_key(), "a_");
    stack.push_key("item3");
    assert_eq!(stack.view_key(), "a__item3");

    stack.pop_key().unwrap();
    assert_eq!(stack.view_key(), "a_");
    stack.pop_key().unwrap();
    assert_eq!(stack.view_key(), "a");
    stack.pop_key().unwrap();
    assert_eq!(stack.view_key(), "");
    assert_eq!(stack.pop_key(), Err(StackError::StaleKeyPop));

    // an empty first segment contributes no separator either
    stack.push_key("");
    stack.push_key("x");
    assert_eq!(stack.view_key(), "x");
    stack.pop_key().unwrap();
    stack.pop_key().unwrap();
    assert_eq!(stack.view_key(), "");
}

#[test]
fn view_ids_are_namespaced_by_the_key_path() {
    let stack = stack();
    assert_eq!(stack.process_view_id("counter"), "counter");
    stack.push_key("page");
    stack.push_key("list");
    assert_eq!(stack.process_view_id("counter"), "page_list_counter");
}

#[test]
fn visual_state_queries_the_top_frames_event_flags() {
    let stack = stack();
    assert!(stack.is_current_visual_state_active());

    stack.set_visual_state(VisualState::Pressed);
    assert!(!stack.is_current_visual_state_active());

    let button = atomic(&stack, "Button");
    stack.push(button);
    assert!(!stack.is_current_visual_state_active());

    stack
        .registry()
        .with_node(button, |node| node.add_state_flag(VisualState::Pressed.bit()))
        .unwrap();
    assert!(stack.is_current_visual_state_active());

    stack.set_visual_state(VisualState::Normal);
    assert!(!stack.is_current_visual_state_active());
    stack
        .registry()
        .with_node(button, |node| {
            node.remove_state_flag(VisualState::Pressed.bit())
        })
        .unwrap();
    assert!(stack.is_current_visual_state_active());

    stack.clear_visual_state();
    assert!(stack.is_current_visual_state_active());
}

#[test]
fn a_structural_top_cannot_answer_state_queries() {
    let stack = stack();
    let group = stack.registry().create_node("IfElse", NodeKind::Group);
    stack.push(group);
    stack.set_visual_state(VisualState::Focused);
    assert_eq!(stack.main_frame_node(), None);
    assert!(!stack.is_current_visual_state_active());
}

#[test]
fn scoped_stacks_nest_and_restore() {
    let outer = Rc::new(stack());
    let inner = Rc::new(stack());
    assert!(try_with_build_stack(|_| ()).is_none());

    let outer_guard = enter(&outer);
    let outer_root = container(&outer, "Page");
    with_build_stack(|active| active.push(outer_root));
    {
        let _inner_guard = enter(&inner);
        assert_eq!(with_build_stack(|active| active.depth()), 0);
    }
    assert_eq!(with_build_stack(|active| active.depth()), 1);

    drop(outer_guard);
    assert!(try_with_build_stack(|_| ()).is_none());
}

#[test]
fn for_each_reuses_children_by_id_and_reorders() {
    let stack = stack();
    let root = container(&stack, "List");
    let repeater = stack
        .registry()
        .create_node("ForEach", NodeKind::ForEach(ForEachState::default()));
    stack.push(root);
    stack.push(repeater);

    let a = atomic(&stack, "Item");
    stack.push(a);
    stack.pop(None);
    let b = atomic(&stack, "Item");
    stack.push(b);
    stack.pop(None);
    let c = atomic(&stack, "Item");
    stack.push(c);
    stack.pop(None);
    stack.set_for_each_ids(vec!["a".into(), "b".into(), "c".into()]);
    stack.pop(None);
    assert_eq!(children(&stack, repeater), vec![a, b, c]);

    // rebuild: "b" disappears, the rest swap, and one fresh item arrives
    stack.push(repeater);
    let d = atomic(&stack, "Item");
    stack.push(d);
    stack.pop(None);
    stack.set_for_each_ids(vec!["c".into(), "a".into(), "d".into()]);
    stack.pop(None);

    assert_eq!(children(&stack, repeater), vec![c, a, d]);
    let recycled = stack
        .registry()
        .with_node(b, |node| (node.removed_silently(), node.parent()))
        .unwrap();
    assert_eq!(recycled, (true, None));
}

#[test]
fn an_unchanged_for_each_pass_does_not_invalidate_the_container() {
    let stack = stack();
    let root = container(&stack, "List");
    let repeater = stack
        .registry()
        .create_node("ForEach", NodeKind::ForEach(ForEachState::default()));
    stack.push(root);
    stack.push(repeater);
    let a = atomic(&stack, "Item");
    stack.push(a);
    stack.pop(None);
    stack.set_for_each_ids(vec!["a".into()]);
    stack.pop(None);

    stack
        .registry()
        .with_node(repeater, |node| node.layout().clean_flags())
        .unwrap();

    // same single id, no new children pushed
    stack.push(repeater);
    stack.set_for_each_ids(vec!["a".into()]);
    stack.pop(None);

    assert_eq!(children(&stack, repeater), vec![a]);
    let flags = stack
        .registry()
        .with_node(repeater, |node| node.layout().change_flags())
        .unwrap();
    assert!(flags.is_clean());
}