//! Hit testing: world point → anchor lookup.
//!
//! Walks anchors front-to-back (flow nodes paint above cards, later
//! entries above earlier ones) to find what sits under the pointer.

use ib_core::id::ElementId;
use ib_core::model::*;

/// What the pointer landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// The body of a card or flow node.
    Anchor(AnchorRef),
    /// The bottom-right resize handle of a flow node.
    ResizeHandle(ElementId),
}

/// The square resize handle in a flow node's bottom-right corner.
pub fn resize_handle_bounds(node: &FlowNode, size: f32) -> Bounds {
    Bounds::new(
        node.x + node.width - size,
        node.y + node.height - size,
        size,
        size,
    )
}

/// Find the topmost target at world position `(px, py)`.
/// Returns `None` if nothing is hit (background).
pub fn hit_test(state: &BoardState, px: f32, py: f32, handle_size: f32) -> Option<Hit> {
    for node in state.flow_nodes.iter().rev() {
        if resize_handle_bounds(node, handle_size).contains(px, py) {
            return Some(Hit::ResizeHandle(node.id));
        }
        if node.bounds().contains(px, py) {
            return Some(Hit::Anchor(AnchorRef::flow(node.id)));
        }
    }
    hit_test_cards(state, px, py).map(Hit::Anchor)
}

/// Like [`hit_test`] but ignores resize handles.
pub fn hit_test_anchor(state: &BoardState, px: f32, py: f32) -> Option<AnchorRef> {
    state
        .flow_nodes
        .iter()
        .rev()
        .find(|n| n.bounds().contains(px, py))
        .map(|n| AnchorRef::flow(n.id))
        .or_else(|| hit_test_cards(state, px, py))
}

fn hit_test_cards(state: &BoardState, px: f32, py: f32) -> Option<AnchorRef> {
    state
        .cards
        .iter()
        .rev()
        .find(|c| c.bounds().contains(px, py))
        .map(|c| AnchorRef::card(c.id))
}

/// Find all anchors whose bounds intersect the given rectangle.
pub fn hit_test_rect(state: &BoardState, rect: &Bounds) -> Vec<AnchorRef> {
    state
        .cards
        .iter()
        .filter(|c| c.bounds().intersects(rect))
        .map(|c| AnchorRef::card(c.id))
        .chain(
            state
                .flow_nodes
                .iter()
                .filter(|n| n.bounds().intersects(rect))
                .map(|n| AnchorRef::flow(n.id)),
        )
        .collect()
}
