//! Node graph: anchor resolution, connections, and group assignment.
//!
//! Cards and flow nodes are both *anchors*, addressed by [`AnchorRef`].
//! Connecting two anchors creates an [`Edge`] and unions their groups.
//! Group membership is a flat tag on each member, so a merge re-tags every
//! member of the absorbed group instead of maintaining parent pointers.
//! This keeps snapshots a plain copy of the collections.

use crate::group::GroupTable;
use crate::id::ElementId;
use crate::model::*;

/// Something that can carry a group tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupMember {
    Card(ElementId),
    Flow(ElementId),
    Edge(ElementId),
}

/// Resolve an anchor to its rectangle and group tag.
/// Dangling references resolve to `None`.
pub fn resolve_anchor(state: &BoardState, anchor: &AnchorRef) -> Option<AnchorBounds> {
    match anchor.kind {
        AnchorKind::Card => state.card(anchor.id).map(|c| AnchorBounds {
            bounds: c.bounds(),
            group_id: c.group_id,
        }),
        AnchorKind::Flow => state.flow_node(anchor.id).map(|n| AnchorBounds {
            bounds: n.bounds(),
            group_id: n.group_id,
        }),
    }
}

fn anchor_group_mut<'a>(
    state: &'a mut BoardState,
    anchor: &AnchorRef,
) -> Option<&'a mut Option<ElementId>> {
    match anchor.kind {
        AnchorKind::Card => state.card_mut(anchor.id).map(|c| &mut c.group_id),
        AnchorKind::Flow => state.flow_node_mut(anchor.id).map(|n| &mut n.group_id),
    }
}

/// Re-tag every card, flow node, and edge in group `drop` with `keep`.
fn retag(state: &mut BoardState, drop: ElementId, keep: ElementId) {
    let tags = state
        .cards
        .iter_mut()
        .map(|c| &mut c.group_id)
        .chain(state.flow_nodes.iter_mut().map(|n| &mut n.group_id))
        .chain(state.edges.iter_mut().map(|e| &mut e.group_id));
    for tag in tags {
        if *tag == Some(drop) {
            *tag = Some(keep);
        }
    }
}

/// Put anchors `a` and `b` into one group and return its id.
///
/// - Neither grouped: allocate a new group with the next palette color.
/// - One grouped: the other joins it.
/// - Both grouped differently: `b`'s group merges into `a`'s; its color
///   entry is dropped.
///
/// Returns `None` (and changes nothing) if either anchor is dangling.
pub fn assign_group(
    state: &mut BoardState,
    groups: &mut GroupTable,
    a: &AnchorRef,
    b: &AnchorRef,
    palette: &[Color],
) -> Option<ElementId> {
    let group_a = resolve_anchor(state, a)?.group_id;
    let group_b = resolve_anchor(state, b)?.group_id;

    let group = match (group_a, group_b) {
        (None, None) => groups.allocate(palette),
        (Some(g), None) | (None, Some(g)) => g,
        (Some(keep), Some(drop)) if keep == drop => keep,
        (Some(keep), Some(drop)) => {
            retag(state, drop, keep);
            groups.remove(drop);
            log::debug!("merged group {drop} into {keep}");
            keep
        }
    };

    // A tag without a color entry (e.g. from a hand-edited document) gets one now.
    if !groups.contains(group) {
        groups.reconcile(state, palette);
    }

    for anchor in [a, b] {
        if let Some(tag) = anchor_group_mut(state, anchor) {
            *tag = Some(group);
        }
    }
    Some(group)
}

/// Connect two distinct, resolvable anchors with a new edge and merge
/// their groups. The edge joins the resulting group. Returns the edge id.
pub fn connect(
    state: &mut BoardState,
    groups: &mut GroupTable,
    from: AnchorRef,
    to: AnchorRef,
    palette: &[Color],
) -> Option<ElementId> {
    if from == to {
        return None;
    }
    let group = assign_group(state, groups, &from, &to, palette)?;
    let mut edge = Edge::new(ElementId::fresh("edge"), from, to);
    edge.group_id = Some(group);
    let id = edge.id;
    state.edges.push(edge);
    Some(id)
}

/// Delete a card or flow node together with every edge touching it,
/// then prune group colors nobody references any more.
pub fn delete_anchor(state: &mut BoardState, groups: &mut GroupTable, anchor: &AnchorRef) -> bool {
    let removed = match anchor.kind {
        AnchorKind::Card => {
            let before = state.cards.len();
            state.cards.retain(|c| c.id != anchor.id);
            before != state.cards.len()
        }
        AnchorKind::Flow => {
            let before = state.flow_nodes.len();
            state.flow_nodes.retain(|n| n.id != anchor.id);
            before != state.flow_nodes.len()
        }
    };
    if !removed {
        return false;
    }
    state.edges.retain(|e| !e.touches(anchor));
    groups.prune(state);
    true
}

/// Delete one edge and prune group colors.
pub fn delete_edge(state: &mut BoardState, groups: &mut GroupTable, id: ElementId) -> bool {
    let before = state.edges.len();
    state.edges.retain(|e| e.id != id);
    if before == state.edges.len() {
        return false;
    }
    groups.prune(state);
    true
}

/// Translate a card or flow node. Returns false for dangling anchors.
pub fn move_anchor(state: &mut BoardState, anchor: &AnchorRef, dx: f32, dy: f32) -> bool {
    let pos = match anchor.kind {
        AnchorKind::Card => state.card_mut(anchor.id).map(|c| (&mut c.x, &mut c.y)),
        AnchorKind::Flow => state.flow_node_mut(anchor.id).map(|n| (&mut n.x, &mut n.y)),
    };
    match pos {
        Some((x, y)) => {
            *x += dx;
            *y += dy;
            true
        }
        None => false,
    }
}

/// Set a flow node's size, floored at `(min_width, min_height)`.
pub fn resize_flow_node(
    state: &mut BoardState,
    id: ElementId,
    width: f32,
    height: f32,
    min_width: f32,
    min_height: f32,
) -> bool {
    match state.flow_node_mut(id) {
        Some(node) => {
            node.width = width.max(min_width);
            node.height = height.max(min_height);
            true
        }
        None => false,
    }
}

/// All members currently tagged with `group`.
pub fn members_of(state: &BoardState, group: ElementId) -> Vec<GroupMember> {
    let tagged = Some(group);
    state
        .cards
        .iter()
        .filter(|c| c.group_id == tagged)
        .map(|c| GroupMember::Card(c.id))
        .chain(
            state
                .flow_nodes
                .iter()
                .filter(|n| n.group_id == tagged)
                .map(|n| GroupMember::Flow(n.id)),
        )
        .chain(
            state
                .edges
                .iter()
                .filter(|e| e.group_id == tagged)
                .map(|e| GroupMember::Edge(e.id)),
        )
        .collect()
}
