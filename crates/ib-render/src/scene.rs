//! Board state → flat display list.
//!
//! The list is back-to-front and in world coordinates; hosts apply the
//! camera transform once and replay the commands onto whatever surface
//! they own (Canvas2D in the browser, nothing at all in tests).

use crate::hit::resize_handle_bounds;
use ib_core::graph::resolve_anchor;
use ib_core::group::GroupTable;
use ib_core::id::ElementId;
use ib_core::model::*;

/// Transient editor state layered over the committed board.
#[derive(Debug, Clone, Default)]
pub struct SceneOverlay {
    /// The stroke currently being drawn.
    pub live_stroke: Option<Stroke>,
    /// Stroke the eraser would remove on release (whole mode).
    pub erase_target: Option<ElementId>,
    /// Eraser cursor as world `(x, y, radius)`.
    pub eraser: Option<(f32, f32, f32)>,
    /// Pending connection: origin anchor and current world cursor.
    pub elastic: Option<(AnchorRef, (f32, f32))>,
    pub hovered: Option<AnchorRef>,
    pub selected: Option<AnchorRef>,
}

/// One drawing instruction, in world coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Ink {
        points: Vec<(f32, f32)>,
        color: Color,
        width: f32,
        highlighted: bool,
    },
    Edge {
        from: (f32, f32),
        to: (f32, f32),
        label: Option<String>,
        accent: Option<Color>,
    },
    Card {
        bounds: Bounds,
        title: String,
        content: String,
        media_url: Option<String>,
        accent: Option<Color>,
        selected: bool,
        hovered: bool,
    },
    Flow {
        bounds: Bounds,
        shape: FlowShape,
        text: String,
        accent: Option<Color>,
        selected: bool,
        hovered: bool,
    },
    ResizeHandle {
        bounds: Bounds,
    },
    Elastic {
        from: (f32, f32),
        to: (f32, f32),
    },
    Eraser {
        center: (f32, f32),
        radius: f32,
    },
}

/// Build the full display list.
///
/// Order: edges, cards (with their doodles), flow nodes, committed ink,
/// live ink, then interaction chrome. Edges whose endpoints don't resolve
/// are skipped.
pub fn build_scene(
    state: &BoardState,
    groups: &GroupTable,
    overlay: &SceneOverlay,
    handle_size: f32,
) -> Vec<DrawCmd> {
    let accent = |g: Option<ElementId>| g.and_then(|g| groups.color(g));
    let is = |slot: &Option<AnchorRef>, anchor: AnchorRef| *slot == Some(anchor);
    let mut cmds = Vec::new();

    for edge in &state.edges {
        let (Some(a), Some(b)) = (
            resolve_anchor(state, &edge.from),
            resolve_anchor(state, &edge.to),
        ) else {
            log::trace!("skipping dangling edge {}", edge.id);
            continue;
        };
        let (from, to) = edge_endpoints(&a.bounds, &b.bounds);
        cmds.push(DrawCmd::Edge {
            from,
            to,
            label: edge.label.clone(),
            accent: accent(edge.group_id),
        });
    }

    for card in &state.cards {
        let anchor = AnchorRef::card(card.id);
        cmds.push(DrawCmd::Card {
            bounds: card.bounds(),
            title: card.title.clone(),
            content: card.content.clone(),
            media_url: card.media_url.clone(),
            accent: accent(card.group_id),
            selected: is(&overlay.selected, anchor),
            hovered: is(&overlay.hovered, anchor),
        });
        for doodle in card.doodle.iter().flatten() {
            cmds.push(ink(doodle, (card.x, card.y), false));
        }
    }

    for node in &state.flow_nodes {
        let anchor = AnchorRef::flow(node.id);
        let selected = is(&overlay.selected, anchor);
        cmds.push(DrawCmd::Flow {
            bounds: node.bounds(),
            shape: node.shape,
            text: node.text.clone(),
            accent: accent(node.group_id),
            selected,
            hovered: is(&overlay.hovered, anchor),
        });
        if selected {
            cmds.push(DrawCmd::ResizeHandle {
                bounds: resize_handle_bounds(node, handle_size),
            });
        }
    }

    for stroke in &state.strokes {
        let highlighted = overlay.erase_target == Some(stroke.id);
        cmds.push(ink(stroke, (0.0, 0.0), highlighted));
    }
    if let Some(live) = &overlay.live_stroke {
        cmds.push(ink(live, (0.0, 0.0), false));
    }

    if let Some((origin, cursor)) = &overlay.elastic
        && let Some(a) = resolve_anchor(state, origin)
    {
        cmds.push(DrawCmd::Elastic {
            from: a.bounds.center(),
            to: *cursor,
        });
    }
    if let Some((x, y, radius)) = overlay.eraser {
        cmds.push(DrawCmd::Eraser {
            center: (x, y),
            radius,
        });
    }

    cmds
}

fn ink(stroke: &Stroke, offset: (f32, f32), highlighted: bool) -> DrawCmd {
    DrawCmd::Ink {
        points: stroke
            .points
            .iter()
            .map(|p| (p.x + offset.0, p.y + offset.1))
            .collect(),
        color: stroke.color,
        width: stroke.rendered_width(),
        highlighted,
    }
}

// ─── Edge geometry ───────────────────────────────────────────────────────

/// Endpoints of a straight edge between two anchors, clipped to each
/// anchor's border so the line doesn't run under the boxes.
pub fn edge_endpoints(a: &Bounds, b: &Bounds) -> ((f32, f32), (f32, f32)) {
    let ca = a.center();
    let cb = b.center();
    (border_point(a, cb), border_point(b, ca))
}

/// Where the ray from the center of `b` toward `target` leaves `b`.
fn border_point(b: &Bounds, target: (f32, f32)) -> (f32, f32) {
    let (cx, cy) = b.center();
    let dx = target.0 - cx;
    let dy = target.1 - cy;
    if dx == 0.0 && dy == 0.0 {
        return (cx, cy);
    }
    let hw = b.width / 2.0;
    let hh = b.height / 2.0;
    let tx = if dx != 0.0 { hw / dx.abs() } else { f32::INFINITY };
    let ty = if dy != 0.0 { hh / dy.abs() } else { f32::INFINITY };
    let t = tx.min(ty).min(1.0);
    (cx + dx * t, cy + dy * t)
}
