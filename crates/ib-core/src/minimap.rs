//! Minimap projection.
//!
//! Every entity is drawn at `world / scale` into a small fixed-size
//! overview, together with the rectangle the main viewport currently
//! shows. Clicking the minimap recenters the main view, but only near
//! existing content so the user can't pan into empty space.

use crate::config::BoardConfig;
use crate::graph::resolve_anchor;
use crate::group::GroupTable;
use crate::model::*;
use crate::transform::{Camera, Viewport};

/// One projected element, in minimap pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum MinimapItem {
    Card {
        bounds: Bounds,
        accent: Option<Color>,
    },
    Flow {
        bounds: Bounds,
        shape: FlowShape,
        accent: Option<Color>,
    },
    Stroke {
        color: Color,
        points: Vec<(f32, f32)>,
    },
    Edge {
        from: (f32, f32),
        to: (f32, f32),
        accent: Option<Color>,
    },
}

/// Everything the minimap draws.
#[derive(Debug, Clone, PartialEq)]
pub struct MinimapLayout {
    pub width: f32,
    pub height: f32,
    pub items: Vec<MinimapItem>,
    /// The main viewport's visible region.
    pub viewport: Bounds,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Minimap {
    /// World units per minimap pixel.
    pub scale: f32,
    pub width: f32,
    pub height: f32,
    /// World point drawn at the minimap's top-left corner.
    pub origin: (f32, f32),
    /// Recenter only when content lies within this many world units.
    pub proximity: f32,
}

impl Minimap {
    pub fn new(config: &BoardConfig) -> Self {
        Self {
            scale: config.minimap_scale,
            width: config.minimap_width,
            height: config.minimap_height,
            origin: (0.0, 0.0),
            proximity: config.minimap_proximity,
        }
    }

    pub fn project(&self, wx: f32, wy: f32) -> (f32, f32) {
        (
            (wx - self.origin.0) / self.scale,
            (wy - self.origin.1) / self.scale,
        )
    }

    pub fn unproject(&self, mx: f32, my: f32) -> (f32, f32) {
        (
            mx * self.scale + self.origin.0,
            my * self.scale + self.origin.1,
        )
    }

    fn project_bounds(&self, b: &Bounds) -> Bounds {
        let (x, y) = self.project(b.x, b.y);
        Bounds::new(x, y, b.width / self.scale, b.height / self.scale)
    }

    /// The main viewport's visible world region, in minimap pixels.
    pub fn viewport_rect(&self, camera: &Camera, viewport: Viewport) -> Bounds {
        let (x, y, w, h) = camera.visible_world_rect(viewport);
        self.project_bounds(&Bounds::new(x, y, w, h))
    }

    /// Project every card, flow node, stroke, and edge.
    pub fn layout(
        &self,
        state: &BoardState,
        groups: &GroupTable,
        camera: &Camera,
        viewport: Viewport,
    ) -> MinimapLayout {
        let accent = |g: Option<crate::id::ElementId>| g.and_then(|g| groups.color(g));
        let mut items = Vec::with_capacity(
            state.cards.len() + state.flow_nodes.len() + state.strokes.len() + state.edges.len(),
        );

        for stroke in &state.strokes {
            items.push(MinimapItem::Stroke {
                color: stroke.color,
                points: stroke.points.iter().map(|p| self.project(p.x, p.y)).collect(),
            });
        }
        for edge in &state.edges {
            let (Some(a), Some(b)) = (
                resolve_anchor(state, &edge.from),
                resolve_anchor(state, &edge.to),
            ) else {
                continue;
            };
            let (ax, ay) = a.bounds.center();
            let (bx, by) = b.bounds.center();
            items.push(MinimapItem::Edge {
                from: self.project(ax, ay),
                to: self.project(bx, by),
                accent: accent(edge.group_id),
            });
        }
        for card in &state.cards {
            items.push(MinimapItem::Card {
                bounds: self.project_bounds(&card.bounds()),
                accent: accent(card.group_id),
            });
        }
        for node in &state.flow_nodes {
            items.push(MinimapItem::Flow {
                bounds: self.project_bounds(&node.bounds()),
                shape: node.shape,
                accent: accent(node.group_id),
            });
        }

        MinimapLayout {
            width: self.width,
            height: self.height,
            items,
            viewport: self.viewport_rect(camera, viewport),
        }
    }

    /// True if a card or stroke lies within `proximity` of world `(wx, wy)`.
    pub fn near_content(&self, state: &BoardState, wx: f32, wy: f32) -> bool {
        let r = self.proximity;
        state
            .cards
            .iter()
            .any(|c| c.bounds().inflate(r).contains(wx, wy))
            || state.strokes.iter().any(|s| s.touches(wx, wy, r))
    }

    /// Handle a click at minimap pixel `(mx, my)`: recenter the camera on
    /// the corresponding world point if it is near content. Returns true if
    /// the camera moved.
    pub fn click(
        &self,
        state: &BoardState,
        camera: &mut Camera,
        viewport: Viewport,
        mx: f32,
        my: f32,
    ) -> bool {
        let (wx, wy) = self.unproject(mx, my);
        if !self.near_content(state, wx, wy) {
            return false;
        }
        camera.center_on(wx, wy, viewport);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ElementId;
    use crate::transform::Pan;

    fn setup() -> (Minimap, BoardState, Camera, Viewport) {
        let config = BoardConfig::default();
        let mut state = BoardState::new();
        state
            .cards
            .push(Card::new(ElementId::intern("mm_card"), 1200.0, 600.0));
        (
            Minimap::new(&config),
            state,
            Camera::new(config.zoom_min, config.zoom_max),
            Viewport::default(),
        )
    }

    #[test]
    fn projection_roundtrip() {
        let (minimap, ..) = setup();
        let (mx, my) = minimap.project(1200.0, -240.0);
        assert_eq!((mx, my), (100.0, -20.0));
        assert_eq!(minimap.unproject(mx, my), (1200.0, -240.0));
    }

    #[test]
    fn click_near_card_recenters() {
        let (minimap, state, mut camera, viewport) = setup();
        let (mx, my) = minimap.project(1250.0, 650.0);
        assert!(minimap.click(&state, &mut camera, viewport, mx, my));
        let (sx, sy) = camera.to_screen(1250.0, 650.0);
        assert!((sx - viewport.width / 2.0).abs() < 1e-3);
        assert!((sy - viewport.height / 2.0).abs() < 1e-3);
    }

    #[test]
    fn click_on_empty_region_is_noop() {
        let (minimap, state, mut camera, viewport) = setup();
        camera.pan = Pan { x: 12.0, y: 34.0 };
        let (mx, my) = minimap.project(-5000.0, -5000.0);
        assert!(!minimap.click(&state, &mut camera, viewport, mx, my));
        assert_eq!(camera.pan, Pan { x: 12.0, y: 34.0 });
    }

    #[test]
    fn click_near_stroke_recenters() {
        let (minimap, mut state, mut camera, viewport) = setup();
        state.cards.clear();
        state.strokes.push(Stroke::new(
            ElementId::intern("mm_stroke"),
            Color::rgba(0.0, 0.0, 0.0, 1.0),
            2.0,
            vec![Point::new(-3000.0, 0.0)],
        ));
        let (mx, my) = minimap.project(-3100.0, 50.0);
        assert!(minimap.click(&state, &mut camera, viewport, mx, my));
    }

    #[test]
    fn viewport_rect_tracks_zoom() {
        let (minimap, _, mut camera, viewport) = setup();
        camera.set_zoom(0.5);
        let rect = minimap.viewport_rect(&camera, viewport);
        assert!((rect.width - 1600.0 / minimap.scale).abs() < 1e-3);
        assert!((rect.height - 1200.0 / minimap.scale).abs() < 1e-3);
    }

    #[test]
    fn layout_skips_dangling_edges() {
        let (minimap, mut state, camera, viewport) = setup();
        state.edges.push(Edge::new(
            ElementId::intern("mm_edge"),
            AnchorRef::card(ElementId::intern("mm_card")),
            AnchorRef::flow(ElementId::intern("gone")),
        ));
        let layout = minimap.layout(&state, &GroupTable::new(), &camera, viewport);
        assert_eq!(layout.items.len(), 1);
        assert!(matches!(layout.items[0], MinimapItem::Card { .. }));
    }
}
