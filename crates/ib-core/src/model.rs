//! Core data model for idea boards.
//!
//! A board is four flat collections: free-hand ink strokes, sticky-note
//! cards, diagram flow nodes, and edges connecting cards/flow nodes.
//! Visual groups are not stored as entities; members carry a shared
//! `group_id` tag whose accent color lives in the [`GroupTable`] side table.
//!
//! [`GroupTable`]: crate::group::GroupTable

use crate::id::ElementId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Pressure assumed when the input device doesn't report one.
pub const DEFAULT_PRESSURE: f32 = 0.7;

/// Floor on the average-pressure multiplier so zero-pressure devices
/// still draw visible ink.
pub const MIN_PRESSURE_FACTOR: f32 = 0.35;

/// Fixed footprint of a card on the board.
pub const CARD_WIDTH: f32 = 240.0;
pub const CARD_HEIGHT: f32 = 160.0;

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Helper to parse a single hex digit.
fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a hex color string: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`.
    /// The string may optionally start with `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        let channel = |hi: u8, lo: u8| -> Option<f32> {
            Some((hex_val(hi)? << 4 | hex_val(lo)?) as f32 / 255.0)
        };
        let short = |c: u8| -> Option<f32> { Some((hex_val(c)? * 17) as f32 / 255.0) };

        match bytes.len() {
            3 => Some(Self::rgba(
                short(bytes[0])?,
                short(bytes[1])?,
                short(bytes[2])?,
                1.0,
            )),
            4 => Some(Self::rgba(
                short(bytes[0])?,
                short(bytes[1])?,
                short(bytes[2])?,
                short(bytes[3])?,
            )),
            6 => Some(Self::rgba(
                channel(bytes[0], bytes[1])?,
                channel(bytes[2], bytes[3])?,
                channel(bytes[4], bytes[5])?,
                1.0,
            )),
            8 => Some(Self::rgba(
                channel(bytes[0], bytes[1])?,
                channel(bytes[2], bytes[3])?,
                channel(bytes[4], bytes[5])?,
                channel(bytes[6], bytes[7])?,
            )),
            _ => None,
        }
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let r = (self.r * 255.0).round() as u8;
        let g = (self.g * 255.0).round() as u8;
        let b = (self.b * 255.0).round() as u8;
        let a = (self.a * 255.0).round() as u8;
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid hex color `{s}`")))
    }
}

// ─── Geometry ────────────────────────────────────────────────────────────

/// Axis-aligned rectangle in world space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// AABB overlap test.
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    /// Grow the rectangle by `margin` on every side.
    pub fn inflate(&self, margin: f32) -> Bounds {
        Bounds::new(
            self.x - margin,
            self.y - margin,
            self.width + margin * 2.0,
            self.height + margin * 2.0,
        )
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Bounds) -> Bounds {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = (self.x + self.width).max(other.x + other.width);
        let bottom = (self.y + self.height).max(other.y + other.height);
        Bounds::new(x, y, right - x, bottom - y)
    }
}

/// Squared euclidean distance. Hit tests compare against `radius²`
/// so no square root is taken on the hot path.
#[inline]
pub fn dist_sq(ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    let dx = ax - bx;
    let dy = ay - by;
    dx * dx + dy * dy
}

// ─── Ink ─────────────────────────────────────────────────────────────────

fn default_pressure() -> f32 {
    DEFAULT_PRESSURE
}

/// A sampled ink point. Pressure is in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    #[serde(default = "default_pressure")]
    pub pressure: f32,
}

impl Point {
    /// A point with the default pressure.
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            pressure: DEFAULT_PRESSURE,
        }
    }

    /// A point with device pressure, if reported. Out-of-range values are
    /// clamped; missing or non-finite values fall back to the default.
    pub fn with_pressure(x: f32, y: f32, pressure: Option<f32>) -> Self {
        let pressure = match pressure {
            Some(p) if p.is_finite() => p.clamp(0.0, 1.0),
            _ => DEFAULT_PRESSURE,
        };
        Self { x, y, pressure }
    }
}

/// A free-hand ink stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub id: ElementId,
    pub color: Color,
    /// Base width; see [`Stroke::rendered_width`].
    pub width: f32,
    pub points: Vec<Point>,
}

impl Stroke {
    pub fn new(id: ElementId, color: Color, width: f32, points: Vec<Point>) -> Self {
        Self {
            id,
            color,
            width,
            points,
        }
    }

    /// Base width scaled by the average pressure, floored at
    /// [`MIN_PRESSURE_FACTOR`].
    pub fn rendered_width(&self) -> f32 {
        let avg = if self.points.is_empty() {
            DEFAULT_PRESSURE
        } else {
            self.points.iter().map(|p| p.pressure).sum::<f32>() / self.points.len() as f32
        };
        self.width * avg.max(MIN_PRESSURE_FACTOR)
    }

    /// True if any point lies within `radius` of `(cx, cy)`.
    pub fn touches(&self, cx: f32, cy: f32, radius: f32) -> bool {
        let r2 = radius * radius;
        self.points
            .iter()
            .any(|p| dist_sq(p.x, p.y, cx, cy) <= r2)
    }

    /// Squared distance from `(cx, cy)` to the nearest sampled point.
    pub fn nearest_dist_sq(&self, cx: f32, cy: f32) -> Option<f32> {
        self.points
            .iter()
            .map(|p| dist_sq(p.x, p.y, cx, cy))
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Bounding box of the sampled points.
    pub fn bounds(&self) -> Option<Bounds> {
        let first = self.points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &self.points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Bounds::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }
}

// ─── Anchors ─────────────────────────────────────────────────────────────

/// A free-form sticky note. May embed its own private doodle strokes,
/// stored in card-local coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: ElementId,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doodle: Option<Vec<Stroke>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<ElementId>,
}

impl Card {
    pub fn new(id: ElementId, x: f32, y: f32) -> Self {
        Self {
            id,
            x,
            y,
            title: String::new(),
            content: String::new(),
            doodle: None,
            media_url: None,
            group_id: None,
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, CARD_WIDTH, CARD_HEIGHT)
    }
}

/// The shape a flow node is drawn as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowShape {
    #[default]
    Box,
    Diamond,
    Ellipse,
}

impl FlowShape {
    /// The next shape in the box → diamond → ellipse cycle.
    pub fn next(self) -> Self {
        match self {
            FlowShape::Box => FlowShape::Diamond,
            FlowShape::Diamond => FlowShape::Ellipse,
            FlowShape::Ellipse => FlowShape::Box,
        }
    }
}

/// A resizable diagram node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowNode {
    pub id: ElementId,
    #[serde(rename = "type", default)]
    pub shape: FlowShape,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<ElementId>,
}

impl FlowNode {
    pub fn new(id: ElementId, shape: FlowShape, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            id,
            shape,
            x,
            y,
            width,
            height,
            text: String::new(),
            group_id: None,
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.width, self.height)
    }
}

/// Which collection an [`AnchorRef`] points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorKind {
    Card,
    Flow,
}

/// A polymorphic reference to a card or a flow node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnchorRef {
    #[serde(rename = "type")]
    pub kind: AnchorKind,
    pub id: ElementId,
}

impl AnchorRef {
    pub fn card(id: ElementId) -> Self {
        Self {
            kind: AnchorKind::Card,
            id,
        }
    }

    pub fn flow(id: ElementId) -> Self {
        Self {
            kind: AnchorKind::Flow,
            id,
        }
    }
}

/// The rectangle and group tag an anchor resolves to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorBounds {
    pub bounds: Bounds,
    pub group_id: Option<ElementId>,
}

/// A connection between two anchors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: ElementId,
    pub from: AnchorRef,
    pub to: AnchorRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<ElementId>,
}

impl Edge {
    pub fn new(id: ElementId, from: AnchorRef, to: AnchorRef) -> Self {
        Self {
            id,
            from,
            to,
            label: None,
            group_id: None,
        }
    }

    /// True if either endpoint refers to `anchor`.
    pub fn touches(&self, anchor: &AnchorRef) -> bool {
        self.from == *anchor || self.to == *anchor
    }
}

// ─── Board ───────────────────────────────────────────────────────────────

/// The complete mutable board content. This is the unit of undo/redo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardState {
    #[serde(default)]
    pub cards: Vec<Card>,
    #[serde(default)]
    pub flow_nodes: Vec<FlowNode>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub strokes: Vec<Stroke>,
}

impl BoardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
            && self.flow_nodes.is_empty()
            && self.edges.is_empty()
            && self.strokes.is_empty()
    }

    pub fn card(&self, id: ElementId) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn card_mut(&mut self, id: ElementId) -> Option<&mut Card> {
        self.cards.iter_mut().find(|c| c.id == id)
    }

    pub fn flow_node(&self, id: ElementId) -> Option<&FlowNode> {
        self.flow_nodes.iter().find(|n| n.id == id)
    }

    pub fn flow_node_mut(&mut self, id: ElementId) -> Option<&mut FlowNode> {
        self.flow_nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn edge(&self, id: ElementId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn edge_mut(&mut self, id: ElementId) -> Option<&mut Edge> {
        self.edges.iter_mut().find(|e| e.id == id)
    }

    pub fn stroke(&self, id: ElementId) -> Option<&Stroke> {
        self.strokes.iter().find(|s| s.id == id)
    }

    /// Bounding box of every card, flow node, and stroke.
    pub fn content_bounds(&self) -> Option<Bounds> {
        self.cards
            .iter()
            .map(Card::bounds)
            .chain(self.flow_nodes.iter().map(FlowNode::bounds))
            .chain(self.strokes.iter().filter_map(Stroke::bounds))
            .reduce(|a, b| a.union(&b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_hex_roundtrip() {
        let c = Color::from_hex("#6C5CE7").unwrap();
        assert_eq!(c.to_hex(), "#6C5CE7");

        let c2 = Color::from_hex("#FF000080").unwrap();
        assert!((c2.a - 128.0 / 255.0).abs() < 0.01);
        assert_eq!(c2.to_hex().len(), 9);

        assert_eq!(Color::from_hex("#fff").unwrap().to_hex(), "#FFFFFF");
        assert!(Color::from_hex("#12").is_none());
        assert!(Color::from_hex("#GGGGGG").is_none());
    }

    #[test]
    fn rendered_width_scales_with_pressure() {
        let id = ElementId::intern("s");
        let black = Color::rgba(0.0, 0.0, 0.0, 1.0);
        let firm = Stroke::new(id, black, 4.0, vec![Point::with_pressure(0.0, 0.0, Some(1.0))]);
        assert!((firm.rendered_width() - 4.0).abs() < 1e-6);

        let light = Stroke::new(id, black, 4.0, vec![Point::with_pressure(0.0, 0.0, Some(0.5))]);
        assert!((light.rendered_width() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn zero_pressure_is_floored() {
        let s = Stroke::new(
            ElementId::intern("s0"),
            Color::rgba(0.0, 0.0, 0.0, 1.0),
            10.0,
            vec![
                Point::with_pressure(0.0, 0.0, Some(0.0)),
                Point::with_pressure(1.0, 0.0, Some(0.0)),
            ],
        );
        assert!((s.rendered_width() - 3.5).abs() < 1e-6);
    }

    #[test]
    fn missing_pressure_defaults() {
        assert_eq!(Point::with_pressure(1.0, 2.0, None).pressure, DEFAULT_PRESSURE);
        assert_eq!(Point::with_pressure(1.0, 2.0, Some(f32::NAN)).pressure, DEFAULT_PRESSURE);
        assert_eq!(Point::with_pressure(1.0, 2.0, Some(3.0)).pressure, 1.0);

        let p: Point = serde_json::from_str(r#"{"x":1,"y":2}"#).unwrap();
        assert_eq!(p.pressure, DEFAULT_PRESSURE);
    }

    #[test]
    fn flow_node_serializes_shape_as_type() {
        let node = FlowNode::new(
            ElementId::intern("f1"),
            FlowShape::Diamond,
            0.0,
            0.0,
            120.0,
            80.0,
        );
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "diamond");
        assert!(json.get("groupId").is_none());
    }

    #[test]
    fn anchor_ref_json_shape() {
        let a = AnchorRef::card(ElementId::intern("c1"));
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, r#"{"type":"card","id":"c1"}"#);
    }

    #[test]
    fn content_bounds_covers_everything() {
        let mut state = BoardState::new();
        assert!(state.content_bounds().is_none());
        state.cards.push(Card::new(ElementId::intern("c"), 0.0, 0.0));
        state.strokes.push(Stroke::new(
            ElementId::intern("s"),
            Color::rgba(0.0, 0.0, 0.0, 1.0),
            2.0,
            vec![Point::new(500.0, 400.0)],
        ));
        let b = state.content_bounds().unwrap();
        assert_eq!(b, Bounds::new(0.0, 0.0, 500.0, 400.0));
    }
}
