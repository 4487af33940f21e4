//! Stroke engine: building ink strokes and erasing them.
//!
//! A stroke is *building* between pointer-down and pointer-up; its points
//! live in a [`StrokeBuilder`] owned by the gesture and only reach the
//! board's collection when the builder is finished.
//!
//! Two erasing policies share one radius:
//!
//! - [`EraseMode::Whole`] deletes any stroke with a point inside the
//!   eraser circle.
//! - [`EraseMode::Trim`] drops only the points inside the circle and
//!   splits each stroke into its surviving runs.

use crate::id::ElementId;
use crate::model::{Color, Point, Stroke, dist_sq};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Which erasing policy the erase tool applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EraseMode {
    /// Delete every stroke the eraser touches.
    #[default]
    Whole,
    /// Cut away only the touched points.
    Trim,
}

impl EraseMode {
    pub fn toggled(self) -> Self {
        match self {
            EraseMode::Whole => EraseMode::Trim,
            EraseMode::Trim => EraseMode::Whole,
        }
    }
}

// ─── Building ────────────────────────────────────────────────────────────

/// An in-progress stroke.
#[derive(Debug, Clone)]
pub struct StrokeBuilder {
    id: ElementId,
    color: Color,
    width: f32,
    points: Vec<Point>,
}

impl StrokeBuilder {
    /// Start a stroke at its first point.
    pub fn begin(id: ElementId, color: Color, width: f32, first: Point) -> Self {
        Self {
            id,
            color,
            width,
            points: vec![first],
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Append a sampled point.
    pub fn extend(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// A read-only view of the stroke so far, for live rendering.
    pub fn preview(&self) -> Stroke {
        Stroke::new(self.id, self.color, self.width, self.points.clone())
    }

    /// Finish the stroke. A single-point stroke is kept as a dot.
    pub fn finish(self) -> Stroke {
        Stroke::new(self.id, self.color, self.width, self.points)
    }
}

// ─── Erasing ─────────────────────────────────────────────────────────────

/// Remove every stroke with at least one point within `radius` of
/// `(cx, cy)`. Returns the number of strokes removed.
pub fn erase_whole(strokes: &mut Vec<Stroke>, cx: f32, cy: f32, radius: f32) -> usize {
    let before = strokes.len();
    strokes.retain(|s| !s.touches(cx, cy, radius));
    before - strokes.len()
}

/// The stroke whole-stroke erasing would delete first: the one with the
/// nearest point inside the radius. Used for the hover highlight only.
pub fn erase_target(strokes: &[Stroke], cx: f32, cy: f32, radius: f32) -> Option<ElementId> {
    let r2 = radius * radius;
    strokes
        .iter()
        .filter_map(|s| s.nearest_dist_sq(cx, cy).map(|d| (s.id, d)))
        .filter(|(_, d)| *d <= r2)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

/// Split one stroke around the eraser circle.
///
/// Returns `None` when no point is inside the circle (the stroke is
/// untouched and keeps its identity). Otherwise returns the surviving
/// runs of two or more points, each as a new stroke with a fresh id
/// and the original color and width. Shorter runs are discarded.
pub fn trim_stroke(
    stroke: &Stroke,
    cx: f32,
    cy: f32,
    radius: f32,
) -> Option<SmallVec<[Stroke; 2]>> {
    let r2 = radius * radius;
    if !stroke
        .points
        .iter()
        .any(|p| dist_sq(p.x, p.y, cx, cy) <= r2)
    {
        return None;
    }

    let mut pieces: SmallVec<[Stroke; 2]> = SmallVec::new();
    let mut run: Vec<Point> = Vec::new();
    let flush = |run: &mut Vec<Point>, pieces: &mut SmallVec<[Stroke; 2]>| {
        if run.len() >= 2 {
            pieces.push(Stroke::new(
                ElementId::fresh("stroke"),
                stroke.color,
                stroke.width,
                std::mem::take(run),
            ));
        } else {
            run.clear();
        }
    };

    for p in &stroke.points {
        if dist_sq(p.x, p.y, cx, cy) <= r2 {
            flush(&mut run, &mut pieces);
        } else {
            run.push(*p);
        }
    }
    flush(&mut run, &mut pieces);
    Some(pieces)
}

/// Apply [`trim_stroke`] to every stroke, preserving order: split strokes
/// are replaced in place by their surviving pieces. Returns true if any
/// stroke was touched.
pub fn erase_trim(strokes: &mut Vec<Stroke>, cx: f32, cy: f32, radius: f32) -> bool {
    let mut changed = false;
    let mut out = Vec::with_capacity(strokes.len());
    for stroke in strokes.drain(..) {
        match trim_stroke(&stroke, cx, cy, radius) {
            Some(pieces) => {
                changed = true;
                out.extend(pieces);
            }
            None => out.push(stroke),
        }
    }
    *strokes = out;
    changed
}

/// Erase at one pointer position with the given policy.
pub fn erase_at(strokes: &mut Vec<Stroke>, mode: EraseMode, cx: f32, cy: f32, radius: f32) -> bool {
    let changed = match mode {
        EraseMode::Whole => erase_whole(strokes, cx, cy, radius) > 0,
        EraseMode::Trim => erase_trim(strokes, cx, cy, radius),
    };
    if changed {
        log::trace!("erase {mode:?} at ({cx:.1}, {cy:.1}) r={radius:.1}");
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn black() -> Color {
        Color::rgba(0.0, 0.0, 0.0, 1.0)
    }

    fn line(id: &str, xs: &[f32]) -> Stroke {
        Stroke::new(
            ElementId::intern(id),
            black(),
            3.0,
            xs.iter().map(|x| Point::new(*x, 0.0)).collect(),
        )
    }

    #[test]
    fn builder_accumulates_points() {
        let mut b = StrokeBuilder::begin(ElementId::intern("b1"), black(), 2.0, Point::new(0.0, 0.0));
        b.extend(Point::new(1.0, 1.0));
        b.extend(Point::new(2.0, 2.0));
        assert_eq!(b.points().len(), 3);
        let stroke = b.finish();
        assert_eq!(stroke.id, ElementId::intern("b1"));
        assert_eq!(stroke.points.len(), 3);
    }

    #[test]
    fn single_point_stroke_is_kept_as_dot() {
        let b = StrokeBuilder::begin(ElementId::intern("dot"), black(), 2.0, Point::new(5.0, 5.0));
        assert_eq!(b.finish().points.len(), 1);
    }

    #[test]
    fn whole_erase_radius_boundary() {
        let mut strokes = vec![line("dot", &[0.0])];
        assert_eq!(erase_whole(&mut strokes, 5.0, 0.0, 4.0), 0);
        assert_eq!(strokes.len(), 1);
        assert_eq!(erase_whole(&mut strokes, 5.0, 0.0, 10.0), 1);
        assert!(strokes.is_empty());
    }

    #[test]
    fn erase_target_picks_nearest_without_mutating() {
        let strokes = vec![line("far", &[0.0, 8.0]), line("near", &[10.0, 11.0])];
        let target = erase_target(&strokes, 12.0, 0.0, 10.0);
        assert_eq!(target, Some(ElementId::intern("near")));
        assert_eq!(strokes.len(), 2);
        assert_eq!(erase_target(&strokes, 500.0, 0.0, 10.0), None);
    }

    #[test]
    fn trim_middle_splits_in_two() {
        let stroke = line("five", &[0.0, 10.0, 20.0, 30.0, 40.0]);
        let pieces = trim_stroke(&stroke, 20.0, 0.0, 5.0).unwrap();
        assert_eq!(pieces.len(), 2);
        for piece in &pieces {
            assert!(piece.points.len() >= 2);
            assert_ne!(piece.id, stroke.id);
            assert_eq!(piece.color, stroke.color);
            assert_eq!(piece.width, stroke.width);
        }
        assert_eq!(pieces[0].points[1].x, 10.0);
        assert_eq!(pieces[1].points[0].x, 30.0);
    }

    #[test]
    fn trim_endpoint_leaves_at_most_one() {
        let stroke = line("five", &[0.0, 10.0, 20.0, 30.0, 40.0]);
        let pieces = trim_stroke(&stroke, 0.0, 0.0, 5.0).unwrap();
        assert!(pieces.len() <= 1);
        assert_eq!(pieces[0].points.len(), 4);
    }

    #[test]
    fn trim_discards_short_runs() {
        let stroke = line("three", &[0.0, 10.0, 20.0]);
        let pieces = trim_stroke(&stroke, 10.0, 0.0, 5.0).unwrap();
        assert!(pieces.is_empty());
    }

    #[test]
    fn trim_untouched_stroke_keeps_identity() {
        let mut strokes = vec![line("a", &[0.0, 10.0]), line("b", &[100.0, 110.0, 120.0])];
        assert!(erase_trim(&mut strokes, 110.0, 0.0, 2.0));
        assert_eq!(strokes[0].id, ElementId::intern("a"));
        // "b" had only two surviving single-point runs; both dropped.
        assert_eq!(strokes.len(), 1);

        assert!(!erase_trim(&mut strokes, 1000.0, 0.0, 2.0));
        assert_eq!(strokes.len(), 1);
    }

    #[test]
    fn erase_at_dispatches_on_mode() {
        let mut strokes = vec![line("m", &[0.0, 10.0, 20.0, 30.0, 40.0])];
        assert!(erase_at(&mut strokes, EraseMode::Trim, 20.0, 0.0, 5.0));
        assert_eq!(strokes.len(), 2);
        assert!(erase_at(&mut strokes, EraseMode::Whole, 0.0, 0.0, 5.0));
        assert_eq!(strokes.len(), 1);
    }
}
