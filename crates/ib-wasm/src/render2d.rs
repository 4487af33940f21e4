//! Canvas2D software renderer.
//!
//! Replays the world-space display list from `ib-render` onto an HTML
//! `<canvas>` through `CanvasRenderingContext2d`, with the camera applied
//! as one transform. The minimap is painted separately in its own pixels.

use ib_core::minimap::{MinimapItem, MinimapLayout};
use ib_core::model::{Bounds, Color, FlowShape};
use ib_core::transform::Camera;
use ib_render::DrawCmd;
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

/// Theme-dependent colors for the canvas renderer.
pub struct CanvasTheme {
    pub bg: &'static str,
    pub grid: &'static str,
    pub card_bg: &'static str,
    pub card_border: &'static str,
    pub flow_bg: &'static str,
    pub text: &'static str,
    pub muted_text: &'static str,
    pub edge: &'static str,
    pub selection: &'static str,
    pub erase_highlight: &'static str,
    pub minimap_bg: &'static str,
    pub minimap_viewport: &'static str,
}

impl CanvasTheme {
    pub fn light() -> Self {
        Self {
            bg: "#F5F5F7",
            grid: "rgba(0, 0, 0, 0.05)",
            card_bg: "#FFFFFF",
            card_border: "#D1D1D6",
            flow_bg: "#FFFFFF",
            text: "#1C1C1E",
            muted_text: "#86868B",
            edge: "#6B7080",
            selection: "#4FC3F7",
            erase_highlight: "rgba(255, 59, 48, 0.35)",
            minimap_bg: "rgba(255, 255, 255, 0.92)",
            minimap_viewport: "rgba(79, 195, 247, 0.9)",
        }
    }

    pub fn dark() -> Self {
        Self {
            bg: "#1C1C1E",
            grid: "rgba(255, 255, 255, 0.04)",
            card_bg: "#2C2C2E",
            card_border: "#48484A",
            flow_bg: "#2C2C2E",
            text: "#F2F2F7",
            muted_text: "#98989D",
            edge: "#8E8E93",
            selection: "#4FC3F7",
            erase_highlight: "rgba(255, 69, 58, 0.4)",
            minimap_bg: "rgba(28, 28, 30, 0.92)",
            minimap_viewport: "rgba(79, 195, 247, 0.9)",
        }
    }
}

const CARD_RADIUS: f64 = 10.0;
const ACCENT_BAR: f64 = 6.0;

/// Paint the whole board: background, grid, then the display list under
/// the camera transform.
pub fn render_board(
    ctx: &CanvasRenderingContext2d,
    cmds: &[DrawCmd],
    camera: &Camera,
    canvas_width: f64,
    canvas_height: f64,
    theme: &CanvasTheme,
) {
    let _ = ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
    ctx.set_fill_style_str(theme.bg);
    ctx.fill_rect(0.0, 0.0, canvas_width, canvas_height);
    draw_grid(ctx, camera, canvas_width, canvas_height, theme);

    let zoom = camera.zoom() as f64;
    ctx.save();
    let _ = ctx.set_transform(
        zoom,
        0.0,
        0.0,
        zoom,
        camera.pan.x as f64,
        camera.pan.y as f64,
    );
    for cmd in cmds {
        draw_cmd(ctx, cmd, zoom, theme);
    }
    ctx.restore();
}

fn draw_cmd(ctx: &CanvasRenderingContext2d, cmd: &DrawCmd, zoom: f64, theme: &CanvasTheme) {
    match cmd {
        DrawCmd::Ink {
            points,
            color,
            width,
            highlighted,
        } => {
            if *highlighted {
                draw_polyline(ctx, points, theme.erase_highlight, *width as f64 + 8.0);
            }
            draw_polyline(ctx, points, &css(color), *width as f64);
        }
        DrawCmd::Edge {
            from,
            to,
            label,
            accent,
        } => {
            let color = accent.as_ref().map(css);
            draw_edge(ctx, *from, *to, color.as_deref().unwrap_or(theme.edge));
            if let Some(label) = label {
                draw_edge_label(ctx, *from, *to, label, theme);
            }
        }
        DrawCmd::Card {
            bounds,
            title,
            content,
            media_url,
            accent,
            selected,
            hovered,
        } => draw_card(
            ctx,
            bounds,
            title,
            content,
            media_url.as_deref(),
            accent.as_ref(),
            *selected || *hovered,
            theme,
        ),
        DrawCmd::Flow {
            bounds,
            shape,
            text,
            accent,
            selected,
            hovered,
        } => draw_flow(
            ctx,
            bounds,
            *shape,
            text,
            accent.as_ref(),
            *selected || *hovered,
            theme,
        ),
        DrawCmd::ResizeHandle { bounds } => {
            ctx.set_fill_style_str(theme.selection);
            ctx.fill_rect(
                bounds.x as f64,
                bounds.y as f64,
                bounds.width as f64,
                bounds.height as f64,
            );
        }
        DrawCmd::Elastic { from, to } => {
            ctx.save();
            set_dash(ctx, &[6.0 / zoom, 4.0 / zoom]);
            draw_edge(ctx, *from, *to, theme.selection);
            ctx.restore();
        }
        DrawCmd::Eraser { center, radius } => {
            ctx.save();
            ctx.set_stroke_style_str(theme.muted_text);
            ctx.set_line_width(1.0 / zoom);
            ctx.begin_path();
            let _ = ctx.arc(
                center.0 as f64,
                center.1 as f64,
                *radius as f64,
                0.0,
                std::f64::consts::TAU,
            );
            ctx.stroke();
            ctx.restore();
        }
    }
}

// ─── Drawing primitives ─────────────────────────────────────────────────

fn draw_polyline(ctx: &CanvasRenderingContext2d, points: &[(f32, f32)], color: &str, width: f64) {
    let Some(&(x0, y0)) = points.first() else {
        return;
    };
    ctx.save();
    if points.len() == 1 {
        // A tap is a dot.
        ctx.set_fill_style_str(color);
        ctx.begin_path();
        let _ = ctx.arc(
            x0 as f64,
            y0 as f64,
            (width / 2.0).max(0.5),
            0.0,
            std::f64::consts::TAU,
        );
        ctx.fill();
    } else {
        ctx.set_stroke_style_str(color);
        ctx.set_line_width(width);
        ctx.set_line_cap("round");
        ctx.set_line_join("round");
        ctx.begin_path();
        ctx.move_to(x0 as f64, y0 as f64);
        for &(x, y) in &points[1..] {
            ctx.line_to(x as f64, y as f64);
        }
        ctx.stroke();
    }
    ctx.restore();
}

fn draw_edge(ctx: &CanvasRenderingContext2d, from: (f32, f32), to: (f32, f32), color: &str) {
    ctx.set_stroke_style_str(color);
    ctx.set_line_width(2.0);
    ctx.begin_path();
    ctx.move_to(from.0 as f64, from.1 as f64);
    ctx.line_to(to.0 as f64, to.1 as f64);
    ctx.stroke();
}

fn draw_edge_label(
    ctx: &CanvasRenderingContext2d,
    from: (f32, f32),
    to: (f32, f32),
    label: &str,
    theme: &CanvasTheme,
) {
    let mx = (from.0 + to.0) as f64 / 2.0;
    let my = (from.1 + to.1) as f64 / 2.0;
    ctx.save();
    ctx.set_font("12px Inter, system-ui, sans-serif");
    let w = ctx.measure_text(label).map(|m| m.width()).unwrap_or(0.0);
    ctx.set_fill_style_str(theme.bg);
    ctx.fill_rect(mx - w / 2.0 - 4.0, my - 9.0, w + 8.0, 18.0);
    ctx.set_fill_style_str(theme.text);
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    let _ = ctx.fill_text(label, mx, my);
    ctx.restore();
}

#[allow(clippy::too_many_arguments)]
fn draw_card(
    ctx: &CanvasRenderingContext2d,
    b: &Bounds,
    title: &str,
    content: &str,
    media_url: Option<&str>,
    accent: Option<&Color>,
    outlined: bool,
    theme: &CanvasTheme,
) {
    let (x, y, w, h) = (b.x as f64, b.y as f64, b.width as f64, b.height as f64);
    ctx.save();

    ctx.set_shadow_color("rgba(0, 0, 0, 0.08)");
    ctx.set_shadow_blur(8.0);
    ctx.set_shadow_offset_y(2.0);
    rounded_rect_path(ctx, x, y, w, h, CARD_RADIUS);
    ctx.set_fill_style_str(theme.card_bg);
    ctx.fill();
    ctx.set_shadow_color("transparent");

    ctx.set_stroke_style_str(if outlined { theme.selection } else { theme.card_border });
    ctx.set_line_width(if outlined { 2.0 } else { 1.0 });
    ctx.stroke();

    if let Some(accent) = accent {
        ctx.save();
        rounded_rect_path(ctx, x, y, w, h, CARD_RADIUS);
        ctx.clip();
        ctx.set_fill_style_str(&css(accent));
        ctx.fill_rect(x, y, w, ACCENT_BAR);
        ctx.restore();
    }

    let pad = 12.0;
    ctx.set_text_baseline("top");
    ctx.set_text_align("left");
    ctx.set_fill_style_str(theme.text);
    ctx.set_font("600 14px Inter, system-ui, sans-serif");
    let title = if title.is_empty() { "Untitled" } else { title };
    let _ = ctx.fill_text_with_max_width(title, x + pad, y + pad + ACCENT_BAR, w - pad * 2.0);

    ctx.set_font("13px Inter, system-ui, sans-serif");
    ctx.set_fill_style_str(theme.muted_text);
    let line_height = 18.0;
    let mut ty = y + pad + ACCENT_BAR + 24.0;
    for line in content.lines() {
        if ty + line_height > y + h - pad {
            break;
        }
        let _ = ctx.fill_text_with_max_width(line, x + pad, ty, w - pad * 2.0);
        ty += line_height;
    }

    if let Some(url) = media_url {
        ctx.set_font("11px Inter, system-ui, sans-serif");
        ctx.set_text_baseline("bottom");
        let _ = ctx.fill_text_with_max_width(url, x + pad, y + h - pad / 2.0, w - pad * 2.0);
    }

    ctx.restore();
}

fn draw_flow(
    ctx: &CanvasRenderingContext2d,
    b: &Bounds,
    shape: FlowShape,
    text: &str,
    accent: Option<&Color>,
    outlined: bool,
    theme: &CanvasTheme,
) {
    let (x, y, w, h) = (b.x as f64, b.y as f64, b.width as f64, b.height as f64);
    let (cx, cy) = (x + w / 2.0, y + h / 2.0);
    ctx.save();

    ctx.begin_path();
    match shape {
        FlowShape::Box => rounded_rect_path(ctx, x, y, w, h, 6.0),
        FlowShape::Diamond => {
            ctx.move_to(cx, y);
            ctx.line_to(x + w, cy);
            ctx.line_to(cx, y + h);
            ctx.line_to(x, cy);
            ctx.close_path();
        }
        FlowShape::Ellipse => {
            let _ = ctx.ellipse(cx, cy, w / 2.0, h / 2.0, 0.0, 0.0, std::f64::consts::TAU);
        }
    }
    ctx.set_fill_style_str(theme.flow_bg);
    ctx.fill();

    let accent = accent.map(css);
    let border = if outlined {
        theme.selection
    } else {
        accent.as_deref().unwrap_or(theme.card_border)
    };
    ctx.set_stroke_style_str(border);
    ctx.set_line_width(if outlined || accent.is_some() { 2.0 } else { 1.0 });
    ctx.stroke();

    if !text.is_empty() {
        ctx.set_fill_style_str(theme.text);
        ctx.set_font("13px Inter, system-ui, sans-serif");
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        let _ = ctx.fill_text_with_max_width(text, cx, cy, w * 0.8);
    }

    ctx.restore();
}

fn draw_grid(
    ctx: &CanvasRenderingContext2d,
    camera: &Camera,
    width: f64,
    height: f64,
    theme: &CanvasTheme,
) {
    ctx.set_fill_style_str(theme.grid);
    let spacing = 20.0 * camera.zoom() as f64;
    let mut x = (camera.pan.x as f64).rem_euclid(spacing);
    while x < width {
        let mut y = (camera.pan.y as f64).rem_euclid(spacing);
        while y < height {
            ctx.fill_rect(x, y, 1.0, 1.0);
            y += spacing;
        }
        x += spacing;
    }
}

// ─── Minimap ─────────────────────────────────────────────────────────────

/// Paint the minimap into its own canvas (minimap pixels).
pub fn render_minimap(ctx: &CanvasRenderingContext2d, layout: &MinimapLayout, theme: &CanvasTheme) {
    let (w, h) = (layout.width as f64, layout.height as f64);
    let _ = ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
    ctx.clear_rect(0.0, 0.0, w, h);
    ctx.set_fill_style_str(theme.minimap_bg);
    ctx.fill_rect(0.0, 0.0, w, h);

    ctx.save();
    ctx.begin_path();
    ctx.rect(0.0, 0.0, w, h);
    ctx.clip();

    for item in &layout.items {
        match item {
            MinimapItem::Stroke { color, points } => {
                draw_polyline(ctx, points, &css(color), 1.0);
            }
            MinimapItem::Edge { from, to, accent } => {
                let color = accent.as_ref().map(css);
                ctx.set_line_width(1.0);
                ctx.set_stroke_style_str(color.as_deref().unwrap_or(theme.edge));
                ctx.begin_path();
                ctx.move_to(from.0 as f64, from.1 as f64);
                ctx.line_to(to.0 as f64, to.1 as f64);
                ctx.stroke();
            }
            MinimapItem::Card { bounds, accent } => {
                let color = accent.as_ref().map(css);
                fill_bounds(ctx, bounds, color.as_deref().unwrap_or(theme.card_border));
            }
            MinimapItem::Flow {
                bounds,
                shape: _,
                accent,
            } => {
                let color = accent.as_ref().map(css);
                fill_bounds(ctx, bounds, color.as_deref().unwrap_or(theme.muted_text));
            }
        }
    }

    let v = &layout.viewport;
    ctx.set_stroke_style_str(theme.minimap_viewport);
    ctx.set_line_width(1.5);
    ctx.stroke_rect(v.x as f64, v.y as f64, v.width as f64, v.height as f64);
    ctx.restore();
}

fn fill_bounds(ctx: &CanvasRenderingContext2d, b: &Bounds, color: &str) {
    ctx.set_fill_style_str(color);
    ctx.fill_rect(
        b.x as f64,
        b.y as f64,
        (b.width as f64).max(1.0),
        (b.height as f64).max(1.0),
    );
}

// ─── Helpers ─────────────────────────────────────────────────────────────

fn rounded_rect_path(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
    let r = r.min(w / 2.0).min(h / 2.0);
    ctx.begin_path();
    ctx.move_to(x + r, y);
    ctx.line_to(x + w - r, y);
    ctx.arc_to(x + w, y, x + w, y + r, r).unwrap_or(());
    ctx.line_to(x + w, y + h - r);
    ctx.arc_to(x + w, y + h, x + w - r, y + h, r).unwrap_or(());
    ctx.line_to(x + r, y + h);
    ctx.arc_to(x, y + h, x, y + h - r, r).unwrap_or(());
    ctx.line_to(x, y + r);
    ctx.arc_to(x, y, x + r, y, r).unwrap_or(());
    ctx.close_path();
}

fn set_dash(ctx: &CanvasRenderingContext2d, segments: &[f64]) {
    let array = js_sys::Array::new();
    for s in segments {
        array.push(&JsValue::from_f64(*s));
    }
    let _ = ctx.set_line_dash(&array);
}

/// CSS `rgba()` for a model color.
pub(crate) fn css(c: &Color) -> String {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "rgba({}, {}, {}, {})",
        channel(c.r),
        channel(c.g),
        channel(c.b),
        c.a.clamp(0.0, 1.0)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_from_hex() {
        let c = Color::from_hex("#FF8000").unwrap();
        assert_eq!(css(&c), "rgba(255, 128, 0, 1)");
    }
}
