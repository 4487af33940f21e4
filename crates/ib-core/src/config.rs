//! Board configuration.
//!
//! Every field has a default, so hosts may pass a partial JSON object
//! (`{"historyLimit": 80}`) and inherit the rest.

use crate::model::Color;
use serde::Deserialize;
use thiserror::Error;

/// The fixed accent palette groups draw their colors from.
pub const DEFAULT_PALETTE: [&str; 8] = [
    "#F59E0B", "#10B981", "#3B82F6", "#EF4444", "#8B5CF6", "#EC4899", "#14B8A6", "#F97316",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid board config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Tunables for the board engine, tools, and minimap.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoardConfig {
    /// Maximum number of retained history snapshots.
    pub history_limit: usize,

    pub zoom_min: f32,
    pub zoom_max: f32,
    /// Zoom in/out increment.
    pub zoom_step: f32,

    pub eraser_radius_min: f32,
    pub eraser_radius_max: f32,
    /// Initial eraser radius, shared by both erase modes.
    pub eraser_radius: f32,
    pub eraser_radius_step: f32,

    /// Resize floor for flow nodes.
    pub flow_min_width: f32,
    pub flow_min_height: f32,
    pub flow_default_width: f32,
    pub flow_default_height: f32,

    pub stroke_color: Color,
    pub stroke_width: f32,

    pub palette: Vec<Color>,

    /// World units per minimap pixel.
    pub minimap_scale: f32,
    pub minimap_width: f32,
    pub minimap_height: f32,
    /// A minimap click only recenters when a card or stroke lies within
    /// this many world units of the clicked point.
    pub minimap_proximity: f32,

    /// Side of the square resize handle at a flow node's bottom-right corner.
    pub resize_handle_size: f32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            history_limit: 50,
            zoom_min: 0.5,
            zoom_max: 1.8,
            zoom_step: 0.1,
            eraser_radius_min: 4.0,
            eraser_radius_max: 80.0,
            eraser_radius: 18.0,
            eraser_radius_step: 2.0,
            flow_min_width: 120.0,
            flow_min_height: 80.0,
            flow_default_width: 160.0,
            flow_default_height: 96.0,
            stroke_color: Color::rgba(31.0 / 255.0, 41.0 / 255.0, 55.0 / 255.0, 1.0),
            stroke_width: 3.0,
            palette: default_palette(),
            minimap_scale: 12.0,
            minimap_width: 200.0,
            minimap_height: 140.0,
            minimap_proximity: 240.0,
            resize_handle_size: 14.0,
        }
    }
}

fn default_palette() -> Vec<Color> {
    DEFAULT_PALETTE
        .iter()
        .filter_map(|hex| Color::from_hex(hex))
        .collect()
}

impl BoardConfig {
    /// Parse a (possibly partial) JSON config and normalize it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: BoardConfig = serde_json::from_str(json)?;
        Ok(config.normalized())
    }

    /// Repair inconsistent values instead of rejecting them: swapped
    /// ranges are reordered, the initial radius is clamped into its range,
    /// and an empty palette falls back to the default one.
    pub fn normalized(mut self) -> Self {
        if self.zoom_min > self.zoom_max {
            std::mem::swap(&mut self.zoom_min, &mut self.zoom_max);
        }
        if self.zoom_min <= 0.0 {
            self.zoom_min = Self::default().zoom_min;
        }
        if self.eraser_radius_min > self.eraser_radius_max {
            std::mem::swap(&mut self.eraser_radius_min, &mut self.eraser_radius_max);
        }
        self.eraser_radius = self.clamp_eraser_radius(self.eraser_radius);
        if self.palette.is_empty() {
            self.palette = default_palette();
        }
        if self.history_limit == 0 {
            self.history_limit = 1;
        }
        if self.minimap_scale <= 0.0 {
            self.minimap_scale = Self::default().minimap_scale;
        }
        self
    }

    pub fn clamp_eraser_radius(&self, radius: f32) -> f32 {
        radius.clamp(self.eraser_radius_min, self.eraser_radius_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = BoardConfig::from_json(r#"{"historyLimit": 80}"#).unwrap();
        assert_eq!(config.history_limit, 80);
        assert_eq!(config.zoom_max, 1.8);
        assert_eq!(config.palette.len(), DEFAULT_PALETTE.len());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(BoardConfig::from_json("{ nope").is_err());
    }

    #[test]
    fn normalizes_swapped_ranges_and_empty_palette() {
        let config =
            BoardConfig::from_json(r#"{"zoomMin": 2.0, "zoomMax": 0.5, "palette": []}"#).unwrap();
        assert_eq!(config.zoom_min, 0.5);
        assert_eq!(config.zoom_max, 2.0);
        assert!(!config.palette.is_empty());
    }

    #[test]
    fn initial_radius_is_clamped() {
        let config = BoardConfig::from_json(r#"{"eraserRadius": 500}"#).unwrap();
        assert_eq!(config.eraser_radius, config.eraser_radius_max);
    }
}
