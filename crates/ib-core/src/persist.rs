//! Persisted board documents and the key-value store they live in.
//!
//! The whole document is written under one key on every committed change;
//! there is no incremental diff. An older layout kept only the strokes
//! array under a separate key, which is still read as a fallback.

use crate::group::GroupTable;
use crate::id::ElementId;
use crate::model::{BoardState, Card, Color, Edge, FlowNode, Stroke};
use crate::transform::Pan;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Key holding the full serialized document.
pub const BOARD_KEY: &str = "ideaboard.board";
/// Legacy key holding a bare strokes array.
pub const LEGACY_STROKES_KEY: &str = "ideaboard.strokes";

fn default_zoom() -> f32 {
    1.0
}

/// The serialized form of a board, including view state and group colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardDocument {
    #[serde(default)]
    pub cards: Vec<Card>,
    #[serde(default)]
    pub flow_nodes: Vec<FlowNode>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    /// `None` when the document predates strokes living in it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strokes: Option<Vec<Stroke>>,
    #[serde(default)]
    pub pan: Pan,
    #[serde(default = "default_zoom")]
    pub zoom_scale: f32,
    #[serde(default)]
    pub group_colors: HashMap<ElementId, Color>,
    #[serde(default)]
    pub palette_cursor: usize,
}

impl Default for BoardDocument {
    fn default() -> Self {
        Self {
            cards: Vec::new(),
            flow_nodes: Vec::new(),
            edges: Vec::new(),
            strokes: Some(Vec::new()),
            pan: Pan::default(),
            zoom_scale: default_zoom(),
            group_colors: HashMap::new(),
            palette_cursor: 0,
        }
    }
}

impl BoardDocument {
    /// Assemble a document from live parts.
    pub fn from_parts(state: &BoardState, groups: &GroupTable, pan: Pan, zoom_scale: f32) -> Self {
        Self {
            cards: state.cards.clone(),
            flow_nodes: state.flow_nodes.clone(),
            edges: state.edges.clone(),
            strokes: Some(state.strokes.clone()),
            pan,
            zoom_scale,
            group_colors: groups.colors().clone(),
            palette_cursor: groups.cursor(),
        }
    }

    /// Split into board content and group table.
    pub fn into_parts(self) -> (BoardState, GroupTable, Pan, f32) {
        let state = BoardState {
            cards: self.cards,
            flow_nodes: self.flow_nodes,
            edges: self.edges,
            strokes: self.strokes.unwrap_or_default(),
        };
        let groups = GroupTable::from_parts(self.group_colors, self.palette_cursor);
        (state, groups, self.pan, self.zoom_scale)
    }

    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a document. Malformed input yields `None`.
    pub fn from_json(json: &str) -> Option<Self> {
        match serde_json::from_str::<BoardDocument>(json) {
            Ok(doc) => Some(doc),
            Err(e) => {
                log::warn!("ignoring malformed board document: {e}");
                None
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to serialize board: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("storage backend rejected write to `{key}`: {reason}")]
    Storage { key: String, reason: String },
}

/// A durable string key-value store.
pub trait BoardStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError>;
}

/// In-memory store for tests and native hosts.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BoardStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Read the board document. Falls back to the legacy strokes key when the
/// document is absent or carries no strokes. Malformed or absent data
/// yields `None`, never an error.
pub fn load(store: &dyn BoardStore) -> Option<BoardDocument> {
    let doc = store
        .get(BOARD_KEY)
        .and_then(|json| BoardDocument::from_json(&json));
    let legacy = || -> Option<Vec<Stroke>> {
        let json = store.get(LEGACY_STROKES_KEY)?;
        match serde_json::from_str::<Vec<Stroke>>(&json) {
            Ok(strokes) => Some(strokes),
            Err(e) => {
                log::warn!("ignoring malformed legacy strokes: {e}");
                None
            }
        }
    };

    match doc {
        Some(mut doc) => {
            if doc.strokes.is_none() {
                doc.strokes = Some(legacy().unwrap_or_default());
            }
            Some(doc)
        }
        None => legacy().map(|strokes| BoardDocument {
            strokes: Some(strokes),
            ..BoardDocument::default()
        }),
    }
}

/// Overwrite the stored document.
pub fn save(store: &mut dyn BoardStore, doc: &BoardDocument) -> Result<(), PersistError> {
    let json = doc.to_json()?;
    store.set(BOARD_KEY, &json)
}
