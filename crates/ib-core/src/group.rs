//! The group color side table.
//!
//! Groups are implicit: any card, flow node, or edge carrying the same
//! `group_id` belongs to the same group. The table maps each live group id
//! to its one accent color and owns the palette cursor used to hand out
//! colors to new groups.

use crate::id::ElementId;
use crate::model::{BoardState, Color};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupTable {
    colors: HashMap<ElementId, Color>,
    /// Index into the palette of the next color to allocate.
    cursor: usize,
}

impl GroupTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted parts.
    pub fn from_parts(colors: HashMap<ElementId, Color>, cursor: usize) -> Self {
        Self { colors, cursor }
    }

    pub fn colors(&self) -> &HashMap<ElementId, Color> {
        &self.colors
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn color(&self, group: ElementId) -> Option<Color> {
        self.colors.get(&group).copied()
    }

    pub fn contains(&self, group: ElementId) -> bool {
        self.colors.contains_key(&group)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn clear(&mut self) {
        self.colors.clear();
    }

    /// Take the color under the cursor and advance it, wrapping.
    fn next_color(&mut self, palette: &[Color]) -> Color {
        if palette.is_empty() {
            return Color::rgba(0.5, 0.5, 0.5, 1.0);
        }
        let len = palette.len();
        let color = palette[self.cursor % len];
        self.cursor = (self.cursor + 1) % len;
        color
    }

    /// Allocate a new group with the next palette color.
    pub fn allocate(&mut self, palette: &[Color]) -> ElementId {
        let id = ElementId::fresh("group");
        let color = self.next_color(palette);
        self.colors.insert(id, color);
        log::debug!("allocated group {id} with color {}", color.to_hex());
        id
    }

    /// Drop a group's color entry.
    pub fn remove(&mut self, group: ElementId) -> bool {
        self.colors.remove(&group).is_some()
    }

    /// Advance one group's color to the next palette entry, wrapping.
    /// A color not in the palette restarts at the first entry.
    pub fn cycle_color(&mut self, group: ElementId, palette: &[Color]) -> bool {
        if palette.is_empty() {
            return false;
        }
        let Some(current) = self.colors.get_mut(&group) else {
            return false;
        };
        let next = palette
            .iter()
            .position(|c| c == current)
            .map(|i| (i + 1) % palette.len())
            .unwrap_or(0);
        *current = palette[next];
        true
    }

    /// Remove color entries no longer referenced by any card, flow node,
    /// or edge. Returns the number pruned.
    pub fn prune(&mut self, state: &BoardState) -> usize {
        let live = referenced_groups(state);
        let before = self.colors.len();
        self.colors.retain(|id, _| live.contains(id));
        before - self.colors.len()
    }

    /// Prune unreferenced entries and give every referenced group that
    /// has no color the next palette color. Run after a snapshot restore
    /// or a load so the table matches the entities again.
    pub fn reconcile(&mut self, state: &BoardState, palette: &[Color]) {
        let pruned = self.prune(state);
        let mut missing: Vec<ElementId> = referenced_groups(state)
            .into_iter()
            .filter(|id| !self.colors.contains_key(id))
            .collect();
        missing.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        for id in &missing {
            let color = self.next_color(palette);
            self.colors.insert(*id, color);
        }
        if pruned > 0 || !missing.is_empty() {
            log::debug!(
                "reconciled group table: pruned {pruned}, colored {}",
                missing.len()
            );
        }
    }
}

/// Every group id carried by a card, flow node, or edge.
pub fn referenced_groups(state: &BoardState) -> HashSet<ElementId> {
    state
        .cards
        .iter()
        .filter_map(|c| c.group_id)
        .chain(state.flow_nodes.iter().filter_map(|n| n.group_id))
        .chain(state.edges.iter().filter_map(|e| e.group_id))
        .collect()
}
