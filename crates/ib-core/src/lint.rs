//! Diagnostics for board documents.
//!
//! Reports structural issues without modifying the board. The engine runs
//! these after loading a persisted document and logs what it finds.

use crate::graph::resolve_anchor;
use crate::group::{GroupTable, referenced_groups};
use crate::id::ElementId;
use crate::model::{AnchorRef, BoardState};
use petgraph::unionfind::UnionFind;
use std::collections::{HashMap, HashSet};

/// Severity of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSeverity {
    /// Breaks a board invariant.
    Warning,
    /// Allowed, but worth knowing about.
    Info,
}

/// A single diagnostic about one element.
#[derive(Debug, Clone)]
pub struct BoardDiagnostic {
    /// The element (or group) the finding refers to.
    pub element: ElementId,
    pub message: String,
    pub severity: LintSeverity,
    /// Short rule identifier (e.g. "dangling-edge").
    pub rule: &'static str,
}

/// Run all rules and return the findings.
#[must_use]
pub fn lint_board(state: &BoardState, groups: &GroupTable) -> Vec<BoardDiagnostic> {
    let mut diags = Vec::new();
    lint_duplicate_ids(state, &mut diags);
    lint_dangling_edges(state, &mut diags);
    lint_group_colors(state, groups, &mut diags);
    lint_split_groups(state, &mut diags);
    diags
}

fn lint_duplicate_ids(state: &BoardState, diags: &mut Vec<BoardDiagnostic>) {
    let mut seen = HashSet::new();
    let ids = state
        .cards
        .iter()
        .map(|c| c.id)
        .chain(state.flow_nodes.iter().map(|n| n.id))
        .chain(state.edges.iter().map(|e| e.id))
        .chain(state.strokes.iter().map(|s| s.id));
    for id in ids {
        if !seen.insert(id) {
            diags.push(BoardDiagnostic {
                element: id,
                message: format!("Id `{id}` is used by more than one element."),
                severity: LintSeverity::Warning,
                rule: "duplicate-id",
            });
        }
    }
}

fn lint_dangling_edges(state: &BoardState, diags: &mut Vec<BoardDiagnostic>) {
    for edge in &state.edges {
        for end in [&edge.from, &edge.to] {
            if resolve_anchor(state, end).is_none() {
                diags.push(BoardDiagnostic {
                    element: edge.id,
                    message: format!(
                        "Edge `{}` points at missing {:?} `{}`; it will not be drawn.",
                        edge.id, end.kind, end.id
                    ),
                    severity: LintSeverity::Info,
                    rule: "dangling-edge",
                });
            }
        }
    }
}

fn lint_group_colors(state: &BoardState, groups: &GroupTable, diags: &mut Vec<BoardDiagnostic>) {
    let live = referenced_groups(state);
    for id in &live {
        if !groups.contains(*id) {
            diags.push(BoardDiagnostic {
                element: *id,
                message: format!("Group `{id}` has members but no color."),
                severity: LintSeverity::Warning,
                rule: "uncolored-group",
            });
        }
    }
    for id in groups.colors().keys() {
        if !live.contains(id) {
            diags.push(BoardDiagnostic {
                element: *id,
                message: format!("Color entry for group `{id}` has no members."),
                severity: LintSeverity::Warning,
                rule: "orphan-color",
            });
        }
    }
}

/// Flag groups whose anchors don't form one connected component of the
/// edge graph. Deleting an edge never splits a group, so this is
/// informational.
fn lint_split_groups(state: &BoardState, diags: &mut Vec<BoardDiagnostic>) {
    let mut index: HashMap<AnchorRef, usize> = HashMap::new();
    let mut tagged: Vec<(usize, ElementId)> = Vec::new();
    for card in &state.cards {
        let i = index.len();
        index.insert(AnchorRef::card(card.id), i);
        if let Some(g) = card.group_id {
            tagged.push((i, g));
        }
    }
    for node in &state.flow_nodes {
        let i = index.len();
        index.insert(AnchorRef::flow(node.id), i);
        if let Some(g) = node.group_id {
            tagged.push((i, g));
        }
    }

    let mut components = UnionFind::<usize>::new(index.len());
    for edge in &state.edges {
        if let (Some(&a), Some(&b)) = (index.get(&edge.from), index.get(&edge.to)) {
            components.union(a, b);
        }
    }

    let mut roots: HashMap<ElementId, HashSet<usize>> = HashMap::new();
    for (i, group) in tagged {
        roots.entry(group).or_default().insert(components.find(i));
    }
    let mut split: Vec<(ElementId, usize)> = roots
        .into_iter()
        .filter(|(_, r)| r.len() > 1)
        .map(|(g, r)| (g, r.len()))
        .collect();
    split.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));
    for (group, parts) in split {
        diags.push(BoardDiagnostic {
            element: group,
            message: format!("Group `{group}` spans {parts} disconnected clusters."),
            severity: LintSeverity::Info,
            rule: "split-group",
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardConfig;
    use crate::graph::{connect, delete_edge};
    use crate::model::{Card, Edge};

    fn rules(diags: &[BoardDiagnostic]) -> Vec<&'static str> {
        diags.iter().map(|d| d.rule).collect()
    }

    #[test]
    fn clean_board_has_no_findings() {
        let palette = BoardConfig::default().palette;
        let mut state = BoardState::new();
        let mut groups = GroupTable::new();
        state.cards.push(Card::new(ElementId::intern("l1"), 0.0, 0.0));
        state.cards.push(Card::new(ElementId::intern("l2"), 300.0, 0.0));
        connect(
            &mut state,
            &mut groups,
            AnchorRef::card(ElementId::intern("l1")),
            AnchorRef::card(ElementId::intern("l2")),
            &palette,
        );
        assert!(lint_board(&state, &groups).is_empty());
    }

    #[test]
    fn reports_dangling_edge() {
        let mut state = BoardState::new();
        state.edges.push(Edge::new(
            ElementId::intern("le"),
            AnchorRef::card(ElementId::intern("x1")),
            AnchorRef::card(ElementId::intern("x2")),
        ));
        let diags = lint_board(&state, &GroupTable::new());
        assert_eq!(rules(&diags), vec!["dangling-edge", "dangling-edge"]);
    }

    #[test]
    fn reports_color_table_drift() {
        let mut state = BoardState::new();
        let mut card = Card::new(ElementId::intern("lc"), 0.0, 0.0);
        card.group_id = Some(ElementId::intern("g_nocolor"));
        state.cards.push(card);

        let mut groups = GroupTable::new();
        groups.allocate(&BoardConfig::default().palette);

        let mut found = rules(&lint_board(&state, &groups));
        found.sort();
        assert_eq!(found, vec!["orphan-color", "uncolored-group"]);
    }

    #[test]
    fn reports_split_group_after_edge_delete() {
        let palette = BoardConfig::default().palette;
        let mut state = BoardState::new();
        let mut groups = GroupTable::new();
        state.cards.push(Card::new(ElementId::intern("sp1"), 0.0, 0.0));
        state.cards.push(Card::new(ElementId::intern("sp2"), 300.0, 0.0));
        let edge = connect(
            &mut state,
            &mut groups,
            AnchorRef::card(ElementId::intern("sp1")),
            AnchorRef::card(ElementId::intern("sp2")),
            &palette,
        )
        .unwrap();
        delete_edge(&mut state, &mut groups, edge);

        let diags = lint_board(&state, &groups);
        assert_eq!(rules(&diags), vec!["split-group"]);
        assert_eq!(diags[0].severity, LintSeverity::Info);
    }

    #[test]
    fn reports_duplicate_ids() {
        let mut state = BoardState::new();
        state.cards.push(Card::new(ElementId::intern("dup"), 0.0, 0.0));
        state.cards.push(Card::new(ElementId::intern("dup"), 10.0, 0.0));
        let diags = lint_board(&state, &GroupTable::new());
        assert_eq!(rules(&diags), vec!["duplicate-id"]);
    }
}
