use std::borrow::Cow;

use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};
use smallvec::SmallVec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::builder::{LevelRowNode, walk};
use crate::level::Level;

/// Persisted expand flag of one tree node.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpandedRowInfo {
    #[cfg_attr(feature = "serde", serde(rename = "_id"))]
    pub row_id: String,
    pub expanded: bool,
}

impl ExpandedRowInfo {
    /// Creates the flag for `row_id`.
    pub fn new(row_id: impl Into<String>, expanded: bool) -> Self {
        Self {
            row_id: row_id.into(),
            expanded,
        }
    }
}

/// Merges `prior` flags into the node ids of a freshly built tree.
///
/// Every node id is emitted once, in pre-order, with its prior flag or `false`. Ids missing
/// from the tree are dropped. A row shared by several parents appears only at its first
/// position, so the output is shorter than a per-occurrence walk of the tree. When the result
/// equals `prior` (same pairs, same order) the prior slice itself is returned.
pub fn reconcile<'a>(
    prior: &'a [ExpandedRowInfo],
    tree: &[LevelRowNode],
) -> Cow<'a, [ExpandedRowInfo]> {
    let mut previous: FxHashMap<&str, bool> =
        FxHashMap::with_capacity_and_hasher(prior.len(), FxBuildHasher);
    for info in prior {
        previous.entry(info.row_id.as_str()).or_insert(info.expanded);
    }

    let mut seen: FxHashSet<&str> = FxHashSet::with_capacity_and_hasher(prior.len(), FxBuildHasher);
    let mut next = Vec::with_capacity(prior.len());
    for node in walk(tree) {
        if seen.insert(node.id.as_str()) {
            let expanded = previous.get(node.id.as_str()).copied().unwrap_or(false);
            next.push(ExpandedRowInfo::new(node.id.clone(), expanded));
        }
    }

    if next.as_slice() == prior {
        Cow::Borrowed(prior)
    } else {
        Cow::Owned(next)
    }
}

/// Flips the flag of `row_id` in place, or appends it as expanded when unknown.
pub fn toggle(row_id: &str, prior: &[ExpandedRowInfo]) -> Vec<ExpandedRowInfo> {
    let mut rows = prior.to_vec();
    if let Some(info) = rows.iter_mut().find(|info| info.row_id == row_id) {
        info.expanded = !info.expanded;
    } else {
        rows.push(ExpandedRowInfo::new(row_id, true));
    }
    rows
}

/// Expand flags for the current tree, kept in tree order.
#[derive(Clone, Debug, Default)]
pub struct ExpandState {
    rows: Vec<ExpandedRowInfo>,
    // Position of each row id in `rows`.
    index: FxHashMap<String, usize>,
}

impl ExpandState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores persisted flags.
    pub fn from_rows(rows: Vec<ExpandedRowInfo>) -> Self {
        let mut state = Self::new();
        state.replace(rows);
        state
    }

    /// Flags in persisted order.
    #[inline]
    pub fn rows(&self) -> &[ExpandedRowInfo] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<ExpandedRowInfo> {
        self.rows
    }

    /// Returns `true` if `row_id` is known and expanded.
    #[inline]
    pub fn is_expanded(&self, row_id: &str) -> bool {
        self.index
            .get(row_id)
            .is_some_and(|&pos| self.rows[pos].expanded)
    }

    /// Reconciles against a rebuilt tree. Returns `true` if the flags changed.
    pub fn reconcile(&mut self, tree: &[LevelRowNode]) -> bool {
        let next = match reconcile(&self.rows, tree) {
            Cow::Borrowed(_) => None,
            Cow::Owned(rows) => Some(rows),
        };
        let Some(rows) = next else {
            return false;
        };
        self.replace(rows);
        true
    }

    /// Toggles `row_id` and returns its new flag.
    pub fn toggle(&mut self, row_id: &str) -> bool {
        let expanded = !self.is_expanded(row_id);
        self.set_expanded(row_id, expanded);
        expanded
    }

    /// Sets the flag in place, appending the row if it is unknown.
    pub fn set_expanded(&mut self, row_id: &str, expanded: bool) {
        if let Some(&pos) = self.index.get(row_id) {
            self.rows[pos].expanded = expanded;
        } else {
            self.index.insert(row_id.to_owned(), self.rows.len());
            self.rows.push(ExpandedRowInfo::new(row_id, expanded));
        }
    }

    /// Expands every node that has children.
    pub fn expand_all(&mut self, tree: &[LevelRowNode]) {
        for node in walk(tree) {
            if is_expandable(node) {
                self.set_expanded(&node.id, true);
            }
        }
    }

    /// Collapses every known row, keeping positions.
    pub fn collapse_all(&mut self) {
        for info in &mut self.rows {
            info.expanded = false;
        }
    }

    fn replace(&mut self, rows: Vec<ExpandedRowInfo>) {
        self.index.clear();
        self.index.reserve(rows.len());
        for (pos, info) in rows.iter().enumerate() {
            self.index.entry(info.row_id.clone()).or_insert(pos);
        }
        self.rows = rows;
    }
}

/// A row the renderer shows, given the current expand flags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisibleRow {
    pub id: String,
    pub level: Level,
    pub parent: Option<String>,
    /// Whether the row can be expanded (not on the last level and has children).
    pub has_children: bool,
    pub is_expanded: bool,
    /// For each ancestor depth, whether that ancestor was the last of its siblings.
    pub is_tail_stack: SmallVec<[bool; 4]>,
}

fn is_expandable(node: &LevelRowNode) -> bool {
    node.level != Level::Third && node.has_children()
}

/// Flattens the tree into the rows visible under `state`.
pub fn visible_rows(tree: &[LevelRowNode], state: &ExpandState) -> Vec<VisibleRow> {
    let mut rows = Vec::with_capacity(tree.len());
    let mut is_tail_stack: SmallVec<[bool; 4]> = SmallVec::new();
    push_visible(tree, None, state, &mut is_tail_stack, &mut rows);
    rows
}

fn push_visible(
    nodes: &[LevelRowNode],
    parent: Option<&str>,
    state: &ExpandState,
    is_tail_stack: &mut SmallVec<[bool; 4]>,
    rows: &mut Vec<VisibleRow>,
) {
    let last_idx = nodes.len().saturating_sub(1);
    for (idx, node) in nodes.iter().enumerate() {
        let has_children = is_expandable(node);
        let is_expanded = has_children && state.is_expanded(&node.id);
        rows.push(VisibleRow {
            id: node.id.clone(),
            level: node.level,
            parent: parent.map(str::to_owned),
            has_children,
            is_expanded,
            is_tail_stack: is_tail_stack.clone(),
        });

        if is_expanded {
            is_tail_stack.push(idx == last_idx);
            push_visible(&node.children, Some(&node.id), state, is_tail_stack, rows);
            is_tail_stack.pop();
        }
    }
}
