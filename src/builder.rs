use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::config::LevelTreeConfig;
use crate::level::Level;
use crate::linker::{LinkResolver, RowIndex, resolve_linked_rows};
use crate::model::{CellValue, Row, Table, find_table};
use crate::selection::LevelSelections;

/// A row placed in the level tree.
///
/// `fields` is a copy of the source row's cells with the display name replaced by its
/// string form; `children` is allocated per build and never shared with the source rows.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelRowNode {
    pub id: String,
    pub name: String,
    pub level: Level,
    pub fields: BTreeMap<String, CellValue>,
    pub children: Vec<LevelRowNode>,
}

impl LevelRowNode {
    /// Name of the child collection for this node's depth.
    #[inline]
    pub const fn child_key(&self) -> &'static str {
        self.level.child_key()
    }

    #[inline]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Depth of the subtree rooted here, counting this node.
    pub fn depth(&self) -> u16 {
        1 + self.children.iter().map(Self::depth).max().unwrap_or(0)
    }
}

#[cfg(feature = "serde")]
impl Serialize for LevelRowNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 2))?;
        map.serialize_entry("_id", &self.id)?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry(self.child_key(), &self.children)?;
        map.end()
    }
}

/// Iterates over every node of a forest in depth-first pre-order.
pub fn walk(nodes: &[LevelRowNode]) -> impl Iterator<Item = &LevelRowNode> {
    let mut stack: Vec<&LevelRowNode> = nodes.iter().rev().collect();
    std::iter::from_fn(move || {
        let node = stack.pop()?;
        stack.extend(node.children.iter().rev());
        Some(node)
    })
}

/// Finds the link column on `table` whose declared `other_table_id` is `target_table_id`.
///
/// Columns declared from the target's side do not match.
pub fn link_key<'t>(table: &'t Table, target_table_id: &str) -> Option<&'t str> {
    if target_table_id.is_empty() {
        return None;
    }
    table
        .link_columns()
        .find(|column| {
            column
                .link_data()
                .is_some_and(|link| link.other_table_id == target_table_id)
        })
        .map(|column| column.key.as_str())
}

/// Materializes the level tree from flat tables.
pub struct TreeBuilder<'a, L: ?Sized> {
    tables: &'a [Table],
    index: RowIndex<'a>,
    selections: &'a LevelSelections,
    resolver: &'a L,
    config: &'a LevelTreeConfig,
}

impl<'a, L: LinkResolver + ?Sized> TreeBuilder<'a, L> {
    /// Prepares a builder, indexing every row of `tables`.
    pub fn new(
        tables: &'a [Table],
        selections: &'a LevelSelections,
        resolver: &'a L,
        config: &'a LevelTreeConfig,
    ) -> Self {
        Self {
            tables,
            index: RowIndex::new(tables),
            selections,
            resolver,
            config,
        }
    }

    /// Builds the tree rooted at the first-level table's rows.
    pub fn build(&self) -> Vec<LevelRowNode> {
        let Some(table) = find_table(self.tables, &self.selections.first.value) else {
            log::debug!("first level table '{}' not found", self.selections.first.value);
            return Vec::new();
        };
        let rows: Vec<&Row> = table.rows.iter().collect();
        let tree = self.build_levels(&table.id, &rows, Level::First);
        log::debug!(
            "built level tree from '{}': {} roots, {} rows indexed",
            table.id,
            tree.len(),
            self.index.len()
        );
        tree
    }

    /// Builds nodes at `level` for `rows` of `table_id`, recursing into active deeper levels.
    ///
    /// At the first level an unresolvable link to the second level yields an empty tree.
    /// An active third level that cannot be resolved keeps the second-level nodes, each
    /// with an empty child list, instead of emptying the second level.
    pub fn build_levels(
        &self,
        table_id: &str,
        rows: &[&'a Row],
        level: Level,
    ) -> Vec<LevelRowNode> {
        let next = level
            .next()
            .and_then(|next| self.selections.active(next).map(|option| (next, option)));
        let Some((next_level, next_option)) = next else {
            return self.leaves(rows, level);
        };

        let key = find_table(self.tables, table_id)
            .and_then(|table| link_key(table, &next_option.value).map(|key| (table, key)));
        let Some((table, key)) = key else {
            if level == Level::First {
                log::debug!(
                    "no link from '{table_id}' to '{}', level tree is empty",
                    next_option.value
                );
                return Vec::new();
            }
            return self.leaves(rows, level);
        };

        let linked = resolve_linked_rows(rows, table, key, &self.index, self.resolver);
        rows.iter()
            .map(|row| {
                let child_rows = linked.get(&row.id).map_or(&[][..], Vec::as_slice);
                let children = self.build_levels(&next_option.value, child_rows, next_level);
                self.node(row, level, children)
            })
            .collect()
    }

    fn leaves(&self, rows: &[&Row], level: Level) -> Vec<LevelRowNode> {
        rows.iter()
            .map(|row| self.node(row, level, Vec::new()))
            .collect()
    }

    fn node(&self, row: &Row, level: Level, children: Vec<LevelRowNode>) -> LevelRowNode {
        let name = row.display_name(&self.config.name_key);
        let mut fields = row.fields.clone();
        fields.insert(self.config.name_key.clone(), CellValue::Text(name.clone()));
        LevelRowNode {
            id: row.id.clone(),
            name,
            level,
            fields,
            children,
        }
    }
}

/// Builds the level tree for `selections` over `tables`.
pub fn build_tree<L: LinkResolver + ?Sized>(
    selections: &LevelSelections,
    tables: &[Table],
    resolver: &L,
    config: &LevelTreeConfig,
) -> Vec<LevelRowNode> {
    TreeBuilder::new(tables, selections, resolver, config).build()
}
