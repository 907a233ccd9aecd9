//! Link graph resolution: which tables can be chosen at each level.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::LevelTreeConfig;
use crate::model::{Table, find_table};

/// A selectable table: id plus (possibly truncated) display label.
///
/// The empty option (`value == ""`) stands for "nothing selected".
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    /// Creates an option from a table id and label.
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    /// The "nothing selected" sentinel.
    pub const fn none() -> Self {
        Self {
            value: String::new(),
            label: String::new(),
        }
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        self.value.is_empty()
    }

    /// Builds an option for a table, truncating its name per `config`.
    pub fn for_table(table: &Table, config: &LevelTreeConfig) -> Self {
        Self {
            value: table.id.clone(),
            label: config.truncate_label(&table.name),
        }
    }
}

/// Returns every table that has at least one link column, in input order.
pub fn first_level_tables(tables: &[Table]) -> Vec<&Table> {
    tables.iter().filter(|table| table.has_link_column()).collect()
}

/// Returns the tables one link hop away from `source_table_id`.
///
/// One entry per link column, in column order: two link columns pointing at the same table
/// yield that table twice. Self links and unknown targets are skipped.
pub fn next_level_tables<'a>(tables: &'a [Table], source_table_id: &str) -> Vec<&'a Table> {
    let Some(source) = find_table(tables, source_table_id) else {
        return Vec::new();
    };
    source
        .link_columns()
        .filter_map(|column| column.link_data())
        .map(|link| link.target_from(&source.id))
        .filter(|target| *target != source.id)
        .filter_map(|target| find_table(tables, target))
        .collect()
}

/// Level-3 candidates: tables reachable from `second`, minus the level-1 table (by label)
/// and the level-2 table (by id).
pub fn third_level_options(
    tables: &[Table],
    first: &SelectOption,
    second: &SelectOption,
    config: &LevelTreeConfig,
) -> Vec<SelectOption> {
    if first.is_none() || second.is_none() {
        return Vec::new();
    }
    next_level_tables(tables, &second.value)
        .into_iter()
        .map(|table| SelectOption::for_table(table, config))
        .filter(|option| option.label != first.label && option.value != second.value)
        .collect()
}

/// Converts tables into select options.
pub fn options<'a>(
    tables: impl IntoIterator<Item = &'a Table>,
    config: &LevelTreeConfig,
) -> Vec<SelectOption> {
    tables
        .into_iter()
        .map(|table| SelectOption::for_table(table, config))
        .collect()
}
