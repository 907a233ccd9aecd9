//! Creating rows from the tree view. Enabled by the `edit` feature.

use rand::Rng;

use crate::config::LevelTreeConfig;
use crate::model::{CellValue, Row, Table};

/// Length of generated row ids.
pub const ROW_ID_LEN: usize = 22;

/// Generates a random row id of [`ROW_ID_LEN`] alphanumeric characters.
pub fn generate_row_id() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..ROW_ID_LEN)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            char::from(CHARSET[idx])
        })
        .collect()
}

/// Builds a new row named `name`, created and last modified by `creator`.
pub fn new_row(name: &str, creator: &str, config: &LevelTreeConfig) -> Row {
    let now = chrono::Utc::now().to_rfc3339();
    Row::new(generate_row_id())
        .with(config.name_key.clone(), name)
        .with("_participants", CellValue::List(Vec::new()))
        .with("_creator", creator)
        .with("_ctime", now.as_str())
        .with("_last_modifier", creator)
        .with("_mtime", now)
}

/// Host seam for writing rows back into a table.
pub trait RowSink {
    /// Inserts `row` into `table_id` right below `after_row_id`, or at the end when `None`.
    fn insert_row(&mut self, table_id: &str, after_row_id: Option<&str>, row: Row);
}

impl<F> RowSink for F
where
    F: FnMut(&str, Option<&str>, Row),
{
    fn insert_row(&mut self, table_id: &str, after_row_id: Option<&str>, row: Row) {
        self(table_id, after_row_id, row);
    }
}

/// Creates a row named `name` below the last row of `table` and returns its id.
///
/// Returns `None` for a blank name.
pub fn add_row<S: RowSink + ?Sized>(
    sink: &mut S,
    table: &Table,
    name: &str,
    creator: &str,
    config: &LevelTreeConfig,
) -> Option<String> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let row = new_row(name, creator, config);
    let row_id = row.id.clone();
    let after = table.rows.last().map(|last| last.id.as_str());
    log::debug!("adding row '{row_id}' to table '{}'", table.id);
    sink.insert_row(&table.id, after, row);
    Some(row_id)
}
