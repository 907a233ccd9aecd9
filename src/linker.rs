use rustc_hash::{FxBuildHasher, FxHashMap};

use crate::model::{Row, Table};

/// Linked row ids per row: `row id -> link column key -> linked row ids`.
pub type LinkedRowIds = FxHashMap<String, FxHashMap<String, Vec<String>>>;

/// Host-provided link resolution.
///
/// Implementations report, for each of `rows` (all owned by `table`), the row ids linked
/// through each of the table's link columns. Rows or columns without links may be omitted.
pub trait LinkResolver {
    fn linked_row_ids(&self, rows: &[&Row], table: &Table) -> LinkedRowIds;
}

impl<F> LinkResolver for F
where
    F: Fn(&[&Row], &Table) -> LinkedRowIds,
{
    #[inline]
    fn linked_row_ids(&self, rows: &[&Row], table: &Table) -> LinkedRowIds {
        self(rows, table)
    }
}

/// Reads linked ids straight from row cells: a link cell holds a list of row ids.
#[derive(Clone, Copy, Debug, Default)]
pub struct CellLinks;

impl LinkResolver for CellLinks {
    fn linked_row_ids(&self, rows: &[&Row], table: &Table) -> LinkedRowIds {
        let mut linked = FxHashMap::with_capacity_and_hasher(rows.len(), FxBuildHasher);
        for row in rows {
            let mut per_column = FxHashMap::default();
            for column in table.link_columns() {
                let Some(items) = row.get(&column.key).and_then(|value| value.as_list()) else {
                    continue;
                };
                let ids = items
                    .iter()
                    .filter_map(|item| item.as_text())
                    .map(str::to_owned)
                    .collect();
                per_column.insert(column.key.clone(), ids);
            }
            linked.insert(row.id.clone(), per_column);
        }
        linked
    }
}

/// One link relation between two tables, stored in both directions.
#[derive(Clone, Debug, Default)]
pub struct LinkRecord {
    pub table1_id: String,
    pub table2_id: String,
    table1_table2: FxHashMap<String, Vec<String>>,
    table2_table1: FxHashMap<String, Vec<String>>,
}

impl LinkRecord {
    /// Creates an empty relation between two tables.
    pub fn new(table1_id: impl Into<String>, table2_id: impl Into<String>) -> Self {
        Self {
            table1_id: table1_id.into(),
            table2_id: table2_id.into(),
            table1_table2: FxHashMap::default(),
            table2_table1: FxHashMap::default(),
        }
    }

    /// Links `row1` (in table 1) with `row2` (in table 2).
    pub fn link(&mut self, row1: &str, row2: &str) {
        self.table1_table2
            .entry(row1.to_owned())
            .or_default()
            .push(row2.to_owned());
        self.table2_table1
            .entry(row2.to_owned())
            .or_default()
            .push(row1.to_owned());
    }

    /// Rows linked to `row_id`, seen from `table_id`.
    pub fn linked(&self, table_id: &str, row_id: &str) -> &[String] {
        let map = if table_id == self.table1_id {
            &self.table1_table2
        } else {
            &self.table2_table1
        };
        map.get(row_id).map_or(&[][..], Vec::as_slice)
    }
}

/// Link records keyed by link id, resolved through each column's `link_id`.
#[derive(Clone, Debug, Default)]
pub struct LinkStore {
    links: FxHashMap<String, LinkRecord>,
}

impl LinkStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the record for `link_id`, replacing any previous one.
    pub fn insert(&mut self, link_id: impl Into<String>, record: LinkRecord) {
        self.links.insert(link_id.into(), record);
    }

    /// Returns the record for `link_id` to add links to it.
    pub fn record_mut(&mut self, link_id: &str) -> Option<&mut LinkRecord> {
        self.links.get_mut(link_id)
    }
}

impl LinkResolver for LinkStore {
    fn linked_row_ids(&self, rows: &[&Row], table: &Table) -> LinkedRowIds {
        let mut linked = FxHashMap::with_capacity_and_hasher(rows.len(), FxBuildHasher);
        for row in rows {
            let mut per_column = FxHashMap::default();
            for column in table.link_columns() {
                let Some(record) = column
                    .link_data()
                    .and_then(|data| self.links.get(&data.link_id))
                else {
                    continue;
                };
                per_column.insert(column.key.clone(), record.linked(&table.id, &row.id).to_vec());
            }
            linked.insert(row.id.clone(), per_column);
        }
        linked
    }
}

/// Flattened lookup over every row of every table. The first row wins on duplicate ids.
#[derive(Clone, Debug, Default)]
pub struct RowIndex<'a> {
    rows: FxHashMap<&'a str, &'a Row>,
}

impl<'a> RowIndex<'a> {
    /// Indexes the rows of every table.
    pub fn new(tables: &'a [Table]) -> Self {
        let capacity = tables.iter().map(|table| table.rows.len()).sum();
        let mut rows = FxHashMap::with_capacity_and_hasher(capacity, FxBuildHasher);
        for row in tables.iter().flat_map(|table| &table.rows) {
            rows.entry(row.id.as_str()).or_insert(row);
        }
        Self { rows }
    }

    /// Looks up a row by id.
    #[inline]
    pub fn get(&self, row_id: &str) -> Option<&'a Row> {
        self.rows.get(row_id).copied()
    }

    /// Number of distinct row ids indexed.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Resolves, for each row, the full linked rows reachable through `link_column_key`.
///
/// Linked ids with no matching row are skipped.
pub fn resolve_linked_rows<'a, L: LinkResolver + ?Sized>(
    rows: &[&'a Row],
    owner_table: &Table,
    link_column_key: &str,
    index: &RowIndex<'a>,
    resolver: &L,
) -> FxHashMap<String, Vec<&'a Row>> {
    let linked_ids = resolver.linked_row_ids(rows, owner_table);
    let mut resolved = FxHashMap::with_capacity_and_hasher(rows.len(), FxBuildHasher);
    for row in rows {
        let ids = linked_ids
            .get(&row.id)
            .and_then(|columns| columns.get(link_column_key))
            .map_or(&[][..], Vec::as_slice);
        let linked: Vec<&'a Row> = ids
            .iter()
            .filter_map(|id| {
                let found = index.get(id);
                if found.is_none() {
                    log::trace!(
                        "dangling link {}.{} -> {id} in table {}",
                        row.id,
                        link_column_key,
                        owner_table.id
                    );
                }
                found
            })
            .collect();
        resolved.insert(row.id.clone(), linked);
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn row_ids(rows: &[&Row]) -> Vec<String> {
        rows.iter().map(|row| row.id.clone()).collect()
    }

    #[test]
    fn cell_links_read_link_cells() {
        let tables = fixtures::tables();
        let milestones = &tables[1];
        let rows: Vec<&Row> = milestones.rows.iter().collect();

        let linked = CellLinks.linked_row_ids(&rows, milestones);

        assert_eq!(linked["M1"]["proj"], vec!["P1"]);
        assert_eq!(linked["M1"]["tasks"], vec!["T1"]);
    }

    #[test]
    fn resolves_linked_rows_and_skips_dangling_ids() {
        let tables = fixtures::wide_tables();
        let index = RowIndex::new(&tables);
        let milestones = &tables[1];
        let rows: Vec<&Row> = milestones.rows.iter().collect();

        let resolved = resolve_linked_rows(&rows, milestones, "tasks", &index, &CellLinks);

        assert_eq!(row_ids(&resolved["M1"]), vec!["T1"]);
        assert_eq!(row_ids(&resolved["M2"]), vec!["T2"]);
    }

    #[test]
    fn unknown_column_key_yields_no_links() {
        let tables = fixtures::tables();
        let index = RowIndex::new(&tables);
        let projects = &tables[0];
        let rows: Vec<&Row> = projects.rows.iter().collect();

        let resolved = resolve_linked_rows(&rows, projects, "nope", &index, &CellLinks);

        assert!(resolved["P1"].is_empty());
    }

    #[test]
    fn row_index_keeps_first_duplicate() {
        let mut tables = fixtures::tables();
        tables[2].rows.push(Row::new("P1").with("0000", "shadow"));

        let index = RowIndex::new(&tables);

        assert_eq!(index.len(), 3);
        assert_eq!(index.get("P1").map(|row| row.display_name("0000")), Some("Launch".to_owned()));
    }

    #[test]
    fn link_store_resolves_both_directions() {
        let tables = fixtures::tables();
        let mut store = LinkStore::new();
        let mut record = LinkRecord::new("projects", "milestones");
        record.link("P1", "M1");
        store.insert("l1", record);

        let projects = &tables[0];
        let milestones = &tables[1];
        let forward = store.linked_row_ids(&[&projects.rows[0]], projects);
        let backward = store.linked_row_ids(&[&milestones.rows[0]], milestones);

        assert_eq!(forward["P1"]["ms"], vec!["M1"]);
        assert_eq!(backward["M1"]["proj"], vec!["P1"]);
        assert!(!backward["M1"].contains_key("tasks"));
    }

    #[test]
    fn closures_act_as_resolvers() {
        let tables = fixtures::tables();
        let index = RowIndex::new(&tables);
        let projects = &tables[0];
        let resolver = |rows: &[&Row], _table: &Table| -> LinkedRowIds {
            rows.iter()
                .map(|row| {
                    let mut columns = FxHashMap::default();
                    columns.insert("ms".to_owned(), vec!["M1".to_owned(), "M1".to_owned()]);
                    (row.id.clone(), columns)
                })
                .collect()
        };

        let resolved =
            resolve_linked_rows(&[&projects.rows[0]], projects, "ms", &index, &resolver);

        assert_eq!(row_ids(&resolved["P1"]), vec!["M1", "M1"]);
    }
}
