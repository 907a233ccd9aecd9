use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Column type tag that marks a link column.
pub const LINK_TYPE: &str = "link";

/// A dynamic cell value stored in a row.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<CellValue>),
}

impl CellValue {
    /// Returns the text if this is a `Text` value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the list items if this is a `List` value.
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

/// String form used for display names: lists join with `,`, integral numbers drop the fraction.
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Number(value) => {
                if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
                    #[allow(clippy::cast_possible_truncation)]
                    let integral = *value as i64;
                    write!(f, "{integral}")
                } else {
                    write!(f, "{value}")
                }
            }
            Self::Text(text) => f.write_str(text),
            Self::List(items) => {
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<Self>> From<Vec<T>> for CellValue {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

/// Link metadata carried by a link column.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkData {
    /// Identifier of the link relation shared by both sides.
    #[cfg_attr(feature = "serde", serde(default))]
    pub link_id: String,
    /// Table the link was declared from.
    #[cfg_attr(feature = "serde", serde(default))]
    pub table_id: String,
    /// Table on the other end of the link.
    #[cfg_attr(feature = "serde", serde(default))]
    pub other_table_id: String,
}

impl LinkData {
    /// Creates link metadata declared from `table_id` towards `other_table_id`.
    pub fn new(
        link_id: impl Into<String>,
        table_id: impl Into<String>,
        other_table_id: impl Into<String>,
    ) -> Self {
        Self {
            link_id: link_id.into(),
            table_id: table_id.into(),
            other_table_id: other_table_id.into(),
        }
    }

    /// Returns the table on the far side of the link as seen from `source_table_id`.
    ///
    /// Links may be declared from either side, so the declared `table_id` is only the
    /// source when it matches.
    pub fn target_from(&self, source_table_id: &str) -> &str {
        if self.table_id == source_table_id {
            &self.other_table_id
        } else {
            &self.table_id
        }
    }
}

/// A table column. Only link columns matter to the level tree.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    pub key: String,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub column_type: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub data: Option<LinkData>,
}

impl Column {
    /// Creates a plain (non-link) column.
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        column_type: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            column_type: column_type.into(),
            data: None,
        }
    }

    /// Creates a link column.
    pub fn link(key: impl Into<String>, name: impl Into<String>, data: LinkData) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            column_type: LINK_TYPE.to_owned(),
            data: Some(data),
        }
    }

    /// Returns the link metadata if this is a link column.
    pub fn link_data(&self) -> Option<&LinkData> {
        if self.column_type == LINK_TYPE {
            self.data.as_ref()
        } else {
            None
        }
    }

    /// Returns `true` for a link column carrying link metadata.
    #[inline]
    pub fn is_link(&self) -> bool {
        self.link_data().is_some()
    }
}

/// A table row: identifier plus cell values keyed by column key.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    #[cfg_attr(feature = "serde", serde(rename = "_id"))]
    pub id: String,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub fields: BTreeMap<String, CellValue>,
}

impl Row {
    /// Creates a row with no cells.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Sets a cell value (builder style).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Returns the cell value under `key`.
    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.fields.get(key)
    }

    /// Returns the display name stored under `name_key`, coerced to a string.
    pub fn display_name(&self, name_key: &str) -> String {
        self.fields
            .get(name_key)
            .map(ToString::to_string)
            .unwrap_or_default()
    }
}

/// A host table with its columns and rows.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    #[cfg_attr(feature = "serde", serde(rename = "_id"))]
    pub id: String,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub columns: Vec<Column>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub rows: Vec<Row>,
}

impl Table {
    /// Creates an empty table.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Appends a column (builder style).
    #[must_use]
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Appends a row (builder style).
    #[must_use]
    pub fn with_row(mut self, row: Row) -> Self {
        self.rows.push(row);
        self
    }

    /// Iterates over the link columns in declaration order.
    pub fn link_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|column| column.is_link())
    }

    /// Returns `true` if the table can take part in the level tree.
    pub fn has_link_column(&self) -> bool {
        self.columns.iter().any(Column::is_link)
    }
}

/// Finds a table by id.
pub fn find_table<'a>(tables: &'a [Table], table_id: &str) -> Option<&'a Table> {
    tables.iter().find(|table| table.id == table_id)
}
