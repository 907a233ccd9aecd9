//! Three-level tree engine over linked relational tables.
//!
//! Rows of a first-level table are nested with the rows they link to in a second table, and
//! those with their links into a third. Expand flags are reconciled against every rebuilt tree
//! so they survive data changes and can be persisted per preset.
//!
//! Feature flags:
//! - `serde`: serde support for the data model, selections, presets and built trees.
//! - `edit`: row creation helpers and the `RowSink` trait.

mod action;
mod builder;
mod config;
#[cfg(feature = "edit")]
mod edit;
mod error;
mod expand;
#[cfg(test)]
mod fixtures;
mod level;
mod linker;
mod model;
pub mod prelude;
mod preset;
mod resolver;
mod selection;
mod view;

pub use action::{ViewAction, ViewEvent};
pub use builder::{LevelRowNode, TreeBuilder, build_tree, link_key, walk};
pub use config::{DEFAULT_LABEL_MAX_CHARS, DEFAULT_NAME_KEY, LevelTreeConfig};
#[cfg(feature = "edit")]
pub use edit::{ROW_ID_LEN, RowSink, add_row, generate_row_id, new_row};
pub use error::{PresetError, SelectionError};
pub use expand::{ExpandState, ExpandedRowInfo, VisibleRow, reconcile, toggle, visible_rows};
pub use level::Level;
pub use linker::{
    CellLinks, LinkRecord, LinkResolver, LinkStore, LinkedRowIds, RowIndex, resolve_linked_rows,
};
pub use model::{CellValue, Column, LINK_TYPE, LinkData, Row, Table, find_table};
pub use preset::{Preset, PresetStore, PresetUpdate};
pub use resolver::{
    SelectOption, first_level_tables, next_level_tables, options, third_level_options,
};
pub use selection::{LevelSelectionManager, LevelSelections, LevelSlot, fallback_selections};
pub use view::LevelTreeView;
