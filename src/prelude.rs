pub use crate::{
    CellLinks, CellValue, Column, ExpandState, ExpandedRowInfo, Level, LevelRowNode,
    LevelSelectionManager, LevelSelections, LevelSlot, LevelTreeConfig, LevelTreeView, LinkData,
    LinkResolver, LinkStore, Preset, PresetError, PresetStore, PresetUpdate, Row, SelectOption,
    SelectionError, Table, ViewAction, ViewEvent, VisibleRow, build_tree, reconcile,
};

#[cfg(feature = "edit")]
pub use crate::{RowSink, add_row, new_row};
