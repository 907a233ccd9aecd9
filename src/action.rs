use crate::level::Level;

/// Actions a user or application can initiate on the level tree view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewAction<Custom = ()> {
    /// Choose the table shown at a level.
    SelectTable { level: Level, table_id: String },
    /// Switch a level on or off (level 3 follows level 2).
    ToggleLevelDisabled(Level),
    /// Expand or collapse a row.
    ToggleRow(String),
    /// Expand every row that has children.
    ExpandAll,
    /// Collapse every row.
    CollapseAll,
    /// Custom action forwarded to the caller without internal handling.
    Custom(Custom),
}

/// Result of handling an action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewEvent<Custom = ()> {
    /// The action was handled and state was updated.
    Handled,
    /// The action was ignored (unknown row, option not offered, nothing to do).
    Unhandled,
    /// The action is forwarded to the caller for handling.
    Action(ViewAction<Custom>),
}
