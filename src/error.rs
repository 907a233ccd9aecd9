use crate::level::Level;

/// Caller errors raised by the level selection manager.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    /// The table is not among the options offered at this level.
    #[error("table '{table_id}' is not selectable at the {level} level")]
    NotSelectable { level: Level, table_id: String },

    /// The first level is always active.
    #[error("the {0} level cannot be disabled")]
    AlwaysEnabled(Level),

    /// The level has no candidates or its parent level is disabled.
    #[error("the {0} level is unavailable")]
    Unavailable(Level),
}

impl SelectionError {
    pub fn not_selectable(level: Level, table_id: impl Into<String>) -> Self {
        Self::NotSelectable {
            level,
            table_id: table_id.into(),
        }
    }
}

/// Errors loading or updating persisted presets.
#[derive(Debug, thiserror::Error)]
pub enum PresetError {
    #[error("preset '{0}' not found")]
    UnknownPreset(String),

    #[cfg(feature = "serde")]
    #[error("malformed plugin settings: {0}")]
    Decode(#[from] serde_json::Error),
}
