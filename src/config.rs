#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Reserved column key holding a row's primary display name.
pub const DEFAULT_NAME_KEY: &str = "0000";

/// Default maximum label length for table options.
pub const DEFAULT_LABEL_MAX_CHARS: usize = 20;

/// Engine configuration shared by the resolver, builder and view.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelTreeConfig {
    /// Column key of the display name.
    pub name_key: String,
    /// Table labels longer than this are truncated with `...` (`0` disables truncation).
    pub label_max_chars: usize,
}

impl LevelTreeConfig {
    /// Default configuration: name key `"0000"`, labels cut at 20 characters.
    pub fn new() -> Self {
        Self {
            name_key: DEFAULT_NAME_KEY.to_owned(),
            label_max_chars: DEFAULT_LABEL_MAX_CHARS,
        }
    }

    #[must_use]
    pub fn with_name_key(mut self, name_key: impl Into<String>) -> Self {
        self.name_key = name_key.into();
        self
    }

    #[must_use]
    pub const fn with_label_max_chars(mut self, max_chars: usize) -> Self {
        self.label_max_chars = max_chars;
        self
    }

    /// Truncates a table name into an option label.
    pub fn truncate_label(&self, name: &str) -> String {
        if self.label_max_chars == 0 || name.chars().count() <= self.label_max_chars {
            return name.to_owned();
        }
        let mut label: String = name.chars().take(self.label_max_chars).collect();
        label.push_str("...");
        label
    }
}

impl Default for LevelTreeConfig {
    fn default() -> Self {
        Self::new()
    }
}
