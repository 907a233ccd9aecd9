//! Per-level table selections and the manager keeping them consistent.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::LevelTreeConfig;
use crate::error::SelectionError;
use crate::level::Level;
use crate::model::Table;
use crate::resolver::{
    SelectOption, first_level_tables, next_level_tables, options, third_level_options,
};

/// Selection for a level that can be switched off.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LevelSlot {
    pub selected: SelectOption,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_disabled: bool,
}

impl LevelSlot {
    /// Creates an enabled slot.
    pub const fn new(selected: SelectOption) -> Self {
        Self {
            selected,
            is_disabled: false,
        }
    }
}

/// Table chosen for each of the three levels. The first level is always active.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LevelSelections {
    #[cfg_attr(feature = "serde", serde(with = "first_slot"))]
    pub first: SelectOption,
    #[cfg_attr(feature = "serde", serde(default))]
    pub second: LevelSlot,
    #[cfg_attr(feature = "serde", serde(default))]
    pub third: LevelSlot,
}

impl LevelSelections {
    /// Selections with nothing chosen at any level.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the selection for `level`, whether or not it is disabled.
    pub const fn selected(&self, level: Level) -> &SelectOption {
        match level {
            Level::First => &self.first,
            Level::Second => &self.second.selected,
            Level::Third => &self.third.selected,
        }
    }

    /// Returns whether the level is switched off. Disabling level 2 also disables level 3.
    pub const fn is_disabled(&self, level: Level) -> bool {
        match level {
            Level::First => false,
            Level::Second => self.second.is_disabled,
            Level::Third => self.second.is_disabled || self.third.is_disabled,
        }
    }

    /// Returns the selection for `level` unless the level is disabled.
    pub const fn active(&self, level: Level) -> Option<&SelectOption> {
        if self.is_disabled(level) {
            None
        } else {
            Some(self.selected(level))
        }
    }
}

#[cfg(feature = "serde")]
mod first_slot {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::resolver::SelectOption;

    #[derive(Serialize)]
    struct SlotRef<'a> {
        selected: &'a SelectOption,
    }

    #[derive(Deserialize)]
    struct Slot {
        selected: SelectOption,
    }

    pub fn serialize<S: Serializer>(
        option: &SelectOption,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        SlotRef { selected: option }.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<SelectOption, D::Error> {
        Slot::deserialize(deserializer).map(|slot| slot.selected)
    }
}

/// Returns `preset` when it names a first-level table, otherwise the first eligible table
/// paired with its first reachable table.
pub fn fallback_selections(
    tables: &[Table],
    preset: Option<&LevelSelections>,
    config: &LevelTreeConfig,
) -> LevelSelections {
    if let Some(selections) = preset
        && !selections.first.is_none()
    {
        return selections.clone();
    }

    let Some(first_table) = first_level_tables(tables).into_iter().next() else {
        log::debug!("no table has a link column, nothing to select");
        return LevelSelections::empty();
    };
    let second = next_level_tables(tables, &first_table.id)
        .into_iter()
        .next()
        .map_or_else(SelectOption::none, |table| SelectOption::for_table(table, config));
    log::debug!(
        "falling back to level selection '{}' -> '{}'",
        first_table.id,
        second.value
    );
    LevelSelections {
        first: SelectOption::for_table(first_table, config),
        second: LevelSlot::new(second),
        third: LevelSlot::default(),
    }
}

/// Tracks level selections and their option lists.
///
/// Option lists depend on the level above: level 2 on level 1, level 3 on levels 1 and 2.
#[derive(Clone, Debug)]
pub struct LevelSelectionManager {
    config: LevelTreeConfig,
    selections: LevelSelections,
    first_options: Vec<SelectOption>,
    second_options: Vec<SelectOption>,
    third_options: Vec<SelectOption>,
}

impl LevelSelectionManager {
    /// Creates the manager from persisted selections, falling back when they lack a first level.
    pub fn new(
        tables: &[Table],
        preset: Option<&LevelSelections>,
        config: LevelTreeConfig,
    ) -> Self {
        let selections = fallback_selections(tables, preset, &config);
        let mut manager = Self {
            config,
            selections,
            first_options: Vec::new(),
            second_options: Vec::new(),
            third_options: Vec::new(),
        };
        manager.refresh(tables);
        manager
    }

    /// Current selections.
    #[inline]
    pub const fn selections(&self) -> &LevelSelections {
        &self.selections
    }

    /// Consumes the manager and returns its selections.
    pub fn into_selections(self) -> LevelSelections {
        self.selections
    }

    /// Options offered at `level`.
    pub fn selectable_tables(&self, level: Level) -> &[SelectOption] {
        match level {
            Level::First => &self.first_options,
            Level::Second => &self.second_options,
            Level::Third => &self.third_options,
        }
    }

    /// Returns `false` when level 3 has no candidate tables.
    pub fn third_level_exists(&self) -> bool {
        !self.third_options.is_empty()
    }

    /// Replaces the selections, e.g. after switching presets.
    pub fn reset(&mut self, tables: &[Table], preset: Option<&LevelSelections>) {
        self.selections = fallback_selections(tables, preset, &self.config);
        self.refresh(tables);
    }

    /// Recomputes every option list after the tables changed.
    ///
    /// Selections that are no longer offered fall back to the first option of their level.
    pub fn refresh(&mut self, tables: &[Table]) {
        self.first_options = options(first_level_tables(tables), &self.config);
        let first = Self::keep_or_first(&self.first_options, &self.selections.first);
        if first.value != self.selections.first.value {
            log::debug!(
                "first level '{}' is no longer selectable, using '{}'",
                self.selections.first.value,
                first.value
            );
        }
        self.selections.first = first;
        self.recompute_second(tables, true);
    }

    /// Selects `table_id` at `level` and recomputes the levels below it.
    pub fn select(
        &mut self,
        tables: &[Table],
        level: Level,
        table_id: &str,
    ) -> Result<(), SelectionError> {
        let option = self
            .selectable_tables(level)
            .iter()
            .find(|option| option.value == table_id)
            .cloned()
            .ok_or_else(|| SelectionError::not_selectable(level, table_id))?;

        match level {
            Level::First => {
                self.selections.first = option;
                self.recompute_second(tables, false);
            }
            Level::Second => {
                self.selections.second.selected = option;
                self.recompute_third(tables);
            }
            Level::Third => self.selections.third.selected = option,
        }
        Ok(())
    }

    /// Flips the disabled flag of `level` and returns the new value.
    ///
    /// Level 3 follows level 2 in lockstep; level 3 alone can only be toggled while it has
    /// candidates and level 2 is enabled.
    pub fn toggle_disabled(&mut self, level: Level) -> Result<bool, SelectionError> {
        match level {
            Level::First => Err(SelectionError::AlwaysEnabled(level)),
            Level::Second => {
                let disabled = !self.selections.second.is_disabled;
                self.selections.second.is_disabled = disabled;
                self.selections.third.is_disabled = disabled;
                Ok(disabled)
            }
            Level::Third => {
                if !self.third_level_exists() || self.selections.second.is_disabled {
                    return Err(SelectionError::Unavailable(level));
                }
                let disabled = !self.selections.third.is_disabled;
                self.selections.third.is_disabled = disabled;
                Ok(disabled)
            }
        }
    }

    fn recompute_second(&mut self, tables: &[Table], keep_current: bool) {
        self.second_options = options(
            next_level_tables(tables, &self.selections.first.value),
            &self.config,
        );
        self.selections.second.selected = if keep_current {
            Self::keep_or_first(&self.second_options, &self.selections.second.selected)
        } else {
            Self::first_or_none(&self.second_options)
        };
        self.recompute_third(tables);
    }

    fn recompute_third(&mut self, tables: &[Table]) {
        self.third_options = third_level_options(
            tables,
            &self.selections.first,
            &self.selections.second.selected,
            &self.config,
        );
        self.selections.third.selected =
            Self::keep_or_first(&self.third_options, &self.selections.third.selected);
    }

    fn keep_or_first(options: &[SelectOption], current: &SelectOption) -> SelectOption {
        options
            .iter()
            .find(|option| option.value == current.value)
            .cloned()
            .unwrap_or_else(|| Self::first_or_none(options))
    }

    fn first_or_none(options: &[SelectOption]) -> SelectOption {
        options.first().cloned().unwrap_or_else(SelectOption::none)
    }
}
