//! Named bundles of level selections and expand flags, as persisted by the host.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::PresetError;
use crate::expand::ExpandedRowInfo;
use crate::selection::LevelSelections;

/// A saved view: level selections plus expand flags.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Preset {
    #[cfg_attr(feature = "serde", serde(rename = "_id"))]
    pub id: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub custom_settings: Option<LevelSelections>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub expanded_rows: Vec<ExpandedRowInfo>,
}

impl Preset {
    /// Creates a preset with no selections and nothing expanded.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            custom_settings: None,
            expanded_rows: Vec::new(),
        }
    }

    /// Applies the non-empty parts of `update`.
    pub fn apply(&mut self, update: PresetUpdate) {
        if let Some(selections) = update.custom_settings {
            self.custom_settings = Some(selections);
        }
        if let Some(rows) = update.expanded_rows {
            self.expanded_rows = rows;
        }
    }
}

/// Changes to write back to a preset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PresetUpdate {
    pub custom_settings: Option<LevelSelections>,
    pub expanded_rows: Option<Vec<ExpandedRowInfo>>,
}

impl PresetUpdate {
    /// Returns `true` when there is nothing to write back.
    pub const fn is_empty(&self) -> bool {
        self.custom_settings.is_none() && self.expanded_rows.is_none()
    }
}

/// All presets of the plugin.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PresetStore {
    #[cfg_attr(feature = "serde", serde(default))]
    pub presets: Vec<Preset>,
}

impl PresetStore {
    /// Creates a store from existing presets.
    pub fn new(presets: Vec<Preset>) -> Self {
        Self { presets }
    }

    /// Finds a preset by id.
    pub fn get(&self, preset_id: &str) -> Option<&Preset> {
        self.presets.iter().find(|preset| preset.id == preset_id)
    }

    /// Finds a preset by id for mutation.
    pub fn get_mut(&mut self, preset_id: &str) -> Option<&mut Preset> {
        self.presets.iter_mut().find(|preset| preset.id == preset_id)
    }

    /// Writes `update` into the preset `preset_id`.
    pub fn apply(&mut self, preset_id: &str, update: PresetUpdate) -> Result<(), PresetError> {
        let preset = self
            .get_mut(preset_id)
            .ok_or_else(|| PresetError::UnknownPreset(preset_id.to_owned()))?;
        preset.apply(update);
        Ok(())
    }

    /// Parses the host's plugin settings.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, PresetError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the store in the host's plugin settings format.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, PresetError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn apply_updates_only_given_parts() {
        let mut store = PresetStore::new(vec![Preset::new("p1", "Default")]);
        store
            .apply(
                "p1",
                PresetUpdate {
                    custom_settings: Some(fixtures::selections()),
                    expanded_rows: None,
                },
            )
            .unwrap();
        store
            .apply(
                "p1",
                PresetUpdate {
                    custom_settings: None,
                    expanded_rows: Some(vec![ExpandedRowInfo::new("P1", true)]),
                },
            )
            .unwrap();

        let preset = store.get("p1").unwrap();
        assert_eq!(preset.custom_settings, Some(fixtures::selections()));
        assert_eq!(preset.expanded_rows, vec![ExpandedRowInfo::new("P1", true)]);
    }

    #[test]
    fn apply_to_unknown_preset_fails() {
        let mut store = PresetStore::default();

        let err = store.apply("nope", PresetUpdate::default()).unwrap_err();

        assert!(matches!(err, PresetError::UnknownPreset(id) if id == "nope"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn loads_host_settings() {
        let json = r#"{
            "presets": [{
                "_id": "p1",
                "name": "Roadmap",
                "customSettings": {
                    "first": { "selected": { "value": "projects", "label": "Projects" } },
                    "second": {
                        "selected": { "value": "milestones", "label": "Milestones" },
                        "isDisabled": false
                    },
                    "third": {
                        "selected": { "value": "tasks", "label": "Tasks" },
                        "isDisabled": true
                    }
                },
                "expandedRows": [{ "0000": "Launch", "_id": "P1", "expanded": true }],
                "settings": { "resize_details": [] }
            }]
        }"#;

        let store = PresetStore::from_json(json).unwrap();

        let preset = store.get("p1").unwrap();
        let selections = preset.custom_settings.as_ref().unwrap();
        assert_eq!(selections.first.value, "projects");
        assert!(selections.third.is_disabled);
        assert_eq!(preset.expanded_rows, vec![ExpandedRowInfo::new("P1", true)]);

        let round = PresetStore::from_json(&store.to_json().unwrap()).unwrap();
        assert_eq!(round, store);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn malformed_settings_are_reported() {
        let err = PresetStore::from_json("{\"presets\": 3}").unwrap_err();
        assert!(matches!(err, PresetError::Decode(_)));
    }
}
