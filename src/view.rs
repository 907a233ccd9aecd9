use crate::action::{ViewAction, ViewEvent};
use crate::builder::{LevelRowNode, build_tree, walk};
use crate::config::LevelTreeConfig;
use crate::expand::{ExpandState, VisibleRow, visible_rows};
use crate::level::Level;
use crate::linker::LinkResolver;
use crate::model::Table;
use crate::preset::{Preset, PresetUpdate};
use crate::resolver::SelectOption;
use crate::selection::{LevelSelectionManager, LevelSelections};

/// View state: level selections, expand flags and the cached level tree of one preset.
///
/// The tree is rebuilt lazily by [`ensure_tree`](Self::ensure_tree) after selections change
/// or after [`invalidate`](Self::invalidate) is called for a data change.
#[derive(Clone, Debug)]
pub struct LevelTreeView {
    config: LevelTreeConfig,
    preset_id: String,
    manager: LevelSelectionManager,
    expand: ExpandState,
    tree: Vec<LevelRowNode>,
    // Marks whether `tree` must be rebuilt.
    dirty: bool,
    // Changes not yet written back to the preset.
    pending: PresetUpdate,
}

impl LevelTreeView {
    /// Creates the view for `preset`, falling back to default selections when it has none.
    pub fn new(tables: &[Table], preset: &Preset, config: LevelTreeConfig) -> Self {
        let manager =
            LevelSelectionManager::new(tables, preset.custom_settings.as_ref(), config.clone());
        Self {
            config,
            preset_id: preset.id.clone(),
            manager,
            expand: ExpandState::from_rows(preset.expanded_rows.clone()),
            tree: Vec::new(),
            dirty: true,
            pending: PresetUpdate::default(),
        }
    }

    /// Reloads selections and expand flags from another preset.
    pub fn switch_preset(&mut self, tables: &[Table], preset: &Preset) {
        log::debug!("switching to preset '{}'", preset.id);
        self.preset_id.clone_from(&preset.id);
        self.manager.reset(tables, preset.custom_settings.as_ref());
        self.expand = ExpandState::from_rows(preset.expanded_rows.clone());
        self.pending = PresetUpdate::default();
        self.dirty = true;
    }

    /// Id of the active preset.
    #[inline]
    pub fn preset_id(&self) -> &str {
        &self.preset_id
    }

    #[inline]
    pub const fn config(&self) -> &LevelTreeConfig {
        &self.config
    }

    /// Current level selections.
    #[inline]
    pub const fn selections(&self) -> &LevelSelections {
        self.manager.selections()
    }

    /// Options offered at `level`.
    pub fn selectable_tables(&self, level: Level) -> &[SelectOption] {
        self.manager.selectable_tables(level)
    }

    /// Returns `false` when level 3 has no candidate tables.
    pub fn third_level_exists(&self) -> bool {
        self.manager.third_level_exists()
    }

    /// The last built tree. Call [`ensure_tree`](Self::ensure_tree) first.
    #[inline]
    pub fn tree(&self) -> &[LevelRowNode] {
        &self.tree
    }

    #[inline]
    pub const fn expand_state(&self) -> &ExpandState {
        &self.expand
    }

    /// Rows currently visible given the expand flags.
    pub fn visible_rows(&self) -> Vec<VisibleRow> {
        visible_rows(&self.tree, &self.expand)
    }

    /// Marks the tree stale after table contents changed.
    pub const fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// Recomputes option lists after the table set or schemas changed.
    pub fn refresh_tables(&mut self, tables: &[Table]) {
        let before = self.manager.selections().clone();
        self.manager.refresh(tables);
        if self.manager.selections() != &before {
            self.pending.custom_settings = Some(self.manager.selections().clone());
        }
        self.dirty = true;
    }

    /// Rebuilds the tree if stale and reconciles the expand flags against it.
    ///
    /// Returns `true` if a rebuild happened.
    pub fn ensure_tree<L: LinkResolver + ?Sized>(
        &mut self,
        tables: &[Table],
        resolver: &L,
    ) -> bool {
        if !self.dirty {
            return false;
        }
        self.tree = build_tree(self.manager.selections(), tables, resolver, &self.config);
        if self.expand.reconcile(&self.tree) {
            log::debug!("expand state reconciled to {} rows", self.expand.rows().len());
        }
        self.dirty = false;
        true
    }

    /// Takes the changes that should be persisted into the active preset.
    pub fn take_preset_update(&mut self) -> Option<PresetUpdate> {
        let update = std::mem::take(&mut self.pending);
        (!update.is_empty()).then_some(update)
    }

    /// Handles an action and returns the resulting event.
    pub fn handle_action<C>(&mut self, tables: &[Table], action: ViewAction<C>) -> ViewEvent<C> {
        match action {
            ViewAction::SelectTable { level, table_id } => {
                match self.manager.select(tables, level, &table_id) {
                    Ok(()) => {
                        self.selections_changed();
                        ViewEvent::Handled
                    }
                    Err(err) => {
                        log::debug!("{err}");
                        ViewEvent::Unhandled
                    }
                }
            }
            ViewAction::ToggleLevelDisabled(level) => match self.manager.toggle_disabled(level) {
                Ok(_) => {
                    self.selections_changed();
                    ViewEvent::Handled
                }
                Err(err) => {
                    log::debug!("{err}");
                    ViewEvent::Unhandled
                }
            },
            ViewAction::ToggleRow(row_id) => {
                let expandable = walk(&self.tree).any(|node| {
                    node.id == row_id && node.level != Level::Third && node.has_children()
                });
                if !expandable {
                    return ViewEvent::Unhandled;
                }
                self.expand.toggle(&row_id);
                self.expand_changed();
                ViewEvent::Handled
            }
            ViewAction::ExpandAll => {
                if self.tree.is_empty() {
                    return ViewEvent::Unhandled;
                }
                self.expand.expand_all(&self.tree);
                self.expand_changed();
                ViewEvent::Handled
            }
            ViewAction::CollapseAll => {
                if self.expand.rows().is_empty() {
                    return ViewEvent::Unhandled;
                }
                self.expand.collapse_all();
                self.expand_changed();
                ViewEvent::Handled
            }
            ViewAction::Custom(custom) => ViewEvent::Action(ViewAction::Custom(custom)),
        }
    }

    fn selections_changed(&mut self) {
        self.pending.custom_settings = Some(self.manager.selections().clone());
        self.dirty = true;
    }

    fn expand_changed(&mut self) {
        self.pending.expanded_rows = Some(self.expand.rows().to_vec());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expand::ExpandedRowInfo;
    use crate::fixtures;
    use crate::linker::CellLinks;
    use crate::model::Row;
    use crate::preset::PresetStore;

    fn view(tables: &[Table], preset: &Preset) -> LevelTreeView {
        let mut view = LevelTreeView::new(tables, preset, LevelTreeConfig::new());
        view.ensure_tree(tables, &CellLinks);
        view
    }

    fn visible_ids(view: &LevelTreeView) -> Vec<String> {
        view.visible_rows().into_iter().map(|row| row.id).collect()
    }

    #[test]
    fn builds_from_fallback_selections() {
        let tables = fixtures::tables();
        let view = view(&tables, &Preset::new("p1", "Default"));

        assert_eq!(view.tree().len(), 1);
        assert_eq!(view.expand_state().rows().len(), 3);
        assert_eq!(visible_ids(&view), vec!["P1"]);
    }

    #[test]
    fn rebuild_is_lazy() {
        let tables = fixtures::tables();
        let mut view = view(&tables, &Preset::new("p1", "Default"));

        assert!(!view.ensure_tree(&tables, &CellLinks));
        view.invalidate();
        assert!(view.ensure_tree(&tables, &CellLinks));
    }

    #[test]
    fn toggling_rows_records_update() {
        let tables = fixtures::tables();
        let mut view = view(&tables, &Preset::new("p1", "Default"));

        let event = view.handle_action::<()>(&tables, ViewAction::ToggleRow("P1".into()));
        assert_eq!(event, ViewEvent::Handled);
        assert_eq!(visible_ids(&view), vec!["P1", "M1"]);

        let update = view.take_preset_update().unwrap();
        assert_eq!(
            update.expanded_rows.unwrap()[0],
            ExpandedRowInfo::new("P1", true)
        );
        assert!(update.custom_settings.is_none());
        assert!(view.take_preset_update().is_none());
    }

    #[test]
    fn leaf_rows_cannot_be_toggled() {
        let tables = fixtures::tables();
        let mut view = view(&tables, &Preset::new("p1", "Default"));

        for row_id in ["T1", "zz"] {
            let event = view.handle_action::<()>(&tables, ViewAction::ToggleRow(row_id.into()));
            assert_eq!(event, ViewEvent::Unhandled);
        }
        assert!(view.take_preset_update().is_none());
    }

    #[test]
    fn disabling_second_level_rebuilds_flat_tree() {
        let tables = fixtures::tables();
        let mut view = view(&tables, &Preset::new("p1", "Default"));

        let event =
            view.handle_action::<()>(&tables, ViewAction::ToggleLevelDisabled(Level::Second));
        assert_eq!(event, ViewEvent::Handled);
        assert!(view.ensure_tree(&tables, &CellLinks));

        assert!(view.tree()[0].children.is_empty());
        assert_eq!(view.expand_state().rows().len(), 1);
        let update = view.take_preset_update().unwrap();
        assert!(update.custom_settings.unwrap().third.is_disabled);
    }

    #[test]
    fn selecting_unoffered_table_is_unhandled() {
        let tables = fixtures::tables();
        let mut view = view(&tables, &Preset::new("p1", "Default"));

        let event = view.handle_action::<()>(
            &tables,
            ViewAction::SelectTable {
                level: Level::Third,
                table_id: "projects".into(),
            },
        );

        assert_eq!(event, ViewEvent::Unhandled);
    }

    #[test]
    fn custom_actions_are_forwarded() {
        let tables = fixtures::tables();
        let mut view = view(&tables, &Preset::new("p1", "Default"));

        assert_eq!(
            view.handle_action(&tables, ViewAction::Custom(7)),
            ViewEvent::Action(ViewAction::Custom(7))
        );
    }

    #[test]
    fn expand_all_then_collapse_all() {
        let tables = fixtures::wide_tables();
        let mut view = view(&tables, &Preset::new("p1", "Default"));

        view.handle_action::<()>(&tables, ViewAction::ExpandAll);
        assert_eq!(visible_ids(&view), vec!["P1", "M1", "T1", "P2", "M1", "T1", "M2", "T2"]);

        view.handle_action::<()>(&tables, ViewAction::CollapseAll);
        assert_eq!(visible_ids(&view), vec!["P1", "P2"]);
    }

    #[test]
    fn new_rows_keep_existing_flags() {
        let mut tables = fixtures::tables();
        let mut view = view(&tables, &Preset::new("p1", "Default"));
        view.handle_action::<()>(&tables, ViewAction::ToggleRow("P1".into()));

        tables[0].rows.push(Row::new("P3").with("0000", "Later"));
        view.invalidate();
        view.ensure_tree(&tables, &CellLinks);

        assert_eq!(visible_ids(&view), vec!["P1", "M1", "P3"]);
    }

    #[test]
    fn switching_presets_restores_state_and_round_trips_through_store() {
        let tables = fixtures::tables();
        let mut roadmap = Preset::new("p2", "Roadmap");
        roadmap.custom_settings = Some(fixtures::selections());
        roadmap.expanded_rows = vec![
            ExpandedRowInfo::new("P1", true),
            ExpandedRowInfo::new("M1", true),
        ];
        let mut store = PresetStore::new(vec![Preset::new("p1", "Default"), roadmap]);

        let mut view = view(&tables, &store.presets[0]);
        let Some(roadmap) = store.get("p2").cloned() else {
            panic!("preset p2 missing");
        };
        view.switch_preset(&tables, &roadmap);
        view.ensure_tree(&tables, &CellLinks);
        assert_eq!(visible_ids(&view), vec!["P1", "M1", "T1"]);

        view.handle_action::<()>(&tables, ViewAction::ToggleRow("M1".into()));
        let preset_id = view.preset_id().to_owned();
        let update = view.take_preset_update().unwrap();
        store.apply(&preset_id, update).unwrap();

        assert_eq!(
            store.get("p2").unwrap().expanded_rows,
            vec![
                ExpandedRowInfo::new("P1", true),
                ExpandedRowInfo::new("M1", false),
                ExpandedRowInfo::new("T1", false),
            ]
        );
    }

    #[test]
    fn refresh_tables_persists_fallback_selection() {
        let mut tables = fixtures::tables();
        let mut preset = Preset::new("p1", "Default");
        preset.custom_settings = Some(fixtures::selections());
        let mut view = view(&tables, &preset);

        tables.remove(0);
        view.refresh_tables(&tables);
        view.ensure_tree(&tables, &CellLinks);

        let update = view.take_preset_update().unwrap();
        assert_eq!(update.custom_settings.unwrap().first.value, "milestones");
        assert_eq!(view.tree()[0].id, "M1");
    }
}
