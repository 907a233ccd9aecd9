//! Projects → Milestones → Tasks tables shared by the unit tests.
//!
//! Link ids live in the row cells under the link column key, which is what
//! [`CellLinks`](crate::linker::CellLinks) reads.

use crate::model::{CellValue, Column, LinkData, Row, Table};
use crate::resolver::SelectOption;
use crate::selection::{LevelSelections, LevelSlot};

fn links(ids: &[&str]) -> CellValue {
    CellValue::List(ids.iter().map(|id| CellValue::from(*id)).collect())
}

fn project_milestone() -> LinkData {
    LinkData::new("l1", "projects", "milestones")
}

fn milestone_task() -> LinkData {
    LinkData::new("l2", "milestones", "tasks")
}

pub fn tables() -> Vec<Table> {
    let projects = Table::new("projects", "Projects")
        .with_column(Column::new("0000", "Name", "text"))
        .with_column(Column::link("ms", "Milestones", project_milestone()))
        .with_row(Row::new("P1").with("0000", "Launch").with("ms", links(&["M1"])));

    let milestones = Table::new("milestones", "Milestones")
        .with_column(Column::new("0000", "Name", "text"))
        .with_column(Column::link("proj", "Project", project_milestone()))
        .with_column(Column::link("tasks", "Tasks", milestone_task()))
        .with_row(
            Row::new("M1")
                .with("0000", "Beta")
                .with("proj", links(&["P1"]))
                .with("tasks", links(&["T1"])),
        );

    let tasks = Table::new("tasks", "Tasks")
        .with_column(Column::new("0000", "Name", "text"))
        .with_column(Column::link("ms", "Milestone", milestone_task()))
        .with_row(Row::new("T1").with("0000", "Write docs").with("ms", links(&["M1"])));

    vec![projects, milestones, tasks]
}

/// A richer data set: two projects, shared milestones and a dangling task link.
pub fn wide_tables() -> Vec<Table> {
    let mut tables = tables();
    tables[0].rows.push(Row::new("P2").with("0000", 7.0).with("ms", links(&["M1", "M2"])));
    tables[1].rows.push(
        Row::new("M2")
            .with("0000", "GA")
            .with("proj", links(&["P2"]))
            .with("tasks", links(&["T2", "T99"])),
    );
    tables[2].rows.push(Row::new("T2").with("0000", "Ship").with("ms", links(&["M2"])));
    tables
}

pub fn selections() -> LevelSelections {
    LevelSelections {
        first: SelectOption::new("projects", "Projects"),
        second: LevelSlot::new(SelectOption::new("milestones", "Milestones")),
        third: LevelSlot::new(SelectOption::new("tasks", "Tasks")),
    }
}
