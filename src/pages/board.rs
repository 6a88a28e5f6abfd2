use crate::error::PageError;
use crate::kanban_board::KanbanBoard;
use crate::projects::Project;
use crate::record::RecordId;
use crate::services::Services;
use crate::tasks::Task;
use crate::team::TeamMember;

use super::{LoadGate, LoadTicket, Page};

pub async fn load_projects(services: &Services) -> Result<Vec<Project>, PageError> {
    Ok(services.projects.get_all().await)
}

/// Tasks of one project plus the team, for the board columns. Failures are
/// reported by the services and leave the lists empty.
pub async fn load_lanes(services: &Services, project: RecordId) -> (Vec<Task>, Vec<TeamMember>) {
    tokio::join!(
        services.tasks.get_by_project_id(project),
        services.team.get_all(),
    )
}

/// Board route state: the project list is a page load, the lanes of the
/// selected project are a second load tracked separately.
#[derive(Debug, Default)]
pub struct BoardPage {
    pub projects: Page<Vec<Project>>,
    selected_project: Option<RecordId>,
    lanes: LoadGate,
    pub board: KanbanBoard,
}

impl BoardPage {
    /// Applies the project list. Keeps the current selection when it still
    /// exists, otherwise picks the first project. Returns the project whose
    /// lanes should be loaded.
    pub fn finish_projects(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<Project>, PageError>,
    ) -> Option<RecordId> {
        if !self.projects.finish(ticket, result) {
            return None;
        }
        let projects = self.projects.data()?;
        let keep = self
            .selected_project
            .filter(|id| projects.iter().any(|p| p.id == *id));
        self.selected_project = keep.or_else(|| projects.first().map(|p| p.id));
        if self.selected_project.is_none() {
            self.board.replace(Vec::new(), Vec::new());
        }
        self.selected_project
    }

    pub fn selected_project_id(&self) -> Option<RecordId> {
        self.selected_project
    }

    pub fn selected_project(&self) -> Option<&Project> {
        let id = self.selected_project?;
        self.projects.data()?.iter().find(|p| p.id == id)
    }

    /// Moves the project selector. Returns the newly selected project.
    pub fn cycle_project(&mut self, direction: isize) -> Option<RecordId> {
        let projects = self.projects.data()?;
        if projects.is_empty() {
            return None;
        }
        let current = self
            .selected_project
            .and_then(|id| projects.iter().position(|p| p.id == id))
            .unwrap_or(0) as isize;
        let len = projects.len() as isize;
        let next = projects[(current + direction).rem_euclid(len) as usize].id;
        if Some(next) == self.selected_project {
            return None;
        }
        self.selected_project = Some(next);
        self.board.replace(Vec::new(), Vec::new());
        Some(next)
    }

    pub fn begin_lanes(&mut self) -> LoadTicket {
        self.lanes.issue()
    }

    pub fn lanes_loading(&self) -> bool {
        self.lanes.is_pending()
    }

    /// Applies loaded lanes if they belong to the current selection.
    pub fn finish_lanes(
        &mut self,
        ticket: LoadTicket,
        project: RecordId,
        tasks: Vec<Task>,
        team: Vec<TeamMember>,
    ) -> bool {
        if !self.lanes.accept(ticket) || self.selected_project != Some(project) {
            return false;
        }
        self.board.replace(tasks, team);
        true
    }

    pub fn cancel(&mut self) {
        self.projects.cancel();
        self.lanes.cancel();
        self.board.drag_end();
    }
}
