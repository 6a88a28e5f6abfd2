use crate::error::PageError;
use crate::projections::{task_count_by_project, TaskCounts};
use crate::projects::{Project, ProjectStatus};
use crate::services::Services;
use crate::tasks::Task;

use super::Page;

#[derive(Debug, Clone, Default)]
pub struct ProjectsData {
    pub projects: Vec<Project>,
    pub tasks: Vec<Task>,
}

pub async fn load(services: &Services) -> Result<ProjectsData, PageError> {
    let (projects, tasks) = tokio::join!(services.projects.get_all(), services.tasks.get_all());
    Ok(ProjectsData { projects, tasks })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ProjectStatus),
}

impl StatusFilter {
    /// Cycles `All -> planning -> active -> on-hold -> completed -> All`.
    pub fn next(self) -> Self {
        let statuses = ProjectStatus::ALL;
        match self {
            StatusFilter::All => StatusFilter::Only(statuses[0]),
            StatusFilter::Only(current) => statuses
                .iter()
                .position(|s| *s == current)
                .and_then(|i| statuses.get(i + 1))
                .map_or(StatusFilter::All, |s| StatusFilter::Only(*s)),
        }
    }

    pub fn matches(self, project: &Project) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(status) => project.status == status,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Only(status) => status.label(),
        }
    }
}

/// The projects list with its filter and cursor.
#[derive(Debug, Default)]
pub struct ProjectsPage {
    pub page: Page<ProjectsData>,
    pub filter: StatusFilter,
    pub selected: usize,
}

impl ProjectsPage {
    pub fn filtered(&self) -> Vec<(&Project, TaskCounts)> {
        let Some(data) = self.page.data() else {
            return Vec::new();
        };
        data.projects
            .iter()
            .filter(|p| self.filter.matches(p))
            .map(|p| (p, task_count_by_project(&data.tasks, p.id)))
            .collect()
    }

    pub fn cycle_filter(&mut self) {
        self.filter = self.filter.next();
        self.selected = 0;
    }

    pub fn move_selection(&mut self, direction: isize) {
        let len = self.filtered().len();
        self.selected = if len == 0 {
            0
        } else {
            (self.selected as isize + direction).clamp(0, len as isize - 1) as usize
        };
    }

    pub fn selected_project(&self) -> Option<&Project> {
        self.filtered().get(self.selected).map(|(p, _)| *p)
    }
}
