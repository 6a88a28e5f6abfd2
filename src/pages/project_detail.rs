use crate::error::PageError;
use crate::projections::{self, TaskCounts};
use crate::projects::Project;
use crate::record::RecordId;
use crate::services::Services;
use crate::tasks::{Task, TaskStatus};
use crate::team::TeamMember;

#[derive(Debug, Clone)]
pub struct ProjectDetail {
    pub project: Project,
    pub tasks: Vec<Task>,
    pub team: Vec<TeamMember>,
}

/// Loads one project with its tasks and the team. A missing project fails
/// the page.
pub async fn load(services: &Services, id: RecordId) -> Result<ProjectDetail, PageError> {
    let (project, tasks, team) = tokio::join!(
        services.projects.get_by_id(id),
        services.tasks.get_by_project_id(id),
        services.team.get_all(),
    );
    let project = project.ok_or(PageError::NotFound("Project"))?;
    Ok(ProjectDetail {
        project,
        tasks,
        team,
    })
}

impl ProjectDetail {
    pub fn columns(&self) -> [(TaskStatus, Vec<&Task>); 3] {
        projections::group_by_status(&self.tasks)
    }

    pub fn counts(&self) -> TaskCounts {
        TaskCounts::tally(&self.tasks)
    }

    pub fn assignee(&self, task: &Task) -> Option<&TeamMember> {
        projections::find_member(&self.team, task.assignee)
    }
}
