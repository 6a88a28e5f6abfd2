use crate::error::PageError;
use crate::projections::{self, DashboardStats, TaskCounts};
use crate::projects::{Project, ProjectStatus};
use crate::services::Services;
use crate::tasks::Task;
use crate::team::TeamMember;

#[derive(Debug, Clone, Default)]
pub struct DashboardData {
    pub projects: Vec<Project>,
    pub tasks: Vec<Task>,
    pub team: Vec<TeamMember>,
}

pub async fn load(services: &Services) -> Result<DashboardData, PageError> {
    let (projects, tasks, team) = tokio::join!(
        services.projects.get_all(),
        services.tasks.get_all(),
        services.team.get_all(),
    );
    Ok(DashboardData {
        projects,
        tasks,
        team,
    })
}

impl DashboardData {
    pub fn stats(&self) -> DashboardStats {
        projections::dashboard_stats(&self.projects, &self.tasks, &self.team)
    }

    /// Projects with status `active`, each with its task counts.
    pub fn active_projects(&self) -> Vec<(&Project, TaskCounts)> {
        projections::projects_with_status(&self.projects, ProjectStatus::Active)
            .into_iter()
            .map(|p| (p, projections::task_count_by_project(&self.tasks, p.id)))
            .collect()
    }

    /// Most recently created tasks first.
    pub fn recent_tasks(&self, limit: usize) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self.tasks.iter().collect();
        tasks.sort_by(|a, b| b.created_on.cmp(&a.created_on).then(b.id.cmp(&a.id)));
        tasks.truncate(limit);
        tasks
    }
}
