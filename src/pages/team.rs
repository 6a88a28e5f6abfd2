use crate::error::PageError;
use crate::projections::{member_workload, Workload};
use crate::services::Services;
use crate::tasks::Task;
use crate::team::TeamMember;

#[derive(Debug, Clone, Default)]
pub struct TeamData {
    pub members: Vec<TeamMember>,
    pub tasks: Vec<Task>,
}

pub async fn load(services: &Services) -> Result<TeamData, PageError> {
    let (members, tasks) = tokio::join!(services.team.get_all(), services.tasks.get_all());
    Ok(TeamData { members, tasks })
}

impl TeamData {
    pub fn workload(&self, member: &TeamMember) -> Workload {
        member_workload(&self.tasks, member.id)
    }

    pub fn rows(&self) -> Vec<(&TeamMember, Workload)> {
        self.members.iter().map(|m| (m, self.workload(m))).collect()
    }
}
