use crate::projects::{ProjectDeletePolicy, ProjectService};
use crate::record::RecordClient;
use crate::tasks::TaskService;
use crate::team::TeamService;

/// The three entity services, all sharing one injected [`RecordClient`].
#[derive(Clone)]
pub struct Services {
    pub projects: ProjectService,
    pub tasks: TaskService,
    pub team: TeamService,
}

impl Services {
    pub fn new(client: RecordClient, delete_policy: ProjectDeletePolicy) -> Self {
        let tasks = TaskService::new(client.clone());
        Self {
            projects: ProjectService::new(client.clone(), tasks.clone(), delete_policy),
            team: TeamService::new(client),
            tasks,
        }
    }
}
