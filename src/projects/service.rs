use crate::record::{ListQuery, RecordClient, RecordId, SortType, Table};
use crate::schema::to_record;
use crate::tasks::TaskService;

use super::model::{Project, ProjectInput};

pub const PROJECT_TABLE: Table = Table {
    name: "project_c",
    fields: &[
        "Name",
        "Name_c",
        "Description_c",
        "Status_c",
        "Start_Date_c",
        "Due_Date_c",
        "CreatedOn",
        "ModifiedOn",
    ],
};

/// What happens to a project's tasks when the project is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectDeletePolicy {
    /// Only the project row is deleted.
    #[default]
    KeepTasks,
    /// The project's tasks are deleted first.
    CascadeTasks,
}

#[derive(Clone)]
pub struct ProjectService {
    client: RecordClient,
    tasks: TaskService,
    delete_policy: ProjectDeletePolicy,
}

impl ProjectService {
    pub fn new(client: RecordClient, tasks: TaskService, delete_policy: ProjectDeletePolicy) -> Self {
        Self {
            client,
            tasks,
            delete_policy,
        }
    }

    pub fn delete_policy(&self) -> ProjectDeletePolicy {
        self.delete_policy
    }

    pub async fn get_all(&self) -> Vec<Project> {
        let query = ListQuery::new().order_by("Id", SortType::Asc);
        self.client.list(&PROJECT_TABLE, &query).await
    }

    pub async fn get_by_id(&self, id: RecordId) -> Option<Project> {
        self.client.get_by_id(&PROJECT_TABLE, id).await
    }

    pub async fn create(&self, input: &ProjectInput) -> Option<Project> {
        self.client
            .create(&PROJECT_TABLE, vec![to_record(input)])
            .await
    }

    pub async fn update(&self, id: RecordId, input: &ProjectInput) -> Option<Project> {
        self.client.update(&PROJECT_TABLE, id, to_record(input)).await
    }

    pub async fn delete(&self, id: RecordId) -> bool {
        if self.delete_policy == ProjectDeletePolicy::CascadeTasks {
            let task_ids = match self.tasks.try_ids_by_project(id).await {
                Ok(ids) => ids,
                Err(e) => {
                    tracing::warn!(project = %id, error = %e, "could not list tasks, keeping project");
                    self.client.notifier().error(&e.to_string());
                    return false;
                }
            };
            tracing::info!(project = %id, tasks = task_ids.len(), "cascading project delete");
            if !self.tasks.delete_many(&task_ids).await {
                tracing::warn!(project = %id, "task cascade failed, keeping project");
                return false;
            }
        }
        self.client.delete(&PROJECT_TABLE, &[id]).await
    }
}
