use crate::error::RecordError;
use crate::notify::Notifier;
use crate::record::{record_id, ListQuery, RecordClient, RecordId, SortType, Table};
use crate::schema::to_record;

use super::model::{Task, TaskInput, TaskStatus};

pub const TASK_TABLE: Table = Table {
    name: "task_c",
    fields: &[
        "Name",
        "Title_c",
        "Description_c",
        "Status_c",
        "Priority_c",
        "project_c",
        "Assigned_To_c",
        "Due_Date_c",
        "CreatedOn",
        "ModifiedOn",
    ],
};

/// Typed access to the task table.
#[derive(Clone)]
pub struct TaskService {
    client: RecordClient,
}

impl TaskService {
    pub fn new(client: RecordClient) -> Self {
        Self { client }
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.client.notifier()
    }

    fn ordered() -> ListQuery {
        ListQuery::new().order_by("Id", SortType::Asc)
    }

    pub async fn get_all(&self) -> Vec<Task> {
        self.client.list(&TASK_TABLE, &Self::ordered()).await
    }

    pub async fn get_by_id(&self, id: RecordId) -> Option<Task> {
        self.client.get_by_id(&TASK_TABLE, id).await
    }

    /// Tasks of one project, filtered by the service.
    pub async fn get_by_project_id(&self, project_id: RecordId) -> Vec<Task> {
        let query = Self::ordered().equal_to("project_c", project_id.get());
        self.client.list(&TASK_TABLE, &query).await
    }

    /// Ids of one project's tasks. Unlike the listing above, a failed fetch
    /// is returned to the caller.
    pub async fn try_ids_by_project(&self, project_id: RecordId) -> Result<Vec<RecordId>, RecordError> {
        let query = Self::ordered().equal_to("project_c", project_id.get());
        let rows = self.client.try_list(&TASK_TABLE, &query).await?;
        Ok(rows.iter().filter_map(record_id).collect())
    }

    pub async fn get_by_assignee(&self, member_id: RecordId) -> Vec<Task> {
        let query = Self::ordered().equal_to("Assigned_To_c", member_id.get());
        self.client.list(&TASK_TABLE, &query).await
    }

    pub async fn create(&self, input: &TaskInput) -> Option<Task> {
        self.create_batch(std::slice::from_ref(input)).await
    }

    /// Creates several tasks at once. Rejected entries are reported one by
    /// one; the first accepted task is returned.
    pub async fn create_batch(&self, inputs: &[TaskInput]) -> Option<Task> {
        let records = inputs.iter().map(to_record).collect();
        self.client.create(&TASK_TABLE, records).await
    }

    pub async fn update(&self, id: RecordId, input: &TaskInput) -> Option<Task> {
        self.client.update(&TASK_TABLE, id, to_record(input)).await
    }

    /// Partial update of the status column only. True when the service
    /// accepted the change.
    pub async fn update_status(&self, id: RecordId, status: TaskStatus) -> bool {
        tracing::info!(task = %id, %status, "updating task status");
        self.client
            .patch(&TASK_TABLE, id, to_record(&TaskInput::status_only(status)))
            .await
    }

    pub async fn delete(&self, id: RecordId) -> bool {
        self.delete_many(&[id]).await
    }

    pub async fn delete_many(&self, ids: &[RecordId]) -> bool {
        self.client.delete(&TASK_TABLE, ids).await
    }
}
