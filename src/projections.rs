//! Derived view values. Recomputed from the raw lists on every render.

use serde::Serialize;

use crate::projects::{Project, ProjectStatus};
use crate::record::RecordId;
use crate::tasks::{Task, TaskStatus};
use crate::team::TeamMember;

/// Number of tasks per board column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskCounts {
    pub todo: usize,
    #[serde(rename = "in-progress")]
    pub in_progress: usize,
    pub done: usize,
}

impl TaskCounts {
    pub fn tally<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        tasks.into_iter().fold(Self::default(), |mut counts, task| {
            match task.status {
                TaskStatus::Todo => counts.todo += 1,
                TaskStatus::InProgress => counts.in_progress += 1,
                TaskStatus::Done => counts.done += 1,
            }
            counts
        })
    }

    pub fn get(&self, status: TaskStatus) -> usize {
        match status {
            TaskStatus::Todo => self.todo,
            TaskStatus::InProgress => self.in_progress,
            TaskStatus::Done => self.done,
        }
    }

    pub fn total(&self) -> usize {
        self.todo + self.in_progress + self.done
    }

    /// Share of done tasks, 0-100.
    pub fn progress(&self) -> u16 {
        percent(self.done, self.total())
    }
}

pub fn task_count_by_project(tasks: &[Task], project_id: RecordId) -> TaskCounts {
    TaskCounts::tally(tasks.iter().filter(|t| t.project == project_id))
}

/// Splits tasks into the three columns, in column order.
pub fn group_by_status(tasks: &[Task]) -> [(TaskStatus, Vec<&Task>); 3] {
    TaskStatus::ALL.map(|status| (status, tasks.iter().filter(|t| t.status == status).collect()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadLevel {
    Low,
    Medium,
    High,
}

/// Tasks assigned to one member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Workload {
    pub total: usize,
    pub in_progress: usize,
    pub completed: usize,
}

impl Workload {
    /// In-progress share of the member's tasks, rounded, 0 when unassigned.
    pub fn percent(&self) -> u16 {
        percent(self.in_progress, self.total)
    }

    pub fn level(&self) -> WorkloadLevel {
        match self.percent() {
            p if p > 75 => WorkloadLevel::High,
            p if p > 50 => WorkloadLevel::Medium,
            _ => WorkloadLevel::Low,
        }
    }
}

pub fn member_workload(tasks: &[Task], member_id: RecordId) -> Workload {
    let assigned: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.assignee == Some(member_id))
        .collect();
    Workload {
        total: assigned.len(),
        in_progress: assigned
            .iter()
            .filter(|t| t.status == TaskStatus::InProgress)
            .count(),
        completed: assigned
            .iter()
            .filter(|t| t.status == TaskStatus::Done)
            .count(),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_projects: usize,
    pub active_tasks: usize,
    pub completed_tasks: usize,
    pub team_members: usize,
}

pub fn dashboard_stats(projects: &[Project], tasks: &[Task], team: &[TeamMember]) -> DashboardStats {
    let completed_tasks = tasks.iter().filter(|t| t.status == TaskStatus::Done).count();
    DashboardStats {
        total_projects: projects.len(),
        active_tasks: tasks.len() - completed_tasks,
        completed_tasks,
        team_members: team.len(),
    }
}

pub fn projects_with_status(projects: &[Project], status: ProjectStatus) -> Vec<&Project> {
    projects.iter().filter(|p| p.status == status).collect()
}

pub fn find_member(team: &[TeamMember], id: Option<RecordId>) -> Option<&TeamMember> {
    let id = id?;
    team.iter().find(|m| m.id == id)
}

fn percent(part: usize, whole: usize) -> u16 {
    if whole == 0 {
        0
    } else {
        ((part as f64 / whole as f64) * 100.0).round() as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn task(id: i64, project: i64, status: &str, assignee: Option<i64>) -> Task {
        serde_json::from_value(json!({
            "Id": id,
            "Title_c": format!("task {id}"),
            "Status_c": status,
            "project_c": project,
            "Assigned_To_c": assignee,
        }))
        .unwrap()
    }

    #[test]
    fn test_task_count_by_project_matches_wire_shape() {
        let tasks = vec![
            task(1, 1, "todo", None),
            task(2, 1, "in-progress", None),
            task(3, 1, "done", None),
            task(4, 2, "done", None),
        ];
        let counts = task_count_by_project(&tasks, RecordId(1));
        assert_eq!(
            serde_json::to_value(counts).unwrap(),
            json!({"todo": 1, "in-progress": 1, "done": 1})
        );
        assert_eq!(counts.progress(), 33);
    }

    #[test]
    fn test_group_by_status_partitions_without_loss() {
        let tasks = vec![
            task(1, 1, "done", None),
            task(2, 1, "todo", None),
            task(3, 1, "done", None),
        ];
        let columns = group_by_status(&tasks);
        let total: usize = columns.iter().map(|(_, c)| c.len()).sum();
        assert_eq!(total, tasks.len());
        assert_eq!(columns[2].0, TaskStatus::Done);
        assert_eq!(columns[2].1.len(), 2);
    }

    #[test]
    fn test_workload_rounding_and_levels() {
        let tasks = vec![
            task(1, 1, "in-progress", Some(5)),
            task(2, 1, "in-progress", Some(5)),
            task(3, 1, "done", Some(5)),
            task(4, 1, "in-progress", Some(6)),
        ];
        let ada = member_workload(&tasks, RecordId(5));
        assert_eq!(ada, Workload { total: 3, in_progress: 2, completed: 1 });
        assert_eq!(ada.percent(), 67);
        assert_eq!(ada.level(), WorkloadLevel::Medium);

        assert_eq!(member_workload(&tasks, RecordId(6)).level(), WorkloadLevel::High);
        assert_eq!(member_workload(&tasks, RecordId(7)).percent(), 0);
    }

    #[test]
    fn test_dashboard_stats() {
        let tasks = vec![task(1, 1, "todo", None), task(2, 1, "done", None)];
        let stats = dashboard_stats(&[], &tasks, &[]);
        assert_eq!(stats.active_tasks, 1);
        assert_eq!(stats.completed_tasks, 1);
    }
}
