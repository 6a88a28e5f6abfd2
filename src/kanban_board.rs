//! Kanban board state and the drag-and-drop status move.
//!
//! Moves are confirm-then-apply: a dropped card stays in its column until
//! the record service has accepted the new status. A rejected move leaves
//! the local task untouched.

use crate::notify::Notifier;
use crate::projections::{find_member, group_by_status};
use crate::record::RecordId;
use crate::tasks::{Task, TaskService, TaskStatus};
use crate::team::TeamMember;

/// Where a card is in the drag-and-drop cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardPhase {
    /// Shown under its last confirmed status.
    Resting,
    /// Held as the drag subject.
    Dragging,
    /// Dropped on another column, status update in flight.
    DropPending,
    /// The last move was rejected; shown under its previous status.
    Reverted,
}

/// A status move handed to the record service and not yet answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingDrop {
    pub task_id: RecordId,
    pub from: TaskStatus,
    pub to: TaskStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropStart {
    /// Nothing is being dragged.
    NoSubject,
    /// Dropped on its own column; nothing to send.
    NoOp,
    Pending(PendingDrop),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    NoSubject,
    NoOp,
    Moved,
    Rejected,
}

#[derive(Debug, Default)]
pub struct KanbanBoard {
    pub tasks: Vec<Task>,
    pub team: Vec<TeamMember>,
    pub selected_status: usize,
    pub selected_task: usize,
    dragged: Option<RecordId>,
    pending: Vec<PendingDrop>,
    reverted: Option<RecordId>,
}

impl KanbanBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<Task>, team: Vec<TeamMember>) -> Self {
        let mut board = Self::new();
        board.replace(tasks, team);
        board
    }

    /// Swaps in freshly loaded tasks. The drag slot is cleared; in-flight
    /// drops still resolve against the new list by id.
    pub fn replace(&mut self, tasks: Vec<Task>, team: Vec<TeamMember>) {
        self.tasks = tasks;
        self.team = team;
        self.dragged = None;
        self.reverted = None;
        self.clamp_cursor();
    }

    pub fn tasks_in(&self, status: TaskStatus) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.status == status).collect()
    }

    pub fn columns(&self) -> [(TaskStatus, Vec<&Task>); 3] {
        group_by_status(&self.tasks)
    }

    pub fn task(&self, id: RecordId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn assignee(&self, task: &Task) -> Option<&TeamMember> {
        find_member(&self.team, task.assignee)
    }

    // ── cursor ─────────────────────────────────────────────────────────

    pub fn selected_column(&self) -> TaskStatus {
        TaskStatus::ALL[self.selected_status.min(TaskStatus::ALL.len() - 1)]
    }

    pub fn selected_card(&self) -> Option<&Task> {
        self.tasks_in(self.selected_column())
            .get(self.selected_task)
            .copied()
    }

    pub fn move_column(&mut self, direction: isize) {
        self.selected_status = (self.selected_status as isize + direction)
            .clamp(0, TaskStatus::ALL.len() as isize - 1) as usize;
        // The hovered column changes while a card is held; the card cursor
        // only follows when nothing is being dragged.
        if self.dragged.is_none() {
            self.clamp_cursor();
        }
    }

    pub fn move_card(&mut self, direction: isize) {
        let len = self.tasks_in(self.selected_column()).len();
        if len == 0 {
            self.selected_task = 0;
            return;
        }
        self.selected_task =
            (self.selected_task as isize + direction).clamp(0, len as isize - 1) as usize;
    }

    fn clamp_cursor(&mut self) {
        let len = self.tasks_in(self.selected_column()).len();
        self.selected_task = self.selected_task.min(len.saturating_sub(1));
    }

    // ── drag and drop ──────────────────────────────────────────────────

    /// Makes `task_id` the drag subject, replacing any current one.
    pub fn drag_start(&mut self, task_id: RecordId) -> bool {
        if self.task(task_id).is_none() {
            return false;
        }
        self.dragged = Some(task_id);
        self.reverted = None;
        true
    }

    /// Picks up the card under the cursor.
    pub fn drag_selected(&mut self) -> bool {
        match self.selected_card().map(|t| t.id) {
            Some(id) => self.drag_start(id),
            None => false,
        }
    }

    pub fn dragged(&self) -> Option<&Task> {
        self.dragged.and_then(|id| self.task(id))
    }

    pub fn is_dragging(&self) -> bool {
        self.dragged.is_some()
    }

    /// Releases the drag subject, whether or not a drop happened.
    pub fn drag_end(&mut self) {
        self.dragged = None;
    }

    /// Decides what dropping the drag subject on `column` requires.
    pub fn begin_drop(&mut self, column: TaskStatus) -> DropStart {
        let Some(task) = self.dragged() else {
            return DropStart::NoSubject;
        };
        if task.status == column {
            return DropStart::NoOp;
        }
        let pending = PendingDrop {
            task_id: task.id,
            from: task.status,
            to: column,
        };
        self.pending.push(pending);
        DropStart::Pending(pending)
    }

    /// Applies the record service's answer to a pending drop.
    ///
    /// `accepted` is whether the service took the status change.
    pub fn resolve(
        &mut self,
        pending: PendingDrop,
        accepted: bool,
        notifier: &dyn Notifier,
    ) -> DropOutcome {
        self.pending.retain(|p| *p != pending);
        if !accepted {
            tracing::warn!(task = %pending.task_id, to = %pending.to, "status move rejected");
            self.reverted = Some(pending.task_id);
            notifier.error("Failed to update task status");
            return DropOutcome::Rejected;
        }

        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == pending.task_id) {
            task.status = pending.to;
        }
        if self.reverted == Some(pending.task_id) {
            self.reverted = None;
        }
        self.clamp_cursor();
        tracing::info!(task = %pending.task_id, from = %pending.from, to = %pending.to, "status moved");
        notifier.success("Task status updated!");
        DropOutcome::Moved
    }

    /// Drops the drag subject on `column` and waits for the service.
    pub async fn drop_on(&mut self, column: TaskStatus, service: &TaskService) -> DropOutcome {
        match self.begin_drop(column) {
            DropStart::NoSubject => DropOutcome::NoSubject,
            DropStart::NoOp => DropOutcome::NoOp,
            DropStart::Pending(pending) => {
                let accepted = service.update_status(pending.task_id, pending.to).await;
                self.resolve(pending, accepted, service.notifier())
            }
        }
    }

    pub fn phase(&self, task_id: RecordId) -> CardPhase {
        if self.pending.iter().any(|p| p.task_id == task_id) {
            CardPhase::DropPending
        } else if self.dragged == Some(task_id) {
            CardPhase::Dragging
        } else if self.reverted == Some(task_id) {
            CardPhase::Reverted
        } else {
            CardPhase::Resting
        }
    }
}
