//! Application state and event handling, independent of the terminal.

use std::future::Future;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc::UnboundedSender;

use crate::error::PageError;
use crate::form::{Form, FormKind, Submission};
use crate::kanban_board::{DropStart, PendingDrop};
use crate::notify::{Notifier, Toasts};
use crate::pages::board::{self, BoardPage};
use crate::pages::dashboard::{self, DashboardData};
use crate::pages::project_detail::{self, ProjectDetail};
use crate::pages::projects::{self, ProjectsData, ProjectsPage};
use crate::pages::team::{self, TeamData};
use crate::pages::{LoadTicket, Page};
use crate::projects::Project;
use crate::record::RecordId;
use crate::routes::Route;
use crate::services::Services;
use crate::tasks::Task;
use crate::team::TeamMember;

/// Results of background work, delivered back to the event loop.
#[derive(Debug)]
pub enum AppEvent {
    Dashboard(LoadTicket, Result<DashboardData, PageError>),
    Projects(LoadTicket, Result<ProjectsData, PageError>),
    ProjectDetail(LoadTicket, Result<ProjectDetail, PageError>),
    Team(LoadTicket, Result<TeamData, PageError>),
    BoardProjects(LoadTicket, Result<Vec<Project>, PageError>),
    BoardLanes {
        ticket: LoadTicket,
        project: RecordId,
        tasks: Vec<Task>,
        team: Vec<TeamMember>,
    },
    Dropped(PendingDrop, bool),
    FormSaved { kind: FormKind, saved: bool },
    ProjectDeleted { id: RecordId, deleted: bool },
}

pub struct App {
    services: Services,
    pub toasts: Toasts,
    pub route: Route,
    pub dashboard: Page<DashboardData>,
    pub projects: ProjectsPage,
    pub project_detail: Page<ProjectDetail>,
    pub team: Page<TeamData>,
    pub board: BoardPage,
    pub form: Option<Form>,
    tx: UnboundedSender<AppEvent>,
    pub should_quit: bool,
}

impl App {
    pub fn new(services: Services, toasts: Toasts, tx: UnboundedSender<AppEvent>) -> Self {
        Self {
            services,
            toasts,
            route: Route::Dashboard,
            dashboard: Page::new(),
            projects: ProjectsPage::default(),
            project_detail: Page::new(),
            team: Page::new(),
            board: BoardPage::default(),
            form: None,
            tx,
            should_quit: false,
        }
    }

    fn spawn<F>(&self, work: F)
    where
        F: Future<Output = AppEvent> + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            if tx.send(work.await).is_err() {
                tracing::debug!("event loop gone, dropping result");
            }
        });
    }

    // ── navigation and loading ─────────────────────────────────────────

    /// Leaves the current page, cancelling its load, and loads `route`.
    pub fn navigate(&mut self, route: Route) {
        self.cancel_current();
        if let Route::ProjectDetail(id) = route {
            if self.route != route {
                tracing::debug!(project = %id, "opening project detail");
                self.project_detail = Page::new();
            }
        }
        tracing::info!(route = %route, "navigate");
        self.route = route;
        self.load_current();
    }

    fn cancel_current(&mut self) {
        match self.route {
            Route::Dashboard => self.dashboard.cancel(),
            Route::Projects => self.projects.page.cancel(),
            Route::ProjectDetail(_) => self.project_detail.cancel(),
            Route::Board => self.board.cancel(),
            Route::Team => self.team.cancel(),
        }
    }

    /// (Re)loads the current page. A failed page stays failed until retried.
    pub fn load_current(&mut self) {
        self.start_load(false);
    }

    pub fn retry(&mut self) {
        self.start_load(true);
    }

    fn start_load(&mut self, retry: bool) {
        fn ticket<T>(page: &mut Page<T>, retry: bool) -> Option<LoadTicket> {
            if retry {
                page.retry()
            } else {
                page.begin()
            }
        }

        let services = self.services.clone();
        match self.route {
            Route::Dashboard => {
                if let Some(t) = ticket(&mut self.dashboard, retry) {
                    self.spawn(async move { AppEvent::Dashboard(t, dashboard::load(&services).await) });
                }
            }
            Route::Projects => {
                if let Some(t) = ticket(&mut self.projects.page, retry) {
                    self.spawn(async move { AppEvent::Projects(t, projects::load(&services).await) });
                }
            }
            Route::ProjectDetail(id) => {
                if let Some(t) = ticket(&mut self.project_detail, retry) {
                    self.spawn(async move {
                        AppEvent::ProjectDetail(t, project_detail::load(&services, id).await)
                    });
                }
            }
            Route::Team => {
                if let Some(t) = ticket(&mut self.team, retry) {
                    self.spawn(async move { AppEvent::Team(t, team::load(&services).await) });
                }
            }
            Route::Board => {
                if let Some(t) = ticket(&mut self.board.projects, retry) {
                    self.spawn(async move {
                        AppEvent::BoardProjects(t, board::load_projects(&services).await)
                    });
                }
            }
        }
    }

    fn load_lanes(&mut self, project: RecordId) {
        let ticket = self.board.begin_lanes();
        let services = self.services.clone();
        self.spawn(async move {
            let (tasks, team) = board::load_lanes(&services, project).await;
            AppEvent::BoardLanes {
                ticket,
                project,
                tasks,
                team,
            }
        });
    }

    // ── background results ─────────────────────────────────────────────

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Dashboard(ticket, result) => {
                self.dashboard.finish(ticket, result);
            }
            AppEvent::Projects(ticket, result) => {
                self.projects.page.finish(ticket, result);
                self.projects.move_selection(0);
            }
            AppEvent::ProjectDetail(ticket, result) => {
                self.project_detail.finish(ticket, result);
            }
            AppEvent::Team(ticket, result) => {
                self.team.finish(ticket, result);
            }
            AppEvent::BoardProjects(ticket, result) => {
                if let Some(project) = self.board.finish_projects(ticket, result) {
                    self.load_lanes(project);
                }
            }
            AppEvent::BoardLanes {
                ticket,
                project,
                tasks,
                team,
            } => {
                if !self.board.finish_lanes(ticket, project, tasks, team) {
                    tracing::debug!(project = %project, "dropping stale board lanes");
                }
            }
            AppEvent::Dropped(pending, accepted) => {
                self.board.board.resolve(pending, accepted, &self.toasts);
            }
            AppEvent::FormSaved { kind, saved } => self.form_saved(kind, saved),
            AppEvent::ProjectDeleted { id, deleted } => {
                if deleted {
                    tracing::info!(project = %id, "project deleted");
                    self.toasts.success("Project deleted successfully!");
                    self.load_current();
                } else {
                    self.toasts.error("Failed to delete project");
                }
            }
        }
    }

    fn form_saved(&mut self, kind: FormKind, saved: bool) {
        match (kind, saved) {
            (FormKind::Project, true) => self.toasts.success("Project created successfully!"),
            (FormKind::Task { .. }, true) => self.toasts.success("Task created successfully!"),
            (FormKind::Project, false) => self.toasts.error("Failed to create project"),
            (FormKind::Task { .. }, false) => self.toasts.error("Failed to create task"),
        }
        if !saved {
            return;
        }
        match (self.route, kind) {
            (Route::Board, FormKind::Task { project }) => {
                if self.board.selected_project_id() == Some(project) {
                    self.load_lanes(project);
                }
            }
            _ => self.load_current(),
        }
    }

    // ── forms ──────────────────────────────────────────────────────────

    pub fn open_form(&mut self, form: Form) {
        self.form = Some(form);
    }

    /// Validates the open form and sends it. Invalid forms stay open with
    /// the problem shown.
    pub fn submit_form(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        let submission = match form.submission() {
            Ok(submission) => submission,
            Err(message) => {
                form.error = Some(message);
                return;
            }
        };
        let kind = form.kind;
        self.form = None;

        let services = self.services.clone();
        self.spawn(async move {
            let saved = match submission {
                Submission::Project(input) => services.projects.create(&input).await.is_some(),
                Submission::Task(input) => services.tasks.create(&input).await.is_some(),
            };
            AppEvent::FormSaved { kind, saved }
        });
    }

    fn new_task_project(&self) -> Option<RecordId> {
        match self.route {
            Route::ProjectDetail(id) => Some(id),
            Route::Board => self.board.selected_project_id(),
            _ => None,
        }
    }

    // ── board ──────────────────────────────────────────────────────────

    /// Drops the held card on the hovered column. The drag slot is cleared
    /// whatever the outcome.
    pub fn drop_selected(&mut self) {
        let column = self.board.board.selected_column();
        let start = self.board.board.begin_drop(column);
        self.board.board.drag_end();
        if let DropStart::Pending(pending) = start {
            let tasks = self.services.tasks.clone();
            self.spawn(async move {
                let accepted = tasks.update_status(pending.task_id, pending.to).await;
                AppEvent::Dropped(pending, accepted)
            });
        }
    }

    fn switch_project(&mut self, direction: isize) {
        if let Some(project) = self.board.cycle_project(direction) {
            self.load_lanes(project);
        }
    }

    // ── keys ───────────────────────────────────────────────────────────

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if self.form.is_some() {
            self.handle_form_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('r') => self.retry(),
            KeyCode::Char(c) if Route::NAV.iter().any(|(_, k)| *k == c) => {
                if let Some((route, _)) = Route::NAV.iter().find(|(_, k)| *k == c) {
                    self.navigate(*route);
                }
            }
            KeyCode::Char('n') => match self.new_task_project() {
                Some(project) => self.open_form(Form::task(project)),
                None if matches!(self.route, Route::Dashboard | Route::Projects) => {
                    self.open_form(Form::project())
                }
                None => {}
            },
            _ => match self.route {
                Route::Projects => self.handle_projects_key(key),
                Route::ProjectDetail(_) => {
                    if key.code == KeyCode::Esc {
                        self.navigate(Route::Projects);
                    }
                }
                Route::Board => self.handle_board_key(key),
                Route::Dashboard | Route::Team => {}
            },
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.form = None,
            KeyCode::Enter => self.submit_form(),
            KeyCode::Tab | KeyCode::Down => form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(c) => form.push_char(c),
            _ => {}
        }
    }

    fn handle_projects_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.projects.move_selection(-1),
            KeyCode::Down => self.projects.move_selection(1),
            KeyCode::Char('f') => self.projects.cycle_filter(),
            KeyCode::Enter => {
                if let Some(id) = self.projects.selected_project().map(|p| p.id) {
                    self.navigate(Route::ProjectDetail(id));
                }
            }
            KeyCode::Char('D') => {
                if let Some(id) = self.projects.selected_project().map(|p| p.id) {
                    let projects = self.services.projects.clone();
                    self.spawn(async move {
                        let deleted = projects.delete(id).await;
                        AppEvent::ProjectDeleted { id, deleted }
                    });
                }
            }
            _ => {}
        }
    }

    fn handle_board_key(&mut self, key: KeyEvent) {
        let board = &mut self.board.board;
        match key.code {
            KeyCode::Left => board.move_column(-1),
            KeyCode::Right => board.move_column(1),
            KeyCode::Up => board.move_card(-1),
            KeyCode::Down => board.move_card(1),
            KeyCode::Char(' ') => {
                board.drag_selected();
            }
            KeyCode::Enter => {
                if board.is_dragging() {
                    self.drop_selected();
                }
            }
            KeyCode::Esc => board.drag_end(),
            KeyCode::Char('[') => self.switch_project(-1),
            KeyCode::Char(']') => self.switch_project(1),
            _ => {}
        }
    }
}
