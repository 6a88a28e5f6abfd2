use std::io;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyEventKind};
use futures::StreamExt;
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Tabs, Wrap},
    Frame, Terminal,
};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::app::{App, AppEvent};
use crate::kanban_board::CardPhase;
use crate::notify::ToastKind;
use crate::pages::{LoadPhase, Page};
use crate::projections::{TaskCounts, WorkloadLevel};
use crate::projects::ProjectStatus;
use crate::routes::Route;
use crate::tasks::{Priority, Task, TaskStatus};
use crate::team::TeamMember;

const TICK: Duration = Duration::from_millis(250);

/// Runs the UI until the user quits. Redraws after every key press, every
/// background result and every tick (so toasts expire on time).
pub async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    mut rx: UnboundedReceiver<AppEvent>,
) -> io::Result<()> {
    let mut events = EventStream::new();
    let mut tick = tokio::time::interval(TICK);

    loop {
        terminal.draw(|f| draw(f, app))?;

        tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Some(Ok(_)) => {}
                Some(Err(err)) => return Err(err),
                None => return Ok(()),
            },
            Some(event) = rx.recv() => app.handle_event(event),
            _ = tick.tick() => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_nav(f, chunks[0], app.route);
    match app.route {
        Route::Dashboard => draw_dashboard(f, chunks[1], app),
        Route::Projects => draw_projects(f, chunks[1], app),
        Route::ProjectDetail(_) => draw_project_detail(f, chunks[1], app),
        Route::Board => draw_board(f, chunks[1], app),
        Route::Team => draw_team(f, chunks[1], app),
    }
    draw_help(f, chunks[2], app);

    if let Some(form) = &app.form {
        draw_form(f, form);
    }
    draw_toasts(f, app);
}

fn draw_nav(f: &mut Frame, area: Rect, route: Route) {
    let titles: Vec<Line> = Route::NAV
        .iter()
        .map(|(r, key)| Line::from(format!("{} ({key})", r.title())))
        .collect();
    let selected = Route::NAV
        .iter()
        .position(|(r, _)| *r == route.section())
        .unwrap_or(0);
    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title(" taskboard "))
        .select(selected)
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    f.render_widget(tabs, area);
}

fn draw_help(f: &mut Frame, area: Rect, app: &App) {
    let keys = if app.form.is_some() {
        "Tab next field  Enter save  Esc cancel"
    } else {
        match app.route {
            Route::Dashboard => "n new project  r retry  q quit",
            Route::Projects => "↑↓ select  Enter open  f filter  n new  D delete  q quit",
            Route::ProjectDetail(_) => "n new task  Esc back  r retry  q quit",
            Route::Board => "←→↑↓ move  Space grab  Enter drop  Esc release  [ ] project  n new task",
            Route::Team => "r retry  q quit",
        }
    };
    f.render_widget(
        Paragraph::new(keys).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

/// Draws the loading or failure placeholder. Returns the data to render
/// when there is something to show.
fn page_body<'a, T>(f: &mut Frame, area: Rect, page: &'a Page<T>, title: &str) -> Option<&'a T> {
    let block = Block::default().borders(Borders::ALL).title(format!(" {title} "));
    match (page.phase(), page.data()) {
        (LoadPhase::Failed(message), _) => {
            let text = vec![
                Line::from(Span::styled(message.clone(), Style::default().fg(Color::Red))),
                Line::from(""),
                Line::from("Press r to retry."),
            ];
            f.render_widget(
                Paragraph::new(text).block(block).alignment(Alignment::Center),
                area,
            );
            None
        }
        (_, Some(data)) => Some(data),
        (LoadPhase::Idle | LoadPhase::Loading | LoadPhase::Ready, None) => {
            f.render_widget(
                Paragraph::new("Loading...").block(block).alignment(Alignment::Center),
                area,
            );
            None
        }
    }
}

fn draw_dashboard(f: &mut Frame, area: Rect, app: &App) {
    let Some(data) = page_body(f, area, &app.dashboard, "Dashboard") else {
        return;
    };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let stats = data.stats();
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25); 4])
        .split(rows[0]);
    for (i, (label, value)) in [
        ("Total projects", stats.total_projects),
        ("Active tasks", stats.active_tasks),
        ("Completed tasks", stats.completed_tasks),
        ("Team members", stats.team_members),
    ]
    .into_iter()
    .enumerate()
    {
        f.render_widget(
            Paragraph::new(value.to_string())
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title(label)),
            cards[i],
        );
    }

    let lower = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    let active: Vec<ListItem> = data
        .active_projects()
        .into_iter()
        .map(|(project, counts)| {
            ListItem::new(Line::from(vec![
                Span::styled(project.name.clone(), Style::default().fg(Color::White)),
                Span::raw(format!("  {}", counts_label(&counts))),
            ]))
        })
        .collect();
    f.render_widget(
        List::new(active).block(Block::default().borders(Borders::ALL).title("Active projects")),
        lower[0],
    );

    let recent: Vec<ListItem> = data
        .recent_tasks(10)
        .into_iter()
        .map(|t| task_line(t, None, CardPhase::Resting, false))
        .collect();
    f.render_widget(
        List::new(recent).block(Block::default().borders(Borders::ALL).title("Recent tasks")),
        lower[1],
    );
}

fn draw_projects(f: &mut Frame, area: Rect, app: &App) {
    let title = format!("Projects [{}]", app.projects.filter.label());
    if page_body(f, area, &app.projects.page, &title).is_none() {
        return;
    }
    let filtered = app.projects.filtered();
    if filtered.is_empty() {
        f.render_widget(
            Paragraph::new("No projects found.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title(title)),
            area,
        );
        return;
    }
    let items: Vec<ListItem> = filtered
        .iter()
        .enumerate()
        .map(|(i, (project, counts))| {
            let style = if i == app.projects.selected {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let mut spans = vec![
                Span::styled(format!("[#{}] {}", project.id, project.name), style),
                Span::raw("  "),
                project_status_span(project.status),
                Span::raw(format!("  {}", counts_label(counts))),
            ];
            if let Some(due) = project.due_date {
                spans.push(Span::raw(format!("  (Due: {})", due.format("%b %d, %Y"))));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();
    f.render_widget(
        List::new(items).block(Block::default().borders(Borders::ALL).title(title)),
        area,
    );
}

fn draw_project_detail(f: &mut Frame, area: Rect, app: &App) {
    let Some(detail) = page_body(f, area, &app.project_detail, "Project") else {
        return;
    };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(0)])
        .split(area);

    let project = &detail.project;
    let header = vec![
        Line::from(vec![
            Span::styled(project.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            project_status_span(project.status),
        ]),
        Line::from(project.description.clone().unwrap_or_default()),
        Line::from(counts_label(&detail.counts())),
    ];
    f.render_widget(
        Paragraph::new(header)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL)),
        rows[0],
    );

    let columns = column_chunks(rows[1]);
    for (i, (status, tasks)) in detail.columns().into_iter().enumerate() {
        let items: Vec<ListItem> = tasks
            .into_iter()
            .map(|t| task_line(t, detail.assignee(t), CardPhase::Resting, false))
            .collect();
        f.render_widget(
            List::new(items).block(column_block(status, false)),
            columns[i],
        );
    }
}

fn draw_board(f: &mut Frame, area: Rect, app: &App) {
    if page_body(f, area, &app.board.projects, "Board").is_none() {
        return;
    }
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let selector = match app.board.selected_project() {
        Some(project) => {
            let loading = if app.board.lanes_loading() { "  loading..." } else { "" };
            format!("◀ {} ▶{loading}", project.name)
        }
        None => "No projects yet. Press p to create one.".to_string(),
    };
    f.render_widget(
        Paragraph::new(selector)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Project")),
        rows[0],
    );

    let board = &app.board.board;
    let columns = column_chunks(rows[1]);
    for (i, (status, tasks)) in board.columns().into_iter().enumerate() {
        let hovered = board.selected_status == i;
        let items: Vec<ListItem> = tasks
            .iter()
            .enumerate()
            .map(|(row, t)| {
                let cursor = hovered && !board.is_dragging() && row == board.selected_task;
                task_line(t, board.assignee(t), board.phase(t.id), cursor)
            })
            .collect();
        f.render_widget(
            List::new(items).block(column_block(status, hovered)),
            columns[i],
        );
    }
}

fn draw_team(f: &mut Frame, area: Rect, app: &App) {
    let Some(data) = page_body(f, area, &app.team, "Team") else {
        return;
    };
    let rows = data.rows();
    if rows.is_empty() {
        f.render_widget(
            Paragraph::new("No team members yet.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("Team")),
            area,
        );
        return;
    }
    let slots = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            rows.iter()
                .map(|_| Constraint::Length(3))
                .chain(std::iter::once(Constraint::Min(0))),
        )
        .split(area);

    for (i, (member, workload)) in rows.iter().enumerate() {
        let color = match workload.level() {
            WorkloadLevel::High => Color::Red,
            WorkloadLevel::Medium => Color::Yellow,
            WorkloadLevel::Low => Color::Green,
        };
        let title = format!(
            "[{}] {}  {}  {}",
            member.initials(),
            member.name,
            member.role,
            member.email
        );
        let label = format!(
            "{}% workload  {} tasks, {} in progress, {} completed",
            workload.percent(),
            workload.total,
            workload.in_progress,
            workload.completed
        );
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(title))
            .gauge_style(Style::default().fg(color))
            .percent(workload.percent().min(100))
            .label(label);
        f.render_widget(gauge, slots[i]);
    }
}

fn draw_form(f: &mut Frame, form: &crate::form::Form) {
    let area = centered_rect(60, form.fields.len() as u16 * 2 + 6, f.area());
    f.render_widget(Clear, area);

    let mut lines = Vec::new();
    for (i, field) in form.fields.iter().enumerate() {
        let focused = i == form.focused;
        let marker = if focused { "> " } else { "  " };
        let required = if field.required { " *" } else { "" };
        let label_style = if focused {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{marker}{}{required}: ", field.label), label_style),
            Span::raw(field.value.clone()),
            Span::raw(if focused { "_" } else { "" }),
        ]));
        lines.push(Line::from(Span::styled(
            format!("    {}", field.hint),
            Style::default().fg(Color::DarkGray),
        )));
    }
    if let Some(error) = &form.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(error.clone(), Style::default().fg(Color::Red))));
    }

    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", form.title())),
        ),
        area,
    );
}

fn draw_toasts(f: &mut Frame, app: &App) {
    let toasts = app.toasts.visible();
    let screen = f.area();
    let width = 40.min(screen.width);
    for (i, toast) in toasts.iter().rev().take(5).enumerate() {
        let y = screen.y + 1 + i as u16 * 3;
        if y + 3 > screen.bottom() {
            break;
        }
        let area = Rect::new(screen.right().saturating_sub(width + 1), y, width, 3);
        let color = match toast.kind {
            ToastKind::Success => Color::Green,
            ToastKind::Error => Color::Red,
        };
        f.render_widget(Clear, area);
        f.render_widget(
            Paragraph::new(toast.message.clone())
                .style(Style::default().fg(color))
                .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(color))),
            area,
        );
    }
}

fn column_chunks(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Percentage(34),
        ])
        .split(area)
}

fn column_block(status: TaskStatus, hovered: bool) -> Block<'static> {
    Block::default()
        .title(status.label())
        .borders(Borders::ALL)
        .border_style(if hovered {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        })
}

fn task_line<'a>(
    task: &'a Task,
    assignee: Option<&TeamMember>,
    phase: CardPhase,
    cursor: bool,
) -> ListItem<'a> {
    let mut title_style = match phase {
        CardPhase::Resting => Style::default().fg(Color::White),
        CardPhase::Dragging => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        CardPhase::DropPending => Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        CardPhase::Reverted => Style::default().fg(Color::Red),
    };
    if cursor {
        title_style = title_style.add_modifier(Modifier::REVERSED);
    }
    let priority_color = match task.priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    };
    let mut spans = vec![
        Span::raw(format!("[#{}] ", task.id)),
        Span::styled(task.title.as_str(), title_style),
        Span::styled(
            format!(" {}", task.priority.label()),
            Style::default().fg(priority_color),
        ),
    ];
    if let Some(member) = assignee {
        spans.push(Span::raw(format!(" @{}", member.initials())));
    }
    if let Some(due) = task.due_date {
        spans.push(Span::raw(format!(" (Due: {})", due.format("%b %d"))));
    }
    ListItem::new(Line::from(spans))
}

fn project_status_span(status: ProjectStatus) -> Span<'static> {
    let color = match status {
        ProjectStatus::Planning => Color::Blue,
        ProjectStatus::Active => Color::Green,
        ProjectStatus::OnHold => Color::Yellow,
        ProjectStatus::Completed => Color::DarkGray,
    };
    Span::styled(status.label(), Style::default().fg(color))
}

fn counts_label(counts: &TaskCounts) -> String {
    format!(
        "{} to do, {} in progress, {} done ({}%)",
        counts.todo,
        counts.in_progress,
        counts.done,
        counts.progress()
    )
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let height = height.min(r.height);
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
