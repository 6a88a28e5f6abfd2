use std::fmt;
use std::str::FromStr;

use crate::record::RecordId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    Projects,
    ProjectDetail(RecordId),
    Board,
    Team,
}

impl Route {
    /// Top-level entries of the navigation bar, with their hotkeys.
    pub const NAV: [(Route, char); 4] = [
        (Route::Dashboard, 'd'),
        (Route::Projects, 'p'),
        (Route::Board, 'b'),
        (Route::Team, 't'),
    ];

    pub fn parse(path: &str) -> Option<Self> {
        let trimmed = path.trim().trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Some(Route::Dashboard),
            ["projects"] => Some(Route::Projects),
            ["projects", id] => RecordId::parse(id).map(Route::ProjectDetail),
            ["board"] => Some(Route::Board),
            ["team"] => Some(Route::Team),
            _ => None,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Dashboard => "/".to_string(),
            Route::Projects => "/projects".to_string(),
            Route::ProjectDetail(id) => format!("/projects/{id}"),
            Route::Board => "/board".to_string(),
            Route::Team => "/team".to_string(),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Dashboard => "Dashboard",
            Route::Projects => "Projects",
            Route::ProjectDetail(_) => "Project",
            Route::Board => "Board",
            Route::Team => "Team",
        }
    }

    /// The navigation entry highlighted for this route.
    pub fn section(&self) -> Route {
        match self {
            Route::ProjectDetail(_) => Route::Projects,
            other => *other,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Route::parse(s).ok_or_else(|| format!("unknown route {s:?}"))
    }
}
