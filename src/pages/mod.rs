//! Per-page view state: what is loaded, whether a load is running and
//! whether the last one failed.

pub mod board;
pub mod dashboard;
pub mod project_detail;
pub mod projects;
pub mod team;

use crate::error::PageError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    Loading,
    Ready,
    /// Holds the message shown next to the retry action.
    Failed(String),
}

/// Identity of one load cycle. Results carrying a stale ticket are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Hands out load tickets and remembers which one is current.
#[derive(Debug, Default)]
pub struct LoadGate {
    generation: u64,
    in_flight: Option<u64>,
}

impl LoadGate {
    /// Starts a new cycle. Any ticket issued earlier becomes stale.
    pub fn issue(&mut self) -> LoadTicket {
        self.generation += 1;
        self.in_flight = Some(self.generation);
        LoadTicket(self.generation)
    }

    /// Consumes `ticket` if it is the current one.
    pub fn accept(&mut self, ticket: LoadTicket) -> bool {
        if self.in_flight == Some(ticket.0) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }

    pub fn cancel(&mut self) {
        self.in_flight = None;
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }
}

/// Load state machine for one page.
///
/// `Idle -> Loading -> Ready | Failed`. `Failed` only moves on through
/// [`Page::retry`]. The last successfully loaded data survives later
/// failures and cancellations.
#[derive(Debug)]
pub struct Page<T> {
    phase: LoadPhase,
    data: Option<T>,
    gate: LoadGate,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Page<T> {
    pub fn new() -> Self {
        Self {
            phase: LoadPhase::Idle,
            data: None,
            gate: LoadGate::default(),
        }
    }

    /// Starts a load. Refused while the page shows a failure.
    pub fn begin(&mut self) -> Option<LoadTicket> {
        if matches!(self.phase, LoadPhase::Failed(_)) {
            return None;
        }
        self.phase = LoadPhase::Loading;
        Some(self.gate.issue())
    }

    /// Leaves the failure state and starts a fresh load.
    pub fn retry(&mut self) -> Option<LoadTicket> {
        if !matches!(self.phase, LoadPhase::Failed(_)) {
            return None;
        }
        self.phase = LoadPhase::Idle;
        self.begin()
    }

    /// Applies a load result. Returns false when the ticket is stale.
    pub fn finish(&mut self, ticket: LoadTicket, result: Result<T, PageError>) -> bool {
        if !self.gate.accept(ticket) {
            tracing::debug!(?ticket, "dropping stale page load");
            return false;
        }
        match result {
            Ok(data) => {
                self.data = Some(data);
                self.phase = LoadPhase::Ready;
            }
            Err(err) => {
                tracing::warn!(%err, "page load failed");
                self.phase = LoadPhase::Failed(err.to_string());
            }
        }
        true
    }

    /// Invalidates the running load, if any.
    pub fn cancel(&mut self) {
        self.gate.cancel();
        if self.phase == LoadPhase::Loading {
            self.phase = if self.data.is_some() {
                LoadPhase::Ready
            } else {
                LoadPhase::Idle
            };
        }
    }

    pub fn phase(&self) -> &LoadPhase {
        &self.phase
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.phase == LoadPhase::Loading
    }

    pub fn failure(&self) -> Option<&str> {
        match &self.phase {
            LoadPhase::Failed(message) => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_cycle() {
        let mut page: Page<u32> = Page::new();
        assert_eq!(page.phase(), &LoadPhase::Idle);
        let ticket = page.begin().unwrap();
        assert!(page.is_loading());
        assert!(page.finish(ticket, Ok(7)));
        assert_eq!(page.phase(), &LoadPhase::Ready);
        assert_eq!(page.data(), Some(&7));
    }

    #[test]
    fn test_newer_begin_makes_older_ticket_stale() {
        let mut page: Page<u32> = Page::new();
        let first = page.begin().unwrap();
        let second = page.begin().unwrap();
        assert!(!page.finish(first, Ok(1)));
        assert!(page.is_loading());
        assert!(page.finish(second, Ok(2)));
        assert_eq!(page.data(), Some(&2));
    }

    #[test]
    fn test_cancelled_load_is_ignored() {
        let mut page: Page<u32> = Page::new();
        let ticket = page.begin().unwrap();
        page.cancel();
        assert_eq!(page.phase(), &LoadPhase::Idle);
        assert!(!page.finish(ticket, Ok(1)));
        assert_eq!(page.data(), None);
    }

    #[test]
    fn test_cancel_keeps_previous_data() {
        let mut page: Page<u32> = Page::new();
        let ticket = page.begin().unwrap();
        page.finish(ticket, Ok(3));
        page.begin();
        page.cancel();
        assert_eq!(page.phase(), &LoadPhase::Ready);
        assert_eq!(page.data(), Some(&3));
    }

    #[test]
    fn test_failure_only_exits_through_retry() {
        let mut page: Page<u32> = Page::new();
        let ticket = page.begin().unwrap();
        page.finish(ticket, Ok(5));
        let ticket = page.begin().unwrap();
        page.finish(ticket, Err(PageError::NotFound("Project")));

        assert_eq!(page.failure(), Some("Project not found"));
        assert_eq!(page.data(), Some(&5));
        assert!(page.begin().is_none());

        let ticket = page.retry().unwrap();
        assert!(page.is_loading());
        assert!(page.retry().is_none());
        page.finish(ticket, Ok(6));
        assert_eq!(page.phase(), &LoadPhase::Ready);
    }

    #[test]
    fn test_gate_accepts_ticket_once() {
        let mut gate = LoadGate::default();
        let ticket = gate.issue();
        assert!(gate.is_pending());
        assert!(gate.accept(ticket));
        assert!(!gate.accept(ticket));
        assert!(!gate.is_pending());
    }
}
