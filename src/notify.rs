use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Fire-and-forget user notifications. Nothing is returned to the caller.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
    pub raised_at: Instant,
}

/// Toast queue shared between the services and the renderer.
///
/// Clones share the same queue. Toasts older than the auto-close delay are
/// pruned on read.
#[derive(Debug, Clone)]
pub struct Toasts {
    inner: Arc<Mutex<VecDeque<Toast>>>,
    auto_close: Duration,
}

impl Default for Toasts {
    fn default() -> Self {
        Self::new(Duration::from_secs(3))
    }
}

impl Toasts {
    pub fn new(auto_close: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::new())),
            auto_close,
        }
    }

    fn push(&self, kind: ToastKind, message: &str) {
        if let Ok(mut queue) = self.inner.lock() {
            queue.push_back(Toast {
                kind,
                message: message.to_string(),
                raised_at: Instant::now(),
            });
        }
    }

    /// Toasts still on screen, oldest first.
    pub fn visible(&self) -> Vec<Toast> {
        let Ok(mut queue) = self.inner.lock() else {
            return Vec::new();
        };
        let auto_close = self.auto_close;
        queue.retain(|t| t.raised_at.elapsed() < auto_close);
        queue.iter().cloned().collect()
    }

    /// Every toast raised so far that has not been pruned, as `(kind, message)`.
    pub fn messages(&self) -> Vec<(ToastKind, String)> {
        self.inner
            .lock()
            .map(|q| q.iter().map(|t| (t.kind, t.message.clone())).collect())
            .unwrap_or_default()
    }

    pub fn errors(&self) -> Vec<String> {
        self.of_kind(ToastKind::Error)
    }

    pub fn successes(&self) -> Vec<String> {
        self.of_kind(ToastKind::Success)
    }

    fn of_kind(&self, kind: ToastKind) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, m)| m)
            .collect()
    }
}

impl Notifier for Toasts {
    fn success(&self, message: &str) {
        tracing::debug!(message, "success toast");
        self.push(ToastKind::Success, message);
    }

    fn error(&self, message: &str) {
        tracing::debug!(message, "error toast");
        self.push(ToastKind::Error, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_one_queue() {
        let toasts = Toasts::default();
        let other = toasts.clone();
        other.success("saved");
        toasts.error("boom");
        assert_eq!(toasts.successes(), vec!["saved".to_string()]);
        assert_eq!(other.errors(), vec!["boom".to_string()]);
    }

    #[test]
    fn test_expired_toasts_are_not_visible() {
        let toasts = Toasts::new(Duration::ZERO);
        toasts.success("gone");
        assert!(toasts.visible().is_empty());
    }
}
