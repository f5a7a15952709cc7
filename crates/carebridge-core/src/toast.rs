use std::collections::VecDeque;
use std::time::{Duration, Instant};

pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(3000);
pub const TOAST_FADE_IN: Duration = Duration::from_millis(10);
pub const TOAST_FADE_OUT: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastPhase {
    FadingIn,
    Visible,
    FadingOut,
    Gone,
}

/// A transient, non-blocking message
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub shown_at: Instant,
    pub duration: Duration,
}

impl Toast {
    pub fn phase(&self, now: Instant) -> ToastPhase {
        let age = now.saturating_duration_since(self.shown_at);
        if age < TOAST_FADE_IN {
            ToastPhase::FadingIn
        } else if age < self.duration {
            ToastPhase::Visible
        } else if age < self.duration + TOAST_FADE_OUT {
            ToastPhase::FadingOut
        } else {
            ToastPhase::Gone
        }
    }
}

/// Toasts currently on screen, oldest first
#[derive(Debug, Clone, Default)]
pub struct Toasts {
    active: VecDeque<Toast>,
}

impl Toasts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, message: impl Into<String>, now: Instant) {
        self.show_for(message, DEFAULT_TOAST_DURATION, now);
    }

    pub fn show_for(&mut self, message: impl Into<String>, duration: Duration, now: Instant) {
        self.active.push_back(Toast {
            message: message.into(),
            shown_at: now,
            duration,
        });
    }

    /// Drop every toast whose fade-out has finished
    pub fn prune(&mut self, now: Instant) {
        self.active.retain(|t| t.phase(now) != ToastPhase::Gone);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.active.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_lifecycle() {
        let start = Instant::now();
        let mut toasts = Toasts::new();
        toasts.show("Message copied to clipboard", start);
        let toast = toasts.iter().next().unwrap().clone();

        assert_eq!(toast.phase(start), ToastPhase::FadingIn);
        assert_eq!(toast.phase(start + Duration::from_millis(1500)), ToastPhase::Visible);
        assert_eq!(toast.phase(start + Duration::from_millis(3100)), ToastPhase::FadingOut);
        assert_eq!(toast.phase(start + Duration::from_millis(3300)), ToastPhase::Gone);

        toasts.prune(start + Duration::from_millis(3299));
        assert_eq!(toasts.len(), 1);
        toasts.prune(start + Duration::from_millis(3300));
        assert!(toasts.is_empty());
    }

    #[test]
    fn test_custom_duration_outlives_default() {
        let start = Instant::now();
        let mut toasts = Toasts::new();
        toasts.show("Connection restored", start);
        toasts.show_for("Connection lost", Duration::from_millis(5000), start);

        toasts.prune(start + Duration::from_millis(4000));
        let left: Vec<_> = toasts.iter().map(|t| t.message.as_str()).collect();
        assert_eq!(left, vec!["Connection lost"]);
    }
}
