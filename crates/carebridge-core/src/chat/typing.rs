use std::time::{Duration, Instant};

/// Interval between dot changes while the indicator is visible
pub const TYPING_STEP: Duration = Duration::from_millis(500);

/// "Assistant is typing..." status line.
///
/// The dot count cycles 0..=3, one step per `TYPING_STEP`. Hiding cancels the
/// cycle and clears the count.
#[derive(Debug, Clone, Default)]
pub struct TypingIndicator {
    last_step: Option<Instant>,
    dots: u8,
}

impl TypingIndicator {
    pub fn is_visible(&self) -> bool {
        self.last_step.is_some()
    }

    pub fn show(&mut self, now: Instant) {
        self.last_step = Some(now);
        self.dots = 0;
    }

    pub fn hide(&mut self) {
        self.last_step = None;
        self.dots = 0;
    }

    pub fn dots(&self) -> u8 {
        self.dots
    }

    /// Apply every step that has elapsed by `now`
    pub fn advance(&mut self, now: Instant) {
        let Some(mut last) = self.last_step else {
            return;
        };

        while now.duration_since(last) >= TYPING_STEP {
            last += TYPING_STEP;
            self.dots = (self.dots + 1) % 4;
        }
        self.last_step = Some(last);
    }

    pub fn status_line(&self) -> Option<String> {
        self.is_visible()
            .then(|| format!("Assistant is typing{}", ".".repeat(self.dots as usize)))
    }
}
