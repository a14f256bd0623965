//! Per-tick attack cancellation flag.
//!
//! Cleared explicitly at the start of every tick's packet pass; between
//! clears, any cancellable detector (or a failed hit validation) may set it
//! to void the in-flight attack. The host reads it before applying damage.

/// Transient cancellation decision for the current tick.
#[derive(Debug, Default, Clone)]
pub struct CancellationState {
    cancelled: bool,
    reason: Option<&'static str>,
}

impl CancellationState {
    /// Fresh, un-cancelled state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cancelled: false,
            reason: None,
        }
    }

    /// Marks the current action as void. The first reason wins.
    pub fn cancel(&mut self, reason: &'static str) {
        if !self.cancelled {
            self.cancelled = true;
            self.reason = Some(reason);
        }
    }

    /// Whether the current action should be dropped.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Which detector asked for the cancellation.
    #[must_use]
    pub const fn reason(&self) -> Option<&'static str> {
        self.reason
    }

    /// Clears the flag. Called once at the start of each tick.
    pub fn clear(&mut self) {
        self.cancelled = false;
        self.reason = None;
    }
}
