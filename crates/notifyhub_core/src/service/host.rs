//! Host capability seams used by the view-model services.
//!
//! The core never touches a terminal, window or clipboard directly; hosts
//! provide these traits.

use std::time::{Duration, Instant};

/// Write-only access to the system clipboard.
pub trait Clipboard {
    fn write_text(&self, text: &str) -> Result<(), String>;
}

impl<T: Clipboard + ?Sized> Clipboard for &T {
    fn write_text(&self, text: &str) -> Result<(), String> {
        (**self).write_text(text)
    }
}

/// Explicit user confirmation for destructive actions.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Transient acknowledgment that hides itself after `ttl`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    shown_at: Instant,
    ttl: Duration,
}

impl Notice {
    pub fn new(message: impl Into<String>, shown_at: Instant, ttl: Duration) -> Self {
        Self {
            message: message.into(),
            shown_at,
            ttl,
        }
    }

    pub fn is_visible_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) < self.ttl
    }
}
