//! Fixed-window rate limiting for login and post-creation traffic.
//!
//! The limiter is an owned, injectable service held in the application
//! state rather than a process global, so tests can construct and reset
//! their own instance and deployments can swap the backend without
//! touching call sites. Counters are per-process only; horizontally
//! scaled deployments get independent windows per instance.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Counter state for a single `"<action>:<client>"` key.
#[derive(Debug, Clone)]
struct WindowEntry {
    /// Requests admitted in the current window.
    count: u32,

    /// When the current window ends and the counter resets.
    reset_at: Instant,
}

/// RateLimiter
///
/// Thread-safe fixed-window counter map. A request either falls inside an
/// active window (increment and compare against the limit) or starts a new
/// one (count reset to 1). The window-crossing reset happens exactly once
/// per window because it runs under the write lock.
pub struct RateLimiter {
    windows: RwLock<HashMap<String, WindowEntry>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            windows: RwLock::new(HashMap::new()),
        }
    }

    /// check
    ///
    /// Records one request for `identifier` and reports whether it is
    /// admitted. Returns `false` exactly when the active window's count has
    /// already reached `max_requests` before this call; denied requests do
    /// not advance the counter.
    pub fn check(&self, identifier: &str, max_requests: u32, window: Duration) -> bool {
        let mut windows = self.windows.write().unwrap();
        let now = Instant::now();

        match windows.get_mut(identifier) {
            Some(entry) if now < entry.reset_at => {
                if entry.count >= max_requests {
                    return false;
                }
                entry.count += 1;
                true
            }
            _ => {
                // First request, or the previous window has expired.
                windows.insert(
                    identifier.to_string(),
                    WindowEntry {
                        count: 1,
                        reset_at: now + window,
                    },
                );
                true
            }
        }
    }

    /// Clears all counters. Used by tests between cases.
    pub fn reset(&self) {
        self.windows.write().unwrap().clear();
    }

    /// Drops entries whose window has already ended. The map otherwise
    /// grows with the number of distinct client identifiers seen.
    pub fn cleanup(&self) {
        let mut windows = self.windows.write().unwrap();
        let now = Instant::now();
        windows.retain(|_, entry| now < entry.reset_at);
    }

    /// Number of identifiers currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.windows.read().unwrap().len()
    }
}
