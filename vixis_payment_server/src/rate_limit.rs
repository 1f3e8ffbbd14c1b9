//! Fixed-window request rate limiting.
//!
//! The limiter is a plain shared store that gets registered as app data on the routes that need
//! it, so each server instance (and each test) owns its own limiter rather than sharing global
//! state.

use std::{
    collections::HashMap,
    net::IpAddr,
    sync::Mutex,
    time::{Duration, Instant},
};

use log::warn;

use crate::config::RateLimitConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed {
        /// Requests left in the current window, after this one.
        remaining: u32,
    },
    Limited {
        /// Time until the current window expires.
        retry_after: Duration,
    },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateDecision::Allowed { .. })
    }
}

/// Once the window map holds this many clients, a check also drops all expired entries.
const PRUNE_THRESHOLD: usize = 1024;

struct WindowState {
    window_start: Instant,
    count: u32,
}

pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    entries: Mutex<HashMap<IpAddr, WindowState>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self { max_requests: config.max_requests, window: config.window, entries: Mutex::new(HashMap::new()) }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Records a request from `ip` and decides whether it is allowed in the current window.
    pub fn check(&self, ip: IpAddr) -> RateDecision {
        self.check_at(ip, Instant::now())
    }

    /// Same as [`RateLimiter::check`], with an explicit clock so tests can step through windows
    /// without sleeping.
    pub fn check_at(&self, ip: IpAddr, now: Instant) -> RateDecision {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Rate limiter mutex was poisoned. Continuing with the recovered state.");
                poisoned.into_inner()
            },
        };
        // Keeps the map bounded when many distinct addresses come and go. Done here, under the
        // lock we already hold, rather than through `prune`, since the mutex is not re-entrant.
        if entries.len() >= PRUNE_THRESHOLD {
            let window = self.window;
            entries.retain(|_, state| now.duration_since(state.window_start) < window);
        }
        let state = entries.entry(ip).or_insert(WindowState { window_start: now, count: 0 });
        if now.duration_since(state.window_start) >= self.window {
            state.window_start = now;
            state.count = 0;
        }
        if state.count >= self.max_requests {
            let retry_after = self.window.saturating_sub(now.duration_since(state.window_start));
            return RateDecision::Limited { retry_after };
        }
        state.count += 1;
        RateDecision::Allowed { remaining: self.max_requests - state.count }
    }

    /// Drops window entries that expired before `now`. Called opportunistically; the limiter
    /// stays correct without it, it just holds more memory.
    pub fn prune(&self, now: Instant) {
        if let Ok(mut entries) = self.entries.lock() {
            let window = self.window;
            entries.retain(|_, state| now.duration_since(state.window_start) < window);
        }
    }
}
