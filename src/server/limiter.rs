//! Per-IP sliding-window rate limiting
//!
//! Windows live in process memory: counts reset on restart and are not
//! shared across instances.

use dashmap::DashMap;
use std::time::{Duration, Instant};

use crate::config::RateLimitConfig;
use crate::types::response::{QuotaWindow, RemainingQuota};

const MINUTE: Duration = Duration::from_secs(60);
const HOUR: Duration = Duration::from_secs(3600);

/// Decision for a denied request
#[derive(Debug, Clone)]
pub struct LimitExceeded {
    /// Human-readable reason
    pub message: String,
    /// Seconds until the oldest request leaves the exhausted window
    pub retry_after_secs: u64,
}

/// Sliding-window rate limiter keyed by client IP
pub struct RateLimiter {
    requests_per_minute: usize,
    requests_per_hour: usize,
    minute_requests: DashMap<String, Vec<Instant>>,
    hour_requests: DashMap<String, Vec<Instant>>,
}

impl RateLimiter {
    /// Create a limiter from configuration
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            requests_per_minute: config.requests_per_minute,
            requests_per_hour: config.requests_per_hour,
            minute_requests: DashMap::new(),
            hour_requests: DashMap::new(),
        }
    }

    fn prune(entries: &mut Vec<Instant>, window: Duration, now: Instant) {
        entries.retain(|t| now.duration_since(*t) < window);
    }

    /// Check whether a request from `ip` is allowed, recording it if so
    pub fn check(&self, ip: &str) -> Result<(), LimitExceeded> {
        let now = Instant::now();

        let mut minute = self.minute_requests.entry(ip.to_string()).or_default();
        Self::prune(&mut minute, MINUTE, now);

        if minute.len() >= self.requests_per_minute {
            let wait = MINUTE
                .saturating_sub(now.duration_since(minute[0]))
                .as_secs();
            return Err(LimitExceeded {
                message: format!("Rate limit exceeded. Try again in {} seconds.", wait),
                retry_after_secs: wait,
            });
        }

        let mut hour = self.hour_requests.entry(ip.to_string()).or_default();
        Self::prune(&mut hour, HOUR, now);

        if hour.len() >= self.requests_per_hour {
            let wait = HOUR.saturating_sub(now.duration_since(hour[0])).as_secs();
            return Err(LimitExceeded {
                message: format!("Hourly limit exceeded. Try again in {} minutes.", wait / 60),
                retry_after_secs: wait,
            });
        }

        minute.push(now);
        hour.push(now);

        Ok(())
    }

    /// Remaining quota for an IP, without recording a request
    pub fn remaining(&self, ip: &str) -> RemainingQuota {
        let now = Instant::now();

        let minute_used = self
            .minute_requests
            .get_mut(ip)
            .map(|mut entry| {
                Self::prune(&mut entry, MINUTE, now);
                entry.len()
            })
            .unwrap_or(0);

        let hour_used = self
            .hour_requests
            .get_mut(ip)
            .map(|mut entry| {
                Self::prune(&mut entry, HOUR, now);
                entry.len()
            })
            .unwrap_or(0);

        RemainingQuota {
            minute: QuotaWindow {
                remaining: self.requests_per_minute.saturating_sub(minute_used),
                limit: self.requests_per_minute,
            },
            hour: QuotaWindow {
                remaining: self.requests_per_hour.saturating_sub(hour_used),
                limit: self.requests_per_hour,
            },
        }
    }
}

/// Extract the client IP, honoring X-Forwarded-For behind a proxy
pub fn client_ip(headers: &axum::http::HeaderMap, fallback: Option<std::net::IpAddr>) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        if let Ok(value) = forwarded.to_str() {
            if let Some(first) = value.split(',').next() {
                let first = first.trim();
                if !first.is_empty() {
                    return first.to_string();
                }
            }
        }
    }

    fallback
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
