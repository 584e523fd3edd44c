use std::{
    sync::{atomic::{AtomicU64, Ordering}, Arc},
    time::{Duration, Instant},
};
use dashmap::DashMap;
use parking_lot::Mutex;

/// How often (in checks) idle clients are pruned from the store.
const PRUNE_EVERY: u64 = 1024;

/// Sliding window approximated from the previous and current fixed windows.
#[derive(Debug)]
struct SlidingWindow {
    window_size: Duration,
    limit: u64,
    current_window_start: Instant,
    current_count: u64,
    prev_count: u64,
    last_seen: Instant,
}

impl SlidingWindow {
    fn new(window_size: Duration, limit: u64, now: Instant) -> Self {
        Self {
            window_size,
            limit,
            current_window_start: now,
            current_count: 0,
            prev_count: 0,
            last_seen: now,
        }
    }

    fn roll(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.current_window_start);
        if elapsed < self.window_size {
            return;
        }

        let windows_passed = (elapsed.as_secs_f64() / self.window_size.as_secs_f64()).floor() as u32;
        self.prev_count = if windows_passed == 1 { self.current_count } else { 0 };
        self.current_count = 0;
        self.current_window_start += self.window_size * windows_passed;
    }

    fn allow(&mut self, now: Instant) -> RateDecision {
        self.last_seen = now;
        self.roll(now);

        let elapsed = now.saturating_duration_since(self.current_window_start);
        let weight = 1.0 - elapsed.as_secs_f64() / self.window_size.as_secs_f64();
        let effective = (self.prev_count as f64) * weight + (self.current_count as f64);

        if effective + 1.0 <= self.limit as f64 + 1e-9 {
            self.current_count += 1;
            RateDecision {
                allowed: true,
                limit: self.limit,
                remaining: (self.limit as f64 - effective - 1.0).max(0.0).floor() as u64,
                retry_after: None,
            }
        } else {
            let until_roll = self.window_size.saturating_sub(elapsed);
            RateDecision {
                allowed: false,
                limit: self.limit,
                remaining: 0,
                retry_after: Some(until_roll.as_secs().max(1)),
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u64,
    pub remaining: u64,
    /// Seconds until the client should retry, set on rejection.
    pub retry_after: Option<u64>,
}

type Key = String;

/// Per-client request counters shared by all workers.
#[derive(Clone, Debug)]
pub struct RateLimiterStore {
    map: Arc<DashMap<Key, Arc<Mutex<SlidingWindow>>>>,
    checks: Arc<AtomicU64>,
    window_size: Duration,
    limit: u64,
    idle_ttl: Duration,
}

impl RateLimiterStore {
    pub fn new(limit: u64, window_size: Duration) -> Self {
        Self {
            map: Arc::new(DashMap::new()),
            checks: Arc::new(AtomicU64::new(0)),
            window_size,
            limit,
            idle_ttl: window_size * 2,
        }
    }

    /// Limit expressed per hour, as configured for the public API.
    pub fn per_hour(limit: u64) -> Self {
        Self::new(limit, Duration::from_secs(60 * 60))
    }

    pub fn check(&self, key: &str) -> RateDecision {
        self.check_at(key, Instant::now())
    }

    pub fn check_at(&self, key: &str, now: Instant) -> RateDecision {
        if self.checks.fetch_add(1, Ordering::Relaxed) % PRUNE_EVERY == PRUNE_EVERY - 1 {
            self.prune(now);
        }

        let window = self.get_window(key, now);
        let mut window = window.lock();
        window.allow(now)
    }

    pub fn tracked_clients(&self) -> usize {
        self.map.len()
    }

    fn get_window(&self, key: &str, now: Instant) -> Arc<Mutex<SlidingWindow>> {
        if let Some(existing) = self.map.get(key) {
            return existing.clone();
        }

        self.map
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(SlidingWindow::new(self.window_size, self.limit, now))))
            .clone()
    }

    fn prune(&self, now: Instant) {
        let ttl = self.idle_ttl;
        self.map.retain(|_, window| {
            now.saturating_duration_since(window.lock().last_seen) <= ttl
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_limit_then_rejects() {
        let store = RateLimiterStore::new(3, Duration::from_secs(60));
        let now = Instant::now();

        for _ in 0..3 {
            assert!(store.check_at("1.2.3.4", now).allowed);
        }

        let rejected = store.check_at("1.2.3.4", now);
        assert!(!rejected.allowed);
        assert_eq!(rejected.remaining, 0);
        assert!(rejected.retry_after.unwrap() >= 1);
    }

    #[test]
    fn clients_are_counted_separately() {
        let store = RateLimiterStore::new(1, Duration::from_secs(60));
        let now = Instant::now();

        assert!(store.check_at("a", now).allowed);
        assert!(store.check_at("b", now).allowed);
        assert!(!store.check_at("a", now).allowed);
        assert_eq!(store.tracked_clients(), 2);
    }

    #[test]
    fn window_recovers_after_two_full_windows() {
        let store = RateLimiterStore::new(2, Duration::from_secs(10));
        let start = Instant::now();

        assert!(store.check_at("c", start).allowed);
        assert!(store.check_at("c", start).allowed);
        assert!(!store.check_at("c", start + Duration::from_secs(5)).allowed);

        let later = start + Duration::from_secs(25);
        let decision = store.check_at("c", later);
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 1);
    }

    #[test]
    fn previous_window_still_weighs_in() {
        let store = RateLimiterStore::new(4, Duration::from_secs(10));
        let start = Instant::now();

        for _ in 0..4 {
            assert!(store.check_at("d", start).allowed);
        }

        // 1s into the next window the previous four still count at 90%.
        let just_after = start + Duration::from_secs(11);
        assert!(!store.check_at("d", just_after).allowed);
    }
}
