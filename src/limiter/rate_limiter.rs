use crate::limiter::clock::{Clock, MonotonicClock};
use log::debug;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

const NEVER_REFILLED: u64 = u64::MAX;

/// Fixed-window permit counter.
///
/// Each window grants `qps * window_seconds` permits. The first [`acquire`](Self::acquire)
/// after a window has fully elapsed resets the counter to capacity; permits never
/// accrue between windows. A denied call returns immediately.
///
/// The decrement is lock-free. Only the reset runs under a lock, and it is
/// re-checked inside the lock so concurrent callers reset at most once per window.
/// `remaining` keeps decreasing past zero while callers are being denied.
pub struct RateLimiter {
    capacity: i64,
    window_millis: u64,
    remaining: AtomicI64,
    last_refill_millis: AtomicU64,
    refills: AtomicU64,
    refill_lock: Mutex<()>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("capacity", &self.capacity)
            .field("window_millis", &self.window_millis)
            .field("remaining", &self.remaining.load(Ordering::Relaxed))
            .field("refills", &self.refills.load(Ordering::Relaxed))
            .finish()
    }
}

impl RateLimiter {
    /// Creates a limiter granting `qps * window_seconds` permits per window of
    /// `window_seconds`, timed by a [`MonotonicClock`].
    ///
    /// # Arguments
    ///
    /// * `qps` - Permits per second of window.
    /// * `window_seconds` - Window length. A window only resets once more than
    ///   this many seconds have passed since the previous reset.
    ///
    /// No permits are held until the first [`acquire`](Self::acquire), which
    /// starts the first window.
    pub fn new(qps: u32, window_seconds: u32) -> Self {
        Self::with_clock(qps, window_seconds, Arc::new(MonotonicClock::new()))
    }

    /// Same as [`new`](Self::new), reading time from `clock` instead.
    pub fn with_clock(qps: u32, window_seconds: u32, clock: Arc<dyn Clock>) -> Self {
        Self {
            capacity: i64::from(qps) * i64::from(window_seconds),
            window_millis: u64::from(window_seconds) * 1000,
            remaining: AtomicI64::new(0),
            last_refill_millis: AtomicU64::new(NEVER_REFILLED),
            refills: AtomicU64::new(0),
            refill_lock: Mutex::new(()),
            clock,
        }
    }

    /// Takes one permit. Returns `false` when this window's permits are used up.
    pub fn acquire(&self) -> bool {
        let now = self.clock.now_millis();

        if self.window_elapsed(now) {
            let _guard = self.refill_lock.lock();
            if self.window_elapsed(now) {
                self.remaining.store(self.capacity, Ordering::Release);
                self.last_refill_millis.store(now, Ordering::Release);
                let refills = self.refills.fetch_add(1, Ordering::Relaxed) + 1;
                debug!(
                    "Rate limiter refilled to {} permits at {}ms (refill #{})",
                    self.capacity, now, refills
                );
            }
        }

        self.remaining.fetch_sub(1, Ordering::AcqRel) > 0
    }

    pub fn capacity(&self) -> i64 {
        self.capacity
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_millis)
    }

    /// Number of window resets so far.
    pub fn refills(&self) -> u64 {
        self.refills.load(Ordering::Relaxed)
    }

    fn window_elapsed(&self, now: u64) -> bool {
        let last = self.last_refill_millis.load(Ordering::Acquire);
        last == NEVER_REFILLED || now.saturating_sub(last) > self.window_millis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limiter::clock::manual::ManualClock;
    use std::sync::atomic::AtomicUsize;
    use std::thread;
    use std::time::Instant;

    fn manual_limiter(qps: u32, window_seconds: u32) -> (RateLimiter, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let limiter = RateLimiter::with_clock(qps, window_seconds, clock.clone());
        (limiter, clock)
    }

    fn burst(limiter: &RateLimiter, calls: usize) -> usize {
        (0..calls).filter(|_| limiter.acquire()).count()
    }

    #[test]
    fn test_acquire_single_thread() {
        let limiter = RateLimiter::new(100, 1);

        let start = Instant::now();
        let granted = burst(&limiter, 110);
        let elapsed = start.elapsed();

        assert!(elapsed < Duration::from_secs(1), "burst took {elapsed:?}");
        assert_eq!(granted, 100);
        assert_eq!(limiter.refills(), 1);
    }

    #[test]
    fn test_acquire_multi_thread() {
        let (limiter, _clock) = manual_limiter(100, 1);
        let granted = AtomicUsize::new(0);
        let denied = AtomicUsize::new(0);

        thread::scope(|s| {
            for _ in 0..5 {
                s.spawn(|| {
                    for _ in 0..21 {
                        if limiter.acquire() {
                            granted.fetch_add(1, Ordering::SeqCst);
                        } else {
                            denied.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                });
            }
        });

        assert_eq!(granted.load(Ordering::SeqCst), 100);
        assert_eq!(denied.load(Ordering::SeqCst), 5);
        assert_eq!(limiter.refills(), 1);
    }

    #[test]
    fn test_successes_never_exceed_capacity_under_contention() {
        let (limiter, _clock) = manual_limiter(50, 2);
        let granted = AtomicUsize::new(0);

        thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    granted.fetch_add(burst(&limiter, 40), Ordering::SeqCst);
                });
            }
        });

        // 320 calls against a capacity of 100
        assert_eq!(granted.load(Ordering::SeqCst), 100);
    }

    #[test]
    fn test_refills_once_after_window_elapses() {
        let (limiter, clock) = manual_limiter(10, 1);
        assert_eq!(burst(&limiter, 15), 10);

        // Exactly one window later is not yet past it.
        clock.advance_millis(1000);
        assert!(!limiter.acquire());
        assert_eq!(limiter.refills(), 1);

        clock.advance_millis(1);
        assert_eq!(burst(&limiter, 15), 10);
        assert_eq!(limiter.refills(), 2);
    }

    #[test]
    fn test_concurrent_callers_refill_once() {
        let (limiter, clock) = manual_limiter(20, 1);
        assert_eq!(burst(&limiter, 25), 20);
        clock.advance_millis(1500);

        let granted = AtomicUsize::new(0);
        thread::scope(|s| {
            for _ in 0..6 {
                s.spawn(|| {
                    granted.fetch_add(burst(&limiter, 10), Ordering::SeqCst);
                });
            }
        });

        assert_eq!(granted.load(Ordering::SeqCst), 20);
        assert_eq!(limiter.refills(), 2);
    }

    #[test]
    fn test_multi_second_window_refills_once_per_window() {
        let (limiter, clock) = manual_limiter(2, 3);
        assert_eq!(limiter.capacity(), 6);
        assert_eq!(limiter.window(), Duration::from_secs(3));
        assert_eq!(burst(&limiter, 8), 6);

        // A one-second threshold would have refilled here.
        clock.advance_millis(1500);
        assert!(!limiter.acquire());
        clock.advance_millis(1500);
        assert!(!limiter.acquire());
        assert_eq!(limiter.refills(), 1);

        clock.advance_millis(1);
        assert_eq!(burst(&limiter, 8), 6);
        assert_eq!(limiter.refills(), 2);
    }

    #[test]
    fn test_permits_do_not_accrue_across_idle_windows() {
        let (limiter, clock) = manual_limiter(5, 1);
        assert_eq!(burst(&limiter, 2), 2);

        clock.advance_millis(10_000);
        assert_eq!(burst(&limiter, 20), 5);
    }

    #[test]
    fn test_zero_capacity_denies_everything() {
        let (limiter, _clock) = manual_limiter(0, 1);
        assert_eq!(burst(&limiter, 3), 0);
    }
}
