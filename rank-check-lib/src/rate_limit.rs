//! Shared pacing for calls to an external endpoint.
//!
//! A [`RateLimiter`] is created once per endpoint class and handed to every
//! worker through an `Arc`. `acquire()` only ever delays; it never rejects.
//!
//! The pacing state lives behind a single async mutex that stays locked for
//! the whole check → sleep → stamp sequence. Callers queue on the lock, so two
//! workers can never both observe a free slot and be granted within the same
//! interval.

use crate::types::{CheckConfig, RatePolicy, MAX_DURATION};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

/// Process-wide pacing gate for one external endpoint.
#[derive(Debug)]
pub struct RateLimiter {
    policy: RatePolicy,
    max_calls: u32,
    period: Duration,
    state: Mutex<PacingState>,
    granted: AtomicU64,
}

#[derive(Debug, Default)]
struct PacingState {
    /// Last grant, used by the spacing policy
    last_grant: Option<Instant>,
    /// Grants inside the current window, oldest first
    window: VecDeque<Instant>,
}

impl RateLimiter {
    /// Fixed spacing of `period / max_calls` between consecutive grants.
    pub fn spacing(max_calls: u32, period: Duration) -> Self {
        Self::new(RatePolicy::Spacing, max_calls, period)
    }

    /// At most `max_calls` grants in any rolling `period`.
    pub fn window(max_calls: u32, period: Duration) -> Self {
        Self::new(RatePolicy::Window, max_calls, period)
    }

    /// Fixed spacing of `1 / calls_per_second`.
    ///
    /// A non-positive or non-finite rate disables pacing.
    pub fn per_second(calls_per_second: f64) -> Self {
        let interval = if calls_per_second.is_finite() && calls_per_second > 0.0 {
            Duration::from_secs_f64(1.0 / calls_per_second)
        } else {
            Duration::ZERO
        };
        Self::spacing(1, interval)
    }

    /// Build the provider limiter described by a run configuration.
    pub fn from_config(config: &CheckConfig) -> Self {
        Self::new(config.rate_policy, config.rate_limit, config.rate_period)
    }

    fn new(policy: RatePolicy, max_calls: u32, period: Duration) -> Self {
        Self {
            policy,
            max_calls: max_calls.max(1),
            period: period.min(MAX_DURATION),
            state: Mutex::new(PacingState::default()),
            granted: AtomicU64::new(0),
        }
    }

    pub fn policy(&self) -> RatePolicy {
        self.policy
    }

    /// Minimum spacing between grants under the spacing policy.
    pub fn interval(&self) -> Duration {
        self.period / self.max_calls
    }

    /// Total number of grants handed out so far.
    pub fn granted(&self) -> u64 {
        self.granted.load(Ordering::Relaxed)
    }

    /// Wait until the next call is allowed.
    pub async fn acquire(&self) {
        let mut state = self.state.lock().await;

        match self.policy {
            RatePolicy::Spacing => {
                if let Some(last) = state.last_grant {
                    let ready_at = deadline(last, self.interval());
                    if ready_at > Instant::now() {
                        sleep_until(ready_at).await;
                    }
                }
                state.last_grant = Some(Instant::now());
            }
            RatePolicy::Window => {
                prune_window(&mut state.window, self.period);
                if state.window.len() >= self.max_calls as usize {
                    if let Some(oldest) = state.window.pop_front() {
                        sleep_until(deadline(oldest, self.period)).await;
                    }
                    prune_window(&mut state.window, self.period);
                }
                state.window.push_back(Instant::now());
            }
        }

        let total = self.granted.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::debug!(policy = %self.policy, granted = total, "rate limit slot granted");
    }
}

/// `from + after`, saturating at the latest representable instant.
fn deadline(from: Instant, after: Duration) -> Instant {
    from.checked_add(after)
        .or_else(|| from.checked_add(MAX_DURATION))
        .unwrap_or(from)
}

/// Drop grants that have fallen out of the rolling window.
fn prune_window(window: &mut VecDeque<Instant>, period: Duration) {
    let now = Instant::now();
    while let Some(&oldest) = window.front() {
        if now.duration_since(oldest) >= period {
            window.pop_front();
        } else {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    async fn grant_times(limiter: Arc<RateLimiter>, workers: usize, per_worker: usize) -> Vec<Instant> {
        let times = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut handles = Vec::new();
        for _ in 0..workers {
            let limiter = Arc::clone(&limiter);
            let times = Arc::clone(&times);
            handles.push(tokio::spawn(async move {
                for _ in 0..per_worker {
                    limiter.acquire().await;
                    times.lock().unwrap().push(Instant::now());
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        let mut times = times.lock().unwrap().clone();
        times.sort();
        times
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_acquire_is_immediate() {
        let limiter = RateLimiter::per_second(1.0);
        let start = Instant::now();
        limiter.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(limiter.granted(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spacing_one_per_second_across_concurrent_callers() {
        let limiter = Arc::new(RateLimiter::per_second(1.0));
        let start = Instant::now();

        // 3 workers x 2 calls = 6 grants
        let times = grant_times(Arc::clone(&limiter), 3, 2).await;

        assert_eq!(times.len(), 6);
        assert!(
            start.elapsed() >= Duration::from_secs(5),
            "6 grants at 1/s need at least 5s, took {:?}",
            start.elapsed()
        );
        for pair in times.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_secs(1));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_spacing_derives_interval_from_calls_and_period() {
        let limiter = RateLimiter::spacing(4, Duration::from_secs(2));
        assert_eq!(limiter.interval(), Duration::from_millis(500));
        assert_eq!(limiter.policy(), RatePolicy::Spacing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_never_exceeds_max_calls_per_period() {
        let limiter = Arc::new(RateLimiter::window(2, Duration::from_secs(1)));
        let start = Instant::now();

        let times = grant_times(Arc::clone(&limiter), 4, 2).await;

        assert_eq!(times.len(), 8);
        // 8 grants, 2 per second: the last pair lands at t=3s
        assert!(start.elapsed() >= Duration::from_secs(3));
        for (i, t) in times.iter().enumerate() {
            let in_window = times[i..]
                .iter()
                .filter(|other| **other - *t < Duration::from_secs(1))
                .count();
            assert!(in_window <= 2, "more than 2 grants inside one second");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_allows_burst_up_to_limit() {
        let limiter = RateLimiter::window(5, Duration::from_secs(1));
        let start = Instant::now();
        for _ in 0..5 {
            limiter.acquire().await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);

        limiter.acquire().await;
        let waited = start.elapsed();
        assert!(waited >= Duration::from_secs(1) && waited < Duration::from_millis(1100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_period_is_capped_instead_of_overflowing() {
        let limiter = RateLimiter::spacing(1, Duration::from_secs(u64::MAX));
        assert_eq!(limiter.interval(), MAX_DURATION);

        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        assert!(start.elapsed() >= MAX_DURATION);

        let window = RateLimiter::window(1, Duration::MAX);
        window.acquire().await;
        window.acquire().await;
        assert_eq!(limiter.granted() + window.granted(), 4);
    }

    #[test]
    fn test_deadline_saturates() {
        let now = Instant::now();
        assert_eq!(deadline(now, Duration::from_secs(1)), now + Duration::from_secs(1));
        assert!(deadline(now, Duration::MAX) >= now);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_positive_rate_disables_pacing() {
        let limiter = RateLimiter::per_second(0.0);
        let start = Instant::now();
        for _ in 0..10 {
            limiter.acquire().await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_from_config_uses_policy_and_limits() {
        let config = CheckConfig::default()
            .with_rate_limit(10, Duration::from_secs(2))
            .with_rate_policy(RatePolicy::Spacing);
        let limiter = RateLimiter::from_config(&config);
        assert_eq!(limiter.policy(), RatePolicy::Spacing);
        assert_eq!(limiter.interval(), Duration::from_millis(200));
    }
}
