use parking_lot::Mutex;
use tokio::time::{sleep_until, Duration, Instant};

/// Global token source handing out one token per `period`.
///
/// Each caller reserves the next free slot under a short lock and then sleeps
/// until it, so slots are strictly `period` apart no matter how many tasks
/// wait. Idle time is not banked: after a quiet spell the first caller goes
/// immediately and the next one still waits a full period.
#[derive(Debug)]
pub struct RateLimiter {
    period: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn per_second(requests: u32) -> Self {
        Self::with_period(Duration::from_secs(1) / requests.max(1))
    }

    pub fn with_period(period: Duration) -> Self {
        Self { period, next_slot: Mutex::new(None) }
    }

    pub async fn acquire(&self) {
        let slot = {
            let mut next = self.next_slot.lock();
            let now = Instant::now();
            let slot = match *next {
                Some(t) if t > now => t,
                _ => now,
            };
            *next = Some(slot + self.period);
            slot
        };
        sleep_until(slot).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn sequential_tokens_are_one_period_apart() {
        let limiter = RateLimiter::per_second(4);
        let start = Instant::now();
        for _ in 0..5 {
            limiter.acquire().await;
        }
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(1000), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(1100), "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn waiting_tasks_share_one_budget() {
        let limiter = Arc::new(RateLimiter::per_second(10));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move {
                    limiter.acquire().await;
                    Instant::now()
                })
            })
            .collect();
        let mut at = Vec::new();
        for h in handles {
            at.push(h.await.unwrap());
        }
        at.sort();
        for pair in at.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(100));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn idle_time_is_not_banked() {
        let limiter = RateLimiter::per_second(2);
        limiter.acquire().await;
        tokio::time::sleep(Duration::from_secs(5)).await;
        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(500));
    }
}
