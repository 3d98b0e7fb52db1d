use std::time::Duration;

use async_trait::async_trait;
pub use chrono::{
    DateTime,
    Utc,
};

// This trait exists for testing, so that we can provide consistent timestamp values to objects
// instead of just relying on whatever the current time actually is, and so that the battle loop
// doesn't actually have to wait between rounds in tests.
#[async_trait]
pub trait Clockable: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
    fn now_ts(&self) -> i64;
    async fn sleep(&self, seconds: u64);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct UtcClock;

impl UtcClock {
    pub fn boxed() -> Box<UtcClock> {
        Box::new(UtcClock)
    }
}

#[async_trait]
impl Clockable for UtcClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn now_ts(&self) -> i64 {
        Utc::now().timestamp()
    }

    async fn sleep(&self, seconds: u64) {
        tokio::time::sleep(Duration::from_secs(seconds)).await;
    }
}

#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use std::sync::Arc;
    use std::sync::atomic::{
        AtomicI64,
        AtomicU64,
        Ordering,
    };

    use super::*;

    // Sleeping on the mock clock returns immediately and just moves "now" forward, so tests can
    // check how long something would have waited without actually waiting for it.
    #[derive(Clone)]
    pub struct MockUtcClock {
        now: Arc<AtomicI64>,
        slept: Arc<AtomicU64>,
    }

    impl MockUtcClock {
        pub fn new(start_ts: i64) -> MockUtcClock {
            MockUtcClock {
                now: Arc::new(AtomicI64::new(start_ts)),
                slept: Arc::new(AtomicU64::new(0)),
            }
        }

        pub fn boxed(start_ts: i64) -> Box<MockUtcClock> {
            Box::new(MockUtcClock::new(start_ts))
        }

        pub fn advance(&self, duration: i64) -> i64 {
            let old = self.now.fetch_add(duration, Ordering::Relaxed);
            old + duration
        }

        pub fn set(&self, ts: i64) -> i64 {
            self.now.store(ts, Ordering::Relaxed);
            ts
        }

        pub fn total_slept(&self) -> u64 {
            self.slept.load(Ordering::Relaxed)
        }
    }

    #[async_trait]
    impl Clockable for MockUtcClock {
        fn now(&self) -> DateTime<Utc> {
            DateTime::from_timestamp(self.now_ts(), 0).unwrap_or_default()
        }

        fn now_ts(&self) -> i64 {
            self.now.load(Ordering::Relaxed)
        }

        async fn sleep(&self, seconds: u64) {
            self.slept.fetch_add(seconds, Ordering::Relaxed);
            self.advance(seconds as i64);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockUtcClock;
    use super::*;

    #[tokio::test]
    async fn test_mock_clock_sleep_advances_time() {
        let clock = MockUtcClock::new(1000);
        let handle = clock.clone();

        clock.sleep(15).await;
        clock.sleep(5).await;

        assert_eq!(handle.now_ts(), 1020);
        assert_eq!(handle.total_slept(), 20);
        assert_eq!(handle.now().timestamp(), 1020);
    }

    #[test]
    fn test_mock_clock_set() {
        let clock = MockUtcClock::new(0);
        clock.set(42);
        assert_eq!(clock.advance(8), 50);
    }
}
