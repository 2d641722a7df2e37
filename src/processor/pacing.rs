use rand::Rng;
use std::time::Duration;

/// 行与行之间的等待：固定间隔 + 均匀随机抖动
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pacing {
    pub interval: Duration,
    pub jitter: Duration,
}

impl Pacing {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn from_millis(interval_ms: u64, jitter_ms: u64) -> Self {
        Self {
            interval: Duration::from_millis(interval_ms),
            jitter: Duration::from_millis(jitter_ms),
        }
    }

    pub fn next_delay(&self) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.interval;
        }
        self.interval + Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
    }

    pub async fn wait(&self) {
        let delay = self.next_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}
