/// Source of wall-clock time in milliseconds.
pub trait Clock: Send + Sync {
	fn now_millis(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now_millis(&self) -> u64 {
		u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
	}
}
