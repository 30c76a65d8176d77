// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for request-client activity.
#[derive(Debug, Default)]
pub struct ClientMetrics {
	requests: AtomicU64,
	shared: AtomicU64,
	retries: AtomicU64,
	failures: AtomicU64,
}
impl ClientMetrics {
	/// Returns the number of attempts handed to the transport (retries included).
	pub fn requests(&self) -> u64 {
		self.requests.load(Ordering::Relaxed)
	}

	/// Returns the number of calls that joined an identical in-flight request.
	pub fn shared(&self) -> u64 {
		self.shared.load(Ordering::Relaxed)
	}

	/// Returns the number of retries scheduled.
	pub fn retries(&self) -> u64 {
		self.retries.load(Ordering::Relaxed)
	}

	/// Returns the number of calls that surfaced an error to their caller.
	pub fn failures(&self) -> u64 {
		self.failures.load(Ordering::Relaxed)
	}

	pub(crate) fn record_request(&self) {
		self.requests.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_shared(&self) {
		self.shared.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_retry(&self) {
		self.retries.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failures.fetch_add(1, Ordering::Relaxed);
	}
}
