//! Bounded retry policy for rate-limited and network-failed requests.

// self
use crate::_prelude::*;

/// Failure classes the request client is willing to retry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryableFailure {
	/// The API answered `429 Too Many Requests`.
	RateLimited {
		/// Retry-After hint parsed from the response.
		retry_after: Option<Duration>,
	},
	/// No response was obtained (DNS, TCP, TLS, body read).
	Network,
}
impl RetryableFailure {
	/// Returns a stable label suitable for log fields.
	pub const fn as_str(&self) -> &'static str {
		match self {
			Self::RateLimited { .. } => "rate_limited",
			Self::Network => "network",
		}
	}
}

/// Decision produced by [`RetryPolicy::decide`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryDecision {
	/// Wait for `delay`, then reissue the request.
	Retry {
		/// Time to wait before the next attempt.
		delay: StdDuration,
	},
	/// Surface the failure to the caller.
	GiveUp,
}

/// Retry budget and delays applied by [`ApiClient`](crate::client::ApiClient).
///
/// Both failure classes draw from one budget of `max_retries` per call. Rate-limited attempts
/// wait for the server's `Retry-After` hint (or `rate_limit_fallback` when absent); network
/// failures wait a flat `network_delay`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
	/// Maximum number of retries after the first attempt.
	pub max_retries: u32,
	/// Delay used for `429` responses that omit `Retry-After`.
	pub rate_limit_fallback: StdDuration,
	/// Flat delay between attempts after a network failure.
	pub network_delay: StdDuration,
}
impl RetryPolicy {
	const DEFAULT_MAX_RETRIES: u32 = 3;
	const DEFAULT_NETWORK_DELAY: StdDuration = StdDuration::from_millis(1_000);
	const DEFAULT_RATE_LIMIT_FALLBACK: StdDuration = StdDuration::from_millis(2_000);

	/// Policy that never retries.
	pub fn disabled() -> Self {
		Self::default().with_max_retries(0)
	}

	/// Overrides the retry budget.
	pub fn with_max_retries(mut self, max_retries: u32) -> Self {
		self.max_retries = max_retries;

		self
	}

	/// Overrides the delay used for `429` responses without `Retry-After`.
	pub fn with_rate_limit_fallback(mut self, delay: StdDuration) -> Self {
		self.rate_limit_fallback = delay;

		self
	}

	/// Overrides the flat delay used after network failures.
	pub fn with_network_delay(mut self, delay: StdDuration) -> Self {
		self.network_delay = delay;

		self
	}

	/// Decides whether the attempt that just failed should be retried, given the number of
	/// retries already spent on this call.
	pub fn decide(&self, retries_spent: u32, failure: &RetryableFailure) -> RetryDecision {
		if retries_spent >= self.max_retries {
			return RetryDecision::GiveUp;
		}

		let delay = match failure {
			RetryableFailure::RateLimited { retry_after } => retry_after
				.and_then(|hint| StdDuration::try_from(hint).ok())
				.unwrap_or(self.rate_limit_fallback),
			RetryableFailure::Network => self.network_delay,
		};

		RetryDecision::Retry { delay }
	}
}
impl Default for RetryPolicy {
	fn default() -> Self {
		Self {
			max_retries: Self::DEFAULT_MAX_RETRIES,
			rate_limit_fallback: Self::DEFAULT_RATE_LIMIT_FALLBACK,
			network_delay: Self::DEFAULT_NETWORK_DELAY,
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn rate_limits_honor_retry_after_or_fallback() {
		let policy = RetryPolicy::default();

		assert_eq!(
			policy.decide(0, &RetryableFailure::RateLimited { retry_after: Some(Duration::seconds(5)) }),
			RetryDecision::Retry { delay: StdDuration::from_secs(5) }
		);
		assert_eq!(
			policy.decide(1, &RetryableFailure::RateLimited { retry_after: None }),
			RetryDecision::Retry { delay: StdDuration::from_millis(2_000) }
		);
	}

	#[test]
	fn network_failures_use_flat_delay() {
		let policy = RetryPolicy::default();

		for spent in 0..3 {
			assert_eq!(
				policy.decide(spent, &RetryableFailure::Network),
				RetryDecision::Retry { delay: StdDuration::from_millis(1_000) }
			);
		}
	}

	#[test]
	fn budget_is_shared_and_bounded() {
		let policy = RetryPolicy::default();

		assert_eq!(policy.decide(3, &RetryableFailure::Network), RetryDecision::GiveUp);
		assert_eq!(
			policy.decide(3, &RetryableFailure::RateLimited { retry_after: None }),
			RetryDecision::GiveUp
		);
		assert_eq!(
			RetryPolicy::disabled().decide(0, &RetryableFailure::Network),
			RetryDecision::GiveUp
		);
	}

	#[test]
	fn negative_hints_fall_back() {
		let policy = RetryPolicy::default().with_rate_limit_fallback(StdDuration::from_millis(50));

		assert_eq!(
			policy
				.decide(0, &RetryableFailure::RateLimited { retry_after: Some(Duration::seconds(-1)) }),
			RetryDecision::Retry { delay: StdDuration::from_millis(50) }
		);
	}
}
