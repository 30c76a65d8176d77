//! Decaying poll schedule and check budget.

// self
use crate::_prelude::*;

/// Interval tiers, check budget, and age ceiling for payment polling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollSchedule {
	/// Maximum status checks per poller, the initial fetch included.
	pub max_checks: u32,
	/// Pending payments older than this are no longer polled.
	pub age_ceiling: Duration,
	tiers: Vec<(u32, StdDuration)>,
}
impl PollSchedule {
	const DEFAULT_AGE_CEILING: Duration = Duration::minutes(30);
	const DEFAULT_MAX_CHECKS: u32 = 10;

	/// Builds a schedule from `(last_poll_inclusive, interval)` tiers in ascending order.
	///
	/// Polls past the last tier reuse its interval until `max_checks` is reached.
	pub fn new(max_checks: u32, tiers: impl IntoIterator<Item = (u32, StdDuration)>) -> Self {
		let mut tiers = tiers.into_iter().collect::<Vec<_>>();

		tiers.sort_by_key(|(upto, _)| *upto);

		Self { max_checks, age_ceiling: Self::DEFAULT_AGE_CEILING, tiers }
	}

	/// Overrides the age ceiling.
	pub fn with_age_ceiling(mut self, ceiling: Duration) -> Self {
		self.age_ceiling = ceiling;

		self
	}

	/// Interval configured for the one-based poll number `poll`, if it is within budget.
	pub fn interval_for(&self, poll: u32) -> Option<StdDuration> {
		if poll == 0 || poll > self.max_checks {
			return None;
		}

		self.tiers
			.iter()
			.find(|(upto, _)| poll <= *upto)
			.or_else(|| self.tiers.last())
			.map(|(_, interval)| *interval)
	}

	/// Delay before the next check once `checks_done` checks have been made, or `None` when the
	/// budget is spent.
	pub fn delay_after(&self, checks_done: u32) -> Option<StdDuration> {
		if checks_done >= self.max_checks {
			return None;
		}

		self.interval_for(checks_done)
	}

	/// Returns `true` when a payment of `age` must no longer be polled.
	pub fn is_past_ceiling(&self, age: Duration) -> bool {
		age >= self.age_ceiling
	}
}
impl Default for PollSchedule {
	fn default() -> Self {
		Self::new(
			Self::DEFAULT_MAX_CHECKS,
			[
				(3, StdDuration::from_millis(2_000)),
				(7, StdDuration::from_millis(5_000)),
				(10, StdDuration::from_millis(10_000)),
			],
		)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn default_tiers_slow_down() {
		let schedule = PollSchedule::default();
		let secs = (1..=10)
			.map(|poll| schedule.interval_for(poll).map(|interval| interval.as_secs()))
			.collect::<Vec<_>>();

		assert_eq!(
			secs,
			[2, 2, 2, 5, 5, 5, 5, 10, 10, 10].into_iter().map(Some).collect::<Vec<_>>()
		);
		assert_eq!(schedule.interval_for(0), None);
		assert_eq!(schedule.interval_for(11), None);
	}

	#[test]
	fn budget_stops_after_ten_checks() {
		let schedule = PollSchedule::default();

		assert_eq!(schedule.delay_after(1), Some(StdDuration::from_secs(2)));
		assert_eq!(schedule.delay_after(9), Some(StdDuration::from_secs(10)));
		assert_eq!(schedule.delay_after(10), None);

		let total_wait = (1..schedule.max_checks)
			.filter_map(|done| schedule.delay_after(done))
			.sum::<StdDuration>();

		assert_eq!(total_wait, StdDuration::from_secs(2 * 3 + 5 * 4 + 10 * 2));
	}

	#[test]
	fn polls_past_last_tier_reuse_it() {
		let schedule = PollSchedule::new(5, [(2, StdDuration::from_millis(100))]);

		assert_eq!(schedule.interval_for(5), Some(StdDuration::from_millis(100)));
		assert!(schedule.is_past_ceiling(Duration::minutes(30)));
		assert!(!schedule.is_past_ceiling(Duration::minutes(29)));
	}
}
