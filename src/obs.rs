//! Optional observability helpers for client operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `storefront_client.operation` with the
//!   `operation` and `stage` (call site) fields, plus warnings for every scheduled retry.
//! - Enable `metrics` to increment the `storefront_client_operation_total` counter for every
//!   attempt/retry/shared/success/failure, labeled by `operation` + `outcome`.

mod metrics;
mod tracing;

pub use self::metrics::*;
pub use self::tracing::*;

// self
use crate::_prelude::*;

/// Operation kinds observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
	/// Storefront API request issued through the request client.
	Request,
	/// Payment status check issued by the poller.
	PaymentPoll,
	/// Route authorization decision.
	RouteGuard,
}
impl Operation {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Operation::Request => "request",
			Operation::PaymentPoll => "payment_poll",
			Operation::RouteGuard => "route_guard",
		}
	}
}
impl Display for Operation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
	/// Entry to a client helper.
	Attempt,
	/// A failed attempt was scheduled for another try.
	Retry,
	/// The caller joined an identical request already in flight.
	Shared,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl Outcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Outcome::Attempt => "attempt",
			Outcome::Retry => "retry",
			Outcome::Shared => "shared",
			Outcome::Success => "success",
			Outcome::Failure => "failure",
		}
	}
}
impl Display for Outcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
