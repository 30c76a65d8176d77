//! Payment status polling with a decaying schedule, a check budget, and a one-time success
//! notification.
//!
//! [`PaymentPoller::run`] fetches the status once, then keeps re-fetching while the payment is
//! pending and younger than the schedule's age ceiling. Polling stops at the first non-pending
//! status, when the check budget is spent, or when the task driving it is dropped
//! ([`PollerHandle`] aborts its task on drop). A settled payment latches the poller: later runs
//! return [`PollOutcome::AlreadySettled`] without fetching, and the success notification fires
//! at most once per poller.

mod schedule;

pub use schedule::PollSchedule;

// std
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
// crates.io
use tokio::task::JoinHandle;
// self
use crate::{
	_prelude::*,
	api::Payment,
	auth::OrderId,
	client::ApiClient,
	http::ApiTransport,
	obs::{self, Operation, OperationSpan, Outcome},
};

/// Boxed future returned by [`PaymentStatusSource::fetch_payment`].
pub type StatusFuture<'a> = Pin<Box<dyn Future<Output = Result<Payment>> + 'a + Send>>;

/// Anything able to report the current payment state of an order.
pub trait PaymentStatusSource
where
	Self: Send + Sync,
{
	/// Fetches the payment attached to `order_id`.
	fn fetch_payment<'a>(&'a self, order_id: &'a OrderId) -> StatusFuture<'a>;
}
impl<T> PaymentStatusSource for ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	fn fetch_payment<'a>(&'a self, order_id: &'a OrderId) -> StatusFuture<'a> {
		Box::pin(self.payment(order_id))
	}
}

/// Receives poller notifications (the "toast" layer of a UI).
pub trait PaymentObserver
where
	Self: Send + Sync,
{
	/// Called with every successfully fetched payment.
	fn on_update(&self, _payment: &Payment) {}

	/// Called once per poller when the payment first reports success.
	fn on_success(&self, payment: &Payment);

	/// Called when a status check fails.
	fn on_error(&self, _error: &Error) {}
}

/// Observer that ignores every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentObserver;
impl PaymentObserver for SilentObserver {
	fn on_success(&self, _payment: &Payment) {}
}

/// Why a poll run stopped.
#[derive(Clone, Debug)]
pub enum PollOutcome {
	/// The payment reached a terminal status.
	Settled(Payment),
	/// The poller had already observed a terminal status; nothing was fetched.
	AlreadySettled,
	/// The payment reported a status that is neither pending nor terminal.
	NotPending(Payment),
	/// The pending payment is older than the age ceiling.
	AgeCeiling(Payment),
	/// The check budget was spent while the payment was still pending.
	BudgetExhausted(Option<Payment>),
	/// The initial status check failed.
	Failed(Error),
}
impl PollOutcome {
	/// Last payment observed by the run, if any.
	pub fn payment(&self) -> Option<&Payment> {
		match self {
			Self::Settled(payment) | Self::NotPending(payment) | Self::AgeCeiling(payment) =>
				Some(payment),
			Self::BudgetExhausted(payment) => payment.as_ref(),
			Self::AlreadySettled | Self::Failed(_) => None,
		}
	}
}

#[derive(Debug, Default)]
struct PollState {
	checks: AtomicU32,
	notified: AtomicBool,
	settled: AtomicBool,
}

/// Polls the payment of one order.
#[derive(Clone)]
pub struct PaymentPoller {
	source: Arc<dyn PaymentStatusSource>,
	observer: Arc<dyn PaymentObserver>,
	order_id: OrderId,
	schedule: PollSchedule,
	state: Arc<PollState>,
}
impl PaymentPoller {
	/// Creates a poller with the default schedule and no observer.
	pub fn new(source: Arc<dyn PaymentStatusSource>, order_id: OrderId) -> Self {
		Self {
			source,
			observer: Arc::new(SilentObserver),
			order_id,
			schedule: PollSchedule::default(),
			state: Default::default(),
		}
	}

	/// Routes notifications to `observer`.
	pub fn with_observer(mut self, observer: Arc<dyn PaymentObserver>) -> Self {
		self.observer = observer;

		self
	}

	/// Overrides the poll schedule.
	pub fn with_schedule(mut self, schedule: PollSchedule) -> Self {
		self.schedule = schedule;

		self
	}

	/// Order being polled.
	pub fn order_id(&self) -> &OrderId {
		&self.order_id
	}

	/// Number of budgeted status checks made so far.
	pub fn checks(&self) -> u32 {
		self.state.checks.load(Ordering::SeqCst)
	}

	/// Returns `true` once a terminal status has been observed.
	pub fn is_settled(&self) -> bool {
		self.state.settled.load(Ordering::SeqCst)
	}

	/// Fetches the status once on explicit user request.
	///
	/// Manual refreshes do not draw from the check budget, but they do feed the success latch.
	pub async fn refresh(&self) -> Result<Payment> {
		let span = OperationSpan::new(Operation::PaymentPoll, "refresh");
		let result = span.instrument(self.source.fetch_payment(&self.order_id)).await;

		self.observe(&result);

		result
	}

	/// Fetches the status, then polls on the schedule until the payment stops being pending.
	pub async fn run(&self) -> PollOutcome {
		const OP: Operation = Operation::PaymentPoll;

		let span = OperationSpan::new(OP, "run");

		span.instrument(async {
			if self.is_settled() {
				return PollOutcome::AlreadySettled;
			}
			if self.checks() >= self.schedule.max_checks {
				return PollOutcome::BudgetExhausted(None);
			}

			let mut payment = match self.check().await {
				Ok(payment) => payment,
				Err(err) => return PollOutcome::Failed(err),
			};

			loop {
				if payment.status.is_terminal() {
					return PollOutcome::Settled(payment);
				}
				if !payment.status.is_pending() {
					return PollOutcome::NotPending(payment);
				}
				if payment
					.age_at(OffsetDateTime::now_utc())
					.is_some_and(|age| self.schedule.is_past_ceiling(age))
				{
					obs::note(OP, "pending payment passed the age ceiling");

					return PollOutcome::AgeCeiling(payment);
				}

				let Some(delay) = self.schedule.delay_after(self.checks()) else {
					obs::note(OP, "poll budget exhausted");

					return PollOutcome::BudgetExhausted(Some(payment));
				};

				tokio::time::sleep(delay).await;

				if self.is_settled() {
					return PollOutcome::AlreadySettled;
				}
				if let Ok(next) = self.check().await {
					payment = next;
				}
			}
		})
		.await
	}

	/// Runs the poller on the current tokio runtime.
	pub fn spawn(&self) -> PollerHandle {
		let poller = self.clone();

		PollerHandle { task: Some(tokio::spawn(async move { poller.run().await })) }
	}

	async fn check(&self) -> Result<Payment> {
		self.state.checks.fetch_add(1, Ordering::SeqCst);
		obs::record_outcome(Operation::PaymentPoll, Outcome::Attempt);

		let result = self.source.fetch_payment(&self.order_id).await;

		self.observe(&result);

		result
	}

	fn observe(&self, result: &Result<Payment>) {
		match result {
			Ok(payment) => {
				obs::record_outcome(Operation::PaymentPoll, Outcome::Success);
				self.observer.on_update(payment);

				if payment.status.is_terminal() {
					self.state.settled.store(true, Ordering::SeqCst);
				}
				if payment.status.is_success() && !self.state.notified.swap(true, Ordering::SeqCst)
				{
					self.observer.on_success(payment);
				}
			},
			Err(err) => {
				obs::record_outcome(Operation::PaymentPoll, Outcome::Failure);
				self.observer.on_error(err);
			},
		}
	}
}
impl Debug for PaymentPoller {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PaymentPoller")
			.field("order_id", &self.order_id)
			.field("schedule", &self.schedule)
			.field("checks", &self.checks())
			.field("settled", &self.is_settled())
			.finish()
	}
}

/// Owns a spawned poll task; dropping the handle cancels any pending timer.
#[derive(Debug)]
pub struct PollerHandle {
	task: Option<JoinHandle<PollOutcome>>,
}
impl PollerHandle {
	/// Returns `true` once the poll task has stopped.
	pub fn is_finished(&self) -> bool {
		self.task.as_ref().is_none_or(JoinHandle::is_finished)
	}

	/// Cancels the poll task.
	pub fn cancel(self) {
		drop(self);
	}

	/// Waits for the poll task to stop; `None` if it was cancelled or panicked.
	pub async fn join(mut self) -> Option<PollOutcome> {
		let task = self.task.take()?;

		task.await.ok()
	}
}
impl Drop for PollerHandle {
	fn drop(&mut self) {
		if let Some(task) = self.task.take() {
			task.abort();
		}
	}
}
