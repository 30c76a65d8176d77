// self
use crate::{_prelude::*, obs::Operation};

/// Future returned by [`OperationSpan::instrument`]; carries the span with the `tracing` feature.
#[cfg(feature = "tracing")]
pub type InstrumentedOperation<F> = tracing::instrument::Instrumented<F>;
/// Without `tracing` the future is returned untouched.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOperation<F> = F;

/// Span named `storefront_client.operation` that client operations run under.
#[derive(Clone, Debug)]
pub struct OperationSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OperationSpan {
	/// Opens a span labelled with `operation` and the `stage` inside it.
	pub fn new(operation: Operation, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"storefront_client.operation",
				operation = operation.as_str(),
				stage
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (operation, stage);

			Self {}
		}
	}

	/// Enters the span until the returned guard drops.
	pub fn entered(self) -> OperationSpanGuard {
		#[cfg(feature = "tracing")]
		{
			OperationSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			OperationSpanGuard {}
		}
	}

	/// Attaches the span to `fut` so every poll runs inside it.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOperation<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Keeps an [`OperationSpan`] entered while alive.
pub struct OperationSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for OperationSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("OperationSpanGuard(..)")
	}
}

/// Emits a warning for a retry scheduled after a failed attempt.
pub fn warn_retry(operation: Operation, target: &str, retry: u32, delay: StdDuration, cause: &str) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(
			operation = operation.as_str(),
			target,
			retry,
			delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
			cause,
			"scheduling retry"
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (operation, target, retry, delay, cause);
	}
}

/// Emits a debug event for a noteworthy step of an operation.
pub fn note(operation: Operation, message: &str) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(operation = operation.as_str(), "{message}");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (operation, message);
	}
}
