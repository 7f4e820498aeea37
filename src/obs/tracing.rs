// self
use crate::{
	_prelude::*,
	obs::{FlightRole, RefreshTrigger},
};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedRefresh<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedRefresh<F> = F;

/// A span builder used by refresh attempts and the background loop.
#[derive(Clone, Debug)]
pub struct RefreshSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl RefreshSpan {
	/// Creates a new span tagged with the provided trigger + stage.
	pub fn new(trigger: RefreshTrigger, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"token_sentinel.refresh",
				trigger = trigger.as_str(),
				stage,
				role = tracing::field::Empty
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (trigger, stage);

			Self {}
		}
	}

	/// Records whether this caller led the refresh or joined one in flight.
	pub fn record_role(&self, role: FlightRole) {
		#[cfg(feature = "tracing")]
		{
			self.span.record("role", role.as_str());
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = role;
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedRefresh<Fut>
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

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = RefreshSpan::new(RefreshTrigger::Foreground, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}

	#[tokio::test]
	async fn role_can_be_recorded_while_instrumented() {
		let span = RefreshSpan::new(RefreshTrigger::Background, "role_can_be_recorded");
		let role = span
			.instrument(async {
				span.record_role(FlightRole::Follower);

				FlightRole::Follower.as_str()
			})
			.await;

		assert_eq!(role, "follower");
	}
}
